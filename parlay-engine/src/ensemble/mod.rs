pub mod calibration;
pub mod confidence;

use rayon::prelude::*;
use tracing::debug;

use parlay_db::models::{DrawRecord, GameRules};

use crate::config::EnsembleConfig;
use crate::error::PredictError;
use crate::models::{all_models, default_weights, ForecastModel};

pub struct EnsembleCombiner {
    pub models: Vec<Box<dyn ForecastModel>>,
    pub weights: Vec<f64>,
    pub config: EnsembleConfig,
}

/// Rapport par modèle, conservé pour l'explicabilité du forecast.
#[derive(Debug, Clone)]
pub struct ModelReport {
    pub name: String,
    pub weight: f64,
    pub confidence: f64,
    pub top: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct EnsembleForecast {
    /// Exactement K numéros distincts, triés en ordre croissant.
    pub numbers: Vec<u8>,
    pub bonus: Option<u8>,
    /// Confiance agrégée, toujours dans les bornes configurées.
    pub confidence: f64,
    pub distribution: Vec<f64>,
    /// Écart-type par numéro entre les distributions des modèles.
    pub spread: Vec<f64>,
    pub models: Vec<ModelReport>,
    /// Vrai quand l'historique était plus court que `min_history`.
    pub thin_history: bool,
}

impl EnsembleCombiner {
    /// Poids uniformes.
    pub fn new(models: Vec<Box<dyn ForecastModel>>, config: EnsembleConfig) -> Self {
        let n = models.len();
        let weights = vec![1.0 / n as f64; n];
        Self {
            models,
            weights,
            config,
        }
    }

    pub fn with_weights(
        models: Vec<Box<dyn ForecastModel>>,
        weights: Vec<f64>,
        config: EnsembleConfig,
    ) -> Self {
        Self {
            models,
            weights,
            config,
        }
    }

    /// La pile par défaut : tous les modèles avec leurs poids documentés.
    pub fn default_stack(config: EnsembleConfig) -> Self {
        let models = all_models(&config);
        let weights = default_weights();
        Self::with_weights(models, weights, config)
    }

    /// Combine les modèles et retourne les `k` meilleurs numéros.
    ///
    /// Valide tout en entrée et échoue immédiatement : aucun résultat
    /// partiel ne sort jamais d'ici. Les modèles sont indépendants et en
    /// lecture seule sur l'historique partagé, donc évalués en parallèle —
    /// pure optimisation, jamais nécessaire à la justesse.
    pub fn predict(
        &self,
        history: &[DrawRecord],
        rules: GameRules,
        k: usize,
    ) -> Result<EnsembleForecast, PredictError> {
        let size = rules.size();
        if size == 0 {
            return Err(PredictError::EmptyPool);
        }
        if k == 0 || k > size {
            return Err(PredictError::CountOutOfRange {
                requested: k,
                pool_size: size,
            });
        }
        self.config.validate()?;

        let total_weight: f64 = self.weights.iter().sum();
        if !(total_weight > 0.0) {
            return Err(PredictError::DegenerateWeights);
        }
        let weights: Vec<f64> = self.weights.iter().map(|w| w / total_weight).collect();

        let distributions: Vec<Vec<f64>> = self
            .models
            .par_iter()
            .map(|model| model.score(history, rules))
            .collect();

        // Fusion pondérée, dans l'ordre de fourniture des modèles.
        let mut combined = vec![0.0f64; size];
        for (dist, &w) in distributions.iter().zip(weights.iter()) {
            debug_assert!(crate::models::validate_distribution(dist, rules));
            for (j, &p) in dist.iter().enumerate() {
                combined[j] += w * p;
            }
        }
        let total: f64 = combined.iter().sum();
        if total > 0.0 {
            for p in &mut combined {
                *p /= total;
            }
        }

        let spread = compute_spread(&distributions, size);

        // Top-K : score décroissant, égalité départagée par numéro croissant.
        let mut indices: Vec<usize> = (0..size).collect();
        indices.sort_by(|&a, &b| {
            combined[b]
                .partial_cmp(&combined[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        let mut numbers: Vec<u8> = indices[..k].iter().map(|&i| (i + 1) as u8).collect();
        numbers.sort();

        let thin_history = history.len() < self.config.min_history;
        let model_confidences: Vec<f64> = self.models.iter().map(|m| m.confidence()).collect();
        let aggregate = confidence::aggregate_confidence(
            &weights,
            &model_confidences,
            thin_history,
            &self.config,
        );

        let reports: Vec<ModelReport> = self
            .models
            .iter()
            .zip(distributions.iter())
            .zip(weights.iter())
            .map(|((model, dist), &weight)| ModelReport {
                name: model.name().to_string(),
                weight,
                confidence: model.confidence(),
                top: top_numbers(dist, k),
            })
            .collect();

        debug!(
            history = history.len(),
            k,
            confidence = aggregate,
            thin_history,
            "forecast d'ensemble calculé"
        );

        Ok(EnsembleForecast {
            numbers,
            bonus: bonus_pick(history, rules),
            confidence: aggregate,
            distribution: combined,
            spread,
            models: reports,
            thin_history,
        })
    }
}

/// Les `k` indices les plus probables d'une distribution, en numéros triés.
fn top_numbers(dist: &[f64], k: usize) -> Vec<u8> {
    let mut indices: Vec<usize> = (0..dist.len()).collect();
    indices.sort_by(|&a, &b| {
        dist[b]
            .partial_cmp(&dist[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    let mut numbers: Vec<u8> = indices
        .iter()
        .take(k)
        .map(|&i| (i + 1) as u8)
        .collect();
    numbers.sort();
    numbers
}

fn compute_spread(distributions: &[Vec<f64>], size: usize) -> Vec<f64> {
    let n = distributions.len() as f64;
    if n == 0.0 {
        return vec![0.0; size];
    }
    (0..size)
        .map(|j| {
            let mean = distributions.iter().map(|d| d[j]).sum::<f64>() / n;
            let variance = distributions.iter().map(|d| (d[j] - mean).powi(2)).sum::<f64>() / n;
            variance.sqrt()
        })
        .collect()
}

/// Bonus (Powerball, Mega Ball) : le plus fréquent de l'historique,
/// égalité au plus petit numéro. None pour les jeux sans bonus.
pub fn bonus_pick(history: &[DrawRecord], rules: GameRules) -> Option<u8> {
    let max = rules.bonus_size?;
    let mut counts = vec![0u32; max as usize];
    for record in history {
        if let Some(b) = record.bonus {
            let idx = (b - 1) as usize;
            if idx < counts.len() {
                counts[idx] += 1;
            }
        }
    }
    let best = counts
        .iter()
        .enumerate()
        .max_by(|&(ia, a), &(ib, b)| a.cmp(b).then(ib.cmp(&ia)))
        .map(|(i, _)| (i + 1) as u8);
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{make_test_history, uniform};
    use parlay_db::models::Game;
    use std::collections::HashMap;

    /// Modèle de test à distribution fixe.
    struct FixedModel {
        name: String,
        dist: Vec<f64>,
        confidence: f64,
    }

    impl ForecastModel for FixedModel {
        fn name(&self) -> &str {
            &self.name
        }
        fn score(&self, _history: &[DrawRecord], _rules: GameRules) -> Vec<f64> {
            self.dist.clone()
        }
        fn confidence(&self) -> f64 {
            self.confidence
        }
        fn params(&self) -> HashMap<String, f64> {
            HashMap::new()
        }
    }

    fn fixed(name: &str, dist: Vec<f64>, confidence: f64) -> Box<dyn ForecastModel> {
        Box::new(FixedModel {
            name: name.to_string(),
            dist,
            confidence,
        })
    }

    #[test]
    fn test_predict_returns_exactly_k_distinct_sorted() {
        let rules = Game::Powerball.rules();
        let combiner = EnsembleCombiner::default_stack(EnsembleConfig::default());
        let history = make_test_history(40, rules);

        for k in [1, 5, 10] {
            let forecast = combiner.predict(&history, rules, k).unwrap();
            assert_eq!(forecast.numbers.len(), k);
            let mut dedup = forecast.numbers.clone();
            dedup.dedup();
            assert_eq!(dedup.len(), k, "numéros en double");
            assert!(forecast.numbers.windows(2).all(|w| w[0] < w[1]));
            assert!(forecast
                .numbers
                .iter()
                .all(|&n| n >= 1 && n <= rules.pool_size));
        }
    }

    #[test]
    fn test_predict_rejects_bad_k() {
        let rules = Game::Powerball.rules();
        let combiner = EnsembleCombiner::default_stack(EnsembleConfig::default());
        let history = make_test_history(10, rules);

        assert_eq!(
            combiner.predict(&history, rules, 0).unwrap_err(),
            PredictError::CountOutOfRange {
                requested: 0,
                pool_size: 69
            }
        );
        assert_eq!(
            combiner.predict(&history, rules, 70).unwrap_err(),
            PredictError::CountOutOfRange {
                requested: 70,
                pool_size: 69
            }
        );
    }

    #[test]
    fn test_predict_rejects_zero_weights() {
        let rules = Game::Powerball.rules();
        let size = rules.size();
        let models = vec![fixed("A", uniform(size), 0.8)];
        let combiner =
            EnsembleCombiner::with_weights(models, vec![0.0], EnsembleConfig::default());
        assert_eq!(
            combiner.predict(&[], rules, 5).unwrap_err(),
            PredictError::DegenerateWeights
        );
    }

    #[test]
    fn test_weights_normalized_before_merge() {
        let rules = Game::Powerball.rules();
        let size = rules.size();
        let mut dist_a = uniform(size);
        dist_a[0] += 0.01;
        let dist_a = crate::models::normalize_or_uniform(dist_a);

        // Poids 2.0 et 6.0 : équivalents à 0.25/0.75 après normalisation.
        let run = |weights: Vec<f64>| {
            let models = vec![
                fixed("A", dist_a.clone(), 0.8),
                fixed("B", uniform(size), 0.6),
            ];
            EnsembleCombiner::with_weights(models, weights, EnsembleConfig::default())
                .predict(&[], rules, 5)
                .unwrap()
        };
        let big = run(vec![2.0, 6.0]);
        let small = run(vec![0.25, 0.75]);
        for (a, b) in big.distribution.iter().zip(small.distribution.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ranking_invariant_to_model_order_on_ties() {
        // Tous les modèles identiques, poids égaux : le classement ne doit
        // dépendre que du départage déclaré (numéro croissant).
        let rules = Game::Powerball.rules();
        let size = rules.size();
        let make = |names: [&str; 3]| {
            let models: Vec<Box<dyn ForecastModel>> = names
                .iter()
                .map(|n| fixed(n, uniform(size), 0.7))
                .collect();
            EnsembleCombiner::new(models, EnsembleConfig::default())
                .predict(&[], rules, 5)
                .unwrap()
        };
        let abc = make(["A", "B", "C"]);
        let cba = make(["C", "B", "A"]);
        assert_eq!(abc.numbers, cba.numbers);
        // Égalité parfaite partout → les K premiers numéros dans l'ordre naturel.
        assert_eq!(abc.numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_confidence_stays_in_bounds_end_to_end() {
        // Scénario complet : pool 1..=69, 100 tirages, K=5, 6 stratégies
        // équipondérées → confiance strictement entre les bornes.
        let rules = Game::Powerball.rules();
        let config = EnsembleConfig::default();
        let models: Vec<Box<dyn ForecastModel>> =
            all_models(&config).into_iter().take(6).collect();
        let combiner = EnsembleCombiner::new(models, config.clone());
        let history = make_test_history(100, rules);

        let forecast = combiner.predict(&history, rules, 5).unwrap();
        assert_eq!(forecast.numbers.len(), 5);
        assert!(!forecast.thin_history);
        assert!(forecast.confidence > config.confidence_floor);
        assert!(forecast.confidence < config.confidence_cap);
    }

    #[test]
    fn test_confidence_never_exceeds_cap() {
        // Même avec des modèles déclarant une confiance absurde, le plafond tient.
        let rules = Game::Powerball.rules();
        let size = rules.size();
        let models = vec![
            fixed("Sûr", uniform(size), 500.0),
            fixed("TrèsSûr", uniform(size), 1e9),
        ];
        let config = EnsembleConfig::default();
        let combiner = EnsembleCombiner::new(models, config.clone());
        let forecast = combiner
            .predict(&make_test_history(50, rules), rules, 5)
            .unwrap();
        assert!(forecast.confidence <= config.confidence_cap);
    }

    #[test]
    fn test_thin_history_flagged_and_dampened() {
        let rules = Game::Powerball.rules();
        let combiner = EnsembleCombiner::default_stack(EnsembleConfig::default());

        let thin = combiner
            .predict(&make_test_history(3, rules), rules, 5)
            .unwrap();
        let full = combiner
            .predict(&make_test_history(50, rules), rules, 5)
            .unwrap();
        assert!(thin.thin_history);
        assert!(!full.thin_history);
        assert!(thin.confidence < full.confidence);
    }

    #[test]
    fn test_spread_zero_for_identical_models() {
        let rules = Game::Powerball.rules();
        let size = rules.size();
        let models = vec![
            fixed("A", uniform(size), 0.7),
            fixed("B", uniform(size), 0.7),
        ];
        let forecast = EnsembleCombiner::new(models, EnsembleConfig::default())
            .predict(&[], rules, 5)
            .unwrap();
        assert!(forecast.spread.iter().all(|&s| s.abs() < 1e-12));
    }

    #[test]
    fn test_model_reports_present() {
        let rules = Game::Powerball.rules();
        let combiner = EnsembleCombiner::default_stack(EnsembleConfig::default());
        let forecast = combiner
            .predict(&make_test_history(30, rules), rules, 5)
            .unwrap();
        assert_eq!(forecast.models.len(), 7);
        for report in &forecast.models {
            assert_eq!(report.top.len(), 5);
            assert!(report.weight > 0.0);
        }
    }

    #[test]
    fn test_bonus_pick_most_frequent() {
        let rules = Game::Powerball.rules();
        let mut history = make_test_history(10, rules);
        for record in &mut history {
            record.bonus = Some(7);
        }
        history[0].bonus = Some(3);
        assert_eq!(bonus_pick(&history, rules), Some(7));
    }

    #[test]
    fn test_bonus_pick_none_for_bonusless_game() {
        let rules = Game::TexasLotto.rules();
        let history = make_test_history(10, rules);
        assert_eq!(bonus_pick(&history, rules), None);
    }

    #[test]
    fn test_bonus_pick_tie_breaks_to_smallest() {
        let rules = Game::Powerball.rules();
        // Aucun bonus observé : tous à zéro, le plus petit numéro gagne.
        let mut history = make_test_history(5, rules);
        for record in &mut history {
            record.bonus = None;
        }
        assert_eq!(bonus_pick(&history, rules), Some(1));
    }
}
