use std::collections::HashMap;

use parlay_db::models::{DrawRecord, GameRules};

use super::{normalize_or_uniform, ForecastModel};

/// Capacité "prédicteur appris" : un modèle externe qui, pour un vecteur de
/// features, retourne un score et une confiance. Le moteur ne sait rien de
/// son implémentation ; il est interchangeable ou absent sans toucher à
/// l'agrégateur.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> PredictorOutput;
}

#[derive(Debug, Clone, Copy)]
pub struct PredictorOutput {
    pub score: f64,
    pub confidence: f64,
}

/// Features par numéro : fréquence lissée, ratio d'écart courant/moyen,
/// masse de récence. Exposé pour que les implémentations de `Predictor`
/// sachent ce qu'elles reçoivent.
pub fn number_features(number: u8, history: &[DrawRecord], rules: GameRules) -> Vec<f64> {
    let size = rules.size();
    let n = history.len();

    let mut count = 0u32;
    let mut last_seen: Option<usize> = None;
    let mut gap_list = Vec::new();
    let mut recency_mass = 0.0f64;

    for (t, record) in history.iter().enumerate() {
        if record.numbers.contains(&number) {
            count += 1;
            if let Some(prev) = last_seen {
                gap_list.push((t - prev) as f64);
            }
            last_seen = Some(t);
            let age = (n - 1 - t) as i32;
            recency_mass += 0.9f64.powi(age);
        }
    }

    let freq = (count as f64 + 1.0) / (n as f64 + size as f64);
    let current_gap = match last_seen {
        Some(t) => (n - 1 - t) as f64,
        None => n as f64,
    };
    let mean_gap = if gap_list.is_empty() {
        size as f64 / rules.pick_count as f64
    } else {
        gap_list.iter().sum::<f64>() / gap_list.len() as f64
    };

    vec![freq, (current_gap + 1.0) / mean_gap.max(1.0), recency_mass]
}

/// Adaptateur : expose un `Predictor` comme une stratégie de scoring
/// ordinaire, avec son propre poids dans l'ensemble.
pub struct PredictorModel {
    inner: Box<dyn Predictor>,
    confidence: f64,
}

impl PredictorModel {
    pub fn new(inner: Box<dyn Predictor>) -> Self {
        Self {
            inner,
            confidence: 0.80,
        }
    }
}

impl ForecastModel for PredictorModel {
    fn name(&self) -> &str {
        "Predictor"
    }

    fn score(&self, history: &[DrawRecord], rules: GameRules) -> Vec<f64> {
        let size = rules.size();
        let scores: Vec<f64> = (1..=rules.pool_size)
            .map(|number| {
                let features = number_features(number, history, rules);
                self.inner.predict(&features).score.max(0.0)
            })
            .collect();
        debug_assert_eq!(scores.len(), size);
        normalize_or_uniform(scores)
    }

    fn confidence(&self) -> f64 {
        self.confidence
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{make_test_history, validate_distribution};
    use parlay_db::models::Game;

    struct ConstantPredictor(f64);

    impl Predictor for ConstantPredictor {
        fn predict(&self, _features: &[f64]) -> PredictorOutput {
            PredictorOutput {
                score: self.0,
                confidence: 0.9,
            }
        }
    }

    struct FrequencyEcho;

    impl Predictor for FrequencyEcho {
        fn predict(&self, features: &[f64]) -> PredictorOutput {
            PredictorOutput {
                score: features[0],
                confidence: 0.9,
            }
        }
    }

    #[test]
    fn test_predictor_model_valid_distribution() {
        let rules = Game::Powerball.rules();
        let model = PredictorModel::new(Box::new(FrequencyEcho));
        let dist = model.score(&make_test_history(20, rules), rules);
        assert!(validate_distribution(&dist, rules));
    }

    #[test]
    fn test_constant_predictor_gives_uniform() {
        let rules = Game::Powerball.rules();
        let model = PredictorModel::new(Box::new(ConstantPredictor(2.5)));
        let dist = model.score(&make_test_history(20, rules), rules);
        let expected = 1.0 / rules.size() as f64;
        for &p in &dist {
            assert!((p - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_negative_scores_clamped() {
        let rules = Game::Powerball.rules();
        let model = PredictorModel::new(Box::new(ConstantPredictor(-1.0)));
        let dist = model.score(&make_test_history(20, rules), rules);
        // Tout à zéro après clamp → repli uniforme, jamais de masse négative.
        assert!(validate_distribution(&dist, rules));
    }

    #[test]
    fn test_number_features_shape() {
        let rules = Game::Powerball.rules();
        let history = make_test_history(15, rules);
        let features = number_features(1, &history, rules);
        assert_eq!(features.len(), 3);
        assert!(features.iter().all(|f| f.is_finite()));
    }
}
