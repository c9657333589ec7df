pub mod ewma;
pub mod frequency;
pub mod gap;
pub mod hot_cold;
pub mod markov;
pub mod monte_carlo;
pub mod pairwise;
pub mod predictor;

use std::collections::HashMap;

use parlay_db::models::{DrawRecord, GameRules};

use crate::config::EnsembleConfig;

pub trait ForecastModel: Send + Sync {
    fn name(&self) -> &str;

    /// `history` est ordonné du plus ancien au plus récent (le dernier élément
    /// est le tirage le plus récent). Retourne une distribution de taille
    /// `rules.size()`, somme = 1.0. Un historique vide n'est jamais une
    /// erreur : le modèle dégrade vers l'uniforme.
    fn score(&self, history: &[DrawRecord], rules: GameRules) -> Vec<f64>;

    /// Confiance auto-déclarée du modèle, pondérée par l'agrégateur.
    fn confidence(&self) -> f64;

    fn params(&self) -> HashMap<String, f64>;

    /// Un modèle doit être déterministe pour des entrées données, ou se
    /// déclarer ici. Tous les modèles livrés sont en forme close, donc
    /// déterministes.
    fn is_stochastic(&self) -> bool {
        false
    }
}

pub fn uniform(size: usize) -> Vec<f64> {
    vec![1.0 / size as f64; size]
}

/// Normalise des scores bruts en distribution ; retombe sur l'uniforme
/// quand la masse totale est nulle.
pub fn normalize_or_uniform(mut scores: Vec<f64>) -> Vec<f64> {
    let total: f64 = scores.iter().sum();
    if total > 0.0 {
        for s in &mut scores {
            *s /= total;
        }
        scores
    } else {
        uniform(scores.len())
    }
}

pub fn validate_distribution(dist: &[f64], rules: GameRules) -> bool {
    if dist.len() != rules.size() {
        return false;
    }
    if dist.iter().any(|&p| p < 0.0) {
        return false;
    }
    let sum: f64 = dist.iter().sum();
    (sum - 1.0).abs() < 1e-9
}

/// La pile de modèles par défaut, dans l'ordre des poids de
/// `default_weights`.
pub fn all_models(config: &EnsembleConfig) -> Vec<Box<dyn ForecastModel>> {
    vec![
        Box::new(frequency::FrequencyModel::new(1.0)),
        Box::new(ewma::EwmaModel::new(config.decay)),
        Box::new(hot_cold::HotColdModel::new(config.hot_window, config.hot_share)),
        Box::new(gap::GapModel::new(config.gap_gamma, config.gap_direction)),
        Box::new(pairwise::PairwiseModel::new()),
        Box::new(markov::MarkovModel::new(config.markov_iterations)),
        Box::new(monte_carlo::MonteCarloModel::new(config.monte_carlo_iterations)),
    ]
}

/// Poids par défaut, alignés sur l'ordre de `all_models`. Somme = 1.0.
pub fn default_weights() -> Vec<f64> {
    vec![0.20, 0.16, 0.15, 0.14, 0.12, 0.13, 0.10]
}

/// Historique synthétique déterministe pour les tests : fenêtres de numéros
/// consécutifs qui glissent avec l'indice du tirage.
pub fn make_test_history(n: usize, rules: GameRules) -> Vec<DrawRecord> {
    let k = rules.pick_count;
    let size = rules.size();
    (0..n)
        .map(|i| {
            let start = ((i % 10) * k) % (size - k + 1);
            let numbers: Vec<u8> = (0..k).map(|j| (start + j + 1) as u8).collect();
            let bonus = rules.bonus_size.map(|max| ((i % max as usize) + 1) as u8);
            DrawRecord {
                date: format!("2024-01-{:02}", (i % 28) + 1),
                numbers,
                bonus,
                jackpot: 0.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlay_db::models::Game;

    #[test]
    fn test_validate_distribution_valid() {
        let rules = Game::Powerball.rules();
        let dist = uniform(rules.size());
        assert!(validate_distribution(&dist, rules));
    }

    #[test]
    fn test_validate_distribution_wrong_size() {
        let rules = Game::Powerball.rules();
        let dist = uniform(rules.size() - 1);
        assert!(!validate_distribution(&dist, rules));
    }

    #[test]
    fn test_validate_distribution_negative() {
        let rules = Game::Powerball.rules();
        let mut dist = uniform(rules.size());
        dist[0] = -0.1;
        assert!(!validate_distribution(&dist, rules));
    }

    #[test]
    fn test_normalize_or_uniform_zero_mass() {
        let dist = normalize_or_uniform(vec![0.0; 10]);
        for &p in &dist {
            assert!((p - 0.1).abs() < 1e-12);
        }
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let sum: f64 = default_weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12, "somme = {}", sum);
    }

    #[test]
    fn test_default_weights_aligned_with_models() {
        let models = all_models(&EnsembleConfig::default());
        assert_eq!(models.len(), default_weights().len());
    }

    #[test]
    fn test_make_test_history_valid_records() {
        let rules = Game::TexasLotto.rules();
        let history = make_test_history(30, rules);
        assert_eq!(history.len(), 30);
        for record in &history {
            assert!(parlay_db::models::validate_record(record, rules).is_ok());
        }
    }

    #[test]
    fn test_all_models_deterministic() {
        let rules = Game::Powerball.rules();
        let history = make_test_history(25, rules);
        for model in all_models(&EnsembleConfig::default()) {
            assert!(!model.is_stochastic(), "{}", model.name());
            let a = model.score(&history, rules);
            let b = model.score(&history, rules);
            assert_eq!(a, b, "{} n'est pas déterministe", model.name());
        }
    }

    #[test]
    fn test_all_models_uniform_on_empty_history() {
        let rules = Game::Powerball.rules();
        let expected = 1.0 / rules.size() as f64;
        for model in all_models(&EnsembleConfig::default()) {
            let dist = model.score(&[], rules);
            for &p in &dist {
                assert!(
                    (p - expected).abs() < 1e-10,
                    "{} ne dégrade pas vers l'uniforme",
                    model.name()
                );
            }
        }
    }

    #[test]
    fn test_all_models_return_valid_distributions() {
        let rules = Game::MegaMillions.rules();
        let history = make_test_history(40, rules);
        for model in all_models(&EnsembleConfig::default()) {
            let dist = model.score(&history, rules);
            assert!(
                validate_distribution(&dist, rules),
                "{} : somme = {}, len = {}",
                model.name(),
                dist.iter().sum::<f64>(),
                dist.len()
            );
        }
    }
}
