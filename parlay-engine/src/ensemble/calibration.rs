use serde::{Deserialize, Serialize};
use tracing::info;

use parlay_db::models::{DrawRecord, GameRules};

use crate::models::ForecastModel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub model_name: String,
    pub window: usize,
    pub log_likelihood: f64,
    pub n_tests: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCalibration {
    pub model_name: String,
    pub results: Vec<CalibrationResult>,
    pub best_window: usize,
    pub best_ll: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleWeights {
    pub game: String,
    pub weights: Vec<(String, f64)>,
    pub calibrations: Vec<ModelCalibration>,
}

/// Évaluation walk-forward : pour chaque tirage test t, on entraîne sur la
/// fenêtre de tirages STRICTEMENT antérieurs à t et on mesure la
/// log-vraisemblance sur le tirage t. Pas de fuite du futur.
///
/// L'historique est ordonné du plus ancien au plus récent.
pub fn walk_forward_evaluate(
    model: &dyn ForecastModel,
    history: &[DrawRecord],
    window: usize,
    rules: GameRules,
) -> f64 {
    if history.len() <= window {
        return f64::NEG_INFINITY;
    }

    // Limiter à ~100 points de test avec un stride pour la performance.
    let candidates = history.len() - window;
    let max_tests = 100;
    let stride = (candidates / max_tests).max(1);

    let mut total_ll = 0.0f64;
    let mut n_tests = 0usize;

    let mut t = window;
    while t < history.len() {
        let train = &history[t - window..t];
        if train.len() >= 3 {
            let dist = model.score(train, rules);

            let mut draw_ll = 0.0f64;
            for &n in &history[t].numbers {
                let idx = (n - 1) as usize;
                if idx < dist.len() {
                    let p = dist[idx].max(1e-15); // Éviter log(0)
                    draw_ll += p.ln();
                }
            }

            total_ll += draw_ll;
            n_tests += 1;
        }
        t += stride;
    }

    if n_tests > 0 {
        total_ll / n_tests as f64
    } else {
        f64::NEG_INFINITY
    }
}

/// Log-vraisemblance de la distribution uniforme pour un jeu donné.
pub fn uniform_log_likelihood(rules: GameRules) -> f64 {
    let p = 1.0 / rules.size() as f64;
    rules.pick_count as f64 * p.ln()
}

/// Poids de l'ensemble à partir des calibrations : skill = LL − LL uniforme,
/// les modèles sous l'uniforme reçoivent 0. Repli équipondéré quand aucun
/// modèle ne bat l'uniforme.
pub fn compute_weights(calibrations: &[ModelCalibration], rules: GameRules) -> Vec<(String, f64)> {
    let uniform_ll = uniform_log_likelihood(rules);

    let skills: Vec<f64> = calibrations
        .iter()
        .map(|c| {
            let skill = c.best_ll - uniform_ll;
            if skill > 0.0 {
                skill
            } else {
                0.0
            }
        })
        .collect();

    let total_skill: f64 = skills.iter().sum();

    if total_skill > 0.0 {
        calibrations
            .iter()
            .zip(skills.iter())
            .map(|(c, &skill)| (c.model_name.clone(), skill / total_skill))
            .collect()
    } else {
        let n = calibrations.len() as f64;
        calibrations
            .iter()
            .map(|c| (c.model_name.clone(), 1.0 / n))
            .collect()
    }
}

pub fn calibrate_model(
    model: &dyn ForecastModel,
    history: &[DrawRecord],
    windows: &[usize],
    rules: GameRules,
) -> ModelCalibration {
    let mut results = Vec::new();
    let mut best_ll = f64::NEG_INFINITY;
    let mut best_window = windows[0];

    for &window in windows {
        let ll = walk_forward_evaluate(model, history, window, rules);
        let n_tests = history.len().saturating_sub(window);

        results.push(CalibrationResult {
            model_name: model.name().to_string(),
            window,
            log_likelihood: ll,
            n_tests,
        });

        if ll > best_ll {
            best_ll = ll;
            best_window = window;
        }
    }

    info!(
        model = model.name(),
        best_window, best_ll, "modèle calibré"
    );

    ModelCalibration {
        model_name: model.name().to_string(),
        results,
        best_window,
        best_ll,
    }
}

pub fn save_weights(weights: &EnsembleWeights, path: &std::path::Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(weights)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_weights(path: &std::path::Path) -> anyhow::Result<EnsembleWeights> {
    let json = std::fs::read_to_string(path)?;
    let weights: EnsembleWeights = serde_json::from_str(&json)?;
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frequency::FrequencyModel;
    use crate::models::make_test_history;
    use parlay_db::models::Game;

    #[test]
    fn test_walk_forward_returns_finite() {
        let rules = Game::Powerball.rules();
        let history = make_test_history(50, rules);
        let model = FrequencyModel::new(1.0);
        let ll = walk_forward_evaluate(&model, &history, 20, rules);
        assert!(ll.is_finite(), "LL devrait être finie, reçu {}", ll);
    }

    #[test]
    fn test_walk_forward_too_few_draws() {
        let rules = Game::Powerball.rules();
        let history = make_test_history(5, rules);
        let model = FrequencyModel::new(1.0);
        let ll = walk_forward_evaluate(&model, &history, 10, rules);
        assert_eq!(ll, f64::NEG_INFINITY);
    }

    #[test]
    fn test_uniform_ll_range() {
        let rules = Game::Powerball.rules();
        let ll = uniform_log_likelihood(rules);
        // 5 × ln(1/69) ≈ -21.2
        assert!(ll < 0.0);
        assert!(ll > -30.0);
    }

    #[test]
    fn test_compute_weights_sum_to_one() {
        let rules = Game::Powerball.rules();
        let calibrations = vec![
            ModelCalibration {
                model_name: "A".to_string(),
                results: vec![],
                best_window: 20,
                best_ll: -15.0,
            },
            ModelCalibration {
                model_name: "B".to_string(),
                results: vec![],
                best_window: 30,
                best_ll: -18.0,
            },
        ];
        let weights = compute_weights(&calibrations, rules);
        let sum: f64 = weights.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-10, "somme = {}", sum);
    }

    #[test]
    fn test_compute_weights_zero_for_below_uniform() {
        let rules = Game::Powerball.rules();
        let uniform_ll = uniform_log_likelihood(rules);
        let calibrations = vec![
            ModelCalibration {
                model_name: "Good".to_string(),
                results: vec![],
                best_window: 20,
                best_ll: uniform_ll + 1.0,
            },
            ModelCalibration {
                model_name: "Bad".to_string(),
                results: vec![],
                best_window: 30,
                best_ll: uniform_ll - 1.0,
            },
        ];
        let weights = compute_weights(&calibrations, rules);
        let bad_weight = weights.iter().find(|(n, _)| n == "Bad").unwrap().1;
        assert_eq!(bad_weight, 0.0, "un modèle sous l'uniforme doit peser 0");
    }

    #[test]
    fn test_compute_weights_uniform_fallback() {
        let rules = Game::Powerball.rules();
        let uniform_ll = uniform_log_likelihood(rules);
        let calibrations = vec![
            ModelCalibration {
                model_name: "A".to_string(),
                results: vec![],
                best_window: 20,
                best_ll: uniform_ll - 2.0,
            },
            ModelCalibration {
                model_name: "B".to_string(),
                results: vec![],
                best_window: 20,
                best_ll: uniform_ll - 1.0,
            },
        ];
        let weights = compute_weights(&calibrations, rules);
        assert!((weights[0].1 - 0.5).abs() < 1e-12);
        assert!((weights[1].1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_calibrate_model_tracks_best_window() {
        let rules = Game::Powerball.rules();
        let history = make_test_history(60, rules);
        let model = FrequencyModel::new(1.0);
        let cal = calibrate_model(&model, &history, &[10, 20, 30], rules);
        assert_eq!(cal.model_name, "Frequency");
        assert_eq!(cal.results.len(), 3);
        assert!(cal
            .results
            .iter()
            .any(|r| r.window == cal.best_window && r.log_likelihood == cal.best_ll));
    }

    #[test]
    fn test_weights_json_roundtrip() {
        let weights = EnsembleWeights {
            game: "powerball".to_string(),
            weights: vec![("A".to_string(), 0.5), ("B".to_string(), 0.5)],
            calibrations: vec![],
        };
        let json = serde_json::to_string(&weights).unwrap();
        let loaded: EnsembleWeights = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.game, "powerball");
        assert_eq!(loaded.weights.len(), 2);
        assert_eq!(loaded.weights[1].1, 0.5);
    }
}
