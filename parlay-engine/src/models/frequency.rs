use std::collections::HashMap;

use parlay_db::models::{DrawRecord, GameRules};

use super::ForecastModel;

/// Comptage d'apparitions lissé par un prior Dirichlet symétrique.
pub struct FrequencyModel {
    alpha: f64,
}

impl FrequencyModel {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl ForecastModel for FrequencyModel {
    fn name(&self) -> &str {
        "Frequency"
    }

    fn score(&self, history: &[DrawRecord], rules: GameRules) -> Vec<f64> {
        let size = rules.size();
        let mut counts = vec![0u32; size];

        for record in history {
            for &n in &record.numbers {
                let idx = (n - 1) as usize;
                if idx < size {
                    counts[idx] += 1;
                }
            }
        }

        let total: u32 = counts.iter().sum();
        let denominator = size as f64 * self.alpha + total as f64;

        counts
            .iter()
            .map(|&count| (self.alpha + count as f64) / denominator)
            .collect()
    }

    fn confidence(&self) -> f64 {
        0.85
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([("alpha".to_string(), self.alpha)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{make_test_history, validate_distribution};
    use parlay_db::models::Game;

    #[test]
    fn test_frequency_sums_to_one() {
        let rules = Game::Powerball.rules();
        let model = FrequencyModel::new(1.0);
        let dist = model.score(&make_test_history(20, rules), rules);
        assert!(validate_distribution(&dist, rules));
    }

    #[test]
    fn test_frequency_uniform_empty() {
        let rules = Game::Powerball.rules();
        let model = FrequencyModel::new(1.0);
        let dist = model.score(&[], rules);
        let expected = 1.0 / rules.size() as f64;
        for &p in &dist {
            assert!((p - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_frequency_favors_repeated_numbers() {
        let rules = Game::Powerball.rules();
        let history: Vec<DrawRecord> = (0..10)
            .map(|i| DrawRecord {
                date: format!("2024-01-{:02}", i + 1),
                numbers: vec![7, 14, 21, 28, 35],
                bonus: None,
                jackpot: 0.0,
            })
            .collect();
        let dist = FrequencyModel::new(1.0).score(&history, rules);
        // Le numéro 7 (tiré 10 fois) doit dominer le numéro 1 (jamais tiré).
        assert!(dist[6] > dist[0]);
    }
}
