use std::collections::HashMap;

use parlay_db::models::{DrawRecord, GameRules};

use super::{normalize_or_uniform, uniform, ForecastModel};

/// Équilibre chaud/froid : une part fixe de la masse va aux numéros sortis
/// dans la fenêtre récente (proportionnellement à leur fréquence), le reste
/// est réparti uniformément sur les numéros absents de la fenêtre.
pub struct HotColdModel {
    window: usize,
    hot_share: f64,
}

impl HotColdModel {
    pub fn new(window: usize, hot_share: f64) -> Self {
        Self { window, hot_share }
    }
}

impl ForecastModel for HotColdModel {
    fn name(&self) -> &str {
        "HotCold"
    }

    fn score(&self, history: &[DrawRecord], rules: GameRules) -> Vec<f64> {
        let size = rules.size();
        if history.is_empty() {
            return uniform(size);
        }

        let start = history.len().saturating_sub(self.window);
        let recent = &history[start..];

        let mut counts = vec![0u32; size];
        for record in recent {
            for &n in &record.numbers {
                let idx = (n - 1) as usize;
                if idx < size {
                    counts[idx] += 1;
                }
            }
        }

        let hot_total: u32 = counts.iter().sum();
        let cold_count = counts.iter().filter(|&&c| c == 0).count();

        if hot_total == 0 {
            return uniform(size);
        }
        if cold_count == 0 {
            // Tous les numéros sont sortis dans la fenêtre : proportionnel simple.
            return normalize_or_uniform(counts.iter().map(|&c| c as f64).collect());
        }

        let scores: Vec<f64> = counts
            .iter()
            .map(|&c| {
                if c > 0 {
                    self.hot_share * c as f64 / hot_total as f64
                } else {
                    (1.0 - self.hot_share) / cold_count as f64
                }
            })
            .collect();

        normalize_or_uniform(scores)
    }

    fn confidence(&self) -> f64 {
        0.82
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("window".to_string(), self.window as f64),
            ("hot_share".to_string(), self.hot_share),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{make_test_history, validate_distribution};
    use parlay_db::models::Game;

    #[test]
    fn test_hot_cold_sums_to_one() {
        let rules = Game::Powerball.rules();
        let model = HotColdModel::new(20, 0.6);
        let dist = model.score(&make_test_history(30, rules), rules);
        assert!(validate_distribution(&dist, rules));
    }

    #[test]
    fn test_hot_cold_uniform_empty() {
        let rules = Game::Powerball.rules();
        let dist = HotColdModel::new(20, 0.6).score(&[], rules);
        let expected = 1.0 / rules.size() as f64;
        for &p in &dist {
            assert!((p - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_hot_cold_mass_split() {
        let rules = Game::Powerball.rules();
        let history = vec![DrawRecord {
            date: "2024-01-01".to_string(),
            numbers: vec![1, 2, 3, 4, 5],
            bonus: None,
            jackpot: 0.0,
        }];
        let dist = HotColdModel::new(20, 0.6).score(&history, rules);

        // 60% de la masse sur les 5 numéros chauds, 40% sur les 64 froids.
        let hot_mass: f64 = dist[..5].iter().sum();
        assert!((hot_mass - 0.6).abs() < 1e-9, "masse chaude = {}", hot_mass);
        // Chaque numéro chaud pèse plus que chaque numéro froid.
        assert!(dist[0] > dist[10]);
    }

    #[test]
    fn test_hot_cold_window_bounds_lookback() {
        let rules = Game::Powerball.rules();
        let mut history: Vec<DrawRecord> = (0..30)
            .map(|i| DrawRecord {
                date: format!("2024-01-{:02}", (i % 28) + 1),
                numbers: vec![50, 51, 52, 53, 54],
                bonus: None,
                jackpot: 0.0,
            })
            .collect();
        // Les 3 derniers tirages ne contiennent que des petits numéros.
        for record in history.iter_mut().rev().take(3) {
            record.numbers = vec![1, 2, 3, 4, 5];
        }

        let dist = HotColdModel::new(3, 0.6).score(&history, rules);
        // Avec une fenêtre de 3, les numéros 50-54 sont froids malgré 27 sorties.
        assert!(dist[0] > dist[49]);
    }
}
