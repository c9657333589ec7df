use std::collections::HashMap;

use parlay_db::models::{DrawRecord, GameRules};

use super::{normalize_or_uniform, ForecastModel};

/// Pondération exponentielle de récence : poids = decay^âge, âge 0 pour le
/// tirage le plus récent (dernier élément de l'historique).
pub struct EwmaModel {
    decay: f64,
}

impl EwmaModel {
    pub fn new(decay: f64) -> Self {
        Self { decay }
    }
}

impl ForecastModel for EwmaModel {
    fn name(&self) -> &str {
        "Recency"
    }

    fn score(&self, history: &[DrawRecord], rules: GameRules) -> Vec<f64> {
        let size = rules.size();
        let mut scores = vec![0.0f64; size];

        // Plancher pour qu'aucun numéro ne descende à une masse nulle.
        let floor = self.decay.powi(history.len() as i32 + 1);

        for (t, record) in history.iter().enumerate() {
            let age = (history.len() - 1 - t) as i32;
            let weight = self.decay.powi(age);
            for &n in &record.numbers {
                let idx = (n - 1) as usize;
                if idx < size {
                    scores[idx] += weight;
                }
            }
        }

        for score in &mut scores {
            if *score < floor {
                *score = floor;
            }
        }

        normalize_or_uniform(scores)
    }

    fn confidence(&self) -> f64 {
        0.78
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([("decay".to_string(), self.decay)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{make_test_history, validate_distribution};
    use parlay_db::models::Game;

    fn record(date: &str, numbers: Vec<u8>) -> DrawRecord {
        DrawRecord {
            date: date.to_string(),
            numbers,
            bonus: None,
            jackpot: 0.0,
        }
    }

    #[test]
    fn test_ewma_sums_to_one() {
        let rules = Game::Powerball.rules();
        let model = EwmaModel::new(0.95);
        let dist = model.score(&make_test_history(20, rules), rules);
        assert!(validate_distribution(&dist, rules));
    }

    #[test]
    fn test_ewma_uniform_empty() {
        let rules = Game::Powerball.rules();
        let dist = EwmaModel::new(0.95).score(&[], rules);
        let expected = 1.0 / rules.size() as f64;
        for &p in &dist {
            assert!((p - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_ewma_recent_higher() {
        let rules = Game::Powerball.rules();
        // Le plus ancien en premier : les numéros 6-10 sont les plus récents.
        let history = vec![
            record("2024-01-01", vec![1, 2, 3, 4, 5]),
            record("2024-01-02", vec![6, 7, 8, 9, 10]),
        ];
        let dist = EwmaModel::new(0.9).score(&history, rules);
        assert!(
            dist[5] > dist[0],
            "Le numéro 6 (récent) doit dominer le numéro 1 (ancien)"
        );
    }

    #[test]
    fn test_ewma_order_dependent() {
        // Inverser l'historique doit changer le résultat : la dépendance à
        // l'ordre est réelle, pas accidentelle.
        let rules = Game::Powerball.rules();
        let history = vec![
            record("2024-01-01", vec![1, 2, 3, 4, 5]),
            record("2024-01-02", vec![6, 7, 8, 9, 10]),
            record("2024-01-03", vec![11, 12, 13, 14, 15]),
        ];
        let mut reversed = history.clone();
        reversed.reverse();

        let forward = EwmaModel::new(0.9).score(&history, rules);
        let backward = EwmaModel::new(0.9).score(&reversed, rules);
        assert_ne!(forward, backward);
        // En ordre direct, 11 (le plus récent) domine 1 ; inversé, c'est l'opposé.
        assert!(forward[10] > forward[0]);
        assert!(backward[0] > backward[10]);
    }
}
