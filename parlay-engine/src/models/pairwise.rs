use std::collections::HashMap;

use parlay_db::models::{DrawRecord, GameRules};

use super::{normalize_or_uniform, uniform, ForecastModel};

/// Co-occurrence par paires : un numéro gagne de la masse quand il sort
/// historiquement dans les mêmes tirages que des numéros eux-mêmes
/// fréquents.
pub struct PairwiseModel {
    freq_share: f64,
}

impl PairwiseModel {
    pub fn new() -> Self {
        Self { freq_share: 0.6 }
    }
}

impl Default for PairwiseModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastModel for PairwiseModel {
    fn name(&self) -> &str {
        "Pairwise"
    }

    fn score(&self, history: &[DrawRecord], rules: GameRules) -> Vec<f64> {
        let size = rules.size();
        if history.is_empty() {
            return uniform(size);
        }

        let mut counts = vec![0.0f64; size];
        let mut pairs = vec![vec![0.0f64; size]; size];

        for record in history {
            for &n in &record.numbers {
                let idx = (n - 1) as usize;
                if idx < size {
                    counts[idx] += 1.0;
                }
            }
            for i in 0..record.numbers.len() {
                for j in (i + 1)..record.numbers.len() {
                    let a = (record.numbers[i] - 1) as usize;
                    let b = (record.numbers[j] - 1) as usize;
                    if a < size && b < size {
                        pairs[a][b] += 1.0;
                        pairs[b][a] += 1.0;
                    }
                }
            }
        }

        // Masse de co-occurrence : somme des paires pondérée par la
        // fréquence du partenaire.
        let co_mass: Vec<f64> = (0..size)
            .map(|i| (0..size).map(|j| pairs[i][j] * counts[j]).sum())
            .collect();

        let freq_norm = normalize_or_uniform(counts.iter().map(|&c| c + 1.0).collect());
        let co_norm = normalize_or_uniform(co_mass.iter().map(|&c| c + 1.0).collect());

        let scores: Vec<f64> = freq_norm
            .iter()
            .zip(co_norm.iter())
            .map(|(&f, &c)| self.freq_share * f + (1.0 - self.freq_share) * c)
            .collect();

        normalize_or_uniform(scores)
    }

    fn confidence(&self) -> f64 {
        0.76
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([("freq_share".to_string(), self.freq_share)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{make_test_history, validate_distribution};
    use parlay_db::models::Game;

    fn record(numbers: Vec<u8>) -> DrawRecord {
        DrawRecord {
            date: "2024-01-01".to_string(),
            numbers,
            bonus: None,
            jackpot: 0.0,
        }
    }

    #[test]
    fn test_pairwise_sums_to_one() {
        let rules = Game::Powerball.rules();
        let dist = PairwiseModel::new().score(&make_test_history(30, rules), rules);
        assert!(validate_distribution(&dist, rules));
    }

    #[test]
    fn test_pairwise_uniform_empty() {
        let rules = Game::Powerball.rules();
        let dist = PairwiseModel::new().score(&[], rules);
        let expected = 1.0 / rules.size() as f64;
        for &p in &dist {
            assert!((p - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_pairwise_boosts_companions_of_frequent_numbers() {
        let rules = Game::Powerball.rules();
        // 7 et 14 sortent toujours ensemble ; 60 sort autant que 14 mais
        // accompagné de numéros rares à chaque fois.
        let mut history = vec![
            record(vec![7, 14, 21, 28, 35]),
            record(vec![7, 14, 21, 28, 35]),
            record(vec![7, 14, 21, 28, 35]),
        ];
        history.push(record(vec![60, 2, 3, 4, 5]));
        history.push(record(vec![60, 8, 9, 10, 11]));
        history.push(record(vec![60, 12, 13, 15, 16]));

        let dist = PairwiseModel::new().score(&history, rules);
        assert!(
            dist[13] > dist[59],
            "14 (co-occurrences fortes) doit dominer 60 (partenaires rares)"
        );
    }
}
