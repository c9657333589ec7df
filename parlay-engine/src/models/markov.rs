use std::collections::HashMap;

use parlay_db::models::{DrawRecord, GameRules};

use super::{normalize_or_uniform, uniform, ForecastModel};

/// Vraisemblance de transition : table de comptages numéro→numéro entre
/// tirages consécutifs, prédiction = espérance à un pas depuis le tirage le
/// plus récent. C'est la forme close de l'ancien échantillonnage de chaînes
/// (la fréquence de visite des chaînes converge vers cette espérance) ;
/// `iterations` ne survit que comme paramètre cosmétique.
pub struct MarkovModel {
    iterations: u64,
}

impl MarkovModel {
    pub fn new(iterations: u64) -> Self {
        Self { iterations }
    }
}

impl ForecastModel for MarkovModel {
    fn name(&self) -> &str {
        "Markov"
    }

    fn score(&self, history: &[DrawRecord], rules: GameRules) -> Vec<f64> {
        let size = rules.size();
        if history.len() < 2 {
            return uniform(size);
        }

        // transitions[i][j] : numéro i au tirage t, numéro j au tirage t+1.
        let mut transitions = vec![vec![0.0f64; size]; size];
        let mut from_counts = vec![0.0f64; size];

        for window in history.windows(2) {
            let (current, next) = (&window[0], &window[1]);
            for &from in &current.numbers {
                let fi = (from - 1) as usize;
                if fi >= size {
                    continue;
                }
                from_counts[fi] += 1.0;
                for &to in &next.numbers {
                    let ti = (to - 1) as usize;
                    if ti < size {
                        transitions[fi][ti] += 1.0;
                    }
                }
            }
        }

        // Lignes normalisées ; ligne uniforme pour un numéro jamais vu en
        // source (le repli aléatoire de l'ancienne chaîne).
        let latest = &history[history.len() - 1];
        let mut scores = vec![0.0f64; size];
        for &from in &latest.numbers {
            let fi = (from - 1) as usize;
            if fi >= size {
                continue;
            }
            if from_counts[fi] > 0.0 {
                for j in 0..size {
                    scores[j] += transitions[fi][j] / from_counts[fi];
                }
            } else {
                for score in scores.iter_mut() {
                    *score += 1.0 / size as f64;
                }
            }
        }

        // Lissage léger pour ne jamais exclure un numéro.
        let smoothing = 1.0 / (size as f64 * 10.0);
        for score in scores.iter_mut() {
            *score += smoothing;
        }

        normalize_or_uniform(scores)
    }

    fn confidence(&self) -> f64 {
        0.73
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([("iterations".to_string(), self.iterations as f64)])
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
    fn test_markov_sums_to_one() {
        let rules = Game::Powerball.rules();
        let dist = MarkovModel::new(750_000).score(&make_test_history(30, rules), rules);
        assert!(validate_distribution(&dist, rules));
    }

    #[test]
    fn test_markov_uniform_on_short_history() {
        let rules = Game::Powerball.rules();
        let expected = 1.0 / rules.size() as f64;
        for history in [vec![], vec![record(vec![1, 2, 3, 4, 5])]] {
            let dist = MarkovModel::new(750_000).score(&history, rules);
            for &p in &dist {
                assert!((p - expected).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_markov_follows_observed_transitions() {
        let rules = Game::Powerball.rules();
        // Chaque tirage {1..5} est systématiquement suivi de {11..15}.
        let mut history = Vec::new();
        for _ in 0..10 {
            history.push(record(vec![1, 2, 3, 4, 5]));
            history.push(record(vec![11, 12, 13, 14, 15]));
        }
        // Dernier tirage : {1..5}. La transition apprise pointe vers {11..15}.
        history.push(record(vec![1, 2, 3, 4, 5]));

        let dist = MarkovModel::new(750_000).score(&history, rules);
        assert!(
            dist[10] > dist[20],
            "11 (transition observée) doit dominer 21 (jamais en cible)"
        );
    }

    #[test]
    fn test_markov_iterations_knob_is_cosmetic() {
        let rules = Game::Powerball.rules();
        let history = make_test_history(30, rules);
        let a = MarkovModel::new(1).score(&history, rules);
        let b = MarkovModel::new(750_000).score(&history, rules);
        assert_eq!(a, b);
    }
}
