use std::collections::HashMap;

use parlay_db::models::{DrawRecord, GameRules};

use crate::config::GapDirection;

use super::{normalize_or_uniform, uniform, ForecastModel};

/// Modèle de retard : compare l'écart courant d'un numéro (tirages depuis sa
/// dernière sortie) à son écart moyen historique. Le sens de l'effet est
/// configurable : Overdue favorise les grands écarts relatifs, Fresh les
/// petits.
pub struct GapModel {
    gamma: f64,
    direction: GapDirection,
}

impl GapModel {
    pub fn new(gamma: f64, direction: GapDirection) -> Self {
        Self { gamma, direction }
    }
}

impl ForecastModel for GapModel {
    fn name(&self) -> &str {
        "Gap"
    }

    fn score(&self, history: &[DrawRecord], rules: GameRules) -> Vec<f64> {
        let size = rules.size();
        if history.is_empty() {
            return uniform(size);
        }

        // Écart courant : nombre de tirages depuis la dernière apparition,
        // en comptant depuis la fin (le plus récent).
        let mut gaps = vec![history.len(); size];
        for (t, record) in history.iter().enumerate() {
            let age = history.len() - 1 - t;
            for &n in &record.numbers {
                let idx = (n - 1) as usize;
                if idx < size && age < gaps[idx] {
                    gaps[idx] = age;
                }
            }
        }

        // Écart moyen entre apparitions successives.
        let mut mean_gaps = vec![0.0f64; size];
        for i in 0..size {
            let number = (i + 1) as u8;
            let mut gap_list = Vec::new();
            let mut last_seen: Option<usize> = None;

            for (t, record) in history.iter().enumerate() {
                if record.numbers.contains(&number) {
                    if let Some(prev) = last_seen {
                        gap_list.push((t - prev) as f64);
                    }
                    last_seen = Some(t);
                }
            }

            mean_gaps[i] = if gap_list.is_empty() {
                // Estimation par le ratio théorique pool/tirage.
                size as f64 / rules.pick_count as f64
            } else {
                gap_list.iter().sum::<f64>() / gap_list.len() as f64
            };
        }

        let exponent = match self.direction {
            GapDirection::Overdue => self.gamma,
            GapDirection::Fresh => -self.gamma,
        };

        let scores: Vec<f64> = (0..size)
            .map(|i| {
                let ratio = (gaps[i] as f64 + 1.0) / mean_gaps[i].max(1.0);
                ratio.powf(exponent)
            })
            .collect();

        normalize_or_uniform(scores)
    }

    fn confidence(&self) -> f64 {
        0.75
    }

    fn params(&self) -> HashMap<String, f64> {
        let direction = match self.direction {
            GapDirection::Overdue => 1.0,
            GapDirection::Fresh => -1.0,
        };
        HashMap::from([
            ("gamma".to_string(), self.gamma),
            ("direction".to_string(), direction),
        ])
    }
}
