use std::collections::HashMap;

use parlay_db::models::{DrawRecord, GameRules};

use super::{uniform, ForecastModel};

/// Ligne de base Monte Carlo. La fréquence d'apparition d'un numéro sur M
/// tirages uniformes de sous-ensembles de taille K converge vers K/N pour
/// tout le monde : la forme close est exactement la distribution uniforme.
/// Signal plat et peu informatif, volontairement — `iterations` est un
/// héritage cosmétique sans effet sur le résultat.
pub struct MonteCarloModel {
    iterations: u64,
}

impl MonteCarloModel {
    pub fn new(iterations: u64) -> Self {
        Self { iterations }
    }
}

impl ForecastModel for MonteCarloModel {
    fn name(&self) -> &str {
        "MonteCarlo"
    }

    fn score(&self, _history: &[DrawRecord], rules: GameRules) -> Vec<f64> {
        uniform(rules.size())
    }

    fn confidence(&self) -> f64 {
        0.70
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([("iterations".to_string(), self.iterations as f64)])
    }
}
