use serde::{Deserialize, Serialize};

use crate::error::PredictError;

/// Sens de l'effet "retard" : un grand écart relatif rend-il un numéro
/// plus probable (Overdue) ou moins probable (Fresh) ? Aucune donnée réelle
/// ne tranche la question ; c'est un choix de configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapDirection {
    Overdue,
    Fresh,
}

/// Configuration explicite du moteur. Validée une fois à l'entrée,
/// jamais re-vérifiée en profondeur.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Facteur de décroissance du modèle de récence (0.9–0.95 typique).
    pub decay: f64,
    /// Fenêtre du modèle hot/cold (en tirages).
    pub hot_window: usize,
    /// Part de masse attribuée aux numéros chauds (le reste va aux froids).
    pub hot_share: f64,
    /// Exposant du modèle de retard.
    pub gap_gamma: f64,
    pub gap_direction: GapDirection,
    /// Compteurs d'itérations hérités de l'ancienne implémentation.
    /// Purement cosmétiques : les deux modèles concernés sont calculés
    /// en forme close, le résultat ne dépend pas de ces valeurs.
    pub markov_iterations: u64,
    pub monte_carlo_iterations: u64,
    /// En dessous de ce nombre de tirages, l'historique est jugé maigre :
    /// la confiance agrégée est réduite et le forecast est marqué.
    pub min_history: usize,
    pub thin_history_factor: f64,
    /// Bornes de la confiance agrégée. Le plafond existe parce que rien
    /// dans ce domaine ne justifie une certitude non bornée.
    pub confidence_floor: f64,
    pub confidence_cap: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            decay: 0.95,
            hot_window: 20,
            hot_share: 0.6,
            gap_gamma: 1.5,
            gap_direction: GapDirection::Overdue,
            markov_iterations: 750_000,
            monte_carlo_iterations: 1_000_000,
            min_history: 10,
            thin_history_factor: 0.85,
            confidence_floor: 0.35,
            confidence_cap: 0.90,
        }
    }
}

impl EnsembleConfig {
    pub fn validate(&self) -> Result<(), PredictError> {
        if !(0.0 < self.decay && self.decay < 1.0) {
            return Err(PredictError::InvalidConfig(format!(
                "decay doit être dans ]0,1[, reçu {}",
                self.decay
            )));
        }
        if !(0.0..=1.0).contains(&self.hot_share) {
            return Err(PredictError::InvalidConfig(format!(
                "hot_share doit être dans [0,1], reçu {}",
                self.hot_share
            )));
        }
        if self.gap_gamma <= 0.0 {
            return Err(PredictError::InvalidConfig(format!(
                "gap_gamma doit être strictement positif, reçu {}",
                self.gap_gamma
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_floor)
            || !(0.0..=1.0).contains(&self.confidence_cap)
            || self.confidence_floor >= self.confidence_cap
        {
            return Err(PredictError::InvalidConfig(format!(
                "bornes de confiance incohérentes : [{}, {}]",
                self.confidence_floor, self.confidence_cap
            )));
        }
        if !(0.0..=1.0).contains(&self.thin_history_factor) {
            return Err(PredictError::InvalidConfig(format!(
                "thin_history_factor doit être dans [0,1], reçu {}",
                self.thin_history_factor
            )));
        }
        Ok(())
    }
}
