use crate::config::EnsembleConfig;

/// Modèle de confiance borné : base + pente × |distance à la ligne|,
/// serré entre un plancher et un plafond. Le plafond tient pour N'IMPORTE
/// QUELLE distance — déborder vers une certitude apparente est le bug le
/// plus visible pour l'utilisateur, donc l'invariant le plus important ici.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceParams {
    pub base: f64,
    pub per_unit: f64,
    pub floor: f64,
    pub cap: f64,
}

impl ConfidenceParams {
    /// Totaux de match (over/under) : 0.65 + 0.02/point, plafond 0.95.
    pub const GAME_TOTALS: ConfidenceParams = ConfidenceParams {
        base: 0.65,
        per_unit: 0.02,
        floor: 0.50,
        cap: 0.95,
    };

    /// Écart (spread) : 0.70 + 0.03/point, plafond 0.90.
    pub const SPREAD: ConfidenceParams = ConfidenceParams {
        base: 0.70,
        per_unit: 0.03,
        floor: 0.50,
        cap: 0.90,
    };

    /// Props joueur : 0.50 + 0.05 par % d'avantage, plafond 0.95.
    pub const PLAYER_PROPS: ConfidenceParams = ConfidenceParams {
        base: 0.50,
        per_unit: 0.05,
        floor: 0.50,
        cap: 0.95,
    };

    pub fn score(&self, distance: f64) -> f64 {
        (self.base + self.per_unit * distance.abs()).clamp(self.floor, self.cap)
    }
}

/// Confiance agrégée de l'ensemble : moyenne des confiances auto-déclarées
/// pondérée par les poids (déjà normalisés), atténuée si l'historique est
/// maigre, puis serrée dans les bornes configurées.
pub fn aggregate_confidence(
    weights: &[f64],
    model_confidences: &[f64],
    thin_history: bool,
    config: &EnsembleConfig,
) -> f64 {
    let mut confidence: f64 = weights
        .iter()
        .zip(model_confidences.iter())
        .map(|(&w, &c)| w * c)
        .sum();
    if thin_history {
        confidence *= config.thin_history_factor;
    }
    confidence.clamp(config.confidence_floor, config.confidence_cap)
}
