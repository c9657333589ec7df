use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::ensemble::confidence::ConfidenceParams;
use crate::error::PredictError;

/// Un match passé d'un joueur : valeurs par catégorie de stat
/// (points, rebounds, passing_yards...). Les séquences de logs sont
/// ordonnées du plus ancien au plus récent.
#[derive(Debug, Clone, Deserialize)]
pub struct GameLog {
    pub date: String,
    pub opponent: String,
    pub stats: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverUnderCall {
    Over,
    Under,
}

impl std::fmt::Display for OverUnderCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverUnderCall::Over => write!(f, "OVER"),
            OverUnderCall::Under => write!(f, "UNDER"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PropRange {
    pub low: f64,
    pub high: f64,
    pub avg: f64,
}

/// Prévision over/under pour une catégorie de stat.
#[derive(Debug, Clone)]
pub struct PropForecast {
    pub category: String,
    pub projection: f64,
    pub line: f64,
    pub call: OverUnderCall,
    pub confidence: f64,
    /// Avantage sur la ligne, en pourcentage.
    pub edge_pct: f64,
    pub range: PropRange,
}

#[derive(Debug, Clone)]
pub struct PlayerPropReport {
    pub props: Vec<PropForecast>,
    /// Confiance globale dérivée de la régularité du joueur.
    pub confidence: f64,
}

const PROP_DECAY: f64 = 0.9;

/// Projection par pondération de récence : poids decay^âge, âge 0 pour le
/// match le plus récent.
fn weighted_projection(values: &[f64]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for (t, &v) in values.iter().enumerate() {
        let age = (values.len() - 1 - t) as i32;
        let weight = PROP_DECAY.powi(age);
        weighted_sum += v * weight;
        weight_sum += weight;
    }
    if weight_sum > 0.0 {
        weighted_sum / weight_sum
    } else {
        0.0
    }
}

/// Calcule les prévisions over/under d'un joueur, catégorie par catégorie.
/// `lines` porte les lignes affichées quand elles sont connues ; sinon la
/// moyenne de saison observée (arrondie au dixième) sert de ligne
/// synthétique.
pub fn project_props(
    logs: &[GameLog],
    lines: &BTreeMap<String, f64>,
) -> Result<PlayerPropReport, PredictError> {
    if logs.is_empty() {
        return Err(PredictError::EmptyHistory);
    }

    let categories: BTreeSet<&String> = logs.iter().flat_map(|g| g.stats.keys()).collect();
    if categories.is_empty() {
        return Err(PredictError::EmptyHistory);
    }

    let mut props = Vec::new();
    let mut consistency_sum = 0.0;

    for category in categories {
        let values: Vec<f64> = logs
            .iter()
            .map(|g| g.stats.get(category).copied().unwrap_or(0.0))
            .collect();

        let avg = values.iter().sum::<f64>() / values.len() as f64;
        let low = values.iter().copied().fold(f64::INFINITY, f64::min);
        let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let projection = weighted_projection(&values);
        let line = lines
            .get(category)
            .copied()
            .unwrap_or_else(|| (avg * 10.0).round() / 10.0);

        let edge_pct = if line.abs() > f64::EPSILON {
            (projection - line) / line * 100.0
        } else {
            0.0
        };

        let call = if projection > line {
            OverUnderCall::Over
        } else {
            OverUnderCall::Under
        };

        let consistency = if avg.abs() > f64::EPSILON {
            1.0 - ((high - low) / avg * 0.5).min(1.0)
        } else {
            0.0
        };
        consistency_sum += consistency.max(0.0);

        props.push(PropForecast {
            category: category.clone(),
            projection,
            line,
            call,
            confidence: ConfidenceParams::PLAYER_PROPS.score(edge_pct),
            edge_pct: edge_pct.abs(),
            range: PropRange { low, high, avg },
        });
    }

    let confidence = consistency_sum / props.len() as f64;

    Ok(PlayerPropReport { props, confidence })
}
