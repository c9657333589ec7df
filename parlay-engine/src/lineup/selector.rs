use std::collections::BTreeMap;

use tracing::debug;

use crate::error::PredictError;

use super::PlayerProjection;

/// Stratégies de classement du sélecteur glouton. Les quatre sont
/// exécutées et toutes les compositions retournées comme alternatives —
/// jamais une prétendue composition optimale unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingStrategy {
    /// Points projetés bruts.
    Projection,
    /// Points par unité de salaire.
    Value,
    /// Inverse de la détention estimée.
    Contrarian,
    /// Plafond de points (tournois).
    Ceiling,
}

impl RankingStrategy {
    pub fn all() -> [RankingStrategy; 4] {
        [
            RankingStrategy::Projection,
            RankingStrategy::Value,
            RankingStrategy::Contrarian,
            RankingStrategy::Ceiling,
        ]
    }

    fn key(&self, projection: &PlayerProjection) -> f64 {
        match self {
            RankingStrategy::Projection => projection.points,
            RankingStrategy::Value => projection.value,
            RankingStrategy::Contrarian => -projection.ownership,
            RankingStrategy::Ceiling => projection.ceiling,
        }
    }
}

impl std::fmt::Display for RankingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingStrategy::Projection => write!(f, "PROJECTION"),
            RankingStrategy::Value => write!(f, "VALUE"),
            RankingStrategy::Contrarian => write!(f, "CONTRARIAN"),
            RankingStrategy::Ceiling => write!(f, "CEILING"),
        }
    }
}

/// Plan de slots : poste → nombre de joueurs requis. BTreeMap pour un
/// ordre d'itération stable.
#[derive(Debug, Clone, Default)]
pub struct SlotPlan {
    pub slots: BTreeMap<String, usize>,
}

impl SlotPlan {
    pub fn new(slots: BTreeMap<String, usize>) -> Self {
        Self { slots }
    }

    pub fn total(&self) -> usize {
        self.slots.values().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leverage {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Leverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Leverage::Low => write!(f, "FAIBLE"),
            Leverage::Medium => write!(f, "MOYEN"),
            Leverage::High => write!(f, "ÉLEVÉ"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lineup {
    pub strategy: RankingStrategy,
    pub players: Vec<PlayerProjection>,
    pub total_salary: u32,
    pub projected_points: f64,
    pub avg_ownership: f64,
    pub leverage: Leverage,
}

/// Résultat du sélecteur. L'infaisabilité est un résultat de domaine
/// explicite, pas une erreur : « aucune composition possible » est une
/// réponse valable, jamais une composition partielle déguisée.
#[derive(Debug, Clone)]
pub enum LineupOutcome {
    Filled(Lineup),
    Infeasible {
        strategy: RankingStrategy,
        /// Slots restés vides : (poste, nombre manquant).
        unfilled: Vec<(String, usize)>,
    },
}

fn validate_inputs(
    projections: &[PlayerProjection],
    plan: &SlotPlan,
) -> Result<(), PredictError> {
    if projections.is_empty() {
        return Err(PredictError::EmptyPool);
    }
    if plan.slots.is_empty() {
        return Err(PredictError::InvalidSlots("plan de slots vide".to_string()));
    }
    if let Some((position, _)) = plan.slots.iter().find(|(_, &count)| count == 0) {
        return Err(PredictError::InvalidSlots(format!(
            "slot \"{}\" avec un compte nul",
            position
        )));
    }
    Ok(())
}

/// Remplissage glouton sous contrainte : candidats en ordre de classement
/// décroissant, un candidat est retenu si son poste a encore de la place ET
/// que son salaire tient dans le budget restant.
///
/// Approximation gloutonne, PAS une résolution optimale de sac à dos : le
/// résultat est faisable et raisonnablement bon, sans garantie d'être le
/// meilleur score agrégé possible sous le budget.
pub fn build_lineup(
    projections: &[PlayerProjection],
    plan: &SlotPlan,
    budget: u32,
    strategy: RankingStrategy,
) -> Result<LineupOutcome, PredictError> {
    validate_inputs(projections, plan)?;

    let mut order: Vec<usize> = (0..projections.len()).collect();
    // Classement décroissant ; égalité départagée par identifiant croissant
    // pour un résultat déterministe.
    order.sort_by(|&a, &b| {
        strategy
            .key(&projections[b])
            .partial_cmp(&strategy.key(&projections[a]))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| projections[a].player.id.cmp(&projections[b].player.id))
    });

    let mut remaining: BTreeMap<&str, usize> = plan
        .slots
        .iter()
        .map(|(position, &count)| (position.as_str(), count))
        .collect();
    let mut picked: Vec<usize> = Vec::with_capacity(plan.total());
    let mut total_salary = 0u32;

    for &i in &order {
        let projection = &projections[i];
        let position = projection.player.position.as_str();
        let Some(&capacity) = remaining.get(position) else {
            continue;
        };
        if capacity == 0 {
            continue;
        }
        if total_salary + projection.player.salary > budget {
            continue;
        }
        remaining.insert(position, capacity - 1);
        total_salary += projection.player.salary;
        picked.push(i);
        if picked.len() == plan.total() {
            break;
        }
    }

    let unfilled: Vec<(String, usize)> = remaining
        .iter()
        .filter(|(_, &count)| count > 0)
        .map(|(position, &count)| (position.to_string(), count))
        .collect();

    if !unfilled.is_empty() {
        debug!(%strategy, ?unfilled, "composition infaisable");
        return Ok(LineupOutcome::Infeasible { strategy, unfilled });
    }

    let players: Vec<PlayerProjection> = picked.iter().map(|&i| projections[i].clone()).collect();
    let projected_points: f64 = players.iter().map(|p| p.points).sum();
    let avg_ownership: f64 =
        players.iter().map(|p| p.ownership).sum::<f64>() / players.len() as f64;
    let leverage = if avg_ownership < 15.0 {
        Leverage::High
    } else if avg_ownership < 25.0 {
        Leverage::Medium
    } else {
        Leverage::Low
    };

    Ok(LineupOutcome::Filled(Lineup {
        strategy,
        players,
        total_salary,
        projected_points,
        avg_ownership,
        leverage,
    }))
}

/// Exécute le sélecteur avec les quatre stratégies de classement et
/// retourne les quatre résultats, faisables ou non.
pub fn build_lineups(
    projections: &[PlayerProjection],
    plan: &SlotPlan,
    budget: u32,
) -> Result<Vec<LineupOutcome>, PredictError> {
    RankingStrategy::all()
        .iter()
        .map(|&strategy| build_lineup(projections, plan, budget, strategy))
        .collect()
}
