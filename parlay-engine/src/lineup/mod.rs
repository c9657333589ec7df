pub mod selector;

use serde::Deserialize;

use crate::models::predictor::Predictor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InjuryStatus {
    Healthy,
    Questionable,
    Doubtful,
    Out,
}

/// Entrées joueur telles que fournies par la couche frontière.
/// `last_games` : points fantasy des derniers matchs, du plus ancien au
/// plus récent.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerStats {
    pub id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    pub salary: u32,
    pub last_games: Vec<f64>,
    pub season_avg: f64,
    pub trend: Trend,
    /// Rang de la défense adverse face au poste : 1 = la plus facile.
    pub opponent_rank: u8,
    pub is_home: bool,
    pub injury: InjuryStatus,
}

#[derive(Debug, Clone)]
pub struct PlayerProjection {
    pub player: PlayerStats,
    pub points: f64,
    pub ceiling: f64,
    pub floor: f64,
    pub confidence: f64,
    /// Estimation de détention par le public, en pourcentage.
    pub ownership: f64,
    /// Points par tranche de 1000$ de salaire.
    pub value: f64,
}

const SEASON_WEIGHT: f64 = 0.3;
const RECENT_WEIGHT: f64 = 0.7;
const PREDICTOR_BLEND: f64 = 0.4;

fn base_projection(player: &PlayerStats) -> f64 {
    if player.last_games.is_empty() {
        return player.season_avg;
    }
    let recent_avg: f64 =
        player.last_games.iter().sum::<f64>() / player.last_games.len() as f64;
    player.season_avg * SEASON_WEIGHT + recent_avg * RECENT_WEIGHT
}

fn matchup_factor(player: &PlayerStats) -> f64 {
    // Adversaire facile (rang 1) → boost, difficile (rang 32) → malus.
    1.0 + (17.0 - player.opponent_rank as f64) / 100.0
}

fn trend_factor(player: &PlayerStats) -> f64 {
    match player.trend {
        Trend::Up => 1.08,
        Trend::Down => 0.92,
        Trend::Stable => 1.0,
    }
}

fn estimate_ownership(player: &PlayerStats, value: f64) -> f64 {
    let mut ownership: f64 = 5.0;

    if player.salary > 8_000 {
        ownership += 10.0;
    }
    if player.salary > 9_000 {
        ownership += 15.0;
    }
    if value > 5.0 {
        ownership += 10.0;
    }
    if value > 6.0 {
        ownership += 15.0;
    }
    if player.opponent_rank <= 5 {
        ownership += 10.0;
    }

    ownership.min(50.0)
}

fn predictor_features(player: &PlayerStats) -> Vec<f64> {
    let recent_avg = if player.last_games.is_empty() {
        player.season_avg
    } else {
        player.last_games.iter().sum::<f64>() / player.last_games.len() as f64
    };
    let last = player.last_games.last().copied().unwrap_or(0.0);
    let trend = match player.trend {
        Trend::Up => 1.0,
        Trend::Down => -1.0,
        Trend::Stable => 0.0,
    };
    let injury = match player.injury {
        InjuryStatus::Healthy => 1.0,
        _ => 0.5,
    };
    vec![
        player.salary as f64 / 10_000.0,
        player.season_avg,
        recent_avg,
        player.opponent_rank as f64 / 32.0,
        trend,
        if player.is_home { 1.0 } else { 0.0 },
        last,
        injury,
    ]
}

/// Projette un joueur : base statistique (saison + récent), ajustements de
/// matchup et de tendance, fusion optionnelle avec un prédicteur appris,
/// amortissement blessure, puis valeur et détention estimée.
pub fn project_player(player: &PlayerStats, predictor: Option<&dyn Predictor>) -> PlayerProjection {
    let base = base_projection(player);
    let adjusted = base * matchup_factor(player) * trend_factor(player);

    let mut points = adjusted;
    let mut confidence = 0.70;

    if let Some(predictor) = predictor {
        if player.last_games.len() >= 5 {
            let output = predictor.predict(&predictor_features(player));
            points = points * (1.0 - PREDICTOR_BLEND) + output.score * PREDICTOR_BLEND;
            confidence = 0.82;
        }
    }

    match player.injury {
        InjuryStatus::Questionable => {
            points *= 0.85;
            confidence *= 0.7;
        }
        InjuryStatus::Doubtful => {
            points *= 0.5;
            confidence *= 0.7;
        }
        _ => {}
    }

    let value = points / player.salary as f64 * 1000.0;

    PlayerProjection {
        ceiling: points * 1.5,
        floor: points * 0.5,
        confidence,
        ownership: estimate_ownership(player, value),
        value,
        points,
        player: player.clone(),
    }
}

/// Projette toute une pool ; les joueurs OUT sont écartés d'entrée.
pub fn project_pool(
    players: &[PlayerStats],
    predictor: Option<&dyn Predictor>,
) -> Vec<PlayerProjection> {
    players
        .iter()
        .filter(|p| p.injury != InjuryStatus::Out)
        .map(|p| project_player(p, predictor))
        .collect()
}
