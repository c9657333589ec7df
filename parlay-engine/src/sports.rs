use serde::Deserialize;

use crate::ensemble::confidence::ConfidenceParams;
use crate::props::OverUnderCall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sport {
    Nfl,
    Nba,
    Mlb,
    Nhl,
    Soccer,
}

impl Sport {
    /// Ligne over/under standard du sport, utilisée quand aucune ligne
    /// n'est affichée.
    pub fn standard_total(&self) -> f64 {
        match self {
            Sport::Nfl => 47.5,
            Sport::Nba => 220.5,
            Sport::Mlb => 8.5,
            Sport::Nhl => 6.5,
            Sport::Soccer => 2.5,
        }
    }

    /// Plage de scores plausible par équipe.
    fn score_bounds(&self) -> (f64, f64) {
        match self {
            Sport::Nfl => (10.0, 45.0),
            Sport::Nba => (85.0, 140.0),
            Sport::Mlb => (0.0, 12.0),
            Sport::Nhl => (0.0, 8.0),
            Sport::Soccer => (0.0, 5.0),
        }
    }

    fn clamp_score(&self, score: f64) -> f64 {
        let (lo, hi) = self.score_bounds();
        score.clamp(lo, hi)
    }
}

/// Statistiques de saison d'une équipe. `last_games` : résultats récents du
/// plus ancien au plus récent, positif = victoire.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamStats {
    pub wins: u32,
    pub losses: u32,
    pub avg_points_scored: f64,
    pub avg_points_allowed: f64,
    pub last_games: Vec<f64>,
    #[serde(default)]
    pub streak: String,
    #[serde(default)]
    pub injuries: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
    Push,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Home => write!(f, "HOME"),
            Side::Away => write!(f, "AWAY"),
            Side::Push => write!(f, "PUSH"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoreProjection {
    pub home: f64,
    pub away: f64,
    pub winner: Side,
    pub margin: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct TotalForecast {
    pub line: f64,
    pub projected_total: f64,
    pub call: OverUnderCall,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct SpreadForecast {
    pub line: f64,
    pub pick: Side,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "FAIBLE"),
            RiskLevel::Medium => write!(f, "MOYEN"),
            RiskLevel::High => write!(f, "ÉLEVÉ"),
        }
    }
}

/// Facteurs saillants du match, rendus par la couche d'affichage.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyFactor {
    Injuries { side: Side, count: usize },
    HotStreak(Side),
    Slump(Side),
    HomeEdge,
    OffenseOutpacesDefense(Side),
}

#[derive(Debug, Clone)]
pub struct GameForecast {
    pub sport: Sport,
    pub projected: ScoreProjection,
    pub total: TotalForecast,
    pub spread: SpreadForecast,
    pub risk: RiskLevel,
    pub factors: Vec<KeyFactor>,
}

/// Lignes affichées par un bookmaker, quand on les connaît.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PostedLines {
    pub spread: Option<f64>,
    pub total: Option<f64>,
}

/// Part de victoires sur les derniers matchs ; 0.5 sans historique.
pub fn form(last_games: &[f64]) -> f64 {
    if last_games.is_empty() {
        return 0.5;
    }
    let wins = last_games.iter().filter(|&&r| r > 0.0).count();
    wins as f64 / last_games.len() as f64
}

/// Parse une série du type "W4" / "L2" en entier signé.
pub fn parse_streak(streak: &str) -> i32 {
    let mut chars = streak.chars();
    let sign = match chars.next() {
        Some('W') => 1,
        Some('L') => -1,
        _ => return 0,
    };
    match chars.as_str().parse::<i32>() {
        Ok(n) => sign * n,
        Err(_) => 0,
    }
}

const STAT_SCORE_CONFIDENCE: f64 = 0.70;

fn project_scores(sport: Sport, home: &TeamStats, away: &TeamStats) -> ScoreProjection {
    // Projection statistique : point médian entre l'attaque d'une équipe et
    // ce que la défense adverse concède, modulé par l'avantage du terrain.
    let raw_home = (home.avg_points_scored + away.avg_points_allowed) / 2.0 * 1.05;
    let raw_away = (away.avg_points_scored + home.avg_points_allowed) / 2.0 * 0.95;

    let home_score = sport.clamp_score(raw_home.round());
    let away_score = sport.clamp_score(raw_away.round());

    let winner = if home_score > away_score {
        Side::Home
    } else if away_score > home_score {
        Side::Away
    } else {
        Side::Push
    };

    ScoreProjection {
        home: home_score,
        away: away_score,
        winner,
        margin: (home_score - away_score).abs(),
        confidence: STAT_SCORE_CONFIDENCE,
    }
}

fn analyze_factors(home: &TeamStats, away: &TeamStats) -> Vec<KeyFactor> {
    let mut factors = Vec::new();

    if home.injuries.len() > 2 {
        factors.push(KeyFactor::Injuries {
            side: Side::Home,
            count: home.injuries.len(),
        });
    }
    if away.injuries.len() > 2 {
        factors.push(KeyFactor::Injuries {
            side: Side::Away,
            count: away.injuries.len(),
        });
    }

    let home_form = form(&home.last_games);
    let away_form = form(&away.last_games);
    if home_form > 0.7 {
        factors.push(KeyFactor::HotStreak(Side::Home));
    }
    if away_form > 0.7 {
        factors.push(KeyFactor::HotStreak(Side::Away));
    }
    if home_form < 0.3 {
        factors.push(KeyFactor::Slump(Side::Home));
    }
    if away_form < 0.3 {
        factors.push(KeyFactor::Slump(Side::Away));
    }

    factors.push(KeyFactor::HomeEdge);

    if home.avg_points_scored > home.avg_points_allowed + 5.0 {
        factors.push(KeyFactor::OffenseOutpacesDefense(Side::Home));
    }
    if away.avg_points_scored > away.avg_points_allowed + 5.0 {
        factors.push(KeyFactor::OffenseOutpacesDefense(Side::Away));
    }

    factors
}

fn risk_level(score_confidence: f64, total_confidence: f64) -> RiskLevel {
    let avg = (score_confidence + total_confidence) / 2.0;
    if avg >= 0.80 {
        RiskLevel::Low
    } else if avg >= 0.65 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Prévision complète d'un match : scores projetés, over/under, spread,
/// niveau de risque et facteurs.
pub fn forecast_game(
    sport: Sport,
    home: &TeamStats,
    away: &TeamStats,
    lines: PostedLines,
) -> GameForecast {
    let projected = project_scores(sport, home, away);

    let projected_total = projected.home + projected.away;
    let total_line = lines.total.unwrap_or_else(|| sport.standard_total());
    let diff = projected_total - total_line;
    let total = TotalForecast {
        line: total_line,
        projected_total,
        call: if diff > 0.0 {
            OverUnderCall::Over
        } else {
            OverUnderCall::Under
        },
        confidence: ConfidenceParams::GAME_TOTALS.score(diff),
    };

    let spread_line = lines.spread.unwrap_or(0.0);
    let projected_spread = projected.home - projected.away;
    let spread = SpreadForecast {
        line: spread_line,
        pick: if projected_spread > spread_line {
            Side::Home
        } else {
            Side::Away
        },
        confidence: ConfidenceParams::SPREAD.score(projected_spread - spread_line),
    };

    let risk = risk_level(projected.confidence, total.confidence);
    let factors = analyze_factors(home, away);

    GameForecast {
        sport,
        projected,
        total,
        spread,
        risk,
        factors,
    }
}
