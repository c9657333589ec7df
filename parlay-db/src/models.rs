use anyhow::{bail, Result};

/// Jeux supportés. Chaque jeu définit sa propre pool de numéros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Game {
    Powerball,
    MegaMillions,
    TexasLotto,
}

impl Game {
    pub fn rules(&self) -> GameRules {
        match self {
            Game::Powerball => GameRules {
                pool_size: 69,
                pick_count: 5,
                bonus_size: Some(26),
            },
            Game::MegaMillions => GameRules {
                pool_size: 70,
                pick_count: 5,
                bonus_size: Some(25),
            },
            Game::TexasLotto => GameRules {
                pool_size: 54,
                pick_count: 6,
                bonus_size: None,
            },
        }
    }

    /// Identifiant stable utilisé comme clé en base.
    pub fn id(&self) -> &'static str {
        match self {
            Game::Powerball => "powerball",
            Game::MegaMillions => "megamillions",
            Game::TexasLotto => "texas",
        }
    }

    pub fn from_id(id: &str) -> Option<Game> {
        match id {
            "powerball" => Some(Game::Powerball),
            "megamillions" => Some(Game::MegaMillions),
            "texas" => Some(Game::TexasLotto),
            _ => None,
        }
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Game::Powerball => write!(f, "Powerball"),
            Game::MegaMillions => write!(f, "Mega Millions"),
            Game::TexasLotto => write!(f, "Texas Lotto"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    pub pool_size: u8,
    pub pick_count: usize,
    pub bonus_size: Option<u8>,
}

impl GameRules {
    pub fn size(&self) -> usize {
        self.pool_size as usize
    }
}

/// Un tirage historique. Les séquences de tirages sont toujours ordonnées
/// du plus ancien au plus récent ; les modèles à pondération de récence
/// dépendent de cet ordre.
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub date: String,
    pub numbers: Vec<u8>,
    pub bonus: Option<u8>,
    pub jackpot: f64,
}

#[derive(Debug, Clone)]
pub struct NumberStats {
    pub number: u8,
    pub frequency: u32,
    pub gap: u32,
}

#[derive(Debug, Clone)]
pub struct NumberProbability {
    pub number: u8,
    pub probability: f64,
    pub tag: ProbabilityTag,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbabilityTag {
    Hot,
    Cold,
    Normal,
}

impl std::fmt::Display for ProbabilityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbabilityTag::Hot => write!(f, "HOT"),
            ProbabilityTag::Cold => write!(f, "COLD"),
            ProbabilityTag::Normal => write!(f, "-"),
        }
    }
}

/// Une grille jouable : numéros principaux triés + bonus éventuel.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub numbers: Vec<u8>,
    pub bonus: Option<u8>,
    pub score: f64,
}

pub fn validate_record(record: &DrawRecord, rules: GameRules) -> Result<()> {
    if record.numbers.len() != rules.pick_count {
        bail!(
            "Attendu {} numéros, reçu {}",
            rules.pick_count,
            record.numbers.len()
        );
    }
    for &n in &record.numbers {
        if n < 1 || n > rules.pool_size {
            bail!("Numéro {} hors limites (1-{})", n, rules.pool_size);
        }
    }
    for i in 0..record.numbers.len() {
        for j in (i + 1)..record.numbers.len() {
            if record.numbers[i] == record.numbers[j] {
                bail!("Numéro en double : {}", record.numbers[i]);
            }
        }
    }
    match (record.bonus, rules.bonus_size) {
        (Some(b), Some(max)) => {
            if b < 1 || b > max {
                bail!("Bonus {} hors limites (1-{})", b, max);
            }
        }
        (Some(b), None) => bail!("Bonus {} fourni pour un jeu sans bonus", b),
        _ => {}
    }
    Ok(())
}
