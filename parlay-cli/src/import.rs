use anyhow::{bail, Context, Result};
use parlay_db::rusqlite::Connection;
use std::path::Path;

use parlay_db::db::insert_draw;
use parlay_db::models::{validate_record, DrawRecord, Game};

/// Format attendu : date, numéros (pick_count colonnes), puis bonus et
/// jackpot selon le jeu. La date est acceptée en ISO (AAAA-MM-JJ) ou en
/// JJ/MM/AAAA.
fn parse_record(record: &csv::StringRecord, game: Game) -> Result<DrawRecord> {
    let rules = game.rules();

    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let date = parse_date(&get(0)?)?;

    let numbers: Vec<u8> = (1..=rules.pick_count)
        .map(get_u8)
        .collect::<Result<_>>()?;

    let mut next = rules.pick_count + 1;
    let bonus = if rules.bonus_size.is_some() {
        let b = get_u8(next)?;
        next += 1;
        Some(b)
    } else {
        None
    };

    let jackpot = match record.get(next) {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Jackpot invalide : '{}'", s))?,
        _ => 0.0,
    };

    let draw = DrawRecord {
        date,
        numbers,
        bonus,
        jackpot,
    };
    validate_record(&draw, rules)?;
    Ok(draw)
}

fn parse_date(raw: &str) -> Result<String> {
    if raw.contains('-') {
        return Ok(raw.to_string());
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        bail!("Format de date invalide: '{}'", raw);
    }
    Ok(format!("{}-{}-{}", parts[2], parts[1], parts[0]))
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, game: Game, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record, game) {
                Ok(draw) => match insert_draw(&tx, game, &draw) {
                    Ok(true) => result.inserted += 1,
                    Ok(false) => result.skipped += 1,
                    Err(e) => {
                        eprintln!("Erreur insertion tirage {}: {}", result.total_records, e);
                        result.errors += 1;
                    }
                },
                Err(e) => {
                    eprintln!("Erreur parsing ligne {}: {}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                eprintln!("Erreur lecture ligne {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}
