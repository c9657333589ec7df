use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{DrawRecord, Game};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    game       TEXT NOT NULL,
    draw_date  TEXT NOT NULL,
    n1         INTEGER NOT NULL,
    n2         INTEGER NOT NULL,
    n3         INTEGER NOT NULL,
    n4         INTEGER NOT NULL,
    n5         INTEGER NOT NULL,
    n6         INTEGER,
    bonus      INTEGER,
    jackpot    REAL NOT NULL DEFAULT 0.0,
    PRIMARY KEY (game, draw_date)
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("parlay.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, game: Game, record: &DrawRecord) -> Result<bool> {
    let n6 = record.numbers.get(5).copied();
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO draws (game, draw_date, n1, n2, n3, n4, n5, n6, bonus, jackpot)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                game.id(),
                record.date,
                record.numbers[0],
                record.numbers[1],
                record.numbers[2],
                record.numbers[3],
                record.numbers[4],
                n6,
                record.bonus,
                record.jackpot,
            ],
        )
        .context("Échec de l'insertion")?;
    Ok(changed > 0)
}

/// Retourne les `limit` derniers tirages d'un jeu, ordonnés du plus ancien
/// au plus récent (l'ordre attendu par tous les modèles du moteur).
pub fn fetch_draws(conn: &Connection, game: Game, limit: u32) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT draw_date, n1, n2, n3, n4, n5, n6, bonus, jackpot
         FROM draws WHERE game = ?1 ORDER BY draw_date DESC LIMIT ?2",
    )?;
    let mut draws = stmt
        .query_map(rusqlite::params![game.id(), limit], |row| {
            let mut numbers: Vec<u8> = vec![
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ];
            if let Some(n6) = row.get::<_, Option<u8>>(6)? {
                numbers.push(n6);
            }
            Ok(DrawRecord {
                date: row.get(0)?,
                numbers,
                bonus: row.get(7)?,
                jackpot: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    // La requête ramène les plus récents d'abord ; on remet en ordre chronologique.
    draws.reverse();
    Ok(draws)
}

pub fn count_draws(conn: &Connection, game: Game) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM draws WHERE game = ?1",
        [game.id()],
        |row| row.get(0),
    )?;
    Ok(count)
}
