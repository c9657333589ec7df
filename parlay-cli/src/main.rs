mod display;
mod import;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use parlay_db::db::{count_draws, db_path, fetch_draws, migrate, open_db};
use parlay_db::models::Game;
use parlay_engine::analysis::{compute_stats, detect_patterns, to_probabilities};
use parlay_engine::ensemble::calibration::{
    calibrate_model, compute_weights, load_weights, save_weights, EnsembleWeights,
};
use parlay_engine::ensemble::EnsembleCombiner;
use parlay_engine::lineup::selector::{build_lineups, SlotPlan};
use parlay_engine::lineup::{project_pool, PlayerStats};
use parlay_engine::models::all_models;
use parlay_engine::props::{project_props, GameLog};
use parlay_engine::sampler::{bonus_distribution, date_seed, generate_tickets, optimal_ticket};
use parlay_engine::sports::{forecast_game, PostedLines, Sport, TeamStats};
use parlay_engine::EnsembleConfig;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GameArg {
    Powerball,
    Megamillions,
    Texas,
}

impl From<GameArg> for Game {
    fn from(arg: GameArg) -> Game {
        match arg {
            GameArg::Powerball => Game::Powerball,
            GameArg::Megamillions => Game::MegaMillions,
            GameArg::Texas => Game::TexasLotto,
        }
    }
}

#[derive(Parser)]
#[command(name = "parlay", about = "Prédictions lottery, sports et daily fantasy")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages d'un jeu depuis un fichier CSV
    Import {
        /// Jeu cible
        #[arg(short, long, value_enum)]
        game: GameArg,

        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages d'un jeu
    History {
        #[arg(short, long, value_enum)]
        game: GameArg,

        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Afficher les statistiques (fréquences et retards)
    Stats {
        #[arg(short, long, value_enum)]
        game: GameArg,

        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "100")]
        window: u32,
    },

    /// Prédire le prochain tirage avec l'ensemble de modèles
    Predict {
        #[arg(short, long, value_enum)]
        game: GameArg,

        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "100")]
        window: u32,

        /// Nombre de grilles à suggérer
        #[arg(short, long, default_value = "5")]
        tickets: usize,

        /// Seed pour la reproductibilité (défaut : date du jour YYYYMMDD)
        #[arg(long)]
        seed: Option<u64>,

        /// Facteur de suréchantillonnage des grilles candidates
        #[arg(long, default_value = "20")]
        oversample: usize,

        /// Différence minimale de numéros entre deux grilles
        #[arg(long, default_value = "2")]
        min_diff: usize,

        /// Fichier de calibration (poids des modèles)
        #[arg(short, long, default_value = "calibration.json")]
        calibration: String,
    },

    /// Calibrer les poids des modèles par walk-forward validation
    Calibrate {
        #[arg(short, long, value_enum)]
        game: GameArg,

        /// Fenêtres d'entraînement (séparées par des virgules)
        #[arg(short, long, default_value = "20,30,40,50,60,80,100")]
        windows: String,

        /// Fichier de sortie pour les poids
        #[arg(short, long, default_value = "calibration.json")]
        output: String,
    },

    /// Afficher les poids d'un fichier de calibration
    Weights {
        #[arg(short, long, default_value = "calibration.json")]
        calibration: String,
    },

    /// Prévisions over/under des props d'un joueur (entrée JSON)
    Props {
        /// Fichier JSON : {player, logs: [...], lines: {...}}
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Prévision d'un match : score, total, spread (entrée JSON)
    Game {
        /// Fichier JSON : {sport, home_team, away_team, home, away, lines}
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Compositions daily fantasy sous contrainte de budget (entrée JSON)
    Lineup {
        /// Fichier JSON : tableau de joueurs
        #[arg(short, long)]
        file: PathBuf,

        /// Slots au format "QB=1,RB=2,WR=3"
        #[arg(short, long)]
        slots: String,

        /// Budget salarial total
        #[arg(short, long, default_value = "50000")]
        budget: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Import { game, file } => cmd_import(game.into(), &file),
        Command::DbPath => {
            println!("{}", db_path().display());
            Ok(())
        }
        Command::History { game, last } => cmd_history(game.into(), last),
        Command::Stats { game, window } => cmd_stats(game.into(), window),
        Command::Predict {
            game,
            window,
            tickets,
            seed,
            oversample,
            min_diff,
            calibration,
        } => cmd_predict(
            game.into(),
            window,
            tickets,
            seed,
            oversample,
            min_diff,
            &calibration,
        ),
        Command::Calibrate {
            game,
            windows,
            output,
        } => cmd_calibrate(game.into(), &windows, &output),
        Command::Weights { calibration } => cmd_weights(&calibration),
        Command::Props { file } => cmd_props(&file),
        Command::Game { file } => cmd_game(&file),
        Command::Lineup {
            file,
            slots,
            budget,
        } => cmd_lineup(&file, &slots, budget),
    }
}

fn open_game_db(game: Game) -> Result<(parlay_db::rusqlite::Connection, u32)> {
    let conn = open_db(&db_path())?;
    migrate(&conn)?;
    let n = count_draws(&conn, game)?;
    if n == 0 {
        bail!(
            "Aucun tirage {} en base. Lancez d'abord : parlay import --game {}",
            game,
            game.id()
        );
    }
    Ok((conn, n))
}

fn cmd_import(game: Game, file: &PathBuf) -> Result<()> {
    let conn = open_db(&db_path())?;
    migrate(&conn)?;
    let result = import::import_csv(&conn, game, file)?;
    display::display_import_summary(&result);
    Ok(())
}

fn cmd_history(game: Game, last: u32) -> Result<()> {
    let (conn, _) = open_game_db(game)?;
    let draws = fetch_draws(&conn, game, last)?;
    display::display_history(game, &draws);
    Ok(())
}

fn cmd_stats(game: Game, window: u32) -> Result<()> {
    let (conn, n) = open_game_db(game)?;
    let effective_window = window.min(n);
    let draws = fetch_draws(&conn, game, effective_window)?;
    let stats = compute_stats(&draws, game.rules());
    display::display_stats(game, &stats, effective_window);
    Ok(())
}

fn cmd_predict(
    game: Game,
    window: u32,
    n_tickets: usize,
    seed: Option<u64>,
    oversample: usize,
    min_diff: usize,
    calibration_path: &str,
) -> Result<()> {
    let (conn, n) = open_game_db(game)?;
    let rules = game.rules();
    let effective_window = window.min(n);
    let history = fetch_draws(&conn, game, effective_window)?;

    let config = EnsembleConfig::default();
    let models = all_models(&config);

    // Poids calibrés si disponibles, poids documentés sinon.
    let combiner = match load_weights(&PathBuf::from(calibration_path)) {
        Ok(w) if w.game == game.id() => {
            let weights: Vec<f64> = models
                .iter()
                .map(|m| {
                    w.weights
                        .iter()
                        .find(|(name, _)| name == m.name())
                        .map(|(_, weight)| *weight)
                        .unwrap_or(0.0)
                })
                .collect();
            EnsembleCombiner::with_weights(models, weights, config)
        }
        _ => {
            println!("(Pas de calibration pour ce jeu, poids par défaut)");
            EnsembleCombiner::with_weights(
                models,
                parlay_engine::models::default_weights(),
                config,
            )
        }
    };

    let forecast = combiner.predict(&history, rules, rules.pick_count)?;
    display::display_forecast(game, &forecast);

    let probs = to_probabilities(&forecast.distribution, rules);
    display::display_probabilities(&probs, 15);
    display::display_patterns(&detect_patterns(&forecast.numbers, rules));

    let effective_seed = seed.unwrap_or_else(|| {
        let ds = date_seed();
        println!("\n(Seed du jour : {ds})");
        ds
    });

    let bonus_dist = bonus_distribution(&history, rules);
    let optimal = optimal_ticket(&forecast.distribution, bonus_dist.as_deref(), rules);
    println!(
        "\nGrille optimale : {}",
        optimal
            .numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" - ")
    );
    if let Some(bonus) = optimal.bonus {
        println!("Bonus optimal   : {}", bonus);
    }

    let tickets = generate_tickets(
        &forecast.distribution,
        bonus_dist.as_deref(),
        rules,
        n_tickets,
        effective_seed,
        oversample,
        min_diff,
    )?;
    display::display_tickets(&tickets);

    Ok(())
}

fn cmd_calibrate(game: Game, windows_str: &str, output: &str) -> Result<()> {
    let (conn, n) = open_game_db(game)?;
    let rules = game.rules();

    let windows: Vec<usize> = windows_str
        .split(',')
        .map(|s| s.trim().parse::<usize>())
        .collect::<Result<_, _>>()
        .context("Format de fenêtres invalide")?;

    let history = fetch_draws(&conn, game, n)?;
    let models = all_models(&EnsembleConfig::default());

    println!(
        "Calibration de {} modèles sur {} tirages avec {} fenêtres...",
        models.len(),
        history.len(),
        windows.len()
    );

    let pb = ProgressBar::new(models.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut calibrations = Vec::new();
    for model in &models {
        pb.set_message(model.name().to_string());
        calibrations.push(calibrate_model(model.as_ref(), &history, &windows, rules));
        pb.inc(1);
    }
    pb.finish_with_message("Calibration terminée");

    display::display_calibration_results(&calibrations, &windows);

    let weights = compute_weights(&calibrations, rules);
    let ensemble_weights = EnsembleWeights {
        game: game.id().to_string(),
        weights,
        calibrations,
    };
    display::display_weights(&ensemble_weights);

    save_weights(&ensemble_weights, &PathBuf::from(output))?;
    println!("\nPoids sauvegardés dans : {}", output);

    Ok(())
}

fn cmd_weights(calibration_path: &str) -> Result<()> {
    let weights = load_weights(&PathBuf::from(calibration_path)).context(
        "Impossible de charger le fichier de calibration. Lancez d'abord : parlay calibrate",
    )?;
    display::display_weights(&weights);
    Ok(())
}

#[derive(serde::Deserialize)]
struct PropsInput {
    player: String,
    logs: Vec<GameLog>,
    #[serde(default)]
    lines: BTreeMap<String, f64>,
}

fn cmd_props(file: &PathBuf) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Impossible de lire {:?}", file))?;
    let input: PropsInput = serde_json::from_str(&json).context("JSON de props invalide")?;

    let report = project_props(&input.logs, &input.lines)?;
    display::display_props(&input.player, &report);
    Ok(())
}

#[derive(serde::Deserialize)]
struct GameInput {
    sport: Sport,
    home_team: String,
    away_team: String,
    home: TeamStats,
    away: TeamStats,
    #[serde(default)]
    lines: PostedLines,
}

fn cmd_game(file: &PathBuf) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Impossible de lire {:?}", file))?;
    let input: GameInput = serde_json::from_str(&json).context("JSON de match invalide")?;

    let forecast = forecast_game(input.sport, &input.home, &input.away, input.lines);
    display::display_game(&input.home_team, &input.away_team, &forecast);
    Ok(())
}

fn parse_slots(spec: &str) -> Result<SlotPlan> {
    let mut slots = BTreeMap::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let Some((position, count)) = part.split_once('=') else {
            bail!("Slot invalide : '{}' (attendu POSTE=N)", part);
        };
        let count: usize = count
            .trim()
            .parse()
            .with_context(|| format!("Compte de slot invalide : '{}'", count))?;
        slots.insert(position.trim().to_string(), count);
    }
    Ok(SlotPlan::new(slots))
}

fn cmd_lineup(file: &PathBuf, slots_spec: &str, budget: u32) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Impossible de lire {:?}", file))?;
    let players: Vec<PlayerStats> =
        serde_json::from_str(&json).context("JSON de joueurs invalide")?;

    let plan = parse_slots(slots_spec)?;
    let projections = project_pool(&players, None);
    let outcomes = build_lineups(&projections, &plan, budget)?;
    display::display_lineups(&outcomes);
    Ok(())
}
