use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use parlay_db::models::{DrawRecord, Game, NumberProbability, NumberStats, ProbabilityTag, Ticket};
use parlay_engine::analysis::PatternSummary;
use parlay_engine::ensemble::calibration::{EnsembleWeights, ModelCalibration};
use parlay_engine::ensemble::EnsembleForecast;
use parlay_engine::lineup::selector::LineupOutcome;
use parlay_engine::props::PlayerPropReport;
use parlay_engine::sports::{GameForecast, KeyFactor, Side};

use crate::import::ImportResult;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_history(game: Game, draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let has_bonus = game.rules().bonus_size.is_some();
    let mut table = if has_bonus {
        new_table(vec!["Date", "Numéros", "Bonus", "Jackpot"])
    } else {
        new_table(vec!["Date", "Numéros", "Jackpot"])
    };

    for draw in draws {
        let mut sorted = draw.numbers.clone();
        sorted.sort();
        let jackpot = if draw.jackpot > 0.0 {
            format!("{:.0} $", draw.jackpot)
        } else {
            "—".to_string()
        };

        let mut row = vec![draw.date.clone(), join_numbers(&sorted)];
        if has_bonus {
            row.push(
                draw.bonus
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "—".to_string()),
            );
        }
        row.push(jackpot);
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_stats(game: Game, stats: &[NumberStats], window: u32) {
    println!(
        "\n== Statistiques {} (fenêtre : {} tirages) ==\n",
        game, window
    );

    let mut table = new_table(vec!["Numéro", "Fréquence", "Retard"]);
    for stat in stats {
        table.add_row(vec![
            stat.number.to_string(),
            stat.frequency.to_string(),
            stat.gap.to_string(),
        ]);
    }
    println!("{table}");
}

fn tag_cell(tag: &ProbabilityTag) -> Cell {
    match tag {
        ProbabilityTag::Hot => Cell::new("HOT").fg(Color::Red),
        ProbabilityTag::Cold => Cell::new("COLD").fg(Color::Blue),
        ProbabilityTag::Normal => Cell::new("-"),
    }
}

pub fn display_probabilities(probs: &[NumberProbability], top: usize) {
    let mut sorted: Vec<&NumberProbability> = probs.iter().collect();
    sorted.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = new_table(vec!["Numéro", "Probabilité", "Tag"]);
    for p in sorted.iter().take(top) {
        table.add_row(vec![
            Cell::new(p.number),
            Cell::new(format!("{:.4}", p.probability)),
            tag_cell(&p.tag),
        ]);
    }
    println!("{table}");
}

pub fn display_forecast(game: Game, forecast: &EnsembleForecast) {
    println!("\n== Prédiction {} ==\n", game);

    let mut table = new_table(vec!["Modèle", "Poids", "Confiance", "Top picks"]);
    for report in &forecast.models {
        table.add_row(vec![
            report.name.clone(),
            format!("{:.3}", report.weight),
            format!("{:.0}%", report.confidence * 100.0),
            join_numbers(&report.top),
        ]);
    }
    println!("{table}");

    println!("\nNuméros retenus : {}", join_numbers(&forecast.numbers));
    if let Some(bonus) = forecast.bonus {
        println!("Bonus           : {}", bonus);
    }
    println!(
        "Confiance       : {:.0}%",
        forecast.confidence * 100.0
    );
    if forecast.thin_history {
        println!("(Historique maigre : confiance réduite)");
    }
}

pub fn display_patterns(summary: &PatternSummary) {
    println!("\nStructure de la grille :");
    println!("  Paires consécutives : {}", summary.consecutive_pairs);
    println!("  Pairs/Impairs       : {}/{}", summary.even, summary.odd);
    println!(
        "  Répartition         : bas({}) milieu({}) haut({})",
        summary.low, summary.mid, summary.high
    );
}

pub fn display_tickets(tickets: &[Ticket]) {
    println!("\n== Grilles suggérées ==\n");

    let mut table = new_table(vec!["#", "Numéros", "Bonus", "Score"]);
    for (i, ticket) in tickets.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            join_numbers(&ticket.numbers),
            ticket
                .bonus
                .map(|b| b.to_string())
                .unwrap_or_else(|| "—".to_string()),
            format!("{:.2}", ticket.score),
        ]);
    }
    println!("{table}");
}

pub fn display_calibration_results(calibrations: &[ModelCalibration], windows: &[usize]) {
    println!("\n== Résultats de calibration ==\n");

    let mut header: Vec<String> = vec!["Modèle".to_string()];
    for w in windows {
        header.push(format!("w={}", w));
    }
    header.push("Best".to_string());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(&header);

    for cal in calibrations {
        let mut row: Vec<String> = vec![cal.model_name.clone()];
        for w in windows {
            let ll = cal
                .results
                .iter()
                .find(|r| r.window == *w)
                .map(|r| format!("{:.3}", r.log_likelihood))
                .unwrap_or_else(|| "—".to_string());
            row.push(ll);
        }
        row.push(format!("w={} ({:.3})", cal.best_window, cal.best_ll));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_weights(weights: &EnsembleWeights) {
    println!("\n== Poids de l'ensemble ({}) ==\n", weights.game);

    let mut table = new_table(vec!["Modèle", "Poids"]);
    for (name, weight) in &weights.weights {
        table.add_row(vec![name.clone(), format!("{:.3}", weight)]);
    }
    println!("{table}");
}

pub fn display_props(player: &str, report: &PlayerPropReport) {
    println!("\n== Props {} ==\n", player);

    let mut table = new_table(vec![
        "Catégorie",
        "Projection",
        "Ligne",
        "Reco",
        "Edge",
        "Confiance",
        "Plage",
    ]);
    for prop in &report.props {
        table.add_row(vec![
            prop.category.clone(),
            format!("{:.1}", prop.projection),
            format!("{:.1}", prop.line),
            prop.call.to_string(),
            format!("{:.1}%", prop.edge_pct),
            format!("{:.0}%", prop.confidence * 100.0),
            format!(
                "{:.0}–{:.0} (moy {:.1})",
                prop.range.low, prop.range.high, prop.range.avg
            ),
        ]);
    }
    println!("{table}");

    println!(
        "Confiance globale (régularité) : {:.0}%",
        report.confidence * 100.0
    );
}

fn factor_label(factor: &KeyFactor) -> String {
    let side_label = |side: &Side| match side {
        Side::Home => "domicile",
        Side::Away => "extérieur",
        Side::Push => "égalité",
    };
    match factor {
        KeyFactor::Injuries { side, count } => {
            format!("Équipe {} : {} blessés", side_label(side), count)
        }
        KeyFactor::HotStreak(side) => format!("Équipe {} en série chaude", side_label(side)),
        KeyFactor::Slump(side) => format!("Équipe {} en difficulté", side_label(side)),
        KeyFactor::HomeEdge => "Avantage du terrain : ~5%".to_string(),
        KeyFactor::OffenseOutpacesDefense(side) => format!(
            "Attaque {} nettement au-dessus de sa défense",
            side_label(side)
        ),
    }
}

pub fn display_game(home_team: &str, away_team: &str, forecast: &GameForecast) {
    println!("\n== {} vs {} ==\n", home_team, away_team);

    println!(
        "Score projeté : {} {:.0} — {:.0} {}",
        home_team, forecast.projected.home, forecast.projected.away, away_team
    );
    println!(
        "Vainqueur     : {} (marge {:.0}, confiance {:.0}%)",
        forecast.projected.winner,
        forecast.projected.margin,
        forecast.projected.confidence * 100.0
    );
    println!(
        "Total         : {} (projeté {:.1}, ligne {:.1}, confiance {:.0}%)",
        forecast.total.call,
        forecast.total.projected_total,
        forecast.total.line,
        forecast.total.confidence * 100.0
    );
    println!(
        "Spread        : {} contre la ligne {:+.1} (confiance {:.0}%)",
        forecast.spread.pick,
        forecast.spread.line,
        forecast.spread.confidence * 100.0
    );
    println!("Risque        : {}", forecast.risk);

    if !forecast.factors.is_empty() {
        println!("\nFacteurs clés :");
        for factor in &forecast.factors {
            println!("  - {}", factor_label(factor));
        }
    }
}

pub fn display_lineups(outcomes: &[LineupOutcome]) {
    for outcome in outcomes {
        match outcome {
            LineupOutcome::Filled(lineup) => {
                println!("\n== Composition {} ==\n", lineup.strategy);

                let mut table = new_table(vec![
                    "Poste",
                    "Joueur",
                    "Équipe",
                    "Salaire",
                    "Projection",
                    "Valeur",
                    "Détention",
                ]);
                for projection in &lineup.players {
                    table.add_row(vec![
                        projection.player.position.clone(),
                        projection.player.name.clone(),
                        projection.player.team.clone(),
                        format!("{} $", projection.player.salary),
                        format!("{:.1}", projection.points),
                        format!("{:.1}", projection.value),
                        format!("{:.0}%", projection.ownership),
                    ]);
                }
                println!("{table}");

                println!(
                    "Salaire total : {} $ | Points projetés : {:.1} | Détention moyenne : {:.1}% | Levier : {}",
                    lineup.total_salary,
                    lineup.projected_points,
                    lineup.avg_ownership,
                    lineup.leverage
                );
            }
            LineupOutcome::Infeasible { strategy, unfilled } => {
                println!("\n== Composition {} ==\n", strategy);
                println!("Aucune composition possible sous le budget.");
                for (position, count) in unfilled {
                    println!("  Slot \"{}\" : {} place(s) non pourvue(s)", position, count);
                }
            }
        }
    }
}
