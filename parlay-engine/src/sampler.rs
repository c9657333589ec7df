use anyhow::Result;
use chrono::Datelike;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;

use parlay_db::models::{DrawRecord, GameRules, Ticket};

/// Seed déterministe basé sur la date du jour (YYYYMMDD) : la sortie du
/// jour est reproductible.
pub fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

/// Nombre de numéros de `a` absents de `b`.
fn ticket_distance(a: &[u8], b: &[u8]) -> usize {
    a.iter().filter(|x| !b.contains(x)).count()
}

/// Sélection gloutonne : meilleur score d'abord, avec diversité minimum
/// entre paires de grilles.
fn select_diverse(candidates: &[Ticket], count: usize, min_diff: usize) -> Vec<Ticket> {
    // candidates doit déjà être trié par score décroissant
    let mut selected: Vec<Ticket> = Vec::with_capacity(count);

    for candidate in candidates {
        if selected.len() >= count {
            break;
        }
        let dominated = selected
            .iter()
            .any(|s| ticket_distance(&candidate.numbers, &s.numbers) < min_diff);
        if !dominated {
            selected.push(candidate.clone());
        }
    }

    // Repli : compléter avec les meilleurs restants si la contrainte de
    // diversité a trop éliminé.
    if selected.len() < count {
        for candidate in candidates {
            if selected.len() >= count {
                break;
            }
            if !selected
                .iter()
                .any(|s| s.numbers == candidate.numbers && s.bonus == candidate.bonus)
            {
                selected.push(candidate.clone());
            }
        }
    }

    selected
}

/// Grille déterministe : les `pick_count` numéros les plus probables.
pub fn optimal_ticket(
    distribution: &[f64],
    bonus_distribution: Option<&[f64]>,
    rules: GameRules,
) -> Ticket {
    let mut indices: Vec<usize> = (0..distribution.len()).collect();
    indices.sort_by(|&a, &b| {
        distribution[b]
            .partial_cmp(&distribution[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut numbers: Vec<u8> = indices
        .iter()
        .take(rules.pick_count)
        .map(|&i| (i + 1) as u8)
        .collect();
    numbers.sort();

    let bonus = bonus_distribution.map(|dist| {
        let best = dist
            .iter()
            .enumerate()
            .max_by(|&(ia, a), &(ib, b)| {
                a.partial_cmp(b)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(ib.cmp(&ia))
            })
            .map(|(i, _)| (i + 1) as u8);
        best.unwrap_or(1)
    });

    let uniform = 1.0 / distribution.len() as f64;
    let score: f64 = numbers
        .iter()
        .map(|&n| distribution[(n - 1) as usize] / uniform)
        .product();

    Ticket {
        numbers,
        bonus,
        score,
    }
}

/// Génère `count` grilles par échantillonnage pondéré sans remise, avec
/// suréchantillonnage puis sélection diversifiée.
pub fn generate_tickets(
    distribution: &[f64],
    bonus_distribution: Option<&[f64]>,
    rules: GameRules,
    count: usize,
    seed: u64,
    oversample: usize,
    min_diff: usize,
) -> Result<Vec<Ticket>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let uniform = 1.0 / distribution.len() as f64;

    let n_candidates = count * oversample.max(1);
    let mut candidates = Vec::with_capacity(n_candidates);

    for _ in 0..n_candidates {
        let (mut numbers, score) =
            sample_without_replacement(distribution, rules.pick_count, uniform, &mut rng)?;
        numbers.sort();

        let bonus = match bonus_distribution {
            Some(dist) => {
                let weighted = WeightedIndex::new(dist.iter().copied())?;
                Some((weighted.sample(&mut rng) + 1) as u8)
            }
            None => None,
        };

        candidates.push(Ticket {
            numbers,
            bonus,
            score,
        });
    }

    // Trier par score décroissant
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(select_diverse(&candidates, count, min_diff))
}

fn sample_without_replacement(
    probs: &[f64],
    count: usize,
    uniform_prob: f64,
    rng: &mut StdRng,
) -> Result<(Vec<u8>, f64)> {
    let mut available: Vec<(u8, f64)> = probs
        .iter()
        .enumerate()
        .map(|(i, &p)| ((i + 1) as u8, p))
        .collect();
    let mut selected = Vec::with_capacity(count);
    let mut score = 1.0f64;

    for _ in 0..count {
        let weights: Vec<f64> = available.iter().map(|(_, w)| *w).collect();
        let dist = WeightedIndex::new(&weights)?;
        let idx = dist.sample(rng);

        let (number, prob) = available.remove(idx);
        selected.push(number);
        score *= prob / uniform_prob;
    }

    Ok((selected, score))
}

/// Distribution du bonus : fréquences observées + lissage.
pub fn bonus_distribution(history: &[DrawRecord], rules: GameRules) -> Option<Vec<f64>> {
    let max = rules.bonus_size?;
    let mut counts = vec![1.0f64; max as usize];
    for record in history {
        if let Some(b) = record.bonus {
            let idx = (b - 1) as usize;
            if idx < counts.len() {
                counts[idx] += 1.0;
            }
        }
    }
    let total: f64 = counts.iter().sum();
    Some(counts.iter().map(|c| c / total).collect())
}
