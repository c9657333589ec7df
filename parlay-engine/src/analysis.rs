use parlay_db::models::{DrawRecord, GameRules, NumberProbability, NumberStats, ProbabilityTag};

/// Fréquence et retard (tirages depuis la dernière sortie) par numéro.
pub fn compute_stats(history: &[DrawRecord], rules: GameRules) -> Vec<NumberStats> {
    let size = rules.size();
    let mut stats: Vec<NumberStats> = (1..=rules.pool_size)
        .map(|n| NumberStats {
            number: n,
            frequency: 0,
            gap: history.len() as u32,
        })
        .collect();

    for (t, record) in history.iter().enumerate() {
        let age = (history.len() - 1 - t) as u32;
        for &n in &record.numbers {
            let idx = (n - 1) as usize;
            if idx < size {
                stats[idx].frequency += 1;
                if age < stats[idx].gap {
                    stats[idx].gap = age;
                }
            }
        }
    }

    stats
}

pub fn to_probabilities(distribution: &[f64], rules: GameRules) -> Vec<NumberProbability> {
    let mut probs: Vec<NumberProbability> = distribution
        .iter()
        .enumerate()
        .map(|(i, &p)| NumberProbability {
            number: (i + 1) as u8,
            probability: p,
            tag: ProbabilityTag::Normal,
        })
        .collect();
    tag_probabilities(&mut probs, rules);
    probs
}

/// Étiquette HOT/COLD selon l'écart relatif à l'uniforme.
pub fn tag_probabilities(probs: &mut [NumberProbability], rules: GameRules) {
    let uniform = 1.0 / rules.size() as f64;
    let threshold = 0.3;

    for p in probs.iter_mut() {
        let deviation = (p.probability - uniform) / uniform;
        if deviation > threshold {
            p.tag = ProbabilityTag::Hot;
        } else if deviation < -threshold {
            p.tag = ProbabilityTag::Cold;
        } else {
            p.tag = ProbabilityTag::Normal;
        }
    }
}

/// Les `count` numéros les plus fréquents, fréquence décroissante.
pub fn hot_numbers(stats: &[NumberStats], count: usize) -> Vec<u8> {
    let mut sorted: Vec<&NumberStats> = stats.iter().collect();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.number.cmp(&b.number)));
    sorted.iter().take(count).map(|s| s.number).collect()
}

/// Les `count` numéros les moins fréquents, fréquence croissante.
pub fn cold_numbers(stats: &[NumberStats], count: usize) -> Vec<u8> {
    let mut sorted: Vec<&NumberStats> = stats.iter().collect();
    sorted.sort_by(|a, b| a.frequency.cmp(&b.frequency).then(a.number.cmp(&b.number)));
    sorted.iter().take(count).map(|s| s.number).collect()
}

/// Résumé structurel d'une grille : suites consécutives, parité,
/// répartition par tiers de la pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSummary {
    pub consecutive_pairs: usize,
    pub even: usize,
    pub odd: usize,
    pub low: usize,
    pub mid: usize,
    pub high: usize,
}

pub fn detect_patterns(numbers: &[u8], rules: GameRules) -> PatternSummary {
    let mut sorted = numbers.to_vec();
    sorted.sort();

    let consecutive_pairs = sorted.windows(2).filter(|w| w[1] - w[0] == 1).count();
    let even = numbers.iter().filter(|n| *n % 2 == 0).count();
    let odd = numbers.len() - even;

    let third = rules.pool_size / 3;
    let low = numbers.iter().filter(|&&n| n <= third).count();
    let mid = numbers.iter().filter(|&&n| n > third && n <= third * 2).count();
    let high = numbers.len() - low - mid;

    PatternSummary {
        consecutive_pairs,
        even,
        odd,
        low,
        mid,
        high,
    }
}
