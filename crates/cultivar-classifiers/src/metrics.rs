//! Classification metrics.
//!
//! Weighted averages weight each per-class score by that class's share of
//! the true labels. A class with no predicted (or no true) samples scores
//! zero rather than poisoning the average with NaN.

/// Fraction of predictions that match the truth.
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> f32 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = truth
        .iter()
        .zip(predicted.iter())
        .filter(|(t, p)| t == p)
        .count();
    hits as f32 / truth.len() as f32
}

struct ClassTally {
    tp: usize,
    fp: usize,
    fn_: usize,
    support: usize,
}

fn tally(truth: &[usize], predicted: &[usize], n_classes: usize) -> Vec<ClassTally> {
    let mut tallies: Vec<ClassTally> = (0..n_classes)
        .map(|_| ClassTally {
            tp: 0,
            fp: 0,
            fn_: 0,
            support: 0,
        })
        .collect();
    for (&t, &p) in truth.iter().zip(predicted.iter()) {
        tallies[t].support += 1;
        if t == p {
            tallies[t].tp += 1;
        } else {
            tallies[p].fp += 1;
            tallies[t].fn_ += 1;
        }
    }
    tallies
}

fn weighted<F>(truth: &[usize], predicted: &[usize], n_classes: usize, score: F) -> f32
where
    F: Fn(&ClassTally) -> f32,
{
    if truth.is_empty() {
        return 0.0;
    }
    let tallies = tally(truth, predicted, n_classes);
    let total = truth.len() as f32;
    tallies
        .iter()
        .map(|t| score(t) * t.support as f32 / total)
        .sum()
}

pub fn weighted_precision(truth: &[usize], predicted: &[usize], n_classes: usize) -> f32 {
    weighted(truth, predicted, n_classes, |t| {
        let denom = t.tp + t.fp;
        if denom == 0 {
            0.0
        } else {
            t.tp as f32 / denom as f32
        }
    })
}

pub fn weighted_recall(truth: &[usize], predicted: &[usize], n_classes: usize) -> f32 {
    weighted(truth, predicted, n_classes, |t| {
        let denom = t.tp + t.fn_;
        if denom == 0 {
            0.0
        } else {
            t.tp as f32 / denom as f32
        }
    })
}

pub fn weighted_f1(truth: &[usize], predicted: &[usize], n_classes: usize) -> f32 {
    weighted(truth, predicted, n_classes, |t| {
        let p_denom = t.tp + t.fp;
        let r_denom = t.tp + t.fn_;
        if p_denom == 0 || r_denom == 0 {
            return 0.0;
        }
        let p = t.tp as f32 / p_denom as f32;
        let r = t.tp as f32 / r_denom as f32;
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    })
}
