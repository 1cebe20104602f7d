use std::collections::BTreeMap;

use itertools::Itertools;
use ndarray::Array2;
use strum::{Display, EnumString, VariantArray};

use crate::evidence::ScoreMatrix;

/// How character occurrences are paired with positions.
#[derive(Copy, Clone, Debug, Default, Display, EnumString, VariantArray, Eq, PartialEq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum AssignmentStrategy {
    /// Optimal assignment by the Hungarian method.
    #[default]
    Hungarian,
    /// Characters with the least ambiguous row first, each to its best open position.
    /// Faster but not guaranteed optimal.
    Entropy,
}

/// A perfect matching between rows and columns of a square matrix, as `(row, column)` pairs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Assignment {
    pub(crate) pairs: Vec<(usize, usize)>,
}

impl Assignment {
    /// The `(row, column)` pairs, sorted by row.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Sum of `matrix` over the assigned cells.
    pub fn total(&self, matrix: &Array2<i64>) -> i64 {
        self.pairs.iter().map(|ix| matrix[*ix]).sum()
    }

    fn sorted(mut pairs: Vec<(usize, usize)>) -> Self {
        pairs.sort_unstable();
        Self { pairs }
    }
}

impl AssignmentStrategy {
    pub(crate) fn assign(&self, matrix: &ScoreMatrix) -> Assignment {
        match self {
            Self::Hungarian => {
                // maximise score = minimise (max - score)
                let max = matrix.cells.iter().copied().max().unwrap_or(0);
                hungarian(&matrix.cells.mapv(|score| max - score))
            }
            Self::Entropy => increasing_entropies(matrix),
        }
    }
}

/// Minimum-cost perfect matching on a square cost matrix.
///
/// Shortest augmenting paths with row and column potentials, `O(n^3)`.
pub fn hungarian(cost: &Array2<i64>) -> Assignment {
    let n = cost.nrows();
    assert_eq!(n, cost.ncols(), "assignment needs a square matrix");

    const INF: i64 = i64::MAX / 4;
    // 1-indexed; column 0 and row 0 are sentinels
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n + 1];
    // row matched to each column
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut min_v = vec![INF; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost[(i0 - 1, j - 1)] - u[i0] - v[j];
                if reduced < min_v[j] {
                    min_v[j] = reduced;
                    way[j] = j0;
                }
                if min_v[j] < delta {
                    delta = min_v[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_v[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // flip the augmenting path
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    Assignment::sorted((1..=n).map(|j| (p[j] - 1, j - 1)).collect_vec())
}

/// Shannon entropy in bits of the distribution proportional to `weights`.
///
/// All-zero (or empty) input has entropy 0, as `p log p` tends to 0 with `p`.
pub fn entropy(weights: &[f64]) -> f64 {
    let sum: f64 = weights.iter().sum();
    if sum == 0.0 {
        return 0.0;
    }

    -weights.iter()
        .map(|w| w / sum)
        .filter(|p| *p > 0.0)
        .map(|p| p * p.log2())
        .sum::<f64>()
}

/// Greedy assignment, least ambiguous characters first.
///
/// Each round scores every character still to be placed by the entropy of its row over the open positions.
/// Every character tied for the lowest entropy places its last remaining occurrence at its best open position,
/// which is then closed for all rows.
fn increasing_entropies(matrix: &ScoreMatrix) -> Assignment {
    let n = matrix.len();
    let mut scores = matrix.cells.clone();
    let mut open = vec![true; n];
    let mut pairs = Vec::with_capacity(n);

    // rows of a character are contiguous in canonical order
    let mut first_row: BTreeMap<char, usize> = BTreeMap::new();
    let mut remaining: BTreeMap<char, usize> = BTreeMap::new();
    for (row, c) in matrix.rows.iter().enumerate() {
        first_row.entry(*c).or_insert(row);
        *remaining.entry(*c).or_default() += 1;
    }

    while pairs.len() < n {
        let entropies = remaining.iter()
            .filter(|(_, left)| **left > 0)
            .map(|(c, left)| {
                let row = scores.row(first_row[c] + left - 1)
                    .iter()
                    .zip(&open)
                    .filter(|(_, is_open)| **is_open)
                    .map(|(score, _)| *score as f64)
                    .collect_vec();
                (*c, entropy(&row))
            })
            .collect_vec();
        let min = entropies.iter().map(|(_, h)| *h).fold(f64::INFINITY, f64::min);
        log::trace!("row entropies {entropies:?}");

        for (c, _) in entropies.into_iter().filter(|(_, h)| *h == min) {
            let Some(left) = remaining.get_mut(&c) else { continue };
            let row = first_row[&c] + *left - 1;

            // highest score among open positions, leftmost on ties
            let Some(col) = (0..n)
                .filter(|col| open[*col])
                .fold(None, |best: Option<usize>, col| match best {
                    Some(b) if scores[(row, b)] >= scores[(row, col)] => Some(b),
                    _ => Some(col),
                })
            else {
                break;
            };

            *left -= 1;
            open[col] = false;
            scores.column_mut(col).fill(0);
            pairs.push((row, col));
        }
    }

    Assignment::sorted(pairs)
}
