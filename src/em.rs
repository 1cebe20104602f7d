use ndarray::{Array2, Axis};

use crate::evidence::ScoreMatrix;

/// Outcome of a refinement run.
#[derive(Clone, Debug)]
pub(crate) struct Refined {
    pub(crate) probabilities: Array2<f64>,
    pub(crate) steps: usize,
    pub(crate) converged: bool,
}

/// Treat the scores as co-occurrence counts between character occurrences and positions and iterate
/// expectation-maximisation on the translation table `t(character | position)`.
///
/// Stops once no cell moves by `1 / lenD^2` or more, or after `max_iterations` steps, whichever comes first.
pub(crate) fn refine(matrix: &ScoreMatrix, max_iterations: usize) -> Refined {
    let mut t = matrix.cells.mapv(|cell| cell as f64);
    let len_d = matrix.len();
    if len_d == 0 {
        return Refined { probabilities: t, steps: 0, converged: true };
    }

    // columns summing to zero are left alone
    for mut column in t.columns_mut() {
        let sum = column.sum();
        if sum != 0.0 {
            column.mapv_inplace(|cell| cell / sum);
        }
    }

    let epsilon = 1.0 / (len_d * len_d) as f64;
    let mut steps = 0;
    while steps < max_iterations {
        steps += 1;

        // expected counts: each row spreads one unit of mass across positions
        let mut counts = t.clone();
        for mut row in counts.rows_mut() {
            let sum = row.sum();
            if sum != 0.0 {
                row.mapv_inplace(|cell| cell / sum);
            } else {
                row.fill(0.0);
            }
        }
        let totals = counts.sum_axis(Axis(0));

        let mut delta: f64 = 0.0;
        for (((_, col), cell), count) in t.indexed_iter_mut().zip(counts.iter()) {
            let updated = if totals[col] != 0.0 { count / totals[col] } else { 0.0 };
            delta = delta.max((updated - *cell).abs());
            *cell = updated;
        }

        if delta < epsilon {
            return Refined { probabilities: t, steps, converged: true };
        }
    }

    Refined { probabilities: t, steps, converged: false }
}

/// Scale probabilities back to integer scores for the assignment step.
pub(crate) fn rescale(probabilities: &Array2<f64>, rows: &[char]) -> ScoreMatrix {
    let factor = (rows.len() * 10) as f64;

    ScoreMatrix {
        rows: rows.to_vec(),
        cells: probabilities.mapv(|p| (p * factor).round() as i64),
    }
}
