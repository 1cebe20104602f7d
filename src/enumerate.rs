use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::assignment::Assignment;
use crate::evidence::ScoreMatrix;
use crate::multiset::Multiset;

/// The single string induced by `assignment`.
pub(crate) fn unique(matrix: &ScoreMatrix, assignment: &Assignment) -> String {
    assignment.pairs.iter()
        .sorted_by_key(|(_, col)| *col)
        .map(|(row, _)| matrix.rows[*row])
        .collect()
}

/// Characters admissible at each position: those of every row scoring, at that position,
/// exactly what the assigned row scores there.
pub(crate) fn admissible(matrix: &ScoreMatrix, assignment: &Assignment) -> Vec<BTreeSet<char>> {
    let mut admissible = vec![BTreeSet::new(); matrix.len()];
    for (row, col) in &assignment.pairs {
        let score = matrix.cells[(*row, *col)];
        admissible[*col].extend(matrix.cells.column(*col)
            .iter()
            .zip(&matrix.rows)
            .filter(|(other, _)| **other == score)
            .map(|(_, c)| *c));
    }

    admissible
}

/// Every string built from the admissible characters whose multiset is exactly `target`.
pub(crate) fn all(matrix: &ScoreMatrix, assignment: &Assignment, target: &Multiset) -> BTreeSet<String> {
    let admissible = admissible(matrix, assignment);
    let mut remaining: BTreeMap<char, isize> = target.counts().clone();
    let mut prefix = String::with_capacity(matrix.len());
    let mut solutions = BTreeSet::new();

    search(&admissible, &mut remaining, &mut prefix, &mut solutions);
    log::trace!("admissible characters {admissible:?} yield {} solution(s)", solutions.len());

    solutions
}

fn search(
    admissible: &[BTreeSet<char>],
    remaining: &mut BTreeMap<char, isize>,
    prefix: &mut String,
    solutions: &mut BTreeSet<String>,
) {
    let Some((here, rest)) = admissible.split_first() else {
        // every placement consumed one unit and none went below zero, so the multiset matches exactly
        solutions.insert(prefix.clone());
        return;
    };

    for c in here {
        let Some(left) = remaining.get_mut(c).filter(|left| **left > 0) else { continue };
        *left -= 1;
        prefix.push(*c);

        search(rest, remaining, prefix, solutions);

        prefix.pop();
        if let Some(left) = remaining.get_mut(c) {
            *left += 1;
        }
    }
}
