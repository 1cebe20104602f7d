use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use ndarray::{Array2, ArrayView1};

use crate::band::{Bands, Index};
use crate::multiset::Multiset;
use crate::term::Term;

/// Evidence gathered per character type and target position, before expansion into occurrences.
#[derive(Clone, Debug)]
pub(crate) struct Evidence {
    chars: Vec<char>,
    rows: HashMap<char, usize>,
    counts: Array2<i64>,
}

impl Evidence {
    fn with_chars(chars: impl IntoIterator<Item = char>, len_d: usize) -> Self {
        let chars = chars.into_iter().sorted().dedup().collect_vec();
        let rows = chars.iter().enumerate().map(|(i, c)| (*c, i)).collect();

        Self {
            counts: Array2::zeros((chars.len(), len_d)),
            chars,
            rows,
        }
    }

    #[inline]
    fn add(&mut self, c: char, id: usize, delta: i64) {
        if let Some(row) = self.rows.get(&c) {
            self.counts[(*row, id)] += delta;
        }
    }

    pub(crate) fn row(&self, c: char) -> Option<ArrayView1<'_, i64>> {
        self.rows.get(&c).map(|row| self.counts.row(*row))
    }

    pub(crate) fn chars(&self) -> &[char] {
        &self.chars
    }
}

/// The terms of an equation along with everything the accumulators need to know about them.
pub(crate) struct Accumulator<'a> {
    pub(crate) a: &'a [char],
    pub(crate) b: &'a [char],
    pub(crate) c: &'a [char],
    pub(crate) len_d: usize,
    pub(crate) target: &'a Multiset,
    pub(crate) bands: &'a Bands,
}

impl Accumulator<'_> {
    fn term(&self, term: Term) -> &[char] {
        match term {
            Term::A => self.a,
            Term::B => self.b,
            Term::C => self.c,
            Term::D => &[],
        }
    }

    #[inline]
    fn target_position(&self, id: Index) -> Option<usize> {
        usize::try_from(id).ok().filter(|id| *id < self.len_d)
    }

    /// Character-position arithmetic over every triple of positions in `A`, `B` and `C`.
    ///
    /// Each triple votes against `A[iA]` and for `B[iB]` and `C[iC]` at position `iB + iC - iA`.
    /// The result is shifted so that its minimum is zero if any cell went negative.
    pub(crate) fn exhaustive(&self, virtual_markers: bool) -> Evidence {
        let mut evidence = Evidence::with_chars(self.a.iter().chain(self.b).chain(self.c).copied(), self.len_d);
        let (len_a, len_b, len_c) = (self.a.len() as Index, self.b.len() as Index, self.c.len() as Index);

        if virtual_markers {
            // anchor B and C on either edge of D
            for (x, shift) in [(self.b, len_c - len_a), (self.c, len_b - len_a)] {
                for (ix, ch) in x.iter().enumerate() {
                    let ix = ix as Index;
                    for id in [ix, ix + shift].into_iter().filter_map(|id| self.target_position(id)) {
                        evidence.add(*ch, id, 1);
                    }
                }
            }
        }

        for ((ia, ca), (ib, cb), (ic, cc)) in itertools::iproduct!(
            self.a.iter().enumerate(),
            self.b.iter().enumerate(),
            self.c.iter().enumerate()
        ) {
            let Some(id) = self.target_position(ib as Index + ic as Index - ia as Index) else { continue };
            evidence.add(*ca, id, -1);
            evidence.add(*cb, id, 1);
            evidence.add(*cc, id, 1);
        }

        let min = evidence.counts.iter().copied().min().unwrap_or(0);
        if min < 0 {
            evidence.counts.mapv_inplace(|count| count - min);
        }

        evidence
    }

    /// Character-position arithmetic restricted to the diagonal bands, summed over both orders of `B` and `C`.
    pub(crate) fn banded(&self, virtual_markers: bool) -> Evidence {
        let mut evidence = Evidence::with_chars(self.target.chars(), self.len_d);

        for b in [Term::B, Term::C] {
            self.banded_pass(&mut evidence, b, virtual_markers);
        }

        evidence
    }

    fn banded_pass(&self, evidence: &mut Evidence, b: Term, virtual_markers: bool) {
        let (x, y) = (self.term(b), self.term(b.counterpart()));

        let mut anchors = Vec::new();
        if virtual_markers {
            anchors.push((-1, -1));
        }
        anchors.extend(self.a.iter().enumerate()
            .cartesian_product(x.iter().enumerate())
            .filter(|((_, ca), (_, cx))| ca == cx)
            .map(|((ia, _), (ix, _))| (ia as Index, ix as Index))
            .filter(|(ia, ix)| self.bands.inside(Term::A, b, *ia, *ix)));
        if virtual_markers {
            anchors.push((self.a.len() as Index, x.len() as Index));
        }

        for (ia, ix) in anchors {
            self.vote(evidence, b, y, ia, ix);
        }
    }

    /// Given `A[ia]` aligned with `b[ib]`, vote for each character of the other term at its implied position in `D`.
    fn vote(&self, evidence: &mut Evidence, b: Term, y: &[char], ia: Index, ib: Index) {
        for (iy, cy) in y.iter().enumerate() {
            let iy = iy as Index;
            if !self.target.contains(*cy) || !self.bands.inside_all(b, b.counterpart(), ia, ib, iy) {
                continue;
            }
            if let Some(id) = self.target_position(ib + iy - ia) {
                evidence.add(*cy, id, 1);
            }
        }
    }
}

/// A square score matrix: one row per occurrence of a character of `D` in canonical order, one column per position.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMatrix {
    pub(crate) rows: Vec<char>,
    pub(crate) cells: Array2<i64>,
}

impl ScoreMatrix {
    /// Expand per-character evidence so that every occurrence in `canonical` gets its own copy of its character's row.
    pub(crate) fn expand(evidence: &Evidence, canonical: &[char]) -> Self {
        let len_d = canonical.len();
        let mut cells = Array2::zeros((len_d, len_d));
        for (row, c) in canonical.iter().enumerate() {
            if let Some(scores) = evidence.row(*c) {
                cells.row_mut(row).assign(&scores);
            }
        }

        Self { rows: canonical.to_vec(), cells }
    }

    /// Character of each row.
    pub fn rows(&self) -> &[char] {
        &self.rows
    }

    /// The scores, rows by positions.
    pub fn cells(&self) -> &Array2<i64> {
        &self.cells
    }

    /// Number of positions in `D`, which is also the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether `D` is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Display for ScoreMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let width = self.cells.iter()
            .map(|cell| cell.to_string().len())
            .chain((0..self.len()).map(|col| col.to_string().len()))
            .max()
            .unwrap_or(1);

        write!(f, " ")?;
        for col in 0..self.len() {
            write!(f, " {col:>width$}")?;
        }
        writeln!(f)?;

        for (c, row) in self.rows.iter().zip(self.cells.rows()) {
            write!(f, "{c}")?;
            for cell in row {
                match cell {
                    0 => write!(f, " {:>width$}", '.')?,
                    _ => write!(f, " {cell:>width$}")?,
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
