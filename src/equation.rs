use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;
use thiserror::Error;

use crate::assignment::Assignment;
use crate::band::Bands;
use crate::config::SolverConfig;
use crate::em;
use crate::enumerate;
use crate::evidence::{Accumulator, ScoreMatrix};
use crate::multiset::Multiset;
use crate::similarity::{LcsSimilarity, Similarity, SimilarityTable};

/// Whether to read off the one solution the assignment gives or every solution tied with it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum SolutionMode {
    /// The string induced by the optimal assignment, and only it.
    Unique,
    /// Every string reachable by swapping in characters that score as well as the assigned ones.
    #[default]
    All,
}

/// An analogical equation `A : B :: C : x`, ready to be solved once.
///
/// Construction counts characters and queries the similarity oracle; [`solve`](Self::solve) consumes the equation.
#[derive(Clone, Debug)]
pub struct Equation {
    a: Vec<char>,
    b: Vec<char>,
    c: Vec<char>,
    expected: Option<String>,
    len_d: isize,
    target: Multiset,
    canonical: Vec<char>,
    bands: Bands,
}

impl Equation {
    /// Set up `a : b :: c : x` with the default [`LcsSimilarity`].
    pub fn new(a: &str, b: &str, c: &str) -> Self {
        Self::with_similarity(a, b, c, &LcsSimilarity)
    }

    /// Set up `a : b :: c : x`, scoring similarities with `oracle`.
    pub fn with_similarity(a: &str, b: &str, c: &str, oracle: &dyn Similarity) -> Self {
        let (a_chars, b_chars, c_chars) = (a.chars().collect_vec(), b.chars().collect_vec(), c.chars().collect_vec());
        let len_d = b_chars.len() as isize + c_chars.len() as isize - a_chars.len() as isize;
        let target = Multiset::derive(&Multiset::of(&a_chars), &Multiset::of(&b_chars), &Multiset::of(&c_chars));
        let canonical = target.canonical();
        let similarities = SimilarityTable::new(oracle, a, b, c);
        let lengths = [a_chars.len() as isize, b_chars.len() as isize, c_chars.len() as isize, len_d];

        Self {
            a: a_chars,
            b: b_chars,
            c: c_chars,
            expected: None,
            len_d,
            target,
            canonical,
            bands: Bands::new(lengths, similarities),
        }
    }

    /// Attach a known answer, checked against the solutions after solving. It plays no part in solving.
    pub fn with_expected(mut self, d: &str) -> Self {
        self.expected = Some(d.to_owned());
        self
    }

    /// The known answer, if any.
    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    /// `|B| + |C| - |A|`, possibly negative.
    pub fn len_d(&self) -> isize {
        self.len_d
    }

    /// `B + C - A` as a signed multiset.
    pub fn target(&self) -> &Multiset {
        &self.target
    }

    /// Characters of the target multiset, one per occurrence, in ascending order.
    pub fn canonical(&self) -> String {
        self.canonical.iter().collect()
    }

    /// An equation is feasible iff the length and every character count of `D` are non-negative.
    pub fn is_feasible(&self) -> bool {
        self.len_d >= 0 && self.target.is_non_negative()
    }

    fn accumulator(&self) -> Accumulator<'_> {
        Accumulator {
            a: &self.a,
            b: &self.b,
            c: &self.c,
            len_d: self.canonical.len(),
            target: &self.target,
            bands: &self.bands,
        }
    }

    /// Gather evidence and, if configured, refine it: the matrix the assignment runs on.
    ///
    /// Returns [`None`] for infeasible equations.
    pub fn score_matrix(&self, config: &SolverConfig) -> Option<ScoreMatrix> {
        if !self.is_feasible() {
            return None;
        }

        let accumulator = self.accumulator();
        let evidence = match config.diagonal_band {
            true => accumulator.banded(config.virtual_markers),
            false => accumulator.exhaustive(config.virtual_markers),
        };
        log::debug!("{self}: evidence gathered over {} character(s)", evidence.chars().len());

        let matrix = ScoreMatrix::expand(&evidence, &self.canonical);
        log::trace!("{self}: evidence\n{matrix}");

        if !config.expectation_maximisation {
            return Some(matrix);
        }

        let refined = em::refine(&matrix, config.em_max_iterations);
        if refined.converged {
            log::debug!("{self}: refinement converged in {} step(s)", refined.steps);
        } else {
            log::warn!("{self}: refinement stopped after {} step(s) without converging", refined.steps);
        }

        let matrix = em::rescale(&refined.probabilities, &self.canonical);
        log::trace!("{self}: refined\n{matrix}");
        Some(matrix)
    }

    /// Solve the equation, consuming it.
    ///
    /// An infeasible equation has no solution. An equation whose solution must be empty has exactly one, `""`.
    pub fn solve(self, config: &SolverConfig, mode: SolutionMode) -> Solutions {
        if self.len_d == 0 {
            return Solutions::new(BTreeSet::from([String::new()]), self.expected);
        }
        if !self.is_feasible() {
            log::debug!("{self}: infeasible");
            return Solutions::new(BTreeSet::new(), self.expected);
        }

        let Some(matrix) = self.score_matrix(config) else {
            return Solutions::new(BTreeSet::new(), self.expected);
        };

        let assignment: Assignment = config.assignment.assign(&matrix);
        log::debug!("{self}: {} assignment {:?} scores {}", config.assignment, assignment.pairs(), assignment.total(matrix.cells()));

        let strings = match mode {
            SolutionMode::Unique => BTreeSet::from([enumerate::unique(&matrix, &assignment)]),
            SolutionMode::All => enumerate::all(&matrix, &assignment, &self.target),
        };

        let solutions = Solutions::new(strings, self.expected.clone());
        log::debug!("{self} => {solutions}");
        solutions
    }
}

impl Display for Equation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {} :: {} : {}",
               self.a.iter().collect::<String>(),
               self.b.iter().collect::<String>(),
               self.c.iter().collect::<String>(),
               self.expected.as_deref().unwrap_or(NO_ANSWER))
    }
}

/// Marks an equation without known answer in `A : B :: C : D` notation.
const NO_ANSWER: &str = "None";

/// Why a line of `A : B :: C : D` notation could not be read.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseEquationError {
    /// The `::` separating the two ratios is missing or repeated.
    #[error("expected exactly one `::`, found {0}")]
    Proportion(usize),
    /// The left ratio does not have exactly two terms.
    #[error("expected `A : B` before `::`, found {0} term(s)")]
    LeftRatio(usize),
    /// The right ratio has neither one nor two terms.
    #[error("expected `C` or `C : D` after `::`, found {0} term(s)")]
    RightRatio(usize),
}

impl FromStr for Equation {
    type Err = ParseEquationError;

    /// Read `A : B :: C : D` notation. Terms are trimmed; `D` may be omitted or written `None`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ratios = s.split("::").collect_vec();
        let [left, right] = ratios[..] else {
            return Err(ParseEquationError::Proportion(ratios.len() - 1));
        };

        let left = left.split(':').map(str::trim).collect_vec();
        let [a, b] = left[..] else {
            return Err(ParseEquationError::LeftRatio(left.len()));
        };

        let right = right.split(':').map(str::trim).collect_vec();
        let (c, d) = match right[..] {
            [c] => (c, None),
            [c, d] => (c, Some(d).filter(|d| *d != NO_ANSWER)),
            _ => return Err(ParseEquationError::RightRatio(right.len())),
        };

        let equation = Self::new(a, b, c);
        Ok(match d {
            Some(d) => equation.with_expected(d),
            None => equation,
        })
    }
}

/// The solutions of an equation, in lexicographic order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Solutions {
    strings: BTreeSet<String>,
    verified: Option<bool>,
}

impl Solutions {
    fn new(strings: BTreeSet<String>, expected: Option<String>) -> Self {
        let verified = expected.map(|d| strings.contains(&d));
        Self { strings, verified }
    }

    /// Whether `d` solves the equation.
    pub fn contains(&self, d: &str) -> bool {
        self.strings.contains(d)
    }

    /// Number of solutions.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// True for infeasible equations.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate over the solutions in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }

    /// `Some(true)` if the equation carried an expected answer and it is among the solutions,
    /// `Some(false)` if it is not, [`None`] without an expected answer.
    pub fn verified(&self) -> Option<bool> {
        self.verified
    }

    /// The underlying set.
    pub fn into_set(self) -> BTreeSet<String> {
        self.strings
    }
}

impl IntoIterator for Solutions {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.strings.into_iter()
    }
}

impl Display for Solutions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.strings.len() {
            0 => write!(f, "{{}}"),
            1 => write!(f, "{}", self.strings.iter().join("")),
            _ => write!(f, "{{ {} }}", self.strings.iter().join(", ")),
        }
    }
}
