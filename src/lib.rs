#![warn(missing_docs)]

//! # `analogia`
//!
//! A solver for formal analogical equations `A : B :: C : x` over strings, read "A is to B as C is to x".
//! Build an [`Equation`], then call [`solve()`](Equation::solve) with a [`SolverConfig`], consuming the equation and
//! yielding its [`Solutions`].
//!
//! ```
//! use analogia::{Equation, SolutionMode, SolverConfig};
//!
//! let solutions = Equation::new("walk", "walked", "talk").solve(&SolverConfig::default(), SolutionMode::All);
//! assert!(solutions.contains("talked"));
//! ```
//!
//! # Internals
//! The solver works by character-position arithmetic.
//! The characters of any solution are known in advance: `D` must hold `B + C - A` as a multiset, and have
//! `|B| + |C| - |A|` characters.
//! If either is negative there is no solution; otherwise only the order of those characters remains to be found.
//!
//! A high level overview is as follows:
//!
//! 1. Gather evidence for character `c` being at position `iD` of `D`.
//! Whenever `A[iA] = B[iB]`, the character `C[iC]` should appear in `D` at `iB + iC - iA`, and the same holds with
//! `B` and `C` exchanged.
//! Alignments are only counted inside a diagonal band whose width is set by the similarity of the terms
//! (longest common subsequence by default, see [`Similarity`]).
//! Virtual markers before the first and after the last characters anchor evidence to the edges of the terms.
//! 2. Optionally refine the evidence by expectation-maximisation into a table of `t(character | position)`.
//! 3. Solve the resulting assignment problem between occurrences of characters and positions, either optimally by
//! the Hungarian method or greedily, least ambiguous characters first.
//! 4. Read off the solution, or every string obtained by exchanging characters which score as well as the
//! assigned ones at some position while keeping the multiset intact.

pub use assignment::{entropy, hungarian, Assignment, AssignmentStrategy};
pub use config::{ConfigError, SolverConfig, SolverConfigBuilder, DEFAULT_EM_MAX_ITERATIONS};
pub use equation::{Equation, ParseEquationError, SolutionMode, Solutions};
pub use evidence::ScoreMatrix;
pub use multiset::Multiset;
pub use similarity::{LcsSimilarity, Similarity, SimilarityTable};
pub use term::Term;

pub(crate) mod assignment;
pub(crate) mod band;
pub(crate) mod config;
pub(crate) mod em;
pub(crate) mod enumerate;
pub(crate) mod equation;
pub(crate) mod evidence;
pub(crate) mod multiset;
pub(crate) mod similarity;
pub(crate) mod term;
mod tests;
#[cfg(feature = "wasm")]
mod wasm;
