use std::collections::HashMap;

use itertools::Itertools;
use unordered_pair::UnorderedPair;

use crate::term::Term;

/// A measure of shared substructure between two strings.
///
/// The solver only asks for `s(A, B)` and `s(A, C)`, deriving the scores involving `D` from them.
/// Implementations must be pure.
pub trait Similarity {
    /// Score the overlap between `x` and `y`. Should not exceed the length of either string.
    fn similarity(&self, x: &str, y: &str) -> usize;
}

impl<F> Similarity for F
where
    F: Fn(&str, &str) -> usize,
{
    fn similarity(&self, x: &str, y: &str) -> usize {
        self(x, y)
    }
}

/// Length of the longest common subsequence, the default similarity.
///
/// Computed with the bit-vector algorithm of Allison, Dix and Hyyrö, in `O(|x| * ceil(|y| / 64))` word operations.
#[derive(Copy, Clone, Debug, Default)]
pub struct LcsSimilarity;

const WORD: usize = u64::BITS as usize;

impl Similarity for LcsSimilarity {
    fn similarity(&self, x: &str, y: &str) -> usize {
        lcs_length(&x.chars().collect_vec(), &y.chars().collect_vec())
    }
}

pub(crate) fn lcs_length(x: &[char], y: &[char]) -> usize {
    if x.is_empty() || y.is_empty() {
        return 0;
    }

    // bit i of the mask of c is set iff y[i] == c
    let words = y.len().div_ceil(WORD);
    let mut masks: HashMap<char, Vec<u64>> = HashMap::new();
    for (i, c) in y.iter().enumerate() {
        masks.entry(*c).or_insert_with(|| vec![0; words])[i / WORD] |= 1 << (i % WORD);
    }

    let mut v = vec![u64::MAX; words];
    for c in x {
        let Some(mask) = masks.get(c) else { continue };
        let mut carry = false;
        for (word, m) in v.iter_mut().zip(mask) {
            let u = *word & m;
            let (sum, c1) = word.overflowing_add(u);
            let (sum, c2) = sum.overflowing_add(carry as u64);
            carry = c1 || c2;
            *word = sum | (*word & !m);
        }
    }

    // zero bits within the first |y| positions count matched characters
    let tail = y.len() % WORD;
    v.iter()
        .enumerate()
        .map(|(k, word)| {
            let live = if k == words - 1 && tail != 0 { (1u64 << tail) - 1 } else { u64::MAX };
            (!word & live).count_ones() as usize
        })
        .sum()
}

/// Pairwise similarity scores between the terms of an equation.
///
/// Scores are symmetric and signed: those involving `D` are derived and may fall below zero.
#[derive(Clone, Debug)]
pub struct SimilarityTable {
    scores: HashMap<UnorderedPair<Term>, isize>,
}

impl SimilarityTable {
    /// Query `oracle` for `s(A, B)` and `s(A, C)` and derive the rest.
    ///
    /// `s(D, B) = s(A, C) - |A| + |B|` and `s(D, C) = s(A, B) - |A| + |C|`.
    pub fn new(oracle: &dyn Similarity, a: &str, b: &str, c: &str) -> Self {
        let (len_a, len_b, len_c) = (a.chars().count() as isize, b.chars().count() as isize, c.chars().count() as isize);
        let ab = oracle.similarity(a, b) as isize;
        let ac = oracle.similarity(a, c) as isize;

        Self::from_scores(ab, ac, len_a, len_b, len_c)
    }

    pub(crate) fn from_scores(ab: isize, ac: isize, len_a: isize, len_b: isize, len_c: isize) -> Self {
        let scores = HashMap::from([
            (UnorderedPair(Term::A, Term::B), ab),
            (UnorderedPair(Term::A, Term::C), ac),
            (UnorderedPair(Term::D, Term::B), ac - len_a + len_b),
            (UnorderedPair(Term::D, Term::C), ab - len_a + len_c),
        ]);

        Self { scores }
    }

    /// The score between `x` and `y`, in either order.
    ///
    /// Pairs the solver never looks at (`A`/`D`, `B`/`C`, a term with itself) score zero.
    pub fn get(&self, x: Term, y: Term) -> isize {
        self.scores.get(&UnorderedPair(x, y)).copied().unwrap_or(0)
    }
}
