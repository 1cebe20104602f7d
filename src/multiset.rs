use std::collections::BTreeMap;

use itertools::Itertools;

/// A bag of characters with signed counts.
///
/// Counts are signed so that `B + C - A` can be formed before checking it; a derived multiset with a negative count
/// describes an equation without solution.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Multiset {
    counts: BTreeMap<char, isize>,
}

impl Multiset {
    /// Count the characters of `chars`.
    pub fn of(chars: &[char]) -> Self {
        Self {
            counts: chars.iter()
                .counts()
                .into_iter()
                .map(|(c, n)| (*c, n as isize))
                .collect(),
        }
    }

    /// The multiset of the solutions of `A : B :: C : x`, i.e. `B + C - A`.
    pub fn derive(a: &Self, b: &Self, c: &Self) -> Self {
        let mut counts = b.counts.clone();
        for (ch, n) in &c.counts {
            *counts.entry(*ch).or_default() += n;
        }
        for (ch, n) in &a.counts {
            *counts.entry(*ch).or_default() -= n;
        }
        counts.retain(|_, n| *n != 0);

        Self { counts }
    }

    /// Number of occurrences of `c`, possibly negative.
    pub fn count(&self, c: char) -> isize {
        self.counts.get(&c).copied().unwrap_or(0)
    }

    /// Whether `c` occurs a positive number of times.
    pub fn contains(&self, c: char) -> bool {
        self.count(c) > 0
    }

    /// True if no count is negative.
    pub fn is_non_negative(&self) -> bool {
        self.counts.values().all(|n| *n >= 0)
    }

    /// Sum of all counts.
    pub fn len(&self) -> isize {
        self.counts.values().sum()
    }

    /// Whether the multiset holds no character at all.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Characters with a positive count, in ascending order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.counts.iter().filter(|(_, n)| **n > 0).map(|(c, _)| *c)
    }

    /// Each character repeated as many times as it occurs, in ascending character order.
    ///
    /// Characters with a non-positive count do not appear.
    pub fn canonical(&self) -> Vec<char> {
        self.counts.iter()
            .flat_map(|(c, n)| std::iter::repeat(*c).take((*n).max(0) as usize))
            .collect_vec()
    }

    pub(crate) fn counts(&self) -> &BTreeMap<char, isize> {
        &self.counts
    }
}

impl FromIterator<char> for Multiset {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Self::of(&iter.into_iter().collect_vec())
    }
}
