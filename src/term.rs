use strum::{Display, VariantArray};

/// One of the four terms of an analogical equation `A : B :: C : D`.
#[derive(Copy, Clone, Debug, Display, VariantArray, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Term {
    /// The first term; its characters are subtracted.
    A,
    /// The second term.
    B,
    /// The third term.
    C,
    /// The unknown.
    D,
}

impl Term {
    /// The term playing the other "added" role, i.e. `B` for `C` and vice versa.
    pub(crate) fn counterpart(&self) -> Self {
        match self {
            Self::B => Self::C,
            Self::C => Self::B,
            other => *other,
        }
    }
}
