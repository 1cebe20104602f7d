use crate::similarity::SimilarityTable;
use crate::term::Term;

/// Signed index into a term. `-1` and `len` stand for the virtual start and end markers.
pub(crate) type Index = isize;

/// Lengths and similarities of the four terms, deciding which index alignments lie close enough to the diagonal.
///
/// An alignment of `X[iX]` with `Y[iY]` may not drift from the diagonal further than the dissimilarity of `X` and `Y`
/// allows: `-len(X) + s(X, Y) <= iY - iX <= len(Y) - s(X, Y)`.
#[derive(Clone, Debug)]
pub(crate) struct Bands {
    lengths: [isize; 4],
    similarities: SimilarityTable,
}

impl Bands {
    pub(crate) fn new(lengths: [isize; 4], similarities: SimilarityTable) -> Self {
        Self { lengths, similarities }
    }

    #[inline]
    pub(crate) fn len(&self, term: Term) -> isize {
        self.lengths[term as usize]
    }

    /// Whether `(ix, iy)` lies in the diagonal band of `x` and `y`.
    pub(crate) fn inside(&self, x: Term, y: Term, ix: Index, iy: Index) -> bool {
        let s = self.similarities.get(x, y);
        (-self.len(x) + s..=self.len(y) - s).contains(&(iy - ix))
    }

    /// Whether the quadruple `(iA, iB, iC, iB + iC - iA)` lies inside the bands of `(A, c)`, `(b, D)` and `(c, D)`.
    ///
    /// `b` and `c` name the terms currently playing the roles of `B` and `C`.
    pub(crate) fn inside_all(&self, b: Term, c: Term, ia: Index, ib: Index, ic: Index) -> bool {
        let id = ib + ic - ia;
        self.inside(Term::A, c, ia, ic)
            && self.inside(b, Term::D, ib, id)
            && self.inside(c, Term::D, ic, id)
    }
}
