//! Index tags and the tag-sequence algebra.
//!
//! Tensor axes are addressed by symbolic [`Tag`]s rather than positions.
//! Whether two operands contract, broadcast, or are incompatible is decided
//! entirely by the small set of pure functions in this module, operating on
//! ordered tag sequences before any element is touched:
//!
//! - [`repeated`]: tags occurring at least twice (contraction candidates)
//! - [`free`]: tags occurring exactly once (axes surviving into a result)
//! - [`without`], [`contains`], [`locate_nth`]: sequence bookkeeping
//! - [`set_equal`]: order-independent multiset equality
//!
//! All functions are total and side-effect-free: expression shapes are
//! derived from them at construction time, so they must never fail.

use std::fmt;

use smallvec::SmallVec;

/// Symbolic label identifying the role of one tensor axis.
///
/// A tag carries no value beyond its label; equality is identity. Two
/// operands share a contraction only when they carry the *same* tag.
///
/// # Examples
///
/// ```
/// use ricci_core::Tag;
///
/// const I: Tag = Tag::new('i');
/// const J: Tag = Tag::new('j');
///
/// assert_ne!(I, J);
/// assert_eq!(I.label(), 'i');
/// assert_eq!(I.to_string(), "i");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(char);

impl Tag {
    /// Create a tag from its character label.
    pub const fn new(label: char) -> Self {
        Tag(label)
    }

    /// The character label this tag was created with.
    pub const fn label(self) -> char {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tag sequence type using SmallVec to avoid heap allocation for the
/// common low-rank cases.
pub type TagList = SmallVec<[Tag; 6]>;

/// Position of the `n`-th occurrence (0-indexed) of `tag` in `seq`.
///
/// Returns `seq.len()` when there is no such occurrence.
///
/// # Examples
///
/// ```
/// use ricci_core::{index::locate_nth, Tag};
///
/// const I: Tag = Tag::new('i');
/// const J: Tag = Tag::new('j');
///
/// let seq = [I, J, I];
/// assert_eq!(locate_nth(I, &seq, 0), 0);
/// assert_eq!(locate_nth(I, &seq, 1), 2);
/// assert_eq!(locate_nth(I, &seq, 2), 3); // absent
/// ```
pub fn locate_nth(tag: Tag, seq: &[Tag], n: usize) -> usize {
    let mut remaining = n;
    for (position, &candidate) in seq.iter().enumerate() {
        if candidate == tag {
            if remaining == 0 {
                return position;
            }
            remaining -= 1;
        }
    }
    seq.len()
}

/// Whether `seq` mentions `tag` at all.
pub fn contains(tag: Tag, seq: &[Tag]) -> bool {
    seq.iter().any(|&candidate| candidate == tag)
}

/// Distinct tags occurring two or more times in `seq`, in first-occurrence
/// order.
///
/// These are the contraction (or trace) candidates of a combined tag
/// sequence.
///
/// # Examples
///
/// ```
/// use ricci_core::{index::repeated, Tag};
///
/// const I: Tag = Tag::new('i');
/// const J: Tag = Tag::new('j');
/// const K: Tag = Tag::new('k');
///
/// assert_eq!(repeated(&[I, J, K, J, I]).as_slice(), &[I, J]);
/// assert!(repeated(&[I, J, K]).is_empty());
/// ```
pub fn repeated(seq: &[Tag]) -> TagList {
    let mut out = TagList::new();
    for (position, &tag) in seq.iter().enumerate() {
        if locate_nth(tag, seq, 0) == position && contains(tag, &seq[position + 1..]) {
            out.push(tag);
        }
    }
    out
}

/// Tags of `seq` occurring exactly once, in order: the free axes of the
/// sequence.
pub fn free(seq: &[Tag]) -> TagList {
    without(&repeated(seq), seq)
}

/// `seq` with every occurrence of every tag in `drop` removed.
pub fn without(drop: &[Tag], seq: &[Tag]) -> TagList {
    seq.iter()
        .copied()
        .filter(|&tag| !contains(tag, drop))
        .collect()
}

/// Order-independent multiset equality of two tag sequences.
///
/// # Examples
///
/// ```
/// use ricci_core::{index::set_equal, Tag};
///
/// const I: Tag = Tag::new('i');
/// const J: Tag = Tag::new('j');
///
/// assert!(set_equal(&[I, J], &[J, I]));
/// assert!(!set_equal(&[I, J], &[I, I]));
/// assert!(!set_equal(&[I], &[I, J]));
/// ```
pub fn set_equal(a: &[Tag], b: &[Tag]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut unmatched: TagList = b.iter().copied().collect();
    for &tag in a {
        match unmatched.iter().position(|&candidate| candidate == tag) {
            Some(slot) => {
                unmatched.swap_remove(slot);
            }
            None => return false,
        }
    }
    true
}
