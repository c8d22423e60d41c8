use crate::core::models::sequence::Sequence;
use std::fmt;
use thiserror::Error;

/// A reference residue together with the query residue it is aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappedResidue {
    pub reference_position: usize,
    pub reference_id: isize,
    pub query_position: usize,
    pub query_id: isize,
}

/// Why a reference residue id has no query counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unresolved {
    /// The id does not occur in the reference sequence at all.
    NotInReference,
    /// The reference residue is aligned to a gap in the query.
    NoCounterpart,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Unresolved::NotInReference => "not-in-reference",
                Unresolved::NoCounterpart => "no-counterpart",
            }
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Pair ({reference}, {query}) lies outside sequences of lengths {reference_len} and {query_len}")]
    OutOfRange {
        reference: usize,
        query: usize,
        reference_len: usize,
        query_len: usize,
    },
    #[error("Pair ({reference}, {query}) crosses or repeats an earlier pair")]
    NotMonotonic { reference: usize, query: usize },
}

/// Residue correspondence between one reference sequence and one query sequence.
///
/// Every reference position maps to at most one query position, and the mapping is
/// strictly increasing on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrespondenceTable {
    forward: Vec<Option<usize>>, // Query position for each reference position
    reference_ids: Vec<isize>,
    query_ids: Vec<isize>,
}

impl CorrespondenceTable {
    /// Builds a table from `(reference_position, query_position)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::OutOfRange`] for positions outside either sequence and
    /// [`TableError::NotMonotonic`] for pairs that cross or repeat.
    pub fn from_pairs(
        reference: &Sequence,
        query: &Sequence,
        pairs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, TableError> {
        let mut forward = vec![None; reference.len()];
        let mut last: Option<(usize, usize)> = None;

        for (r, q) in pairs {
            if r >= reference.len() || q >= query.len() {
                return Err(TableError::OutOfRange {
                    reference: r,
                    query: q,
                    reference_len: reference.len(),
                    query_len: query.len(),
                });
            }
            if let Some((last_r, last_q)) = last {
                if r <= last_r || q <= last_q {
                    return Err(TableError::NotMonotonic {
                        reference: r,
                        query: q,
                    });
                }
            }
            forward[r] = Some(q);
            last = Some((r, q));
        }

        Ok(Self {
            forward,
            reference_ids: reference.ids(),
            query_ids: query.ids(),
        })
    }

    pub fn reference_len(&self) -> usize {
        self.forward.len()
    }

    pub fn query_len(&self) -> usize {
        self.query_ids.len()
    }

    pub fn query_position(&self, reference_position: usize) -> Option<usize> {
        self.forward.get(reference_position).copied().flatten()
    }

    pub fn query_resid_at(&self, query_position: usize) -> Option<isize> {
        self.query_ids.get(query_position).copied()
    }

    pub fn resolve_position(&self, reference_position: usize) -> Option<MappedResidue> {
        let query_position = self.query_position(reference_position)?;
        Some(MappedResidue {
            reference_position,
            reference_id: self.reference_ids[reference_position],
            query_position,
            query_id: self.query_ids[query_position],
        })
    }

    /// Looks up a reference residue by native id.
    pub fn resolve_resid(&self, reference_id: isize) -> Result<MappedResidue, Unresolved> {
        let position = self
            .reference_ids
            .binary_search(&reference_id)
            .map_err(|_| Unresolved::NotInReference)?;
        self.resolve_position(position)
            .ok_or(Unresolved::NoCounterpart)
    }

    /// All aligned residue pairs in reference order.
    pub fn mapped_pairs(&self) -> impl Iterator<Item = MappedResidue> + '_ {
        (0..self.forward.len()).filter_map(|p| self.resolve_position(p))
    }

    pub fn mapped_count(&self) -> usize {
        self.forward.iter().filter(|p| p.is_some()).count()
    }

    /// Fraction of reference residues that have a query counterpart.
    pub fn coverage(&self) -> f64 {
        if self.forward.is_empty() {
            return 0.0;
        }
        self.mapped_count() as f64 / self.forward.len() as f64
    }

    pub fn is_monotonic(&self) -> bool {
        self.forward
            .iter()
            .flatten()
            .collect::<Vec<_>>()
            .windows(2)
            .all(|w| w[0] < w[1])
    }
}
