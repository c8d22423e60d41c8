use super::residue::{UNKNOWN_RESIDUE_CODE, one_letter_code};
use super::structure::Structure;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SequenceError {
    #[error(
        "Residue numbering must be strictly increasing: id {current} at position {position} follows id {previous}"
    )]
    NonIncreasingNumbering {
        position: usize,
        previous: isize,
        current: isize,
    },
    #[error("Invalid residue letter '{letter}' at position {position}")]
    InvalidLetter { position: usize, letter: char },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceResidue {
    pub code: char, // One-letter amino-acid code
    pub id: isize,  // Native residue number
}

impl SequenceResidue {
    pub fn new(code: char, id: isize) -> Self {
        Self { code, id }
    }
}

/// The amino-acid sequence of a single polymer chain together with its native numbering.
///
/// A `Sequence` is immutable once built. Cloning it produces an independently owned
/// copy, which is how a structure takes its own copy of a shared template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    residues: Vec<SequenceResidue>,
    source: Option<String>,
}

impl Sequence {
    /// Builds a sequence from residues, validating the numbering.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::NonIncreasingNumbering`] if residue ids repeat or go
    /// backwards, and [`SequenceError::InvalidLetter`] for non-alphabetic codes.
    pub fn new(
        residues: Vec<SequenceResidue>,
        source: Option<String>,
    ) -> Result<Self, SequenceError> {
        for (position, residue) in residues.iter().enumerate() {
            if !residue.code.is_ascii_alphabetic() {
                return Err(SequenceError::InvalidLetter {
                    position,
                    letter: residue.code,
                });
            }
        }
        for (position, pair) in residues.windows(2).enumerate() {
            if pair[1].id <= pair[0].id {
                return Err(SequenceError::NonIncreasingNumbering {
                    position: position + 1,
                    previous: pair[0].id,
                    current: pair[1].id,
                });
            }
        }
        let residues = residues
            .into_iter()
            .map(|r| SequenceResidue::new(r.code.to_ascii_uppercase(), r.id))
            .collect();
        Ok(Self { residues, source })
    }

    /// Builds a consecutively numbered sequence starting at `first_id`.
    ///
    /// Whitespace in `letters` is ignored.
    pub fn from_letters(
        letters: &str,
        first_id: isize,
        source: Option<String>,
    ) -> Result<Self, SequenceError> {
        let residues = letters
            .chars()
            .filter(|c| !c.is_whitespace())
            .zip(first_id..)
            .map(|(code, id)| SequenceResidue::new(code, id))
            .collect();
        Self::new(residues, source)
    }

    /// Derives the sequence from the residues observed in a structure.
    ///
    /// Residue names that are not amino acids are kept as `X` so that numbering
    /// stays aligned with the structure. Only the first residue of each id is kept:
    /// insertion-code residues (`52A` after `52`) have no id of their own.
    pub fn from_structure(structure: &Structure) -> Result<Self, SequenceError> {
        let mut residues: Vec<SequenceResidue> = Vec::with_capacity(structure.residues().len());
        for r in structure.residues() {
            if residues.last().is_some_and(|last| last.id == r.id) {
                warn!(
                    structure = %structure.label,
                    "Dropping residue {}{} ({}): its number is already taken",
                    r.id,
                    r.insertion_code.map(String::from).unwrap_or_default(),
                    r.name
                );
                continue;
            }
            let code = one_letter_code(&r.name).unwrap_or(UNKNOWN_RESIDUE_CODE);
            residues.push(SequenceResidue::new(code, r.id));
        }
        Self::new(residues, Some(structure.label.clone()))
    }

    pub fn residues(&self) -> &[SequenceResidue] {
        &self.residues
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// The one-letter codes as bytes, in sequence order.
    pub fn letters(&self) -> Vec<u8> {
        self.residues.iter().map(|r| r.code as u8).collect()
    }

    pub fn to_letter_string(&self) -> String {
        self.residues.iter().map(|r| r.code).collect()
    }

    /// Native residue id at a 0-based position.
    pub fn resid_at(&self, position: usize) -> Option<isize> {
        self.residues.get(position).map(|r| r.id)
    }

    /// 0-based position of a native residue id.
    pub fn position_of(&self, resid: isize) -> Option<usize> {
        // Ids are strictly increasing, so the residues are sorted by id.
        self.residues.binary_search_by_key(&resid, |r| r.id).ok()
    }

    pub fn ids(&self) -> Vec<isize> {
        self.residues.iter().map(|r| r.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::structure::StructureResidue;

    #[test]
    fn from_letters_numbers_consecutively_from_start() {
        let seq = Sequence::from_letters("ACD", 10, None).unwrap();
        assert_eq!(seq.ids(), vec![10, 11, 12]);
        assert_eq!(seq.to_letter_string(), "ACD");
    }

    #[test]
    fn from_letters_ignores_whitespace_and_uppercases() {
        let seq = Sequence::from_letters("ac d\nef", 1, None).unwrap();
        assert_eq!(seq.to_letter_string(), "ACDEF");
        assert_eq!(seq.len(), 5);
    }

    #[test]
    fn numbering_gaps_are_allowed() {
        let residues = vec![
            SequenceResidue::new('A', 1),
            SequenceResidue::new('C', 5),
            SequenceResidue::new('D', 6),
        ];
        let seq = Sequence::new(residues, None).unwrap();
        assert_eq!(seq.position_of(5), Some(1));
        assert_eq!(seq.position_of(3), None);
        assert_eq!(seq.resid_at(2), Some(6));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let residues = vec![SequenceResidue::new('A', 3), SequenceResidue::new('C', 3)];
        assert_eq!(
            Sequence::new(residues, None),
            Err(SequenceError::NonIncreasingNumbering {
                position: 1,
                previous: 3,
                current: 3
            })
        );
    }

    #[test]
    fn reversed_ids_are_rejected() {
        let residues = vec![
            SequenceResidue::new('A', 1),
            SequenceResidue::new('C', 4),
            SequenceResidue::new('D', 2),
        ];
        assert!(matches!(
            Sequence::new(residues, None),
            Err(SequenceError::NonIncreasingNumbering { position: 2, .. })
        ));
    }

    #[test]
    fn non_alphabetic_letters_are_rejected() {
        assert_eq!(
            Sequence::from_letters("AC-D", 1, None),
            Err(SequenceError::InvalidLetter {
                position: 2,
                letter: '-'
            })
        );
    }

    #[test]
    fn empty_sequence_is_a_valid_value() {
        let seq = Sequence::from_letters("", 1, None).unwrap();
        assert!(seq.is_empty());
        assert!(seq.letters().is_empty());
    }

    #[test]
    fn from_structure_maps_names_and_keeps_numbering() {
        let mut structure = Structure::new("1abc");
        structure.push_residue(StructureResidue::new(3, "MET"));
        structure.push_residue(StructureResidue::new(4, "HSD"));
        structure.push_residue(StructureResidue::new(7, "UNL"));
        let seq = Sequence::from_structure(&structure).unwrap();
        assert_eq!(seq.to_letter_string(), "MHX");
        assert_eq!(seq.ids(), vec![3, 4, 7]);
        assert_eq!(seq.source(), Some("1abc"));
    }

    #[test]
    fn from_structure_keeps_first_residue_of_an_insertion_run() {
        let mut structure = Structure::new("icode");
        structure.push_residue(StructureResidue::new(51, "ALA"));
        structure.push_residue(StructureResidue::new(52, "GLY"));
        structure.push_residue(StructureResidue::new(52, "SER").with_insertion_code('A'));
        structure.push_residue(StructureResidue::new(52, "THR").with_insertion_code('B'));
        structure.push_residue(StructureResidue::new(53, "CYS"));
        let seq = Sequence::from_structure(&structure).unwrap();
        assert_eq!(seq.to_letter_string(), "AGC");
        assert_eq!(seq.ids(), vec![51, 52, 53]);
    }

    #[test]
    fn from_structure_still_rejects_backwards_numbering() {
        let mut structure = Structure::new("bad");
        structure.push_residue(StructureResidue::new(10, "ALA"));
        structure.push_residue(StructureResidue::new(9, "GLY"));
        assert!(matches!(
            Sequence::from_structure(&structure),
            Err(SequenceError::NonIncreasingNumbering { position: 1, .. })
        ));
    }

    #[test]
    fn clone_is_an_independent_copy() {
        let template = Sequence::from_letters("ACDE", 1, Some("ref".into())).unwrap();
        let copy = template.clone();
        assert_eq!(copy, template);
        assert_ne!(copy.residues().as_ptr(), template.residues().as_ptr());
    }
}
