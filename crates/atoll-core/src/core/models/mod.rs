//! # Core Models Module
//!
//! Data structures describing the residues of a structure and the sequence it is
//! aligned by.
//!
//! ## Key Components
//!
//! - [`residue`] - Amino-acid types and three-letter to one-letter code translation
//! - [`sequence`] - An immutable amino-acid sequence carrying native residue numbers
//! - [`structure`] - The residue list of one chain of a loaded structure, plus the
//!   sequence attached to it
//!
//! ```ignore
//! use atoll::core::models::{sequence::Sequence, structure::Structure};
//!
//! let mut structure = Structure::new("5ZBH");
//! let sequence = Sequence::from_letters("MNSTLFSQVENHS", 1, None)?;
//! structure.attach_sequence(sequence);
//! ```

pub mod residue;
pub mod sequence;
pub mod structure;
