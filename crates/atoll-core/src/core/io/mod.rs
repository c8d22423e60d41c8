//! Readers for the input files of a comparison run.
//!
//! Structure formats implement the [`traits::StructureFile`] trait. Sequence files
//! ([`fasta`]) and the information table ([`info`]) have their own record types.

pub mod fasta;
pub mod info;
pub mod pdb;
pub mod traits;
