//! # Core Module
//!
//! Stateless building blocks for comparing protein structures by sequence.
//!
//! ## Architecture
//!
//! - **Data models** ([`models`]) - Residue codes, sequences with native numbering, and
//!   the residue view of a loaded structure
//! - **File I/O** ([`io`]) - Readers for PDB structures, FASTA sequence files and the
//!   per-structure information table
//! - **Residue selections** ([`selection`]) - Parsing of interval expressions such as
//!   `"33-60,68-95"` into reference residue intervals
//!
//! Nothing in this module holds state across structures; the orchestration lives in
//! [`crate::engine`] and [`crate::workflows`].

pub mod io;
pub mod models;
pub mod selection;
