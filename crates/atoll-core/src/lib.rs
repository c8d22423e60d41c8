//! # ATOLL Core Library
//!
//! Sequence-driven residue correspondence for sets of related protein structures.
//!
//! Given a reference structure, a set of query structures and named domains expressed
//! in reference numbering (for example transmembrane helices), the library aligns each
//! structure's sequence against the reference and re-expresses every domain in that
//! structure's own residue numbering.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Sequence`, `Structure`),
//!   residue code tables, interval parsing and file readers.
//!
//! - **[`engine`]: The Logic Core.** Sequence lookup rules, the affine-gap aligner,
//!   correspondence tables and domain mapping.
//!
//! - **[`workflows`]: The Public API.** [`workflows::compare::run`] executes a complete
//!   comparison over a batch of structures, in parallel.

pub mod core;
pub mod engine;
pub mod workflows;
