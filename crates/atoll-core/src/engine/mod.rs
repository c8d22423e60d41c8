//! # Engine Module
//!
//! The comparison engine: sequence resolution, pairwise alignment, and projection of
//! reference domains onto query structures.
//!
//! ## Architecture
//!
//! - **Sequence resolution** ([`loader`]) - Ordered lookup rules that decide which
//!   sequence each structure is aligned by
//! - **Scoring** ([`scoring`]) - Substitution matrices and affine gap penalties
//! - **Alignment** ([`aligner`]) - Deterministic global affine-gap alignment
//! - **Correspondence** ([`correspondence`]) - Monotonic reference-to-query residue map
//! - **Domain mapping** ([`domain`]) - Named selections in the query's numbering, plus
//!   diagnostics for endpoints that do not map
//! - **Configuration** ([`config`]) - Validated run parameters
//! - **Progress Monitoring** ([`progress`]) - Progress callbacks for front ends
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod aligner;
pub mod config;
pub mod correspondence;
pub mod domain;
pub mod error;
pub mod loader;
pub mod progress;
pub mod scoring;
