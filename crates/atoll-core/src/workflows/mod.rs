//! # Workflows Module
//!
//! High-level entry points that tie [`crate::core`] and [`crate::engine`] together.
//!
//! - **Comparison Workflow** ([`compare`]) - Resolves and attaches a sequence to every
//!   structure, aligns each query against the reference, and maps the configured
//!   domains onto it.

pub mod compare;
