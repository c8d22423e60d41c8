use crate::core::models::structure::Structure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Options controlling which part of a structure file is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Label given to the loaded structure.
    pub label: String,
    /// Chain to read; the first chain encountered when `None`.
    pub chain: Option<char>,
}

impl ReadOptions {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            chain: None,
        }
    }

    pub fn with_chain(mut self, chain: Option<char>) -> Self {
        self.chain = chain;
        self
    }
}

/// Defines the interface for reading the residue content of structure file formats.
///
/// Implementors handle format-specific parsing and produce a [`Structure`] holding
/// the residues of one chain in file order.
pub trait StructureFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a structure from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead, options: &ReadOptions)
    -> Result<Structure, Self::Error>;

    /// Reads a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        options: &ReadOptions,
    ) -> Result<Structure, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, options)
    }
}
