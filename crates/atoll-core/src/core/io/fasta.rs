use crate::core::models::sequence::{Sequence, SequenceError};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

const START_ATTRIBUTE: &str = "start=";

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: FastaParseErrorKind },
    #[error("Duplicate sequence entry: '{0}'")]
    DuplicateEntry(String),
    #[error("Invalid sequence for entry '{name}': {source}")]
    InvalidSequence {
        name: String,
        #[source]
        source: SequenceError,
    },
}

#[derive(Debug, Error)]
pub enum FastaParseErrorKind {
    #[error("Sequence data found before the first '>' header")]
    MissingHeader,
    #[error("Header has no entry name")]
    EmptyName,
    #[error("Invalid start residue number: '{0}'")]
    InvalidStart(String),
}

/// A single entry of a sequence file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub name: String,    // Structure label or protein name
    pub first_id: isize, // Native id of the first residue
    pub letters: String, // One-letter codes, whitespace removed
}

impl FastaRecord {
    pub fn to_sequence(&self) -> Result<Sequence, FastaError> {
        Sequence::from_letters(&self.letters, self.first_id, Some(self.name.clone())).map_err(
            |source| FastaError::InvalidSequence {
                name: self.name.clone(),
                source,
            },
        )
    }
}

/// Reader for FASTA sequence files.
///
/// Headers take the form `>name [start=N] [free text]`. `start` sets the native id of
/// the first residue (1 by default); any other header text is ignored.
pub struct FastaFile;

impl FastaFile {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Vec<FastaRecord>, FastaError> {
        let mut records: Vec<FastaRecord> = Vec::new();
        let mut names = HashSet::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('>') {
                let record = Self::parse_header(header, line_num)?;
                if !names.insert(record.name.clone()) {
                    return Err(FastaError::DuplicateEntry(record.name));
                }
                records.push(record);
                continue;
            }

            let current = records.last_mut().ok_or(FastaError::Parse {
                line: line_num,
                kind: FastaParseErrorKind::MissingHeader,
            })?;
            current
                .letters
                .extend(trimmed.chars().filter(|c| !c.is_whitespace() && *c != '*'));
        }

        Ok(records)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>, FastaError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    fn parse_header(header: &str, line: usize) -> Result<FastaRecord, FastaError> {
        let mut tokens = header.split_whitespace();
        let name = tokens.next().ok_or(FastaError::Parse {
            line,
            kind: FastaParseErrorKind::EmptyName,
        })?;

        let mut first_id = 1;
        for token in tokens {
            if let Some(value) = token.strip_prefix(START_ATTRIBUTE) {
                first_id = value.parse().map_err(|_| FastaError::Parse {
                    line,
                    kind: FastaParseErrorKind::InvalidStart(value.to_string()),
                })?;
            }
        }

        Ok(FastaRecord {
            name: name.to_string(),
            first_id,
            letters: String::new(),
        })
    }
}
