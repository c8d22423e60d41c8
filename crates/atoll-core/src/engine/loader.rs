use super::error::EngineError;
use crate::core::io::fasta::{FastaError, FastaFile, FastaRecord};
use crate::core::models::sequence::Sequence;
use crate::core::models::structure::Structure;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Name of the sequence-file entry that serves as the global reference sequence.
pub const REFERENCE_ENTRY: &str = "reference";

/// Sequences read from a sequence file, keyed by entry name.
#[derive(Debug, Clone, Default)]
pub struct SequenceTable {
    entries: HashMap<String, Sequence>,
    reference: Option<Sequence>,
}

impl SequenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[FastaRecord]) -> Result<Self, FastaError> {
        let mut table = Self::new();
        for record in records {
            let sequence = record.to_sequence()?;
            if record.name.eq_ignore_ascii_case(REFERENCE_ENTRY) {
                // Names differing only in case all denote the one reference entry.
                if table.reference.is_some() {
                    return Err(FastaError::DuplicateEntry(record.name.clone()));
                }
                table.reference = Some(sequence);
            } else {
                table.entries.insert(record.name.clone(), sequence);
            }
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, FastaError> {
        let records = FastaFile::read_from_path(path)?;
        Self::from_records(&records)
    }

    pub fn with_entry(mut self, name: &str, sequence: Sequence) -> Self {
        self.entries.insert(name.to_string(), sequence);
        self
    }

    pub fn with_reference(mut self, sequence: Sequence) -> Self {
        self.reference = Some(sequence);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Sequence> {
        self.entries.get(name)
    }

    pub fn reference(&self) -> Option<&Sequence> {
        self.reference.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len() + usize::from(self.reference.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which rule produced a structure's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceSource {
    Label,
    ProteinName,
    Reference,
    Structure,
    Custom(&'static str),
}

impl fmt::Display for SequenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceSource::Label => write!(f, "label"),
            SequenceSource::ProteinName => write!(f, "protein-name"),
            SequenceSource::Reference => write!(f, "reference"),
            SequenceSource::Structure => write!(f, "structure"),
            SequenceSource::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// One rule of the sequence lookup chain.
///
/// Returning `Ok(None)` passes the structure on to the next rule.
pub trait SequenceResolver: Send + Sync {
    fn source(&self) -> SequenceSource;

    fn resolve<'a>(&'a self, structure: &Structure)
    -> Result<Option<Cow<'a, Sequence>>, EngineError>;
}

pub struct ByLabel(Arc<SequenceTable>);

impl SequenceResolver for ByLabel {
    fn source(&self) -> SequenceSource {
        SequenceSource::Label
    }

    fn resolve<'a>(
        &'a self,
        structure: &Structure,
    ) -> Result<Option<Cow<'a, Sequence>>, EngineError> {
        Ok(self.0.get(&structure.label).map(Cow::Borrowed))
    }
}

pub struct ByProteinName(Arc<SequenceTable>);

impl SequenceResolver for ByProteinName {
    fn source(&self) -> SequenceSource {
        SequenceSource::ProteinName
    }

    fn resolve<'a>(
        &'a self,
        structure: &Structure,
    ) -> Result<Option<Cow<'a, Sequence>>, EngineError> {
        Ok(structure
            .protein_name
            .as_deref()
            .and_then(|name| self.0.get(name))
            .map(Cow::Borrowed))
    }
}

pub struct GlobalReference(Arc<SequenceTable>);

impl SequenceResolver for GlobalReference {
    fn source(&self) -> SequenceSource {
        SequenceSource::Reference
    }

    fn resolve<'a>(
        &'a self,
        _structure: &Structure,
    ) -> Result<Option<Cow<'a, Sequence>>, EngineError> {
        Ok(self.0.reference().map(Cow::Borrowed))
    }
}

/// Falls back on the residues recorded in the structure itself.
pub struct DerivedFromStructure;

impl SequenceResolver for DerivedFromStructure {
    fn source(&self) -> SequenceSource {
        SequenceSource::Structure
    }

    fn resolve<'a>(
        &'a self,
        structure: &Structure,
    ) -> Result<Option<Cow<'a, Sequence>>, EngineError> {
        if structure.residues().is_empty() {
            return Ok(None);
        }
        Sequence::from_structure(structure)
            .map(|s| Some(Cow::Owned(s)))
            .map_err(|e| EngineError::Lookup {
                label: structure.label.clone(),
                reason: e.to_string(),
            })
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedSequence {
    pub sequence: Sequence, // Owned by the caller, never shared with the template
    pub source: SequenceSource,
}

/// Resolves the sequence of each structure through an ordered chain of rules.
pub struct SequenceLoader {
    resolvers: Vec<Box<dyn SequenceResolver>>,
}

impl SequenceLoader {
    pub fn new(resolvers: Vec<Box<dyn SequenceResolver>>) -> Self {
        Self { resolvers }
    }

    /// Without a sequence file: every structure uses its own residues.
    pub fn basic() -> Self {
        Self::new(vec![Box::new(DerivedFromStructure)])
    }

    /// Label, then protein name, then the global reference, then the structure itself.
    pub fn from_table(table: SequenceTable) -> Self {
        let table = Arc::new(table);
        Self::new(vec![
            Box::new(ByLabel(Arc::clone(&table))),
            Box::new(ByProteinName(Arc::clone(&table))),
            Box::new(GlobalReference(table)),
            Box::new(DerivedFromStructure),
        ])
    }

    /// Adds a rule ahead of the structure-derived fallback, if there is one.
    pub fn with_resolver(mut self, resolver: impl SequenceResolver + 'static) -> Self {
        let at = match self.resolvers.last() {
            Some(last) if last.source() == SequenceSource::Structure => self.resolvers.len() - 1,
            _ => self.resolvers.len(),
        };
        self.resolvers.insert(at, Box::new(resolver));
        self
    }

    pub fn sources(&self) -> Vec<SequenceSource> {
        self.resolvers.iter().map(|r| r.source()).collect()
    }

    pub fn resolve(&self, structure: &Structure) -> Result<ResolvedSequence, EngineError> {
        for resolver in &self.resolvers {
            if let Some(sequence) = resolver.resolve(structure)? {
                let source = resolver.source();
                debug!(
                    structure = %structure.label,
                    %source,
                    residues = sequence.len(),
                    "Resolved sequence"
                );
                return Ok(ResolvedSequence {
                    sequence: sequence.into_owned(),
                    source,
                });
            }
        }
        Err(EngineError::Lookup {
            label: structure.label.clone(),
            reason: format!(
                "none of the rules [{}] matched",
                self.sources()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
    }
}
