use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One row of the information file, describing a structure to load.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub id: String,
    pub path: PathBuf,
    #[serde(default)]
    pub protein: Option<String>,
    #[serde(default)]
    pub chain: Option<char>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
}

#[derive(Debug, Error)]
pub enum InfoError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Label '{label}' is declared more than once (rows {first_row} and {row})")]
    DuplicateLabel {
        label: String,
        first_row: usize,
        row: usize,
    },
    #[error("Information file '{0}' declares no entries")]
    Empty(String),
}

/// The per-structure metadata table, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct InfoTable {
    entries: Vec<InfoEntry>,
    index: HashMap<String, usize>,
}

impl InfoTable {
    /// Loads the table and resolves relative structure paths against the file's directory.
    pub fn load(path: &Path) -> Result<Self, InfoError> {
        let file = std::fs::File::open(path).map_err(|e| InfoError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let mut table = Self::read_from(file, &path.to_string_lossy())?;
        if let Some(base) = path.parent() {
            for entry in &mut table.entries {
                if entry.path.is_relative() {
                    entry.path = base.join(&entry.path);
                }
            }
        }
        Ok(table)
    }

    /// Parses a CSV table with at least the `id` and `path` columns.
    ///
    /// `origin` only names the source in error messages.
    pub fn read_from(reader: impl Read, origin: &str) -> Result<Self, InfoError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut table = Self::default();
        for (row, result) in csv_reader.deserialize::<InfoEntry>().enumerate() {
            let entry = result.map_err(|e| InfoError::Csv {
                path: origin.to_string(),
                source: e,
            })?;
            if let Some(&first) = table.index.get(&entry.id) {
                return Err(InfoError::DuplicateLabel {
                    label: entry.id,
                    first_row: first + 1,
                    row: row + 1,
                });
            }
            table.index.insert(entry.id.clone(), row);
            table.entries.push(entry);
        }

        if table.entries.is_empty() {
            return Err(InfoError::Empty(origin.to_string()));
        }
        Ok(table)
    }

    pub fn entries(&self) -> &[InfoEntry] {
        &self.entries
    }

    pub fn get(&self, label: &str) -> Option<&InfoEntry> {
        self.index.get(label).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display colors keyed by label, for entries that declare one.
    pub fn colors(&self) -> HashMap<&str, &str> {
        self.entries
            .iter()
            .filter_map(|e| e.color.as_deref().map(|c| (e.id.as_str(), c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(content: &str) -> Result<InfoTable, InfoError> {
        InfoTable::read_from(content.as_bytes(), "test.csv")
    }

    #[test]
    fn reads_entries_in_declaration_order() {
        let table = parse(
            "id,path,protein,chain,color,class\n\
             5ZBH,5zbh.pdb,NPY1R,A,#ff0000,peptide\n\
             4DKL,4dkl.pdb,MOR,,,\n",
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0].id, "5ZBH");
        assert_eq!(table.entries()[0].chain, Some('A'));
        assert_eq!(table.entries()[1].protein.as_deref(), Some("MOR"));
        assert_eq!(table.entries()[1].chain, None);
        assert_eq!(table.entries()[1].color, None);
    }

    #[test]
    fn optional_columns_may_be_omitted() {
        let table = parse("id,path\nA,a.pdb\n").unwrap();
        let entry = table.get("A").unwrap();
        assert_eq!(entry.path, PathBuf::from("a.pdb"));
        assert!(entry.protein.is_none());
        assert!(entry.class.is_none());
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let err = parse("id,path\nA,a.pdb\nB,b.pdb\nA,traj/\n").unwrap_err();
        assert!(matches!(
            err,
            InfoError::DuplicateLabel { ref label, first_row: 1, row: 3 } if label == "A"
        ));
    }

    #[test]
    fn missing_required_column_is_a_csv_error() {
        assert!(matches!(parse("id\nA\n"), Err(InfoError::Csv { .. })));
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(parse("id,path\n"), Err(InfoError::Empty(_))));
    }

    #[test]
    fn colors_lists_only_declared_colors() {
        let table = parse("id,path,color\nA,a.pdb,red\nB,b.pdb,\n").unwrap();
        let colors = table.colors();
        assert_eq!(colors.get("A"), Some(&"red"));
        assert!(!colors.contains_key("B"));
    }

    #[test]
    fn load_resolves_relative_paths_against_file_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("info.csv");
        fs::write(&path, "id,path\nA,structures/a.pdb\nB,/abs/b.pdb\n").unwrap();
        let table = InfoTable::load(&path).unwrap();
        assert_eq!(
            table.get("A").unwrap().path,
            dir.path().join("structures/a.pdb")
        );
        assert_eq!(table.get("B").unwrap().path, PathBuf::from("/abs/b.pdb"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = InfoTable::load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, InfoError::Io { .. }));
    }
}
