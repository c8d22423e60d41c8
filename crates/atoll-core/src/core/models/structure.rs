use super::sequence::Sequence;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureResidue {
    pub id: isize,                      // Residue sequence number from source file
    pub insertion_code: Option<char>,   // PDB insertion code, if any
    pub name: String,                   // Residue name (e.g., "ALA", "HSD")
}

impl StructureResidue {
    pub fn new(id: isize, name: &str) -> Self {
        Self {
            id,
            insertion_code: None,
            name: name.to_string(),
        }
    }

    pub fn with_insertion_code(mut self, code: char) -> Self {
        self.insertion_code = Some(code);
        self
    }
}

/// A loaded protein structure, reduced to what the sequence layer needs.
///
/// Coordinates are not kept here; they stay with the external geometry source and
/// are addressed through the same native residue numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub label: String,                // Unique label of the entry (e.g., "5ZBH")
    pub protein_name: Option<String>, // Protein name shared by several entries
    pub chain: Option<char>,          // Chain the residues were read from
    residues: Vec<StructureResidue>,
    sequence: Option<Sequence>,
}

impl Structure {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            protein_name: None,
            chain: None,
            residues: Vec::new(),
            sequence: None,
        }
    }

    pub fn with_protein_name(mut self, name: &str) -> Self {
        self.protein_name = Some(name.to_string());
        self
    }

    pub fn residues(&self) -> &[StructureResidue] {
        &self.residues
    }

    pub(crate) fn push_residue(&mut self, residue: StructureResidue) {
        self.residues.push(residue);
    }

    /// Stores the structure's own copy of its sequence.
    ///
    /// Takes the sequence by value: callers holding a shared template must clone it,
    /// so no two structures ever alias the same sequence.
    pub fn attach_sequence(&mut self, sequence: Sequence) {
        self.sequence = Some(sequence);
    }

    pub fn sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }
}

impl FromIterator<StructureResidue> for Structure {
    fn from_iter<I: IntoIterator<Item = StructureResidue>>(iter: I) -> Self {
        let mut structure = Structure::new("");
        structure.residues.extend(iter);
        structure
    }
}
