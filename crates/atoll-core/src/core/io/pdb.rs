use crate::core::io::traits::{ReadOptions, StructureFile};
use crate::core::models::residue::one_letter_code;
use crate::core::models::structure::{Structure, StructureResidue};
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 27 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

/// Reads the residue sequence of one chain from the first model of a PDB file.
///
/// `HETATM` records are kept only for modified amino acids (e.g. `MSE`), so ligands,
/// lipids and waters never enter the sequence.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
        options: &ReadOptions,
    ) -> Result<Structure, Self::Error> {
        let mut structure = Structure::new(&options.label);
        let mut selected_chain = options.chain;
        let mut current_key: Option<(isize, Option<char>)> = None;
        let mut seen_atoms = false;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "ATOM" | "HETATM" => {
                    if line.len() < 27 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let res_name_str = slice_and_trim(&line, 17, 20);
                    let chain_id_str = slice_and_trim(&line, 21, 22);
                    let res_id_str = slice_and_trim(&line, 22, 26);
                    let icode_str = slice_and_trim(&line, 26, 27);

                    if res_name_str.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "18-20".into(),
                            },
                        });
                    }
                    if record_type == "HETATM" && one_letter_code(res_name_str).is_none() {
                        continue;
                    }

                    let chain_id: char = chain_id_str.chars().next().unwrap_or(' ');
                    match selected_chain {
                        Some(wanted) if wanted != chain_id => continue,
                        Some(_) => {}
                        None => selected_chain = Some(chain_id),
                    }

                    let res_id: isize = res_id_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "23-26".into(),
                            value: res_id_str.into(),
                        },
                    })?;
                    let icode = icode_str.chars().next();

                    seen_atoms = true;
                    let key = (res_id, icode);
                    if current_key != Some(key) {
                        let mut residue = StructureResidue::new(res_id, res_name_str);
                        if let Some(code) = icode {
                            residue = residue.with_insertion_code(code);
                        }
                        structure.push_residue(residue);
                        current_key = Some(key);
                    }
                }
                "ENDMDL" | "END" => break,
                _ => {}
            }
        }

        if !seen_atoms {
            return Err(PdbError::MissingRecord(match options.chain {
                Some(chain) => format!("ATOM records for chain '{}'", chain),
                None => "ATOM records".into(),
            }));
        }
        structure.chain = selected_chain;
        Ok(structure)
    }
}
