use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One-letter code used for residues whose name is not a recognized amino acid.
pub const UNKNOWN_RESIDUE_CODE: char = 'X';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AminoAcidType {
    // --- Aliphatic, Nonpolar ---
    Alanine,    // Alanine (ALA)
    Glycine,    // Glycine (GLY)
    Isoleucine, // Isoleucine (ILE)
    Leucine,    // Leucine (LEU)
    Proline,    // Proline (PRO)
    Valine,     // Valine (VAL)

    // --- Aromatic ---
    Phenylalanine, // Phenylalanine (PHE)
    Tryptophan,    // Tryptophan (TRP)
    Tyrosine,      // Tyrosine (TYR)

    // --- Polar, Uncharged ---
    Asparagine, // Asparagine (ASN)
    Cysteine,   // Cysteine (CYS)
    Glutamine,  // Glutamine (GLN)
    Serine,     // Serine (SER)
    Threonine,  // Threonine (THR)
    Methionine, // Methionine (MET)

    // --- Positively Charged (Basic) ---
    Arginine,  // Arginine (ARG)
    Lysine,    // Lysine (LYS)
    Histidine, // Histidine (HIS) and its protonation variants

    // --- Negatively Charged (Acidic) ---
    AsparticAcid, // Aspartic Acid (ASP)
    GlutamicAcid, // Glutamic Acid (GLU)
}

// Force-field specific names (protonation states, disulfides, selenomethionine)
// collapse onto their parent amino acid.
static THREE_LETTER_NAMES: Map<&'static str, AminoAcidType> = phf_map! {
    "ALA" => AminoAcidType::Alanine,
    "GLY" => AminoAcidType::Glycine,
    "ILE" => AminoAcidType::Isoleucine,
    "LEU" => AminoAcidType::Leucine,
    "PRO" => AminoAcidType::Proline,
    "VAL" => AminoAcidType::Valine,
    "PHE" => AminoAcidType::Phenylalanine,
    "TRP" => AminoAcidType::Tryptophan,
    "TYR" => AminoAcidType::Tyrosine,
    "ASN" => AminoAcidType::Asparagine,
    "CYS" => AminoAcidType::Cysteine, "CYX" => AminoAcidType::Cysteine, "CYM" => AminoAcidType::Cysteine,
    "GLN" => AminoAcidType::Glutamine,
    "SER" => AminoAcidType::Serine,
    "THR" => AminoAcidType::Threonine,
    "MET" => AminoAcidType::Methionine, "MSE" => AminoAcidType::Methionine,
    "ARG" => AminoAcidType::Arginine,
    "LYS" => AminoAcidType::Lysine, "LYN" => AminoAcidType::Lysine,
    "HIS" => AminoAcidType::Histidine, "HSD" => AminoAcidType::Histidine,
    "HSE" => AminoAcidType::Histidine, "HSP" => AminoAcidType::Histidine,
    "HID" => AminoAcidType::Histidine, "HIE" => AminoAcidType::Histidine,
    "HIP" => AminoAcidType::Histidine,
    "ASP" => AminoAcidType::AsparticAcid, "ASH" => AminoAcidType::AsparticAcid,
    "GLU" => AminoAcidType::GlutamicAcid, "GLH" => AminoAcidType::GlutamicAcid,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unrecognized amino acid name: '{0}'")]
pub struct ParseAminoAcidError(pub String);

impl FromStr for AminoAcidType {
    type Err = ParseAminoAcidError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        THREE_LETTER_NAMES
            .get(s.trim().to_ascii_uppercase().as_str())
            .copied()
            .ok_or_else(|| ParseAminoAcidError(s.to_string()))
    }
}

impl AminoAcidType {
    pub fn to_one_letter(self) -> char {
        match self {
            Self::Alanine => 'A',
            Self::Glycine => 'G',
            Self::Isoleucine => 'I',
            Self::Leucine => 'L',
            Self::Proline => 'P',
            Self::Valine => 'V',
            Self::Phenylalanine => 'F',
            Self::Tryptophan => 'W',
            Self::Tyrosine => 'Y',
            Self::Asparagine => 'N',
            Self::Cysteine => 'C',
            Self::Glutamine => 'Q',
            Self::Serine => 'S',
            Self::Threonine => 'T',
            Self::Methionine => 'M',
            Self::Arginine => 'R',
            Self::Lysine => 'K',
            Self::Histidine => 'H',
            Self::AsparticAcid => 'D',
            Self::GlutamicAcid => 'E',
        }
    }

    pub fn to_three_letter(self) -> &'static str {
        match self {
            Self::Alanine => "ALA",
            Self::Glycine => "GLY",
            Self::Isoleucine => "ILE",
            Self::Leucine => "LEU",
            Self::Proline => "PRO",
            Self::Valine => "VAL",
            Self::Phenylalanine => "PHE",
            Self::Tryptophan => "TRP",
            Self::Tyrosine => "TYR",
            Self::Asparagine => "ASN",
            Self::Cysteine => "CYS",
            Self::Glutamine => "GLN",
            Self::Serine => "SER",
            Self::Threonine => "THR",
            Self::Methionine => "MET",
            Self::Arginine => "ARG",
            Self::Lysine => "LYS",
            Self::Histidine => "HIS",
            Self::AsparticAcid => "ASP",
            Self::GlutamicAcid => "GLU",
        }
    }
}

impl fmt::Display for AminoAcidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_three_letter())
    }
}

/// Maps a residue name as found in a structure file to its one-letter code.
///
/// Returns `None` when the name is not a recognized amino acid.
pub fn one_letter_code(residue_name: &str) -> Option<char> {
    residue_name
        .parse::<AminoAcidType>()
        .ok()
        .map(AminoAcidType::to_one_letter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_three_letter_names() {
        assert_eq!("ALA".parse(), Ok(AminoAcidType::Alanine));
        assert_eq!("TRP".parse(), Ok(AminoAcidType::Tryptophan));
        assert_eq!("GLU".parse(), Ok(AminoAcidType::GlutamicAcid));
    }

    #[test]
    fn parsing_is_case_insensitive_and_trims_whitespace() {
        assert_eq!(" leu ".parse(), Ok(AminoAcidType::Leucine));
        assert_eq!("Gly".parse(), Ok(AminoAcidType::Glycine));
    }

    #[test]
    fn force_field_variants_collapse_to_parent_residue() {
        assert_eq!("HSD".parse(), Ok(AminoAcidType::Histidine));
        assert_eq!("HIP".parse(), Ok(AminoAcidType::Histidine));
        assert_eq!("CYX".parse(), Ok(AminoAcidType::Cysteine));
        assert_eq!("MSE".parse(), Ok(AminoAcidType::Methionine));
    }

    #[test]
    fn unknown_names_fail_to_parse() {
        let err = "HOH".parse::<AminoAcidType>().unwrap_err();
        assert_eq!(err, ParseAminoAcidError("HOH".to_string()));
    }

    #[test]
    fn one_letter_code_maps_known_and_rejects_unknown() {
        assert_eq!(one_letter_code("MET"), Some('M'));
        assert_eq!(one_letter_code("HIE"), Some('H'));
        assert_eq!(one_letter_code("LIG"), None);
    }

    #[test]
    fn three_letter_round_trips_through_display() {
        assert_eq!(AminoAcidType::AsparticAcid.to_string(), "ASP");
        assert_eq!(
            AminoAcidType::AsparticAcid.to_string().parse(),
            Ok(AminoAcidType::AsparticAcid)
        );
    }
}
