use crate::error::{CliError, Result};
use atoll::core::io::info::InfoTable;
use atoll::workflows::compare::{ComparisonResult, StructureOutcome, StructureReport};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const STRUCTURES_FILE: &str = "structures.csv";
pub const DOMAINS_FILE: &str = "domains.csv";
pub const GAPS_FILE: &str = "mapping_gaps.csv";
pub const NUMBERING_FILE: &str = "residue_numbering.csv";
pub const ALIGNMENTS_FILE: &str = "alignments.txt";

const ALIGNMENT_LINE_WIDTH: usize = 60;

const REFERENCE_ROLE: &str = "reference";
const QUERY_ROLE: &str = "query";

/// A report paired with the role its structure played in the run.
type Tagged<'a> = (&'static str, &'a StructureReport);

#[derive(Serialize)]
struct StructureRow<'a> {
    structure: &'a str,
    role: &'static str,
    outcome: &'static str,
    source: String,
    identity: Option<String>,
    coverage: Option<String>,
    low_identity: bool,
    reason: &'a str,
}

#[derive(Serialize)]
struct DomainRow<'a> {
    structure: &'a str,
    role: &'static str,
    class: &'a str,
    domain: &'a str,
    label: &'a str,
    numbering: String,
    resolved: bool,
    start: Option<isize>,
    end: Option<isize>,
    members: String, // Space separated
}

#[derive(Serialize)]
struct GapRow<'a> {
    structure: &'a str,
    role: &'static str,
    domain: &'a str,
    label: &'a str,
    endpoint: String,
    reference_id: isize,
    reason: String,
}

#[derive(Serialize)]
struct NumberingRow<'a> {
    structure: &'a str,
    role: &'static str,
    reference_position: usize,
    reference_id: isize,
    query_position: usize,
    query_id: isize,
}

/// Fails early when the output exists and may not be replaced. Touches nothing.
pub fn check_output_dir(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(CliError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

/// Creates the output directory, replacing an existing one only when `overwrite` is set.
pub fn prepare_output_dir(path: &Path, overwrite: bool) -> Result<()> {
    check_output_dir(path, overwrite)?;
    if path.exists() {
        info!("Removing existing output {:?}", path);
        if path.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
    }
    fs::create_dir_all(path)?;
    Ok(())
}

/// Writes every report of a finished run into `dir`, reference first.
pub fn write_all(dir: &Path, result: &ComparisonResult, info: &InfoTable) -> Result<Vec<PathBuf>> {
    let reports: Vec<Tagged<'_>> = std::iter::once((REFERENCE_ROLE, &result.reference))
        .chain(result.structures.iter().map(|r| (QUERY_ROLE, r)))
        .collect();

    Ok(vec![
        write_csv(&dir.join(STRUCTURES_FILE), structure_rows(&reports))?,
        write_csv(&dir.join(DOMAINS_FILE), domain_rows(&reports, info))?,
        write_csv(&dir.join(GAPS_FILE), gap_rows(&reports))?,
        write_csv(&dir.join(NUMBERING_FILE), numbering_rows(&reports))?,
        write_alignments(&dir.join(ALIGNMENTS_FILE), &reports)?,
    ])
}

fn write_csv<R: Serialize>(path: &Path, rows: Vec<R>) -> Result<PathBuf> {
    let report_err = |e: csv::Error| CliError::Report {
        path: path.to_path_buf(),
        source: e.into(),
    };
    let mut writer = csv::Writer::from_path(path).map_err(report_err)?;
    for row in rows {
        writer.serialize(row).map_err(report_err)?;
    }
    writer.flush()?;
    Ok(path.to_path_buf())
}

fn outcome_name(outcome: &StructureOutcome) -> (&'static str, &str) {
    match outcome {
        StructureOutcome::Mapped => ("mapped", ""),
        StructureOutcome::Excluded { reason } => ("excluded", reason),
        StructureOutcome::Failed { reason } => ("failed", reason),
    }
}

fn structure_rows<'a>(reports: &[Tagged<'a>]) -> Vec<StructureRow<'a>> {
    reports
        .iter()
        .copied()
        .map(|(role, r)| {
            let (outcome, reason) = outcome_name(&r.outcome);
            StructureRow {
                structure: &r.label,
                role,
                outcome,
                source: r
                    .sequence_source
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                identity: r.alignment.as_ref().map(|a| format!("{:.3}", a.identity())),
                coverage: r
                    .alignment
                    .as_ref()
                    .map(|a| format!("{:.3}", a.table.coverage())),
                low_identity: r.low_identity,
                reason,
            }
        })
        .collect()
}

fn domain_rows<'a>(reports: &[Tagged<'a>], info: &'a InfoTable) -> Vec<DomainRow<'a>> {
    let mut rows = Vec::new();
    for &(role, report) in reports {
        let class = info
            .get(&report.label)
            .and_then(|e| e.class.as_deref())
            .unwrap_or("");
        for selection in report.mappings.iter().flat_map(|m| m.selections.iter()) {
            rows.push(DomainRow {
                structure: &report.label,
                role,
                class,
                domain: &selection.domain,
                label: &selection.label,
                numbering: selection.numbering.to_string(),
                resolved: selection.resolved,
                start: selection.span.map(|(start, _)| start),
                end: selection.span.map(|(_, end)| end),
                members: selection
                    .members
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            });
        }
    }
    rows
}

fn gap_rows<'a>(reports: &[Tagged<'a>]) -> Vec<GapRow<'a>> {
    reports
        .iter()
        .copied()
        .flat_map(|(role, report)| {
            report.gaps().map(move |gap| GapRow {
                structure: &report.label,
                role,
                domain: &gap.domain,
                label: &gap.label,
                endpoint: gap.endpoint.to_string(),
                reference_id: gap.reference_id,
                reason: gap.reason.to_string(),
            })
        })
        .collect()
}

fn numbering_rows<'a>(reports: &[Tagged<'a>]) -> Vec<NumberingRow<'a>> {
    reports
        .iter()
        .copied()
        .filter_map(|(role, report)| report.alignment.as_ref().map(|a| (role, report, a)))
        .flat_map(|(role, report, alignment)| {
            alignment.table.mapped_pairs().map(move |m| NumberingRow {
                structure: &report.label,
                role,
                reference_position: m.reference_position + 1,
                reference_id: m.reference_id,
                query_position: m.query_position + 1,
                query_id: m.query_id,
            })
        })
        .collect()
}

fn write_alignments(path: &Path, reports: &[Tagged<'_>]) -> Result<PathBuf> {
    let mut out = BufWriter::new(File::create(path)?);
    for &(role, report) in reports {
        let (outcome, reason) = outcome_name(&report.outcome);
        let source = report
            .sequence_source
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".to_string());
        writeln!(
            out,
            "# {} [{}] ({}, sequence from {})",
            report.label, role, outcome, source
        )?;

        let Some(alignment) = &report.alignment else {
            writeln!(out, "# {}\n", reason)?;
            continue;
        };
        writeln!(
            out,
            "# score {}  gaps {}  identity {:.1}%  coverage {:.1}%{}",
            alignment.score,
            alignment.gap_columns,
            alignment.identity() * 100.0,
            alignment.table.coverage() * 100.0,
            if report.low_identity { "  LOW IDENTITY" } else { "" }
        )?;

        let reference = alignment.aligned_reference().as_bytes();
        let query = alignment.aligned_query().as_bytes();
        for (r, q) in reference
            .chunks(ALIGNMENT_LINE_WIDTH)
            .zip(query.chunks(ALIGNMENT_LINE_WIDTH))
        {
            let matches: String = r
                .iter()
                .zip(q)
                .map(|(a, b)| if a == b { '|' } else { ' ' })
                .collect();
            writeln!(out, "ref   {}", String::from_utf8_lossy(r))?;
            writeln!(out, "      {}", matches)?;
            writeln!(out, "query {}", String::from_utf8_lossy(q))?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(path.to_path_buf())
}
