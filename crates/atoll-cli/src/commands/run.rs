use crate::cli::RunArgs;
use crate::config::PartialRunConfig;
use crate::error::{CliError, Result};
use crate::report;
use crate::utils::progress::CliProgressHandler;
use atoll::{
    core::io::{
        info::{InfoEntry, InfoTable},
        pdb::PdbFile,
        traits::{ReadOptions, StructureFile},
    },
    core::models::structure::Structure,
    engine::{
        loader::{SequenceLoader, SequenceTable},
        progress::ProgressReporter,
    },
    workflows::{self, compare::StructureReport},
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const TOPOLOGY_EXTENSION: &str = "pdb";

pub fn run(args: RunArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialRunConfig::from_file(path)?,
        None => PartialRunConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    report::check_output_dir(&args.output, args.overwrite)?;

    info!("Loading information file {:?}", &args.info);
    let info_table = InfoTable::load(&args.info).map_err(|e| CliError::FileParsing {
        path: args.info.clone(),
        source: e.into(),
    })?;

    let loader = match &args.sequence {
        Some(path) => {
            info!("Loading sequence file {:?}", path);
            let table = SequenceTable::load(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })?;
            SequenceLoader::from_table(table)
        }
        None => SequenceLoader::basic(),
    };

    let mut reference = load_reference(&args.reference, &info_table)?;
    let (mut queries, unreadable) = load_queries(&info_table)?;
    info!(
        "Loaded reference '{}' and {} structure(s).",
        reference.label,
        queries.len()
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Mapping domains onto {} structure(s)...", queries.len());
    let mut result = workflows::compare::run(
        &mut reference,
        &mut queries,
        &loader,
        &config,
        &reporter,
    )?;
    // Back into declaration order; indices ascend, so each slot is final when filled.
    for (index, excluded) in unreadable {
        result.structures.insert(index, excluded);
    }

    let skipped = result.structures.len() - result.mapped_count();
    if skipped > 0 {
        warn!("{} structure(s) could not be mapped.", skipped);
    }

    report::prepare_output_dir(&args.output, args.overwrite)?;
    let written = report::write_all(&args.output, &result, &info_table)?;
    for path in &written {
        info!("Wrote {:?}", path);
    }
    println!(
        "✓ {}/{} structure(s) mapped. Reports written to: {}",
        result.mapped_count(),
        result.structures.len(),
        args.output.display()
    );
    Ok(())
}

/// Reads every structure of the information file.
///
/// A file that cannot be read or parsed excludes its structure only; the report
/// keeps its position in declaration order. Misconfigured ensembles stay fatal.
fn load_queries(
    info_table: &InfoTable,
) -> Result<(Vec<Structure>, Vec<(usize, StructureReport)>)> {
    let mut loaded = Vec::with_capacity(info_table.len());
    let mut unreadable = Vec::new();
    for (index, entry) in info_table.entries().iter().enumerate() {
        match load_entry(entry) {
            Ok(structure) => loaded.push(structure),
            Err(CliError::FileParsing { path, source }) => {
                warn!(
                    structure = %entry.id,
                    "Excluded from analysis: cannot read {:?}: {}",
                    path,
                    source
                );
                let reason = format!("cannot read '{}': {}", path.display(), source);
                unreadable.push((index, StructureReport::excluded(&entry.id, reason)));
            }
            Err(e) => return Err(e),
        }
    }
    Ok((loaded, unreadable))
}

/// Resolves a structure path to its topology file.
///
/// A directory is an ensemble and must hold exactly one topology file; trajectory
/// files next to it are ignored.
fn topology_path(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(TOPOLOGY_EXTENSION))
        })
        .collect();

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(CliError::Config(format!(
            "No topology file (.{}) found in ensemble directory '{}'",
            TOPOLOGY_EXTENSION,
            path.display()
        ))),
        n => {
            candidates.sort();
            Err(CliError::Config(format!(
                "Ensemble directory '{}' holds {} topology files, expected one: {}",
                path.display(),
                n,
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
    }
}

fn read_structure(path: &Path, options: &ReadOptions) -> Result<Structure> {
    let topology = topology_path(path)?;
    PdbFile::read_from_path(&topology, options).map_err(|e| CliError::FileParsing {
        path: topology.clone(),
        source: e.into(),
    })
}

fn load_entry(entry: &InfoEntry) -> Result<Structure> {
    let options = ReadOptions::new(&entry.id).with_chain(entry.chain);
    let mut structure = read_structure(&entry.path, &options)?;
    structure.protein_name = entry.protein.clone();
    Ok(structure)
}

/// Loads the reference, taking label, chain and protein name from the information
/// file when it lists the same path.
fn load_reference(path: &Path, info_table: &InfoTable) -> Result<Structure> {
    let canonical = std::fs::canonicalize(path)?;
    let listed = info_table.entries().iter().find(|e| {
        std::fs::canonicalize(&e.path)
            .map(|p| p == canonical)
            .unwrap_or(false)
    });
    if let Some(entry) = listed {
        return load_entry(entry);
    }

    let label = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "reference".to_string());
    read_structure(path, &ReadOptions::new(&label))
}
