use crate::core::models::sequence::Sequence;
use crate::core::models::structure::Structure;
use crate::engine::aligner::{Aligner, Alignment};
use crate::engine::config::RunConfig;
use crate::engine::domain::{DomainMapping, MappingGap, map_domain, unresolved_domain};
use crate::engine::error::EngineError;
use crate::engine::loader::{SequenceLoader, SequenceSource};
use crate::engine::progress::{Progress, ProgressReporter};
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureOutcome {
    Mapped,
    /// No sequence could be resolved; the structure takes no further part.
    Excluded { reason: String },
    /// The alignment failed; every selection is reported unresolved.
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct StructureReport {
    pub label: String,
    pub sequence_source: Option<SequenceSource>,
    pub outcome: StructureOutcome,
    pub alignment: Option<Alignment>,
    pub low_identity: bool,
    pub mappings: Vec<DomainMapping>, // Same order as the configured domains
}

impl StructureReport {
    pub fn is_mapped(&self) -> bool {
        self.outcome == StructureOutcome::Mapped
    }

    pub fn gaps(&self) -> impl Iterator<Item = &MappingGap> {
        self.mappings.iter().flat_map(|m| m.gaps.iter())
    }

    pub fn mapping(&self, domain: &str) -> Option<&DomainMapping> {
        self.mappings.iter().find(|m| m.name == domain)
    }

    /// A structure that never reached alignment, with the reason it was left out.
    pub fn excluded(label: &str, reason: String) -> Self {
        Self {
            label: label.to_string(),
            sequence_source: None,
            outcome: StructureOutcome::Excluded { reason },
            alignment: None,
            low_identity: false,
            mappings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub reference: StructureReport,
    pub structures: Vec<StructureReport>, // Load order
}

impl ComparisonResult {
    pub fn mapped_count(&self) -> usize {
        self.structures.iter().filter(|s| s.is_mapped()).count()
    }
}

/// Maps every configured domain from the reference onto each query structure.
///
/// Each structure gets its own copy of its resolved sequence attached. The reference
/// is processed first and any failure there aborts the run. Queries are processed in
/// parallel; one query failing never affects another.
#[instrument(skip_all, name = "compare_workflow")]
pub fn run(
    reference: &mut Structure,
    queries: &mut [Structure],
    loader: &SequenceLoader,
    config: &RunConfig,
    reporter: &ProgressReporter,
) -> Result<ComparisonResult, EngineError> {
    if queries.is_empty() {
        return Err(EngineError::Initialization(
            "no query structures were loaded".to_string(),
        ));
    }
    let aligner = Aligner::new(config.scoring);

    // === Phase 1: Reference ===
    reporter.report(Progress::ReferenceStart {
        label: reference.label.clone(),
    });
    let reference_report = prepare_reference(reference, loader, &aligner, config)?;
    let reference_sequence = reference
        .sequence()
        .ok_or_else(|| EngineError::Internal("reference sequence was not attached".into()))?;
    check_domain_endpoints(reference_sequence, config);
    reporter.report(Progress::ReferenceReady {
        label: reference.label.clone(),
        residues: reference_sequence.len(),
    });

    // === Phase 2: Queries ===
    reporter.report(Progress::AlignmentStart {
        total: queries.len() as u64,
    });
    let structures: Vec<StructureReport> = queries
        .par_iter_mut()
        .map(|structure| {
            let report = process_structure(
                structure,
                reference_sequence,
                loader,
                &aligner,
                config,
                reporter,
            );
            reporter.report(Progress::StructureDone {
                label: report.label.clone(),
                mapped: report.is_mapped(),
            });
            report
        })
        .collect();

    let result = ComparisonResult {
        reference: reference_report,
        structures,
    };
    let mapped = result.mapped_count();
    reporter.report(Progress::AlignmentFinish {
        mapped,
        total: result.structures.len(),
    });
    info!(
        mapped,
        total = result.structures.len(),
        "Domain mapping complete."
    );
    if mapped == 0 {
        return Err(EngineError::NoSurvivingStructures);
    }
    Ok(result)
}

fn prepare_reference(
    reference: &mut Structure,
    loader: &SequenceLoader,
    aligner: &Aligner,
    config: &RunConfig,
) -> Result<StructureReport, EngineError> {
    let fail = |source: EngineError| EngineError::ReferenceFailed {
        label: reference.label.clone(),
        source: Box::new(source),
    };

    let resolved = loader.resolve(reference).map_err(fail)?;
    let alignment = aligner
        .align(&resolved.sequence, &resolved.sequence)
        .map_err(fail)?;
    info!(
        structure = %reference.label,
        source = %resolved.source,
        residues = resolved.sequence.len(),
        "Prepared reference structure."
    );

    let mappings = map_all(&alignment, config);
    reference.attach_sequence(resolved.sequence);
    Ok(StructureReport {
        label: reference.label.clone(),
        sequence_source: Some(resolved.source),
        outcome: StructureOutcome::Mapped,
        alignment: Some(alignment),
        low_identity: false,
        mappings,
    })
}

fn check_domain_endpoints(reference: &Sequence, config: &RunConfig) {
    for domain in &config.domains {
        for interval in &domain.intervals {
            for id in [interval.start, interval.end] {
                if reference.position_of(id).is_none() {
                    warn!(
                        domain = %domain.name,
                        interval = %interval,
                        "Residue {} does not exist in the reference sequence",
                        id
                    );
                }
            }
        }
    }
}

fn process_structure(
    structure: &mut Structure,
    reference: &Sequence,
    loader: &SequenceLoader,
    aligner: &Aligner,
    config: &RunConfig,
    reporter: &ProgressReporter,
) -> StructureReport {
    let label = structure.label.clone();
    let notify = |message: String| {
        reporter.report(Progress::Warning {
            label: label.clone(),
            message,
        })
    };
    let resolved = match loader.resolve(structure) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(structure = %structure.label, "Excluded from analysis: {}", e);
            notify(format!("excluded: {e}"));
            return StructureReport::excluded(&structure.label, e.to_string());
        }
    };
    let source = resolved.source;
    structure.attach_sequence(resolved.sequence);
    let Some(query) = structure.sequence() else {
        return StructureReport::excluded(&structure.label, "sequence was not attached".into());
    };

    info!(structure = %structure.label, %source, "Sequence alignment of \"{}\"", structure.label);
    let mut report = StructureReport {
        label: structure.label.clone(),
        sequence_source: Some(source),
        outcome: StructureOutcome::Mapped,
        alignment: None,
        low_identity: false,
        mappings: Vec::new(),
    };

    match aligner.align(reference, query) {
        Ok(alignment) => {
            let identity = alignment.identity();
            debug!(
                structure = %structure.label,
                score = alignment.score,
                identity,
                coverage = alignment.table.coverage(),
                "\n{}\n{}",
                alignment.aligned_reference(),
                alignment.aligned_query()
            );
            if identity < config.min_identity {
                warn!(
                    structure = %structure.label,
                    "Low sequence identity with the reference: {:.1}%",
                    identity * 100.0
                );
                notify(format!("low sequence identity ({:.1}%)", identity * 100.0));
                report.low_identity = true;
            }

            report.mappings = map_all(&alignment, config);
            for gap in report.gaps() {
                warn!(
                    structure = %structure.label,
                    domain = %gap.domain,
                    selection = %gap.label,
                    endpoint = %gap.endpoint,
                    reason = %gap.reason,
                    "Reference residue {} could not be mapped",
                    gap.reference_id
                );
                notify(format!(
                    "{} {} of {}: residue {} {}",
                    gap.label, gap.endpoint, gap.domain, gap.reference_id, gap.reason
                ));
            }
            report.alignment = Some(alignment);
        }
        Err(e) => {
            warn!(structure = %structure.label, "Alignment failed: {}", e);
            notify(format!("alignment failed: {e}"));
            report.outcome = StructureOutcome::Failed {
                reason: e.to_string(),
            };
            report.mappings = config
                .domains
                .iter()
                .map(|d| unresolved_domain(&d.name, &d.intervals, config.numbering, &config.prefix))
                .collect();
        }
    }
    report
}

fn map_all(alignment: &Alignment, config: &RunConfig) -> Vec<DomainMapping> {
    config
        .domains
        .iter()
        .map(|d| {
            map_domain(
                &d.name,
                &d.intervals,
                &alignment.table,
                config.numbering,
                &config.prefix,
            )
        })
        .collect()
}
