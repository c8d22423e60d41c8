use super::correspondence::{CorrespondenceTable, Unresolved};
use crate::core::selection::ResidueInterval;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How the members of a named selection are numbered in the query structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingMode {
    /// 1-based index into the query sequence.
    #[default]
    Position,
    /// The query structure's own residue numbers.
    Resid,
}

impl NumberingMode {
    fn encode(self, table: &CorrespondenceTable, query_position: usize) -> Option<isize> {
        match self {
            NumberingMode::Position => Some(query_position as isize + 1),
            NumberingMode::Resid => table.query_resid_at(query_position),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown numbering mode '{0}' (expected 'position' or 'resid')")]
pub struct ParseNumberingModeError(String);

impl FromStr for NumberingMode {
    type Err = ParseNumberingModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "position" => Ok(NumberingMode::Position),
            "resid" => Ok(NumberingMode::Resid),
            _ => Err(ParseNumberingModeError(s.to_string())),
        }
    }
}

impl fmt::Display for NumberingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                NumberingMode::Position => "position",
                NumberingMode::Resid => "resid",
            }
        )
    }
}

/// A named, ordered list of intervals in reference residue numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainDefinition {
    pub name: String,
    pub intervals: Vec<ResidueInterval>,
}

impl DomainDefinition {
    pub fn new(name: &str, intervals: Vec<ResidueInterval>) -> Self {
        Self {
            name: name.to_string(),
            intervals,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Endpoint::Start => "start",
                Endpoint::End => "end",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GapReason {
    NotInReference,
    NoCounterpart,
    AlignmentFailed,
}

impl From<Unresolved> for GapReason {
    fn from(value: Unresolved) -> Self {
        match value {
            Unresolved::NotInReference => GapReason::NotInReference,
            Unresolved::NoCounterpart => GapReason::NoCounterpart,
        }
    }
}

impl fmt::Display for GapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapReason::NotInReference => write!(f, "{}", Unresolved::NotInReference),
            GapReason::NoCounterpart => write!(f, "{}", Unresolved::NoCounterpart),
            GapReason::AlignmentFailed => write!(f, "alignment-failed"),
        }
    }
}

/// An interval endpoint that could not be carried over to the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingGap {
    pub domain: String,
    pub label: String,
    pub endpoint: Endpoint,
    pub reference_id: isize,
    pub reason: GapReason,
}

/// One interval of a domain, expressed in the query's numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSelection {
    pub domain: String,
    pub label: String, // `{prefix}{index}`
    pub index: usize,  // 1-based declaration index
    pub numbering: NumberingMode,
    pub reference: ResidueInterval,
    pub span: Option<(isize, isize)>,
    pub members: Vec<isize>,
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMapping {
    pub name: String,
    pub selections: Vec<NamedSelection>,
    pub gaps: Vec<MappingGap>,
}

impl DomainMapping {
    pub fn resolved_count(&self) -> usize {
        self.selections.iter().filter(|s| s.resolved).count()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.gaps.is_empty()
    }
}

fn selection_label(prefix: &str, index: usize) -> String {
    format!("{prefix}{index}")
}

/// Projects a domain onto the query structure through its correspondence table.
///
/// Selections come out in declaration order. An interval whose start or end has no
/// counterpart yields an unresolved, empty selection and one [`MappingGap`] per
/// failing endpoint.
pub fn map_domain(
    name: &str,
    intervals: &[ResidueInterval],
    table: &CorrespondenceTable,
    numbering: NumberingMode,
    prefix: &str,
) -> DomainMapping {
    let mut selections = Vec::with_capacity(intervals.len());
    let mut gaps = Vec::new();

    for (i, interval) in intervals.iter().enumerate() {
        let index = i + 1;
        let label = selection_label(prefix, index);
        let start = table.resolve_resid(interval.start);
        let end = table.resolve_resid(interval.end);

        let mut selection = NamedSelection {
            domain: name.to_string(),
            label: label.clone(),
            index,
            numbering,
            reference: *interval,
            span: None,
            members: Vec::new(),
            resolved: false,
        };

        match (start, end) {
            (Ok(first), Ok(last)) => {
                selection.members = (first.query_position..=last.query_position)
                    .filter_map(|p| numbering.encode(table, p))
                    .collect();
                selection.span = selection
                    .members
                    .first()
                    .zip(selection.members.last())
                    .map(|(a, b)| (*a, *b));
                selection.resolved = true;
            }
            (start, end) => {
                for (endpoint, result, reference_id) in [
                    (Endpoint::Start, start, interval.start),
                    (Endpoint::End, end, interval.end),
                ] {
                    if let Err(reason) = result {
                        gaps.push(MappingGap {
                            domain: name.to_string(),
                            label: label.clone(),
                            endpoint,
                            reference_id,
                            reason: reason.into(),
                        });
                    }
                }
            }
        }
        selections.push(selection);
    }

    DomainMapping {
        name: name.to_string(),
        selections,
        gaps,
    }
}

/// The mapping recorded for a structure whose alignment failed.
pub fn unresolved_domain(
    name: &str,
    intervals: &[ResidueInterval],
    numbering: NumberingMode,
    prefix: &str,
) -> DomainMapping {
    let mut selections = Vec::with_capacity(intervals.len());
    let mut gaps = Vec::with_capacity(intervals.len() * 2);

    for (i, interval) in intervals.iter().enumerate() {
        let index = i + 1;
        let label = selection_label(prefix, index);
        for (endpoint, reference_id) in [
            (Endpoint::Start, interval.start),
            (Endpoint::End, interval.end),
        ] {
            gaps.push(MappingGap {
                domain: name.to_string(),
                label: label.clone(),
                endpoint,
                reference_id,
                reason: GapReason::AlignmentFailed,
            });
        }
        selections.push(NamedSelection {
            domain: name.to_string(),
            label,
            index,
            numbering,
            reference: *interval,
            span: None,
            members: Vec::new(),
            resolved: false,
        });
    }

    DomainMapping {
        name: name.to_string(),
        selections,
        gaps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::sequence::Sequence;
    use crate::engine::aligner::Aligner;

    fn iv(start: isize, end: isize) -> ResidueInterval {
        ResidueInterval::new(start, end).unwrap()
    }

    fn table(reference: &str, query: &str, query_first_id: isize) -> CorrespondenceTable {
        let r = Sequence::from_letters(reference, 1, None).unwrap();
        let q = Sequence::from_letters(query, query_first_id, None).unwrap();
        Aligner::default().align(&r, &q).unwrap().table
    }

    #[test]
    fn maps_intervals_in_position_numbering() {
        let t = table("ABCDE", "ACDE", 1);
        let mapping = map_domain("phelix", &[iv(3, 5)], &t, NumberingMode::Position, "TM");
        let selection = &mapping.selections[0];
        assert_eq!(selection.label, "TM1");
        assert!(selection.resolved);
        assert_eq!(selection.members, vec![2, 3, 4]);
        assert_eq!(selection.span, Some((2, 4)));
        assert!(mapping.is_fully_resolved());
    }

    #[test]
    fn resid_numbering_uses_native_query_ids() {
        let t = table("ABCDE", "ACDE", 40);
        let mapping = map_domain("phelix", &[iv(3, 5)], &t, NumberingMode::Resid, "TM");
        assert_eq!(mapping.selections[0].members, vec![41, 42, 43]);
    }

    #[test]
    fn position_and_resid_numbering_agree() {
        let query = Sequence::from_letters("MKTAYIAKQ", 17, None).unwrap();
        let reference = Sequence::from_letters("MKTWAYIAKQ", 1, None).unwrap();
        let t = Aligner::default().align(&reference, &query).unwrap().table;
        let intervals = [iv(1, 3), iv(5, 10)];

        let by_position = map_domain("d", &intervals, &t, NumberingMode::Position, "TM");
        let by_resid = map_domain("d", &intervals, &t, NumberingMode::Resid, "TM");
        for (p, r) in by_position.selections.iter().zip(&by_resid.selections) {
            let translated: Vec<_> = p
                .members
                .iter()
                .map(|&pos| query.resid_at(pos as usize - 1).unwrap())
                .collect();
            assert_eq!(translated, r.members);
        }
    }

    #[test]
    fn unmapped_endpoint_yields_unresolved_selection_and_gap() {
        let t = table("ABCDE", "ACDE", 1);
        let mapping = map_domain("phelix", &[iv(2, 4)], &t, NumberingMode::Position, "TM");
        let selection = &mapping.selections[0];
        assert!(!selection.resolved);
        assert!(selection.members.is_empty());
        assert_eq!(
            mapping.gaps,
            vec![MappingGap {
                domain: "phelix".into(),
                label: "TM1".into(),
                endpoint: Endpoint::Start,
                reference_id: 2,
                reason: GapReason::NoCounterpart,
            }]
        );
    }

    #[test]
    fn interval_with_both_endpoints_unmapped_is_empty_and_reported_twice() {
        let t = table("ABCDE", "ACDE", 1);
        let mapping = map_domain(
            "phelix",
            &[iv(2, 9), iv(3, 5)],
            &t,
            NumberingMode::Position,
            "TM",
        );
        let selection = &mapping.selections[0];
        assert!(!selection.resolved);
        assert!(selection.members.is_empty());
        assert_eq!(selection.span, None);
        assert_eq!(
            mapping.gaps,
            vec![
                MappingGap {
                    domain: "phelix".into(),
                    label: "TM1".into(),
                    endpoint: Endpoint::Start,
                    reference_id: 2,
                    reason: GapReason::NoCounterpart,
                },
                MappingGap {
                    domain: "phelix".into(),
                    label: "TM1".into(),
                    endpoint: Endpoint::End,
                    reference_id: 9,
                    reason: GapReason::NotInReference,
                },
            ]
        );
        assert!(mapping.selections[1].resolved);
        assert_eq!(mapping.resolved_count(), 1);
    }

    #[test]
    fn endpoint_outside_reference_is_reported() {
        let t = table("ABCDE", "ABCDE", 1);
        let mapping = map_domain("alignment", &[iv(4, 9)], &t, NumberingMode::Position, "TM");
        assert_eq!(mapping.gaps.len(), 1);
        assert_eq!(mapping.gaps[0].endpoint, Endpoint::End);
        assert_eq!(mapping.gaps[0].reason, GapReason::NotInReference);
    }

    #[test]
    fn degenerate_interval_selects_single_residue() {
        let t = table("ABCDE", "ACDE", 1);
        let mapping = map_domain("phelix", &[iv(4, 4)], &t, NumberingMode::Position, "TM");
        assert_eq!(mapping.selections[0].members, vec![3]);
    }

    #[test]
    fn selections_follow_declaration_order() {
        let t = table("ABCDEFGHIK", "ABCDEFGHIK", 1);
        let mapping = map_domain(
            "phelix",
            &[iv(8, 10), iv(1, 2), iv(4, 5)],
            &t,
            NumberingMode::Position,
            "H",
        );
        let labels: Vec<_> = mapping.selections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["H1", "H2", "H3"]);
        assert_eq!(mapping.selections[0].members, vec![8, 9, 10]);
        assert_eq!(mapping.resolved_count(), 3);
    }

    #[test]
    fn unresolved_domain_marks_every_endpoint() {
        let mapping = unresolved_domain("phelix", &[iv(1, 5), iv(7, 7)], NumberingMode::Resid, "TM");
        assert_eq!(mapping.selections.len(), 2);
        assert!(mapping.selections.iter().all(|s| !s.resolved));
        assert_eq!(mapping.gaps.len(), 4);
        assert!(mapping.gaps.iter().all(|g| g.reason == GapReason::AlignmentFailed));
    }

    #[test]
    fn parses_numbering_modes() {
        assert_eq!("Position".parse(), Ok(NumberingMode::Position));
        assert_eq!(" resid ".parse(), Ok(NumberingMode::Resid));
        assert!("index".parse::<NumberingMode>().is_err());
        assert_eq!(NumberingMode::Resid.to_string(), "resid");
    }
}
