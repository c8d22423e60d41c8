//! Parsing of residue interval expressions such as `"33-60,68-95 103:131"`.
//!
//! Items are separated by commas, semicolons or whitespace. A range is written
//! `start-end` or `start:end`; a bare number selects a single residue. Residue ids
//! may be negative (`-5-10`, `-5:-1`).

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResidueInterval {
    pub start: isize,
    pub end: isize,
}

impl ResidueInterval {
    pub fn new(start: isize, end: isize) -> Result<Self, SelectorError> {
        if start > end {
            return Err(SelectorError::ReversedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(id: isize) -> Self {
        Self { start: id, end: id }
    }

    pub fn contains(&self, id: isize) -> bool {
        (self.start..=self.end).contains(&id)
    }
}

impl fmt::Display for ResidueInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Selection is empty")]
    Empty,
    #[error("Invalid residue number '{value}' in selection item '{item}'")]
    InvalidNumber { item: String, value: String },
    #[error("Interval {start}-{end} has its start after its end")]
    ReversedInterval { start: isize, end: isize },
}

/// Splits an interval expression into residue intervals, in declaration order.
pub fn parse_intervals(expression: &str) -> Result<Vec<ResidueInterval>, SelectorError> {
    let intervals = expression
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .map(parse_item)
        .collect::<Result<Vec<_>, _>>()?;

    if intervals.is_empty() {
        return Err(SelectorError::Empty);
    }
    Ok(intervals)
}

fn parse_item(item: &str) -> Result<ResidueInterval, SelectorError> {
    let number = |value: &str| -> Result<isize, SelectorError> {
        value.parse().map_err(|_| SelectorError::InvalidNumber {
            item: item.to_string(),
            value: value.to_string(),
        })
    };

    match split_range(item) {
        Some((start, end)) => ResidueInterval::new(number(start)?, number(end)?),
        None => Ok(ResidueInterval::single(number(item)?)),
    }
}

fn split_range(item: &str) -> Option<(&str, &str)> {
    if let Some(pair) = item.split_once(':') {
        return Some(pair);
    }
    // A leading '-' is a sign, not a range separator.
    item.get(1..)?
        .find('-')
        .map(|i| (&item[..=i], &item[i + 2..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: isize, end: isize) -> ResidueInterval {
        ResidueInterval::new(start, end).unwrap()
    }

    #[test]
    fn parses_dash_and_colon_ranges_with_mixed_separators() {
        let intervals = parse_intervals("33-60,68-95 103:131;140").unwrap();
        assert_eq!(
            intervals,
            vec![iv(33, 60), iv(68, 95), iv(103, 131), ResidueInterval::single(140)]
        );
    }

    #[test]
    fn preserves_declaration_order() {
        let intervals = parse_intervals("200-210 1-5").unwrap();
        assert_eq!(intervals, vec![iv(200, 210), iv(1, 5)]);
    }

    #[test]
    fn accepts_negative_residue_ids() {
        assert_eq!(parse_intervals("-5-10").unwrap(), vec![iv(-5, 10)]);
        assert_eq!(parse_intervals("-5--1").unwrap(), vec![iv(-5, -1)]);
        assert_eq!(parse_intervals("-5:-1").unwrap(), vec![iv(-5, -1)]);
        assert_eq!(parse_intervals("-3").unwrap(), vec![ResidueInterval::single(-3)]);
    }

    #[test]
    fn rejects_reversed_intervals() {
        assert_eq!(
            parse_intervals("60-33"),
            Err(SelectorError::ReversedInterval { start: 60, end: 33 })
        );
    }

    #[test]
    fn rejects_non_numeric_items() {
        assert_eq!(
            parse_intervals("33-6x"),
            Err(SelectorError::InvalidNumber {
                item: "33-6x".into(),
                value: "6x".into()
            })
        );
        assert!(matches!(
            parse_intervals("TM1"),
            Err(SelectorError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn rejects_empty_expression() {
        assert_eq!(parse_intervals("  , ;"), Err(SelectorError::Empty));
    }

    #[test]
    fn display_and_contains() {
        assert_eq!(iv(3, 9).to_string(), "3-9");
        assert_eq!(ResidueInterval::single(4).to_string(), "4");
        assert!(iv(3, 9).contains(3));
        assert!(iv(3, 9).contains(9));
        assert!(!iv(3, 9).contains(10));
    }
}
