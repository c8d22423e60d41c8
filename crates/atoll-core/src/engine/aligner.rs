use super::correspondence::CorrespondenceTable;
use super::error::{EngineError, SequenceSide};
use super::scoring::ScoringScheme;
use crate::core::models::sequence::Sequence;
use tracing::trace;

const GAP_SYMBOL: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    score: i32,
    gaps: u32, // Gap columns on the best path into this cell
}

const NEG: Cell = Cell {
    score: i32::MIN / 4,
    gaps: 0,
};

impl Cell {
    fn step(self, delta: i32, gap: bool) -> Cell {
        Cell {
            score: self.score.saturating_add(delta),
            gaps: self.gaps + gap as u32,
        }
    }

    fn beats(self, other: Cell) -> bool {
        self.score > other.score || (self.score == other.score && self.gaps < other.gaps)
    }
}

fn best(a: Cell, b: Cell) -> Cell {
    if b.beats(a) { b } else { a }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Match,
    ReferenceGap, // Reference residue against a gap in the query
    QueryGap,     // Query residue against a gap in the reference
}

/// One column of a pairwise alignment, as sequence positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignedColumn {
    Pair { reference: usize, query: usize },
    ReferenceOnly(usize),
    QueryOnly(usize),
}

#[derive(Debug, Clone)]
pub struct Alignment {
    pub score: i32,
    pub gap_columns: usize,
    pub columns: Vec<AlignedColumn>,
    pub table: CorrespondenceTable,
    identical: usize,
    aligned_reference: String,
    aligned_query: String,
}

impl Alignment {
    pub fn aligned_pairs(&self) -> usize {
        self.table.mapped_count()
    }

    /// Fraction of aligned pairs carrying the same residue letter.
    pub fn identity(&self) -> f64 {
        match self.aligned_pairs() {
            0 => 0.0,
            n => self.identical as f64 / n as f64,
        }
    }

    pub fn aligned_reference(&self) -> &str {
        &self.aligned_reference
    }

    pub fn aligned_query(&self) -> &str {
        &self.aligned_query
    }
}

/// Global affine-gap aligner.
///
/// Among optimal alignments the one with the fewest gap columns wins. Remaining ties
/// are broken during traceback by placing gaps as late as possible and by preferring
/// a gap in the query over a gap in the reference, which makes the result fully
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct Aligner {
    scoring: ScoringScheme,
}

impl Aligner {
    pub fn new(scoring: ScoringScheme) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> &ScoringScheme {
        &self.scoring
    }

    pub fn align(&self, reference: &Sequence, query: &Sequence) -> Result<Alignment, EngineError> {
        if reference.is_empty() {
            return Err(EngineError::Alignment {
                side: SequenceSide::Reference,
            });
        }
        if query.is_empty() {
            return Err(EngineError::Alignment {
                side: SequenceSide::Query,
            });
        }

        let a = reference.letters();
        let b = query.letters();
        let (m, n) = (a.len(), b.len());
        let open = self.scoring.gap_open;
        let extend = self.scoring.gap_extend;

        let width = n + 1;
        let idx = |i: usize, j: usize| i * width + j;
        let mut h = vec![NEG; (m + 1) * width];
        let mut x = vec![NEG; (m + 1) * width];
        let mut y = vec![NEG; (m + 1) * width];

        h[idx(0, 0)] = Cell { score: 0, gaps: 0 };
        for i in 1..=m {
            let cell = Cell {
                score: open + (i as i32 - 1) * extend,
                gaps: i as u32,
            };
            x[idx(i, 0)] = cell;
            h[idx(i, 0)] = cell;
        }
        for j in 1..=n {
            let cell = Cell {
                score: open + (j as i32 - 1) * extend,
                gaps: j as u32,
            };
            y[idx(0, j)] = cell;
            h[idx(0, j)] = cell;
        }

        for i in 1..=m {
            for j in 1..=n {
                let x_cell = best(
                    h[idx(i - 1, j)].step(open, true),
                    x[idx(i - 1, j)].step(extend, true),
                );
                let y_cell = best(
                    h[idx(i, j - 1)].step(open, true),
                    y[idx(i, j - 1)].step(extend, true),
                );
                let diag = h[idx(i - 1, j - 1)].step(self.scoring.score_pair(a[i - 1], b[j - 1]), false);

                x[idx(i, j)] = x_cell;
                y[idx(i, j)] = y_cell;
                h[idx(i, j)] = best(best(diag, x_cell), y_cell);
            }
        }

        let end = h[idx(m, n)];
        let mut columns = Vec::with_capacity(m + n);
        let (mut i, mut j) = (m, n);
        let mut state = State::Match;

        while i > 0 || j > 0 {
            match state {
                State::Match => {
                    let here = h[idx(i, j)];
                    if i > 0 && x[idx(i, j)] == here {
                        state = State::ReferenceGap;
                    } else if j > 0 && y[idx(i, j)] == here {
                        state = State::QueryGap;
                    } else {
                        columns.push(AlignedColumn::Pair {
                            reference: i - 1,
                            query: j - 1,
                        });
                        i -= 1;
                        j -= 1;
                    }
                }
                State::ReferenceGap => {
                    columns.push(AlignedColumn::ReferenceOnly(i - 1));
                    let opened = h[idx(i - 1, j)].step(open, true);
                    if x[idx(i, j)] == opened {
                        state = State::Match;
                    }
                    i -= 1;
                }
                State::QueryGap => {
                    columns.push(AlignedColumn::QueryOnly(j - 1));
                    let opened = h[idx(i, j - 1)].step(open, true);
                    if y[idx(i, j)] == opened {
                        state = State::Match;
                    }
                    j -= 1;
                }
            }
        }
        columns.reverse();

        let mut aligned_reference = String::with_capacity(columns.len());
        let mut aligned_query = String::with_capacity(columns.len());
        let mut identical = 0;
        let mut pairs = Vec::with_capacity(m.min(n));
        for column in &columns {
            match *column {
                AlignedColumn::Pair { reference, query } => {
                    if a[reference] == b[query] {
                        identical += 1;
                    }
                    aligned_reference.push(a[reference] as char);
                    aligned_query.push(b[query] as char);
                    pairs.push((reference, query));
                }
                AlignedColumn::ReferenceOnly(reference) => {
                    aligned_reference.push(a[reference] as char);
                    aligned_query.push(GAP_SYMBOL);
                }
                AlignedColumn::QueryOnly(query) => {
                    aligned_reference.push(GAP_SYMBOL);
                    aligned_query.push(b[query] as char);
                }
            }
        }

        let table = CorrespondenceTable::from_pairs(reference, query, pairs)?;
        trace!(
            score = end.score,
            gaps = end.gaps,
            "Aligned {} against {} residues",
            m,
            n
        );

        Ok(Alignment {
            score: end.score,
            gap_columns: end.gaps as usize,
            columns,
            table,
            identical,
            aligned_reference,
            aligned_query,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scoring::SubstitutionMatrix;

    fn seq(letters: &str) -> Sequence {
        Sequence::from_letters(letters, 1, None).unwrap()
    }

    fn mapped_ids(alignment: &Alignment) -> Vec<(isize, isize)> {
        alignment
            .table
            .mapped_pairs()
            .map(|m| (m.reference_id, m.query_id))
            .collect()
    }

    #[test]
    fn identical_sequences_map_one_to_one() {
        let s = seq("MKTAYIAKQR");
        let alignment = Aligner::default().align(&s, &s).unwrap();
        assert_eq!(alignment.gap_columns, 0);
        assert_eq!(alignment.identity(), 1.0);
        assert_eq!(alignment.table.coverage(), 1.0);
        assert!(mapped_ids(&alignment).iter().all(|(r, q)| r == q));
    }

    #[test]
    fn single_deletion_leaves_reference_residue_unmapped() {
        let alignment = Aligner::default().align(&seq("ABCDE"), &seq("ACDE")).unwrap();
        assert_eq!(mapped_ids(&alignment), vec![(1, 1), (3, 2), (4, 3), (5, 4)]);
        assert_eq!(alignment.table.query_position(1), None);
        assert_eq!(alignment.aligned_reference(), "ABCDE");
        assert_eq!(alignment.aligned_query(), "A-CDE");
        assert_eq!(alignment.gap_columns, 1);
    }

    #[test]
    fn equal_scoring_gaps_are_placed_last() {
        let alignment = Aligner::default().align(&seq("AAA"), &seq("AA")).unwrap();
        assert_eq!(mapped_ids(&alignment), vec![(1, 1), (2, 2)]);
        assert_eq!(alignment.aligned_query(), "AA-");
    }

    #[test]
    fn insertion_in_query_is_skipped() {
        let alignment = Aligner::default()
            .align(&seq("MKTWYIAK"), &seq("MKTWGGYIAK"))
            .unwrap();
        assert_eq!(alignment.table.mapped_count(), 8);
        assert_eq!(alignment.table.query_position(4), Some(6));
        assert!(alignment.aligned_reference().contains("--"));
    }

    #[test]
    fn table_is_always_monotonic() {
        let aligner = Aligner::default();
        let cases = [
            ("MDSSGPNQ", "MSSGPQ"),
            ("HHHHHHKKK", "KKKHHHHHH"),
            ("ACDEFGHIKLMNPQRSTVWY", "YWVTSRQPNMLKIHGFEDCA"),
            ("W", "AAAAWAAAA"),
        ];
        for (r, q) in cases {
            let alignment = aligner.align(&seq(r), &seq(q)).unwrap();
            assert!(alignment.table.is_monotonic(), "{r} vs {q}");
        }
    }

    #[test]
    fn alignment_is_idempotent() {
        let aligner = Aligner::default();
        let (r, q) = (seq("MDSSGPNQTLLVWAS"), seq("MSSGPNQSLVWAS"));
        let first = aligner.align(&r, &q).unwrap();
        let second = aligner.align(&r, &q).unwrap();
        assert_eq!(first.columns, second.columns);
        assert_eq!(first.table, second.table);
        assert_eq!(first.score, second.score);
    }

    #[test]
    fn native_ids_flow_through_the_table() {
        let r = Sequence::from_letters("ACDE", 30, None).unwrap();
        let q = Sequence::from_letters("ACDE", -1, None).unwrap();
        let alignment = Aligner::default().align(&r, &q).unwrap();
        assert_eq!(alignment.table.resolve_resid(32).unwrap().query_id, 1);
    }

    #[test]
    fn empty_sequences_fail_to_align() {
        let aligner = Aligner::default();
        assert!(matches!(
            aligner.align(&seq(""), &seq("AC")),
            Err(EngineError::Alignment {
                side: SequenceSide::Reference
            })
        ));
        assert!(matches!(
            aligner.align(&seq("AC"), &seq("")),
            Err(EngineError::Alignment {
                side: SequenceSide::Query
            })
        ));
    }

    #[test]
    fn identity_matrix_counts_matches() {
        let aligner = Aligner::new(ScoringScheme::with_matrix(SubstitutionMatrix::Identity));
        let alignment = aligner.align(&seq("ACDE"), &seq("ACWE")).unwrap();
        assert_eq!(alignment.aligned_pairs(), 4);
        assert_eq!(alignment.identity(), 0.75);
    }

    fn traced_cost(alignment: &Alignment, a: &[u8], b: &[u8], scoring: &ScoringScheme) -> i32 {
        let mut cost = 0;
        let mut previous: Option<u8> = None; // 1: reference gap, 2: query gap
        for column in &alignment.columns {
            let (kind, delta) = match *column {
                AlignedColumn::Pair { reference, query } => {
                    (None, scoring.score_pair(a[reference], b[query]))
                }
                AlignedColumn::ReferenceOnly(_) => (Some(1), 0),
                AlignedColumn::QueryOnly(_) => (Some(2), 0),
            };
            cost += match kind {
                None => delta,
                Some(k) if previous == Some(k) => scoring.gap_extend,
                Some(_) => scoring.gap_open,
            };
            previous = kind;
        }
        cost
    }

    #[test]
    fn reported_score_matches_the_traced_columns() {
        let schemes = [
            ScoringScheme::default(),
            ScoringScheme::with_matrix(SubstitutionMatrix::Identity),
            ScoringScheme::new(SubstitutionMatrix::Identity, -1, -1).unwrap(),
            ScoringScheme::new(SubstitutionMatrix::Blosum45, -4, -4).unwrap(),
        ];
        let pairs = [
            ("AGAA", "A"),
            ("MKWACDEGK", "MKACDEGK"),
            ("ACDEFGHIK", "AWWWCDEFK"),
            ("GG", "GGGGGGG"),
            ("MNSTLFSQVENHS", "MSTLFQVEHHS"),
        ];
        for scoring in schemes {
            let aligner = Aligner::new(scoring);
            for (r, q) in pairs {
                let alignment = aligner.align(&seq(r), &seq(q)).unwrap();
                assert_eq!(
                    alignment.score,
                    traced_cost(&alignment, r.as_bytes(), q.as_bytes(), &scoring),
                    "{r} vs {q} with {scoring:?}"
                );
            }
        }
    }
}
