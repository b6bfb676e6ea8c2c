//! Ranked retrieval runs
//!
//! A run file holds one line per retrieved document in TREC format:
//!
//! ```text
//! <query-id> <ignored> <doc-id> <rank> <score> <tag>
//! ```
//!
//! Only the query and document columns are read. The order of lines is the
//! ranking; rank and score columns are never parsed or used to re-sort, so an
//! unsorted run file is evaluated exactly as written.

use crate::error::Result;
use crate::records::{self, Record};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::debug;

const MIN_RUN_FIELDS: usize = 3;
const MAX_RUN_FIELDS: usize = 6;

/// Mapping from query id to its retrieved documents in rank order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedList {
    queries: BTreeMap<String, Vec<String>>,
}

impl RankedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a run file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let reader = records::open(path)?;
        let run = Self::from_reader(reader, &path.display().to_string())?;
        debug!(
            "Loaded {} retrieved documents for {} queries from {}",
            run.document_count(),
            run.len(),
            path.display()
        );
        Ok(run)
    }

    /// Parses a run from any buffered reader
    ///
    /// `source` names the input in parse errors.
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> Result<Self> {
        let mut run = Self::new();
        records::for_each_record(reader, source, |record| {
            let (query, doc) = parse_run_line(&record, source)?;
            run.push(query, doc);
            Ok(())
        })?;
        Ok(run)
    }

    /// Appends `doc` to the end of `query`'s ranking
    ///
    /// Duplicates are kept.
    pub fn push(&mut self, query: impl Into<String>, doc: impl Into<String>) {
        self.queries
            .entry(query.into())
            .or_default()
            .push(doc.into());
    }

    /// Retrieved documents for `query`, best first
    pub fn get(&self, query: &str) -> Option<&[String]> {
        self.queries.get(query).map(Vec::as_slice)
    }

    /// Number of queries
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Total number of retrieved entries across all queries
    pub fn document_count(&self) -> usize {
        self.queries.values().map(Vec::len).sum()
    }

    /// Iterates queries in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.queries
            .iter()
            .map(|(q, docs)| (q.as_str(), docs.as_slice()))
    }

    /// Writes the run in TREC format
    ///
    /// Rank is the 1-based position and the score decreases with rank, so the
    /// output sorts the same way under tools that do re-sort by score.
    pub fn write_to<W: Write>(&self, mut writer: W, tag: &str) -> Result<()> {
        for (query, docs) in &self.queries {
            let total = docs.len();
            for (index, doc) in docs.iter().enumerate() {
                let rank = index + 1;
                let score = (total - index) as f64;
                writeln!(writer, "{query} Q0 {doc} {rank} {score} {tag}")?;
            }
        }
        Ok(())
    }
}

impl<Q, D> FromIterator<(Q, D)> for RankedList
where
    Q: Into<String>,
    D: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (Q, D)>>(iter: I) -> Self {
        let mut run = Self::new();
        for (query, doc) in iter {
            run.push(query, doc);
        }
        run
    }
}

fn parse_run_line(record: &Record<'_>, source: &str) -> Result<(String, String)> {
    let count = record.fields.len();
    if !(MIN_RUN_FIELDS..=MAX_RUN_FIELDS).contains(&count) {
        return Err(record.error(
            source,
            format!("expected {MIN_RUN_FIELDS} to {MAX_RUN_FIELDS} fields, found {count}"),
        ));
    }

    Ok((record.fields[0].to_string(), record.fields[2].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Cursor;

    fn parse(input: &str) -> Result<RankedList> {
        RankedList::from_reader(Cursor::new(input), "run")
    }

    #[test]
    fn test_line_order_is_rank_order() {
        // Scores are deliberately out of order; they must not be used
        let run = parse(
            "q1 Q0 d3 1 0.1 bm25\n\
             q1 Q0 d1 2 0.9 bm25\n\
             q2 Q0 d7 1 1.0 bm25\n\
             q1 Q0 d2 3 0.5 bm25\n",
        )
        .expect("valid run");

        assert_eq!(run.len(), 2);
        assert_eq!(
            run.get("q1"),
            Some(&["d3".to_string(), "d1".to_string(), "d2".to_string()][..])
        );
        assert_eq!(run.get("q2"), Some(&["d7".to_string()][..]));
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let run = parse("q1 Q0 d1 1 2.0 t\nq1 Q0 d1 2 1.0 t\n").expect("valid run");
        assert_eq!(run.get("q1").map(<[String]>::len), Some(2));
        assert_eq!(run.document_count(), 2);
    }

    #[test]
    fn test_rank_and_score_columns_are_not_parsed() {
        let run = parse("q1 Q0 d1 first high tag\nq1 Q0 d2\n").expect("valid run");
        assert_eq!(run.document_count(), 2);
    }

    #[test]
    fn test_malformed_lines() {
        match parse("q1 Q0 d1 1 1.0 t\nq1 Q0\n") {
            Err(Error::Parse { line, content, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "q1 Q0");
            }
            other => panic!("expected parse error, got {other:?}"),
        }

        assert!(parse("q1 Q0 d1 1 1.0 t extra\n").is_err());
    }

    #[test]
    fn test_write_to_trec_format() {
        let run: RankedList = [("q1", "d2"), ("q1", "d1")].into_iter().collect();
        let mut out = Vec::new();
        run.write_to(&mut out, "sys").expect("write");

        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "q1 Q0 d2 1 2 sys\nq1 Q0 d1 2 1 sys\n"
        );
    }
}
