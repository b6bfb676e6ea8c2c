//! Ground-truth relevance judgments (qrels)
//!
//! A judgment file holds one line per judged document:
//!
//! ```text
//! <query-id> <ignored> <doc-id> <relevance>
//! ```
//!
//! Relevance is a signed integer grade. Zero or negative grades mean "judged
//! but not relevant"; positive grades are graded relevance.

use crate::error::Result;
use crate::records::{self, Record};
use std::collections::{BTreeMap, HashMap};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::debug;

/// Relevance grade of a judged document
pub type Grade = i32;

/// Judgments for a single query, keyed by document id
pub type QueryJudgments = HashMap<String, Grade>;

const JUDGMENT_FIELDS: usize = 4;

/// Mapping from query id to the graded documents judged for it
///
/// Each (query, document) pair holds at most one grade; a later line for the
/// same pair overwrites the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JudgmentSet {
    queries: BTreeMap<String, QueryJudgments>,
}

impl JudgmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a judgment file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let reader = records::open(path)?;
        let judgments = Self::from_reader(reader, &path.display().to_string())?;
        debug!(
            "Loaded {} judgments for {} queries from {}",
            judgments.judgment_count(),
            judgments.len(),
            path.display()
        );
        Ok(judgments)
    }

    /// Parses judgments from any buffered reader
    ///
    /// `source` names the input in parse errors.
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> Result<Self> {
        let mut judgments = Self::new();
        records::for_each_record(reader, source, |record| {
            let (query, doc, grade) = parse_judgment(&record, source)?;
            judgments.insert(query, doc, grade);
            Ok(())
        })?;
        Ok(judgments)
    }

    /// Records a grade, replacing any earlier grade for the same pair
    pub fn insert(&mut self, query: impl Into<String>, doc: impl Into<String>, grade: Grade) {
        self.queries
            .entry(query.into())
            .or_default()
            .insert(doc.into(), grade);
    }

    /// Registers a query with no judged documents
    pub fn insert_query(&mut self, query: impl Into<String>) {
        self.queries.entry(query.into()).or_default();
    }

    pub fn get(&self, query: &str) -> Option<&QueryJudgments> {
        self.queries.get(query)
    }

    /// Grade of `doc` for `query`, if judged
    pub fn grade(&self, query: &str, doc: &str) -> Option<Grade> {
        self.queries.get(query)?.get(doc).copied()
    }

    /// Number of queries
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Total number of (query, document) judgments
    pub fn judgment_count(&self) -> usize {
        self.queries.values().map(HashMap::len).sum()
    }

    /// Highest grade across all judgments
    pub fn max_grade(&self) -> Option<Grade> {
        self.queries
            .values()
            .flat_map(HashMap::values)
            .copied()
            .max()
    }

    /// Iterates queries in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryJudgments)> {
        self.queries.iter().map(|(q, docs)| (q.as_str(), docs))
    }

    /// Writes the judgments back out in qrels line format
    ///
    /// Documents within a query are written in sorted order and the ignored
    /// column is written as `0`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for (query, docs) in &self.queries {
            let mut docs: Vec<_> = docs.iter().collect();
            docs.sort();
            for (doc, grade) in docs {
                writeln!(writer, "{query} 0 {doc} {grade}")?;
            }
        }
        Ok(())
    }
}

impl<Q, D> FromIterator<(Q, D, Grade)> for JudgmentSet
where
    Q: Into<String>,
    D: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (Q, D, Grade)>>(iter: I) -> Self {
        let mut judgments = Self::new();
        for (query, doc, grade) in iter {
            judgments.insert(query, doc, grade);
        }
        judgments
    }
}

fn parse_judgment(record: &Record<'_>, source: &str) -> Result<(String, String, Grade)> {
    if record.fields.len() != JUDGMENT_FIELDS {
        return Err(record.error(
            source,
            format!(
                "expected {JUDGMENT_FIELDS} fields, found {}",
                record.fields.len()
            ),
        ));
    }

    let grade = record.fields[3].parse::<Grade>().map_err(|e| {
        record.error(
            source,
            format!("relevance {:?} is not an integer: {e}", record.fields[3]),
        )
    })?;

    Ok((
        record.fields[0].to_string(),
        record.fields[2].to_string(),
        grade,
    ))
}
