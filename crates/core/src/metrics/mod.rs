//! Effectiveness metrics for a ranked run against relevance judgments
//!
//! Every metric is a pure function of a [`JudgmentSet`] and a [`RankedList`];
//! neither input is mutated. The per-query scorers live in submodules and
//! [`MetricsEngine`] aggregates them over the queries of the judgment set:
//!
//! - **Precision@R** averages over queries with at least one relevant
//!   document. Queries with none are left out of the divisor.
//! - **MAP** always divides by the number of judged queries, so queries that
//!   were never retrieved (or have nothing relevant) contribute 0.
//! - **NDCG@k** averages over every judged query.
//!
//! The two averaging rules differ on purpose and must stay that way to keep
//! scores comparable with historical results.

mod average_precision;
mod correlation;
mod ndcg;
mod precision;

pub use average_precision::average_precision;
pub use correlation::{correlate_runs, spearman, RunCorrelation};
pub use ndcg::ndcg_at_k;
pub use precision::precision_at_r;

use crate::error::{Error, Result};
use crate::judgments::{Grade, JudgmentSet, QueryJudgments};
use crate::run::RankedList;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Rank cutoff for NDCG when none is configured
pub const DEFAULT_NDCG_CUTOFF: usize = 20;

/// Largest grade exponential gain accepts; 2^64 keeps DCG sums finite
pub const MAX_EXPONENTIAL_GRADE: Grade = 64;

/// Decides which judged documents count as relevant for binary metrics
/// (Precision@R and MAP)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelevanceCriterion {
    /// Any judged document is relevant, whatever its grade
    #[default]
    Judged,
    /// Only documents graded at least this value are relevant
    MinGrade(Grade),
}

impl RelevanceCriterion {
    pub fn is_relevant(self, grade: Grade) -> bool {
        match self {
            Self::Judged => true,
            Self::MinGrade(threshold) => grade >= threshold,
        }
    }

    /// Number of relevant documents among a query's judgments
    pub fn relevant_count(self, judgments: &QueryJudgments) -> usize {
        match self {
            Self::Judged => judgments.len(),
            Self::MinGrade(_) => judgments
                .values()
                .filter(|&&grade| self.is_relevant(grade))
                .count(),
        }
    }

    /// Whether a retrieved document is a relevant hit
    pub fn is_hit(self, judgments: &QueryJudgments, doc: &str) -> bool {
        judgments
            .get(doc)
            .is_some_and(|&grade| self.is_relevant(grade))
    }
}

/// Gain assigned to a relevance grade in NDCG
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GainFunction {
    /// gain = grade
    #[default]
    Linear,
    /// gain = 2^grade - 1
    Exponential,
}

impl GainFunction {
    /// Gain for `grade`; grades at or below zero give no gain
    ///
    /// Exponential gain caps the grade at [`MAX_EXPONENTIAL_GRADE`].
    pub fn gain(self, grade: Grade) -> f64 {
        if grade <= 0 {
            return 0.0;
        }
        match self {
            Self::Linear => f64::from(grade),
            Self::Exponential => 2f64.powi(grade.min(MAX_EXPONENTIAL_GRADE)) - 1.0,
        }
    }
}

impl FromStr for GainFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "exponential" => Ok(Self::Exponential),
            other => Err(Error::invalid_input(format!(
                "unknown gain function '{other}', expected 'linear' or 'exponential'"
            ))),
        }
    }
}

/// Tunable knobs for a metrics computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsOptions {
    pub relevance: RelevanceCriterion,
    pub ndcg_cutoff: usize,
    pub gain: GainFunction,
    /// Score queries on the rayon thread pool
    pub parallel: bool,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            relevance: RelevanceCriterion::default(),
            ndcg_cutoff: DEFAULT_NDCG_CUTOFF,
            gain: GainFunction::default(),
            parallel: false,
        }
    }
}

/// A reported metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    PrecisionAtR,
    MeanAveragePrecision,
    Ndcg { cutoff: usize },
}

impl Metric {
    /// Short machine-friendly name, used as the JSON key
    pub fn key(&self) -> String {
        match self {
            Self::PrecisionAtR => "precision_at_r".to_string(),
            Self::MeanAveragePrecision => "map".to_string(),
            Self::Ndcg { cutoff } => format!("ndcg_at_{cutoff}"),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrecisionAtR => write!(f, "Precision @ R"),
            Self::MeanAveragePrecision => write!(f, "MAP"),
            Self::Ndcg { cutoff } => write!(f, "NDCG @ {cutoff}"),
        }
    }
}

/// Scores for a single judged query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryScores {
    pub query: String,
    /// `None` when the query has no relevant documents
    pub precision_at_r: Option<f64>,
    pub average_precision: f64,
    pub ndcg: f64,
}

/// Aggregate metric values from one evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReport {
    values: Vec<(Metric, f64)>,
    num_queries: usize,
    per_query: Option<Vec<QueryScores>>,
}

impl MetricReport {
    fn from_scores(scores: Vec<QueryScores>, ndcg_cutoff: usize, keep_breakdown: bool) -> Self {
        let precision = mean_of_counted(scores.iter().map(|s| s.precision_at_r));
        let map = mean_over(scores.iter().map(|s| s.average_precision), scores.len());
        let ndcg = mean_over(scores.iter().map(|s| s.ndcg), scores.len());

        Self {
            values: vec![
                (Metric::PrecisionAtR, precision),
                (Metric::MeanAveragePrecision, map),
                (Metric::Ndcg { cutoff: ndcg_cutoff }, ndcg),
            ],
            num_queries: scores.len(),
            per_query: keep_breakdown.then_some(scores),
        }
    }

    /// Value of `metric`, if it was computed
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, value)| *value)
    }

    /// Metrics in report order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.values.iter().copied()
    }

    /// Number of judged queries evaluated
    pub fn num_queries(&self) -> usize {
        self.num_queries
    }

    pub fn per_query(&self) -> Option<&[QueryScores]> {
        self.per_query.as_deref()
    }
}

/// Computes metrics for one run against one judgment set
#[derive(Debug, Clone, Copy)]
pub struct MetricsEngine<'a> {
    judgments: &'a JudgmentSet,
    run: &'a RankedList,
    options: MetricsOptions,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(judgments: &'a JudgmentSet, run: &'a RankedList) -> Self {
        Self::with_options(judgments, run, MetricsOptions::default())
    }

    pub fn with_options(
        judgments: &'a JudgmentSet,
        run: &'a RankedList,
        options: MetricsOptions,
    ) -> Self {
        Self {
            judgments,
            run,
            options,
        }
    }

    pub fn options(&self) -> &MetricsOptions {
        &self.options
    }

    /// Checks the judgments against the options
    ///
    /// Exponential gain rejects grades above [`MAX_EXPONENTIAL_GRADE`].
    pub fn validate(&self) -> Result<()> {
        if self.options.gain != GainFunction::Exponential {
            return Ok(());
        }
        match self.judgments.max_grade() {
            Some(grade) if grade > MAX_EXPONENTIAL_GRADE => Err(Error::invalid_input(format!(
                "grade {grade} is too large for exponential gain (at most {MAX_EXPONENTIAL_GRADE})"
            ))),
            _ => Ok(()),
        }
    }

    /// Mean Precision@R over queries with at least one relevant document
    pub fn precision_at_r(&self) -> f64 {
        let criterion = self.options.relevance;
        mean_of_counted(
            self.map_queries(|_, judged, retrieved| precision_at_r(judged, retrieved, criterion))
                .into_iter(),
        )
    }

    /// Mean Average Precision over every judged query
    pub fn mean_average_precision(&self) -> f64 {
        let criterion = self.options.relevance;
        let scores =
            self.map_queries(|_, judged, retrieved| average_precision(judged, retrieved, criterion));
        mean_over(scores.into_iter(), self.judgments.len())
    }

    /// Mean NDCG at the configured cutoff over every judged query
    pub fn ndcg(&self) -> f64 {
        let MetricsOptions {
            ndcg_cutoff, gain, ..
        } = self.options;
        let scores =
            self.map_queries(|_, judged, retrieved| ndcg_at_k(judged, retrieved, ndcg_cutoff, gain));
        mean_over(scores.into_iter(), self.judgments.len())
    }

    /// All metrics for each judged query, in query order
    pub fn per_query(&self) -> Vec<QueryScores> {
        let MetricsOptions {
            relevance,
            ndcg_cutoff,
            gain,
            ..
        } = self.options;

        self.map_queries(|query, judged, retrieved| QueryScores {
            query: query.to_string(),
            precision_at_r: precision_at_r(judged, retrieved, relevance),
            average_precision: average_precision(judged, retrieved, relevance),
            ndcg: ndcg_at_k(judged, retrieved, ndcg_cutoff, gain),
        })
    }

    /// Precision@R, MAP and NDCG@k in one pass
    pub fn evaluate(&self) -> MetricReport {
        MetricReport::from_scores(self.per_query(), self.options.ndcg_cutoff, false)
    }

    /// Like [`evaluate`](Self::evaluate) but keeps the per-query scores
    pub fn evaluate_with_breakdown(&self) -> MetricReport {
        MetricReport::from_scores(self.per_query(), self.options.ndcg_cutoff, true)
    }

    fn retrieved(&self, query: &str) -> &'a [String] {
        self.run.get(query).unwrap_or(&[])
    }

    /// Applies a per-query scorer to every judged query
    ///
    /// Results come back in query order whether or not the work ran in
    /// parallel, so the final sums are deterministic.
    fn map_queries<T, F>(&self, scorer: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&str, &QueryJudgments, &[String]) -> T + Sync,
    {
        let queries: Vec<(&str, &QueryJudgments)> = self.judgments.iter().collect();
        let score = |&(query, judged): &(&str, &QueryJudgments)| {
            scorer(query, judged, self.retrieved(query))
        };

        if self.options.parallel {
            queries.par_iter().map(score).collect()
        } else {
            queries.iter().map(score).collect()
        }
    }
}

/// Mean of the `Some` values; 0.0 when there are none
fn mean_of_counted(values: impl Iterator<Item = Option<f64>>) -> f64 {
    let (sum, count) = values
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Sum of `values` divided by a fixed divisor; 0.0 when the divisor is 0
fn mean_over(values: impl Iterator<Item = f64>, divisor: usize) -> f64 {
    if divisor == 0 {
        return 0.0;
    }
    values.sum::<f64>() / divisor as f64
}
