//! Human- and machine-readable rendering of metric reports
//!
//! The text format is the classic three-line summary:
//!
//! ```text
//! Precision @ R: 0.5
//! MAP: 0.8333333333333333
//! NDCG @ 20: 0.9197207891481876
//! ```

use crate::error::{Error, Result};
use crate::metrics::{MetricReport, QueryScores, RunCorrelation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::io::Write;
use std::str::FromStr;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(Error::invalid_input(format!(
                "unknown output format '{other}', expected 'text' or 'json'"
            ))),
        }
    }
}

/// JSON shape of a metric report
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    metrics: BTreeMap<String, f64>,
    num_queries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    per_query: Option<&'a [QueryScores]>,
}

/// Renders [`MetricReport`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFormatter {
    format: OutputFormat,
    per_query: bool,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            per_query: false,
        }
    }

    /// Include per-query scores when the report carries them
    pub fn with_per_query(mut self, per_query: bool) -> Self {
        self.per_query = per_query;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn render(&self, report: &MetricReport) -> Result<String> {
        match self.format {
            OutputFormat::Text => {
                let mut out = String::new();
                self.write_text(report, &mut out)
                    .map_err(|e| Error::invalid_input(format!("Failed to render report: {e}")))?;
                Ok(out)
            }
            OutputFormat::Json => self.render_json(report),
        }
    }

    /// Renders `report` into `writer`
    pub fn write_to<W: Write>(&self, report: &MetricReport, mut writer: W) -> Result<()> {
        writer.write_all(self.render(report)?.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn write_text<W: fmt::Write>(&self, report: &MetricReport, out: &mut W) -> fmt::Result {
        for (metric, value) in report.iter() {
            writeln!(out, "{metric}: {}", format_value(value))?;
        }

        if let Some(scores) = self.breakdown(report) {
            let ndcg_label = report
                .iter()
                .last()
                .map(|(metric, _)| metric.to_string())
                .unwrap_or_else(|| "NDCG".to_string());
            writeln!(out)?;
            writeln!(out, "query\tPrecision @ R\tAP\t{ndcg_label}")?;
            for score in scores {
                let precision = score
                    .precision_at_r
                    .map(format_value)
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    out,
                    "{}\t{precision}\t{}\t{}",
                    score.query,
                    format_value(score.average_precision),
                    format_value(score.ndcg)
                )?;
            }
        }
        Ok(())
    }

    fn render_json(&self, report: &MetricReport) -> Result<String> {
        let json = JsonReport {
            metrics: report
                .iter()
                .map(|(metric, value)| (metric.key(), value))
                .collect(),
            num_queries: report.num_queries(),
            per_query: self.breakdown(report),
        };
        let mut out = serde_json::to_string_pretty(&json)
            .map_err(|e| Error::invalid_input(format!("Failed to serialize report: {e}")))?;
        out.push('\n');
        Ok(out)
    }

    fn breakdown<'r>(&self, report: &'r MetricReport) -> Option<&'r [QueryScores]> {
        if self.per_query {
            report.per_query()
        } else {
            None
        }
    }
}

/// One `<name> & <value>` row for a run compared against a baseline
pub fn render_correlation(name: &str, correlation: &RunCorrelation) -> String {
    match correlation.mean {
        Some(value) => format!("{name} & {}", format_value(value)),
        None => format!("{name} & n/a"),
    }
}

/// Shortest round-trip representation that always keeps a decimal point
fn format_value(value: f64) -> String {
    format!("{value:?}")
}
