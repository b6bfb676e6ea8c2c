//! `evaluate` and `correlate` subcommands

use anyhow::{Context, Result};
use releval_core::config::Config;
use releval_core::metrics::{correlate_runs, MetricsEngine, RelevanceCriterion};
use releval_core::report::{render_correlation, ReportFormatter};
use releval_core::{JudgmentSet, RankedList};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Inputs and command-line overrides for `evaluate`
#[derive(Debug, Clone, Default)]
pub struct EvaluateArgs {
    pub judgments: PathBuf,
    pub run: PathBuf,
    pub format: Option<String>,
    pub per_query: bool,
    pub ndcg_cutoff: Option<usize>,
    pub min_relevance: Option<i32>,
    pub gain: Option<String>,
    pub parallel: bool,
}

impl EvaluateArgs {
    /// Folds command-line overrides into the loaded configuration
    fn apply_overrides(&self, mut config: Config) -> Result<Config> {
        if let Some(format) = &self.format {
            config.output.format = format.clone();
        }
        if self.per_query {
            config.output.per_query = true;
        }
        if let Some(cutoff) = self.ndcg_cutoff {
            config.metrics.ndcg_cutoff = cutoff;
        }
        if let Some(grade) = self.min_relevance {
            config.metrics.min_relevance = Some(grade);
        }
        if let Some(gain) = &self.gain {
            config.metrics.gain = gain.clone();
        }
        if self.parallel {
            config.metrics.parallel = true;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Evaluates a run against judgments and writes the report to `out`
///
/// Nothing is written unless both files load and the report renders.
pub fn evaluate<W: Write>(args: &EvaluateArgs, config: Config, out: W) -> Result<()> {
    let config = args.apply_overrides(config)?;
    let options = config.metrics.to_options()?;
    let formatter = ReportFormatter::new(config.output.output_format()?)
        .with_per_query(config.output.per_query);

    let judgments = load_judgments(&args.judgments)?;
    let run = load_run(&args.run)?;

    let unjudged = run
        .iter()
        .filter(|(query, _)| judgments.get(query).is_none())
        .count();
    if unjudged > 0 {
        warn!("{unjudged} run queries have no judgments and are not evaluated");
    }
    if let RelevanceCriterion::MinGrade(grade) = options.relevance {
        debug!("Counting documents graded >= {grade} as relevant");
    }

    let engine = MetricsEngine::with_options(&judgments, &run, options);
    engine.validate()?;
    let report = if config.output.per_query {
        engine.evaluate_with_breakdown()
    } else {
        engine.evaluate()
    };
    info!("Evaluated {} queries", report.num_queries());

    formatter
        .write_to(&report, out)
        .context("Failed to write report")?;
    Ok(())
}

/// Correlates each run against the baseline, one `<name> & <value>` line per run
pub fn correlate<W: Write>(baseline: &Path, runs: &[PathBuf], mut out: W) -> Result<()> {
    let baseline_run = load_run(baseline)?;

    let mut lines = Vec::with_capacity(runs.len());
    for path in runs {
        let run = load_run(path)?;
        let correlation = correlate_runs(&baseline_run, &run);
        debug!(
            "{}: {} queries compared, {} skipped",
            path.display(),
            correlation.queries_compared,
            correlation.queries_skipped
        );
        lines.push(render_correlation(&run_name(path), &correlation));
    }

    for line in lines {
        writeln!(out, "{line}").context("Failed to write correlation")?;
    }
    Ok(())
}

fn load_judgments(path: &Path) -> Result<JudgmentSet> {
    JudgmentSet::load(path)
        .with_context(|| format!("Failed to load judgments from {}", path.display()))
}

fn load_run(path: &Path) -> Result<RankedList> {
    RankedList::load(path).with_context(|| format!("Failed to load run from {}", path.display()))
}

/// File name without extension, used to label a run
fn run_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
