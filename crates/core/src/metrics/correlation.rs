//! Spearman rank correlation between rankings

use crate::error::{Error, Result};
use crate::run::RankedList;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Computes Spearman's rank correlation coefficient.
///
/// ```text
/// ρ = 1 - 6·Σd² / (n·(n² - 1))
/// ```
///
/// where `d` is the per-position difference between the two rank sequences.
/// Both sequences must have the same length and at least two elements.
pub fn spearman(ranks_a: &[i64], ranks_b: &[i64]) -> Result<f64> {
    if ranks_a.len() != ranks_b.len() {
        return Err(Error::invalid_input(format!(
            "rank sequences differ in length ({} vs {})",
            ranks_a.len(),
            ranks_b.len()
        )));
    }
    if ranks_a.len() < 2 {
        return Err(Error::invalid_input(format!(
            "rank correlation needs at least 2 elements, got {}",
            ranks_a.len()
        )));
    }

    let sum_squared: f64 = ranks_a
        .iter()
        .zip(ranks_b)
        .map(|(&a, &b)| {
            let d = a as f64 - b as f64;
            d * d
        })
        .sum();

    let n = ranks_a.len() as f64;
    Ok(1.0 - 6.0 * sum_squared / (n * (n * n - 1.0)))
}

/// Outcome of correlating one run against a baseline run
#[derive(Debug, Clone, PartialEq)]
pub struct RunCorrelation {
    /// Mean per-query coefficient, `None` if no query could be compared
    pub mean: Option<f64>,
    /// Queries that contributed a coefficient
    pub queries_compared: usize,
    /// Baseline queries skipped (fewer than two shared documents or non-finite result)
    pub queries_skipped: usize,
}

/// Correlates the per-query rankings of `other` against `baseline`.
///
/// Only documents retrieved by both runs are compared. They are ranked
/// 1..=n by first occurrence within each run, so the coefficient stays in
/// [-1, 1]. Queries sharing fewer than two documents are skipped.
pub fn correlate_runs(baseline: &RankedList, other: &RankedList) -> RunCorrelation {
    let mut coefficients = Vec::new();
    let mut skipped = 0;

    for (query, baseline_docs) in baseline.iter() {
        let other_docs = other.get(query).unwrap_or(&[]);
        let (ranks_a, ranks_b) = shared_ranks(baseline_docs, other_docs);

        match spearman(&ranks_a, &ranks_b) {
            Ok(rho) if rho.is_finite() => coefficients.push(rho),
            Ok(rho) => {
                debug!("Skipping query {query}: non-finite correlation {rho}");
                skipped += 1;
            }
            Err(e) => {
                debug!("Skipping query {query}: {e}");
                skipped += 1;
            }
        }
    }

    let mean = if coefficients.is_empty() {
        None
    } else {
        Some(coefficients.iter().sum::<f64>() / coefficients.len() as f64)
    };

    RunCorrelation {
        mean,
        queries_compared: coefficients.len(),
        queries_skipped: skipped,
    }
}

/// Paired ranks of the documents both lists retrieved, in baseline order
fn shared_ranks(baseline: &[String], other: &[String]) -> (Vec<i64>, Vec<i64>) {
    let other_positions: HashMap<&str, usize> = first_occurrences(other)
        .into_iter()
        .enumerate()
        .map(|(position, doc)| (doc, position))
        .collect();

    let shared: Vec<usize> = first_occurrences(baseline)
        .into_iter()
        .filter_map(|doc| other_positions.get(doc).copied())
        .collect();

    // Rank of each shared document within the other list
    let mut by_other: Vec<usize> = (0..shared.len()).collect();
    by_other.sort_unstable_by_key(|&i| shared[i]);
    let mut other_ranks = vec![0i64; shared.len()];
    for (rank, &i) in by_other.iter().enumerate() {
        other_ranks[i] = rank as i64 + 1;
    }

    let baseline_ranks = (1..=shared.len() as i64).collect();
    (baseline_ranks, other_ranks)
}

/// Documents in order of first occurrence
fn first_occurrences(docs: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    docs.iter()
        .map(String::as_str)
        .filter(|doc| seen.insert(*doc))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_identical_rankings() {
        let ranks = [1, 2, 3, 4, 5];
        assert_close(spearman(&ranks, &ranks).expect("valid input"), 1.0);
        assert_close(spearman(&[1, 2], &[1, 2]).expect("valid input"), 1.0);
    }

    #[test]
    fn test_reversed_rankings() {
        let rho = spearman(&[1, 2, 3, 4, 5], &[5, 4, 3, 2, 1]).expect("valid input");
        assert_close(rho, -1.0);
    }

    #[test]
    fn test_textbook_formula() {
        // Σd² = 0 + 1 + 1 + 0 = 2, n = 4: 1 - 12 / 60
        let rho = spearman(&[1, 2, 3, 4], &[1, 3, 2, 4]).expect("valid input");
        assert_close(rho, 0.8);
    }

    #[test]
    fn test_mismatched_lengths() {
        let err = spearman(&[1, 2, 3], &[1, 2]).expect_err("length mismatch");
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_too_few_elements() {
        assert!(matches!(spearman(&[1], &[1]), Err(Error::InvalidInput(_))));
        assert!(matches!(spearman(&[], &[]), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_correlate_identical_runs() {
        let run: RankedList = [("q1", "a"), ("q1", "b"), ("q1", "c"), ("q2", "x"), ("q2", "y")]
            .into_iter()
            .collect();
        let result = correlate_runs(&run, &run);
        assert_eq!(result.queries_compared, 2);
        assert_eq!(result.queries_skipped, 0);
        assert_close(result.mean.expect("coefficient"), 1.0);
    }

    #[test]
    fn test_correlate_skips_single_document_queries() {
        let baseline: RankedList = [("q1", "a"), ("q2", "x"), ("q2", "y")].into_iter().collect();
        let other: RankedList = [("q2", "y"), ("q2", "x")].into_iter().collect();
        let result = correlate_runs(&baseline, &other);
        assert_eq!(result.queries_compared, 1);
        assert_eq!(result.queries_skipped, 1);
        assert_close(result.mean.expect("coefficient"), -1.0);
    }

    #[test]
    fn test_only_shared_documents_are_compared() {
        let baseline: RankedList = [("q1", "a"), ("q1", "b"), ("q1", "c")].into_iter().collect();
        let other: RankedList = [("q1", "x"), ("q1", "b"), ("q1", "a")].into_iter().collect();
        // Shared: a, b; baseline ranks (1, 2), other ranks (2, 1)
        let result = correlate_runs(&baseline, &other);
        assert_close(result.mean.expect("coefficient"), -1.0);
    }

    #[test]
    fn test_disjoint_runs_are_not_compared() {
        let baseline: RankedList = [("q1", "a"), ("q1", "b"), ("q1", "c")].into_iter().collect();
        let other: RankedList = [("q1", "x"), ("q1", "y"), ("q1", "z")].into_iter().collect();
        let result = correlate_runs(&baseline, &other);
        assert_eq!(result.mean, None);
        assert_eq!(result.queries_compared, 0);
        assert_eq!(result.queries_skipped, 1);
    }

    #[test]
    fn test_duplicates_use_first_occurrence() {
        let baseline: RankedList = [("q1", "a"), ("q1", "a"), ("q1", "b"), ("q1", "c")]
            .into_iter()
            .collect();
        let other: RankedList = [("q1", "c"), ("q1", "b"), ("q1", "c"), ("q1", "a")]
            .into_iter()
            .collect();
        let result = correlate_runs(&baseline, &other);
        assert_close(result.mean.expect("coefficient"), -1.0);
    }

    #[test]
    fn test_coefficient_stays_in_range_with_partial_overlap() {
        let baseline: RankedList = [("q1", "a"), ("q1", "b"), ("q1", "c"), ("q1", "d")]
            .into_iter()
            .collect();
        let other: RankedList = [("q1", "d"), ("q1", "n"), ("q1", "a"), ("q1", "m"), ("q1", "b")]
            .into_iter()
            .collect();
        // Shared a, b, d: baseline ranks (1, 2, 3), other ranks (2, 3, 1)
        let rho = correlate_runs(&baseline, &other).mean.expect("coefficient");
        assert_close(rho, -0.5);
        assert!((-1.0..=1.0).contains(&rho));
    }

    #[test]
    fn test_nothing_to_compare() {
        let baseline: RankedList = [("q1", "a")].into_iter().collect();
        let result = correlate_runs(&baseline, &RankedList::new());
        assert_eq!(result.mean, None);
        assert_eq!(result.queries_compared, 0);
    }
}
