//! Normalized Discounted Cumulative Gain
//!
//! ```text
//! DCG@k  = Σ gain(rel_i) / log₂(i + 1)   for i in 1..=k
//! IDCG@k = DCG@k of the judged grades sorted descending
//! NDCG@k = DCG@k / IDCG@k
//! ```

use super::GainFunction;
use crate::judgments::{Grade, QueryJudgments};

/// Computes NDCG@k for a single query.
///
/// Unjudged documents have grade 0. Returns 0.0 when the ideal ranking has
/// no gain (no positively graded documents).
pub fn ndcg_at_k(
    judgments: &QueryJudgments,
    retrieved: &[String],
    k: usize,
    gain: GainFunction,
) -> f64 {
    let actual = dcg(
        retrieved
            .iter()
            .map(|doc| judgments.get(doc).copied().unwrap_or(0)),
        k,
        gain,
    );

    let mut ideal: Vec<Grade> = judgments.values().copied().collect();
    ideal.sort_unstable_by(|a, b| b.cmp(a));
    let idcg = dcg(ideal.into_iter(), k, gain);

    if idcg <= 0.0 {
        0.0
    } else {
        actual / idcg
    }
}

fn dcg(grades: impl Iterator<Item = Grade>, k: usize, gain: GainFunction) -> f64 {
    grades
        .take(k)
        .enumerate()
        .map(|(i, grade)| gain.gain(grade) / discount(i + 1))
        .sum()
}

/// Logarithmic discount for a 1-based rank
#[inline]
fn discount(rank: usize) -> f64 {
    (rank as f64 + 1.0).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qrels(pairs: &[(&str, i32)]) -> QueryJudgments {
        pairs.iter().map(|(d, g)| (d.to_string(), *g)).collect()
    }

    fn docs(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|d| d.to_string()).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_ideal_ordering_scores_one() {
        let judged = qrels(&[("a", 3), ("b", 2), ("c", 1), ("d", 0)]);
        let run = docs(&["a", "b", "c", "d"]);
        assert_close(ndcg_at_k(&judged, &run, 20, GainFunction::Linear), 1.0);
        assert_close(ndcg_at_k(&judged, &run, 20, GainFunction::Exponential), 1.0);
    }

    #[test]
    fn test_tied_grades_in_any_order_score_one() {
        let judged = qrels(&[("a", 1), ("b", 1), ("c", 1)]);
        let run = docs(&["c", "a", "b"]);
        assert_close(ndcg_at_k(&judged, &run, 20, GainFunction::Linear), 1.0);
    }

    #[test]
    fn test_swapped_pair_linear_gain() {
        let judged = qrels(&[("a", 2), ("b", 1)]);
        let run = docs(&["b", "a"]);
        let dcg = 1.0 + 2.0 / 3f64.log2();
        let idcg = 2.0 + 1.0 / 3f64.log2();
        assert_close(ndcg_at_k(&judged, &run, 20, GainFunction::Linear), dcg / idcg);
    }

    #[test]
    fn test_swapped_pair_exponential_gain() {
        let judged = qrels(&[("a", 2), ("b", 1)]);
        let run = docs(&["b", "a"]);
        let dcg = 1.0 + 3.0 / 3f64.log2();
        let idcg = 3.0 + 1.0 / 3f64.log2();
        assert_close(
            ndcg_at_k(&judged, &run, 20, GainFunction::Exponential),
            dcg / idcg,
        );
    }

    #[test]
    fn test_only_top_k_ranks_count() {
        let judged = qrels(&[("a", 1)]);
        let mut run: Vec<String> = (0..20).map(|i| format!("x{i}")).collect();
        run.push("a".to_string());
        assert_eq!(ndcg_at_k(&judged, &run, 20, GainFunction::Linear), 0.0);

        let run = docs(&["x", "a"]);
        assert_close(
            ndcg_at_k(&judged, &run, 2, GainFunction::Linear),
            1.0 / 3f64.log2(),
        );
    }

    #[test]
    fn test_ideal_ranking_is_truncated_to_k() {
        let judged = qrels(&[("a", 1), ("b", 1), ("c", 1)]);
        // Two of three relevant documents fill the two-rank window perfectly
        assert_close(
            ndcg_at_k(&judged, &docs(&["a", "b"]), 2, GainFunction::Linear),
            1.0,
        );
    }

    #[test]
    fn test_no_positive_grades_scores_zero() {
        let judged = qrels(&[("a", 0), ("b", -2)]);
        assert_eq!(
            ndcg_at_k(&judged, &docs(&["a", "b"]), 20, GainFunction::Linear),
            0.0
        );
        assert_eq!(
            ndcg_at_k(&QueryJudgments::new(), &docs(&["a"]), 20, GainFunction::Linear),
            0.0
        );
    }

    #[test]
    fn test_negative_grades_do_not_go_below_zero() {
        let judged = qrels(&[("a", -3), ("b", 1)]);
        let score = ndcg_at_k(&judged, &docs(&["a", "b"]), 20, GainFunction::Linear);
        assert_close(score, 1.0 / 3f64.log2());
    }
}
