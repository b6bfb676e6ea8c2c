//! R-Precision

use super::RelevanceCriterion;
use crate::judgments::QueryJudgments;

/// Computes Precision@R for a single query.
///
/// `R` is the number of relevant judged documents. The score is the fraction
/// of the first `R` retrieved documents that are relevant.
///
/// Returns `None` when the query has no relevant documents, since such a query
/// is left out of the average entirely.
pub fn precision_at_r(
    judgments: &QueryJudgments,
    retrieved: &[String],
    criterion: RelevanceCriterion,
) -> Option<f64> {
    let r = criterion.relevant_count(judgments);
    if r == 0 {
        return None;
    }

    let hits = retrieved
        .iter()
        .take(r)
        .filter(|doc| criterion.is_hit(judgments, doc))
        .count();

    Some(hits as f64 / r as f64)
}
