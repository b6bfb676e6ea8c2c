//! Average Precision

use super::RelevanceCriterion;
use crate::judgments::QueryJudgments;

/// Computes Average Precision for a single query.
///
/// Walks the whole ranking and sums precision at every rank holding a
/// relevant document, then divides by the number of relevant judged
/// documents (not by the number retrieved). Relevant documents that were
/// never retrieved therefore pull the score down.
///
/// Returns 0.0 when the query has no relevant documents.
pub fn average_precision(
    judgments: &QueryJudgments,
    retrieved: &[String],
    criterion: RelevanceCriterion,
) -> f64 {
    let relevant = criterion.relevant_count(judgments);
    if relevant == 0 {
        return 0.0;
    }

    let mut hits = 0usize;
    let mut precision_sum = 0.0;
    for (index, doc) in retrieved.iter().enumerate() {
        if criterion.is_hit(judgments, doc) {
            hits += 1;
            precision_sum += hits as f64 / (index + 1) as f64;
        }
    }

    precision_sum / relevant as f64
}
