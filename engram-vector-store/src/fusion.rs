use std::collections::HashMap;

/// RRF constant; higher flattens the emphasis on top ranks.
const RRF_K: f32 = 60.0;

/// Reciprocal Rank Fusion over two ranked lists of record indices.
///
/// `RRF(d) = sum(1 / (k + rank(d)))` across the lists a record appears in;
/// records found by both channels are boosted above single-channel hits of
/// similar rank.
pub fn reciprocal_rank_fusion(vector_ranked: &[usize], lexical_ranked: &[usize]) -> Vec<usize> {
    let mut scores: HashMap<usize, f32> = HashMap::new();

    for (rank, idx) in vector_ranked.iter().enumerate() {
        *scores.entry(*idx).or_insert(0.0) += 1.0 / (RRF_K + rank as f32 + 1.0);
    }

    for (rank, idx) in lexical_ranked.iter().enumerate() {
        *scores.entry(*idx).or_insert(0.0) += 1.0 / (RRF_K + rank as f32 + 1.0);
    }

    let mut fused: Vec<(usize, f32)> = scores.into_iter().collect();
    fused.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    fused.into_iter().map(|(idx, _)| idx).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_in_both_lists_wins() {
        // Index 7 is mid-rank in both channels; 1 and 2 lead one channel each.
        let vector = vec![1, 7, 3];
        let lexical = vec![2, 7, 4];
        let fused = reciprocal_rank_fusion(&vector, &lexical);
        assert_eq!(fused[0], 7);
    }

    #[test]
    fn test_single_channel_preserves_order() {
        let vector = vec![5, 3, 9];
        let fused = reciprocal_rank_fusion(&vector, &[]);
        assert_eq!(fused, vec![5, 3, 9]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(reciprocal_rank_fusion(&[], &[]).is_empty());
    }

    #[test]
    fn test_deterministic_tiebreak() {
        // Same ranks in disjoint lists: ties break on index for stability.
        let fused_a = reciprocal_rank_fusion(&[1], &[2]);
        let fused_b = reciprocal_rank_fusion(&[1], &[2]);
        assert_eq!(fused_a, fused_b);
        assert_eq!(fused_a, vec![1, 2]);
    }
}
