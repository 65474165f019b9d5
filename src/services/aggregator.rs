use std::collections::HashMap;

use crate::models::reaction::{Reaction, ReactionSummary};

/// Counts reactions per type in one pass and picks out the viewer's own.
pub fn summarize(reactions: &[Reaction], viewer_id: Option<i64>) -> ReactionSummary {
    let mut summary = ReactionSummary::default();

    for reaction in reactions {
        *summary.counts.entry(reaction.ty).or_insert(0) += 1;

        if viewer_id == Some(reaction.user_id) {
            summary.your_reaction = Some(reaction.ty);
        }
    }

    summary
}

/// Applies [`summarize`] to every comment of a batched load.
pub fn summarize_all(
    by_comment: &HashMap<i64, Vec<Reaction>>,
    viewer_id: Option<i64>,
) -> HashMap<i64, ReactionSummary> {
    by_comment
        .iter()
        .map(|(&comment_id, reactions)| (comment_id, summarize(reactions, viewer_id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::reaction::ReactionType;

    fn reaction(user_id: i64, ty: ReactionType) -> Reaction {
        Reaction {
            user_id,
            comment_id: 1,
            ty,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn empty_list_has_no_counts() {
        let summary = summarize(&[], Some(1));
        assert!(summary.counts.is_empty());
        assert_eq!(summary.your_reaction, None);
    }

    #[test]
    fn counts_per_type_and_finds_viewer() {
        let reactions = vec![
            reaction(1, ReactionType::Like),
            reaction(2, ReactionType::Like),
            reaction(3, ReactionType::Angry),
        ];

        let summary = summarize(&reactions, Some(3));
        assert_eq!(summary.counts[&ReactionType::Like], 2);
        assert_eq!(summary.counts[&ReactionType::Angry], 1);
        assert!(!summary.counts.contains_key(&ReactionType::Sad));
        assert_eq!(summary.your_reaction, Some(ReactionType::Angry));

        assert_eq!(summarize(&reactions, None).your_reaction, None);
        assert_eq!(summarize(&reactions, Some(99)).your_reaction, None);
    }

    #[test]
    fn counts_always_sum_to_row_count() {
        // Walk a deterministic spread of type mixes and list lengths.
        let types = ReactionType::ALL;
        for len in 0..40usize {
            for seed in 0..types.len() {
                let reactions: Vec<Reaction> = (0..len)
                    .map(|i| reaction(i as i64, types[(i * 7 + seed) % types.len()]))
                    .collect();

                for viewer in [None, Some(0), Some(len as i64 / 2), Some(1_000)] {
                    let summary = summarize(&reactions, viewer);
                    assert_eq!(summary.total(), len as u64);

                    for ty in types {
                        let expected = reactions.iter().filter(|r| r.ty == ty).count() as u64;
                        assert_eq!(summary.counts.get(&ty).copied().unwrap_or(0), expected);
                    }

                    let expected_own = viewer
                        .and_then(|v| reactions.iter().find(|r| r.user_id == v))
                        .map(|r| r.ty);
                    assert_eq!(summary.your_reaction, expected_own);
                }
            }
        }
    }

    #[test]
    fn summarize_all_keeps_comments_apart() {
        let mut by_comment = HashMap::new();
        by_comment.insert(1, vec![reaction(1, ReactionType::Like)]);
        by_comment.insert(
            2,
            vec![reaction(1, ReactionType::Sad), reaction(2, ReactionType::Sad)],
        );

        let summaries = summarize_all(&by_comment, Some(1));
        assert_eq!(summaries[&1].total(), 1);
        assert_eq!(summaries[&2].counts[&ReactionType::Sad], 2);
        assert_eq!(summaries[&2].your_reaction, Some(ReactionType::Sad));
    }
}
