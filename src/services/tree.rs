// src/services/tree.rs
//
// Rebuilds nested answers from a flat, parent-pointer list.

use std::collections::HashMap;

use crate::models::comment::CommentView;

/// Nests `flat` under `anchor` and returns the anchor's children.
///
/// * `anchor == None` means the rows are top-level already; they are returned as-is.
/// * Sibling order follows the order of `flat`; nothing is re-sorted.
/// * Rows whose parent was not loaded are unreachable and dropped.
/// * A missing anchor yields an empty list.
pub fn build_tree(flat: Vec<CommentView>, anchor: Option<i64>) -> Vec<CommentView> {
    let Some(anchor_id) = anchor else {
        return flat;
    };

    let mut nodes: HashMap<i64, CommentView> = HashMap::with_capacity(flat.len());
    let mut adjacency: HashMap<i64, Vec<i64>> = HashMap::new();

    for view in flat {
        if nodes.contains_key(&view.id) {
            continue;
        }
        if let Some(parent_id) = view.parent_id {
            adjacency.entry(parent_id).or_default().push(view.id);
        }
        nodes.insert(view.id, view);
    }

    match attach(anchor_id, &mut nodes, &adjacency) {
        Some(root) => root.children,
        None => Vec::new(),
    }
}

/// Takes `id` out of the index and hangs its loaded descendants under it.
fn attach(
    id: i64,
    nodes: &mut HashMap<i64, CommentView>,
    adjacency: &HashMap<i64, Vec<i64>>,
) -> Option<CommentView> {
    let mut node = nodes.remove(&id)?;

    if let Some(child_ids) = adjacency.get(&id) {
        for &child_id in child_ids {
            if let Some(child) = attach(child_id, nodes, adjacency) {
                node.children.push(child);
            }
        }
    }

    Some(node)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::comment::Comment;

    fn view(id: i64, parent_id: Option<i64>) -> CommentView {
        CommentView::from_row(Comment {
            id,
            author_id: 1,
            product_id: 1,
            text: format!("comment {}", id),
            parent_id,
            rating: None,
            created_at: Utc::now(),
            updated_at: None,
            media_ids: vec![],
            deleted: false,
        })
    }

    fn shape(views: &[CommentView]) -> Vec<(i64, Vec<(i64, usize)>)> {
        views
            .iter()
            .map(|v| {
                (
                    v.id,
                    v.children.iter().map(|c| (c.id, c.children.len())).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn flat_mode_returns_rows_untouched() {
        let rows = vec![view(3, None), view(1, None), view(2, None)];
        let out = build_tree(rows, None);
        let ids: Vec<i64> = out.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(out.iter().all(|v| v.children.is_empty()));
    }

    #[test]
    fn nests_answers_under_the_anchor() {
        // 1 <- 2 <- 4 <- 5, 1 <- 3
        let rows = vec![
            view(1, None),
            view(3, Some(1)),
            view(2, Some(1)),
            view(4, Some(2)),
            view(5, Some(4)),
        ];

        let out = build_tree(rows, Some(1));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, 3);
        assert_eq!(out[1].id, 2);
        assert_eq!(out[1].children[0].id, 4);
        assert_eq!(out[1].children[0].children[0].id, 5);
    }

    #[test]
    fn missing_anchor_yields_nothing() {
        let rows = vec![view(2, Some(1)), view(3, Some(2))];
        assert!(build_tree(rows, Some(1)).is_empty());
    }

    #[test]
    fn branches_cut_by_pagination_are_skipped() {
        // 4's parent (3) was not loaded.
        let rows = vec![view(1, None), view(2, Some(1)), view(4, Some(3))];
        let out = build_tree(rows, Some(1));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 2);
        assert!(out[0].children.is_empty());
    }

    #[test]
    fn duplicate_rows_do_not_duplicate_children() {
        let rows = vec![view(1, None), view(2, Some(1)), view(2, Some(1)), view(3, Some(2))];
        let out = build_tree(rows, Some(1));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].children.len(), 1);
    }

    #[test]
    fn building_twice_gives_the_same_tree() {
        let rows = vec![
            view(10, None),
            view(12, Some(10)),
            view(11, Some(10)),
            view(13, Some(11)),
            view(14, Some(11)),
            view(15, Some(13)),
        ];

        let first = build_tree(rows.clone(), Some(10));
        let second = build_tree(rows, Some(10));
        assert_eq!(shape(&first), shape(&second));
        assert_eq!(shape(&first), vec![(12, vec![]), (11, vec![(13, 1), (14, 0)])]);
    }
}
