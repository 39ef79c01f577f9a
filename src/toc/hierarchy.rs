//! Flat entries → parent/child tree.
//!
//! A single left-to-right pass keeps a "level stack": the most recent node
//! seen at each level that is still in scope. An entry's parent is the
//! stack entry with the greatest level strictly below its own, so a level-3
//! entry directly after a level-1 entry hangs off the level-1 entry. After
//! placing a node, every deeper stack level goes out of scope.

use std::collections::BTreeMap;

use super::model::{NodeId, TocEntry, TocNode, TocTree};

/// Build the hierarchy for `entries`, preserving their order.
pub fn build(entries: &[TocEntry]) -> TocTree {
    let mut nodes: Vec<TocNode> = Vec::with_capacity(entries.len());
    let mut roots = Vec::new();
    let mut level_stack: BTreeMap<u32, NodeId> = BTreeMap::new();

    for entry in entries {
        let id = NodeId(nodes.len());
        let level = entry.level.max(1);
        let parent = level_stack.range(..level).next_back().map(|(_, &p)| p);

        match parent {
            Some(p) => nodes[p.0].children.push(id),
            None => roots.push(id),
        }

        nodes.push(TocNode {
            id,
            title: entry.title.clone(),
            page_number: entry.page_number,
            level,
            order: entry.order,
            parent,
            children: Vec::new(),
        });

        level_stack.insert(level, id);
        level_stack.retain(|&l, _| l <= level);
    }

    TocTree { nodes, roots }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(levels: &[u32]) -> Vec<TocEntry> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| TocEntry::new(format!("e{i}"), None, level, i as u32 + 1))
            .collect()
    }

    /// Reference parent: nearest preceding entry with a strictly lower level.
    fn expected_parent(levels: &[u32], i: usize) -> Option<usize> {
        (0..i).rev().find(|&j| levels[j] < levels[i])
    }

    #[test]
    fn empty_input_gives_empty_tree() {
        let tree = build(&[]);
        assert!(tree.is_empty());
        assert_eq!(tree.root_ids().len(), 0);
    }

    #[test]
    fn simple_nesting() {
        let tree = build(&entries(&[1, 2, 2, 1, 2]));
        let roots: Vec<_> = tree.roots().map(|n| n.title.as_str()).collect();
        assert_eq!(roots, ["e0", "e3"]);
        let kids: Vec<_> = tree.children(NodeId(0)).map(|n| n.title.as_str()).collect();
        assert_eq!(kids, ["e1", "e2"]);
        assert_eq!(tree.parent(NodeId(4)).map(|n| n.title.as_str()), Some("e3"));
    }

    #[test]
    fn level_jump_attaches_to_nearest_lower_level() {
        let tree = build(&entries(&[1, 3, 2, 3]));
        assert_eq!(tree.node(NodeId(1)).unwrap().parent, Some(NodeId(0)));
        assert_eq!(tree.node(NodeId(2)).unwrap().parent, Some(NodeId(0)));
        assert_eq!(tree.node(NodeId(3)).unwrap().parent, Some(NodeId(2)));
        // Level is kept as parsed, not re-derived from depth.
        assert_eq!(tree.node(NodeId(1)).unwrap().level, 3);
    }

    #[test]
    fn deeper_levels_go_out_of_scope() {
        // The second level-3 entry must not attach to the first level-2 entry
        // once a new level-2 entry has appeared.
        let tree = build(&entries(&[1, 2, 3, 2, 3]));
        assert_eq!(tree.node(NodeId(4)).unwrap().parent, Some(NodeId(3)));
        // A shallower sibling evicts deeper levels: level 3 after a new level 1
        // with no level 2 in between hangs off the new level 1.
        let tree = build(&entries(&[1, 2, 3, 1, 3]));
        assert_eq!(tree.node(NodeId(4)).unwrap().parent, Some(NodeId(3)));
    }

    #[test]
    fn leading_deep_entries_are_roots() {
        let tree = build(&entries(&[3, 2, 1, 2]));
        let roots: Vec<_> = tree.root_ids().iter().map(|id| id.index()).collect();
        assert_eq!(roots, [0, 1, 2]);
        assert_eq!(tree.node(NodeId(3)).unwrap().parent, Some(NodeId(2)));
    }

    #[test]
    fn parents_match_reference_rule_and_preorder_matches_input() {
        let cases: &[&[u32]] = &[
            &[1, 2, 3, 3, 2, 1, 3, 2],
            &[2, 2, 1, 3, 1],
            &[1, 1, 1],
            &[4, 1, 4, 2, 4, 3, 4],
            &[1, 5, 4, 3, 2, 1],
        ];
        for levels in cases {
            let input = entries(levels);
            let tree = build(&input);

            assert_eq!(tree.flatten(), input, "pre-order of {levels:?}");

            for (i, node) in tree.nodes().iter().enumerate() {
                let want = expected_parent(levels, i).map(NodeId);
                assert_eq!(node.parent, want, "parent of {i} in {levels:?}");
                if let Some(p) = tree.parent(node.id) {
                    assert!(p.level < node.level);
                }
            }
        }
    }

    #[test]
    fn rebuilding_from_flattening_is_isomorphic() {
        let tree = build(&entries(&[1, 2, 3, 2, 1, 3, 3, 2]));
        let rebuilt = build(&tree.flatten());
        assert_eq!(rebuilt, tree);
        assert_eq!(rebuilt.to_nested(), tree.to_nested());
    }
}
