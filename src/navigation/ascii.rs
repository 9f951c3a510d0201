// src/navigation/ascii.rs
use std::collections::HashSet;

use crate::navigation::map::NavigationMap;

/// Текстовый дамп карты для визуальной проверки: дерево от старта и список смежности.
///
/// Уже развёрнутый узел при повторной встрече помечается `(seen)`, ребро назад
/// по текущему пути помечается `(cycle)`.
#[must_use]
pub fn render_ascii(map: &NavigationMap) -> String {
    let start = map.start_node();
    let mut out = format!("Graph\n{}:{}\n", start.id(), start.kind());

    let mut path = vec![start.id()];
    let mut expanded = HashSet::from([start.id()]);
    render_children(map, start.id(), "", &mut path, &mut expanded, &mut out);

    out.push_str("\nAdjacency\n");
    for node in map.nodes() {
        let neighbours: Vec<String> = node.neighbour_ids().iter().map(u32::to_string).collect();
        out.push_str(&format!(
            "  {}:{} (depth {}) -> [{}]\n",
            node.id(),
            node.kind(),
            node.depth(),
            neighbours.join(", ")
        ));
    }

    out.trim_end().to_string()
}

fn render_children(
    map: &NavigationMap,
    parent_id: u32,
    prefix: &str,
    path: &mut Vec<u32>,
    expanded: &mut HashSet<u32>,
    out: &mut String,
) {
    let Some(parent) = map.node(parent_id) else {
        return;
    };

    let count = parent.neighbour_ids().len();
    for (i, &child_id) in parent.neighbour_ids().iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "\\-- " } else { "+-- " };
        out.push_str(prefix);
        out.push_str(connector);

        let Some(child) = map.node(child_id) else {
            out.push_str(&format!("{child_id}:<missing>\n"));
            continue;
        };
        out.push_str(&format!("{}:{}", child.id(), child.kind()));

        if path.contains(&child_id) {
            out.push_str(" (cycle)\n");
            continue;
        }
        if !expanded.insert(child_id) {
            out.push_str(" (seen)\n");
            continue;
        }
        out.push('\n');

        path.push(child_id);
        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "|   " });
        render_children(map, child_id, &child_prefix, path, expanded, out);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::map::NavigationMapNode;

    #[test]
    fn renders_tree_and_adjacency() {
        let nodes = [
            NavigationMapNode::new(0, "start".into(), 0, vec![1]),
            NavigationMapNode::new(1, "forest".into(), 1, vec![2, 3]),
            NavigationMapNode::new(2, "river".into(), 2, vec![4]),
            NavigationMapNode::new(3, "cave".into(), 2, vec![4]),
            NavigationMapNode::new(4, "boss".into(), 3, vec![]),
        ];
        let map = NavigationMap::new(0, nodes.into_iter().map(|n| (n.id(), n)).collect());

        let expected = "\
Graph
0:start
\\-- 1:forest
    +-- 2:river
    |   \\-- 4:boss
    \\-- 3:cave
        \\-- 4:boss (seen)

Adjacency
  0:start (depth 0) -> [1]
  1:forest (depth 1) -> [2, 3]
  2:river (depth 2) -> [4]
  3:cave (depth 2) -> [4]
  4:boss (depth 3) -> []";

        assert_eq!(render_ascii(&map), expected);
    }
}
