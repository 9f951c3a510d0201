// src/navigation/graph.rs
use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;

use crate::navigation::map::NavigationMap;

/// Строит ориентированный граф petgraph: вес узла равен его идентификатору на карте
pub fn build_navigation_graph(map: &NavigationMap) -> DiGraph<u32, ()> {
    let mut graph = DiGraph::with_capacity(map.len(), map.len() * 2);
    let mut id_to_node = HashMap::new();

    for node in map.nodes() {
        id_to_node.insert(node.id(), graph.add_node(node.id()));
    }

    for node in map.nodes() {
        let from = id_to_node[&node.id()];
        for neighbour_id in node.neighbour_ids() {
            if let Some(&to) = id_to_node.get(neighbour_id) {
                graph.add_edge(from, to, ());
            }
        }
    }
    graph
}

#[must_use]
pub fn is_acyclic(map: &NavigationMap) -> bool {
    !is_cyclic_directed(&build_navigation_graph(map))
}

/// Узлы, до которых нельзя дойти от старта по исходящим рёбрам
#[must_use]
pub fn unreachable_nodes(map: &NavigationMap) -> Vec<u32> {
    let graph = build_navigation_graph(map);
    let Some(start) = find_index(&graph, map.start_node_id()) else {
        return map.nodes().map(|node| node.id()).collect();
    };

    let mut reached = HashSet::new();
    let mut bfs = Bfs::new(&graph, start);
    while let Some(index) = bfs.next(&graph) {
        reached.insert(graph[index]);
    }

    map.nodes()
        .map(|node| node.id())
        .filter(|id| !reached.contains(id))
        .collect()
}

/// Узлы в пределах `distance` переходов от `origin`, включая сам `origin`.
///
/// Направление рёбер не учитывается: игровой цикл так считает область видимости
/// вокруг текущего узла. Неизвестный `origin` даёт пустое множество.
#[must_use]
pub fn nodes_within_distance(map: &NavigationMap, origin: u32, distance: u32) -> HashSet<u32> {
    let graph = build_navigation_graph(map);
    let mut visible = HashSet::new();
    let Some(origin_index) = find_index(&graph, origin) else {
        return visible;
    };

    let mut queue = VecDeque::from([(origin_index, 0u32)]);
    visible.insert(origin);

    while let Some((index, hops)) = queue.pop_front() {
        if hops == distance {
            continue;
        }
        for neighbour in graph.neighbors_undirected(index) {
            if visible.insert(graph[neighbour]) {
                queue.push_back((neighbour, hops + 1));
            }
        }
    }
    visible
}

fn find_index(graph: &DiGraph<u32, ()>, id: u32) -> Option<NodeIndex> {
    graph.node_indices().find(|&index| graph[index] == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::map::NavigationMapNode;

    fn map_from(edges: &[(u32, u32, &[u32])]) -> NavigationMap {
        let nodes = edges
            .iter()
            .map(|&(id, depth, neighbours)| {
                (
                    id,
                    NavigationMapNode::new(id, format!("n{id}"), depth, neighbours.to_vec()),
                )
            })
            .collect();
        NavigationMap::new(0, nodes)
    }

    #[test]
    fn builds_directed_graph() {
        let map = map_from(&[(0, 0, &[1]), (1, 1, &[2, 3]), (2, 2, &[]), (3, 2, &[])]);
        let graph = build_navigation_graph(&map);

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert!(is_acyclic(&map));
        assert!(unreachable_nodes(&map).is_empty());
    }

    #[test]
    fn finds_orphans() {
        let map = map_from(&[(0, 0, &[1]), (1, 1, &[]), (2, 1, &[])]);
        assert_eq!(unreachable_nodes(&map), vec![2]);
    }

    #[test]
    fn detects_cycles() {
        let map = map_from(&[(0, 0, &[1]), (1, 1, &[0])]);
        assert!(!is_acyclic(&map));
    }

    #[test]
    fn distance_ignores_edge_direction() {
        // 0 -> 1 -> 2 -> 3, 1 -> 4
        let map = map_from(&[
            (0, 0, &[1]),
            (1, 1, &[2, 4]),
            (2, 2, &[3]),
            (3, 3, &[]),
            (4, 2, &[]),
        ]);

        let around_two = nodes_within_distance(&map, 2, 1);
        assert_eq!(around_two, HashSet::from([1, 2, 3]));

        let wider = nodes_within_distance(&map, 2, 2);
        assert_eq!(wider, HashSet::from([0, 1, 2, 3, 4]));

        assert_eq!(nodes_within_distance(&map, 2, 0), HashSet::from([2]));
        assert!(nodes_within_distance(&map, 42, 3).is_empty());
    }
}
