#![allow(dead_code)]

use std::collections::HashMap;

use navmap::navigation::graph::{is_acyclic, unreachable_nodes};
use navmap::{NavigationMap, NodeKindDefinition};

pub const START: &str = "starting_village";
pub const END: &str = "final_boss";
pub const MAX_END_FAN_IN: usize = 3;

fn into_map(definitions: Vec<NodeKindDefinition>) -> HashMap<String, NodeKindDefinition> {
    definitions
        .into_iter()
        .map(|definition| (definition.kind.clone(), definition))
        .collect()
}

/// Старт ведёт в `path`, `path` ведёт только в себя
pub fn path_definitions() -> HashMap<String, NodeKindDefinition> {
    into_map(vec![
        NodeKindDefinition::new(START).with_neighbour("path", 1.0),
        NodeKindDefinition::new("path").with_neighbour("path", 1.0),
    ])
}

/// Три взаимно связанных типа `a`, `b`, `c` с равными весами
pub fn abc_definitions() -> HashMap<String, NodeKindDefinition> {
    let definitions = [START, "a", "b", "c"]
        .into_iter()
        .map(|kind| {
            NodeKindDefinition::new(kind)
                .with_neighbour("a", 1.0)
                .with_neighbour("b", 1.0)
                .with_neighbour("c", 1.0)
        })
        .collect();
    into_map(definitions)
}

/// Проверяет структурные свойства готовой карты и возвращает список нарушений.
pub fn invariant_violations(map: &NavigationMap, end_kind: &str) -> Vec<String> {
    let mut violations = Vec::new();
    if map.len() < 2 {
        return violations;
    }

    let start = map.start_node();
    if start.neighbour_ids().len() != 1 {
        violations.push(format!(
            "start has {} outgoing edges",
            start.neighbour_ids().len()
        ));
    }

    let ends: Vec<u32> = map
        .nodes()
        .filter(|node| node.kind() == end_kind)
        .map(|node| node.id())
        .collect();
    let [end_id] = ends[..] else {
        violations.push(format!("expected one end node, found {ends:?}"));
        return violations;
    };
    let end = &map.nodes_by_id()[&end_id];

    if !end.neighbour_ids().is_empty() {
        violations.push("end node has outgoing edges".to_string());
    }
    if let Some(node) = map
        .nodes()
        .find(|node| node.id() != end_id && node.depth() >= end.depth())
    {
        violations.push(format!(
            "node {} at depth {} is not above end depth {}",
            node.id(),
            node.depth(),
            end.depth()
        ));
    }

    let end_fan_in = map.incoming_count(end_id);
    if end_fan_in > MAX_END_FAN_IN {
        violations.push(format!("end fan-in is {end_fan_in}"));
    }

    for node in map.nodes() {
        for &target in node.neighbour_ids() {
            match map.node(target) {
                Some(target) if target.depth() > node.depth() => {}
                Some(target) => violations.push(format!(
                    "edge {} -> {} does not go deeper",
                    node.id(),
                    target.id()
                )),
                None => violations.push(format!("edge {} -> missing {target}", node.id())),
            }
        }

        if node.id() == start.id() || node.id() == end_id {
            continue;
        }

        let fan_out = node.neighbour_ids().len();
        if !(1..=3).contains(&fan_out) {
            violations.push(format!("node {} has {fan_out} outgoing edges", node.id()));
        }

        let feasible = map
            .nodes()
            .filter(|target| target.depth() > node.depth())
            .filter(|target| {
                target.id() != end_id
                    || end_fan_in < MAX_END_FAN_IN
                    || node.neighbour_ids().contains(&end_id)
            })
            .count();
        if feasible >= 2 && fan_out < 2 {
            violations.push(format!(
                "node {} has {fan_out} outgoing edges with {feasible} feasible targets",
                node.id()
            ));
        }
    }

    if !is_acyclic(map) {
        violations.push("graph has a cycle".to_string());
    }
    let orphans = unreachable_nodes(map);
    if !orphans.is_empty() {
        violations.push(format!("unreachable nodes {orphans:?}"));
    }

    violations
}

pub fn assert_invariants(map: &NavigationMap, end_kind: &str) {
    let violations = invariant_violations(map, end_kind);
    assert!(violations.is_empty(), "{violations:#?}");
}
