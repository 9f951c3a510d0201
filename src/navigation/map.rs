// src/navigation/map.rs
use std::collections::BTreeMap;

use serde::Serialize;

/// Узел готовой карты. После генерации не изменяется.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationMapNode {
    id: u32,
    kind: String,
    depth: u32,
    /// Только исходящие рёбра
    neighbour_ids: Vec<u32>,
}

impl NavigationMapNode {
    pub(crate) fn new(id: u32, kind: String, depth: u32, neighbour_ids: Vec<u32>) -> Self {
        Self {
            id,
            kind,
            depth,
            neighbour_ids,
        }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn neighbour_ids(&self) -> &[u32] {
        &self.neighbour_ids
    }
}

/// Готовая навигационная карта
///
/// Финальный узел отдельно не хранится: это единственный узел с финальным типом,
/// см. [`NavigationMap::end_node`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationMap {
    start_node_id: u32,
    nodes_by_id: BTreeMap<u32, NavigationMapNode>,
}

impl NavigationMap {
    pub(crate) fn new(start_node_id: u32, nodes_by_id: BTreeMap<u32, NavigationMapNode>) -> Self {
        Self {
            start_node_id,
            nodes_by_id,
        }
    }

    #[must_use]
    pub fn start_node_id(&self) -> u32 {
        self.start_node_id
    }

    /// # Panics
    /// Никогда: стартовый узел создаётся первым и присутствует в любой карте.
    #[must_use]
    pub fn start_node(&self) -> &NavigationMapNode {
        &self.nodes_by_id[&self.start_node_id]
    }

    #[must_use]
    pub fn node(&self, id: u32) -> Option<&NavigationMapNode> {
        self.nodes_by_id.get(&id)
    }

    /// Узлы в порядке возрастания идентификатора
    pub fn nodes(&self) -> impl Iterator<Item = &NavigationMapNode> {
        self.nodes_by_id.values()
    }

    #[must_use]
    pub fn nodes_by_id(&self) -> &BTreeMap<u32, NavigationMapNode> {
        &self.nodes_by_id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes_by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes_by_id.is_empty()
    }

    /// Первый узел с данным типом; для финального типа он единственный
    #[must_use]
    pub fn end_node(&self, end_kind: &str) -> Option<&NavigationMapNode> {
        self.nodes().find(|node| node.kind == end_kind)
    }

    /// Сколько узлов ссылаются на данный
    #[must_use]
    pub fn incoming_count(&self, id: u32) -> usize {
        self.nodes()
            .filter(|node| node.neighbour_ids.contains(&id))
            .count()
    }

    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.nodes().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Глубина → число узлов на ней
    #[must_use]
    pub fn breadth_by_depth(&self) -> BTreeMap<u32, usize> {
        let mut breadth = BTreeMap::new();
        for node in self.nodes() {
            *breadth.entry(node.depth).or_insert(0) += 1;
        }
        breadth
    }
}
