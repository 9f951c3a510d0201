// src/navigation/session.rs
//! Сессия генерации: рабочий граф и пять фаз алгоритма
//!
//! 1. Инициализация: стартовый узел на глубине 0
//! 2. Послойное расширение с управлением шириной фронта
//! 3. Замыкание висячих концов на единственный финальный узел
//! 4. Ограничение числа исходящих рёбер
//! 5. Заморозка в [`NavigationMap`]
//!
//! Все рабочие узлы лежат в одном векторе и адресуются индексом,
//! рёбра хранятся списками индексов.

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};

use crate::config::GenerationParameters;
use crate::definition::NodeKindDefinition;
use crate::error::GenerationError;
use crate::navigation::map::{NavigationMap, NavigationMapNode};
use crate::navigation::weighted::pick_weighted_neighbour;
use crate::random::RandomSource;

const START_NODE_ID: u32 = 0;
const START_CONNECTIONS: usize = 1;
const MIN_CONNECTIONS: usize = 2;
const MAX_CONNECTIONS: usize = 3;
/// Больше рёбер в финальный узел не входит
const MAX_END_FAN_IN: usize = 3;
/// Дополнительные попытки добрать минимум рёбер
const FORCED_CONNECTION_ATTEMPTS: usize = 8;
const MIN_LAYER_WIDTH: usize = 2;

const BASE_MERGE_PROBABILITY: f64 = 0.35;
const NEAR_TARGET_MERGE_PROBABILITY: f64 = 0.75;
const AT_TARGET_MERGE_PROBABILITY: f64 = 0.95;

#[derive(Debug, Clone)]
struct WorkingNode {
    kind: String,
    depth: u32,
    outgoing: Vec<u32>,
}

impl WorkingNode {
    fn link(&mut self, target: u32) -> bool {
        if self.outgoing.contains(&target) {
            return false;
        }
        self.outgoing.push(target);
        true
    }
}

/// Строящийся следующий слой
struct NextLayer {
    ids: Vec<u32>,
    /// Курсор слева направо: слияния и новые узлы не уходят левее него
    min_planar_index: usize,
    target_width: usize,
}

impl NextLayer {
    fn new(target_width: usize) -> Self {
        Self {
            ids: Vec::new(),
            min_planar_index: 0,
            target_width,
        }
    }

    fn width(&self) -> usize {
        self.ids.len()
    }
}

/// Одноразовая сессия генерации. `run` потребляет сессию.
pub(crate) struct GenerationSession<'a> {
    definitions: &'a HashMap<String, NodeKindDefinition>,
    max_nodes: usize,
    random: &'a mut dyn RandomSource,
    parameters: &'a GenerationParameters,
    nodes: Vec<WorkingNode>,
}

impl<'a> GenerationSession<'a> {
    pub(crate) fn new(
        definitions: &'a HashMap<String, NodeKindDefinition>,
        max_nodes: usize,
        random: &'a mut dyn RandomSource,
        parameters: &'a GenerationParameters,
    ) -> Self {
        Self {
            definitions,
            max_nodes,
            random,
            parameters,
            nodes: Vec::with_capacity(max_nodes),
        }
    }

    pub(crate) fn run(
        mut self,
        start_kind: &str,
        end_kind: &str,
    ) -> Result<NavigationMap, GenerationError> {
        let start_id = self.add_node(start_kind, 0);
        let mut current_layer = vec![start_id];

        while !current_layer.is_empty() && self.nodes.len() < self.max_nodes {
            current_layer = self.process_layer(&current_layer)?;
        }
        debug!(
            "expansion finished with {} of {} nodes",
            self.nodes.len(),
            self.max_nodes
        );

        if let Some(end_id) = self.connect_loose_ends(end_kind) {
            self.enforce_connection_bounds(end_id);
        }

        Ok(self.freeze())
    }

    // === Фаза 2: послойное расширение ===

    fn process_layer(&mut self, current_layer: &[u32]) -> Result<Vec<u32>, GenerationError> {
        let mut next_layer = NextLayer::new(self.target_next_layer_width());

        for &node_id in current_layer {
            self.process_node(node_id, &mut next_layer)?;
        }

        if next_layer.ids.is_empty() && self.nodes.len() < self.max_nodes {
            self.recover_from_dead_end(&mut next_layer)?;
        }

        debug!(
            "layer of {} produced {} nodes (target {})",
            current_layer.len(),
            next_layer.width(),
            next_layer.target_width
        );
        Ok(next_layer.ids)
    }

    fn process_node(
        &mut self,
        node_id: u32,
        next_layer: &mut NextLayer,
    ) -> Result<(), GenerationError> {
        let source_kind = self.nodes[node_id as usize].kind.clone();
        let weighted_neighbours = self.weighted_neighbours(&source_kind);
        if weighted_neighbours.is_empty() {
            return Ok(());
        }

        let (min_connections, max_connections) = connection_bounds(node_id);
        let requested = self.random.next_int(min_connections, max_connections + 1);

        for _ in 0..requested {
            let Some(kind) = self.pick_neighbour_kind(&source_kind, &weighted_neighbours)? else {
                break;
            };
            self.try_add_connection(node_id, &kind, next_layer, false);
        }

        let mut attempts = 0;
        while self.nodes[node_id as usize].outgoing.len() < min_connections
            && attempts < FORCED_CONNECTION_ATTEMPTS
        {
            attempts += 1;
            let Some(kind) = self.pick_neighbour_kind(&source_kind, &weighted_neighbours)? else {
                break;
            };
            self.try_add_connection(node_id, &kind, next_layer, true);
        }

        Ok(())
    }

    /// Одно ребро к узлу нужного типа: слияние с существующим узлом
    /// следующего слоя или новый узел.
    fn try_add_connection(
        &mut self,
        node_id: u32,
        kind: &str,
        next_layer: &mut NextLayer,
        allow_any_kind_fallback: bool,
    ) {
        let candidates = self.merge_candidates(next_layer, Some(kind), false);

        if next_layer.width() >= next_layer.target_width && !candidates.is_empty() {
            self.perform_merge(node_id, &candidates, next_layer);
            return;
        }

        if self.attempt_random_merge(node_id, &candidates, next_layer) {
            return;
        }

        let can_create =
            self.nodes.len() < self.max_nodes && next_layer.width() < next_layer.target_width;
        if can_create {
            self.add_neighbour_node(node_id, kind, next_layer);
        } else {
            self.attempt_forced_merge(node_id, kind, next_layer, allow_any_kind_fallback);
        }
    }

    fn attempt_random_merge(
        &mut self,
        node_id: u32,
        candidates: &[usize],
        next_layer: &mut NextLayer,
    ) -> bool {
        if candidates.is_empty() {
            return false;
        }

        let probability = merge_probability(next_layer.width(), next_layer.target_width);
        if self.random.next_double() >= probability {
            return false;
        }

        self.perform_merge(node_id, candidates, next_layer)
    }

    fn attempt_forced_merge(
        &mut self,
        node_id: u32,
        kind: &str,
        next_layer: &mut NextLayer,
        allow_any_kind_fallback: bool,
    ) {
        let mut searches = vec![(Some(kind), false), (Some(kind), true)];
        if allow_any_kind_fallback {
            searches.extend([(None, false), (None, true)]);
        }

        for (kind, ignore_distance) in searches {
            let candidates = self.merge_candidates(next_layer, kind, ignore_distance);
            if !candidates.is_empty() {
                self.perform_merge(node_id, &candidates, next_layer);
                return;
            }
        }
    }

    /// Индексы следующего слоя, куда можно слиться.
    /// `kind == None` означает любой тип.
    fn merge_candidates(
        &self,
        next_layer: &NextLayer,
        kind: Option<&str>,
        ignore_distance: bool,
    ) -> Vec<usize> {
        let end = if ignore_distance {
            next_layer.width()
        } else {
            next_layer
                .width()
                .min(
                    next_layer
                        .min_planar_index
                        .saturating_add(self.parameters.max_merge_distance),
                )
        };

        (next_layer.min_planar_index..end)
            .filter(|&index| {
                kind.is_none_or(|kind| self.nodes[next_layer.ids[index] as usize].kind == kind)
            })
            .collect()
    }

    fn perform_merge(
        &mut self,
        node_id: u32,
        candidates: &[usize],
        next_layer: &mut NextLayer,
    ) -> bool {
        let index = candidates[self.random.next_int(0, candidates.len())];
        let target = next_layer.ids[index];

        if self.nodes[node_id as usize].link(target) {
            trace!("node {node_id} merged into {target}");
            next_layer.min_planar_index = index;
            return true;
        }
        false
    }

    fn add_neighbour_node(&mut self, parent_id: u32, kind: &str, next_layer: &mut NextLayer) {
        let depth = self.nodes[parent_id as usize].depth + 1;
        let child_id = self.add_node(kind, depth);
        self.nodes[parent_id as usize].outgoing.push(child_id);
        next_layer.ids.push(child_id);
        next_layer.min_planar_index = next_layer.ids.len() - 1;
        trace!("node {parent_id} spawned {child_id} ({kind})");
    }

    fn recover_from_dead_end(&mut self, next_layer: &mut NextLayer) -> Result<(), GenerationError> {
        let parent = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(id, node)| node.outgoing.len() < connection_bounds(*id as u32).1)
            .filter(|(_, node)| {
                self.definitions
                    .get(&node.kind)
                    .is_some_and(NodeKindDefinition::has_weighted_neighbours)
            })
            .min_by(|(_, a), (_, b)| {
                b.depth
                    .cmp(&a.depth)
                    .then(a.outgoing.len().cmp(&b.outgoing.len()))
            })
            .map(|(id, _)| id as u32);

        let Some(parent_id) = parent else {
            debug!("dead end: no node can spawn further, stopping expansion");
            return Ok(());
        };

        let parent_kind = self.nodes[parent_id as usize].kind.clone();
        let weighted_neighbours = self.weighted_neighbours(&parent_kind);
        let Some(kind) = self.pick_neighbour_kind(&parent_kind, &weighted_neighbours)? else {
            return Ok(());
        };

        let depth = self.nodes[parent_id as usize].depth + 1;
        let child_id = self.add_node(&kind, depth);
        self.nodes[parent_id as usize].outgoing.push(child_id);
        next_layer.ids.push(child_id);
        debug!("dead end: node {parent_id} recovered growth with {child_id} ({kind})");
        Ok(())
    }

    fn target_next_layer_width(&self) -> usize {
        let count = self.nodes.len();
        let remaining_slots = self.max_nodes.saturating_sub(count);
        if remaining_slots <= 1 {
            return 1;
        }

        // Первый слой всегда растёт из старта, у которого ровно одно ребро
        if count == 1 {
            return 1;
        }

        let configured_peak = self.parameters.peak_frontier_width.max(MIN_LAYER_WIDTH + 1);
        let heuristic_peak =
            configured_peak.max(configured_peak.saturating_add(1).min(4.max(self.max_nodes / 8)));
        let peak_width = heuristic_peak.min(remaining_slots);

        let progress = (count as f64 / (self.max_nodes - 1).max(1) as f64).clamp(0.0, 1.0);

        // Треугольная огибающая: 0 в начале и конце, 1 в середине
        let envelope = 1.0 - (2.0 * progress - 1.0).abs();
        let mut desired = (MIN_LAYER_WIDTH as f64
            + (peak_width - MIN_LAYER_WIDTH) as f64 * envelope)
            .round_ties_even() as usize;

        if progress >= 0.90 {
            desired = desired.min(2);
        } else if progress >= 0.78 {
            desired = desired.min(3);
        }

        desired.clamp(MIN_LAYER_WIDTH, remaining_slots)
    }

    // === Фаза 3: замыкание висячих концов ===

    /// Назначает финальный узел и подключает к нему всё, что осталось без выхода.
    /// Возвращает идентификатор финального узла, если висячие концы были.
    fn connect_loose_ends(&mut self, end_kind: &str) -> Option<u32> {
        let loose_ends: Vec<u32> = self
            .ids()
            .filter(|&id| id != START_NODE_ID && self.nodes[id as usize].outgoing.is_empty())
            .collect();

        let deepest = loose_ends
            .iter()
            .map(|&id| self.nodes[id as usize].depth)
            .max()?;

        let incoming = self.incoming_counts();
        let end_id = loose_ends
            .iter()
            .copied()
            .filter(|&id| self.nodes[id as usize].depth == deepest)
            .min_by_key(|id| (incoming.get(id).copied().unwrap_or(0), *id))?;

        self.nodes[end_id as usize].kind = end_kind.to_string();

        let deepest_siblings: Vec<u32> = loose_ends
            .iter()
            .copied()
            .filter(|&id| id != end_id && self.nodes[id as usize].depth == deepest)
            .collect();

        let final_depth = if deepest_siblings.is_empty() {
            let feeders: Vec<u32> = self
                .ids()
                .filter(|&id| self.nodes[id as usize].depth + 1 == deepest)
                .collect();
            if feeders.len() > MAX_END_FAN_IN {
                self.promote_feeders_to_gateways(end_id, &feeders)
            } else {
                deepest
            }
        } else {
            self.insert_gateways(end_id, deepest, &deepest_siblings)
        };

        debug!(
            "end node {end_id} at depth {final_depth} ({} loose ends)",
            loose_ends.len()
        );

        for depth in (0..final_depth).rev() {
            self.connect_loose_ends_at_depth(depth, end_id);
        }

        Some(end_id)
    }

    /// На глубине финального узла есть другие висячие концы: финал уходит на
    /// две глубины вниз, до трёх соседей становятся шлюзами перед ним.
    fn insert_gateways(&mut self, end_id: u32, deepest: u32, siblings: &[u32]) -> u32 {
        let final_depth = deepest + 2;
        let parents = self.parents_of(end_id);
        self.nodes[end_id as usize].depth = final_depth;

        let gateway_count = siblings.len().min(MAX_END_FAN_IN);
        let (gateways, extras) = siblings.split_at(gateway_count);

        for &gateway in gateways {
            let node = &mut self.nodes[gateway as usize];
            node.depth = final_depth - 1;
            node.link(end_id);
        }

        self.connect_round_robin(extras, gateways);
        self.redirect_to_gateways(&parents, end_id, gateways);

        debug!(
            "inserted {} gateways before end node {end_id}",
            gateways.len()
        );
        final_depth
    }

    /// Финальный узел один на своей глубине, но над ним слишком широкий слой:
    /// три узла этого слоя опускаются на глубину финала и становятся шлюзами,
    /// финал уходит ещё на одну глубину.
    fn promote_feeders_to_gateways(&mut self, end_id: u32, feeders: &[u32]) -> u32 {
        let gateway_depth = self.nodes[end_id as usize].depth;
        let final_depth = gateway_depth + 1;
        self.nodes[end_id as usize].depth = final_depth;

        let (gateways, rest) = feeders.split_at(MAX_END_FAN_IN);
        for &gateway in gateways {
            let node = &mut self.nodes[gateway as usize];
            node.depth = gateway_depth;
            node.link(end_id);
        }

        self.redirect_to_gateways(rest, end_id, gateways);

        debug!(
            "promoted {} of {} feeders to gateways before end node {end_id}",
            gateways.len(),
            feeders.len()
        );
        final_depth
    }

    /// Убирает прямые рёбра в финал и направляет источники в шлюзы по кругу
    fn redirect_to_gateways(&mut self, sources: &[u32], end_id: u32, gateways: &[u32]) {
        if gateways.is_empty() {
            return;
        }
        for (i, &source) in sources.iter().enumerate() {
            let node = &mut self.nodes[source as usize];
            node.outgoing.retain(|&target| target != end_id);
            node.link(gateways[i % gateways.len()]);
        }
    }

    fn connect_loose_ends_at_depth(&mut self, depth: u32, end_id: u32) {
        let loose: Vec<u32> = self
            .ids()
            .filter(|&id| {
                let node = &self.nodes[id as usize];
                id != end_id && node.depth == depth && node.outgoing.is_empty()
            })
            .collect();
        if loose.is_empty() {
            return;
        }

        let targets: Vec<u32> = self
            .ids()
            .filter(|&id| {
                let node = &self.nodes[id as usize];
                node.depth == depth + 1 && (id == end_id || !node.outgoing.is_empty())
            })
            .collect();

        self.connect_round_robin(&loose, &targets);
    }

    fn connect_round_robin(&mut self, sources: &[u32], targets: &[u32]) {
        if targets.is_empty() {
            return;
        }
        for (i, &source) in sources.iter().enumerate() {
            self.nodes[source as usize].link(targets[i % targets.len()]);
        }
    }

    // === Фаза 4: границы числа рёбер ===

    fn enforce_connection_bounds(&mut self, end_id: u32) {
        let mut order: Vec<u32> = self.ids().collect();
        order.sort_by_key(|&id| (std::cmp::Reverse(self.nodes[id as usize].depth), id));

        for node_id in order {
            if node_id == START_NODE_ID || node_id == end_id {
                continue;
            }

            let node = &mut self.nodes[node_id as usize];
            node.outgoing.truncate(MAX_CONNECTIONS);
            if node.outgoing.len() >= MIN_CONNECTIONS {
                continue;
            }

            let depth = node.depth;
            let end_open = self.parents_of(end_id).len() < MAX_END_FAN_IN;
            let mut forward: Vec<u32> = self
                .ids()
                .filter(|&id| {
                    let target = &self.nodes[id as usize];
                    target.depth > depth
                        && if id == end_id {
                            end_open
                        } else {
                            !target.outgoing.is_empty()
                        }
                })
                .collect();
            forward.sort_by_key(|&id| (self.nodes[id as usize].depth, id));

            let node = &mut self.nodes[node_id as usize];
            for target in forward {
                if node.outgoing.len() >= MIN_CONNECTIONS {
                    break;
                }
                node.link(target);
            }
        }
    }

    // === Фаза 5: заморозка ===

    fn freeze(self) -> NavigationMap {
        let nodes_by_id: BTreeMap<u32, NavigationMapNode> = self
            .nodes
            .into_iter()
            .enumerate()
            .map(|(id, node)| {
                let id = id as u32;
                (
                    id,
                    NavigationMapNode::new(id, node.kind, node.depth, node.outgoing),
                )
            })
            .collect();

        NavigationMap::new(START_NODE_ID, nodes_by_id)
    }

    // === Вспомогательное ===

    fn add_node(&mut self, kind: &str, depth: u32) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(WorkingNode {
            kind: kind.to_string(),
            depth,
            outgoing: Vec::new(),
        });
        id
    }

    fn ids(&self) -> impl Iterator<Item = u32> + use<> {
        0..self.nodes.len() as u32
    }

    fn weighted_neighbours(&self, kind: &str) -> Vec<(String, f32)> {
        self.definitions
            .get(kind)
            .map(NodeKindDefinition::weighted_neighbours)
            .unwrap_or_default()
    }

    /// Взвешенный выбор типа соседа с проверкой, что тип определён
    fn pick_neighbour_kind(
        &mut self,
        source_kind: &str,
        weighted_neighbours: &[(String, f32)],
    ) -> Result<Option<String>, GenerationError> {
        let Some(kind) = pick_weighted_neighbour(weighted_neighbours, &mut *self.random) else {
            return Ok(None);
        };

        if !self.definitions.contains_key(kind) {
            return Err(GenerationError::UnknownNeighbourKind {
                source_kind: source_kind.to_string(),
                target_kind: kind.to_string(),
            });
        }
        Ok(Some(kind.to_string()))
    }

    fn incoming_counts(&self) -> HashMap<u32, usize> {
        let mut counts = HashMap::new();
        for node in &self.nodes {
            for &target in &node.outgoing {
                *counts.entry(target).or_insert(0) += 1;
            }
        }
        counts
    }

    fn parents_of(&self, target: u32) -> Vec<u32> {
        self.ids()
            .filter(|&id| self.nodes[id as usize].outgoing.contains(&target))
            .collect()
    }
}

fn connection_bounds(node_id: u32) -> (usize, usize) {
    if node_id == START_NODE_ID {
        (START_CONNECTIONS, START_CONNECTIONS)
    } else {
        (MIN_CONNECTIONS, MAX_CONNECTIONS.max(MIN_CONNECTIONS))
    }
}

fn merge_probability(width: usize, target_width: usize) -> f64 {
    if width >= target_width {
        AT_TARGET_MERGE_PROBABILITY
    } else if width + 1 == target_width {
        NEAR_TARGET_MERGE_PROBABILITY
    } else {
        BASE_MERGE_PROBABILITY
    }
}
