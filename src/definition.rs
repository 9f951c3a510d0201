// src/definition.rs
//! Определения типов узлов
//!
//! Генератор читает только взвешенную таблицу соседей. Таблица событий
//! за серию посещений хранится здесь для игрового цикла и генерацией не используется.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Определение одного типа узла (биома или встречи)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeKindDefinition {
    /// Уникальный ключ типа
    pub kind: String,

    /// Тип соседа → относительный вес выбора.
    /// Записи с весом `0` игнорируются.
    #[serde(default)]
    pub possible_neighbours: BTreeMap<String, f32>,

    /// События, которые игровой цикл запускает после серии посещений подряд
    #[serde(default)]
    pub events_on_consecutive_visits: Vec<ConsecutiveVisitEvent>,
}

/// Длина серии посещений → идентификатор события
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsecutiveVisitEvent {
    pub visits: u32,
    pub event: String,
}

impl NodeKindDefinition {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            possible_neighbours: BTreeMap::new(),
            events_on_consecutive_visits: Vec::new(),
        }
    }

    /// Добавляет соседа с весом (builder-стиль, удобно для тестов и конфигов)
    #[must_use]
    pub fn with_neighbour(mut self, kind: impl Into<String>, weight: f32) -> Self {
        self.possible_neighbours.insert(kind.into(), weight);
        self
    }

    /// Соседи с положительным весом в стабильном порядке
    #[must_use]
    pub fn weighted_neighbours(&self) -> Vec<(String, f32)> {
        self.possible_neighbours
            .iter()
            .filter(|(_, weight)| **weight > 0.0)
            .map(|(kind, weight)| (kind.clone(), *weight))
            .collect()
    }

    #[must_use]
    pub fn has_weighted_neighbours(&self) -> bool {
        self.possible_neighbours.values().any(|weight| *weight > 0.0)
    }

    /// Событие для серии ровно из `visits` посещений
    #[must_use]
    pub fn event_for_visits(&self, visits: u32) -> Option<&str> {
        self.events_on_consecutive_visits
            .iter()
            .find(|entry| entry.visits == visits)
            .map(|entry| entry.event.as_str())
    }
}

/// Хранилище определений в памяти: тип → определение
#[derive(Debug, Clone, Default)]
pub struct NodeKindRegistry {
    by_kind: HashMap<String, NodeKindDefinition>,
}

impl NodeKindRegistry {
    /// Собирает хранилище, отклоняя повторяющиеся типы
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = NodeKindDefinition>,
    ) -> Result<Self, ConfigError> {
        let mut by_kind = HashMap::new();
        for definition in definitions {
            if by_kind.contains_key(&definition.kind) {
                return Err(ConfigError::DuplicateKind(definition.kind));
            }
            by_kind.insert(definition.kind.clone(), definition);
        }
        Ok(Self { by_kind })
    }

    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&NodeKindDefinition> {
        self.by_kind.get(kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }

    /// Отображение, которое принимает генератор
    #[must_use]
    pub fn as_map(&self) -> &HashMap<String, NodeKindDefinition> {
        &self.by_kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_weights_are_ignored() {
        let definition = NodeKindDefinition::new("forest")
            .with_neighbour("river", 0.0)
            .with_neighbour("cave", 0.5);

        assert_eq!(
            definition.weighted_neighbours(),
            vec![("cave".to_string(), 0.5)]
        );
        assert!(definition.has_weighted_neighbours());
        assert!(!NodeKindDefinition::new("dead_end").has_weighted_neighbours());
    }

    #[test]
    fn registry_rejects_duplicate_kinds() {
        let result = NodeKindRegistry::from_definitions([
            NodeKindDefinition::new("forest"),
            NodeKindDefinition::new("forest"),
        ]);

        assert!(matches!(
            result,
            Err(ConfigError::DuplicateKind(kind)) if kind == "forest"
        ));
    }

    #[test]
    fn registry_looks_up_by_kind() {
        let registry = NodeKindRegistry::from_definitions([
            NodeKindDefinition::new("forest").with_neighbour("river", 1.0),
            NodeKindDefinition::new("river"),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get("forest").is_some());
        assert!(registry.get("swamp").is_none());
        assert!(registry.as_map().contains_key("river"));
    }
}
