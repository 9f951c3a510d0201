// src/config.rs
//! Конфигурация генерации навигационной карты
//!
//! Этот модуль определяет параметры, управляющие формой карты:
//! - Пиковая ширина фронта (сколько веток идут параллельно в середине забега)
//! - Окно слияния (насколько далеко в строящемся слое ищется узел того же типа)
//! - Файл запуска для CLI: сид, бюджет узлов, стартовый/финальный типы и таблица узлов
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::definition::{NodeKindDefinition, NodeKindRegistry};
use crate::error::ConfigError;

/// Параметры формы карты
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Желаемое максимальное число параллельных веток в самой широкой точке.
    /// Внутри генератора всегда поднимается минимум до 3.
    #[serde(default = "default_peak_frontier_width")]
    pub peak_frontier_width: usize,

    /// Насколько далеко вперёд в строящемся слое ищется узел того же типа для слияния
    #[serde(default = "default_max_merge_distance")]
    pub max_merge_distance: usize,
}

fn default_peak_frontier_width() -> usize {
    6
}
fn default_max_merge_distance() -> usize {
    3
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            peak_frontier_width: 6,
            max_merge_distance: 3,
        }
    }
}

/// Файл запуска CLI
///
/// Содержит всё, что нужно для одного или нескольких прогонов генератора.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapGenerationConfig {
    /// Сид генератора случайных чисел; без сида используется энтропия ОС
    #[serde(default)]
    pub seed: Option<u64>,

    /// Максимальное число узлов карты (по умолчанию 25)
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Тип стартового узла (по умолчанию `starting_village`)
    #[serde(default = "default_start_kind")]
    pub start_kind: String,

    /// Тип финального узла (по умолчанию `final_boss`)
    #[serde(default = "default_end_kind")]
    pub end_kind: String,

    /// Сколько вариантов сгенерировать подряд (сиды `seed`, `seed + 1`, ...)
    #[serde(default = "default_variations")]
    pub variations: usize,

    #[serde(default)]
    pub parameters: GenerationParameters,

    /// Таблица типов узлов
    #[serde(default)]
    pub nodes: Vec<NodeKindDefinition>,
}

fn default_max_nodes() -> usize {
    25
}
fn default_start_kind() -> String {
    "starting_village".to_string()
}
fn default_end_kind() -> String {
    "final_boss".to_string()
}
fn default_variations() -> usize {
    1
}

impl MapGenerationConfig {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # run.toml
    /// seed = 42
    /// max_nodes = 30
    ///
    /// [parameters]
    /// peak_frontier_width = 5
    ///
    /// [[nodes]]
    /// kind = "starting_village"
    /// possible_neighbours = { forest = 1.0 }
    ///
    /// [[nodes]]
    /// kind = "forest"
    /// possible_neighbours = { forest = 0.6, village = 0.4 }
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    /// Собирает хранилище определений, проверяя уникальность типов
    pub fn registry(&self) -> Result<NodeKindRegistry, ConfigError> {
        NodeKindRegistry::from_definitions(self.nodes.iter().cloned())
    }
}

impl Default for MapGenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_nodes: 25,
            start_kind: default_start_kind(),
            end_kind: default_end_kind(),
            variations: 1,
            parameters: GenerationParameters::default(),
            nodes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RUN_TOML: &str = r#"
seed = 42
max_nodes = 30

[parameters]
peak_frontier_width = 5

[[nodes]]
kind = "starting_village"
possible_neighbours = { forest = 1.0 }

[[nodes]]
kind = "forest"
possible_neighbours = { forest = 0.6, village = 0.4 }
events_on_consecutive_visits = [{ visits = 3, event = "wolves" }]

[[nodes]]
kind = "village"
possible_neighbours = { forest = 1.0 }
"#;

    #[test]
    fn parses_run_file_with_defaults() {
        let config = MapGenerationConfig::from_toml_str(RUN_TOML).unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_nodes, 30);
        assert_eq!(config.start_kind, "starting_village");
        assert_eq!(config.end_kind, "final_boss");
        assert_eq!(config.variations, 1);
        assert_eq!(config.parameters.peak_frontier_width, 5);
        assert_eq!(config.parameters.max_merge_distance, 3);

        let registry = config.registry().unwrap();
        let forest = registry.get("forest").unwrap();
        assert_eq!(forest.possible_neighbours.len(), 2);
        assert_eq!(forest.event_for_visits(3), Some("wolves"));
        assert_eq!(forest.event_for_visits(2), None);
    }

    #[test]
    fn empty_file_gives_default_config() {
        let config = MapGenerationConfig::from_toml_str("").unwrap();
        assert_eq!(config.max_nodes, 25);
        assert_eq!(config.parameters, GenerationParameters::default());
        assert!(config.nodes.is_empty());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(RUN_TOML.as_bytes()).unwrap();

        let config = MapGenerationConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.nodes.len(), 3);
    }

    #[test]
    fn duplicate_kinds_are_rejected() {
        let toml = r#"
[[nodes]]
kind = "forest"

[[nodes]]
kind = "forest"
"#;
        let config = MapGenerationConfig::from_toml_str(toml).unwrap();
        assert!(matches!(
            config.registry(),
            Err(ConfigError::DuplicateKind(kind)) if kind == "forest"
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = MapGenerationConfig::from_toml_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
