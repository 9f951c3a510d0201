// src/error.rs
//! Ошибки генерации и загрузки конфигурации

use thiserror::Error;

/// Ошибка генерации навигационной карты.
///
/// Все варианты фатальны для вызова: частичная карта не возвращается.
/// Тупики алгоритма (слой без потомков и без кандидата на восстановление)
/// ошибкой не считаются: в этом случае просто возвращается карта меньшего размера.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("node definitions are empty")]
    EmptyDefinitions,

    #[error("start kind must not be blank")]
    BlankStartKind,

    #[error("end kind must not be blank")]
    BlankEndKind,

    #[error("starting node kind '{0}' is not defined")]
    UnknownStartKind(String),

    #[error("max nodes must be at least 1, got {0}")]
    InvalidMaxNodes(usize),

    #[error("generation parameter '{name}' must be at least 1, got {value}")]
    InvalidParameter { name: &'static str, value: usize },

    #[error("node kind '{source_kind}' references unknown neighbour kind '{target_kind}'")]
    UnknownNeighbourKind {
        source_kind: String,
        target_kind: String,
    },

    #[error("node kind '{source_kind}' lists end kind '{end_kind}' as a neighbour")]
    EndKindInNeighbours {
        source_kind: String,
        end_kind: String,
    },
}

/// Ошибка чтения конфигурационного файла запуска
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("duplicate map node kind '{0}'")]
    DuplicateKind(String),
}
