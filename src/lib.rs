pub mod batch;
pub mod config;
pub mod definition;
pub mod error;
pub mod navigation;
pub mod random;

pub use config::{GenerationParameters, MapGenerationConfig};
pub use definition::{NodeKindDefinition, NodeKindRegistry};
pub use error::{ConfigError, GenerationError};
pub use navigation::{NavigationMap, NavigationMapNode, generate_navigation_map};
pub use random::{ChaChaRandom, RandomSource};
