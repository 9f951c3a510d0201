pub mod ascii;
pub mod generator;
pub mod graph;
pub mod map;
mod session;
pub mod weighted;

pub use generator::generate_navigation_map;
pub use map::{NavigationMap, NavigationMapNode};
