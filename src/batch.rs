// src/batch.rs
//! Пакетная генерация вариантов карты
//!
//! Каждый вариант получает собственный `ChaChaRandom` с сидом `base_seed + i`,
//! поэтому результат не зависит от того, в скольких потоках шла генерация.

use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::GenerationParameters;
use crate::definition::NodeKindDefinition;
use crate::error::GenerationError;
use crate::navigation::{NavigationMap, generate_navigation_map};
use crate::random::ChaChaRandom;

/// Всё, что одинаково для всех вариантов
#[derive(Debug, Clone)]
pub struct VariationRequest<'a> {
    pub definitions: &'a HashMap<String, NodeKindDefinition>,
    pub start_kind: &'a str,
    pub end_kind: &'a str,
    pub max_nodes: usize,
    pub parameters: &'a GenerationParameters,
}

impl VariationRequest<'_> {
    /// Один вариант с заданным сидом
    pub fn generate(&self, seed: u64) -> Result<NavigationMap, GenerationError> {
        let mut random = ChaChaRandom::seeded(seed);
        generate_navigation_map(
            self.definitions,
            self.start_kind,
            self.end_kind,
            self.max_nodes,
            Some(&mut random),
            Some(self.parameters),
        )
    }
}

/// Генерирует `count` вариантов в порядке сидов
pub fn generate_variations(
    request: &VariationRequest<'_>,
    base_seed: u64,
    count: usize,
) -> Vec<(u64, Result<NavigationMap, GenerationError>)> {
    let seeds: Vec<u64> = (0..count as u64)
        .map(|i| base_seed.wrapping_add(i))
        .collect();

    #[cfg(feature = "parallel")]
    let iter = seeds.into_par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = seeds.into_iter();

    iter.map(|seed| (seed, request.generate(seed))).collect()
}
