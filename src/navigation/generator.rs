// src/navigation/generator.rs
use std::collections::HashMap;

use log::debug;

use crate::config::GenerationParameters;
use crate::definition::NodeKindDefinition;
use crate::error::GenerationError;
use crate::navigation::map::NavigationMap;
use crate::navigation::session::GenerationSession;
use crate::random::{ChaChaRandom, RandomSource};

/// Генерирует навигационную карту от стартового типа до финального.
///
/// # Аргументы
/// * `definitions` - определения типов узлов, только чтение
/// * `start_kind` - тип стартового узла, должен быть определён
/// * `end_kind` - тип, который получит единственный финальный узел
/// * `max_nodes` - бюджет узлов, не меньше 1
/// * `random` - источник случайности; без него используется `ChaChaRandom` с энтропией ОС
/// * `parameters` - форма карты; без них используются значения по умолчанию
///
/// # Ошибки
/// Ошибки конфигурации возвращаются до начала генерации. Ссылка таблицы соседей
/// на неопределённый или финальный тип также считается ошибкой. Если рост карты
/// упёрся в тупик, возвращается карта меньше `max_nodes` без ошибки.
pub fn generate_navigation_map(
    definitions: &HashMap<String, NodeKindDefinition>,
    start_kind: &str,
    end_kind: &str,
    max_nodes: usize,
    random: Option<&mut dyn RandomSource>,
    parameters: Option<&GenerationParameters>,
) -> Result<NavigationMap, GenerationError> {
    validate_request(definitions, start_kind, end_kind, max_nodes)?;

    let default_parameters = GenerationParameters::default();
    let parameters = parameters.unwrap_or(&default_parameters);
    validate_parameters(parameters)?;

    let mut entropy_random;
    let random: &mut dyn RandomSource = match random {
        Some(random) => random,
        None => {
            entropy_random = ChaChaRandom::from_entropy();
            &mut entropy_random
        }
    };

    let map = GenerationSession::new(definitions, max_nodes, random, parameters)
        .run(start_kind, end_kind)?;
    debug!(
        "generated map '{start_kind}' -> '{end_kind}': {} nodes, max depth {}",
        map.len(),
        map.max_depth()
    );
    Ok(map)
}

fn validate_request(
    definitions: &HashMap<String, NodeKindDefinition>,
    start_kind: &str,
    end_kind: &str,
    max_nodes: usize,
) -> Result<(), GenerationError> {
    if definitions.is_empty() {
        return Err(GenerationError::EmptyDefinitions);
    }
    if start_kind.trim().is_empty() {
        return Err(GenerationError::BlankStartKind);
    }
    if end_kind.trim().is_empty() {
        return Err(GenerationError::BlankEndKind);
    }
    if max_nodes == 0 {
        return Err(GenerationError::InvalidMaxNodes(max_nodes));
    }
    if !definitions.contains_key(start_kind) {
        return Err(GenerationError::UnknownStartKind(start_kind.to_string()));
    }

    // Неопределённый сосед должен ломать генерацию при любом бюджете,
    // а не только когда рулетка на него попала. Сортировка даёт стабильную ошибку.
    // Финальный тип получает только один узел, поэтому в таблицах соседей его быть не может.
    let mut kinds: Vec<&String> = definitions.keys().collect();
    kinds.sort();
    for kind in kinds {
        let definition = &definitions[kind];
        for (neighbour, _) in definition.weighted_neighbours() {
            if neighbour == end_kind {
                return Err(GenerationError::EndKindInNeighbours {
                    source_kind: definition.kind.clone(),
                    end_kind: neighbour,
                });
            }
            if !definitions.contains_key(&neighbour) {
                return Err(GenerationError::UnknownNeighbourKind {
                    source_kind: definition.kind.clone(),
                    target_kind: neighbour,
                });
            }
        }
    }

    Ok(())
}

fn validate_parameters(parameters: &GenerationParameters) -> Result<(), GenerationError> {
    if parameters.peak_frontier_width == 0 {
        return Err(GenerationError::InvalidParameter {
            name: "peak_frontier_width",
            value: parameters.peak_frontier_width,
        });
    }
    if parameters.max_merge_distance == 0 {
        return Err(GenerationError::InvalidParameter {
            name: "max_merge_distance",
            value: parameters.max_merge_distance,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::MinRandom;

    fn definitions() -> HashMap<String, NodeKindDefinition> {
        [
            NodeKindDefinition::new("start").with_neighbour("path", 1.0),
            NodeKindDefinition::new("path").with_neighbour("path", 1.0),
        ]
        .into_iter()
        .map(|definition| (definition.kind.clone(), definition))
        .collect()
    }

    #[test]
    fn rejects_bad_requests_before_generating() {
        let definitions = definitions();
        let generate = |start: &str, end: &str, max_nodes: usize| {
            generate_navigation_map(&definitions, start, end, max_nodes, Some(&mut MinRandom), None)
        };

        assert_eq!(generate(" ", "boss", 5), Err(GenerationError::BlankStartKind));
        assert_eq!(generate("start", "", 5), Err(GenerationError::BlankEndKind));
        assert_eq!(generate("start", "boss", 0), Err(GenerationError::InvalidMaxNodes(0)));
        assert_eq!(
            generate("castle", "boss", 5),
            Err(GenerationError::UnknownStartKind("castle".to_string()))
        );
        assert_eq!(
            generate_navigation_map(&HashMap::new(), "start", "boss", 5, None, None),
            Err(GenerationError::EmptyDefinitions)
        );
    }

    #[test]
    fn rejects_zero_parameters() {
        let parameters = GenerationParameters {
            peak_frontier_width: 6,
            max_merge_distance: 0,
        };
        let result = generate_navigation_map(
            &definitions(),
            "start",
            "boss",
            5,
            Some(&mut MinRandom),
            Some(&parameters),
        );
        assert_eq!(
            result,
            Err(GenerationError::InvalidParameter {
                name: "max_merge_distance",
                value: 0
            })
        );
    }

    #[test]
    fn single_node_budget_returns_lonely_start() {
        let map =
            generate_navigation_map(&definitions(), "start", "boss", 1, Some(&mut MinRandom), None)
                .unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.start_node().neighbour_ids().is_empty());
        assert!(map.end_node("boss").is_none());
    }

    #[test]
    fn defaults_to_entropy_random() {
        let map = generate_navigation_map(&definitions(), "start", "boss", 6, None, None).unwrap();
        assert_eq!(map.len(), 6);
        assert!(map.end_node("boss").is_some());
    }
}
