// src/navigation/weighted.rs
use crate::random::RandomSource;

/// Выбирает тип соседа рулеткой по накопленным весам.
///
/// Бросок масштабируется на суммарный вес, берётся первая запись, чей
/// накопленный вес превышает бросок. Если из-за погрешностей ни одна запись
/// не подошла, возвращается последняя. При пустом списке или нулевом
/// суммарном весе источник не трогается и возвращается `None`.
pub fn pick_weighted_neighbour<'a>(
    weighted_neighbours: &'a [(String, f32)],
    random: &mut dyn RandomSource,
) -> Option<&'a str> {
    let total_weight: f64 = weighted_neighbours
        .iter()
        .map(|(_, weight)| f64::from(*weight))
        .sum();
    if total_weight <= 0.0 {
        return None;
    }

    let roll = random.next_double() * total_weight;
    let mut cumulative = 0.0;

    for (kind, weight) in weighted_neighbours {
        cumulative += f64::from(*weight);
        if roll < cumulative {
            return Some(kind.as_str());
        }
    }

    weighted_neighbours.last().map(|(kind, _)| kind.as_str())
}
