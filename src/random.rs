// src/random.rs
//! Источник случайности для генератора
//!
//! Генератор никогда не обращается к глобальному ГСЧ: источник передаётся явно.
//! Это позволяет:
//! - получать одинаковые карты при одинаковой последовательности значений
//! - подставлять в тестах скриптованные источники
//! - записывать последовательность и воспроизводить её при отладке

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Порт случайных чисел, который потребляет генератор.
pub trait RandomSource {
    /// Равномерное целое из `[min_inclusive, max_exclusive)`.
    ///
    /// Пустой диапазон возвращает `min_inclusive`.
    fn next_int(&mut self, min_inclusive: usize, max_exclusive: usize) -> usize;

    /// Равномерное число из `[0.0, 1.0)`.
    fn next_double(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_int(&mut self, min_inclusive: usize, max_exclusive: usize) -> usize {
        (**self).next_int(min_inclusive, max_exclusive)
    }

    fn next_double(&mut self) -> f64 {
        (**self).next_double()
    }
}

/// Боевой источник на базе `ChaCha8Rng`
#[derive(Debug, Clone)]
pub struct ChaChaRandom {
    rng: ChaCha8Rng,
}

impl ChaChaRandom {
    /// Детерминированный источник с заданным сидом
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Источник, засеянный энтропией ОС
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RandomSource for ChaChaRandom {
    fn next_int(&mut self, min_inclusive: usize, max_exclusive: usize) -> usize {
        if max_exclusive <= min_inclusive {
            return min_inclusive;
        }
        self.rng.gen_range(min_inclusive..max_exclusive)
    }

    fn next_double(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Всегда возвращает нижнюю границу и `0.0`
#[derive(Debug, Clone, Copy, Default)]
pub struct MinRandom;

impl RandomSource for MinRandom {
    fn next_int(&mut self, min_inclusive: usize, _max_exclusive: usize) -> usize {
        min_inclusive
    }

    fn next_double(&mut self) -> f64 {
        0.0
    }
}

/// Всегда возвращает верхнюю границу минус один и почти единицу
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxRandom;

impl RandomSource for MaxRandom {
    fn next_int(&mut self, min_inclusive: usize, max_exclusive: usize) -> usize {
        max_exclusive.saturating_sub(1).max(min_inclusive)
    }

    fn next_double(&mut self) -> f64 {
        0.999_999
    }
}

/// Одна выборка из источника
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Draw {
    Int(usize),
    Double(f64),
}

/// Проигрывает заранее заданную последовательность значений.
///
/// Целые и дробные значения идут из двух независимых очередей; когда очередь
/// заканчивается, она начинается сначала. Целое значение прижимается к
/// запрошенному диапазону, дробное возвращается как есть.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    ints: Vec<usize>,
    doubles: Vec<f64>,
    int_cursor: usize,
    double_cursor: usize,
}

impl ScriptedRandom {
    #[must_use]
    pub fn new(ints: Vec<usize>, doubles: Vec<f64>) -> Self {
        Self {
            ints,
            doubles,
            int_cursor: 0,
            double_cursor: 0,
        }
    }

    /// Собирает сценарий из записанной последовательности выборок
    #[must_use]
    pub fn from_draws(draws: &[Draw]) -> Self {
        let mut ints = Vec::new();
        let mut doubles = Vec::new();
        for draw in draws {
            match *draw {
                Draw::Int(value) => ints.push(value),
                Draw::Double(value) => doubles.push(value),
            }
        }
        Self::new(ints, doubles)
    }
}

impl RandomSource for ScriptedRandom {
    fn next_int(&mut self, min_inclusive: usize, max_exclusive: usize) -> usize {
        if self.ints.is_empty() {
            return min_inclusive;
        }
        let value = self.ints[self.int_cursor % self.ints.len()];
        self.int_cursor += 1;
        value.clamp(min_inclusive, max_exclusive.saturating_sub(1).max(min_inclusive))
    }

    fn next_double(&mut self) -> f64 {
        if self.doubles.is_empty() {
            return 0.0;
        }
        let value = self.doubles[self.double_cursor % self.doubles.len()];
        self.double_cursor += 1;
        value
    }
}

/// Обёртка, которая запоминает каждую выборку внутреннего источника
#[derive(Debug, Clone)]
pub struct RecordingRandom<R> {
    inner: R,
    draws: Vec<Draw>,
}

impl<R: RandomSource> RecordingRandom<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            draws: Vec::new(),
        }
    }

    #[must_use]
    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    /// Превращает запись в сценарий для повторного прогона
    #[must_use]
    pub fn replay(&self) -> ScriptedRandom {
        ScriptedRandom::from_draws(&self.draws)
    }
}

impl<R: RandomSource> RandomSource for RecordingRandom<R> {
    fn next_int(&mut self, min_inclusive: usize, max_exclusive: usize) -> usize {
        let value = self.inner.next_int(min_inclusive, max_exclusive);
        self.draws.push(Draw::Int(value));
        value
    }

    fn next_double(&mut self) -> f64 {
        let value = self.inner.next_double();
        self.draws.push(Draw::Double(value));
        value
    }
}
