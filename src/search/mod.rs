//! Общая машинерия поиска по сетке.
//!
//! Каждая ячейка хранит временное состояние поиска ([`SearchState`]), которое
//! переиспользуется всеми поисками без обнуления. Вместо очистки сетка ведёт счётчик
//! фаз: новый поиск увеличивает его на 2, и ячейка считается
//! - непосещённой, если её фаза меньше текущей;
//! - находящейся на фронте, если фаза равна текущей;
//! - обработанной, если фаза равна текущей + 1.
//!
//! Одновременно на сетке может идти только один поиск. [`HexGrid::begin_search`]
//! выдаёт [`SearchSession`], которая держит сетку и снимает блокировку при уничтожении;
//! повторный вызов изнутри сессии возвращает [`SearchError::AlreadyInFlight`].

pub mod path;
pub mod queue;
pub mod visibility;

use thiserror::Error;

use crate::grid::HexGrid;
use queue::QueueLinks;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("на сетке уже выполняется поиск")]
    AlreadyInFlight,
    #[error("ячейка {0} вне сетки")]
    CellOutOfRange(usize),
}

/// Временное состояние ячейки, действительное только в фазе `phase`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchState {
    pub distance: i32,
    pub heuristic: i32,
    pub phase: u32,
    pub path_from: Option<usize>,
    next_with_same_priority: Option<usize>,
}

impl SearchState {
    #[must_use]
    pub fn priority(&self) -> usize {
        (self.distance + self.heuristic).max(0) as usize
    }
}

impl QueueLinks for [SearchState] {
    fn priority(&self, item: usize) -> usize {
        self[item].priority()
    }

    fn next_with_same_priority(&self, item: usize) -> Option<usize> {
        self[item].next_with_same_priority
    }

    fn set_next_with_same_priority(&mut self, item: usize, next: Option<usize>) {
        self[item].next_with_same_priority = next;
    }
}

impl HexGrid {
    /// Начинает новый поиск. Ошибка, если предыдущая сессия ещё жива.
    pub fn begin_search(&mut self) -> Result<SearchSession<'_>, SearchError> {
        if self.search_in_flight {
            return Err(SearchError::AlreadyInFlight);
        }
        // Фаза + 1 тоже должна помещаться; при переполнении сбрасываем штампы целиком
        let phase = match self.search_phase.checked_add(2) {
            Some(phase) if phase < u32::MAX => phase,
            _ => {
                log::debug!("счётчик фаз поиска исчерпан, сброс состояния ячеек");
                for state in &mut self.search {
                    state.phase = 0;
                }
                2
            }
        };
        self.search_phase = phase;
        self.search_in_flight = true;
        self.frontier.clear();
        Ok(SearchSession { grid: self, phase })
    }

    /// Текущее значение счётчика фаз.
    #[must_use]
    pub fn search_phase(&self) -> u32 {
        self.search_phase
    }

    #[must_use]
    pub fn search_state(&self, index: usize) -> Option<&SearchState> {
        self.search.get(index)
    }
}

/// Один поиск, владеющий очередью и временным состоянием ячеек сетки.
///
/// При уничтожении очередь очищается, а сетка снова допускает новый поиск.
pub struct SearchSession<'a> {
    grid: &'a mut HexGrid,
    phase: u32,
}

impl SearchSession<'_> {
    #[must_use]
    pub fn phase(&self) -> u32 {
        self.phase
    }

    #[must_use]
    pub fn grid(&self) -> &HexGrid {
        self.grid
    }

    /// Доступ к сетке на запись (например, чтобы менять высоту во время заливки).
    pub fn grid_mut(&mut self) -> &mut HexGrid {
        self.grid
    }

    #[must_use]
    pub fn state(&self, index: usize) -> &SearchState {
        &self.grid.search[index]
    }

    #[must_use]
    pub fn is_unvisited(&self, index: usize) -> bool {
        self.grid.search[index].phase < self.phase
    }

    #[must_use]
    pub fn is_frontier(&self, index: usize) -> bool {
        self.grid.search[index].phase == self.phase
    }

    #[must_use]
    pub fn is_settled(&self, index: usize) -> bool {
        self.grid.search[index].phase > self.phase
    }

    /// Количество элементов на фронте.
    #[must_use]
    pub fn frontier_len(&self) -> usize {
        self.grid.frontier.len()
    }

    /// Добавляет непосещённую ячейку на фронт.
    pub fn open(&mut self, index: usize, distance: i32, heuristic: i32, path_from: Option<usize>) {
        let state = &mut self.grid.search[index];
        state.phase = self.phase;
        state.distance = distance;
        state.heuristic = heuristic;
        state.path_from = path_from;
        let priority = state.priority();
        let HexGrid {
            search, frontier, ..
        } = &mut *self.grid;
        frontier.enqueue(search.as_mut_slice(), index, priority);
    }

    /// Улучшает расстояние до ячейки на фронте. Возвращает `true`, если путь стал короче.
    pub fn relax(&mut self, index: usize, distance: i32, path_from: Option<usize>) -> bool {
        let HexGrid {
            search, frontier, ..
        } = &mut *self.grid;
        let state = &mut search[index];
        if state.phase != self.phase || distance >= state.distance {
            return false;
        }
        let old_priority = state.priority();
        let previous = (state.distance, state.path_from);
        state.distance = distance;
        state.path_from = path_from;
        if frontier.change(search.as_mut_slice(), index, old_priority) {
            return true;
        }
        // Ячейки нет в старой корзине: состояние не должно расходиться с очередью
        let state = &mut search[index];
        (state.distance, state.path_from) = previous;
        false
    }

    /// Извлекает ближайшую ячейку фронта, не помечая её обработанной.
    pub fn pop(&mut self) -> Option<usize> {
        let HexGrid {
            search, frontier, ..
        } = &mut *self.grid;
        frontier.dequeue(search.as_slice())
    }

    /// Извлекает ближайшую ячейку фронта и помечает её обработанной.
    pub fn settle_next(&mut self) -> Option<usize> {
        let index = self.pop()?;
        self.grid.search[index].phase = self.phase + 1;
        Some(index)
    }
}

impl Drop for SearchSession<'_> {
    fn drop(&mut self) {
        self.grid.frontier.clear();
        self.grid.search_in_flight = false;
    }
}
