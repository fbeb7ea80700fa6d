//! Поиск пути с учётом очков движения за ход.

use crate::grid::{HexCell, HexGrid};
use crate::hex::{EdgeType, HexDirection};
use crate::search::SearchError;

/// Правила передвижения юнита.
pub trait Traveler {
    /// Сколько очков движения можно потратить за один ход.
    fn speed(&self) -> i32;

    fn is_valid_destination(&self, cell: &HexCell) -> bool {
        !cell.is_underwater() && !cell.is_occupied()
    }

    /// Стоимость перехода `from → to` через ребро `direction`; `None` — непроходимо.
    fn move_cost(
        &self,
        grid: &HexGrid,
        from: usize,
        to: usize,
        direction: HexDirection,
    ) -> Option<i32> {
        let from_cell = &grid.cells()[from];
        let to_cell = &grid.cells()[to];
        let edge = EdgeType::between(from_cell.elevation(), to_cell.elevation());
        if edge == EdgeType::Cliff || from_cell.is_walled() != to_cell.is_walled() {
            return None;
        }
        if from_cell.has_road_through_edge(direction) {
            return Some(1);
        }
        let base = if edge == EdgeType::Flat { 5 } else { 10 };
        Some(
            base + i32::from(to_cell.urban_level())
                + i32::from(to_cell.farm_level())
                + i32::from(to_cell.plant_level()),
        )
    }
}

/// Обычный сухопутный юнит.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandUnit {
    pub speed: i32,
}

impl Default for LandUnit {
    fn default() -> Self {
        Self { speed: 24 }
    }
}

impl Traveler for LandUnit {
    fn speed(&self) -> i32 {
        self.speed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub cell: usize,
    /// Накопленная стоимость с учётом переноса на следующий ход
    pub distance: i32,
    /// Номер хода, на котором юнит окажется в этой ячейке
    pub turn: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub steps: Vec<PathStep>,
}

impl Path {
    #[must_use]
    pub fn cells(&self) -> Vec<usize> {
        self.steps.iter().map(|s| s.cell).collect()
    }

    #[must_use]
    pub fn total_distance(&self) -> i32 {
        self.steps.last().map_or(0, |s| s.distance)
    }

    /// Число ходов до прибытия в конечную ячейку.
    #[must_use]
    pub fn turns(&self) -> i32 {
        self.steps.last().map_or(0, |s| s.turn)
    }
}

/// Ищет путь от `from` до `to`. `Ok(None)` — цель недостижима.
///
/// Фронт упорядочен по `distance + heuristic`, эвристика — гексагональное расстояние
/// до цели. Если переход не укладывается в остаток хода, его стоимость переносится
/// на следующий ход: `distance = turn * speed + move_cost`.
pub fn find_path<T: Traveler + ?Sized>(
    grid: &mut HexGrid,
    from: usize,
    to: usize,
    traveler: &T,
) -> Result<Option<Path>, SearchError> {
    for index in [from, to] {
        if index >= grid.cell_count() {
            return Err(SearchError::CellOutOfRange(index));
        }
    }
    let speed = traveler.speed().max(1);

    let mut session = grid.begin_search()?;
    session.open(from, 0, 0, None);

    while let Some(current) = session.settle_next() {
        if current == to {
            let mut steps = Vec::new();
            let mut cell = Some(current);
            while let Some(index) = cell {
                let distance = session.state(index).distance;
                steps.push(PathStep {
                    cell: index,
                    distance,
                    turn: (distance - 1) / speed,
                });
                cell = if index == from {
                    None
                } else {
                    session.state(index).path_from
                };
            }
            steps.reverse();
            return Ok(Some(Path { steps }));
        }

        let current_distance = session.state(current).distance;
        let current_turn = (current_distance - 1) / speed;
        let neighbors: Vec<_> = session.grid().neighbors(current).collect();
        for (direction, neighbor) in neighbors {
            if session.is_settled(neighbor) {
                continue;
            }
            let grid = session.grid();
            if !traveler.is_valid_destination(&grid.cells()[neighbor]) {
                continue;
            }
            let Some(move_cost) = traveler.move_cost(grid, current, neighbor, direction) else {
                continue;
            };

            let mut distance = current_distance + move_cost;
            let turn = (distance - 1) / speed;
            if turn > current_turn {
                distance = turn * speed + move_cost;
            }

            if session.is_unvisited(neighbor) {
                let heuristic = grid.distance(neighbor, to);
                session.open(neighbor, distance, heuristic, Some(current));
            } else {
                session.relax(neighbor, distance, Some(current));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_land(width: i32, height: i32) -> HexGrid {
        HexGrid::new(width, height).unwrap()
    }

    #[test]
    fn straight_path_on_flat_land() {
        let mut grid = flat_land(10, 5);
        let from = grid.offset_index(1, 2).unwrap();
        let to = grid.offset_index(5, 2).unwrap();
        let path = find_path(&mut grid, from, to, &LandUnit::default())
            .unwrap()
            .unwrap();

        assert_eq!(path.steps.len(), 5);
        assert_eq!(path.steps[0].cell, from);
        assert_eq!(path.steps[4].cell, to);
        assert_eq!(path.total_distance(), 20);
        for pair in path.steps.windows(2) {
            let a = grid.cells()[pair[0].cell].coordinates();
            let b = grid.cells()[pair[1].cell].coordinates();
            assert_eq!(a.distance_to(b), 1);
        }
    }

    #[test]
    fn wrapped_map_paths_cross_the_seam() {
        let mut grid = HexGrid::with_wrapping(20, 10, true).unwrap();
        let from = grid.offset_index(0, 4).unwrap();
        let to = grid.offset_index(19, 4).unwrap();
        let path = find_path(&mut grid, from, to, &LandUnit::default())
            .unwrap()
            .unwrap();
        assert_eq!(path.cells(), vec![from, to]);
        assert_eq!(path.total_distance(), 5);

        let mut flat = flat_land(20, 10);
        let path = find_path(&mut flat, from, to, &LandUnit::default())
            .unwrap()
            .unwrap();
        assert_eq!(path.steps.len(), 20);
    }

    #[test]
    fn roads_are_cheaper() {
        let mut grid = flat_land(10, 5);
        let from = grid.offset_index(1, 2).unwrap();
        let to = grid.offset_index(3, 2).unwrap();
        let mid = grid.offset_index(2, 2).unwrap();
        grid.add_road(from, HexDirection::E);
        grid.add_road(mid, HexDirection::E);
        let path = find_path(&mut grid, from, to, &LandUnit::default())
            .unwrap()
            .unwrap();
        assert_eq!(path.cells(), vec![from, mid, to]);
        assert_eq!(path.total_distance(), 2);
    }

    #[test]
    fn water_and_cliffs_block_the_way() {
        let mut grid = flat_land(5, 5);
        let from = grid.offset_index(0, 2).unwrap();
        let to = grid.offset_index(4, 2).unwrap();
        // Столбец x = 2 целиком уходит под воду
        for z in 0..5 {
            let i = grid.offset_index(2, z).unwrap();
            grid.set_water_level(i, 1);
        }
        assert_eq!(find_path(&mut grid, from, to, &LandUnit::default()).unwrap(), None);

        for z in 0..5 {
            let i = grid.offset_index(2, z).unwrap();
            grid.set_water_level(i, 0);
            grid.set_elevation(i, 3);
        }
        assert_eq!(find_path(&mut grid, from, to, &LandUnit::default()).unwrap(), None);
    }

    #[test]
    fn overflowing_moves_start_the_next_turn() {
        let mut grid = flat_land(10, 5);
        let from = grid.offset_index(1, 2).unwrap();
        let to = grid.offset_index(4, 2).unwrap();
        // 7 очков за ход: второй шаг (5 + 5) не помещается и переносится
        let unit = LandUnit { speed: 7 };
        let path = find_path(&mut grid, from, to, &unit).unwrap().unwrap();
        let distances: Vec<_> = path.steps.iter().map(|s| s.distance).collect();
        assert_eq!(distances, vec![0, 5, 12, 19]);
        assert_eq!(path.turns(), 2);
    }

    #[test]
    fn occupied_goal_is_unreachable() {
        let mut grid = flat_land(5, 5);
        let from = grid.offset_index(1, 1).unwrap();
        let to = grid.offset_index(3, 1).unwrap();
        grid.set_occupied(to, true);
        assert_eq!(find_path(&mut grid, from, to, &LandUnit::default()).unwrap(), None);
    }

    #[test]
    fn out_of_range_cells_are_errors() {
        let mut grid = flat_land(5, 5);
        assert_eq!(
            find_path(&mut grid, 0, 99, &LandUnit::default()),
            Err(SearchError::CellOutOfRange(99))
        );
    }
}
