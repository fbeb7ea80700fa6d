//! Сетка шестиугольных ячеек.
//!
//! [`HexGrid`] владеет всеми ячейками карты (плоский массив, индекс `x + z * width`),
//! таблицей соседей и общим состоянием поиска. Связи между ячейками хранятся как
//! индексы в этом массиве. Сетка создаётся целиком под размер карты и при смене
//! размера пересоздаётся; отдельные ячейки не добавляются и не удаляются.

pub mod cell;
pub mod persist;
pub mod rivers;

pub use cell::HexCell;

use crate::error::MapError;
use crate::hex::{EdgeType, HexCoordinates, HexDirection};
use crate::search::SearchState;
use crate::search::queue::BucketQueue;

/// Ширина чанка в ячейках: ширина карты должна быть ей кратна.
pub const CHUNK_SIZE_X: i32 = 5;
/// Высота чанка в ячейках.
pub const CHUNK_SIZE_Z: i32 = 5;

#[derive(Debug, Clone)]
pub struct HexGrid {
    width: u32,
    height: u32,
    cells: Vec<HexCell>,
    neighbors: Vec<[Option<usize>; 6]>,
    pub(crate) search: Vec<SearchState>,
    pub(crate) frontier: BucketQueue,
    pub(crate) search_phase: u32,
    pub(crate) search_in_flight: bool,
    dirty: Vec<usize>,
    dirty_flags: Vec<bool>,
    wrapping: bool,
}

impl HexGrid {
    /// Создаёт плоскую карту `width × height` (высота и уровень воды равны нулю).
    pub fn new(width: i32, height: i32) -> Result<Self, MapError> {
        Self::with_wrapping(width, height, false)
    }

    /// То же, что [`HexGrid::new`], но при `wrapping` карта свёрнута в цилиндр:
    /// крайние столбцы соседствуют друг с другом.
    pub fn with_wrapping(width: i32, height: i32, wrapping: bool) -> Result<Self, MapError> {
        if width <= 0 || width % CHUNK_SIZE_X != 0 || height <= 0 || height % CHUNK_SIZE_Z != 0 {
            return Err(MapError::UnsupportedSize {
                width,
                height,
                chunk_x: CHUNK_SIZE_X,
                chunk_z: CHUNK_SIZE_Z,
            });
        }

        let count = (width * height) as usize;
        let mut grid = Self {
            width: width as u32,
            height: height as u32,
            cells: Vec::with_capacity(count),
            neighbors: vec![[None; 6]; count],
            search: vec![SearchState::default(); count],
            frontier: BucketQueue::new(),
            search_phase: 0,
            search_in_flight: false,
            dirty: Vec::new(),
            dirty_flags: vec![false; count],
            wrapping,
        };

        for z in 0..height {
            for x in 0..width {
                grid.create_cell(x, z);
            }
        }
        Ok(grid)
    }

    fn create_cell(&mut self, x: i32, z: i32) {
        let width = self.width as i32;
        let height = self.height as i32;
        let i = self.cells.len();
        let explorable = if self.wrapping {
            z > 0 && z < height - 1
        } else {
            x > 0 && z > 0 && x < width - 1 && z < height - 1
        };
        self.cells
            .push(HexCell::new(i, HexCoordinates::from_offset(x, z), explorable));

        let w = self.width as usize;
        if x > 0 {
            self.set_neighbor(i, HexDirection::W, i - 1);
            // Шов цилиндра: последний столбец смыкается с первым
            if self.wrapping && x == width - 1 {
                self.set_neighbor(i, HexDirection::E, i + 1 - w);
            }
        }
        if z > 0 {
            // Чётные строки смещены влево относительно нечётных
            if z & 1 == 0 {
                self.set_neighbor(i, HexDirection::SE, i - w);
                if x > 0 {
                    self.set_neighbor(i, HexDirection::SW, i - w - 1);
                } else if self.wrapping {
                    self.set_neighbor(i, HexDirection::SW, i - 1);
                }
            } else {
                self.set_neighbor(i, HexDirection::SW, i - w);
                if x < width - 1 {
                    self.set_neighbor(i, HexDirection::SE, i - w + 1);
                } else if self.wrapping {
                    self.set_neighbor(i, HexDirection::SE, i + 1 - 2 * w);
                }
            }
        }
    }

    /// Связь всегда симметрична: сосед получает обратную ссылку.
    fn set_neighbor(&mut self, index: usize, direction: HexDirection, other: usize) {
        self.neighbors[index][direction.index()] = Some(other);
        self.neighbors[other][direction.opposite().index()] = Some(index);
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Свёрнута ли карта в цилиндр по оси X.
    #[must_use]
    pub fn is_wrapping(&self) -> bool {
        self.wrapping
    }

    /// Гексагональное расстояние между ячейками с учётом шва свёрнутой карты.
    #[must_use]
    pub fn distance(&self, from: usize, to: usize) -> i32 {
        let a = self.cells[from].coordinates;
        let b = self.cells[to].coordinates;
        if self.wrapping {
            a.wrapped_distance_to(b, self.width as i32)
        } else {
            a.distance_to(b)
        }
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&HexCell> {
        self.cells.get(index)
    }

    #[must_use]
    pub fn cell_at_offset(&self, x: i32, z: i32) -> Option<&HexCell> {
        self.offset_index(x, z).map(|i| &self.cells[i])
    }

    #[must_use]
    pub fn cell_at(&self, coordinates: HexCoordinates) -> Option<&HexCell> {
        self.coordinates_index(coordinates).map(|i| &self.cells[i])
    }

    #[must_use]
    pub fn offset_index(&self, x: i32, z: i32) -> Option<usize> {
        if x < 0 || z < 0 || x >= self.width as i32 || z >= self.height as i32 {
            return None;
        }
        Some((x + z * self.width as i32) as usize)
    }

    #[must_use]
    pub fn coordinates_index(&self, coordinates: HexCoordinates) -> Option<usize> {
        let (x, z) = coordinates.to_offset();
        if z < 0 {
            return None;
        }
        self.offset_index(x, z)
    }

    #[must_use]
    pub fn neighbor(&self, index: usize, direction: HexDirection) -> Option<usize> {
        self.neighbors[index][direction.index()]
    }

    /// Существующие соседи ячейки вместе с направлением к ним.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = (HexDirection, usize)> + '_ {
        HexDirection::ALL
            .into_iter()
            .filter_map(move |d| self.neighbor(index, d).map(|n| (d, n)))
    }

    #[must_use]
    pub fn edge_type(&self, index: usize, direction: HexDirection) -> Option<EdgeType> {
        self.neighbor(index, direction)
            .map(|n| EdgeType::between(self.cells[index].elevation, self.cells[n].elevation))
    }

    #[must_use]
    pub fn elevation_difference(&self, index: usize, direction: HexDirection) -> Option<i32> {
        self.neighbor(index, direction)
            .map(|n| (self.cells[index].elevation - self.cells[n].elevation).abs())
    }

    /// Устанавливает высоту. Реки, ставшие недопустимыми, и слишком крутые дороги удаляются.
    ///
    /// # Panics
    /// При индексе вне сетки.
    pub fn set_elevation(&mut self, index: usize, elevation: i32) {
        if self.cells[index].elevation == elevation {
            return;
        }
        self.cells[index].elevation = elevation;
        self.validate_rivers(index);
        for d in HexDirection::ALL {
            if self.cells[index].roads[d.index()]
                && self.elevation_difference(index, d).is_some_and(|diff| diff > 1)
            {
                self.set_road(index, d, false);
            }
        }
        self.mark_dirty(index);
    }

    pub fn set_water_level(&mut self, index: usize, water_level: i32) {
        if self.cells[index].water_level == water_level {
            return;
        }
        self.cells[index].water_level = water_level;
        self.validate_rivers(index);
        self.mark_dirty(index);
    }

    pub fn set_terrain_type_index(&mut self, index: usize, terrain: u8) {
        if self.cells[index].terrain_type_index != terrain {
            self.cells[index].terrain_type_index = terrain;
            self.mark_dirty(index);
        }
    }

    pub fn set_urban_level(&mut self, index: usize, level: u8) {
        if self.cells[index].urban_level != level {
            self.cells[index].urban_level = level;
            self.mark_dirty(index);
        }
    }

    pub fn set_farm_level(&mut self, index: usize, level: u8) {
        if self.cells[index].farm_level != level {
            self.cells[index].farm_level = level;
            self.mark_dirty(index);
        }
    }

    pub fn set_plant_level(&mut self, index: usize, level: u8) {
        if self.cells[index].plant_level != level {
            self.cells[index].plant_level = level;
            self.mark_dirty(index);
        }
    }

    pub fn set_special_index(&mut self, index: usize, special: u8) {
        if self.cells[index].special_index != special {
            self.cells[index].special_index = special;
            self.mark_dirty(index);
        }
    }

    pub fn set_walled(&mut self, index: usize, walled: bool) {
        if self.cells[index].walled != walled {
            self.cells[index].walled = walled;
            self.mark_dirty(index);
        }
    }

    /// Отмечает ячейку как занятую юнитом (или освобождает её).
    pub fn set_occupied(&mut self, index: usize, occupied: bool) {
        self.cells[index].occupied = occupied;
    }

    /// Прокладывает дорогу через ребро, если там нет реки и перепад не больше одного уровня.
    pub fn add_road(&mut self, index: usize, direction: HexDirection) -> bool {
        let suitable = !self.cells[index].roads[direction.index()]
            && !self.cells[index].has_river_through_edge(direction)
            && self
                .elevation_difference(index, direction)
                .is_some_and(|diff| diff <= 1);
        if suitable {
            self.set_road(index, direction, true);
        }
        suitable
    }

    pub fn remove_roads(&mut self, index: usize) {
        for d in HexDirection::ALL {
            if self.cells[index].roads[d.index()] {
                self.set_road(index, d, false);
            }
        }
    }

    pub(crate) fn set_road(&mut self, index: usize, direction: HexDirection, state: bool) {
        let Some(neighbor) = self.neighbor(index, direction) else {
            return;
        };
        self.cells[index].roads[direction.index()] = state;
        self.cells[neighbor].roads[direction.opposite().index()] = state;
        self.mark_dirty(index);
        self.mark_dirty(neighbor);
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut HexCell {
        &mut self.cells[index]
    }

    pub(crate) fn mark_dirty(&mut self, index: usize) {
        if !self.dirty_flags[index] {
            self.dirty_flags[index] = true;
            self.dirty.push(index);
        }
    }

    /// Забирает список ячеек, изменённых с прошлого вызова (для перерисовки).
    pub fn take_dirty_cells(&mut self) -> Vec<usize> {
        for &i in &self.dirty {
            self.dirty_flags[i] = false;
        }
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sizes_not_divisible_by_chunk() {
        assert!(HexGrid::new(21, 15).is_err());
        assert!(HexGrid::new(20, 0).is_err());
        assert!(HexGrid::new(20, 15).is_ok());
    }

    #[test]
    fn lookups_agree_and_reject_out_of_range() {
        let grid = HexGrid::new(20, 15).unwrap();
        let cell = grid.cell_at_offset(7, 4).unwrap();
        assert_eq!(cell.index(), 7 + 4 * 20);
        assert_eq!(grid.cell_at(cell.coordinates()).unwrap().index(), cell.index());
        assert_eq!(grid.cell(cell.index()).unwrap().coordinates(), cell.coordinates());

        assert!(grid.cell_at_offset(-1, 0).is_none());
        assert!(grid.cell_at_offset(20, 0).is_none());
        assert!(grid.cell_at_offset(0, 15).is_none());
        assert!(grid.cell(300).is_none());
        assert!(grid.cell_at(HexCoordinates::new(0, -1)).is_none());
    }

    #[test]
    fn neighbors_are_symmetric_and_adjacent() {
        let grid = HexGrid::new(20, 15).unwrap();
        for cell in grid.cells() {
            for (d, n) in grid.neighbors(cell.index()) {
                assert_eq!(grid.neighbor(n, d.opposite()), Some(cell.index()));
                let other = grid.cells()[n].coordinates();
                assert_eq!(cell.coordinates().step(d), other);
            }
        }
        // Внутренняя ячейка имеет всех шестерых соседей
        assert_eq!(grid.neighbors(grid.offset_index(5, 5).unwrap()).count(), 6);
        assert_eq!(grid.neighbors(0).count(), 2);
    }

    #[test]
    fn outer_ring_is_not_explorable() {
        let grid = HexGrid::new(10, 10).unwrap();
        assert!(!grid.cell_at_offset(0, 4).unwrap().is_explorable());
        assert!(!grid.cell_at_offset(4, 9).unwrap().is_explorable());
        assert!(grid.cell_at_offset(4, 4).unwrap().is_explorable());
    }

    #[test]
    fn wrapped_grid_closes_the_seam() {
        let grid = HexGrid::with_wrapping(20, 15, true).unwrap();
        assert!(grid.is_wrapping());
        for cell in grid.cells() {
            let (_, z) = cell.coordinates().to_offset();
            for (d, n) in grid.neighbors(cell.index()) {
                assert_eq!(grid.neighbor(n, d.opposite()), Some(cell.index()));
                assert_eq!(grid.distance(cell.index(), n), 1);
            }
            // Без верхнего и нижнего края у каждой ячейки шесть соседей
            if z > 0 && z < 14 {
                assert_eq!(grid.neighbors(cell.index()).count(), 6);
            }
        }

        let east = grid.offset_index(19, 4).unwrap();
        let west = grid.offset_index(0, 4).unwrap();
        assert_eq!(grid.neighbor(east, HexDirection::E), Some(west));
        assert_eq!(grid.neighbor(west, HexDirection::SW), grid.offset_index(19, 3));
        let odd = grid.offset_index(19, 5).unwrap();
        assert_eq!(grid.neighbor(odd, HexDirection::SE), grid.offset_index(0, 4));
    }

    #[test]
    fn wrapped_grid_explores_edge_columns() {
        let grid = HexGrid::with_wrapping(10, 10, true).unwrap();
        assert!(grid.cell_at_offset(0, 4).unwrap().is_explorable());
        assert!(grid.cell_at_offset(9, 4).unwrap().is_explorable());
        assert!(!grid.cell_at_offset(4, 0).unwrap().is_explorable());
        assert!(!grid.cell_at_offset(4, 9).unwrap().is_explorable());
        assert!(!HexGrid::new(10, 10).unwrap().is_wrapping());
    }

    #[test]
    fn roads_are_mutual_and_drop_on_steep_edges() {
        let mut grid = HexGrid::new(10, 10).unwrap();
        let a = grid.offset_index(4, 4).unwrap();
        let b = grid.neighbor(a, HexDirection::E).unwrap();

        assert!(grid.add_road(a, HexDirection::E));
        assert!(grid.cells()[b].has_road_through_edge(HexDirection::W));

        grid.set_elevation(b, 2);
        assert!(!grid.cells()[a].has_road_through_edge(HexDirection::E));
        assert!(!grid.cells()[b].has_roads());
        assert!(!grid.add_road(a, HexDirection::E));
    }

    #[test]
    fn setters_report_dirty_cells_once() {
        let mut grid = HexGrid::new(10, 10).unwrap();
        grid.set_urban_level(3, 2);
        grid.set_farm_level(3, 1);
        grid.set_elevation(7, 1);
        grid.set_elevation(7, 1);
        assert_eq!(grid.take_dirty_cells(), vec![3, 7]);
        assert!(grid.take_dirty_cells().is_empty());
    }
}
