//! Рёбра рек между соседними ячейками.
//!
//! У ячейки не больше одного входящего и одного исходящего ребра, и каждое ребро
//! взаимно: исходящая река A в направлении `d` всегда сопровождается входящей
//! рекой соседа B из направления `d.opposite()`.

use crate::grid::HexGrid;
use crate::hex::HexDirection;

impl HexGrid {
    /// Может ли река течь из `from` в `to`: вниз, по ровному или в озеро на уровне воды.
    #[must_use]
    pub fn is_valid_river_destination(&self, from: usize, to: usize) -> bool {
        let from = &self.cells()[from];
        let to = &self.cells()[to];
        from.elevation >= to.elevation || from.water_level == to.elevation
    }

    /// Прокладывает исходящую реку. Возвращает `false`, если ребро недопустимо.
    ///
    /// Прежние исходящая река этой ячейки и входящая река соседа удаляются;
    /// дорога через это ребро сносится.
    pub fn set_outgoing_river(&mut self, index: usize, direction: HexDirection) -> bool {
        if self.cells()[index].is_underwater() {
            return false;
        }
        if self.cells()[index].outgoing_river == Some(direction) {
            return true;
        }
        let Some(neighbor) = self.neighbor(index, direction) else {
            return false;
        };
        if !self.is_valid_river_destination(index, neighbor) {
            return false;
        }

        self.remove_outgoing_river(index);
        if self.cells()[index].incoming_river == Some(direction) {
            self.remove_incoming_river(index);
        }
        self.cell_mut(index).outgoing_river = Some(direction);
        self.mark_dirty(index);

        self.remove_incoming_river(neighbor);
        self.cell_mut(neighbor).incoming_river = Some(direction.opposite());
        self.mark_dirty(neighbor);

        self.set_road(index, direction, false);
        true
    }

    pub fn remove_river(&mut self, index: usize) {
        self.remove_outgoing_river(index);
        self.remove_incoming_river(index);
    }

    pub fn remove_outgoing_river(&mut self, index: usize) {
        let Some(direction) = self.cell_mut(index).outgoing_river.take() else {
            return;
        };
        self.mark_dirty(index);
        if let Some(neighbor) = self.neighbor(index, direction) {
            self.cell_mut(neighbor).incoming_river = None;
            self.mark_dirty(neighbor);
        }
    }

    pub fn remove_incoming_river(&mut self, index: usize) {
        let Some(direction) = self.cell_mut(index).incoming_river.take() else {
            return;
        };
        self.mark_dirty(index);
        if let Some(neighbor) = self.neighbor(index, direction) {
            self.cell_mut(neighbor).outgoing_river = None;
            self.mark_dirty(neighbor);
        }
    }

    /// Удаляет рёбра рек, ставшие недопустимыми после смены высоты или уровня воды.
    pub(crate) fn validate_rivers(&mut self, index: usize) {
        if let Some(direction) = self.cells()[index].outgoing_river {
            let valid = self
                .neighbor(index, direction)
                .is_some_and(|n| self.is_valid_river_destination(index, n));
            if !valid {
                self.remove_outgoing_river(index);
            }
        }
        if let Some(direction) = self.cells()[index].incoming_river {
            let valid = self
                .neighbor(index, direction)
                .is_some_and(|n| self.is_valid_river_destination(n, index));
            if !valid {
                self.remove_incoming_river(index);
            }
        }
    }
}
