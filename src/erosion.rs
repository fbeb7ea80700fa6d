//! Эрозия: перенос высоты с обрывов в низины.
//!
//! Ячейка «размываема», если у неё есть сосед хотя бы на два уровня ниже. За шаг
//! случайная размываемая ячейка теряет уровень, а случайный подходящий сосед его
//! получает. Множество кандидатов обновляется локально после каждого шага, без
//! полного пересчёта по карте.

use rand::Rng;
use serde::Serialize;

use crate::config::ErosionSettings;
use crate::grid::HexGrid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ErosionReport {
    /// Размываемых ячеек до эрозии
    pub initial: usize,
    pub target: usize,
    pub steps: usize,
}

/// Множество индексов ячеек с удалением и проверкой за O(1).
#[derive(Debug, Clone)]
struct CandidateSet {
    items: Vec<usize>,
    positions: Vec<Option<usize>>,
}

impl CandidateSet {
    fn new(cell_count: usize) -> Self {
        Self {
            items: Vec::new(),
            positions: vec![None; cell_count],
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn contains(&self, cell: usize) -> bool {
        self.positions[cell].is_some()
    }

    fn insert(&mut self, cell: usize) {
        if self.positions[cell].is_none() {
            self.positions[cell] = Some(self.items.len());
            self.items.push(cell);
        }
    }

    fn remove(&mut self, cell: usize) {
        let Some(position) = self.positions[cell].take() else {
            return;
        };
        self.items.swap_remove(position);
        if let Some(&moved) = self.items.get(position) {
            self.positions[moved] = Some(position);
        }
    }
}

/// Есть ли у ячейки сосед на два уровня ниже или ещё ниже.
#[must_use]
pub fn is_erodible(grid: &HexGrid, cell: usize) -> bool {
    let erodible_elevation = grid.cells()[cell].elevation() - 2;
    grid.neighbors(cell)
        .any(|(_, n)| grid.cells()[n].elevation() <= erodible_elevation)
}

/// Случайный сосед, принимающий размытую высоту. `None`, если таких соседей нет.
pub fn erosion_target<R: Rng + ?Sized>(grid: &HexGrid, rng: &mut R, cell: usize) -> Option<usize> {
    let erodible_elevation = grid.cells()[cell].elevation() - 2;
    let candidates: Vec<usize> = grid
        .neighbors(cell)
        .map(|(_, n)| n)
        .filter(|&n| grid.cells()[n].elevation() <= erodible_elevation)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())])
}

/// Сглаживает `erosion_percentage` процентов размываемых ячеек.
pub fn erode_land<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    rng: &mut R,
    settings: &ErosionSettings,
) -> ErosionReport {
    let mut candidates = CandidateSet::new(grid.cell_count());
    for cell in 0..grid.cell_count() {
        if is_erodible(grid, cell) {
            candidates.insert(cell);
        }
    }

    let initial = candidates.len();
    let target = (initial as f32 * (100 - settings.erosion_percentage) as f32 * 0.01) as usize;
    let mut steps = 0;

    while candidates.len() > target {
        let cell = candidates.items[rng.gen_range(0..candidates.len())];
        let Some(target_cell) = erosion_target(grid, rng, cell) else {
            log::warn!("ячейка {cell} в списке эрозии, но размывать некуда");
            candidates.remove(cell);
            continue;
        };

        let elevation = grid.cells()[cell].elevation() - 1;
        grid.set_elevation(cell, elevation);
        let target_elevation = grid.cells()[target_cell].elevation() + 1;
        grid.set_elevation(target_cell, target_elevation);
        steps += 1;

        if !is_erodible(grid, cell) {
            candidates.remove(cell);
        }
        // Источник опустился: соседи на два уровня выше стали размываемыми
        let risen: Vec<usize> = grid
            .neighbors(cell)
            .map(|(_, n)| n)
            .filter(|&n| grid.cells()[n].elevation() == elevation + 2)
            .collect();
        for n in risen {
            candidates.insert(n);
        }

        if is_erodible(grid, target_cell) {
            candidates.insert(target_cell);
        }
        // Цель поднялась: соседи на уровень выше могли потерять обрыв
        let flattened: Vec<usize> = grid
            .neighbors(target_cell)
            .map(|(_, n)| n)
            .filter(|&n| {
                n != cell
                    && grid.cells()[n].elevation() == target_elevation + 1
                    && !is_erodible(grid, n)
            })
            .collect();
        for n in flattened {
            candidates.remove(n);
        }
    }

    log::debug!("эрозия: {initial} размываемых ячеек, {steps} шагов, осталось {}", candidates.len());
    ErosionReport {
        initial,
        target,
        steps,
    }
}
