//! Формирование суши: подъём и опускание случайных пятен до исчерпания бюджета.
//!
//! Бюджет суши равен числу ячеек, которые должны оказаться не ниже уровня воды.
//! Каждый подъём ячейки через уровень воды тратит единицу бюджета, каждое опускание
//! под воду возвращает её. Пятно растёт заливкой от случайной ячейки региона:
//! приоритет соседа равен расстоянию до центра плюс случайная добавка 0 или 1,
//! поэтому края пятен получаются неровными.

use rand::Rng;
use serde::Serialize;

use crate::config::LandSettings;
use crate::error::MapError;
use crate::grid::HexGrid;
use crate::region::MapRegion;

/// Предохранитель от бесконечного цикла при неудачных параметрах.
pub const LAND_GUARD_ITERATIONS: u32 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LandReport {
    /// Целевое количество ячеек суши
    pub budget: i32,
    /// Неизрасходованный остаток (больше нуля, если предохранитель сработал раньше)
    pub remaining: i32,
    pub iterations: u32,
}

/// Бюджет суши: `round(cells * percentage / 100)`.
#[must_use]
pub fn land_budget(cell_count: usize, land_percentage: i32) -> i32 {
    (cell_count as f32 * land_percentage as f32 * 0.01).round() as i32
}

/// Поднимает и опускает пятна в регионах, пока бюджет суши не будет израсходован.
///
/// Нехватка бюджета не считается ошибкой: генерация продолжается с тем, что получилось.
pub fn create_land<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    rng: &mut R,
    regions: &[MapRegion],
    land: &LandSettings,
) -> Result<LandReport, MapError> {
    let budget = land_budget(grid.cell_count(), land.land_percentage);
    let mut report = LandReport {
        budget,
        remaining: budget,
        iterations: 0,
    };
    if budget <= 0 || regions.is_empty() {
        return Ok(report);
    }

    'guard: for iteration in 0..LAND_GUARD_ITERATIONS {
        report.iterations = iteration + 1;
        for region in regions {
            let chunk_size = rng.gen_range(land.chunk_size_min..land.chunk_size_max);
            if rng.gen_range(0.0..1.0f32) < land.sink_probability {
                report.remaining = sink_terrain(grid, rng, region, chunk_size, report.remaining, land)?;
            } else {
                report.remaining = raise_terrain(grid, rng, region, chunk_size, report.remaining, land)?;
                if report.remaining <= 0 {
                    break 'guard;
                }
            }
        }
    }

    if report.remaining > 0 {
        log::warn!(
            "не удалось израсходовать бюджет суши: осталось {} из {} за {} итераций",
            report.remaining,
            report.budget,
            report.iterations
        );
    } else {
        log::debug!("суша сформирована за {} итераций", report.iterations);
    }
    Ok(report)
}

fn raise_terrain<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    rng: &mut R,
    region: &MapRegion,
    chunk_size: i32,
    mut budget: i32,
    land: &LandSettings,
) -> Result<i32, MapError> {
    let Some(first) = region.random_cell(rng, grid) else {
        return Ok(budget);
    };
    let rise = if rng.gen_range(0.0..1.0f32) < land.high_rise_probability {
        2
    } else {
        1
    };

    grow_chunk(grid, rng, first, chunk_size, land, |grid, cell| {
        let original = grid.cells()[cell].elevation();
        let elevation = original + rise;
        if elevation > land.elevation_maximum {
            return Step::Skip;
        }
        grid.set_elevation(cell, elevation);
        if original < land.water_level && elevation >= land.water_level {
            budget -= 1;
            if budget == 0 {
                return Step::Stop;
            }
        }
        Step::Grow
    })?;
    Ok(budget)
}

fn sink_terrain<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    rng: &mut R,
    region: &MapRegion,
    chunk_size: i32,
    mut budget: i32,
    land: &LandSettings,
) -> Result<i32, MapError> {
    let Some(first) = region.random_cell(rng, grid) else {
        return Ok(budget);
    };
    let sink = if rng.gen_range(0.0..1.0f32) < land.high_rise_probability {
        2
    } else {
        1
    };

    grow_chunk(grid, rng, first, chunk_size, land, |grid, cell| {
        let original = grid.cells()[cell].elevation();
        let elevation = original - sink;
        if elevation < land.elevation_minimum {
            return Step::Skip;
        }
        grid.set_elevation(cell, elevation);
        if original >= land.water_level && elevation < land.water_level {
            budget += 1;
        }
        Step::Grow
    })?;
    Ok(budget)
}

/// Что делать с только что извлечённой ячейкой пятна.
enum Step {
    /// Ячейка изменена: засчитать её и расширить фронт соседями
    Grow,
    /// Ячейка упёрлась в предел высот и не входит в пятно
    Skip,
    /// Бюджет исчерпан, заливка прекращается
    Stop,
}

fn grow_chunk<R, F>(
    grid: &mut HexGrid,
    rng: &mut R,
    first: usize,
    chunk_size: i32,
    land: &LandSettings,
    mut apply: F,
) -> Result<(), MapError>
where
    R: Rng + ?Sized,
    F: FnMut(&mut HexGrid, usize) -> Step,
{
    let mut session = grid.begin_search()?;
    session.open(first, 0, 0, None);

    let mut size = 0;
    while size < chunk_size {
        let Some(current) = session.pop() else {
            break;
        };
        match apply(session.grid_mut(), current) {
            Step::Skip => continue,
            Step::Stop => break,
            Step::Grow => size += 1,
        }

        let neighbors: Vec<_> = session.grid().neighbors(current).map(|(_, n)| n).collect();
        for neighbor in neighbors {
            if !session.is_unvisited(neighbor) {
                continue;
            }
            let distance = session.grid().distance(neighbor, first);
            let jitter = i32::from(rng.gen_range(0.0..1.0f32) < land.jitter_probability);
            session.open(neighbor, distance, jitter, None);
        }
    }
    Ok(())
}
