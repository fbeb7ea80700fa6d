//! Прокладка рек вниз по склону и образование озёр.

use rand::Rng;
use serde::Serialize;

use crate::climate::ClimateData;
use crate::config::{LandSettings, RiverSettings};
use crate::grid::HexGrid;
use crate::hex::HexDirection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiverReport {
    /// Суммарная длина рек, которую нужно проложить
    pub budget: i32,
    pub remaining: i32,
    pub rivers: u32,
    pub lakes: u32,
}

/// Пороги веса истока: за каждый превышенный порог ячейка попадает в пул ещё раз.
const ORIGIN_THRESHOLDS: [f32; 3] = [0.25, 0.5, 0.75];

/// Прокладывает реки, пока не исчерпан бюджет длины или пул истоков.
///
/// Вес истока `moisture * (elevation - water) / (max - water)`: влажные высокие
/// ячейки попадают в пул чаще.
pub fn create_rivers<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    rng: &mut R,
    climate: &[ClimateData],
    land: &LandSettings,
    settings: &RiverSettings,
) -> RiverReport {
    let mut origins = Vec::new();
    let mut land_cells = 0;
    for (i, cell) in grid.cells().iter().enumerate() {
        if cell.is_underwater() {
            continue;
        }
        land_cells += 1;
        let weight = climate[i].moisture * (cell.elevation() - land.water_level) as f32
            / (land.elevation_maximum - land.water_level) as f32;
        for threshold in ORIGIN_THRESHOLDS {
            if weight > threshold {
                origins.push(i);
            }
        }
    }

    let budget = (land_cells as f32 * settings.river_percentage as f32 * 0.01).round() as i32;
    let mut report = RiverReport {
        budget,
        remaining: budget,
        ..RiverReport::default()
    };

    while report.remaining > 0 && !origins.is_empty() {
        let origin = origins.swap_remove(rng.gen_range(0..origins.len()));
        if grid.cells()[origin].has_river() {
            continue;
        }
        let valid = grid.neighbors(origin).all(|(_, n)| {
            let neighbor = &grid.cells()[n];
            !neighbor.has_river() && !neighbor.is_underwater()
        });
        if !valid {
            continue;
        }
        let length = create_river(grid, rng, origin, settings, &mut report.lakes);
        if length > 0 {
            report.rivers += 1;
            report.remaining -= length;
        }
    }

    if report.remaining > 0 {
        log::warn!(
            "не удалось израсходовать бюджет рек: осталось {} из {}",
            report.remaining,
            report.budget
        );
    }
    log::debug!("реки: {} рек, {} озёр", report.rivers, report.lakes);
    report
}

/// Ведёт реку от `origin` и возвращает её длину в ячейках (0, если река не началась).
fn create_river<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    rng: &mut R,
    origin: usize,
    settings: &RiverSettings,
    lakes: &mut u32,
) -> i32 {
    let mut length = 1;
    let mut cell = origin;
    let mut direction = HexDirection::NE;
    let mut flow_directions = Vec::with_capacity(24);

    while !grid.cells()[cell].is_underwater() {
        let elevation = grid.cells()[cell].elevation();
        let mut min_neighbor_elevation = i32::MAX;
        flow_directions.clear();

        let neighbors: Vec<_> = grid.neighbors(cell).collect();
        for (d, n) in neighbors {
            let neighbor = &grid.cells()[n];
            min_neighbor_elevation = min_neighbor_elevation.min(neighbor.elevation());
            if n == origin || neighbor.has_incoming_river() {
                continue;
            }
            let delta = neighbor.elevation() - elevation;
            if delta > 0 {
                continue;
            }
            // Впадаем в уже существующую реку или в воду
            if (neighbor.has_outgoing_river() || neighbor.is_underwater())
                && grid.set_outgoing_river(cell, d)
            {
                return length;
            }

            if delta < 0 {
                flow_directions.extend([d, d]);
            }
            if length == 1 || (d != direction.next2() && d != direction.previous2()) {
                flow_directions.push(d);
            }
            flow_directions.push(d);
        }

        if flow_directions.is_empty() {
            if length == 1 {
                return 0;
            }
            if min_neighbor_elevation >= elevation {
                grid.set_water_level(cell, min_neighbor_elevation);
                if min_neighbor_elevation == elevation {
                    grid.set_elevation(cell, min_neighbor_elevation - 1);
                }
                *lakes += 1;
            }
            break;
        }

        direction = flow_directions[rng.gen_range(0..flow_directions.len())];
        if !grid.set_outgoing_river(cell, direction) {
            break;
        }
        length += 1;

        if min_neighbor_elevation >= elevation
            && rng.gen_range(0.0..1.0f32) < settings.extra_lake_probability
        {
            grid.set_water_level(cell, elevation);
            grid.set_elevation(cell, elevation - 1);
            *lakes += 1;
        }

        let Some(next) = grid.neighbor(cell, direction) else {
            break;
        };
        cell = next;
    }
    length
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn land() -> LandSettings {
        LandSettings::default()
    }

    /// Склон, понижающийся с запада на восток к морю.
    fn slope() -> HexGrid {
        let mut grid = HexGrid::new(10, 5).unwrap();
        for z in 0..5 {
            for x in 0..10 {
                let i = grid.offset_index(x, z).unwrap();
                grid.set_water_level(i, 3);
                grid.set_elevation(i, (11 - x).min(8));
            }
        }
        grid
    }

    fn wet(grid: &HexGrid) -> Vec<ClimateData> {
        vec![
            ClimateData {
                clouds: 0.0,
                moisture: 1.0,
            };
            grid.cell_count()
        ]
    }

    fn assert_rivers_are_mutual(grid: &HexGrid) {
        for cell in grid.cells() {
            if let Some(d) = cell.outgoing_river() {
                let n = grid.neighbor(cell.index(), d).unwrap();
                assert_eq!(grid.cells()[n].incoming_river(), Some(d.opposite()));
                assert_ne!(grid.cells()[n].outgoing_river(), Some(d.opposite()));
            }
            if let Some(d) = cell.incoming_river() {
                let n = grid.neighbor(cell.index(), d).unwrap();
                assert_eq!(grid.cells()[n].outgoing_river(), Some(d.opposite()));
            }
        }
    }

    #[test]
    fn rivers_flow_downhill_into_the_sea() {
        let mut grid = slope();
        let climate = wet(&grid);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let settings = RiverSettings {
            river_percentage: 30,
            extra_lake_probability: 0.0,
        };
        let report = create_rivers(&mut grid, &mut rng, &climate, &land(), &settings);

        assert!(report.rivers > 0);
        assert!(report.remaining < report.budget);
        assert_rivers_are_mutual(&grid);
        for cell in grid.cells() {
            if let Some(d) = cell.outgoing_river() {
                let n = grid.neighbor(cell.index(), d).unwrap();
                assert!(grid.cells()[n].elevation() <= cell.elevation());
            }
        }
    }

    #[test]
    fn pit_becomes_a_lake() {
        let mut grid = HexGrid::new(10, 10).unwrap();
        for i in 0..grid.cell_count() {
            grid.set_elevation(i, 8);
        }
        let origin = grid.offset_index(4, 4).unwrap();
        let pit = grid.neighbor(origin, HexDirection::E).unwrap();
        grid.set_elevation(origin, 7);
        grid.set_elevation(pit, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut lakes = 0;
        let settings = RiverSettings {
            river_percentage: 10,
            extra_lake_probability: 0.0,
        };

        // Из истока вниз ведёт только ребро в яму, из ямы некуда течь
        let length = create_river(&mut grid, &mut rng, origin, &settings, &mut lakes);
        assert_eq!(length, 2);
        assert_eq!(lakes, 1);
        assert_eq!(grid.cells()[origin].outgoing_river(), Some(HexDirection::E));
        // Уровень воды поднимается до самого низкого соседа (исток)
        assert_eq!(grid.cells()[pit].water_level(), 7);
        assert_eq!(grid.cells()[pit].elevation(), 5);
        assert!(grid.cells()[pit].is_underwater());
        assert_rivers_are_mutual(&grid);
    }

    #[test]
    fn isolated_origin_yields_no_river() {
        let mut grid = HexGrid::new(10, 10).unwrap();
        let origin = grid.offset_index(4, 4).unwrap();
        for (_, n) in grid.neighbors(origin).collect::<Vec<_>>() {
            grid.set_elevation(n, 2);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut lakes = 0;
        let length = create_river(&mut grid, &mut rng, origin, &RiverSettings::default(), &mut lakes);
        assert_eq!(length, 0);
        assert!(!grid.cells()[origin].has_river());
    }

    #[test]
    fn dry_land_has_no_origins() {
        let mut grid = slope();
        let climate = vec![ClimateData::default(); grid.cell_count()];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let report = create_rivers(&mut grid, &mut rng, &climate, &land(), &RiverSettings::default());
        assert_eq!(report.rivers, 0);
        assert_eq!(report.remaining, report.budget);
        assert!(grid.cells().iter().all(|c| !c.has_river()));
    }
}
