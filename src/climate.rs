//! Круговорот влаги: испарение, облака, осадки, ветер, сток и просачивание.
//!
//! Симуляция идёт на двух буферах: ячейка читает своё состояние из текущего
//! буфера, а свою долю и доли соседей пишет только в следующий. После цикла
//! буферы меняются местами.

use serde::Serialize;

use crate::config::ClimateSettings;
use crate::grid::HexGrid;

/// Число циклов симуляции.
pub const CLIMATE_CYCLES: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClimateData {
    pub clouds: f32,
    pub moisture: f32,
}

/// Прогоняет [`CLIMATE_CYCLES`] циклов и возвращает влажность и облачность каждой ячейки.
///
/// Все значения результата лежат в `[0, 1]`.
#[must_use]
pub fn simulate_climate(
    grid: &HexGrid,
    settings: &ClimateSettings,
    elevation_maximum: i32,
) -> Vec<ClimateData> {
    let initial = ClimateData {
        clouds: 0.0,
        moisture: settings.starting_moisture,
    };
    let mut current = vec![initial; grid.cell_count()];
    let mut next = vec![ClimateData::default(); grid.cell_count()];

    for _ in 0..CLIMATE_CYCLES {
        for cell in 0..grid.cell_count() {
            evolve_climate(grid, settings, elevation_maximum, cell, current[cell], &mut next);
        }
        for data in &mut next {
            data.clouds = data.clouds.clamp(0.0, 1.0);
            data.moisture = data.moisture.clamp(0.0, 1.0);
        }
        std::mem::swap(&mut current, &mut next);
        next.fill(ClimateData::default());
    }

    let mean = current.iter().map(|c| c.moisture).sum::<f32>() / current.len().max(1) as f32;
    log::debug!("климат: средняя влажность {mean:.3}");
    current
}

fn evolve_climate(
    grid: &HexGrid,
    settings: &ClimateSettings,
    elevation_maximum: i32,
    index: usize,
    mut climate: ClimateData,
    next: &mut [ClimateData],
) {
    let cell = &grid.cells()[index];

    if cell.is_underwater() {
        climate.moisture = 1.0;
        climate.clouds += settings.evaporation_factor;
    } else {
        let evaporation = climate.moisture * settings.evaporation_factor;
        climate.moisture -= evaporation;
        climate.clouds += evaporation;
    }

    let precipitation = climate.clouds * settings.precipitation_factor;
    climate.clouds -= precipitation;
    climate.moisture += precipitation;

    // Над высокими ячейками облакам тесно: излишек выпадает
    let cloud_maximum = 1.0 - cell.view_elevation() as f32 / (elevation_maximum as f32 + 1.0);
    if climate.clouds > cloud_maximum {
        climate.moisture += climate.clouds - cloud_maximum;
        climate.clouds = cloud_maximum;
    }

    let main_dispersal_direction = settings.wind_direction.opposite();
    let cloud_dispersal = climate.clouds * (1.0 / (5.0 + settings.wind_strength));
    let runoff = climate.moisture * settings.runoff_factor * (1.0 / 6.0);
    let seepage = climate.moisture * settings.seepage_factor * (1.0 / 6.0);

    for (direction, neighbor) in grid.neighbors(index) {
        let neighbor_climate = &mut next[neighbor];
        if direction == main_dispersal_direction {
            neighbor_climate.clouds += cloud_dispersal * settings.wind_strength;
        } else {
            neighbor_climate.clouds += cloud_dispersal;
        }

        let elevation_delta = grid.cells()[neighbor].view_elevation() - cell.view_elevation();
        if elevation_delta < 0 {
            climate.moisture -= runoff;
            neighbor_climate.moisture += runoff;
        } else if elevation_delta == 0 {
            climate.moisture -= seepage;
            neighbor_climate.moisture += seepage;
        }
    }

    next[index].moisture += climate.moisture;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn island() -> HexGrid {
        let mut grid = HexGrid::new(15, 15).unwrap();
        for i in 0..grid.cell_count() {
            grid.set_water_level(i, 3);
        }
        for z in 4..11 {
            for x in 4..11 {
                let i = grid.offset_index(x, z).unwrap();
                grid.set_elevation(i, 3 + (x - 4).min(10 - x).min(z - 4).min(10 - z));
            }
        }
        grid
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let grid = island();
        let climate = simulate_climate(&grid, &ClimateSettings::default(), 8);
        assert_eq!(climate.len(), grid.cell_count());
        for data in &climate {
            assert!((0.0..=1.0).contains(&data.moisture), "{data:?}");
            assert!((0.0..=1.0).contains(&data.clouds), "{data:?}");
        }
    }

    #[test]
    fn water_cells_end_saturated_and_land_gets_rain() {
        let grid = island();
        let climate = simulate_climate(&grid, &ClimateSettings::default(), 8);
        let sea = grid.offset_index(1, 1).unwrap();
        let shore = grid.offset_index(4, 7).unwrap();
        assert!(climate[sea].moisture > 0.99);
        assert!(climate[shore].moisture > 0.0);
    }

    #[test]
    fn dry_start_without_water_stays_dry() {
        let grid = HexGrid::new(10, 10).unwrap();
        let settings = ClimateSettings {
            starting_moisture: 0.0,
            ..ClimateSettings::default()
        };
        let climate = simulate_climate(&grid, &settings, 8);
        assert!(climate.iter().all(|c| c.moisture == 0.0 && c.clouds == 0.0));
    }
}
