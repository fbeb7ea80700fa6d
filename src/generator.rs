//! Конвейер генерации карты
//!
//! Стадии выполняются строго по порядку на одном генераторе случайных чисел:
//! 1. выбор сида и затопление карты до уровня воды;
//! 2. регионы;
//! 3. суша под бюджет;
//! 4. эрозия;
//! 5. круговорот влаги;
//! 6. реки и озёра;
//! 7. биомы.
//!
//! Генератор случайных чисел принадлежит одному вызову [`MapGenerator::generate`],
//! поэтому генерация не затрагивает никакое внешнее случайное состояние.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::biome::{TerrainType, assign_biomes};
use crate::climate::simulate_climate;
use crate::config::GeneratorSettings;
use crate::erosion::{ErosionReport, erode_land};
use crate::error::MapError;
use crate::grid::HexGrid;
use crate::land::{LandReport, create_land};
use crate::region::create_regions;
use crate::rivers::{RiverReport, create_rivers};

/// Итоги одной генерации.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    /// Сид, с которым карта была построена; с ним её можно воспроизвести
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    pub wrapping: bool,
    pub regions: usize,
    pub land: LandReport,
    pub erosion: ErosionReport,
    pub rivers: RiverReport,
    /// Число ячеек каждого типа местности
    pub terrain: [usize; TerrainType::COUNT],
    /// Ячеек не ниже уровня воды
    pub land_cells: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MapGenerator {
    settings: GeneratorSettings,
}

impl MapGenerator {
    #[must_use]
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Строит новую карту `width × height`.
    ///
    /// При `use_fixed_seed` два вызова с одинаковыми параметрами дают одинаковые карты.
    pub fn generate(&self, width: i32, height: i32) -> Result<(HexGrid, GenerationReport), MapError> {
        let settings = &self.settings;
        settings.validate(width, height)?;
        let mut grid = HexGrid::with_wrapping(width, height, settings.wrapping)?;

        let seed = self.resolve_seed();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        log::debug!("генерация {width}×{height}, сид {seed}");

        for i in 0..grid.cell_count() {
            grid.set_water_level(i, settings.land.water_level);
        }

        let regions = create_regions(&mut rng, width, height, &settings.land);
        let land = create_land(&mut grid, &mut rng, &regions, &settings.land)?;
        let erosion = erode_land(&mut grid, &mut rng, &settings.erosion);
        let climate = simulate_climate(&grid, &settings.climate, settings.land.elevation_maximum);
        let rivers = create_rivers(
            &mut grid,
            &mut rng,
            &climate,
            &settings.land,
            &settings.rivers,
        );
        let terrain = assign_biomes(
            &mut grid,
            &mut rng,
            &climate,
            &settings.land,
            &settings.biome,
        );

        let land_cells = grid.cells().iter().filter(|c| !c.is_underwater()).count();
        let report = GenerationReport {
            seed,
            width,
            height,
            wrapping: settings.wrapping,
            regions: regions.len(),
            land,
            erosion,
            rivers,
            terrain,
            land_cells,
        };
        log::info!(
            "карта {width}×{height} построена (сид {seed}): суша {land_cells} ячеек, рек {}, озёр {}",
            report.rivers.rivers,
            report.rivers.lakes
        );
        Ok((grid, report))
    }

    /// Фиксированный сид из настроек или новый случайный в диапазоне `0..2^31`.
    fn resolve_seed(&self) -> u64 {
        if self.settings.use_fixed_seed {
            return self.settings.seed;
        }
        let clock = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64);
        let drawn: u64 = rand::thread_rng().gen_range(0..u64::from(u32::MAX >> 1));
        (drawn ^ clock) & u64::from(u32::MAX >> 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(seed: u64) -> GeneratorSettings {
        GeneratorSettings {
            use_fixed_seed: true,
            seed,
            ..GeneratorSettings::default()
        }
    }

    #[test]
    fn fixed_seed_is_reported() {
        let (_, report) = MapGenerator::new(fixed(77)).generate(20, 15).unwrap();
        assert_eq!(report.seed, 77);
        assert_eq!(report.terrain.iter().sum::<usize>(), 300);
    }

    #[test]
    fn random_seeds_fit_in_31_bits() {
        let generator = MapGenerator::default();
        for _ in 0..20 {
            assert!(generator.resolve_seed() < 1 << 31);
        }
    }

    #[test]
    fn invalid_inputs_are_rejected_before_generation() {
        let generator = MapGenerator::new(fixed(1));
        assert!(matches!(
            generator.generate(21, 15),
            Err(MapError::UnsupportedSize { .. })
        ));

        let mut settings = fixed(1);
        settings.land.region_count = 4;
        assert!(matches!(
            MapGenerator::new(settings).generate(20, 15),
            Err(MapError::InvalidSettings(_))
        ));
    }

    #[test]
    fn wrapping_setting_reaches_the_grid() {
        let settings = GeneratorSettings {
            wrapping: true,
            ..fixed(12)
        };
        let (grid, report) = MapGenerator::new(settings).generate(20, 15).unwrap();
        assert!(grid.is_wrapping());
        assert!(report.wrapping);
        let east = grid.offset_index(19, 7).unwrap();
        assert_eq!(grid.neighbor(east, crate::hex::HexDirection::E), grid.offset_index(0, 7));
    }

    #[test]
    fn generated_grid_accepts_searches() {
        let (mut grid, _) = MapGenerator::new(fixed(5)).generate(20, 15).unwrap();
        assert!(grid.begin_search().is_ok());
    }
}
