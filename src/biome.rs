//! Температура и биомы.
//!
//! Суша классифицируется по таблице 4×4 «полоса температуры × полоса влажности»,
//! дающей тип местности и плотность растительности. Затопленные ячейки получают тип
//! по правилу береговой линии.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::climate::ClimateData;
use crate::config::{BiomeSettings, HemisphereMode, LandSettings};
use crate::grid::{HexCell, HexGrid};
use crate::hex::HexDirection;

/// Тип местности, хранящийся в `terrain_type_index` ячейки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainType {
    Sand = 0,
    Grass = 1,
    Mud = 2,
    Stone = 3,
    Snow = 4,
}

impl TerrainType {
    pub const COUNT: usize = 5;

    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(TerrainType::Sand),
            1 => Some(TerrainType::Grass),
            2 => Some(TerrainType::Mud),
            3 => Some(TerrainType::Stone),
            4 => Some(TerrainType::Snow),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            TerrainType::Sand => [222, 200, 140],
            TerrainType::Grass => [110, 170, 70],
            TerrainType::Mud => [120, 95, 70],
            TerrainType::Stone => [140, 140, 140],
            TerrainType::Snow => [235, 240, 250],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Biome {
    terrain: TerrainType,
    plant: u8,
}

const fn biome(terrain: TerrainType, plant: u8) -> Biome {
    Biome { terrain, plant }
}

/// Верхние границы полос температуры (последняя полоса открыта сверху)
pub const TEMPERATURE_BANDS: [f32; 3] = [0.1, 0.3, 0.6];
pub const MOISTURE_BANDS: [f32; 3] = [0.12, 0.28, 0.85];

/// Строки: температура от холодной к жаркой, столбцы: влажность от сухой к влажной.
#[rustfmt::skip]
const BIOMES: [Biome; 16] = {
    use TerrainType::{Grass, Mud, Sand, Snow};
    [
        biome(Sand, 0), biome(Snow, 0), biome(Snow, 0), biome(Snow, 0),
        biome(Sand, 0), biome(Mud, 0), biome(Mud, 1), biome(Mud, 2),
        biome(Sand, 0), biome(Grass, 0), biome(Grass, 1), biome(Grass, 2),
        biome(Sand, 0), biome(Grass, 1), biome(Grass, 2), biome(Grass, 3),
    ]
};

const MAX_PLANT_LEVEL: u8 = 3;

fn band(value: f32, bands: &[f32; 3]) -> usize {
    bands.iter().position(|&b| value < b).unwrap_or(bands.len())
}

/// Параметры температурной модели одной генерации.
pub struct TemperatureModel<'a> {
    settings: &'a BiomeSettings,
    water_level: i32,
    elevation_maximum: i32,
    grid_height: f32,
    noise: FastNoiseLite,
}

impl<'a> TemperatureModel<'a> {
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        grid: &HexGrid,
        settings: &'a BiomeSettings,
        land: &LandSettings,
    ) -> Self {
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(rng.gen_range(0..i32::MAX)));
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(0.1));
        Self {
            settings,
            water_level: land.water_level,
            elevation_maximum: land.elevation_maximum,
            grid_height: grid.height() as f32,
            noise,
        }
    }

    /// Широта ячейки в `[0, 1]`, где 1 — экватор.
    #[must_use]
    pub fn latitude(&self, cell: &HexCell) -> f32 {
        let latitude = cell.coordinates().z() as f32 / self.grid_height;
        match self.settings.hemisphere {
            HemisphereMode::Both => {
                let doubled = latitude * 2.0;
                if doubled > 1.0 { 2.0 - doubled } else { doubled }
            }
            HemisphereMode::North => 1.0 - latitude,
            HemisphereMode::South => latitude,
        }
    }

    /// Температура без случайной добавки: широтный градиент, ослабленный высотой над водой.
    #[must_use]
    pub fn base_temperature(&self, cell: &HexCell) -> f32 {
        let s = self.settings;
        let latitude = self.latitude(cell);
        let temperature = s.low_temperature + (s.high_temperature - s.low_temperature) * latitude;
        let height_above_water = (cell.view_elevation() - self.water_level) as f32;
        temperature * (1.0 - height_above_water / (self.elevation_maximum - self.water_level + 1) as f32)
    }

    #[must_use]
    pub fn temperature(&self, cell: &HexCell) -> f32 {
        let (x, z) = cell.coordinates().to_offset();
        // Центр шестиугольника: нечётные строки сдвинуты на половину ячейки
        let px = x as f32 + if z & 1 == 1 { 0.5 } else { 0.0 };
        let pz = z as f32 * 0.866;
        let jitter = self.noise.get_noise_2d(px, pz);
        self.base_temperature(cell) + jitter * self.settings.temperature_jitter
    }
}

/// Назначает тип местности и растительность всем ячейкам.
///
/// Возвращает количество ячеек каждого типа (индекс — [`TerrainType`]).
pub fn assign_biomes<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    rng: &mut R,
    climate: &[ClimateData],
    land: &LandSettings,
    settings: &BiomeSettings,
) -> [usize; TerrainType::COUNT] {
    let model = TemperatureModel::new(rng, grid, settings, land);

    #[cfg(feature = "parallel")]
    let temperatures: Vec<f32> = grid.cells().par_iter().map(|c| model.temperature(c)).collect();
    #[cfg(not(feature = "parallel"))]
    let temperatures: Vec<f32> = grid.cells().iter().map(|c| model.temperature(c)).collect();

    let rock_desert_elevation =
        land.elevation_maximum - (land.elevation_maximum - land.water_level) / 2;
    let mut counts = [0; TerrainType::COUNT];

    for index in 0..grid.cell_count() {
        let temperature = temperatures[index];
        let cell = &grid.cells()[index];

        let terrain = if cell.is_underwater() {
            underwater_terrain(grid, index, land.water_level, temperature)
        } else {
            let t = band(temperature, &TEMPERATURE_BANDS);
            let m = band(climate[index].moisture, &MOISTURE_BANDS);
            let mut biome = BIOMES[t * 4 + m];

            if biome.terrain == TerrainType::Sand {
                if cell.elevation() >= rock_desert_elevation {
                    biome.terrain = TerrainType::Stone;
                }
            } else if cell.elevation() == land.elevation_maximum {
                biome.terrain = TerrainType::Snow;
            }

            if biome.terrain == TerrainType::Snow {
                biome.plant = 0;
            } else if biome.plant < MAX_PLANT_LEVEL && cell.has_river() {
                biome.plant += 1;
            }
            grid.set_plant_level(index, biome.plant);
            biome.terrain
        };

        grid.set_terrain_type_index(index, terrain as u8);
        counts[terrain as usize] += 1;
    }

    log::debug!("биомы: {counts:?}");
    counts
}

/// Дно у береговой линии зависит от того, насколько круты соседние берега.
fn underwater_terrain(grid: &HexGrid, index: usize, water_level: i32, temperature: f32) -> TerrainType {
    let cell = &grid.cells()[index];
    let terrain = if cell.elevation() == water_level - 1 {
        let mut cliffs = 0;
        let mut slopes = 0;
        for d in HexDirection::ALL {
            let Some(n) = grid.neighbor(index, d) else {
                continue;
            };
            let delta = grid.cells()[n].elevation() - cell.water_level();
            if delta == 0 {
                slopes += 1;
            } else if delta > 0 {
                cliffs += 1;
            }
        }
        if cliffs + slopes > 3 {
            TerrainType::Grass
        } else if cliffs > 0 {
            TerrainType::Stone
        } else if slopes > 0 {
            TerrainType::Sand
        } else {
            TerrainType::Grass
        }
    } else if cell.elevation() >= water_level {
        TerrainType::Grass
    } else if cell.elevation() < 0 {
        TerrainType::Stone
    } else {
        TerrainType::Mud
    };

    if terrain == TerrainType::Grass && temperature < TEMPERATURE_BANDS[0] {
        TerrainType::Mud
    } else {
        terrain
    }
}
