// src/config.rs
//! Конфигурация генератора карт
//!
//! Параметры разбиты на группы по стадиям генерации:
//! - форма суши и регионы ([`LandSettings`]),
//! - эрозия ([`ErosionSettings`]),
//! - круговорот влаги ([`ClimateSettings`]),
//! - реки и озёра ([`RiverSettings`]),
//! - температура и биомы ([`BiomeSettings`]).
//!
//! Все структуры сериализуются в TOML/JSON; любое поле можно опустить, тогда берётся значение по умолчанию.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::MapError;
use crate::hex::HexDirection;
use crate::region::layout_regions;

/// Параметры формы суши
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandSettings {
    /// Вероятность того, что соседняя ячейка получит приоритет на 1 хуже (делает края пятен рваными)
    #[serde(default = "default_jitter_probability")]
    pub jitter_probability: f32,

    /// Минимальный размер поднимаемого/опускаемого пятна в ячейках
    #[serde(default = "default_chunk_size_min")]
    pub chunk_size_min: i32,

    /// Максимальный размер пятна (не включительно)
    #[serde(default = "default_chunk_size_max")]
    pub chunk_size_max: i32,

    /// Вероятность подъёма (опускания) сразу на два уровня
    #[serde(default = "default_high_rise_probability")]
    pub high_rise_probability: f32,

    /// Вероятность того, что пятно будет опущено, а не поднято
    #[serde(default = "default_sink_probability")]
    pub sink_probability: f32,

    /// Доля суши в процентах от числа ячеек
    #[serde(default = "default_land_percentage")]
    pub land_percentage: i32,

    #[serde(default = "default_water_level")]
    pub water_level: i32,

    #[serde(default = "default_elevation_minimum")]
    pub elevation_minimum: i32,

    #[serde(default = "default_elevation_maximum")]
    pub elevation_maximum: i32,

    /// Отступ от краёв карты по X, внутри которого суша не зарождается
    #[serde(default = "default_map_border")]
    pub map_border_x: i32,

    #[serde(default = "default_map_border")]
    pub map_border_z: i32,

    /// Зазор между соседними регионами
    #[serde(default = "default_region_border")]
    pub region_border: i32,

    /// Количество регионов (1–4)
    #[serde(default = "default_region_count")]
    pub region_count: u32,
}

fn default_jitter_probability() -> f32 {
    0.25
}
fn default_chunk_size_min() -> i32 {
    30
}
fn default_chunk_size_max() -> i32 {
    100
}
fn default_high_rise_probability() -> f32 {
    0.25
}
fn default_sink_probability() -> f32 {
    0.2
}
fn default_land_percentage() -> i32 {
    50
}
fn default_water_level() -> i32 {
    3
}
fn default_elevation_minimum() -> i32 {
    -2
}
fn default_elevation_maximum() -> i32 {
    8
}
fn default_map_border() -> i32 {
    5
}
fn default_region_border() -> i32 {
    5
}
fn default_region_count() -> u32 {
    1
}

impl Default for LandSettings {
    fn default() -> Self {
        Self {
            jitter_probability: 0.25,
            chunk_size_min: 30,
            chunk_size_max: 100,
            high_rise_probability: 0.25,
            sink_probability: 0.2,
            land_percentage: 50,
            water_level: 3,
            elevation_minimum: -2,
            elevation_maximum: 8,
            map_border_x: 5,
            map_border_z: 5,
            region_border: 5,
            region_count: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErosionSettings {
    /// Какую долю «размываемых» ячеек сгладить (0–100)
    #[serde(default = "default_erosion_percentage")]
    pub erosion_percentage: i32,
}

fn default_erosion_percentage() -> i32 {
    50
}

impl Default for ErosionSettings {
    fn default() -> Self {
        Self {
            erosion_percentage: 50,
        }
    }
}

/// Параметры круговорота влаги
///
/// Все коэффициенты лежат в `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateSettings {
    /// Доля влаги, испаряющейся в облака за цикл
    #[serde(default = "default_evaporation_factor")]
    pub evaporation_factor: f32,

    /// Доля облаков, выпадающих осадками
    #[serde(default = "default_precipitation_factor")]
    pub precipitation_factor: f32,

    /// Сток влаги вниз по склону
    #[serde(default = "default_runoff_factor")]
    pub runoff_factor: f32,

    /// Просачивание влаги на соседей той же высоты
    #[serde(default = "default_seepage_factor")]
    pub seepage_factor: f32,

    /// Откуда дует ветер
    #[serde(default = "default_wind_direction")]
    pub wind_direction: HexDirection,

    /// Во сколько раз больше облаков уходит по ветру (1 — безветрие)
    #[serde(default = "default_wind_strength")]
    pub wind_strength: f32,

    #[serde(default = "default_starting_moisture")]
    pub starting_moisture: f32,
}

fn default_evaporation_factor() -> f32 {
    0.5
}
fn default_precipitation_factor() -> f32 {
    0.25
}
fn default_runoff_factor() -> f32 {
    0.25
}
fn default_seepage_factor() -> f32 {
    0.125
}
fn default_wind_direction() -> HexDirection {
    HexDirection::NW
}
fn default_wind_strength() -> f32 {
    4.0
}
fn default_starting_moisture() -> f32 {
    0.1
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            evaporation_factor: 0.5,
            precipitation_factor: 0.25,
            runoff_factor: 0.25,
            seepage_factor: 0.125,
            wind_direction: HexDirection::NW,
            wind_strength: 4.0,
            starting_moisture: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiverSettings {
    /// Суммарная длина рек в процентах от числа ячеек суши
    #[serde(default = "default_river_percentage")]
    pub river_percentage: i32,

    /// Вероятность образования дополнительного озера в локальном минимуме
    #[serde(default = "default_extra_lake_probability")]
    pub extra_lake_probability: f32,
}

fn default_river_percentage() -> i32 {
    10
}
fn default_extra_lake_probability() -> f32 {
    0.25
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            river_percentage: 10,
            extra_lake_probability: 0.25,
        }
    }
}

/// Какие полушария изображает карта
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum HemisphereMode {
    /// Экватор посередине, полюса сверху и снизу
    #[default]
    Both,
    /// Экватор снизу
    North,
    /// Экватор сверху
    South,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiomeSettings {
    /// Температура у полюса
    #[serde(default = "default_low_temperature")]
    pub low_temperature: f32,

    /// Температура на экваторе
    #[serde(default = "default_high_temperature")]
    pub high_temperature: f32,

    #[serde(default)]
    pub hemisphere: HemisphereMode,

    /// Амплитуда случайного отклонения температуры
    #[serde(default = "default_temperature_jitter")]
    pub temperature_jitter: f32,
}

fn default_low_temperature() -> f32 {
    0.0
}
fn default_high_temperature() -> f32 {
    1.0
}
fn default_temperature_jitter() -> f32 {
    0.1
}

impl Default for BiomeSettings {
    fn default() -> Self {
        Self {
            low_temperature: 0.0,
            high_temperature: 1.0,
            hemisphere: HemisphereMode::Both,
            temperature_jitter: 0.1,
        }
    }
}

/// Полный набор параметров генератора
///
/// Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorSettings {
    /// Использовать `seed` как есть; иначе сид выбирается случайно при каждом запуске
    #[serde(default)]
    pub use_fixed_seed: bool,

    #[serde(default)]
    pub seed: u64,

    /// Ширина карты в ячейках (кратна 5)
    #[serde(default = "default_width")]
    pub width: i32,

    /// Высота карты в ячейках (кратна 5)
    #[serde(default = "default_height")]
    pub height: i32,

    /// Свернуть карту в цилиндр: западный и восточный края становятся соседями
    #[serde(default)]
    pub wrapping: bool,

    #[serde(default)]
    pub land: LandSettings,

    #[serde(default)]
    pub erosion: ErosionSettings,

    #[serde(default)]
    pub climate: ClimateSettings,

    #[serde(default)]
    pub rivers: RiverSettings,

    #[serde(default)]
    pub biome: BiomeSettings,
}

fn default_width() -> i32 {
    20
}
fn default_height() -> i32 {
    15
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            use_fixed_seed: false,
            seed: 0,
            width: 20,
            height: 15,
            wrapping: false,
            land: LandSettings::default(),
            erosion: ErosionSettings::default(),
            climate: ClimateSettings::default(),
            rivers: RiverSettings::default(),
            biome: BiomeSettings::default(),
        }
    }
}

impl GeneratorSettings {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # map.toml
    /// use_fixed_seed = true
    /// seed = 42
    /// width = 40
    ///
    /// [land]
    /// land_percentage = 35
    /// region_count = 2
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let contents = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&contents)?;
        Ok(settings)
    }

    /// Проверяет, что с этими параметрами можно построить карту `width × height`.
    pub fn validate(&self, width: i32, height: i32) -> Result<(), MapError> {
        let land = &self.land;
        if !(1..=4).contains(&land.region_count) {
            return Err(invalid(format!(
                "количество регионов {} вне диапазона 1–4",
                land.region_count
            )));
        }
        if land.elevation_minimum > land.elevation_maximum {
            return Err(invalid(format!(
                "минимальная высота {} больше максимальной {}",
                land.elevation_minimum, land.elevation_maximum
            )));
        }
        if land.water_level < land.elevation_minimum || land.water_level >= land.elevation_maximum {
            return Err(invalid(format!(
                "уровень воды {} вне диапазона высот [{}, {})",
                land.water_level, land.elevation_minimum, land.elevation_maximum
            )));
        }
        if land.chunk_size_min < 1 || land.chunk_size_min >= land.chunk_size_max {
            return Err(invalid(format!(
                "недопустимый размер пятна суши {}..{}",
                land.chunk_size_min, land.chunk_size_max
            )));
        }
        if !(0..=100).contains(&land.land_percentage)
            || !(0..=100).contains(&self.erosion.erosion_percentage)
            || !(0..=100).contains(&self.rivers.river_percentage)
        {
            return Err(invalid("проценты должны лежать в диапазоне 0–100".into()));
        }
        if land.map_border_x < 0 || land.map_border_z < 0 || land.region_border < 0 {
            return Err(invalid("отступы не могут быть отрицательными".into()));
        }
        if self.climate.wind_strength < 1.0 {
            return Err(invalid(format!(
                "сила ветра {} меньше 1",
                self.climate.wind_strength
            )));
        }

        // При двух регионах направление разреза выбирается случайно: проверяем оба
        let layouts = [
            layout_regions(width, height, land, true),
            layout_regions(width, height, land, false),
        ];
        for region in layouts.iter().flatten() {
            if region.is_empty() {
                return Err(invalid(format!(
                    "регион {region:?} пуст: уменьшите отступы или число регионов"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> MapError {
    MapError::InvalidSettings(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings: GeneratorSettings = toml::from_str(
            r#"
            seed = 7
            [land]
            land_percentage = 30
            [climate]
            wind_direction = "E"
            "#,
        )
        .unwrap();
        assert_eq!(settings.seed, 7);
        assert!(!settings.use_fixed_seed);
        assert_eq!(settings.land.land_percentage, 30);
        assert_eq!(settings.land.water_level, 3);
        assert_eq!(settings.climate.wind_direction, HexDirection::E);
        assert_eq!(settings.biome, BiomeSettings::default());
        assert_eq!((settings.width, settings.height), (20, 15));
    }

    #[test]
    fn defaults_are_valid_for_default_size() {
        let settings = GeneratorSettings::default();
        assert!(settings.validate(20, 15).is_ok());
    }

    #[test]
    fn rejects_empty_regions_and_bad_ranges() {
        let mut settings = GeneratorSettings::default();
        settings.land.region_count = 4;
        assert!(settings.validate(20, 15).is_err());

        let mut settings = GeneratorSettings::default();
        settings.land.elevation_maximum = -3;
        assert!(matches!(
            settings.validate(20, 15),
            Err(MapError::InvalidSettings(_))
        ));

        let mut settings = GeneratorSettings::default();
        settings.land.region_count = 0;
        assert!(settings.validate(20, 15).is_err());
    }
}
