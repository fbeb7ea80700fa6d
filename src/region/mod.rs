//! Разбиение карты на регионы, в которых зарождается суша.

use rand::Rng;

use crate::config::LandSettings;
use crate::grid::HexGrid;

/// Прямоугольник в координатах смещения: `x ∈ [x_min, x_max)`, `z ∈ [z_min, z_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRegion {
    pub x_min: i32,
    pub x_max: i32,
    pub z_min: i32,
    pub z_max: i32,
}

impl MapRegion {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x_min >= self.x_max || self.z_min >= self.z_max
    }

    #[must_use]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        (self.x_min..self.x_max).contains(&x) && (self.z_min..self.z_max).contains(&z)
    }

    /// Случайная ячейка внутри региона. `None` для пустого региона.
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R, grid: &HexGrid) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let x = rng.gen_range(self.x_min..self.x_max);
        let z = rng.gen_range(self.z_min..self.z_max);
        grid.offset_index(x, z)
    }
}

/// Раскладка регионов без случайности.
///
/// `split_along_x` имеет значение только для двух регионов: `true` делит карту
/// на левую и правую половины, `false` на нижнюю и верхнюю.
#[must_use]
pub fn layout_regions(
    width: i32,
    height: i32,
    land: &LandSettings,
    split_along_x: bool,
) -> Vec<MapRegion> {
    let bx = land.map_border_x;
    let bz = land.map_border_z;
    let gap = land.region_border;
    let full = MapRegion {
        x_min: bx,
        x_max: width - bx,
        z_min: bz,
        z_max: height - bz,
    };

    match land.region_count {
        2 if split_along_x => vec![
            MapRegion {
                x_max: width / 2 - gap,
                ..full
            },
            MapRegion {
                x_min: width / 2 + gap,
                ..full
            },
        ],
        2 => vec![
            MapRegion {
                z_max: height / 2 - gap,
                ..full
            },
            MapRegion {
                z_min: height / 2 + gap,
                ..full
            },
        ],
        3 => vec![
            MapRegion {
                x_max: width / 3 - gap,
                ..full
            },
            MapRegion {
                x_min: width / 3 + gap,
                x_max: width * 2 / 3 - gap,
                ..full
            },
            MapRegion {
                x_min: width * 2 / 3 + gap,
                ..full
            },
        ],
        4 => {
            let left = width / 2 - gap;
            let right = width / 2 + gap;
            let bottom = height / 2 - gap;
            let top = height / 2 + gap;
            vec![
                MapRegion {
                    x_max: left,
                    z_max: bottom,
                    ..full
                },
                MapRegion {
                    x_min: right,
                    z_max: bottom,
                    ..full
                },
                MapRegion {
                    x_min: right,
                    z_min: top,
                    ..full
                },
                MapRegion {
                    x_max: left,
                    z_min: top,
                    ..full
                },
            ]
        }
        _ => vec![full],
    }
}

/// Делит карту на 1–4 региона; при двух регионах направление разреза выбирается случайно.
pub fn create_regions<R: Rng + ?Sized>(
    rng: &mut R,
    width: i32,
    height: i32,
    land: &LandSettings,
) -> Vec<MapRegion> {
    let split_along_x = land.region_count == 2 && rng.gen_range(0.0..1.0f32) < 0.5;
    let regions = layout_regions(width, height, land, split_along_x);
    log::debug!("регионы: {regions:?}");
    regions
}
