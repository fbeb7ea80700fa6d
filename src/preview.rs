//! Отладочное изображение карты: по кругу на ячейку и отрезки рек.

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::biome::TerrainType;
use crate::error::MapError;
use crate::grid::{HexCell, HexGrid};

const BACKGROUND: Rgb<u8> = Rgb([20, 20, 30]);
const RIVER: Rgb<u8> = Rgb([40, 110, 230]);

/// Центр ячейки на изображении; строки растут снизу вверх, как `z`.
fn cell_center(grid: &HexGrid, cell: &HexCell, cell_size: u32) -> (f32, f32) {
    let (x, z) = cell.coordinates().to_offset();
    let size = cell_size as f32;
    let shift = if z & 1 == 1 { 0.5 } else { 0.0 };
    let px = (x as f32 + shift + 0.5) * size;
    let row = grid.height() as i32 - 1 - z;
    let py = (row as f32 + 0.5) * size * 0.866 + size * 0.067;
    (px, py)
}

fn cell_color(cell: &HexCell) -> Rgb<u8> {
    if cell.is_underwater() {
        // Чем глубже, тем темнее
        let depth = (cell.water_level() - cell.elevation()).clamp(1, 6) as u8;
        return Rgb([20, 60u8.saturating_add(60 / depth), 120 + 120 / depth]);
    }
    let base = TerrainType::from_index(cell.terrain_type_index())
        .map_or([255, 0, 255], TerrainType::to_rgb);
    let shade = 0.7 + 0.05 * cell.elevation().clamp(0, 6) as f32;
    Rgb(base.map(|c| (f32::from(c) * shade).min(255.0) as u8))
}

/// Рисует карту в памяти. `cell_size` — расстояние между центрами соседних ячеек в пикселях.
#[must_use]
pub fn render_preview(grid: &HexGrid, cell_size: u32) -> RgbImage {
    let cell_size = cell_size.max(2);
    let width = (grid.width() * cell_size) + cell_size / 2;
    let height = ((grid.height() * cell_size) as f32 * 0.866) as u32 + cell_size / 2;
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let radius = (cell_size / 2) as i32;

    for cell in grid.cells() {
        let (px, py) = cell_center(grid, cell, cell_size);
        draw_filled_circle_mut(&mut image, (px as i32, py as i32), radius, cell_color(cell));
    }

    for cell in grid.cells() {
        let Some(direction) = cell.outgoing_river() else {
            continue;
        };
        let Some(neighbor) = grid.neighbor(cell.index(), direction) else {
            continue;
        };
        let from = cell_center(grid, cell, cell_size);
        let to = cell_center(grid, &grid.cells()[neighbor], cell_size);
        // Река через шов свёрнутой карты пересекла бы всё изображение
        if (to.0 - from.0).abs() > cell_size as f32 * 1.5 {
            continue;
        }
        draw_line_segment_mut(&mut image, from, to, RIVER);
    }
    image
}

pub fn save_preview(grid: &HexGrid, cell_size: u32, path: impl AsRef<Path>) -> Result<(), MapError> {
    render_preview(grid, cell_size).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexDirection;

    #[test]
    fn image_covers_the_grid() {
        let grid = HexGrid::new(10, 5).unwrap();
        let image = render_preview(&grid, 8);
        assert_eq!(image.width(), 84);
        for cell in grid.cells() {
            let (px, py) = cell_center(&grid, cell, 8);
            assert!(px < image.width() as f32 && py < image.height() as f32);
        }
    }

    #[test]
    fn rivers_are_drawn() {
        let mut grid = HexGrid::new(10, 5).unwrap();
        let a = grid.offset_index(3, 2).unwrap();
        assert!(grid.set_outgoing_river(a, HexDirection::E));
        let image = render_preview(&grid, 10);
        let (ax, ay) = cell_center(&grid, &grid.cells()[a], 10);
        // Середина отрезка между центрами соседей
        let pixel = image.get_pixel((ax + 5.0) as u32, ay as u32);
        assert_eq!(*pixel, RIVER);
    }
}
