//! Побайтовое представление ячеек для внешнего сериализатора карт.
//!
//! На ячейку приходится [`CELL_RECORD_LEN`] байт: тип местности, высота, уровень воды,
//! уровни застройки/ферм/растительности, особый объект, признак стены, входящая река
//! (`0` — нет, иначе `direction + 128`), исходящая река так же, битовая маска дорог.
//! Высота и уровень воды пишутся как знаковый байт.

use crate::error::MapError;
use crate::grid::{HexCell, HexGrid};
use crate::hex::HexDirection;

pub const CELL_RECORD_LEN: usize = 11;

const RIVER_FLAG: u8 = 128;

fn encode_river(river: Option<HexDirection>) -> u8 {
    river.map_or(0, |d| d.index() as u8 + RIVER_FLAG)
}

fn decode_river(byte: u8, index: usize) -> Result<Option<HexDirection>, MapError> {
    if byte == 0 {
        return Ok(None);
    }
    byte.checked_sub(RIVER_FLAG)
        .and_then(|d| HexDirection::from_index(d as usize))
        .map(Some)
        .ok_or(MapError::CorruptCellData {
            index,
            reason: "недопустимое направление реки",
        })
}

impl HexCell {
    pub fn write_record(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[
            self.terrain_type_index,
            self.elevation as i8 as u8,
            self.water_level as i8 as u8,
            self.urban_level,
            self.farm_level,
            self.plant_level,
            self.special_index,
            u8::from(self.walled),
            encode_river(self.incoming_river),
            encode_river(self.outgoing_river),
            self.road_flags(),
        ]);
    }
}

impl HexGrid {
    /// Сериализует все ячейки подряд в порядке индексов.
    #[must_use]
    pub fn to_cell_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.cell_count() * CELL_RECORD_LEN);
        for cell in self.cells() {
            cell.write_record(&mut out);
        }
        out
    }

    /// Загружает ячейки из байтов, записанных [`HexGrid::to_cell_bytes`] для карты того же размера.
    ///
    /// Реки и дороги восстанавливаются как есть, без повторной проверки допустимости.
    pub fn load_cell_bytes(&mut self, bytes: &[u8]) -> Result<(), MapError> {
        if bytes.len() != self.cell_count() * CELL_RECORD_LEN {
            return Err(MapError::CorruptCellData {
                index: bytes.len() / CELL_RECORD_LEN,
                reason: "длина данных не совпадает с размером карты",
            });
        }

        for (index, record) in bytes.chunks_exact(CELL_RECORD_LEN).enumerate() {
            let incoming = decode_river(record[8], index)?;
            let outgoing = decode_river(record[9], index)?;
            let roads = record[10];

            let cell = self.cell_mut(index);
            cell.terrain_type_index = record[0];
            cell.elevation = i32::from(record[1] as i8);
            cell.water_level = i32::from(record[2] as i8);
            cell.urban_level = record[3];
            cell.farm_level = record[4];
            cell.plant_level = record[5];
            cell.special_index = record[6];
            cell.walled = record[7] != 0;
            cell.incoming_river = incoming;
            cell.outgoing_river = outgoing;
            for d in HexDirection::ALL {
                cell.roads[d.index()] = roads & (1 << d.index()) != 0;
            }
            self.mark_dirty(index);
        }
        Ok(())
    }
}
