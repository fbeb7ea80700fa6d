use serde::{Deserialize, Serialize};

/// Направление к одному из шести соседей.
///
/// Порядок совпадает с порядком обхода вершин шестиугольника и с кодировкой
/// направлений рек в сохранённых данных (`direction + 128`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HexDirection {
    E = 0,
    SE = 1,
    SW = 2,
    W = 3,
    NW = 4,
    NE = 5,
}

impl HexDirection {
    /// Все направления в порядке индексов.
    pub const ALL: [HexDirection; 6] = [
        HexDirection::E,
        HexDirection::SE,
        HexDirection::SW,
        HexDirection::W,
        HexDirection::NW,
        HexDirection::NE,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        self.rotate(3)
    }

    #[must_use]
    pub fn next(self) -> Self {
        self.rotate(1)
    }

    #[must_use]
    pub fn previous(self) -> Self {
        self.rotate(5)
    }

    /// Направление через одно по часовой стрелке (резкий поворот реки).
    #[must_use]
    pub fn next2(self) -> Self {
        self.rotate(2)
    }

    #[must_use]
    pub fn previous2(self) -> Self {
        self.rotate(4)
    }

    fn rotate(self, steps: usize) -> Self {
        Self::ALL[(self.index() + steps) % 6]
    }

    /// Смещение кубических координат `(dx, dz)` при шаге в этом направлении.
    #[must_use]
    pub const fn cube_offset(self) -> (i32, i32) {
        match self {
            HexDirection::E => (1, 0),
            HexDirection::SE => (1, -1),
            HexDirection::SW => (0, -1),
            HexDirection::W => (-1, 0),
            HexDirection::NW => (-1, 1),
            HexDirection::NE => (0, 1),
        }
    }
}

/// Тип перехода между соседними ячейками по разнице высот.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeType {
    /// Одинаковая высота
    Flat,
    /// Перепад ровно в один уровень
    Slope,
    /// Обрыв: перепад больше одного уровня
    Cliff,
}

impl EdgeType {
    #[must_use]
    pub fn between(elevation1: i32, elevation2: i32) -> Self {
        match (elevation1 - elevation2).abs() {
            0 => EdgeType::Flat,
            1 => EdgeType::Slope,
            _ => EdgeType::Cliff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for d in HexDirection::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
        }
        assert_eq!(HexDirection::NW.opposite(), HexDirection::SE);
    }

    #[test]
    fn rotation_wraps_around() {
        assert_eq!(HexDirection::NE.next(), HexDirection::E);
        assert_eq!(HexDirection::E.previous(), HexDirection::NE);
        assert_eq!(HexDirection::W.next2(), HexDirection::NE);
        assert_eq!(HexDirection::SE.previous2(), HexDirection::NE);
        assert_eq!(HexDirection::NW.next2(), HexDirection::SE);
        for d in HexDirection::ALL {
            assert_eq!(d.next2().previous2(), d);
        }
    }

    #[test]
    fn opposite_offsets_cancel() {
        for d in HexDirection::ALL {
            let (ax, az) = d.cube_offset();
            let (bx, bz) = d.opposite().cube_offset();
            assert_eq!((ax + bx, az + bz), (0, 0));
        }
    }

    #[test]
    fn edge_types() {
        assert_eq!(EdgeType::between(3, 3), EdgeType::Flat);
        assert_eq!(EdgeType::between(2, 3), EdgeType::Slope);
        assert_eq!(EdgeType::between(5, 3), EdgeType::Cliff);
    }
}
