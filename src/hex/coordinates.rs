use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hex::HexDirection;

/// Кубические координаты ячейки.
///
/// Хранятся только `x` и `z`; `y = -x - z` всегда вычисляется, поэтому
/// инвариант `x + y + z = 0` не может быть нарушен.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HexCoordinates {
    x: i32,
    z: i32,
}

impl HexCoordinates {
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Переводит координаты смещения (столбец, строка) в кубические.
    #[must_use]
    pub const fn from_offset(x: i32, z: i32) -> Self {
        Self::new(x - z / 2, z)
    }

    /// Обратное преобразование в координаты смещения.
    #[must_use]
    pub const fn to_offset(self) -> (i32, i32) {
        (self.x + self.z / 2, self.z)
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        -self.x - self.z
    }

    #[must_use]
    pub const fn z(self) -> i32 {
        self.z
    }

    /// Гексагональное расстояние: минимальное число шагов между ячейками.
    #[must_use]
    pub fn distance_to(self, other: HexCoordinates) -> i32 {
        ((self.x - other.x).abs() + (self.y() - other.y()).abs() + (self.z - other.z).abs()) / 2
    }

    /// Расстояние на карте, свёрнутой в цилиндр шириной `wrap_size` столбцов:
    /// учитывается путь через шов в обе стороны.
    #[must_use]
    pub fn wrapped_distance_to(self, other: HexCoordinates, wrap_size: i32) -> i32 {
        [0, wrap_size, -wrap_size]
            .into_iter()
            .map(|shift| self.distance_to(Self::new(other.x + shift, other.z)))
            .min()
            .unwrap_or_default()
    }

    /// Координаты соседа в заданном направлении.
    #[must_use]
    pub fn step(self, direction: HexDirection) -> Self {
        let (dx, dz) = direction.cube_offset();
        Self::new(self.x + dx, self.z + dz)
    }
}

impl fmt::Display for HexCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y(), self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_invariant_holds_for_offsets() {
        for z in 0..15 {
            for x in 0..20 {
                let c = HexCoordinates::from_offset(x, z);
                assert_eq!(c.x() + c.y() + c.z(), 0);
                assert_eq!(c.to_offset(), (x, z));
            }
        }
    }

    #[test]
    fn distance_is_symmetric_and_zero_only_on_self() {
        let points: Vec<_> = (0..6)
            .flat_map(|z| (0..6).map(move |x| HexCoordinates::from_offset(x, z)))
            .collect();
        for &a in &points {
            for &b in &points {
                assert_eq!(a.distance_to(b), b.distance_to(a));
                assert_eq!(a.distance_to(b) == 0, a == b);
            }
        }
    }

    #[test]
    fn steps_are_one_apart() {
        let origin = HexCoordinates::from_offset(4, 3);
        for d in HexDirection::ALL {
            assert_eq!(origin.distance_to(origin.step(d)), 1);
            assert_eq!(origin.step(d).step(d.opposite()), origin);
        }
    }

    #[test]
    fn wrapped_distance_crosses_the_seam() {
        let west = HexCoordinates::from_offset(0, 4);
        let east = HexCoordinates::from_offset(19, 4);
        assert_eq!(west.distance_to(east), 19);
        assert_eq!(west.wrapped_distance_to(east, 20), 1);
        assert_eq!(east.wrapped_distance_to(west, 20), 1);

        let a = HexCoordinates::from_offset(3, 2);
        let b = HexCoordinates::from_offset(6, 5);
        assert_eq!(a.wrapped_distance_to(b, 20), a.distance_to(b));
    }

    #[test]
    fn display_shows_all_three_axes() {
        assert_eq!(HexCoordinates::new(2, -5).to_string(), "(2, 3, -5)");
    }
}
