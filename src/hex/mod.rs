//! Гексагональная геометрия: кубические координаты и направления.
//!
//! Сетка использует «горизонтальные» шестиугольники: строки `z` идут снизу вверх,
//! нечётные строки сдвинуты вправо на половину ячейки.

pub mod coordinates;
pub mod direction;

pub use coordinates::HexCoordinates;
pub use direction::{EdgeType, HexDirection};
