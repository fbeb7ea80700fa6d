use serde::Serialize;

use crate::hex::{HexCoordinates, HexDirection};

/// Ячейка карты.
///
/// Поля доступны только для чтения; изменять их следует через сеттеры
/// [`HexGrid`](crate::grid::HexGrid), которые поддерживают взаимность рек и дорог
/// и отмечают ячейку для перерисовки.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HexCell {
    pub(crate) index: usize,
    pub(crate) coordinates: HexCoordinates,
    pub(crate) elevation: i32,
    pub(crate) water_level: i32,
    pub(crate) terrain_type_index: u8,
    pub(crate) urban_level: u8,
    pub(crate) farm_level: u8,
    pub(crate) plant_level: u8,
    pub(crate) special_index: u8,
    pub(crate) walled: bool,
    pub(crate) incoming_river: Option<HexDirection>,
    pub(crate) outgoing_river: Option<HexDirection>,
    pub(crate) roads: [bool; 6],
    /// Крайние ячейки недоступны для обзора
    pub(crate) explorable: bool,
    pub(crate) explored: bool,
    #[serde(skip)]
    pub(crate) visibility: u32,
    #[serde(skip)]
    pub(crate) occupied: bool,
}

impl HexCell {
    pub(crate) fn new(index: usize, coordinates: HexCoordinates, explorable: bool) -> Self {
        Self {
            index,
            coordinates,
            elevation: 0,
            water_level: 0,
            terrain_type_index: 0,
            urban_level: 0,
            farm_level: 0,
            plant_level: 0,
            special_index: 0,
            walled: false,
            incoming_river: None,
            outgoing_river: None,
            roads: [false; 6],
            explorable,
            explored: false,
            visibility: 0,
            occupied: false,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn coordinates(&self) -> HexCoordinates {
        self.coordinates
    }

    #[must_use]
    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    #[must_use]
    pub fn water_level(&self) -> i32 {
        self.water_level
    }

    #[must_use]
    pub fn is_underwater(&self) -> bool {
        self.water_level > self.elevation
    }

    /// Высота, с которой ячейка «смотрит»: поверхность воды или суши.
    #[must_use]
    pub fn view_elevation(&self) -> i32 {
        self.elevation.max(self.water_level)
    }

    #[must_use]
    pub fn terrain_type_index(&self) -> u8 {
        self.terrain_type_index
    }

    #[must_use]
    pub fn urban_level(&self) -> u8 {
        self.urban_level
    }

    #[must_use]
    pub fn farm_level(&self) -> u8 {
        self.farm_level
    }

    #[must_use]
    pub fn plant_level(&self) -> u8 {
        self.plant_level
    }

    #[must_use]
    pub fn special_index(&self) -> u8 {
        self.special_index
    }

    #[must_use]
    pub fn is_walled(&self) -> bool {
        self.walled
    }

    #[must_use]
    pub fn incoming_river(&self) -> Option<HexDirection> {
        self.incoming_river
    }

    #[must_use]
    pub fn outgoing_river(&self) -> Option<HexDirection> {
        self.outgoing_river
    }

    #[must_use]
    pub fn has_incoming_river(&self) -> bool {
        self.incoming_river.is_some()
    }

    #[must_use]
    pub fn has_outgoing_river(&self) -> bool {
        self.outgoing_river.is_some()
    }

    #[must_use]
    pub fn has_river(&self) -> bool {
        self.incoming_river.is_some() || self.outgoing_river.is_some()
    }

    /// Исток или устье: ровно один конец реки.
    #[must_use]
    pub fn has_river_begin_or_end(&self) -> bool {
        self.incoming_river.is_some() != self.outgoing_river.is_some()
    }

    #[must_use]
    pub fn has_river_through_edge(&self, direction: HexDirection) -> bool {
        self.incoming_river == Some(direction) || self.outgoing_river == Some(direction)
    }

    #[must_use]
    pub fn has_road_through_edge(&self, direction: HexDirection) -> bool {
        self.roads[direction.index()]
    }

    #[must_use]
    pub fn has_roads(&self) -> bool {
        self.roads.iter().any(|&r| r)
    }

    /// Битовая маска дорог: бит `d` установлен, если дорога пересекает ребро `d`.
    #[must_use]
    pub fn road_flags(&self) -> u8 {
        self.roads
            .iter()
            .enumerate()
            .filter(|&(_, &road)| road)
            .fold(0, |flags, (d, _)| flags | (1 << d))
    }

    #[must_use]
    pub fn is_explorable(&self) -> bool {
        self.explorable
    }

    #[must_use]
    pub fn is_explored(&self) -> bool {
        self.explored
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visibility > 0
    }

    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }
}
