pub mod biome;
pub mod climate;
pub mod config;
pub mod erosion;
pub mod error;
pub mod generator;
pub mod grid;
pub mod hex;
pub mod land;
pub mod preview;
pub mod region;
pub mod rivers;
pub mod search;

pub use biome::TerrainType;
pub use config::{
    BiomeSettings, ClimateSettings, ErosionSettings, GeneratorSettings, HemisphereMode,
    LandSettings, RiverSettings,
};
pub use error::MapError;
pub use generator::{GenerationReport, MapGenerator};
pub use grid::{HexCell, HexGrid};
pub use hex::{EdgeType, HexCoordinates, HexDirection};
pub use search::SearchError;
pub use search::path::{LandUnit, Path, Traveler, find_path};
