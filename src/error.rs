use thiserror::Error;

use crate::search::SearchError;

/// Ошибки генератора и сетки.
#[derive(Debug, Error)]
pub enum MapError {
    #[error(
        "неподдерживаемый размер карты {width}×{height}: стороны должны быть положительными и кратны размеру чанка {chunk_x}×{chunk_z}"
    )]
    UnsupportedSize {
        width: i32,
        height: i32,
        chunk_x: i32,
        chunk_z: i32,
    },

    #[error("некорректные параметры генерации: {0}")]
    InvalidSettings(String),

    #[error("повреждённые данные ячейки {index}: {reason}")]
    CorruptCellData { index: usize, reason: &'static str },

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("ошибка записи изображения: {0}")]
    Image(#[from] image::ImageError),

    #[error("ошибка записи JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ошибка разбора TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
