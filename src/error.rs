use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Palette of {requested} colors exceeds the maximum of {max}")]
    CapacityExceeded { requested: usize, max: usize },

    #[error("At least one palette color is required")]
    NoColors,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
