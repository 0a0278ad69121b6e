//! Error Types for Rendering

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VisualError>;

#[derive(Error, Debug)]
pub enum VisualError {
    #[error("Rasterizer has no font; text cannot be drawn")]
    FontRequired,

    #[error("Invalid font: {0}")]
    Font(String),

    #[error("Nothing to draw: {0}")]
    Empty(&'static str),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
