/// Error types for the viewer core
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("cannot normalize a zero-magnitude {0}")]
    ZeroMagnitude(&'static str),

    #[error("field of view must be strictly between 0 and 180 degrees, got {0}")]
    InvalidFov(f64),

    #[error("aspect ratio must be finite and positive, got {0}")]
    InvalidAspectRatio(f64),

    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),

    #[error("polygon needs at least 3 distinct points, got {0}")]
    DegeneratePolygon(usize),

    #[error("malformed mesh: {0}")]
    MalformedMesh(String),

    #[error("STL decode failed: {0}")]
    Stl(String),
}

pub type Result<T> = std::result::Result<T, Error>;
