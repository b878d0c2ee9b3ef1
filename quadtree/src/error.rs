use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum QuadtreeError {
    #[error(
        "rectangle fields must not be NaN (x: {x}, y: {y}, width: {width}, height: {height})"
    )]
    NanBounds {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    #[error(
        "extent must be finite with non-negative width/height (x: {x}, y: {y}, width: {width}, height: {height})"
    )]
    InvalidExtent {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

pub type QuadtreeResult<T> = Result<T, QuadtreeError>;
