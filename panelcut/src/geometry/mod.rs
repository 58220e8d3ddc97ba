pub mod geo_enums;
pub mod orientation;
mod rect;
pub mod split;

#[doc(inline)]
pub use rect::Rect;

/// Tolerance used when comparing millimetre coordinates.
pub const EPSILON: f64 = 1e-6;
