pub mod decimal;
pub mod ether;
pub mod time;

pub use decimal::{FixedPoint, Quantity, ERROR_MARKER};
