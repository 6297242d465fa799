pub mod constants;
pub mod enums;
