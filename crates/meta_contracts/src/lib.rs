pub mod bindings;
pub mod wrappers;
