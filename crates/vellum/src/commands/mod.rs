pub mod compile;
pub mod render;
