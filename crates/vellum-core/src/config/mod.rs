pub mod consts;
mod model;

pub use model::{RuleConfig, ViewConfig};
