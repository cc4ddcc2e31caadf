// Core modules
pub mod cache;
pub mod compiler;
pub mod config;
pub mod error;
pub mod locator;
pub mod lock;
pub mod runtime;
pub mod template;
pub mod view;

// Re-export commonly used types
pub use config::ViewConfig;
pub use error::{Result, VellumError};
pub use template::Bindings;
pub use view::{CompiledTemplate, Rendering, View};
