mod ai;
mod ai_config;
mod probe;

pub use ai::*;
pub use ai_config::*;
pub use probe::*;
