mod render;
mod state;

pub use render::*;
pub use state::*;
