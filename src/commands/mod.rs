mod convert;
mod pages;
mod types;

pub use convert::*;
pub use pages::*;
pub use types::*;
