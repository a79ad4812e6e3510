pub mod error;
pub mod settings;
pub mod util;

pub use util::*;
