pub mod consoleplugin;
pub mod error;
pub mod operator;
