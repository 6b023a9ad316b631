pub mod document;
pub mod error;
pub mod scoring;
pub mod settings;
pub mod utils;
