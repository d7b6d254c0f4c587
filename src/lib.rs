pub mod analysis;
pub mod extractor;
pub mod models;
pub mod parser;
pub mod seed;
pub mod sentiment;
pub mod settings;
pub mod store;
