pub mod archive;
pub mod config;
pub mod content;
pub mod converter;
pub mod error;
pub mod export;
pub mod logger;
pub mod metadata;
pub mod post;
mod test_data;
mod text_utils;
