pub mod config;
pub mod detail;
pub mod endpoint;
pub mod error;
pub mod favorites;
pub mod image_cache;
pub mod list;
pub mod models;
pub mod tmdb;
pub mod trailer;

#[cfg(test)]
pub(crate) mod testing;

pub use error::FetchError;
