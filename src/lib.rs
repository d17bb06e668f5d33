pub mod api;
pub mod app;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod extractor;
pub mod fetch_error;
pub mod fetcher;
pub mod model;
pub mod normalize;
pub mod reconciler;
pub mod scheduler;
pub mod services;
pub mod utils;
