// ghstats library.
// GitHub user and organization statistics with a response cache, history, and reports.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod history;
pub mod model;
pub mod normalizer;
pub mod render;
pub mod retrieval;
pub mod web;

pub use error::{Result, StatsError};
