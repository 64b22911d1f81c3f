//! apod-explorer: Astronomy Picture of the Day browsing.
//!
//! The library covers the behavioral core of the gallery: a hero lookup for
//! a single picked date, and an infinite archive that walks backwards through
//! seven-day windows with client-side title search and a detail selection.
//! All data comes from an APOD backend over HTTP.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod gallery;
pub mod hero;
pub mod models;

pub use error::{ApodError, Result};
