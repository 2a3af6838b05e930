//! Export the images known to a local Docker daemon as CSV.
// Increase the compiler's recursion limit for the `error_chain` crate.
#![recursion_limit = "1024"]

// import external libraries
#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate serde_derive;

// declare modules
pub mod cli;
pub mod columns;
pub mod config;
mod connector;
mod docker;
pub mod errors;
pub mod export;
pub mod image;
pub mod version;

// publicly re-export
pub use crate::columns::{Column, ColumnSelection};
pub use crate::config::EngineConfig;
pub use crate::docker::{Docker, ImageLister};
pub use crate::image::Image;
