//! Core library: extraction, directory scanning, categorization, export.

pub mod categorizer;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod extractor;
pub mod models;
pub mod rules;
pub mod scanner;

pub use engine::{CategorizeOptions, EmailEngine};
pub use error::{Error, Result};
pub use models::{CategoryMap, Method, Source, SourceType, Statistics};
