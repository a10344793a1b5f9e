pub mod config;
pub mod conflict;
pub mod constants;
pub mod container;
pub mod error;
pub mod provider;
pub mod registry;
pub mod runtime;
pub mod schema;
pub mod service;
pub mod sync;

pub use error::{DbmError, Result};
