pub mod attribute;
pub mod cache;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod entity;
pub mod error;
pub mod filter;
pub mod io;
pub mod labels;
pub mod model;
pub mod outcome;
pub mod settings;
pub mod store;
pub mod sync;

pub use error::{Result, TranslatorError};
