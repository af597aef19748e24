//! Main module for semhl library functionality

pub mod annotation;
pub mod baseline;
pub mod config;
pub mod evaluation;
pub mod grammatical;
pub mod hcode;
pub mod highlighter;
pub mod languages;
pub mod lexical;
pub mod logging;
pub mod overrides;
pub mod projection;
pub mod render;
pub mod scoring;
pub mod syntax;
pub mod task;
pub mod testing;

pub use annotation::{Eta, Heta};
pub use hcode::HCode;
pub use highlighter::{Highlighter, Language};
pub use projection::HCharSeq;
pub use task::TaskCode;
