pub mod config;
pub mod error;
pub mod har;
pub mod parse;
pub mod sample;
pub mod snippet;
pub mod translate;

pub use har::{Endpoint, HarRequest};
pub use parse::spec::ApiDocument;
pub use translate::{TranslateOptions, Translator};
