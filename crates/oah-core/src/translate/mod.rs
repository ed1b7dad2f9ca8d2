pub mod assemble;
pub mod base_url;
pub mod path;
pub mod payload;
pub mod security;
pub mod source;
pub mod style;
pub mod values;

pub use assemble::{TranslateOptions, Translator, endpoints, translate, translate_one};
pub use security::Credential;
pub use source::{BodySource, OperationContext, ParameterSource};
pub use style::{ParamValue, Style};
