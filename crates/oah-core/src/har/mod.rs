pub mod endpoint;
pub mod request;

pub use endpoint::Endpoint;
pub use request::{HarRequest, NameValue, PostData};
