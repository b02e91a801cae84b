// Re-export model types and handler functions
pub mod http;
pub mod model;

pub use http::*;
pub use model::ImageRecord;
