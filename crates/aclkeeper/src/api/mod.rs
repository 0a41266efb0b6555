pub mod statement;

pub use aclkeeper_ext::{ErrorModel, ErrorResponse};

pub type Result<T, E = ErrorResponse> = std::result::Result<T, E>;
