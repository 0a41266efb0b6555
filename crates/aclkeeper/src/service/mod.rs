pub mod authz;
pub(crate) mod error;
pub mod identifier;
pub mod metadata;
pub mod session;
pub mod transaction;

pub use error::{CatalogBackendError, CatalogBackendErrorType, InternalErrorMessage};
pub use identifier::{
    CatalogSchemaName, Principal, PrincipalType, QualifiedObjectName, QueryId, TableId,
    TransactionId,
};
pub use metadata::{
    CatalogRevokeSchemaPrivilegesError, CatalogRevokeTablePrivilegesError, SchemaNotFound,
    TableHandle, TableNotFound,
};
pub use session::{Identity, QueryStateMachine, SecurityContext, Session};
