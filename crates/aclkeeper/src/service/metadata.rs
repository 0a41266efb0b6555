use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    api::ErrorModel,
    service::{
        authz::PrivilegeSet,
        error::{CatalogBackendError, define_transparent_error, impl_error_stack_methods},
        identifier::{CatalogSchemaName, Principal, QualifiedObjectName, TableId},
        session::Session,
    },
};

/// Connector handle for a table that exists in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableHandle {
    pub catalog_name: String,
    pub table_id: TableId,
}

impl TableHandle {
    #[must_use]
    pub fn new(catalog_name: impl Into<String>, table_id: TableId) -> Self {
        Self {
            catalog_name: catalog_name.into(),
            table_id,
        }
    }
}

/// Catalog view needed to resolve and revoke privileges.
///
/// Lookups never fail for missing objects: `schema_exists` returns `false` and
/// `get_table_handle` returns `None`. A revoke must either apply to the whole
/// privilege set or not at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Metadata: Send + Sync + 'static {
    async fn schema_exists(
        &self,
        session: &Session,
        schema: &CatalogSchemaName,
    ) -> Result<bool, CatalogBackendError>;

    async fn get_table_handle(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
    ) -> Result<Option<TableHandle>, CatalogBackendError>;

    async fn revoke_schema_privileges(
        &self,
        session: &Session,
        schema: &CatalogSchemaName,
        privileges: &PrivilegeSet,
        revokee: &Principal,
        grant_option_for: bool,
    ) -> Result<(), CatalogRevokeSchemaPrivilegesError>;

    async fn revoke_table_privileges(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
        privileges: &PrivilegeSet,
        revokee: &Principal,
        grant_option_for: bool,
    ) -> Result<(), CatalogRevokeTablePrivilegesError>;
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Schema '{schema}' does not exist")]
pub struct SchemaNotFound {
    pub schema: CatalogSchemaName,
    pub stack: Vec<String>,
}
impl_error_stack_methods!(SchemaNotFound);

impl SchemaNotFound {
    #[must_use]
    pub fn new(schema: CatalogSchemaName) -> Self {
        Self {
            schema,
            stack: Vec::new(),
        }
    }
}

impl From<SchemaNotFound> for ErrorModel {
    fn from(err: SchemaNotFound) -> Self {
        ErrorModel::builder()
            .r#type("SchemaNotFound")
            .code(StatusCode::NOT_FOUND.as_u16())
            .message(err.to_string())
            .stack(err.stack)
            .build()
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Table '{table}' does not exist")]
pub struct TableNotFound {
    pub table: QualifiedObjectName,
    pub stack: Vec<String>,
}
impl_error_stack_methods!(TableNotFound);

impl TableNotFound {
    #[must_use]
    pub fn new(table: QualifiedObjectName) -> Self {
        Self {
            table,
            stack: Vec::new(),
        }
    }
}

impl From<TableNotFound> for ErrorModel {
    fn from(err: TableNotFound) -> Self {
        ErrorModel::builder()
            .r#type("TableNotFound")
            .code(StatusCode::NOT_FOUND.as_u16())
            .message(err.to_string())
            .stack(err.stack)
            .build()
    }
}

// --------------------------- REVOKE ERRORS ---------------------------
define_transparent_error! {
    pub enum CatalogRevokeSchemaPrivilegesError,
    stack_message: "Error revoking schema privileges in catalog",
    variants: [
        SchemaNotFound,
        CatalogBackendError,
    ]
}

define_transparent_error! {
    pub enum CatalogRevokeTablePrivilegesError,
    stack_message: "Error revoking table privileges in catalog",
    variants: [
        TableNotFound,
        CatalogBackendError,
    ]
}
