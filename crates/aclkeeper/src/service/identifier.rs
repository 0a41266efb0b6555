use std::{
    fmt::{Display, Formatter},
    ops::Deref,
};

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    CONFIG,
    api::{
        ErrorModel, ErrorResponse,
        statement::{PrincipalKind, PrincipalSpecification, QualifiedName},
    },
    service::{
        error::{define_simple_error, impl_error_stack_methods},
        session::Session,
    },
};

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Copy)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            #[must_use]
            pub fn new(id: uuid::Uuid) -> Self {
                Self(id)
            }

            #[must_use]
            pub fn new_random() -> Self {
                Self(uuid::Uuid::now_v7())
            }
        }

        impl Deref for $name {
            type Target = uuid::Uuid;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id_type!(TransactionId);
define_id_type!(QueryId);
define_id_type!(TableId);

/// Fully resolved `catalog.schema`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CatalogSchemaName {
    pub catalog_name: String,
    pub schema_name: String,
}

impl CatalogSchemaName {
    #[must_use]
    pub fn new(catalog_name: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            catalog_name: catalog_name.into(),
            schema_name: schema_name.into(),
        }
    }
}

impl Display for CatalogSchemaName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.catalog_name, self.schema_name)
    }
}

/// Fully resolved `catalog.schema.object`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedObjectName {
    pub catalog_name: String,
    pub schema_name: String,
    pub object_name: String,
}

impl QualifiedObjectName {
    #[must_use]
    pub fn new(
        catalog_name: impl Into<String>,
        schema_name: impl Into<String>,
        object_name: impl Into<String>,
    ) -> Self {
        Self {
            catalog_name: catalog_name.into(),
            schema_name: schema_name.into(),
            object_name: object_name.into(),
        }
    }

    #[must_use]
    pub fn schema(&self) -> CatalogSchemaName {
        CatalogSchemaName::new(self.catalog_name.clone(), self.schema_name.clone())
    }
}

impl Display for QualifiedObjectName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.catalog_name, self.schema_name, self.object_name
        )
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PrincipalType {
    User,
    Role,
}

/// User or role that privileges are granted to or revoked from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Principal {
    pub r#type: PrincipalType,
    pub name: String,
}

impl Principal {
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            r#type: PrincipalType::User,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn role(name: impl Into<String>) -> Self {
        Self {
            r#type: PrincipalType::Role,
            name: name.into(),
        }
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.r#type, self.name)
    }
}

// --------------------------- Errors ---------------------------
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("{message}: {name}")]
pub struct InvalidObjectName {
    pub name: String,
    pub message: String,
    pub stack: Vec<String>,
}
impl_error_stack_methods!(InvalidObjectName);

impl InvalidObjectName {
    #[must_use]
    pub fn new(name: &QualifiedName, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            message: message.into(),
            stack: Vec::new(),
        }
    }
}

impl From<InvalidObjectName> for ErrorModel {
    fn from(err: InvalidObjectName) -> Self {
        ErrorModel::builder()
            .r#type("InvalidObjectName")
            .code(StatusCode::BAD_REQUEST.as_u16())
            .message(err.to_string())
            .stack(err.stack)
            .build()
    }
}

define_simple_error!(
    MissingCatalogName,
    "Catalog must be specified when session catalog is not set"
);
impl From<MissingCatalogName> for ErrorModel {
    fn from(err: MissingCatalogName) -> Self {
        ErrorModel::builder()
            .r#type("MissingCatalogName")
            .code(StatusCode::BAD_REQUEST.as_u16())
            .message(err.to_string())
            .stack(err.stack)
            .build()
    }
}

define_simple_error!(
    MissingSchemaName,
    "Schema must be specified when session schema is not set"
);
impl From<MissingSchemaName> for ErrorModel {
    fn from(err: MissingSchemaName) -> Self {
        ErrorModel::builder()
            .r#type("MissingSchemaName")
            .code(StatusCode::BAD_REQUEST.as_u16())
            .message(err.to_string())
            .stack(err.stack)
            .build()
    }
}

#[derive(thiserror::Error, Debug, PartialEq, derive_more::From)]
pub enum ResolveNameError {
    #[error(transparent)]
    InvalidObjectName(InvalidObjectName),
    #[error(transparent)]
    MissingCatalogName(MissingCatalogName),
    #[error(transparent)]
    MissingSchemaName(MissingSchemaName),
}

impl ResolveNameError {
    #[must_use]
    pub fn append_detail(mut self, detail: impl Into<String>) -> Self {
        self.append_detail_mut(detail);
        self
    }

    pub fn append_detail_mut(&mut self, detail: impl Into<String>) {
        match self {
            ResolveNameError::InvalidObjectName(e) => e.append_detail_mut(detail),
            ResolveNameError::MissingCatalogName(e) => e.append_detail_mut(detail),
            ResolveNameError::MissingSchemaName(e) => e.append_detail_mut(detail),
        }
    }
}

impl From<ResolveNameError> for ErrorModel {
    fn from(err: ResolveNameError) -> Self {
        match err {
            ResolveNameError::InvalidObjectName(e) => e.into(),
            ResolveNameError::MissingCatalogName(e) => e.into(),
            ResolveNameError::MissingSchemaName(e) => e.into(),
        }
    }
}

impl From<ResolveNameError> for ErrorResponse {
    fn from(err: ResolveNameError) -> Self {
        ErrorModel::from(err).into()
    }
}

// --------------------------- Resolution ---------------------------
fn normalize(part: &str) -> String {
    if CONFIG.identifiers.lowercase {
        part.to_lowercase()
    } else {
        part.to_string()
    }
}

fn checked_parts(name: &QualifiedName) -> Result<Vec<String>, InvalidObjectName> {
    if name.is_empty() {
        return Err(InvalidObjectName::new(name, "Empty name"));
    }
    if name.parts().iter().any(String::is_empty) {
        return Err(InvalidObjectName::new(name, "Empty part in name"));
    }
    Ok(name.parts().iter().map(|p| normalize(p)).collect())
}

/// Resolves a one or two part schema name, taking the catalog from the session when omitted.
pub fn create_catalog_schema_name(
    session: &Session,
    name: &QualifiedName,
) -> Result<CatalogSchemaName, ResolveNameError> {
    let parts = checked_parts(name)?;
    match parts.as_slice() {
        [schema] => {
            let catalog = session.catalog.clone().ok_or_else(MissingCatalogName::new)?;
            Ok(CatalogSchemaName::new(catalog, schema.clone()))
        }
        [catalog, schema] => Ok(CatalogSchemaName::new(catalog.clone(), schema.clone())),
        _ => Err(InvalidObjectName::new(name, "Too many parts in schema name").into()),
    }
}

/// Resolves a one to three part object name, filling leading parts from the session.
pub fn create_qualified_object_name(
    session: &Session,
    name: &QualifiedName,
) -> Result<QualifiedObjectName, ResolveNameError> {
    let parts = checked_parts(name)?;
    match parts.as_slice() {
        [object] => {
            let schema = session.schema.clone().ok_or_else(MissingSchemaName::new)?;
            let catalog = session.catalog.clone().ok_or_else(MissingCatalogName::new)?;
            Ok(QualifiedObjectName::new(catalog, schema, object.clone()))
        }
        [schema, object] => {
            let catalog = session.catalog.clone().ok_or_else(MissingCatalogName::new)?;
            Ok(QualifiedObjectName::new(
                catalog,
                schema.clone(),
                object.clone(),
            ))
        }
        [catalog, schema, object] => Ok(QualifiedObjectName::new(
            catalog.clone(),
            schema.clone(),
            object.clone(),
        )),
        _ => Err(InvalidObjectName::new(name, "Too many dots in table name").into()),
    }
}

/// An unspecified principal kind is a user.
#[must_use]
pub fn create_principal(specification: &PrincipalSpecification) -> Principal {
    match specification.kind {
        PrincipalKind::Unspecified | PrincipalKind::User => {
            Principal::user(specification.name.clone())
        }
        PrincipalKind::Role => Principal::role(specification.name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_session;

    #[test]
    fn test_schema_name_takes_catalog_from_session() {
        let session = test_session(Some("hive"), None);
        let name = create_catalog_schema_name(&session, &QualifiedName::parse("Reporting")).unwrap();
        assert_eq!(name, CatalogSchemaName::new("hive", "reporting"));
        assert_eq!(name.to_string(), "hive.reporting");

        let name = create_catalog_schema_name(&session, &QualifiedName::parse("db.reporting")).unwrap();
        assert_eq!(name, CatalogSchemaName::new("db", "reporting"));
    }

    #[test]
    fn test_schema_name_errors() {
        let session = test_session(None, None);
        let err = create_catalog_schema_name(&session, &QualifiedName::parse("reporting"))
            .unwrap_err();
        assert!(matches!(err, ResolveNameError::MissingCatalogName(_)));

        let err = create_catalog_schema_name(&session, &QualifiedName::parse("a.b.c"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Too many parts in schema name: a.b.c");
        assert_eq!(ErrorModel::from(err).code, 400);
    }

    #[test]
    fn test_object_name_fills_from_session() {
        let session = test_session(Some("hive"), Some("sales"));
        assert_eq!(
            create_qualified_object_name(&session, &QualifiedName::parse("Orders")).unwrap(),
            QualifiedObjectName::new("hive", "sales", "orders")
        );
        assert_eq!(
            create_qualified_object_name(&session, &QualifiedName::parse("db.sales")).unwrap(),
            QualifiedObjectName::new("hive", "db", "sales")
        );
        let full =
            create_qualified_object_name(&session, &QualifiedName::parse("c.s.t")).unwrap();
        assert_eq!(full.to_string(), "c.s.t");
        assert_eq!(full.schema(), CatalogSchemaName::new("c", "s"));
    }

    #[test]
    fn test_object_name_errors() {
        let session = test_session(Some("hive"), None);
        let err =
            create_qualified_object_name(&session, &QualifiedName::parse("orders")).unwrap_err();
        assert!(matches!(err, ResolveNameError::MissingSchemaName(_)));

        let err = create_qualified_object_name(&session, &QualifiedName::parse("a.b.c.d"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Too many dots in table name: a.b.c.d");

        let err =
            create_qualified_object_name(&session, &QualifiedName::parse("a..c")).unwrap_err();
        assert!(matches!(err, ResolveNameError::InvalidObjectName(_)));

        let session = test_session(None, None);
        let err =
            create_qualified_object_name(&session, &QualifiedName::parse("s.t")).unwrap_err();
        let model = ErrorModel::from(err.append_detail("Error resolving revoke target"));
        assert_eq!(model.r#type, "MissingCatalogName");
        assert_eq!(model.stack, vec!["Error resolving revoke target".to_string()]);
    }

    #[test]
    fn test_create_principal() {
        assert_eq!(
            create_principal(&PrincipalSpecification::builder().name("alice").build()),
            Principal::user("alice")
        );
        assert_eq!(
            create_principal(&PrincipalSpecification::role("analysts")),
            Principal::role("analysts")
        );
        assert_eq!(Principal::role("analysts").to_string(), "ROLE analysts");
    }
}
