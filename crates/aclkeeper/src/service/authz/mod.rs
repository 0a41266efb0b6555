mod error;
pub mod implementations;
mod privilege;
mod schema;
mod table;

pub use error::{
    AuthZRevokePrivilegeForbidden, AuthorizationBackendUnavailable, CheckRevokePrivilegeError,
    RevokeObjectType,
};
pub use privilege::{InvalidPrivilege, Privilege, PrivilegeSet};
pub use schema::AuthZSchemaOps;
pub use table::AuthZTableOps;

use crate::service::{
    identifier::{CatalogSchemaName, Principal, QualifiedObjectName},
    session::SecurityContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct MustUse<T>(T);

impl<T> From<T> for MustUse<T> {
    fn from(v: T) -> Self {
        Self(v)
    }
}

impl<T> MustUse<T> {
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Policy engine deciding whether the user behind a [`SecurityContext`] may
/// revoke privileges.
///
/// Implementors provide the `*_impl` methods. Callers use the wrapping methods,
/// or the `check_can_*` operations from [`AuthZSchemaOps`] and [`AuthZTableOps`]
/// which turn a denial into an error.
///
/// Return `Ok(false)` for a denial and `Err` only when no decision could be made.
#[async_trait::async_trait]
pub trait AccessControl
where
    Self: Send + Sync + 'static + Clone + std::fmt::Debug,
{
    fn implementation_name() -> &'static str;

    async fn is_allowed_revoke_schema_privilege_impl(
        &self,
        context: &SecurityContext,
        privilege: Privilege,
        schema: &CatalogSchemaName,
        revokee: &Principal,
        grant_option_for: bool,
    ) -> Result<bool, AuthorizationBackendUnavailable>;

    async fn is_allowed_revoke_table_privilege_impl(
        &self,
        context: &SecurityContext,
        privilege: Privilege,
        table: &QualifiedObjectName,
        revokee: &Principal,
        grant_option_for: bool,
    ) -> Result<bool, AuthorizationBackendUnavailable>;

    async fn is_allowed_revoke_schema_privilege(
        &self,
        context: &SecurityContext,
        privilege: Privilege,
        schema: &CatalogSchemaName,
        revokee: &Principal,
        grant_option_for: bool,
    ) -> Result<MustUse<bool>, AuthorizationBackendUnavailable> {
        self.is_allowed_revoke_schema_privilege_impl(
            context,
            privilege,
            schema,
            revokee,
            grant_option_for,
        )
        .await
        .map(MustUse::from)
    }

    async fn is_allowed_revoke_table_privilege(
        &self,
        context: &SecurityContext,
        privilege: Privilege,
        table: &QualifiedObjectName,
        revokee: &Principal,
        grant_option_for: bool,
    ) -> Result<MustUse<bool>, AuthorizationBackendUnavailable> {
        self.is_allowed_revoke_table_privilege_impl(
            context,
            privilege,
            table,
            revokee,
            grant_option_for,
        )
        .await
        .map(MustUse::from)
    }
}
