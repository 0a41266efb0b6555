use async_trait::async_trait;

use crate::service::{
    authz::{AccessControl, AuthorizationBackendUnavailable, Privilege},
    identifier::{CatalogSchemaName, Principal, QualifiedObjectName},
    session::SecurityContext,
};

/// Permits every revoke. For deployments where the catalog enforces its own policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAllAccessControl;

#[async_trait]
impl AccessControl for AllowAllAccessControl {
    fn implementation_name() -> &'static str {
        "allow-all"
    }

    async fn is_allowed_revoke_schema_privilege_impl(
        &self,
        _context: &SecurityContext,
        _privilege: Privilege,
        _schema: &CatalogSchemaName,
        _revokee: &Principal,
        _grant_option_for: bool,
    ) -> Result<bool, AuthorizationBackendUnavailable> {
        Ok(true)
    }

    async fn is_allowed_revoke_table_privilege_impl(
        &self,
        _context: &SecurityContext,
        _privilege: Privilege,
        _table: &QualifiedObjectName,
        _revokee: &Principal,
        _grant_option_for: bool,
    ) -> Result<bool, AuthorizationBackendUnavailable> {
        Ok(true)
    }
}
