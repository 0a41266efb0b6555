use crate::service::{
    authz::{
        AccessControl, AuthZRevokePrivilegeForbidden, CheckRevokePrivilegeError, Privilege,
        RevokeObjectType,
    },
    identifier::{CatalogSchemaName, Principal},
    session::SecurityContext,
};

#[async_trait::async_trait]
pub trait AuthZSchemaOps: AccessControl {
    async fn check_can_revoke_schema_privilege(
        &self,
        context: &SecurityContext,
        privilege: Privilege,
        schema: &CatalogSchemaName,
        revokee: &Principal,
        grant_option_for: bool,
    ) -> Result<(), CheckRevokePrivilegeError> {
        let is_allowed = self
            .is_allowed_revoke_schema_privilege(
                context,
                privilege,
                schema,
                revokee,
                grant_option_for,
            )
            .await?
            .into_inner();

        if is_allowed {
            Ok(())
        } else {
            tracing::debug!(
                user = %context.identity.user,
                %privilege,
                %schema,
                %revokee,
                "Revoking schema privilege denied"
            );
            Err(AuthZRevokePrivilegeForbidden::new(
                RevokeObjectType::Schema,
                schema,
                privilege,
                context.identity.user.clone(),
            )
            .into())
        }
    }
}

impl<T> AuthZSchemaOps for T where T: AccessControl {}
