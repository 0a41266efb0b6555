use crate::service::{
    authz::{
        AccessControl, AuthZRevokePrivilegeForbidden, CheckRevokePrivilegeError, Privilege,
        RevokeObjectType,
    },
    identifier::{Principal, QualifiedObjectName},
    session::SecurityContext,
};

#[async_trait::async_trait]
pub trait AuthZTableOps: AccessControl {
    async fn check_can_revoke_table_privilege(
        &self,
        context: &SecurityContext,
        privilege: Privilege,
        table: &QualifiedObjectName,
        revokee: &Principal,
        grant_option_for: bool,
    ) -> Result<(), CheckRevokePrivilegeError> {
        let is_allowed = self
            .is_allowed_revoke_table_privilege(
                context,
                privilege,
                table,
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
                %table,
                %revokee,
                "Revoking table privilege denied"
            );
            Err(AuthZRevokePrivilegeForbidden::new(
                RevokeObjectType::Table,
                table,
                privilege,
                context.identity.user.clone(),
            )
            .into())
        }
    }
}

impl<T> AuthZTableOps for T where T: AccessControl {}
