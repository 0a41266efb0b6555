use std::future::Future;

use crate::{
    CONFIG,
    api::{
        Result,
        statement::{Expression, Revoke},
    },
    server::DataDefinitionTask,
    service::{
        CatalogBackendError, CatalogRevokeSchemaPrivilegesError,
        CatalogRevokeTablePrivilegesError, SchemaNotFound, TableHandle, TableNotFound,
        authz::{
            AccessControl, AuthZRevokePrivilegeForbidden, AuthZSchemaOps as _,
            AuthZTableOps as _, CheckRevokePrivilegeError, InvalidPrivilege, Privilege,
            PrivilegeSet,
        },
        error::define_transparent_error,
        identifier::{
            CatalogSchemaName, QualifiedObjectName, ResolveNameError, create_catalog_schema_name,
            create_principal, create_qualified_object_name,
        },
        metadata::Metadata,
        session::{QueryStateMachine, Session},
        transaction::TransactionManager,
    },
};

/// Object a `REVOKE` applies to, after it was found in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    Schema(CatalogSchemaName),
    Table {
        name: QualifiedObjectName,
        handle: TableHandle,
    },
}

define_transparent_error! {
    pub enum ResolveRevokeTargetError,
    stack_message: "Error resolving revoke target",
    variants: [
        ResolveNameError,
        SchemaNotFound,
        TableNotFound,
        CatalogBackendError,
    ]
}

define_transparent_error! {
    pub enum RevokeError,
    stack_message: "Error executing REVOKE",
    variants: [
        ResolveRevokeTargetError,
        InvalidPrivilege,
        CheckRevokePrivilegeError,
        CatalogRevokeSchemaPrivilegesError,
        CatalogRevokeTablePrivilegesError,
    ]
}

/// Finds the schema or table named by the statement. Schema only if the
/// statement says so, table otherwise.
pub async fn resolve_target<M: Metadata>(
    statement: &Revoke,
    session: &Session,
    metadata: &M,
) -> std::result::Result<ResolvedTarget, ResolveRevokeTargetError> {
    if statement.targets_schema() {
        let schema = create_catalog_schema_name(session, &statement.name)?;
        if !metadata.schema_exists(session, &schema).await? {
            return Err(SchemaNotFound::new(schema).into());
        }
        tracing::debug!(%schema, "Resolved revoke target schema");
        Ok(ResolvedTarget::Schema(schema))
    } else {
        let name = create_qualified_object_name(session, &statement.name)?;
        let Some(handle) = metadata.get_table_handle(session, &name).await? else {
            return Err(TableNotFound::new(name).into());
        };
        tracing::debug!(table = %name, table_id = %handle.table_id, "Resolved revoke target table");
        Ok(ResolvedTarget::Table { name, handle })
    }
}

/// Privileges named by the statement, or every privilege if it names none.
pub fn parse_statement_privileges(
    statement: &Revoke,
) -> std::result::Result<PrivilegeSet, InvalidPrivilege> {
    PrivilegeSet::parse(statement.privileges.as_deref())
}

/// Runs `check` for every privilege.
///
/// Stops at the first failure unless `report_all_denials` is set, in which case
/// all checks run and the denials are folded into one error. Backend failures
/// always take precedence over denials.
async fn check_each<F, Fut>(
    privileges: &PrivilegeSet,
    report_all_denials: bool,
    check: F,
) -> std::result::Result<(), CheckRevokePrivilegeError>
where
    F: Fn(Privilege) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<(), CheckRevokePrivilegeError>> + Send,
{
    if !report_all_denials {
        for privilege in privileges {
            check(privilege).await?;
        }
        return Ok(());
    }

    let results = futures::future::join_all(privileges.iter().map(&check)).await;
    let mut denied: Option<AuthZRevokePrivilegeForbidden> = None;
    for result in results {
        match result {
            Ok(()) => {}
            Err(CheckRevokePrivilegeError::AuthZRevokePrivilegeForbidden(e)) => {
                denied = Some(match denied {
                    Some(previous) => previous.merge(e),
                    None => e,
                });
            }
            Err(e) => return Err(e),
        }
    }

    match denied {
        Some(e) => Err(CheckRevokePrivilegeError::AuthZRevokePrivilegeForbidden(e)),
        None => Ok(()),
    }
}

/// Executes `REVOKE` statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevokeTask {
    report_all_denials: bool,
}

impl Default for RevokeTask {
    fn default() -> Self {
        Self::new()
    }
}

impl RevokeTask {
    #[must_use]
    pub fn new() -> Self {
        Self::with_report_all_denials(CONFIG.revoke.report_all_denials)
    }

    #[must_use]
    pub fn with_report_all_denials(report_all_denials: bool) -> Self {
        Self { report_all_denials }
    }

    /// Resolves the target, parses the privileges, checks every privilege and
    /// only then revokes the whole set with a single catalog call.
    pub async fn revoke<M: Metadata, A: AccessControl>(
        &self,
        statement: &Revoke,
        metadata: &M,
        access_control: &A,
        session: &Session,
    ) -> std::result::Result<(), RevokeError> {
        // ------------------- VALIDATIONS -------------------
        let target = resolve_target(statement, session, metadata).await?;
        let privileges = parse_statement_privileges(statement)?;
        let revokee = create_principal(&statement.grantee);
        let grant_option_for = statement.grant_option_for;

        // ------------------- AUTHZ -------------------
        let context = session.to_security_context();
        let context = &context;
        let revokee_ref = &revokee;
        match &target {
            ResolvedTarget::Schema(schema) => {
                check_each(&privileges, self.report_all_denials, move |privilege| {
                    access_control.check_can_revoke_schema_privilege(
                        context,
                        privilege,
                        schema,
                        revokee_ref,
                        grant_option_for,
                    )
                })
                .await?;
            }
            ResolvedTarget::Table { name, .. } => {
                check_each(&privileges, self.report_all_denials, move |privilege| {
                    access_control.check_can_revoke_table_privilege(
                        context,
                        privilege,
                        name,
                        revokee_ref,
                        grant_option_for,
                    )
                })
                .await?;
            }
        }

        // ------------------- BUSINESS LOGIC -------------------
        match &target {
            ResolvedTarget::Schema(schema) => {
                tracing::debug!(%schema, %privileges, %revokee, grant_option_for, "Revoking schema privileges");
                metadata
                    .revoke_schema_privileges(
                        session,
                        schema,
                        &privileges,
                        &revokee,
                        grant_option_for,
                    )
                    .await?;
            }
            ResolvedTarget::Table { name, .. } => {
                tracing::debug!(table = %name, %privileges, %revokee, grant_option_for, "Revoking table privileges");
                metadata
                    .revoke_table_privileges(
                        session,
                        name,
                        &privileges,
                        &revokee,
                        grant_option_for,
                    )
                    .await?;
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl DataDefinitionTask for RevokeTask {
    type Statement = Revoke;

    fn name(&self) -> &'static str {
        "REVOKE"
    }

    async fn execute<T: TransactionManager, M: Metadata, A: AccessControl>(
        &self,
        statement: &Revoke,
        _transaction_manager: &T,
        metadata: &M,
        access_control: &A,
        state_machine: &QueryStateMachine,
        _parameters: &[Expression],
    ) -> Result<()> {
        self.revoke(statement, metadata, access_control, state_machine.session())
            .await
            .map_err(|e| match statement.location {
                Some(location) => e.append_detail(format!("Statement at {location}")),
                None => e,
            })?;
        Ok(())
    }
}
