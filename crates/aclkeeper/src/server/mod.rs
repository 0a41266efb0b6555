//! Execution of data definition statements.
mod revoke;

pub use revoke::{
    ResolveRevokeTargetError, ResolvedTarget, RevokeError, RevokeTask, parse_statement_privileges,
    resolve_target,
};

use crate::{
    api::{
        ErrorModel, ErrorResponse, Result,
        statement::{Expression, Statement},
    },
    service::{
        authz::AccessControl,
        error::impl_error_stack_methods,
        identifier::TransactionId,
        metadata::Metadata,
        session::QueryStateMachine,
        transaction::TransactionManager,
    },
};

/// A statement that changes catalog state and completes without producing rows.
#[async_trait::async_trait]
pub trait DataDefinitionTask
where
    Self: Send + Sync + std::fmt::Debug,
{
    type Statement: Send + Sync;

    /// Command name the dispatcher routes on, e.g. `REVOKE`.
    fn name(&self) -> &'static str;

    async fn execute<T: TransactionManager, M: Metadata, A: AccessControl>(
        &self,
        statement: &Self::Statement,
        transaction_manager: &T,
        metadata: &M,
        access_control: &A,
        state_machine: &QueryStateMachine,
        parameters: &[Expression],
    ) -> Result<()>;
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Transaction {transaction_id} is not active")]
pub struct TransactionNotActive {
    pub transaction_id: TransactionId,
    pub stack: Vec<String>,
}
impl_error_stack_methods!(TransactionNotActive);

impl TransactionNotActive {
    #[must_use]
    pub fn new(transaction_id: TransactionId) -> Self {
        Self {
            transaction_id,
            stack: Vec::new(),
        }
    }
}

impl From<TransactionNotActive> for ErrorModel {
    fn from(err: TransactionNotActive) -> Self {
        ErrorModel::conflict(err.to_string(), "TransactionNotActive", None).append_details(err.stack)
    }
}

impl From<TransactionNotActive> for ErrorResponse {
    fn from(err: TransactionNotActive) -> Self {
        ErrorModel::from(err).into()
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Statement `{kind}` is not a supported data definition statement")]
pub struct UnknownDataDefinitionTask {
    pub kind: String,
    pub stack: Vec<String>,
}
impl_error_stack_methods!(UnknownDataDefinitionTask);

impl UnknownDataDefinitionTask {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            stack: Vec::new(),
        }
    }
}

impl From<UnknownDataDefinitionTask> for ErrorModel {
    fn from(err: UnknownDataDefinitionTask) -> Self {
        ErrorModel::bad_request(err.to_string(), "UnknownStatement", None).append_details(err.stack)
    }
}

impl From<UnknownDataDefinitionTask> for ErrorResponse {
    fn from(err: UnknownDataDefinitionTask) -> Self {
        ErrorModel::from(err).into()
    }
}

/// Routes statements to their task and logs how each one ended.
#[derive(Debug, Clone, Default)]
pub struct DataDefinitionTasks {
    revoke: RevokeTask,
}

impl DataDefinitionTasks {
    #[must_use]
    pub fn new(revoke: RevokeTask) -> Self {
        Self { revoke }
    }

    #[must_use]
    pub fn task_names(&self) -> Vec<&'static str> {
        vec![self.revoke.name()]
    }

    /// Runs the task for `statement` inside the session's transaction.
    ///
    /// Errors are logged here once and returned unchanged. Call
    /// [`ErrorModel::into_public`] before handing them to a client.
    pub async fn execute<T: TransactionManager, M: Metadata, A: AccessControl>(
        &self,
        statement: &Statement,
        transaction_manager: &T,
        metadata: &M,
        access_control: &A,
        state_machine: &QueryStateMachine,
        parameters: &[Expression],
    ) -> Result<()> {
        let result = self
            .dispatch(
                statement,
                transaction_manager,
                metadata,
                access_control,
                state_machine,
                parameters,
            )
            .await;

        match &result {
            Ok(()) => tracing::info!(
                query_id = %state_machine.query_id(),
                statement = statement.kind(),
                access_control = A::implementation_name(),
                "Statement finished"
            ),
            Err(e) => e.error.trace(),
        }
        result
    }

    async fn dispatch<T: TransactionManager, M: Metadata, A: AccessControl>(
        &self,
        statement: &Statement,
        transaction_manager: &T,
        metadata: &M,
        access_control: &A,
        state_machine: &QueryStateMachine,
        parameters: &[Expression],
    ) -> Result<()> {
        let transaction_id = state_machine.session().transaction_id;
        match statement {
            Statement::Revoke(revoke) => {
                if !transaction_manager.is_active(transaction_id).await {
                    return Err(TransactionNotActive::new(transaction_id).into());
                }
                self.revoke
                    .execute(
                        revoke,
                        transaction_manager,
                        metadata,
                        access_control,
                        state_machine,
                        parameters,
                    )
                    .await
            }
            Statement::Other { kind } => Err(UnknownDataDefinitionTask::new(kind.clone()).into()),
        }
    }
}
