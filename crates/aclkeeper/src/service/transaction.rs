use crate::service::identifier::TransactionId;

/// Transaction boundaries are owned by the engine. Tasks only ask whether the
/// transaction they run in is still open.
#[async_trait::async_trait]
pub trait TransactionManager
where
    Self: Send + Sync + 'static,
{
    async fn is_active(&self, transaction_id: TransactionId) -> bool;
}
