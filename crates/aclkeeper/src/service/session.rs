use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::service::identifier::{QueryId, TransactionId};

/// Authenticated user a statement runs as.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder, veil::Redact)]
pub struct Identity {
    #[builder(setter(into))]
    pub user: String,
    #[builder(default, setter(strip_option, into))]
    pub principal: Option<String>,
    #[builder(default)]
    #[redact]
    pub extra_credentials: BTreeMap<String, String>,
}

impl Identity {
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self::builder().user(user).build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct Session {
    #[builder(default = QueryId::new_random())]
    pub query_id: QueryId,
    #[builder(default = TransactionId::new_random())]
    pub transaction_id: TransactionId,
    pub identity: Identity,
    #[builder(default, setter(strip_option, into))]
    pub catalog: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub schema: Option<String>,
}

impl Session {
    #[must_use]
    pub fn to_security_context(&self) -> SecurityContext {
        SecurityContext {
            transaction_id: self.transaction_id,
            identity: self.identity.clone(),
            query_id: self.query_id,
        }
    }
}

/// What access control decisions are made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    pub transaction_id: TransactionId,
    pub identity: Identity,
    pub query_id: QueryId,
}

/// Per-query execution context handed to data definition tasks.
#[derive(Debug, Clone)]
pub struct QueryStateMachine {
    session: Session,
}

impl QueryStateMachine {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn query_id(&self) -> QueryId {
        self.session.query_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_context_mirrors_session() {
        let session = Session::builder()
            .identity(Identity::new("alice"))
            .catalog("hive")
            .build();
        let context = session.to_security_context();
        assert_eq!(context.query_id, session.query_id);
        assert_eq!(context.transaction_id, session.transaction_id);
        assert_eq!(context.identity.user, "alice");
        assert_eq!(session.schema, None);
    }

    #[test]
    fn test_identity_debug_redacts_credentials() {
        let identity = Identity::builder()
            .user("alice")
            .extra_credentials(BTreeMap::from([(
                "token".to_string(),
                "s3cr3t-value".to_string(),
            )]))
            .build();
        let debug = format!("{identity:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cr3t-value"));
    }
}
