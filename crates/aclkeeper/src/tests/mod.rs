use std::{
    collections::HashSet,
    sync::{Arc, RwLock},
};

use crate::{
    api::statement::{GrantOnType, PrincipalSpecification, QualifiedName, Revoke},
    implementations::InMemoryCatalog,
    service::{
        authz::{AccessControl, AuthorizationBackendUnavailable, Privilege},
        identifier::{CatalogSchemaName, Principal, QualifiedObjectName},
        session::{Identity, QueryStateMachine, SecurityContext, Session},
        InternalErrorMessage,
    },
};


/// Session for user `admin` with the given defaults.
#[must_use]
pub fn test_session(catalog: Option<&str>, schema: Option<&str>) -> Session {
    let mut session = Session::builder().identity(Identity::new("admin")).build();
    session.catalog = catalog.map(ToString::to_string);
    session.schema = schema.map(ToString::to_string);
    session
}

/// Catalog with an open transaction and a state machine whose session runs in it.
#[must_use]
pub fn setup_catalog(catalog: Option<&str>, schema: Option<&str>) -> (InMemoryCatalog, QueryStateMachine) {
    let in_memory = InMemoryCatalog::new();
    let mut session = test_session(catalog, schema);
    session.transaction_id = in_memory
        .begin_transaction()
        .expect("fresh catalog lock is never poisoned");
    (in_memory, QueryStateMachine::new(session))
}

#[must_use]
pub fn revoke_on_table(name: &str, privileges: Option<&[&str]>, grantee: &str) -> Revoke {
    Revoke {
        r#type: Some(GrantOnType::Table),
        name: QualifiedName::parse(name),
        privileges: privileges.map(|p| p.iter().map(ToString::to_string).collect()),
        grantee: PrincipalSpecification::user(grantee),
        grant_option_for: false,
        location: None,
    }
}

#[must_use]
pub fn revoke_on_schema(name: &str, privileges: Option<&[&str]>, grantee: &str) -> Revoke {
    Revoke {
        r#type: Some(GrantOnType::Schema),
        ..revoke_on_table(name, privileges, grantee)
    }
}

/// Access control that denies or fails selected checks and records every check it answers.
///
/// Actions are written `object_type:privilege`, e.g. `table:SELECT`.
#[derive(Debug, Clone, Default)]
pub struct HidingAccessControl {
    blocked_actions: Arc<RwLock<HashSet<String>>>,
    failing_actions: Arc<RwLock<HashSet<String>>>,
    checked_actions: Arc<RwLock<Vec<String>>>,
}

impl HidingAccessControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_action(&self, action: &str) {
        self.blocked_actions
            .write()
            .unwrap()
            .insert(action.to_string());
    }

    /// Makes the check for `action` fail as if the policy engine were down.
    pub fn fail_action(&self, action: &str) {
        self.failing_actions
            .write()
            .unwrap()
            .insert(action.to_string());
    }

    #[must_use]
    pub fn checked_actions(&self) -> Vec<String> {
        self.checked_actions.read().unwrap().clone()
    }

    fn decide(&self, action: String) -> Result<bool, AuthorizationBackendUnavailable> {
        self.checked_actions.write().unwrap().push(action.clone());
        if self.failing_actions.read().unwrap().contains(&action) {
            return Err(AuthorizationBackendUnavailable::new(InternalErrorMessage(
                format!("Policy engine unavailable for {action}"),
            )));
        }
        Ok(!self.blocked_actions.read().unwrap().contains(&action))
    }
}

#[async_trait::async_trait]
impl AccessControl for HidingAccessControl {
    fn implementation_name() -> &'static str {
        "test-hiding-access-control"
    }

    async fn is_allowed_revoke_schema_privilege_impl(
        &self,
        _context: &SecurityContext,
        privilege: Privilege,
        _schema: &CatalogSchemaName,
        _revokee: &Principal,
        _grant_option_for: bool,
    ) -> Result<bool, AuthorizationBackendUnavailable> {
        self.decide(format!("schema:{privilege}"))
    }

    async fn is_allowed_revoke_table_privilege_impl(
        &self,
        _context: &SecurityContext,
        privilege: Privilege,
        _table: &QualifiedObjectName,
        _revokee: &Principal,
        _grant_option_for: bool,
    ) -> Result<bool, AuthorizationBackendUnavailable> {
        self.decide(format!("table:{privilege}"))
    }
}
