use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::service::{
    CatalogBackendError, CatalogRevokeSchemaPrivilegesError, CatalogRevokeTablePrivilegesError,
    InternalErrorMessage, SchemaNotFound, TableHandle, TableNotFound,
    authz::{Privilege, PrivilegeSet},
    identifier::{CatalogSchemaName, Principal, QualifiedObjectName, TableId, TransactionId},
    metadata::Metadata,
    session::Session,
    transaction::TransactionManager,
};

/// Privileges a principal holds on one object. The value is the grant option.
pub type Grants = BTreeMap<Privilege, bool>;

#[derive(Debug, Default)]
struct CatalogState {
    schemas: BTreeSet<CatalogSchemaName>,
    tables: BTreeMap<QualifiedObjectName, TableId>,
    schema_grants: BTreeMap<(CatalogSchemaName, Principal), Grants>,
    table_grants: BTreeMap<(QualifiedObjectName, Principal), Grants>,
    active_transactions: HashSet<TransactionId>,
}

/// Catalog and transaction manager kept in process memory.
///
/// Each revoke is applied under one write lock, so concurrent readers observe
/// either none or all of its privileges removed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

fn lock_poisoned<T>(_: PoisonError<T>) -> CatalogBackendError {
    CatalogBackendError::new_unexpected(InternalErrorMessage(
        "In-memory catalog lock poisoned".to_string(),
    ))
}

fn revoke_grants(
    grants: Option<&mut Grants>,
    privileges: &PrivilegeSet,
    grant_option_for: bool,
) -> bool {
    let Some(grants) = grants else {
        return false;
    };
    for privilege in privileges {
        if grant_option_for {
            if let Some(with_grant_option) = grants.get_mut(&privilege) {
                *with_grant_option = false;
            }
        } else {
            grants.remove(&privilege);
        }
    }
    grants.is_empty()
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogState>, CatalogBackendError> {
        self.state.read().map_err(lock_poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogState>, CatalogBackendError> {
        self.state.write().map_err(lock_poisoned)
    }

    pub fn begin_transaction(&self) -> Result<TransactionId, CatalogBackendError> {
        let transaction_id = TransactionId::new_random();
        self.write()?.active_transactions.insert(transaction_id);
        Ok(transaction_id)
    }

    /// Returns `false` if the transaction was not active.
    pub fn end_transaction(&self, transaction_id: TransactionId) -> Result<bool, CatalogBackendError> {
        Ok(self.write()?.active_transactions.remove(&transaction_id))
    }

    pub fn create_schema(&self, schema: CatalogSchemaName) -> Result<(), CatalogBackendError> {
        self.write()?.schemas.insert(schema);
        Ok(())
    }

    /// Creates the table and its schema if needed.
    pub fn create_table(
        &self,
        table: QualifiedObjectName,
    ) -> Result<TableId, CatalogBackendError> {
        let mut state = self.write()?;
        state.schemas.insert(table.schema());
        let table_id = *state.tables.entry(table).or_insert_with(TableId::new_random);
        Ok(table_id)
    }

    pub fn grant_schema_privileges(
        &self,
        schema: &CatalogSchemaName,
        privileges: &PrivilegeSet,
        grantee: &Principal,
        with_grant_option: bool,
    ) -> Result<(), CatalogBackendError> {
        let mut state = self.write()?;
        let grants = state
            .schema_grants
            .entry((schema.clone(), grantee.clone()))
            .or_default();
        grants.extend(privileges.iter().map(|p| (p, with_grant_option)));
        Ok(())
    }

    pub fn grant_table_privileges(
        &self,
        table: &QualifiedObjectName,
        privileges: &PrivilegeSet,
        grantee: &Principal,
        with_grant_option: bool,
    ) -> Result<(), CatalogBackendError> {
        let mut state = self.write()?;
        let grants = state
            .table_grants
            .entry((table.clone(), grantee.clone()))
            .or_default();
        grants.extend(privileges.iter().map(|p| (p, with_grant_option)));
        Ok(())
    }

    pub fn schema_grants(
        &self,
        schema: &CatalogSchemaName,
        grantee: &Principal,
    ) -> Result<Grants, CatalogBackendError> {
        Ok(self
            .read()?
            .schema_grants
            .get(&(schema.clone(), grantee.clone()))
            .cloned()
            .unwrap_or_default())
    }

    pub fn table_grants(
        &self,
        table: &QualifiedObjectName,
        grantee: &Principal,
    ) -> Result<Grants, CatalogBackendError> {
        Ok(self
            .read()?
            .table_grants
            .get(&(table.clone(), grantee.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl TransactionManager for InMemoryCatalog {
    async fn is_active(&self, transaction_id: TransactionId) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .active_transactions
            .contains(&transaction_id)
    }
}

#[async_trait::async_trait]
impl Metadata for InMemoryCatalog {
    async fn schema_exists(
        &self,
        _session: &Session,
        schema: &CatalogSchemaName,
    ) -> Result<bool, CatalogBackendError> {
        Ok(self.read()?.schemas.contains(schema))
    }

    async fn get_table_handle(
        &self,
        _session: &Session,
        table: &QualifiedObjectName,
    ) -> Result<Option<TableHandle>, CatalogBackendError> {
        Ok(self
            .read()?
            .tables
            .get(table)
            .map(|table_id| TableHandle::new(table.catalog_name.clone(), *table_id)))
    }

    async fn revoke_schema_privileges(
        &self,
        _session: &Session,
        schema: &CatalogSchemaName,
        privileges: &PrivilegeSet,
        revokee: &Principal,
        grant_option_for: bool,
    ) -> Result<(), CatalogRevokeSchemaPrivilegesError> {
        let mut state = self.write()?;
        if !state.schemas.contains(schema) {
            return Err(SchemaNotFound::new(schema.clone()).into());
        }
        let key = (schema.clone(), revokee.clone());
        if revoke_grants(state.schema_grants.get_mut(&key), privileges, grant_option_for) {
            state.schema_grants.remove(&key);
        }
        Ok(())
    }

    async fn revoke_table_privileges(
        &self,
        _session: &Session,
        table: &QualifiedObjectName,
        privileges: &PrivilegeSet,
        revokee: &Principal,
        grant_option_for: bool,
    ) -> Result<(), CatalogRevokeTablePrivilegesError> {
        let mut state = self.write()?;
        if !state.tables.contains_key(table) {
            return Err(TableNotFound::new(table.clone()).into());
        }
        let key = (table.clone(), revokee.clone());
        if revoke_grants(state.table_grants.get_mut(&key), privileges, grant_option_for) {
            state.table_grants.remove(&key);
        }
        Ok(())
    }
}
