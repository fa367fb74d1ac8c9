//! In-memory storage backend
//!
//! Each collection sits behind one `std::sync::Mutex`; every read or write is
//! a point-in-time snapshot under that lock and never awaits while holding
//! it, so each individual write is atomic.
//!
//! A scope adds two things on top:
//! - per-account async locks, held until commit or rollback, which serialize
//!   the read-check-write sequence of concurrent transfers on one account;
//! - an undo journal fed by the scoped store handles. Rollback (or dropping
//!   an open scope) replays it in reverse; commit discards it.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};

use super::{StorageBackend, TransactionScope, canonical_lock_order};
use crate::account::{Account, AccountStore};
use crate::core_types::{AccountId, Cents, TransferId};
use crate::errors::BankError;
use crate::transfer::{Transfer, TransferStore};

/// Per-account lock table, shared between the account store and its scopes
type AccountLocks = DashMap<AccountId, Arc<tokio::sync::Mutex<()>>>;

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Inverse of one scoped write
#[derive(Debug)]
enum Undo {
    AccountInserted(AccountId),
    BalanceChanged { id: AccountId, previous: Cents },
    TransferInserted(TransferId),
}

type Journal = Arc<Mutex<Vec<Undo>>>;

// ============================================================================
// Accounts
// ============================================================================

#[derive(Default)]
struct AccountTable {
    rows: Vec<Account>,
    by_id: HashMap<AccountId, usize>,
    by_tax_id: HashMap<String, usize>,
}

impl AccountTable {
    fn remove(&mut self, id: &AccountId) {
        if let Some(index) = self.by_id.get(id).copied() {
            self.rows.remove(index);
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        self.by_tax_id.clear();
        for (index, row) in self.rows.iter().enumerate() {
            self.by_id.insert(row.id.clone(), index);
            self.by_tax_id.insert(row.tax_id.clone(), index);
        }
    }
}

/// In-memory account store
///
/// Cloning yields another handle to the same table.
#[derive(Clone, Default)]
pub struct MemAccountStore {
    table: Arc<Mutex<AccountTable>>,
    locks: Arc<AccountLocks>,
    journal: Option<Journal>,
}

impl MemAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, undo: Undo) {
        if let Some(journal) = &self.journal {
            guard(journal).push(undo);
        }
    }
}

#[async_trait]
impl AccountStore for MemAccountStore {
    fn generate_identifier(&self) -> AccountId {
        let table = guard(&self.table);
        loop {
            let id = AccountId::generate();
            if !table.by_id.contains_key(&id) {
                return id;
            }
        }
    }

    async fn store(&self, mut account: Account) -> Result<Account, BankError> {
        if account.id.is_empty() {
            return Err(BankError::MissingIdentity);
        }
        account.created_at = Utc::now();

        let mut table = guard(&self.table);
        if table.by_id.contains_key(&account.id) || table.by_tax_id.contains_key(&account.tax_id) {
            return Err(BankError::DuplicateIdentity);
        }
        let index = table.rows.len();
        table.by_id.insert(account.id.clone(), index);
        table.by_tax_id.insert(account.tax_id.clone(), index);
        table.rows.push(account.clone());
        drop(table);

        self.locks
            .insert(account.id.clone(), Arc::new(tokio::sync::Mutex::new(())));
        self.record(Undo::AccountInserted(account.id.clone()));
        info!(account_id = %account.id, "account stored");
        Ok(account)
    }

    async fn update_balance(&self, account: &Account) -> Result<(), BankError> {
        if account.id.is_empty() {
            return Err(BankError::MissingIdentity);
        }
        let mut table = guard(&self.table);
        let index = *table
            .by_id
            .get(&account.id)
            .ok_or(BankError::AccountNotFound)?;
        let previous = std::mem::replace(&mut table.rows[index].balance, account.balance);
        drop(table);

        self.record(Undo::BalanceChanged {
            id: account.id.clone(),
            previous,
        });
        Ok(())
    }

    async fn get_by_id(&self, id: &AccountId) -> Result<Account, BankError> {
        if id.is_empty() {
            return Err(BankError::MissingIdentity);
        }
        let table = guard(&self.table);
        table
            .by_id
            .get(id)
            .map(|&index| table.rows[index].clone())
            .ok_or(BankError::AccountNotFound)
    }

    async fn get_by_tax_id(&self, tax_id: &str) -> Result<Account, BankError> {
        let table = guard(&self.table);
        table
            .by_tax_id
            .get(tax_id)
            .map(|&index| table.rows[index].clone())
            .ok_or(BankError::AccountNotFound)
    }

    async fn list_all(&self) -> Result<Vec<Account>, BankError> {
        Ok(guard(&self.table).rows.clone())
    }

    fn scoped_to(&self, scope: &dyn TransactionScope) -> Result<Arc<dyn AccountStore>, BankError> {
        let scope = MemScope::downcast(scope)?;
        Ok(Arc::new(Self {
            table: self.table.clone(),
            locks: self.locks.clone(),
            journal: Some(scope.journal.clone()),
        }))
    }
}

// ============================================================================
// Transfers
// ============================================================================

#[derive(Default)]
struct TransferTable {
    rows: Vec<Transfer>,
    by_id: HashMap<TransferId, usize>,
}

impl TransferTable {
    fn remove(&mut self, id: &TransferId) {
        if let Some(index) = self.by_id.get(id).copied() {
            self.rows.remove(index);
            self.by_id = self
                .rows
                .iter()
                .enumerate()
                .map(|(index, row)| (row.id.clone(), index))
                .collect();
        }
    }
}

/// In-memory transfer store
#[derive(Clone, Default)]
pub struct MemTransferStore {
    table: Arc<Mutex<TransferTable>>,
    journal: Option<Journal>,
}

impl MemTransferStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransferStore for MemTransferStore {
    fn generate_identifier(&self) -> TransferId {
        let table = guard(&self.table);
        loop {
            let id = TransferId::generate();
            if !table.by_id.contains_key(&id) {
                return id;
            }
        }
    }

    async fn store(&self, mut transfer: Transfer) -> Result<Transfer, BankError> {
        if transfer.id.is_empty() {
            return Err(BankError::MissingIdentity);
        }
        transfer.created_at = Some(Utc::now());

        let mut table = guard(&self.table);
        if table.by_id.contains_key(&transfer.id) {
            return Err(BankError::DuplicateIdentity);
        }
        let index = table.rows.len();
        table.by_id.insert(transfer.id.clone(), index);
        table.rows.push(transfer.clone());
        drop(table);

        if let Some(journal) = &self.journal {
            guard(journal).push(Undo::TransferInserted(transfer.id.clone()));
        }
        Ok(transfer)
    }

    async fn get_by_id(&self, id: &TransferId) -> Result<Transfer, BankError> {
        if id.is_empty() {
            return Err(BankError::MissingIdentity);
        }
        let table = guard(&self.table);
        table
            .by_id
            .get(id)
            .map(|&index| table.rows[index].clone())
            .ok_or(BankError::TransferNotFound)
    }

    async fn list_by_account_id(&self, account_id: &AccountId) -> Result<Vec<Transfer>, BankError> {
        Ok(guard(&self.table)
            .rows
            .iter()
            .filter(|tr| tr.involves(account_id))
            .cloned()
            .collect())
    }

    fn scoped_to(&self, scope: &dyn TransactionScope) -> Result<Arc<dyn TransferStore>, BankError> {
        let scope = MemScope::downcast(scope)?;
        Ok(Arc::new(Self {
            table: self.table.clone(),
            journal: Some(scope.journal.clone()),
        }))
    }
}

// ============================================================================
// Scope
// ============================================================================

/// Lock holder and undo journal for one unit of work
pub struct MemScope {
    accounts: Arc<Mutex<AccountTable>>,
    transfers: Arc<Mutex<TransferTable>>,
    locks: Arc<AccountLocks>,
    held: tokio::sync::Mutex<Vec<(AccountId, OwnedMutexGuard<()>)>>,
    journal: Journal,
    closed: AtomicBool,
}

impl MemScope {
    fn downcast(scope: &dyn TransactionScope) -> Result<&MemScope, BankError> {
        scope
            .as_any()
            .downcast_ref::<MemScope>()
            .ok_or_else(|| BankError::Storage("scope was not opened by the memory backend".into()))
    }

    /// Replay the journal newest-first
    fn undo(&self) {
        let entries = std::mem::take(&mut *guard(&self.journal));
        if entries.is_empty() {
            return;
        }
        debug!(entries = entries.len(), "undoing scoped writes");
        for entry in entries.into_iter().rev() {
            match entry {
                Undo::AccountInserted(id) => {
                    guard(&self.accounts).remove(&id);
                    self.locks.remove(&id);
                }
                Undo::BalanceChanged { id, previous } => {
                    let mut table = guard(&self.accounts);
                    if let Some(index) = table.by_id.get(&id).copied() {
                        table.rows[index].balance = previous;
                    }
                }
                Undo::TransferInserted(id) => guard(&self.transfers).remove(&id),
            }
        }
    }

    fn close(&self) -> Result<(), BankError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(BankError::ScopeClosed);
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionScope for MemScope {
    async fn lock_accounts(&self, ids: &[AccountId]) -> Result<(), BankError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BankError::ScopeClosed);
        }
        let mut held = self.held.lock().await;
        for id in canonical_lock_order(ids) {
            if held.iter().any(|(locked, _)| locked == &id) {
                continue;
            }
            // Clone the Arc out so no DashMap shard guard lives across the await.
            let lock = match self.locks.get(&id) {
                Some(entry) => entry.value().clone(),
                None => continue,
            };
            let owned = lock.lock_owned().await;
            held.push((id, owned));
        }
        Ok(())
    }

    async fn commit(&self) -> Result<(), BankError> {
        self.close()?;
        guard(&self.journal).clear();
        self.held.lock().await.clear();
        Ok(())
    }

    async fn rollback(&self) -> Result<(), BankError> {
        self.close()?;
        self.undo();
        self.held.lock().await.clear();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for MemScope {
    fn drop(&mut self) {
        if !*self.closed.get_mut() {
            self.undo();
        }
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Process-local backend; construct once and share
#[derive(Clone, Default)]
pub struct MemoryBackend {
    accounts: MemAccountStore,
    transfers: MemTransferStore,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn accounts(&self) -> Arc<dyn AccountStore> {
        Arc::new(self.accounts.clone())
    }

    fn transfers(&self) -> Arc<dyn TransferStore> {
        Arc::new(self.transfers.clone())
    }

    async fn begin(&self) -> Result<Box<dyn TransactionScope>, BankError> {
        Ok(Box::new(MemScope {
            accounts: self.accounts.table.clone(),
            transfers: self.transfers.table.clone(),
            locks: self.accounts.locks.clone(),
            held: tokio::sync::Mutex::new(Vec::new()),
            journal: Journal::default(),
            closed: AtomicBool::new(false),
        }))
    }

    async fn health_check(&self) -> Result<(), BankError> {
        Ok(())
    }
}
