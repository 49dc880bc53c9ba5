//! Ledger storage layer
//!
//! Users and their transactions. Currently in-memory; the trait is the seam
//! for a real database.

use crate::error::CoachError;
use crate::models::{NewUser, ReportingPeriod, Transaction, TransactionDraft, User};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Trait for user and transaction persistence
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn record_transaction(&self, draft: TransactionDraft) -> Result<Transaction>;
    /// Transactions for a user inside `period`, newest first
    async fn get_transactions(
        &self,
        user_id: Uuid,
        period: ReportingPeriod,
    ) -> Result<Vec<Transaction>>;
}

/// In-memory ledger for development and tests
pub struct InMemoryLedgerStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    user_order: Arc<RwLock<Vec<Uuid>>>,
    transactions_by_user: Arc<RwLock<HashMap<Uuid, Vec<Transaction>>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            user_order: Arc::new(RwLock::new(Vec::new())),
            transactions_by_user: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let user = user.into_user()?;

        {
            let mut order = self.user_order.write().await;
            order.push(user.id);
        }

        let mut users = self.users.write().await;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let order = self.user_order.read().await;
        let users = self.users.read().await;

        Ok(order.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn record_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        {
            let users = self.users.read().await;
            if !users.contains_key(&draft.user_id) {
                return Err(CoachError::NotFound(format!(
                    "User with id {} not found",
                    draft.user_id
                )));
            }
        }

        let transaction = draft.into_transaction()?;

        let mut transactions = self.transactions_by_user.write().await;
        transactions
            .entry(transaction.user_id)
            .or_insert_with(Vec::new)
            .push(transaction.clone());

        Ok(transaction)
    }

    async fn get_transactions(
        &self,
        user_id: Uuid,
        period: ReportingPeriod,
    ) -> Result<Vec<Transaction>> {
        let transactions = self.transactions_by_user.read().await;

        let mut matching: Vec<Transaction> = transactions
            .get(&user_id)
            .map(|list| {
                list.iter()
                    .rev()
                    .filter(|t| period.contains(t.date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Stable sort keeps most recently recorded first within a day
        matching.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            risk_profile: "medium".to_string(),
            goals: Some("laptop".to_string()),
            age_range: None,
            income_range: None,
            debt: None,
            emi: None,
            existing_savings: None,
        }
    }

    fn draft(user_id: Uuid, tag: &str, day: u32) -> TransactionDraft {
        TransactionDraft {
            user_id,
            amount: dec!(100),
            kind: "expense".to_string(),
            tag: Some(tag.to_string()),
            category: None,
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_users_listed_in_creation_order() {
        let store = InMemoryLedgerStore::new();
        let a = store.create_user(new_user("A")).await.unwrap();
        let b = store.create_user(new_user("B")).await.unwrap();

        let users = store.list_users().await.unwrap();
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![a.id, b.id]);
        assert_eq!(store.get_user(a.id).await.unwrap(), Some(a));
        assert_eq!(store.get_user(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_transactions_newest_first() {
        let store = InMemoryLedgerStore::new();
        let user = store.create_user(new_user("A")).await.unwrap();

        store.record_transaction(draft(user.id, "old", 1)).await.unwrap();
        store.record_transaction(draft(user.id, "first-today", 9)).await.unwrap();
        store.record_transaction(draft(user.id, "second-today", 9)).await.unwrap();

        let history = store
            .get_transactions(user.id, ReportingPeriod::AllTime)
            .await
            .unwrap();
        let tags: Vec<_> = history.iter().filter_map(|t| t.tag.as_deref()).collect();
        assert_eq!(tags, vec!["second-today", "first-today", "old"]);
    }

    #[tokio::test]
    async fn test_period_filter_and_unknown_user() {
        let store = InMemoryLedgerStore::new();
        let user = store.create_user(new_user("A")).await.unwrap();
        store.record_transaction(draft(user.id, "may", 2)).await.unwrap();

        let june = store
            .get_transactions(user.id, ReportingPeriod::Month { year: 2024, month: 6 })
            .await
            .unwrap();
        assert!(june.is_empty());

        let err = store
            .record_transaction(draft(Uuid::new_v4(), "x", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::NotFound(_)));
    }
}
