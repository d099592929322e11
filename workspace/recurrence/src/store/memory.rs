use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::{RecurrenceStore, StoreError, StoreResult};
use crate::entity::{EntityKind, Record};

/// A store kept in memory, used by tests and dry runs.
///
/// Enforces the same `(parent, generated_for)` uniqueness as the database
/// tables and can be told to fail or stall to exercise error paths.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<Record>>,
    last_run: RwLock<Option<NaiveDate>>,
    failing_kinds: RwLock<HashSet<EntityKind>>,
    fail_upserts: RwLock<bool>,
    delay: RwLock<Option<Duration>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Makes every `fetch_all(kind)` fail.
    pub async fn fail_fetch(&self, kind: EntityKind) {
        self.failing_kinds.write().await.insert(kind);
    }

    pub async fn fail_upserts(&self) {
        *self.fail_upserts.write().await = true;
    }

    /// Delays every call by `delay`.
    pub async fn stall(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn set_marker(&self, date: Option<NaiveDate>) {
        *self.last_run.write().await = date;
    }

    pub async fn records(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }

    pub async fn records_of(&self, kind: EntityKind) -> Vec<Record> {
        self.records
            .read()
            .await
            .iter()
            .filter(|record| record.kind() == kind)
            .cloned()
            .collect()
    }

    async fn pause(&self) {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RecurrenceStore for InMemoryStore {
    async fn fetch_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        self.pause().await;
        if self.failing_kinds.read().await.contains(&kind) {
            return Err(StoreError::Unavailable(format!("{kind} table unavailable")));
        }
        Ok(self.records_of(kind).await)
    }

    async fn upsert(&self, record: Record) -> StoreResult<()> {
        self.pause().await;
        if *self.fail_upserts.read().await {
            return Err(StoreError::Unavailable("writes rejected".to_string()));
        }

        let mut records = self.records.write().await;
        let key = lineage_key(&record);
        let duplicate = key.is_some()
            && records
                .iter()
                .any(|existing| existing.id() != record.id() && lineage_key(existing) == key);
        if duplicate {
            return Err(StoreError::Unavailable(format!(
                "unique constraint violated for {} {}",
                record.kind(),
                record.id()
            )));
        }

        match records.iter_mut().find(|existing| existing.id() == record.id()) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }

    async fn last_run(&self) -> StoreResult<Option<NaiveDate>> {
        self.pause().await;
        Ok(*self.last_run.read().await)
    }

    async fn set_last_run(&self, date: NaiveDate) -> StoreResult<()> {
        self.pause().await;
        *self.last_run.write().await = Some(date);
        Ok(())
    }
}

/// `(kind, parent, period)` of generated rows; `None` for templates.
fn lineage_key(record: &Record) -> Option<(EntityKind, sea_orm::prelude::Uuid, String)> {
    let (parent, period) = match record {
        Record::Tax(model) => (model.parent_tax_id, model.generated_for.clone()),
        Record::Obligation(model) => (model.parent_obligation_id, model.generated_for.clone()),
        Record::Installment(model) => (model.parent_installment_id, model.generated_for.clone()),
    };
    Some((record.kind(), parent?, period?))
}
