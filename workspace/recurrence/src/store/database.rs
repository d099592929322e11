use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use model::entities::{app_setting, installment, obligation, tax};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Iterable, QueryOrder, Set};
use tracing::{debug, instrument, trace};

use super::{MARKER_FORMAT, RecurrenceStore, StoreResult, parse_marker};
use crate::entity::{EntityKind, Record};

/// [`RecurrenceStore`] over the SeaORM entity tables.
///
/// Rows are written with `INSERT .. ON CONFLICT (id) DO UPDATE`, so the
/// `(parent, generated_for)` unique indexes still reject a second instance for
/// the same period.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl RecurrenceStore for SeaOrmStore {
    #[instrument(skip(self))]
    async fn fetch_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        let records: Vec<Record> = match kind {
            EntityKind::Tax => tax::Entity::find()
                .order_by_asc(tax::Column::CreatedAt)
                .all(&self.db)
                .await?
                .into_iter()
                .map(Record::Tax)
                .collect(),
            EntityKind::Obligation => obligation::Entity::find()
                .order_by_asc(obligation::Column::CreatedAt)
                .all(&self.db)
                .await?
                .into_iter()
                .map(Record::Obligation)
                .collect(),
            EntityKind::Installment => installment::Entity::find()
                .order_by_asc(installment::Column::CreatedAt)
                .all(&self.db)
                .await?
                .into_iter()
                .map(Record::Installment)
                .collect(),
        };

        debug!("Fetched {} {} rows", records.len(), kind);
        Ok(records)
    }

    #[instrument(skip(self, record), fields(kind = %record.kind(), id = %record.id()))]
    async fn upsert(&self, record: Record) -> StoreResult<()> {
        match record {
            Record::Tax(model) => {
                tax::Entity::insert(tax::ActiveModel::from(model).reset_all())
                    .on_conflict(
                        OnConflict::column(tax::Column::Id)
                            .update_columns(tax::Column::iter().filter(|column| !matches!(column, tax::Column::Id)))
                            .to_owned(),
                    )
                    .exec_without_returning(&self.db)
                    .await?;
            }
            Record::Obligation(model) => {
                obligation::Entity::insert(obligation::ActiveModel::from(model).reset_all())
                    .on_conflict(
                        OnConflict::column(obligation::Column::Id)
                            .update_columns(
                                obligation::Column::iter().filter(|column| !matches!(column, obligation::Column::Id)),
                            )
                            .to_owned(),
                    )
                    .exec_without_returning(&self.db)
                    .await?;
            }
            Record::Installment(model) => {
                installment::Entity::insert(installment::ActiveModel::from(model).reset_all())
                    .on_conflict(
                        OnConflict::column(installment::Column::Id)
                            .update_columns(
                                installment::Column::iter().filter(|column| !matches!(column, installment::Column::Id)),
                            )
                            .to_owned(),
                    )
                    .exec_without_returning(&self.db)
                    .await?;
            }
        }

        trace!("Row upserted");
        Ok(())
    }

    async fn last_run(&self) -> StoreResult<Option<NaiveDate>> {
        let setting = app_setting::Entity::find_by_id(app_setting::LAST_RECURRENCE_RUN.to_string())
            .one(&self.db)
            .await?;

        setting.map(|setting| parse_marker(&setting.value)).transpose()
    }

    #[instrument(skip(self))]
    async fn set_last_run(&self, date: NaiveDate) -> StoreResult<()> {
        let setting = app_setting::ActiveModel {
            key: Set(app_setting::LAST_RECURRENCE_RUN.to_string()),
            value: Set(date.format(MARKER_FORMAT).to_string()),
            updated_at: Set(date.and_time(NaiveTime::MIN)),
        };

        app_setting::Entity::insert(setting)
            .on_conflict(
                OnConflict::column(app_setting::Column::Key)
                    .update_columns([app_setting::Column::Value, app_setting::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        debug!("Last recurrence run set to {}", date);
        Ok(())
    }
}
