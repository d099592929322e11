use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::{installment, obligation, tax};
use sea_orm_migration::prelude::*;

/// One generated instance per (template, period). The recurrence engine checks this
/// before inserting, the index makes a concurrent second insert fail instead of
/// silently duplicating.
#[derive(DeriveMigrationName)]
pub struct Migration;

const TAX_INDEX: &str = "idx_taxes_parent_period";
const OBLIGATION_INDEX: &str = "idx_obligations_parent_period";
const INSTALLMENT_INDEX: &str = "idx_installments_parent_period";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(TAX_INDEX)
                    .table(Tax::table())
                    .col(Tax::column(tax::Column::ParentTaxId))
                    .col(Tax::column(tax::Column::GeneratedFor))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(OBLIGATION_INDEX)
                    .table(Obligation::table())
                    .col(Obligation::column(obligation::Column::ParentObligationId))
                    .col(Obligation::column(obligation::Column::GeneratedFor))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(INSTALLMENT_INDEX)
                    .table(Installment::table())
                    .col(Installment::column(installment::Column::ParentInstallmentId))
                    .col(Installment::column(installment::Column::GeneratedFor))
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            (TAX_INDEX, Tax::table()),
            (OBLIGATION_INDEX, Obligation::table()),
            (INSTALLMENT_INDEX, Installment::table()),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }

        Ok(())
    }
}
