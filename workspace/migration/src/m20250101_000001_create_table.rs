use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create clients table
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(pk_uuid(Clients::Id))
                    .col(string(Clients::Name))
                    .col(string_null(Clients::Document))
                    .col(string_null(Clients::Email))
                    .col(date_time(Clients::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create taxes table
        let mut taxes = Table::create();
        taxes
            .table(Taxes::Table)
            .if_not_exists()
            .col(pk_uuid(Taxes::Id))
            .col(uuid_null(Taxes::ClientId))
            .col(string(Taxes::Name))
            .col(text_null(Taxes::Description));
        with_recurring_columns(&mut taxes);
        taxes
            .col(decimal_null(Taxes::Amount).decimal_len(16, 4))
            .col(uuid_null(Taxes::ParentTaxId))
            .foreign_key(&mut client_foreign_key("fk_tax_client", Taxes::Table, Taxes::ClientId));
        manager.create_table(taxes.to_owned()).await?;

        // Create obligations table
        let mut obligations = Table::create();
        obligations
            .table(Obligations::Table)
            .if_not_exists()
            .col(pk_uuid(Obligations::Id))
            .col(uuid_null(Obligations::ClientId))
            .col(uuid_null(Obligations::TaxId))
            .col(string(Obligations::Name))
            .col(text_null(Obligations::Description));
        with_recurring_columns(&mut obligations);
        obligations
            .col(uuid_null(Obligations::ParentObligationId))
            .foreign_key(&mut client_foreign_key(
                "fk_obligation_client",
                Obligations::Table,
                Obligations::ClientId,
            ))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_obligation_tax")
                    .from(Obligations::Table, Obligations::TaxId)
                    .to(Taxes::Table, Taxes::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .on_update(ForeignKeyAction::Cascade),
            );
        manager.create_table(obligations.to_owned()).await?;

        // Create installments table
        let mut installments = Table::create();
        installments
            .table(Installments::Table)
            .if_not_exists()
            .col(pk_uuid(Installments::Id))
            .col(uuid_null(Installments::ClientId))
            .col(string(Installments::Name))
            .col(text_null(Installments::Description))
            .col(integer(Installments::CurrentInstallment).default(1))
            .col(integer(Installments::InstallmentCount))
            .col(date(Installments::FirstDueDate));
        with_recurring_columns(&mut installments);
        installments
            .col(decimal_null(Installments::Amount).decimal_len(16, 4))
            .col(uuid_null(Installments::ParentInstallmentId))
            .foreign_key(&mut client_foreign_key(
                "fk_installment_client",
                Installments::Table,
                Installments::ClientId,
            ));
        manager.create_table(installments.to_owned()).await?;

        // Create app_settings table
        manager
            .create_table(
                Table::create()
                    .table(AppSettings::Table)
                    .if_not_exists()
                    .col(string(AppSettings::Key).primary_key())
                    .col(string(AppSettings::Value))
                    .col(date_time(AppSettings::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppSettings::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Installments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Obligations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Taxes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;

        Ok(())
    }
}

/// Adds the columns every recurring entity table carries.
fn with_recurring_columns(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(integer(Recurring::DueDay))
        .col(integer_null(Recurring::DueMonth))
        .col(string_len(Recurring::WeekendPolicy, 15).default("postpone"))
        .col(string_len(Recurring::RecurrenceType, 15).default("monthly"))
        .col(integer_null(Recurring::RecurrenceInterval))
        .col(date_null(Recurring::RecurrenceEndDate))
        .col(boolean(Recurring::AutoGenerate).default(false))
        .col(string_len(Recurring::Priority, 10).default("medium"))
        .col(string_null(Recurring::AssignedTo))
        .col(text_null(Recurring::Notes))
        .col(json(Recurring::Tags))
        .col(string_len(Recurring::Status, 15).default("pending"))
        .col(date_time_null(Recurring::CompletedAt))
        .col(string_null(Recurring::CompletedBy))
        .col(date_null(Recurring::RealizationDate))
        .col(string_len_null(Recurring::GeneratedFor, 7))
        .col(date_time(Recurring::CreatedAt))
        .col(json(Recurring::History))
}

fn client_foreign_key<T, C>(name: &str, table: T, column: C) -> ForeignKeyCreateStatement
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(Clients::Table, Clients::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .on_update(ForeignKeyAction::Cascade)
        .to_owned()
}

// Define identifiers for all tables

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    Name,
    Document,
    Email,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Taxes {
    Table,
    Id,
    ClientId,
    Name,
    Description,
    Amount,
    ParentTaxId,
}

#[derive(DeriveIden)]
enum Obligations {
    Table,
    Id,
    ClientId,
    TaxId,
    Name,
    Description,
    ParentObligationId,
}

#[derive(DeriveIden)]
enum Installments {
    Table,
    Id,
    ClientId,
    Name,
    Description,
    CurrentInstallment,
    InstallmentCount,
    FirstDueDate,
    Amount,
    ParentInstallmentId,
}

/// Columns shared by taxes, obligations and installments.
#[derive(DeriveIden)]
enum Recurring {
    DueDay,
    DueMonth,
    WeekendPolicy,
    RecurrenceType,
    RecurrenceInterval,
    RecurrenceEndDate,
    AutoGenerate,
    Priority,
    AssignedTo,
    Notes,
    Tags,
    Status,
    CompletedAt,
    CompletedBy,
    RealizationDate,
    GeneratedFor,
    CreatedAt,
    History,
}

#[derive(DeriveIden)]
enum AppSettings {
    Table,
    Key,
    Value,
    UpdatedAt,
}
