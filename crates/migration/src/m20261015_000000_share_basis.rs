//! Records which input of a share (`fixed` value or `percent`) is in effect.
//! Existing rows keep `NULL` until their next update.

use sea_orm_migration::prelude::*;

use crate::m20261001_000000_init::Shares;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum SharesBasis {
    Basis,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Shares::Table)
                    .add_column(ColumnDef::new(SharesBasis::Basis).string())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Shares::Table)
                    .drop_column(SharesBasis::Basis)
                    .to_owned(),
            )
            .await
    }
}
