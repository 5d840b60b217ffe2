use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsersCertificate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsersCertificate::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsersCertificate::Name).string().not_null())
                    .col(ColumnDef::new(UsersCertificate::Grade).string().not_null())
                    .col(
                        ColumnDef::new(UsersCertificate::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsersCertificate::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum UsersCertificate {
    Table,
    Id,
    Name,
    Grade,
    CreatedAt,
}
