use sea_orm_migration::prelude::*;

mod m20221012_000001_users_certificate;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20221012_000001_users_certificate::Migration)]
    }
}
