use async_trait::async_trait;
use certify_common::entities::certificates;
use certify_common::{CertificateRecord, CertifyResult};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

/// Record store holding one immutable row per certificate id.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    async fn find(&self, id: &str) -> CertifyResult<Option<CertificateRecord>>;

    /// Inserts `record` unless a row with the same id already exists.
    /// Returns `false` when the insert lost to an existing row.
    async fn insert_if_absent(&self, record: &CertificateRecord) -> CertifyResult<bool>;
}

#[derive(Clone)]
pub struct SeaOrmCertificateStore {
    db: DatabaseConnection,
}

impl SeaOrmCertificateStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CertificateStore for SeaOrmCertificateStore {
    async fn find(&self, id: &str) -> CertifyResult<Option<CertificateRecord>> {
        let model = certificates::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(CertificateRecord::from))
    }

    async fn insert_if_absent(&self, record: &CertificateRecord) -> CertifyResult<bool> {
        let active = certificates::ActiveModel {
            id: Set(record.id.clone()),
            name: Set(record.name.clone()),
            grade: Set(record.grade.clone()),
            created_at: Set(record.created_at),
        };
        let inserted = certificates::Entity::insert(active)
            .on_conflict(
                OnConflict::column(certificates::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(inserted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certify_migration::Migrator;
    use sea_orm::{ConnectOptions, Database, PaginatorTrait};
    use sea_orm_migration::MigratorTrait;

    async fn sqlite_store() -> SeaOrmCertificateStore {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmCertificateStore::new(db)
    }

    fn record(id: &str, name: &str, created_at: i64) -> CertificateRecord {
        CertificateRecord {
            id: id.to_string(),
            name: name.to_string(),
            grade: "9".to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn find_returns_none_for_unknown_id() {
        let store = sqlite_store().await;
        assert!(store.find("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn conditional_insert_keeps_first_record() {
        let store = sqlite_store().await;

        assert!(store.insert_if_absent(&record("c-1", "Ana", 1_000)).await.unwrap());
        assert!(!store.insert_if_absent(&record("c-1", "Bruno", 2_000)).await.unwrap());

        let stored = store.find("c-1").await.unwrap().unwrap();
        assert_eq!(stored, record("c-1", "Ana", 1_000));

        let rows = certificates::Entity::find().count(&store.db).await.unwrap();
        assert_eq!(rows, 1);
    }
}
