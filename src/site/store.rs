use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::database::StoreError;
use crate::identity::Identity;

use super::model::{Maintainer, Site};

#[async_trait]
pub trait SiteStore: Send + Sync {
    async fn find(&self, site_id: &str) -> Result<Option<Site>, StoreError>;

    async fn maintainers(&self, site_id: &str) -> Result<Vec<Maintainer>, StoreError>;

    /// 站长撤销跑路标记，并写入操作日志
    async fn restore_runaway(&self, site_id: &str, actor: &Identity) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgSiteStore {
    pool: PgPool,
}

impl PgSiteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SiteRecord {
    id: String,
    name: String,
    is_active: bool,
    is_runaway: bool,
}

#[derive(FromRow)]
struct MaintainerRecord {
    username: Option<String>,
    profile_url: Option<String>,
}

#[async_trait]
impl SiteStore for PgSiteStore {
    async fn find(&self, site_id: &str) -> Result<Option<Site>, StoreError> {
        let row: Option<SiteRecord> =
            sqlx::query_as("SELECT id, name, is_active, is_runaway FROM sites WHERE id = $1")
                .bind(site_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| Site {
            id: r.id,
            name: r.name,
            is_active: r.is_active,
            is_runaway: r.is_runaway,
        }))
    }

    async fn maintainers(&self, site_id: &str) -> Result<Vec<Maintainer>, StoreError> {
        let rows: Vec<MaintainerRecord> =
            sqlx::query_as("SELECT username, profile_url FROM site_maintainers WHERE site_id = $1")
                .bind(site_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|r| Maintainer {
                username: r.username,
                profile_url: r.profile_url,
            })
            .collect())
    }

    async fn restore_runaway(&self, site_id: &str, actor: &Identity) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE sites
            SET is_runaway = false, is_active = true, updated_at = NOW(), updated_by = $1
            WHERE id = $2
            "#,
        )
        .bind(actor.id)
        .bind(site_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        sqlx::query(
            r#"
            INSERT INTO site_logs (site_id, action, actor_id, actor_username, message)
            VALUES ($1, 'RESTORE_RUNAWAY', $2, $3, '站长恢复了跑路状态')
            "#,
        )
        .bind(site_id)
        .bind(actor.id)
        .bind(&actor.username)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("Site {} restored from runaway by {}", site_id, actor.username);
        Ok(())
    }
}
