// 数据库模块
// 存储层公共错误类型与迁移入口

use sqlx::PgPool;

/// 存储层错误，唯一约束冲突单独成一类
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("record not found")]
    NotFound,
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

/// 执行 migrations/ 下的建表脚本
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
