//! Progress record persistence
//!
//! The store is the durability boundary: `append` must either write the
//! record or fail loudly. Implementations never update or delete rows;
//! projections over the append-only history answer "where are we now".

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::record::{ProgressRecord, StepStatus};
use crate::error::{Error, Result};
use crate::steps::{StepAgentContext, StepPhase, StepType};

/// Trait for progress record storage backends.
///
/// Allows different durable backends (SQLite, in-memory for tests) to be
/// used interchangeably.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Append a record. Must not silently drop: on return, the record is
    /// durable (or the error says it is not).
    async fn append(&self, record: ProgressRecord) -> Result<()>;

    /// The single most recent record for a task, across all steps
    async fn latest(&self, task_id: Uuid) -> Result<Option<ProgressRecord>>;

    /// The most recent record for one step of a task
    async fn latest_for_step(&self, task_id: Uuid, step_id: &str) -> Result<Option<ProgressRecord>>;

    /// Every record for a task, in append order (crash-time reconstruction)
    async fn records_for_task(&self, task_id: Uuid) -> Result<Vec<ProgressRecord>>;

    /// Backend name (for logging)
    fn name(&self) -> &str;
}

/// SQLite-backed progress store
pub struct SqliteProgressStore {
    pool: Pool<Sqlite>,
}

impl SqliteProgressStore {
    /// Open (or create) a store at `path` and run migrations
    pub async fn from_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Persistence(format!("failed to create directory: {e}")))?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create a store from an existing pool (pool must be migrated)
    #[must_use]
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// In-memory SQLite store, handy for tests and ephemeral runs
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS progress_records (
                id TEXT PRIMARY KEY,
                task_id TEXT NOT NULL,
                step_id TEXT NOT NULL,
                status TEXT NOT NULL,
                phase TEXT NOT NULL,
                step TEXT NOT NULL,
                agent TEXT,
                error TEXT,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_progress_task_time
            ON progress_records(task_id, timestamp)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_record(row: sqlx::sqlite::SqliteRow) -> Result<ProgressRecord> {
        let id: Uuid = row
            .get::<String, _>("id")
            .parse()
            .map_err(|e: uuid::Error| Error::Persistence(e.to_string()))?;
        let task_id: Uuid = row
            .get::<String, _>("task_id")
            .parse()
            .map_err(|e: uuid::Error| Error::Persistence(e.to_string()))?;
        let status: StepStatus = row
            .get::<String, _>("status")
            .parse()
            .map_err(Error::Persistence)?;
        let phase: StepPhase = row
            .get::<String, _>("phase")
            .parse()
            .map_err(Error::Persistence)?;
        let step: StepType = row
            .get::<String, _>("step")
            .parse()
            .map_err(Error::Persistence)?;
        let agent: Option<StepAgentContext> = row
            .get::<Option<String>, _>("agent")
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|e| Error::Persistence(format!("bad agent snapshot: {e}")))?;

        Ok(ProgressRecord {
            id,
            task_id,
            step_id: row.get("step_id"),
            status,
            phase,
            step,
            agent,
            error: row.get("error"),
            timestamp: row.get("timestamp"),
        })
    }
}

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    #[instrument(skip(self, record), fields(task_id = %record.task_id, step_id = %record.step_id, status = %record.status))]
    async fn append(&self, record: ProgressRecord) -> Result<()> {
        let agent_json = record
            .agent
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| Error::Persistence(format!("bad agent snapshot: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO progress_records (
                id, task_id, step_id, status, phase, step, agent, error, timestamp
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.task_id.to_string())
        .bind(&record.step_id)
        .bind(record.status.as_str())
        .bind(record.phase.as_str())
        .bind(record.step.as_str())
        .bind(agent_json)
        .bind(&record.error)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await?;

        debug!("progress record appended");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn latest(&self, task_id: Uuid) -> Result<Option<ProgressRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, task_id, step_id, status, phase, step, agent, error, timestamp
            FROM progress_records
            WHERE task_id = ?
            ORDER BY timestamp DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .bind(task_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    #[instrument(skip(self))]
    async fn latest_for_step(&self, task_id: Uuid, step_id: &str) -> Result<Option<ProgressRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, task_id, step_id, status, phase, step, agent, error, timestamp
            FROM progress_records
            WHERE task_id = ? AND step_id = ?
            ORDER BY timestamp DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .bind(task_id.to_string())
        .bind(step_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    #[instrument(skip(self))]
    async fn records_for_task(&self, task_id: Uuid) -> Result<Vec<ProgressRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, task_id, step_id, status, phase, step, agent, error, timestamp
            FROM progress_records
            WHERE task_id = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(task_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

/// In-memory progress store for tests and embedded use
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: Arc<RwLock<Vec<ProgressRecord>>>,
}

impl MemoryProgressStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, across all tasks
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn append(&self, record: ProgressRecord) -> Result<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn latest(&self, task_id: Uuid) -> Result<Option<ProgressRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .rev()
            .find(|r| r.task_id == task_id)
            .cloned())
    }

    async fn latest_for_step(&self, task_id: Uuid, step_id: &str) -> Result<Option<ProgressRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .rev()
            .find(|r| r.task_id == task_id && r.step_id == step_id)
            .cloned())
    }

    async fn records_for_task(&self, task_id: Uuid) -> Result<Vec<ProgressRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.task_id == task_id)
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
