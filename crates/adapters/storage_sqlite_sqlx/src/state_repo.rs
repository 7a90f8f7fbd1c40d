//! `SQLite` implementation of [`StateRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};

use myhouse_app::ports::StateRepository;
use myhouse_domain::error::MyHouseError;
use myhouse_domain::field::FieldKind;
use myhouse_domain::history::HistoryEntry;
use myhouse_domain::home_state::{HOME_STATE_ID, HomeState, StatePatch};
use myhouse_domain::time::now;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct StateRow(HomeState);

impl<'r> FromRow<'r, SqliteRow> for StateRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(HomeState {
            temperature: row.try_get("temperature")?,
            light: row.try_get("light")?,
            door: row.try_get("door")?,
            heat: row.try_get("heat")?,
        }))
    }
}

struct HistoryRow(HistoryEntry);

impl<'r> FromRow<'r, SqliteRow> for HistoryRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let kind_str: String = row.try_get("type")?;
        let created_at_str: String = row.try_get("created_at")?;

        let kind: FieldKind = kind_str
            .parse()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(HistoryEntry {
            id: row.try_get("id")?,
            kind,
            value: row.try_get("value")?,
            created_at,
        }))
    }
}

const SELECT_STATE: &str = r"
    SELECT temperature, light, door, heat FROM home_state WHERE id = ?
";

const ENSURE_STATE: &str = "INSERT OR IGNORE INTO home_state (id) VALUES (?)";

const PATCH_STATE: &str = r"
    UPDATE home_state SET
        temperature = COALESCE(?, temperature),
        light = COALESCE(?, light),
        door = COALESCE(?, door),
        heat = COALESCE(?, heat)
    WHERE id = ?
";

const INSERT_HISTORY: &str = r"
    INSERT INTO history (type, value, created_at) VALUES (?, ?, ?)
";

const SELECT_RECENT_HISTORY: &str = r"
    SELECT id, type, value, created_at FROM history
    ORDER BY id DESC
    LIMIT ?
";

/// `SQLite`-backed home state and history repository.
#[derive(Clone)]
pub struct SqliteStateRepository {
    pool: SqlitePool,
}

impl SqliteStateRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Create the singleton row if needed, apply `patch` and read the result
/// back, all on the caller's connection.
async fn write_patch(
    conn: &mut SqliteConnection,
    patch: &StatePatch,
) -> Result<HomeState, sqlx::Error> {
    sqlx::query(ENSURE_STATE)
        .bind(HOME_STATE_ID)
        .execute(&mut *conn)
        .await?;

    if !patch.is_empty() {
        sqlx::query(PATCH_STATE)
            .bind(patch.temperature.as_deref())
            .bind(patch.light)
            .bind(patch.door)
            .bind(patch.heat)
            .bind(HOME_STATE_ID)
            .execute(&mut *conn)
            .await?;
    }

    let row: StateRow = sqlx::query_as(SELECT_STATE)
        .bind(HOME_STATE_ID)
        .fetch_one(&mut *conn)
        .await?;
    Ok(row.0)
}

impl StateRepository for SqliteStateRepository {
    async fn get_state(&self) -> Result<Option<HomeState>, MyHouseError> {
        let row: Option<StateRow> = sqlx::query_as(SELECT_STATE)
            .bind(HOME_STATE_ID)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|r| r.0))
    }

    async fn upsert_state(&self, patch: StatePatch) -> Result<HomeState, MyHouseError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        let state = write_patch(&mut *tx, &patch)
            .await
            .map_err(StorageError::from)?;
        tx.commit().await.map_err(StorageError::from)?;
        Ok(state)
    }

    async fn record_mutation(
        &self,
        patch: StatePatch,
        kind: FieldKind,
        value: String,
    ) -> Result<(HomeState, HistoryEntry), MyHouseError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        let state = write_patch(&mut *tx, &patch)
            .await
            .map_err(StorageError::from)?;

        let created_at = now();
        let result = sqlx::query(INSERT_HISTORY)
            .bind(kind.as_str())
            .bind(&value)
            .bind(created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        tx.commit().await.map_err(StorageError::from)?;
        let entry = HistoryEntry {
            id: result.last_insert_rowid(),
            kind,
            value,
            created_at,
        };
        Ok((state, entry))
    }

    async fn list_history(&self, limit: u32) -> Result<Vec<HistoryEntry>, MyHouseError> {
        let rows: Vec<HistoryRow> = sqlx::query_as(SELECT_RECENT_HISTORY)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn ping(&self) -> Result<(), MyHouseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
