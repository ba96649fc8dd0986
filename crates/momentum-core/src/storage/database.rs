//! SQLite-based task and calendar storage.
//!
//! Provides persistent storage for:
//! - Tasks with their emotion ratings and status timestamps
//! - Calendar time blocks
//! - Key-value store for application state (the focus session)

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, warn};

use super::{data_dir, migrations};
use crate::calendar::{BlockType, TimeBlock};
use crate::error::{DatabaseError, Result, ValidationError};
use crate::session::FocusSession;
use crate::task::{EmotionRecord, Task, TaskRecord, TaskStatus};
use crate::time::MINUTES_PER_DAY;

const SESSION_KEY: &str = "focus_session";
const DATE_FORMAT: &str = "%Y-%m-%d";

const TASK_COLUMNS: &str = "id, title, deadline, achievement, resistance, status,
    created_at, started_at, completed_at, rescheduled_to";

const BLOCK_COLUMNS: &str = "id, date, start_min, end_min, label, block_type, recurring";

/// SQLite database for tasks and calendar blocks.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/momentum.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("momentum.db"))
    }

    /// Open or create the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Insert or replace a task.
    pub fn save_task(&self, task: &Task) -> Result<()> {
        let record = TaskRecord::from(task);
        self.conn.execute(
            "INSERT OR REPLACE INTO tasks (id, title, deadline, achievement, resistance, status,
                created_at, started_at, completed_at, rescheduled_to)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id,
                record.title,
                record.deadline,
                record.emotion_matrix.achievement,
                record.emotion_matrix.resistance,
                record.status,
                record.created_at,
                record.started_at,
                record.completed_at,
                record.rescheduled_to,
            ],
        )?;
        Ok(())
    }

    /// Raw task rows, ordered by deadline text.
    pub fn task_records(&self, status: Option<TaskStatus>) -> Result<Vec<TaskRecord>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE ?1 IS NULL OR status = ?1
             ORDER BY deadline, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![status.map(|s| s.as_str())], task_record_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Validated tasks, ordered by deadline.
    ///
    /// Malformed rows are skipped with a warning; [`Self::task_records`]
    /// still returns them.
    pub fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        for record in self.task_records(status)? {
            match record.validate() {
                Ok(task) => tasks.push(task),
                Err(e) => warn!(id = %record.id, error = %e, "skipping malformed task row"),
            }
        }
        tasks.sort_by_key(|t| t.deadline);
        Ok(tasks)
    }

    pub fn get_task_record(&self, id: &str) -> Result<TaskRecord> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], task_record_from_row)
            .optional()?
            .ok_or_else(|| {
                DatabaseError::NotFound {
                    entity: "task",
                    id: id.to_string(),
                }
                .into()
            })
    }

    pub fn get_task(&self, id: &str) -> Result<Task> {
        Ok(self.get_task_record(id)?.validate()?)
    }

    pub fn delete_task(&self, id: &str) -> Result<()> {
        let n = self.conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(DatabaseError::NotFound {
                entity: "task",
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Persist a deferral: the postponed task and its booked session blocks, atomically.
    pub fn record_deferral(&self, task: &Task, bookings: &[TimeBlock]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.save_task(task)?;
        for block in bookings {
            self.save_block(block)?;
        }
        tx.commit()?;
        debug!(task = %task.id, blocks = bookings.len(), "recorded deferral");
        Ok(())
    }

    // ── Time blocks ──────────────────────────────────────────────────

    pub fn save_block(&self, block: &TimeBlock) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO time_blocks (id, date, start_min, end_min, label, block_type, recurring)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                block.id,
                block.date.format(DATE_FORMAT).to_string(),
                block.start,
                block.end,
                block.label,
                block.block_type.as_str(),
                block.recurring,
            ],
        )?;
        Ok(())
    }

    /// Blocks with `from <= date <= to`, ordered by date and start.
    pub fn blocks_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<TimeBlock>> {
        let sql = format!(
            "SELECT {BLOCK_COLUMNS} FROM time_blocks
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date, start_min"
        );
        self.query_blocks(
            &sql,
            params![from.format(DATE_FORMAT).to_string(), to.format(DATE_FORMAT).to_string()],
        )
    }

    pub fn blocks_on(&self, date: NaiveDate) -> Result<Vec<TimeBlock>> {
        self.blocks_between(date, date)
    }

    pub fn all_blocks(&self) -> Result<Vec<TimeBlock>> {
        let sql = format!("SELECT {BLOCK_COLUMNS} FROM time_blocks ORDER BY date, start_min");
        self.query_blocks(&sql, [])
    }

    fn query_blocks(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<TimeBlock>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, raw_block_from_row)?;
        let mut blocks = Vec::new();
        for row in rows {
            let raw = row?;
            let id = raw.id.clone();
            match raw.into_block() {
                Ok(block) => blocks.push(block),
                Err(e) => warn!(id = %id, error = %e, "skipping malformed block row"),
            }
        }
        Ok(blocks)
    }

    pub fn delete_block(&self, id: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM time_blocks WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(DatabaseError::NotFound {
                entity: "time block",
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    // ── Key-value state ──────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// The persisted focus session, if any.
    pub fn load_session(&self) -> Result<Option<FocusSession>> {
        match self.kv_get(SESSION_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn save_session(&self, session: &FocusSession) -> Result<()> {
        self.kv_set(SESSION_KEY, &serde_json::to_string(session)?)
    }
}

fn task_record_from_row(row: &Row<'_>) -> rusqlite::Result<TaskRecord> {
    Ok(TaskRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        deadline: row.get(2)?,
        emotion_matrix: EmotionRecord {
            achievement: row.get(3)?,
            resistance: row.get(4)?,
        },
        status: row.get(5)?,
        created_at: row.get(6)?,
        started_at: row.get(7)?,
        completed_at: row.get(8)?,
        rescheduled_to: row.get(9)?,
    })
}

struct RawBlock {
    id: String,
    date: String,
    start: i64,
    end: i64,
    label: String,
    block_type: String,
    recurring: bool,
}

impl RawBlock {
    fn into_block(self) -> std::result::Result<TimeBlock, ValidationError> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(|_| {
            ValidationError::InvalidValue {
                field: "date".to_string(),
                message: format!("stored date {:?} is malformed", self.date),
            }
        })?;
        let block_type: BlockType = self.block_type.parse()?;
        let start = stored_minutes("start", self.start)?;
        let end = stored_minutes("end", self.end)?;
        let mut block = TimeBlock::new(date, start, end, self.label, block_type)?;
        block.id = self.id;
        block.recurring = self.recurring;
        Ok(block)
    }
}

fn stored_minutes(field: &str, value: i64) -> std::result::Result<u16, ValidationError> {
    u16::try_from(value).map_err(|_| ValidationError::OutOfRange {
        field: field.to_string(),
        value,
        min: 0,
        max: i64::from(MINUTES_PER_DAY),
    })
}

fn raw_block_from_row(row: &Row<'_>) -> rusqlite::Result<RawBlock> {
    Ok(RawBlock {
        id: row.get(0)?,
        date: row.get(1)?,
        start: row.get(2)?,
        end: row.get(3)?,
        label: row.get(4)?,
        block_type: row.get(5)?,
        recurring: row.get(6)?,
    })
}
