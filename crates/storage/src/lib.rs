//! Durable string/long preference store.
//!
//! Reads and edits go against an in-memory mirror so callers on a UI-bound
//! thread never wait on disk. Applied edits are queued to a writer task that
//! persists them to SQLite in submission order.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValue {
    Long(i64),
    Text(String),
}

#[derive(Debug)]
enum PendingWrite {
    Put { key: String, value: PreferenceValue },
    Remove { key: String },
}

enum WriterMessage {
    Commit(Vec<PendingWrite>),
    Flush(oneshot::Sender<()>),
}

pub struct Preferences {
    values: HashMap<String, PreferenceValue>,
    writer: mpsc::UnboundedSender<WriterMessage>,
}

impl Preferences {
    /// Opens (creating if needed) the store at `database_url` and starts its
    /// writer task on the current Tokio runtime.
    pub async fn open(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid preference database url '{database_url}'"))?
            .create_if_missing(true);
        // A single long-lived connection keeps `sqlite::memory:` stores alive
        // and serializes writes.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open preference database '{database_url}'"))?;

        ensure_preferences_table(&pool).await?;
        let values = load_values(&pool).await?;
        debug!(entries = values.len(), "loaded preferences");

        let (writer, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(pool, rx));

        Ok(Self { values, writer })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_long(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(PreferenceValue::Long(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(PreferenceValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&PreferenceValue> {
        self.values.get(key)
    }

    pub fn edit(&mut self) -> PreferencesEditor<'_> {
        PreferencesEditor {
            preferences: self,
            writes: Vec::new(),
        }
    }

    /// Resolves once every edit applied before this call has been written.
    pub async fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.writer
            .send(WriterMessage::Flush(ack_tx))
            .map_err(|_| anyhow!("preference writer has stopped"))?;
        ack_rx
            .await
            .context("preference writer stopped before flushing")?;
        Ok(())
    }
}

/// Batch of edits made visible together by [`PreferencesEditor::apply`].
#[must_use = "preference edits are discarded unless applied"]
pub struct PreferencesEditor<'a> {
    preferences: &'a mut Preferences,
    writes: Vec<PendingWrite>,
}

impl PreferencesEditor<'_> {
    pub fn put_long(mut self, key: &str, value: i64) -> Self {
        self.writes.push(PendingWrite::Put {
            key: key.to_string(),
            value: PreferenceValue::Long(value),
        });
        self
    }

    pub fn put_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.writes.push(PendingWrite::Put {
            key: key.to_string(),
            value: PreferenceValue::Text(value.into()),
        });
        self
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.writes.push(PendingWrite::Remove {
            key: key.to_string(),
        });
        self
    }

    /// Updates the in-memory mirror immediately and queues the disk write.
    pub fn apply(self) {
        if self.writes.is_empty() {
            return;
        }

        for write in &self.writes {
            match write {
                PendingWrite::Put { key, value } => {
                    self.preferences.values.insert(key.clone(), value.clone());
                }
                PendingWrite::Remove { key } => {
                    self.preferences.values.remove(key);
                }
            }
        }

        let count = self.writes.len();
        if self
            .preferences
            .writer
            .send(WriterMessage::Commit(self.writes))
            .is_err()
        {
            warn!(
                writes = count,
                "preference writer has stopped; edits are kept in memory only"
            );
        }
    }
}

async fn ensure_preferences_table(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS preferences (
            key         TEXT PRIMARY KEY NOT NULL,
            long_value  INTEGER,
            text_value  TEXT,
            updated_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("failed to ensure preferences table exists")?;
    Ok(())
}

async fn load_values(pool: &Pool<Sqlite>) -> Result<HashMap<String, PreferenceValue>> {
    let rows = sqlx::query("SELECT key, long_value, text_value FROM preferences")
        .fetch_all(pool)
        .await
        .context("failed to load preferences")?;

    let mut values = HashMap::with_capacity(rows.len());
    for row in rows {
        let key: String = row.try_get("key")?;
        let long_value: Option<i64> = row.try_get("long_value")?;
        let text_value: Option<String> = row.try_get("text_value")?;
        let value = match (long_value, text_value) {
            (_, Some(text)) => PreferenceValue::Text(text),
            (Some(long), None) => PreferenceValue::Long(long),
            (None, None) => {
                warn!(key = %key, "skipping preference row without a value");
                continue;
            }
        };
        values.insert(key, value);
    }
    Ok(values)
}

async fn run_writer(pool: Pool<Sqlite>, mut rx: mpsc::UnboundedReceiver<WriterMessage>) {
    while let Some(message) = rx.recv().await {
        match message {
            WriterMessage::Commit(writes) => {
                if let Err(err) = persist(&pool, &writes).await {
                    warn!(writes = writes.len(), "failed to persist preference edits: {err:#}");
                }
            }
            WriterMessage::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    pool.close().await;
}

async fn persist(pool: &Pool<Sqlite>, writes: &[PendingWrite]) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("failed to begin preference transaction")?;

    for write in writes {
        match write {
            PendingWrite::Put { key, value } => {
                let (long_value, text_value) = match value {
                    PreferenceValue::Long(long) => (Some(*long), None),
                    PreferenceValue::Text(text) => (None, Some(text.as_str())),
                };
                sqlx::query(
                    "INSERT INTO preferences (key, long_value, text_value, updated_at)
                     VALUES (?, ?, ?, CURRENT_TIMESTAMP)
                     ON CONFLICT(key) DO UPDATE SET
                        long_value=excluded.long_value,
                        text_value=excluded.text_value,
                        updated_at=CURRENT_TIMESTAMP",
                )
                .bind(key.as_str())
                .bind(long_value)
                .bind(text_value)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("failed to write preference '{key}'"))?;
            }
            PendingWrite::Remove { key } => {
                sqlx::query("DELETE FROM preferences WHERE key = ?")
                    .bind(key.as_str())
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("failed to remove preference '{key}'"))?;
            }
        }
    }

    tx.commit()
        .await
        .context("failed to commit preference transaction")?;
    Ok(())
}

/// Turns a bare path or `sqlite:` URL into the `sqlite://` form sqlx expects.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
