// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All reads and writes are serialized through tokio-rusqlite's single
//! background thread. Do NOT create additional Connection instances for the
//! same database file.

use std::path::{Path, PathBuf};

use tally_core::TallyError;

/// Convert a tokio-rusqlite error into TallyError::Storage.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> TallyError {
    TallyError::Storage {
        source: Box::new(e),
    }
}

/// Default database location for the lazy-initialization path: the platform
/// data directory, falling back to the working directory when none exists.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("tally").join("tally.db"))
        .unwrap_or_else(|| PathBuf::from("tally.db"))
}

/// Handle to one SQLite database, owning the single background connection.
///
/// Opening runs the embedded migrations, so a `Database` is always in the
/// ready state: the schema exists before the first read or write.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if necessary) the database at the given path.
    ///
    /// Parent directories are created as needed. Applies WAL journal mode,
    /// foreign keys, and a busy timeout, then runs pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TallyError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| TallyError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(|e| TallyError::Storage {
                source: Box::new(e),
            })?;

        let db = Self { conn };
        db.initialize(true).await?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Open a fresh in-memory database with the schema applied. Test use.
    pub async fn open_in_memory() -> Result<Self, TallyError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| TallyError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.initialize(false).await?;
        Ok(db)
    }

    /// Apply PRAGMAs and run migrations on the background thread.
    async fn initialize(&self, wal: bool) -> Result<(), TallyError> {
        self.conn
            .call(
                move |conn| -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                    if wal {
                        conn.pragma_update(None, "journal_mode", "WAL")?;
                    }
                    conn.pragma_update(None, "foreign_keys", "ON")?;
                    conn.pragma_update(None, "busy_timeout", 5000)?;
                    crate::migrations::run_migrations(conn)?;
                    Ok(())
                },
            )
            .await
            .map_err(|e| TallyError::Storage {
                source: match e {
                    tokio_rusqlite::Error::Error(inner) => inner,
                    other => other.to_string().into(),
                },
            })
    }

    /// The underlying tokio-rusqlite connection.
    ///
    /// Ledger operations call through this; each `call` closure runs alone on
    /// the background thread, which is the process-wide serialization point.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the database, flushing WAL state.
    pub async fn close(self) -> Result<(), TallyError> {
        self.conn.close().await.map_err(|e| TallyError::Storage {
            source: Box::new(e),
        })
    }
}
