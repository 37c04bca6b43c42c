// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Tally cost tracker.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`: one background
//! thread owns the connection, and every read or write ships a closure to
//! it, making each operation atomic with respect to all others.

pub mod database;
pub mod migrations;
pub mod writer;

pub use database::{default_db_path, map_tr_err, Database};
