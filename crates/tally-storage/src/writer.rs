// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-writer documentation and enforcement.
//!
//! All reads and writes in tally-storage are serialized through
//! `tokio-rusqlite`'s single background thread. The `Database` struct IS the
//! single serialization point: callers from any number of threads or tasks
//! ship closures to it, and each closure runs to completion before the next,
//! so every operation is atomic with respect to all others.
//!
//! **Do NOT create additional Connection instances for the same file.**

// The single-writer pattern is enforced by design:
// - `Database` wraps a single `tokio_rusqlite::Connection`
// - Ledger operations accept `&Database` and use `database.connection().call()`
// - tokio-rusqlite serializes all closure calls on one background thread
// - This eliminates SQLITE_BUSY errors under concurrent access
