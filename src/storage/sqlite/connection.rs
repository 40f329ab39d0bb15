//! Shared connection handling for the `SQLite` store.
//!
//! Connection locking and the pragmas every connection is opened with.

use crate::Result;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Locks the store's connection.
///
/// A panic while the lock was held poisons it, but every statement commits
/// on its own, so the connection is taken back and reused.
pub fn lock_connection(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("connection lock poisoned by an earlier panic");
        metrics::counter!("nestlist_connection_poisoned_total").increment(1);
        poisoned.into_inner()
    })
}

/// Configures a `SQLite` connection.
///
/// # Configuration Applied
///
/// - **WAL mode**: readers do not block the writer
/// - **NORMAL synchronous**: balances durability with performance
/// - **`busy_timeout`**: waits up to 5 seconds on a locked database
///
/// # Errors
///
/// Never fails today; the pragmas are best effort because in-memory
/// databases reject WAL.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    // journal_mode answers with the resulting mode, so it needs the checked form
    let _ = conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()));
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    let _ = conn.busy_timeout(BUSY_TIMEOUT);

    Ok(())
}
