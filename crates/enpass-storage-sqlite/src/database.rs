//! Database connection and unlock handshake

use crate::{encryption::DatabaseKey, Error, Result};
use enpass_params::VERIFICATION_TABLE;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use zeroize::Zeroizing;

/// Unlocked, read-only connection to an encrypted vault
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open and unlock a vault with its raw SQLCipher key
    ///
    /// Any storage failure during the handshake is reported as
    /// [`Error::Unlock`]; the connection is closed before returning.
    pub fn open<P: AsRef<Path>>(
        path: P,
        key: &DatabaseKey,
        cipher_compatibility: u32,
    ) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            tracing::warn!("Failed to open vault database: {}", e);
            Error::Unlock
        })?;

        match unlock(&conn, key, cipher_compatibility) {
            Ok(()) => {
                tracing::debug!("Vault database unlocked: {}", path.as_ref().display());
                Ok(Self { conn })
            }
            Err(e) => {
                tracing::warn!("Vault unlock failed: {}", e);
                if let Err((_, close_err)) = conn.close() {
                    tracing::warn!("Failed to close vault database after unlock failure: {}", close_err);
                }
                Err(Error::Unlock)
            }
        }
    }

    /// Get connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Database(e))
    }
}

/// Reason an unlock attempt failed; only logged, never returned to callers
#[derive(Debug, thiserror::Error)]
enum HandshakeError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("SQLCipher is not available, PRAGMA key was ignored")]
    NotSqlcipher,
}

/// Key the connection, set the compatibility mode and verify with one read
fn unlock(
    conn: &Connection,
    key: &DatabaseKey,
    cipher_compatibility: u32,
) -> std::result::Result<(), HandshakeError> {
    // PRAGMA key MUST be the first statement executed on the connection
    let key_pragma = Zeroizing::new(format!("PRAGMA key = \"{}\";", key.to_pragma_literal().as_str()));
    execute_pragma(conn, &key_pragma)?;
    execute_pragma(
        conn,
        &format!("PRAGMA cipher_compatibility = {};", cipher_compatibility),
    )?;

    // A plain SQLite build ignores PRAGMA key; refuse to continue
    let cipher_version: Option<String> = conn
        .query_row("PRAGMA cipher_version", [], |row| row.get(0))
        .optional()?;
    match cipher_version {
        Some(version) if !version.is_empty() => {
            tracing::debug!("SQLCipher version: {}", version);
        }
        _ => return Err(HandshakeError::NotSqlcipher),
    }

    // Wrong keys surface here as "file is not a database"
    conn.query_row(&format!("SELECT * FROM {}", VERIFICATION_TABLE), [], |_| Ok(()))
        .optional()?;
    Ok(())
}

/// Run a PRAGMA, ignoring any result row it returns
pub(crate) fn execute_pragma(conn: &Connection, sql: &str) -> rusqlite::Result<()> {
    match conn.execute_batch(sql) {
        Err(rusqlite::Error::ExecuteReturnedResults) => Ok(()),
        other => other,
    }
}
