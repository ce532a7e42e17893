//! Creating the database schema and opening the database file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rusqlite::{Connection, ErrorCode, Transaction as SqlTransaction, TransactionBehavior};
use time::{OffsetDateTime, macros::format_description};

use crate::{Error, transaction::create_transaction_tables};

/// Create the application tables and indexes if they do not exist.
///
/// Also turns on foreign key enforcement for `connection`.
///
/// # Errors
/// Returns an error if the file is not a SQLite database or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Open the database at `path` and make sure it has the application tables.
///
/// If SQLite reports that the file is not a database or is corrupt, it is
/// renamed to `<stem>_backup_<YYYYmmdd_HHMMSS>.<ext>` next to the original and
/// a fresh database is created in its place. Any other failure, e.g. a locked
/// database or a permission error, leaves the file untouched.
///
/// # Errors
/// Returns [Error::DatabaseRecoveryError] if the database cannot be opened for
/// a reason other than corruption, if the file cannot be moved aside or if the
/// new database cannot be created.
pub fn open_or_recover(path: &Path) -> Result<Connection, Error> {
    match open_and_initialize(path) {
        Ok(connection) => Ok(connection),
        Err(error) if path.exists() && is_corrupt(&error) => {
            let backup = backup_path(path, OffsetDateTime::now_utc());
            tracing::warn!(
                "Could not open the database {}: {error}. Moving it to {} and starting a new one.",
                path.display(),
                backup.display()
            );

            fs::rename(path, &backup).map_err(|error| {
                Error::DatabaseRecoveryError(format!(
                    "could not move {} to {}: {error}",
                    path.display(),
                    backup.display()
                ))
            })?;

            open_and_initialize(path)
                .map_err(|error| Error::DatabaseRecoveryError(error.to_string()))
        }
        Err(error) => Err(Error::DatabaseRecoveryError(error.to_string())),
    }
}

fn is_corrupt(error: &rusqlite::Error) -> bool {
    matches!(
        error.sqlite_error_code(),
        Some(ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt)
    )
}

fn open_and_initialize(path: &Path) -> Result<Connection, rusqlite::Error> {
    let connection = Connection::open(path)?;
    initialize(&connection)?;

    Ok(connection)
}

/// The path a broken database file is moved to.
fn backup_path(path: &Path, now: OffsetDateTime) -> PathBuf {
    let timestamp = now
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| now.unix_timestamp().to_string());
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match path.extension() {
        Some(extension) => format!(
            "{stem}_backup_{timestamp}.{}",
            extension.to_string_lossy()
        ),
        None => format!("{stem}_backup_{timestamp}"),
    };

    path.with_file_name(file_name)
}
