//! Connection setup and the demo flow-table schema.
//!
//! The gateway opens an existing warehouse database and never creates one:
//! [`open_database`] fails on a missing file. The demo schema exists for
//! local development and tests and is managed with `rusqlite_migration`
//! via SQLite's `user_version` pragma. Migrations are embedded at compile
//! time via `include_str!`.

use rusqlite::{params, Connection, OpenFlags};
use rusqlite_migration::{Migrations, M};

use crate::error::WarehouseError;
use crate::row::FlowRow;

/// Demo schema migrations, applied in order via `user_version` tracking.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(include_str!("migrations/001_flow_data.sql"))])
}

/// Opens an existing warehouse database for reading.
pub fn open_database(path: &str) -> Result<Connection, WarehouseError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags).map_err(|source| {
        WarehouseError::Connect {
            path: path.to_string(),
            source,
        }
    })?;
    conn.pragma_update(None, "query_only", "ON")?;
    Ok(conn)
}

/// Opens (or creates) a database at `path` with the demo schema applied.
pub fn create_demo_database(path: &str) -> Result<Connection, WarehouseError> {
    let mut conn = Connection::open(path).map_err(|source| WarehouseError::Connect {
        path: path.to_string(),
        source,
    })?;
    configure_and_migrate(&mut conn)?;
    Ok(conn)
}

/// Opens an in-memory database with the demo schema applied.
pub fn create_demo_in_memory() -> Result<Connection, WarehouseError> {
    let mut conn = Connection::open_in_memory()?;
    configure_and_migrate(&mut conn)?;
    Ok(conn)
}

fn configure_and_migrate(conn: &mut Connection) -> Result<(), WarehouseError> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    migrations()
        .to_latest(conn)
        .map_err(|e| WarehouseError::Migration(e.to_string()))?;

    Ok(())
}

/// Inserts rows into the demo table in one transaction.
///
/// Rows are validated first; a negative value aborts before anything is
/// written. Returns the number of rows inserted.
pub fn insert_rows(conn: &mut Connection, rows: &[FlowRow]) -> Result<usize, WarehouseError> {
    for row in rows {
        row.flow.validate()?;
    }

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO FLOW_DATA (CATEGORY_FIELD_1, CATEGORY_FIELD_2, CATEGORY_FIELD_3, \
             SOURCE, TARGET, VALUE, SOURCE_ATTRIBUTE, TARGET_ATTRIBUTE, VALUE_SPLIT_CATEGORY) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for row in rows {
            stmt.execute(params![
                row.category_field_1,
                row.category_field_2,
                row.category_field_3,
                row.flow.source,
                row.flow.target,
                row.flow.value,
                row.flow.source_attribute,
                row.flow.target_attribute,
                row.flow.split_category,
            ])?;
        }
    }
    tx.commit()?;

    Ok(rows.len())
}
