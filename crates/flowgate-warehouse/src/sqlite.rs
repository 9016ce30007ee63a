//! SQLite implementation of [`Warehouse`].
//!
//! [`SqliteWarehouse`] holds at most one connection. Before every statement
//! the connection is probed; a missing or dead connection is replaced by a
//! freshly opened one. There is no pooling and a failed statement is not
//! retried.

use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info, warn};

use flowgate_core::{categories_sql, flows_sql, CategoryRecord, FilterSelection, FlowRecord};

use crate::config::WarehouseConfig;
use crate::error::WarehouseError;
use crate::traits::Warehouse;

/// SQLite-backed implementation of [`Warehouse`].
pub struct SqliteWarehouse {
    config: WarehouseConfig,
    conn: Option<Connection>,
}

impl SqliteWarehouse {
    /// Creates a warehouse that connects lazily on first use.
    pub fn new(config: WarehouseConfig) -> Self {
        SqliteWarehouse { config, conn: None }
    }

    /// Wraps an already open connection (in-memory databases, tests).
    ///
    /// If that connection dies, reconnecting uses `config.path`.
    pub fn with_connection(config: WarehouseConfig, conn: Connection) -> Self {
        SqliteWarehouse {
            config,
            conn: Some(conn),
        }
    }

    /// Returns the held connection, opening a new one if it is absent or
    /// fails the liveness probe.
    fn connection(&mut self) -> Result<&Connection, WarehouseError> {
        let alive = self.conn.as_ref().is_some_and(probe);
        if !alive {
            if let Some(stale) = self.conn.take() {
                warn!("warehouse connection is not alive, reconnecting");
                let _ = stale.close();
            }
            let path = self
                .config
                .path
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or(WarehouseError::NotConfigured)?;
            let conn = crate::schema::open_database(path)?;
            info!(path, "connected to warehouse");
            self.conn = Some(conn);
        }
        self.conn.as_ref().ok_or(WarehouseError::NotConfigured)
    }
}

fn probe(conn: &Connection) -> bool {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .is_ok()
}

impl Warehouse for SqliteWarehouse {
    fn list_categories(&mut self) -> Result<Vec<CategoryRecord>, WarehouseError> {
        let sql = categories_sql(&self.config.table);
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(CategoryRecord {
                field1: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                field2: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                field3: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(count = records.len(), "fetched filter categories");
        Ok(records)
    }

    fn query_flows(
        &mut self,
        selection: &FilterSelection,
    ) -> Result<Vec<FlowRecord>, WarehouseError> {
        let predicate = flowgate_core::build(selection);
        let sql = flows_sql(&self.config.table, &predicate);
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(predicate.binds.iter()), |row| {
            Ok(FlowRecord {
                source: row.get(0)?,
                target: row.get(1)?,
                value: row.get(2)?,
                source_attribute: row.get(3)?,
                target_attribute: row.get(4)?,
                split_category: row.get(5)?,
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(
            count = records.len(),
            clauses = selection.len(),
            "fetched flow records"
        );
        Ok(records)
    }

    fn is_alive(&self) -> bool {
        self.conn.as_ref().is_some_and(probe)
    }

    fn close(&mut self) -> Result<(), WarehouseError> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, err)| WarehouseError::Sqlite(err))?;
            info!("warehouse connection closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::FlowRow;
    use crate::schema::{create_demo_database, create_demo_in_memory, insert_rows};
    use flowgate_core::{FilterField, TableName};

    fn sample_rows() -> Vec<FlowRow> {
        vec![
            FlowRow::new(["Retail", "EU", "Q1"], FlowRecord::new("B", "C", 3.0)),
            FlowRow::new(["Retail", "US", "Q1"], FlowRecord::new("A", "B", 5.0).with_category("x")),
            FlowRow::new(["Online", "EU", "Q2"], FlowRecord::new("A", "C", 2.0)),
            FlowRow::new(["Retail", "EU", "Q1"], FlowRecord::new("A", "D", 1.0)),
        ]
    }

    fn seeded_in_memory() -> SqliteWarehouse {
        let mut conn = create_demo_in_memory().unwrap();
        insert_rows(&mut conn, &sample_rows()).unwrap();
        SqliteWarehouse::with_connection(WarehouseConfig::default(), conn)
    }

    #[test]
    fn categories_are_distinct_and_ordered() {
        let mut warehouse = seeded_in_memory();
        let categories = warehouse.list_categories().unwrap();
        assert_eq!(
            categories,
            vec![
                CategoryRecord::new("Online", "EU", "Q2"),
                CategoryRecord::new("Retail", "EU", "Q1"),
                CategoryRecord::new("Retail", "US", "Q1"),
            ]
        );
    }

    #[test]
    fn unrestricted_flows_are_ordered_by_source_then_target() {
        let mut warehouse = seeded_in_memory();
        let flows = warehouse.query_flows(&FilterSelection::new()).unwrap();
        let pairs: Vec<_> = flows
            .iter()
            .map(|f| (f.source.as_str(), f.target.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "B"), ("A", "C"), ("A", "D"), ("B", "C")]);
        assert_eq!(flows[0].split_category.as_deref(), Some("x"));
        assert_eq!(flows[1].split_category, None);
    }

    #[test]
    fn selection_binds_values() {
        let mut warehouse = seeded_in_memory();
        let selection = FilterSelection::new()
            .with(FilterField::CategoryField1, ["Retail"])
            .with(FilterField::CategoryField2, ["EU", "US"])
            .with(FilterField::Source, ["A"]);
        let flows = warehouse.query_flows(&selection).unwrap();
        let targets: Vec<_> = flows.iter().map(|f| f.target.as_str()).collect();
        assert_eq!(targets, vec!["B", "D"]);
    }

    #[test]
    fn hostile_values_match_nothing() {
        let mut warehouse = seeded_in_memory();
        let selection = FilterSelection::new().with(FilterField::Source, ["A' OR '1'='1"]);
        assert!(warehouse.query_flows(&selection).unwrap().is_empty());
    }

    #[test]
    fn unconfigured_warehouse_reports_not_configured() {
        let mut warehouse = SqliteWarehouse::new(WarehouseConfig::default());
        assert!(!warehouse.is_alive());
        assert!(matches!(
            warehouse.list_categories(),
            Err(WarehouseError::NotConfigured)
        ));
    }

    #[test]
    fn missing_table_surfaces_as_query_error() {
        let conn = create_demo_in_memory().unwrap();
        let config = WarehouseConfig {
            path: None,
            table: TableName::new("NO_SUCH_TABLE").unwrap(),
        };
        let mut warehouse = SqliteWarehouse::with_connection(config, conn);
        assert!(matches!(
            warehouse.query_flows(&FilterSelection::new()),
            Err(WarehouseError::Sqlite(_))
        ));
    }

    #[test]
    fn reconnects_lazily_after_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flows.db");
        let path = path.to_str().unwrap().to_string();
        {
            let mut conn = create_demo_database(&path).unwrap();
            insert_rows(&mut conn, &sample_rows()).unwrap();
        }

        let mut warehouse =
            SqliteWarehouse::new(WarehouseConfig::new(path.clone(), TableName::default()));
        assert!(!warehouse.is_alive());

        assert_eq!(warehouse.query_flows(&FilterSelection::new()).unwrap().len(), 4);
        assert!(warehouse.is_alive());

        warehouse.close().unwrap();
        assert!(!warehouse.is_alive());

        assert_eq!(warehouse.list_categories().unwrap().len(), 3);
        assert!(warehouse.is_alive());
    }
}
