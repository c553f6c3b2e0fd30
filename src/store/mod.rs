//! # Data Store
//!
//! Executes compiled queries against resource tables.
//!
//! [`InMemoryDataStore`] evaluates predicates directly over rows loaded
//! from a JSON dataset. Comparison is loose: when both sides read as
//! numbers they compare numerically, otherwise as text.

mod errors;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::filter::{BoundValue, CompiledPredicate, CompiledQuery, Condition, SortDirection};

pub use errors::{StoreError, StoreResult};

/// A row as returned by the data store
pub type Row = Map<String, Value>;

/// Anything that can run a compiled query
pub trait DataStore: Send + Sync {
    fn fetch(&self, query: &CompiledQuery) -> StoreResult<Vec<Row>>;
}

/// Tables held in memory, keyed by table name
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataStore {
    tables: HashMap<String, Vec<Row>>,
}

impl InMemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    /// Load `{ "table": [ {row}, ... ], ... }`
    pub fn from_json_str(content: &str) -> StoreResult<Self> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| StoreError::Parse(e.to_string()))?;

        let Value::Object(tables) = value else {
            return Err(StoreError::Parse(
                "dataset must be an object of tables".to_string(),
            ));
        };

        let mut store = Self::new();
        for (name, rows) in tables {
            let Value::Array(items) = rows else {
                return Err(StoreError::Parse(format!("table {} must be an array", name)));
            };
            let mut parsed = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(row) => parsed.push(row),
                    _ => {
                        return Err(StoreError::Parse(format!(
                            "table {} holds a non-object row",
                            name
                        )))
                    }
                }
            }
            store.tables.insert(name, parsed);
        }
        Ok(store)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
        let store = Self::from_json_str(&content)?;
        info!(path = %path.display(), tables = store.tables.len(), "dataset loaded");
        Ok(store)
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.tables.get(table).map(Vec::len)
    }
}

impl DataStore for InMemoryDataStore {
    fn fetch(&self, query: &CompiledQuery) -> StoreResult<Vec<Row>> {
        let rows = self
            .tables
            .get(query.table)
            .ok_or_else(|| StoreError::UnknownTable(query.table.to_string()))?;

        let mut matched: Vec<&Row> = rows
            .iter()
            .filter(|row| query.predicates.iter().all(|p| matches(row, p)))
            .collect();

        let column = query.sort.column;
        matched.sort_by(|a, b| compare_cells(a.get(column), b.get(column), query.sort.direction));

        let page: Vec<Row> = matched
            .into_iter()
            .skip(query.page.offset)
            .take(query.page.limit)
            .cloned()
            .collect();

        debug!(
            table = query.table,
            predicates = query.predicates.len(),
            returned = page.len(),
            "query executed"
        );
        Ok(page)
    }
}

fn matches(row: &Row, predicate: &CompiledPredicate) -> bool {
    predicate.columns.iter().any(|column| {
        let Some(cell) = row.get(*column) else {
            return false;
        };
        match &predicate.condition {
            Condition::Equals(v) => compare_bound(cell, v) == Some(Ordering::Equal),
            Condition::Between(lo, hi) => {
                matches!(
                    compare_bound(cell, lo),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(
                    compare_bound(cell, hi),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }
            Condition::In(values) => values
                .iter()
                .any(|v| compare_bound(cell, v) == Some(Ordering::Equal)),
        }
    })
}

fn cell_number(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn cell_text(cell: &Value) -> Option<String> {
    match cell {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_bound(cell: &Value, bound: &BoundValue) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (cell_number(cell), bound.as_f64()) {
        return a.partial_cmp(&b);
    }
    cell_text(cell).map(|text| text.as_str().cmp(bound.to_string().as_str()))
}

/// Missing and null cells sort after everything else in either direction
fn compare_cells(a: Option<&Value>, b: Option<&Value>, direction: SortDirection) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = match (cell_number(a), cell_number(b)) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => cell_text(a).cmp(&cell_text(b)),
            };
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{PageDirective, ResourceName, SortDirective};
    use serde_json::json;

    fn store() -> InMemoryDataStore {
        InMemoryDataStore::from_json_str(
            &json!({
                "countries": [
                    {"ROG3": "IN", "Ctry": "India", "Population": 1400000000, "ROG2": "ASI"},
                    {"ROG3": "PK", "Ctry": "Pakistan", "Population": "240000000", "ROG2": "ASI"},
                    {"ROG3": "FR", "Ctry": "France", "Population": 68000000, "ROG2": "EUR"},
                    {"ROG3": "XX", "Ctry": "Nowhere", "ROG2": "EUR"}
                ]
            })
            .to_string(),
        )
        .unwrap()
    }

    fn query(predicates: Vec<CompiledPredicate>, sort: SortDirective) -> CompiledQuery {
        CompiledQuery {
            resource: ResourceName::Countries,
            table: "countries",
            predicates,
            sort,
            page: PageDirective { limit: 10, offset: 0 },
        }
    }

    fn names(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r["Ctry"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_in_and_sort() {
        let rows = store()
            .fetch(&query(
                vec![CompiledPredicate {
                    param: "continents",
                    columns: vec!["ROG2"],
                    condition: Condition::In(vec![BoundValue::text("ASI")]),
                }],
                SortDirective::desc("Ctry"),
            ))
            .unwrap();
        assert_eq!(names(&rows), vec!["Pakistan", "India"]);
    }

    #[test]
    fn test_between_compares_numerically() {
        let rows = store()
            .fetch(&query(
                vec![CompiledPredicate {
                    param: "population",
                    columns: vec!["Population"],
                    condition: Condition::Between(
                        BoundValue::Integer(50_000_000),
                        BoundValue::Integer(300_000_000),
                    ),
                }],
                SortDirective::asc("Population"),
            ))
            .unwrap();
        assert_eq!(names(&rows), vec!["France", "Pakistan"]);
    }

    #[test]
    fn test_missing_sort_values_last() {
        let rows = store()
            .fetch(&query(vec![], SortDirective::asc("Population")))
            .unwrap();
        assert_eq!(names(&rows).last(), Some(&"Nowhere"));

        let rows = store()
            .fetch(&query(vec![], SortDirective::desc("Population")))
            .unwrap();
        assert_eq!(names(&rows), vec!["India", "Pakistan", "France", "Nowhere"]);
    }

    #[test]
    fn test_paging() {
        let mut q = query(vec![], SortDirective::asc("Ctry"));
        q.page = PageDirective { limit: 2, offset: 1 };
        let rows = store().fetch(&q).unwrap();
        assert_eq!(names(&rows), vec!["India", "Nowhere"]);
    }

    #[test]
    fn test_unknown_table() {
        let mut q = query(vec![], SortDirective::asc("Ctry"));
        q.table = "languages";
        assert!(matches!(store().fetch(&q), Err(StoreError::UnknownTable(_))));
    }

    #[test]
    fn test_bad_dataset() {
        assert!(InMemoryDataStore::from_json_str("[]").is_err());
        assert!(InMemoryDataStore::from_json_str(r#"{"t": [1]}"#).is_err());
    }
}
