//! # Compiled Query
//!
//! The safe, bound-parameter form of a client's filter request.
//!
//! SQL text produced here is assembled only from registry column names,
//! fixed keywords and placeholders. Client input travels exclusively as
//! [`BoundValue`]s.

use std::fmt;

use serde::Serialize;

use super::spec::ResourceName;

/// A value bound to a placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BoundValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
}

impl BoundValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Numeric view, parsing text when it holds a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            BoundValue::Text(s) => s.parse().ok(),
            BoundValue::Integer(i) => Some(*i as f64),
            BoundValue::Decimal(d) => Some(*d),
        }
    }
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundValue::Text(s) => f.write_str(s),
            BoundValue::Integer(i) => write!(f, "{}", i),
            BoundValue::Decimal(d) => write!(f, "{}", d),
        }
    }
}

/// Comparison applied to the target column(s)
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `col = ?`
    Equals(BoundValue),
    /// `col BETWEEN ? AND ?`
    Between(BoundValue, BoundValue),
    /// `col IN (?, ...)`
    In(Vec<BoundValue>),
}

impl Condition {
    fn values(&self) -> Vec<BoundValue> {
        match self {
            Condition::Equals(v) => vec![v.clone()],
            Condition::Between(lo, hi) => vec![lo.clone(), hi.clone()],
            Condition::In(values) => values.clone(),
        }
    }

    fn write(&self, column: &str, placeholder: &mut dyn FnMut() -> String) -> String {
        match self {
            Condition::Equals(_) => format!("{} = {}", column, placeholder()),
            Condition::Between(_, _) => {
                let lo = placeholder();
                let hi = placeholder();
                format!("{} BETWEEN {} AND {}", column, lo, hi)
            }
            Condition::In(values) => {
                let list: Vec<String> = values.iter().map(|_| placeholder()).collect();
                format!("{} IN ({})", column, list.join(", "))
            }
        }
    }
}

/// One predicate compiled from a parameter and its filter spec
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPredicate {
    /// Parameter that produced this predicate
    pub param: &'static str,
    /// Registry columns; never client-supplied
    pub columns: Vec<&'static str>,
    pub condition: Condition,
}

impl CompiledPredicate {
    /// Fragment text with `?` placeholders
    pub fn sql_fragment(&self) -> String {
        self.fragment_with(&mut || "?".to_string())
    }

    /// Fragment text using the given placeholder generator
    ///
    /// Multiple columns become a parenthesised OR of the same condition.
    pub fn fragment_with(&self, placeholder: &mut dyn FnMut() -> String) -> String {
        if self.columns.len() == 1 {
            return self.condition.write(self.columns[0], placeholder);
        }
        let parts: Vec<String> = self
            .columns
            .iter()
            .map(|column| self.condition.write(column, placeholder))
            .collect();
        format!("({})", parts.join(" OR "))
    }

    /// Bound values in placeholder order
    pub fn bound_values(&self) -> Vec<BoundValue> {
        let values = self.condition.values();
        self.columns
            .iter()
            .flat_map(|_| values.iter().cloned())
            .collect()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Parse `ASC` / `DESC`, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

/// Whitelisted sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDirective {
    pub column: &'static str,
    pub direction: SortDirection,
}

impl SortDirective {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }
}

/// Clamped limit and offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDirective {
    pub limit: usize,
    pub offset: usize,
}

/// Predicates (ANDed) plus sort and page directives for one request
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub resource: ResourceName,
    pub table: &'static str,
    pub predicates: Vec<CompiledPredicate>,
    pub sort: SortDirective,
    pub page: PageDirective,
}

impl CompiledQuery {
    /// WHERE clause body with `?` placeholders, and its values
    ///
    /// Returns `None` for the clause when there are no predicates.
    pub fn where_clause(&self) -> (Option<String>, Vec<BoundValue>) {
        if self.predicates.is_empty() {
            return (None, Vec::new());
        }
        let fragments: Vec<String> = self.predicates.iter().map(|p| p.sql_fragment()).collect();
        let values = self
            .predicates
            .iter()
            .flat_map(|p| p.bound_values())
            .collect();
        (Some(fragments.join(" AND ")), values)
    }

    /// Every column referenced by predicates and sort
    pub fn referenced_columns(&self) -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = self
            .predicates
            .iter()
            .flat_map(|p| p.columns.iter().copied())
            .chain([self.sort.column])
            .collect();
        columns.sort_unstable();
        columns.dedup();
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals_fragment() {
        let p = CompiledPredicate {
            param: "population",
            columns: vec!["Population"],
            condition: Condition::Equals(BoundValue::Integer(600)),
        };
        assert_eq!(p.sql_fragment(), "Population = ?");
        assert_eq!(p.bound_values(), vec![BoundValue::Integer(600)]);
    }

    #[test]
    fn test_between_fragment() {
        let p = CompiledPredicate {
            param: "population",
            columns: vec!["Population"],
            condition: Condition::Between(BoundValue::Integer(10000), BoundValue::Integer(20000)),
        };
        assert_eq!(p.sql_fragment(), "Population BETWEEN ? AND ?");
    }

    #[test]
    fn test_in_fragment_multi_column() {
        let p = CompiledPredicate {
            param: "ids",
            columns: vec!["ROG3", "ISO2"],
            condition: Condition::In(vec![BoundValue::text("IN"), BoundValue::text("PK")]),
        };
        assert_eq!(p.sql_fragment(), "(ROG3 IN (?, ?) OR ISO2 IN (?, ?))");
        assert_eq!(p.bound_values().len(), 4);
    }

    #[test]
    fn test_where_clause_joins_with_and() {
        let query = CompiledQuery {
            resource: ResourceName::Countries,
            table: "countries",
            predicates: vec![
                CompiledPredicate {
                    param: "window1040",
                    columns: vec!["Window1040"],
                    condition: Condition::Equals(BoundValue::text("Y")),
                },
                CompiledPredicate {
                    param: "regions",
                    columns: vec!["RegionCode"],
                    condition: Condition::In(vec![BoundValue::Integer(3)]),
                },
            ],
            sort: SortDirective::asc("Ctry"),
            page: PageDirective { limit: 10, offset: 0 },
        };
        let (clause, values) = query.where_clause();
        assert_eq!(clause.as_deref(), Some("Window1040 = ? AND RegionCode IN (?)"));
        assert_eq!(values.len(), 2);
        assert_eq!(query.referenced_columns(), vec!["Ctry", "RegionCode", "Window1040"]);
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!(SortDirection::parse("desc"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("ASC"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("up"), None);
    }
}
