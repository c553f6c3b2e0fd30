//! # SQL Rendering
//!
//! Renders a [`CompiledQuery`] as statement text plus bound values for a
//! placeholder dialect. This is the only place fragment text and values meet,
//! and they meet only through numbered placeholders.

use super::query::{BoundValue, CompiledQuery};

/// Placeholder style of the target database
pub trait Dialect: Clone + Copy {
    /// Placeholder for the 1-based parameter `idx`
    fn param(&self, idx: usize) -> String;
}

/// `$1`, `$2`, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("${idx}")
    }
}

/// `?1`, `?2`, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("?{idx}")
    }
}

/// Statement text and the values for its placeholders, in order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub text: String,
    pub params: Vec<BoundValue>,
}

/// Render `SELECT * FROM .. WHERE .. ORDER BY .. LIMIT .. OFFSET ..`
pub fn render_select<D: Dialect>(query: &CompiledQuery, dialect: D) -> SqlStatement {
    let mut idx = 0usize;
    let mut next = || {
        idx += 1;
        dialect.param(idx)
    };

    let mut text = format!("SELECT * FROM {}", query.table);
    let mut params = Vec::new();

    if !query.predicates.is_empty() {
        let fragments: Vec<String> = query
            .predicates
            .iter()
            .map(|p| p.fragment_with(&mut next))
            .collect();
        text.push_str(" WHERE ");
        text.push_str(&fragments.join(" AND "));
        params.extend(query.predicates.iter().flat_map(|p| p.bound_values()));
    }

    text.push_str(&format!(
        " ORDER BY {} {}",
        query.sort.column,
        query.sort.direction.as_sql()
    ));

    let limit = next();
    let offset = next();
    text.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
    params.push(BoundValue::Integer(query.page.limit as i64));
    params.push(BoundValue::Integer(query.page.offset as i64));

    SqlStatement { text, params }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::query::{CompiledPredicate, Condition, PageDirective, SortDirective};
    use crate::filter::spec::ResourceName;

    fn query() -> CompiledQuery {
        CompiledQuery {
            resource: ResourceName::Countries,
            table: "countries",
            predicates: vec![
                CompiledPredicate {
                    param: "ids",
                    columns: vec!["ROG3", "ISO2"],
                    condition: Condition::In(vec![BoundValue::text("IN"), BoundValue::text("PK")]),
                },
                CompiledPredicate {
                    param: "population",
                    columns: vec!["Population"],
                    condition: Condition::Between(BoundValue::Integer(1), BoundValue::Integer(9)),
                },
            ],
            sort: SortDirective::desc("Population"),
            page: PageDirective { limit: 10, offset: 20 },
        }
    }

    #[test]
    fn test_postgres_placeholders() {
        let stmt = render_select(&query(), Postgres);
        assert_eq!(
            stmt.text,
            "SELECT * FROM countries WHERE (ROG3 IN ($1, $2) OR ISO2 IN ($3, $4)) \
             AND Population BETWEEN $5 AND $6 ORDER BY Population DESC LIMIT $7 OFFSET $8"
        );
        assert_eq!(stmt.params.len(), 8);
        assert_eq!(stmt.params[6], BoundValue::Integer(10));
        assert_eq!(stmt.params[7], BoundValue::Integer(20));
    }

    #[test]
    fn test_sqlite_without_predicates() {
        let mut q = query();
        q.predicates.clear();
        let stmt = render_select(&q, Sqlite);
        assert_eq!(
            stmt.text,
            "SELECT * FROM countries ORDER BY Population DESC LIMIT ?1 OFFSET ?2"
        );
    }
}
