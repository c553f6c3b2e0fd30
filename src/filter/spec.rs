//! # Filter Specifications
//!
//! Immutable descriptors for how a public query parameter maps to a
//! predicate on a whitelisted column.

use std::collections::BTreeMap;

use super::query::{SortDirection, SortDirective};
use crate::validation::sanitizer::clean;

/// Maximum length for SQL identifiers
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Returns whether a string is a plain SQL identifier
pub fn is_valid_sql_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_IDENTIFIER_LENGTH {
        return false;
    }

    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Panic on an invalid identifier in a resource definition
///
/// Registries are built from constants at startup, so a bad name here is a
/// programming error and never reachable from request input.
fn assert_valid_sql_identifier(s: &str, context: &str) {
    assert!(
        is_valid_sql_identifier(s),
        "Invalid SQL {context} name '{s}': must start with letter/underscore, \
         contain only ASCII alphanumeric/underscore, and be 1-63 chars"
    );
}

/// Numeric type of a range filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    Integer,
    Decimal,
}

/// `N` or `MIN-MAX` within inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeRule {
    pub kind: RangeKind,
    pub min: i64,
    pub max: i64,
}

/// Constraint applied to every token of a set filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetItemRule {
    /// Token must be one of these literals
    Enum(&'static [&'static str]),
    /// Token must have exactly this many characters
    FixedLength(usize),
    /// Token must be an integer in range and not an exception
    IntegerRange {
        min: i64,
        max: i64,
        exceptions: &'static [i64],
    },
}

/// Case normalization applied to set tokens before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCase {
    AsIs,
    Upper,
}

/// Bar-delimited set membership
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetRule {
    pub item: SetItemRule,
    pub case: TokenCase,
}

/// Two-token flag mapped onto the table's truth representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanRule {
    /// Accepted (truthy, falsy) literals, matched case-insensitively
    pub accepted: (&'static str, &'static str),
    /// Stored (true, false) values
    pub truth: (&'static str, &'static str),
}

impl Default for BooleanRule {
    fn default() -> Self {
        Self {
            accepted: ("Y", "N"),
            truth: ("Y", "N"),
        }
    }
}

/// Equality with an optional allowed-value list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExactRule {
    pub allowed: Option<&'static [&'static str]>,
}

/// Filter shape with its constraints
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterShape {
    Exact(ExactRule),
    Range(RangeRule),
    Set(SetRule),
    Boolean(BooleanRule),
}

/// A single whitelisted filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    /// Public query parameter name
    pub param: &'static str,
    /// Target columns; more than one means "any of these matches"
    pub columns: &'static [&'static str],
    pub shape: FilterShape,
}

impl FilterSpec {
    pub fn new(
        param: &'static str,
        columns: &'static [&'static str],
        shape: FilterShape,
    ) -> Self {
        assert!(!columns.is_empty(), "filter '{param}' has no target column");
        for column in columns {
            assert_valid_sql_identifier(column, "column");
        }
        Self {
            param,
            columns,
            shape,
        }
    }

    /// Exact match against free text
    pub fn exact(param: &'static str, columns: &'static [&'static str]) -> Self {
        Self::new(param, columns, FilterShape::Exact(ExactRule::default()))
    }

    /// Exact match against a closed list
    pub fn exact_enum(
        param: &'static str,
        columns: &'static [&'static str],
        allowed: &'static [&'static str],
    ) -> Self {
        Self::new(
            param,
            columns,
            FilterShape::Exact(ExactRule {
                allowed: Some(allowed),
            }),
        )
    }

    /// Integer `N` or `MIN-MAX`
    pub fn integer_range(
        param: &'static str,
        columns: &'static [&'static str],
        min: i64,
        max: i64,
    ) -> Self {
        Self::new(
            param,
            columns,
            FilterShape::Range(RangeRule {
                kind: RangeKind::Integer,
                min,
                max,
            }),
        )
    }

    /// Decimal `N` or `MIN-MAX`
    pub fn decimal_range(
        param: &'static str,
        columns: &'static [&'static str],
        min: i64,
        max: i64,
    ) -> Self {
        Self::new(
            param,
            columns,
            FilterShape::Range(RangeRule {
                kind: RangeKind::Decimal,
                min,
                max,
            }),
        )
    }

    /// Set of fixed-length codes, uppercased
    pub fn code_set(
        param: &'static str,
        columns: &'static [&'static str],
        len: usize,
    ) -> Self {
        Self::new(
            param,
            columns,
            FilterShape::Set(SetRule {
                item: SetItemRule::FixedLength(len),
                case: TokenCase::Upper,
            }),
        )
    }

    /// Set drawn from a closed list, uppercased
    pub fn enum_set(
        param: &'static str,
        columns: &'static [&'static str],
        allowed: &'static [&'static str],
    ) -> Self {
        Self::new(
            param,
            columns,
            FilterShape::Set(SetRule {
                item: SetItemRule::Enum(allowed),
                case: TokenCase::Upper,
            }),
        )
    }

    /// Set of integers within bounds, minus exceptions
    pub fn integer_set(
        param: &'static str,
        columns: &'static [&'static str],
        min: i64,
        max: i64,
        exceptions: &'static [i64],
    ) -> Self {
        Self::new(
            param,
            columns,
            FilterShape::Set(SetRule {
                item: SetItemRule::IntegerRange {
                    min,
                    max,
                    exceptions,
                },
                case: TokenCase::AsIs,
            }),
        )
    }

    /// `Y`/`N` flag
    pub fn flag(param: &'static str, columns: &'static [&'static str]) -> Self {
        Self::new(param, columns, FilterShape::Boolean(BooleanRule::default()))
    }
}

/// Shape of a record identifier in a lookup path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdShape {
    /// Decimal integer within bounds
    Integer { min: i64, max: i64 },
    /// Alphanumeric code of fixed length, uppercased
    Code { len: usize },
}

/// Identifier column and its shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierSpec {
    pub column: &'static str,
    pub shape: IdShape,
}

/// Limit bounds for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            default_limit: 250,
            max_limit: 250,
        }
    }
}

/// Names of the resources served by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceName {
    PeopleGroups,
    DailyUnreached,
    Countries,
    Languages,
    Regions,
    Continents,
}

impl ResourceName {
    pub const ALL: [ResourceName; 6] = [
        ResourceName::PeopleGroups,
        ResourceName::DailyUnreached,
        ResourceName::Countries,
        ResourceName::Languages,
        ResourceName::Regions,
        ResourceName::Continents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceName::PeopleGroups => "people_groups",
            ResourceName::DailyUnreached => "daily_unreached",
            ResourceName::Countries => "countries",
            ResourceName::Languages => "languages",
            ResourceName::Regions => "regions",
            ResourceName::Continents => "continents",
        }
    }

    /// Resolve a top-level path segment
    ///
    /// `daily_unreached` lives under `people_groups/` and is not a top-level
    /// segment.
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "people_groups" => Some(ResourceName::PeopleGroups),
            "countries" => Some(ResourceName::Countries),
            "languages" => Some(ResourceName::Languages),
            "regions" => Some(ResourceName::Regions),
            "continents" => Some(ResourceName::Continents),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the compiler needs to know about one resource
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    pub name: ResourceName,
    pub table: &'static str,
    pub id: IdentifierSpec,
    filters: BTreeMap<&'static str, FilterSpec>,
    retired: &'static [&'static str],
    required: &'static [&'static str],
    sortable: &'static [(&'static str, &'static str)],
    default_sort: SortDirective,
    paging: Paging,
}

impl ResourceSpec {
    pub fn new(name: ResourceName, table: &'static str, id: IdentifierSpec) -> Self {
        assert_valid_sql_identifier(table, "table");
        assert_valid_sql_identifier(id.column, "column");
        Self {
            name,
            table,
            id,
            filters: BTreeMap::new(),
            retired: &[],
            required: &[],
            sortable: &[],
            default_sort: SortDirective {
                column: id.column,
                direction: SortDirection::Asc,
            },
            paging: Paging::default(),
        }
    }

    /// Register a filter
    pub fn filter(mut self, spec: FilterSpec) -> Self {
        let previous = self.filters.insert(spec.param, spec);
        assert!(
            previous.is_none(),
            "duplicate filter '{}' on {}",
            spec.param,
            self.name
        );
        self
    }

    /// Parameter names that fail loudly instead of being ignored
    pub fn retired(mut self, names: &'static [&'static str]) -> Self {
        self.retired = names;
        self
    }

    /// Parameters that must be supplied
    pub fn required(mut self, names: &'static [&'static str]) -> Self {
        self.required = names;
        self
    }

    /// Sortable public names mapped to columns, plus the default order
    pub fn sortable(
        mut self,
        columns: &'static [(&'static str, &'static str)],
        default_sort: SortDirective,
    ) -> Self {
        for (_, column) in columns {
            assert_valid_sql_identifier(column, "column");
        }
        assert_valid_sql_identifier(default_sort.column, "column");
        self.sortable = columns;
        self.default_sort = default_sort;
        self
    }

    pub fn paging(mut self, paging: Paging) -> Self {
        assert!(
            paging.default_limit >= 1 && paging.default_limit <= paging.max_limit,
            "default limit outside [1, max_limit] on {}",
            self.name
        );
        self.paging = paging;
        self
    }

    pub fn filter_for(&self, param: &str) -> Option<&FilterSpec> {
        self.filters.get(param)
    }

    pub fn filters(&self) -> impl Iterator<Item = &FilterSpec> {
        self.filters.values()
    }

    pub fn is_retired(&self, param: &str) -> bool {
        self.retired.contains(&param)
    }

    pub fn required_params(&self) -> &'static [&'static str] {
        self.required
    }

    /// Column for a public sort name
    ///
    /// Names are compared as sanitized, so `people_name` and `peoplename`
    /// both select the same column.
    pub fn sort_column(&self, name: &str) -> Option<&'static str> {
        let wanted = clean(name);
        self.sortable
            .iter()
            .find(|(public, _)| clean(public) == wanted)
            .map(|(_, column)| *column)
    }

    pub fn default_sort(&self) -> SortDirective {
        self.default_sort
    }

    pub fn paging_limits(&self) -> Paging {
        self.paging
    }

    /// Every column a compiled query for this resource may reference
    pub fn known_columns(&self) -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = self
            .filters
            .values()
            .flat_map(|spec| spec.columns.iter().copied())
            .chain(self.sortable.iter().map(|(_, column)| *column))
            .chain([self.id.column, self.default_sort.column])
            .collect();
        columns.sort_unstable();
        columns.dedup();
        columns
    }
}
