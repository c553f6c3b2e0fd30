//! # Filter Compiler
//!
//! Turns raw query parameters into a [`CompiledQuery`] for one resource.
//!
//! Parameters are visited in sorted name order so the same request always
//! compiles to the same predicates. The first invalid parameter aborts the
//! whole compilation; only the required-parameter check aggregates.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::debug;

use super::query::{
    BoundValue, CompiledPredicate, CompiledQuery, Condition, PageDirective, SortDirection,
    SortDirective,
};
use super::spec::{
    BooleanRule, ExactRule, FilterShape, FilterSpec, IdShape, RangeKind, RangeRule, ResourceSpec,
    SetItemRule, SetRule, TokenCase,
};
use crate::validation::sanitizer::{clean, RANGE_SEPARATOR, SET_DELIMITER};
use crate::validation::validator;
use crate::validation::{ValidationError, ValidationResult};

/// Parameters consumed outside the filter table
pub const RESERVED_PARAMS: &[&str] = &["api_key", "limit", "page", "sort_field", "sort_direction"];

/// Highest page number honoured
pub const MAX_PAGE: usize = 1_000_000;

/// Compile a list request for `resource`
pub fn compile<S: BuildHasher>(
    resource: &ResourceSpec,
    raw: &HashMap<String, String, S>,
) -> ValidationResult<CompiledQuery> {
    let sanitized: HashMap<String, String> = raw
        .iter()
        .map(|(name, value)| (name.clone(), clean(value)))
        .collect();

    validator::require_all_present(&sanitized, resource.required_params())?;

    let mut names: Vec<&String> = sanitized.keys().collect();
    names.sort();

    let mut predicates = Vec::new();
    for name in names {
        if RESERVED_PARAMS.contains(&name.as_str()) {
            continue;
        }
        if resource.is_retired(name) {
            return Err(ValidationError::RetiredParameter { name: name.clone() });
        }
        let Some(spec) = resource.filter_for(name) else {
            debug!(resource = %resource.name, param = %name, "ignoring unknown parameter");
            continue;
        };
        let value = &sanitized[name];
        if value.is_empty() {
            continue;
        }
        if let Some(predicate) = compile_filter(spec, value)? {
            predicates.push(predicate);
        }
    }

    let sort = compile_sort(resource, &sanitized)?;
    let page = compile_page(resource, &sanitized);

    Ok(CompiledQuery {
        resource: resource.name,
        table: resource.table,
        predicates,
        sort,
        page,
    })
}

/// Compile a single-record lookup by identifier
pub fn compile_lookup(resource: &ResourceSpec, raw_id: &str) -> ValidationResult<CompiledQuery> {
    let cleaned = clean(raw_id);
    let bad = || ValidationError::BadIdentifier {
        value: raw_id.to_string(),
    };

    let value = match resource.id.shape {
        IdShape::Integer { min, max } => {
            let id: i64 = cleaned.parse().map_err(|_| bad())?;
            if cleaned != raw_id || id < min || id > max {
                return Err(bad());
            }
            BoundValue::Integer(id)
        }
        IdShape::Code { len } => {
            if cleaned != raw_id
                || cleaned.chars().count() != len
                || !cleaned.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(bad());
            }
            BoundValue::Text(cleaned.to_ascii_uppercase())
        }
    };

    Ok(CompiledQuery {
        resource: resource.name,
        table: resource.table,
        predicates: vec![CompiledPredicate {
            param: "id",
            columns: vec![resource.id.column],
            condition: Condition::Equals(value),
        }],
        sort: resource.default_sort(),
        page: PageDirective {
            limit: 1,
            offset: 0,
        },
    })
}

/// Compile one sanitized, non-empty value against its spec
///
/// Returns `None` when the value holds no usable tokens.
fn compile_filter(spec: &FilterSpec, value: &str) -> ValidationResult<Option<CompiledPredicate>> {
    let condition = match &spec.shape {
        FilterShape::Exact(rule) => compile_exact(rule, value)?,
        FilterShape::Range(rule) => compile_range(rule, value)?,
        FilterShape::Set(rule) => match compile_set(rule, value)? {
            Some(condition) => condition,
            None => return Ok(None),
        },
        FilterShape::Boolean(rule) => compile_boolean(rule, value)?,
    };

    Ok(Some(CompiledPredicate {
        param: spec.param,
        columns: spec.columns.to_vec(),
        condition,
    }))
}

fn compile_exact(rule: &ExactRule, value: &str) -> ValidationResult<Condition> {
    if let Some(allowed) = rule.allowed {
        if !allowed.contains(&value) {
            return Err(ValidationError::InvalidEnum {
                value: value.to_string(),
            });
        }
    }
    Ok(Condition::Equals(BoundValue::text(value)))
}

fn compile_range(rule: &RangeRule, value: &str) -> ValidationResult<Condition> {
    match value.split_once(RANGE_SEPARATOR) {
        None => Ok(Condition::Equals(range_endpoint(rule, value)?)),
        Some((lo, hi)) => {
            let invalid = || ValidationError::InvalidRange {
                value: value.to_string(),
            };
            let lo_num: f64 = lo.parse().map_err(|_| invalid())?;
            let hi_num: f64 = hi.parse().map_err(|_| invalid())?;
            if lo_num > hi_num {
                return Err(invalid());
            }
            Ok(Condition::Between(
                range_endpoint(rule, lo)?,
                range_endpoint(rule, hi)?,
            ))
        }
    }
}

fn range_endpoint(rule: &RangeRule, value: &str) -> ValidationResult<BoundValue> {
    match rule.kind {
        RangeKind::Integer => {
            validator::integer_in_range(value, rule.min, rule.max, &[]).map(BoundValue::Integer)
        }
        RangeKind::Decimal => {
            validator::decimal_in_range(value, rule.min, rule.max).map(BoundValue::Decimal)
        }
    }
}

fn compile_set(rule: &SetRule, value: &str) -> ValidationResult<Option<Condition>> {
    let mut values: Vec<BoundValue> = Vec::new();

    for token in value.split(SET_DELIMITER).filter(|t| !t.is_empty()) {
        let token = match rule.case {
            TokenCase::AsIs => token.to_string(),
            TokenCase::Upper => token.to_ascii_uppercase(),
        };
        let bound = match rule.item {
            SetItemRule::Enum(allowed) => {
                validator::enum_membership(&token, allowed)?;
                BoundValue::Text(token)
            }
            SetItemRule::FixedLength(len) => {
                validator::fixed_length(&token, len)?;
                BoundValue::Text(token)
            }
            SetItemRule::IntegerRange {
                min,
                max,
                exceptions,
            } => BoundValue::Integer(validator::integer_in_range(&token, min, max, exceptions)?),
        };
        if !values.contains(&bound) {
            values.push(bound);
        }
    }

    if values.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Condition::In(values)))
    }
}

fn compile_boolean(rule: &BooleanRule, value: &str) -> ValidationResult<Condition> {
    let truth = if validator::boolean_token(value, rule.accepted)? {
        rule.truth.0
    } else {
        rule.truth.1
    };
    Ok(Condition::Equals(BoundValue::text(truth)))
}

fn compile_sort(
    resource: &ResourceSpec,
    params: &HashMap<String, String>,
) -> ValidationResult<SortDirective> {
    let mut sort = resource.default_sort();

    if let Some(field) = params.get("sort_field").filter(|v| !v.is_empty()) {
        sort.column = resource
            .sort_column(field)
            .ok_or_else(|| ValidationError::InvalidEnum {
                value: field.clone(),
            })?;
        sort.direction = SortDirection::Asc;
    }

    if let Some(direction) = params.get("sort_direction").filter(|v| !v.is_empty()) {
        sort.direction =
            SortDirection::parse(direction).ok_or_else(|| ValidationError::InvalidEnum {
                value: direction.clone(),
            })?;
    }

    Ok(sort)
}

fn compile_page(resource: &ResourceSpec, params: &HashMap<String, String>) -> PageDirective {
    let paging = resource.paging_limits();

    let limit = params
        .get("limit")
        .and_then(|v| clamp_count(v, 1, paging.max_limit))
        .unwrap_or(paging.default_limit);

    let page = params
        .get("page")
        .and_then(|v| clamp_count(v, 1, MAX_PAGE))
        .unwrap_or(1);

    PageDirective {
        limit,
        offset: (page - 1).saturating_mul(limit),
    }
}

/// Clamp a signed integer token into `min..=max`
///
/// Negative values land on `min`, values too large for `usize` on `max`.
/// `None` when the token is not an integer at all.
fn clamp_count(value: &str, min: usize, max: usize) -> Option<usize> {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, value),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if negative {
        return Some(min);
    }
    Some(digits.parse::<usize>().map_or(max, |n| n.clamp(min, max)))
}
