//! FilterEngine — validates and resolves user-supplied query parameters
//! against the tenant's active `filter` rows and the FilterRegistry.

pub mod types;

use std::collections::HashMap;

use serde_json::Value;

use crate::cache::MetadataCache;
use crate::error::{AppError, AppResult};
use crate::models::FilterRow;
use crate::registry::filters::{self, FilterDescriptor};

pub use types::FilterOption;

/// One fully-resolved filter: its tenant row, registry descriptor, and the
/// validated value (or the descriptor default if the caller omitted it).
#[derive(Debug, Clone)]
pub struct ResolvedFilter {
    pub filter_id: i64,
    pub filter_name: String,
    pub param_name: &'static str,
    pub value: Value,
}

/// Per-request validation outcome: `errors` keyed by `param_name`, `cleaned`
/// holding every filter that validated (including defaulted ones).
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub cleaned: HashMap<&'static str, ResolvedFilter>,
    pub errors: HashMap<String, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct FilterEngine<'a> {
    cache: &'a MetadataCache,
}

impl<'a> FilterEngine<'a> {
    pub fn new(cache: &'a MetadataCache) -> Self {
        Self { cache }
    }

    /// Active filter rows for the tenant, paired with their registry
    /// descriptor. Rows whose `filter_name` has no registry entry are
    /// skipped — a dangling reference is a data problem, not a 500.
    pub fn get_all(&self) -> AppResult<Vec<(FilterRow, &'static FilterDescriptor)>> {
        Ok(self
            .cache
            .get_filters()?
            .into_iter()
            .filter_map(|row| {
                let descriptor = filters::lookup(&row.filter_name)?;
                Some((row, descriptor))
            })
            .collect())
    }

    pub fn get_by_name(&self, filter_name: &str) -> AppResult<Option<(FilterRow, &'static FilterDescriptor)>> {
        Ok(self
            .get_all()?
            .into_iter()
            .find(|(row, _)| row.filter_name == filter_name))
    }

    pub fn get_by_param(&self, param_name: &str) -> AppResult<Option<(FilterRow, &'static FilterDescriptor)>> {
        Ok(self
            .get_all()?
            .into_iter()
            .find(|(_, desc)| desc.param_name == param_name))
    }

    /// Loads the option list for a dropdown/multiselect filter, by
    /// `filter_name`.
    pub fn resolve_options(&self, filter_name: &str) -> AppResult<Vec<FilterOption>> {
        let Some((row, descriptor)) = self.get_by_name(filter_name)? else {
            return Ok(Vec::new());
        };
        let Some(source) = descriptor.options_source else {
            return Ok(Vec::new());
        };
        types::load_options(source, self.cache, row.filter_id)
    }

    /// Validates the full set of incoming query parameters (keyed by
    /// `param_name`) against every active filter. Filters missing from
    /// `raw_params` are validated against `None`, which resolves to the
    /// descriptor default (or an error, if `required`).
    pub fn validate_input(&self, raw_params: &HashMap<String, Value>) -> AppResult<ValidationResult> {
        let mut result = ValidationResult::default();

        for (row, descriptor) in self.get_all()? {
            let raw = raw_params.get(descriptor.param_name);

            if descriptor.options_source.is_some() && matches!(descriptor.filter_type, filters::FilterType::Dropdown | filters::FilterType::Multiselect) {
                if let Err(e) = self.check_membership(descriptor, raw, row.filter_id) {
                    result.errors.insert(descriptor.param_name.to_string(), e);
                    continue;
                }
            }

            match types::validate(descriptor, raw) {
                Ok(value) => {
                    result.cleaned.insert(
                        descriptor.param_name,
                        ResolvedFilter {
                            filter_id: row.filter_id,
                            filter_name: row.filter_name.clone(),
                            param_name: descriptor.param_name,
                            value,
                        },
                    );
                }
                Err(message) => {
                    result.errors.insert(descriptor.param_name.to_string(), message);
                }
            }
        }

        Ok(result)
    }

    /// Checks that a dropdown/multiselect value (or every element of a
    /// multiselect list) names a live option, skipping the synthetic
    /// `"all"` and `group_*` production-line values.
    fn check_membership(
        &self,
        descriptor: &FilterDescriptor,
        raw: Option<&Value>,
        filter_id: i64,
    ) -> Result<(), String> {
        let Some(raw) = raw else { return Ok(()) };
        if raw.is_null() {
            return Ok(());
        }
        let source = descriptor.options_source.unwrap_or_default();
        let options = types::load_options(source, self.cache, filter_id)
            .map_err(|e| format!("loading options: {e}"))?;

        let candidates: Vec<&Value> = match raw {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        for candidate in candidates {
            if let Some(s) = candidate.as_str() {
                if s == "all" || s.starts_with("group_") {
                    continue;
                }
            }
            if !options.iter().any(|o| &o.value == candidate) {
                return Err(format!("unknown option: {candidate}"));
            }
        }
        Ok(())
    }

    /// Resolves one filter's cleaned value by param name, applying the
    /// descriptor default when absent from `raw_params`.
    pub fn resolve_one(&self, param_name: &str, raw_params: &HashMap<String, Value>) -> AppResult<Option<ResolvedFilter>> {
        let Some((row, descriptor)) = self.get_by_param(param_name)? else {
            return Ok(None);
        };
        let value = types::validate(descriptor, raw_params.get(param_name))
            .map_err(AppError::Validation)?;
        Ok(Some(ResolvedFilter {
            filter_id: row.filter_id,
            filter_name: row.filter_name,
            param_name: descriptor.param_name,
            value,
        }))
    }

    pub fn resolve_all(&self, raw_params: &HashMap<String, Value>) -> AppResult<HashMap<&'static str, ResolvedFilter>> {
        let validation = self.validate_input(raw_params)?;
        if !validation.is_valid() {
            let joined = validation
                .errors
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::Validation(joined));
        }
        Ok(validation.cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_daterange_rejects_inverted_range() {
        let descriptor = filters::lookup("DateRangeFilter").unwrap();
        let bad = json!({
            "start_date": "2026-02-01",
            "end_date": "2026-01-01",
        });
        assert!(types::validate(descriptor, Some(&bad)).is_err());
    }

    #[test]
    fn validate_daterange_accepts_well_formed_range() {
        let descriptor = filters::lookup("DateRangeFilter").unwrap();
        let good = json!({
            "start_date": "2026-01-01",
            "end_date": "2026-01-31",
        });
        assert!(types::validate(descriptor, Some(&good)).is_ok());
    }

    #[test]
    fn toggle_defaults_to_true_when_absent() {
        let descriptor = filters::lookup("ShowDowntimeFilter").unwrap();
        let value = types::validate(descriptor, None).unwrap();
        assert_eq!(value, json!(true));
    }

    #[test]
    fn number_filter_rejects_negative_threshold() {
        let descriptor = filters::lookup("DowntimeThresholdFilter").unwrap();
        let value = json!(-1);
        assert!(types::validate(descriptor, Some(&value)).is_err());
    }

    #[test]
    fn multiselect_empty_list_is_valid_when_not_required() {
        let descriptor = filters::lookup("ProductFilter").unwrap();
        let value = types::validate(descriptor, Some(&json!([]))).unwrap();
        assert_eq!(value, json!([]));
    }
}
