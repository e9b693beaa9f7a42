//! Structural validation of record trees against their schema.
//!
//! Checks required features, datatype facets (pattern and length) and
//! dangling non-containment references. Facet patterns are compiled once
//! per registry.

use crate::config::ValidationConfig;
use crate::record::Record;
use crate::registry::Registry;
use crate::schema::{FeatureDescriptor, FeatureKind, RecordType};
use crate::store::RecordStore;
use owsmodel_types::{DataKind, DataTypeId, ModelError, ModelResult, RecordId, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// What is wrong with a feature value.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    #[error("required value is missing")]
    Missing,

    #[error("{count} values present, at least {min} required")]
    TooFew { count: usize, min: usize },

    #[error("'{lexical}' does not match the pattern '{pattern}'")]
    PatternMismatch { lexical: String, pattern: String },

    #[error("length {length} is below the minimum {min}")]
    TooShort { length: usize, min: usize },

    #[error("length {length} exceeds the maximum {max}")]
    TooLong { length: usize, max: usize },

    #[error("reference to destroyed record {0}")]
    Dangling(RecordId),
}

/// One finding: which record and feature, and what is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub record: RecordId,
    pub record_type: String,
    pub feature: String,
    pub severity: Severity,
    pub problem: Problem,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(
            f,
            "{level}: {}.{} ({}): {}",
            self.record_type, self.feature, self.record, self.problem
        )
    }
}

/// Validates records of one registry.
#[derive(Debug)]
pub struct Validator {
    registry: Arc<Registry>,
    config: ValidationConfig,
    patterns: HashMap<DataTypeId, Regex>,
}

impl Validator {
    /// Compiles every pattern facet of the registry. A pattern that is not a
    /// valid regular expression is reported as an invalid literal of its datatype.
    pub fn for_registry(registry: Arc<Registry>, config: ValidationConfig) -> ModelResult<Self> {
        let mut patterns = HashMap::new();
        for (id, dt) in registry.datatypes() {
            if let Some(pattern) = &dt.facets().pattern {
                let regex = Regex::new(&format!("^(?:{pattern})$"))
                    .map_err(|e| ModelError::invalid_literal(dt.name(), pattern.as_str(), e.to_string()))?;
                patterns.insert(id, regex);
            }
        }
        debug!(patterns = patterns.len(), "Validator ready");
        Ok(Self {
            registry,
            config,
            patterns,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validates `root`, and its contents when configured to recurse.
    pub fn validate(&self, store: &RecordStore, root: RecordId) -> ModelResult<Vec<Diagnostic>> {
        if !Arc::ptr_eq(store.registry(), &self.registry) {
            return Err(ModelError::UnsupportedOperation(
                "store is bound to a different registry".to_owned(),
            ));
        }
        let mut targets = vec![root];
        if self.config.recursive {
            targets.extend(store.all_contents(root)?);
        }
        let mut out = Vec::new();
        for id in targets {
            self.validate_record(store, store.record(id)?, &mut out)?;
        }
        debug!(root = %root, diagnostics = out.len(), "Validation finished");
        Ok(out)
    }

    /// Whether `root` produces no error-level diagnostics.
    pub fn is_valid(&self, store: &RecordStore, root: RecordId) -> ModelResult<bool> {
        Ok(self
            .validate(store, root)?
            .iter()
            .all(|d| d.severity < Severity::Error))
    }

    fn validate_record(&self, store: &RecordStore, record: &Record, out: &mut Vec<Diagnostic>) -> ModelResult<()> {
        let rt = self.registry.record_type(record.record_type())?;
        for f in rt.features().iter().filter(|f| !f.is_derived()) {
            let values = record.slots()[f.id().index()].items();
            let present: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
            let mut report = |severity, problem| {
                out.push(Diagnostic {
                    record: record.id(),
                    record_type: rt.name().to_owned(),
                    feature: f.name().to_owned(),
                    severity,
                    problem,
                });
            };

            if self.config.check_required && present.len() < f.min_occurs() {
                let problem = if present.is_empty() {
                    Problem::Missing
                } else {
                    Problem::TooFew {
                        count: present.len(),
                        min: f.min_occurs(),
                    }
                };
                report(Severity::Error, problem);
            }

            match f.kind() {
                FeatureKind::Attribute { datatype } if self.config.check_facets => {
                    for v in &present {
                        for problem in self.facet_problems(datatype, v)? {
                            report(Severity::Error, problem);
                        }
                    }
                }
                FeatureKind::Group if self.config.check_facets => {
                    for entry in present.iter().filter_map(|v| v.as_entry()) {
                        if let Some(datatype) = member_datatype(rt, entry.feature.index()) {
                            for problem in self.facet_problems(datatype, &entry.value)? {
                                report(Severity::Error, problem);
                            }
                        }
                    }
                }
                FeatureKind::Reference {
                    containment: false, ..
                } if self.config.report_dangling => {
                    for target in present.iter().filter_map(|v| v.as_record()) {
                        if !store.contains(target) {
                            report(Severity::Warning, Problem::Dangling(target));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn facet_problems(&self, datatype: DataTypeId, value: &Value) -> ModelResult<Vec<Problem>> {
        let dt = self.registry.datatype(datatype)?;
        let facets = dt.facets();
        if facets.is_empty() {
            return Ok(Vec::new());
        }
        let lexical = dt.format_value(value)?;
        let length = match dt.kind() {
            DataKind::List(_) => value.as_list().map_or(0, <[Value]>::len),
            _ => lexical.chars().count(),
        };

        let mut problems = Vec::new();
        if let (Some(regex), Some(pattern)) = (self.patterns.get(&datatype), &facets.pattern) {
            if !regex.is_match(&lexical) {
                problems.push(Problem::PatternMismatch {
                    lexical: lexical.clone(),
                    pattern: pattern.clone(),
                });
            }
        }
        if let Some(min) = facets.min_length.filter(|min| length < *min) {
            problems.push(Problem::TooShort { length, min });
        }
        if let Some(max) = facets.max_length.filter(|max| length > *max) {
            problems.push(Problem::TooLong { length, max });
        }
        Ok(problems)
    }
}

fn member_datatype(rt: &RecordType, index: usize) -> Option<DataTypeId> {
    rt.features().get(index).and_then(FeatureDescriptor::datatype)
}
