// src/config/select.rs

//! `--label` handling.

use std::collections::BTreeSet;

use crate::config::model::ResolvedConfiguration;
use crate::errors::{CliError, Result};

/// Pick the test configurations to run, returned as indices into
/// [`ResolvedConfiguration::tests`].
///
/// - No labels: every configuration is enabled.
/// - A label that parses as an integer selects by 0-based index, even if
///   another configuration happens to be labelled with that number.
/// - Any other label must match a configuration's `label` exactly.
///
/// Duplicates collapse, and the result is always in configuration order so
/// that execution order never depends on the order labels were passed in.
pub fn select_enabled(config: &ResolvedConfiguration, labels: &[String]) -> Result<Vec<usize>> {
    let tests = config.tests();
    if labels.is_empty() {
        return Ok((0..tests.len()).collect());
    }

    let mut enabled = BTreeSet::new();
    for label in labels {
        let found = match label.trim().parse::<usize>() {
            Ok(index) if index < tests.len() => Some(index),
            Ok(_) => None,
            Err(_) => tests
                .iter()
                .position(|t| t.label.as_deref() == Some(label.as_str())),
        };

        match found {
            Some(index) => {
                enabled.insert(index);
            }
            None => return Err(CliError::LabelNotFound(label.clone())),
        }
    }

    Ok(enabled.into_iter().collect())
}
