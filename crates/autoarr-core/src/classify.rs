//! Ignore and removal tests applied to each download before partitioning.

use crate::error::CoreResult;
use crate::model::{Download, IgnoreRules, RemovalRules};

/// Whether the ignore rules exclude a download from accounting and transitions.
///
/// Block patterns of every axis are checked first; an allow pattern is a required substring.
#[must_use]
pub fn is_ignored(download: &Download, rules: &IgnoreRules) -> bool {
    let axes = [
        (&rules.name, download.name.as_str()),
        (&rules.tag, download.tags.as_str()),
        (&rules.category, download.category.as_str()),
    ];

    axes.iter().any(|(rule, value)| rule.blocks(value))
        || axes.iter().any(|(rule, value)| rule.disallows(value))
}

/// Whether the removal rules mark a download for removal.
///
/// Fields are only looked up for conditions evaluated before the fold short-circuits.
///
/// # Errors
///
/// Returns [`crate::CoreError::MissingField`] when an evaluated condition references a field
/// the download does not carry.
pub fn evaluate_removal(download: &Download, rules: &RemovalRules) -> CoreResult<bool> {
    rules.mode.fold(
        rules
            .conditions
            .iter()
            .map(|condition| {
                download
                    .field(&condition.field)
                    .map(|value| condition.is_satisfied_by(value))
            }),
    )
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::CoreError;
    use crate::model::{FieldMap, PatternRule, RemovalMode, RemoveCondition};

    fn download(name: &str, tags: &str, category: &str, fields: FieldMap) -> Download {
        Download {
            id: format!("hash-{name}"),
            name: name.to_string(),
            category: category.to_string(),
            tags: tags.to_string(),
            content_path: format!("/downloads/{name}"),
            size: 100,
            active: true,
            fields,
        }
    }

    fn condition(field: &str, invert: bool, threshold: f64) -> RemoveCondition {
        RemoveCondition {
            field: field.to_string(),
            invert,
            threshold,
        }
    }

    #[test]
    fn block_on_any_axis_ignores_regardless_of_other_axes() {
        let rules = IgnoreRules {
            name: PatternRule::new("", "Linux"),
            tag: PatternRule::new("", "keep"),
            category: PatternRule::new("private", ""),
        };
        let matching_elsewhere = download("Linux ISO", "keep", "private-tracker", FieldMap::new());
        assert!(is_ignored(&matching_elsewhere, &rules));

        let rules = IgnoreRules {
            tag: PatternRule::new("hold", ""),
            ..IgnoreRules::default()
        };
        assert!(is_ignored(
            &download("Anything", "on-hold", "tv", FieldMap::new()),
            &rules
        ));
        assert!(!is_ignored(
            &download("Anything", "seed", "tv", FieldMap::new()),
            &rules
        ));
    }

    #[test]
    fn allow_pattern_requires_substring() {
        let rules = IgnoreRules {
            category: PatternRule::new("", "movies"),
            ..IgnoreRules::default()
        };
        assert!(is_ignored(&download("A", "", "tv", FieldMap::new()), &rules));
        assert!(!is_ignored(
            &download("A", "", "movies-4k", FieldMap::new()),
            &rules
        ));
    }

    #[test]
    fn unconfigured_axes_ignore_nothing() {
        let rules = IgnoreRules::default();
        assert!(!is_ignored(&download("", "", "", FieldMap::new()), &rules));
    }

    #[test]
    fn inclusive_fold_stops_at_first_true() {
        let pulled = Cell::new(0);
        let outcomes = [false, true, false].into_iter().map(|value| {
            pulled.set(pulled.get() + 1);
            Ok::<_, CoreError>(value)
        });
        assert_eq!(RemovalMode::Inclusive.fold(outcomes), Ok(true));
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn exclusive_fold_stops_at_first_false() {
        let pulled = Cell::new(0);
        let outcomes = [true, false, true].into_iter().map(|value| {
            pulled.set(pulled.get() + 1);
            Ok::<_, CoreError>(value)
        });
        assert_eq!(RemovalMode::Exclusive.fold(outcomes), Ok(false));
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn fold_without_short_circuit_keeps_last_outcome() {
        let none: [Result<bool, CoreError>; 0] = [];
        assert_eq!(RemovalMode::Inclusive.fold(none.clone()), Ok(false));
        assert_eq!(RemovalMode::Exclusive.fold(none), Ok(false));
        assert_eq!(
            RemovalMode::Inclusive.fold([Ok::<_, CoreError>(false), Ok(false)]),
            Ok(false)
        );
        assert_eq!(
            RemovalMode::Exclusive.fold([Ok::<_, CoreError>(true), Ok(true)]),
            Ok(true)
        );
    }

    #[test]
    fn removal_skips_fields_after_short_circuit() {
        let fields: FieldMap = [("ratio", 3.0)].into_iter().collect();
        let item = download("Seeded", "", "tv", fields);
        let rules = RemovalRules {
            conditions: vec![condition("ratio", false, 2.0), condition("missing", false, 1.0)],
            mode: RemovalMode::Inclusive,
        };
        assert_eq!(evaluate_removal(&item, &rules), Ok(true));

        let rules = RemovalRules {
            conditions: vec![condition("ratio", true, 2.0), condition("missing", false, 1.0)],
            mode: RemovalMode::Exclusive,
        };
        assert_eq!(evaluate_removal(&item, &rules), Ok(false));
    }

    #[test]
    fn removal_reports_missing_field_when_evaluated() {
        let item = download("Bare", "", "tv", FieldMap::new());
        let rules = RemovalRules {
            conditions: vec![condition("ratio", false, 2.0)],
            mode: RemovalMode::Exclusive,
        };
        assert!(matches!(
            evaluate_removal(&item, &rules),
            Err(CoreError::MissingField { field, .. }) if field == "ratio"
        ));
    }

    #[test]
    fn empty_rules_never_remove() {
        let item = download("Any", "", "tv", FieldMap::new());
        assert_eq!(evaluate_removal(&item, &RemovalRules::default()), Ok(false));
    }
}
