//! Parsed metric documents.

use std::{fmt, io, path::PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

/// Key of the summary block in a distribution metric.
const SUMMARY_KEY: &str = "summary";
/// Key of the raw samples in a distribution metric.
const DATA_KEY: &str = "full_data";

/// Lists longer than this are summarised by their length.
const MAX_INLINE_LIST: usize = 8;

/// Names of the metric documents the dashboard binds overlays to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentName {
    FrontendSummary,
    RotationAveraging,
    TranslationAveraging,
}

impl DocumentName {
    pub const ALL: [DocumentName; 3] = [
        Self::FrontendSummary,
        Self::RotationAveraging,
        Self::TranslationAveraging,
    ];

    /// The document name, which is also its top-level namespace key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FrontendSummary => "frontend_summary",
            Self::RotationAveraging => "rotation_averaging_metrics",
            Self::TranslationAveraging => "translation_averaging_metrics",
        }
    }

    /// File name of the document inside a results directory.
    pub fn file_name(self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while reading a metric document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a single top-level key `{expected}`, found [{}]", .found.join(", "))]
    Namespace {
        expected: DocumentName,
        found: Vec<String>,
    },

    #[error("`{0}` does not hold an object")]
    NotAnObject(DocumentName),
}

/// A single value inside a metric document.
///
/// Map keys keep the order they have in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<MetricValue>),
    Map(IndexMap<String, MetricValue>),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, MetricValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Interprets a `{ "summary": {...}, "full_data": [...] }` value.
    ///
    /// `full_data` is optional since runs may store the summary only.
    pub fn as_distribution(&self) -> Option<Distribution> {
        let map = self.as_map()?;
        if map.keys().any(|key| key != SUMMARY_KEY && key != DATA_KEY) {
            return None;
        }
        let summary = map.get(SUMMARY_KEY)?.as_map()?;
        let stat = |key: &str| summary.get(key).and_then(MetricValue::as_f64);
        let buckets = |key: &str| -> Option<IndexMap<String, f64>> {
            summary.get(key).and_then(MetricValue::as_map).map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_f64().map(|v| (k.clone(), v)))
                    .collect()
            })
        };

        let samples = match map.get(DATA_KEY) {
            Some(MetricValue::List(values)) => Some(values.len()),
            _ => None,
        };

        Some(Distribution {
            min: stat("min"),
            max: stat("max"),
            median: stat("median"),
            mean: stat("mean"),
            stddev: stat("stddev"),
            quartiles: buckets("quartiles"),
            histogram: buckets("histogram"),
            samples,
        })
    }

    /// Single-line display form of a leaf value.
    fn display_leaf(&self) -> String {
        match self {
            Self::Null => "n/a".to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => format_number(*value),
            Self::Text(text) => text.clone(),
            Self::List(values) if values.len() > MAX_INLINE_LIST => {
                format!("[{} values]", values.len())
            }
            Self::List(values) => {
                let items: Vec<_> = values.iter().map(Self::display_leaf).collect();
                format!("[{}]", items.join(", "))
            }
            Self::Map(map) => format!("{{{} entries}}", map.len()),
        }
    }
}

/// Summary statistics of a distribution metric.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Distribution {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
    pub quartiles: Option<IndexMap<String, f64>>,
    pub histogram: Option<IndexMap<String, f64>>,
    /// Number of raw samples, if they were stored.
    pub samples: Option<usize>,
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = [
            ("mean", self.mean),
            ("median", self.median),
            ("min", self.min),
            ("max", self.max),
            ("stddev", self.stddev),
        ];
        let stats: Vec<_> = stats
            .iter()
            .filter_map(|(label, value)| value.map(|v| format!("{label} {}", format_number(v))))
            .collect();

        let mut sections = Vec::new();
        if !stats.is_empty() {
            sections.push(stats.join(", "));
        }
        for (label, buckets) in [("quartiles", &self.quartiles), ("histogram", &self.histogram)] {
            let Some(buckets) = buckets else { continue };
            if buckets.len() > MAX_INLINE_LIST {
                sections.push(format!("{label} [{} buckets]", buckets.len()));
            } else {
                let items: Vec<_> = buckets
                    .iter()
                    .map(|(key, value)| format!("{key} {}", format_number(*value)))
                    .collect();
                sections.push(format!("{label} [{}]", items.join(", ")));
            }
        }
        f.write_str(&sections.join("; "))?;
        if let Some(samples) = self.samples {
            write!(f, " (n={samples})")?;
        }
        Ok(())
    }
}

/// Formats a metric number for display.
///
/// Integral values print without a fraction; others keep at most four
/// decimals with trailing zeros removed.
pub(crate) fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    let fixed = format!("{value:.4}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// An immutable metric document.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsDocument {
    name: DocumentName,
    root: IndexMap<String, MetricValue>,
}

impl MetricsDocument {
    /// Parses a document payload.
    ///
    /// The payload must be an object with exactly one key equal to `name`;
    /// the object under that key becomes the document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Json`] for malformed JSON,
    /// [`DocumentError::Namespace`] when the top-level key is wrong, and
    /// [`DocumentError::NotAnObject`] when the namespaced value is not an
    /// object.
    pub fn from_json_str(name: DocumentName, json: &str) -> Result<Self, DocumentError> {
        let mut top: IndexMap<String, MetricValue> = serde_json::from_str(json)?;

        if top.len() != 1 || !top.contains_key(name.as_str()) {
            return Err(DocumentError::Namespace {
                expected: name,
                found: top.keys().cloned().collect(),
            });
        }

        match top.swap_remove(name.as_str()) {
            Some(MetricValue::Map(root)) => Ok(Self { name, root }),
            _ => Err(DocumentError::NotAnObject(name)),
        }
    }

    pub fn name(&self) -> DocumentName {
        self.name
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Top-level entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.root.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.root.get(key)
    }

    /// Follows `path` through nested maps.
    pub fn lookup(&self, path: &[&str]) -> Option<&MetricValue> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.root.get(*first)?, |value, key| value.as_map()?.get(*key))
    }

    /// Flattens the document into display rows.
    ///
    /// Nested keys are joined with `.`. Distribution metrics collapse into a
    /// single row holding their summary.
    pub fn rows(&self) -> Vec<(String, String)> {
        let mut rows = Vec::new();
        for (key, value) in &self.root {
            flatten_into(key.clone(), value, &mut rows);
        }
        rows
    }
}

fn flatten_into(prefix: String, value: &MetricValue, rows: &mut Vec<(String, String)>) {
    if let Some(distribution) = value.as_distribution() {
        rows.push((prefix, distribution.to_string()));
        return;
    }

    match value {
        MetricValue::Map(map) if !map.is_empty() => {
            for (key, nested) in map {
                flatten_into(format!("{prefix}.{key}"), nested, rows);
            }
        }
        leaf => rows.push((prefix, leaf.display_leaf())),
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn test_parse_namespaced_document() {
        let json = r#"{"frontend_summary": {"pair_0_1": {"inlier_ratio": 0.92}, "num_pairs": 3}}"#;

        let doc = MetricsDocument::from_json_str(DocumentName::FrontendSummary, json).unwrap();

        assert_eq!(doc.name(), DocumentName::FrontendSummary);
        let ratio = doc
            .lookup(&["pair_0_1", "inlier_ratio"])
            .and_then(MetricValue::as_f64)
            .unwrap();
        assert!(approx_eq!(f64, ratio, 0.92));
        assert_eq!(doc.get("num_pairs"), Some(&MetricValue::Number(3.0)));
        assert!(doc.lookup(&["pair_0_1", "missing"]).is_none());
        assert!(doc.lookup(&[]).is_none());
    }

    #[test]
    fn test_keys_keep_file_order() {
        let json = r#"{"rotation_averaging_metrics": {"zeta": 1, "alpha": 2, "mid": 3}}"#;

        let doc = MetricsDocument::from_json_str(DocumentName::RotationAveraging, json).unwrap();

        let keys: Vec<_> = doc.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_loaded_but_empty_is_not_an_error() {
        let json = r#"{"translation_averaging_metrics": {}}"#;

        let doc =
            MetricsDocument::from_json_str(DocumentName::TranslationAveraging, json).unwrap();

        assert!(doc.is_empty());
        assert!(doc.rows().is_empty());
    }

    #[test]
    fn test_wrong_namespace_is_rejected() {
        let json = r#"{"rotation_averaging_metrics": {"a": 1}}"#;

        let err = MetricsDocument::from_json_str(DocumentName::FrontendSummary, json).unwrap_err();

        match err {
            DocumentError::Namespace { expected, found } => {
                assert_eq!(expected, DocumentName::FrontendSummary);
                assert_eq!(found, vec!["rotation_averaging_metrics".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extra_top_level_keys_are_rejected() {
        let json = r#"{"frontend_summary": {}, "other": {}}"#;

        let err = MetricsDocument::from_json_str(DocumentName::FrontendSummary, json).unwrap_err();

        assert!(matches!(err, DocumentError::Namespace { .. }));
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        let json = r#"{"frontend_summary": [1, 2]}"#;

        let err = MetricsDocument::from_json_str(DocumentName::FrontendSummary, json).unwrap_err();

        assert!(matches!(err, DocumentError::NotAnObject(_)));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err =
            MetricsDocument::from_json_str(DocumentName::FrontendSummary, "{ not json").unwrap_err();

        assert!(matches!(err, DocumentError::Json(_)));
    }

    #[test]
    fn test_distribution_recognised() {
        let json = r#"{"rotation_averaging_metrics": {
            "rotation_angle_error_deg": {
                "summary": {"min": 0.1, "max": 2.5, "median": 0.8, "mean": 0.9, "stddev": 0.4,
                            "quartiles": {"q0": 0.1, "q1": 0.5, "q2": 0.8, "q3": 1.2, "q4": 2.5}},
                "full_data": [0.1, 0.8, 2.5]
            },
            "num_rotations": 3
        }}"#;

        let doc = MetricsDocument::from_json_str(DocumentName::RotationAveraging, json).unwrap();
        let dist = doc
            .get("rotation_angle_error_deg")
            .and_then(MetricValue::as_distribution)
            .unwrap();

        assert!(approx_eq!(f64, dist.mean.unwrap(), 0.9));
        assert_eq!(dist.samples, Some(3));
        assert_eq!(dist.quartiles.as_ref().map(IndexMap::len), Some(5));
        assert!(dist.histogram.is_none());
        assert!(doc.get("num_rotations").unwrap().as_distribution().is_none());
    }

    #[test]
    fn test_rows_flatten_nested_maps() {
        let json = r#"{"frontend_summary": {
            "pair_0_1": {"inlier_ratio": 0.92, "num_inliers": 120},
            "note": null,
            "angles": [1.5, 2, 3]
        }}"#;

        let doc = MetricsDocument::from_json_str(DocumentName::FrontendSummary, json).unwrap();

        assert_eq!(
            doc.rows(),
            vec![
                ("pair_0_1.inlier_ratio".to_string(), "0.92".to_string()),
                ("pair_0_1.num_inliers".to_string(), "120".to_string()),
                ("note".to_string(), "n/a".to_string()),
                ("angles".to_string(), "[1.5, 2, 3]".to_string()),
            ]
        );
    }

    #[test]
    fn test_rows_summarise_distributions() {
        let json = r#"{"translation_averaging_metrics": {
            "error": {"summary": {"min": 0, "max": 1, "median": 0.5, "mean": 0.5, "stddev": 0.25}}
        }}"#;

        let doc =
            MetricsDocument::from_json_str(DocumentName::TranslationAveraging, json).unwrap();

        assert_eq!(
            doc.rows(),
            vec![(
                "error".to_string(),
                "mean 0.5, median 0.5, min 0, max 1, stddev 0.25".to_string()
            )]
        );
    }

    #[test]
    fn test_distribution_display_includes_buckets() {
        let json = r#"{"translation_averaging_metrics": {
            "error": {
                "summary": {"mean": 0.5, "quartiles": {"q1": 0.25, "q3": 0.75},
                            "histogram": {"0-1": 4, "1-2": 1}},
                "full_data": [0.1, 0.2, 0.5, 0.7, 1.4]
            },
            "wide": {"summary": {"histogram": {
                "b0": 1, "b1": 1, "b2": 1, "b3": 1, "b4": 1,
                "b5": 1, "b6": 1, "b7": 1, "b8": 1, "b9": 1
            }}}
        }}"#;

        let doc =
            MetricsDocument::from_json_str(DocumentName::TranslationAveraging, json).unwrap();

        assert_eq!(
            doc.rows(),
            vec![
                (
                    "error".to_string(),
                    "mean 0.5; quartiles [q1 0.25, q3 0.75]; histogram [0-1 4, 1-2 1] (n=5)"
                        .to_string()
                ),
                ("wide".to_string(), "histogram [10 buckets]".to_string()),
            ]
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.92), "0.92");
        assert_eq!(format_number(1.0 / 3.0), "0.3333");
        assert_eq!(format_number(-0.00001), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_long_lists_are_summarised() {
        let value = MetricValue::List((0..20).map(|i| MetricValue::Number(i as f64)).collect());
        assert_eq!(value.display_leaf(), "[20 values]");
    }
}
