//! Response extractor: named vector fields out of engine text.
//!
//! The engine answers `preview_tokenomics_graphs` with Candid text along the lines of:
//!
//! ```text
//! record {
//!   minted_per_epoch_data_x = vec { "Epoch 1"; "Epoch 2" };
//!   cost_to_mint_data_y = vec { 0 : float64; 2.5 : float64 };
//!   cumulative_supply_data_y = vec { 100_000_000 : nat64; 900_000_000 : nat64 };
//! }
//! ```
//!
//! Extraction runs in three steps, each usable on its own:
//! 1. [`find_literal`]: anchor on `<field> = <vector-literal>`.
//! 2. [`tokenize`]: split the literal body into elements.
//! 3. [`coerce_number`]: strip tag/symbol noise and parse to `f64`.
//!
//! Nothing here fails. Missing fields stay absent, unparsable numbers become `0.0`, and both are
//! recorded in [`ExtractionQuality`].

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{FieldName, FieldVector};

/// A numeric token that could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFailure {
    pub field: FieldName,
    pub index: usize,
    pub token: String,
}

/// Data-quality flags raised while extracting one response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionQuality {
    pub missing_fields: Vec<FieldName>,
    /// Literals whose closing delimiter never appeared (read to end of text).
    pub truncated_fields: Vec<FieldName>,
    pub conversion_failures: Vec<ConversionFailure>,
}

impl ExtractionQuality {
    pub fn is_clean(&self) -> bool {
        self.missing_fields.is_empty()
            && self.truncated_fields.is_empty()
            && self.conversion_failures.is_empty()
    }
}

/// Fields recovered from one response, each at its observed length.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    labels: Option<Vec<String>>,
    vectors: BTreeMap<FieldName, FieldVector>,
    quality: ExtractionQuality,
}

impl ExtractedFields {
    /// Attach epoch labels (used when building fields by hand).
    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self.quality
            .missing_fields
            .retain(|f| *f != FieldName::MintedPerEpochDataX);
        self
    }

    /// Attach a numeric vector (used when building fields by hand).
    ///
    /// Passing [`FieldName::MintedPerEpochDataX`] is ignored; labels go through
    /// [`ExtractedFields::with_labels`].
    pub fn with_vector(mut self, field: FieldName, values: Vec<f64>) -> Self {
        if field.is_label() {
            return self;
        }
        self.vectors.insert(field, FieldVector::new(values));
        self.quality.missing_fields.retain(|f| *f != field);
        self
    }

    /// Epoch labels, empty when the field was absent.
    pub fn labels(&self) -> &[String] {
        self.labels.as_deref().unwrap_or(&[])
    }

    pub fn vector(&self, field: FieldName) -> Option<&FieldVector> {
        self.vectors.get(&field)
    }

    pub fn has(&self, field: FieldName) -> bool {
        if field.is_label() {
            self.labels.is_some()
        } else {
            self.vectors.contains_key(&field)
        }
    }

    /// Value of `field` at `index`; absent fields and out-of-range reads yield `0.0`.
    pub fn value_at(&self, field: FieldName, index: usize) -> f64 {
        self.vectors
            .get(&field)
            .map(|v| v.value_at(index))
            .unwrap_or(0.0)
    }

    /// Number of epochs reported by the engine (length of the label vector).
    pub fn epoch_count(&self) -> usize {
        self.labels().len()
    }

    /// Numeric fields present with a length different from the label vector.
    pub fn length_mismatches(&self) -> Vec<FieldName> {
        let expected = self.epoch_count();
        self.vectors
            .iter()
            .filter(|(_, v)| v.len() != expected)
            .map(|(f, _)| *f)
            .collect()
    }

    pub fn quality(&self) -> &ExtractionQuality {
        &self.quality
    }
}

/// Extract every recognized field from `raw`. Idempotent and infallible.
pub fn extract(raw: &str) -> ExtractedFields {
    let mut out = ExtractedFields::default();

    for field in FieldName::ALL {
        let Some(literal) = find_literal(raw, field) else {
            out.quality.missing_fields.push(field);
            continue;
        };
        if literal.truncated {
            warn!(field = %field, "vector literal is not closed; reading to end of input");
            out.quality.truncated_fields.push(field);
        }

        let tokens = tokenize(literal.body);
        if field.is_label() {
            out.labels = Some(tokens.iter().map(|t| clean_label(t)).collect());
            continue;
        }

        let mut values = Vec::with_capacity(tokens.len());
        for (index, token) in tokens.iter().enumerate() {
            match coerce_number(token) {
                Some(v) => values.push(v),
                None => {
                    warn!(field = %field, index, token = %token, "numeric conversion failed; using 0.0");
                    out.quality.conversion_failures.push(ConversionFailure {
                        field,
                        index,
                        token: token.clone(),
                    });
                    values.push(0.0);
                }
            }
        }
        out.vectors.insert(field, FieldVector::new(values));
    }

    out
}

/// Body of a vector literal located in the raw text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Literal<'a> {
    pub body: &'a str,
    pub truncated: bool,
}

fn anchor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let names: Vec<&str> = FieldName::ALL.iter().map(|f| f.as_str()).collect();
        let pattern = format!(
            r"\b({})\s*=\s*(?:vec\s*)?([\{{\[\(])",
            names.join("|")
        );
        Regex::new(&pattern).unwrap_or_else(|e| unreachable!("static anchor pattern: {e}"))
    })
}

/// Locate the first `<field> = <vector-literal>` for `field`.
pub fn find_literal(raw: &str, field: FieldName) -> Option<Literal<'_>> {
    let caps = anchor_regex()
        .captures_iter(raw)
        .find(|c| c.get(1).map(|m| m.as_str()) == Some(field.as_str()))?;
    let open = caps.get(2)?;
    let closer = match open.as_str() {
        "{" => '}',
        "[" => ']',
        _ => ')',
    };

    let rest = &raw[open.end()..];
    match find_unquoted(rest, |c| c == closer) {
        Some(end) => Some(Literal {
            body: &rest[..end],
            truncated: false,
        }),
        None => Some(Literal {
            body: rest,
            truncated: true,
        }),
    }
}

/// Byte offset of the first char outside double quotes matching `pred`.
fn find_unquoted(s: &str, pred: impl Fn(char) -> bool) -> Option<usize> {
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => {}
            }
            continue;
        }
        if c == '"' {
            in_quote = true;
        } else if pred(c) {
            return Some(i);
        }
    }
    None
}

fn split_unquoted(s: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(i) = find_unquoted(rest, &is_sep) {
        parts.push(&rest[..i]);
        let width = rest[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        rest = &rest[i + width..];
    }
    parts.push(rest);
    parts
}

/// Split a literal body into element tokens with type tags removed.
///
/// Elements are separated by `;` or `,`; when neither occurs, by whitespace. Quoted strings are
/// never split.
pub fn tokenize(body: &str) -> Vec<String> {
    let has_sep = find_unquoted(body, |c| c == ';' || c == ',').is_some();
    let elements: Vec<String> = if has_sep {
        split_unquoted(body, |c| c == ';' || c == ',')
            .into_iter()
            .map(strip_type_tag)
            .collect()
    } else {
        drop_spaced_tags(split_unquoted(body, char::is_whitespace))
    };

    elements
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

fn strip_type_tag(element: &str) -> String {
    match find_unquoted(element, |c| c == ':') {
        Some(i) => element[..i].to_string(),
        None => element.to_string(),
    }
}

/// Whitespace-separated parts with `:`-tags removed. A tag may be glued to its value
/// (`5:nat64`), split off (`5 : nat64`), or half-glued (`5: nat64`, `5 :nat64`).
fn drop_spaced_tags(parts: Vec<&str>) -> Vec<String> {
    let mut out = Vec::with_capacity(parts.len());
    let mut tag_follows = false;
    for part in parts.into_iter().filter(|p| !p.is_empty()) {
        if tag_follows {
            tag_follows = false;
            continue;
        }
        if part == ":" {
            tag_follows = true;
            continue;
        }
        if part.starts_with(':') {
            continue;
        }
        if find_unquoted(part, |c| c == ':') == Some(part.len() - 1) {
            tag_follows = true;
        }
        out.push(strip_type_tag(part));
    }
    out
}

fn unquote(token: &str) -> &str {
    let t = token.trim();
    t.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(t)
}

fn clean_label(token: &str) -> String {
    unquote(token).to_string()
}

/// Parse one numeric token, tolerating `$` prefixes, `%` suffixes, `_` separators and quotes.
///
/// Returns `None` for anything that does not yield a finite `f64`.
pub fn coerce_number(token: &str) -> Option<f64> {
    let t = unquote(token);
    let t = t.strip_prefix('$').unwrap_or(t);
    let t = t.strip_suffix('%').unwrap_or(t);
    let cleaned: String = t.chars().filter(|c| *c != '_' && !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = r#"(
  record {
    cumulative_usd_cost_data_y = vec { 0 : float64; 5_000 : float64; 15_000 : float64 };
    cost_to_mint_data_y = vec { 0 : float64; 0.25 : float64; 0.5 : float64 };
    cumulative_supply_data_x = vec { 100_000_000_000_000 : nat64; 300_000_000_000_000 : nat64 };
    cumulative_supply_data_y = vec { 2_000_000_000_000 : nat64; 4_000_000_000_000 : nat64 };
    minted_per_epoch_data_x = vec { "Epoch 1"; "Epoch 2" };
    minted_per_epoch_data_y = vec { 2_000_000_000_000 : nat64; 2_000_000_000_000 : nat64 };
  },
)"#;

    #[test]
    fn extracts_candid_record() {
        let fields = extract(SAMPLE);
        assert_eq!(fields.labels(), &["Epoch 1".to_string(), "Epoch 2".to_string()]);
        assert_eq!(fields.epoch_count(), 2);
        assert_eq!(
            fields.vector(FieldName::CostToMintDataY).map(|v| v.values().to_vec()),
            Some(vec![0.0, 0.25, 0.5])
        );
        assert_eq!(fields.value_at(FieldName::CumulativeSupplyDataY, 1), 4e12);
        assert_eq!(fields.value_at(FieldName::CumulativeUsdCostDataY, 1), 5000.0);
        assert!(fields.quality().is_clean());
        assert_eq!(
            fields.length_mismatches(),
            vec![FieldName::CostToMintDataY, FieldName::CumulativeUsdCostDataY]
        );
    }

    #[test]
    fn cost_vector_with_type_tags() {
        let fields = extract("cost_to_mint_data_y = vec { 0 : float64; 2.5 : float64 }");
        assert_eq!(
            fields.vector(FieldName::CostToMintDataY).map(|v| v.values().to_vec()),
            Some(vec![0.0, 2.5])
        );
    }

    #[test]
    fn empty_vectors_are_present_but_empty() {
        let fields = extract("minted_per_epoch_data_x = vec {}; minted_per_epoch_data_y = vec {}");
        assert!(fields.has(FieldName::MintedPerEpochDataX));
        assert_eq!(fields.epoch_count(), 0);
        assert_eq!(fields.vector(FieldName::MintedPerEpochDataY).map(|v| v.len()), Some(0));
    }

    #[test]
    fn absent_fields_are_reported_not_raised() {
        let fields = extract("no vectors here");
        assert_eq!(fields.quality().missing_fields, FieldName::ALL.to_vec());
        assert_eq!(fields.epoch_count(), 0);
        assert_eq!(fields.value_at(FieldName::CostToMintDataY, 3), 0.0);
    }

    #[test]
    fn unparsable_tokens_become_zero_and_are_flagged() {
        let fields = extract("cumulative_usd_cost_data_y = vec { 1.5 : float64; oops; NaN : float64 }");
        let v = fields.vector(FieldName::CumulativeUsdCostDataY).expect("present");
        assert_eq!(v.values(), &[1.5, 0.0, 0.0]);
        let failures = &fields.quality().conversion_failures;
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 1);
        assert_eq!(failures[0].token, "oops");
    }

    #[test]
    fn currency_percent_and_brackets_are_tolerated() {
        let fields = extract("cost_to_mint_data_y = [$1.25, 40%, \"3\"]");
        assert_eq!(
            fields.vector(FieldName::CostToMintDataY).map(|v| v.values().to_vec()),
            Some(vec![1.25, 40.0, 3.0])
        );
    }

    #[test]
    fn whitespace_separated_elements() {
        let fields = extract("minted_per_epoch_data_y = vec { 1 : nat64 2 : nat64 3 }");
        assert_eq!(
            fields.vector(FieldName::MintedPerEpochDataY).map(|v| v.values().to_vec()),
            Some(vec![1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn quoted_label_keeps_its_colon_without_separators() {
        let fields = extract(r#"minted_per_epoch_data_x = vec { "Epoch x:abc" }"#);
        assert_eq!(fields.labels(), &["Epoch x:abc".to_string()]);

        let two = extract(r#"minted_per_epoch_data_x = vec { "a: b" "c : d" }"#);
        assert_eq!(two.labels(), &["a: b".to_string(), "c : d".to_string()]);
    }

    #[test]
    fn half_glued_tags_are_dropped_without_separators() {
        let fields = extract("minted_per_epoch_data_y = vec { 5: nat64 6 :nat64 7:nat64 8 }");
        assert_eq!(
            fields.vector(FieldName::MintedPerEpochDataY).map(|v| v.values().to_vec()),
            Some(vec![5.0, 6.0, 7.0, 8.0])
        );
        assert!(fields.quality().conversion_failures.is_empty());
    }

    #[test]
    fn truncated_literal_reads_to_end() {
        let fields = extract("cost_to_mint_data_y = vec { 0 : float64; 2.5 : float64; 3.");
        assert_eq!(fields.quality().truncated_fields, vec![FieldName::CostToMintDataY]);
        assert_eq!(
            fields.vector(FieldName::CostToMintDataY).map(|v| v.values().to_vec()),
            Some(vec![0.0, 2.5, 3.0])
        );
    }

    #[test]
    fn field_name_must_match_whole_word() {
        let fields = extract("xcost_to_mint_data_y = vec { 1 }; cost_to_mint_data_x = vec { 2 }");
        assert!(!fields.has(FieldName::CostToMintDataY));
    }

    #[test]
    fn multiline_literal_with_trailing_separator() {
        let raw = "minted_per_epoch_data_x = vec {\n    \"Epoch 1\";\n    \"Epoch 2\";\n  };";
        assert_eq!(extract(raw).epoch_count(), 2);
    }

    #[test]
    fn coerce_number_edge_cases() {
        assert_eq!(coerce_number("1_000_000"), Some(1_000_000.0));
        assert_eq!(coerce_number("-2.5"), Some(-2.5));
        assert_eq!(coerce_number("$12.5%"), Some(12.5));
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("inf"), None);
    }

    proptest! {
        #[test]
        fn extraction_is_idempotent(
            values in proptest::collection::vec(0u64..1_000_000_000_000, 0..20),
            noise in "[a-z ;:]{0,12}",
        ) {
            let body: Vec<String> = values.iter().map(|v| format!("{v} : nat64")).collect();
            let raw = format!("{noise} minted_per_epoch_data_y = vec {{ {} }}", body.join("; "));
            let a = extract(&raw);
            let b = extract(&raw);
            prop_assert_eq!(&a, &b);
            let got = a.vector(FieldName::MintedPerEpochDataY).map(|v| v.values().to_vec());
            let want: Vec<f64> = values.iter().map(|v| *v as f64).collect();
            prop_assert_eq!(got, Some(want));
        }
    }
}
