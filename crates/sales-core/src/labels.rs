//! Product label cleanup.
//!
//! Distributor product labels carry packaging and catalog noise, e.g.
//! `"COV 12oz Ethiopia (WB) - 0086000123"`. Charts and rankings show the bare
//! product name instead.

use std::sync::OnceLock;

use regex::Regex;

/// Packaging-size marker the distributor prefixes onto product labels.
pub const PACKAGING_MARKER: &str = "COV 12oz";

/// Separator between the product name and its SKU / catalog number.
pub const SKU_SEPARATOR: &str = " - ";

fn variant_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" \([A-Za-z]+\)").expect("regex is valid"))
}

/// Strip packaging and SKU noise from a raw product label.
///
/// Applied in order:
/// 1. remove every occurrence of [`PACKAGING_MARKER`];
/// 2. remove parenthesised alphabetic variant codes such as `" (WB)"`;
/// 3. keep only the text before the first [`SKU_SEPARATOR`].
///
/// Labels containing none of these patterns are returned unchanged.
pub fn normalize_product_label(raw: &str) -> String {
    let without_marker = raw.replace(PACKAGING_MARKER, "");
    let without_variant = variant_code_re().replace_all(&without_marker, "");
    match without_variant.split_once(SKU_SEPARATOR) {
        Some((name, _)) => name.to_string(),
        None => without_variant.into_owned(),
    }
}
