// ==============================================================================
// gnomad.rs - gnomAD INFO Flattening
// ==============================================================================
// Description: Projects a gnomAD INFO string onto a fixed set of columns
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use std::collections::HashMap;

use crate::models::MISSING_VALUE;

/// Output column order after `gnomad_id` and `rest`
pub const GNOMAD_KEY_ORDER: [&str; 41] = [
    "AF",
    "AF_XX",
    "AF_XY",
    "AF_afr_XX",
    "AF_afr_XY",
    "AF_afr",
    "AF_ami_XX",
    "AF_ami_XY",
    "AF_ami",
    "AF_amr_XX",
    "AF_amr_XY",
    "AF_amr",
    "AF_asj_XX",
    "AF_asj_XY",
    "AF_asj",
    "AF_eas_XX",
    "AF_eas_XY",
    "AF_eas",
    "AF_fin_XX",
    "AF_fin_XY",
    "AF_fin",
    "AF_mid_XX",
    "AF_mid_XY",
    "AF_mid",
    "AF_nfe_XX",
    "AF_nfe_XY",
    "AF_nfe",
    "AF_raw",
    "AF_remaining_XX",
    "AF_remaining_XY",
    "AF_remaining",
    "AF_sas_XX",
    "AF_sas_XY",
    "AF_sas",
    "AF_grpmax",
    "FS",
    "MQ",
    "QD",
    "inbreeding_coeff",
    "spliceai_ds_max",
    "phylop",
];

const AF_PREFIX: &str = "AF";
const GRPMAX_KEY: &str = "AF_grpmax";
const SITE_KEYS: [&str; 6] = ["inbreeding_coeff", "spliceai_ds_max", "FS", "MQ", "QD", "phylop"];

fn is_retained(key: &str) -> bool {
    key.starts_with(AF_PREFIX) || SITE_KEYS.contains(&key)
}

/// Retained `key=value` pairs of a `;`-delimited INFO string
///
/// Flags (entries without `=`) are ignored. `AF_grpmax` is filled in from
/// the largest numeric `AF*` value when the string does not carry it.
pub fn parse_info(info: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();

    for pair in info.split(';') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if is_retained(key) {
            fields.insert(key.to_string(), value.trim().to_string());
        }
    }

    if !fields.contains_key(GRPMAX_KEY) {
        // Keep the winning value's original text (e.g. "1.5e-05")
        let grpmax = fields
            .iter()
            .filter(|(key, _)| key.starts_with(AF_PREFIX))
            .filter_map(|(_, value)| Some((value.parse::<f64>().ok()?, value)))
            .filter(|(af, _)| !af.is_nan())
            .max_by(|a, b| a.0.total_cmp(&b.0));

        let value = match grpmax {
            Some((_, text)) => text.clone(),
            None => MISSING_VALUE.to_string(),
        };
        fields.insert(GRPMAX_KEY.to_string(), value);
    }

    fields
}

/// `gnomad_id \t rest \t` followed by the 41 INFO values in fixed order
pub fn format_row(gnomad_id: &str, rest: &str, info: &str) -> String {
    let fields = if info.trim().is_empty() {
        HashMap::new()
    } else {
        parse_info(info)
    };

    let mut columns = Vec::with_capacity(GNOMAD_KEY_ORDER.len() + 2);
    columns.push(gnomad_id);
    columns.push(rest);
    columns.extend(GNOMAD_KEY_ORDER.iter().map(|key| {
        fields
            .get(*key)
            .map(String::as_str)
            .unwrap_or(MISSING_VALUE)
    }));

    columns.join("\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(row: &str) -> Vec<&str> {
        row.split('\t').skip(2).collect()
    }

    fn position(key: &str) -> usize {
        GNOMAD_KEY_ORDER.iter().position(|k| *k == key).unwrap()
    }

    #[test]
    fn test_parse_retains_selected_keys() {
        let fields = parse_info("AC=3;AF=0.001;AF_nfe=0.002;MQ=60;QD=12.5;FS=1.2;phylop=3.1;vep=foo;NEGATIVE_TRAIN_SITE");
        assert_eq!(fields["AF"], "0.001");
        assert_eq!(fields["MQ"], "60");
        assert_eq!(fields["phylop"], "3.1");
        assert!(!fields.contains_key("AC"));
        assert!(!fields.contains_key("vep"));
    }

    #[test]
    fn test_grpmax_fallback_is_numeric_max() {
        // String comparison would pick "9e-05"
        let fields = parse_info("AF=9e-05;AF_afr=0.0123;AF_nfe=0.002");
        assert_eq!(fields["AF_grpmax"], "0.0123");
    }

    #[test]
    fn test_grpmax_fallback_keeps_value_text() {
        let fields = parse_info("AF=1.5e-05;AF_afr=2e-06");
        assert_eq!(fields["AF_grpmax"], "1.5e-05");
    }

    #[test]
    fn test_grpmax_present_is_kept() {
        let fields = parse_info("AF=0.5;AF_grpmax=0.25");
        assert_eq!(fields["AF_grpmax"], "0.25");
    }

    #[test]
    fn test_grpmax_without_numeric_af() {
        let fields = parse_info("MQ=60");
        assert_eq!(fields["AF_grpmax"], ".");
    }

    #[test]
    fn test_format_row_order() {
        let row = format_row("1-100-A-G", "POLG", "AF=0.1;AF_XX=0.2;MQ=60;spliceai_ds_max=0.01");
        let cols = values(&row);

        assert!(row.starts_with("1-100-A-G\tPOLG\t"));
        assert_eq!(cols.len(), 41);
        assert_eq!(cols[0], "0.1");
        assert_eq!(cols[1], "0.2");
        assert_eq!(cols[2], ".");
        assert_eq!(cols[position("AF_grpmax")], "0.2");
        assert_eq!(cols[position("MQ")], "60");
        assert_eq!(cols[position("spliceai_ds_max")], "0.01");
        assert_eq!(cols[position("phylop")], ".");
    }

    #[test]
    fn test_empty_info_is_all_missing() {
        let row = format_row("1-100-A-G", "POLG", "");
        let cols = values(&row);
        assert_eq!(cols.len(), 41);
        assert!(cols.iter().all(|v| *v == "."));
    }
}
