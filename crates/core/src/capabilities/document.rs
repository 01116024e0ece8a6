//! Office document conversions through LibreOffice.

use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};

use super::{normalize_token, Domain, UnsupportedFormat};

static ALLOWED_OUTPUTS: Lazy<BTreeMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    const TEXT: &[&str] = &["pdf", "odt", "rtf", "txt", "html"];
    const ODT: &[&str] = &["pdf", "docx", "rtf", "txt", "html"];
    const SHEET: &[&str] = &["pdf", "xlsx", "csv"];
    const SLIDES: &[&str] = &["pdf"];

    BTreeMap::from([
        ("doc", TEXT),
        ("docx", TEXT),
        ("odt", ODT),
        ("xls", SHEET),
        ("xlsx", SHEET),
        ("ppt", SLIDES),
        ("pptx", SLIDES),
    ])
});

/// Outputs allowed for an input extension. Empty for unknown inputs.
pub fn allowed_outputs(input_extension: &str) -> &'static [&'static str] {
    ALLOWED_OUTPUTS
        .get(normalize_token(input_extension).as_str())
        .copied()
        .unwrap_or(&[])
}

/// Input extensions LibreOffice is driven for.
pub fn input_formats() -> Vec<&'static str> {
    ALLOWED_OUTPUTS.keys().copied().collect()
}

/// Every output any input may produce.
pub fn output_formats() -> Vec<&'static str> {
    ALLOWED_OUTPUTS
        .values()
        .flat_map(|outputs| outputs.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Checks an input/target pair, returning the normalized target.
pub fn check(input_extension: &str, target: &str) -> Result<String, UnsupportedFormat> {
    let extension = normalize_token(input_extension);
    let target = normalize_token(target);

    let Some(allowed) = ALLOWED_OUTPUTS.get(extension.as_str()) else {
        return Err(UnsupportedFormat::unsupported_input(Domain::Document, extension));
    };

    if !allowed.contains(&target.as_str()) {
        return Err(UnsupportedFormat::not_allowed(
            Domain::Document,
            target,
            &extension,
        ));
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_outputs() {
        assert_eq!(allowed_outputs("DOCX"), &["pdf", "odt", "rtf", "txt", "html"]);
        assert_eq!(allowed_outputs("pptx"), &["pdf"]);
        assert!(allowed_outputs("md").is_empty());
    }

    #[test]
    fn test_check_accepts_allowed_pair() {
        assert_eq!(check("docx", "PDF").unwrap(), "pdf");
        assert_eq!(check("xls", "csv").unwrap(), "csv");
    }

    #[test]
    fn test_check_rejects_disallowed_target() {
        let err = check("pptx", "docx").unwrap_err();
        assert_eq!(err.to_string(), "Target format docx is not allowed for pptx");
    }

    #[test]
    fn test_check_rejects_unknown_input() {
        let err = check("pages", "pdf").unwrap_err();
        assert_eq!(err.to_string(), "Input format pages is not supported");
    }

    #[test]
    fn test_output_formats_deduplicated() {
        let outputs = output_formats();
        assert_eq!(outputs.iter().filter(|f| **f == "pdf").count(), 1);
        assert!(outputs.contains(&"csv"));
    }
}
