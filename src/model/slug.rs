use regex::Regex;
use std::sync::OnceLock;

/// URL-safe identifier for a human-readable name.
///
/// Lower-cases, collapses every run of characters outside `[a-z0-9]` into a
/// single `-`, and trims leading and trailing hyphens. Idempotent.
pub fn slugify(input: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let separators =
        SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("regex for slug separators"));
    let lowered = input.to_lowercase();
    separators
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn collapses_separators_and_trims() {
        assert_eq!(slugify("Smart Search"), "smart-search");
        assert_eq!(slugify("  --Sales & Service Cloud!! "), "sales-service-cloud");
        assert_eq!(slugify("Feature_2.0"), "feature-2-0");
        assert_eq!(slugify("Café Setup"), "caf-setup");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn is_idempotent() {
        for input in [
            "Smart Search",
            "a--b",
            "-Leading and trailing-",
            "ÜBER Setup 2",
            "already-a-slug",
            "",
        ] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input {input:?}");
        }
    }
}
