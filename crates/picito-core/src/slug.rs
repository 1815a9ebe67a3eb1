//! URL-safe slug derivation for organization names.

/// Derives a slug from `name`: lowercase ASCII letters and digits,
/// whitespace turned into hyphens, everything else dropped, runs of
/// hyphens collapsed and leading/trailing hyphens trimmed.
///
/// Returns an empty string when `name` has no ASCII letter or digit.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        let mapped = if ch.is_ascii_alphanumeric() {
            ch.to_ascii_lowercase()
        } else if ch.is_whitespace() || ch == '-' {
            '-'
        } else {
            continue;
        };
        if mapped == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(mapped);
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// The `attempt`-th candidate for `base`: `base` itself, then
/// `base-1`, `base-2`, ...
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_names() {
        assert_eq!(slugify("Acme Corp"), "acme-corp");
        assert_eq!(slugify("Test Org"), "test-org");
    }

    #[test]
    fn strips_and_collapses() {
        assert_eq!(slugify("  Hello,   World!! "), "hello-world");
        assert_eq!(slugify("--a--b--"), "a-b");
        assert_eq!(slugify("R&D / Ops"), "rd-ops");
        assert_eq!(slugify("Café 2024"), "caf-2024");
    }

    #[test]
    fn nothing_usable() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn candidates() {
        assert_eq!(candidate("acme-corp", 0), "acme-corp");
        assert_eq!(candidate("acme-corp", 1), "acme-corp-1");
        assert_eq!(candidate("acme-corp", 12), "acme-corp-12");
    }
}
