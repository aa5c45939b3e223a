use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn ammonia_strip(input: &str) -> String {
    ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(input)
        .to_string()
}

/// Strips every HTML tag (and the content of script/style elements) and
/// returns plain, unescaped text. Entities that decode into new markup are
/// stripped again.
pub fn strip_all_html(input: &str) -> String {
    let mut text = input.to_string();
    for _ in 0..3 {
        let stripped = html_escape::decode_html_entities(&ammonia_strip(&text)).to_string();
        if stripped == text {
            break;
        }
        text = stripped;
    }
    text.trim().to_string()
}

/// `strip_all_html` for optional fields; blank results become `None`.
pub fn strip_optional(input: Option<&str>) -> Option<String> {
    input.map(strip_all_html).filter(|s| !s.is_empty())
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

fn non_slug_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static slug pattern is valid"))
}

/// URL-safe identifier for a listing name: lower-case ASCII words joined by
/// hyphens ("Pão & Cia Ltda." -> "pao-cia-ltda").
pub fn slugify(name: &str) -> String {
    let folded: String = name.to_lowercase().chars().map(fold_accent).collect();
    non_slug_chars()
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_removed_and_text_is_kept() {
        assert_eq!(strip_all_html("<b>Padaria</b> Central"), "Padaria Central");
        assert_eq!(strip_all_html("Oi<script>alert(1)</script>"), "Oi");
    }

    #[test]
    fn ampersands_survive_as_plain_text() {
        assert_eq!(strip_all_html("Pão & Cia"), "Pão & Cia");
        assert_eq!(strip_all_html("a < b"), "a < b");
    }

    #[test]
    fn encoded_markup_does_not_come_back() {
        assert_eq!(strip_all_html("&lt;script&gt;alert(1)&lt;/script&gt;ok"), "ok");
    }

    #[test]
    fn blank_optional_text_is_dropped() {
        assert_eq!(strip_optional(Some("  <i></i> ")), None);
        assert_eq!(strip_optional(None), None);
        assert_eq!(strip_optional(Some(" Centro ")), Some("Centro".to_string()));
    }

    #[test]
    fn slugs_are_ascii_and_hyphenated() {
        assert_eq!(slugify("Pão & Cia Ltda."), "pao-cia-ltda");
        assert_eq!(slugify("  Açaí do João  "), "acai-do-joao");
        assert_eq!(slugify("!!!"), "");
    }
}
