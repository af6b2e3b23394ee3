//! Text-level placeholder substitution.
//!
//! Placeholders use `[[` / `]]` delimiters, chosen so they cannot
//! collide with JSON or YAML syntax. The pass runs before structural
//! parsing and knows a fixed set of names derived from the event
//! record. Unknown names are left as literal text; an unterminated
//! delimiter is a syntax error.

use relayci_core::event::EventRecord;

use crate::renderer::RenderError;

const OPEN: &str = "[[";
const CLOSE: &str = "]]";

/// Substitute all known placeholders in `text` with event data.
pub fn substitute(text: &str, event: &EventRecord) -> Result<String, RenderError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(OPEN) {
        out.push_str(&rest[..open]);
        let after = &rest[open + OPEN.len()..];
        let close = after.find(CLOSE).ok_or_else(|| {
            RenderError::TemplateSyntax(format!("unterminated {OPEN:?} delimiter"))
        })?;
        let inner = &after[..close];
        if inner.contains(OPEN) {
            return Err(RenderError::TemplateSyntax(format!(
                "nested {OPEN:?} delimiter inside placeholder"
            )));
        }
        match lookup(inner.trim(), event) {
            // Known name: splice in the value.
            Some(value) => out.push_str(value),
            // Unknown name: keep the placeholder as literal text.
            None => out.push_str(&rest[open..open + OPEN.len() + close + CLOSE.len()]),
        }
        rest = &after[close + CLOSE.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

/// The fixed set of placeholder names.
fn lookup<'a>(name: &str, event: &'a EventRecord) -> Option<&'a str> {
    match name {
        "SHA" => Some(&event.head_commit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef";

    fn event() -> EventRecord {
        EventRecord::new(SHA, "git@example.com:org/repo.git", "main").unwrap()
    }

    #[test]
    fn plain_text_unchanged() {
        let text = "{\"JobName\": \"smoke\"}";
        assert_eq!(substitute(text, &event()).unwrap(), text);
    }

    #[test]
    fn sha_placeholder_substituted() {
        let out = substitute("commit: [[SHA]]", &event()).unwrap();
        assert_eq!(out, format!("commit: {SHA}"));
    }

    #[test]
    fn whitespace_inside_delimiters_tolerated() {
        let out = substitute("[[ SHA ]]", &event()).unwrap();
        assert_eq!(out, SHA);
    }

    #[test]
    fn multiple_occurrences_all_substituted() {
        let out = substitute("[[SHA]]-[[SHA]]", &event()).unwrap();
        assert_eq!(out, format!("{SHA}-{SHA}"));
    }

    #[test]
    fn unknown_name_left_literal() {
        let out = substitute("[[BRANCH]] and [[SHA]]", &event()).unwrap();
        assert_eq!(out, format!("[[BRANCH]] and {SHA}"));
    }

    #[test]
    fn unterminated_delimiter_is_syntax_error() {
        let err = substitute("oops [[SHA", &event()).unwrap_err();
        assert!(matches!(err, RenderError::TemplateSyntax(_)));
    }

    #[test]
    fn nested_open_is_syntax_error() {
        let err = substitute("[[ [[SHA]] ]]", &event()).unwrap_err();
        assert!(matches!(err, RenderError::TemplateSyntax(_)));
    }

    #[test]
    fn stray_close_left_alone() {
        let out = substitute("just ]] text", &event()).unwrap();
        assert_eq!(out, "just ]] text");
    }
}
