use std::borrow::Cow;

/// Render `s` as a manifest string, quoting it unless it is a plain token.
pub fn quote(s: &str) -> Cow<'_, str> {
    if is_bare(s) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    Cow::Owned(out)
}

fn is_bare(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'/' | b':' | b'.'))
        && !s.contains("//")
        && !s.contains("/*")
}

/// Text safe to place inside a `/* ... */` comment.
pub fn comment_text(s: &str) -> Cow<'_, str> {
    if s.contains("*/") {
        Cow::Owned(s.replace("*/", "* /"))
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_tokens_stay_bare() {
        assert_eq!(quote("Foo.swift"), "Foo.swift");
        assert_eq!(quote("sourcecode.swift"), "sourcecode.swift");
        assert_eq!(quote("Views/Foo.swift"), "Views/Foo.swift");
    }

    #[test]
    fn special_characters_are_quoted() {
        assert_eq!(quote("<group>"), "\"<group>\"");
        assert_eq!(quote("Foo Bar.swift"), "\"Foo Bar.swift\"");
        assert_eq!(quote("Foo+Ext.swift"), "\"Foo+Ext.swift\"");
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote(""), "\"\"");
    }

    #[test]
    fn comment_text_cannot_close_comment() {
        assert_eq!(comment_text("a*/b"), "a* /b");
        assert_eq!(comment_text("Foo.swift"), "Foo.swift");
    }
}
