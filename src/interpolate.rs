//! Placeholder interpolation and string post-processing
//!
//! Bare and double-quoted values may reference earlier variables with
//! `${NAME}` or `${NAME:-default}`. Lookups consult the variables parsed so
//! far, then the caller's context map. Substitution is single pass.

use crate::value::EnvMap;

/// Replaces every `${NAME}` / `${NAME:-DEFAULT}` placeholder in `value`
pub fn interpolate(value: &str, env: &EnvMap, context: &EnvMap) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let body = &rest[start + 2..];
        let Some(close) = body.find('}') else {
            break;
        };

        out.push_str(&rest[..start]);
        let (name, default) = split_placeholder(&body[..close]);
        let resolved = env
            .get(name)
            .or_else(|| context.get(name))
            .and_then(|v| v.interpolation_text());
        match resolved {
            Some(text) => out.push_str(&text),
            None => out.push_str(default),
        }
        rest = &body[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Splits placeholder contents into name and default text. The name ends at
/// the first `:`; without a `:-` there the whole content is the name.
fn split_placeholder(inner: &str) -> (&str, &str) {
    if let Some(colon) = inner.find(':') {
        if let Some(default) = inner[colon + 1..].strip_prefix('-') {
            return (&inner[..colon], default);
        }
    }
    (inner, "")
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Joins continued lines: drops every backslash, line break and the
/// indentation that follows it. A continuation needs at least one
/// whitespace character after the line break.
pub fn unfold(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(slash) = rest.find('\\') {
        let after = &rest[slash + 1..];
        let newline = after
            .strip_prefix("\r\n")
            .or_else(|| after.strip_prefix('\n'));

        out.push_str(&rest[..slash]);
        match newline {
            Some(tail) if tail.starts_with(is_space) => {
                rest = tail.trim_start_matches(is_space);
            }
            _ => {
                out.push('\\');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Escape sequences recognised in double-quoted values, applied in order
const DOUBLE_QUOTED_ESCAPES: [(&str, &str); 4] =
    [("\\\"", "\""), ("\\r", "\r"), ("\\n", "\n"), ("\\t", "\t")];

/// Substitutes `\"`, `\r`, `\n` and `\t`; other backslashes stay literal
pub fn unescape_double_quoted(value: &str) -> String {
    DOUBLE_QUOTED_ESCAPES
        .iter()
        .fold(value.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Single-quoted values only unescape `\'`
pub fn unescape_single_quoted(value: &str) -> String {
    value.replace("\\'", "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::EnvValue;

    fn env_of(pairs: &[(&str, EnvValue)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_interpolate_lookup_order() {
        let env = env_of(&[("X", EnvValue::from("from-env"))]);
        let context = env_of(&[
            ("X", EnvValue::from("from-context")),
            ("Y", EnvValue::from("context-only")),
        ]);

        assert_eq!(interpolate("${X}", &env, &context), "from-env");
        assert_eq!(interpolate("${Y}", &env, &context), "context-only");
        assert_eq!(interpolate("[${Z}]", &env, &context), "[]");
        assert_eq!(interpolate("${Z:-fallback}", &env, &context), "fallback");
        assert_eq!(interpolate("${X:-fallback}", &env, &context), "from-env");
    }

    #[test]
    fn test_interpolate_numbers_but_not_booleans_or_null() {
        let env = env_of(&[
            ("PORT", EnvValue::Integer(8080)),
            ("RATIO", EnvValue::Float(0.5)),
            ("DEBUG", EnvValue::Boolean(true)),
            ("NOTHING", EnvValue::Null),
        ]);
        let context = EnvMap::new();

        assert_eq!(interpolate("${PORT}/${RATIO}", &env, &context), "8080/0.5");
        assert_eq!(interpolate("${DEBUG:-off}", &env, &context), "off");
        assert_eq!(interpolate("${NOTHING}", &env, &context), "");
    }

    #[test]
    fn test_interpolate_is_single_pass() {
        let env = env_of(&[("A", EnvValue::from("${B}")), ("B", EnvValue::from("b"))]);
        assert_eq!(interpolate("${A}", &env, &EnvMap::new()), "${B}");
    }

    #[test]
    fn test_interpolate_leaves_unclosed_placeholders() {
        let env = env_of(&[("A", EnvValue::from("a"))]);
        assert_eq!(interpolate("${A}-${A", &env, &EnvMap::new()), "a-${A");
        assert_eq!(interpolate("$A {A}", &env, &EnvMap::new()), "$A {A}");
    }

    #[test]
    fn test_split_placeholder() {
        assert_eq!(split_placeholder("NAME"), ("NAME", ""));
        assert_eq!(split_placeholder("NAME:-x:-y"), ("NAME", "x:-y"));
        assert_eq!(split_placeholder("NAME:-"), ("NAME", ""));
        assert_eq!(split_placeholder("a:b:-c"), ("a:b:-c", ""));
    }

    #[test]
    fn test_unfold() {
        assert_eq!(unfold("a \\\n   b"), "a b");
        assert_eq!(unfold("a \\\r\n\tb"), "a b");
        assert_eq!(unfold("a \\\nb"), "a \\\nb");
        assert_eq!(unfold("C:\\path"), "C:\\path");
        assert_eq!(unfold("end\\"), "end\\");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(
            unescape_double_quoted(r#"this is \na \"string\""#),
            "this is \na \"string\""
        );
        assert_eq!(unescape_double_quoted(r"tab\there\r"), "tab\there\r");
        assert_eq!(unescape_double_quoted(r"keep \d"), r"keep \d");
        assert_eq!(unescape_single_quoted(r"it\'s \n"), r"it's \n");
    }
}
