//! Shell quoting helpers for rendered command lines.

use std::borrow::Cow;

use shell_escape::unix::escape;

/// Wraps `value` in single quotes, escaping embedded single quotes.
///
/// Argument values are always quoted, even when they contain nothing the
/// shell would interpret, so rendered commands stay stable.
pub(crate) fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Quotes a positional operand only when the shell would otherwise alter it.
///
/// Host-qualified paths such as `user@host:/path` stay bare.
pub(crate) fn quote_operand(value: &str) -> Cow<'_, str> {
    if !value.is_empty() && value.chars().all(is_shell_safe) {
        return Cow::Borrowed(value);
    }
    escape(Cow::Borrowed(value))
}

const fn is_shell_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(ch, '-' | '_' | '=' | '/' | ',' | '.' | '+' | '@' | ':' | '%')
}
