//! Redaction helpers so log lines never carry raw emails or tokens.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

fn email_pattern() -> &'static Regex {
    static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
    });
    &EMAIL
}

fn token_pattern() -> &'static Regex {
    // Long base64url runs, which is what a JWT segment looks like.
    static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\b[A-Za-z0-9_\-+/]{24,}={0,2}\b").unwrap()
    });
    &TOKEN
}

/// Masks emails down to their first local-part character and replaces
/// token-shaped runs entirely. Emails first so their domains are not
/// mistaken for tokens.
pub fn redact(input: &str) -> String {
    let emails_masked = email_pattern().replace_all(input, |caps: &regex::Captures| {
        let matched = &caps[0];
        match matched.find('@') {
            Some(at) if at > 0 => format!("{}***{}", &matched[..1], &matched[at..]),
            _ => matched.to_string(),
        }
    });

    token_pattern()
        .replace_all(&emails_masked, "[REDACTED]")
        .to_string()
}

/// Wrapper that applies [`redact`] whenever the value is formatted,
/// so call sites can log sensitive fields without thinking about it.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_email_local_part() {
        assert_eq!(redact("reader@example.com"), "r***@example.com");
        assert_eq!(redact("a@b.io"), "a***@b.io");
    }

    #[test]
    fn masks_token_shaped_runs() {
        let line = "refresh=eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 issued";
        assert_eq!(redact(line), "refresh=[REDACTED] issued");
    }

    #[test]
    fn leaves_ordinary_text_alone() {
        assert_eq!(redact("post 42 updated"), "post 42 updated");
    }

    #[test]
    fn display_wrapper_redacts() {
        assert_eq!(format!("{}", Redacted("user@example.com")), "u***@example.com");
    }
}
