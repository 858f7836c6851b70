/// Message codes embedded in schema file names.
///
/// A file such as `CC015C_schema.json` describes message type `CC015C`. The
/// code is found by the first case-insensitive `cc` + three digits + `c` run
/// in the name and re-cased to the canonical upper-case form.
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)cc([0-9]{3})c").expect("static pattern is valid"))
}

/// A canonical message code, always `CC` + three digits + `C`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageCode(String);

impl MessageCode {
    /// Extract the code from a file name. Returns `None` when the name
    /// carries no code, which is a normal outcome.
    pub fn from_filename(name: &str) -> Option<MessageCode> {
        let digits = code_pattern().captures(name)?.get(1)?.as_str();
        Some(MessageCode(format!("CC{digits}C")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
