//! Fault severities.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Severity/category of a fault.
    ///
    /// Serialized as flag names joined by `|` (e.g. `"WARNING | NOTICE"`),
    /// which is also the format accepted in configuration files.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Severity: u32 {
        /// Runtime error; also the code of panics and caught errors.
        const ERROR = 1;
        const WARNING = 1 << 1;
        const NOTICE = 1 << 2;
        const DEPRECATED = 1 << 3;
        const USER_ERROR = 1 << 4;
        const USER_WARNING = 1 << 5;
        const USER_NOTICE = 1 << 6;
        const USER_DEPRECATED = 1 << 7;
        const RECOVERABLE_ERROR = 1 << 8;
        /// Terminal fault discovered at process end.
        const FATAL = 1 << 9;

        const ALL = (1 << 10) - 1;
    }
}

impl Severity {
    /// Severities that end the process after their notify pass, whatever the
    /// notifiers decided.
    pub const UNRECOVERABLE: Severity = Severity::RECOVERABLE_ERROR.union(Severity::USER_ERROR);

    /// Parse a mask expression such as `"USER_WARNING | NOTICE"`.
    pub fn parse(expr: &str) -> Result<Self, bitflags::parser::ParseError> {
        bitflags::parser::from_str(expr)
    }

    /// Name of the first flag set, for rendering.
    pub fn label(&self) -> &'static str {
        self.iter_names()
            .map(|(name, _)| name)
            .find(|name| *name != "ALL")
            .unwrap_or("UNKNOWN")
    }

    /// Mask rendered as a parseable expression, e.g. `"ERROR | WARNING"`.
    pub fn expression(&self) -> String {
        let mut out = String::new();
        let _ = bitflags::parser::to_writer(self, &mut out);
        out
    }

    /// True for the error-class severities (as opposed to warnings and notices).
    pub fn is_error(&self) -> bool {
        self.intersects(
            Severity::ERROR
                | Severity::USER_ERROR
                | Severity::RECOVERABLE_ERROR
                | Severity::FATAL,
        )
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::ALL
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expression() {
        let mask = Severity::parse("USER_WARNING | NOTICE").unwrap();
        assert!(mask.contains(Severity::USER_WARNING));
        assert!(mask.contains(Severity::NOTICE));
        assert!(!mask.contains(Severity::ERROR));
        assert!(Severity::parse("NOT_A_FLAG").is_err());
    }

    #[test]
    fn test_all_covers_every_flag() {
        for (_, flag) in Severity::all().iter_names() {
            assert!(Severity::ALL.contains(flag));
        }
    }

    #[test]
    fn test_unrecoverable_set() {
        assert!(Severity::USER_ERROR.intersects(Severity::UNRECOVERABLE));
        assert!(Severity::RECOVERABLE_ERROR.intersects(Severity::UNRECOVERABLE));
        assert!(!Severity::ERROR.intersects(Severity::UNRECOVERABLE));
        assert!(!Severity::WARNING.intersects(Severity::UNRECOVERABLE));
    }

    #[test]
    fn test_label() {
        assert_eq!(Severity::USER_WARNING.label(), "USER_WARNING");
        assert_eq!(Severity::ERROR.to_string(), "ERROR");
        assert_eq!(Severity::empty().label(), "UNKNOWN");
        assert_eq!((Severity::ERROR | Severity::NOTICE).expression(), "ERROR | NOTICE");
    }
}
