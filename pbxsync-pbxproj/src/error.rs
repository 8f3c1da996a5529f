//! Error types for pbxsync-pbxproj.

use thiserror::Error;

/// A manifest could not be read as an old-style property list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str, line: usize },

    #[error("line {line}: unexpected {found:?}, expected {expected}")]
    Unexpected {
        found: char,
        expected: &'static str,
        offset: usize,
        line: usize,
    },

    #[error("line {line}: unterminated {what}")]
    Unterminated {
        what: &'static str,
        offset: usize,
        line: usize,
    },

    /// The document parsed but lacks structure every project has.
    #[error("invalid project structure: {message}")]
    Structure { message: String },
}

impl ParseError {
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedEof { line, .. }
            | ParseError::Unexpected { line, .. }
            | ParseError::Unterminated { line, .. } => Some(*line),
            ParseError::Structure { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ParseError;

    #[test]
    fn display_includes_line_and_expectation() {
        let err = ParseError::Unexpected {
            found: '}',
            expected: "';'",
            offset: 10,
            line: 3,
        };
        assert_eq!(err.to_string(), "line 3: unexpected '}', expected ';'");
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn structure_errors_have_no_line() {
        let err = ParseError::Structure {
            message: "missing objects".to_string(),
        };
        assert!(err.line().is_none());
        assert!(err.to_string().contains("missing objects"));
    }
}
