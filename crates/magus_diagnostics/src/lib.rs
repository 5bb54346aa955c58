//! magus_diagnostics: Structured error values and diagnostic collection.
//!
//! The checker never formats human-readable prose itself; it records
//! structured [`ErrorKind`] values with optional source-span metadata and
//! leaves rendering to the surrounding tool. The `Display` impls here are a
//! debugging convenience, not the user-facing surface.

use magus_core::text::TextSpan;
use std::fmt;
use thiserror::Error;

/// Diagnostic severity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Suggestion => write!(f, "suggestion"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A structured checker error.
///
/// Every failure the type-level core can produce is one of these variants.
/// Variants carry printable type shapes (already rendered by the type
/// printer) plus whatever structured data the external renderer needs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// A value of one type was used where an incompatible type was expected.
    #[error("type '{found}' is incompatible with type '{expected}'")]
    IncompatibleType { found: String, expected: String },

    /// A generic operator or call received the wrong number of arguments.
    #[error("expected {expected} argument(s), but got {actual}")]
    ArityError { expected: usize, actual: usize },

    /// A magic type operator was applied to an argument it cannot accept.
    #[error("invalid argument for '{operator}': {reason}")]
    InvalidOperatorArgument {
        operator: &'static str,
        reason: String,
    },

    /// A named property does not exist on the given object type.
    #[error("property '{key}' does not exist on type '{object_type}'")]
    UnknownProperty { object_type: String, key: String },

    /// `$TypeOf` referenced an identifier with no binding in scope.
    #[error("variable '{name}' is not defined")]
    UndefinedVariable { name: String },

    /// A `$Throws` clause was declared but the body never throws.
    #[error("function is declared to throw '{declared}' but throws nothing")]
    MissingThrow { declared: String },

    /// A thrown type is not assignable to the declared `$Throws` type.
    #[error("thrown type '{actual}' is incompatible with declared throw type '{declared}'")]
    IncompatibleThrow { declared: String, actual: String },

    /// An identifier used in an expression has no binding in scope.
    #[error("cannot find name '{name}'")]
    CannotFindName { name: String },

    /// A `$`-prefixed type reference does not name a known operator.
    #[error("unknown type operator '{name}'")]
    UnknownOperator { name: String },
}

impl ErrorKind {
    /// The diagnostic code for this error kind.
    pub fn code(&self) -> u32 {
        match self {
            ErrorKind::IncompatibleType { .. } => 3001,
            ErrorKind::ArityError { .. } => 3002,
            ErrorKind::InvalidOperatorArgument { .. } => 3003,
            ErrorKind::UnknownProperty { .. } => 3004,
            ErrorKind::UndefinedVariable { .. } => 3005,
            ErrorKind::MissingThrow { .. } => 3006,
            ErrorKind::IncompatibleThrow { .. } => 3007,
            ErrorKind::CannotFindName { .. } => 3008,
            ErrorKind::UnknownOperator { .. } => 3009,
        }
    }

    /// The severity of this error kind. All current kinds are errors.
    pub fn category(&self) -> DiagnosticCategory {
        DiagnosticCategory::Error
    }
}

/// A realized diagnostic with location information.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The file path where this diagnostic occurred, if any.
    pub file: Option<String>,
    /// The source text span where this diagnostic occurred, if any.
    pub span: Option<TextSpan>,
    /// The structured error value.
    pub kind: ErrorKind,
    /// The diagnostic code (derived from the kind).
    pub code: u32,
    /// The severity category.
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a new diagnostic without location info.
    pub fn new(kind: ErrorKind) -> Self {
        let code = kind.code();
        let category = kind.category();
        Self {
            file: None,
            span: None,
            kind,
            code,
            category,
        }
    }

    /// Create a new diagnostic with a source span.
    pub fn with_span(kind: ErrorKind, span: TextSpan) -> Self {
        let mut diag = Self::new(kind);
        diag.span = Some(span);
        diag
    }

    /// Attach a file path to this diagnostic.
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(span) = self.span {
                write!(f, "({})", span.start)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} MG{}: {}", self.category, self.code, self.kind)
    }
}

/// A collection of diagnostics accumulated during a checking pass.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.category == DiagnosticCategory::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Sort diagnostics by file and position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            let file_cmp = a.file.cmp(&b.file);
            if file_cmp != std::cmp::Ordering::Equal {
                return file_cmp;
            }
            let a_pos = a.span.map(|s| s.start).unwrap_or(0);
            let b_pos = b.span.map(|s| s.start).unwrap_or(0);
            a_pos.cmp(&b_pos)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(ErrorKind::IncompatibleType {
            found: "number".to_string(),
            expected: "string".to_string(),
        });
        assert_eq!(diag.code, 3001);
        assert!(diag.is_error());
        assert_eq!(
            diag.to_string(),
            "error MG3001: type 'number' is incompatible with type 'string'"
        );
    }

    #[test]
    fn test_collection_has_errors() {
        let mut diags = DiagnosticCollection::new();
        assert!(!diags.has_errors());
        diags.add(Diagnostic::new(ErrorKind::UndefinedVariable {
            name: "x".to_string(),
        }));
        assert!(diags.has_errors());
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_sort_by_position() {
        let mut diags = DiagnosticCollection::new();
        diags.add(Diagnostic::with_span(
            ErrorKind::CannotFindName { name: "b".into() },
            TextSpan::new(20, 1),
        ));
        diags.add(Diagnostic::with_span(
            ErrorKind::CannotFindName { name: "a".into() },
            TextSpan::new(4, 1),
        ));
        diags.sort();
        assert_eq!(diags.diagnostics()[0].span.unwrap().start, 4);
    }
}
