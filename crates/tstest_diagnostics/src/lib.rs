//! tstest_diagnostics: The diagnostic data model.
//!
//! Defines the diagnostic values exchanged between a type-checker engine
//! and the verifier: categories, message chains, realized diagnostics with
//! location information, and a small table of well-known TypeScript
//! diagnostic message templates.

use std::fmt;
use tstest_core::text::TextSpan;

/// Diagnostic category, matching TypeScript's DiagnosticCategory.
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

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic error code (e.g., 1002, 2304).
    pub code: u32,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// The message text of a diagnostic: either a plain string or a chain of
/// nested messages, matching TypeScript's `DiagnosticMessageChain`.
///
/// Elaborated messages (e.g. assignability failures) nest the cause under
/// the headline message; `flatten` joins the whole tree back into one
/// string for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageText {
    Plain(String),
    Chain {
        text: String,
        next: Vec<MessageText>,
    },
}

impl MessageText {
    /// Flatten this message tree into a single string. Nested messages are
    /// joined by `separator` and indented two spaces per nesting level.
    pub fn flatten(&self, separator: &str) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out, separator, 0);
        out
    }

    fn flatten_into(&self, out: &mut String, separator: &str, depth: usize) {
        if depth > 0 {
            out.push_str(separator);
            for _ in 0..depth {
                out.push_str("  ");
            }
        }
        match self {
            MessageText::Plain(text) => out.push_str(text),
            MessageText::Chain { text, next } => {
                out.push_str(text);
                for message in next {
                    message.flatten_into(out, separator, depth + 1);
                }
            }
        }
    }

    /// The headline text, ignoring any nested messages.
    pub fn text(&self) -> &str {
        match self {
            MessageText::Plain(text) => text,
            MessageText::Chain { text, .. } => text,
        }
    }
}

impl From<String> for MessageText {
    fn from(text: String) -> Self {
        MessageText::Plain(text)
    }
}

impl From<&str> for MessageText {
    fn from(text: &str) -> Self {
        MessageText::Plain(text.to_string())
    }
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The file path where this diagnostic occurred, if any.
    pub file: Option<String>,
    /// The source text span where this diagnostic occurred, if any.
    pub span: Option<TextSpan>,
    /// The message text, possibly a chain of nested messages.
    pub message: MessageText,
    /// The diagnostic error code.
    pub code: u32,
    /// The category.
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a new diagnostic without location info (global diagnostic).
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            message: MessageText::Plain(format_message(message.message, args)),
            code: message.code,
            category: message.category,
        }
    }

    /// Create a new diagnostic with file and span info.
    pub fn with_location(
        file: String,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file),
            span: Some(span),
            message: MessageText::Plain(format_message(message.message, args)),
            code: message.code,
            category: message.category,
        }
    }

    /// The start byte offset of this diagnostic, if it has a location.
    pub fn start(&self) -> Option<tstest_core::text::TextPos> {
        self.span.map(|s| s.start)
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
        write!(
            f,
            "{} TS{}: {}",
            self.category,
            self.code,
            self.message.flatten("\n")
        )
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during scanning or checking.
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
}

// ============================================================================
// Diagnostic Messages - a subset of TypeScript's diagnosticMessages.json
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
        ($code:expr, Suggestion, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Suggestion, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1002, Error, "Unterminated string literal.");
    pub const _0_EXPECTED: DiagnosticMessage = diag!(1005, Error, "'{0}' expected.");
    pub const ASTERISK_SLASH_EXPECTED: DiagnosticMessage = diag!(1010, Error, "'*/' expected.");
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(1012, Error, "Unexpected token.");
    pub const UNTERMINATED_TEMPLATE_LITERAL: DiagnosticMessage = diag!(1160, Error, "Unterminated template literal.");

    // ========================================================================
    // Semantic errors (2000-2999)
    // ========================================================================
    pub const DUPLICATE_IDENTIFIER_0: DiagnosticMessage = diag!(2300, Error, "Duplicate identifier '{0}'.");
    pub const CANNOT_FIND_NAME_0: DiagnosticMessage = diag!(2304, Error, "Cannot find name '{0}'.");
    pub const CANNOT_FIND_MODULE_0: DiagnosticMessage = diag!(2307, Error, "Cannot find module '{0}' or its corresponding type declarations.");
    pub const TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1: DiagnosticMessage = diag!(2322, Error, "Type '{0}' is not assignable to type '{1}'.");
    pub const PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1: DiagnosticMessage = diag!(2339, Error, "Property '{0}' does not exist on type '{1}'.");
    pub const ARGUMENT_OF_TYPE_0_IS_NOT_ASSIGNABLE_TO_PARAMETER_OF_TYPE_1: DiagnosticMessage = diag!(2345, Error, "Argument of type '{0}' is not assignable to parameter of type '{1}'.");
    pub const OBJECT_IS_POSSIBLY_NULL: DiagnosticMessage = diag!(2531, Error, "Object is possibly 'null'.");
    pub const EXPECTED_0_ARGUMENTS_BUT_GOT_1: DiagnosticMessage = diag!(2554, Error, "Expected {0} arguments, but got {1}.");

    // ========================================================================
    // Declaration emit errors (4000-4099)
    // ========================================================================
    pub const RETURN_TYPE_OF_EXPORTED_FUNCTION_HAS_OR_IS_USING_PRIVATE_NAME_0: DiagnosticMessage = diag!(4058, Error, "Return type of exported function has or is using private name '{0}'.");

    // ========================================================================
    // Options errors (5000-6999)
    // ========================================================================
    pub const UNKNOWN_COMPILER_OPTION_0: DiagnosticMessage = diag!(5023, Error, "Unknown compiler option '{0}'.");
    pub const ARGUMENT_FOR_0_OPTION_MUST_BE_1: DiagnosticMessage = diag!(6046, Error, "Argument for '{0}' option must be: {1}.");
    pub const _0_IS_DECLARED_BUT_ITS_VALUE_IS_NEVER_READ: DiagnosticMessage = diag!(6133, Warning, "'{0}' is declared but its value is never read.");

    // ========================================================================
    // Implicit-any errors (7000-7099)
    // ========================================================================
    pub const PARAMETER_0_IMPLICITLY_HAS_AN_1_TYPE: DiagnosticMessage = diag!(7006, Error, "Parameter '{0}' implicitly has an '{1}' type.");

    /// Look up a message template by code. Used by engines that script
    /// diagnostics from a bare code.
    pub fn for_code(code: u32) -> Option<&'static DiagnosticMessage> {
        const ALL: &[&DiagnosticMessage] = &[
            &UNTERMINATED_STRING_LITERAL,
            &_0_EXPECTED,
            &ASTERISK_SLASH_EXPECTED,
            &UNEXPECTED_TOKEN,
            &UNTERMINATED_TEMPLATE_LITERAL,
            &DUPLICATE_IDENTIFIER_0,
            &CANNOT_FIND_NAME_0,
            &CANNOT_FIND_MODULE_0,
            &TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1,
            &PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1,
            &ARGUMENT_OF_TYPE_0_IS_NOT_ASSIGNABLE_TO_PARAMETER_OF_TYPE_1,
            &OBJECT_IS_POSSIBLY_NULL,
            &EXPECTED_0_ARGUMENTS_BUT_GOT_1,
            &RETURN_TYPE_OF_EXPORTED_FUNCTION_HAS_OR_IS_USING_PRIVATE_NAME_0,
            &UNKNOWN_COMPILER_OPTION_0,
            &ARGUMENT_FOR_0_OPTION_MUST_BE_1,
            &_0_IS_DECLARED_BUT_ITS_VALUE_IS_NEVER_READ,
            &PARAMETER_0_IMPLICITLY_HAS_AN_1_TYPE,
        ];
        ALL.iter().find(|m| m.code == code).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message("Cannot find name '{0}'.", &["foo"]),
            "Cannot find name 'foo'."
        );
        assert_eq!(
            format_message("Expected {0} arguments, but got {1}.", &["2", "3"]),
            "Expected 2 arguments, but got 3."
        );
    }

    #[test]
    fn test_flatten_plain() {
        let message = MessageText::Plain("Unexpected token.".to_string());
        assert_eq!(message.flatten("\n"), "Unexpected token.");
    }

    #[test]
    fn test_flatten_chain() {
        let message = MessageText::Chain {
            text: "Type 'A' is not assignable to type 'B'.".to_string(),
            next: vec![MessageText::Chain {
                text: "Property 'x' is missing.".to_string(),
                next: vec![MessageText::Plain("'x' is required.".to_string())],
            }],
        };
        assert_eq!(
            message.flatten("\n"),
            "Type 'A' is not assignable to type 'B'.\n  Property 'x' is missing.\n    'x' is required."
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::with_location(
            "fixture.ts".to_string(),
            TextSpan::new(10, 3),
            &messages::CANNOT_FIND_NAME_0,
            &["foo"],
        );
        assert_eq!(
            d.to_string(),
            "fixture.ts(10): error TS2304: Cannot find name 'foo'."
        );
        assert!(d.is_error());
    }

    #[test]
    fn test_message_lookup() {
        assert_eq!(messages::for_code(2345).map(|m| m.code), Some(2345));
        assert!(messages::for_code(9999).is_none());
    }
}
