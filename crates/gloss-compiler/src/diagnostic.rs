use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warn,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "Error",
            Severity::Warn => "Warn",
            Severity::Info => "Info",
        };
        f.write_str(name)
    }
}

/// A single message tied to a 0-based source position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{text} at line {line} col {column}")]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub text: String,
}

/// Append-only list shared by the lexer and the parser. Messages keep the
/// order in which they were encountered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosticList {
    items: Vec<Diagnostic>,
}

impl DiagnosticList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn messages(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn error(&mut self, line: usize, column: usize, text: impl Into<String>) {
        self.push(Severity::Error, line, column, text);
    }

    pub fn warn(&mut self, line: usize, column: usize, text: impl Into<String>) {
        self.push(Severity::Warn, line, column, text);
    }

    pub fn info(&mut self, line: usize, column: usize, text: impl Into<String>) {
        self.push(Severity::Info, line, column, text);
    }

    pub fn append(&mut self, mut other: DiagnosticList) {
        self.items.append(&mut other.items);
    }

    fn push(&mut self, severity: Severity, line: usize, column: usize, text: impl Into<String>) {
        self.items.push(Diagnostic {
            severity,
            line,
            column,
            text: text.into(),
        });
    }
}
