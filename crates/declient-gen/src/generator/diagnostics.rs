use std::fmt;

use serde::Serialize;
use strum::Display;

use super::errors::GenerationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
pub enum DiagnosticCode {
  /// Malformed declaration, annotation or signature.
  #[strum(to_string = "DCL001")]
  #[serde(rename = "DCL001")]
  Structural,
  /// A parameter or annotation argument that cannot be honored.
  #[strum(to_string = "DCL002")]
  #[serde(rename = "DCL002")]
  InvalidParameter,
  #[strum(to_string = "DCL003")]
  #[serde(rename = "DCL003")]
  Generation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Error,
  Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub code: DiagnosticCode,
  pub severity: Severity,
  pub interface_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub method_name: Option<String>,
  pub message: String,
}

impl Diagnostic {
  #[must_use]
  pub fn from_error(interface_name: &str, method_name: Option<&str>, error: &GenerationError) -> Self {
    Self {
      code: error.code(),
      severity: error.severity(),
      interface_name: interface_name.to_string(),
      method_name: method_name.map(str::to_string),
      message: error.to_string(),
    }
  }

  #[must_use]
  pub fn is_error(&self) -> bool {
    self.severity == Severity::Error
  }

  /// `Interface.method`, or just the interface for unit-level records.
  #[must_use]
  pub fn location(&self) -> String {
    match &self.method_name {
      Some(method) => format!("{}.{method}", self.interface_name),
      None => self.interface_name.clone(),
    }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}[{}] {}: {}", self.severity, self.code, self.location(), self.message)
  }
}

/// Collects diagnostics for one unit of work.
///
/// Reporters are merged in a fixed order after parallel work completes, so
/// the final list does not depend on scheduling.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReporter {
  diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReporter {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn report(&mut self, diagnostic: Diagnostic) {
    self.diagnostics.push(diagnostic);
  }

  pub fn report_error(&mut self, interface_name: &str, method_name: Option<&str>, error: &GenerationError) {
    self.report(Diagnostic::from_error(interface_name, method_name, error));
  }

  pub fn merge(&mut self, other: DiagnosticReporter) {
    self.diagnostics.extend(other.diagnostics);
  }

  #[must_use]
  pub fn has_errors(&self) -> bool {
    self.diagnostics.iter().any(Diagnostic::is_error)
  }

  #[must_use]
  pub fn error_count(&self) -> usize {
    self.diagnostics.iter().filter(|diagnostic| diagnostic.is_error()).count()
  }

  #[must_use]
  pub fn warning_count(&self) -> usize {
    self.diagnostics.len() - self.error_count()
  }

  #[must_use]
  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  #[must_use]
  pub fn into_diagnostics(self) -> Vec<Diagnostic> {
    self.diagnostics
  }
}
