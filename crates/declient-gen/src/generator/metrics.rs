use serde::Serialize;

use crate::generator::diagnostics::DiagnosticReporter;

/// Per-interface method tallies produced by the interface synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UnitCounts {
  pub methods: usize,
  pub stubs: usize,
  pub defaulted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GenerationStats {
  pub files_processed: usize,
  pub interfaces_found: usize,
  pub clients_generated: usize,
  pub methods_generated: usize,
  pub stubs_generated: usize,
  pub defaulted_methods: usize,
  pub duplicates_skipped: usize,
  pub interfaces_excluded: usize,
  pub errors: usize,
  pub warnings: usize,
  /// Tallies per generated client, in key order.
  pub per_interface: Vec<(String, UnitCounts)>,
}

impl GenerationStats {
  pub fn record_file(&mut self) {
    self.files_processed += 1;
  }

  pub fn record_interface(&mut self, name: &str, client_generated: bool, counts: UnitCounts) {
    self.interfaces_found += 1;
    if client_generated {
      self.clients_generated += 1;
      self.per_interface.push((name.to_string(), counts));
    }
    self.methods_generated += counts.methods;
    self.stubs_generated += counts.stubs;
    self.defaulted_methods += counts.defaulted;
  }

  pub fn record_duplicate(&mut self) {
    self.duplicates_skipped += 1;
  }

  pub fn record_excluded(&mut self) {
    self.interfaces_excluded += 1;
  }

  pub fn record_diagnostics(&mut self, reporter: &DiagnosticReporter) {
    self.errors += reporter.error_count();
    self.warnings += reporter.warning_count();
  }

  #[must_use]
  pub fn has_errors(&self) -> bool {
    self.errors > 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::generator::errors::{GenerationError, SignatureError};

  #[test]
  fn test_record_interface_and_diagnostics() {
    let mut stats = GenerationStats::default();
    stats.record_interface(
      "UserApi",
      true,
      UnitCounts {
        methods: 3,
        stubs: 1,
        defaulted: 1,
      },
    );
    stats.record_interface("OrderApi", false, UnitCounts::default());
    stats.record_duplicate();

    let mut reporter = DiagnosticReporter::new();
    reporter.report_error("UserApi", Some("get"), &GenerationError::from(SignatureError::NotAsync));
    reporter.report_error(
      "UserApi",
      None,
      &GenerationError::Unsupported {
        name: "UserApi".to_string(),
        reason: "duplicate".to_string(),
      },
    );
    stats.record_diagnostics(&reporter);

    assert_eq!(stats.interfaces_found, 2);
    assert_eq!(stats.clients_generated, 1);
    assert_eq!(stats.methods_generated, 3);
    assert_eq!(stats.stubs_generated, 1);
    assert_eq!(stats.defaulted_methods, 1);
    assert_eq!(stats.duplicates_skipped, 1);
    assert_eq!((stats.errors, stats.warnings), (1, 1));
    assert!(stats.has_errors());
    assert_eq!(stats.per_interface.len(), 1);
    assert_eq!(stats.per_interface[0].0, "UserApi");
  }
}
