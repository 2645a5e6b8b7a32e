use std::collections::HashSet;

use crate::generator::{
  ast::InterfaceKey,
  codegen::{DEFAULT_SUPPORT_PATH, Visibility},
};

/// Read-only settings shared by every generation worker.
#[derive(Debug, Clone, bon::Builder)]
pub struct CodegenConfig {
  #[builder(default)]
  pub visibility: Visibility,
  /// Path of the runtime crate in generated code.
  #[builder(into, default = DEFAULT_SUPPORT_PATH.to_string())]
  pub support_path: String,
  pub only: Option<HashSet<String>>,
  pub exclude: Option<HashSet<String>>,
}

impl Default for CodegenConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}

impl CodegenConfig {
  /// Whether a client should be generated for the interface.
  ///
  /// Filters match either the bare trait name or its `::`-qualified path.
  #[must_use]
  pub fn includes(&self, key: &InterfaceKey) -> bool {
    let qualified = key.qualified_name();
    let matches = |names: &HashSet<String>| names.contains(&key.name) || names.contains(&qualified);

    if self.only.as_ref().is_some_and(|only| !matches(only)) {
      return false;
    }
    !self.exclude.as_ref().is_some_and(matches)
  }
}
