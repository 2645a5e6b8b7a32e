use indexmap::IndexSet;
use syn::ext::IdentExt;

use crate::generator::{
  ast::{ParameterDef, ParameterRole, ParsedPath},
  errors::PathError,
};

/// Checks a path template against the parameters bound to it.
pub(crate) struct PathResolver;

impl PathResolver {
  /// Tokenizes the template and returns it with its placeholder names.
  ///
  /// A placeholder may appear only once.
  pub(crate) fn parse(template: &str) -> Result<(ParsedPath, IndexSet<String>), PathError> {
    let path = ParsedPath::parse(template).map_err(|source| PathError::Syntax {
      template: template.to_string(),
      source,
    })?;

    let mut placeholders = IndexSet::new();
    for placeholder in path.placeholders() {
      if !placeholders.insert(placeholder.to_string()) {
        return Err(PathError::DuplicatePlaceholder {
          template: path.template().to_string(),
          placeholder: placeholder.to_string(),
        });
      }
    }

    Ok((path, placeholders))
  }

  /// Every placeholder must have exactly one Path parameter and every Path
  /// parameter must be named by a placeholder.
  pub(crate) fn bind(path: &ParsedPath, parameters: &[ParameterDef]) -> Result<(), PathError> {
    let path_params: Vec<String> = parameters
      .iter()
      .filter(|param| matches!(param.role, ParameterRole::Path))
      .map(|param| param.name.unraw().to_string())
      .collect();

    for placeholder in path.placeholders() {
      if !path_params.iter().any(|param| param == placeholder) {
        return Err(PathError::UnboundPlaceholder {
          template: path.template().to_string(),
          placeholder: placeholder.to_string(),
        });
      }
    }

    let mut seen = IndexSet::new();
    for param in path_params {
      if !path.placeholders().any(|placeholder| placeholder == param) || !seen.insert(param.clone()) {
        return Err(PathError::OrphanPathParameter {
          template: path.template().to_string(),
          param,
        });
      }
    }

    Ok(())
  }
}
