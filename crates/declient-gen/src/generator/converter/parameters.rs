use http::Method;
use indexmap::IndexSet;
use itertools::Itertools;
use syn::{Ident, Type, ext::IdentExt};

use crate::generator::{
  ast::{
    ArrayQueryMode, ParameterDef, ParameterRole,
    types::{collection_element, is_cancellation_token, is_data_carrying, option_inner},
  },
  declarations::BindingAttr,
  errors::ClassificationError,
};

/// Assigns each method parameter its request role.
///
/// One classifier is used per method: it remembers which parameter became
/// the body so a second one can be rejected.
#[derive(Debug)]
pub(crate) struct ParameterClassifier<'a> {
  placeholders: &'a IndexSet<String>,
  verb: Method,
  body: Option<String>,
}

impl<'a> ParameterClassifier<'a> {
  pub(crate) fn new(placeholders: &'a IndexSet<String>, verb: Method) -> Self {
    Self {
      placeholders,
      verb,
      body: None,
    }
  }

  pub(crate) fn classify(
    &mut self,
    name: &Ident,
    ty: &Type,
    bindings: &[BindingAttr],
  ) -> Result<ParameterDef, ClassificationError> {
    let param = name.unraw().to_string();

    if is_cancellation_token(ty) {
      if !bindings.is_empty() {
        return Err(ClassificationError::CancellationWithBinding { param });
      }
      return Ok(Self::def(name, ty, ParameterRole::Cancellation, None));
    }

    let is_placeholder = self.placeholders.contains(&param);
    if bindings.len() + usize::from(is_placeholder) > 1 {
      let bindings = is_placeholder
        .then_some("path placeholder")
        .into_iter()
        .chain(bindings.iter().map(BindingAttr::label))
        .join(", ");
      return Err(ClassificationError::AmbiguousBinding { param, bindings });
    }

    if let Some(binding) = bindings.first() {
      return self.classify_annotated(name, ty, param, binding);
    }

    if is_placeholder {
      return Ok(Self::def(name, ty, ParameterRole::Path, None));
    }

    if self.verb != Method::GET && self.verb != Method::HEAD && is_data_carrying(ty) {
      if let Some(existing) = &self.body {
        return Err(ClassificationError::AmbiguousBody {
          param,
          existing: existing.clone(),
        });
      }
      self.body = Some(param);
      return Ok(Self::def(name, ty, ParameterRole::Body, None));
    }

    let role = if is_sequence(ty) {
      ParameterRole::ArrayQuery {
        key: param,
        mode: ArrayQueryMode::RepeatedKey,
      }
    } else {
      ParameterRole::Query { key: param }
    };
    Ok(Self::def(name, ty, role, None))
  }

  fn classify_annotated(
    &mut self,
    name: &Ident,
    ty: &Type,
    param: String,
    binding: &BindingAttr,
  ) -> Result<ParameterDef, ClassificationError> {
    let (role, key_override) = match binding {
      BindingAttr::Body => {
        if let Some(existing) = &self.body {
          return Err(ClassificationError::DuplicateBody {
            param,
            existing: existing.clone(),
          });
        }
        self.body = Some(param);
        (ParameterRole::Body, None)
      }
      BindingAttr::Header { name: key } => (
        ParameterRole::Header {
          key: key.clone().unwrap_or(param),
        },
        key.clone(),
      ),
      BindingAttr::ArrayQuery { name: key, separator } => {
        if !is_sequence(ty) {
          return Err(ClassificationError::NotASequence { param });
        }
        (
          ParameterRole::ArrayQuery {
            key: key.clone().unwrap_or(param),
            mode: ArrayQueryMode::from_separator(separator.clone()),
          },
          key.clone(),
        )
      }
      BindingAttr::Query { name: key } => {
        let query_key = key.clone().unwrap_or(param);
        let role = if is_sequence(ty) {
          ParameterRole::ArrayQuery {
            key: query_key,
            mode: ArrayQueryMode::RepeatedKey,
          }
        } else {
          ParameterRole::Query { key: query_key }
        };
        (role, key.clone())
      }
      BindingAttr::FilePath { overwrite } => (ParameterRole::FilePath { overwrite: *overwrite }, None),
      BindingAttr::Ignore => (ParameterRole::Ignored, None),
    };

    Ok(Self::def(name, ty, role, key_override))
  }

  fn def(name: &Ident, ty: &Type, role: ParameterRole, key_override: Option<String>) -> ParameterDef {
    ParameterDef {
      name: name.clone(),
      ty: ty.clone(),
      role,
      key_override,
    }
  }
}

/// A collection, or an optional collection.
pub(crate) fn is_sequence(ty: &Type) -> bool {
  collection_element(option_inner(ty).unwrap_or(ty)).is_some()
}
