use http::HeaderName;
use itertools::Itertools;
use syn::{FnArg, GenericParam, Pat, PatIdent, ReturnType, Signature, TraitItemFn};

use super::{parameters::ParameterClassifier, paths::PathResolver};
use crate::generator::{
  ast::{
    BodyEncoding, BodyStep, CancellationArg, CollectionAccess, ContentCategory, DEFAULT_CONTENT_TYPE,
    DispatchStrategy, HeaderStep, MethodDef, MethodPlan, ParameterDef, ParameterRole, PathArg, PathPlan, QueryStep,
    QueryValue, RemovalDirective, ReturnShape,
    types::{
      bytes_kind, collection_element, is_data_carrying, is_reference, is_u64, is_unit, option_inner, result_ok_type,
      token_form,
    },
  },
  declarations::{BindingAttr, MethodAttrs, strip_signature},
  errors::{DeclarationError, GenerationError, PathError, SignatureError, SynthesisError},
};

/// Checks that a trait method can be implemented at all.
///
/// Failures here block the whole interface's client, since the trait impl
/// would not compile with the method missing or stubbed.
pub(crate) fn check_signature(signature: &Signature) -> Result<(), SignatureError> {
  if signature.asyncness.is_none() {
    return Err(SignatureError::NotAsync);
  }

  if signature
    .generics
    .params
    .iter()
    .any(|param| !matches!(param, GenericParam::Lifetime(_)))
  {
    return Err(SignatureError::GenericMethod);
  }

  match signature.inputs.first() {
    Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none() => {}
    _ => return Err(SignatureError::MissingReceiver),
  }

  for input in signature.inputs.iter().skip(1) {
    match input {
      FnArg::Typed(pat_type) => match pat_type.pat.as_ref() {
        Pat::Ident(PatIdent {
          by_ref: None,
          subpat: None,
          ..
        }) => {}
        other => return Err(SignatureError::PatternParameter(quote::quote!(#other).to_string())),
      },
      FnArg::Receiver(_) => return Err(SignatureError::MissingReceiver),
    }
  }

  match &signature.output {
    ReturnType::Type(_, ty) if result_ok_type(ty).is_some() => Ok(()),
    _ => Err(SignatureError::NotResult),
  }
}

/// Builds a [`MethodDef`] from an annotated trait method.
pub(crate) struct MethodConverter<'a> {
  interface_removals: &'a [RemovalDirective],
}

impl<'a> MethodConverter<'a> {
  pub(crate) fn new(interface_removals: &'a [RemovalDirective]) -> Self {
    Self { interface_removals }
  }

  pub(crate) fn convert(&self, item: &TraitItemFn) -> Result<MethodDef, GenerationError> {
    check_signature(&item.sig)?;

    let attrs = MethodAttrs::from_attrs(&item.attrs)?;
    let verb = attrs.verb.clone().ok_or(DeclarationError::MissingVerb)?;
    let (path, placeholders) = PathResolver::parse(attrs.path.as_deref().unwrap_or("/"))?;

    let mut classifier = ParameterClassifier::new(&placeholders, verb.clone());
    let mut parameters = vec![];
    for input in item.sig.inputs.iter().skip(1) {
      let FnArg::Typed(pat_type) = input else {
        continue;
      };
      let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
        continue;
      };
      let bindings = BindingAttr::from_attrs(&pat_type.attrs)?;
      parameters.push(classifier.classify(&pat_ident.ident, &pat_type.ty, &bindings)?);
    }

    PathResolver::bind(&path, &parameters)?;

    let mut signature = item.sig.clone();
    strip_signature(&mut signature);

    let removals = attrs
      .removals
      .iter()
      .chain(self.interface_removals)
      .unique()
      .cloned()
      .collect();

    Ok(MethodDef {
      name: item.sig.ident.clone(),
      return_shape: return_shape(&signature, &parameters),
      signature,
      verb,
      path,
      parameters,
      content_type: attrs.content_type,
      removals,
      skip_auth: attrs.skip_auth,
    })
  }
}

fn return_shape(signature: &Signature, parameters: &[ParameterDef]) -> ReturnShape {
  let ReturnType::Type(_, ty) = &signature.output else {
    return ReturnShape::Void;
  };
  let Some(ok) = result_ok_type(ty) else {
    return ReturnShape::Void;
  };

  let has_file = parameters
    .iter()
    .any(|param| matches!(param.role, ParameterRole::FilePath { .. }));

  if let Some(kind) = bytes_kind(ok) {
    ReturnShape::RawBytes(kind)
  } else if is_unit(ok) {
    if has_file {
      ReturnShape::StreamedFile { reports_size: false }
    } else {
      ReturnShape::Void
    }
  } else if has_file && is_u64(ok) {
    ReturnShape::StreamedFile { reports_size: true }
  } else {
    ReturnShape::Scalar(ok.clone())
  }
}

/// Turns a validated [`MethodDef`] into the steps of its request procedure.
pub(crate) struct MethodSynthesizer<'a> {
  interface_content_type: &'a str,
}

impl<'a> MethodSynthesizer<'a> {
  pub(crate) fn new(interface_content_type: &'a str) -> Self {
    Self { interface_content_type }
  }

  pub(crate) fn synthesize(&self, def: &MethodDef) -> Result<MethodPlan, GenerationError> {
    let content_type = self.content_type(def);
    let category =
      ContentCategory::from_content_type(&content_type).ok_or_else(|| SynthesisError::InvalidContentType(content_type.clone()))?;

    let dispatch = Self::dispatch(def)?;
    let path = Self::path(def)?;

    let mut plan = MethodPlan {
      def: def.clone(),
      path,
      query: vec![],
      headers: vec![],
      body: None,
      cancellation: None,
      dispatch,
      removals: def.removals.iter().map(|removal| removal.key().to_string()).collect(),
      ignored: vec![],
      content_type,
    };

    for param in &def.parameters {
      let name = param.name.clone();
      match &param.role {
        ParameterRole::Query { key } => plan.query.push(QueryStep {
          param: name,
          key: key.clone(),
          value: QueryValue::Scalar {
            optional: option_inner(&param.ty).is_some(),
          },
        }),
        ParameterRole::ArrayQuery { key, mode } => {
          let (access, collection) = match option_inner(&param.ty) {
            Some(inner) if is_reference(inner) => (CollectionAccess::OptionalRef, inner),
            Some(inner) => (CollectionAccess::Optional, inner),
            None => (CollectionAccess::Direct, &param.ty),
          };
          plan.query.push(QueryStep {
            param: name,
            key: key.clone(),
            value: QueryValue::Array {
              mode: mode.clone(),
              access,
              element_optional: collection_element(collection).is_some_and(|element| option_inner(element).is_some()),
            },
          });
        }
        ParameterRole::Header { key } => {
          HeaderName::from_bytes(key.as_bytes()).map_err(|_| SynthesisError::InvalidHeaderName(key.clone()))?;
          plan.headers.push(HeaderStep {
            param: name,
            key: key.clone(),
            optional: option_inner(&param.ty).is_some(),
          });
        }
        ParameterRole::Body => plan.body = Some(Self::body(param, category, &plan.content_type)?),
        ParameterRole::Cancellation if plan.cancellation.is_none() => {
          if let Some(form) = token_form(&param.ty) {
            plan.cancellation = Some(CancellationArg { param: name, form });
          }
        }
        ParameterRole::Cancellation | ParameterRole::Ignored => plan.ignored.push(name),
        ParameterRole::Path | ParameterRole::FilePath { .. } => {}
      }
    }

    Ok(plan)
  }

  /// Method override, else the interface default, else JSON.
  fn content_type(&self, def: &MethodDef) -> String {
    def
      .content_type
      .as_deref()
      .or(Some(self.interface_content_type).filter(|content_type| !content_type.is_empty()))
      .unwrap_or(DEFAULT_CONTENT_TYPE)
      .to_string()
  }

  fn path(def: &MethodDef) -> Result<PathPlan, GenerationError> {
    let mut args = vec![];
    for placeholder in def.path.placeholders() {
      let param = def.path_parameter(placeholder).ok_or_else(|| PathError::UnboundPlaceholder {
        template: def.path.template().to_string(),
        placeholder: placeholder.to_string(),
      })?;
      args.push(PathArg {
        param: param.name.clone(),
        placeholder: placeholder.to_string(),
        optional: option_inner(&param.ty).is_some(),
      });
    }

    Ok(PathPlan {
      format: def.path.format_string(),
      args,
    })
  }

  fn body(param: &ParameterDef, category: ContentCategory, content_type: &str) -> Result<BodyStep, SynthesisError> {
    let inner = option_inner(&param.ty);
    let encoding = match category {
      ContentCategory::Json => BodyEncoding::Json,
      ContentCategory::Raw if is_data_carrying(&param.ty) => {
        return Err(SynthesisError::RawDataBody {
          param: param.name.to_string(),
          content_type: content_type.to_string(),
        });
      }
      ContentCategory::Raw => BodyEncoding::Raw,
    };

    Ok(BodyStep {
      param: param.name.clone(),
      encoding,
      optional: inner.is_some(),
      by_ref: is_reference(&param.ty) || inner.is_some_and(is_reference),
    })
  }

  fn dispatch(def: &MethodDef) -> Result<DispatchStrategy, SynthesisError> {
    let files: Vec<&ParameterDef> = def
      .parameters
      .iter()
      .filter(|param| matches!(param.role, ParameterRole::FilePath { .. }))
      .collect();

    if files.len() > 1 {
      return Err(SynthesisError::MultipleFilePaths {
        params: files.iter().map(|param| param.name.to_string()).join(", "),
      });
    }

    match (&def.return_shape, files.first()) {
      (ReturnShape::StreamedFile { reports_size }, Some(file)) => {
        if option_inner(&file.ty).is_some() {
          return Err(SynthesisError::OptionalFilePath {
            param: file.name.to_string(),
          });
        }
        let ParameterRole::FilePath { overwrite } = file.role else {
          return Err(SynthesisError::FileWithoutStreamedReturn);
        };
        Ok(DispatchStrategy::File {
          param: file.name.clone(),
          overwrite,
          reports_size: *reports_size,
        })
      }
      (ReturnShape::StreamedFile { .. }, None) => Err(SynthesisError::FileWithoutStreamedReturn),
      (_, Some(file)) => Err(SynthesisError::FilePathReturn {
        param: file.name.to_string(),
      }),
      (ReturnShape::Scalar(ty), None) => Ok(DispatchStrategy::Scalar(ty.clone())),
      (ReturnShape::RawBytes(kind), None) => Ok(DispatchStrategy::Bytes(*kind)),
      (ReturnShape::Void, None) => Ok(DispatchStrategy::Void),
    }
  }
}
