use thiserror::Error;

use super::{
  ast::PathParseError,
  diagnostics::{DiagnosticCode, Severity},
};

/// Malformed annotations or unparsable declaration source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
  #[error("failed to parse declaration source: {0}")]
  Parse(String),
  #[error("invalid `#[{attribute}]` annotation: {message}")]
  InvalidAnnotation { attribute: String, message: String },
  #[error("`#[{attribute}]` is not valid on a {site}")]
  MisplacedAnnotation { attribute: String, site: &'static str },
  #[error("unknown `#[http_api]` key `{0}`")]
  UnknownKey(String),
  #[error("missing HTTP verb annotation")]
  MissingVerb,
  #[error("conflicting HTTP verb annotations `#[{first}]` and `#[{second}]`")]
  ConflictingVerbs { first: String, second: String },
}

impl DeclarationError {
  pub(crate) fn annotation(attribute: impl Into<String>, message: impl ToString) -> Self {
    Self::InvalidAnnotation {
      attribute: attribute.into(),
      message: message.to_string(),
    }
  }
}

/// A method or trait shape that no client can implement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
  #[error("method must be declared `async fn`")]
  NotAsync,
  #[error("method must take `&self` as its receiver")]
  MissingReceiver,
  #[error("method must return `Result<T, E>`")]
  NotResult,
  #[error("parameter patterns are not supported, bind `{0}` to a plain name")]
  PatternParameter(String),
  #[error("generic methods are not supported")]
  GenericMethod,
  #[error("generic traits are not supported")]
  GenericTrait,
  #[error("traits with supertraits are not supported")]
  Supertraits,
  #[error("unsupported trait item: {0}")]
  UnsupportedItem(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
  #[error("cancellation-token parameter `{param}` must not carry a data-binding annotation")]
  CancellationWithBinding { param: String },
  #[error("ambiguous binding for parameter `{param}`: {bindings}")]
  AmbiguousBinding { param: String, bindings: String },
  #[error("parameter `{param}` is a second `#[body]` parameter, `{existing}` already is the body")]
  DuplicateBody { param: String, existing: String },
  #[error("ambiguous body parameter: both `{existing}` and `{param}` would be sent as the body")]
  AmbiguousBody { param: String, existing: String },
  #[error("`#[array_query]` parameter `{param}` is not a sequence")]
  NotASequence { param: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
  #[error("invalid path template `{template}`: {source}")]
  Syntax {
    template: String,
    #[source]
    source: PathParseError,
  },
  #[error("placeholder `{{{placeholder}}}` appears more than once in `{template}`")]
  DuplicatePlaceholder { template: String, placeholder: String },
  #[error("placeholder `{{{placeholder}}}` in `{template}` has no matching parameter")]
  UnboundPlaceholder { template: String, placeholder: String },
  #[error("path parameter `{param}` is not referenced by `{template}`")]
  OrphanPathParameter { template: String, param: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
  #[error("`#[file_path]` parameter `{param}` requires a `()` or `u64` return type")]
  FilePathReturn { param: String },
  #[error("streamed download requires a `#[file_path]` parameter")]
  FileWithoutStreamedReturn,
  #[error("more than one `#[file_path]` parameter: {params}")]
  MultipleFilePaths { params: String },
  #[error("`#[file_path]` parameter `{param}` must not be optional")]
  OptionalFilePath { param: String },
  #[error("invalid content type `{0}`")]
  InvalidContentType(String),
  #[error("body parameter `{param}` carries structured data but content type `{content_type}` is not JSON")]
  RawDataBody { param: String, content_type: String },
  #[error("invalid header name `{0}`")]
  InvalidHeaderName(String),
}

/// Any failure raised while turning one declaration into code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
  #[error(transparent)]
  Declaration(#[from] DeclarationError),
  #[error(transparent)]
  Signature(#[from] SignatureError),
  #[error(transparent)]
  Classification(#[from] ClassificationError),
  #[error(transparent)]
  Path(#[from] PathError),
  #[error(transparent)]
  Synthesis(#[from] SynthesisError),
  #[error("could not generate for type {name}, skipping: {reason}")]
  Unsupported { name: String, reason: String },
}

impl GenerationError {
  #[must_use]
  pub fn code(&self) -> DiagnosticCode {
    match self {
      Self::Declaration(_) | Self::Signature(_) | Self::Path(PathError::Syntax { .. }) => DiagnosticCode::Structural,
      Self::Classification(_) | Self::Path(_) => DiagnosticCode::InvalidParameter,
      Self::Synthesis(_) | Self::Unsupported { .. } => DiagnosticCode::Generation,
    }
  }

  #[must_use]
  pub fn severity(&self) -> Severity {
    match self {
      Self::Unsupported { .. } => Severity::Warning,
      _ => Severity::Error,
    }
  }

  /// Whether the failure prevents any client from being generated for the
  /// interface, rather than just the one method.
  #[must_use]
  pub fn blocks_interface(&self) -> bool {
    matches!(self, Self::Signature(_))
  }
}
