use syn::{Ident, Type};

use super::{ArrayQueryMode, MethodDef};

/// Everything needed to emit one method body, decided ahead of token
/// generation so the codegen layer makes no further choices.
#[derive(Debug, Clone)]
pub struct MethodPlan {
  pub def: MethodDef,
  pub content_type: String,
  pub path: PathPlan,
  pub query: Vec<QueryStep>,
  pub headers: Vec<HeaderStep>,
  pub body: Option<BodyStep>,
  pub cancellation: Option<CancellationArg>,
  pub dispatch: DispatchStrategy,
  pub removals: Vec<String>,
  pub ignored: Vec<Ident>,
}

#[derive(Debug, Clone)]
pub struct PathPlan {
  pub format: String,
  pub args: Vec<PathArg>,
}

#[derive(Debug, Clone)]
pub struct PathArg {
  pub param: Ident,
  pub placeholder: String,
  pub optional: bool,
}

#[derive(Debug, Clone)]
pub struct QueryStep {
  pub param: Ident,
  pub key: String,
  pub value: QueryValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
  Scalar {
    optional: bool,
  },
  Array {
    mode: ArrayQueryMode,
    access: CollectionAccess,
    element_optional: bool,
  },
}

/// How the collection itself is reached from the parameter binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionAccess {
  Direct,
  /// `Option<C>`
  Optional,
  /// `Option<&C>`
  OptionalRef,
}

#[derive(Debug, Clone)]
pub struct HeaderStep {
  pub param: Ident,
  pub key: String,
  pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
  Json,
  Raw,
}

#[derive(Debug, Clone)]
pub struct BodyStep {
  pub param: Ident,
  pub encoding: BodyEncoding,
  pub optional: bool,
  /// The payload (inside any `Option`) is a reference and must be owned
  /// before it becomes a raw body.
  pub by_ref: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenForm {
  /// `CancellationToken`
  Owned,
  /// `&CancellationToken`
  Borrowed,
  /// `Option<CancellationToken>`
  Optional,
  /// `Option<&CancellationToken>`
  OptionalBorrowed,
}

#[derive(Debug, Clone)]
pub struct CancellationArg {
  pub param: Ident,
  pub form: TokenForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BytesKind {
  Vec,
  Bytes,
}

#[derive(Debug, Clone)]
pub enum DispatchStrategy {
  Scalar(Type),
  Bytes(BytesKind),
  File {
    param: Ident,
    overwrite: bool,
    reports_size: bool,
  },
  Void,
}
