mod parsed_path;
pub(crate) mod plan;
pub(crate) mod types;


use std::fmt;

use http::Method;
use mediatype::MediaType;
use strum::{Display, EnumString};
use syn::{Ident, Signature, Type, ext::IdentExt};

pub use parsed_path::{ParsedPath, PathParseError, PathPart};
pub use plan::{
  BodyEncoding, BodyStep, BytesKind, CancellationArg, CollectionAccess, DispatchStrategy, HeaderStep, MethodPlan,
  PathArg, PathPlan, QueryStep, QueryValue, TokenForm,
};

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Stable identity of an interface within one generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceKey {
  pub source_id: String,
  pub namespace: String,
  pub name: String,
}

impl InterfaceKey {
  #[must_use]
  pub fn qualified_name(&self) -> String {
    if self.namespace.is_empty() {
      self.name.clone()
    } else {
      format!("{}::{}", self.namespace, self.name)
    }
  }
}

impl fmt::Display for InterfaceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}#{}", self.source_id, self.qualified_name())
  }
}

/// Token kind requested from the runtime token provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TokenKind {
  Tenant,
  App,
  #[default]
  User,
}

/// One API interface, built once per pass from a `#[http_api]` trait.
#[derive(Debug, Clone)]
pub struct InterfaceDef {
  pub key: InterfaceKey,
  pub name: Ident,
  pub client_name: Ident,
  pub base_url: String,
  pub timeout_secs: u64,
  pub registry_group: Option<String>,
  pub content_type: String,
  pub token_kind: TokenKind,
  pub removals: Vec<RemovalDirective>,
  pub methods: Vec<MethodDef>,
}

#[derive(Debug, Clone)]
pub struct MethodDef {
  pub name: Ident,
  /// Signature with every binding annotation stripped from the parameters.
  pub signature: Signature,
  pub verb: Method,
  pub path: ParsedPath,
  pub parameters: Vec<ParameterDef>,
  pub return_shape: ReturnShape,
  pub content_type: Option<String>,
  pub removals: Vec<RemovalDirective>,
  pub skip_auth: bool,
}

impl MethodDef {
  pub fn parameters_with_role<'a>(
    &'a self,
    predicate: impl Fn(&ParameterRole) -> bool + 'a,
  ) -> impl Iterator<Item = &'a ParameterDef> + 'a {
    self.parameters.iter().filter(move |param| predicate(&param.role))
  }

  #[must_use]
  pub fn path_parameter(&self, placeholder: &str) -> Option<&ParameterDef> {
    self
      .parameters
      .iter()
      .find(|param| matches!(param.role, ParameterRole::Path) && param.name.unraw() == placeholder)
  }
}

#[derive(Debug, Clone)]
pub struct ParameterDef {
  pub name: Ident,
  pub ty: Type,
  pub role: ParameterRole,
  pub key_override: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterRole {
  Path,
  Query { key: String },
  ArrayQuery { key: String, mode: ArrayQueryMode },
  Header { key: String },
  Body,
  FilePath { overwrite: bool },
  Cancellation,
  Ignored,
}

impl ParameterRole {
  #[must_use]
  pub fn label(&self) -> &'static str {
    match self {
      Self::Path => "path",
      Self::Query { .. } => "query",
      Self::ArrayQuery { .. } => "array query",
      Self::Header { .. } => "header",
      Self::Body => "body",
      Self::FilePath { .. } => "file path",
      Self::Cancellation => "cancellation",
      Self::Ignored => "ignored",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayQueryMode {
  Separator(String),
  RepeatedKey,
}

impl ArrayQueryMode {
  /// An empty separator means one pair per element.
  #[must_use]
  pub fn from_separator(separator: Option<String>) -> Self {
    match separator {
      Some(separator) if !separator.is_empty() => Self::Separator(separator),
      _ => Self::RepeatedKey,
    }
  }
}

/// A query key whose pairs are dropped before the query string is composed.
///
/// Declared with `#[array_query("key")]` on a method or on the trait; never a
/// parameter binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemovalDirective(pub String);

impl RemovalDirective {
  #[must_use]
  pub fn key(&self) -> &str {
    &self.0
  }
}

#[derive(Debug, Clone)]
pub enum ReturnShape {
  Scalar(Type),
  RawBytes(BytesKind),
  StreamedFile { reports_size: bool },
  Void,
}

impl ReturnShape {
  #[must_use]
  pub fn label(&self) -> String {
    match self {
      Self::Scalar(ty) => types::render_type(ty),
      Self::RawBytes(BytesKind::Vec) => "bytes (Vec<u8>)".to_string(),
      Self::RawBytes(BytesKind::Bytes) => "bytes (Bytes)".to_string(),
      Self::StreamedFile { reports_size: true } => "file (u64)".to_string(),
      Self::StreamedFile { reports_size: false } => "file".to_string(),
      Self::Void => "()".to_string(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ContentCategory {
  Json,
  Raw,
}

impl ContentCategory {
  /// `None` when the content type is not a valid media type.
  #[must_use]
  pub fn from_content_type(content_type: &str) -> Option<Self> {
    let lowered = content_type.trim().to_ascii_lowercase();
    let media = MediaType::parse(&lowered).ok()?;
    let suffix = media.suffix.as_ref().map(mediatype::Name::as_str);

    Some(match (media.ty.as_str(), media.subty.as_str(), suffix) {
      ("application" | "text", "json", _) | (_, _, Some("json")) => Self::Json,
      _ => Self::Raw,
    })
  }
}
