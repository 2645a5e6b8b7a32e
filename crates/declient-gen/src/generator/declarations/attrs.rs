//! The annotation vocabulary understood on `#[http_api]` traits, their
//! methods and method parameters.

use std::str::FromStr;

use http::Method;
use syn::{
  Attribute, Expr, ExprLit, Ident, ItemTrait, Lit, LitStr, Meta, Token, TraitItem,
  parse::{Parse, ParseStream},
  parse_quote,
};

use crate::generator::{
  ast::{DEFAULT_CONTENT_TYPE, RemovalDirective, TokenKind},
  errors::DeclarationError,
};

pub(crate) const HTTP_API: &str = "http_api";
pub(crate) const CONTENT_TYPE: &str = "content_type";
pub(crate) const ARRAY_QUERY: &str = "array_query";
pub(crate) const SKIP_AUTH: &str = "skip_auth";
pub(crate) const QUERY: &str = "query";
pub(crate) const HEADER: &str = "header";
pub(crate) const BODY: &str = "body";
pub(crate) const FILE_PATH: &str = "file_path";
pub(crate) const IGNORE: &str = "ignore";

pub(crate) const VERBS: &[&str] = &["get", "post", "put", "delete", "patch", "head", "options"];

const VOCABULARY: &[&str] = &[
  HTTP_API,
  CONTENT_TYPE,
  ARRAY_QUERY,
  SKIP_AUTH,
  QUERY,
  HEADER,
  BODY,
  FILE_PATH,
  IGNORE,
];

const INTERFACE_KEYS: &[&str] = &["base_url", "timeout", "registry_group", "content_type", "name", "token_kind"];

pub(crate) fn verb_method(name: &str) -> Option<Method> {
  match name {
    "get" => Some(Method::GET),
    "post" => Some(Method::POST),
    "put" => Some(Method::PUT),
    "delete" => Some(Method::DELETE),
    "patch" => Some(Method::PATCH),
    "head" => Some(Method::HEAD),
    "options" => Some(Method::OPTIONS),
    _ => None,
  }
}

/// Single-identifier attribute name, e.g. `get` for `#[get("/")]`.
pub(crate) fn attribute_name(attr: &Attribute) -> Option<String> {
  attr.path().get_ident().map(ToString::to_string)
}

fn is_vocabulary_name(name: &str) -> bool {
  VOCABULARY.contains(&name) || VERBS.contains(&name)
}

pub(crate) fn is_vocabulary(attr: &Attribute) -> bool {
  attribute_name(attr).is_some_and(|name| is_vocabulary_name(&name))
}

/// A vocabulary annotation attached where it has no meaning, e.g. `#[body]`
/// on a method.
fn misplaced(name: &str, site: &'static str) -> DeclarationError {
  DeclarationError::MisplacedAnnotation {
    attribute: name.to_string(),
    site,
  }
}

pub(crate) fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
  attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// Arguments of one annotation: an optional leading string literal followed
/// by `key = literal` pairs.
#[derive(Debug, Default)]
pub(crate) struct AttrArgs {
  attribute: String,
  positional: Option<LitStr>,
  named: Vec<(Ident, Lit)>,
}

impl Parse for AttrArgs {
  fn parse(input: ParseStream) -> syn::Result<Self> {
    let mut args = Self::default();

    if input.peek(LitStr) {
      args.positional = Some(input.parse()?);
      if !input.is_empty() {
        input.parse::<Token![,]>()?;
      }
    }

    while !input.is_empty() {
      let key: Ident = input.parse()?;
      input.parse::<Token![=]>()?;
      let value: Lit = input.parse()?;
      if args.named.iter().any(|(existing, _)| *existing == key) {
        return Err(syn::Error::new(key.span(), format!("duplicate key `{key}`")));
      }
      args.named.push((key, value));

      if input.is_empty() {
        break;
      }
      input.parse::<Token![,]>()?;
    }

    Ok(args)
  }
}

impl AttrArgs {
  pub(crate) fn from_attribute(attr: &Attribute) -> Result<Self, DeclarationError> {
    let attribute = attribute_name(attr).unwrap_or_default();
    let mut args = match &attr.meta {
      Meta::Path(_) => Self::default(),
      Meta::List(_) => attr
        .parse_args_with(Self::parse)
        .map_err(|err| DeclarationError::annotation(&attribute, err))?,
      Meta::NameValue(name_value) => match &name_value.value {
        Expr::Lit(ExprLit { lit: Lit::Str(lit), .. }) => Self {
          positional: Some(lit.clone()),
          ..Self::default()
        },
        _ => return Err(DeclarationError::annotation(&attribute, "expected a string literal")),
      },
    };
    args.attribute = attribute;
    Ok(args)
  }

  fn error(&self, message: impl ToString) -> DeclarationError {
    DeclarationError::annotation(&self.attribute, message)
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.positional.is_none() && self.named.is_empty()
  }

  pub(crate) fn ensure_empty(&self) -> Result<(), DeclarationError> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(self.error("takes no arguments"))
    }
  }

  pub(crate) fn ensure_keys(&self, allowed: &[&str]) -> Result<(), DeclarationError> {
    match self.named.iter().find(|(key, _)| !allowed.iter().any(|allowed| key == allowed)) {
      Some((key, _)) => Err(self.error(format!("unknown key `{key}`"))),
      None => Ok(()),
    }
  }

  fn find(&self, key: &str) -> Option<&Lit> {
    self
      .named
      .iter()
      .find_map(|(existing, value)| (existing == key).then_some(value))
  }

  pub(crate) fn string(&self, key: &str) -> Result<Option<String>, DeclarationError> {
    match self.find(key) {
      None => Ok(None),
      Some(Lit::Str(lit)) => Ok(Some(lit.value())),
      Some(_) => Err(self.error(format!("`{key}` must be a string literal"))),
    }
  }

  pub(crate) fn u64(&self, key: &str) -> Result<Option<u64>, DeclarationError> {
    match self.find(key) {
      None => Ok(None),
      Some(Lit::Int(lit)) => lit.base10_parse().map(Some).map_err(|err| self.error(err)),
      Some(_) => Err(self.error(format!("`{key}` must be a non-negative integer"))),
    }
  }

  pub(crate) fn bool(&self, key: &str) -> Result<Option<bool>, DeclarationError> {
    match self.find(key) {
      None => Ok(None),
      Some(Lit::Bool(lit)) => Ok(Some(lit.value)),
      Some(_) => Err(self.error(format!("`{key}` must be `true` or `false`"))),
    }
  }

  /// The leading string, or the value of `key`; supplying both is an error.
  pub(crate) fn positional_or(&self, key: &str) -> Result<Option<String>, DeclarationError> {
    let named = self.string(key)?;
    match (&self.positional, named) {
      (Some(_), Some(_)) => Err(self.error(format!("`{key}` given both positionally and by name"))),
      (Some(lit), None) => Ok(Some(lit.value())),
      (None, named) => Ok(named),
    }
  }

  pub(crate) fn ensure_no_positional(&self) -> Result<(), DeclarationError> {
    match self.positional {
      Some(_) => Err(self.error("unexpected positional argument")),
      None => Ok(()),
    }
  }
}

fn content_type_annotation(attr: &Attribute) -> Result<String, DeclarationError> {
  let args = AttrArgs::from_attribute(attr)?;
  args.ensure_keys(&[])?;
  args.positional_or("value")?.ok_or_else(|| args.error("expected a content type"))
}

fn removal_directive(attr: &Attribute) -> Result<RemovalDirective, DeclarationError> {
  let args = AttrArgs::from_attribute(attr)?;
  args.ensure_keys(&["name"])?;
  match args.positional_or("name")? {
    Some(key) if !key.is_empty() => Ok(RemovalDirective(key)),
    _ => Err(args.error("removal directive needs a query key")),
  }
}

/// Settings from `#[http_api(...)]` plus the trait-level `#[content_type]`
/// and removal directives.
#[derive(Debug, Clone)]
pub(crate) struct InterfaceAttrs {
  pub base_url: String,
  pub timeout_secs: u64,
  pub registry_group: Option<String>,
  pub content_type: String,
  pub name: Option<Ident>,
  pub token_kind: TokenKind,
  pub removals: Vec<RemovalDirective>,
}

impl Default for InterfaceAttrs {
  fn default() -> Self {
    Self {
      base_url: String::new(),
      timeout_secs: 0,
      registry_group: None,
      content_type: DEFAULT_CONTENT_TYPE.to_string(),
      name: None,
      token_kind: TokenKind::default(),
      removals: vec![],
    }
  }
}

impl InterfaceAttrs {
  pub(crate) fn from_attrs(attrs: &[Attribute]) -> Result<Self, DeclarationError> {
    let mut result = Self::default();
    let mut declared_in_http_api = false;
    let mut annotated: Option<String> = None;

    for attr in attrs {
      let Some(name) = attribute_name(attr) else {
        continue;
      };
      match name.as_str() {
        HTTP_API => {
          let args = AttrArgs::from_attribute(attr)?;
          declared_in_http_api |= args.find(CONTENT_TYPE).is_some();
          result.apply_http_api(&args)?;
        }
        CONTENT_TYPE => {
          if annotated.is_some() {
            return Err(DeclarationError::annotation(CONTENT_TYPE, "given more than once"));
          }
          annotated = Some(content_type_annotation(attr)?);
        }
        ARRAY_QUERY => result.removals.push(removal_directive(attr)?),
        other if is_vocabulary_name(other) => return Err(misplaced(other, "trait")),
        _ => {}
      }
    }

    if let Some(content_type) = annotated {
      if declared_in_http_api {
        return Err(DeclarationError::annotation(
          CONTENT_TYPE,
          "content type given both here and in `#[http_api(content_type = ...)]`",
        ));
      }
      result.content_type = content_type;
    }

    Ok(result)
  }

  fn apply_http_api(&mut self, args: &AttrArgs) -> Result<(), DeclarationError> {
    if let Some((key, _)) = args
      .named
      .iter()
      .find(|(key, _)| !INTERFACE_KEYS.iter().any(|allowed| key == allowed))
    {
      return Err(DeclarationError::UnknownKey(key.to_string()));
    }

    if let Some(base_url) = args.positional_or("base_url")? {
      self.base_url = base_url;
    }
    if let Some(timeout) = args.u64("timeout")? {
      self.timeout_secs = timeout;
    }
    self.registry_group = args.string("registry_group")?.filter(|group| !group.is_empty());
    if let Some(content_type) = args.string("content_type")? {
      self.content_type = content_type;
    }
    if let Some(name) = args.string("name")? {
      let ident = syn::parse_str::<Ident>(&name).map_err(|_| args.error(format!("`{name}` is not a valid type name")))?;
      self.name = Some(ident);
    }
    if let Some(kind) = args.string("token_kind")? {
      self.token_kind = TokenKind::from_str(&kind)
        .map_err(|_| args.error(format!("unknown token kind `{kind}`, expected tenant, app or user")))?;
    }
    Ok(())
  }
}

/// Method-level annotations.
#[derive(Debug, Clone, Default)]
pub(crate) struct MethodAttrs {
  pub verb: Option<Method>,
  pub path: Option<String>,
  pub content_type: Option<String>,
  pub removals: Vec<RemovalDirective>,
  pub skip_auth: bool,
}

impl MethodAttrs {
  pub(crate) fn from_attrs(attrs: &[Attribute]) -> Result<Self, DeclarationError> {
    let mut result = Self::default();
    let mut verb_name: Option<String> = None;

    for attr in attrs {
      let Some(name) = attribute_name(attr) else {
        continue;
      };

      if let Some(method) = verb_method(&name) {
        if let Some(first) = &verb_name {
          return Err(DeclarationError::ConflictingVerbs {
            first: first.clone(),
            second: name,
          });
        }
        let args = AttrArgs::from_attribute(attr)?;
        args.ensure_keys(&["path"])?;
        result.path = args.positional_or("path")?;
        result.verb = Some(method);
        verb_name = Some(name);
        continue;
      }

      match name.as_str() {
        CONTENT_TYPE => result.content_type = Some(content_type_annotation(attr)?),
        ARRAY_QUERY => result.removals.push(removal_directive(attr)?),
        SKIP_AUTH => {
          AttrArgs::from_attribute(attr)?.ensure_empty()?;
          result.skip_auth = true;
        }
        other if is_vocabulary_name(other) => return Err(misplaced(other, "method")),
        _ => {}
      }
    }

    Ok(result)
  }
}

/// A data-binding annotation on a method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BindingAttr {
  Query { name: Option<String> },
  ArrayQuery { name: Option<String>, separator: Option<String> },
  Header { name: Option<String> },
  Body,
  FilePath { overwrite: bool },
  Ignore,
}

impl BindingAttr {
  pub(crate) fn label(&self) -> &'static str {
    match self {
      Self::Query { .. } => "#[query]",
      Self::ArrayQuery { .. } => "#[array_query]",
      Self::Header { .. } => "#[header]",
      Self::Body => "#[body]",
      Self::FilePath { .. } => "#[file_path]",
      Self::Ignore => "#[ignore]",
    }
  }

  /// Every binding annotation on a parameter, in declaration order.
  pub(crate) fn from_attrs(attrs: &[Attribute]) -> Result<Vec<Self>, DeclarationError> {
    let mut bindings = vec![];

    for attr in attrs {
      let binding = match attribute_name(attr).as_deref() {
        Some(QUERY) => {
          let args = AttrArgs::from_attribute(attr)?;
          args.ensure_keys(&["name"])?;
          Self::Query {
            name: args.positional_or("name")?,
          }
        }
        Some(ARRAY_QUERY) => {
          let args = AttrArgs::from_attribute(attr)?;
          args.ensure_keys(&["name", "separator"])?;
          Self::ArrayQuery {
            name: args.positional_or("name")?,
            separator: args.string("separator")?,
          }
        }
        Some(HEADER) => {
          let args = AttrArgs::from_attribute(attr)?;
          args.ensure_keys(&["name"])?;
          Self::Header {
            name: args.positional_or("name")?,
          }
        }
        Some(BODY) => {
          AttrArgs::from_attribute(attr)?.ensure_empty()?;
          Self::Body
        }
        Some(FILE_PATH) => {
          let args = AttrArgs::from_attribute(attr)?;
          args.ensure_no_positional()?;
          args.ensure_keys(&["overwrite"])?;
          Self::FilePath {
            overwrite: args.bool("overwrite")?.unwrap_or(true),
          }
        }
        Some(IGNORE) => {
          AttrArgs::from_attribute(attr)?.ensure_empty()?;
          Self::Ignore
        }
        Some(other) if is_vocabulary_name(other) => return Err(misplaced(other, "parameter")),
        _ => continue,
      };
      bindings.push(binding);
    }

    Ok(bindings)
  }
}

/// Removes every vocabulary annotation from the trait, its methods and their
/// parameters, leaving a plain trait definition.
pub(crate) fn strip_trait(item: &mut ItemTrait) {
  item.attrs.retain(|attr| !is_vocabulary(attr));
  item.attrs.push(parse_quote!(#[allow(async_fn_in_trait)]));

  for trait_item in &mut item.items {
    if let TraitItem::Fn(method) = trait_item {
      method.attrs.retain(|attr| !is_vocabulary(attr));
      strip_signature(&mut method.sig);
    }
  }
}

pub(crate) fn strip_signature(signature: &mut syn::Signature) {
  for input in &mut signature.inputs {
    if let syn::FnArg::Typed(pat_type) = input {
      pat_type.attrs.retain(|attr| !is_vocabulary(attr));
    }
  }
}
