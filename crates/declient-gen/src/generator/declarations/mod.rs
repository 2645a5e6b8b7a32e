//! Syntax front-end: reads declaration sources and locates `#[http_api]`
//! traits, tracking the inline module path each one is nested in.

pub(crate) mod attrs;

use quote::ToTokens;
use syn::{Attribute, Item, ItemTrait};

use super::{ast::InterfaceKey, errors::DeclarationError};

pub(crate) use attrs::{BindingAttr, InterfaceAttrs, MethodAttrs, strip_signature, strip_trait};

/// An interface found during discovery, carried as source text so it can be
/// handed to another worker thread.
#[derive(Debug, Clone)]
pub(crate) struct RawInterface {
  pub key: InterfaceKey,
  pub source: String,
}

impl RawInterface {
  pub(crate) fn parse(&self) -> Result<ItemTrait, DeclarationError> {
    syn::parse_str(&self.source).map_err(|err| DeclarationError::Parse(err.to_string()))
  }
}

/// A non-trait item marked `#[http_api]`. It is left in the output without
/// the marker and reported as skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SkippedItem {
  pub name: String,
  pub kind: &'static str,
}

/// One parsed declaration file.
#[derive(Debug, Clone)]
pub(crate) struct DeclarationFile {
  pub source_id: String,
  pub ast: syn::File,
}

impl DeclarationFile {
  pub(crate) fn parse(source_id: &str, text: &str) -> Result<Self, DeclarationError> {
    let ast = syn::parse_file(text).map_err(|err| DeclarationError::Parse(err.to_string()))?;
    Ok(Self {
      source_id: source_id.to_string(),
      ast,
    })
  }

  fn key(&self, namespace: &[String], item: &ItemTrait) -> InterfaceKey {
    InterfaceKey {
      source_id: self.source_id.clone(),
      namespace: namespace.join("::"),
      name: item.ident.to_string(),
    }
  }

  /// Every `#[http_api]` trait in source order, depth first through inline
  /// modules.
  pub(crate) fn interfaces(&self) -> Vec<(InterfaceKey, &ItemTrait)> {
    let mut found = vec![];
    self.collect(&self.ast.items, &mut vec![], &mut found, &mut vec![]);
    found
  }

  /// Non-trait items carrying `#[http_api]`, in the same order as
  /// [`Self::interfaces`].
  pub(crate) fn skipped_items(&self) -> Vec<SkippedItem> {
    let mut skipped = vec![];
    self.collect(&self.ast.items, &mut vec![], &mut vec![], &mut skipped);
    skipped
  }

  fn collect<'a>(
    &self,
    items: &'a [Item],
    namespace: &mut Vec<String>,
    found: &mut Vec<(InterfaceKey, &'a ItemTrait)>,
    skipped: &mut Vec<SkippedItem>,
  ) {
    for item in items {
      match item {
        Item::Trait(item_trait) if is_http_api(item_trait) => {
          found.push((self.key(namespace, item_trait), item_trait));
        }
        Item::Mod(module) => {
          if let Some((_, content)) = &module.content {
            namespace.push(module.ident.to_string());
            self.collect(content, namespace, found, skipped);
            namespace.pop();
          }
        }
        other => {
          if let Some((name, kind)) = marked_item(other) {
            let name = if namespace.is_empty() {
              name
            } else {
              format!("{}::{name}", namespace.join("::"))
            };
            skipped.push(SkippedItem { name, kind });
          }
        }
      }
    }
  }

  pub(crate) fn raw_interfaces(&self) -> Vec<RawInterface> {
    self
      .interfaces()
      .into_iter()
      .map(|(key, item)| RawInterface {
        key,
        source: item.to_token_stream().to_string(),
      })
      .collect()
  }

  /// Replaces each `#[http_api]` trait with the items `replace` returns for
  /// it. Returning an empty list removes the trait.
  pub(crate) fn rewrite<E>(
    mut self,
    mut replace: impl FnMut(&InterfaceKey) -> Result<Vec<Item>, E>,
  ) -> Result<syn::File, E> {
    let mut items = std::mem::take(&mut self.ast.items);
    self.rewrite_items(&mut items, &mut vec![], &mut replace)?;
    self.ast.items = items;
    Ok(self.ast)
  }

  fn rewrite_items<E>(
    &self,
    items: &mut Vec<Item>,
    namespace: &mut Vec<String>,
    replace: &mut impl FnMut(&InterfaceKey) -> Result<Vec<Item>, E>,
  ) -> Result<(), E> {
    let mut rewritten = Vec::with_capacity(items.len());

    for item in items.drain(..) {
      match item {
        Item::Trait(item_trait) if is_http_api(&item_trait) => {
          let key = self.key(namespace, &item_trait);
          rewritten.extend(replace(&key)?);
        }
        Item::Mod(mut module) => {
          if let Some((_, content)) = &mut module.content {
            namespace.push(module.ident.to_string());
            self.rewrite_items(content, namespace, replace)?;
            namespace.pop();
          }
          rewritten.push(Item::Mod(module));
        }
        mut other => {
          if let Some(item_attrs) = item_attrs_mut(&mut other) {
            item_attrs.retain(|attr| !attr.path().is_ident(attrs::HTTP_API));
          }
          rewritten.push(other);
        }
      }
    }

    *items = rewritten;
    Ok(())
  }
}

pub(crate) fn is_http_api(item: &ItemTrait) -> bool {
  attrs::has_attribute(&item.attrs, attrs::HTTP_API)
}

/// Name and kind of a non-trait item marked `#[http_api]`.
fn marked_item(item: &Item) -> Option<(String, &'static str)> {
  let (item_attrs, name, kind): (&[Attribute], String, &'static str) = match item {
    Item::Struct(item) => (&item.attrs, item.ident.to_string(), "struct"),
    Item::Enum(item) => (&item.attrs, item.ident.to_string(), "enum"),
    Item::Union(item) => (&item.attrs, item.ident.to_string(), "union"),
    Item::Type(item) => (&item.attrs, item.ident.to_string(), "type alias"),
    Item::Fn(item) => (&item.attrs, item.sig.ident.to_string(), "function"),
    Item::Impl(item) => (&item.attrs, item.self_ty.to_token_stream().to_string(), "impl block"),
    _ => return None,
  };
  attrs::has_attribute(item_attrs, attrs::HTTP_API).then_some((name, kind))
}

fn item_attrs_mut(item: &mut Item) -> Option<&mut Vec<Attribute>> {
  match item {
    Item::Struct(item) => Some(&mut item.attrs),
    Item::Enum(item) => Some(&mut item.attrs),
    Item::Union(item) => Some(&mut item.attrs),
    Item::Type(item) => Some(&mut item.attrs),
    Item::Fn(item) => Some(&mut item.attrs),
    Item::Impl(item) => Some(&mut item.attrs),
    _ => None,
  }
}
