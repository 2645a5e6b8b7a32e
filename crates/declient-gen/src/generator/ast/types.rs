//! Syntactic predicates over declared parameter and return types.
//!
//! Declarations are never type-checked, so every decision here is made from
//! the written type alone: the last path segment and its generic arguments.

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, PathSegment, Type, TypePath};

use super::plan::{BytesKind, TokenForm};

const CANCELLATION_TOKEN: &str = "CancellationToken";

const SCALAR_TYPES: &[&str] = &[
  "i8",
  "i16",
  "i32",
  "i64",
  "i128",
  "isize",
  "u8",
  "u16",
  "u32",
  "u64",
  "u128",
  "usize",
  "f32",
  "f64",
  "bool",
  "char",
  "String",
  "str",
  "Uuid",
  "DateTime",
  "NaiveDate",
  "NaiveDateTime",
  "NaiveTime",
  "Decimal",
  "Url",
  "PathBuf",
  "Path",
  "Bytes",
];

const COLLECTION_TYPES: &[&str] = &["Vec", "VecDeque", "HashSet", "BTreeSet", "IndexSet"];

const WRAPPER_TYPES: &[&str] = &["Box", "Rc", "Arc", "Cow"];

/// Peels `&`, `&mut`, parentheses and invisible groups.
#[must_use]
pub fn strip_references(ty: &Type) -> &Type {
  match ty {
    Type::Reference(reference) => strip_references(&reference.elem),
    Type::Paren(paren) => strip_references(&paren.elem),
    Type::Group(group) => strip_references(&group.elem),
    other => other,
  }
}

#[must_use]
pub fn last_segment(ty: &Type) -> Option<&PathSegment> {
  match strip_references(ty) {
    Type::Path(TypePath { qself: None, path }) => path.segments.last(),
    _ => None,
  }
}

pub fn generic_args(segment: &PathSegment) -> impl Iterator<Item = &Type> {
  let args = match &segment.arguments {
    PathArguments::AngleBracketed(args) => Some(args.args.iter()),
    _ => None,
  };
  args.into_iter().flatten().filter_map(|arg| match arg {
    GenericArgument::Type(ty) => Some(ty),
    _ => None,
  })
}

fn first_arg_of<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
  let segment = last_segment(ty)?;
  if segment.ident != name {
    return None;
  }
  generic_args(segment).next()
}

/// `T` for `Option<T>` (behind any number of references).
#[must_use]
pub fn option_inner(ty: &Type) -> Option<&Type> {
  first_arg_of(ty, "Option")
}

#[must_use]
pub fn is_reference(ty: &Type) -> bool {
  matches!(ty, Type::Reference(_))
}

/// How a cancellation-token parameter is written, or `None` for any other type.
#[must_use]
pub fn token_form(ty: &Type) -> Option<TokenForm> {
  let is_token = |ty: &Type| last_segment(ty).is_some_and(|segment| segment.ident == CANCELLATION_TOKEN);

  if let Some(inner) = option_inner(ty) {
    return is_token(inner).then(|| {
      if is_reference(inner) {
        TokenForm::OptionalBorrowed
      } else {
        TokenForm::Optional
      }
    });
  }

  is_token(ty).then(|| {
    if is_reference(ty) {
      TokenForm::Borrowed
    } else {
      TokenForm::Owned
    }
  })
}

#[must_use]
pub fn is_cancellation_token(ty: &Type) -> bool {
  token_form(ty).is_some()
}

/// The success type of `Result<T, E>` or a single-argument `Result<T>` alias.
#[must_use]
pub fn result_ok_type(ty: &Type) -> Option<&Type> {
  if is_reference(ty) {
    return None;
  }
  first_arg_of(ty, "Result")
}

#[must_use]
pub fn is_unit(ty: &Type) -> bool {
  match ty {
    Type::Tuple(tuple) => tuple.elems.is_empty(),
    Type::Paren(paren) => is_unit(&paren.elem),
    Type::Group(group) => is_unit(&group.elem),
    _ => false,
  }
}

#[must_use]
pub fn is_u64(ty: &Type) -> bool {
  !is_reference(ty)
    && last_segment(ty).is_some_and(|segment| segment.ident == "u64" && segment.arguments.is_none())
}

/// `Vec<u8>` and `Bytes` are returned as raw response bytes.
#[must_use]
pub fn bytes_kind(ty: &Type) -> Option<BytesKind> {
  if is_reference(ty) {
    return None;
  }
  let segment = last_segment(ty)?;
  if segment.ident == "Bytes" && segment.arguments.is_none() {
    return Some(BytesKind::Bytes);
  }
  let element = first_arg_of(ty, "Vec")?;
  last_segment(element)
    .is_some_and(|segment| segment.ident == "u8" && !is_reference(element))
    .then_some(BytesKind::Vec)
}

/// Element type of a sequence or set, looking through references.
#[must_use]
pub fn collection_element(ty: &Type) -> Option<&Type> {
  match strip_references(ty) {
    Type::Slice(slice) => Some(&slice.elem),
    Type::Array(array) => Some(&array.elem),
    Type::Path(TypePath { qself: None, path }) => {
      let segment = path.segments.last()?;
      let name = segment.ident.to_string();
      if COLLECTION_TYPES.contains(&name.as_str()) {
        generic_args(segment).next()
      } else {
        None
      }
    }
    _ => None,
  }
}

/// Whether a value of this type is structured data rather than a scalar.
///
/// Scalars (numbers, text, byte buffers, well-known value types) are not
/// data-carrying; `Option`, references and smart pointers follow their inner
/// type; collections follow their element. Unknown named types are assumed to be
/// data-carrying.
#[must_use]
pub fn is_data_carrying(ty: &Type) -> bool {
  match ty {
    Type::Reference(reference) => is_data_carrying(&reference.elem),
    Type::Paren(paren) => is_data_carrying(&paren.elem),
    Type::Group(group) => is_data_carrying(&group.elem),
    Type::Slice(slice) => is_data_carrying(&slice.elem),
    Type::Array(array) => is_data_carrying(&array.elem),
    Type::Tuple(tuple) => !tuple.elems.is_empty(),
    Type::Path(TypePath { qself: None, path }) => {
      let Some(segment) = path.segments.last() else {
        return true;
      };
      let name = segment.ident.to_string();
      let name = name.as_str();

      if SCALAR_TYPES.contains(&name) {
        return false;
      }
      if name == "Option" || WRAPPER_TYPES.contains(&name) || COLLECTION_TYPES.contains(&name) {
        return generic_args(segment).next().is_none_or(is_data_carrying);
      }
      true
    }
    _ => true,
  }
}

/// Compact source rendering of a type for tables and messages.
#[must_use]
pub fn render_type(ty: &Type) -> String {
  ty.to_token_stream()
    .to_string()
    .replace(" :: ", "::")
    .replace(":: ", "::")
    .replace(" <", "<")
    .replace("< ", "<")
    .replace(" >", ">")
    .replace(" ,", ",")
    .replace("& ", "&")
}
