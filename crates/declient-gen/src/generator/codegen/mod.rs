use http::Method;
use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};

pub(crate) mod client;
pub(crate) mod request;

#[cfg(test)]
mod tests;

pub const DEFAULT_SUPPORT_PATH: &str = "::declient_support";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
  #[default]
  Public,
  Crate,
  File,
}

impl Visibility {
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "public" => Some(Visibility::Public),
      "crate" => Some(Visibility::Crate),
      "file" => Some(Visibility::File),
      _ => None,
    }
  }

  pub(crate) fn to_tokens(self) -> TokenStream {
    match self {
      Visibility::Public => quote! { pub },
      Visibility::Crate => quote! { pub(crate) },
      Visibility::File => quote! {},
    }
  }
}

/// Path of the runtime crate as written in generated code.
#[derive(Debug, Clone)]
pub(crate) struct SupportPath(TokenStream);

impl SupportPath {
  pub(crate) fn parse(path: &str) -> syn::Result<Self> {
    let path: syn::Path = syn::parse_str(path)?;
    Ok(Self(path.into_token_stream()))
  }

  pub(crate) fn method(&self, verb: &Method) -> TokenStream {
    let verb = format_ident!("{}", verb.as_str());
    quote! { #self::Method::#verb }
  }
}

impl Default for SupportPath {
  fn default() -> Self {
    Self(quote! { ::declient_support })
  }
}

impl ToTokens for SupportPath {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    self.0.to_tokens(tokens);
  }
}
