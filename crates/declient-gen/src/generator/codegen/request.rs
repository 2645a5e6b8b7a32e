//! Statement fragments for a generated method body.
//!
//! Every fragment renders against a local `request` binding of type
//! `RequestSpec` created by [`RequestInitFragment`] and consumed by
//! [`DispatchFragment`].

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

use super::SupportPath;
use crate::generator::ast::{
  ArrayQueryMode, BodyEncoding, BodyStep, BytesKind, CancellationArg, CollectionAccess, DispatchStrategy,
  HeaderStep, MethodPlan, PathPlan, QueryStep, QueryValue, TokenForm,
};

/// The expanded path: a literal when static, else a `format!` call.
pub(crate) struct PathFragment<'a> {
  plan: &'a PathPlan,
  support: &'a SupportPath,
}

impl<'a> PathFragment<'a> {
  pub(crate) fn new(plan: &'a PathPlan, support: &'a SupportPath) -> Self {
    Self { plan, support }
  }
}

impl ToTokens for PathFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let format = &self.plan.format;
    if self.plan.args.is_empty() {
      tokens.extend(quote! { #format });
      return;
    }

    let support = self.support;
    let args = self.plan.args.iter().map(|arg| {
      let param = &arg.param;
      if arg.optional {
        let placeholder = &arg.placeholder;
        quote! { #support::path_param_opt(#placeholder, #param.as_ref())? }
      } else {
        quote! { #support::path_param(&#param) }
      }
    });

    tokens.extend(quote! { format!(#format, #(#args),*) });
  }
}

pub(crate) struct RequestInitFragment<'a> {
  plan: &'a MethodPlan,
  support: &'a SupportPath,
}

impl<'a> RequestInitFragment<'a> {
  pub(crate) fn new(plan: &'a MethodPlan, support: &'a SupportPath) -> Self {
    Self { plan, support }
  }

  /// Whether any later statement mutates the request.
  fn is_mutated(&self) -> bool {
    let plan = self.plan;
    !plan.query.is_empty()
      || !plan.headers.is_empty()
      || plan.body.is_some()
      || !plan.removals.is_empty()
      || plan.def.skip_auth
  }
}

impl ToTokens for RequestInitFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let method = self.support.method(&self.plan.def.verb);
    let path = PathFragment::new(&self.plan.path, self.support);
    let binding = if self.is_mutated() {
      quote! { let mut request }
    } else {
      quote! { let request }
    };

    tokens.extend(quote! {
      #binding = self.client.request(#method, #path);
    });
  }
}

pub(crate) struct QueryFragment<'a> {
  step: &'a QueryStep,
  support: &'a SupportPath,
}

impl<'a> QueryFragment<'a> {
  pub(crate) fn new(step: &'a QueryStep, support: &'a SupportPath) -> Self {
    Self { step, support }
  }
}

impl ToTokens for QueryFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let param = &self.step.param;
    let key = &self.step.key;
    let support = self.support;

    let statement = match &self.step.value {
      QueryValue::Scalar { optional: false } => quote! { request.query(#key, &#param); },
      QueryValue::Scalar { optional: true } => quote! { request.query_opt(#key, #param.as_ref()); },
      QueryValue::Array {
        mode,
        access,
        element_optional,
      } => {
        let mut values = match access {
          CollectionAccess::Direct => quote! { #param.iter() },
          CollectionAccess::Optional => quote! { #param.iter().flatten() },
          CollectionAccess::OptionalRef => quote! { #param.into_iter().flatten() },
        };
        if *element_optional {
          values = quote! { #values.flatten() };
        }
        let format = match mode {
          ArrayQueryMode::Separator(separator) => quote! { #support::ArrayFormat::Separator(#separator) },
          ArrayQueryMode::RepeatedKey => quote! { #support::ArrayFormat::RepeatedKey },
        };
        quote! { request.query_array(#key, #values, #format); }
      }
    };

    tokens.extend(statement);
  }
}

pub(crate) struct HeaderFragment<'a> {
  step: &'a HeaderStep,
}

impl<'a> HeaderFragment<'a> {
  pub(crate) fn new(step: &'a HeaderStep) -> Self {
    Self { step }
  }
}

impl ToTokens for HeaderFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let param = &self.step.param;
    let key = &self.step.key;
    tokens.extend(if self.step.optional {
      quote! { request.header_opt(#key, #param.as_ref()); }
    } else {
      quote! { request.header(#key, &#param); }
    });
  }
}

pub(crate) struct BodyFragment<'a> {
  step: &'a BodyStep,
  content_type: &'a str,
}

impl<'a> BodyFragment<'a> {
  pub(crate) fn new(step: &'a BodyStep, content_type: &'a str) -> Self {
    Self { step, content_type }
  }
}

impl ToTokens for BodyFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let param = &self.step.param;
    let content_type = self.content_type;

    let statement = match self.step.encoding {
      // An absent optional JSON body serializes as `null`.
      BodyEncoding::Json => quote! { request.json_body(&#param, #content_type)?; },
      BodyEncoding::Raw => {
        let value = if self.step.by_ref {
          quote! { #param.to_owned() }
        } else {
          quote! { #param }
        };
        let set = quote! { request.raw_body(#content_type, #value); };
        if self.step.optional {
          quote! {
            if let Some(#param) = #param {
              #set
            }
          }
        } else {
          set
        }
      }
    };

    tokens.extend(statement);
  }
}

/// The `Option<&CancellationToken>` expression handed to dispatch.
pub(crate) struct CancellationFragment<'a> {
  arg: Option<&'a CancellationArg>,
}

impl<'a> CancellationFragment<'a> {
  pub(crate) fn new(arg: Option<&'a CancellationArg>) -> Self {
    Self { arg }
  }
}

impl ToTokens for CancellationFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let Some(arg) = self.arg else {
      tokens.extend(quote! { None });
      return;
    };
    let param = &arg.param;
    tokens.extend(match arg.form {
      TokenForm::Owned => quote! { Some(&#param) },
      TokenForm::Borrowed => quote! { Some(#param) },
      TokenForm::Optional => quote! { #param.as_ref() },
      TokenForm::OptionalBorrowed => quote! { #param },
    });
  }
}

/// The final expression of the body, producing the method's `Result`.
pub(crate) struct DispatchFragment<'a> {
  strategy: &'a DispatchStrategy,
  cancellation: CancellationFragment<'a>,
}

impl<'a> DispatchFragment<'a> {
  pub(crate) fn new(strategy: &'a DispatchStrategy, cancellation: Option<&'a CancellationArg>) -> Self {
    Self {
      strategy,
      cancellation: CancellationFragment::new(cancellation),
    }
  }
}

impl ToTokens for DispatchFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let cancel = &self.cancellation;

    let body = match self.strategy {
      DispatchStrategy::Scalar(ty) => quote! {
        Ok(self.client.execute_json::<#ty>(request, #cancel).await?)
      },
      DispatchStrategy::Bytes(BytesKind::Vec) => quote! {
        Ok(self.client.execute_bytes(request, #cancel).await?.to_vec())
      },
      DispatchStrategy::Bytes(BytesKind::Bytes) => quote! {
        Ok(self.client.execute_bytes(request, #cancel).await?)
      },
      DispatchStrategy::File {
        param,
        overwrite,
        reports_size: true,
      } => quote! {
        Ok(self.client.download(request, &#param, #overwrite, #cancel).await?)
      },
      DispatchStrategy::File {
        param,
        overwrite,
        reports_size: false,
      } => quote! {
        self.client.download(request, &#param, #overwrite, #cancel).await?;
        Ok(())
      },
      DispatchStrategy::Void => quote! {
        self.client.execute_unit(request, #cancel).await?;
        Ok(())
      },
    };

    tokens.extend(body);
  }
}
