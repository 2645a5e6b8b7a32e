use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::Signature;

use super::{
  SupportPath, Visibility,
  request::{BodyFragment, DispatchFragment, HeaderFragment, QueryFragment, RequestInitFragment},
};
use crate::generator::ast::{InterfaceDef, MethodPlan, TokenKind};

/// One implemented trait method: request construction followed by dispatch.
pub(crate) struct MethodFragment<'a> {
  plan: &'a MethodPlan,
  support: &'a SupportPath,
}

impl<'a> MethodFragment<'a> {
  pub(crate) fn new(plan: &'a MethodPlan, support: &'a SupportPath) -> Self {
    Self { plan, support }
  }
}

impl ToTokens for MethodFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let plan = self.plan;
    let signature = &plan.def.signature;

    let init = RequestInitFragment::new(plan, self.support);
    let query = plan.query.iter().map(|step| QueryFragment::new(step, self.support));
    let headers = plan.headers.iter().map(HeaderFragment::new);
    let body = plan.body.as_ref().map(|step| BodyFragment::new(step, &plan.content_type));
    let removals = &plan.removals;
    let skip_auth = plan.def.skip_auth.then(|| quote! { request.skip_auth(); });
    let ignored = &plan.ignored;
    let dispatch = DispatchFragment::new(&plan.dispatch, plan.cancellation.as_ref());

    tokens.extend(quote! {
      #signature {
        #init
        #(#query)*
        #(#headers)*
        #body
        #(request.remove_query(#removals);)*
        #skip_auth
        #(let _ = &#ignored;)*
        #dispatch
      }
    });
  }
}

/// Body for a method that could not be described; fails at call time.
pub(crate) struct StubFragment<'a> {
  signature: &'a Signature,
  reason: String,
  support: &'a SupportPath,
}

impl<'a> StubFragment<'a> {
  pub(crate) fn new(signature: &'a Signature, reason: impl Into<String>, support: &'a SupportPath) -> Self {
    Self {
      signature,
      reason: reason.into(),
      support,
    }
  }
}

impl ToTokens for StubFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let signature = self.signature;
    let method = signature.ident.to_string();
    let reason = &self.reason;
    let support = self.support;

    tokens.extend(quote! {
      #[allow(unused_variables)]
      #signature {
        Err(#support::ApiError::NotGenerated {
          method: #method,
          reason: #reason,
        }
        .into())
      }
    });
  }
}

/// Struct, constants, constructors and trait impl for one interface.
pub(crate) struct ClientFragment<'a> {
  def: &'a InterfaceDef,
  methods: Vec<TokenStream>,
  visibility: Visibility,
  support: &'a SupportPath,
}

impl<'a> ClientFragment<'a> {
  pub(crate) fn new(
    def: &'a InterfaceDef,
    methods: Vec<TokenStream>,
    visibility: Visibility,
    support: &'a SupportPath,
  ) -> Self {
    Self {
      def,
      methods,
      visibility,
      support,
    }
  }

  fn struct_tokens(&self) -> TokenStream {
    let vis = self.visibility.to_tokens();
    let name = &self.def.client_name;
    let support = self.support;
    let doc = format!(" HTTP client implementing [`{}`].", self.def.name);

    quote! {
      #[doc = #doc]
      #[derive(Debug, Clone)]
      #vis struct #name {
        client: #support::ApiClient,
      }
    }
  }

  fn constants(&self) -> TokenStream {
    let vis = self.visibility.to_tokens();
    let support = self.support;
    let def = self.def;

    let base_url = (!def.base_url.is_empty()).then(|| {
      let base_url = &def.base_url;
      quote! { #vis const BASE_URL: &'static str = #base_url; }
    });
    let registry_group = match &def.registry_group {
      Some(group) => quote! { Some(#group) },
      None => quote! { None },
    };
    let timeout = def.timeout_secs;
    let content_type = &def.content_type;
    let token_kind = match def.token_kind {
      TokenKind::Tenant => format_ident!("Tenant"),
      TokenKind::App => format_ident!("App"),
      TokenKind::User => format_ident!("User"),
    };

    quote! {
      #base_url
      #vis const REGISTRY_GROUP: Option<&'static str> = #registry_group;
      #vis const TIMEOUT_SECS: u64 = #timeout;
      #vis const CONTENT_TYPE: &'static str = #content_type;
      #vis const TOKEN_KIND: #support::TokenKind = #support::TokenKind::#token_kind;
    }
  }

  fn constructors(&self) -> TokenStream {
    let vis = self.visibility.to_tokens();
    let support = self.support;

    let new = (!self.def.base_url.is_empty()).then(|| {
      quote! {
        /// Client against [`Self::BASE_URL`].
        #vis fn new() -> Result<Self, #support::ApiError> {
          Self::with_base_url(Self::BASE_URL)
        }
      }
    });

    quote! {
      #new

      #vis fn with_base_url(base_url: impl Into<String>) -> Result<Self, #support::ApiError> {
        let client = #support::ApiClient::builder()
          .base_url(base_url)
          .timeout(::std::time::Duration::from_secs(Self::TIMEOUT_SECS))
          .token_kind(Self::TOKEN_KIND)
          .build()?;
        Ok(Self { client })
      }

      /// Wraps a preconfigured runtime client, e.g. one with a token provider.
      #[must_use]
      #vis fn with_client(client: #support::ApiClient) -> Self {
        Self { client }
      }

      #[must_use]
      #vis fn client(&self) -> &#support::ApiClient {
        &self.client
      }
    }
  }
}

impl ToTokens for ClientFragment<'_> {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let client_struct = self.struct_tokens();
    let constants = self.constants();
    let constructors = self.constructors();
    let name = &self.def.client_name;
    let trait_name = &self.def.name;
    let methods = &self.methods;

    tokens.extend(quote! {
      #client_struct

      impl #name {
        #constants

        #constructors
      }

      impl #trait_name for #name {
        #(#methods)*
      }
    });
  }
}
