use quote::{ToTokens, quote};
use syn::parse_quote;

use super::{get_user, plan, render};
use crate::generator::{
  ast::{InterfaceDef, InterfaceKey, TokenKind},
  codegen::{
    SupportPath, Visibility,
    client::{ClientFragment, MethodFragment, StubFragment},
  },
};

fn interface(base_url: &str) -> InterfaceDef {
  InterfaceDef {
    key: InterfaceKey {
      source_id: "users.rs".to_string(),
      namespace: String::new(),
      name: "UserApi".to_string(),
    },
    name: parse_quote!(UserApi),
    client_name: parse_quote!(UserApiClient),
    base_url: base_url.to_string(),
    timeout_secs: 30,
    registry_group: Some("users".to_string()),
    content_type: "application/json".to_string(),
    token_kind: TokenKind::App,
    removals: vec![],
    methods: vec![],
  }
}

#[test]
fn test_method_fragment_statement_order() {
  let plan = plan(parse_quote! {
    #[post("/users/{id}/notes")]
    #[array_query("legacy")]
    #[skip_auth]
    async fn add_note(
      &self,
      id: u64,
      #[query] draft: bool,
      #[header("X-Trace")] trace: &str,
      note: &Note,
      #[ignore] hint: String,
      cancel: &CancellationToken,
    ) -> Result<Note, ApiError>;
  });
  let support = SupportPath::default();
  let output = render(MethodFragment::new(&plan, &support));

  let statements = [
    quote! { async fn add_note(&self, id: u64, draft: bool, trace: &str, note: &Note, hint: String, cancel: &CancellationToken,) -> Result<Note, ApiError> },
    quote! { let mut request = self.client.request(::declient_support::Method::POST, format!("/users/{}/notes", ::declient_support::path_param(&id))); },
    quote! { request.query("draft", &draft); },
    quote! { request.header("X-Trace", &trace); },
    quote! { request.json_body(&note, "application/json")?; },
    quote! { request.remove_query("legacy"); },
    quote! { request.skip_auth(); },
    quote! { let _ = &hint; },
    quote! { Ok(self.client.execute_json::<Note>(request, Some(cancel)).await?) },
  ];

  let mut cursor = 0;
  for statement in statements {
    let statement = statement.to_string();
    let Some(found) = output[cursor..].find(&statement) else {
      panic!("missing or out of order: {statement}\nin: {output}");
    };
    cursor += found + statement.len();
  }
}

#[test]
fn test_method_fragment_strips_annotations() {
  let plan = plan(parse_quote! {
    #[get("/users")]
    async fn list(&self, #[query("q")] term: Option<String>) -> Result<Vec<User>, ApiError>;
  });
  let support = SupportPath::default();
  let output = render(MethodFragment::new(&plan, &support));

  assert!(!output.contains("# [query"), "{output}");
  assert!(!output.contains("# [get"), "{output}");
  assert!(output.contains(&quote! { async fn list(&self, term: Option<String>) }.to_string()));
}

#[test]
fn test_stub_fragment() {
  let item: syn::TraitItemFn = parse_quote! {
    async fn broken(&self, id: u64) -> Result<User, ApiError>;
  };
  let support = SupportPath::default();
  let output = render(StubFragment::new(&item.sig, "placeholder `id` has no matching parameter", &support));

  assert!(output.contains(&quote! { #[allow(unused_variables)] }.to_string()));
  assert!(output.contains(
    &quote! {
      Err(::declient_support::ApiError::NotGenerated {
        method: "broken",
        reason: "placeholder `id` has no matching parameter",
      }
      .into())
    }
    .to_string()
  ));
}

#[test]
fn test_client_fragment_constants() {
  struct Case {
    name: &'static str,
    base_url: &'static str,
    visibility: Visibility,
    expected_contains: Vec<proc_macro2::TokenStream>,
    expected_missing: Vec<proc_macro2::TokenStream>,
  }

  let cases = [
    Case {
      name: "with base url",
      base_url: "https://api.example.com",
      visibility: Visibility::Public,
      expected_contains: vec![
        quote! { pub const BASE_URL: &'static str = "https://api.example.com"; },
        quote! { pub const REGISTRY_GROUP: Option<&'static str> = Some("users"); },
        quote! { pub const TIMEOUT_SECS: u64 = 30u64; },
        quote! { pub const TOKEN_KIND: ::declient_support::TokenKind = ::declient_support::TokenKind::App; },
        quote! { pub fn new() -> Result<Self, ::declient_support::ApiError> },
      ],
      expected_missing: vec![],
    },
    Case {
      name: "runtime base url",
      base_url: "",
      visibility: Visibility::Crate,
      expected_contains: vec![
        quote! { pub(crate) const CONTENT_TYPE: &'static str = "application/json"; },
        quote! { pub(crate) fn with_base_url(base_url: impl Into<String>) },
      ],
      expected_missing: vec![quote! { BASE_URL: }, quote! { fn new() }],
    },
  ];

  let support = SupportPath::default();
  for case in cases {
    let def = interface(case.base_url);
    let output = render(ClientFragment::new(&def, vec![], case.visibility, &support));
    for expected in &case.expected_contains {
      assert!(
        output.contains(&expected.to_string()),
        "{}: missing {expected}\nin: {output}",
        case.name
      );
    }
    for missing in &case.expected_missing {
      assert!(
        !output.contains(&missing.to_string()),
        "{}: unexpected {missing}",
        case.name
      );
    }
  }
}

#[test]
fn test_client_fragment_trait_impl() {
  let def = interface("https://api.example.com");
  let support = SupportPath::default();
  let plan = plan(get_user());
  let method = MethodFragment::new(&plan, &support).to_token_stream();
  let tokens = ClientFragment::new(&def, vec![method], Visibility::Public, &support).to_token_stream();
  let output = tokens.to_string();

  assert!(output.contains(&quote! { pub struct UserApiClient { client: ::declient_support::ApiClient, } }.to_string()));
  assert!(output.contains("impl UserApi for UserApiClient"));
  assert!(output.contains("async fn get_user"));

  let file: syn::File = syn::parse2(tokens).unwrap();
  assert_eq!(file.items.len(), 3);
}
