mod client;

use quote::ToTokens;
use syn::{TraitItemFn, parse_quote};

use crate::generator::{
  ast::MethodPlan,
  converter::{MethodConverter, MethodSynthesizer},
};

fn plan(item: TraitItemFn) -> MethodPlan {
  let def = MethodConverter::new(&[]).convert(&item).unwrap();
  MethodSynthesizer::new("application/json").synthesize(&def).unwrap()
}

fn plan_with_content_type(item: TraitItemFn, content_type: &str) -> MethodPlan {
  let def = MethodConverter::new(&[]).convert(&item).unwrap();
  MethodSynthesizer::new(content_type).synthesize(&def).unwrap()
}

fn render(fragment: impl ToTokens) -> String {
  fragment.to_token_stream().to_string()
}

fn get_user() -> TraitItemFn {
  parse_quote! {
    #[get("/users/{id}")]
    async fn get_user(&self, id: u64) -> Result<User, ApiError>;
  }
}
