use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Item, ItemTrait, Signature, TraitItem, ext::IdentExt};

use super::methods::{MethodConverter, MethodSynthesizer};
use crate::generator::{
  ast::{InterfaceDef, InterfaceKey, MethodPlan},
  codegen::{
    SupportPath,
    client::{ClientFragment, MethodFragment, StubFragment},
  },
  config::CodegenConfig,
  declarations::{InterfaceAttrs, MethodAttrs, RawInterface, strip_signature, strip_trait},
  diagnostics::DiagnosticReporter,
  errors::{GenerationError, SignatureError},
  metrics::UnitCounts,
};

/// Output for one interface: the cleaned trait, plus its client when every
/// method signature could be implemented.
#[derive(Debug, Clone)]
pub(crate) struct ImplementationUnit {
  pub key: InterfaceKey,
  pub code: String,
  pub client_generated: bool,
  pub counts: UnitCounts,
  pub diagnostics: DiagnosticReporter,
}

impl ImplementationUnit {
  pub(crate) fn items(&self) -> syn::Result<Vec<Item>> {
    Ok(syn::parse_file(&self.code)?.items)
  }
}

/// What a trait method becomes in the generated impl.
#[derive(Debug)]
pub(crate) enum MethodSlot {
  Described(Box<MethodPlan>),
  /// Failed classification, path resolution or synthesis; compiled as a
  /// body returning `ApiError::NotGenerated`.
  Stub { signature: Signature, reason: String },
  /// Has a default body and no verb, so the trait's own body is kept.
  Defaulted,
}

pub(crate) struct InterfaceSynthesizer<'a> {
  config: &'a CodegenConfig,
  support: SupportPath,
}

impl<'a> InterfaceSynthesizer<'a> {
  /// # Errors
  ///
  /// Fails when the configured support path is not a valid Rust path.
  pub(crate) fn new(config: &'a CodegenConfig) -> syn::Result<Self> {
    Ok(Self {
      config,
      support: SupportPath::parse(&config.support_path)?,
    })
  }

  pub(crate) fn synthesize(&self, raw: &RawInterface) -> ImplementationUnit {
    let interface_name = raw.key.qualified_name();
    let mut diagnostics = DiagnosticReporter::new();

    let item = match raw.parse() {
      Ok(item) => item,
      Err(err) => {
        diagnostics.report_error(&interface_name, None, &err.into());
        return Self::unit(raw, String::new(), false, UnitCounts::default(), diagnostics);
      }
    };

    let mut cleaned = item.clone();
    strip_trait(&mut cleaned);

    let Some((def, slots)) = self.describe(&raw.key, &item, &mut diagnostics) else {
      return Self::unit(raw, cleaned.to_token_stream().to_string(), false, UnitCounts::default(), diagnostics);
    };

    let counts = slots.iter().fold(UnitCounts::default(), |mut counts, slot| {
      match slot {
        MethodSlot::Described(_) => counts.methods += 1,
        MethodSlot::Stub { .. } => counts.stubs += 1,
        MethodSlot::Defaulted => counts.defaulted += 1,
      }
      counts
    });

    let client = self.assemble(&def, &slots);
    let code = quote! { #cleaned #client }.to_string();
    Self::unit(raw, code, true, counts, diagnostics)
  }

  /// The interface without a client, for interfaces filtered out of the run.
  pub(crate) fn passthrough(raw: &RawInterface) -> ImplementationUnit {
    let mut diagnostics = DiagnosticReporter::new();
    let code = match raw.parse() {
      Ok(mut item) => {
        strip_trait(&mut item);
        item.to_token_stream().to_string()
      }
      Err(err) => {
        diagnostics.report_error(&raw.key.qualified_name(), None, &err.into());
        String::new()
      }
    };
    Self::unit(raw, code, false, UnitCounts::default(), diagnostics)
  }

  /// Builds the interface descriptor and a slot per method.
  ///
  /// Returns `None` when the client cannot be generated at all; the reason
  /// has been reported.
  fn describe(
    &self,
    key: &InterfaceKey,
    item: &ItemTrait,
    diagnostics: &mut DiagnosticReporter,
  ) -> Option<(InterfaceDef, Vec<MethodSlot>)> {
    let interface_name = key.qualified_name();

    let attrs = match InterfaceAttrs::from_attrs(&item.attrs) {
      Ok(attrs) => attrs,
      Err(err) => {
        diagnostics.report_error(&interface_name, None, &err.into());
        return None;
      }
    };
    if let Err(err) = check_trait(item) {
      diagnostics.report_error(&interface_name, None, &err.into());
      return None;
    }

    let converter = MethodConverter::new(&attrs.removals);
    let synthesizer = MethodSynthesizer::new(&attrs.content_type);
    let mut blocked = false;
    let mut methods = vec![];
    let mut slots = vec![];

    for trait_item in &item.items {
      let TraitItem::Fn(method) = trait_item else {
        continue;
      };

      let verbless = matches!(MethodAttrs::from_attrs(&method.attrs), Ok(MethodAttrs { verb: None, .. }));
      if method.default.is_some() && verbless {
        slots.push(MethodSlot::Defaulted);
        continue;
      }

      match converter.convert(method).and_then(|def| synthesizer.synthesize(&def)) {
        Ok(plan) => {
          methods.push(plan.def.clone());
          slots.push(MethodSlot::Described(Box::new(plan)));
        }
        Err(err) => {
          let method_name = method.sig.ident.to_string();
          diagnostics.report_error(&interface_name, Some(&method_name), &err);
          if err.blocks_interface() {
            blocked = true;
            continue;
          }
          let mut signature = method.sig.clone();
          strip_signature(&mut signature);
          slots.push(MethodSlot::Stub {
            signature,
            reason: err.to_string(),
          });
        }
      }
    }

    if blocked {
      return None;
    }

    let def = InterfaceDef {
      key: key.clone(),
      name: item.ident.clone(),
      client_name: attrs
        .name
        .unwrap_or_else(|| format_ident!("{}Client", item.ident.unraw())),
      base_url: attrs.base_url,
      timeout_secs: attrs.timeout_secs,
      registry_group: attrs.registry_group,
      content_type: attrs.content_type,
      token_kind: attrs.token_kind,
      removals: attrs.removals,
      methods,
    };

    Some((def, slots))
  }

  /// Client struct, constructors and trait impl for a described interface.
  pub(crate) fn assemble(&self, def: &InterfaceDef, slots: &[MethodSlot]) -> TokenStream {
    let methods = slots
      .iter()
      .filter_map(|slot| match slot {
        MethodSlot::Described(plan) => Some(MethodFragment::new(plan, &self.support).into_token_stream()),
        MethodSlot::Stub { signature, reason } => {
          Some(StubFragment::new(signature, reason.clone(), &self.support).into_token_stream())
        }
        MethodSlot::Defaulted => None,
      })
      .collect();

    ClientFragment::new(def, methods, self.config.visibility, &self.support).into_token_stream()
  }

  fn unit(
    raw: &RawInterface,
    code: String,
    client_generated: bool,
    counts: UnitCounts,
    diagnostics: DiagnosticReporter,
  ) -> ImplementationUnit {
    ImplementationUnit {
      key: raw.key.clone(),
      code,
      client_generated,
      counts,
      diagnostics,
    }
  }
}

/// Trait-level shapes that no generated impl can satisfy.
fn check_trait(item: &ItemTrait) -> Result<(), GenerationError> {
  if !item.generics.params.is_empty() {
    return Err(SignatureError::GenericTrait.into());
  }
  if !item.supertraits.is_empty() {
    return Err(SignatureError::Supertraits.into());
  }

  for trait_item in &item.items {
    let unsupported = match trait_item {
      TraitItem::Type(ty) => Some(format!("associated type `{}`", ty.ident)),
      TraitItem::Const(constant) if constant.default.is_none() => {
        Some(format!("associated const `{}` without a value", constant.ident))
      }
      TraitItem::Macro(_) => Some("macro invocation".to_string()),
      TraitItem::Fn(_) | TraitItem::Const(_) => None,
      _ => Some("unrecognized item".to_string()),
    };
    if let Some(description) = unsupported {
      return Err(SignatureError::UnsupportedItem(description).into());
    }
  }

  Ok(())
}
