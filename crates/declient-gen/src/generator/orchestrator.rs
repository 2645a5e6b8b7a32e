//! Orchestration for the declaration to client generation pipeline.
//!
//! The orchestrator owns the parsed inputs and the read-only configuration
//! and drives four stages, each parallel over its own unit of work:
//!
//! 1. discovery: every declaration file is parsed and its `#[http_api]`
//!    traits are extracted as [`RawInterface`]s;
//! 2. de-duplication by [`InterfaceKey`];
//! 3. synthesis: one [`ImplementationUnit`] per interface;
//! 4. assembly: each file is rewritten with its units spliced in place of
//!    the declared traits, then formatted.
//!
//! Syntax trees never cross threads; stages exchange source text.
//!
//! ## Usage
//!
//! ```no_run
//! use declient_gen::generator::{config::CodegenConfig, orchestrator::Orchestrator};
//! use declient_gen::utils::SourceFile;
//!
//! # fn example() -> anyhow::Result<()> {
//! let source = SourceFile::new("users.rs", std::fs::read_to_string("users.rs")?);
//! let orchestrator = Orchestrator::new(vec![source], CodegenConfig::default())?;
//! let output = orchestrator.generate_with_header()?;
//!
//! for file in &output.files {
//!   std::fs::write(format!("{}.rs", file.stem), &file.code)?;
//! }
//! # Ok(())
//! # }
//! ```

use std::{
  collections::{HashMap, HashSet},
  sync::{Mutex, PoisonError},
};

use anyhow::Context as _;
use rayon::prelude::*;
use syn::TraitItem;

use crate::{
  generator::{
    ast::InterfaceKey,
    codegen::SupportPath,
    config::CodegenConfig,
    converter::{ImplementationUnit, InterfaceSynthesizer, MethodConverter},
    declarations::{DeclarationFile, InterfaceAttrs, RawInterface, SkippedItem},
    diagnostics::DiagnosticReporter,
    errors::GenerationError,
    metrics::GenerationStats,
  },
  utils::SourceFile,
};

/// Formatted output for one declaration file.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
  pub source_id: String,
  pub stem: String,
  pub code: String,
}

#[derive(Debug, Clone)]
pub struct GenerationOutput {
  pub files: Vec<GeneratedFile>,
  pub stats: GenerationStats,
  pub diagnostics: DiagnosticReporter,
}

/// One row of the `list` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodListing {
  pub interface: String,
  pub method: String,
  pub verb: String,
  pub path: String,
  pub returns: String,
}

pub struct Orchestrator {
  sources: Vec<SourceFile>,
  config: CodegenConfig,
}

impl Orchestrator {
  /// # Errors
  ///
  /// Fails when the configured support path is not a valid Rust path.
  pub fn new(sources: Vec<SourceFile>, config: CodegenConfig) -> anyhow::Result<Self> {
    SupportPath::parse(&config.support_path)
      .with_context(|| format!("invalid support crate path `{}`", config.support_path))?;
    Ok(Self { sources, config })
  }

  /// Generates every file without headers.
  ///
  /// Malformed declarations never fail the run: they are reported in
  /// [`GenerationOutput::diagnostics`] and the affected unit is skipped.
  ///
  /// # Errors
  ///
  /// Only internal failures (generated code that does not re-parse) are
  /// returned as errors.
  pub fn generate(&self) -> anyhow::Result<GenerationOutput> {
    let mut stats = GenerationStats::default();
    let mut diagnostics = DiagnosticReporter::new();

    let discovered = self.discover();
    let mut raws = vec![];
    for (index, (source, result)) in self.sources.iter().zip(discovered).enumerate() {
      stats.record_file();
      match result {
        Ok((found, skipped)) => {
          for item in skipped {
            diagnostics.report_error(
              &source.id,
              None,
              &GenerationError::Unsupported {
                name: item.name,
                reason: format!("`#[http_api]` is only valid on a trait, not a {}", item.kind),
              },
            );
          }
          raws.extend(found.into_iter().map(|raw| (index, raw)));
        }
        Err(err) => diagnostics.report_error(&source.id, None, &err),
      }
    }

    let (unique, duplicates) = Self::deduplicate(raws);
    for _ in &duplicates {
      stats.record_duplicate();
    }

    let owners: HashMap<InterfaceKey, usize> = unique.iter().map(|(index, raw)| (raw.key.clone(), *index)).collect();
    let unique: Vec<RawInterface> = unique.into_iter().map(|(_, raw)| raw).collect();

    let mut units = self.synthesize(&unique)?;
    units.sort_by(|a, b| a.key.cmp(&b.key));

    for unit in &units {
      if self.config.includes(&unit.key) {
        stats.record_interface(&unit.key.qualified_name(), unit.client_generated, unit.counts);
      } else {
        stats.record_excluded();
      }
      diagnostics.merge(unit.diagnostics.clone());
    }
    stats.record_diagnostics(&diagnostics);

    let units: HashMap<InterfaceKey, ImplementationUnit> = units.into_iter().map(|unit| (unit.key.clone(), unit)).collect();
    let files = self.assemble(&units, &owners)?;

    Ok(GenerationOutput {
      files,
      stats,
      diagnostics,
    })
  }

  /// Generates every file, each prefixed with an auto-generated header.
  ///
  /// # Errors
  ///
  /// Returns the same errors as [`Self::generate`].
  pub fn generate_with_header(&self) -> anyhow::Result<GenerationOutput> {
    let mut output = self.generate()?;
    for file in &mut output.files {
      file.code = format!(
        r"//! AUTO-GENERATED CODE - DO NOT EDIT!
//!
//! Source: {}
//! Generated by `declient-gen` v{}

{}",
        file.source_id,
        env!("CARGO_PKG_VERSION"),
        file.code
      );
    }
    Ok(output)
  }

  /// Every declared method with its verb, path and return shape.
  ///
  /// Methods that fail to convert are listed with the failure in place of
  /// the return shape.
  ///
  /// # Errors
  ///
  /// Fails when a declaration file does not parse.
  pub fn list(&self) -> anyhow::Result<Vec<MethodListing>> {
    let mut rows = vec![];

    for source in &self.sources {
      let file = DeclarationFile::parse(&source.id, &source.text).with_context(|| format!("failed to parse {}", source.id))?;

      for (key, item) in file.interfaces() {
        let interface = key.qualified_name();
        let removals = match InterfaceAttrs::from_attrs(&item.attrs) {
          Ok(attrs) => attrs.removals,
          Err(err) => {
            rows.push(MethodListing::failed(&interface, "-", &err.to_string()));
            continue;
          }
        };
        let converter = MethodConverter::new(&removals);

        for trait_item in &item.items {
          let TraitItem::Fn(method) = trait_item else {
            continue;
          };
          let name = method.sig.ident.to_string();
          match converter.convert(method) {
            Ok(def) => rows.push(MethodListing {
              interface: interface.clone(),
              method: name,
              verb: def.verb.to_string(),
              path: def.path.template().to_string(),
              returns: def.return_shape.label(),
            }),
            Err(_) if method.default.is_some() => rows.push(MethodListing {
              interface: interface.clone(),
              method: name,
              verb: "-".to_string(),
              path: "-".to_string(),
              returns: "default body".to_string(),
            }),
            Err(err) => rows.push(MethodListing::failed(&interface, &name, &err.to_string())),
          }
        }
      }
    }

    Ok(rows)
  }

  fn discover(&self) -> Vec<Result<(Vec<RawInterface>, Vec<SkippedItem>), GenerationError>> {
    self
      .sources
      .par_iter()
      .map(|source| {
        DeclarationFile::parse(&source.id, &source.text)
          .map(|file| (file.raw_interfaces(), file.skipped_items()))
          .map_err(GenerationError::from)
      })
      .collect()
  }

  /// Splits interfaces into first occurrences and repeats of a key.
  ///
  /// The first occurrence is the earliest in input order, whichever worker
  /// reaches the key first.
  fn deduplicate(raws: Vec<(usize, RawInterface)>) -> (Vec<(usize, RawInterface)>, Vec<RawInterface>) {
    let first = Mutex::new(HashMap::<InterfaceKey, usize>::new());
    raws.par_iter().enumerate().for_each(|(position, (_, raw))| {
      if let Ok(mut first) = first.lock() {
        first
          .entry(raw.key.clone())
          .and_modify(|seen| *seen = (*seen).min(position))
          .or_insert(position);
      }
    });
    let first = first.into_inner().unwrap_or_else(PoisonError::into_inner);

    let mut unique = vec![];
    let mut duplicates = vec![];
    for (position, (index, raw)) in raws.into_iter().enumerate() {
      if first.get(&raw.key) == Some(&position) {
        unique.push((index, raw));
      } else {
        duplicates.push(raw);
      }
    }
    (unique, duplicates)
  }

  fn synthesize(&self, raws: &[RawInterface]) -> anyhow::Result<Vec<ImplementationUnit>> {
    raws
      .par_iter()
      .map(|raw| {
        if !self.config.includes(&raw.key) {
          return Ok(InterfaceSynthesizer::passthrough(raw));
        }
        let synthesizer = InterfaceSynthesizer::new(&self.config)?;
        Ok(synthesizer.synthesize(raw))
      })
      .collect()
  }

  /// Rewrites each file, splicing in the units it owns. Traits whose key is
  /// owned by another file are dropped.
  fn assemble(
    &self,
    units: &HashMap<InterfaceKey, ImplementationUnit>,
    owners: &HashMap<InterfaceKey, usize>,
  ) -> anyhow::Result<Vec<GeneratedFile>> {
    let files: Vec<Option<GeneratedFile>> = self
      .sources
      .par_iter()
      .enumerate()
      .map(|(index, source)| -> anyhow::Result<Option<GeneratedFile>> {
        let Ok(file) = DeclarationFile::parse(&source.id, &source.text) else {
          return Ok(None);
        };

        let mut emitted = HashSet::new();
        let ast = file
          .rewrite(|key| {
            if owners.get(key) != Some(&index) || !emitted.insert(key.clone()) {
              return Ok(vec![]);
            }
            units.get(key).map_or(Ok(vec![]), ImplementationUnit::items)
          })
          .with_context(|| format!("generated code for {} does not parse", source.id))?;

        Ok(Some(GeneratedFile {
          source_id: source.id.clone(),
          stem: source.stem.clone(),
          code: prettyplease::unparse(&ast),
        }))
      })
      .collect::<anyhow::Result<_>>()?;

    Ok(files.into_iter().flatten().collect())
  }
}

impl MethodListing {
  fn failed(interface: &str, method: &str, message: &str) -> Self {
    Self {
      interface: interface.to_string(),
      method: method.to_string(),
      verb: "-".to_string(),
      path: "-".to_string(),
      returns: format!("error: {message}"),
    }
  }
}
