use std::{
  collections::HashSet,
  path::{Path, PathBuf},
};

use chrono::{Local, Timelike};
use crossterm::style::Stylize;
use itertools::Itertools;

use crate::{
  generator::{
    codegen::Visibility,
    config::CodegenConfig,
    diagnostics::{Diagnostic, DiagnosticReporter},
    metrics::GenerationStats,
    orchestrator::{GeneratedFile, Orchestrator},
  },
  ui::{Colors, GenerateCommand},
  utils::{SourceFile, SourceLoader},
};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub inputs: Vec<PathBuf>,
  pub output: PathBuf,
  pub visibility: Visibility,
  pub support_crate: String,
  pub diagnostics: Option<PathBuf>,
  pub verbose: bool,
  pub quiet: bool,
  pub only_interfaces: Option<HashSet<String>>,
  pub excluded_interfaces: Option<HashSet<String>>,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      input,
      output,
      visibility,
      support_crate,
      diagnostics,
      only,
      exclude,
      verbose,
      quiet,
    } = command;

    let Some(visibility) = Visibility::parse(&visibility) else {
      anyhow::bail!("Invalid visibility '{visibility}': expected public, crate or file");
    };

    Ok(Self {
      inputs: input.into_iter().unique().collect(),
      output,
      visibility,
      support_crate,
      diagnostics,
      verbose,
      quiet,
      only_interfaces: only.map(|names| names.into_iter().collect()),
      excluded_interfaces: exclude.map(|names| names.into_iter().collect()),
    })
  }

  fn codegen_config(&self) -> CodegenConfig {
    CodegenConfig::builder()
      .visibility(self.visibility)
      .support_path(self.support_crate.clone())
      .maybe_only(self.only_interfaces.clone())
      .maybe_exclude(self.excluded_interfaces.clone())
      .build()
  }

  /// A single input with an `.rs` output is written to that file; anything
  /// else treats the output as a directory.
  fn writes_single_file(&self) -> bool {
    self.inputs.len() == 1 && self.output.extension().is_some_and(|ext| ext == "rs")
  }

  fn output_targets<'a>(&self, files: &'a [GeneratedFile]) -> anyhow::Result<Vec<(PathBuf, &'a GeneratedFile)>> {
    if self.writes_single_file() {
      return Ok(files.iter().map(|file| (self.output.clone(), file)).collect());
    }

    let mut stems = HashSet::new();
    files
      .iter()
      .map(|file| {
        if !stems.insert(file.stem.as_str()) {
          anyhow::bail!(
            "Output name collision: more than one input is named '{}.rs' ({})",
            file.stem,
            file.source_id
          );
        }
        Ok((self.output.join(format!("{}.rs", file.stem)), file))
      })
      .collect()
  }

  async fn load_sources(&self, logger: &GenerateLogger<'_>) -> anyhow::Result<Vec<SourceFile>> {
    let mut sources = Vec::with_capacity(self.inputs.len());
    for input in &self.inputs {
      logger.log_loading(input);
      sources.push(SourceLoader::open(input).await?.load()?);
    }
    Ok(sources)
  }

  async fn write_output(&self, files: &[GeneratedFile]) -> anyhow::Result<()> {
    let targets = self.output_targets(files)?;
    if !self.writes_single_file() {
      tokio::fs::create_dir_all(&self.output).await?;
    }
    for (path, file) in targets {
      if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
      }
      tokio::fs::write(&path, &file.code).await?;
    }
    Ok(())
  }

  async fn write_diagnostics(&self, path: &Path, reporter: &DiagnosticReporter) -> anyhow::Result<()> {
    let report = serde_json::to_string_pretty(reporter.diagnostics())?;
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, report).await?;
    Ok(())
  }
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self, input: &Path) {
    self.info(
      &format!("Loading declarations from: {}", input.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_generating(&self) {
    self.info(&"Generating client implementations...".with(self.colors.primary()).to_string());
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    self.stat("Files processed:", stats.files_processed.to_string());
    self.stat("Interfaces found:", stats.interfaces_found.to_string());
    self.stat("Clients generated:", stats.clients_generated.to_string());
    self.stat("Methods generated:", stats.methods_generated.to_string());
    if stats.stubs_generated > 0 {
      self.stat("", format!("{} not generated (stubs)", stats.stubs_generated));
    }
    if stats.defaulted_methods > 0 {
      self.stat("", format!("{} default bodies kept", stats.defaulted_methods));
    }
    if stats.interfaces_excluded > 0 {
      self.stat("Interfaces excluded:", stats.interfaces_excluded.to_string());
    }
    if stats.duplicates_skipped > 0 {
      self.stat("Duplicates skipped:", stats.duplicates_skipped.to_string());
    }
    if stats.errors > 0 || stats.warnings > 0 {
      self.stat("Diagnostics:", format!("{} errors, {} warnings", stats.errors, stats.warnings));
    }

    if self.config.verbose {
      for (name, counts) in &stats.per_interface {
        println!(
          "              {}: {} methods, {} stubs, {} defaulted",
          name.as_str().with(self.colors.accent()),
          counts.methods,
          counts.stubs,
          counts.defaulted
        );
      }
    }
  }

  /// Unit-level diagnostics mean an interface was skipped and always print;
  /// method-level ones print with `--verbose`.
  fn print_diagnostics(&self, reporter: &DiagnosticReporter) {
    let mut printed_header = false;
    for diagnostic in reporter.diagnostics() {
      let skipped = diagnostic.method_name.is_none();
      if !(skipped || self.config.verbose) {
        continue;
      }

      if !printed_header && !self.config.quiet {
        println!();
        printed_header = true;
      }
      self.print_diagnostic(diagnostic, skipped);
    }
  }

  fn print_diagnostic(&self, diagnostic: &Diagnostic, skipped: bool) {
    let label = if skipped {
      "Skipped:".to_string()
    } else {
      format!("{}:", diagnostic.severity)
    };
    eprintln!(
      "{} {}",
      label.with(self.colors.severity(diagnostic.severity)),
      diagnostic.to_string().with(self.colors.primary())
    );
  }

  fn log_writing(&self) {
    self.info(
      &format!("Writing to: {}", self.config.output.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_finished(&self, has_errors: bool) {
    if self.config.quiet {
      return;
    }
    let (message, color) = if has_errors {
      ("Generated client code with errors", self.colors.error())
    } else {
      ("Successfully generated client code", self.colors.success())
    };
    println!();
    println!("{} {}", format_timestamp().with(self.colors.timestamp()), message.with(color));
  }
}

/// Runs the generator and writes its output.
///
/// Returns whether any error diagnostic was reported; the files are
/// written either way.
pub async fn generate_code(config: GenerateConfig, colors: &Colors) -> anyhow::Result<bool> {
  let logger = GenerateLogger::new(&config, colors);

  let sources = config.load_sources(&logger).await?;

  logger.log_generating();
  let orchestrator = Orchestrator::new(sources, config.codegen_config())?;
  let output = orchestrator.generate_with_header()?;
  logger.print_statistics(&output.stats);
  logger.print_diagnostics(&output.diagnostics);

  logger.log_writing();
  config.write_output(&output.files).await?;
  if let Some(path) = &config.diagnostics {
    config.write_diagnostics(path, &output.diagnostics).await?;
  }

  let has_errors = output.stats.has_errors();
  logger.log_finished(has_errors);
  Ok(has_errors)
}
