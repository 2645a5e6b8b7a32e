use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "declient-gen")]
#[command(author, version, about = "Compiles declarative HTTP API traits into client implementations")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List the declared interfaces and their methods
  List {
    /// Declaration files to inspect
    #[arg(short, long, value_name = "FILE", num_args = 1.., required = true)]
    input: Vec<PathBuf>,
  },
  /// Generate client implementations for every `#[http_api]` trait
  Generate(GenerateCommand),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
  /// Declaration files to compile
  #[arg(short, long, value_name = "FILE", num_args = 1.., required = true)]
  pub input: Vec<PathBuf>,

  /// Output file (single input ending in `.rs`) or directory
  #[arg(short, long, value_name = "PATH")]
  pub output: PathBuf,

  /// Visibility of generated clients (public, crate or file)
  #[arg(long, value_name = "VISIBILITY", default_value = "public")]
  pub visibility: String,

  /// Path of the runtime crate as seen from generated code
  #[arg(long, value_name = "PATH", default_value = "::declient_support")]
  pub support_crate: String,

  /// Write all diagnostics as JSON to this file
  #[arg(long, value_name = "FILE")]
  pub diagnostics: Option<PathBuf>,

  /// Generate clients only for these traits (comma-separated names)
  #[arg(long, value_name = "TRAITS", value_delimiter = ',')]
  pub only: Option<Vec<String>>,

  /// Skip client generation for these traits (comma-separated names)
  #[arg(long, value_name = "TRAITS", value_delimiter = ',')]
  pub exclude: Option<Vec<String>>,

  /// Enable verbose output with every diagnostic and per-interface stats
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
  pub quiet: bool,
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_generate_arguments() {
    let cli = Cli::try_parse_from([
      "declient-gen",
      "generate",
      "-i",
      "users.rs",
      "orders.rs",
      "-o",
      "out",
      "--only",
      "UserApi,OrderApi",
      "--support-crate",
      "crate::runtime",
    ])
    .unwrap();

    let Commands::Generate(command) = cli.command else {
      panic!("expected generate");
    };
    assert_eq!(command.input.len(), 2);
    assert_eq!(command.output, PathBuf::from("out"));
    assert_eq!(command.only, Some(vec!["UserApi".to_string(), "OrderApi".to_string()]));
    assert_eq!(command.support_crate, "crate::runtime");
    assert_eq!(command.visibility, "public");
  }

  #[test]
  fn test_rejects_quiet_with_verbose() {
    let result = Cli::try_parse_from(["declient-gen", "generate", "-i", "a.rs", "-o", "a_gen.rs", "-q", "-v"]);
    assert!(result.is_err());
  }
}
