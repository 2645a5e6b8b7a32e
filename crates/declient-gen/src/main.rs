#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
use std::process::ExitCode;

use clap::Parser;

use crate::ui::{Cli, Colors, Commands, colors};

mod generator;
mod ui;
mod utils;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  let cli = Cli::parse();
  let colors = Colors::new(colors::colors_enabled(cli.color), colors::detect_theme(cli.theme));

  match cli.command {
    Commands::List { input } => ui::commands::list_methods(&input, &colors).await?,
    Commands::Generate(command) => {
      let config = ui::commands::GenerateConfig::from_command(command)?;
      if ui::commands::generate_code(config, &colors).await? {
        return Ok(ExitCode::FAILURE);
      }
    }
  }

  Ok(ExitCode::SUCCESS)
}
