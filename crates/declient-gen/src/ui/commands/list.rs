use std::path::PathBuf;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::{
  generator::{
    config::CodegenConfig,
    orchestrator::{MethodListing, Orchestrator},
  },
  ui::{Colors, colors::IntoComfyColor, term_width},
  utils::SourceLoader,
};

const HEADERS: [&str; 5] = ["INTERFACE", "METHOD", "VERB", "PATH", "RETURNS"];

fn build_table(rows: Vec<MethodListing>, colors: &Colors, width: u16) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(width);

  let mut header = Row::new();
  for title in HEADERS {
    header.add_cell(Cell::new(title).fg(IntoComfyColor::into(colors.label())));
  }
  table.set_header(header);

  for listing in rows {
    let returns_color = if listing.returns.starts_with("error:") {
      colors.error()
    } else {
      colors.info()
    };

    let mut row = Row::new();
    row.add_cell(Cell::new(listing.interface).fg(IntoComfyColor::into(colors.primary())));
    row.add_cell(
      Cell::new(listing.method)
        .fg(IntoComfyColor::into(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(
      Cell::new(listing.verb)
        .fg(IntoComfyColor::into(colors.accent()))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(listing.path).fg(IntoComfyColor::into(colors.primary())));
    row.add_cell(Cell::new(listing.returns).fg(IntoComfyColor::into(returns_color)));
    table.add_row(row);
  }

  table
}

pub async fn list_methods(inputs: &[PathBuf], colors: &Colors) -> anyhow::Result<()> {
  let mut sources = Vec::with_capacity(inputs.len());
  for input in inputs {
    sources.push(SourceLoader::open(input).await?.load()?);
  }

  let rows = Orchestrator::new(sources, CodegenConfig::default())?.list()?;
  println!("{}", build_table(rows, colors, term_width()));

  Ok(())
}
