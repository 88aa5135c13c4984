use crate::core::species::Catalog;
use clap::{Args, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Table,
    Plain,
}

#[derive(Args, Debug)]
pub struct ListSpeciesArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: ListFormat,
}

pub fn run(args: ListSpeciesArgs) -> anyhow::Result<()> {
    let catalog = Catalog::builtin();
    print!("{}", render(&catalog, args.format));
    Ok(())
}

pub fn render(catalog: &Catalog, format: ListFormat) -> String {
    let options = catalog.list_options();
    match format {
        ListFormat::Plain => options
            .iter()
            .map(|(name, codes)| format!("{}: {}\n", name, codes.join(", ")))
            .collect(),
        ListFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec![
                Cell::new("Species").add_attribute(Attribute::Bold),
                Cell::new("Codes").add_attribute(Attribute::Bold),
            ]);
            for (name, codes) in &options {
                table.add_row(vec![Cell::new(name), Cell::new(codes.join(", "))]);
            }
            format!("{}\n{} species\n", table, options.len())
        }
    }
}
