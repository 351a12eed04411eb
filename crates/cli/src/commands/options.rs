//! Option domain listing

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, OptionsResponse, Range};
use crate::output::{print_json, print_table, OutputFormat};

/// Row for the options table
#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Flag")]
    flag: &'static str,
    #[tabled(rename = "Allowed values")]
    values: String,
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn range(range: &Range) -> String {
    format!("{} to {}", range.min, range.max)
}

fn option_rows(options: &OptionsResponse) -> Vec<OptionRow> {
    let row = |field, flag, values| OptionRow { field, flag, values };
    vec![
        row("Company", "--company", join(&options.companies)),
        row("Type", "--type", join(&options.type_names)),
        row("RAM (GB)", "--ram", join(&options.ram_gb)),
        row("Weight (kg)", "--weight", range(&options.weight_kg)),
        row("Screen size (in)", "--screen-size", range(&options.screen_size_inches)),
        row("Resolution", "--resolution", join(&options.resolutions)),
        row("CPU", "--cpu", join(&options.cpu_brands)),
        row("HDD (GB)", "--hdd", join(&options.hdd_gb)),
        row("SSD (GB)", "--ssd", join(&options.ssd_gb)),
        row("GPU", "--gpu", join(&options.gpu_brands)),
        row("OS", "--os", join(&options.operating_systems)),
    ]
}

/// List the values each field accepts
pub async fn run(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let options = client.options().await?;

    match format {
        OutputFormat::Json => print_json(&options)?,
        OutputFormat::Table => print_table(option_rows(&options)),
    }

    Ok(())
}
