//! Price estimate command

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, EstimateRequest, EstimateResponse};
use crate::output::{
    format_currency, format_flag, print_json, print_success, print_table, print_warning,
    OutputFormat,
};

/// Laptop specification, one flag per field
#[derive(Debug, Clone, Args)]
pub struct EstimateArgs {
    /// Manufacturer, e.g. Dell
    #[arg(long)]
    pub company: String,

    /// Form factor, e.g. Notebook or Ultrabook
    #[arg(long = "type")]
    pub type_name: String,

    /// RAM in GB
    #[arg(long)]
    pub ram: u32,

    /// Weight in kg
    #[arg(long)]
    pub weight: f64,

    /// Touchscreen display
    #[arg(long)]
    pub touchscreen: bool,

    /// IPS panel
    #[arg(long)]
    pub ips: bool,

    /// Screen diagonal in inches
    #[arg(long)]
    pub screen_size: f64,

    /// Screen resolution as <width>x<height>
    #[arg(long, default_value = "1920x1080")]
    pub resolution: String,

    /// CPU brand, e.g. "Intel Core i5"
    #[arg(long)]
    pub cpu: String,

    /// HDD capacity in GB
    #[arg(long, default_value_t = 0)]
    pub hdd: u32,

    /// SSD capacity in GB
    #[arg(long, default_value_t = 0)]
    pub ssd: u32,

    /// GPU brand, e.g. Nvidia
    #[arg(long)]
    pub gpu: String,

    /// Operating system, e.g. Windows
    #[arg(long)]
    pub os: String,
}

impl From<EstimateArgs> for EstimateRequest {
    fn from(args: EstimateArgs) -> Self {
        Self {
            company: args.company,
            type_name: args.type_name,
            ram_gb: args.ram,
            weight_kg: args.weight,
            touchscreen: args.touchscreen,
            ips_display: args.ips,
            screen_size_inches: args.screen_size,
            resolution: args.resolution,
            cpu_brand: args.cpu,
            hdd_gb: args.hdd,
            ssd_gb: args.ssd,
            gpu_brand: args.gpu,
            operating_system: args.os,
        }
    }
}

/// Row for the specification table
#[derive(Tabled)]
struct SpecRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn spec_rows(request: &EstimateRequest) -> Vec<SpecRow> {
    let row = |field, value: String| SpecRow { field, value };
    vec![
        row("Company", request.company.clone()),
        row("Type", request.type_name.clone()),
        row("RAM", format!("{} GB", request.ram_gb)),
        row("Weight", format!("{} kg", request.weight_kg)),
        row("Touchscreen", format_flag(request.touchscreen).to_string()),
        row("IPS", format_flag(request.ips_display).to_string()),
        row("Screen size", format!("{}\"", request.screen_size_inches)),
        row("Resolution", request.resolution.clone()),
        row("CPU", request.cpu_brand.clone()),
        row("HDD", format!("{} GB", request.hdd_gb)),
        row("SSD", format!("{} GB", request.ssd_gb)),
        row("GPU", request.gpu_brand.clone()),
        row("OS", request.operating_system.clone()),
    ]
}

/// One-line failure summary for a rejected estimate
pub fn failure_message(response: &EstimateResponse) -> String {
    format!(
        "{}: {}",
        response.error_kind.as_deref().unwrap_or("Error"),
        response.message.as_deref().unwrap_or("no estimate returned")
    )
}

/// Request an estimate and print it
pub async fn run(
    client: &ApiClient,
    args: EstimateArgs,
    currency: &str,
    format: OutputFormat,
) -> Result<()> {
    let request = EstimateRequest::from(args);
    let response = client.estimate(&request).await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => {
            println!("{}", "Laptop Specification".bold());
            print_table(spec_rows(&request));
            println!();

            if let Some(price) = response.price_value.filter(|_| response.ok) {
                print_success(&format!(
                    "Predicted price: {}",
                    format_currency(price, currency).green().bold()
                ));
                if response.ppi_was_defaulted.unwrap_or(false) {
                    print_warning("Resolution or screen size unusable; estimated without pixel density");
                }
            }
        }
    }

    if !response.ok {
        anyhow::bail!(failure_message(&response));
    }

    Ok(())
}
