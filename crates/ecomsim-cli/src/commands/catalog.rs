use std::io::stdout;

use anyhow::Result;
use ecomsim_core::MetricDefinition;
use serde_json::json;

use ecomsim_cli::cli::CatalogCommands;
use ecomsim_cli::common::{write_csv_from_json, write_json, write_jsonl, write_table, OutputFormat};
use ecomsim_cli::config::EcomsimConfig;

pub fn handle(command: &CatalogCommands, config: &EcomsimConfig) -> Result<()> {
    let catalog = config.catalog()?;
    match command {
        CatalogCommands::List { format } => {
            let definitions = catalog.definitions();
            match format {
                OutputFormat::Table => {
                    let rows: Vec<Vec<String>> = definitions
                        .iter()
                        .map(|d| vec![d.id.clone(), d.name.clone(), d.formula.clone()])
                        .collect();
                    write_table(&["ID", "NAME", "FORMULA"], &rows, stdout())?;
                }
                OutputFormat::Json => write_json(&definitions, &mut stdout(), true)?,
                OutputFormat::Jsonl => write_jsonl(definitions, &mut stdout())?,
                OutputFormat::Csv => {
                    let rows: Vec<serde_json::Value> = definitions.iter().map(flat_record).collect();
                    write_csv_from_json(&rows, &mut stdout())?;
                }
            }
        }
        CatalogCommands::Show { id, format } => {
            let definition = catalog.get(id)?;
            match format {
                OutputFormat::Table => print_definition(definition),
                OutputFormat::Json => write_json(definition, &mut stdout(), true)?,
                OutputFormat::Jsonl => write_jsonl(std::slice::from_ref(definition), &mut stdout())?,
                OutputFormat::Csv => {
                    write_csv_from_json(&[flat_record(definition)], &mut stdout())?
                }
            }
        }
    }
    Ok(())
}

/// One CSV-friendly record per definition, with the worked example inlined.
fn flat_record(d: &MetricDefinition) -> serde_json::Value {
    json!({
        "id": d.id,
        "name": d.name,
        "definition": d.definition,
        "formula": d.formula,
        "why": d.why,
        "example": format!("{} => {} = {}", d.example.scenario, d.example.calculation, d.example.result),
        "good_range": d.good_range,
        "bad_range": d.bad_range,
    })
}

fn print_definition(d: &MetricDefinition) {
    println!("{} ({})", d.name, d.id);
    println!();
    println!("{}", d.definition);
    println!();
    println!("Formula:  {}", d.formula);
    println!("Why:      {}", d.why);
    println!();
    println!("Example:  {}", d.example.scenario);
    println!("          {}", d.example.calculation);
    println!("          = {}", d.example.result);
    println!();
    println!("Good:     {}", d.good_range);
    println!("Bad:      {}", d.bad_range);
}
