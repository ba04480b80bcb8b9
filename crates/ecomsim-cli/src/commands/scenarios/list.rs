use std::io::stdout;

use anyhow::Result;
use ecomsim_scenarios::{resolve_scenarios, ScenarioSet};

use ecomsim_cli::common::{write_csv_from_json, write_json, write_jsonl, write_table, OutputFormat};

pub fn handle(set: &ScenarioSet, format: OutputFormat) -> Result<()> {
    let resolved = resolve_scenarios(set)?;

    match format {
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = resolved
                .iter()
                .map(|scenario| {
                    vec![
                        scenario.scenario_id.clone(),
                        scenario.choices.len().to_string(),
                        scenario.success_threshold.to_string(),
                        scenario.title.clone(),
                    ]
                })
                .collect();
            write_table(&["SCENARIO", "CHOICES", "THRESHOLD", "TITLE"], &rows, stdout())?;
        }
        OutputFormat::Json => {
            write_json(&resolved, &mut stdout(), true)?;
        }
        OutputFormat::Jsonl => {
            write_jsonl(&resolved, &mut stdout())?;
        }
        OutputFormat::Csv => {
            let json_data: Vec<serde_json::Value> = resolved
                .iter()
                .map(|scenario| {
                    serde_json::json!({
                        "scenario_id": scenario.scenario_id,
                        "title": scenario.title,
                        "choices": scenario.choices.len(),
                        "success_threshold": scenario.success_threshold,
                    })
                })
                .collect();
            write_csv_from_json(&json_data, &mut stdout())?;
        }
    }
    Ok(())
}
