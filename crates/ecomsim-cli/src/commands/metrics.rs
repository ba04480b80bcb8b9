use std::io::stdout;

use anyhow::{Context, Result};
use ecomsim_core::format::{format_count, format_money};
use ecomsim_core::metrics::field_value;
use ecomsim_core::{
    assess, compute, BusinessInputs, DerivedMetrics, DriverGraph, FormattedMetrics, MetricField,
    Money,
};
use serde_json::json;
use tracing::{info, warn};

use ecomsim_cli::cli::{InputArgs, MetricsCommands};
use ecomsim_cli::common::{write_csv_from_json, write_json, write_jsonl, write_table, OutputFormat};
use ecomsim_cli::config::EcomsimConfig;

pub fn handle(command: &MetricsCommands, config: &EcomsimConfig) -> Result<()> {
    match command {
        MetricsCommands::Compute {
            inputs,
            format,
            assess,
        } => compute_cmd(inputs, *format, *assess, config),
        MetricsCommands::Drivers {
            inputs,
            step,
            format,
        } => drivers_cmd(inputs, *step, *format, config),
    }
}

fn compute_cmd(
    args: &InputArgs,
    format: OutputFormat,
    with_assessment: bool,
    config: &EcomsimConfig,
) -> Result<()> {
    let inputs = config.resolve_inputs(args);
    let metrics = compute(&inputs).context("computing metrics")?;
    info!(
        revenue = metrics.revenue.value(),
        gross_profit = metrics.gross_profit.value(),
        "metrics computed"
    );
    let diagnostics = if with_assessment {
        let catalog = config.catalog()?;
        Some(assess(&catalog, &inputs, &metrics))
    } else {
        None
    };
    let formatted = FormattedMetrics::new(&metrics, &config.display);

    match format {
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = formatted
                .rows()
                .iter()
                .map(|(label, value)| vec![label.to_string(), value.to_string()])
                .collect();
            write_table(&["METRIC", "VALUE"], &rows, stdout())?;
            if let Some(diag) = &diagnostics {
                println!();
                print!("{diag}");
            }
        }
        OutputFormat::Json => {
            let doc = json!({
                "inputs": inputs,
                "metrics": metrics,
                "formatted": formatted,
                "diagnostics": diagnostics,
            });
            write_json(&doc, &mut stdout(), true)?;
        }
        OutputFormat::Jsonl => {
            write_jsonl(&metric_rows(&inputs, &formatted, &metrics), &mut stdout())?;
        }
        OutputFormat::Csv => {
            write_csv_from_json(&metric_rows(&inputs, &formatted, &metrics), &mut stdout())?;
        }
    }

    if let Some(diag) = &diagnostics {
        if diag.has_issues() && format.is_machine_readable() {
            warn!("{}", diag.summary());
        }
    }
    Ok(())
}

/// One record per derived field, with the raw value and its display form.
fn metric_rows(
    inputs: &BusinessInputs,
    formatted: &FormattedMetrics,
    metrics: &DerivedMetrics,
) -> Vec<serde_json::Value> {
    MetricField::DERIVED
        .iter()
        .zip(formatted.rows())
        .map(|(field, (_, display))| {
            json!({
                "metric": field.as_str(),
                "value": field_value(*field, inputs, metrics),
                "display": display,
            })
        })
        .collect()
}

fn drivers_cmd(
    args: &InputArgs,
    step: f64,
    format: OutputFormat,
    config: &EcomsimConfig,
) -> Result<()> {
    if !step.is_finite() || step == 0.0 {
        anyhow::bail!("--step must be a finite, non-zero percentage");
    }
    let inputs = config.resolve_inputs(args);
    let graph = DriverGraph::new();
    let order = graph.evaluation_order()?;
    let sensitivity = graph
        .sensitivity(&inputs, step)
        .context("computing sensitivity")?;

    let drivers: Vec<serde_json::Value> = MetricField::DERIVED
        .iter()
        .map(|field| {
            let direct: Vec<_> = graph
                .direct_drivers(*field)
                .into_iter()
                .map(|(driver, influence)| json!({"field": driver, "influence": influence}))
                .collect();
            json!({
                "kpi": field,
                "drivers": direct,
                "inputs": graph.root_inputs(*field),
            })
        })
        .collect();

    match format {
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = MetricField::DERIVED
                .iter()
                .map(|field| {
                    let direct: Vec<String> = graph
                        .direct_drivers(*field)
                        .into_iter()
                        .map(|(driver, influence)| format!("{influence}{driver}"))
                        .collect();
                    vec![field.to_string(), direct.join(" ")]
                })
                .collect();
            write_table(&["KPI", "DRIVEN BY"], &rows, stdout())?;

            println!();
            println!("Gross profit change for a {step}% rise in each input:");
            let rows: Vec<Vec<String>> = sensitivity
                .iter()
                .map(|s| {
                    vec![
                        s.input.to_string(),
                        format_input(s.input, s.baseline_value, config),
                        format_input(s.input, s.bumped_value, config),
                        format_money(s.gross_profit_delta, &config.display),
                    ]
                })
                .collect();
            write_table(&["INPUT", "FROM", "TO", "PROFIT DELTA"], &rows, stdout())?;
        }
        OutputFormat::Json => {
            let doc = json!({
                "evaluation_order": order,
                "drivers": drivers,
                "sensitivity": sensitivity,
            });
            write_json(&doc, &mut stdout(), true)?;
        }
        OutputFormat::Jsonl => write_jsonl(&sensitivity, &mut stdout())?,
        OutputFormat::Csv => {
            let records: Vec<serde_json::Value> = sensitivity
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?;
            write_csv_from_json(&records, &mut stdout())?;
        }
    }
    Ok(())
}

/// An input value in its own unit.
fn format_input(field: MetricField, value: f64, config: &EcomsimConfig) -> String {
    match field {
        MetricField::Traffic => format_count(value),
        MetricField::AverageOrderValue | MetricField::AdSpend => {
            format_money(Money::new(value), &config.display)
        }
        _ => format!("{value:.2}%"),
    }
}
