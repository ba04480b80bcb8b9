use std::io::stdout;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use ecomsim_core::format::{format_count, format_money};
use ecomsim_core::DisplayOptions;
use ecomsim_scenarios::{resolve_scenarios, Presentation, Resolution, ScenarioSet, SessionStore};
use serde_json::json;

use ecomsim_cli::common::{write_csv_from_json, write_json, write_jsonl, write_table, OutputFormat};

pub fn handle(
    set: &ScenarioSet,
    scenario_id: Option<&str>,
    choice_id: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let mut resolved = resolve_scenarios(set)?;
    let index = match scenario_id {
        Some(id) => resolved
            .iter()
            .position(|s| s.scenario_id == id)
            .ok_or_else(|| anyhow!("scenario '{id}' not found"))?,
        None => 0,
    };
    let scenario = Arc::new(resolved.swap_remove(index));

    let mut store = SessionStore::new();
    let session_id = store.open(scenario);
    let session = store.get(session_id)?;
    let presentation = session
        .state
        .presentation()
        .ok_or_else(|| anyhow!("new session is not presenting"))?;
    let presented = json!({
        "session": session_id,
        "started_at": session.started_at,
        "presentation": presentation,
    });
    let mut rows = vec![json!({
        "session": session_id,
        "scenario_id": session.state.scenario().scenario_id,
        "phase": session.state.phase(),
        "choice": null,
        "score_delta": null,
        "cumulative_score": session.state.cumulative_score(),
        "tone": null,
    })];

    if format == OutputFormat::Table {
        print_presentation(&presentation);
    }

    let Some(choice_id) = choice_id else {
        emit(&[presented], &rows, format)?;
        return Ok(());
    };

    store.choose(session_id, choice_id)?;
    let state = &store.get(session_id)?.state;
    let resolution = state
        .resolution()
        .ok_or_else(|| anyhow!("scenario did not resolve"))?;

    if format == OutputFormat::Table {
        println!();
        print_resolution(&resolution);
    } else {
        let resolved = json!({
            "session": session_id,
            "resolution": resolution,
            "snapshot": state.snapshot(),
        });
        rows.push(json!({
            "session": session_id,
            "scenario_id": state.scenario().scenario_id,
            "phase": state.phase(),
            "choice": resolution.choice.id,
            "score_delta": resolution.score_delta,
            "cumulative_score": resolution.cumulative_score,
            "tone": resolution.tone,
        }));
        emit(&[presented, resolved], &rows, format)?;
    }

    store.close(session_id)?;
    Ok(())
}

/// JSON is the final record, JSONL streams every step, and CSV has one
/// flat row per step. Tables are printed as the scenario unfolds.
fn emit(records: &[serde_json::Value], rows: &[serde_json::Value], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {}
        OutputFormat::Json => {
            if let Some(last) = records.last() {
                write_json(last, &mut stdout(), true)?;
            }
        }
        OutputFormat::Jsonl => write_jsonl(records, &mut stdout())?,
        OutputFormat::Csv => write_csv_from_json(rows, &mut stdout())?,
    }
    Ok(())
}

fn print_presentation(p: &Presentation<'_>) {
    let opts = DisplayOptions::default();
    println!("{}", p.title);
    if !p.description.is_empty() {
        println!("{}", p.description);
    }
    let baseline = p.baseline;
    let mut facts = Vec::new();
    if let Some(traffic) = baseline.traffic {
        facts.push(format!("traffic {}", format_count(traffic as f64)));
    }
    if let Some(rate) = baseline.conversion_rate {
        facts.push(format!("conversion {rate}"));
    }
    if let Some(aov) = baseline.average_order_value {
        facts.push(format!("AOV {}", format_money(aov, &opts)));
    }
    if let Some(revenue) = baseline.revenue.or_else(|| baseline.implied_revenue()) {
        facts.push(format!("revenue {}", format_money(revenue, &opts)));
    }
    if !facts.is_empty() {
        println!("Baseline: {}", facts.join(", "));
    }
    println!();

    let rows: Vec<Vec<String>> = p
        .choices
        .iter()
        .map(|c| vec![c.id.clone(), c.text.clone()])
        .collect();
    if let Err(err) = write_table(&["CHOICE", "ACTION"], &rows, stdout()) {
        tracing::warn!("failed to write choices: {err}");
    }
}

fn print_resolution(r: &Resolution<'_>) {
    println!("You chose: {}", r.choice.text);
    println!(
        "Score: {:+} (total {})  [{:?}]",
        r.score_delta, r.cumulative_score, r.tone
    );
    println!();
    println!("{}", r.choice.feedback);
    println!("Lesson: {}", r.choice.lesson);
}
