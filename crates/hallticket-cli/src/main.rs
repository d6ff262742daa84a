use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime};
use clap::Parser;
use hallticket::{BatchEmitter, DocumentComposer, RawRecord, TicketConfig};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hallticket", about = "Generate exam hall tickets as one PDF", version)]
struct Cli {
    /// Records JSON: an array, or an object with a "records" array
    #[arg(short, long)]
    records: PathBuf,

    /// Ticket configuration JSON (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output PDF file
    #[arg(short, long)]
    output: PathBuf,

    /// Summary JSON file; printed to stdout when omitted
    #[arg(short, long)]
    summary: Option<PathBuf>,

    /// Timestamp printed in ticket footers (e.g. 2025-03-01T09:00:00)
    #[arg(long)]
    generated_at: Option<String>,

    /// Only generate the record with this id (repeatable)
    #[arg(long = "only", value_name = "ID")]
    only: Vec<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

const TIMESTAMP_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn parse_generated_at(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_local());
    }
    TIMESTAMP_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .with_context(|| format!("Unrecognized --generated-at timestamp: {text}"))
}

/// Accept a bare array or `{"records": [...]}`
fn load_records(json: &str) -> Result<Vec<RawRecord>> {
    let value: Value = serde_json::from_str(json).context("Records file is not valid JSON")?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(items)) => items,
            _ => bail!("Records object has no \"records\" array"),
        },
        _ => bail!("Records must be a JSON array or an object with a \"records\" array"),
    };
    Ok(items.into_iter().map(RawRecord::from).collect())
}

/// Keep the records whose identifier is listed in `only`
fn select_records(records: Vec<RawRecord>, only: &[String]) -> Vec<RawRecord> {
    if only.is_empty() {
        return records;
    }

    let selected: Vec<RawRecord> = records
        .into_iter()
        .filter(|r| r.identifier().is_some_and(|id| only.contains(&id)))
        .collect();

    for id in only {
        let found = selected
            .iter()
            .any(|r| r.identifier().as_deref() == Some(id.as_str()));
        if !found {
            log::warn!("--only {id}: no record with this id");
        }
    }
    selected
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => TicketConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TicketConfig::default(),
    };
    let generated_at = match &cli.generated_at {
        Some(text) => parse_generated_at(text)?,
        None => chrono::Local::now().naive_local(),
    };

    let json = std::fs::read_to_string(&cli.records)
        .with_context(|| format!("Failed to read records {}", cli.records.display()))?;
    let records = select_records(load_records(&json)?, &cli.only);
    log::info!("loaded {} record(s) from {}", records.len(), cli.records.display());

    let composer = DocumentComposer::new(config, generated_at).context("Invalid configuration")?;
    let artifact = BatchEmitter::new(composer).emit(records).await;

    artifact
        .save_pdf(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    log::info!(
        "wrote {} page(s) to {}",
        artifact.page_count(),
        cli.output.display()
    );

    let summary = artifact.summary_json()?;
    match &cli.summary {
        Some(path) => std::fs::write(path, summary)
            .with_context(|| format!("Failed to write summary {}", path.display()))?,
        None => println!("{summary}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_records_shapes() {
        let bare = load_records(r#"[{"id": "1"}, {"id": "2"}]"#).unwrap();
        assert_eq!(bare.len(), 2);

        let wrapped = load_records(r#"{"records": [{"id": "1"}]}"#).unwrap();
        assert_eq!(wrapped.len(), 1);

        assert!(load_records(r#"{"items": []}"#).is_err());
        assert!(load_records("42").is_err());
        assert!(load_records("not json").is_err());
    }

    #[test]
    fn test_select_records() {
        let records: Vec<RawRecord> = vec![
            json!({"id": "A"}).into(),
            json!({"rollNumber": "B"}).into(),
            json!({"name": "no id"}).into(),
        ];

        let all = select_records(records.clone(), &[]);
        assert_eq!(all.len(), 3);

        let picked = select_records(records, &["B".to_string(), "Z".to_string()]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].identifier().as_deref(), Some("B"));
    }

    #[test]
    fn test_parse_generated_at() {
        let expected = chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap();

        assert_eq!(parse_generated_at("2025-03-01T09:00:00").unwrap(), expected);
        assert_eq!(parse_generated_at("2025-03-01 09:00").unwrap(), expected);
        assert_eq!(parse_generated_at("2025-03-01T09:00:00+05:30").unwrap(), expected);
        assert!(parse_generated_at("yesterday").is_err());
    }
}
