use clap::Parser;
use fathom::{Collaborators, SearchOrchestrator};
use fathom_core::config::Config;
use fathom_core::field_catalog::{FieldDescriptor, FieldType};
use fathom_core::types::{
    FetchResponse, QueryDefinition, RawRow, SearchState, SortDirection, SortSpec, SOURCE_FIELD,
};
use fathom_remote::{
    ImmediateVisHost, InMemoryExecutor, InMemorySchemaLookup, RecordingNotifier,
    RecordingRedirect, StaticIndexRegistry, TimeFilter,
};

#[derive(Parser)]
#[command(name = "fathom", about = "fathom — headless data-exploration demo")]
struct Cli {
    /// Index pattern to explore.
    #[arg(long, default_value = "logs")]
    index: String,
    /// Free-text query to apply before fetching.
    #[arg(long, default_value = "")]
    query: String,
    /// Write debug logs to /tmp/fathom-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/fathom-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("fathom debug log started — tail -f /tmp/fathom-debug.log");
    }

    let config = Config::load().unwrap_or_else(|_| Config::defaults());

    let schema = InMemorySchemaLookup::new()
        .with_index("logs", demo_log_fields())
        .with_index("metrics", demo_metric_fields());
    let (executor, results, errors) = InMemoryExecutor::new();
    let executor = executor.with_responder(demo_responder);
    let (_time_filter, time_changes) = TimeFilter::channel();

    let defaults = SearchState {
        query: cli.query,
        columns: vec![SOURCE_FIELD.to_string()],
        sort: SortSpec::new("_score", SortDirection::Desc),
        index: cli.index,
    };

    let mut view = SearchOrchestrator::new(
        config,
        defaults,
        None,
        None,
        Collaborators {
            schema: Box::new(schema),
            executor: Box::new(executor),
            results,
            errors,
            registry: Box::new(
                StaticIndexRegistry::new(["logs", "metrics"]).with_default("logs"),
            ),
            notifier: Box::new(RecordingNotifier::new()),
            redirect: Box::new(RecordingRedirect::new()),
            vis_host: Box::new(ImmediateVisHost::new()),
            time_changes,
        },
    );

    view.initialize().await?;
    view.fetch().await;

    if view.await_result().await {
        println!(
            "{} hits from {:?}",
            view.total_hits(),
            view.query_definition().index
        );
        let columns = view.app_state().columns().to_vec();
        println!("{}", columns.join(" | "));
        for row in view.rows() {
            let cells: Vec<&str> = columns
                .iter()
                .map(|c| row.formatted.get(c).map(String::as_str).unwrap_or(""))
                .collect();
            println!("{}", cells.join(" | "));
        }
    }

    Ok(())
}

fn demo_log_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("timestamp", FieldType::Date),
        FieldDescriptor::new("host", FieldType::String),
        FieldDescriptor::new("bytes", FieldType::Number),
        FieldDescriptor::new("message", FieldType::String),
        FieldDescriptor::new("secure", FieldType::Boolean),
    ]
}

fn demo_metric_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("timestamp", FieldType::Date),
        FieldDescriptor::new("host", FieldType::String),
        FieldDescriptor::new("cpu_pct", FieldType::Number),
    ]
}

/// Answer every dispatch with a handful of synthetic rows.
fn demo_responder(def: &QueryDefinition, generation: u64) -> Option<FetchResponse> {
    let hosts = ["web-01", "web-02", "db-01"];
    let base = chrono::Utc::now();

    let rows: Vec<RawRow> = (0..def.size.min(5))
        .map(|i| {
            let ts = base - chrono::Duration::minutes(i as i64);
            RawRow::from([
                ("timestamp".to_string(), serde_json::json!(ts.to_rfc3339())),
                ("host".to_string(), serde_json::json!(hosts[i % hosts.len()])),
                ("bytes".to_string(), serde_json::json!(512 * (i + 1))),
                (
                    "message".to_string(),
                    serde_json::json!(format!("GET /api/v1/items 200 OK ({}ms)", 3 + i)),
                ),
            ])
        })
        .collect();

    Some(FetchResponse {
        generation,
        total_hits: rows.len() as u64,
        rows,
    })
}
