use std::error::Error;
use std::fs::File;
use std::sync::Arc;

use casemail::backend::{BackendError, CaseBackend, HttpBackend};
use casemail::core::config::{self, ResolvedConfig};
use casemail::core::draft::DraftState;
use casemail::core::schedule::format_send_time;
use casemail::core::stats::DraftStats;
use casemail::tui;
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "casemail", about = "Compose, schedule and send customer emails for a case")]
struct Args {
    /// Id of the case whose email to compose
    case_id: String,

    /// Backend API root (overrides config file and CASEMAIL_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Print the stored draft as "Subject: ...\n\n<body>" and exit
    #[arg(long, conflicts_with = "stats")]
    export: bool,

    /// Print statistics for the stored draft and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to casemail.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("casemail.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config()?;
    let resolved = config::resolve(&file_config, args.base_url.as_deref());
    log::info!(
        "casemail starting for case {} against {}",
        args.case_id,
        resolved.base_url
    );

    let backend = build_backend(&resolved)?;

    if args.export || args.stats {
        return print_stored_draft(backend.as_ref(), &args).await;
    }

    if let Some(copied) = tui::run(resolved, backend, args.case_id).await? {
        println!("{copied}");
    }
    Ok(())
}

fn build_backend(config: &ResolvedConfig) -> Result<Arc<dyn CaseBackend>, BackendError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        BackendError::Config(
            "API key must be set (config file [backend] api_key or CASEMAIL_API_KEY env var)"
                .to_string(),
        )
    })?;
    let backend = HttpBackend::new(api_key, config.base_url.clone(), config.timeout)?;
    Ok(Arc::new(backend))
}

async fn print_stored_draft(backend: &dyn CaseBackend, args: &Args) -> Result<(), Box<dyn Error>> {
    let case = backend.fetch_case(&args.case_id).await?;
    let draft = DraftState::from_case(&case);

    if args.export {
        println!("{}", draft.clipboard_text());
        return Ok(());
    }

    let stats = DraftStats::compute(draft.subject(), draft.body());
    println!("Status:     {}", case.email_status.label());
    if let Some(at) = case.email_scheduled_send_time {
        println!("Send at:    {}", format_send_time(at));
    }
    println!("Characters: {}", stats.characters);
    println!("Words:      {}", stats.words);
    println!("Read time:  {} min", stats.read_minutes);
    println!("Tone:       {}", stats.tone);
    Ok(())
}
