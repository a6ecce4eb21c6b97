use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use court_collector::{ConfigError, JobService};

#[derive(Parser)]
#[command(name = "court-collector", version, about = "Court-case metadata collector")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a config document and print it as JSON
    CheckConfig {
        file: PathBuf,
    },
    /// Run one collection job to completion
    #[cfg(feature = "chromium")]
    Run {
        /// Job config (YAML or JSON)
        file: PathBuf,
        /// Service settings (YAML)
        #[arg(short, long)]
        service: Option<PathBuf>,
        /// Directory for CSV artifacts (overrides the service settings)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        /// Show the browser window
        #[arg(long)]
        headful: bool,
    },
}

/// Installs the fmt subscriber; `log` records from the library are bridged
/// into it as well.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn check_config(file: &Path) -> court_collector::Result<ExitCode> {
    let bytes = std::fs::read(file).map_err(|source| ConfigError::ReadFile {
        path: file.to_path_buf(),
        source,
    })?;
    let response = JobService::test_config(&bytes);
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(if response.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(feature = "chromium")]
async fn run_job(
    file: &Path,
    service: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
    headful: bool,
) -> court_collector::Result<ExitCode> {
    use std::sync::Arc;

    use tokio::sync::broadcast::error::RecvError;
    use tracing::warn;

    use court_collector::broadcast::JobProgressKind;
    use court_collector::driver::chromium::ChromiumLauncher;
    use court_collector::{load_collect_config, load_service_config, JobStatus, ServiceConfig};

    let config = load_collect_config(file)?;
    let mut settings = match service {
        Some(path) => load_service_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }

    let launcher = ChromiumLauncher {
        headless: !headful,
        ..ChromiumLauncher::default()
    };
    let service = JobService::new(Arc::new(launcher), settings);

    let mut events = service.subscribe();
    let job_id = service.start(config)?.job_id;
    info!(job_id = %job_id, "Job started");

    let printer = {
        let job_id = job_id.clone();
        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Progress output fell behind, events dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if event.job_id != job_id {
                    continue;
                }
                match event.kind {
                    JobProgressKind::Status => info!(status = %event.status, "Status changed"),
                    JobProgressKind::Log => info!("{}", event.message),
                }
                if event.kind == JobProgressKind::Status && event.status.is_terminal() {
                    break;
                }
            }
        })
    };

    let view = service.wait(&job_id).await?;
    printer.abort();

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(if view.status == JobStatus::Done {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    info!("Starting court-collector v{}", env!("CARGO_PKG_VERSION"));

    let result = match &cli.command {
        Commands::CheckConfig { file } => check_config(file),
        #[cfg(feature = "chromium")]
        Commands::Run {
            file,
            service,
            data_dir,
            headful,
        } => run_job(file, service.as_ref(), data_dir.clone(), *headful).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
