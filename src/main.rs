use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stripe_loader::application::client::ClientStripeLoader;
use stripe_loader::application::server::ServerStripeCache;
use stripe_loader::domain::config::ModuleOptions;
use stripe_loader::domain::context::{RequestContext, RequestInfo};
use stripe_loader::domain::credential::Credential;
use stripe_loader::domain::ports::RuntimeConfigRef;
use stripe_loader::infrastructure::runtime_config::StaticRuntimeConfig;
use stripe_loader::infrastructure::simulated::{
    ServerHandle, SimulatedClientLoader, SimulatedServerFactory,
};
use stripe_loader::interfaces::json::options_reader::OptionsReader;
use stripe_loader::interfaces::json::report_writer::{
    ClientReport, Report, ReportWriter, RequestReport,
};
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Module options document (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Publishable key. Overrides the document.
    #[arg(long, env = "STRIPE_PUBLIC_KEY")]
    public_key: Option<String>,

    /// Secret key. Overrides the document.
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Leave loading to the consumers instead of loading on mount.
    #[arg(long)]
    manual_client_load: bool,

    /// Upper bound for one client load, in milliseconds.
    #[arg(long)]
    load_timeout_ms: Option<u64>,

    /// Number of client consumers mounted concurrently.
    #[arg(long, default_value_t = 3)]
    components: usize,

    /// Number of server requests to serve.
    #[arg(long, default_value_t = 2)]
    requests: usize,

    /// Latency of the simulated client SDK, in milliseconds.
    #[arg(long, default_value_t = 50)]
    latency_ms: u64,

    /// Make the simulated client SDK reject with this message.
    #[arg(long)]
    fail_client: Option<String>,
}

impl Cli {
    fn module_options(&self) -> Result<ModuleOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let file = File::open(path).into_diagnostic()?;
                OptionsReader::new(file).read().into_diagnostic()?
            }
            None => ModuleOptions::default(),
        };

        if let Some(key) = &self.public_key {
            options.client.key = Some(Credential::new(key.as_str()));
        }
        if let Some(key) = &self.secret_key {
            options.server.key = Some(Credential::new(key.as_str()));
        }
        if self.manual_client_load {
            options.client.manual_client_load = true;
        }
        if self.load_timeout_ms.is_some() {
            options.client.load_timeout_ms = self.load_timeout_ms;
        }
        Ok(options)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();
    let options = cli.module_options()?;
    let manual = options.client.manual_client_load;
    let config: RuntimeConfigRef = Arc::new(StaticRuntimeConfig::new(options));

    let mut loader =
        SimulatedClientLoader::new().with_latency(Duration::from_millis(cli.latency_ms));
    if let Some(message) = &cli.fail_client {
        loader = loader.failing(message.as_str());
    }
    let client = ClientStripeLoader::new(loader, Arc::clone(&config));

    // Mount every consumer at once
    let mut components = JoinSet::new();
    for _ in 0..cli.components {
        let client = client.clone();
        components.spawn(async move {
            if manual {
                return client.load().await;
            }
            client.on_mounted().await;
            // Observe the shared state like a reactive consumer would
            let mut state = client.subscribe();
            state
                .wait_for(|state| !state.is_loading())
                .await
                .ok()
                .and_then(|state| state.handle())
        });
    }
    let mut resolved = 0;
    while let Some(result) = components.join_next().await {
        if result.into_diagnostic()?.is_some() {
            resolved += 1;
        }
    }
    let client_report = ClientReport {
        manual_client_load: manual,
        components: cli.components,
        resolved,
        loader_invocations: client.loader().invocations(),
        cached: client.handle().is_some(),
    };
    info!(
        resolved,
        invocations = client_report.loader_invocations,
        "Client consumers mounted"
    );

    let server = Arc::new(ServerStripeCache::new(SimulatedServerFactory::new(), config));
    let mut requests = JoinSet::new();
    for _ in 0..cli.requests {
        let server = Arc::clone(&server);
        requests.spawn(async move {
            let ctx = RequestContext::new(RequestInfo::new("/api/stripe"));
            handle_request(&server, &ctx)
        });
    }
    let mut request_reports = Vec::with_capacity(cli.requests);
    while let Some(result) = requests.join_next().await {
        request_reports.push(result.into_diagnostic()?);
    }

    let report = Report {
        client: client_report,
        requests: request_reports,
    };
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_report(&report).into_diagnostic()?;

    Ok(())
}

/// Serves one `/api/stripe` request. The handle is fetched twice to exercise
/// the request-scoped slot.
fn handle_request(
    server: &ServerStripeCache<SimulatedServerFactory>,
    ctx: &RequestContext<Arc<ServerHandle>>,
) -> RequestReport {
    let info = ctx.info();
    let result = server.get_or_create(ctx).and_then(|first| {
        server
            .get_or_create(ctx)
            .map(|second| (first, second))
    });

    match result {
        Ok((first, second)) => {
            debug_assert!(Arc::ptr_eq(&first, &second));
            RequestReport {
                request_id: info.id.to_string(),
                path: info.path.clone(),
                status: 200,
                version: Some(first.version().to_string()),
                api_version: Some(first.api_version.clone()),
                error: None,
            }
        }
        Err(e) => {
            error!(request_id = %info.id, error = %e, "Request failed");
            RequestReport {
                request_id: info.id.to_string(),
                path: info.path.clone(),
                status: 500,
                version: None,
                api_version: None,
                error: Some(e.to_string()),
            }
        }
    }
}
