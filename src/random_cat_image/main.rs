use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use random_cat_image::application::config_resolver::load_override_file;
use random_cat_image::domain::cache_store_trait::CacheStore;
use random_cat_image::domain::image_transport_trait::ImageTransport;
use random_cat_image::infrastructure::axum_handler::{router, AppState};
use random_cat_image::infrastructure::file_storage::{save_image, LocalFileStorage};
use random_cat_image::infrastructure::memory_cache::InMemoryCache;
use random_cat_image::infrastructure::reqwest_transport::ReqwestTransport;
use random_cat_image::infrastructure::system_clock::SystemClock;
use random_cat_image::{CatImageService, ConfigResolver, FetchConfig, PartialFetchConfig};

#[derive(Parser, Debug)]
#[command(name = "random_cat_image", version, about = "Fetch a random cat image from ai-cats.net")]
struct Cli {
    /// JSON file with any subset of the fetch settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one image and print it as base64
    Fetch {
        /// Save the image to a file path
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Serve the JSON, download and save endpoints
    Serve {
        #[arg(long, default_value = "0.0.0.0:3300")]
        addr: SocketAddr,

        #[arg(long, default_value = "storage/cats")]
        storage_dir: PathBuf,

        /// Keep fetched images in memory for the current hour
        #[arg(long)]
        cache: bool,
    },
}

impl Cli {
    /// Flags beat the config file; together they form the override tier.
    fn override_config(&self) -> anyhow::Result<PartialFetchConfig> {
        let file = match &self.config {
            Some(path) => load_override_file(path)?,
            None => PartialFetchConfig::default(),
        };
        let cache_flag = match &self.command {
            Some(Command::Serve { cache: true, .. }) => Some(true),
            _ => None,
        };
        let flags = PartialFetchConfig {
            endpoint: self.endpoint.clone(),
            timeout_seconds: self.timeout,
            cache_enabled: cache_flag,
            ..Default::default()
        };
        Ok(flags.over(file))
    }

    fn effective_config(&self, resolver: &ConfigResolver) -> anyhow::Result<FetchConfig> {
        let override_config = self.override_config()?;
        Ok(resolver.resolve(Some(&override_config)))
    }
}

// A one-shot fetch exits right after its single call, so only the server
// gets a cache.
fn build_service(transport: Arc<dyn ImageTransport + Send + Sync>, with_cache: bool) -> Arc<CatImageService> {
    let clock = Arc::new(SystemClock);
    let cache = with_cache
        .then(|| Arc::new(InMemoryCache::new(clock.clone())) as Arc<dyn CacheStore + Send + Sync>);
    Arc::new(CatImageService::new(transport, cache, clock))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = run(cli, &ConfigResolver::from_env(), &mut std::io::stdout()).await;
    ExitCode::from(report(result, &mut std::io::stderr()))
}

async fn run<W: Write>(cli: Cli, resolver: &ConfigResolver, out: &mut W) -> anyhow::Result<()> {
    let config = cli.effective_config(resolver)?;
    tracing::debug!(?config, "effective configuration");
    let transport = Arc::new(ReqwestTransport::new());

    match cli.command {
        Some(Command::Serve { addr, storage_dir, .. }) => {
            serve(build_service(transport, true), config, addr, storage_dir).await
        }
        Some(Command::Fetch { save }) => fetch(build_service(transport, false), config, save, out).await,
        None => fetch(build_service(transport, false), config, None, out).await,
    }
}

/// Maps the outcome to a process exit status, printing failures to `err`.
fn report<E: Write>(result: anyhow::Result<()>, err: &mut E) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(err, "Failed to fetch cat image: {:#}", e);
            1
        }
    }
}

async fn fetch<W: Write>(
    service: Arc<CatImageService>,
    config: FetchConfig,
    save: Option<PathBuf>,
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(out, "Fetching a random cat image...")?;

    match save {
        Some(path) => {
            let bytes = tokio::task::spawn_blocking(move || service.get_bytes(&config)).await??;
            save_image(&path, &bytes)
                .await
                .with_context(|| format!("cannot write {}", path.display()))?;
            writeln!(out, "Cat image saved to: {}", path.display())?;
        }
        None => {
            let encoded = tokio::task::spawn_blocking(move || service.get(&config)).await??;
            writeln!(out, "Base64 encoded image data:")?;
            writeln!(out, "{}", encoded)?;
            writeln!(out)?;
            let preview: String = encoded.chars().take(50).collect();
            writeln!(
                out,
                "You can use this in HTML as: <img src=\"data:image/jpeg;base64,{}...\" />",
                preview
            )?;
        }
    }
    Ok(())
}

async fn serve(
    service: Arc<CatImageService>,
    config: FetchConfig,
    addr: SocketAddr,
    storage_dir: PathBuf,
) -> anyhow::Result<()> {
    let state = AppState {
        service,
        config,
        storage: Arc::new(LocalFileStorage::new(storage_dir)),
    };

    tracing::info!(%addr, storage = %state.storage.root().display(), "listening");
    axum::Server::bind(&addr)
        .serve(router(state).into_make_service())
        .await?;
    Ok(())
}
