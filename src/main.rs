use clap::{Parser, Subcommand};
use kontent_import::config::{self, ImportConfig};
use kontent_import::mappers::MapperRegistry;
use kontent_import::output;
use kontent_import::pipeline::Pipeline;
use kontent_import::site::Site;
use kontent_import::source::{ContentSource, JsonExportSource};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Export directory used when neither `--source` nor the config names one.
const DEFAULT_SOURCE: &str = "export";

#[derive(Parser)]
#[command(name = "kontent-import")]
#[command(about = "Import headless CMS content into a Jekyll source tree")]
#[command(long_about = "\
Import headless CMS content into a Jekyll source tree

Content items from a delivery API export are grouped by content type and
mapped into pages, posts and data files according to kontent.toml.

Export structure:

  export/
  ├── items.json         # items listing (items, linked-only modular_content)
  └── taxonomies.json    # taxonomy listing (optional)

Output structure:

  site/
  ├── index.html         # pages, JSON front matter + content
  ├── _<collection>/     # pages grouped into a collection
  ├── _posts/            # posts
  └── _data/<key>.json   # data records and taxonomies

Field resolution (first non-empty wins):
  Filename: configured fields → item name → codename
  Layout:   per-item layouts → type layout → kind default

Values starting with ENV_ are read from the environment:
  secure_key = \"ENV_KONTENT_KEY\" reads $KONTENT_KEY

Logging goes to stderr; set RUST_LOG=debug for per-item detail.

Run 'kontent-import gen-config' to generate a documented kontent.toml.")]
#[command(version)]
struct Cli {
    /// Import configuration file
    #[arg(long, default_value = "kontent.toml", global = true)]
    config: PathBuf,

    /// Export directory (overrides `source` in the config)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "site", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Map the export and write the site tree
    Import,
    /// Validate config and export, then show what an import would produce
    Check,
    /// Print a stock kontent.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Import => {
            let config = config::load_config(&cli.config)?;
            let registry = MapperRegistry::with_builtins();
            registry.validate_config(&config)?;
            log_credentials(&config)?;
            init_thread_pool(&config.processing);

            let source = JsonExportSource::new(resolve_source(cli.source.as_deref(), &config)?);
            println!("==> Reading {}", source.dir().display());
            let items = source.fetch_items()?;
            let linked = source.fetch_linked_items()?;
            let taxonomies = source.fetch_taxonomies()?;

            let pipeline = Pipeline::new(&config, &registry, &items).with_linked(&linked);
            let result = pipeline.run_all(&taxonomies);
            output::print_import_output(&result);

            let mut site = Site::new();
            site.deliver(&result);
            let summary = site.write_to(&cli.output)?;
            output::print_write_summary(&summary, &cli.output);
            println!("==> Import complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.config.display());
            let config = config::load_config(&cli.config)?;
            let registry = MapperRegistry::with_builtins();
            registry.validate_config(&config)?;
            log_credentials(&config)?;
            init_thread_pool(&config.processing);

            let source = JsonExportSource::new(resolve_source(cli.source.as_deref(), &config)?);
            let items = source.fetch_items()?;
            let linked = source.fetch_linked_items()?;
            let taxonomies = source.fetch_taxonomies()?;
            let result = Pipeline::new(&config, &registry, &items)
                .with_linked(&linked)
                .run_all(&taxonomies);
            output::print_import_output(&result);
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr, `info` unless `RUST_LOG` says otherwise.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can lower it, not raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Resolve configured credentials so missing environment variables fail
/// before any content is read. The key itself is never logged.
fn log_credentials(config: &ImportConfig) -> Result<(), config::ConfigError> {
    if let Some(project_id) = config.project_id()? {
        info!(project_id = %project_id, "project");
    }
    if config.secure_key()?.is_some() {
        info!("secure key configured");
    }
    Ok(())
}

/// `--source` flag > config `source` > `export`.
fn resolve_source(
    cli_source: Option<&Path>,
    config: &ImportConfig,
) -> Result<PathBuf, config::ConfigError> {
    if let Some(dir) = cli_source {
        return Ok(dir.to_path_buf());
    }
    Ok(config
        .source_dir()?
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE)))
}
