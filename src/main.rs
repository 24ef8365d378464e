use clap::{Parser, Subcommand};
use photo_intake::config::{self, DEFAULT_CONFIG_FILE};
use photo_intake::imaging::RustBackend;
use photo_intake::output;
use photo_intake::service::{ImageService, Layout, RootKind, ServiceError, content_type_for};
use photo_intake::storage::DirStorage;
use photo_intake::types::UploadPart;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "photo-intake")]
#[command(about = "Store, resize and brightness-check uploaded images")]
#[command(long_about = "\
Store, resize and brightness-check uploaded images

Every stored file gets a random name; the name you upload under only
contributes its extension. Files live in four directories under the storage
base:

  images/
  ├── original/          # uploads, byte for byte
  ├── resized/           # derivatives, same name as the original
  ├── brightness_pass/   # checked images with mean luminance in [60, 200]
  └── brightness_fail/   # checked images outside that range

Set RUST_LOG to override the -v log level.

Run 'photo-intake gen-config' to generate a documented photo-intake.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Storage base directory, overrides `storage.base`
    #[arg(long, global = true)]
    base: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store images and their resized derivatives (at most 20 per call)
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Classify an image by brightness and file it under pass or fail
    Check { file: PathBuf },
    /// List retrieval paths of a storage root
    List {
        /// original, resized, pass or fail
        #[arg(default_value = "original")]
        root: RootKind,
    },
    /// Copy a stored file out of a storage root
    Fetch {
        /// original, resized, pass or fail
        root: RootKind,
        filename: String,
        /// Destination path (defaults to the filename in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a stock photo-intake.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Upload { files } => {
            let service = open_service(&cli.config, cli.base.as_deref())?;
            let parts = files
                .iter()
                .map(|path| read_part(path))
                .collect::<std::io::Result<Vec<_>>>()?;
            let submitted = parts.len();
            let response = service.upload(parts).map_err(with_status)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                output::print_upload_output(&response, submitted);
            }
        }
        Command::Check { file } => {
            let service = open_service(&cli.config, cli.base.as_deref())?;
            let report = service
                .check_brightness(read_part(&file)?)
                .map_err(with_status)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_brightness_output(&report);
            }
        }
        Command::List { root } => {
            let service = open_service(&cli.config, cli.base.as_deref())?;
            let paths = service.list(root).map_err(with_status)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&paths)?);
            } else {
                output::print_list_output(root, &paths);
            }
        }
        Command::Fetch {
            root,
            filename,
            out,
        } => {
            let service = open_service(&cli.config, cli.base.as_deref())?;
            let image = service.fetch(root, &filename).map_err(with_status)?;
            let dest = out.unwrap_or_else(|| PathBuf::from(&image.filename));
            std::fs::write(&dest, &image.bytes)?;
            if cli.json {
                let summary = serde_json::json!({
                    "filename": image.filename,
                    "content_type": image.content_type,
                    "bytes": image.bytes.len(),
                    "out": dest,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                output::print_fetch_output(&image, &dest);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config, apply `--base`, size the worker pool and create the roots.
fn open_service(
    config_path: &Path,
    base: Option<&Path>,
) -> Result<ImageService<DirStorage, RustBackend>, Box<dyn std::error::Error>> {
    let mut service_config = config::load_config(config_path)?;
    if let Some(base) = base {
        service_config.storage.base = base.to_path_buf();
    }
    init_thread_pool(&service_config.processing);

    let layout = Layout::on_disk(&service_config.storage.base);
    layout.create_all()?;
    info!(base = %service_config.storage.base.display(), "Storage ready");
    Ok(ImageService::new(layout, RustBackend::new(), &service_config))
}

/// Read a local file as an upload part, typed by its extension.
fn read_part(path: &Path) -> std::io::Result<UploadPart> {
    let data = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = content_type_for(&name);
    Ok(UploadPart::new(data, name, content_type))
}

/// Prefix a service error with the HTTP status it corresponds to.
fn with_status(err: ServiceError) -> Box<dyn std::error::Error> {
    format!("{} ({})", err, err.status_code()).into()
}

/// Install a stderr fmt subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("photo_intake={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
