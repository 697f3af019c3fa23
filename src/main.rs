use clap::{Parser, Subcommand};
use guidebook_print::export::ExportController;
use guidebook_print::media::HttpLoader;
use guidebook_print::model::ContentModel;
use guidebook_print::paginate::plan_pages;
use guidebook_print::raster::typeface::default_typeface;
use guidebook_print::surface::{SurfaceStyle, build_surface};
use guidebook_print::{config, output};
use std::path::{Path, PathBuf};
use std::sync::Arc;

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
#[command(name = "guidebook-print")]
#[command(about = "Export a vacation-rental guidebook as a print-ready PDF")]
#[command(long_about = "\
Export a vacation-rental guidebook as a print-ready PDF

The guidebook is read from a JSON content model, laid out as one tall
surface, captured as a raster, and sliced into pages of the configured
paper format.

Sections (omitted when their content is absent):

  Welcome          always
  Getting Here     address or directions
  Check-In         time, policies, access notes, video, house rules
  Wifi Access      wifi network name or password
  House Manual     wifi, tv, kitchen, air_conditioning, washer, pool
  Check-Out        late check-out or before-you-leave tags
  Nearby           restaurants & cafés, activities, attractions, malls

Media that cannot be loaded prints as a placeholder box. Set RUST_LOG=info
to follow the export stages.

Run 'guidebook-print gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve media, render, paginate, and write <property name>.pdf
    Export {
        /// Guidebook content model (JSON)
        model: PathBuf,
    },
    /// Show the section plan, media references, and page estimate without loading media
    Check {
        /// Guidebook content model (JSON)
        model: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Export { model } => {
            let config = config::load_config(cli.config.as_deref())?;
            let content = load_model(&model)?;
            println!("==> Exporting {}", model.display());

            let loader = Arc::new(HttpLoader::new(&config.media.user_agent)?);
            let controller = ExportController::new(config, loader, default_typeface());
            let artifact = controller.generate(&content).await?;
            let path = artifact.write_to(&cli.output)?;
            output::print_export_output(&artifact, &path);
        }
        Command::Check { model } => {
            let config = config::load_config(cli.config.as_deref())?;
            let content = load_model(&model)?;
            println!("==> Checking {}", model.display());

            let typeface = default_typeface();
            let style = SurfaceStyle::from_config(&config);
            let surface = build_surface(&content, &style, typeface.as_ref());
            let scale = config.raster.scale;
            let plan = plan_pages(
                surface.width * scale,
                surface.height * scale,
                config.page.page_format(),
            )?;
            output::print_check_output(&surface, &plan, &config.media.proxy_endpoint);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_model(path: &Path) -> Result<ContentModel, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
