use breakfit::config::{self, ResolverConfig};
use breakfit::library::JsonLibrary;
use breakfit::markup::{self, ImageAttrs};
use breakfit::output;
use breakfit::resolve::Resolver;
use breakfit::sizes::SizeRequest;
use breakfit::transform::PhotonCdn;
use breakfit::types::ImageRef;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// The image and size a command resolves.
#[derive(clap::Args, Clone)]
struct ImageArgs {
    /// Attachment id from the library, or an image URL
    image: ImageRef,

    /// Logical size name, or WIDTHxHEIGHT
    #[arg(long, default_value = "full")]
    size: SizeRequest,
}

/// Attributes for rendered markup.
#[derive(clap::Args, Clone)]
struct MarkupArgs {
    /// Alt text
    #[arg(long, default_value = "")]
    alt: String,

    /// Extra classes, space separated
    #[arg(long)]
    class: Option<String>,

    /// Emit lazy-load data attributes with a lo-fi placeholder src
    #[arg(long)]
    lazy: bool,
}

impl From<MarkupArgs> for ImageAttrs {
    fn from(args: MarkupArgs) -> Self {
        ImageAttrs {
            alt: args.alt,
            class: args.class,
            lazy: args.lazy,
        }
    }
}

#[derive(Parser)]
#[command(name = "breakfit")]
#[command(about = "Breakpoint-aware responsive image URLs and markup")]
#[command(long_about = "\
Breakpoint-aware responsive image URLs and markup

Resolves an image and a logical size against a breakpoint table, runs a
crop/fit transform per breakpoint, and prints CDN URLs, srcset/sizes
attributes or <picture> markup.

Inputs:

  breakfit.toml     # Breakpoints, image sizes, default transform (optional)
  library.json      # Attachment id → {url, width, height} (optional)

  {\"42\": {\"url\": \"https://example.com/dawn.jpg\", \"width\": 2000, \"height\": 1000}}

Images are given as an attachment id (42) or a URL. Sizes are a
configured name (thumb), raw dimensions (640x480) or full.

Logging goes to stderr and is controlled with RUST_LOG (default
breakfit=warn).

Run 'breakfit gen-config' to generate a documented breakfit.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "breakfit.toml", global = true)]
    config: PathBuf,

    /// JSON media library
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// CDN base URL replacing the image host (e.g. https://i0.wp.com)
    #[arg(long, global = true)]
    cdn_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved image object as JSON
    Object(ImageArgs),
    /// Print the resolved image object as a readable tree
    Inspect(ImageArgs),
    /// Print the srcset attribute
    Srcset(ImageArgs),
    /// Print the sizes attribute
    Sizes(ImageArgs),
    /// Print <picture> markup
    Picture {
        #[command(flatten)]
        image: ImageArgs,
        #[command(flatten)]
        markup: MarkupArgs,
    },
    /// Print <img> markup
    Img {
        #[command(flatten)]
        image: ImageArgs,
        #[command(flatten)]
        markup: MarkupArgs,
    },
    /// Print one URL per breakpoint
    Urls {
        #[command(flatten)]
        image: ImageArgs,
        /// Pixel density; above 1 prints the 2x URLs
        #[arg(long, default_value_t = 1)]
        density: u32,
    },
    /// Validate the config and show the resolved tables
    Check,
    /// Print a stock breakfit.toml with all options documented
    GenConfig,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "breakfit=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).without_time())
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let resolver_config: ResolverConfig = config::load_config(&cli.config)?;
    let guessed = resolver_config.image_sizes.is_empty();
    let library = match &cli.library {
        Some(path) => JsonLibrary::from_path(path)?,
        None => JsonLibrary::default(),
    };
    let cdn = match cli.cdn_base {
        Some(base) => PhotonCdn::with_base_url(base),
        None => PhotonCdn::new(),
    };
    let resolver = Resolver::new(resolver_config, library, cdn)?;

    match cli.command {
        Command::Object(args) => {
            let object = resolver.image_object(&args.image, &args.size);
            println!("{}", serde_json::to_string_pretty(&object)?);
        }
        Command::Inspect(args) => {
            let object = resolver.image_object(&args.image, &args.size);
            output::print_image_object(&object, &args.size);
        }
        Command::Srcset(args) => {
            let object = resolver.image_object(&args.image, &args.size);
            println!("{}", markup::srcset(&object));
        }
        Command::Sizes(args) => {
            let object = resolver.image_object(&args.image, &args.size);
            println!("{}", markup::sizes(&object));
        }
        Command::Picture { image, markup: attrs } => {
            let object = resolver.image_object(&image.image, &image.size);
            let fallback = resolver.fallback_src(&image.image, &object);
            let html = markup::render_picture(&object, &fallback, &image.size, &attrs.into());
            println!("{}", html.into_string());
        }
        Command::Img { image, markup: attrs } => {
            let object = resolver.image_object(&image.image, &image.size);
            let fallback = resolver.fallback_src(&image.image, &object);
            let html = markup::render_img(&object, &fallback, &image.size, &attrs.into());
            println!("{}", html.into_string());
        }
        Command::Urls { image, density } => {
            let urls = resolver.breakpoint_urls(&image.image, &image.size, density);
            output::print_breakpoint_urls(&urls);
        }
        Command::Check => {
            output::print_config_summary(
                resolver.breakpoints(),
                resolver.sizes(),
                guessed,
                &resolver.config().default_transform,
            );
            println!("==> Config OK");
        }
        Command::GenConfig => {}
    }

    Ok(())
}
