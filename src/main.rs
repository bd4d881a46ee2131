mod cli;
mod error;

use crate::cli::{Cli, Command, ContentArgs};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::{OptionExt, ResultExt};
use instanews_acquire::{GeminiSummarizer, Source};
use instanews_config::{Config, ExportConfig};
use instanews_layout::Composition;
use instanews_render::{Png, Rasterize, Renderer, StyleConfig};
use instanews_session::{Outcome, Session, Settings};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli).await.map_err(|err| miette::miette!("{err:?}"))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Generate { content, format, output } => {
            if let Some(output) = output {
                config.export.directory = output;
            }
            let session = prepare(&config, &content).await?;
            for format in format.formats() {
                let path = session.export(*format).await.or_raise(|| ErrorKind::Session)?;
                println!("{}", path.display());
            }
        },
        Command::Layout { content, format } => {
            let session = prepare(&config, &content).await?;
            let previews = session.previews().await;
            let compositions: BTreeMap<&str, &Composition> =
                format.formats().iter().map(|format| (format.as_str(), previews.get(*format))).collect();
            let json = match compositions.len() {
                1 => serde_json::to_string_pretty(&compositions.values().next()),
                _ => serde_json::to_string_pretty(&compositions),
            }
            .or_raise(|| ErrorKind::Output)?;
            println!("{json}");
        },
    }
    Ok(())
}

/// Builds a session and runs the wizard non-interactively: acquire (or go
/// manual), then apply every edit given on the command line.
async fn prepare(config: &Config, args: &ContentArgs) -> Result<Session> {
    let summarizer = GeminiSummarizer::new(&config.ai).or_raise(|| ErrorKind::Client)?;
    let rasterizer = LazyRenderer::new(config.export.clone());
    let session = Session::new(Settings::from(config), Arc::new(summarizer), Arc::new(rasterizer));

    if args.manual {
        session.manual_entry().await;
    } else {
        let input = read_input(args.input.as_deref()).await?;
        let is_url = args.forced_kind().unwrap_or_else(|| Source::detect(input.as_str()).is_url());
        tracing::info!(is_url, "Generating post");
        match session.process(&input, is_url).await.or_raise(|| ErrorKind::Session)? {
            Outcome::Applied => {},
            Outcome::EmptyInput | Outcome::Superseded => exn::bail!(ErrorKind::Input),
        }
    }

    if let Some(title) = &args.title {
        session.set_title(title.as_str()).await;
    }
    if let Some(summary) = &args.summary {
        session.set_summary(summary.as_str()).await;
    }
    if let Some(image) = &args.image {
        session.upload_image(image).await.or_raise(|| ErrorKind::Session)?;
    }
    if let Some(logo) = &args.logo {
        session.upload_logo(logo).await.or_raise(|| ErrorKind::Session)?;
    }
    if args.no_logo {
        session.set_show_logo(false).await;
    }
    Ok(session)
}

async fn read_input(input: Option<&str>) -> Result<String> {
    let input = input.ok_or_raise(|| ErrorKind::Input)?;
    if input != "-" {
        return Ok(input.to_string());
    }
    let mut buffer = String::new();
    tokio::io::stdin().read_to_string(&mut buffer).await.or_raise(|| ErrorKind::Input)?;
    Ok(buffer)
}

/// Finds Chrome on first export, so that `layout` works without a browser installed.
struct LazyRenderer {
    export: ExportConfig,
    renderer: OnceLock<Renderer>,
}
impl LazyRenderer {
    fn new(export: ExportConfig) -> Self {
        Self { export, renderer: OnceLock::new() }
    }

    fn renderer(&self) -> instanews_render::error::Result<&Renderer> {
        if let Some(renderer) = self.renderer.get() {
            return Ok(renderer);
        }
        let styles = StyleConfig::card_with_files(&self.export.stylesheets)?;
        let renderer = match &self.export.chrome {
            Some(path) => Renderer::with_chrome(path, styles)?,
            None => Renderer::new(styles)?,
        };
        Ok(self.renderer.get_or_init(|| renderer))
    }
}
impl Rasterize for LazyRenderer {
    fn rasterize(
        &self,
        composition: &Composition,
        width: u32,
        height: u32,
        pixel_ratio: u32,
    ) -> instanews_render::error::Result<Png> {
        self.renderer()?.rasterize(composition, width, height, pixel_ratio)
    }
}
