use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use instanews_layout::Format;
use std::path::PathBuf;

/// Turn a news link or text into feed and story cards.
#[derive(Debug, Parser)]
#[command(name = "instanews", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Configuration file to use instead of the platform default.
    #[arg(long, global = true, env = "INSTANEWS_CONFIG")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the post and export it as PNG.
    Generate {
        #[command(flatten)]
        content: ContentArgs,
        /// Which renditions to export.
        #[arg(long, value_enum, default_value_t = FormatArg::Both)]
        format: FormatArg,
        /// Directory the PNG files are written to (overrides `export.directory`).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build the post and print its layout as JSON without rendering.
    Layout {
        #[command(flatten)]
        content: ContentArgs,
        #[arg(long, value_enum, default_value_t = FormatArg::Feed)]
        format: FormatArg,
    },
}

#[derive(Debug, Args)]
pub struct ContentArgs {
    /// News link or text to summarize; `-` reads from stdin.
    pub input: Option<String>,
    /// Treat the input as a link.
    #[arg(long, conflicts_with = "text")]
    pub url: bool,
    /// Treat the input as article text, even if it starts with "http".
    #[arg(long)]
    pub text: bool,
    /// Skip summarization and start from the sample post.
    #[arg(long, conflicts_with_all = ["input", "url", "text"])]
    pub manual: bool,
    /// Replace the headline.
    #[arg(long)]
    pub title: Option<String>,
    /// Replace the summary.
    #[arg(long)]
    pub summary: Option<String>,
    /// Local image file used as the background photo.
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,
    /// Local image file used as the logo.
    #[arg(long, value_name = "FILE")]
    pub logo: Option<PathBuf>,
    /// Leave the logo off the card.
    #[arg(long)]
    pub no_logo: bool,
}
impl ContentArgs {
    /// `Some(is_url)` when the kind was forced on the command line.
    pub fn forced_kind(&self) -> Option<bool> {
        match (self.url, self.text) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Feed,
    Story,
    Both,
}
impl FormatArg {
    pub fn formats(&self) -> &'static [Format] {
        match self {
            Self::Feed => &[Format::Feed],
            Self::Story => &[Format::Story],
            Self::Both => &Format::ALL,
        }
    }
}
