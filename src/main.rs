use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sporlstats::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch and enrich the top tracks of a category
    Fetch(FetchOptions),

    /// List known category keys
    Categories(CategoriesOptions),

    /// Show the stored tracks of a category
    Show(ShowOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct FetchOptions {
    /// Category key, e.g. `pop` or `toplists`
    #[clap(required_unless_present = "all", conflicts_with = "all")]
    pub category: Option<String>,

    /// Fetch every known category
    #[clap(long)]
    pub all: bool,

    /// Directory to write `<category>.json` into
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Maximum number of analysis requests in flight
    #[clap(long)]
    pub concurrency: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct CategoriesOptions {
    /// Only list keys containing this text
    #[clap(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowOptions {
    pub category: String,

    /// Directory the category file was written to
    #[clap(long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Fetch(opt) => match opt.category {
            Some(category) if !opt.all => cli::fetch(category, opt.output, opt.concurrency).await,
            _ => cli::fetch_all(opt.output, opt.concurrency).await,
        },
        Command::Categories(opt) => cli::categories(opt.search),
        Command::Show(opt) => cli::show(opt.category, opt.output).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
