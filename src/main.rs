use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser};
use tracing_subscriber::EnvFilter;

use tagwatch::app::{App, Strategies};
use tagwatch::config::TagwatchConfig;
use tagwatch::selector::SelectorArgs;
use tagwatch::version::checker::Verdict;
use tagwatch::version::registries::{GoStrategy, PypiStrategy};

#[derive(Parser)]
#[command(name = "tagwatch")]
#[command(
    version,
    about = "Print `tag=<version>` when the newest upstream version has no image tag yet"
)]
struct Cli {
    /// Docker Hub image whose tags are checked, e.g. `owner/app`
    image: String,

    #[command(flatten)]
    selector: SelectorFlags,

    /// Retrieval strategy for --pip
    #[arg(long, value_enum, default_value_t)]
    pip_strategy: PypiStrategy,

    /// Retrieval strategy for --go
    #[arg(long, value_enum, default_value_t)]
    go_strategy: GoStrategy,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Upstream source; falls back to the matching TAG_* environment variable
#[derive(Args)]
#[group(required = false, multiple = false)]
struct SelectorFlags {
    /// PyPI package name
    #[arg(long)]
    pip: Option<String>,

    /// Go module path
    #[arg(long)]
    go: Option<String>,

    /// GitHub `owner/repo[:branch][@api]`, newest commit
    #[arg(long)]
    gh_commit: Option<String>,

    /// GitHub `owner/repo[@api]`, newest tag
    #[arg(long)]
    gh_tag: Option<String>,

    /// GitHub `owner/repo[@api]`, newest release
    #[arg(long)]
    gh_release: Option<String>,

    /// GitLab `group/project[:branch][@api]` or project id, newest commit
    #[arg(long)]
    gl_commit: Option<String>,
}

impl From<SelectorFlags> for SelectorArgs {
    fn from(flags: SelectorFlags) -> Self {
        Self {
            pip: flags.pip,
            go: flags.go,
            gh_commit: flags.gh_commit,
            gh_tag: flags.gh_tag,
            gh_release: flags.gh_release,
            gl_commit: flags.gl_commit,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => TagwatchConfig::from_file(path)?,
        None => TagwatchConfig::default(),
    };
    let selector = SelectorArgs::from(cli.selector).resolve(|name| std::env::var(name).ok())?;
    let strategies = Strategies {
        pypi: cli.pip_strategy,
        go: cli.go_strategy,
    };

    let verdict = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let app = App::new(config)?;
            let verdict = app
                .run(&cli.image, &selector, strategies)
                .await
                .with_context(|| format!("failed to check {}", cli.image))?;
            anyhow::Ok(verdict)
        })?;

    if let Verdict::Pending(_) = verdict {
        println!("{verdict}");
    }
    Ok(())
}
