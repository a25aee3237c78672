//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use docconf_core::manifest::VersionExtractor;
use docconf_core::{ResolvedConfig, SiteSources};
use docconf_shared::{CONFIG_FILE_NAME, Channel, VersionToken};
use tracing::{info, warn};

/// Environment variable the hosting service sets to the published ref.
const PUBLISH_REF_ENV: &str = "READTHEDOCS_VERSION";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docconf: resolve version-bound documentation configuration.
#[derive(Parser)]
#[command(
    name = "docconf",
    version,
    about = "Resolve the version, link templates, API projects and banner of a documentation build.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Site configuration file.
    #[arg(short, long, default_value = CONFIG_FILE_NAME, global = true)]
    pub config: PathBuf,

    /// Publishing channel: development or stable.
    ///
    /// Falls back to the hosting service's published ref, then to development.
    #[arg(long, env = "DOCCONF_CHANNEL", global = true)]
    pub channel: Option<Channel>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the fully resolved configuration as JSON.
    Resolve {
        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },

    /// Print the version declared in the build manifest.
    Version,

    /// Expand one cross-reference link.
    Link {
        /// Link kind (e.g. source-file, diff).
        kind: String,

        /// Path or ref to place in the link.
        path: String,

        /// Print the link caption after the URL.
        #[arg(long)]
        caption: bool,
    },

    /// Print the version warning banner HTML.
    Banner {
        /// Newest stable release; completes a stable banner.
        #[arg(long)]
        newest: Option<VersionToken>,
    },

    /// Print the SHA-256 fingerprint of the resolved configuration.
    Fingerprint,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries results.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docconf=info",
        1 => "docconf=debug",
        _ => "docconf=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let channel = select_channel(cli.channel, std::env::var(PUBLISH_REF_ENV).ok().as_deref());
    let sources = SiteSources::load(&cli.config)
        .wrap_err_with(|| format!("loading site config {}", cli.config.display()))?;

    match cli.command {
        Command::Resolve { pretty } => cmd_resolve(&sources, channel, pretty),
        Command::Version => cmd_version(&sources),
        Command::Link {
            kind,
            path,
            caption,
        } => cmd_link(&sources, channel, &kind, &path, caption),
        Command::Banner { newest } => cmd_banner(&sources, channel, newest.as_ref()),
        Command::Fingerprint => cmd_fingerprint(&sources, channel),
    }
}

/// Explicit flag first, then the published ref, then development.
fn select_channel(flag: Option<Channel>, publish_ref: Option<&str>) -> Channel {
    flag.or_else(|| publish_ref.map(Channel::from_publish_ref))
        .unwrap_or(Channel::Development)
}

fn resolve(sources: &SiteSources, channel: Channel) -> Result<ResolvedConfig> {
    Ok(sources.resolve(channel)?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_resolve(sources: &SiteSources, channel: Channel, pretty: bool) -> Result<()> {
    let resolved = resolve(sources, channel)?;
    println!("{}", resolved.to_json(pretty)?);
    Ok(())
}

fn cmd_version(sources: &SiteSources) -> Result<()> {
    let extractor = VersionExtractor::new(&sources.config.project.version_key);
    let version = extractor.extract(&sources.manifest).wrap_err_with(|| {
        format!("reading version from {}", sources.manifest_path.display())
    })?;
    println!("{version}");
    Ok(())
}

fn cmd_link(
    sources: &SiteSources,
    channel: Channel,
    kind: &str,
    path: &str,
    caption: bool,
) -> Result<()> {
    let resolved = resolve(sources, channel)?;
    let template = resolved.links().get(kind)?;

    println!("{}", template.url(path));
    if caption {
        println!("{}", template.caption(path));
    }
    Ok(())
}

fn cmd_banner(sources: &SiteSources, channel: Channel, newest: Option<&VersionToken>) -> Result<()> {
    let resolved = resolve(sources, channel)?;
    let banner = resolved.banner();

    let text = match (banner.message.is_deferred(), newest) {
        (true, Some(newest)) => banner.message.finish(newest.as_str()),
        (true, None) => {
            warn!("stable banner left deferred; the publishing stage must fill in {{newest}}");
            banner.message.text().to_string()
        }
        (false, Some(_)) => {
            return Err(eyre!("--newest only applies to the stable channel (channel is {channel})"));
        }
        (false, None) => banner.message.text().to_string(),
    };

    info!(%channel, selector = %banner.target, "rendered banner");
    println!("{}", banner.render_html(&text));
    Ok(())
}

fn cmd_fingerprint(sources: &SiteSources, channel: Channel) -> Result<()> {
    let resolved = resolve(sources, channel)?;
    println!("{}", resolved.fingerprint()?);
    Ok(())
}
