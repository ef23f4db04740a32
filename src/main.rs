//! Araimo TV - command line channel browser
//! Fetches the playlist, filters channels and prints stream requests for a player

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use araimo_tv::config::AppConfig;
use araimo_tv::m3u_parser::download_and_parse;
use araimo_tv::playback::PlaybackRequest;
use araimo_tv::{parse_m3u_with, Catalog, OrphanUrlPolicy, ParseOptions};

#[derive(Parser)]
#[command(name = "araimo-tv")]
#[command(version)]
#[command(about = "Browse an IPTV playlist by category and prepare streams for a player")]
#[command(long_about = None)]
struct Cli {
    /// Playlist URL (overrides config file)
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Read the playlist from a local file instead of downloading it
    #[arg(short, long, value_name = "PATH", conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Only show channels in this category (remembered for next time)
    #[arg(short, long)]
    category: Option<String>,

    /// Case-insensitive channel name search
    #[arg(short, long, default_value = "")]
    search: String,

    /// List categories and exit
    #[arg(long)]
    categories: bool,

    /// Print the stream request for the N-th listed channel
    #[arg(short, long, value_name = "N")]
    play: Option<usize>,

    /// Print channels as JSON
    #[arg(long)]
    json: bool,

    /// Drop stream lines that do not follow their own #EXTINF block
    #[arg(long)]
    skip_orphan_urls: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("araimo_tv={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = AppConfig::load();
    debug!("Configuration loaded from {}", AppConfig::config_path().display());

    let options = ParseOptions {
        orphan_urls: if cli.skip_orphan_urls {
            OrphanUrlPolicy::Skip
        } else {
            OrphanUrlPolicy::Reuse
        },
    };

    let channels = match (&cli.file, &cli.url) {
        (Some(path), _) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read playlist {}", path.display()))?;
            let channels = parse_m3u_with(&content, &options);
            info!("Loaded {} channels from {}", channels.len(), path.display());
            channels
        }
        (None, url) => {
            let url = url.as_deref().unwrap_or(config.playlist_url.as_str());
            download_and_parse(url, &config.fetch_config(), &options)
                .with_context(|| format!("Failed to download playlist {}", url))?
        }
    };
    let mut catalog = Catalog::new(channels);

    if cli.categories {
        for category in catalog.categories() {
            println!("{}", category);
        }
        return Ok(());
    }

    let category = cli
        .category
        .clone()
        .unwrap_or_else(|| config.last_category.clone());
    if !catalog.select_category(&category) {
        warn!("Category '{}' not in playlist, showing all channels", category);
    } else if config.last_category != category {
        config.last_category = category;
        config.save();
    }

    let channels = catalog.filter(&cli.search);

    if let Some(index) = cli.play {
        let Some(channel) = channels.get(index) else {
            bail!("No channel #{} ({} channels listed)", index, channels.len());
        };
        let request = PlaybackRequest::for_channel(channel);
        info!("Playing {} | URL: {}", channel.name, request.url);
        println!("{}", request.url);
        for (name, value) in &request.headers {
            println!("{}: {}", name, value);
        }
        return Ok(());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&channels)?);
    } else {
        for (index, channel) in channels.iter().enumerate() {
            println!("{:>4}  [{}] {}", index, channel.group, channel.name);
        }
    }

    Ok(())
}
