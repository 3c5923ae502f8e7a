//! CLI entry point for the fulltext tool.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use fulltext_core::download::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use fulltext_core::idconv::NCBI_TOOL;
use fulltext_core::{
    ArticleIds, DiscoveryOptions, DownloadOptions, Downloader, FulltextMeta, HttpSettings,
    IdResolver, build_providers_with, generate_key,
};
use tracing::{debug, info, warn};

mod app_config;
mod cli;

use app_config::FileConfig;
use cli::{Args, CiteKeyArgs, Command, ConvertIdsArgs, FetchArgs, FetchKind, LocateArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = app_config::load_file_config(args.config.as_deref())?;
    debug!(?config, "configuration loaded");

    match args.command {
        Command::Locate(locate) => run_locate(locate, &config).await,
        Command::Fetch(fetch) => run_fetch(fetch, &config).await,
        Command::ConvertIds(convert) => run_convert_ids(convert, &config).await,
        Command::CiteKey(cite) => {
            run_cite_key(&cite);
            Ok(())
        }
    }
}

fn http_settings(base: HttpSettings, config: &FileConfig) -> HttpSettings {
    base.with_timeouts(config.connect_timeout_secs, config.read_timeout_secs)
}

// ==================== locate ====================

async fn run_locate(args: LocateArgs, config: &FileConfig) -> Result<()> {
    let mut ids = ArticleIds::new();
    if let Some(doi) = args.doi {
        ids = ids.with_doi(doi);
    }
    if let Some(pmid) = args.pmid {
        ids = ids.with_pmid(pmid);
    }
    if let Some(pmcid) = args.pmcid {
        ids = ids.with_pmcid(pmcid);
    }
    if let Some(arxiv) = args.arxiv {
        ids = ids.with_arxiv_id(arxiv);
    }
    if ids.is_empty() {
        bail!("at least one non-blank identifier is required");
    }

    let email = args.email.or_else(|| config.contact_email.clone());
    let core_api_key = args.core_api_key.or_else(|| config.core_api_key.clone());

    let mut options = DiscoveryOptions::new();
    if let Some(email) = email.clone() {
        options = options.with_email(email);
    }
    if let Some(key) = core_api_key {
        options = options.with_core_api_key(key);
    }

    let settings = http_settings(HttpSettings::discovery(), config);
    let providers = build_providers_with(settings, email);

    let mut locations = Vec::new();
    let mut checked = Vec::new();
    for provider in &providers {
        match provider.check(&ids, &options).await {
            Ok(found) => {
                checked.push(provider.source());
                let found = found.unwrap_or_default();
                debug!(provider = provider.name(), count = found.len(), "provider checked");
                locations.extend(found);
            }
            Err(error) if error.is_configuration() => {
                info!(provider = provider.name(), error = %error, "provider skipped");
            }
            Err(error) => {
                warn!(provider = provider.name(), error = %error, "provider check failed");
            }
        }
    }

    let meta = FulltextMeta::from_locations(locations, &checked);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
    } else {
        for location in &meta.locations {
            println!(
                "{}\t{}\t{}\t{}",
                location.source().as_str(),
                location.url_type().as_str(),
                location.version().as_str(),
                location.url()
            );
        }
        info!(
            status = ?meta.oa_status,
            locations = meta.locations.len(),
            checked = meta.checked_sources.len(),
            "Discovery complete"
        );
    }
    Ok(())
}

// ==================== fetch ====================

async fn run_fetch(args: FetchArgs, config: &FileConfig) -> Result<()> {
    let options = DownloadOptions {
        retries: args
            .retries
            .or(config.retries)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS),
        retry_delay: args
            .retry_delay_ms
            .or(config.retry_delay_ms)
            .map_or(DEFAULT_RETRY_DELAY, Duration::from_millis),
    };
    debug!(?options, kind = ?args.kind, "fetch options resolved");

    let downloader = Downloader::new(http_settings(HttpSettings::download(), config))?;
    let result = match args.kind {
        FetchKind::Pdf => downloader.download(&args.target, &args.dest, &options).await,
        FetchKind::Xml => {
            downloader
                .download_pmc_xml(&args.target, &args.dest, &options)
                .await
        }
        FetchKind::Html => {
            downloader
                .download_arxiv_html(&args.target, &args.dest, &options)
                .await
        }
    };

    match result.size() {
        Some(size) => {
            info!(bytes = size, dest = %args.dest.display(), "Download complete");
            println!("{size}\t{}", args.dest.display());
            Ok(())
        }
        None => bail!(
            "download failed: {}",
            result.error().unwrap_or("unknown error")
        ),
    }
}

// ==================== convert-ids ====================

async fn run_convert_ids(args: ConvertIdsArgs, config: &FileConfig) -> Result<()> {
    let email = args.email.or_else(|| config.contact_email.clone());
    let resolver = IdResolver::new(http_settings(HttpSettings::discovery(), config))?
        .with_identity(Some(NCBI_TOOL.to_string()), email);

    let resolved = resolver.resolve_batch(args.ids.as_slice()).await?;
    info!(
        requested = args.ids.len(),
        resolved = resolved.len(),
        "ID conversion complete"
    );

    // Sorted for stable output.
    let sorted: BTreeMap<_, _> = resolved.into_iter().collect();
    println!("{}", serde_json::to_string_pretty(&sorted)?);
    Ok(())
}

// ==================== cite-key ====================

fn run_cite_key(args: &CiteKeyArgs) {
    let existing: HashSet<String> = args
        .existing
        .iter()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .collect();
    let key = generate_key(args.author.as_deref(), args.year.as_deref(), &existing);
    println!("{key}");
}
