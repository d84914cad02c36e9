//! Ripple-Sitemap main entry point
//!
//! This is the command-line interface for the Ripple-Sitemap generator.

use clap::Parser;
use ripple_sitemap::config::{load_config_with_hash, Config, SitemapOptions};
use ripple_sitemap::crawler::Crawler;
use ripple_sitemap::sitemap::Destination;
use ripple_sitemap::{Notifier, SitemapEvent, SitemapGenerator};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ripple-Sitemap: crawls a site and writes its sitemap
///
/// Pages are crawled breadth-first from the configured site URL. Pages marked
/// noindex, AMP pages and canonicalized duplicates are left out. Large sites
/// are split into several sitemap files referenced from a sitemap index.
#[derive(Parser, Debug)]
#[command(name = "ripple-sitemap")]
#[command(version)]
#[command(about = "Crawls a site and writes its sitemap", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the site URL from the configuration
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Override the sitemap destination path
    #[arg(short, long, value_name = "PATH", conflicts_with = "no_output")]
    output: Option<PathBuf>,

    /// Crawl and report without writing a sitemap
    #[arg(long)]
    no_output: bool,

    /// Validate config and show the resolved settings without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli);

    // Overrides are validated together with the rest of the configuration
    let options = match SitemapOptions::from_config(&config) {
        Ok(options) => options,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &options);
        return Ok(());
    }

    handle_crawl(config, options).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_sitemap=info,warn"),
            1 => EnvFilter::new("ripple_sitemap=debug,info"),
            2 => EnvFilter::new("ripple_sitemap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.url {
        config.site.url = url.clone();
    }
    if let Some(output) = &cli.output {
        config.sitemap.destination = output.display().to_string();
    }
    if cli.no_output {
        config.sitemap.destination = "none".to_string();
    }
}

/// Handles the --dry-run mode: shows the resolved settings
fn handle_dry_run(config: &Config, options: &SitemapOptions) {
    println!("=== Ripple-Sitemap Dry Run ===\n");

    println!("Site: {}", options.site_url);

    println!("\nCrawler Configuration:");
    match config.crawler.max_depth {
        0 => println!("  Max depth: unlimited"),
        depth => println!("  Max depth: {}", depth),
    }
    match config.crawler.max_pages {
        0 => println!("  Max pages: unlimited"),
        pages => println!("  Max pages: {}", pages),
    }
    println!("  User agent: {}", config.crawler.user_agent);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots_txt);
    println!("  Timeout: {}ms", config.crawler.timeout_ms);
    println!("  Strip querystring: {}", config.crawler.strip_querystring);
    println!("  Accept invalid certs: {}", config.crawler.accept_invalid_certs);

    println!("\nSitemap:");
    println!("  Destination: {}", options.destination);
    println!("  Max entries per file: {}", options.max_entries_per_file);
    println!("  Last modified: {}", options.last_mod);
    println!("  Last modified format: {}", options.last_mod_format.as_str());
    println!(
        "  Change frequency: {}",
        options
            .change_freq
            .map(|freq| freq.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  Ignore AMP: {}", options.ignore_amp);
    println!("  Ignore canonicalized: {}", options.ignore_canonicalized);
    println!("  Temp dir: {}", options.temp_dir.display());

    println!("\nPriority Rules ({}):", config.sitemap.priority.len());
    for entry in &config.sitemap.priority {
        println!("  - {} => {:.1}", entry.pattern, entry.priority);
    }

    println!("\n✓ Configuration is valid");
    if options.destination == Destination::Disabled {
        println!("✓ Would crawl {} without writing a sitemap", options.site_url);
    } else {
        println!(
            "✓ Would crawl {} and write {}",
            options.site_url, options.destination
        );
    }
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    options: SitemapOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let (notifier, mut events) = Notifier::channel();
    let reporter = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event);
        }
    });

    let mut generator = SitemapGenerator::new(options, notifier.clone())?;
    let crawler = Crawler::new(&config, notifier)?;

    // Ctrl-C stops the crawl; the pages seen so far still get a sitemap
    let handle = crawler.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing sitemap with the pages crawled so far");
            handle.stop();
        }
    });

    let stats = match crawler.run(&mut generator).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            generator.abandon(&e);
            return Err(e.into());
        }
    };
    if stats.stopped_early {
        tracing::info!("Crawl ended early, sitemap will be partial");
    }

    let outcome = generator.complete();

    // Close the channel so the reporter drains and exits
    drop(crawler);
    if let Err(e) = reporter.await {
        tracing::warn!("Event reporter failed: {}", e);
    }

    match outcome {
        Ok(outcome) => {
            println!("✓ {}", outcome);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Sitemap generation failed: {}", e);
            Err(e.into())
        }
    }
}

/// Logs one pipeline event
fn log_event(event: &SitemapEvent) {
    match event {
        SitemapEvent::Add { url } => tracing::debug!("Added {}", url),
        SitemapEvent::Ignore { url } => tracing::debug!("Ignored {}", url),
        SitemapEvent::Warning { url, message } => tracing::warn!("{}: {}", url, message),
        SitemapEvent::Error { code, message, url } => {
            tracing::warn!("Error {} ({}): {}", code, message, url)
        }
        SitemapEvent::Done => tracing::info!("Done"),
    }
}
