// webvitals CLI - serve, generate and inspect mock web-vitals analytics
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

// Macro for conditional printing based on quiet flag
macro_rules! qprintln {
    ($quiet:expr, $($arg:tt)*) => {
        if !$quiet {
            println!($($arg)*);
        }
    };
}

use webvitals::{
    init_logging_with_config, load_dashboard, start_server, with_trace_id, AnalyticsGenerator,
    AnalyticsSource, AppConfig, DashboardSnapshot, FilterOptions, HttpAnalyticsSource,
    LatencyProfile, LocalAnalyticsSource, MetricKind, SeededRandomSource, Timeframe,
};

#[derive(Parser)]
#[command(author, version, about = "Mock web-vitals analytics engine and dashboard API")]
struct Cli {
    /// Enable verbose logging (DEBUG level for webvitals)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors and skip decorative output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// TOML configuration file
    #[arg(short, long, global = true, env = "WEBVITALS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Respond without artificial latency
        #[arg(long)]
        no_latency: bool,
        /// Seed the random source for reproducible series
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate one analytics result in-process and print it as JSON
    Generate {
        /// LCP, FID or CLS
        #[arg(short, long)]
        metric: MetricKind,
        /// 24h, 7d or 30d
        #[arg(short, long)]
        timeframe: Timeframe,
        /// Apply the configured artificial latency before generating
        #[arg(long)]
        latency: bool,
        /// Seed the random source for reproducible series
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Fetch one analytics result from a running server and print it as JSON
    Fetch {
        /// Server base URL
        #[arg(long, default_value = "http://127.0.0.1:8788")]
        url: String,
        #[arg(short, long)]
        metric: MetricKind,
        #[arg(short, long)]
        timeframe: Timeframe,
    },

    /// Load all metric cards plus the active chart and print a summary
    Dashboard {
        /// Server base URL; without it the data is generated in-process
        #[arg(long)]
        url: Option<String>,
        /// Metric shown in the chart
        #[arg(short, long, default_value = "LCP")]
        metric: MetricKind,
        #[arg(short, long, default_value = "7d")]
        timeframe: Timeframe,
        /// Print the snapshot as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn generator_for(seed: Option<u64>) -> AnalyticsGenerator {
    match seed {
        Some(seed) => AnalyticsGenerator::new(Arc::new(SeededRandomSource::new(seed))),
        None => AnalyticsGenerator::default(),
    }
}

fn print_snapshot(snapshot: &DashboardSnapshot, quiet: bool) {
    qprintln!(
        quiet,
        "Web vitals: chart {} over {}",
        snapshot.filters.metric,
        snapshot.filters.timeframe
    );
    for card in &snapshot.cards {
        println!("{card}");
    }

    match &snapshot.chart {
        Some(chart) => {
            qprintln!(quiet, "\n{} series:", chart.metric());
            for point in chart.points() {
                println!(
                    "  {}  {}",
                    point.time().format("%Y-%m-%d %H:%M UTC"),
                    chart.metric().format_value(point.value())
                );
            }
        }
        None => println!("\nChart data unavailable"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;

    init_logging_with_config(cli.verbose, cli.quiet, &config.logging.level)?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Serve {
            host,
            port,
            no_latency,
            seed,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if no_latency {
                config.latency.enabled = false;
            }
            config.validate()?;

            qprintln!(quiet, "Starting webvitals HTTP server on {}", config.bind_address());
            qprintln!(quiet, "API endpoints:");
            qprintln!(quiet, "   GET /api/metrics?metric={{LCP|FID|CLS}}&timeframe={{24h|7d|30d}}");
            qprintln!(quiet, "   GET /health");
            qprintln!(quiet, "   GET /stats");

            start_server(&config, generator_for(seed)).await?;
        }

        Commands::Generate {
            metric,
            timeframe,
            latency,
            seed,
        } => {
            let profile = if latency {
                config.latency.profile()
            } else {
                LatencyProfile::none()
            };
            let source = LocalAnalyticsSource::new(generator_for(seed), profile);
            let result = with_trace_id("generate", async {
                Ok::<_, anyhow::Error>(source.fetch(metric, timeframe).await?)
            })
            .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Fetch {
            url,
            metric,
            timeframe,
        } => {
            let source = HttpAnalyticsSource::new(&url)
                .with_context(|| format!("Invalid server URL: {url}"))?;
            let result = source
                .fetch(metric, timeframe)
                .await
                .with_context(|| format!("Failed to fetch {metric} over {timeframe} from {url}"))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Dashboard {
            url,
            metric,
            timeframe,
            json,
        } => {
            let source: Box<dyn AnalyticsSource> = match url {
                Some(url) => Box::new(
                    HttpAnalyticsSource::new(&url)
                        .with_context(|| format!("Invalid server URL: {url}"))?,
                ),
                None => Box::new(LocalAnalyticsSource::new(
                    AnalyticsGenerator::default(),
                    config.latency.profile(),
                )),
            };

            let snapshot = load_dashboard(source.as_ref(), FilterOptions { metric, timeframe }).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(&snapshot, quiet);
            }
        }
    }

    Ok(())
}
