use ticker_analysis::config::{Config, DEFAULT_END, DEFAULT_START, DEFAULT_TICKER};
use ticker_analysis::data_provider::PriceHistoryProvider;
use ticker_analysis::report;
use ticker_analysis::scrapers::base::{FundamentalsSource, PriceSource};
use ticker_analysis::scrapers::yahoo::YahooScraper;
use ticker_analysis::services::analysis_service::AnalysisService;
use ticker_analysis::util::parse_cli_date;

use anyhow::{bail, Context};
use clap::{App, Arg, SubCommand};
use log::info;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let app = App::new("ticker_analysis")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Moving averages, regression and fundamentals for a single ticker")
        .subcommand(
            SubCommand::with_name("analyze")
                .about("Fetch prices, chart moving averages and print the report")
                .arg(
                    Arg::with_name("ticker")
                        .short('t')
                        .long("ticker")
                        .value_name("TICKER")
                        .help("Ticker symbol as listed on Yahoo Finance")
                        .takes_value(true)
                        .default_value(DEFAULT_TICKER),
                )
                .arg(
                    Arg::with_name("start")
                        .short('s')
                        .long("start")
                        .value_name("DATE")
                        .help("First date of the price range (YYYY-MM-DD)")
                        .takes_value(true)
                        .default_value(DEFAULT_START),
                )
                .arg(
                    Arg::with_name("end")
                        .short('e')
                        .long("end")
                        .value_name("DATE")
                        .help("End of the price range, exclusive (YYYY-MM-DD)")
                        .takes_value(true)
                        .default_value(DEFAULT_END),
                )
                .arg(
                    Arg::with_name("chart")
                        .short('c')
                        .long("chart")
                        .value_name("PATH")
                        .help("Where to write the SVG chart")
                        .takes_value(true)
                        .default_value("chart.svg"),
                )
                .arg(
                    Arg::with_name("export")
                        .long("export")
                        .value_name("PATH")
                        .help("Also save the price table with moving averages as an Arrow file")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("short-window")
                        .long("short-window")
                        .value_name("DAYS")
                        .help("Window of the short moving average")
                        .takes_value(true)
                        .default_value("50"),
                )
                .arg(
                    Arg::with_name("long-window")
                        .long("long-window")
                        .value_name("DAYS")
                        .help("Window of the long moving average")
                        .takes_value(true)
                        .default_value("200"),
                )
                .arg(
                    Arg::with_name("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Seed of the train/test shuffle")
                        .takes_value(true)
                        .default_value("42"),
                )
                .arg(
                    Arg::with_name("timeout")
                        .long("timeout")
                        .value_name("SECONDS")
                        .help("HTTP request timeout")
                        .takes_value(true)
                        .default_value("30"),
                )
                .arg(
                    Arg::with_name("skip-fundamentals")
                        .long("skip-fundamentals")
                        .help("Do not scrape the key statistics page")
                        .takes_value(false),
                ),
        )
        .subcommand(
            SubCommand::with_name("explore")
                .about("Show rows of a previously exported Arrow file")
                .arg(
                    Arg::with_name("file")
                        .short('f')
                        .long("file")
                        .value_name("PATH")
                        .help("Arrow file written by `analyze --export`")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Number of most recent rows to display")
                        .takes_value(true)
                        .default_value("10"),
                ),
        );

    let matches = app.get_matches();

    if let Some(matches) = matches.subcommand_matches("analyze") {
        let ticker = matches.value_of("ticker").unwrap_or(DEFAULT_TICKER);
        let start = parse_cli_date(matches.value_of("start").unwrap_or(DEFAULT_START))?;
        let end_label = matches.value_of("end").unwrap_or(DEFAULT_END);
        let end = parse_cli_date(end_label)?;
        if end <= start {
            bail!("End date {} must be after start date {}", end, start);
        }

        let short_window = matches
            .value_of("short-window")
            .unwrap_or("50")
            .parse::<usize>()
            .context("--short-window must be a whole number")?;
        let long_window = matches
            .value_of("long-window")
            .unwrap_or("200")
            .parse::<usize>()
            .context("--long-window must be a whole number")?;
        let seed = matches
            .value_of("seed")
            .unwrap_or("42")
            .parse::<u64>()
            .context("--seed must be a whole number")?;
        let timeout = matches
            .value_of("timeout")
            .unwrap_or("30")
            .parse::<u64>()
            .context("--timeout must be a number of seconds")?;

        let config = Config::new()
            .with_ticker(ticker)
            .with_date_range(start, end)
            .with_sma_windows(short_window, long_window)
            .with_random_seed(seed)
            .with_http_timeout(Duration::from_secs(timeout))
            .with_chart_path(matches.value_of("chart").unwrap_or("chart.svg"))
            .with_export_path(matches.value_of("export"))
            .with_fetch_fundamentals(!matches.is_present("skip-fundamentals"));

        info!("Analyzing {} from {} to {}", config.ticker, config.start, config.end);

        let scraper = Arc::new(YahooScraper::new(&config)?);
        let prices: Arc<dyn PriceSource + Send + Sync> = scraper.clone();
        let fundamentals: Arc<dyn FundamentalsSource + Send + Sync> = scraper;

        let service = AnalysisService::new(config, prices, fundamentals);
        let outcome = service
            .run()
            .await
            .with_context(|| format!("analysis of {} failed", service.config().ticker))?;

        print!("{}", report::format_report(&outcome.report, end_label));

        if let Some(err) = outcome.fundamentals_error {
            return Err(anyhow::Error::new(err).context(format!(
                "key statistics for {} could not be scraped",
                service.config().ticker
            )));
        }
    } else if let Some(matches) = matches.subcommand_matches("explore") {
        let file = matches.value_of("file").unwrap_or_default();
        let limit = matches
            .value_of("limit")
            .unwrap_or("10")
            .parse::<usize>()
            .unwrap_or(10);

        let provider = PriceHistoryProvider::load_from_file(file)
            .with_context(|| format!("cannot read {}", file))?;
        let history = provider.history();

        println!(
            "{} ({}) - {} rows, latest {}",
            history.ticker,
            history.currency.as_deref().unwrap_or("-"),
            history.rows.len(),
            provider
                .get_latest_trading_date()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "n/a".to_string())
        );
        println!("{:-<96}", "");
        println!(
            "{:<12} {:<10} {:<10} {:<10} {:<10} {:<14} {:<12} {:<12}",
            "Date", "Open", "High", "Low", "Close", "Volume", "SMA short", "SMA long"
        );
        println!("{:-<96}", "");

        for row in provider.latest_rows(limit) {
            println!(
                "{:<12} {:<10.2} {:<10.2} {:<10.2} {:<10.2} {:<14} {:<12.2} {:<12.2}",
                row.bar.date.format("%Y-%m-%d").to_string(),
                row.bar.open,
                row.bar.high,
                row.bar.low,
                row.bar.close,
                row.bar.volume,
                row.sma_short,
                row.sma_long
            );
        }

        if history.rows.len() > limit {
            println!("... and {} more records", history.rows.len() - limit);
        } else if history.rows.is_empty() {
            println!("No rows in this file");
        }
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}
