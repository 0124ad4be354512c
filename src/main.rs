/**
* filename : main
* author : HAMA
* date: 2025. 5. 8.
* description: testnet order bot CLI (market / limit / twap)
**/

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use testnet_trader::config::{Config, RemainderPolicy, StepFailurePolicy, Venue, DEFAULT_CONFIG_PATH};
use testnet_trader::order_core::validator::{RawOrder, RawTwap};
use testnet_trader::utils::logging;
use testnet_trader::{Bot, Job};

#[derive(Parser)]
#[command(name = "bot", version, about = "Binance testnet order bot: market, limit and TWAP orders")]
struct Cli {
    /// API key (defaults to BINANCE_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// API secret (defaults to BINANCE_API_SECRET)
    #[arg(long, global = true)]
    api_secret: Option<String>,

    /// REST base URL (defaults to BASE_URL, then the venue's testnet)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// futures or spot
    #[arg(long, global = true)]
    venue: Option<Venue>,

    /// JSON configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Acknowledge orders locally without contacting the exchange.
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,

    /// Floor quantity and price to the symbol's lot step and tick size.
    #[arg(long, global = true, default_value_t = false)]
    round: bool,

    /// TWAP behaviour after a failed step: continue or abort
    #[arg(long, global = true)]
    on_step_failure: Option<StepFailurePolicy>,

    /// TWAP remainder handling: none or last-piece
    #[arg(long, global = true)]
    remainder: Option<RemainderPolicy>,

    /// Audit log file (defaults to BOT_LOGFILE, then bot.log)
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct OrderArgs {
    /// Instrument, e.g. BTCUSDT
    #[arg(long)]
    symbol: String,

    /// BUY or SELL (case-insensitive)
    #[arg(long)]
    side: String,

    #[arg(long, allow_hyphen_values = true)]
    quantity: String,
}

impl OrderArgs {
    fn raw(&self, price: Option<&str>) -> RawOrder {
        RawOrder {
            symbol: self.symbol.clone(),
            side: self.side.clone(),
            quantity: self.quantity.clone(),
            price: price.map(str::to_string),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Place a market order.
    Market {
        #[command(flatten)]
        order: OrderArgs,
    },
    /// Place a GTC limit order.
    Limit {
        #[command(flatten)]
        order: OrderArgs,

        #[arg(long, allow_hyphen_values = true)]
        price: String,
    },
    /// Split a market order into equal pieces submitted at a fixed interval.
    Twap {
        #[command(flatten)]
        order: OrderArgs,

        /// Number of pieces
        #[arg(long, default_value = "3", allow_hyphen_values = true)]
        parts: String,

        /// Seconds between pieces
        #[arg(long, default_value = "5", allow_hyphen_values = true)]
        interval: String,
    },
}

impl Command {
    fn job(&self) -> Result<Job, testnet_trader::ValidationError> {
        match self {
            Command::Market { order } => Job::market(&order.raw(None)),
            Command::Limit { order, price } => Job::limit(&order.raw(Some(price))),
            Command::Twap { order, parts, interval } => Job::twap(&RawTwap {
                order: order.raw(None),
                parts: parts.clone(),
                interval: interval.clone(),
            }),
        }
    }
}

impl Cli {
    /// 명령줄 인수가 파일/환경 변수 설정보다 우선한다
    fn apply(&self, config: &mut Config) {
        if let Some(v) = &self.api_key { config.exchange.api_key = Some(v.clone()); }
        if let Some(v) = &self.api_secret { config.exchange.api_secret = Some(v.clone()); }
        if let Some(v) = &self.base_url { config.exchange.base_url = Some(v.clone()); }
        if let Some(v) = self.venue { config.exchange.venue = v; }
        if self.dry_run { config.exchange.dry_run = true; }
        if self.round { config.execution.round_to_instrument_increments = true; }
        if let Some(v) = self.on_step_failure { config.execution.on_step_failure = v; }
        if let Some(v) = self.remainder { config.execution.remainder = v; }
        if let Some(v) = &self.log_file { config.logging.file_path = Some(v.clone()); }
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // .env 적재 (이미 설정된 환경 변수가 우선)
    let _ = dotenvy::dotenv();

    // 설정 로드
    let mut config = Config::load_from(&cli.config)?;
    cli.apply(&mut config);

    // 로깅 초기화
    logging::init(&config.logging.level)?;

    // 입력 검증 (거래소 연결 전)
    let job = cli.command.job()?;

    let bot = Bot::from_config(&config).context("failed to initialise bot")?;
    let output = bot.execute(&job).await;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
