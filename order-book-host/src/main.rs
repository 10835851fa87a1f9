//! # Order Book Host
//!
//! A command-line host process for one order book instance, bound to a
//! single asset id. Exactly one instance may run per asset — a second
//! process for the same asset fails fast instead of racing the first one's
//! in-memory state.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use order_book_core::units::{AssetUnit, Money};
use order_book_core::{Action, ExternalUpdate, Side, UpdateDispatcher};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "order-book-host")]
#[command(about = "Hosts a single-asset limit order book", long_about =
    "Hosts a single-asset limit order book. You must have only one instance \
     of this process running per asset id.")]
struct Cli {
    /// Asset id this instance exclusively handles (e.g. BTC). Mandatory —
    /// there is no default, since running without one risks mixing up
    /// updates meant for a different book.
    #[arg(long)]
    asset_id: String,

    /// Directory for the per-asset instance lock file.
    #[arg(long, default_value = "/tmp/order-book-host")]
    lock_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a resting order
    Add {
        id: String,
        side: Side,
        price: String,
        amount: String,
        #[arg(long)]
        mine: bool,
    },
    /// Delete a resting order
    Delete { id: String },
    /// Apply a (partial or full) traded fill to a resting order
    Traded { id: String, amount: String },
    /// Clear the `in_trade` flag on a resting order stuck after a lost settlement
    ResetInTrade { id: String },
    /// Show best bid/ask
    Best,
    /// Show market depth
    Depth {
        #[arg(default_value = "5")]
        levels: usize,
    },
    /// Show resting order counts
    Counts,
    /// Exit interactive mode
    Quit,
    /// Start interactive mode
    Interactive,
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let _lock = match acquire_instance_lock(&cli.lock_dir, &cli.asset_id) {
        Ok(lock) => lock,
        Err(e) => {
            eprintln!("Cannot start: {e}");
            std::process::exit(1);
        }
    };

    let dispatcher = UpdateDispatcher::new(cli.asset_id.clone());

    match cli.command {
        None | Some(Commands::Interactive) => run_interactive_mode(&dispatcher),
        Some(command) => run_command(&dispatcher, command),
    }
}

/// A held exclusive lock file; removed on drop so a subsequent run can start
/// cleanly once this process exits.
struct InstanceLock {
    path: PathBuf,
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Fails if another process already holds the lock file for `asset_id`.
/// `OpenOptions::create_new` is atomic (`O_EXCL`), so two processes racing to
/// start never both succeed.
fn acquire_instance_lock(lock_dir: &PathBuf, asset_id: &str) -> io::Result<InstanceLock> {
    std::fs::create_dir_all(lock_dir)?;
    let path = lock_dir.join(format!("{asset_id}.lock"));
    match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            writeln!(file, "{}", std::process::id())?;
            Ok(InstanceLock { path })
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "an order-book-host instance for asset \"{asset_id}\" is already running \
                 (lock file {})",
                path.display()
            ),
        )),
        Err(e) => Err(e),
    }
}

fn run_command(dispatcher: &UpdateDispatcher, command: Commands) {
    match command {
        Commands::Add { id, side, price, amount, mine } => {
            match build_update(dispatcher, Action::Added, id, Some(side), Some(price), Some(amount), mine) {
                Ok(update) => report_dispatch(dispatcher.dispatch(update)),
                Err(e) => fail(&e),
            }
        }
        Commands::Delete { id } => {
            match build_update(dispatcher, Action::Deleted, id, None, None, None, false) {
                Ok(update) => report_dispatch(dispatcher.dispatch(update)),
                Err(e) => fail(&e),
            }
        }
        Commands::Traded { id, amount } => {
            match build_update(dispatcher, Action::Traded, id, None, None, Some(amount), false) {
                Ok(update) => report_dispatch(dispatcher.dispatch(update)),
                Err(e) => fail(&e),
            }
        }
        Commands::ResetInTrade { id } => {
            if dispatcher.book().reset_in_trade(&id) {
                println!("in_trade cleared for {id}");
            } else {
                println!("unknown order id {id}");
            }
        }
        Commands::Best => print_best(dispatcher),
        Commands::Depth { levels } => print_depth(dispatcher, levels),
        Commands::Counts => print_counts(dispatcher),
        Commands::Quit | Commands::Interactive => {}
    }
}

/// Builds an `ExternalUpdate` from CLI-provided fields. `price`/`amount` are
/// required for `added`/`traded` respectively; absent fields default to zero
/// and let the dispatcher's own validation reject anything that matters.
fn build_update(
    dispatcher: &UpdateDispatcher,
    action: Action,
    id: String,
    side: Option<Side>,
    price: Option<String>,
    amount: Option<String>,
    mine: bool,
) -> Result<ExternalUpdate, String> {
    let price = match price {
        Some(p) => Money::from_str(&p).map_err(|e| e.to_string())?,
        None => Money::ZERO,
    };
    let amount = match amount {
        Some(a) => AssetUnit::from_str(&a).map_err(|e| e.to_string())?,
        None => AssetUnit::ZERO,
    };
    Ok(ExternalUpdate {
        id,
        asset_id: dispatcher.book().asset_id().to_string(),
        price,
        amount,
        side: side.unwrap_or(Side::Buy),
        timestamp: Utc::now(),
        mine,
        action,
    })
}

fn report_dispatch(result: Result<order_book_core::DispatchOutcome, order_book_core::ValidationError>) {
    match result {
        Ok(outcome) => {
            println!(
                "ok — buy_orders={} sell_orders={}",
                outcome.response.buy_orders_count, outcome.response.sell_orders_count
            );
            if let Some(tr) = outcome.trade_request {
                println!(
                    "trade request: {} between {} (interested) and {} (interest)",
                    tr.amount, tr.interested.external_id, tr.interest.external_id
                );
            }
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn fail(message: &str) {
    eprintln!("error: {message}");
}

fn print_best(dispatcher: &UpdateDispatcher) {
    let book = dispatcher.book();
    match (book.best(Side::Buy), book.best(Side::Sell)) {
        (Some((bp, bq)), Some((sp, sq))) => {
            println!("best buy:  {bq} @ {bp}");
            println!("best sell: {sq} @ {sp}");
        }
        (Some((bp, bq)), None) => println!("best buy:  {bq} @ {bp}\nbest sell: none"),
        (None, Some((sp, sq))) => println!("best buy:  none\nbest sell: {sq} @ {sp}"),
        (None, None) => println!("order book is empty"),
    }
}

fn print_depth(dispatcher: &UpdateDispatcher, levels: usize) {
    let book = dispatcher.book();
    println!("sells (best first):");
    for (price, amount) in book.depth(Side::Sell, levels) {
        println!("  {amount} @ {price}");
    }
    println!("buys (best first):");
    for (price, amount) in book.depth(Side::Buy, levels) {
        println!("  {amount} @ {price}");
    }
}

fn print_counts(dispatcher: &UpdateDispatcher) {
    let (buy, sell) = dispatcher.book().counts();
    println!("buy_orders={buy} sell_orders={sell}");
}

fn parse_interactive_command(input: &str) -> Result<Commands, String> {
    let args = shlex::split(input).ok_or("invalid command syntax")?;
    if args.is_empty() {
        return Err("empty command".to_string());
    }
    let mut full_args = vec!["order-book-host-interactive".to_string()];
    full_args.extend(args);

    #[derive(Parser)]
    struct Interactive {
        #[command(subcommand)]
        command: Commands,
    }

    Interactive::try_parse_from(full_args)
        .map(|i| i.command)
        .map_err(|e| e.to_string())
}

fn run_interactive_mode(dispatcher: &UpdateDispatcher) {
    println!("order book host — asset {}", dispatcher.book().asset_id());
    println!("type 'help' for commands, 'quit' to exit\n");

    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            break;
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "help" || trimmed == "h" {
            show_help();
            continue;
        }

        match parse_interactive_command(trimmed) {
            Ok(Commands::Quit) => break,
            Ok(command) => run_command(dispatcher, command),
            Err(e) => println!("error: {}", e.lines().next().unwrap_or("invalid command")),
        }
    }
}

fn show_help() {
    println!("commands:");
    println!("  add <id> <buy|sell> <price> <amount> [--mine]");
    println!("  delete <id>");
    println!("  traded <id> <amount>");
    println!("  reset-in-trade <id>");
    println!("  best");
    println!("  depth [levels]");
    println!("  counts");
    println!("  quit");
}
