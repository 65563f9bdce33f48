use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing_subscriber::EnvFilter;

use budget_tracker::{
    Direction, Transaction, TransactionForm,
    client::{
        ClientState, Connectivity, ConnectivityMonitor, FlushOutcome, HttpTransactionApi,
        PendingQueue, SubmitOutcome, SyncCoordinator,
    },
};

/// A command line client for the budget tracker that keeps working offline.
///
/// Transactions that cannot be sent are kept in a local queue and sent once
/// the server can be reached again.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The address of the budget tracker server.
    #[arg(long, env = "BUDGET_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// File path to the local queue of unsent transactions.
    #[arg(long, env = "BUDGET_QUEUE_PATH", default_value = "pending.db")]
    queue_path: PathBuf,

    /// How often to check whether the server is reachable in `watch` mode.
    #[arg(long, default_value_t = 5)]
    probe_interval_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record money coming in
    Add {
        /// Name of the transaction, e.g. "Paycheck"
        name: String,
        /// The amount, e.g. 2000
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Record money going out
    Subtract {
        /// Name of the transaction, e.g. "Coffee"
        name: String,
        /// The amount, e.g. 5
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Show the total and every transaction, including unsent ones
    List,
    /// Send queued transactions to the server
    Sync,
    /// Keep running and send queued transactions whenever the server comes back
    Watch,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    let api = HttpTransactionApi::new(&args.server);
    let queue = PendingQueue::open(&args.queue_path)
        .inspect_err(|error| {
            tracing::error!(
                "could not open queue at {}, offline support is disabled: {error}",
                args.queue_path.display()
            )
        })
        .ok();

    let monitor = ConnectivityMonitor::new(
        Connectivity::Offline,
        Duration::from_secs(args.probe_interval_secs),
    );
    let coordinator = SyncCoordinator::new(queue.clone(), api.clone());

    let startup_flush = if monitor.probe(&api).await.is_online() {
        Some(coordinator.flush().await)
    } else {
        tracing::info!("server at {} is unreachable", args.server);
        None
    };

    match args.command {
        Command::Add { name, amount } => submit(api, queue, &name, &amount, Direction::Add).await,
        Command::Subtract { name, amount } => {
            submit(api, queue, &name, &amount, Direction::Subtract).await
        }
        Command::List => {
            list(api, queue).await;
            ExitCode::SUCCESS
        }
        Command::Sync => report_sync(startup_flush, queue.as_ref()),
        Command::Watch => {
            // The startup flush above already covered the current connectivity.
            let connectivity = monitor.subscribe();

            tokio::select! {
                _ = monitor.run(&api) => {},
                _ = coordinator.follow(connectivity) => {},
                _ = signal::ctrl_c() => {
                    tracing::debug!("Received ctrl+c signal.");
                },
            }

            ExitCode::SUCCESS
        }
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn submit(
    api: HttpTransactionApi,
    queue: Option<PendingQueue>,
    name: &str,
    amount: &str,
    direction: Direction,
) -> ExitCode {
    let mut state = ClientState::new(api, queue);
    state.form = TransactionForm::new(name, amount);

    match state.submit(direction).await {
        SubmitOutcome::Saved => {
            println!("Saved {name}.");
            ExitCode::SUCCESS
        }
        SubmitOutcome::Queued => {
            println!("The server is unreachable, {name} will be sent once it is back.");
            ExitCode::SUCCESS
        }
        SubmitOutcome::NotQueued => {
            eprintln!("The server is unreachable and {name} could not be saved locally.");
            ExitCode::FAILURE
        }
        SubmitOutcome::Invalid | SubmitOutcome::Rejected => {
            eprintln!("{}", state.error_message().unwrap_or_default());
            ExitCode::FAILURE
        }
    }
}

async fn list(api: HttpTransactionApi, queue: Option<PendingQueue>) {
    let mut state = ClientState::new(api, queue);

    if let Err(error) = state.load().await {
        eprintln!("Could not get transactions from the server: {error}");
    }

    println!("Total: {}", format_amount(state.total()));

    for transaction in state.pending() {
        print_transaction(transaction, " (pending sync)");
    }

    for transaction in state.transactions() {
        print_transaction(transaction, "");
    }
}

fn print_transaction(transaction: &Transaction, suffix: &str) {
    println!(
        "{}  {:<24} {:>12}{suffix}",
        transaction.date.date(),
        transaction.name,
        format_amount(transaction.value)
    );
}

fn report_sync(outcome: Option<FlushOutcome>, queue: Option<&PendingQueue>) -> ExitCode {
    match outcome {
        Some(FlushOutcome::Flushed(count)) => {
            println!("Sent {count} pending transaction(s).");
            ExitCode::SUCCESS
        }
        Some(FlushOutcome::Empty) => {
            println!("Nothing to send.");
            ExitCode::SUCCESS
        }
        Some(FlushOutcome::Unavailable) => {
            eprintln!("There is no local queue to send.");
            ExitCode::FAILURE
        }
        Some(FlushOutcome::Failed) | Some(FlushOutcome::StorageError) | None => {
            let pending = queue.and_then(|queue| queue.len().ok()).unwrap_or(0);
            eprintln!("Could not send pending transactions, {pending} still waiting.");
            ExitCode::FAILURE
        }
    }
}

fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${amount:.2}")
    }
}
