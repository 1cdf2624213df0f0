//! GymFlow CLI
//!
//! Staff-facing command line for the Graha Fitness backend. All mutating
//! commands keep working while the server is down: they are queued locally
//! and replayed by `gymflow sync` or the long-running `gymflow watch`.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gymflow_core::{ApiClient, Config, OfflineQueue, SessionStore};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "gymflow")]
#[command(about = "GymFlow - gym management client with offline sync")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the backend
    Login {
        username: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Drop the local session
    Logout,
    /// Manage members
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },
    /// List check-ins for a day
    Attendance {
        /// Day to list (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Manage income/expense transactions
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },
    /// Manage food/retail stock
    Stock {
        #[command(subcommand)]
        command: StockCommands,
    },
    /// Download a report export
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Replay queued requests now
    Sync,
    /// Show connectivity, session, and pending queue
    Status,
    /// Monitor connectivity and sync automatically
    Watch,
}

#[derive(Subcommand)]
enum MemberCommands {
    /// List members
    #[command(alias = "ls")]
    List {
        /// Filter by name or phone
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Register a new member
    Add {
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        plan: String,
        /// Membership start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Membership end date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },
    /// Update member fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a member
    #[command(alias = "rm")]
    Delete { id: String },
    /// Check a member in
    Checkin { id: String },
}

#[derive(Subcommand)]
enum TxCommands {
    /// List transactions
    #[command(alias = "ls")]
    List {
        /// Filter by type (income/expense)
        #[arg(long)]
        r#type: Option<String>,
        /// Filter by month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },
    /// Record a transaction
    Add {
        /// income or expense
        r#type: String,
        category: String,
        amount: i64,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Update transaction fields
    Update {
        id: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<i64>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete a transaction (superadmin only)
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand)]
enum StockCommands {
    /// List stock items
    #[command(alias = "ls")]
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add a stock item
    Add {
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "pcs")]
        unit: String,
        #[arg(long, default_value_t = 0)]
        quantity: i64,
        /// Low-stock warning threshold
        #[arg(long, default_value_t = 5)]
        min_threshold: i64,
    },
    /// Update stock item fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        quantity: Option<i64>,
        #[arg(long)]
        min_threshold: Option<i64>,
    },
    /// Delete a stock item
    #[command(alias = "rm")]
    Delete { id: String },
    /// List recent stock movements
    Movements,
    /// Record a stock movement
    Movement {
        /// Stock item id
        id: String,
        /// in or out
        r#type: String,
        quantity: i64,
        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Finance report (income/expense)
    Finance {
        #[arg(long, default_value = "xlsx")]
        format: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// Output file path
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Attendance report
    Attendance {
        #[arg(long, default_value = "xlsx")]
        format: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(short, long)]
        out: Option<String>,
    },
}

/// Shared application context built from the config
struct App {
    config: Config,
    client: Arc<ApiClient>,
}

impl App {
    fn open() -> Result<Self> {
        let config = Config::load()?;
        let sessions = SessionStore::open(&config).into_shared();
        let queue = OfflineQueue::with_path(config.queue_path()).into_shared();
        let client = Arc::new(ApiClient::new(&config, sessions, queue)?);
        Ok(Self { config, client })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let app = App::open()?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::login::login(&app.client, &username, password, &output).await
        }
        Commands::Logout => commands::login::logout(&app.client, &output).await,
        Commands::Member { command } => handle_member_command(command, &app, &output).await,
        Commands::Attendance { date } => {
            commands::attendance::list(&app.client, date, &output).await
        }
        Commands::Tx { command } => handle_tx_command(command, &app, &output).await,
        Commands::Stock { command } => handle_stock_command(command, &app, &output).await,
        Commands::Report { command } => handle_report_command(command, &app, &output).await,
        Commands::Sync => commands::sync::sync_now(&app.client, &output).await,
        Commands::Status => commands::status::show(&app.config, &app.client, &output).await,
        Commands::Watch => commands::watch::run(&app.config, app.client.clone(), &output).await,
    }
}

async fn handle_member_command(command: MemberCommands, app: &App, output: &Output) -> Result<()> {
    match command {
        MemberCommands::List { search } => commands::member::list(&app.client, search, output).await,
        MemberCommands::Add {
            name,
            phone,
            plan,
            start,
            end,
        } => commands::member::add(&app.client, name, phone, plan, start, end, output).await,
        MemberCommands::Update {
            id,
            name,
            phone,
            plan,
            start,
            end,
            status,
        } => {
            commands::member::update(&app.client, id, name, phone, plan, start, end, status, output)
                .await
        }
        MemberCommands::Delete { id } => commands::member::delete(&app.client, id, output).await,
        MemberCommands::Checkin { id } => commands::member::checkin(&app.client, id, output).await,
    }
}

async fn handle_tx_command(command: TxCommands, app: &App, output: &Output) -> Result<()> {
    match command {
        TxCommands::List { r#type, month } => {
            commands::transaction::list(&app.client, r#type, month, output).await
        }
        TxCommands::Add {
            r#type,
            category,
            amount,
            date,
            note,
        } => {
            commands::transaction::add(&app.client, r#type, category, amount, date, note, output)
                .await
        }
        TxCommands::Update {
            id,
            category,
            amount,
            date,
            note,
        } => {
            commands::transaction::update(&app.client, id, category, amount, date, note, output)
                .await
        }
        TxCommands::Delete { id } => commands::transaction::delete(&app.client, id, output).await,
    }
}

async fn handle_stock_command(command: StockCommands, app: &App, output: &Output) -> Result<()> {
    match command {
        StockCommands::List { search } => commands::stock::list(&app.client, search, output).await,
        StockCommands::Add {
            name,
            category,
            unit,
            quantity,
            min_threshold,
        } => {
            commands::stock::add(&app.client, name, category, unit, quantity, min_threshold, output)
                .await
        }
        StockCommands::Update {
            id,
            name,
            category,
            unit,
            quantity,
            min_threshold,
        } => {
            commands::stock::update(
                &app.client,
                id,
                name,
                category,
                unit,
                quantity,
                min_threshold,
                output,
            )
            .await
        }
        StockCommands::Delete { id } => commands::stock::delete(&app.client, id, output).await,
        StockCommands::Movements => commands::stock::movements(&app.client, output).await,
        StockCommands::Movement {
            id,
            r#type,
            quantity,
            note,
        } => commands::stock::movement(&app.client, id, r#type, quantity, note, output).await,
    }
}

async fn handle_report_command(command: ReportCommands, app: &App, output: &Output) -> Result<()> {
    match command {
        ReportCommands::Finance {
            format,
            start,
            end,
            out,
        } => commands::report::download(&app.client, "finance", format, start, end, out, output).await,
        ReportCommands::Attendance {
            format,
            start,
            end,
            out,
        } => {
            commands::report::download(&app.client, "attendance", format, start, end, out, output)
                .await
        }
    }
}
