mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{AccountsCommands, Cli, Commands, ReportCommands};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            data_dir,
            cash_account,
        } => cli::init::run(data_dir, cash_account),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add {
                name,
                account_type,
                parent,
            } => cli::accounts::add(&name, &account_type, parent.as_deref()),
            AccountsCommands::List => cli::accounts::list(),
        },
        Commands::Post {
            date,
            amount,
            debit,
            credit,
            description,
        } => cli::post::run(date, amount, &debit, &credit, description),
        Commands::Demo => cli::demo::run(),
        Commands::Report { command } => match command {
            ReportCommands::BalanceSheet { as_of, json } => cli::report::balance_sheet(as_of, json),
            ReportCommands::Income { period, json } => cli::report::income(&period, json),
            ReportCommands::Cashflow {
                period,
                cash_account,
                json,
            } => cli::report::cashflow(&period, cash_account, json),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
