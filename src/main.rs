use clap::{ArgAction, Parser};
use log::{LevelFilter, debug, warn};
use procurement_ledger::{ContractError, Function, LedgerConfig, ProcurementContract, TxContext, entity::TimeStamp, invoke};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "procurement-cli", version, about = "Invoke procurement chaincode functions against a local ledger")]
struct Cli {
    /// Increase output verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[arg(long, env = "PROCUREMENT_LEDGER_PATH", default_value = procurement_ledger::config::DEFAULT_LEDGER_PATH)]
    ledger_path: PathBuf,

    /// Discard the ledger on exit
    #[arg(long, env = "PROCUREMENT_TEMPORARY")]
    temporary: bool,

    /// Transaction id, generated when omitted
    #[arg(long)]
    tx_id: Option<String>,

    function: String,

    args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logger = simple_logger::SimpleLogger::new().with_utc_timestamps();
    let logger = match cli.verbose {
        0 => logger.with_level(LevelFilter::Warn),
        1 => logger.with_level(LevelFilter::Info),
        2 => logger.with_level(LevelFilter::Debug),
        _ => logger.with_level(LevelFilter::Trace),
    };
    if let Err(err) = logger.init() {
        eprintln!("failed to initialise logger: {err}");
    }

    match run(&cli) {
        Ok(response) => {
            println!("{response}");
            ExitCode::SUCCESS
        }
        Err(err) => match err.downcast_ref::<ContractError>() {
            Some(contract_err) => {
                let kind = contract_err.kind();
                eprintln!("{kind}: {contract_err}");
                if kind.is_retryable() {
                    ExitCode::from(2)
                } else {
                    ExitCode::from(1)
                }
            }
            None => {
                eprintln!("{err:#}");
                ExitCode::from(1)
            }
        },
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let function: Function = cli.function.parse()?;
    let args: Vec<&str> = cli.args.iter().map(String::as_str).collect();

    let ctx = match &cli.tx_id {
        Some(tx_id) => TxContext::new(tx_id.as_str(), TimeStamp::new()),
        None => TxContext::generate(function.name(), &args)?,
    };
    debug!("invoking {} as {}", function, ctx.tx_id);

    // queries never commit, so there is nothing to flush
    let ledger = LedgerConfig::new()
        .set_path(&cli.ledger_path)
        .set_temporary(cli.temporary)
        .set_flush_on_commit(!function.is_query())
        .open()
        .map_err(|err| {
            warn!("failed to open ledger at {}", cli.ledger_path.display());
            ContractError::from(err)
        })?;

    let contract = ProcurementContract::new(ledger);
    Ok(invoke(&contract, &ctx, function.name(), &args)?)
}
