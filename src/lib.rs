pub mod builder;
pub mod config;
pub mod context;
pub mod contract;
pub mod entity;
pub mod error;
pub mod history;
pub mod invoke;
pub mod ledger;
pub mod sled_ledger;
pub mod transition;
pub mod utils;
pub mod validation;

pub use config::LedgerConfig;
pub use context::TxContext;
pub use contract::ProcurementContract;
pub use error::{ContractError, ErrorKind, LedgerError, Result, ValidationError};
pub use invoke::{Function, invoke};
pub use ledger::{Ledger, MemoryLedger};
pub use sled_ledger::SledLedger;
