//! Routes a named function call from the transport layer to the contract.
//!
//! Arguments arrive as strings, responses leave as JSON text: the entity for
//! single-record operations, an array for history queries.
use super::context::TxContext;
use super::contract::ProcurementContract;
use super::entity::Bid;
use super::error::{ContractError, Result};
use super::ledger::Ledger;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    RegisterVendor,
    CreateTender,
    SubmitBid,
    GetBid,
    UpdateBidStatus,
    GetBidHistory,
    GetVendor,
    GetTender,
    SetVendorBlacklisted,
    UpdateTenderStatus,
    GetBidRevisions,
}

impl Function {
    pub const ALL: [Function; 11] = [
        Function::RegisterVendor,
        Function::CreateTender,
        Function::SubmitBid,
        Function::GetBid,
        Function::UpdateBidStatus,
        Function::GetBidHistory,
        Function::GetVendor,
        Function::GetTender,
        Function::SetVendorBlacklisted,
        Function::UpdateTenderStatus,
        Function::GetBidRevisions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Function::RegisterVendor => "RegisterVendor",
            Function::CreateTender => "CreateTender",
            Function::SubmitBid => "SubmitBid",
            Function::GetBid => "GetBid",
            Function::UpdateBidStatus => "UpdateBidStatus",
            Function::GetBidHistory => "GetBidHistory",
            Function::GetVendor => "GetVendor",
            Function::GetTender => "GetTender",
            Function::SetVendorBlacklisted => "SetVendorBlacklisted",
            Function::UpdateTenderStatus => "UpdateTenderStatus",
            Function::GetBidRevisions => "GetBidRevisions",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Function::UpdateBidStatus
            | Function::SetVendorBlacklisted
            | Function::UpdateTenderStatus => 2,
            _ => 1,
        }
    }

    /// Read-only functions never write to the ledger.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Function::GetBid
                | Function::GetBidHistory
                | Function::GetVendor
                | Function::GetTender
                | Function::GetBidRevisions
        )
    }
}

impl FromStr for Function {
    type Err = ContractError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Function::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| ContractError::MalformedPayload(format!("unknown function `{s}`")))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn invoke<L: Ledger>(
    contract: &ProcurementContract<L>,
    ctx: &TxContext,
    function: &str,
    args: &[&str],
) -> Result<String> {
    let function: Function = function.parse()?;
    if args.len() != function.arity() {
        return Err(ContractError::MalformedPayload(format!(
            "{function} takes {} argument(s), got {}",
            function.arity(),
            args.len()
        )));
    }

    match function {
        Function::RegisterVendor => to_json(&contract.register_vendor(ctx, args[0])?),
        Function::CreateTender => to_json(&contract.create_tender(ctx, args[0])?),
        Function::SubmitBid => to_json(&contract.submit_bid(ctx, args[0])?),
        Function::GetBid => to_json(&contract.get_bid(args[0])?),
        Function::UpdateBidStatus => to_json(&contract.update_bid_status(ctx, args[0], args[1])?),
        Function::GetBidHistory => {
            let history = contract
                .get_bid_history(args[0])?
                .collect::<Result<Vec<Bid>>>()?;
            to_json(&history)
        }
        Function::GetVendor => to_json(&contract.get_vendor(args[0])?),
        Function::GetTender => to_json(&contract.get_tender(args[0])?),
        Function::SetVendorBlacklisted => {
            let blacklisted: bool = args[1].parse().map_err(|_| {
                ContractError::MalformedPayload(format!(
                    "blacklisted flag must be `true` or `false`, got `{}`",
                    args[1]
                ))
            })?;
            to_json(&contract.set_vendor_blacklisted(ctx, args[0], blacklisted)?)
        }
        Function::UpdateTenderStatus => {
            to_json(&contract.update_tender_status(ctx, args[0], args[1])?)
        }
        Function::GetBidRevisions => {
            let revisions = contract
                .get_bid_revisions(args[0])?
                .collect::<Result<Vec<_>>>()?;
            to_json(&revisions)
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
