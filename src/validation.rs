//! Validation engine: structural completeness and positivity checks.
//!
//! These functions never touch the ledger. Given the same payload and the same
//! transaction timestamp they produce the same entity, so every validating node
//! reaches the same verdict.
//!
//! Timestamp fill policy: a `createdAt` present in the payload is kept verbatim
//! (an explicit epoch is a value, not an omission); an absent one becomes the
//! transaction timestamp. `updatedAt` is always the transaction timestamp.
use super::builder::{BidPayload, TenderPayload, VendorPayload};
use super::entity::{Bid, BidStatus, Category, Tender, TenderStatus, TimeStamp, Vendor};
use super::error::ValidationError;
use chrono::Utc;

pub fn validate_vendor(
    payload: &VendorPayload,
    now: &TimeStamp<Utc>,
) -> Result<Vendor, ValidationError> {
    require("vendor", "vendorId", &payload.vendor_id)?;
    require("vendor", "kraPin", &payload.kra_pin)?;
    require("vendor", "companyName", &payload.company_name)?;
    let category = parse_category(payload.category.as_deref())?;

    Ok(Vendor {
        vendor_id: payload.vendor_id.clone(),
        kra_pin: payload.kra_pin.clone(),
        company_name: payload.company_name.clone(),
        email: payload.email.clone(),
        phone_number: payload.phone_number.clone(),
        category,
        blacklisted: payload.blacklisted,
        created_at: payload.created_at.clone().unwrap_or_else(|| now.clone()),
        updated_at: now.clone(),
    })
}

pub fn validate_tender(
    payload: &TenderPayload,
    now: &TimeStamp<Utc>,
) -> Result<Tender, ValidationError> {
    require("tender", "tenderId", &payload.tender_id)?;
    require("tender", "title", &payload.title)?;
    positive("tender", "budget", payload.budget)?;
    let category = parse_category(payload.category.as_deref())?;

    let status = match non_empty(payload.status.as_deref()) {
        None => TenderStatus::Open,
        Some(raw) => raw.parse::<TenderStatus>()?,
    };
    if status != TenderStatus::Open {
        return Err(ValidationError::NotInitialStatus {
            entity: "tender",
            expected: TenderStatus::Open.as_str(),
            got: status.to_string(),
        });
    }

    Ok(Tender {
        tender_id: payload.tender_id.clone(),
        title: payload.title.clone(),
        description: payload.description.clone(),
        category,
        budget: payload.budget,
        deadline: payload.deadline.clone(),
        status,
        created_by: payload.created_by.clone(),
        created_at: payload.created_at.clone().unwrap_or_else(|| now.clone()),
        updated_at: now.clone(),
    })
}

pub fn validate_bid(payload: &BidPayload, now: &TimeStamp<Utc>) -> Result<Bid, ValidationError> {
    require("bid", "bidId", &payload.bid_id)?;
    require("bid", "tenderId", &payload.tender_id)?;
    require("bid", "vendorId", &payload.vendor_id)?;
    positive("bid", "amount", payload.amount)?;

    let status = match non_empty(payload.status.as_deref()) {
        None => BidStatus::Submitted,
        Some(raw) => raw.parse::<BidStatus>()?,
    };
    if status != BidStatus::Submitted {
        return Err(ValidationError::NotInitialStatus {
            entity: "bid",
            expected: BidStatus::Submitted.as_str(),
            got: status.to_string(),
        });
    }

    Ok(Bid {
        bid_id: payload.bid_id.clone(),
        tender_id: payload.tender_id.clone(),
        vendor_id: payload.vendor_id.clone(),
        amount: payload.amount,
        description: payload.description.clone(),
        status,
        documents: payload.documents.clone(),
        created_at: payload.created_at.clone().unwrap_or_else(|| now.clone()),
        updated_at: now.clone(),
    })
}

fn require(entity: &'static str, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField { entity, field });
    }
    Ok(())
}

// NaN fails the comparison as well
fn positive(entity: &'static str, field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(ValidationError::NotPositive { entity, field });
    }
    Ok(())
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, ValidationError> {
    non_empty(raw).map(str::parse::<Category>).transpose()
}
