//! Inbound payloads as submitted by a party, before validation.
//!
//! Every field is optional on the wire: a missing field decodes to its empty
//! value so the validation engine, not the decoder, reports what is absent.
//! Enumerated fields stay plain strings here for the same reason.
use super::entity::TimeStamp;
use super::error::ContractError;
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorPayload {
    pub vendor_id: String,
    pub kra_pin: String,
    pub company_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub blacklisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<TimeStamp<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TenderPayload {
    pub tender_id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub budget: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<TimeStamp<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<TimeStamp<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BidPayload {
    pub bid_id: String,
    pub tender_id: String,
    pub vendor_id: String,
    pub amount: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub documents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<TimeStamp<Utc>>,
}

/// Shared decode/encode for the field-keyed text form.
pub trait Payload: Serialize + for<'de> Deserialize<'de> {
    fn from_json(raw: &str) -> Result<Self, ContractError> {
        Ok(serde_json::from_str(raw)?)
    }

    fn to_json(&self) -> Result<String, ContractError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Payload for VendorPayload {}
impl Payload for TenderPayload {}
impl Payload for BidPayload {}

impl VendorPayload {
    /// Construct a new builder object, this becomes the basis for a registration
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_vendor_id(mut self, vendor_id: &str) -> Self {
        self.vendor_id = vendor_id.to_string();
        self
    }
    pub fn set_kra_pin(mut self, kra_pin: &str) -> Self {
        self.kra_pin = kra_pin.to_string();
        self
    }
    pub fn set_company_name(mut self, name: &str) -> Self {
        self.company_name = name.to_string();
        self
    }
    pub fn set_email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }
    pub fn set_phone_number(mut self, phone: &str) -> Self {
        self.phone_number = phone.to_string();
        self
    }
    pub fn set_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
    pub fn set_blacklisted(mut self, blacklisted: bool) -> Self {
        self.blacklisted = blacklisted;
        self
    }
    pub fn set_created_at(mut self, at: TimeStamp<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

impl TenderPayload {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_tender_id(mut self, tender_id: &str) -> Self {
        self.tender_id = tender_id.to_string();
        self
    }
    pub fn set_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
    pub fn set_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
    pub fn set_budget(mut self, budget: f64) -> Self {
        self.budget = budget;
        self
    }
    pub fn set_deadline(mut self, deadline: TimeStamp<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }
    pub fn set_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }
    pub fn set_created_by(mut self, created_by: &str) -> Self {
        self.created_by = created_by.to_string();
        self
    }
    pub fn set_created_at(mut self, at: TimeStamp<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

impl BidPayload {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_bid_id(mut self, bid_id: &str) -> Self {
        self.bid_id = bid_id.to_string();
        self
    }
    pub fn set_tender_id(mut self, tender_id: &str) -> Self {
        self.tender_id = tender_id.to_string();
        self
    }
    pub fn set_vendor_id(mut self, vendor_id: &str) -> Self {
        self.vendor_id = vendor_id.to_string();
        self
    }
    pub fn set_amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
    pub fn set_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }
    pub fn add_document(mut self, reference: &str) -> Self {
        self.documents.push(reference.to_string());
        self
    }
    pub fn set_created_at(mut self, at: TimeStamp<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = r#"{"vendorId":"V1","kraPin":"P000111","companyName":"Acme Ltd","password":"x"}"#;
        let payload = VendorPayload::from_json(raw).unwrap();

        assert_eq!(payload.vendor_id, "V1");
        assert_eq!(payload.company_name, "Acme Ltd");
        assert!(payload.created_at.is_none());
    }

    #[test]
    fn missing_fields_decode_to_empty() {
        let payload = BidPayload::from_json("{}").unwrap();
        assert_eq!(payload, BidPayload::new());
    }

    #[test]
    fn wrong_json_types_are_malformed() {
        let err = BidPayload::from_json(r#"{"amount":"lots"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);

        let err = TenderPayload::from_json("not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
    }

    #[test]
    fn unknown_status_survives_decode() {
        // rejected later by validation, not here
        let payload = BidPayload::from_json(r#"{"status":"Pending"}"#).unwrap();
        assert_eq!(payload.status.as_deref(), Some("Pending"));
    }

    #[test]
    fn builder_output_decodes_back() {
        let payload = TenderPayload::new()
            .set_tender_id("T1")
            .set_title("Road Works")
            .set_budget(500_000.0)
            .set_category("services");

        let decoded = TenderPayload::from_json(&payload.to_json().unwrap()).unwrap();
        assert_eq!(payload, decoded);
    }
}
