//! Property-based tests for creation followed by read-back
//!
//! Whatever valid vendor or tender is registered, reading it back by id must
//! return exactly the entity the creating call returned, on both ledgers.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use procurement_ledger::builder::{Payload, TenderPayload, VendorPayload};
use procurement_ledger::entity::TimeStamp;
use procurement_ledger::{Ledger, MemoryLedger, ProcurementContract, SledLedger, TxContext};
use tempfile::tempdir;

// PROPERTY TEST STRATEGIES

fn id_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,16}"
}

fn required_text_strategy() -> impl Strategy<Value = String> {
    ".{1,24}"
}

fn optional_text_strategy() -> impl Strategy<Value = String> {
    ".{0,24}"
}

fn category_strategy() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![Just(None), Just(Some("goods")), Just(Some("services"))]
}

/// Any finite value in (0, MAX], subnormals included
fn positive_f64_strategy() -> impl Strategy<Value = f64> {
    prop::num::f64::POSITIVE | prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL
}

fn timestamp_strategy() -> impl Strategy<Value = TimeStamp<chrono::Utc>> {
    (0i64..4_000_000_000_000_000_000).prop_map(TimeStamp::from_nanos)
}

fn vendor_strategy() -> impl Strategy<Value = VendorPayload> {
    (
        id_strategy(),
        required_text_strategy(),
        required_text_strategy(),
        optional_text_strategy(),
        optional_text_strategy(),
        category_strategy(),
        any::<bool>(),
        prop::option::of(timestamp_strategy()),
    )
        .prop_map(|(id, pin, name, email, phone, category, blacklisted, created_at)| {
            let mut payload = VendorPayload::new()
                .set_vendor_id(&id)
                .set_kra_pin(&pin)
                .set_company_name(&name)
                .set_email(&email)
                .set_phone_number(&phone)
                .set_blacklisted(blacklisted);
            if let Some(category) = category {
                payload = payload.set_category(category);
            }
            if let Some(at) = created_at {
                payload = payload.set_created_at(at);
            }
            payload
        })
}

fn tender_strategy() -> impl Strategy<Value = TenderPayload> {
    (
        id_strategy(),
        required_text_strategy(),
        optional_text_strategy(),
        category_strategy(),
        positive_f64_strategy(),
        prop::option::of(timestamp_strategy()),
        optional_text_strategy(),
        prop::option::of(timestamp_strategy()),
    )
        .prop_map(
            |(id, title, description, category, budget, deadline, created_by, created_at)| {
                let mut payload = TenderPayload::new()
                    .set_tender_id(&id)
                    .set_title(&title)
                    .set_description(&description)
                    .set_budget(budget)
                    .set_created_by(&created_by);
                if let Some(category) = category {
                    payload = payload.set_category(category);
                }
                if let Some(deadline) = deadline {
                    payload = payload.set_deadline(deadline);
                }
                if let Some(at) = created_at {
                    payload = payload.set_created_at(at);
                }
                payload
            },
        )
}

fn ctx(n: i64) -> TxContext {
    TxContext::new(format!("tx{n}"), TimeStamp::from_nanos(1_750_000_000_123_456_789 + n))
}

fn assert_reads_back<L: Ledger>(
    contract: &ProcurementContract<L>,
    vendor: &VendorPayload,
    tender: &TenderPayload,
) -> Result<(), TestCaseError> {
    let registered = contract
        .register_vendor(&ctx(1), &vendor.to_json().unwrap())
        .unwrap();
    prop_assert_eq!(&contract.get_vendor(&vendor.vendor_id).unwrap(), &registered);

    let created = contract
        .create_tender(&ctx(2), &tender.to_json().unwrap())
        .unwrap();
    let stored = contract.get_tender(&tender.tender_id).unwrap();
    prop_assert_eq!(stored.budget.to_bits(), created.budget.to_bits());
    prop_assert_eq!(&stored, &created);
    Ok(())
}

proptest! {
    /// In-memory ledger: every created vendor and tender reads back unchanged
    #[test]
    fn prop_memory_ledger_reads_back_created(vendor in vendor_strategy(), tender in tender_strategy()) {
        let contract = ProcurementContract::new(MemoryLedger::new());
        assert_reads_back(&contract, &vendor, &tender)?;
    }
}

proptest! {
    // each case opens a fresh sled database
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// On-disk ledger: every created vendor and tender reads back unchanged
    #[test]
    fn prop_sled_ledger_reads_back_created(vendor in vendor_strategy(), tender in tender_strategy()) {
        let temp_dir = tempdir().unwrap();
        let ledger = SledLedger::open(temp_dir.path().join("roundtrip.db")).unwrap();
        let contract = ProcurementContract::new(ledger);
        assert_reads_back(&contract, &vendor, &tender)?;
    }
}
