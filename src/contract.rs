//! Procurement contract: the operation set run once per transaction proposal.
//!
//! The contract keeps no state of its own between invocations. Each mutating
//! operation opens a [`Stub`], reads what it needs, buffers its writes and
//! commits once. Any failure before the commit drops the stub, so nothing of a
//! failed operation is ever recorded.
use super::builder::{BidPayload, Payload, TenderPayload, VendorPayload};
use super::context::TxContext;
use super::entity::{Bid, BidStatus, Entity, Tender, TenderStatus, Vendor};
use super::error::{ContractError, Result};
use super::history::{BidHistory, Revisions};
use super::ledger::{Ledger, Stub};
use super::transition::Lifecycle;
use super::validation::{validate_bid, validate_tender, validate_vendor};
use log::{debug, info, warn};

pub struct ProcurementContract<L: Ledger> {
    ledger: L,
}

impl<L: Ledger> ProcurementContract<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Register a new vendor. Fails with `AlreadyExists` if the id is taken.
    pub fn register_vendor(&self, ctx: &TxContext, payload: &str) -> Result<Vendor> {
        debug!("RegisterVendor in tx {}", ctx.tx_id);
        let payload = VendorPayload::from_json(payload)?;
        let vendor = validate_vendor(&payload, &ctx.timestamp)?;

        self.create(ctx, vendor)
    }

    /// Publish a new tender, status defaults to `Open`.
    pub fn create_tender(&self, ctx: &TxContext, payload: &str) -> Result<Tender> {
        debug!("CreateTender in tx {}", ctx.tx_id);
        let payload = TenderPayload::from_json(payload)?;
        let tender = validate_tender(&payload, &ctx.timestamp)?;

        self.create(ctx, tender)
    }

    /// Submit a bid against an existing tender on behalf of an existing vendor.
    pub fn submit_bid(&self, ctx: &TxContext, payload: &str) -> Result<Bid> {
        debug!("SubmitBid in tx {}", ctx.tx_id);
        let payload = BidPayload::from_json(payload)?;
        let bid = validate_bid(&payload, &ctx.timestamp)?;

        let mut stub = Stub::new(&self.ledger, ctx);
        require_reference::<Tender, L>(&mut stub, &bid.tender_id)?;
        require_reference::<Vendor, L>(&mut stub, &bid.vendor_id)?;
        insert(&mut stub, &bid)?;
        stub.commit()?;

        info!(
            "bid {} submitted for tender {} by vendor {}",
            bid.bid_id, bid.tender_id, bid.vendor_id
        );
        Ok(bid)
    }

    pub fn get_bid(&self, bid_id: &str) -> Result<Bid> {
        self.load(bid_id)
    }

    pub fn get_tender(&self, tender_id: &str) -> Result<Tender> {
        self.load(tender_id)
    }

    pub fn get_vendor(&self, vendor_id: &str) -> Result<Vendor> {
        self.load(vendor_id)
    }

    /// Move a bid along its evaluation pipeline. `new_status` is the plain
    /// status name; unknown names are a malformed payload.
    ///
    /// The bid is loaded before `new_status` is parsed, so a missing bid is
    /// `NotFound` whatever status was asked for.
    pub fn update_bid_status(&self, ctx: &TxContext, bid_id: &str, new_status: &str) -> Result<Bid> {
        debug!("UpdateBidStatus {} -> {} in tx {}", bid_id, new_status, ctx.tx_id);

        self.update(ctx, bid_id, |bid: &mut Bid| {
            let target: BidStatus = new_status.parse()?;
            bid.status = bid.status.transition(target)?;
            if bid.status.is_terminal() {
                info!("bid {} closed as {}", bid.bid_id, bid.status);
            }
            Ok(())
        })
    }

    pub fn update_tender_status(
        &self,
        ctx: &TxContext,
        tender_id: &str,
        new_status: &str,
    ) -> Result<Tender> {
        debug!("UpdateTenderStatus {} -> {} in tx {}", tender_id, new_status, ctx.tx_id);

        self.update(ctx, tender_id, |tender: &mut Tender| {
            let target: TenderStatus = new_status.parse()?;
            tender.status = tender.status.transition(target)?;
            Ok(())
        })
    }

    pub fn set_vendor_blacklisted(
        &self,
        ctx: &TxContext,
        vendor_id: &str,
        blacklisted: bool,
    ) -> Result<Vendor> {
        debug!("SetVendorBlacklisted {} = {} in tx {}", vendor_id, blacklisted, ctx.tx_id);

        self.update(ctx, vendor_id, |vendor: &mut Vendor| {
            vendor.blacklisted = blacklisted;
            Ok(())
        })
    }

    /// Every recorded version of a bid, oldest first, decoded as it is pulled.
    /// An unknown bid has an empty history.
    pub fn get_bid_history(&self, bid_id: &str) -> Result<BidHistory<L::History>> {
        Ok(self.get_bid_revisions(bid_id)?.snapshots())
    }

    /// Like [`get_bid_history`](Self::get_bid_history) with the writing
    /// transaction's id and timestamp on each item.
    pub fn get_bid_revisions(&self, bid_id: &str) -> Result<Revisions<L::History, Bid>> {
        let history = self.ledger.history(&Bid::key_for(bid_id))?;
        Ok(Revisions::new(history))
    }

    fn create<T: Entity>(&self, ctx: &TxContext, entity: T) -> Result<T> {
        let mut stub = Stub::new(&self.ledger, ctx);
        insert(&mut stub, &entity)?;
        stub.commit()?;

        info!("{} {} created in tx {}", T::KIND, entity.id(), ctx.tx_id);
        Ok(entity)
    }

    fn load<T: Entity>(&self, id: &str) -> Result<T> {
        let entry = self.ledger.get(&T::key_for(id))?;
        decode_present(entry.value, id)
    }

    fn update<T, F>(&self, ctx: &TxContext, id: &str, apply: F) -> Result<T>
    where
        T: Entity,
        F: FnOnce(&mut T) -> Result<()>,
    {
        let mut stub = Stub::new(&self.ledger, ctx);
        let key = T::key_for(id);
        let mut entity: T = decode_present(stub.get_state(&key)?, id)?;

        if let Err(err) = apply(&mut entity) {
            warn!("{} {} not updated: {}", T::KIND, id, err);
            return Err(err);
        }
        entity.set_updated_at(ctx.timestamp.clone());

        stub.put_state(&key, serde_json::to_vec(&entity)?);
        stub.commit()?;

        info!("{} {} updated in tx {}", T::KIND, id, ctx.tx_id);
        Ok(entity)
    }
}

fn insert<T: Entity, L: Ledger>(stub: &mut Stub<'_, L>, entity: &T) -> Result<()> {
    let key = entity.key();
    if stub.state_exists(&key)? {
        warn!("{} {} already exists", T::KIND, entity.id());
        return Err(ContractError::AlreadyExists {
            kind: T::KIND,
            id: entity.id().to_string(),
        });
    }
    stub.put_state(&key, serde_json::to_vec(entity)?);
    Ok(())
}

fn require_reference<T: Entity, L: Ledger>(stub: &mut Stub<'_, L>, id: &str) -> Result<()> {
    if !stub.state_exists(&T::key_for(id))? {
        warn!("referenced {} {} does not exist", T::KIND, id);
        return Err(ContractError::ReferenceNotFound {
            kind: T::KIND,
            id: id.to_string(),
        });
    }
    Ok(())
}

fn decode_present<T: Entity>(value: Option<Vec<u8>>, id: &str) -> Result<T> {
    let Some(raw) = value else {
        return Err(ContractError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        });
    };
    Ok(serde_json::from_slice(&raw)?)
}
