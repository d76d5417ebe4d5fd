//! Core procurement records and the enumerated values they carry
use super::error::ValidationError;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Separator between the entity kind and its id in a ledger key.
pub const KEY_SEPARATOR: char = '~';

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Goods,
    Services,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TenderStatus {
    Open,
    Closed,
    Awarded,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BidStatus {
    Submitted,
    Evaluated,
    Awarded,
    Rejected,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub vendor_id: String,
    pub kra_pin: String, // tax identifier
    pub company_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub blacklisted: bool,
    pub created_at: TimeStamp<Utc>,
    pub updated_at: TimeStamp<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub tender_id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub budget: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<TimeStamp<Utc>>,
    pub status: TenderStatus,
    pub created_by: String,
    pub created_at: TimeStamp<Utc>,
    pub updated_at: TimeStamp<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub bid_id: String,
    pub tender_id: String, // reference to [`Tender`]
    pub vendor_id: String, // reference to [`Vendor`]
    pub amount: f64,
    pub description: String,
    pub status: BidStatus,
    #[serde(default)]
    pub documents: Vec<String>,
    pub created_at: TimeStamp<Utc>,
    pub updated_at: TimeStamp<Utc>,
}

/// A record stored on the ledger under a namespaced key.
pub trait Entity: Serialize + DeserializeOwned {
    /// Key namespace, also used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn set_updated_at(&mut self, at: TimeStamp<Utc>);

    fn key_for(id: &str) -> String {
        format!("{}{}{}", Self::KIND, KEY_SEPARATOR, id)
    }

    fn key(&self) -> String {
        Self::key_for(self.id())
    }
}

impl Entity for Vendor {
    const KIND: &'static str = "vendor";

    fn id(&self) -> &str {
        &self.vendor_id
    }

    fn set_updated_at(&mut self, at: TimeStamp<Utc>) {
        self.updated_at = at;
    }
}

impl Entity for Tender {
    const KIND: &'static str = "tender";

    fn id(&self) -> &str {
        &self.tender_id
    }

    fn set_updated_at(&mut self, at: TimeStamp<Utc>) {
        self.updated_at = at;
    }
}

impl Entity for Bid {
    const KIND: &'static str = "bid";

    fn id(&self) -> &str {
        &self.bid_id
    }

    fn set_updated_at(&mut self, at: TimeStamp<Utc>) {
        self.updated_at = at;
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Into::into)
    }
    pub fn from_nanos(nanos: i64) -> Self {
        Self(DateTime::from_timestamp_nanos(nanos))
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
    /// Fixed-width RFC 3339 with nanoseconds and a `Z` suffix, so the text sorts
    /// the same way the instants do.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl fmt::Display for TimeStamp<Utc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for TimeStamp<Utc> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for TimeStamp<Utc> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| TimeStamp(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Goods => "goods",
            Category::Services => "services",
        }
    }
}

impl TenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenderStatus::Open => "Open",
            TenderStatus::Closed => "Closed",
            TenderStatus::Awarded => "Awarded",
        }
    }
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Submitted => "Submitted",
            BidStatus::Evaluated => "Evaluated",
            BidStatus::Awarded => "Awarded",
            BidStatus::Rejected => "Rejected",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "goods" => Ok(Category::Goods),
            "services" => Ok(Category::Services),
            other => Err(ValidationError::UnknownValue {
                field: "category",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for TenderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(TenderStatus::Open),
            "Closed" => Ok(TenderStatus::Closed),
            "Awarded" => Ok(TenderStatus::Awarded),
            other => Err(ValidationError::UnknownValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for BidStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Submitted" => Ok(BidStatus::Submitted),
            "Evaluated" => Ok(BidStatus::Evaluated),
            "Awarded" => Ok(BidStatus::Awarded),
            "Rejected" => Ok(BidStatus::Rejected),
            other => Err(ValidationError::UnknownValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::new();

        let encoding = minicbor::to_vec(original.clone()).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn timestamp_text_is_fixed_width_and_sortable() {
        let early = TimeStamp::new_with(2024, 1, 2, 3, 4, 5).unwrap();
        let late = TimeStamp::from_nanos(early.to_datetime_utc().timestamp_nanos_opt().unwrap() + 1);

        assert_eq!(early.to_rfc3339(), "2024-01-02T03:04:05.000000000Z");
        assert_eq!(early.to_rfc3339().len(), late.to_rfc3339().len());
        assert!(early.to_rfc3339() < late.to_rfc3339());
    }

    #[test]
    fn timestamp_json_accepts_offsets() {
        let parsed: TimeStamp<Utc> = serde_json::from_str("\"2024-06-15T13:30:00+03:00\"").unwrap();
        assert_eq!(parsed, TimeStamp::new_with(2024, 6, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn keys_are_namespaced_by_kind() {
        assert_eq!(Vendor::key_for("V1"), "vendor~V1");
        assert_eq!(Tender::key_for("V1"), "tender~V1");
        assert_eq!(Bid::key_for("V1"), "bid~V1");
    }

    #[test]
    fn enumerated_values_parse_exactly() {
        assert_eq!("goods".parse::<Category>().unwrap(), Category::Goods);
        assert_eq!("Evaluated".parse::<BidStatus>().unwrap(), BidStatus::Evaluated);
        assert!("Goods".parse::<Category>().is_err());
        assert!("evaluated".parse::<BidStatus>().is_err());
        assert!("Pending".parse::<TenderStatus>().is_err());
    }

    #[test]
    fn status_json_is_plain_string() {
        assert_eq!(serde_json::to_string(&BidStatus::Submitted).unwrap(), "\"Submitted\"");
        assert_eq!(serde_json::to_string(&Category::Services).unwrap(), "\"services\"");
    }
}
