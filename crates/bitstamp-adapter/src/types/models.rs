/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::enums::{OrderState, TransactionSide};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ticker {
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub high: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub last: Option<Decimal>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_u64")]
    pub timestamp: Option<u64>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub bid: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub vwap: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub volume: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub low: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub ask: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub open: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub open_24: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub percent_change_24: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub pair: Option<String>,
}

/// One order book row, `[price, amount]` or `[price, amount, order_id]` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceLevel {
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl PriceLevel {
    pub fn new(price: Decimal, amount: Decimal) -> Self {
        Self {
            price,
            amount,
            order_id: None,
        }
    }
}

impl<'de> Deserialize<'de> for PriceLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let row: Vec<Value> = Vec::deserialize(deserializer)?;
        let mut cells = row.into_iter();

        let price = cells
            .next()
            .and_then(serde_helpers::decimal_from_value)
            .ok_or_else(|| serde::de::Error::custom("order book level is missing a price"))?;
        let amount = cells
            .next()
            .and_then(serde_helpers::decimal_from_value)
            .ok_or_else(|| serde::de::Error::custom("order book level is missing an amount"))?;
        let order_id = cells.next().and_then(serde_helpers::string_from_value);

        Ok(Self {
            price,
            amount,
            order_id,
        })
    }
}

/// Order book snapshot; level order is exactly as delivered (best first)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderBook {
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_u64")]
    pub timestamp: Option<u64>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_u64")]
    pub microtimestamp: Option<u64>,
    /// Rows that cannot be mapped are skipped; the rest keep their order
    #[serde(default, deserialize_with = "serde_helpers::lenient_vec")]
    pub bids: Vec<PriceLevel>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_vec")]
    pub asks: Vec<PriceLevel>,
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_u64")]
    pub date: Option<u64>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_u64")]
    pub tid: Option<u64>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub amount: Option<Decimal>,
    #[serde(rename = "type", default, deserialize_with = "serde_helpers::lenient")]
    pub side: Option<TransactionSide>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversionRate {
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub buy: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub sell: Option<Decimal>,
}

/// Flat `/balance/` response keyed by field name (`usd_balance`, `btc_available`, `fee`, ...).
///
/// Entries whose value is not a decimal are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountBalance {
    entries: BTreeMap<String, Decimal>,
}

impl AccountBalance {
    pub fn get(&self, key: &str) -> Option<Decimal> {
        self.entries.get(key).copied()
    }

    pub fn balance(&self, currency: &str) -> Option<Decimal> {
        self.get(&format!("{}_balance", currency.to_ascii_lowercase()))
    }

    pub fn available(&self, currency: &str) -> Option<Decimal> {
        self.get(&format!("{}_available", currency.to_ascii_lowercase()))
    }

    pub fn reserved(&self, currency: &str) -> Option<Decimal> {
        self.get(&format!("{}_reserved", currency.to_ascii_lowercase()))
    }

    pub fn fee(&self) -> Option<Decimal> {
        self.get("fee")
    }

    pub fn entries(&self) -> &BTreeMap<String, Decimal> {
        &self.entries
    }
}

impl<'de> Deserialize<'de> for AccountBalance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, Value> = BTreeMap::deserialize(deserializer)?;
        let entries = raw
            .into_iter()
            .filter_map(|(key, value)| serde_helpers::decimal_from_value(value).map(|d| (key, d)))
            .collect();
        Ok(Self { entries })
    }
}

impl Serialize for AccountBalance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let strings: BTreeMap<&str, String> = self
            .entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.to_string()))
            .collect();
        strings.serialize(serializer)
    }
}

/// One fill reported inside an order status response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderTransaction {
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_u64")]
    pub tid: Option<u64>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub price: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub fee: Option<Decimal>,
    #[serde(default, deserialize_with = "serde_helpers::lenient")]
    pub datetime: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "serde_helpers::deserialize_optional_u64")]
    pub kind: Option<u64>,
    /// Per-currency amounts, e.g. `btc` and `usd`
    #[serde(flatten)]
    pub amounts: BTreeMap<String, Value>,
}

impl OrderTransaction {
    pub fn amount(&self, currency: &str) -> Option<Decimal> {
        self.amounts
            .get(&currency.to_ascii_lowercase())
            .cloned()
            .and_then(serde_helpers::decimal_from_value)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderStatus {
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient")]
    pub datetime: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient")]
    pub status: Option<OrderState>,
    #[serde(default, deserialize_with = "serde_helpers::lenient")]
    pub market: Option<String>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_optional_decimal",
        serialize_with = "serde_helpers::serialize_optional_decimal"
    )]
    pub amount_remaining: Option<Decimal>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_string")]
    pub client_order_id: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_vec")]
    pub transactions: Vec<OrderTransaction>,
}

mod serde_helpers {
    use super::Decimal;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn decimal_from_value(value: Value) -> Option<Decimal> {
        let raw = match value {
            Value::String(raw) => raw,
            Value::Number(number) => number.to_string(),
            _ => return None,
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .ok()
    }

    pub fn string_from_value(value: Value) -> Option<String> {
        match value {
            Value::String(raw) if !raw.is_empty() => Some(raw),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    pub fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(decimal_from_value))
    }

    pub fn serialize_optional_decimal<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(decimal) => serializer.serialize_str(&decimal.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize_optional_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(number)) => number.as_u64(),
            Some(Value::String(raw)) => raw.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(string_from_value))
    }

    /// Any value that does not fit `T` becomes `None`
    pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|value| serde_json::from_value(value).ok()))
    }

    pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}
