/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::http::{BitstampError, Result};

/// Order book aggregation mode (`group` query parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderBookGroup {
    /// Orders are not grouped at the same price
    Ungrouped,
    /// Orders are grouped at the same price
    #[default]
    Grouped,
    /// Orders with their order ids, not grouped at the same price
    Individual,
}

impl OrderBookGroup {
    pub fn as_u8(self) -> u8 {
        match self {
            OrderBookGroup::Ungrouped => 0,
            OrderBookGroup::Grouped => 1,
            OrderBookGroup::Individual => 2,
        }
    }
}

impl TryFrom<u8> for OrderBookGroup {
    type Error = BitstampError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(OrderBookGroup::Ungrouped),
            1 => Ok(OrderBookGroup::Grouped),
            2 => Ok(OrderBookGroup::Individual),
            other => Err(BitstampError::validation(format!(
                "group parameter should be 0, 1 or 2, got {other}"
            ))),
        }
    }
}

/// Time window for the transactions endpoint (`time` query parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionInterval {
    Minute,
    #[default]
    Hour,
    Day,
}

impl TransactionInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionInterval::Minute => "minute",
            TransactionInterval::Hour => "hour",
            TransactionInterval::Day => "day",
        }
    }
}

impl fmt::Display for TransactionInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionInterval {
    type Err = BitstampError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "minute" => Ok(TransactionInterval::Minute),
            "hour" => Ok(TransactionInterval::Hour),
            "day" => Ok(TransactionInterval::Day),
            other => Err(BitstampError::validation(format!(
                "time parameter should be minute, hour or day, got {other}"
            ))),
        }
    }
}

/// Trade direction; the exchange sends `0` for buy and `1` for sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionSide {
    Buy,
    Sell,
}

impl Serialize for TransactionSide {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let code = match self {
            TransactionSide::Buy => "0",
            TransactionSide::Sell => "1",
        };
        serializer.serialize_str(code)
    }
}

impl<'de> Deserialize<'de> for TransactionSide {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let code = match &value {
            serde_json::Value::String(raw) => raw.trim().to_string(),
            serde_json::Value::Number(number) => number.to_string(),
            _ => return Err(serde::de::Error::custom("invalid transaction type")),
        };
        match code.as_str() {
            "0" => Ok(TransactionSide::Buy),
            "1" => Ok(TransactionSide::Sell),
            other => Err(serde::de::Error::custom(format!(
                "unknown transaction type {other}"
            ))),
        }
    }
}

/// Lifecycle state reported by `order_status`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    Open,
    Finished,
    #[serde(alias = "Cancelled")]
    Canceled,
    #[serde(other)]
    Unknown,
}
