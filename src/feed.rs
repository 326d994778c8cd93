//! Order feed parsing: the two wire encodings the driver accepts.
//!
//! Records are `{kind, side, price, shares}` with decimal prices. The
//! JSON form is an array of objects:
//!
//! ```json
//! [{"type": "GTC", "side": "Bid", "price": 32.5, "shares": 100}]
//! ```
//!
//! The line form is whitespace-separated, one record per line:
//!
//! ```text
//! GTC Bid 32.5 100
//! ```
//!
//! Malformed lines are logged and skipped; a malformed JSON file is an
//! error for the whole load.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::BookError;
use crate::kind::OrderKind;
use crate::order::Order;
use crate::side::Side;
use crate::types::{OrderId, Price, Quantity};

/// One order submission as it appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order kind (`"M"` for market).
    #[serde(rename = "type")]
    pub kind: OrderKind,
    /// Bid or Ask.
    pub side: Side,
    /// Decimal price; carried but ignored for market orders.
    pub price: f64,
    /// Share count.
    pub shares: Quantity,
}

impl OrderRecord {
    /// Build the order this record describes, under the given id.
    pub fn into_order(self, id: OrderId) -> Result<Order, BookError> {
        match self.kind {
            OrderKind::Market => Order::market(id, self.side, self.shares),
            kind => Order::limit(id, kind, self.side, Price::from_decimal(self.price), self.shares),
        }
    }
}

/// Parse one whitespace-separated record: `KIND SIDE PRICE SHARES`.
pub fn parse_record(line: &str) -> Option<OrderRecord> {
    let mut fields = line.split_whitespace();
    let kind = parse_kind(fields.next()?)?;
    let side = parse_side(fields.next()?)?;
    let price: f64 = fields.next()?.parse().ok()?;
    let shares: Quantity = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None; // trailing junk
    }
    Some(OrderRecord {
        kind,
        side,
        price,
        shares,
    })
}

/// Load records from a file: JSON array for a `.json` extension,
/// line-oriented otherwise.
pub fn load_orders(path: &Path) -> io::Result<Vec<OrderRecord>> {
    let text = std::fs::read_to_string(path)?;

    if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
        return serde_json::from_str(&text)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err));
    }

    let mut records = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_record(line) {
            Some(record) => records.push(record),
            None => warn!(line = number + 1, "malformed order record, skipping"),
        }
    }
    Ok(records)
}

fn parse_kind(token: &str) -> Option<OrderKind> {
    match token {
        "GTC" => Some(OrderKind::Gtc),
        "FAK" => Some(OrderKind::Fak),
        "FOK" => Some(OrderKind::Fok),
        "GFD" => Some(OrderKind::Gfd),
        "M" => Some(OrderKind::Market),
        _ => None,
    }
}

fn parse_side(token: &str) -> Option<Side> {
    match token {
        "Bid" => Some(Side::Bid),
        "Ask" => Some(Side::Ask),
        _ => None,
    }
}
