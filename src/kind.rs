//! Order kinds: controls admission, resting behavior, and lifetime

use std::fmt;

use serde::{Deserialize, Serialize};

/// The five supported order kinds.
///
/// | Kind | Behavior |
/// |------|----------|
/// | **GTC** | Rests on the book until filled or cancelled |
/// | **FAK** | Executes what is immediately matchable, remainder is cancelled |
/// | **FOK** | Executes in full immediately or not at all |
/// | **GFD** | Rests like GTC, auto-cancelled at the session close |
/// | **Market** | Rewritten on intake to GTC at the opposite side's worst price |
///
/// The serde names match the wire encoding (`"GTC"`, `"FAK"`, `"FOK"`,
/// `"GFD"`, `"M"`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    /// Good-til-cancelled.
    #[default]
    #[serde(rename = "GTC")]
    Gtc,
    /// Fill-and-kill (a.k.a. IOC).
    #[serde(rename = "FAK")]
    Fak,
    /// Fill-or-kill.
    #[serde(rename = "FOK")]
    Fok,
    /// Good-for-day.
    #[serde(rename = "GFD")]
    Gfd,
    /// Market order.
    #[serde(rename = "M")]
    Market,
}

impl OrderKind {
    /// Returns true if an order of this kind may rest on the book once
    /// admitted. FAK technically rests between matching and the tail
    /// sweep, but never survives the operation that admitted it.
    #[inline]
    pub fn rests(self) -> bool {
        matches!(self, OrderKind::Gtc | OrderKind::Gfd)
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Gtc => write!(f, "GTC"),
            OrderKind::Fak => write!(f, "FAK"),
            OrderKind::Fok => write!(f, "FOK"),
            OrderKind::Gfd => write!(f, "GFD"),
            OrderKind::Market => write!(f, "M"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_gtc() {
        assert_eq!(OrderKind::default(), OrderKind::Gtc);
    }

    #[test]
    fn rests() {
        assert!(OrderKind::Gtc.rests());
        assert!(OrderKind::Gfd.rests());
        assert!(!OrderKind::Fak.rests());
        assert!(!OrderKind::Fok.rests());
        assert!(!OrderKind::Market.rests());
    }

    #[test]
    fn display_matches_wire_names() {
        assert_eq!(format!("{}", OrderKind::Gtc), "GTC");
        assert_eq!(format!("{}", OrderKind::Fak), "FAK");
        assert_eq!(format!("{}", OrderKind::Fok), "FOK");
        assert_eq!(format!("{}", OrderKind::Gfd), "GFD");
        assert_eq!(format!("{}", OrderKind::Market), "M");
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&OrderKind::Market).unwrap();
        assert_eq!(json, "\"M\"");
        let kind: OrderKind = serde_json::from_str("\"GFD\"").unwrap();
        assert_eq!(kind, OrderKind::Gfd);
    }
}
