//! Sample records shared by the benches.

use ironbin::{BinaryEnum, BinarySerialize};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinaryEnum)]
pub enum Side {
    Buy,
    Sell,
}

/// Instrument reference nested in [`Order`].
#[derive(Debug, Default, Clone, PartialEq, BinarySerialize)]
#[binary(version = 1)]
pub struct Instrument {
    pub symbol: String,
    pub venue: String,
    pub lot_size: i32,
}

/// Order record with every supported field type.
#[derive(Debug, Default, Clone, PartialEq, BinarySerialize)]
#[binary(version = 2)]
pub struct Order {
    pub client_id: String,
    pub quantity: i32,
    pub price_ticks: i32,
    pub flags: i16,
    pub side: Option<Side>,
    pub instrument: Instrument,
    #[binary(exclude)]
    pub route_hint: String,
}

/// Fixed-width record with integer fields only.
#[derive(Debug, Default, Clone, Copy, PartialEq, BinarySerialize)]
#[binary(version = 1)]
pub struct Tick {
    pub seq: i32,
    pub bid: i32,
    pub ask: i32,
    pub bid_size: i16,
    pub ask_size: i16,
}

/// Returns a representative order.
#[must_use]
pub fn sample_order() -> Order {
    Order {
        client_id: "ORDER-00000000000001".into(),
        quantity: 100,
        price_ticks: 15050,
        flags: 0b101,
        side: Some(Side::Buy),
        instrument: Instrument {
            symbol: "AAPL".into(),
            venue: "XNAS".into(),
            lot_size: 1,
        },
        route_hint: "dark".into(),
    }
}

/// Returns a representative tick.
#[must_use]
pub fn sample_tick() -> Tick {
    Tick {
        seq: 42,
        bid: 15049,
        ask: 15051,
        bid_size: 300,
        ask_size: 200,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironbin::{BinaryCodec, NestedVersioning};

    #[test]
    fn test_fixture_lengths() {
        let codec = BinaryCodec::new();
        assert_eq!(codec.encoded_len(&sample_tick()), 2 + 12 + 4);
        assert_eq!(Tick::SCHEMA.fields_fixed_len(NestedVersioning::EveryLevel), Some(16));
        assert_eq!(Order::SCHEMA.fields_fixed_len(NestedVersioning::EveryLevel), None);
    }

    #[test]
    fn test_fixture_round_trip() {
        let codec = BinaryCodec::new();
        let bytes = codec.to_vec(&sample_order()).unwrap();
        let decoded: Order = codec.from_bytes(&bytes).unwrap();
        assert_eq!(decoded.instrument, sample_order().instrument);
        assert!(decoded.route_hint.is_empty());
    }
}
