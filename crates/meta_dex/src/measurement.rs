use crate::Venue;
use ethers::types::{Address, U256};
use meta_common::constants::NATIVE_ASSET;
use meta_model::TwoWayMeasurement;
use meta_util::{FixedPoint, Quantity};
use tracing::{debug, warn};

/// Buys `token` with `amount` of native, sells the whole proceeds back and derives the metrics.
///
/// Leg failures never escape: they turn into [`Quantity::Failed`] and poison only the values
/// computed from them. All ratios are normalised by the nominal `amount`, even when the direct
/// leg failed.
pub async fn measure_two_way<V: Venue + ?Sized>(
    venue: &mut V,
    token: Address,
    amount: U256,
) -> TwoWayMeasurement {
    let nominal = Quantity::from(FixedPoint::from_wei(amount));

    let direct = match venue.swap(NATIVE_ASSET, token, amount).await {
        Ok(out) => {
            debug!("direct leg {:?}: {}", token, out);
            Quantity::from(out)
        }
        Err(e) => {
            warn!("direct swap into {:?} failed: {}", token, e);
            Quantity::Failed
        }
    };

    let reverse = if direct.is_failed() {
        Quantity::Failed
    } else {
        reverse_leg(venue, token).await
    };

    let reference_price = match venue.reference_price().await {
        Ok(price) => Quantity::from(price),
        Err(e) => {
            warn!("reference price unavailable: {}", e);
            Quantity::Failed
        }
    };

    let loss = nominal - reverse;
    TwoWayMeasurement {
        reference_price,
        direct_usd: nominal / (direct / reference_price),
        direct,
        reverse,
        loss,
        loss_pct: loss / nominal,
        price_per_token: direct / nominal,
    }
}

async fn reverse_leg<V: Venue + ?Sized>(venue: &mut V, token: Address) -> Quantity {
    let balance = match venue.token_balance(token).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!("balance of {:?} unavailable: {}", token, e);
            return Quantity::Failed;
        }
    };
    match venue.swap(token, NATIVE_ASSET, balance).await {
        Ok(out) => {
            debug!("reverse leg {:?}: {}", token, out);
            Quantity::from(out)
        }
        Err(e) => {
            warn!("reverse swap of {:?} failed: {}", token, e);
            Quantity::Failed
        }
    }
}

#[cfg(test)]
mod test_measurement {
    use super::*;
    use async_trait::async_trait;
    use ethers::types::I256;
    use std::collections::VecDeque;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("scripted failure")]
    pub struct ScriptedFailure;

    /// Venue replaying scripted leg outcomes in order.
    #[derive(Default)]
    pub struct ScriptedVenue {
        pub legs: VecDeque<Option<FixedPoint>>,
        pub balance: U256,
        pub price: Option<FixedPoint>,
        pub swaps: Vec<(Address, Address, U256)>,
    }

    #[async_trait]
    impl Venue for ScriptedVenue {
        type Error = ScriptedFailure;

        async fn swap(
            &mut self,
            from: Address,
            to: Address,
            amount: U256,
        ) -> Result<FixedPoint, ScriptedFailure> {
            self.swaps.push((from, to, amount));
            self.legs.pop_front().flatten().ok_or(ScriptedFailure)
        }

        async fn token_balance(&self, _token: Address) -> Result<U256, ScriptedFailure> {
            Ok(self.balance)
        }

        async fn reference_price(&self) -> Result<FixedPoint, ScriptedFailure> {
            self.price.ok_or(ScriptedFailure)
        }
    }

    fn fixed(mantissa: u64, decimals: u32) -> FixedPoint {
        FixedPoint::new(I256::from(mantissa), decimals)
    }

    fn token() -> Address {
        Address::repeat_byte(0xaa)
    }

    #[tokio::test]
    async fn test_round_trip_metrics() {
        let mut venue = ScriptedVenue {
            legs: VecDeque::from([
                Some(fixed(100_000_000, 6)),
                Some(fixed(990_000_000_000_000_000, 18)),
            ]),
            balance: U256::from(100_000_000u64),
            price: Some(fixed(200_000_000_000, 8)),
            ..Default::default()
        };
        let one = U256::exp10(18);
        let m = measure_two_way(&mut venue, token(), one).await;

        assert_eq!(m.direct.to_string(), "100.000000");
        assert_eq!(m.reverse.to_string(), "0.990000000000000000");
        assert_eq!(m.loss.to_string(), "0.010000000000000000");
        assert_eq!(m.loss_pct.percent(), Some(1.0));
        assert_eq!(m.price_per_token.to_string(), "100.000000");
        assert_eq!(m.reference_price.to_string(), "2000.00000000");
        assert_eq!(m.direct_usd.to_string(), "20.000000000000000000");

        // the reverse leg sells the whole token balance
        assert_eq!(
            venue.swaps,
            vec![(NATIVE_ASSET, token(), one), (token(), NATIVE_ASSET, U256::from(100_000_000u64))]
        );
    }

    #[tokio::test]
    async fn test_failed_direct_leg_skips_reverse() {
        let mut venue = ScriptedVenue {
            legs: VecDeque::from([None, Some(fixed(1, 18))]),
            price: Some(fixed(200_000_000_000, 8)),
            ..Default::default()
        };
        let m = measure_two_way(&mut venue, token(), U256::exp10(18)).await;

        assert_eq!(venue.swaps.len(), 1);
        assert!(m.direct.is_failed());
        assert!(m.reverse.is_failed());
        assert!(m.loss.is_failed());
        assert!(m.loss_pct.is_failed());
        assert!(m.price_per_token.is_failed());
        assert!(m.direct_usd.is_failed());
        assert!(!m.reference_price.is_failed());
    }

    #[tokio::test]
    async fn test_failed_reverse_leg_keeps_direct_metrics() {
        let mut venue = ScriptedVenue {
            legs: VecDeque::from([Some(fixed(100_000_000, 6)), None]),
            balance: U256::from(100_000_000u64),
            price: None,
            ..Default::default()
        };
        let m = measure_two_way(&mut venue, token(), U256::exp10(18)).await;

        assert_eq!(venue.swaps.len(), 2);
        assert_eq!(m.price_per_token.to_string(), "100.000000");
        assert!(m.loss.is_failed());
        assert!(m.loss_pct.is_failed());
        assert!(m.reference_price.is_failed());
        assert!(m.direct_usd.is_failed());
    }
}
