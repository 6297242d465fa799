use ethers::types::U256;
use meta_util::{ether::format_ether_amount, Quantity, ERROR_MARKER};
use serde_json::Value;

/// Tokens monitored on one network, in sheet order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenList {
    pub network: String,
    pub tokens: Vec<String>,
}

/// Outcome of one forward swap followed by the reverse swap of its proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoWayMeasurement {
    /// Native asset price in USD.
    pub reference_price: Quantity,
    /// USD value implied by the direct leg.
    pub direct_usd: Quantity,
    pub direct: Quantity,
    pub reverse: Quantity,
    pub loss: Quantity,
    pub loss_pct: Quantity,
    pub price_per_token: Quantity,
}

impl TwoWayMeasurement {
    pub fn failed() -> Self {
        TwoWayMeasurement {
            reference_price: Quantity::Failed,
            direct_usd: Quantity::Failed,
            direct: Quantity::Failed,
            reverse: Quantity::Failed,
            loss: Quantity::Failed,
            loss_pct: Quantity::Failed,
            price_per_token: Quantity::Failed,
        }
    }
}

/// Everything reported for one token of one network.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenReport {
    pub timestamp: String,
    pub symbol: Option<String>,
    /// Base trade amount in wei.
    pub trade_amount: U256,
    pub base: TwoWayMeasurement,
    pub scaled: TwoWayMeasurement,
    pub price_per_token_diff: Quantity,
    pub price_per_token_diff_pct: Quantity,
    pub route_length: Option<usize>,
}

pub const ROW_WIDTH: usize = 18;

impl TokenReport {
    /// Sheet row in column order: timestamp, symbol, trade amount, reference price, implied USD,
    /// the base measurement, the scaled measurement, price differential and route length.
    pub fn into_row(self) -> Vec<Value> {
        let mut row = Vec::with_capacity(ROW_WIDTH);
        row.push(Value::String(self.timestamp));
        row.push(Value::String(self.symbol.unwrap_or_else(|| ERROR_MARKER.to_string())));
        row.push(Value::String(format_ether_amount(self.trade_amount)));
        row.push(text_cell(self.base.reference_price));
        row.push(text_cell(self.base.direct_usd));
        push_measurement(&mut row, &self.base);
        push_measurement(&mut row, &self.scaled);
        row.push(text_cell(self.price_per_token_diff));
        row.push(percent_cell(self.price_per_token_diff_pct));
        row.push(Value::String(
            self.route_length.map_or_else(|| ERROR_MARKER.to_string(), |len| len.to_string()),
        ));
        row
    }
}

fn push_measurement(row: &mut Vec<Value>, m: &TwoWayMeasurement) {
    row.push(text_cell(m.direct));
    row.push(text_cell(m.reverse));
    row.push(text_cell(m.loss));
    row.push(percent_cell(m.loss_pct));
    row.push(text_cell(m.price_per_token));
}

fn text_cell(q: Quantity) -> Value {
    Value::String(q.to_string())
}

/// Ratio written as a plain percentage number.
fn percent_cell(q: Quantity) -> Value {
    q.percent().map_or_else(|| Value::String(ERROR_MARKER.to_string()), Value::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::I256;
    use meta_util::FixedPoint;
    use serde_json::json;

    fn q(mantissa: i64, decimals: u32) -> Quantity {
        Quantity::Value(FixedPoint::new(I256::from(mantissa), decimals))
    }

    fn measurement() -> TwoWayMeasurement {
        TwoWayMeasurement {
            reference_price: q(200_000_000_000, 8),
            direct_usd: q(2_000_000_000_000_000_000, 18),
            direct: q(100_000_000, 6),
            reverse: q(990_000_000_000_000_000, 18),
            loss: q(10_000_000_000_000_000, 18),
            loss_pct: q(10_000_000_000_000_000, 18),
            price_per_token: q(100_000_000, 6),
        }
    }

    #[test]
    fn test_row_layout() {
        let report = TokenReport {
            timestamp: "Mon, 19 Oct 2026 08:05:09 GMT".to_string(),
            symbol: Some("USDC".to_string()),
            trade_amount: U256::exp10(18),
            base: measurement(),
            scaled: TwoWayMeasurement::failed(),
            price_per_token_diff: Quantity::Failed,
            price_per_token_diff_pct: Quantity::Failed,
            route_length: Some(2),
        };
        let row = report.into_row();
        assert_eq!(row.len(), ROW_WIDTH);
        assert_eq!(
            row,
            vec![
                json!("Mon, 19 Oct 2026 08:05:09 GMT"),
                json!("USDC"),
                json!("1.0"),
                json!("2000.00000000"),
                json!("2.000000000000000000"),
                json!("100.000000"),
                json!("0.990000000000000000"),
                json!("0.010000000000000000"),
                json!(1.0),
                json!("100.000000"),
                json!("Error"),
                json!("Error"),
                json!("Error"),
                json!("Error"),
                json!("Error"),
                json!("Error"),
                json!("Error"),
                json!("2"),
            ]
        );
    }

    #[test]
    fn test_missing_diagnostics() {
        let report = TokenReport {
            timestamp: String::new(),
            symbol: None,
            trade_amount: U256::exp10(18),
            base: measurement(),
            scaled: measurement(),
            price_per_token_diff: q(0, 6),
            price_per_token_diff_pct: q(0, 6),
            route_length: None,
        };
        let row = report.into_row();
        assert_eq!(row[1], json!("Error"));
        assert_eq!(row[15], json!("0.000000"));
        assert_eq!(row[16], json!(0.0));
        assert_eq!(row[17], json!("Error"));
    }
}
