//! Currency conversion over a fixed rate table.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;

/// Units of each currency per US dollar.
const RATES: [(&str, f64); 4] = [("USD", 1.0), ("SGD", 1.35), ("EUR", 0.92), ("JPY", 149.50)];

pub const UNSUPPORTED_CURRENCY: &str = "Currency not supported. Use USD, SGD, EUR, or JPY";

fn rate(code: &str) -> Option<f64> {
    RATES.iter().find(|(c, _)| *c == code).map(|(_, r)| *r)
}

/// Convert `amount` between two supported currencies, going through USD.
///
/// Unsupported codes produce [`UNSUPPORTED_CURRENCY`] rather than an error so
/// the model can read the message and correct itself.
pub fn convert_currency(amount: f64, from_currency: &str, to_currency: &str) -> String {
    let (Some(from_rate), Some(to_rate)) = (rate(from_currency), rate(to_currency)) else {
        return UNSUPPORTED_CURRENCY.to_string();
    };

    let usd_amount = amount / from_rate;
    let result = usd_amount * to_rate;

    format!(
        "{} {from_currency} = {result:.2} {to_currency}",
        format_amount(amount)
    )
}

/// Shortest round-trip form with a trailing `.0` on whole amounts
/// (`100.0`) and a signed two-digit exponent (`1e+16`, `1e-05`).
fn format_amount(amount: f64) -> String {
    let repr = format!("{amount:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => repr,
        },
        None => repr,
    }
}

pub struct ConvertCurrency;

#[async_trait]
impl Tool for ConvertCurrency {
    fn name(&self) -> &str {
        "convert_currency"
    }

    fn description(&self) -> &str {
        "Convert between USD, SGD, EUR, and JPY using exchange rates"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "number",
                    "description": "Amount in the source currency"
                },
                "from_currency": {
                    "type": "string",
                    "description": "Source currency code (USD, SGD, EUR or JPY)"
                },
                "to_currency": {
                    "type": "string",
                    "description": "Target currency code (USD, SGD, EUR or JPY)"
                }
            },
            "required": ["amount", "from_currency", "to_currency"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let amount = args["amount"]
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("Missing 'amount' argument"))?;
        let from = args["from_currency"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'from_currency' argument"))?;
        let to = args["to_currency"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'to_currency' argument"))?;

        Ok(convert_currency(amount, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_every_ordered_pair() {
        let expected = [
            ("USD", "USD", "100.00"),
            ("USD", "SGD", "135.00"),
            ("USD", "EUR", "92.00"),
            ("USD", "JPY", "14950.00"),
            ("SGD", "USD", "74.07"),
            ("SGD", "SGD", "100.00"),
            ("SGD", "EUR", "68.15"),
            ("SGD", "JPY", "11074.07"),
            ("EUR", "USD", "108.70"),
            ("EUR", "SGD", "146.74"),
            ("EUR", "EUR", "100.00"),
            ("EUR", "JPY", "16250.00"),
            ("JPY", "USD", "0.67"),
            ("JPY", "SGD", "0.90"),
            ("JPY", "EUR", "0.62"),
            ("JPY", "JPY", "100.00"),
        ];

        for (from, to, value) in expected {
            assert_eq!(
                convert_currency(100.0, from, to),
                format!("100.0 {from} = {value} {to}")
            );
        }
    }

    #[test]
    fn keeps_fractional_amount_as_given() {
        assert_eq!(convert_currency(12.5, "USD", "EUR"), "12.5 USD = 11.50 EUR");
    }

    #[test]
    fn exponent_amounts_are_signed_and_padded() {
        assert_eq!(format_amount(1e16), "1e+16");
        assert_eq!(format_amount(1.5e16), "1.5e+16");
        assert_eq!(format_amount(1e-5), "1e-05");
        assert_eq!(format_amount(1e300), "1e+300");
        assert_eq!(format_amount(0.0001), "0.0001");
        assert_eq!(format_amount(1e15), "1000000000000000.0");
        assert_eq!(
            convert_currency(1e16, "USD", "USD"),
            "1e+16 USD = 10000000000000000.00 USD"
        );
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(convert_currency(1.0, "GBP", "USD"), UNSUPPORTED_CURRENCY);
        assert_eq!(convert_currency(1.0, "USD", "AUD"), UNSUPPORTED_CURRENCY);
        assert_eq!(convert_currency(1.0, "usd", "EUR"), UNSUPPORTED_CURRENCY);
    }

    #[tokio::test]
    async fn tool_reads_arguments() {
        let out = ConvertCurrency
            .execute(json!({"amount": 10, "from_currency": "USD", "to_currency": "SGD"}))
            .await
            .unwrap();
        assert_eq!(out, "10.0 USD = 13.50 SGD");
    }

    #[tokio::test]
    async fn tool_requires_amount() {
        let err = ConvertCurrency
            .execute(json!({"from_currency": "USD", "to_currency": "SGD"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("amount"));
    }
}
