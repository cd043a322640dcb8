//! Amounts are integer paise everywhere. Clients send them either as JSON
//! numbers or as numeric strings, so input DTOs deserialize through the
//! helpers below.

use serde::{Deserialize, Deserializer};

/// Integer amount in paise (1/100 rupee)
pub type Paise = i64;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Str(String),
}

fn to_paise(raw: NumberOrString) -> Result<Paise, String> {
    match raw {
        NumberOrString::Int(v) => Ok(v),
        NumberOrString::Float(v) if v.fract() == 0.0 => Ok(v as i64),
        NumberOrString::Float(v) => Err(format!("amount must be whole paise, got {}", v)),
        NumberOrString::Str(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .map_err(|_| format!("invalid amount: {:?}", s))
        }
    }
}

/// `#[serde(deserialize_with = "deserialize_paise")]`
pub fn deserialize_paise<'de, D>(deserializer: D) -> Result<Paise, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = NumberOrString::deserialize(deserializer)?;
    to_paise(raw).map_err(serde::de::Error::custom)
}

/// Same as [`deserialize_paise`] for optional fields; `null` and `""` map to `None`.
pub fn deserialize_opt_paise<'de, D>(deserializer: D) -> Result<Option<Paise>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrString> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(NumberOrString::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => to_paise(v).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Formats paise as rupees with Indian digit grouping: 10850000 -> "₹1,08,500.00"
pub fn format_rupees(paise: Paise) -> String {
    let negative = paise < 0;
    let abs = paise.unsigned_abs();
    let rupees = abs / 100;
    let fraction = abs % 100;

    let digits = rupees.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut parts: Vec<String> = Vec::new();
        let head_chars: Vec<char> = head.chars().collect();
        let mut end = head_chars.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            parts.push(head_chars[start..end].iter().collect());
            end = start;
        }
        parts.reverse();
        format!("{},{}", parts.join(","), tail)
    };

    format!(
        "{}₹{}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        fraction
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Amounts {
        #[serde(deserialize_with = "deserialize_paise")]
        price: Paise,
        #[serde(default, deserialize_with = "deserialize_opt_paise")]
        deposit: Option<Paise>,
    }

    #[test]
    fn test_accepts_numbers_and_strings() {
        let a: Amounts = serde_json::from_str(r#"{"price": 6000, "deposit": "50000"}"#).unwrap();
        assert_eq!(a.price, 6000);
        assert_eq!(a.deposit, Some(50000));

        let b: Amounts = serde_json::from_str(r#"{"price": " 6000 ", "deposit": ""}"#).unwrap();
        assert_eq!(b.price, 6000);
        assert_eq!(b.deposit, None);

        let c: Amounts = serde_json::from_str(r#"{"price": 6000.0}"#).unwrap();
        assert_eq!(c.price, 6000);
        assert_eq!(c.deposit, None);
    }

    #[test]
    fn test_rejects_fractional_paise() {
        assert!(serde_json::from_str::<Amounts>(r#"{"price": 60.5}"#).is_err());
        assert!(serde_json::from_str::<Amounts>(r#"{"price": "sixty"}"#).is_err());
    }

    #[test]
    fn test_format_rupees() {
        assert_eq!(format_rupees(0), "₹0.00");
        assert_eq!(format_rupees(6000), "₹60.00");
        assert_eq!(format_rupees(108500), "₹1,085.00");
        assert_eq!(format_rupees(10850005), "₹1,08,500.05");
        assert_eq!(format_rupees(-1550), "-₹15.50");
    }
}
