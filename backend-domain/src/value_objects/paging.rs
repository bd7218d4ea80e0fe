// Paging value objects

use serde::{Deserialize, Serialize};

/// A page size already clamped into `[1, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimit(u32);

impl PageLimit {
    /// Malformed or out-of-range input is clamped, never rejected.
    pub fn clamped(raw: Option<i64>, default: u32, max: u32) -> Self {
        let max = max.max(1);
        let value = raw.unwrap_or(i64::from(default)).clamp(1, i64::from(max));
        Self(value as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Lenient integer parsing for query strings: `"20"`, `" 20 "` parse,
/// anything else is treated as absent.
pub fn parse_lenient_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limit_clamps_into_range() {
        assert_eq!(PageLimit::clamped(None, 20, 200).get(), 20);
        assert_eq!(PageLimit::clamped(Some(0), 20, 200).get(), 1);
        assert_eq!(PageLimit::clamped(Some(-5), 20, 200).get(), 1);
        assert_eq!(PageLimit::clamped(Some(10_000), 20, 200).get(), 200);
        assert_eq!(PageLimit::clamped(Some(55), 20, 200).get(), 55);
    }

    #[test]
    fn lenient_parse_ignores_garbage() {
        assert_eq!(parse_lenient_int(Some("42")), Some(42));
        assert_eq!(parse_lenient_int(Some(" 7 ")), Some(7));
        assert_eq!(parse_lenient_int(Some("abc")), None);
        assert_eq!(parse_lenient_int(Some("")), None);
        assert_eq!(parse_lenient_int(None), None);
    }
}
