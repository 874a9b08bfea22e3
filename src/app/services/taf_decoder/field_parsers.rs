//! Lenient token scanning utilities
//!
//! TAF groups are fixed-width digit runs glued to letters and slashes
//! (`261130Z`, `2612/2712`, `18015G25KT`). These helpers read them the way a
//! C `scanf("%2d%2d")` would: a numeric field takes up to N digits and stops at
//! the first non-digit, and trailing characters are ignored.

/// Cursor over a token, consuming fields from the left
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    /// Read between 1 and `max_digits` leading ASCII digits
    pub fn number(&mut self, max_digits: usize) -> Option<u32> {
        let len = self
            .rest
            .bytes()
            .take(max_digits)
            .take_while(|b| b.is_ascii_digit())
            .count();
        if len == 0 {
            return None;
        }
        let value = self.rest[..len].parse().ok()?;
        self.rest = &self.rest[len..];
        Some(value)
    }

    /// Consume an exact literal prefix
    pub fn literal(&mut self, literal: &str) -> Option<()> {
        self.rest = self.rest.strip_prefix(literal)?;
        Some(())
    }

    /// Unconsumed remainder of the token
    pub fn rest(&self) -> &'a str {
        self.rest
    }
}

/// Parse `DDHHMM` (as in `261130Z` or the body of `FM261800`)
pub fn parse_day_hour_minute(text: &str) -> Option<(u32, u32, u32)> {
    let mut scanner = Scanner::new(text);
    let day = scanner.number(2)?;
    let hour = scanner.number(2)?;
    let minute = scanner.number(2)?;
    Some((day, hour, minute))
}

/// Parse a `DDHH/DDHH` validity range into `((day, hour), (day, hour))`
pub fn parse_day_hour_range(text: &str) -> Option<((u32, u32), (u32, u32))> {
    let mut scanner = Scanner::new(text);
    let start_day = scanner.number(2)?;
    let start_hour = scanner.number(2)?;
    scanner.literal("/")?;
    let end_day = scanner.number(2)?;
    let end_hour = scanner.number(2)?;
    Some(((start_day, start_hour), (end_day, end_hour)))
}

/// Parse a `PROBnn` token into its percentage
pub fn parse_probability(text: &str) -> Option<u32> {
    let mut scanner = Scanner::new(text);
    scanner.literal("PROB")?;
    scanner.number(3)
}

/// Parse `<prefix>nn/DDHH` temperature groups (`TX25/2621Z`, `TNM03/2710Z`)
pub fn parse_temperature_group(text: &str, prefix: &str) -> Option<(u32, u32, u32)> {
    let mut scanner = Scanner::new(text);
    scanner.literal(prefix)?;
    let value = scanner.number(2)?;
    scanner.literal("/")?;
    let day = scanner.number(2)?;
    let hour = scanner.number(2)?;
    Some((value, day, hour))
}

/// Check whether a token contains any ASCII letters
pub fn has_alpha(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_alphabetic())
}
