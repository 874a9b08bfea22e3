//! WMO abbreviated heading recognition

use regex::Regex;
use std::sync::LazyLock;

/// `TTAAii CCCC YYGGgg [BBB]`, e.g. `FTUS45 KBOU 261120 AAA`
static WMO_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{4}\d{2})\s+([A-Z]{4})\s+(\d{2})(\d{2})(\d{2})(?:\s+([A-Z]{3}))?$")
        .unwrap_or_else(|e| panic!("Invalid WMO heading pattern: {e}"))
});

/// A parsed WMO abbreviated heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmoHeader {
    /// Data designator, `TTAAii`
    pub designator: String,

    /// Originating centre, `CCCC`
    pub originator: String,

    pub day: u32,
    pub hour: u32,
    pub minute: u32,

    /// Amendment/correction indicator, `BBB`
    pub indicator: Option<String>,

    /// The heading line as it appeared, trimmed
    pub line: String,
}

impl WmoHeader {
    /// Parse a line as a heading; `None` if it is not one
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let caps = WMO_HEADING_RE.captures(line)?;
        let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

        Some(Self {
            designator: caps.get(1)?.as_str().to_string(),
            originator: caps.get(2)?.as_str().to_string(),
            day: number(3)?,
            hour: number(4)?,
            minute: number(5)?,
            indicator: caps.get(6).map(|m| m.as_str().to_string()),
            line: line.to_string(),
        })
    }
}
