//! Tests for WMO heading recognition

use crate::app::services::bulletin_reader::WmoHeader;

#[test]
fn test_parse_heading() {
    let header = WmoHeader::parse("FTUS45 KBOU 261120").unwrap();
    assert_eq!(header.designator, "FTUS45");
    assert_eq!(header.originator, "KBOU");
    assert_eq!((header.day, header.hour, header.minute), (26, 11, 20));
    assert_eq!(header.indicator, None);
}

#[test]
fn test_parse_heading_with_indicator() {
    let header = WmoHeader::parse("  FTUK31 EGRR 261100 AAA ").unwrap();
    assert_eq!(header.indicator.as_deref(), Some("AAA"));
    assert_eq!(header.line, "FTUK31 EGRR 261100 AAA");
}

#[test]
fn test_non_headings_rejected() {
    assert!(WmoHeader::parse("TAF KDEN 261130Z 2612/2712").is_none());
    assert!(WmoHeader::parse("KDEN 261130Z 2612/2712 09008KT").is_none());
    assert!(WmoHeader::parse("FTUS45 KBOU 2611").is_none());
    assert!(WmoHeader::parse("").is_none());

    let header = WmoHeader::parse("SAUS70 KWBC 261100").unwrap();
    assert_eq!(header.designator, "SAUS70");
}
