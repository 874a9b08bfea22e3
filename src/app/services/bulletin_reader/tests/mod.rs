//! Shared fixtures for bulletin reader tests

pub mod header_tests;

/// Two bulletins with framing, a TAF line and a multi-line message
pub const TEST_BULLETIN: &str = "\u{1}\r\r\n\
123 \r\r\n\
FTUS45 KBOU 261120\r\r\n\
TAF\r\r\n\
KDEN 261130Z 2612/2712 09008KT P6SM SKC\r\r\n\
     FM261800 18015G25KT 3SM BKN015=\r\r\n\
KBOU 261130Z 2612/2712 27010KT P6SM SCT040=\r\r\n\
\u{3}\r\r\n\
NNNN\r\r\n\
FTUK31 EGRR 261100 AAA\n\
TAF EGLL 261100Z 2612/2718 24010KT 9999 SCT030= TAF EGKK 261100Z 2612/2718 NIL=\n";
