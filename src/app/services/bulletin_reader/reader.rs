//! File reading and message splitting

use super::header::WmoHeader;
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, trace};

/// End-of-bulletin marker line
const END_OF_BULLETIN: &str = "NNNN";

/// One forecast message and the heading it was found under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletinMessage {
    /// Message text without its `=` terminator, line breaks kept
    pub text: String,

    /// Most recent WMO heading line before the message
    pub header: Option<String>,
}

/// Read a bulletin file and split it into messages
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn read_messages(path: &Path) -> Result<Vec<BulletinMessage>> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::input_file(path.display().to_string(), e.to_string()))?;
    let content = String::from_utf8_lossy(&bytes);
    let messages = split_messages(&content);
    debug!("Found {} messages in {}", messages.len(), path.display());
    Ok(messages)
}

/// Split bulletin text into `=`-terminated messages
///
/// A heading line starts a new bulletin and ends any unterminated message.
/// Transmission framing (control characters, channel sequence numbers and
/// `NNNN`) is dropped. Empty messages are skipped.
pub fn split_messages(content: &str) -> Vec<BulletinMessage> {
    let mut messages = Vec::new();
    let mut header: Option<String> = None;
    let mut buffer = String::new();

    for raw_line in content.lines() {
        let line = raw_line
            .trim_matches(|c: char| c.is_control() || c.is_whitespace())
            .to_string();
        if line.is_empty() || is_framing(&line) {
            continue;
        }

        if let Some(heading) = WmoHeader::parse(&line) {
            push_message(&mut messages, &mut buffer, &header);
            trace!("New bulletin heading: {}", heading.line);
            header = Some(heading.line);
            continue;
        }

        let mut segments = line.split('=').peekable();
        while let Some(segment) = segments.next() {
            append_segment(&mut buffer, segment);
            if segments.peek().is_some() {
                push_message(&mut messages, &mut buffer, &header);
            }
        }
    }
    push_message(&mut messages, &mut buffer, &header);

    messages
}

fn is_framing(line: &str) -> bool {
    line == END_OF_BULLETIN || line.chars().all(|c| c.is_ascii_digit())
}

fn append_segment(buffer: &mut String, segment: &str) {
    let segment = segment.trim();
    if segment.is_empty() {
        return;
    }
    if !buffer.is_empty() {
        buffer.push('\n');
    }
    buffer.push_str(segment);
}

fn push_message(messages: &mut Vec<BulletinMessage>, buffer: &mut String, header: &Option<String>) {
    let text = std::mem::take(buffer);
    if text.trim().is_empty() {
        return;
    }
    messages.push(BulletinMessage {
        text,
        header: header.clone(),
    });
}
