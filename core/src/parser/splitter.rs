//! Splits a raw capture into per-process records and per-connection chunks.
//!
//! The capture contract is `lsof -i -P -n -F pcLfPnT`: every process set
//! starts with a `p` line and every file set inside it with an `f` line.

use crate::error::{Error, Result};

use super::line::TaggedLine;

/// Separates process records.
pub const PROCESS_SENTINEL: &str = "\np";
/// Separates connection chunks within a record.
pub const CONNECTION_SENTINEL: &str = "\nf";

/// The slices of one process record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    /// Process identifier text with its tag removed, not yet validated.
    pub identifier: &'a str,
    /// Remaining header lines (command, login), still tagged.
    pub header: Vec<&'a str>,
    /// One chunk per file set. The first line of each chunk is the file
    /// descriptor value, whose tag the split consumed.
    pub connections: Vec<&'a str>,
}

/// Split a capture into records.
///
/// Splitting on `"\np"` strips the tag from every record except the first,
/// which has no preceding newline; that one is stripped here explicitly.
pub fn split_records(raw: &str) -> Result<Vec<Record<'_>>> {
    let mut records = Vec::new();

    for (index, chunk) in raw.split(PROCESS_SENTINEL).enumerate() {
        let mut sections = chunk.split(CONNECTION_SENTINEL);
        let header = sections.next().unwrap_or_default();
        let mut lines = header.lines().map(|line| line.trim_end_matches('\r'));

        let first = lines.next().unwrap_or_default();
        if first.is_empty() {
            // Empty capture, or a blank record left by a stray newline
            continue;
        }

        let identifier = if index == 0 {
            match TaggedLine::decode(first) {
                TaggedLine::Identifier(id) => id,
                _ => {
                    return Err(Error::ParseError(format!(
                        "capture does not start with a process identifier: {:?}",
                        first
                    )))
                }
            }
        } else {
            first
        };

        records.push(Record {
            identifier,
            header: lines.collect(),
            connections: sections.collect(),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTURE: &str = "p1234\ncnginx\nLroot\nf6\nPTCP\nn127.0.0.1:80\nTST=LISTEN\nf7\nPTCP\nn127.0.0.1:443->10.0.0.5:51000\nTST=ESTABLISHED\np99\ncsshd\nLroot\nf3\nPTCP\nn*:22\nTST=LISTEN\n";

    #[test]
    fn test_split_records() {
        let records = split_records(CAPTURE).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].identifier, "1234");
        assert_eq!(records[0].header, vec!["cnginx", "Lroot"]);
        assert_eq!(records[0].connections.len(), 2);
        assert!(records[0].connections[0].starts_with("6\nPTCP"));

        assert_eq!(records[1].identifier, "99");
        assert_eq!(records[1].connections.len(), 1);
    }

    #[test]
    fn test_empty_capture() {
        assert!(split_records("").unwrap().is_empty());
        assert!(split_records("\n").unwrap().is_empty());
    }

    #[test]
    fn test_capture_must_start_with_identifier() {
        let err = split_records("cnginx\nLroot\n").unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }

    #[test]
    fn test_record_without_connections() {
        let records = split_records("p42\ncidle\nLnobody\n").unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].connections.is_empty());
    }
}
