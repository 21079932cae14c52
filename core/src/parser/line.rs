//! Tagged-line decoding for lsof field output.

/// Field identifier characters used by `lsof -F pcLfPnT`.
pub const PROCESS_TAG: char = 'p';
pub const COMMAND_TAG: char = 'c';
pub const LOGIN_TAG: char = 'L';
pub const DESCRIPTOR_TAG: char = 'f';
pub const PROTOCOL_TAG: char = 'P';
pub const NAME_TAG: char = 'n';
pub const TCP_INFO_TAG: char = 'T';

/// Prefix of the TCP info line that carries the connection state.
const STATE_KEY: &str = "ST=";

/// One decoded line of a capture, keyed by its leading tag character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggedLine<'a> {
    /// `p` - process identifier text, not yet validated.
    Identifier(&'a str),
    /// `c` - command name.
    Command(&'a str),
    /// `L` - login name of the owner.
    Owner(&'a str),
    /// `n` - socket name, `local[->remote]` or the wildcard marker.
    Address(&'a str),
    /// `TST=` - connection state.
    State(&'a str),
    /// `P` - transport protocol.
    Protocol(&'a str),
    /// Anything else: descriptors, queue sizes, unknown tags, blank lines.
    Other(&'a str),
}

impl<'a> TaggedLine<'a> {
    /// Decode a single line.
    ///
    /// A trailing `\r` is dropped so captures with CRLF endings decode the same.
    pub fn decode(line: &'a str) -> Self {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut chars = line.chars();
        let Some(tag) = chars.next() else {
            return TaggedLine::Other(line);
        };
        let value = chars.as_str();

        match tag {
            PROCESS_TAG => TaggedLine::Identifier(value),
            COMMAND_TAG => TaggedLine::Command(value),
            LOGIN_TAG => TaggedLine::Owner(value),
            NAME_TAG => TaggedLine::Address(value),
            PROTOCOL_TAG => TaggedLine::Protocol(value),
            TCP_INFO_TAG => match value.strip_prefix(STATE_KEY) {
                Some(state) => TaggedLine::State(state),
                None => TaggedLine::Other(line),
            },
            _ => TaggedLine::Other(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_header_lines() {
        assert_eq!(TaggedLine::decode("p1234"), TaggedLine::Identifier("1234"));
        assert_eq!(TaggedLine::decode("cnginx"), TaggedLine::Command("nginx"));
        assert_eq!(TaggedLine::decode("Lroot"), TaggedLine::Owner("root"));
    }

    #[test]
    fn test_decode_connection_lines() {
        assert_eq!(TaggedLine::decode("PTCP"), TaggedLine::Protocol("TCP"));
        assert_eq!(
            TaggedLine::decode("n127.0.0.1:443->10.0.0.5:51000"),
            TaggedLine::Address("127.0.0.1:443->10.0.0.5:51000")
        );
        assert_eq!(TaggedLine::decode("TST=LISTEN"), TaggedLine::State("LISTEN"));
    }

    #[test]
    fn test_tcp_info_without_state_is_ignored() {
        assert_eq!(TaggedLine::decode("TQR=0"), TaggedLine::Other("TQR=0"));
        assert_eq!(TaggedLine::decode("TQS=512"), TaggedLine::Other("TQS=512"));
        assert_eq!(TaggedLine::decode("T"), TaggedLine::Other("T"));
    }

    #[test]
    fn test_unknown_and_empty_lines() {
        assert_eq!(TaggedLine::decode("f6"), TaggedLine::Other("f6"));
        assert_eq!(TaggedLine::decode(""), TaggedLine::Other(""));
    }

    #[test]
    fn test_crlf_is_trimmed() {
        assert_eq!(TaggedLine::decode("TST=LISTEN\r"), TaggedLine::State("LISTEN"));
    }
}
