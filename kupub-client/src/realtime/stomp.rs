//! Minimal STOMP 1.2 frame codec (text frames only)

use std::fmt;

use super::RealtimeError;

pub const CONNECT: &str = "CONNECT";
pub const CONNECTED: &str = "CONNECTED";
pub const SUBSCRIBE: &str = "SUBSCRIBE";
pub const UNSUBSCRIBE: &str = "UNSUBSCRIBE";
pub const MESSAGE: &str = "MESSAGE";
pub const ERROR: &str = "ERROR";
pub const DISCONNECT: &str = "DISCONNECT";
pub const RECEIPT: &str = "RECEIPT";

/// Heart-beat "frame": a lone end-of-line
pub const HEARTBEAT: &str = "\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StompFrame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StompFrame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header (repeated headers: first one wins)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is(&self, command: &str) -> bool {
        self.command == command
    }

    // ========== Client frames ==========

    /// `heartbeat_ms` is what the client promises to send; it asks for none
    pub fn connect(host: &str, heartbeat_ms: u64) -> Self {
        Self::new(CONNECT)
            .header("accept-version", "1.2")
            .header("host", host)
            .header("heart-beat", format!("{heartbeat_ms},0"))
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new(SUBSCRIBE)
            .header("id", id)
            .header("destination", destination)
            .header("ack", "auto")
    }

    pub fn unsubscribe(id: &str) -> Self {
        Self::new(UNSUBSCRIBE).header("id", id)
    }

    pub fn disconnect() -> Self {
        Self::new(DISCONNECT)
    }

    // ========== Codec ==========

    /// Serialize, NUL-terminated
    pub fn encode(&self) -> String {
        // CONNECT/CONNECTED headers are never escaped
        let escape_headers = !(self.is(CONNECT) || self.is(CONNECTED));
        let mut out = String::with_capacity(self.command.len() + self.body.len() + 64);
        out.push_str(&self.command);
        out.push('\n');
        for (name, value) in &self.headers {
            if escape_headers {
                out.push_str(&escape(name));
                out.push(':');
                out.push_str(&escape(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        if !self.body.is_empty() && self.get("content-length").is_none() {
            out.push_str(&format!("content-length:{}\n", self.body.len()));
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Parse one frame. Heart-beats (only end-of-lines) yield `None`.
    pub fn parse(raw: &str) -> Result<Option<Self>, RealtimeError> {
        let raw = raw.trim_start_matches(['\r', '\n']);
        if raw.is_empty() {
            return Ok(None);
        }

        let (head, rest) = split_head(raw)
            .ok_or_else(|| RealtimeError::Frame("missing header terminator".into()))?;

        let mut lines = head.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
        let command = lines
            .next()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| RealtimeError::Frame("missing command".into()))?
            .to_string();
        let escaped = !(command == CONNECT || command == CONNECTED);

        let mut headers = Vec::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| RealtimeError::Frame(format!("malformed header line {line:?}")))?;
            if escaped {
                headers.push((unescape(name)?, unescape(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let frame = StompFrame {
            command,
            headers,
            body: String::new(),
        };
        let body = match frame.get("content-length").map(str::parse::<usize>) {
            Some(Ok(len)) => rest
                .get(..len)
                .ok_or_else(|| RealtimeError::Frame("body shorter than content-length".into()))?,
            Some(Err(_)) => return Err(RealtimeError::Frame("invalid content-length".into())),
            None => rest.split('\0').next().unwrap_or_default(),
        };

        Ok(Some(frame.with_body(body)))
    }
}

impl fmt::Display for StompFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        if let Some(dest) = self.get("destination") {
            write!(f, " {dest}")?;
        }
        Ok(())
    }
}

/// Split at the blank line ending the headers
fn split_head(raw: &str) -> Option<(&str, &str)> {
    let lf = raw.find("\n\n").map(|i| (i, 2));
    let crlf = raw.find("\r\n\r\n").map(|i| (i, 4));
    let (idx, sep) = match (lf, crlf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => {
            // Frame without headers or body: "COMMAND\n\0"
            let end = raw.find('\0')?;
            return Some((raw[..end].trim_end_matches(['\r', '\n']), ""));
        }
    };
    Some((&raw[..idx], &raw[idx + sep..]))
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(value: &str) -> Result<String, RealtimeError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(RealtimeError::Frame(format!(
                    "invalid header escape \\{}",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_subscribe() {
        let frame = StompFrame::subscribe("sub-0", "/topic/cs/orders");
        assert_eq!(
            frame.encode(),
            "SUBSCRIBE\nid:sub-0\ndestination:/topic/cs/orders\nack:auto\n\n\0"
        );
    }

    #[test]
    fn test_connect_headers_are_not_escaped() {
        let encoded = StompFrame::connect("api.kupub.kr:8080", 10000).encode();
        assert!(encoded.contains("host:api.kupub.kr:8080\n"));
        assert!(encoded.contains("heart-beat:10000,0\n"));
    }

    #[test]
    fn test_parse_message() {
        let raw = "MESSAGE\ndestination:/topic/cs/orders\nmessage-id:7\nsubscription:sub-0\ncontent-type:application/json\n\n{\"type\":\"NEW_ORDER\",\"orderId\":1}\0";
        let frame = StompFrame::parse(raw).unwrap().unwrap();
        assert!(frame.is(MESSAGE));
        assert_eq!(frame.get("destination"), Some("/topic/cs/orders"));
        assert_eq!(frame.body, r#"{"type":"NEW_ORDER","orderId":1}"#);
    }

    #[test]
    fn test_parse_honours_content_length() {
        let raw = "MESSAGE\ncontent-length:5\n\nab\0cdtrailing\0";
        let frame = StompFrame::parse(raw).unwrap().unwrap();
        assert_eq!(frame.body, "ab\0cd");
    }

    #[test]
    fn test_parse_crlf_and_leading_heartbeats() {
        let raw = "\n\r\nCONNECTED\r\nversion:1.2\r\nheart-beat:0,0\r\n\r\n\0";
        let frame = StompFrame::parse(raw).unwrap().unwrap();
        assert!(frame.is(CONNECTED));
        assert_eq!(frame.get("version"), Some("1.2"));
    }

    #[test]
    fn test_heartbeat_is_not_a_frame() {
        assert_eq!(StompFrame::parse("\n").unwrap(), None);
        assert_eq!(StompFrame::parse("\r\n\n").unwrap(), None);
    }

    #[test]
    fn test_header_escaping_round_trips() {
        let frame = StompFrame::new(MESSAGE).header("weird:name", "line1\nline2\\c");
        let encoded = frame.encode();
        assert!(encoded.contains("weird\\cname:line1\\nline2\\\\c\n"));
        let parsed = StompFrame::parse(&encoded).unwrap().unwrap();
        assert_eq!(parsed.get("weird:name"), Some("line1\nline2\\c"));
    }

    #[test]
    fn test_repeated_header_first_wins() {
        let raw = "MESSAGE\nfoo:first\nfoo:second\n\n\0";
        let frame = StompFrame::parse(raw).unwrap().unwrap();
        assert_eq!(frame.get("foo"), Some("first"));
    }

    #[test]
    fn test_malformed_frames() {
        assert!(StompFrame::parse("MESSAGE\nno-colon\n\n\0").is_err());
        assert!(StompFrame::parse("MESSAGE\nbad:esc\\t\n\n\0").is_err());
        assert!(StompFrame::parse("MESSAGE\ncontent-length:99\n\nshort\0").is_err());
        assert!(StompFrame::parse("MESSAGE").is_err());
    }

    #[test]
    fn test_body_gets_content_length() {
        let encoded = StompFrame::new("SEND").with_body("héllo").encode();
        assert!(encoded.contains("content-length:6\n"));
    }
}
