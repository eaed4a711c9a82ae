use serde::{Serialize, Serializer};
use serde_json::Value;

/// A response body as it should be shown: parsed JSON when it is JSON,
/// otherwise the text or bytes as received.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    pub fn from_bytes(body: Vec<u8>) -> Self {
        match String::from_utf8(body) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(json) => Payload::Json(json),
                Err(_) => Payload::Text(text),
            },
            Err(e) => Payload::Binary(e.into_bytes()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Payload::Json(v) => v.serialize(serializer),
            Payload::Text(s) => serializer.serialize_str(s),
            Payload::Binary(b) => {
                serializer.serialize_str(&format!("<{} bytes of binary data>", b.len()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_bodies_should_be_parsed() {
        let payload = Payload::from_bytes(br#"{"error":"not found"}"#.to_vec());
        assert_eq!(payload, Payload::Json(json!({"error": "not found"})));
    }

    #[test]
    fn other_bodies_should_be_preserved() {
        assert_eq!(
            Payload::from_bytes(b"<h1>hi</h1>".to_vec()),
            Payload::Text("<h1>hi</h1>".into())
        );
        assert_eq!(Payload::from_bytes(Vec::new()), Payload::Text(String::new()));
        assert_eq!(
            Payload::from_bytes(vec![0xff, 0xfe, 0x00]),
            Payload::Binary(vec![0xff, 0xfe, 0x00])
        );
    }

    #[test]
    fn binary_should_serialize_as_summary() {
        let s = serde_json::to_string(&Payload::Binary(vec![0xff; 3])).unwrap();
        assert_eq!(s, r#""<3 bytes of binary data>""#);
    }
}
