use crate::binder::RawRequest;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Request identifier backed by ULID, used to correlate log lines and responses.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse the id the client sent in `header` when it is a valid ULID,
    /// otherwise generate a fresh one.
    #[must_use]
    pub fn from_request(raw: &RawRequest, header: &str) -> Self {
        raw.header(header)
            .and_then(|v| v.trim().parse::<RequestId>().ok())
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(RequestId)
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_reuses_valid_client_id() {
        let id = RequestId::new().to_string();
        let raw = RawRequest::new(Method::GET, "/").with_header("X-Request-Id", id.clone());
        assert_eq!(RequestId::from_request(&raw, "x-request-id").to_string(), id);
    }

    #[test]
    fn test_replaces_invalid_client_id() {
        let raw = RawRequest::new(Method::GET, "/").with_header("x-request-id", "not-a-ulid");
        let id = RequestId::from_request(&raw, "x-request-id");
        assert_ne!(id.to_string(), "not-a-ulid");
        assert_eq!(id.to_string().len(), 26);
    }
}
