//! PIN-based client access.
//!
//! Each client gets a shared PIN string; entering it selects which rows of
//! the master database they can see. This is access scoping for a trusted
//! internal tool, not a security boundary.

use tracing::info;

/// Mapping from client code to that client's PIN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPins {
    pins: Vec<(String, String)>,
}

impl Default for ClientPins {
    fn default() -> Self {
        Self::new(
            [
                ("BS04", "bs04ts"),
                ("CB05", "cb05ts"),
                ("JS03", "js03ts"),
                ("MR01", "mr01ts"),
            ]
            .iter()
            .map(|(code, pin)| (code.to_string(), pin.to_string()))
            .collect(),
        )
    }
}

impl ClientPins {
    pub fn new(pins: Vec<(String, String)>) -> Self {
        Self { pins }
    }

    /// The configured (code, pin) pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pins.iter().map(|(code, pin)| (code.as_str(), pin.as_str()))
    }

    /// Resolve a PIN to its client code. Comparison ignores surrounding
    /// whitespace and case.
    pub fn authenticate(&self, pin: &str) -> Option<&str> {
        let entered = pin.trim().to_lowercase();
        self.pins
            .iter()
            .find(|(_, known)| entered == known.to_lowercase())
            .map(|(code, _)| {
                info!(client = %code, "client authenticated");
                code.as_str()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate_known_pin() {
        let pins = ClientPins::default();
        assert_eq!(pins.authenticate("bs04ts"), Some("BS04"));
        assert_eq!(pins.authenticate("mr01ts"), Some("MR01"));
    }

    #[test]
    fn test_authenticate_trims_and_ignores_case() {
        let pins = ClientPins::default();
        assert_eq!(pins.authenticate("  BS04TS  "), Some("BS04"));
    }

    #[test]
    fn test_authenticate_rejects_unknown_pin() {
        let pins = ClientPins::default();
        assert_eq!(pins.authenticate("wrong"), None);
        assert_eq!(pins.authenticate(""), None);
        // Client codes are not PINs.
        assert_eq!(pins.authenticate("BS04"), None);
    }
}
