//! Gateway failure classification
//!
//! A failure is permanent when the gateway says the device token itself is
//! no longer usable. Everything else is transient and left for a later
//! dispatch run to retry implicitly.

use std::fmt;

/// Lower-case signatures of permanent token failures.
///
/// Matched as substrings, so provider-token errors such as
/// `ExpiredProviderToken` or `InvalidProviderToken` stay transient.
const PERMANENT_SIGNATURES: &[&str] = &[
    "unregistered",
    "baddevicetoken",
    "bad device token",
    "devicetokennotfortopic",
    "device token not for topic",
    "invalidtoken",
    "invalid token",
    "expiredtoken",
    "expired token",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The token is dead and must be deactivated
    Permanent,
    /// Anything else; the token stays active
    Transient,
}

impl FailureKind {
    pub fn is_permanent(&self) -> bool {
        matches!(self, FailureKind::Permanent)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Permanent => f.write_str("permanent"),
            FailureKind::Transient => f.write_str("transient"),
        }
    }
}

/// Classify a stringified gateway error.
pub fn classify(error_message: &str) -> FailureKind {
    let message = error_message.to_lowercase();
    if PERMANENT_SIGNATURES
        .iter()
        .any(|signature| message.contains(signature))
    {
        FailureKind::Permanent
    } else {
        FailureKind::Transient
    }
}

/// Classify any error by its `Display` output.
pub fn classify_error<E: fmt::Display + ?Sized>(error: &E) -> FailureKind {
    classify(&error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_token_reasons_are_permanent() {
        for reason in [
            "APNs API error (400): BadDeviceToken",
            "APNs API error (410): Unregistered",
            "APNs API error (400): DeviceTokenNotForTopic",
            "bad device token",
            "INVALIDTOKEN",
            "Expired token",
        ] {
            assert_eq!(classify(reason), FailureKind::Permanent, "{}", reason);
        }
    }

    #[test]
    fn everything_else_is_transient() {
        for reason in [
            "APNs API error (503): ServiceUnavailable",
            "APNs API error (403): ExpiredProviderToken",
            "APNs API error (403): InvalidProviderToken",
            "APNs API error (429): TooManyRequests",
            "HTTP request error: connection reset",
            "",
        ] {
            assert_eq!(classify(reason), FailureKind::Transient, "{}", reason);
        }
    }

    #[test]
    fn classify_error_uses_display() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "BadDeviceToken");
        assert!(classify_error(&err).is_permanent());
    }
}
