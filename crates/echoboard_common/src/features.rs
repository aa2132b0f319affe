//! Runtime feature checks.
//!
//! Push delivery is switched on by configuration, not at compile time. The
//! backend asks here once at startup and hands the answer to the dispatcher.

use echoboard_config::AppConfig;

/// Check if a feature is enabled at runtime based on configuration.
///
/// # Arguments
///
/// * `use_feature` - The configuration flag that enables the feature
/// * `feature_config` - The configuration section for the feature
///
/// # Returns
///
/// `true` if the flag is set and the section is present
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// Push is enabled only when the flag is on and the APNs section is complete.
pub fn is_apns_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_apns, config.apns.as_ref())
        && config.apns.as_ref().is_some_and(|apns| apns.is_complete())
}
