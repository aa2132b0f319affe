//! Environment lookups for configuration
//!
//! Plain settings come from `ECHOBOARD__SECTION__KEY` variables through the
//! `config` crate. Secrets stay out of config files: a string equal to
//! [`SECRET_MARKER`](crate::SECRET_MARKER) is replaced after loading, e.g.
//! `apns.key_base64` from `ECHOBOARD_SECRET_APNS_KEY_BASE64`, falling back to
//! `APNS_KEY_BASE64`. A marker nobody provides stays in place, which leaves
//! the owning section incomplete (push stays disabled for `apns`).

use crate::SECRET_MARKER;
use serde_json::Value;
use std::env;
use tracing::warn;

/// Prefix of plain configuration variables
pub const CONFIG_PREFIX: &str = "ECHOBOARD";

/// Separator between path segments of plain configuration variables
pub const CONFIG_SEPARATOR: &str = "__";

/// Prefix of secret variables
pub const SECRET_PREFIX: &str = "ECHOBOARD_SECRET";

/// Variable names consulted for the secret at `path`, in priority order.
pub fn secret_env_names(path: &[&str]) -> Vec<String> {
    let joined = path.join("_").to_uppercase();
    let mut names = vec![format!("{}_{}", SECRET_PREFIX, joined)];
    if path.len() > 1 {
        names.push(joined);
    }
    names
}

/// Replace every marker in `value` with what `lookup` returns for its
/// variable names.
///
/// # Returns
///
/// Dotted paths of the markers no variable provided
pub fn resolve_markers<F>(value: &mut Value, lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut unresolved = Vec::new();
    resolve_in(value, &mut Vec::new(), &lookup, &mut unresolved);
    unresolved
}

fn resolve_in<F>(
    value: &mut Value,
    path: &mut Vec<String>,
    lookup: &F,
    unresolved: &mut Vec<String>,
) where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                path.push(key.clone());
                resolve_in(child, path, lookup, unresolved);
                path.pop();
            }
        }
        Value::String(current) if current == SECRET_MARKER => {
            let segments: Vec<&str> = path.iter().map(String::as_str).collect();
            match secret_env_names(&segments).iter().find_map(|name| lookup(name)) {
                Some(secret) => *current = secret,
                None => unresolved.push(path.join(".")),
            }
        }
        _ => {}
    }
}

/// Resolve markers from the process environment.
pub fn inject_env_vars(value: &mut Value) {
    for path in resolve_markers(value, |name| env::var(name).ok()) {
        warn!("No environment variable provides secret {}", path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn secret_names_prefer_the_prefixed_variable() {
        assert_eq!(
            secret_env_names(&["apns", "key_base64"]),
            vec!["ECHOBOARD_SECRET_APNS_KEY_BASE64", "APNS_KEY_BASE64"]
        );
        assert_eq!(secret_env_names(&["token"]), vec!["ECHOBOARD_SECRET_TOKEN"]);
    }

    #[test]
    fn markers_are_replaced_and_other_values_kept() {
        let mut config = json!({
            "apns": { "key_base64": "secret_from_env", "bundle_id": "com.example.echoboard" },
            "database": { "url": "secret_from_env" }
        });
        let lookup = lookup_from(&[
            ("ECHOBOARD_SECRET_APNS_KEY_BASE64", "c2VjcmV0"),
            ("DATABASE_URL", "sqlite://data/prod.db"),
        ]);

        let unresolved = resolve_markers(&mut config, lookup);

        assert!(unresolved.is_empty());
        assert_eq!(config["apns"]["key_base64"], "c2VjcmV0");
        assert_eq!(config["apns"]["bundle_id"], "com.example.echoboard");
        assert_eq!(config["database"]["url"], "sqlite://data/prod.db");
    }

    #[test]
    fn missing_secrets_keep_the_marker_and_are_reported() {
        let mut config = json!({ "apns": { "key_base64": "secret_from_env" } });

        let unresolved = resolve_markers(&mut config, lookup_from(&[]));

        assert_eq!(unresolved, vec!["apns.key_base64".to_string()]);
        assert_eq!(config["apns"]["key_base64"], SECRET_MARKER);
    }
}
