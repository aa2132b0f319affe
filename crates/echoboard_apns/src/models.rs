//! Wire models for the APNs provider API

use echoboard_common::PushAlert;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The JSON body of one APNs request.
///
/// Custom keys sit beside `aps` at the top level of the payload.
#[derive(Debug, Clone, Serialize)]
pub struct ApnsNotification {
    pub aps: Aps,
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

/// The Apple-defined part of the payload.
#[derive(Debug, Clone, Serialize)]
pub struct Aps {
    pub alert: Alert,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

/// Body APNs returns with a non-2xx status.
#[derive(Debug, Deserialize)]
pub struct ApnsErrorBody {
    pub reason: String,
    /// Set with `Unregistered`: when the token stopped being valid, in ms.
    #[serde(default)]
    pub timestamp: Option<u64>,
}

impl From<&PushAlert> for ApnsNotification {
    fn from(alert: &PushAlert) -> Self {
        let mut custom = alert.payload.clone();
        // `aps` is reserved by Apple
        custom.remove("aps");

        Self {
            aps: Aps {
                alert: Alert {
                    title: alert.title.clone(),
                    body: alert.body.clone(),
                },
                sound: Some("default".to_string()),
            },
            custom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn custom_keys_sit_beside_aps() {
        let mut payload = Map::new();
        payload.insert("type".into(), json!("new_comment"));
        payload.insert("feedbackId".into(), json!("f-1"));
        payload.insert("aps".into(), json!({"badge": 9}));

        let alert = PushAlert {
            title: "New comment".into(),
            body: "Looks good".into(),
            payload,
        };

        let body = serde_json::to_value(ApnsNotification::from(&alert)).unwrap();
        assert_eq!(
            body,
            json!({
                "aps": {
                    "alert": {"title": "New comment", "body": "Looks good"},
                    "sound": "default"
                },
                "type": "new_comment",
                "feedbackId": "f-1"
            })
        );
    }
}
