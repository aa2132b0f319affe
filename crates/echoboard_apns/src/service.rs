//! `PushGateway` implementation backed by APNs.

use crate::client::ApnsClient;
use crate::error::ApnsError;
use crate::models::ApnsNotification;
use echoboard_common::services::{BoxFuture, PushAlert, PushGateway, PushReceipt};

impl PushGateway for ApnsClient {
    type Error = ApnsError;

    fn send<'a>(
        &'a self,
        device_token: &'a str,
        alert: &'a PushAlert,
    ) -> BoxFuture<'a, PushReceipt, Self::Error> {
        Box::pin(async move {
            let notification = ApnsNotification::from(alert);
            let id = self.send_notification(device_token, &notification).await?;
            Ok(PushReceipt { id })
        })
    }
}
