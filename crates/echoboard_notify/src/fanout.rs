//! Device fan-out: one delivery unit per active device of a recipient.

use crate::store::NotificationStore;
use echoboard_common::models::DeviceToken;
use uuid::Uuid;

/// Active devices of a user. An empty list means the recipient is skipped.
///
/// Inactive rows are filtered here as well so a store that returns them by
/// mistake still never gets a dead token delivered to.
pub async fn devices_for<S: NotificationStore>(
    store: &S,
    user_id: Uuid,
) -> Result<Vec<DeviceToken>, S::Error> {
    let mut devices = store.active_devices(user_id).await?;
    devices.retain(|device| device.active && device.user_id == user_id);
    Ok(devices)
}
