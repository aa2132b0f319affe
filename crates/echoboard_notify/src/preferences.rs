//! Preference resolution
//!
//! Three layers decide whether a user hears about an event in a project,
//! first decisive layer wins:
//!
//! 1. the user's global push switch,
//! 2. the project-scoped preference row (`muted`, then the per-type override),
//! 3. the user's personal per-type preference.

use crate::store::NotificationStore;
use echoboard_common::models::{NotificationType, ProjectMemberPreference, User};
use uuid::Uuid;

/// Decide whether `user` should be notified about `notification_type`.
///
/// `project_preference` is the user's preference row for the project of the
/// event, if one exists. A missing row means "not muted, nothing overridden".
pub fn should_notify(
    user: &User,
    project_preference: Option<&ProjectMemberPreference>,
    notification_type: NotificationType,
) -> bool {
    if !user.push_enabled {
        return false;
    }

    if let Some(pref) = project_preference {
        if pref.muted {
            return false;
        }
        if let Some(value) = pref.override_for(notification_type) {
            return value;
        }
    }

    user.preferences.for_type(notification_type)
}

/// Load the project preference of `user` and evaluate [`should_notify`].
pub async fn should_notify_in_project<S: NotificationStore>(
    store: &S,
    user: &User,
    project_id: Uuid,
    notification_type: NotificationType,
) -> Result<bool, S::Error> {
    // The global switch settles it without a lookup.
    if !user.push_enabled {
        return Ok(false);
    }
    let preference = store.find_member_preference(user.id, project_id).await?;
    Ok(should_notify(user, preference.as_ref(), notification_type))
}
