// --- File: crates/echoboard_common/src/models.rs ---

// Entities shared by the persistence layer, the push gateway and the
// notification engine. Users, projects, members, feedback, comments and votes
// are owned by the CRUD side of the backend and only read here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The four kinds of push notification the backend can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewFeedback,
    NewComment,
    NewVote,
    StatusChange,
}

impl NotificationType {
    pub const ALL: [NotificationType; 4] = [
        NotificationType::NewFeedback,
        NotificationType::NewComment,
        NotificationType::NewVote,
        NotificationType::StatusChange,
    ];

    /// Wire and storage name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::NewFeedback => "new_feedback",
            NotificationType::NewComment => "new_comment",
            NotificationType::NewVote => "new_vote",
            NotificationType::StatusChange => "status_change",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown notification type: {}", s))
    }
}

/// A user's personal per-type push preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub new_feedback: bool,
    pub new_comment: bool,
    pub new_vote: bool,
    pub status_change: bool,
}

impl NotificationPreferences {
    /// Returns the preference for a single notification type.
    pub fn for_type(&self, notification_type: NotificationType) -> bool {
        match notification_type {
            NotificationType::NewFeedback => self.new_feedback,
            NotificationType::NewComment => self.new_comment,
            NotificationType::NewVote => self.new_vote,
            NotificationType::StatusChange => self.status_change,
        }
    }
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            new_feedback: true,
            new_comment: true,
            new_vote: true,
            status_change: true,
        }
    }
}

/// A registered user of the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Global kill switch for every push notification.
    pub push_enabled: bool,
    pub preferences: NotificationPreferences,
}

impl User {
    /// Create a user with push enabled and every personal preference on.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
            push_enabled: true,
            preferences: NotificationPreferences::default(),
        }
    }
}

/// A feedback project owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
}

/// Role of a member inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Member,
    Viewer,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
            MemberRole::Viewer => "viewer",
        }
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(MemberRole::Admin),
            "member" => Ok(MemberRole::Member),
            "viewer" => Ok(MemberRole::Viewer),
            other => Err(format!("unknown member role: {}", other)),
        }
    }
}

/// Links a user to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
}

/// Project-scoped override of a member's personal preferences.
///
/// At most one exists per (user, project). `None` in a per-type field defers to
/// the user's personal preference; `muted` silences every type for the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectMemberPreference {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub muted: bool,
    pub new_feedback: Option<bool>,
    pub new_comment: Option<bool>,
    pub new_vote: Option<bool>,
    pub status_change: Option<bool>,
}

impl ProjectMemberPreference {
    /// Create an empty override row: not muted, nothing overridden.
    pub fn new(user_id: Uuid, project_id: Uuid) -> Self {
        Self {
            user_id,
            project_id,
            ..Default::default()
        }
    }

    /// Returns the override for a single notification type, if any.
    pub fn override_for(&self, notification_type: NotificationType) -> Option<bool> {
        match notification_type {
            NotificationType::NewFeedback => self.new_feedback,
            NotificationType::NewComment => self.new_comment,
            NotificationType::NewVote => self.new_vote,
            NotificationType::StatusChange => self.status_change,
        }
    }
}

/// Lifecycle status of a feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    Pending,
    Approved,
    InProgress,
    Testflight,
    Completed,
    Rejected,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Pending => "pending",
            FeedbackStatus::Approved => "approved",
            FeedbackStatus::InProgress => "in_progress",
            FeedbackStatus::Testflight => "testflight",
            FeedbackStatus::Completed => "completed",
            FeedbackStatus::Rejected => "rejected",
        }
    }

    /// Human readable label used in notification bodies.
    pub fn display_name(&self) -> &'static str {
        match self {
            FeedbackStatus::Pending => "Pending",
            FeedbackStatus::Approved => "Approved",
            FeedbackStatus::InProgress => "In Progress",
            FeedbackStatus::Testflight => "TestFlight",
            FeedbackStatus::Completed => "Completed",
            FeedbackStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feedback item submitted to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: FeedbackStatus,
    /// Email of the submitter, matched against registered users.
    pub user_email: Option<String>,
}

/// A comment on a feedback item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub feedback_id: Uuid,
    pub content: String,
    /// Registered author, if the comment came from a signed-in user.
    pub user_id: Option<Uuid>,
    pub is_admin: bool,
}

/// A vote on a feedback item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub feedback_id: Uuid,
    pub email: Option<String>,
    pub notify_status_change: bool,
}

/// A push registration for one device of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceToken {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Opaque token issued by the push gateway.
    pub token: String,
    pub platform: String,
    pub active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl DeviceToken {
    /// Create a new, active registration.
    pub fn new(user_id: Uuid, token: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token: token.into(),
            platform: platform.into(),
            active: true,
            last_used_at: None,
            created_at: Some(Utc::now()),
        }
    }
}

/// Outcome of one device delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent,
    Failed,
    TokenExpired,
}

impl DeliveryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Sent => "sent",
            DeliveryOutcome::Failed => "failed",
            DeliveryOutcome::TokenExpired => "token_expired",
        }
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(DeliveryOutcome::Sent),
            "failed" => Ok(DeliveryOutcome::Failed),
            "token_expired" => Ok(DeliveryOutcome::TokenExpired),
            other => Err(format!("unknown delivery outcome: {}", other)),
        }
    }
}

/// Append-only audit record of a delivery attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device_token_id: Option<Uuid>,
    pub notification_type: NotificationType,
    pub outcome: DeliveryOutcome,
    pub error_message: Option<String>,
    pub feedback_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_type_round_trips_through_its_name() {
        for t in NotificationType::ALL {
            assert_eq!(t.as_str().parse::<NotificationType>(), Ok(t));
        }
        assert!("weekly_digest".parse::<NotificationType>().is_err());
    }

    #[test]
    fn member_preference_overrides_are_per_type() {
        let mut pref = ProjectMemberPreference::new(Uuid::new_v4(), Uuid::new_v4());
        pref.new_comment = Some(false);

        assert_eq!(pref.override_for(NotificationType::NewComment), Some(false));
        assert_eq!(pref.override_for(NotificationType::NewVote), None);
        assert!(!pref.muted);
    }

    #[test]
    fn delivery_outcome_serializes_snake_case() {
        let json = serde_json::to_string(&DeliveryOutcome::TokenExpired).unwrap();
        assert_eq!(json, "\"token_expired\"");
    }
}
