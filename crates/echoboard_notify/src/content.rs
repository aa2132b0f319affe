//! Notification text and payload
//!
//! One `NotificationContent` is built per dispatch run and turned into the
//! `PushAlert` every device of every recipient receives.

use echoboard_common::models::{Comment, Feedback, FeedbackStatus, NotificationType, Project};
use echoboard_common::services::PushAlert;
use serde_json::{json, Map, Value};
use uuid::Uuid;

const COMMENT_PREVIEW_CHARS: usize = 200;

/// Title, body and correlation ids of one notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationContent {
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub feedback_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub vote_count: Option<u64>,
    pub old_status: Option<FeedbackStatus>,
    pub new_status: Option<FeedbackStatus>,
}

impl NotificationContent {
    fn base(notification_type: NotificationType, title: String, body: String) -> Self {
        Self {
            notification_type,
            title,
            body,
            feedback_id: None,
            comment_id: None,
            project_id: None,
            vote_count: None,
            old_status: None,
            new_status: None,
        }
    }

    pub fn new_feedback(feedback: &Feedback, project: &Project) -> Self {
        Self {
            feedback_id: Some(feedback.id),
            project_id: Some(project.id),
            ..Self::base(
                NotificationType::NewFeedback,
                format!("New feedback in {}", project.name),
                feedback.title.clone(),
            )
        }
    }

    pub fn new_comment(comment: &Comment, feedback: &Feedback, project: &Project) -> Self {
        Self {
            feedback_id: Some(feedback.id),
            comment_id: Some(comment.id),
            project_id: Some(project.id),
            ..Self::base(
                NotificationType::NewComment,
                format!("New comment on \"{}\"", feedback.title),
                preview(&comment.content),
            )
        }
    }

    pub fn new_vote(feedback: &Feedback, vote_count: u64) -> Self {
        let noun = if vote_count == 1 { "vote" } else { "votes" };
        Self {
            feedback_id: Some(feedback.id),
            project_id: Some(feedback.project_id),
            vote_count: Some(vote_count),
            ..Self::base(
                NotificationType::NewVote,
                format!("New vote on \"{}\"", feedback.title),
                format!("{} {} total", vote_count, noun),
            )
        }
    }

    pub fn status_change(
        feedback: &Feedback,
        old_status: FeedbackStatus,
        new_status: FeedbackStatus,
        project: &Project,
    ) -> Self {
        Self {
            feedback_id: Some(feedback.id),
            project_id: Some(project.id),
            old_status: Some(old_status),
            new_status: Some(new_status),
            ..Self::base(
                NotificationType::StatusChange,
                "Status updated".to_string(),
                format!(
                    "\"{}\" moved from {} to {}",
                    feedback.title,
                    old_status.display_name(),
                    new_status.display_name()
                ),
            )
        }
    }

    /// `<scheme>://feedback/<id>` when a feedback id is known, else
    /// `<scheme>://project/<id>`, else nothing.
    pub fn deep_link(&self, scheme: &str) -> Option<String> {
        self.feedback_id
            .map(|id| format!("{}://feedback/{}", scheme, id))
            .or_else(|| self.project_id.map(|id| format!("{}://project/{}", scheme, id)))
    }

    /// Custom payload keys delivered beside the alert.
    pub fn payload(&self, scheme: &str) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("type".into(), json!(self.notification_type.as_str()));

        let ids = [
            ("feedbackId", self.feedback_id),
            ("commentId", self.comment_id),
            ("projectId", self.project_id),
        ];
        for (key, id) in ids {
            if let Some(id) = id {
                payload.insert(key.into(), json!(id.to_string()));
            }
        }
        if let Some(count) = self.vote_count {
            payload.insert("voteCount".into(), json!(count));
        }
        if let Some(status) = self.old_status {
            payload.insert("oldStatus".into(), json!(status.as_str()));
        }
        if let Some(status) = self.new_status {
            payload.insert("newStatus".into(), json!(status.as_str()));
        }
        if let Some(link) = self.deep_link(scheme) {
            payload.insert("deepLink".into(), json!(link));
        }
        payload
    }

    pub fn to_alert(&self, scheme: &str) -> PushAlert {
        PushAlert {
            title: self.title.clone(),
            body: self.body.clone(),
            payload: self.payload(scheme),
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(COMMENT_PREVIEW_CHARS).collect()
}
