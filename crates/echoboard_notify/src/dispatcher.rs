//! Dispatch orchestration
//!
//! Each entry point is one dispatch run: resolve recipients, fan out to their
//! active devices, send, classify failures, update device state and log every
//! attempt. Entry points report what happened but never fail; the `spawn_*`
//! variants run the same work on a background task.

use crate::classifier::{classify, FailureKind};
use crate::content::NotificationContent;
use crate::delivery_log::{DeliveryContext, DeliveryLogger};
use crate::error::NotifyError;
use crate::fanout::devices_for;
use crate::recipients::{RecipientResolver, RecipientSet};
use crate::store::NotificationStore;
use chrono::Utc;
use echoboard_common::models::{
    Comment, DeliveryOutcome, DeviceToken, Feedback, FeedbackStatus, NotificationType, Project,
    User,
};
use echoboard_common::services::{PushAlert, PushGateway};
use echoboard_config::NotificationConfig;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Whether push delivery is configured for this process.
///
/// Decided once at startup. A disabled capability turns every dispatch run
/// into a no-op.
pub enum PushCapability<G> {
    Disabled,
    Enabled(Arc<G>),
}

impl<G> PushCapability<G> {
    pub fn enabled(gateway: G) -> Self {
        PushCapability::Enabled(Arc::new(gateway))
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, PushCapability::Enabled(_))
    }
}

impl<G> Clone for PushCapability<G> {
    fn clone(&self) -> Self {
        match self {
            PushCapability::Disabled => PushCapability::Disabled,
            PushCapability::Enabled(gateway) => PushCapability::Enabled(Arc::clone(gateway)),
        }
    }
}

/// How a dispatch run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Completed,
    /// Push is not configured; nothing was attempted.
    PushDisabled,
    /// Recipient resolution failed; nothing was attempted.
    Aborted,
}

/// Counts of one dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    pub status: RunStatus,
    /// Users that passed resolution.
    pub recipients: usize,
    /// Device delivery attempts.
    pub attempts: usize,
    pub sent: usize,
    pub failed: usize,
    pub token_expired: usize,
    /// Recipients whose delivery chain broke before reaching a device.
    pub recipient_errors: usize,
}

impl DispatchReport {
    fn with_status(status: RunStatus) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: DeliveryOutcome) {
        self.attempts += 1;
        match outcome {
            DeliveryOutcome::Sent => self.sent += 1,
            DeliveryOutcome::Failed => self.failed += 1,
            DeliveryOutcome::TokenExpired => self.token_expired += 1,
        }
    }

    fn merge(&mut self, other: DispatchReport) {
        self.attempts += other.attempts;
        self.sent += other.sent;
        self.failed += other.failed;
        self.token_expired += other.token_expired;
        self.recipient_errors += other.recipient_errors;
    }
}

/// Which sources feed the recipient set of a run.
struct AudiencePlan<'a> {
    project: &'a Project,
    exclude: Vec<Uuid>,
    exclude_submitter_of: Option<&'a Feedback>,
    submitter_of: Option<&'a Feedback>,
    voters_of: Option<Uuid>,
}

impl<'a> AudiencePlan<'a> {
    fn project(project: &'a Project) -> Self {
        Self {
            project,
            exclude: Vec::new(),
            exclude_submitter_of: None,
            submitter_of: None,
            voters_of: None,
        }
    }
}

pub struct NotificationDispatcher<S, G> {
    store: Arc<S>,
    push: PushCapability<G>,
    logger: DeliveryLogger<S>,
    config: Arc<NotificationConfig>,
}

impl<S, G> Clone for NotificationDispatcher<S, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            push: self.push.clone(),
            logger: self.logger.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, G> NotificationDispatcher<S, G>
where
    S: NotificationStore,
    G: PushGateway + 'static,
{
    pub fn new(store: S, push: PushCapability<G>, config: NotificationConfig) -> Self {
        Self::with_shared_store(Arc::new(store), push, config)
    }

    pub fn with_shared_store(
        store: Arc<S>,
        push: PushCapability<G>,
        config: NotificationConfig,
    ) -> Self {
        if !push.is_enabled() {
            info!("Push gateway not configured, notifications are disabled");
        }
        Self {
            logger: DeliveryLogger::new(Arc::clone(&store)),
            store,
            push,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn push_enabled(&self) -> bool {
        self.push.is_enabled()
    }

    /// Notify the project audience about new feedback. A registered
    /// submitter is not notified about their own feedback.
    pub async fn notify_new_feedback(
        &self,
        feedback: &Feedback,
        project: &Project,
    ) -> DispatchReport {
        let content = NotificationContent::new_feedback(feedback, project);
        let Some(gateway) = self.gateway(content.notification_type) else {
            return DispatchReport::with_status(RunStatus::PushDisabled);
        };

        let plan = AudiencePlan {
            exclude_submitter_of: Some(feedback),
            ..AudiencePlan::project(project)
        };
        self.run(gateway, content, plan).await
    }

    /// Notify the project audience about a new comment. `author_id` never
    /// receives the notification.
    pub async fn notify_new_comment(
        &self,
        comment: &Comment,
        feedback: &Feedback,
        project: &Project,
        author_id: Option<Uuid>,
    ) -> DispatchReport {
        let content = NotificationContent::new_comment(comment, feedback, project);
        let Some(gateway) = self.gateway(content.notification_type) else {
            return DispatchReport::with_status(RunStatus::PushDisabled);
        };

        let plan = AudiencePlan {
            exclude: author_id.into_iter().collect(),
            ..AudiencePlan::project(project)
        };
        self.run(gateway, content, plan).await
    }

    /// Notify the project audience and the submitter about a new vote. The
    /// project is looked up from the feedback.
    pub async fn notify_new_vote(&self, feedback: &Feedback, vote_count: u64) -> DispatchReport {
        let content = NotificationContent::new_vote(feedback, vote_count);
        let Some(gateway) = self.gateway(content.notification_type) else {
            return DispatchReport::with_status(RunStatus::PushDisabled);
        };

        let project = match self.load_project(feedback.project_id).await {
            Ok(project) => project,
            Err(e) => {
                error!("Dispatch of {} aborted: {}", content.notification_type, e);
                return DispatchReport::with_status(RunStatus::Aborted);
            }
        };

        let plan = AudiencePlan {
            submitter_of: Some(feedback),
            ..AudiencePlan::project(&project)
        };
        self.run(gateway, content, plan).await
    }

    /// Notify the project audience, the submitter and every voter who opted
    /// in about a status change.
    pub async fn notify_status_change(
        &self,
        feedback: &Feedback,
        old_status: FeedbackStatus,
        new_status: FeedbackStatus,
        project: &Project,
    ) -> DispatchReport {
        let content = NotificationContent::status_change(feedback, old_status, new_status, project);
        let Some(gateway) = self.gateway(content.notification_type) else {
            return DispatchReport::with_status(RunStatus::PushDisabled);
        };

        let plan = AudiencePlan {
            submitter_of: Some(feedback),
            voters_of: Some(feedback.id),
            ..AudiencePlan::project(project)
        };
        self.run(gateway, content, plan).await
    }

    pub fn spawn_new_feedback(&self, feedback: Feedback, project: Project) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.notify_new_feedback(&feedback, &project).await;
        });
    }

    pub fn spawn_new_comment(
        &self,
        comment: Comment,
        feedback: Feedback,
        project: Project,
        author_id: Option<Uuid>,
    ) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher
                .notify_new_comment(&comment, &feedback, &project, author_id)
                .await;
        });
    }

    pub fn spawn_new_vote(&self, feedback: Feedback, vote_count: u64) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.notify_new_vote(&feedback, vote_count).await;
        });
    }

    pub fn spawn_status_change(
        &self,
        feedback: Feedback,
        old_status: FeedbackStatus,
        new_status: FeedbackStatus,
        project: Project,
    ) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher
                .notify_status_change(&feedback, old_status, new_status, &project)
                .await;
        });
    }

    fn gateway(&self, notification_type: NotificationType) -> Option<&Arc<G>> {
        match &self.push {
            PushCapability::Enabled(gateway) => Some(gateway),
            PushCapability::Disabled => {
                debug!("Push disabled, skipping {} notification", notification_type);
                None
            }
        }
    }

    async fn load_project(&self, project_id: Uuid) -> Result<Project, NotifyError> {
        self.store
            .find_project(project_id)
            .await
            .map_err(NotifyError::store)?
            .ok_or(NotifyError::MissingProject(project_id))
    }

    async fn resolve(
        &self,
        notification_type: NotificationType,
        plan: &AudiencePlan<'_>,
    ) -> Result<RecipientSet, S::Error> {
        let mut exclude = plan.exclude.clone();
        if let Some(email) = plan
            .exclude_submitter_of
            .and_then(|f| f.user_email.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
        {
            if let Some(submitter) = self.store.find_user_by_email(email).await? {
                exclude.push(submitter.id);
            }
        }

        let mut resolver = RecipientResolver::new(&*self.store, plan.project.id, notification_type)
            .exclude(exclude);
        resolver.add_project_audience(plan.project).await?;
        if let Some(feedback) = plan.submitter_of {
            resolver.add_submitter(feedback).await?;
        }
        if let Some(feedback_id) = plan.voters_of {
            resolver.add_opted_in_voters(feedback_id).await?;
        }
        Ok(resolver.finish())
    }

    async fn run(
        &self,
        gateway: &Arc<G>,
        content: NotificationContent,
        plan: AudiencePlan<'_>,
    ) -> DispatchReport {
        let notification_type = content.notification_type;

        let recipients = match self.resolve(notification_type, &plan).await {
            Ok(recipients) => recipients,
            Err(e) => {
                error!(
                    "Recipient resolution for {} failed, dispatch aborted: {}",
                    notification_type,
                    NotifyError::store(e)
                );
                return DispatchReport::with_status(RunStatus::Aborted);
            }
        };

        let mut report = DispatchReport {
            recipients: recipients.len(),
            ..Default::default()
        };
        if recipients.is_empty() {
            debug!("No recipients for {} notification", notification_type);
            return report;
        }

        let alert = Arc::new(content.to_alert(&self.config.deep_link_scheme));
        let context = DeliveryContext {
            notification_type,
            feedback_id: content.feedback_id,
            project_id: content.project_id,
        };
        let limit = Arc::new(Semaphore::new(self.config.max_concurrent_recipients.max(1)));
        let mut tasks = JoinSet::new();

        for user in recipients {
            let Ok(permit) = Arc::clone(&limit).acquire_owned().await else {
                break;
            };
            let store = Arc::clone(&self.store);
            let gateway = Arc::clone(gateway);
            let logger = self.logger.clone();
            let alert = Arc::clone(&alert);

            tasks.spawn(async move {
                let _permit = permit;
                deliver_to_recipient(&*store, &*gateway, &logger, &alert, context, user).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(partial) => report.merge(partial),
                Err(e) => {
                    report.recipient_errors += 1;
                    error!("{}", NotifyError::from(e));
                }
            }
        }

        info!(
            "Dispatched {}: {} recipients, {} attempts, {} sent, {} failed, {} tokens expired",
            notification_type,
            report.recipients,
            report.attempts,
            report.sent,
            report.failed,
            report.token_expired
        );
        report
    }
}

async fn deliver_to_recipient<S, G>(
    store: &S,
    gateway: &G,
    logger: &DeliveryLogger<S>,
    alert: &PushAlert,
    context: DeliveryContext,
    user: User,
) -> DispatchReport
where
    S: NotificationStore,
    G: PushGateway,
{
    let mut report = DispatchReport::default();

    let devices = match devices_for(store, user.id).await {
        Ok(devices) => devices,
        Err(e) => {
            error!("Failed to load devices of user {}: {}", user.id, e);
            report.recipient_errors += 1;
            return report;
        }
    };
    if devices.is_empty() {
        debug!("User {} has no active devices", user.id);
        return report;
    }

    for device in &devices {
        let outcome =
            deliver_to_device(store, gateway, logger, alert, &context, user.id, device).await;
        report.record(outcome);
    }
    report
}

/// Send, classify, update the token, log. One causal chain per device.
async fn deliver_to_device<S, G>(
    store: &S,
    gateway: &G,
    logger: &DeliveryLogger<S>,
    alert: &PushAlert,
    context: &DeliveryContext,
    user_id: Uuid,
    device: &DeviceToken,
) -> DeliveryOutcome
where
    S: NotificationStore,
    G: PushGateway,
{
    let message = match gateway.send(&device.token, alert).await {
        Ok(receipt) => {
            debug!(
                "Delivered {} to device {} of user {} ({:?})",
                context.notification_type, device.id, user_id, receipt.id
            );
            if let Err(e) = store.touch_device(device.id, Utc::now()).await {
                error!("Failed to update last use of device {}: {}", device.id, e);
            }
            logger
                .record(context, user_id, Some(device.id), DeliveryOutcome::Sent, None)
                .await;
            return DeliveryOutcome::Sent;
        }
        Err(e) => e.to_string(),
    };

    let outcome = match classify(&message) {
        FailureKind::Permanent => {
            warn!(
                "Device {} of user {} rejected permanently, deactivating: {}",
                device.id,
                user_id,
                NotifyError::Gateway(message.clone())
            );
            if let Err(e) = store.deactivate_device(device.id).await {
                error!("Failed to deactivate device {}: {}", device.id, e);
            }
            DeliveryOutcome::TokenExpired
        }
        FailureKind::Transient => {
            warn!(
                "Delivery to device {} of user {} failed: {}",
                device.id,
                user_id,
                NotifyError::Gateway(message.clone())
            );
            DeliveryOutcome::Failed
        }
    };

    logger
        .record(context, user_id, Some(device.id), outcome, Some(message))
        .await;
    outcome
}
