//! Recipient resolution
//!
//! Recipients come from up to three independent sources: the project audience
//! (owner and members), the feedback submitter and opted-in voters. Each
//! source feeds the same [`RecipientSet`], keyed by user id, so a user
//! reachable through several sources is notified once.

use crate::preferences::should_notify_in_project;
use crate::store::NotificationStore;
use echoboard_common::models::{Feedback, NotificationType, Project, User};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Users to notify in one dispatch run, unique by id, in discovery order.
#[derive(Debug, Default, Clone)]
pub struct RecipientSet {
    ids: HashSet<Uuid>,
    users: Vec<User>,
}

impl RecipientSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user. Returns `false` if the id is already present.
    pub fn insert(&mut self, user: User) -> bool {
        if !self.ids.insert(user.id) {
            return false;
        }
        self.users.push(user);
        true
    }

    pub fn contains(&self, user_id: &Uuid) -> bool {
        self.ids.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.users.iter().map(|u| u.id)
    }
}

impl IntoIterator for RecipientSet {
    type Item = User;
    type IntoIter = std::vec::IntoIter<User>;

    fn into_iter(self) -> Self::IntoIter {
        self.users.into_iter()
    }
}

/// Builds a [`RecipientSet`] for one project and notification type.
///
/// Every candidate, whatever its source, is checked against the exclusion set
/// and the preference layers for the project. Each user id is evaluated at
/// most once per resolver.
pub struct RecipientResolver<'a, S> {
    store: &'a S,
    project_id: Uuid,
    notification_type: NotificationType,
    excluded: HashSet<Uuid>,
    evaluated: HashSet<Uuid>,
    recipients: RecipientSet,
}

impl<'a, S: NotificationStore> RecipientResolver<'a, S> {
    pub fn new(store: &'a S, project_id: Uuid, notification_type: NotificationType) -> Self {
        Self {
            store,
            project_id,
            notification_type,
            excluded: HashSet::new(),
            evaluated: HashSet::new(),
            recipients: RecipientSet::new(),
        }
    }

    /// Never notify these users, whichever source they come from.
    pub fn exclude(mut self, user_ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.excluded.extend(user_ids);
        self
    }

    /// Owner plus every member of the project.
    pub async fn add_project_audience(&mut self, project: &Project) -> Result<(), S::Error> {
        if let Some(owner) = self.store.find_user(project.owner_id).await? {
            self.consider(owner).await?;
        }
        for member in self.store.find_member_users(project.id).await? {
            self.consider(member).await?;
        }
        Ok(())
    }

    /// The registered user whose email matches the feedback's submitter email.
    pub async fn add_submitter(&mut self, feedback: &Feedback) -> Result<(), S::Error> {
        let Some(email) = feedback.user_email.as_deref().map(str::trim) else {
            return Ok(());
        };
        if email.is_empty() {
            return Ok(());
        }
        if let Some(user) = self.store.find_user_by_email(email).await? {
            self.consider(user).await?;
        }
        Ok(())
    }

    /// Registered users behind votes that left an email and asked to hear
    /// about status changes.
    pub async fn add_opted_in_voters(&mut self, feedback_id: Uuid) -> Result<(), S::Error> {
        for vote in self.store.find_votes(feedback_id).await? {
            if !vote.notify_status_change {
                continue;
            }
            let Some(email) = vote.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
            else {
                continue;
            };
            if let Some(user) = self.store.find_user_by_email(email).await? {
                self.consider(user).await?;
            }
        }
        Ok(())
    }

    async fn consider(&mut self, user: User) -> Result<(), S::Error> {
        if self.excluded.contains(&user.id) || !self.evaluated.insert(user.id) {
            return Ok(());
        }
        if should_notify_in_project(self.store, &user, self.project_id, self.notification_type)
            .await?
        {
            self.recipients.insert(user);
        } else {
            debug!(
                "User {} opted out of {} for project {}",
                user.id, self.notification_type, self.project_id
            );
        }
        Ok(())
    }

    pub fn finish(self) -> RecipientSet {
        self.recipients
    }
}

/// Project owner and members eligible for `notification_type`, minus
/// `exclude_user_ids`.
pub async fn resolve_recipients<S: NotificationStore>(
    store: &S,
    project: &Project,
    notification_type: NotificationType,
    exclude_user_ids: &[Uuid],
) -> Result<RecipientSet, S::Error> {
    let mut resolver = RecipientResolver::new(store, project.id, notification_type)
        .exclude(exclude_user_ids.iter().copied());
    resolver.add_project_audience(project).await?;
    Ok(resolver.finish())
}
