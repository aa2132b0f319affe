//! Test fixtures for dispatch tests
//!
//! `InMemoryStore` is a `NotificationStore` over plain vectors with switches
//! for injecting persistence failures. `ScriptedGateway` is a `PushGateway`
//! that records every call and answers per device token.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use echoboard_common::models::{
    Comment, DeliveryLogEntry, DeliveryOutcome, DeviceToken, Feedback, FeedbackStatus,
    MemberRole, Project, ProjectMember, ProjectMemberPreference, User, Vote,
};
use echoboard_common::services::{BoxFuture, PushAlert, PushGateway, PushReceipt};
use echoboard_config::NotificationConfig;
use echoboard_notify::{NotificationDispatcher, NotificationStore, PushCapability};
use std::collections::HashMap;
use std::future::ready;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
#[error("store unavailable: {0}")]
pub struct StoreError(pub String);

#[derive(Default)]
struct State {
    users: Vec<User>,
    projects: Vec<Project>,
    members: Vec<ProjectMember>,
    preferences: Vec<ProjectMemberPreference>,
    votes: Vec<Vote>,
    devices: Vec<DeviceToken>,
    logs: Vec<DeliveryLogEntry>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_audience: AtomicBool,
    fail_log_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_user(&self, email: &str) -> User {
        let user = User::new(email, email.split('@').next().unwrap_or(email));
        self.insert_user(user.clone());
        user
    }

    pub fn insert_user(&self, user: User) {
        self.state.lock().unwrap().users.push(user);
    }

    pub fn add_project(&self, owner: &User) -> Project {
        let project = Project {
            id: Uuid::new_v4(),
            name: "Roadmap".to_string(),
            owner_id: owner.id,
        };
        self.state.lock().unwrap().projects.push(project.clone());
        project
    }

    pub fn add_member(&self, project: &Project, user: &User) {
        self.state.lock().unwrap().members.push(ProjectMember {
            project_id: project.id,
            user_id: user.id,
            role: MemberRole::Member,
        });
    }

    pub fn set_preference(&self, preference: ProjectMemberPreference) {
        let mut state = self.state.lock().unwrap();
        state
            .preferences
            .retain(|p| p.user_id != preference.user_id || p.project_id != preference.project_id);
        state.preferences.push(preference);
    }

    pub fn add_vote(&self, feedback: &Feedback, email: Option<&str>, notify_status_change: bool) {
        self.state.lock().unwrap().votes.push(Vote {
            id: Uuid::new_v4(),
            feedback_id: feedback.id,
            email: email.map(str::to_string),
            notify_status_change,
        });
    }

    pub fn add_device(&self, user: &User, token: &str) -> DeviceToken {
        let device = DeviceToken::new(user.id, token, "ios");
        self.state.lock().unwrap().devices.push(device.clone());
        device
    }

    pub fn add_inactive_device(&self, user: &User, token: &str) -> DeviceToken {
        let mut device = DeviceToken::new(user.id, token, "ios");
        device.active = false;
        self.state.lock().unwrap().devices.push(device.clone());
        device
    }

    pub fn device(&self, id: Uuid) -> DeviceToken {
        self.state
            .lock()
            .unwrap()
            .devices
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .expect("device exists")
    }

    pub fn logs(&self) -> Vec<DeliveryLogEntry> {
        self.state.lock().unwrap().logs.clone()
    }

    pub fn logs_with(&self, outcome: DeliveryOutcome) -> Vec<DeliveryLogEntry> {
        self.logs()
            .into_iter()
            .filter(|entry| entry.outcome == outcome)
            .collect()
    }

    pub fn fail_audience_reads(&self, fail: bool) {
        self.fail_audience.store(fail, Ordering::SeqCst);
    }

    pub fn fail_log_writes(&self, fail: bool) {
        self.fail_log_writes.store(fail, Ordering::SeqCst);
    }

    fn audience<T>(&self, read: impl FnOnce(&State) -> T) -> Result<T, StoreError> {
        if self.fail_audience.load(Ordering::SeqCst) {
            return Err(StoreError("audience read failed".to_string()));
        }
        Ok(read(&self.state.lock().unwrap()))
    }
}

impl NotificationStore for InMemoryStore {
    type Error = StoreError;

    fn find_project(&self, id: Uuid) -> BoxFuture<'_, Option<Project>, StoreError> {
        Box::pin(ready(
            self.audience(|s| s.projects.iter().find(|p| p.id == id).cloned()),
        ))
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'_, Option<User>, StoreError> {
        Box::pin(ready(
            self.audience(|s| s.users.iter().find(|u| u.id == id).cloned()),
        ))
    }

    fn find_user_by_email<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Option<User>, StoreError> {
        Box::pin(ready(self.audience(|s| {
            s.users
                .iter()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .cloned()
        })))
    }

    fn find_member_users(&self, project_id: Uuid) -> BoxFuture<'_, Vec<User>, StoreError> {
        Box::pin(ready(self.audience(|s| {
            s.members
                .iter()
                .filter(|m| m.project_id == project_id)
                .filter_map(|m| s.users.iter().find(|user| user.id == m.user_id).cloned())
                .collect()
        })))
    }

    fn find_member_preference(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> BoxFuture<'_, Option<ProjectMemberPreference>, StoreError> {
        Box::pin(ready(self.audience(|s| {
            s.preferences
                .iter()
                .find(|p| p.user_id == user_id && p.project_id == project_id)
                .copied()
        })))
    }

    fn find_votes(&self, feedback_id: Uuid) -> BoxFuture<'_, Vec<Vote>, StoreError> {
        Box::pin(ready(self.audience(|s| {
            s.votes
                .iter()
                .filter(|v| v.feedback_id == feedback_id)
                .cloned()
                .collect()
        })))
    }

    fn active_devices(&self, user_id: Uuid) -> BoxFuture<'_, Vec<DeviceToken>, StoreError> {
        let devices = self
            .state
            .lock()
            .unwrap()
            .devices
            .iter()
            .filter(|d| d.user_id == user_id && d.active)
            .cloned()
            .collect();
        Box::pin(ready(Ok(devices)))
    }

    fn deactivate_device(&self, device_id: Uuid) -> BoxFuture<'_, (), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(device) = state.devices.iter_mut().find(|d| d.id == device_id) {
            device.active = false;
        }
        Box::pin(ready(Ok(())))
    }

    fn touch_device(&self, device_id: Uuid, at: DateTime<Utc>) -> BoxFuture<'_, (), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(device) = state.devices.iter_mut().find(|d| d.id == device_id) {
            device.last_used_at = Some(at);
        }
        Box::pin(ready(Ok(())))
    }

    fn record_delivery<'a>(&'a self, entry: &'a DeliveryLogEntry) -> BoxFuture<'a, (), StoreError> {
        if self.fail_log_writes.load(Ordering::SeqCst) {
            return Box::pin(ready(Err(StoreError("log table locked".to_string()))));
        }
        self.state.lock().unwrap().logs.push(entry.clone());
        Box::pin(ready(Ok(())))
    }
}

/// How the gateway answers for one device token.
#[derive(Debug, Clone)]
pub enum Script {
    Accept,
    Reject(String),
    Panic,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct GatewayError(pub String);

/// Records every send; accepts unknown tokens.
#[derive(Default)]
pub struct ScriptedGateway {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<(String, PushAlert)>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, token: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .insert(token.to_string(), script);
    }

    pub fn calls(&self) -> Vec<(String, PushAlert)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.calls().into_iter().map(|(t, _)| t).collect();
        tokens.sort();
        tokens
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl PushGateway for ScriptedGateway {
    type Error = GatewayError;

    fn send<'a>(
        &'a self,
        device_token: &'a str,
        alert: &'a PushAlert,
    ) -> BoxFuture<'a, PushReceipt, GatewayError> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((device_token.to_string(), alert.clone()));
            let script = self
                .scripts
                .lock()
                .unwrap()
                .get(device_token)
                .cloned()
                .unwrap_or(Script::Accept);

            match script {
                Script::Accept => Ok(PushReceipt {
                    id: Some(format!("apns-{}", device_token)),
                }),
                Script::Reject(reason) => Err(GatewayError(reason)),
                Script::Panic => panic!("gateway blew up for {}", device_token),
            }
        })
    }
}

pub type TestDispatcher = NotificationDispatcher<InMemoryStore, ScriptedGateway>;

pub fn test_config() -> NotificationConfig {
    NotificationConfig {
        deep_link_scheme: "echoboard".to_string(),
        max_concurrent_recipients: 4,
    }
}

pub fn create_dispatcher(
    store: &Arc<InMemoryStore>,
    gateway: &Arc<ScriptedGateway>,
) -> TestDispatcher {
    NotificationDispatcher::with_shared_store(
        Arc::clone(store),
        PushCapability::Enabled(Arc::clone(gateway)),
        test_config(),
    )
}

pub fn create_disabled_dispatcher(store: &Arc<InMemoryStore>) -> TestDispatcher {
    NotificationDispatcher::with_shared_store(
        Arc::clone(store),
        PushCapability::Disabled,
        test_config(),
    )
}

pub fn create_feedback(project: &Project, submitter_email: Option<&str>) -> Feedback {
    Feedback {
        id: Uuid::new_v4(),
        project_id: project.id,
        title: "Dark mode".to_string(),
        description: "Please add a dark theme".to_string(),
        status: FeedbackStatus::Pending,
        user_email: submitter_email.map(str::to_string),
    }
}

pub fn create_comment(feedback: &Feedback, author: Option<&User>) -> Comment {
    Comment {
        id: Uuid::new_v4(),
        feedback_id: feedback.id,
        content: "Any update on this?".to_string(),
        user_id: author.map(|u| u.id),
        is_admin: false,
    }
}

/// Poll until `condition` holds or a second passes.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
