//! Repository for the notification audience
//!
//! Users, projects, memberships, project preferences and votes are owned by
//! the CRUD side of the backend. The notification engine only reads them; the
//! `insert_*`/`upsert_*` methods exist to seed data for the backend's own
//! flows and for tests.

use crate::error::DbError;
use echoboard_common::models::{
    Feedback, Project, ProjectMember, ProjectMemberPreference, User, Vote,
};
use std::future::Future;
use uuid::Uuid;

/// Read access to the people a notification may reach
pub trait AudienceRepository {
    /// Create the audience tables if they don't exist.
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn find_user(&self, id: Uuid) -> impl Future<Output = Result<Option<User>, DbError>> + Send;

    /// Find a user by email, ignoring ASCII case.
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, DbError>> + Send;

    fn find_project(&self, id: Uuid)
        -> impl Future<Output = Result<Option<Project>, DbError>> + Send;

    /// Users holding a membership in the project, in membership order.
    ///
    /// The owner is not included unless they are also a member.
    fn find_member_users(
        &self,
        project_id: Uuid,
    ) -> impl Future<Output = Result<Vec<User>, DbError>> + Send;

    /// The project-scoped preference row of a user, if one exists.
    fn find_member_preference(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> impl Future<Output = Result<Option<ProjectMemberPreference>, DbError>> + Send;

    /// Every vote cast on a feedback item.
    fn find_votes_for_feedback(
        &self,
        feedback_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Vote>, DbError>> + Send;

    fn insert_user(&self, user: &User) -> impl Future<Output = Result<(), DbError>> + Send;

    fn insert_project(&self, project: &Project)
        -> impl Future<Output = Result<(), DbError>> + Send;

    fn insert_member(
        &self,
        member: &ProjectMember,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Insert or replace the preference row for (user, project).
    fn upsert_member_preference(
        &self,
        preference: &ProjectMemberPreference,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    fn insert_feedback(
        &self,
        feedback: &Feedback,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    fn insert_vote(&self, vote: &Vote) -> impl Future<Output = Result<(), DbError>> + Send;
}
