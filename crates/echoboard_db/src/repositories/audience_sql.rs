//! SQL implementation of the audience repository

use crate::error::DbError;
use crate::repositories::audience::AudienceRepository;
use crate::repositories::row::{
    bool_to_int, get_bool, get_optional_bool, get_optional_string, get_string, get_uuid,
    query_error,
};
use crate::DbClient;
use echoboard_common::models::{
    Feedback, NotificationPreferences, Project, ProjectMember, ProjectMemberPreference, User,
    Vote,
};
use sqlx::any::AnyRow;
use tracing::{debug, info};
use uuid::Uuid;

const USER_COLUMNS: &str = "u.id, u.email, u.name, u.push_enabled, u.notify_new_feedback, \
     u.notify_new_comment, u.notify_new_vote, u.notify_status_change";

const SCHEMA: [&str; 6] = [
    r#"CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        push_enabled INTEGER NOT NULL DEFAULT 1,
        notify_new_feedback INTEGER NOT NULL DEFAULT 1,
        notify_new_comment INTEGER NOT NULL DEFAULT 1,
        notify_new_vote INTEGER NOT NULL DEFAULT 1,
        notify_status_change INTEGER NOT NULL DEFAULT 1
    )"#,
    r#"CREATE TABLE IF NOT EXISTS projects (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        owner_id TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS project_members (
        project_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        role TEXT NOT NULL,
        PRIMARY KEY (project_id, user_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS project_member_preferences (
        user_id TEXT NOT NULL,
        project_id TEXT NOT NULL,
        muted INTEGER NOT NULL DEFAULT 0,
        new_feedback INTEGER,
        new_comment INTEGER,
        new_vote INTEGER,
        status_change INTEGER,
        PRIMARY KEY (user_id, project_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS feedbacks (
        id TEXT PRIMARY KEY,
        project_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        status TEXT NOT NULL,
        user_email TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS votes (
        id TEXT PRIMARY KEY,
        feedback_id TEXT NOT NULL,
        email TEXT,
        notify_status_change INTEGER NOT NULL DEFAULT 0
    )"#,
];

/// SQL implementation of the audience repository
#[derive(Debug, Clone)]
pub struct SqlAudienceRepository {
    db_client: DbClient,
}

impl SqlAudienceRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    fn map_user(row: &AnyRow) -> Result<User, DbError> {
        Ok(User {
            id: get_uuid(row, "id")?,
            email: get_string(row, "email")?,
            name: get_string(row, "name")?,
            push_enabled: get_bool(row, "push_enabled")?,
            preferences: NotificationPreferences {
                new_feedback: get_bool(row, "notify_new_feedback")?,
                new_comment: get_bool(row, "notify_new_comment")?,
                new_vote: get_bool(row, "notify_new_vote")?,
                status_change: get_bool(row, "notify_status_change")?,
            },
        })
    }

    async fn fetch_user(&self, filter: &str, value: String) -> Result<Option<User>, DbError> {
        let query = format!("SELECT {} FROM users u WHERE {}", USER_COLUMNS, filter);
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to find user", e))?;

        row.as_ref().map(Self::map_user).transpose()
    }
}

impl AudienceRepository for SqlAudienceRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing audience schema");
        for statement in SCHEMA {
            self.db_client.execute(statement).await?;
        }
        info!("Audience schema initialized successfully");
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DbError> {
        self.fetch_user("u.id = $1", id.to_string()).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        self.fetch_user("lower(u.email) = lower($1)", email.trim().to_string())
            .await
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, DbError> {
        let row = sqlx::query("SELECT id, name, owner_id FROM projects WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to find project", e))?;

        row.map(|row| -> Result<Project, DbError> {
            Ok(Project {
                id: get_uuid(&row, "id")?,
                name: get_string(&row, "name")?,
                owner_id: get_uuid(&row, "owner_id")?,
            })
        })
        .transpose()
    }

    async fn find_member_users(&self, project_id: Uuid) -> Result<Vec<User>, DbError> {
        debug!("Finding member users of project: {}", project_id);

        let query = format!(
            "SELECT {} FROM project_members pm JOIN users u ON u.id = pm.user_id \
             WHERE pm.project_id = $1 ORDER BY pm.rowid",
            USER_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(project_id.to_string())
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to find project members", e))?;

        rows.iter().map(Self::map_user).collect()
    }

    async fn find_member_preference(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<ProjectMemberPreference>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT muted, new_feedback, new_comment, new_vote, status_change
            FROM project_member_preferences
            WHERE user_id = $1 AND project_id = $2
        "#,
        )
        .bind(user_id.to_string())
        .bind(project_id.to_string())
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| query_error("Failed to find member preference", e))?;

        row.map(|row| -> Result<ProjectMemberPreference, DbError> {
            Ok(ProjectMemberPreference {
                user_id,
                project_id,
                muted: get_bool(&row, "muted")?,
                new_feedback: get_optional_bool(&row, "new_feedback")?,
                new_comment: get_optional_bool(&row, "new_comment")?,
                new_vote: get_optional_bool(&row, "new_vote")?,
                status_change: get_optional_bool(&row, "status_change")?,
            })
        })
        .transpose()
    }

    async fn find_votes_for_feedback(&self, feedback_id: Uuid) -> Result<Vec<Vote>, DbError> {
        let rows = sqlx::query(
            "SELECT id, feedback_id, email, notify_status_change FROM votes \
             WHERE feedback_id = $1 ORDER BY rowid",
        )
        .bind(feedback_id.to_string())
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| query_error("Failed to find votes", e))?;

        rows.iter()
            .map(|row| -> Result<Vote, DbError> {
                Ok(Vote {
                    id: get_uuid(row, "id")?,
                    feedback_id: get_uuid(row, "feedback_id")?,
                    email: get_optional_string(row, "email")?,
                    notify_status_change: get_bool(row, "notify_status_change")?,
                })
            })
            .collect()
    }

    async fn insert_user(&self, user: &User) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, push_enabled, notify_new_feedback,
                               notify_new_comment, notify_new_vote, notify_status_change)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
        )
        .bind(user.id.to_string())
        .bind(user.email.as_str())
        .bind(user.name.as_str())
        .bind(bool_to_int(user.push_enabled))
        .bind(bool_to_int(user.preferences.new_feedback))
        .bind(bool_to_int(user.preferences.new_comment))
        .bind(bool_to_int(user.preferences.new_vote))
        .bind(bool_to_int(user.preferences.status_change))
        .execute(self.db_client.pool())
        .await
        .map_err(|e| query_error("Failed to insert user", e))?;
        Ok(())
    }

    async fn insert_project(&self, project: &Project) -> Result<(), DbError> {
        sqlx::query("INSERT INTO projects (id, name, owner_id) VALUES ($1, $2, $3)")
            .bind(project.id.to_string())
            .bind(project.name.as_str())
            .bind(project.owner_id.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to insert project", e))?;
        Ok(())
    }

    async fn insert_member(&self, member: &ProjectMember) -> Result<(), DbError> {
        sqlx::query("INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(member.project_id.to_string())
            .bind(member.user_id.to_string())
            .bind(member.role.as_str())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| query_error("Failed to insert project member", e))?;
        Ok(())
    }

    async fn upsert_member_preference(
        &self,
        preference: &ProjectMemberPreference,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO project_member_preferences
                (user_id, project_id, muted, new_feedback, new_comment, new_vote, status_change)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, project_id) DO UPDATE SET
                muted = excluded.muted,
                new_feedback = excluded.new_feedback,
                new_comment = excluded.new_comment,
                new_vote = excluded.new_vote,
                status_change = excluded.status_change
        "#,
        )
        .bind(preference.user_id.to_string())
        .bind(preference.project_id.to_string())
        .bind(bool_to_int(preference.muted))
        .bind(preference.new_feedback.map(bool_to_int))
        .bind(preference.new_comment.map(bool_to_int))
        .bind(preference.new_vote.map(bool_to_int))
        .bind(preference.status_change.map(bool_to_int))
        .execute(self.db_client.pool())
        .await
        .map_err(|e| query_error("Failed to store member preference", e))?;
        Ok(())
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO feedbacks (id, project_id, title, description, status, user_email)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#,
        )
        .bind(feedback.id.to_string())
        .bind(feedback.project_id.to_string())
        .bind(feedback.title.as_str())
        .bind(feedback.description.as_str())
        .bind(feedback.status.as_str())
        .bind(feedback.user_email.clone())
        .execute(self.db_client.pool())
        .await
        .map_err(|e| query_error("Failed to insert feedback", e))?;
        Ok(())
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO votes (id, feedback_id, email, notify_status_change) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(vote.id.to_string())
        .bind(vote.feedback_id.to_string())
        .bind(vote.email.clone())
        .bind(bool_to_int(vote.notify_status_change))
        .execute(self.db_client.pool())
        .await
        .map_err(|e| query_error("Failed to insert vote", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echoboard_common::models::MemberRole;

    async fn repo() -> SqlAudienceRepository {
        let db = DbClient::from_url("sqlite::memory:").await.unwrap();
        let repo = SqlAudienceRepository::new(db);
        repo.init_schema().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn users_round_trip_with_preferences() {
        let repo = repo().await;
        let mut user = User::new("Ada@Example.com", "Ada");
        user.push_enabled = false;
        user.preferences.new_vote = false;
        repo.insert_user(&user).await.unwrap();

        assert_eq!(repo.find_user(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.find_user_by_email("ada@example.COM").await.unwrap(),
            Some(user)
        );
        assert_eq!(repo.find_user_by_email("bob@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn member_users_and_preferences() {
        let repo = repo().await;
        let owner = User::new("owner@example.com", "Owner");
        let member = User::new("member@example.com", "Member");
        repo.insert_user(&owner).await.unwrap();
        repo.insert_user(&member).await.unwrap();

        let project = Project {
            id: Uuid::new_v4(),
            name: "Roadmap".into(),
            owner_id: owner.id,
        };
        repo.insert_project(&project).await.unwrap();
        repo.insert_member(&ProjectMember {
            project_id: project.id,
            user_id: member.id,
            role: MemberRole::Member,
        })
        .await
        .unwrap();

        assert_eq!(repo.find_project(project.id).await.unwrap(), Some(project.clone()));
        let members = repo.find_member_users(project.id).await.unwrap();
        assert_eq!(members, vec![member.clone()]);

        assert_eq!(
            repo.find_member_preference(member.id, project.id).await.unwrap(),
            None
        );

        let mut pref = ProjectMemberPreference::new(member.id, project.id);
        pref.new_comment = Some(false);
        repo.upsert_member_preference(&pref).await.unwrap();
        pref.muted = true;
        repo.upsert_member_preference(&pref).await.unwrap();

        let stored = repo
            .find_member_preference(member.id, project.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, pref);
        assert_eq!(stored.new_feedback, None);
    }

    #[tokio::test]
    async fn votes_keep_optional_email() {
        let repo = repo().await;
        let feedback_id = Uuid::new_v4();
        let with_email = Vote {
            id: Uuid::new_v4(),
            feedback_id,
            email: Some("voter@example.com".into()),
            notify_status_change: true,
        };
        let anonymous = Vote {
            id: Uuid::new_v4(),
            feedback_id,
            email: None,
            notify_status_change: false,
        };
        repo.insert_vote(&with_email).await.unwrap();
        repo.insert_vote(&anonymous).await.unwrap();

        let votes = repo.find_votes_for_feedback(feedback_id).await.unwrap();
        assert_eq!(votes, vec![with_email, anonymous]);
    }
}
