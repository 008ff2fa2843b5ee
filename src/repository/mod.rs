use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{cmp::Reverse, sync::Arc};
use thiserror::Error;

use crate::models::{
    Achievement, AdminAccount, DashboardStats, Event, Message, PageKey, PageSettings, Project,
    TeamMember, UpdateAchievementRequest, UpdateEventRequest, UpdateProjectRequest,
    UpdateTeamMemberRequest,
};

mod memory;
mod mongo;

pub use memory::InMemoryRepository;
pub use mongo::MongoRepository;

/// RepositoryError
///
/// Failures raised by a persistence backend. Handlers never inspect these beyond
/// `Duplicate`; everything else becomes a 500.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error("failed to merge update: {0}")]
    Merge(#[from] serde_json::Error),

    #[error("duplicate key: {0}")]
    Duplicate(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// Abstract contract for every persistence operation, so handlers never know
/// whether they talk to MongoDB or the in-memory store.
///
/// Updates are partial: only fields present in the request are written, plus a
/// fresh `updatedAt`. Concurrent writers follow last-write-wins. An unknown id
/// yields `None` (update) or `false` (delete) rather than an error.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Team ---
    async fn list_team_members(&self, active_only: bool) -> RepoResult<Vec<TeamMember>>;
    async fn get_team_member(&self, id: &str) -> RepoResult<Option<TeamMember>>;
    async fn create_team_member(&self, member: TeamMember) -> RepoResult<TeamMember>;
    async fn update_team_member(
        &self,
        id: &str,
        req: UpdateTeamMemberRequest,
    ) -> RepoResult<Option<TeamMember>>;
    async fn delete_team_member(&self, id: &str) -> RepoResult<bool>;

    // --- Events ---
    async fn list_events(&self) -> RepoResult<Vec<Event>>;
    async fn get_event(&self, id: &str) -> RepoResult<Option<Event>>;
    async fn create_event(&self, event: Event) -> RepoResult<Event>;
    async fn update_event(&self, id: &str, req: UpdateEventRequest) -> RepoResult<Option<Event>>;
    async fn delete_event(&self, id: &str) -> RepoResult<bool>;

    // --- Projects ---
    async fn list_projects(&self, featured_only: bool) -> RepoResult<Vec<Project>>;
    async fn get_project(&self, id: &str) -> RepoResult<Option<Project>>;
    async fn create_project(&self, project: Project) -> RepoResult<Project>;
    async fn update_project(
        &self,
        id: &str,
        req: UpdateProjectRequest,
    ) -> RepoResult<Option<Project>>;
    async fn delete_project(&self, id: &str) -> RepoResult<bool>;

    // --- Achievements ---
    async fn list_achievements(&self) -> RepoResult<Vec<Achievement>>;
    async fn get_achievement(&self, id: &str) -> RepoResult<Option<Achievement>>;
    async fn create_achievement(&self, achievement: Achievement) -> RepoResult<Achievement>;
    async fn update_achievement(
        &self,
        id: &str,
        req: UpdateAchievementRequest,
    ) -> RepoResult<Option<Achievement>>;
    async fn delete_achievement(&self, id: &str) -> RepoResult<bool>;

    // --- Page Settings ---
    async fn get_page_settings(&self, page: PageKey) -> RepoResult<Option<PageSettings>>;
    /// Inserts or replaces the settings document keyed by `settings.page`.
    async fn upsert_page_settings(&self, settings: PageSettings) -> RepoResult<PageSettings>;

    // --- Messages ---
    async fn create_message(&self, message: Message) -> RepoResult<Message>;
    async fn list_messages(&self, unread_only: bool) -> RepoResult<Vec<Message>>;
    async fn get_message(&self, id: &str) -> RepoResult<Option<Message>>;
    async fn set_message_read(&self, id: &str, read: bool) -> RepoResult<Option<Message>>;
    async fn delete_message(&self, id: &str) -> RepoResult<bool>;

    // --- Admin Accounts ---
    async fn get_admin(&self, id: &str) -> RepoResult<Option<AdminAccount>>;
    /// Lookup is case-insensitive; emails are stored lowercased.
    async fn find_admin_by_email(&self, email: &str) -> RepoResult<Option<AdminAccount>>;
    /// Fails with `RepositoryError::Duplicate` when the email is already taken.
    async fn create_admin(&self, admin: AdminAccount) -> RepoResult<AdminAccount>;
    async fn count_admins(&self) -> RepoResult<u64>;

    async fn get_stats(&self, now: DateTime<Utc>) -> RepoResult<DashboardStats>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- Listing order, shared by every backend ---

pub(crate) fn sort_team(members: &mut [TeamMember]) {
    members.sort_by_key(|m| (m.order, m.created_at));
}

pub(crate) fn sort_events(events: &mut [Event]) {
    events.sort_by_key(|e| e.date);
}

pub(crate) fn sort_projects(projects: &mut [Project]) {
    projects.sort_by_key(|p| (Reverse(p.featured), p.order, Reverse(p.created_at)));
}

pub(crate) fn sort_achievements(achievements: &mut [Achievement]) {
    // Undated entries sort after dated ones.
    achievements.sort_by_key(|a| (a.date.is_none(), Reverse(a.date), Reverse(a.created_at)));
}

pub(crate) fn sort_messages(messages: &mut [Message]) {
    messages.sort_by_key(|m| Reverse(m.created_at));
}
