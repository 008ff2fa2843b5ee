use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::{
    RepoResult, Repository, RepositoryError, sort_achievements, sort_events, sort_messages,
    sort_projects, sort_team,
};
use crate::models::{
    Achievement, AdminAccount, DashboardStats, Document, Event, Message, PageKey, PageSettings,
    Project, TeamMember, UpdateAchievementRequest, UpdateEventRequest, UpdateProjectRequest,
    UpdateTeamMemberRequest, timestamp,
};

/// InMemoryRepository
///
/// A complete `Repository` kept in process memory. Used by the test-suite and
/// by local runs started without `MONGODB_URI`. Contents vanish on restart.
#[derive(Default)]
pub struct InMemoryRepository {
    team: DashMap<String, TeamMember>,
    events: DashMap<String, Event>,
    projects: DashMap<String, Project>,
    achievements: DashMap<String, Achievement>,
    settings: DashMap<String, PageSettings>,
    messages: DashMap<String, Message>,
    admins: DashMap<String, AdminAccount>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn all<T: Clone>(map: &DashMap<String, T>) -> Vec<T> {
    map.iter().map(|entry| entry.value().clone()).collect()
}

fn insert<T: Document + Clone>(map: &DashMap<String, T>, document: T) -> T {
    map.insert(document.id().to_string(), document.clone());
    document
}

/// Same semantics as a MongoDB `$set`: every field present in `update`
/// overwrites the stored one, `updatedAt` is refreshed.
fn merge_update<T, U>(current: &T, update: &U) -> RepoResult<T>
where
    T: Serialize + DeserializeOwned,
    U: Serialize,
{
    let mut merged = serde_json::to_value(current)?;
    if let (Value::Object(fields), Value::Object(patch)) = (&mut merged, serde_json::to_value(update)?)
    {
        fields.extend(patch);
        fields.insert(
            "updatedAt".to_string(),
            Value::String(timestamp::format(&Utc::now())),
        );
    }
    Ok(serde_json::from_value(merged)?)
}

fn update<T, U>(map: &DashMap<String, T>, id: &str, req: &U) -> RepoResult<Option<T>>
where
    T: Serialize + DeserializeOwned + Clone,
    U: Serialize,
{
    match map.get_mut(id) {
        Some(mut entry) => {
            let updated = merge_update(entry.value(), req)?;
            *entry = updated.clone();
            Ok(Some(updated))
        }
        None => Ok(None),
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_team_members(&self, active_only: bool) -> RepoResult<Vec<TeamMember>> {
        let mut members: Vec<_> = all(&self.team)
            .into_iter()
            .filter(|m| !active_only || m.active)
            .collect();
        sort_team(&mut members);
        Ok(members)
    }

    async fn get_team_member(&self, id: &str) -> RepoResult<Option<TeamMember>> {
        Ok(self.team.get(id).map(|m| m.clone()))
    }

    async fn create_team_member(&self, member: TeamMember) -> RepoResult<TeamMember> {
        Ok(insert(&self.team, member))
    }

    async fn update_team_member(
        &self,
        id: &str,
        req: UpdateTeamMemberRequest,
    ) -> RepoResult<Option<TeamMember>> {
        update(&self.team, id, &req)
    }

    async fn delete_team_member(&self, id: &str) -> RepoResult<bool> {
        Ok(self.team.remove(id).is_some())
    }

    async fn list_events(&self) -> RepoResult<Vec<Event>> {
        let mut events = all(&self.events);
        sort_events(&mut events);
        Ok(events)
    }

    async fn get_event(&self, id: &str) -> RepoResult<Option<Event>> {
        Ok(self.events.get(id).map(|e| e.clone()))
    }

    async fn create_event(&self, event: Event) -> RepoResult<Event> {
        Ok(insert(&self.events, event))
    }

    async fn update_event(&self, id: &str, req: UpdateEventRequest) -> RepoResult<Option<Event>> {
        update(&self.events, id, &req)
    }

    async fn delete_event(&self, id: &str) -> RepoResult<bool> {
        Ok(self.events.remove(id).is_some())
    }

    async fn list_projects(&self, featured_only: bool) -> RepoResult<Vec<Project>> {
        let mut projects: Vec<_> = all(&self.projects)
            .into_iter()
            .filter(|p| !featured_only || p.featured)
            .collect();
        sort_projects(&mut projects);
        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> RepoResult<Option<Project>> {
        Ok(self.projects.get(id).map(|p| p.clone()))
    }

    async fn create_project(&self, project: Project) -> RepoResult<Project> {
        Ok(insert(&self.projects, project))
    }

    async fn update_project(
        &self,
        id: &str,
        req: UpdateProjectRequest,
    ) -> RepoResult<Option<Project>> {
        update(&self.projects, id, &req)
    }

    async fn delete_project(&self, id: &str) -> RepoResult<bool> {
        Ok(self.projects.remove(id).is_some())
    }

    async fn list_achievements(&self) -> RepoResult<Vec<Achievement>> {
        let mut achievements = all(&self.achievements);
        sort_achievements(&mut achievements);
        Ok(achievements)
    }

    async fn get_achievement(&self, id: &str) -> RepoResult<Option<Achievement>> {
        Ok(self.achievements.get(id).map(|a| a.clone()))
    }

    async fn create_achievement(&self, achievement: Achievement) -> RepoResult<Achievement> {
        Ok(insert(&self.achievements, achievement))
    }

    async fn update_achievement(
        &self,
        id: &str,
        req: UpdateAchievementRequest,
    ) -> RepoResult<Option<Achievement>> {
        update(&self.achievements, id, &req)
    }

    async fn delete_achievement(&self, id: &str) -> RepoResult<bool> {
        Ok(self.achievements.remove(id).is_some())
    }

    async fn get_page_settings(&self, page: PageKey) -> RepoResult<Option<PageSettings>> {
        Ok(self.settings.get(page.as_str()).map(|s| s.clone()))
    }

    async fn upsert_page_settings(&self, settings: PageSettings) -> RepoResult<PageSettings> {
        Ok(insert(&self.settings, settings))
    }

    async fn create_message(&self, message: Message) -> RepoResult<Message> {
        Ok(insert(&self.messages, message))
    }

    async fn list_messages(&self, unread_only: bool) -> RepoResult<Vec<Message>> {
        let mut messages: Vec<_> = all(&self.messages)
            .into_iter()
            .filter(|m| !unread_only || !m.read)
            .collect();
        sort_messages(&mut messages);
        Ok(messages)
    }

    async fn get_message(&self, id: &str) -> RepoResult<Option<Message>> {
        Ok(self.messages.get(id).map(|m| m.clone()))
    }

    async fn set_message_read(&self, id: &str, read: bool) -> RepoResult<Option<Message>> {
        Ok(self.messages.get_mut(id).map(|mut message| {
            message.read = read;
            message.clone()
        }))
    }

    async fn delete_message(&self, id: &str) -> RepoResult<bool> {
        Ok(self.messages.remove(id).is_some())
    }

    async fn get_admin(&self, id: &str) -> RepoResult<Option<AdminAccount>> {
        Ok(self.admins.get(id).map(|a| a.clone()))
    }

    async fn find_admin_by_email(&self, email: &str) -> RepoResult<Option<AdminAccount>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .admins
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn create_admin(&self, mut admin: AdminAccount) -> RepoResult<AdminAccount> {
        admin.email = admin.email.trim().to_lowercase();
        if self.find_admin_by_email(&admin.email).await?.is_some() {
            return Err(RepositoryError::Duplicate(admin.email));
        }
        Ok(insert(&self.admins, admin))
    }

    async fn count_admins(&self) -> RepoResult<u64> {
        Ok(self.admins.len() as u64)
    }

    async fn get_stats(&self, now: DateTime<Utc>) -> RepoResult<DashboardStats> {
        let unread = self.messages.iter().filter(|m| !m.read).count();
        let upcoming = self.events.iter().filter(|e| e.is_upcoming(now)).count();
        Ok(DashboardStats {
            team_members: self.team.len() as u64,
            events: self.events.len() as u64,
            upcoming_events: upcoming as u64,
            projects: self.projects.len() as u64,
            achievements: self.achievements.len() as u64,
            messages: self.messages.len() as u64,
            unread_messages: unread as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateTeamMemberRequest, new_id};

    fn member(name: &str) -> TeamMember {
        CreateTeamMemberRequest {
            name: name.to_string(),
            role: "Member".to_string(),
            ..Default::default()
        }
        .into_document(Utc::now())
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields() {
        let repo = InMemoryRepository::new();
        let created = repo.create_team_member(member("Ada")).await.unwrap();

        let updated = repo
            .update_team_member(
                &created.id,
                UpdateTeamMemberRequest {
                    role: Some("President".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .expect("member exists");

        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.role, "President");
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_of_unknown_id_returns_none() {
        let repo = InMemoryRepository::new();
        let result = repo
            .update_team_member(&new_id(), UpdateTeamMemberRequest::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn inactive_members_are_filtered_on_request() {
        let repo = InMemoryRepository::new();
        let mut hidden = member("Hidden");
        hidden.active = false;
        repo.create_team_member(hidden).await.unwrap();
        repo.create_team_member(member("Shown")).await.unwrap();

        assert_eq!(repo.list_team_members(true).await.unwrap().len(), 1);
        assert_eq!(repo.list_team_members(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn admin_emails_are_unique_ignoring_case() {
        let repo = InMemoryRepository::new();
        let admin = AdminAccount {
            id: new_id(),
            email: "Chair@Club.test".to_string(),
            ..Default::default()
        };
        repo.create_admin(admin.clone()).await.unwrap();

        let duplicate = repo
            .create_admin(AdminAccount { id: new_id(), email: "chair@club.test".into(), ..admin })
            .await;

        assert!(matches!(duplicate, Err(RepositoryError::Duplicate(_))));
        assert!(repo.find_admin_by_email("CHAIR@club.test").await.unwrap().is_some());
    }
}
