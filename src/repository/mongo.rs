use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{self, Document as BsonDocument, doc},
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use serde::{Serialize, de::DeserializeOwned};

use super::{RepoResult, Repository, RepositoryError};
use crate::models::{
    Achievement, AdminAccount, DashboardStats, Document, Event, Message, PageKey, PageSettings,
    Project, TeamMember, UpdateAchievementRequest, UpdateEventRequest, UpdateProjectRequest,
    UpdateTeamMemberRequest, timestamp,
};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoRepository
///
/// Production implementation of `Repository` backed by a MongoDB database.
/// One collection per document type, named by `Document::COLLECTION`.
#[derive(Clone)]
pub struct MongoRepository {
    db: Database,
}

impl MongoRepository {
    /// Connects and pings the server so a bad URI fails at startup rather than
    /// on the first request.
    pub async fn connect(uri: &str, db_name: &str) -> RepoResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(db_name);
        db.run_command(doc! { "ping": 1 }).await?;
        Ok(Self { db })
    }

    /// Creates the indexes the service relies on. Idempotent; safe at every startup.
    pub async fn ensure_indexes(&self) -> RepoResult<()> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection::<AdminAccount>().create_index(unique_email).await?;

        let by_date = IndexModel::builder().keys(doc! { "date": 1 }).build();
        self.collection::<Event>().create_index(by_date).await?;

        let by_created = IndexModel::builder().keys(doc! { "createdAt": -1 }).build();
        self.collection::<Message>().create_index(by_created).await?;
        Ok(())
    }

    fn collection<T: Document + Send + Sync>(&self) -> Collection<T> {
        self.db.collection::<T>(T::COLLECTION)
    }

    async fn find_sorted<T>(&self, filter: BsonDocument, sort: BsonDocument) -> RepoResult<Vec<T>>
    where
        T: Document + DeserializeOwned + Unpin + Send + Sync,
    {
        let cursor = self.collection::<T>().find(filter).sort(sort).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id<T>(&self, id: &str) -> RepoResult<Option<T>>
    where
        T: Document + DeserializeOwned + Unpin + Send + Sync,
    {
        Ok(self.collection::<T>().find_one(doc! { "_id": id }).await?)
    }

    async fn insert<T>(&self, document: T) -> RepoResult<T>
    where
        T: Document + Serialize + Send + Sync,
    {
        self.collection::<T>()
            .insert_one(&document)
            .await
            .map_err(|e| duplicate_or(e, document.id()))?;
        Ok(document)
    }

    /// Applies `update` as a `$set` of its present fields, stamps `updatedAt`
    /// and returns the document after modification.
    async fn update_fields<T, U>(&self, id: &str, update: &U) -> RepoResult<Option<T>>
    where
        T: Document + DeserializeOwned + Unpin + Send + Sync,
        U: Serialize,
    {
        let mut set = bson::to_document(update)?;
        set.insert("updatedAt", timestamp::format(&Utc::now()));

        Ok(self
            .collection::<T>()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_by_id<T: Document + Send + Sync>(&self, id: &str) -> RepoResult<bool> {
        let result = self.collection::<T>().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count<T: Document + Send + Sync>(&self, filter: BsonDocument) -> RepoResult<u64> {
        Ok(self.collection::<T>().count_documents(filter).await?)
    }
}

fn duplicate_or(err: mongodb::error::Error, key: &str) -> RepositoryError {
    let duplicate = matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write)) if write.code == DUPLICATE_KEY_CODE
    );
    if duplicate {
        RepositoryError::Duplicate(key.to_string())
    } else {
        RepositoryError::Database(err)
    }
}

#[async_trait]
impl Repository for MongoRepository {
    async fn list_team_members(&self, active_only: bool) -> RepoResult<Vec<TeamMember>> {
        let filter = if active_only { doc! { "active": true } } else { doc! {} };
        self.find_sorted(filter, doc! { "order": 1, "createdAt": 1 }).await
    }

    async fn get_team_member(&self, id: &str) -> RepoResult<Option<TeamMember>> {
        self.find_by_id(id).await
    }

    async fn create_team_member(&self, member: TeamMember) -> RepoResult<TeamMember> {
        self.insert(member).await
    }

    async fn update_team_member(
        &self,
        id: &str,
        req: UpdateTeamMemberRequest,
    ) -> RepoResult<Option<TeamMember>> {
        self.update_fields(id, &req).await
    }

    async fn delete_team_member(&self, id: &str) -> RepoResult<bool> {
        self.delete_by_id::<TeamMember>(id).await
    }

    async fn list_events(&self) -> RepoResult<Vec<Event>> {
        self.find_sorted(doc! {}, doc! { "date": 1 }).await
    }

    async fn get_event(&self, id: &str) -> RepoResult<Option<Event>> {
        self.find_by_id(id).await
    }

    async fn create_event(&self, event: Event) -> RepoResult<Event> {
        self.insert(event).await
    }

    async fn update_event(&self, id: &str, req: UpdateEventRequest) -> RepoResult<Option<Event>> {
        self.update_fields(id, &req).await
    }

    async fn delete_event(&self, id: &str) -> RepoResult<bool> {
        self.delete_by_id::<Event>(id).await
    }

    async fn list_projects(&self, featured_only: bool) -> RepoResult<Vec<Project>> {
        let filter = if featured_only { doc! { "featured": true } } else { doc! {} };
        self.find_sorted(filter, doc! { "featured": -1, "order": 1, "createdAt": -1 })
            .await
    }

    async fn get_project(&self, id: &str) -> RepoResult<Option<Project>> {
        self.find_by_id(id).await
    }

    async fn create_project(&self, project: Project) -> RepoResult<Project> {
        self.insert(project).await
    }

    async fn update_project(
        &self,
        id: &str,
        req: UpdateProjectRequest,
    ) -> RepoResult<Option<Project>> {
        self.update_fields(id, &req).await
    }

    async fn delete_project(&self, id: &str) -> RepoResult<bool> {
        self.delete_by_id::<Project>(id).await
    }

    async fn list_achievements(&self) -> RepoResult<Vec<Achievement>> {
        // Undated achievements are stored as null, which MongoDB sorts last when descending.
        self.find_sorted(doc! {}, doc! { "date": -1, "createdAt": -1 }).await
    }

    async fn get_achievement(&self, id: &str) -> RepoResult<Option<Achievement>> {
        self.find_by_id(id).await
    }

    async fn create_achievement(&self, achievement: Achievement) -> RepoResult<Achievement> {
        self.insert(achievement).await
    }

    async fn update_achievement(
        &self,
        id: &str,
        req: UpdateAchievementRequest,
    ) -> RepoResult<Option<Achievement>> {
        self.update_fields(id, &req).await
    }

    async fn delete_achievement(&self, id: &str) -> RepoResult<bool> {
        self.delete_by_id::<Achievement>(id).await
    }

    async fn get_page_settings(&self, page: PageKey) -> RepoResult<Option<PageSettings>> {
        self.find_by_id(page.as_str()).await
    }

    async fn upsert_page_settings(&self, settings: PageSettings) -> RepoResult<PageSettings> {
        self.collection::<PageSettings>()
            .replace_one(doc! { "_id": settings.page.as_str() }, &settings)
            .upsert(true)
            .await?;
        Ok(settings)
    }

    async fn create_message(&self, message: Message) -> RepoResult<Message> {
        self.insert(message).await
    }

    async fn list_messages(&self, unread_only: bool) -> RepoResult<Vec<Message>> {
        let filter = if unread_only { doc! { "read": false } } else { doc! {} };
        self.find_sorted(filter, doc! { "createdAt": -1 }).await
    }

    async fn get_message(&self, id: &str) -> RepoResult<Option<Message>> {
        self.find_by_id(id).await
    }

    async fn set_message_read(&self, id: &str, read: bool) -> RepoResult<Option<Message>> {
        // Messages carry no `updatedAt`, so this bypasses `update_fields`.
        Ok(self
            .collection::<Message>()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": { "read": read } })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_message(&self, id: &str) -> RepoResult<bool> {
        self.delete_by_id::<Message>(id).await
    }

    async fn get_admin(&self, id: &str) -> RepoResult<Option<AdminAccount>> {
        self.find_by_id(id).await
    }

    async fn find_admin_by_email(&self, email: &str) -> RepoResult<Option<AdminAccount>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .collection::<AdminAccount>()
            .find_one(doc! { "email": email })
            .await?)
    }

    async fn create_admin(&self, mut admin: AdminAccount) -> RepoResult<AdminAccount> {
        admin.email = admin.email.trim().to_lowercase();
        let email = admin.email.clone();
        self.collection::<AdminAccount>()
            .insert_one(&admin)
            .await
            .map_err(|e| duplicate_or(e, &email))?;
        Ok(admin)
    }

    async fn count_admins(&self) -> RepoResult<u64> {
        self.count::<AdminAccount>(doc! {}).await
    }

    /// get_stats
    ///
    /// Counts run as separate queries. Upcoming events are counted in-process
    /// because the cut-off depends on each event's end date.
    async fn get_stats(&self, now: DateTime<Utc>) -> RepoResult<DashboardStats> {
        let events = self.list_events().await?;
        Ok(DashboardStats {
            team_members: self.count::<TeamMember>(doc! {}).await?,
            events: events.len() as u64,
            upcoming_events: events.iter().filter(|e| e.is_upcoming(now)).count() as u64,
            projects: self.count::<Project>(doc! {}).await?,
            achievements: self.count::<Achievement>(doc! {}).await?,
            messages: self.count::<Message>(doc! {}).await?,
            unread_messages: self.count::<Message>(doc! { "read": false }).await?,
        })
    }
}
