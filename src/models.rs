use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Document
///
/// Implemented by every model persisted in its own collection. The `_id` of each
/// document is a UUID string, so the same serde representation serves both
/// BSON storage and JSON responses.
pub trait Document {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Timestamps are stored and returned as fixed-width RFC 3339 strings
/// (nanosecond precision, `Z` suffix) so that lexical order in the database
/// matches chronological order.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_str(&super::format(value)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    DateTime::parse_from_rfc3339(&raw)
                        .map(|parsed| parsed.with_timezone(&Utc))
                        .map_err(serde::de::Error::custom)
                })
                .transpose()
        }
    }
}

// --- Core Documents ---

/// TeamMember
///
/// A member shown on the team page. `order` controls the position within the
/// grid; inactive members stay in the database but are hidden from the public.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TeamMember {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    // Position held in the club, e.g. "President".
    pub role: String,
    // Grouping on the team page, e.g. "core", "technical", "alumni".
    pub category: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[ts(type = "string")]
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Document for TeamMember {
    const COLLECTION: &'static str = "team_members";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Event
///
/// A club event. Whether it is listed as upcoming or past is derived from its
/// dates at request time, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[ts(type = "string")]
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    #[ts(type = "string | null")]
    #[serde(default, with = "timestamp::option")]
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub registration_link: Option<String>,
    #[ts(type = "string")]
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// An event is upcoming until its end (or start, for single-moment events) has passed.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.end_date.unwrap_or(self.date) >= now
    }
}

impl Document for Event {
    const COLLECTION: &'static str = "events";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Project
///
/// A project built by club members. Featured projects are surfaced on the home page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub order: i32,
    #[ts(type = "string")]
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Document for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Achievement
///
/// Competition results, awards and milestones listed on the achievements page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Achievement {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[ts(type = "string | null")]
    #[serde(default, with = "timestamp::option")]
    pub date: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub category: Option<String>,
    // Placement, e.g. "1st place" or "Finalist".
    pub position: Option<String>,
    #[ts(type = "string")]
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Document for Achievement {
    const COLLECTION: &'static str = "achievements";

    fn id(&self) -> &str {
        &self.id
    }
}

/// PageKey
///
/// The public pages whose header and free-form content are editable from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKey {
    Home,
    Team,
    Projects,
    Achievements,
    Events,
    Contact,
}

impl PageKey {
    pub const ALL: [PageKey; 6] = [
        PageKey::Home,
        PageKey::Team,
        PageKey::Projects,
        PageKey::Achievements,
        PageKey::Events,
        PageKey::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageKey::Home => "home",
            PageKey::Team => "team",
            PageKey::Projects => "projects",
            PageKey::Achievements => "achievements",
            PageKey::Events => "events",
            PageKey::Contact => "contact",
        }
    }

    fn default_title(&self) -> &'static str {
        match self {
            PageKey::Home => "Welcome to the Club",
            PageKey::Team => "Meet the Team",
            PageKey::Projects => "Our Projects",
            PageKey::Achievements => "Achievements",
            PageKey::Events => "Events",
            PageKey::Contact => "Get in Touch",
        }
    }
}

impl FromStr for PageKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PageSettings
///
/// Editable header and content blocks for one public page. The page key doubles
/// as the document `_id`, so each page has at most one settings document.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PageSettings {
    #[serde(rename = "_id")]
    pub page: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub hero_image: Option<String>,
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub content: Value,
    #[ts(type = "string")]
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl PageSettings {
    /// Settings served for a page that has never been edited.
    pub fn defaults_for(page: PageKey, now: DateTime<Utc>) -> Self {
        Self {
            page: page.as_str().to_string(),
            title: page.default_title().to_string(),
            subtitle: None,
            hero_image: None,
            content: empty_object(),
            updated_at: now,
        }
    }

    /// Overlays the provided request fields onto `self`.
    pub fn apply(mut self, req: PageSettingsRequest, now: DateTime<Utc>) -> Self {
        if let Some(title) = req.title {
            self.title = title;
        }
        if req.subtitle.is_some() {
            self.subtitle = req.subtitle;
        }
        if req.hero_image.is_some() {
            self.hero_image = req.hero_image;
        }
        if let Some(content) = req.content {
            self.content = content;
        }
        self.updated_at = now;
        self
    }
}

impl Document for PageSettings {
    const COLLECTION: &'static str = "page_settings";

    fn id(&self) -> &str {
        &self.page
    }
}

/// Message
///
/// A contact-form submission, read from the dashboard inbox.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[ts(type = "string")]
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Document for Message {
    const COLLECTION: &'static str = "messages";

    fn id(&self) -> &str {
        &self.id
    }
}

/// AdminAccount
///
/// Credentials for the legacy password login. Never serialized to clients;
/// use `AdminProfile` for responses.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Document for AdminAccount {
    const COLLECTION: &'static str = "admins";

    fn id(&self) -> &str {
        &self.id
    }
}

// --- Output Schemas ---

/// AdminProfile
///
/// The resolved admin identity as returned by `/api/auth/me` and `/api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminProfile {
    pub id: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    // "google", "credentials" or "local".
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub user: Option<AdminProfile>,
}

/// DashboardStats
///
/// Counters for the admin dashboard landing page (GET /api/admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    pub team_members: u64,
    pub events: u64,
    pub upcoming_events: u64,
    pub projects: u64,
    pub achievements: u64,
    pub messages: u64,
    pub unread_messages: u64,
}

/// UploadedImage
///
/// Result of a successful image upload, as reported by the image host.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub bytes: Option<u64>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateTeamMemberRequest
///
/// Input payload for POST /api/admin/team.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateTeamMemberRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub role: String,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[validate(length(max = 500))]
    pub image: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(url)]
    pub linkedin: Option<String>,
    #[validate(url)]
    pub github: Option<String>,
    #[validate(range(min = 0, max = 10_000))]
    pub order: Option<i32>,
    pub active: Option<bool>,
}

impl CreateTeamMemberRequest {
    pub fn into_document(self, now: DateTime<Utc>) -> TeamMember {
        TeamMember {
            id: new_id(),
            name: self.name,
            role: self.role,
            category: self.category,
            bio: self.bio,
            image: self.image,
            email: self.email,
            linkedin: self.linkedin,
            github: self.github,
            order: self.order.unwrap_or_default(),
            active: self.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

/// UpdateTeamMemberRequest
///
/// Partial update payload (PUT /api/admin/team/{id}). Absent fields are left
/// untouched; they are skipped during serialization so the payload can be used
/// directly as a `$set` document.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateTeamMemberRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 10_000))]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// CreateEventRequest
///
/// Input payload for POST /api/admin/events.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_event_dates"))]
#[ts(export)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[ts(type = "string")]
    pub date: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub end_date: Option<DateTime<Utc>>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(length(max = 500))]
    pub image: Option<String>,
    #[validate(url)]
    pub registration_link: Option<String>,
}

fn validate_create_event_dates(req: &CreateEventRequest) -> Result<(), ValidationError> {
    check_event_range(Some(req.date), req.end_date)
}

fn check_event_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::new("end_before_start")
            .with_message("endDate must not be before date".into())),
        _ => Ok(()),
    }
}

impl CreateEventRequest {
    pub fn into_document(self, now: DateTime<Utc>) -> Event {
        Event {
            id: new_id(),
            title: self.title,
            description: self.description,
            date: self.date,
            end_date: self.end_date,
            location: self.location,
            image: self.image,
            registration_link: self.registration_link,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_event_dates"))]
#[ts(export)]
pub struct UpdateEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    #[serde(default, with = "timestamp::option")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    #[serde(default, with = "timestamp::option")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub registration_link: Option<String>,
}

fn validate_update_event_dates(req: &UpdateEventRequest) -> Result<(), ValidationError> {
    check_event_range(req.date, req.end_date)
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(max = 500))]
    pub image: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub tech_stack: Vec<String>,
    #[validate(url)]
    pub github_url: Option<String>,
    #[validate(url)]
    pub live_url: Option<String>,
    pub featured: Option<bool>,
    #[validate(range(min = 0, max = 10_000))]
    pub order: Option<i32>,
}

impl CreateProjectRequest {
    pub fn into_document(self, now: DateTime<Utc>) -> Project {
        Project {
            id: new_id(),
            title: self.title,
            description: self.description,
            image: self.image,
            tech_stack: self.tech_stack,
            github_url: self.github_url,
            live_url: self.live_url,
            featured: self.featured.unwrap_or(false),
            order: self.order.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20))]
    pub tech_stack: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub live_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 10_000))]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateAchievementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[ts(type = "string | null")]
    pub date: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub image: Option<String>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
}

impl CreateAchievementRequest {
    pub fn into_document(self, now: DateTime<Utc>) -> Achievement {
        Achievement {
            id: new_id(),
            title: self.title,
            description: self.description,
            date: self.date,
            image: self.image,
            category: self.category,
            position: self.position,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateAchievementRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    #[serde(default, with = "timestamp::option")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub position: Option<String>,
}

/// PageSettingsRequest
///
/// Input payload for PUT /api/admin/settings/{page}. `content` must be a JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PageSettingsRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 500))]
    pub subtitle: Option<String>,
    #[validate(length(max = 500))]
    pub hero_image: Option<String>,
    #[validate(custom(function = "validate_json_object"))]
    #[schema(value_type = Option<Object>)]
    pub content: Option<Value>,
}

fn validate_json_object(value: &Value) -> Result<(), ValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(ValidationError::new("not_an_object").with_message("content must be an object".into()))
    }
}

/// ContactRequest
///
/// Public contact-form submission (POST /api/contact).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 200))]
    pub subject: Option<String>,
    #[validate(length(min = 10, max = 5000))]
    pub message: String,
}

impl ContactRequest {
    /// Normalizes the submission. Runs before validation so length limits
    /// apply to what is actually stored.
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            subject: self.subject.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            message: self.message.trim().to_string(),
        }
    }

    pub fn into_document(self, now: DateTime<Utc>) -> Message {
        let ContactRequest { name, email, subject, message } = self.trimmed();
        Message {
            id: new_id(),
            name,
            email,
            subject,
            message,
            read: false,
            created_at: now,
        }
    }
}

/// LoginRequest
///
/// Legacy credentials login (POST /api/auth/login). The password is only
/// compared against the stored bcrypt hash and never logged.
#[derive(Clone, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MarkReadRequest {
    #[serde(default = "default_true")]
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeleteImageRequest {
    #[validate(length(min = 1, max = 255))]
    pub public_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexically_in_chronological_order() {
        let whole_second = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let later = whole_second + chrono::Duration::milliseconds(250);
        let much_later = whole_second + chrono::Duration::nanoseconds(250_000_001);

        let formatted: Vec<String> = [whole_second, later, much_later]
            .iter()
            .map(timestamp::format)
            .collect();

        assert!(formatted.iter().all(|s| s.len() == formatted[0].len()));
        assert!(formatted[0] < formatted[1]);
        assert!(formatted[1] < formatted[2]);
        assert_eq!(formatted[0], "2024-05-01T12:00:00.000000000Z");
    }

    #[test]
    fn timestamps_round_trip_without_losing_precision() {
        let member = TeamMember {
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
                + chrono::Duration::nanoseconds(123_456_789),
            ..Default::default()
        };

        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["createdAt"], "2024-05-01T12:00:00.123456789Z");

        let parsed: TeamMember = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.created_at, member.created_at);
    }

    #[test]
    fn optional_timestamps_accept_missing_and_null() {
        let mut json = serde_json::to_value(Achievement::default()).unwrap();
        assert!(json["date"].is_null());

        json.as_object_mut().unwrap().remove("date");
        let parsed: Achievement = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.date, None);
    }

    #[test]
    fn contact_request_is_trimmed_before_validation() {
        let blank_name = ContactRequest {
            name: "   ".into(),
            email: "a@b.com".into(),
            subject: None,
            message: "long enough message".into(),
        };
        assert!(blank_name.validate().is_ok());
        assert!(blank_name.trimmed().validate().is_err());

        let padded = ContactRequest {
            name: "Ada".into(),
            email: " Ada@Example.COM ".into(),
            subject: Some("  ".into()),
            message: "   short         ".into(),
        }
        .trimmed();
        assert_eq!(padded.email, "ada@example.com");
        assert_eq!(padded.subject, None);
        assert!(padded.validate().is_err());
    }
}
