use chrono::{Duration, TimeZone, Utc};
use club_site::{
    MongoRepository,
    models::{
        AdminAccount, Event, Message, PageKey, PageSettings, Project, TeamMember,
        UpdateEventRequest, UpdateTeamMemberRequest, new_id,
    },
    repository::{Repository, RepositoryError},
};

// --- Setup/Teardown Utilities ---

/// Each test gets its own throwaway database on the server named by
/// `MONGODB_URI`. Without that variable the tests are skipped.
struct MongoTestContext {
    uri: String,
    db_name: String,
    repo: MongoRepository,
}

impl MongoTestContext {
    async fn setup() -> Option<Self> {
        dotenv::dotenv().ok();
        let Ok(uri) = std::env::var("MONGODB_URI") else {
            eprintln!("MONGODB_URI not set; skipping MongoDB repository test");
            return None;
        };

        let db_name = format!("club_site_test_{}", new_id().replace('-', ""));
        let repo = MongoRepository::connect(&uri, &db_name)
            .await
            .expect("Failed to connect to MongoDB");
        repo.ensure_indexes().await.expect("Failed to create indexes");

        Some(Self { uri, db_name, repo })
    }

    async fn teardown(self) {
        let client = mongodb::Client::with_uri_str(&self.uri)
            .await
            .expect("Failed to reconnect for cleanup");
        client
            .database(&self.db_name)
            .drop()
            .await
            .expect("Failed to drop test database");
    }
}

fn member(name: &str, order: i32) -> TeamMember {
    let now = Utc::now();
    TeamMember {
        id: new_id(),
        name: name.to_string(),
        role: "Member".to_string(),
        bio: Some("Writes compilers".to_string()),
        order,
        active: true,
        created_at: now,
        updated_at: now,
        ..Default::default()
    }
}

fn event(title: &str, date: chrono::DateTime<Utc>) -> Event {
    Event {
        id: new_id(),
        title: title.to_string(),
        description: "Details".to_string(),
        date,
        created_at: date,
        updated_at: date,
        ..Default::default()
    }
}

fn message(body: &str, created_at: chrono::DateTime<Utc>) -> Message {
    Message {
        id: new_id(),
        name: "Visitor".to_string(),
        email: "visitor@example.com".to_string(),
        subject: None,
        message: body.to_string(),
        read: false,
        created_at,
    }
}

// --- Tests ---

#[tokio::test]
async fn partial_update_keeps_untouched_fields_and_returns_the_new_document() {
    let Some(ctx) = MongoTestContext::setup().await else {
        return;
    };
    let created = ctx.repo.create_team_member(member("Ada", 1)).await.unwrap();

    let updated = ctx
        .repo
        .update_team_member(
            &created.id,
            UpdateTeamMemberRequest {
                role: Some("President".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("member should exist");

    assert_eq!(updated.role, "President");
    assert_eq!(updated.name, "Ada");
    assert_eq!(updated.bio.as_deref(), Some("Writes compilers"));
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let missing = ctx
        .repo
        .update_team_member("no-such-id", UpdateTeamMemberRequest::default())
        .await
        .unwrap();
    assert!(missing.is_none());

    ctx.teardown().await;
}

#[tokio::test]
async fn event_dates_survive_an_update_with_full_precision() {
    let Some(ctx) = MongoTestContext::setup().await else {
        return;
    };
    let start = Utc.with_ymd_and_hms(2030, 3, 1, 18, 0, 0).unwrap();
    let created = ctx.repo.create_event(event("Hackathon", start)).await.unwrap();

    let new_end = start + Duration::hours(26) + Duration::nanoseconds(123_456_789);
    let updated = ctx
        .repo
        .update_event(
            &created.id,
            UpdateEventRequest {
                end_date: Some(new_end),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.date, start);
    assert_eq!(updated.end_date, Some(new_end));
    assert_eq!(ctx.repo.get_event(&created.id).await.unwrap(), Some(updated));

    ctx.teardown().await;
}

#[tokio::test]
async fn listings_follow_their_sort_orders() {
    let Some(ctx) = MongoTestContext::setup().await else {
        return;
    };
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    ctx.repo.create_team_member(member("Second", 2)).await.unwrap();
    ctx.repo.create_team_member(member("First", 1)).await.unwrap();
    let names: Vec<_> = ctx
        .repo
        .list_team_members(false)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, ["First", "Second"]);

    // A whole second and a fractional one: string order must still match time order.
    ctx.repo.create_event(event("Later", base + Duration::milliseconds(1500))).await.unwrap();
    ctx.repo.create_event(event("Earlier", base + Duration::seconds(1))).await.unwrap();
    let titles: Vec<_> = ctx
        .repo
        .list_events()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, ["Earlier", "Later"]);

    for (title, featured) in [("Plain", false), ("Star", true)] {
        ctx.repo
            .create_project(Project {
                id: new_id(),
                title: title.to_string(),
                featured,
                created_at: base,
                updated_at: base,
                ..Default::default()
            })
            .await
            .unwrap();
    }
    let projects = ctx.repo.list_projects(false).await.unwrap();
    assert_eq!(projects[0].title, "Star");
    assert_eq!(ctx.repo.list_projects(true).await.unwrap().len(), 1);

    ctx.repo.create_message(message("older message", base)).await.unwrap();
    ctx.repo
        .create_message(message("newer message", base + Duration::milliseconds(10)))
        .await
        .unwrap();
    let inbox = ctx.repo.list_messages(false).await.unwrap();
    assert_eq!(inbox[0].message, "newer message");

    ctx.teardown().await;
}

#[tokio::test]
async fn admin_emails_are_unique_regardless_of_case() {
    let Some(ctx) = MongoTestContext::setup().await else {
        return;
    };
    let admin = |email: &str| AdminAccount {
        id: new_id(),
        email: email.to_string(),
        name: None,
        password_hash: "hash".to_string(),
        created_at: Utc::now(),
    };

    let created = ctx.repo.create_admin(admin("Chair@Club.org")).await.unwrap();
    assert_eq!(created.email, "chair@club.org");

    let duplicate = ctx.repo.create_admin(admin("chair@club.org")).await;
    assert!(matches!(duplicate, Err(RepositoryError::Duplicate(_))));
    assert_eq!(ctx.repo.count_admins().await.unwrap(), 1);
    assert!(ctx.repo.find_admin_by_email("CHAIR@club.org").await.unwrap().is_some());

    ctx.teardown().await;
}

#[tokio::test]
async fn page_settings_upsert_replaces_the_stored_document() {
    let Some(ctx) = MongoTestContext::setup().await else {
        return;
    };
    let now = Utc::now();
    assert!(ctx.repo.get_page_settings(PageKey::Home).await.unwrap().is_none());

    let first = PageSettings::defaults_for(PageKey::Home, now);
    ctx.repo.upsert_page_settings(first).await.unwrap();

    let mut second = PageSettings::defaults_for(PageKey::Home, now);
    second.title = "Welcome".to_string();
    ctx.repo.upsert_page_settings(second.clone()).await.unwrap();

    let stored = ctx.repo.get_page_settings(PageKey::Home).await.unwrap();
    assert_eq!(stored, Some(second));

    ctx.teardown().await;
}

#[tokio::test]
async fn read_flags_and_stats_track_the_inbox() {
    let Some(ctx) = MongoTestContext::setup().await else {
        return;
    };
    let now = Utc::now();
    let first = ctx.repo.create_message(message("first message", now)).await.unwrap();
    ctx.repo.create_message(message("second message", now)).await.unwrap();
    ctx.repo
        .create_event(event("Upcoming", now + Duration::days(7)))
        .await
        .unwrap();
    ctx.repo
        .create_event(event("Past", now - Duration::days(7)))
        .await
        .unwrap();

    let flagged = ctx
        .repo
        .set_message_read(&first.id, true)
        .await
        .unwrap()
        .unwrap();
    assert!(flagged.read);
    assert_eq!(ctx.repo.get_message(&first.id).await.unwrap(), Some(flagged));
    assert_eq!(ctx.repo.list_messages(true).await.unwrap().len(), 1);

    let stats = ctx.repo.get_stats(now).await.unwrap();
    assert_eq!(stats.messages, 2);
    assert_eq!(stats.unread_messages, 1);
    assert_eq!(stats.events, 2);
    assert_eq!(stats.upcoming_events, 1);

    assert!(ctx.repo.delete_message(&first.id).await.unwrap());
    assert!(!ctx.repo.delete_message(&first.id).await.unwrap());

    ctx.teardown().await;
}
