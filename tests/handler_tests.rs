mod common;

use axum::{
    Json,
    body::to_bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use club_site::{
    auth::{AdminUser, AuthSource},
    error::ApiError,
    handlers::{
        achievements, events, events::EventFilter, events::EventStatus, messages,
        messages::MessageFilter, projects, projects::ProjectFilter, settings, stats, team,
    },
    models::{
        ContactRequest, CreateAchievementRequest, CreateEventRequest, CreateProjectRequest,
        CreateTeamMemberRequest, MarkReadRequest, PageSettingsRequest, UpdateEventRequest,
        UpdateProjectRequest,
    },
    repository::Repository,
    validation::ValidatedJson,
};
use common::{ADMIN_EMAIL, test_app};
use serde_json::{Value, json};

fn admin() -> AdminUser {
    AdminUser {
        id: None,
        email: ADMIN_EMAIL.to_string(),
        name: None,
        image: None,
        source: AuthSource::Google,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn team_crud_round_trip() {
    let app = test_app();
    let state = app.state.clone();

    let (status, Json(created)) = team::create_team_member(
        admin(),
        State(state.clone()),
        ValidatedJson(CreateTeamMemberRequest {
            name: "Grace".to_string(),
            role: "Vice President".to_string(),
            order: Some(2),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert!(created.active);

    let Json(found) = team::get_team_member(State(state.clone()), Path(created.id.clone()))
        .await
        .unwrap();
    assert_eq!(found.name, "Grace");

    let status = team::delete_team_member(admin(), State(state.clone()), Path(created.id.clone()))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let again = team::delete_team_member(admin(), State(state), Path(created.id)).await;
    assert!(matches!(again, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn public_team_hides_inactive_members_but_admin_sees_them() {
    let app = test_app();
    let hidden = CreateTeamMemberRequest {
        name: "Alumnus".to_string(),
        role: "Former Lead".to_string(),
        active: Some(false),
        ..Default::default()
    }
    .into_document(Utc::now());
    app.repo.create_team_member(hidden.clone()).await.unwrap();

    let Json(public) = team::list_team(State(app.state.clone())).await.unwrap();
    let Json(all) = team::list_all_team(State(app.state.clone())).await.unwrap();
    let single = team::get_team_member(State(app.state.clone()), Path(hidden.id)).await;

    assert!(public.is_empty());
    assert_eq!(all.len(), 1);
    assert!(matches!(single, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn update_of_unknown_project_is_404() {
    let app = test_app();

    let result = projects::update_project(
        admin(),
        State(app.state),
        Path("missing".to_string()),
        ValidatedJson(UpdateProjectRequest {
            featured: Some(true),
            ..Default::default()
        }),
    )
    .await;

    let response = result.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Project not found");
}

#[tokio::test]
async fn featured_filter_limits_projects() {
    let app = test_app();
    for (title, featured) in [("Robot", true), ("Website", false)] {
        let request = CreateProjectRequest {
            title: title.to_string(),
            description: "Built by members".to_string(),
            featured: Some(featured),
            ..Default::default()
        };
        projects::create_project(admin(), State(app.state.clone()), ValidatedJson(request))
            .await
            .unwrap();
    }

    let Json(featured) = projects::list_projects(
        State(app.state.clone()),
        Query(ProjectFilter { featured: true }),
    )
    .await
    .unwrap();
    let Json(all) = projects::list_projects(State(app.state), Query(ProjectFilter::default()))
        .await
        .unwrap();

    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].title, "Robot");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "Robot");
}

#[tokio::test]
async fn events_split_into_upcoming_and_past() {
    let app = test_app();
    let now = Utc::now();
    for (title, offset) in [("Hackathon", 10), ("Workshop", 3), ("Kickoff", -20)] {
        let request = CreateEventRequest {
            title: title.to_string(),
            description: "Club event".to_string(),
            date: now + Duration::days(offset),
            ..Default::default()
        };
        events::create_event(admin(), State(app.state.clone()), ValidatedJson(request))
            .await
            .unwrap();
    }

    let Json(upcoming) = events::list_events(
        State(app.state.clone()),
        Query(EventFilter { status: Some(EventStatus::Upcoming) }),
    )
    .await
    .unwrap();
    let Json(past) = events::list_events(
        State(app.state),
        Query(EventFilter { status: Some(EventStatus::Past) }),
    )
    .await
    .unwrap();

    let titles: Vec<_> = upcoming.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Workshop", "Hackathon"]);
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].title, "Kickoff");
}

#[tokio::test]
async fn event_update_rejects_end_before_stored_start() {
    let app = test_app();
    let start = Utc::now() + Duration::days(7);
    let (_, Json(event)) = events::create_event(
        admin(),
        State(app.state.clone()),
        ValidatedJson(CreateEventRequest {
            title: "Gala".to_string(),
            description: "Annual gala".to_string(),
            date: start,
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    let result = events::update_event(
        admin(),
        State(app.state),
        Path(event.id),
        ValidatedJson(UpdateEventRequest {
            end_date: Some(start - Duration::hours(1)),
            ..Default::default()
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::BadRequest(_))));
}

#[tokio::test]
async fn achievements_list_newest_first() {
    let app = test_app();
    let now = Utc::now();
    for (title, days_ago) in [("Regional", 200), ("National", 10)] {
        let request = CreateAchievementRequest {
            title: title.to_string(),
            description: "Competition result".to_string(),
            date: Some(now - Duration::days(days_ago)),
            ..Default::default()
        };
        achievements::create_achievement(admin(), State(app.state.clone()), ValidatedJson(request))
            .await
            .unwrap();
    }

    let Json(list) = achievements::list_achievements(State(app.state)).await.unwrap();

    assert_eq!(list[0].title, "National");
    assert_eq!(list[1].title, "Regional");
}

#[tokio::test]
async fn unknown_page_settings_are_404_and_known_pages_have_defaults() {
    let app = test_app();

    let unknown = settings::get_page_settings(State(app.state.clone()), Path("blog".into())).await;
    let Json(home) = settings::get_page_settings(State(app.state), Path("home".into()))
        .await
        .unwrap();

    assert!(matches!(unknown, Err(ApiError::NotFound("Page"))));
    assert_eq!(home.page, "home");
    assert!(!home.title.is_empty());
    assert_eq!(home.content, json!({}));
}

#[tokio::test]
async fn page_settings_update_keeps_fields_not_sent() {
    let app = test_app();
    let first = PageSettingsRequest {
        title: Some("Join Us".to_string()),
        subtitle: Some("Every Thursday".to_string()),
        content: Some(json!({ "cta": "Sign up" })),
        ..Default::default()
    };
    settings::update_page_settings(
        admin(),
        State(app.state.clone()),
        Path("contact".into()),
        ValidatedJson(first),
    )
    .await
    .unwrap();

    let Json(saved) = settings::update_page_settings(
        admin(),
        State(app.state.clone()),
        Path("contact".into()),
        ValidatedJson(PageSettingsRequest {
            title: Some("Contact".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(saved.title, "Contact");
    assert_eq!(saved.subtitle.as_deref(), Some("Every Thursday"));
    assert_eq!(saved.content["cta"], "Sign up");

    let Json(public) = settings::get_page_settings(State(app.state), Path("contact".into()))
        .await
        .unwrap();
    assert_eq!(public, saved);
}

#[tokio::test]
async fn messages_can_be_marked_read_and_filtered() {
    let app = test_app();
    let message = ContactRequest {
        name: "Visitor".to_string(),
        email: "Visitor@Example.com".to_string(),
        subject: None,
        message: "I would like to join the club.".to_string(),
    }
    .into_document(Utc::now());
    app.repo.create_message(message.clone()).await.unwrap();
    assert_eq!(message.email, "visitor@example.com");

    let Json(updated) = messages::mark_message_read(
        admin(),
        State(app.state.clone()),
        Path(message.id.clone()),
        Ok(Json(MarkReadRequest { read: true })),
    )
    .await
    .unwrap();
    assert!(updated.read);

    let Json(unread) =
        messages::list_messages(State(app.state.clone()), Query(MessageFilter { unread: true }))
            .await
            .unwrap();
    assert!(unread.is_empty());

    let Json(stats) = stats::get_stats(State(app.state)).await.unwrap();
    assert_eq!(stats.messages, 1);
    assert_eq!(stats.unread_messages, 0);
}

#[tokio::test]
async fn me_reports_anonymous_without_failing() {
    let app = test_app();

    let Json(status) =
        club_site::handlers::auth::me(State(app.state), HeaderMap::new()).await;

    assert!(!status.authenticated);
    assert!(status.user.is_none());
}
