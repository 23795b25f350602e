use super::*;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use shared::domain::{Subject, TeacherDraft, TeacherStatus};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct BackendState {
    teachers: Arc<Mutex<Vec<TeacherRecord>>>,
    last_update_body: Arc<Mutex<Option<serde_json::Value>>>,
}

async fn list_teachers(State(state): State<BackendState>) -> Json<ApiEnvelope<Vec<TeacherRecord>>> {
    Json(ApiEnvelope::ok(state.teachers.lock().await.clone()))
}

async fn create_teacher(
    State(state): State<BackendState>,
    Json(body): Json<CreateTeacherRequest>,
) -> Json<ApiEnvelope<TeacherRecord>> {
    let mut teachers = state.teachers.lock().await;
    if teachers.iter().any(|teacher| teacher.email == body.email) {
        return Json(ApiEnvelope::failed("duplicate email"));
    }
    let record = TeacherRecord {
        id: TeacherId(format!("t-{}", teachers.len() + 1)),
        name: body.name,
        email: body.email,
        phone: body.phone,
        subject: body.subject,
        classes: body.classes,
        experience: body.experience,
        total_students: body.total_students,
        rating: body.rating,
        schedule: body.schedule,
        status: body.status,
        join_date: Some(body.join_date),
    };
    teachers.push(record.clone());
    Json(ApiEnvelope::ok(record))
}

async fn update_teacher(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    *state.last_update_body.lock().await = Some(body.clone());
    let mut teachers = state.teachers.lock().await;
    let Some(existing) = teachers.iter_mut().find(|teacher| teacher.id.0 == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiEnvelope::<TeacherRecord>::failed("Teacher not found")),
        );
    };
    let Ok(update) = serde_json::from_value::<UpdateTeacherRequest>(body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiEnvelope::failed("bad update payload")),
        );
    };
    existing.name = update.name;
    existing.email = update.email;
    existing.phone = update.phone;
    existing.subject = update.subject;
    existing.classes = update.classes;
    existing.experience = update.experience;
    existing.schedule = update.schedule;
    existing.status = update.status;
    (StatusCode::OK, Json(ApiEnvelope::ok(existing.clone())))
}

async fn delete_teacher(
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> Json<ApiEnvelope<()>> {
    let mut teachers = state.teachers.lock().await;
    let before = teachers.len();
    teachers.retain(|teacher| teacher.id.0 != id);
    if teachers.len() == before {
        return Json(ApiEnvelope::failed("Teacher not found"));
    }
    Json(ApiEnvelope {
        success: Some(true),
        data: None,
        error: None,
        message: Some("Teacher deleted".into()),
    })
}

async fn serve(app: Router) -> Url {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Url::parse(&format!("http://{addr}/")).expect("url")
}

async fn spawn_backend(seed: Vec<TeacherRecord>) -> (HttpTeacherGateway, BackendState) {
    let state = BackendState::default();
    *state.teachers.lock().await = seed;
    let app = Router::new()
        .route("/api/teachers", get(list_teachers).post(create_teacher))
        .route("/api/teachers/:id", put(update_teacher).delete(delete_teacher))
        .with_state(state.clone());
    (HttpTeacherGateway::new(serve(app).await), state)
}

fn seeded_teacher(id: &str, email: &str) -> TeacherRecord {
    TeacherRecord {
        id: TeacherId::from(id),
        name: "Seeded".into(),
        email: email.into(),
        phone: "111".into(),
        subject: Subject::English,
        classes: 2,
        experience: 3,
        total_students: 40,
        rating: 3.9,
        schedule: None,
        status: TeacherStatus::Active,
        join_date: Some(Utc.with_ymd_and_hms(2020, 9, 1, 0, 0, 0).unwrap()),
    }
}

fn create_request(email: &str) -> CreateTeacherRequest {
    let mut draft = TeacherDraft::with_join_date(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
    draft.name = "New Teacher".into();
    draft.email = email.into();
    draft.phone = "222".into();
    CreateTeacherRequest::from_draft(&draft, Utc::now()).expect("valid draft")
}

#[tokio::test]
async fn lists_teachers_in_server_order() {
    let seed = vec![
        seeded_teacher("b", "b@x.io"),
        seeded_teacher("a", "a@x.io"),
    ];
    let (gateway, _) = spawn_backend(seed.clone()).await;

    let listed = gateway.list().await.expect("list");

    assert_eq!(listed, seed);
}

#[tokio::test]
async fn create_returns_server_assigned_record() {
    let (gateway, state) = spawn_backend(Vec::new()).await;

    let created = gateway.create(&create_request("new@x.io")).await.expect("create");

    assert_eq!(created.id, TeacherId::from("t-1"));
    assert_eq!(created.email, "new@x.io");
    assert_eq!(state.teachers.lock().await.len(), 1);
}

#[tokio::test]
async fn success_false_body_becomes_fetch_error() {
    let (gateway, _) = spawn_backend(vec![seeded_teacher("a", "dup@x.io")]).await;

    let err = gateway
        .create(&create_request("dup@x.io"))
        .await
        .expect_err("duplicate");

    assert_eq!(err, FetchError::new("duplicate email"));
}

#[tokio::test]
async fn update_puts_id_in_path_and_omits_create_only_fields() {
    let (gateway, state) = spawn_backend(vec![seeded_teacher("abc", "a@x.io")]).await;
    let mut draft = TeacherDraft::from_record(&seeded_teacher("abc", "a@x.io"));
    draft.classes = 9;
    let request = UpdateTeacherRequest::from_draft(&draft, Utc::now()).expect("valid");

    let updated = gateway
        .update(&TeacherId::from("abc"), &request)
        .await
        .expect("update");

    assert_eq!(updated.classes, 9);
    assert_eq!(updated.total_students, 40);
    let body = state.last_update_body.lock().await.clone().expect("body");
    assert!(body.get("id").is_none());
    assert!(body.get("totalStudents").is_none());
    assert!(body.get("rating").is_none());
    assert!(body.get("joinDate").is_none());
}

#[tokio::test]
async fn non_success_status_uses_body_error_text() {
    let (gateway, _) = spawn_backend(Vec::new()).await;
    let draft = TeacherDraft::from_record(&seeded_teacher("missing", "m@x.io"));
    let request = UpdateTeacherRequest::from_draft(&draft, Utc::now()).expect("valid");

    let err = gateway
        .update(&TeacherId::from("missing"), &request)
        .await
        .expect_err("not found");

    assert_eq!(err.message, "Teacher not found");
}

#[tokio::test]
async fn remove_deletes_by_id() {
    let (gateway, state) = spawn_backend(vec![
        seeded_teacher("keep", "k@x.io"),
        seeded_teacher("drop", "d@x.io"),
    ])
    .await;

    gateway.remove(&TeacherId::from("drop")).await.expect("remove");

    let remaining = state.teachers.lock().await.clone();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, TeacherId::from("keep"));

    let err = gateway
        .remove(&TeacherId::from("drop"))
        .await
        .expect_err("already gone");
    assert_eq!(err.message, "Teacher not found");
}

#[tokio::test]
async fn status_without_json_body_reports_status_code() {
    let app = Router::new().route(
        "/api/teachers",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let gateway = HttpTeacherGateway::new(serve(app).await);

    let err = gateway.list().await.expect_err("500");

    assert_eq!(err, FetchError::new("request failed with status 500"));
}

#[tokio::test]
async fn malformed_success_body_is_a_fetch_error() {
    let app = Router::new().route("/api/teachers", get(|| async { "<html>oops</html>" }));
    let gateway = HttpTeacherGateway::new(serve(app).await);

    let err = gateway.list().await.expect_err("malformed");

    assert!(err.message.starts_with("malformed response from server"));
}

#[tokio::test]
async fn unreachable_backend_is_a_fetch_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let gateway = HttpTeacherGateway::new(Url::parse(&format!("http://{addr}")).expect("url"));

    let err = gateway.list().await.expect_err("refused");

    assert!(err.message.starts_with("could not reach the server"));
}

#[test]
fn teacher_urls_keep_base_path_and_escape_ids() {
    let gateway = HttpTeacherGateway::new(Url::parse("http://admin.local/school/").expect("url"));

    assert_eq!(
        gateway.teachers_url(None).expect("url").as_str(),
        "http://admin.local/school/api/teachers"
    );
    assert_eq!(
        gateway
            .teachers_url(Some(&TeacherId::from("a b/c")))
            .expect("url")
            .as_str(),
        "http://admin.local/school/api/teachers/a%20b%2Fc"
    );
}
