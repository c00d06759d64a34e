use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use std::sync::Arc;
use todo_api::application::auth_service::AuthService;
use todo_api::application::todo_service::TodoService;
use todo_api::data::todo_repository::InMemoryTodoRepository;
use todo_api::data::token_repository::InMemoryTokenRepository;
use todo_api::data::user_repository::InMemoryUserRepository;
use todo_api::domain::todo::Todo;
use todo_api::domain::user::{CreateUser, LoginRequest};
use todo_api::presentation::handlers::{AppState, DataResponse, PaginatedResponse};
use todo_api::presentation::routes;

macro_rules! setup_todo_test {
    () => {{
        let auth_service = AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTokenRepository::new()),
        );
        auth_service
            .register_user(CreateUser {
                email: "todo@example.com".to_string(),
                password: "test123".to_string(),
            })
            .await
            .unwrap();
        let token = auth_service
            .issue_token(LoginRequest {
                email: "todo@example.com".to_string(),
                password: "test123".to_string(),
            })
            .await
            .unwrap()
            .plain_text;

        let state = web::Data::new(AppState {
            todo_service: TodoService::new(Arc::new(InMemoryTodoRepository::new()), 5),
            auth_service: Arc::new(auth_service),
        });

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(routes::configure),
        )
        .await;

        (app, token)
    }};
}

fn auth(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn test_create_then_get() {
    let (app, token) = setup_todo_test!();

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(auth(&token))
        .set_json(serde_json::json!({
            "title": "Buy milk",
            "description": "2%",
            "due_date": "2026-11-01",
            "priority": "ignored"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: DataResponse<Todo> = test::read_body_json(resp).await;
    assert_eq!(created.data.title.as_deref(), Some("Buy milk"));
    assert_eq!(created.data.description.as_deref(), Some("2%"));
    assert_eq!(created.data.due_date.unwrap().to_string(), "2026-11-01");

    let req = test::TestRequest::get()
        .uri(&format!("/api/todos/{}", created.data.id))
        .insert_header(auth(&token))
        .to_request();
    let fetched: DataResponse<Todo> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched.data, created.data);
}

#[actix_web::test]
async fn test_create_with_empty_body_persists_nulls() {
    let (app, token) = setup_todo_test!();

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(auth(&token))
        .set_json(serde_json::json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["data"]["id"].is_u64());
    assert!(body["data"]["title"].is_null());
    assert!(body["data"]["due_date"].is_null());
}

#[actix_web::test]
async fn test_invalid_due_date_is_unprocessable() {
    let (app, token) = setup_todo_test!();

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(auth(&token))
        .set_json(serde_json::json!({ "title": "x", "due_date": "tomorrow" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_update_keeps_unspecified_fields() {
    let (app, token) = setup_todo_test!();

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(auth(&token))
        .set_json(serde_json::json!({ "title": "Buy milk", "description": "2%" }))
        .to_request();
    let created: DataResponse<Todo> = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}", created.data.id))
        .insert_header(auth(&token))
        .set_json(serde_json::json!({ "description": "whole" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: DataResponse<Todo> = test::read_body_json(resp).await;
    assert_eq!(updated.data.id, created.data.id);
    assert_eq!(updated.data.title.as_deref(), Some("Buy milk"));
    assert_eq!(updated.data.description.as_deref(), Some("whole"));
    assert_eq!(updated.data.created_at, created.data.created_at);
}

#[actix_web::test]
async fn test_update_nonexistent_is_not_found_and_store_unchanged() {
    let (app, token) = setup_todo_test!();

    let req = test::TestRequest::put()
        .uri("/api/todos/5")
        .insert_header(auth(&token))
        .set_json(serde_json::json!({ "title": "ghost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Todo not found.");

    let req = test::TestRequest::get()
        .uri("/api/todos")
        .insert_header(auth(&token))
        .to_request();
    let list: DataResponse<PaginatedResponse<Todo>> =
        test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.data.meta.total, 0);
}

#[actix_web::test]
async fn test_delete_then_everything_is_not_found() {
    let (app, token) = setup_todo_test!();

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(auth(&token))
        .set_json(serde_json::json!({ "title": "short lived" }))
        .to_request();
    let created: DataResponse<Todo> = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/todos/{}", created.data.id);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(auth(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Todo deleted successfully.");
    assert!(body.get("data").is_none());

    let requests = [
        test::TestRequest::get().uri(&uri),
        test::TestRequest::put()
            .uri(&uri)
            .set_json(serde_json::json!({ "title": "again" })),
        test::TestRequest::delete().uri(&uri),
    ];
    for req in requests {
        let resp = test::call_service(&app, req.insert_header(auth(&token)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn test_non_numeric_id_is_not_found() {
    let (app, token) = setup_todo_test!();

    let req = test::TestRequest::get()
        .uri("/api/todos/abc")
        .insert_header(auth(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_list_is_paginated_by_five() {
    let (app, token) = setup_todo_test!();

    for i in 1..=7 {
        let req = test::TestRequest::post()
            .uri("/api/todos")
            .insert_header(auth(&token))
            .set_json(serde_json::json!({ "title": format!("todo {}", i) }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/todos")
        .insert_header(auth(&token))
        .to_request();
    let first: DataResponse<PaginatedResponse<Todo>> =
        test::call_and_read_body_json(&app, req).await;
    let ids: Vec<u64> = first.data.data.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(first.data.meta.current_page, 1);
    assert_eq!(first.data.meta.last_page, 2);
    assert_eq!(first.data.meta.per_page, 5);
    assert_eq!(first.data.meta.total, 7);
    assert!(first.data.links.prev.is_none());
    assert!(first.data.links.next.unwrap().ends_with("/api/todos?page=2"));

    let req = test::TestRequest::get()
        .uri("/api/todos?page=2")
        .insert_header(auth(&token))
        .to_request();
    let second: DataResponse<PaginatedResponse<Todo>> =
        test::call_and_read_body_json(&app, req).await;
    let ids: Vec<u64> = second.data.data.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![6, 7]);
    assert_eq!(second.data.meta.from, Some(6));
    assert_eq!(second.data.meta.to, Some(7));
    assert!(second.data.links.next.is_none());

    let req = test::TestRequest::get()
        .uri("/api/todos?page=bogus")
        .insert_header(auth(&token))
        .to_request();
    let fallback: DataResponse<PaginatedResponse<Todo>> =
        test::call_and_read_body_json(&app, req).await;
    assert_eq!(fallback.data.meta.current_page, 1);
}

#[actix_web::test]
async fn test_todo_routes_require_token() {
    let (app, _token) = setup_todo_test!();

    let requests = [
        test::TestRequest::get().uri("/api/todos"),
        test::TestRequest::post()
            .uri("/api/todos")
            .set_json(serde_json::json!({ "title": "x" })),
        test::TestRequest::get().uri("/api/todos/1"),
        test::TestRequest::put()
            .uri("/api/todos/1")
            .set_json(serde_json::json!({ "title": "x" })),
        test::TestRequest::delete().uri("/api/todos/1"),
    ];
    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn test_create_without_body() {
    let (app, token) = setup_todo_test!();

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(auth(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: DataResponse<Todo> = test::read_body_json(resp).await;
    assert!(created.data.title.is_none());

    // JSON without a JSON content type is still read
    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(auth(&token))
        .insert_header(("Content-Type", "text/plain"))
        .set_payload(r#"{"title":"plain"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: DataResponse<Todo> = test::read_body_json(resp).await;
    assert_eq!(created.data.title.as_deref(), Some("plain"));
}

#[actix_web::test]
async fn test_update_with_null_clears_due_date() {
    let (app, token) = setup_todo_test!();

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(auth(&token))
        .set_json(serde_json::json!({ "title": "a", "due_date": "2026-11-01" }))
        .to_request();
    let created: DataResponse<Todo> = test::call_and_read_body_json(&app, req).await;
    assert!(created.data.due_date.is_some());
    let uri = format!("/api/todos/{}", created.data.id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(auth(&token))
        .set_json(serde_json::json!({ "due_date": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: DataResponse<Todo> = test::read_body_json(resp).await;
    assert!(updated.data.due_date.is_none());
    assert_eq!(updated.data.title.as_deref(), Some("a"));

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(auth(&token))
        .to_request();
    let fetched: DataResponse<Todo> = test::call_and_read_body_json(&app, req).await;
    assert!(fetched.data.due_date.is_none());
}

#[actix_web::test]
async fn test_update_missing_id_with_malformed_body_is_not_found() {
    let (app, token) = setup_todo_test!();

    let req = test::TestRequest::put()
        .uri("/api/todos/5")
        .insert_header(auth(&token))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{bad")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(auth(&token))
        .set_json(serde_json::json!({ "title": "exists" }))
        .to_request();
    let created: DataResponse<Todo> = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}", created.data.id))
        .insert_header(auth(&token))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{bad")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
