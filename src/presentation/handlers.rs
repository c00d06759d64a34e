use crate::application::auth_service::AuthService;
use crate::application::todo_service::TodoService;
use crate::data::todo_repository::InMemoryTodoRepository;
use crate::data::token_repository::InMemoryTokenRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::DomainError;
use crate::domain::todo::{CreateTodo, Page, Todo, UpdateTodo};
use crate::domain::token::AuthenticatedUser;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::{Ready, ready};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub type SharedAuthService = Arc<AuthService<InMemoryUserRepository, InMemoryTokenRepository>>;

pub struct AppState {
    pub todo_service: TodoService<InMemoryTodoRepository>,
    pub auth_service: SharedAuthService,
}

pub const TODO_NOT_FOUND: &str = "Todo not found.";
pub const TODO_DELETED: &str = "Todo deleted successfully.";

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<HashMap<String, Vec<String>>>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },
    #[error("The provided credentials are incorrect.")]
    InvalidCredentials,
    #[error("Unauthenticated.")]
    Unauthenticated,
    #[error("{0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        match self {
            ApiError::Internal(_) => error!(error = %error_msg, status = %status, "Internal error"),
            _ => warn!(error = %error_msg, status = %status, "Request rejected"),
        }

        let body = match self {
            ApiError::Validation { field, message } => ErrorResponse {
                message: message.clone(),
                errors: field
                    .as_ref()
                    .map(|field| HashMap::from([(field.clone(), vec![message.clone()])])),
            },
            // Internal details stay in the logs.
            ApiError::Internal(_) => ErrorResponse {
                message: "Server Error.".to_string(),
                errors: None,
            },
            _ => ErrorResponse {
                message: error_msg,
                errors: None,
            },
        };

        HttpResponse::build(status).json(body)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { field, message } => ApiError::Validation {
                field: Some(field),
                message,
            },
            DomainError::InvalidCredentials => ApiError::InvalidCredentials,
            DomainError::Unauthenticated => ApiError::Unauthenticated,
            DomainError::TodoNotFound => ApiError::NotFound(TODO_NOT_FOUND.to_string()),
            DomainError::DuplicateEmail => ApiError::Validation {
                field: Some("email".to_string()),
                message: DomainError::DuplicateEmail.to_string(),
            },
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(domain) => ApiError::from(domain),
            Err(other) => ApiError::Internal(other.to_string()),
        }
    }
}

// Identity placed in the request extensions by `BearerAuth`.
impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or(ApiError::Unauthenticated),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: usize,
    pub from: Option<usize>,
    pub last_page: usize,
    pub path: String,
    pub per_page: usize,
    pub to: Option<usize>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub links: PageLinks,
    pub meta: PageMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn from_page(page: Page<T>, path: &str) -> Self {
        let url = |n: usize| format!("{}?page={}", path, n);
        let last_page = page.last_page();
        let links = PageLinks {
            first: url(1),
            last: url(last_page),
            prev: (page.current_page > 1).then(|| url(page.current_page - 1)),
            next: (page.current_page < last_page).then(|| url(page.current_page + 1)),
        };
        let meta = PageMeta {
            current_page: page.current_page,
            from: page.first_position(),
            last_page,
            path: path.to_string(),
            per_page: page.per_page,
            to: page.last_position(),
            total: page.total,
        };
        Self {
            data: page.items,
            links,
            meta,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Anything that is not a positive integer means the first page.
    pub fn page_number(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(1)
    }
}

/// Decodes a todo payload regardless of content type. An empty body means
/// "no fields", which is a valid create or update.
pub fn decode_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Validation {
        field: None,
        message: format!("Malformed JSON body: {}", e),
    })
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state, req, query, user), fields(user_id = %user.id))]
pub async fn list_todos(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let page_number = query.page_number();
    let page = state.todo_service.list(page_number).await.map_err(|e| {
        error!(page = page_number, error = %e, "Failed to list todos");
        e
    })?;

    let path = {
        let info = req.connection_info();
        format!("{}://{}{}", info.scheme(), info.host(), req.path())
    };
    info!(page = page_number, count = page.items.len(), "Todos listed");
    Ok(HttpResponse::Ok().json(DataResponse {
        data: PaginatedResponse::from_page(page, &path),
    }))
}

#[instrument(skip(state, body, user), fields(user_id = %user.id, todo_id))]
pub async fn create_todo(
    state: web::Data<AppState>,
    body: web::Bytes,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let req: CreateTodo = decode_body(&body)?;
    let todo = state
        .todo_service
        .create(req)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create todo");
            e
        })?;
    tracing::Span::current().record("todo_id", todo.id);
    info!(todo_id = todo.id, "Todo created");
    Ok(HttpResponse::Created().json(DataResponse { data: todo }))
}

#[instrument(skip(state, user), fields(user_id = %user.id, todo_id = %*path))]
pub async fn get_todo(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let todo_id = path.into_inner();
    let todo: Todo = state.todo_service.get(todo_id).await?;
    Ok(HttpResponse::Ok().json(DataResponse { data: todo }))
}

#[instrument(skip(state, body, user), fields(user_id = %user.id, todo_id = %*path))]
pub async fn update_todo(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Bytes,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let todo_id = path.into_inner();
    // A missing id is reported before anything is said about the body.
    state.todo_service.get(todo_id).await?;
    let changes: UpdateTodo = decode_body(&body)?;
    let todo = state
        .todo_service
        .update(todo_id, changes)
        .await
        .map_err(|e| {
            warn!(todo_id = todo_id, error = %e, "Failed to update todo");
            e
        })?;
    info!(todo_id = todo.id, "Todo updated");
    Ok(HttpResponse::Ok().json(DataResponse { data: todo }))
}

#[instrument(skip(state, user), fields(user_id = %user.id, todo_id = %*path))]
pub async fn delete_todo(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let todo_id = path.into_inner();
    state.todo_service.delete(todo_id).await.map_err(|e| {
        warn!(todo_id = todo_id, error = %e, "Failed to delete todo");
        e
    })?;
    info!(todo_id = todo_id, "Todo deleted");
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: TODO_DELETED.to_string(),
    }))
}
