use crate::presentation::auth::{current_user, login, logout};
use crate::presentation::handlers::{
    ApiError, TODO_NOT_FOUND, create_todo, delete_todo, get_todo, health_check, list_todos,
    update_todo,
};
use crate::presentation::middleware::BearerAuth;
use actix_web::web;

/// Registers the `/api` surface. `/health` and `/login` are public; every
/// other route sits behind the bearer-token gate.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health_check))
                .route("/login", web::post().to(login))
                .service(
                    web::scope("")
                        .wrap(BearerAuth)
                        .route("/logout", web::post().to(logout))
                        .route("/user", web::get().to(current_user))
                        .route("/todos", web::get().to(list_todos))
                        .route("/todos", web::post().to(create_todo))
                        .route("/todos/{id}", web::get().to(get_todo))
                        .route("/todos/{id}", web::put().to(update_todo))
                        .route("/todos/{id}", web::delete().to(delete_todo)),
                ),
        );
}

// Undecodable bodies are a validation failure, not a bad request.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Validation {
            field: None,
            message: err.to_string(),
        }
        .into()
    })
}

// Ids are numeric; anything else cannot name an existing todo.
fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| ApiError::NotFound(TODO_NOT_FOUND.to_string()).into())
}
