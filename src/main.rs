use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use std::sync::Arc;
use todo_api::application::auth_service::AuthService;
use todo_api::application::todo_service::TodoService;
use todo_api::data::todo_repository::InMemoryTodoRepository;
use todo_api::data::token_repository::InMemoryTokenRepository;
use todo_api::data::user_repository::InMemoryUserRepository;
use todo_api::domain::user::CreateUser;
use todo_api::infrastructure::config::Config;
use todo_api::infrastructure::logging::init_logging;
use todo_api::presentation::handlers::AppState;
use todo_api::presentation::middleware::{RequestIdMiddleware, TimingMiddleware};
use todo_api::presentation::routes;
use tracing::{info, warn};

fn cors(config: &Config) -> Cors {
    match &config.cors_allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .max_age(3600),
        None => Cors::permissive(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_logging(&config.log_level);
    info!(
        bind_addr = %config.bind_addr,
        page_size = config.page_size,
        "Configuration loaded"
    );

    let auth_service = Arc::new(AuthService::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryTokenRepository::new()),
    ));

    match &config.seed_user {
        Some(seed) => {
            let user = auth_service
                .register_user(CreateUser {
                    email: seed.email.clone(),
                    password: seed.password.clone(),
                })
                .await
                .context("failed to seed user")?;
            info!(user_id = %user.id, email = %user.email, "Seed user created");
        }
        None => warn!("No SEED_USER_EMAIL configured; nobody will be able to log in"),
    }

    let todo_service = TodoService::new(Arc::new(InMemoryTodoRepository::new()), config.page_size);
    let state = web::Data::new(AppState {
        todo_service,
        auth_service,
    });

    let server_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(&server_config))
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .configure(routes::configure)
    })
    .bind(config.bind_addr.as_str())
    .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(
        address = %config.bind_addr,
        routes = %"GET /api/health, POST /api/login, POST /api/logout, GET /api/user, GET|POST /api/todos, GET|PUT|DELETE /api/todos/{id}",
        "Starting HTTP server"
    );
    server.run().await?;
    Ok(())
}
