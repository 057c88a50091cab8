// rest/mod.rs — HTTP API server.
//
// Axum server bound to `config.host:config.port`.
//
// Endpoints:
//   GET    /health
//   POST   /tasks
//   GET    /tasks
//   DELETE /tasks
//   GET    /tasks/{name}
//   PATCH  /tasks/{name}
//   DELETE /tasks/{name}
//   POST   /tasks/{name}/assign
//   POST   /tasks/{name}/comments
//   GET    /tasks/{name}/comments

pub mod extract;
pub mod routes;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::AppContext;

/// Bind the listener and serve requests until the process exits.
pub async fn start_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = (ctx.config.host.as_str(), ctx.config.port);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("task API listening on http://{}", listener.local_addr()?);

    let router = build_router(ctx);
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let mut router = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/tasks",
            get(routes::tasks::list_tasks)
                .post(routes::tasks::create_task)
                .delete(routes::tasks::delete_all_tasks),
        )
        .route(
            "/tasks/{name}",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task_status)
                .delete(routes::tasks::delete_task),
        )
        .route("/tasks/{name}/assign", post(routes::tasks::assign_task))
        .route(
            "/tasks/{name}/comments",
            get(routes::tasks::get_task_comments).post(routes::tasks::add_task_comment),
        )
        .fallback(routes::not_found)
        .with_state(ctx.clone());

    // 0 disables the corresponding limit.
    if ctx.config.request_timeout > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(
            ctx.config.request_timeout,
        )));
    }
    if ctx.config.max_concurrent > 0 {
        router = router.layer(GlobalConcurrencyLimitLayer::new(ctx.config.max_concurrent));
    }
    router.layer(TraceLayer::new_for_http())
}
