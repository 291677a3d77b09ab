use axum::{
    Router,
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};

use crate::web::{AppState, admin, guard, headers, pages};

const ROBOTS_TXT_BODY: &str = include_str!("../../robots.txt");

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home_page))
        .route("/publications", get(pages::publications_page))
        .route("/people", get(pages::people_page))
        .route("/research", get(pages::research_page))
        .route("/news", get(pages::news_index))
        .route("/news/:slug", get(pages::news_detail))
        .route("/healthz", get(healthz))
        .route("/robots.txt", get(robots_txt))
        .route("/admin/login", get(admin::login_page))
        .route("/admin/publications", get(admin::publications_admin_page))
        .route("/api/admin/auth", post(admin::login))
        .route("/api/admin/auth/check", get(admin::check))
        .route("/api/admin/logout", post(admin::logout))
        .route(
            "/api/admin/publications",
            get(admin::list_publications).post(admin::create_publication),
        )
        .route(
            "/api/admin/publications/:id",
            put(admin::update_publication).delete(admin::delete_publication),
        )
        // The guard runs inside the header layer, so its redirects and 401s
        // still leave with the security headers attached.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::admin_guard,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            headers::security_headers,
        ))
        .with_state(state)
}

async fn robots_txt() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        ROBOTS_TXT_BODY,
    )
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
