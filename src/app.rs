use crate::card::{self, AltText, MovieCard};
use crate::config::Config;
use crate::nav::PathTemplate;
use crate::pages;
use crate::tmdb::{self, TmdbApi, TmdbClient};
use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use maud::Markup;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

const MAX_CARD_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
    pub nav: Arc<PathTemplate>,
    pub alt_text: AltText,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    page: Option<u32>,
}

pub async fn run_server(config: Config) -> Result<()> {
    let state = AppState {
        tmdb: Arc::new(TmdbClient::new(config.tmdb_api_key)),
        nav: Arc::new(config.nav),
        alt_text: config.alt_text,
    };
    info!(
        "Cards link to {} with {:?} alt text",
        state.nav.route_pattern(),
        state.alt_text
    );

    let app = build_router(state);

    info!("Listening on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let detail_route = state.nav.route_pattern();
    Router::new()
        .route("/", get(popular))
        .route("/search", get(search))
        .route(&detail_route, get(movie_detail))
        .route(
            "/card",
            post(render_card).layer(DefaultBodyLimit::max(MAX_CARD_BODY_BYTES)),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn popular(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> (StatusCode, Markup) {
    let page = tmdb::clamp_page(params.page.unwrap_or(1));
    match state.tmdb.popular_movies(page).await {
        Ok(listing) => {
            debug!(page, results = listing.results.len(), "Fetched popular movies");
            (
                StatusCode::OK,
                pages::popular(
                    &listing.cards(),
                    page,
                    listing.total_pages,
                    state.nav.as_ref(),
                    state.alt_text,
                ),
            )
        }
        Err(e) => {
            warn!("Failed to fetch popular movies (page {}): {:#}", page, e);
            (StatusCode::BAD_GATEWAY, pages::upstream_error())
        }
    }
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> (StatusCode, Markup) {
    let query = params.q.trim();
    if query.is_empty() {
        return (StatusCode::OK, pages::empty_search());
    }
    let page = tmdb::clamp_page(params.page.unwrap_or(1));
    match state.tmdb.search_movies(query, page).await {
        Ok(listing) => {
            info!("Search '{}' returned {} movies", query, listing.results.len());
            (
                StatusCode::OK,
                pages::search(
                    query,
                    &listing.cards(),
                    page,
                    listing.total_pages,
                    state.nav.as_ref(),
                    state.alt_text,
                ),
            )
        }
        Err(e) => {
            warn!("Search for '{}' failed: {:#}", query, e);
            (StatusCode::BAD_GATEWAY, pages::upstream_error())
        }
    }
}

async fn movie_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Markup) {
    let Some(tmdb_id) = tmdb::parse_tmdb_id(&id) else {
        debug!(id = %id, "Detail request for non-numeric id");
        return (
            StatusCode::NOT_FOUND,
            pages::not_found(&format!("No movie with id '{id}'.")),
        );
    };
    match state.tmdb.fetch_movie(tmdb_id).await {
        Ok(movie) => {
            info!("Rendering detail page for '{}' ({})", movie.title, movie.id);
            (StatusCode::OK, pages::detail(&movie))
        }
        Err(e) if tmdb::is_not_found(&e) => {
            info!("TMDB has no movie {}", tmdb_id);
            (
                StatusCode::NOT_FOUND,
                pages::not_found(&format!("No movie with id '{id}'.")),
            )
        }
        Err(e) => {
            warn!("Failed to fetch TMDB movie {}: {:#}", tmdb_id, e);
            (StatusCode::BAD_GATEWAY, pages::upstream_error())
        }
    }
}

async fn render_card(State(state): State<AppState>, Json(movie): Json<MovieCard>) -> Markup {
    debug!(id = %movie.id, "Rendering card");
    card::render(&movie, state.nav.as_ref(), state.alt_text)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
