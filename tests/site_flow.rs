use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use cinecard::app::{build_router, AppState};
use cinecard::card::AltText;
use cinecard::nav::PathTemplate;
use cinecard::tmdb::{MovieDetails, MoviePage, TmdbApi, TmdbError};
use scraper::{Html, Selector};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

struct FakeTmdb {
    listing: MoviePage,
    movie: MovieDetails,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn popular_movies(&self, page: u32) -> anyhow::Result<MoviePage> {
        self.calls.lock().unwrap().push(format!("popular:{page}"));
        if self.fail {
            anyhow::bail!("tmdb down");
        }
        Ok(self.listing.clone())
    }

    async fn search_movies(&self, query: &str, page: u32) -> anyhow::Result<MoviePage> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("search:{query}:{page}"));
        if self.fail {
            anyhow::bail!("tmdb down");
        }
        Ok(self.listing.clone())
    }

    async fn fetch_movie(&self, id: i32) -> anyhow::Result<MovieDetails> {
        self.calls.lock().unwrap().push(format!("movie:{id}"));
        if self.fail {
            anyhow::bail!("tmdb down");
        }
        if id != self.movie.id {
            return Err(TmdbError::Status {
                status: StatusCode::NOT_FOUND,
                path: format!("/movie/{id}"),
                body: r#"{"status_code":34}"#.to_string(),
            }
            .into());
        }
        Ok(self.movie.clone())
    }
}

fn listing() -> MoviePage {
    serde_json::from_value(json!({
        "page": 1,
        "total_pages": 2,
        "results": [
            {
                "id": 42,
                "title": "Dune",
                "poster_path": "/d.jpg",
                "release_date": "2021-10-22",
                "vote_average": 8.1
            },
            {
                "id": 329865,
                "title": "Arrival",
                "poster_path": null,
                "release_date": "2016-11-10",
                "vote_average": 7.6
            }
        ]
    }))
    .unwrap()
}

fn dune() -> MovieDetails {
    MovieDetails {
        id: 42,
        title: "Dune".to_string(),
        overview: Some("Paul Atreides travels to Arrakis.".to_string()),
        genres: vec!["Science Fiction".to_string()],
        cast: vec!["Timothée Chalamet".to_string()],
        directors: vec!["Denis Villeneuve".to_string()],
        certification: Some("PG-13".to_string()),
        countries: vec!["United States of America".to_string()],
        language: Some("English".to_string()),
        release_date: Some("2021-10-22".to_string()),
        runtime_minutes: Some(155),
        vote_average: Some(8.1),
        trailer: None,
        poster: Some("https://image.tmdb.org/t/p/original/d.jpg".to_string()),
        backdrop: Some("https://image.tmdb.org/t/p/original/b.jpg".to_string()),
        imdb_page: Some("https://www.imdb.com/title/tt1160419".to_string()),
    }
}

fn app_with(fail: bool, nav: PathTemplate, alt_text: AltText) -> (Router, Arc<FakeTmdb>) {
    let tmdb = Arc::new(FakeTmdb {
        listing: listing(),
        movie: dune(),
        fail,
        calls: Mutex::new(Vec::new()),
    });
    let state = AppState {
        tmdb: tmdb.clone(),
        nav: Arc::new(nav),
        alt_text,
    };
    (build_router(state), tmdb)
}

fn app() -> (Router, Arc<FakeTmdb>) {
    app_with(false, PathTemplate::default(), AltText::Title)
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let res = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn hrefs(html: &str, css: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(css).unwrap();
    doc.select(&selector)
        .filter_map(|a| a.value().attr("href").map(str::to_string))
        .collect()
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _) = app();
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn popular_page_renders_card_grid() {
    let (app, tmdb) = app();
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        hrefs(&body, ".columns .column > a"),
        vec!["/movie/42", "/movie/329865"]
    );
    assert!(body.contains("Rating: 8.1"));
    assert!(body.contains(r#"src="https://image.tmdb.org/t/p/w500/d.jpg""#));
    assert!(body.contains(r#"<img src="" alt="Arrival">"#));
    assert!(body.contains(r#"href="/?page=2""#));
    assert_eq!(*tmdb.calls.lock().unwrap(), vec!["popular:1"]);
}

#[tokio::test]
async fn popular_page_number_is_clamped() {
    let (app, tmdb) = app();
    let (status, body) = get(app, "/?page=9000").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Page 2 of 2"));
    assert!(!body.contains("page=499"));
    assert_eq!(*tmdb.calls.lock().unwrap(), vec!["popular:500"]);
}

#[tokio::test]
async fn search_forwards_trimmed_query() {
    let (app, tmdb) = app();
    let (status, body) = get(app, "/search?q=%20dune%20&page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/movie/42"));
    assert_eq!(*tmdb.calls.lock().unwrap(), vec!["search:dune:2"]);
}

#[tokio::test]
async fn blank_search_does_not_call_tmdb() {
    let (app, tmdb) = app();
    let (status, body) = get(app, "/search?q=+").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Type a title"));
    assert!(tmdb.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn card_links_resolve_to_detail_page() {
    let (app, _) = app();
    let (_, grid) = get(app.clone(), "/").await;
    let first = hrefs(&grid, ".columns .column > a").remove(0);

    let (status, body) = get(app, &first).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Dune (2021)"));
    assert!(body.contains("Denis Villeneuve"));
    assert!(body.contains("https://www.imdb.com/title/tt1160419"));
    assert!(body.contains(r#"src="https://image.tmdb.org/t/p/original/b.jpg""#));
}

#[tokio::test]
async fn unknown_numeric_id_is_not_found() {
    let (app, tmdb) = app();
    let (status, body) = get(app, "/movie/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No movie with id"));
    assert!(!body.contains("Movie data is unavailable"));
    assert_eq!(*tmdb.calls.lock().unwrap(), vec!["movie:7"]);
}

#[tokio::test]
async fn custom_prefix_moves_links_and_detail_route() {
    let (app, _) = app_with(false, PathTemplate::new("/films"), AltText::Empty);
    let (_, grid) = get(app.clone(), "/").await;
    assert!(grid.contains(r#"href="/films/42""#));
    assert!(grid.contains(r#"<img src="" alt="">"#));

    let (status, _) = get(app.clone(), "/films/42").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(app, "/movie/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_detail_id_is_not_found() {
    let (app, tmdb) = app();
    let (status, body) = get(app, "/movie/dune").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No movie with id"));
    assert!(tmdb.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upstream_failures_are_bad_gateway() {
    let (app, _) = app_with(true, PathTemplate::default(), AltText::Title);
    for uri in ["/", "/search?q=dune", "/movie/42"] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY, "{uri}");
        assert!(body.contains("Movie data is unavailable"));
    }
}

#[tokio::test]
async fn post_card_renders_fragment_from_props() {
    let (app, _) = app();
    let props = json!({
        "id": 42,
        "title": "Dune",
        "imageUrl": "http://x/d.jpg",
        "releaseDate": "2021-10-22",
        "voteAverage": 8.1
    });
    let res = app
        .oneshot(
            Request::post("/card")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(props.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(!html.contains("<!DOCTYPE"));
    assert!(html.contains(r#"href="/movie/42""#));
    assert!(html.contains(r#"<h4 class="card-title">Dune</h4>"#));
    assert!(html.contains(r#"src="http://x/d.jpg""#));
    assert!(html.contains("<h4>Rating: 8.1</h4>"));
    assert!(html.contains("<h4>2021-10-22</h4>"));
}

#[tokio::test]
async fn post_card_accepts_missing_fields() {
    let (app, _) = app();
    let res = app
        .oneshot(
            Request::post("/card")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"id":"abc"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains(r#"href="/movie/abc""#));
    assert!(html.contains(r#"src="""#));
}

#[tokio::test]
async fn post_card_keeps_numeric_ids_verbatim() {
    for (id, href) in [
        ("42.5", r#"href="/movie/42.5""#),
        ("18446744073709551615", r#"href="/movie/18446744073709551615""#),
    ] {
        let (app, _) = app();
        let res = app
            .oneshot(
                Request::post("/card")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(format!(r#"{{"id":{id},"title":"Dune"}}"#)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{id}");
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(href), "{html}");
    }
}
