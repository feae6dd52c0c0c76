//! Fetch a TMDB movie and print the card markup the server would render for it.
//! Usage:
//!   cargo run --bin card_preview -- <tmdb_id>
//!   cargo run --bin card_preview -- popular [page]
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{bail, Context, Result};
use cinecard::card::{self, MovieCard, MovieId, VoteAverage};
use cinecard::config::Config;
use cinecard::tmdb::{TmdbApi, TmdbClient};
use dotenvy::dotenv;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    let config = Config::from_env()?;
    let client = TmdbClient::new(config.tmdb_api_key.clone());

    let args: Vec<String> = env::args().skip(1).collect();
    let cards = match args.first().map(String::as_str) {
        Some("popular") => {
            let page = match args.get(1) {
                Some(p) => p.parse().context("page must be a number")?,
                None => 1,
            };
            client.popular_movies(page).await?.cards()
        }
        Some(id) => {
            let id: i32 = id.parse().context("tmdb id must be a number")?;
            let movie = client.fetch_movie(id).await?;
            vec![MovieCard {
                id: MovieId::from(movie.id),
                title: movie.title,
                image_url: movie.poster.unwrap_or_default(),
                release_date: movie.release_date.unwrap_or_default(),
                vote_average: movie
                    .vote_average
                    .map(VoteAverage::Number)
                    .unwrap_or_default(),
            }]
        }
        None => bail!("usage: card_preview <tmdb_id> | popular [page]"),
    };

    for movie in &cards {
        println!(
            "{}",
            card::render(movie, &config.nav, config.alt_text).into_string()
        );
    }
    Ok(())
}
