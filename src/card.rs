//! The movie card: poster, title, rating and release date in a clickable
//! grid cell that links to the movie's detail page.
//!
//! Rendering is a pure function of its inputs. Values are shown exactly as
//! given: nothing is parsed, rounded, reformatted or defaulted, and missing
//! values simply come out blank. Text is escaped by maud.

use crate::nav::NavTarget;
use maud::{html, Markup};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;
use std::fmt;

const CELL_CLASS: &str = "column is-one-fifth-desktop is-one-third-tablet is-half-mobile";

/// Opaque movie identifier. Only ever turned back into text for a link, so
/// numbers keep their literal JSON form (`42.5`, `18446744073709551615`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MovieId {
    Numeric(Number),
    Text(String),
}

impl Default for MovieId {
    fn default() -> Self {
        MovieId::Text(String::new())
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieId::Numeric(n) => write!(f, "{n}"),
            MovieId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i32> for MovieId {
    fn from(value: i32) -> Self {
        MovieId::Numeric(value.into())
    }
}

impl From<u64> for MovieId {
    fn from(value: u64) -> Self {
        MovieId::Numeric(value.into())
    }
}

impl From<&str> for MovieId {
    fn from(value: &str) -> Self {
        MovieId::Text(value.to_string())
    }
}

/// Vote average as supplied, either a number or preformatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VoteAverage {
    Number(f64),
    Text(String),
}

impl Default for VoteAverage {
    fn default() -> Self {
        VoteAverage::Text(String::new())
    }
}

impl fmt::Display for VoteAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteAverage::Number(n) => write!(f, "{n}"),
            VoteAverage::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for VoteAverage {
    fn from(value: f64) -> Self {
        VoteAverage::Number(value)
    }
}

impl From<&str> for VoteAverage {
    fn from(value: &str) -> Self {
        VoteAverage::Text(value.to_string())
    }
}

/// Everything a card shows. Deserializes from the `{ id, title, imageUrl,
/// releaseDate, voteAverage }` props shape; absent or `null` fields become
/// empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieCard {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: MovieId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: VoteAverage,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// What goes into the poster's `alt` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AltText {
    #[default]
    Title,
    Empty,
}

impl AltText {
    fn for_card<'a>(&self, card: &'a MovieCard) -> &'a str {
        match self {
            AltText::Title => &card.title,
            AltText::Empty => "",
        }
    }
}

pub fn render(card: &MovieCard, nav: &dyn NavTarget, alt: AltText) -> Markup {
    html! {
        div class=(CELL_CLASS) {
            a href=(nav.target(&card.id)) {
                div class="card" {
                    div class="card-header" {
                        h4 class="card-title" { (card.title) }
                    }
                    div class="card-image" {
                        figure class="actual-card-image" {
                            img src=(card.image_url) alt=(alt.for_card(card));
                        }
                    }
                    div class="card-content" {
                        h4 { "Rating: " (card.vote_average.to_string()) }
                        h4 { (card.release_date) }
                    }
                }
            }
        }
    }
}

/// Cards in input order inside a multiline columns container.
pub fn render_grid(cards: &[MovieCard], nav: &dyn NavTarget, alt: AltText) -> Markup {
    html! {
        div class="columns is-multiline is-mobile" {
            @for card in cards {
                (render(card, nav, alt))
            }
        }
    }
}
