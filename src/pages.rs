//! Whole HTML documents built around the card grid.

use crate::card::{self, AltText, MovieCard};
use crate::nav::NavTarget;
use crate::tmdb::{MovieDetails, MAX_PAGE};
use maud::{html, Markup, DOCTYPE};

const STYLESHEET: &str = "https://cdn.jsdelivr.net/npm/bulma@0.9.4/css/bulma.min.css";
const SITE_NAME: &str = "cinecard";

pub fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | " (SITE_NAME) }
                link rel="stylesheet" href=(STYLESHEET);
            }
            body {
                nav class="navbar" {
                    div class="navbar-brand" {
                        a class="navbar-item" href="/" { strong { (SITE_NAME) } }
                    }
                    div class="navbar-end" {
                        form class="navbar-item" action="/search" method="get" {
                            input class="input" type="search" name="q" placeholder="Search movies";
                        }
                    }
                }
                section class="section" {
                    div class="container" { (body) }
                }
            }
        }
    }
}

/// Popular movies, one page of the listing.
pub fn popular(
    cards: &[MovieCard],
    page: u32,
    total_pages: u32,
    nav: &dyn NavTarget,
    alt: AltText,
) -> Markup {
    layout(
        "Popular movies",
        html! {
            h1 class="title" { "Popular movies" }
            (card::render_grid(cards, nav, alt))
            (pagination("/?", page, total_pages))
        },
    )
}

pub fn search(
    query: &str,
    cards: &[MovieCard],
    page: u32,
    total_pages: u32,
    nav: &dyn NavTarget,
    alt: AltText,
) -> Markup {
    let base = format!("/search?q={}&", urlencoding::encode(query));
    layout(
        &format!("Search: {query}"),
        html! {
            h1 class="title" { "Results for \u{201c}" (query) "\u{201d}" }
            @if cards.is_empty() {
                p class="has-text-grey" { "No movies matched your search." }
            } @else {
                (card::render_grid(cards, nav, alt))
                (pagination(&base, page, total_pages))
            }
        },
    )
}

pub fn empty_search() -> Markup {
    layout(
        "Search",
        html! {
            h1 class="title" { "Search" }
            p class="has-text-grey" { "Type a title in the search box to find movies." }
        },
    )
}

pub fn detail(movie: &MovieDetails) -> Markup {
    layout(
        &movie.title,
        html! {
            @if let Some(backdrop) = &movie.backdrop {
                figure class="image is-3by1 block movie-backdrop" {
                    img src=(backdrop) alt="";
                }
            }
            div class="columns" {
                div class="column is-one-third" {
                    figure class="image" {
                        img src=(movie.poster.as_deref().unwrap_or_default()) alt=(movie.title);
                    }
                }
                div class="column" {
                    h1 class="title" {
                        (movie.title)
                        @if let Some(year) = movie.year() {
                            " (" (year) ")"
                        }
                    }
                    @if let Some(overview) = &movie.overview {
                        p class="block" { (overview) }
                    }
                    table class="table is-narrow" {
                        tbody {
                            (fact_row("Rating", movie.vote_average.map(|v| v.to_string())))
                            (fact_row("Release date", movie.release_date.clone()))
                            (fact_row("Runtime", movie.runtime_minutes.map(format_runtime)))
                            (fact_row("Certification", movie.certification.clone()))
                            (fact_row("Genres", joined(&movie.genres)))
                            (fact_row("Director", joined(&movie.directors)))
                            (fact_row("Cast", joined(&movie.cast)))
                            (fact_row("Language", movie.language.clone()))
                            (fact_row("Countries", joined(&movie.countries)))
                        }
                    }
                    div class="buttons" {
                        @if let Some(trailer) = &movie.trailer {
                            a class="button is-link" href=(trailer) { "Trailer" }
                        }
                        @if let Some(imdb) = &movie.imdb_page {
                            a class="button" href=(imdb) { "IMDb" }
                        }
                    }
                }
            }
        },
    )
}

pub fn not_found(what: &str) -> Markup {
    layout(
        "Not found",
        html! {
            h1 class="title" { "Not found" }
            p { (what) }
            a href="/" { "Back to popular movies" }
        },
    )
}

pub fn upstream_error() -> Markup {
    layout(
        "Unavailable",
        html! {
            h1 class="title" { "Movie data is unavailable" }
            p { "The movie database could not be reached. Try again in a moment." }
        },
    )
}

fn pagination(base: &str, page: u32, total_pages: u32) -> Markup {
    let last = total_pages.clamp(1, MAX_PAGE);
    let page = page.clamp(1, last);
    html! {
        @if last > 1 {
            nav class="pagination is-centered" role="navigation" {
                @if page > 1 {
                    a class="pagination-previous" href={ (base) "page=" (page - 1) } { "Previous" }
                }
                @if page < last {
                    a class="pagination-next" href={ (base) "page=" (page + 1) } { "Next" }
                }
                span class="pagination-list" { "Page " (page) " of " (last) }
            }
        }
    }
}

fn fact_row(label: &str, value: Option<String>) -> Markup {
    html! {
        @if let Some(value) = value.filter(|v| !v.is_empty()) {
            tr {
                th { (label) }
                td { (value) }
            }
        }
    }
}

fn joined(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

fn format_runtime(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}
