pub mod app;
pub mod card;
pub mod config;
pub mod nav;
pub mod pages;
pub mod tmdb;
