//! blogfront - server-rendered front pages for a small blog
//!
//! Lists the most liked and the freshest posts, renders post pages with
//! their comments, filters posts by tag and serves a contacts page.

pub mod admin;
pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod theme;
