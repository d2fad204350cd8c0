//! Bike-share station availability server.
//!
//! Keeps an up-to-date map of which docks have e-bikes: a periodic silent
//! refresh plus user-triggered refreshes, funnelled through a single-flight
//! coordinator that publishes one consistent snapshot at a time.

pub mod config;
pub mod domain;
pub mod publisher;
pub mod refresh;
pub mod stations;
pub mod walking;
pub mod web;
