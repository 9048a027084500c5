//! Route handlers organized by domain.

pub mod auth;
pub mod demo;
pub mod health;
pub mod internal;
pub mod oauth;
pub mod tenant;
pub mod user;
