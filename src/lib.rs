//! Changelog Sync - publishes a project's changelog to GitBook when a push to
//! the primary branch touches it.
//!
//! This library provides the webhook receiver, the Markdown conversion
//! pipeline and the sync orchestration behind the `changelog-sync` binary.

pub mod changelog;
pub mod config;
pub mod convert;
pub mod gitbook;
pub mod notify;
pub mod server;
pub mod sync;
pub mod webhooks;

#[cfg(test)]
mod test_utils;
