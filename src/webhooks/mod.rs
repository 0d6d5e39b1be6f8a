//! Inbound GitHub push handling.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Push event parsing
//! - Branch and changelog relevance gates

pub mod detector;
pub mod events;
pub mod signature;

pub use detector::{
    CHANGELOG_MARKERS, ChangeFilter, ChangelogDetector, DEFAULT_PRIMARY_BRANCH_REF,
    is_primary_branch,
};
pub use events::{CommitRecord, PushEvent};
pub use signature::{
    SIGNATURE_HEADER, compute_signature, format_signature_header, parse_signature_header, sign,
    verify_signature,
};
