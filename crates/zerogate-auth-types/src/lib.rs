//! Session types shared by the portal and its test helpers.
//!
//! Provides session-token issue/validation, cookie builders, flash messages and the
//! `SessionUser` extractor.

pub mod cookie;
pub mod flash;
pub mod identity;
pub mod token;
