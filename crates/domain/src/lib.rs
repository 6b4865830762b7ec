//! StudyHub Domain Types
//!
//! Core document model for the StudyHub platform: users, study groups and
//! practice questions with their embedded member responses, difficulty
//! ratings and feedback.
//!
//! ## Architecture
//!
//! - **identifiers**: Strongly-typed UUID-based identifiers
//! - **user**: User accounts and platform roles
//! - **group**: Study groups and embedded membership
//! - **question**: Questions, responses, ratings and feedback
//! - **events**: Domain event envelope
//! - **errors**: Error types with HTTP status codes
//!
//! ## Usage
//!
//! ```rust
//! use studyhub_domain::{
//!     group::{Group, GroupRole},
//!     identifiers::UserId,
//! };
//!
//! let owner = UserId::new();
//! let group = Group::new("Daily Grind", "One problem a day", owner, "ABCD2345");
//! assert_eq!(group.role_of(owner), Some(GroupRole::Owner));
//! ```

#![warn(clippy::all)]

pub mod identifiers;
pub mod user;
pub mod group;
pub mod question;
pub mod events;
pub mod errors;

pub use identifiers::*;
pub use errors::AppError;

pub use user::{User, UserRole, UserSummary};
pub use group::{Group, GroupMember, GroupRole};
pub use question::{
    Difficulty, DifficultyRating, Feedback, MemberResponse, Platform, Question, ResponseInput,
    ResponseStatus,
};
