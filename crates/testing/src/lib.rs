//! Testing utilities for StudyHub
//!
//! This crate provides:
//! - Test fixtures with realistic fake data for every domain type
//! - Builder patterns for hand-tuned test documents
//! - Proptest strategies for the small domain enums
//!
//! # Examples
//!
//! ```
//! use studyhub_testing::{fixtures::*, builders::*};
//!
//! let owner = create_test_user();
//! let group = GroupBuilder::new().owned_by(owner.id).build();
//! let question = QuestionBuilder::new()
//!     .in_group(group.id)
//!     .with_response(ResponseBuilder::new(owner.id).solved_days_ago(1).build())
//!     .build();
//! assert_eq!(question.responses.len(), 1);
//! ```

pub mod builders;
pub mod fixtures;
pub mod strategies;

// Re-export commonly used types
pub use builders::*;
pub use fixtures::*;

// Re-export testing dependencies for convenience
pub use fake;
pub use proptest;
