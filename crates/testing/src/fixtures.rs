//! Test fixtures for generating domain entities with realistic data.
//!
//! Fake values are suffixed with a random tag so fixtures never collide on
//! the unique email and username indexes.

use chrono::{DateTime, Duration, Utc};
use fake::{
    faker::{
        internet::en::{FreeEmailProvider, Username},
        lorem::en::{Sentence, Words},
        name::en::Name,
    },
    Fake,
};
use studyhub_domain::{Difficulty, Group, GroupId, Platform, Question, User, UserId};

use crate::builders::{GroupBuilder, QuestionBuilder, UserBuilder};

/// Password for accounts registered through the services in tests.
pub const TEST_PASSWORD: &str = "correct-horse-42";

fn unique_tag() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Create a test user with fake but unique identity fields
pub fn create_test_user() -> User {
    let (email, username, display_name) = register_request_parts();
    UserBuilder::new()
        .with_email(email)
        .with_username(username)
        .with_display_name(display_name)
        .build()
}

/// Create a test admin user
pub fn create_test_admin() -> User {
    let user = create_test_user();
    UserBuilder::new()
        .with_id(user.id)
        .with_email(user.email)
        .with_username(user.username)
        .with_display_name(user.display_name)
        .admin()
        .build()
}

/// Email, username and display name suitable for a registration request.
///
/// Usernames keep to ASCII letters, digits and underscores and start
/// with a letter.
pub fn register_request_parts() -> (String, String, String) {
    let tag = unique_tag();
    let base: String = Username().fake();
    let base: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(12)
        .collect();
    let base = if base.starts_with(|c: char| c.is_ascii_alphabetic()) {
        base
    } else {
        "user".to_string()
    };
    let username = format!("{}_{}", base, tag);
    let provider: String = FreeEmailProvider().fake();
    let email = format!("{}@{}", username.to_lowercase(), provider);
    let display_name: String = Name().fake();
    (email, username, display_name)
}

/// Create a group owned by `owner_id` with a fake name
pub fn create_test_group(owner_id: UserId) -> Group {
    let words: Vec<String> = Words(2..4).fake();
    GroupBuilder::new()
        .owned_by(owner_id)
        .with_name(format!("{} study group", words.join(" ")))
        .with_description(Sentence(4..10).fake::<String>())
        .build()
}

/// Create a group with `owner_id` plus the given plain members
pub fn create_test_group_with_members(owner_id: UserId, members: &[UserId]) -> Group {
    members
        .iter()
        .fold(GroupBuilder::new().owned_by(owner_id), |b, m| b.with_member(*m))
        .with_name("Members group")
        .build()
}

/// Create a question in `group_id` with a fake title
pub fn create_test_question(group_id: GroupId, author_id: UserId) -> Question {
    let title: String = Sentence(2..5).fake();
    QuestionBuilder::new()
        .in_group(group_id)
        .authored_by(author_id)
        .with_title(title.trim_end_matches('.'))
        .with_platform(Platform::Leetcode)
        .with_difficulty(Difficulty::Medium)
        .with_tags(&["arrays"])
        .build()
}

/// Midday UTC `days` days before now, so day arithmetic in tests never
/// straddles midnight.
pub fn days_ago(days: i64) -> DateTime<Utc> {
    let today = Utc::now().date_naive();
    let noon = (today - Duration::days(days))
        .and_hms_opt(12, 0, 0)
        .unwrap_or_default();
    DateTime::from_naive_utc_and_offset(noon, Utc)
}
