//! Fluent builder pattern for constructing test data.
//!
//! Builders produce domain documents directly, bypassing services, so tests
//! can set up timestamps and memberships that would otherwise take many
//! calls to reach.

use chrono::{DateTime, Duration, Utc};
use studyhub_domain::{
    Difficulty, DifficultyRating, Feedback, FeedbackId, Group, GroupId, GroupMember, GroupRole,
    MemberResponse, Platform, Question, QuestionId, ResponseStatus, User, UserId, UserRole,
};

/// Builder for creating User test instances
#[derive(Clone)]
pub struct UserBuilder {
    id: UserId,
    email: String,
    username: String,
    display_name: String,
    password_hash: String,
    role: UserRole,
    created_at: DateTime<Utc>,
}

impl UserBuilder {
    pub fn new() -> Self {
        Self {
            id: UserId::new(),
            email: "test@example.com".to_string(),
            username: "testuser".to_string(),
            display_name: "Test User".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role: UserRole::Member,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = hash.into();
        self
    }

    pub fn admin(mut self) -> Self {
        self.role = UserRole::Admin;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn build(self) -> User {
        User {
            id: self.id,
            email: self.email.to_lowercase(),
            username: self.username,
            display_name: self.display_name,
            password_hash: self.password_hash,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.created_at,
            last_login_at: None,
        }
    }
}

impl Default for UserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating Group test instances
///
/// The owner is always the first member; extra members are appended in
/// the order they are added.
#[derive(Clone)]
pub struct GroupBuilder {
    id: GroupId,
    name: String,
    description: String,
    invite_code: String,
    owner_id: UserId,
    members: Vec<GroupMember>,
    created_at: DateTime<Utc>,
}

impl GroupBuilder {
    pub fn new() -> Self {
        Self {
            id: GroupId::new(),
            name: "Test Group".to_string(),
            description: "A group for tests".to_string(),
            invite_code: studyhub_common::generate_invite_code(),
            owner_id: UserId::new(),
            members: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: GroupId) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_invite_code(mut self, code: impl Into<String>) -> Self {
        self.invite_code = code.into();
        self
    }

    pub fn owned_by(mut self, owner_id: UserId) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn with_member(self, user_id: UserId) -> Self {
        self.with_member_role(user_id, GroupRole::Member)
    }

    pub fn with_admin(self, user_id: UserId) -> Self {
        self.with_member_role(user_id, GroupRole::Admin)
    }

    pub fn with_member_role(mut self, user_id: UserId, role: GroupRole) -> Self {
        self.members.push(GroupMember {
            user_id,
            role,
            joined_at: self.created_at,
        });
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn build(self) -> Group {
        let mut members = vec![GroupMember {
            user_id: self.owner_id,
            role: GroupRole::Owner,
            joined_at: self.created_at,
        }];
        members.extend(
            self.members
                .into_iter()
                .filter(|m| m.user_id != self.owner_id),
        );

        Group {
            id: self.id,
            name: self.name,
            description: self.description,
            invite_code: self.invite_code,
            owner_id: self.owner_id,
            members,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl Default for GroupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a single member response
#[derive(Clone)]
pub struct ResponseBuilder {
    user_id: UserId,
    status: ResponseStatus,
    time_taken_minutes: Option<u32>,
    notes: Option<String>,
    at: DateTime<Utc>,
}

impl ResponseBuilder {
    /// A solved response stamped now.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            status: ResponseStatus::Solved,
            time_taken_minutes: None,
            notes: None,
            at: Utc::now(),
        }
    }

    pub fn attempted(mut self) -> Self {
        self.status = ResponseStatus::Attempted;
        self
    }

    pub fn skipped(mut self) -> Self {
        self.status = ResponseStatus::Skipped;
        self
    }

    pub fn solved_at(mut self, at: DateTime<Utc>) -> Self {
        self.status = ResponseStatus::Solved;
        self.at = at;
        self
    }

    pub fn solved_days_ago(self, days: i64) -> Self {
        self.solved_at(Utc::now() - Duration::days(days))
    }

    pub fn with_time(mut self, minutes: u32) -> Self {
        self.time_taken_minutes = Some(minutes);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> MemberResponse {
        MemberResponse {
            user_id: self.user_id,
            status: self.status,
            time_taken_minutes: self.time_taken_minutes,
            notes: self.notes,
            solved_at: self.status.is_solved().then_some(self.at),
            created_at: self.at,
            updated_at: self.at,
        }
    }
}

/// Builder for creating Question test instances
#[derive(Clone)]
pub struct QuestionBuilder {
    id: QuestionId,
    group_id: GroupId,
    author_id: UserId,
    title: String,
    link: Option<String>,
    platform: Platform,
    difficulty: Difficulty,
    tags: Vec<String>,
    notes: String,
    responses: Vec<MemberResponse>,
    ratings: Vec<DifficultyRating>,
    feedback: Vec<Feedback>,
    created_at: DateTime<Utc>,
}

impl QuestionBuilder {
    pub fn new() -> Self {
        Self {
            id: QuestionId::new(),
            group_id: GroupId::new(),
            author_id: UserId::new(),
            title: "Two Sum".to_string(),
            link: None,
            platform: Platform::Leetcode,
            difficulty: Difficulty::Easy,
            tags: Vec::new(),
            notes: String::new(),
            responses: Vec::new(),
            ratings: Vec::new(),
            feedback: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: QuestionId) -> Self {
        self.id = id;
        self
    }

    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn authored_by(mut self, author_id: UserId) -> Self {
        self.author_id = author_id;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Replaces any earlier response from the same user.
    pub fn with_response(mut self, response: MemberResponse) -> Self {
        self.responses.retain(|r| r.user_id != response.user_id);
        self.responses.push(response);
        self
    }

    pub fn with_rating(mut self, user_id: UserId, rating: u8) -> Self {
        self.ratings.retain(|r| r.user_id != user_id);
        self.ratings.push(DifficultyRating {
            user_id,
            rating,
            rated_at: self.created_at,
        });
        self
    }

    pub fn with_feedback(mut self, user_id: UserId, body: impl Into<String>) -> Self {
        self.feedback.push(Feedback {
            id: FeedbackId::new(),
            user_id,
            body: body.into(),
            created_at: self.created_at,
            updated_at: self.created_at,
        });
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn build(self) -> Question {
        Question {
            id: self.id,
            group_id: self.group_id,
            author_id: self.author_id,
            title: self.title,
            link: self.link,
            platform: self.platform,
            difficulty: self.difficulty,
            tags: self.tags,
            notes: self.notes,
            responses: self.responses,
            ratings: self.ratings,
            feedback: self.feedback,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl Default for QuestionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_builder_keeps_owner_first() {
        let owner = UserId::new();
        let member = UserId::new();
        let group = GroupBuilder::new()
            .with_member(member)
            .owned_by(owner)
            .with_member(owner)
            .build();

        assert_eq!(group.member_count(), 2);
        assert_eq!(group.members[0].user_id, owner);
        assert_eq!(group.role_of(owner), Some(GroupRole::Owner));
        assert_eq!(group.role_of(member), Some(GroupRole::Member));
    }

    #[test]
    fn test_response_builder_stamps_solved_at_only_when_solved() {
        let user = UserId::new();
        assert!(ResponseBuilder::new(user).build().solved_at.is_some());
        assert!(ResponseBuilder::new(user).attempted().build().solved_at.is_none());
    }

    #[test]
    fn test_question_builder_replaces_response_per_user() {
        let user = UserId::new();
        let question = QuestionBuilder::new()
            .with_response(ResponseBuilder::new(user).attempted().build())
            .with_response(ResponseBuilder::new(user).build())
            .with_rating(user, 2)
            .with_rating(user, 4)
            .build();

        assert_eq!(question.responses.len(), 1);
        assert_eq!(question.responses[0].status, ResponseStatus::Solved);
        assert_eq!(question.rating_of(user), Some(4));
    }
}
