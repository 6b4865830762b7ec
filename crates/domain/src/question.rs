//! Practice questions with their embedded member activity.
//!
//! Responses, difficulty ratings and feedback are denormalized onto the
//! question document. Each user has at most one response and one rating per
//! question; the upsert helpers keep it that way.

use crate::errors::QuestionError;
use crate::identifiers::{FeedbackId, GroupId, QuestionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest accepted difficulty rating
pub const MIN_RATING: u8 = 1;
/// Highest accepted difficulty rating
pub const MAX_RATING: u8 = 5;

/// Question difficulty as labelled by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Judge or site hosting the question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Leetcode,
    Hackerrank,
    Codeforces,
    Codewars,
    Other,
}

impl Default for Platform {
    fn default() -> Self {
        Self::Other
    }
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leetcode => "leetcode",
            Self::Hackerrank => "hackerrank",
            Self::Codeforces => "codeforces",
            Self::Codewars => "codewars",
            Self::Other => "other",
        }
    }
}

/// Outcome a member logs for a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Solved,
    Attempted,
    Skipped,
}

impl ResponseStatus {
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved)
    }
}

/// A single member's response to a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberResponse {
    pub user_id: UserId,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Set while `status` is `Solved`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberResponse {
    pub fn is_solved(&self) -> bool {
        self.status.is_solved()
    }
}

/// Fields a member supplies when recording a response
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseInput {
    pub status: ResponseStatus,
    pub time_taken_minutes: Option<u32>,
    pub notes: Option<String>,
}

/// A member's perceived difficulty, 1 (trivial) to 5 (brutal)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyRating {
    pub user_id: UserId,
    pub rating: u8,
    pub rated_at: DateTime<Utc>,
}

/// Free-form discussion attached to a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub user_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Question document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub group_id: GroupId,
    pub author_id: UserId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub platform: Platform,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub responses: Vec<MemberResponse>,
    #[serde(default)]
    pub ratings: Vec<DifficultyRating>,
    #[serde(default)]
    pub feedback: Vec<Feedback>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    pub fn new(
        group_id: GroupId,
        author_id: UserId,
        title: impl Into<String>,
        platform: Platform,
        difficulty: Difficulty,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: QuestionId::new(),
            group_id,
            author_id,
            title: title.into(),
            link: None,
            platform,
            difficulty,
            tags: Vec::new(),
            notes: String::new(),
            responses: Vec::new(),
            ratings: Vec::new(),
            feedback: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn response_of(&self, user_id: UserId) -> Option<&MemberResponse> {
        self.responses.iter().find(|r| r.user_id == user_id)
    }

    pub fn rating_of(&self, user_id: UserId) -> Option<u8> {
        self.ratings
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.rating)
    }

    /// Insert or replace the caller's response.
    ///
    /// `solved_at` is stamped with `now` when the response becomes solved,
    /// preserved while it stays solved, and cleared when it stops being
    /// solved.
    pub fn upsert_response(
        &mut self,
        user_id: UserId,
        input: ResponseInput,
        now: DateTime<Utc>,
    ) -> &MemberResponse {
        let index = match self.responses.iter().position(|r| r.user_id == user_id) {
            Some(index) => {
                let existing = &mut self.responses[index];
                existing.solved_at = match (existing.status.is_solved(), input.status.is_solved()) {
                    (true, true) => existing.solved_at.or(Some(now)),
                    (false, true) => Some(now),
                    (_, false) => None,
                };
                existing.status = input.status;
                existing.time_taken_minutes = input.time_taken_minutes;
                existing.notes = input.notes;
                existing.updated_at = now;
                index
            }
            None => {
                self.responses.push(MemberResponse {
                    user_id,
                    status: input.status,
                    time_taken_minutes: input.time_taken_minutes,
                    notes: input.notes,
                    solved_at: input.status.is_solved().then_some(now),
                    created_at: now,
                    updated_at: now,
                });
                self.responses.len() - 1
            }
        };

        self.updated_at = now;
        &self.responses[index]
    }

    pub fn remove_response(&mut self, user_id: UserId) -> Result<MemberResponse, QuestionError> {
        let index = self
            .responses
            .iter()
            .position(|r| r.user_id == user_id)
            .ok_or(QuestionError::ResponseNotFound)?;

        self.updated_at = Utc::now();
        Ok(self.responses.remove(index))
    }

    /// Insert or replace the caller's difficulty rating.
    pub fn upsert_rating(
        &mut self,
        user_id: UserId,
        rating: u8,
        now: DateTime<Utc>,
    ) -> Result<(), QuestionError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(QuestionError::InvalidRating(rating));
        }

        match self.ratings.iter_mut().find(|r| r.user_id == user_id) {
            Some(existing) => {
                existing.rating = rating;
                existing.rated_at = now;
            }
            None => self.ratings.push(DifficultyRating {
                user_id,
                rating,
                rated_at: now,
            }),
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn add_feedback(
        &mut self,
        user_id: UserId,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> &Feedback {
        self.feedback.push(Feedback {
            id: FeedbackId::new(),
            user_id,
            body: body.into(),
            created_at: now,
            updated_at: now,
        });
        self.updated_at = now;
        &self.feedback[self.feedback.len() - 1]
    }

    pub fn find_feedback(&self, feedback_id: FeedbackId) -> Result<&Feedback, QuestionError> {
        self.feedback
            .iter()
            .find(|f| f.id == feedback_id)
            .ok_or(QuestionError::FeedbackNotFound(feedback_id))
    }

    pub fn update_feedback(
        &mut self,
        feedback_id: FeedbackId,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&Feedback, QuestionError> {
        let entry = self
            .feedback
            .iter_mut()
            .find(|f| f.id == feedback_id)
            .ok_or(QuestionError::FeedbackNotFound(feedback_id))?;

        entry.body = body.into();
        entry.updated_at = now;
        self.updated_at = now;
        self.find_feedback(feedback_id)
    }

    pub fn remove_feedback(&mut self, feedback_id: FeedbackId) -> Result<Feedback, QuestionError> {
        let index = self
            .feedback
            .iter()
            .position(|f| f.id == feedback_id)
            .ok_or(QuestionError::FeedbackNotFound(feedback_id))?;

        self.updated_at = Utc::now();
        Ok(self.feedback.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn question() -> Question {
        Question::new(
            GroupId::new(),
            UserId::new(),
            "Two Sum",
            Platform::Leetcode,
            Difficulty::Easy,
        )
    }

    fn input(status: ResponseStatus) -> ResponseInput {
        ResponseInput {
            status,
            time_taken_minutes: Some(15),
            notes: None,
        }
    }

    #[test]
    fn test_first_solved_response_sets_solved_at() {
        let mut q = question();
        let user = UserId::new();
        let now = Utc::now();

        let response = q.upsert_response(user, input(ResponseStatus::Solved), now);
        assert_eq!(response.solved_at, Some(now));
        assert_eq!(q.responses.len(), 1);
    }

    #[test]
    fn test_attempted_response_has_no_solved_at() {
        let mut q = question();
        let response = q.upsert_response(UserId::new(), input(ResponseStatus::Attempted), Utc::now());
        assert!(response.solved_at.is_none());
    }

    #[test]
    fn test_resolving_keeps_original_solved_at() {
        let mut q = question();
        let user = UserId::new();
        let first = Utc::now() - Duration::days(2);

        q.upsert_response(user, input(ResponseStatus::Solved), first);
        let response = q.upsert_response(user, input(ResponseStatus::Solved), Utc::now());

        assert_eq!(response.solved_at, Some(first));
        assert_eq!(q.responses.len(), 1);
    }

    #[test]
    fn test_unsolving_clears_solved_at() {
        let mut q = question();
        let user = UserId::new();
        let first = Utc::now() - Duration::days(1);

        q.upsert_response(user, input(ResponseStatus::Solved), first);
        let response = q.upsert_response(user, input(ResponseStatus::Skipped), Utc::now());
        assert!(response.solved_at.is_none());

        let later = Utc::now();
        let response = q.upsert_response(user, input(ResponseStatus::Solved), later);
        assert_eq!(response.solved_at, Some(later));
    }

    #[test]
    fn test_remove_missing_response() {
        let mut q = question();
        assert!(matches!(
            q.remove_response(UserId::new()),
            Err(QuestionError::ResponseNotFound)
        ));
    }

    #[test]
    fn test_rating_upsert_and_bounds() {
        let mut q = question();
        let user = UserId::new();

        q.upsert_rating(user, 3, Utc::now()).unwrap();
        q.upsert_rating(user, 5, Utc::now()).unwrap();
        assert_eq!(q.ratings.len(), 1);
        assert_eq!(q.rating_of(user), Some(5));

        assert!(matches!(
            q.upsert_rating(user, 0, Utc::now()),
            Err(QuestionError::InvalidRating(0))
        ));
        assert!(q.upsert_rating(user, 6, Utc::now()).is_err());
    }

    #[test]
    fn test_feedback_lifecycle() {
        let mut q = question();
        let user = UserId::new();

        let id = q.add_feedback(user, "Use a hash map", Utc::now()).id;
        let updated = q.update_feedback(id, "Use a hash map, O(n)", Utc::now()).unwrap();
        assert_eq!(updated.body, "Use a hash map, O(n)");

        let removed = q.remove_feedback(id).unwrap();
        assert_eq!(removed.user_id, user);
        assert!(q.feedback.is_empty());
        assert!(q.find_feedback(id).is_err());
    }

    #[test]
    fn test_document_deserializes_without_activity_arrays() {
        let q = question();
        let mut value = serde_json::to_value(&q).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("responses");
        obj.remove("ratings");
        obj.remove("feedback");

        let parsed: Question = serde_json::from_value(value).unwrap();
        assert!(parsed.responses.is_empty());
        assert_eq!(parsed.difficulty, Difficulty::Easy);
    }
}
