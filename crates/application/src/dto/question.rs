//! Question DTOs

use crate::stats::QuestionStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use studyhub_domain::{
    Difficulty, Feedback, FeedbackId, GroupId, MemberResponse, Platform, Question, QuestionId,
    ResponseStatus, UserId, UserSummary,
};

/// A question with the caller's own activity and summary counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDto {
    pub id: QuestionId,
    pub group_id: GroupId,
    pub author_id: UserId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub platform: Platform,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub notes: String,
    pub solved_count: u32,
    pub response_count: u32,
    pub solve_rate: f64,
    pub average_difficulty_rating: Option<f64>,
    pub feedback_count: u32,
    /// The caller's response status, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_status: Option<ResponseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_rating: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuestionDto {
    pub fn new(question: &Question, stats: &QuestionStats, viewer: Option<UserId>) -> Self {
        Self {
            id: question.id,
            group_id: question.group_id,
            author_id: question.author_id,
            title: question.title.clone(),
            link: question.link.clone(),
            platform: question.platform,
            difficulty: question.difficulty,
            tags: question.tags.clone(),
            notes: question.notes.clone(),
            solved_count: stats.solved_count,
            response_count: stats.response_count,
            solve_rate: stats.solve_rate,
            average_difficulty_rating: stats.average_difficulty_rating,
            feedback_count: stats.feedback_count,
            my_status: viewer.and_then(|id| question.response_of(id)).map(|r| r.status),
            my_rating: viewer.and_then(|id| question.rating_of(id)),
            created_at: question.created_at,
            updated_at: question.updated_at,
        }
    }
}

/// A response joined with its author's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseDto {
    pub user: UserSummary,
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResponseDto {
    pub fn new(response: &MemberResponse, user: UserSummary) -> Self {
        Self {
            user,
            status: response.status,
            time_taken_minutes: response.time_taken_minutes,
            notes: response.notes.clone(),
            solved_at: response.solved_at,
            created_at: response.created_at,
            updated_at: response.updated_at,
        }
    }

    /// Join responses with user summaries, most recently updated first.
    /// Responses from deleted accounts are skipped.
    pub fn list(question: &Question, users: &HashMap<UserId, UserSummary>) -> Vec<Self> {
        let mut responses: Vec<Self> = question
            .responses
            .iter()
            .filter_map(|r| users.get(&r.user_id).map(|u| Self::new(r, u.clone())))
            .collect();
        responses.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        responses
    }
}

/// Feedback joined with its author's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackDto {
    pub id: FeedbackId,
    pub author: UserSummary,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedbackDto {
    pub fn new(feedback: &Feedback, author: UserSummary) -> Self {
        Self {
            id: feedback.id,
            author,
            body: feedback.body.clone(),
            created_at: feedback.created_at,
            updated_at: feedback.updated_at,
        }
    }

    /// Oldest first. Entries whose author was deleted keep a placeholder
    /// author so the thread stays readable.
    pub fn list(question: &Question, users: &HashMap<UserId, UserSummary>) -> Vec<Self> {
        question
            .feedback
            .iter()
            .map(|f| {
                let author = users.get(&f.user_id).cloned().unwrap_or_else(|| UserSummary {
                    id: f.user_id,
                    username: "deleted".to_string(),
                    display_name: "Deleted user".to_string(),
                });
                Self::new(f, author)
            })
            .collect()
    }
}
