//! Statistics module - Member-response aggregation
//!
//! Group, member and question statistics are recomputed from the question
//! documents on every request. Only responses and ratings from a group's
//! current members are counted; entries left behind by former members stay
//! in the documents and are skipped here.

mod engine;

pub use engine::*;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use studyhub_domain::{Difficulty, GroupId, QuestionId, UserId};

/// Longest activity series a caller may request
pub const MAX_ACTIVITY_DAYS: u32 = studyhub_common::config::MAX_STATS_WINDOW_DAYS;

/// Statistics engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Trailing window, in days, for rolling solve averages
    pub rolling_window_days: u32,
    /// Default length of the activity series
    pub activity_days: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            rolling_window_days: 7,
            activity_days: 30,
        }
    }
}

/// Solved counts split by difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyCounts {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyCounts {
    pub fn increment(&mut self, difficulty: Difficulty) {
        match difficulty {
            Difficulty::Easy => self.easy += 1,
            Difficulty::Medium => self.medium += 1,
            Difficulty::Hard => self.hard += 1,
        }
    }

    pub fn get(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    pub fn total(&self) -> u32 {
        self.easy + self.medium + self.hard
    }
}

/// Aggregates for a single question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: QuestionId,
    pub member_count: u32,
    pub response_count: u32,
    pub solved_count: u32,
    pub attempted_count: u32,
    pub skipped_count: u32,
    /// Solved responses over current members
    pub solve_rate: f64,
    /// Mean time over solved responses that recorded one
    pub average_time_minutes: Option<f64>,
    pub average_difficulty_rating: Option<f64>,
    pub rating_count: u32,
    pub feedback_count: u32,
}

/// One member's aggregates within a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStats {
    pub user_id: UserId,
    pub question_count: u32,
    pub solved_count: u32,
    pub attempted_count: u32,
    pub skipped_count: u32,
    /// Solved questions over the group's questions
    pub solve_rate: f64,
    pub average_time_minutes: Option<f64>,
    pub solved_by_difficulty: DifficultyCounts,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_solved_at: Option<DateTime<Utc>>,
}

/// A ranked leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Competition rank: tied members share a rank and the next rank skips
    pub rank: u32,
    pub user_id: UserId,
    pub username: String,
    pub display_name: String,
    pub solved_count: u32,
    pub average_time_minutes: Option<f64>,
    pub current_streak: u32,
}

/// Solves on one UTC day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPoint {
    pub date: NaiveDate,
    pub solves: u32,
    /// Mean daily solves over the trailing window ending on `date`
    pub rolling_average: f64,
}

/// Aggregates for one difficulty level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyBreakdown {
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub solved_responses: u32,
    pub solve_rate: f64,
}

/// A question singled out in the group overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionHighlight {
    pub question_id: QuestionId,
    pub title: String,
    pub difficulty: Difficulty,
    pub solve_rate: f64,
    pub average_difficulty_rating: Option<f64>,
}

/// Group-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupOverview {
    pub group_id: GroupId,
    pub member_count: u32,
    pub question_count: u32,
    pub total_solves: u32,
    pub overall_solve_rate: f64,
    pub most_solved_question: Option<QuestionHighlight>,
    pub hardest_question: Option<QuestionHighlight>,
    pub difficulty_breakdown: Vec<DifficultyBreakdown>,
    pub activity: Vec<ActivityPoint>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// A user's aggregates across every group they belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: UserId,
    pub groups: u32,
    pub solved_count: u32,
    pub attempted_count: u32,
    pub average_time_minutes: Option<f64>,
    pub solved_by_difficulty: DifficultyCounts,
    pub current_streak: u32,
    pub longest_streak: u32,
}
