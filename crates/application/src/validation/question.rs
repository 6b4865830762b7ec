//! Question, response, rating and feedback validation

use super::{Validatable, ValidationResult, ValidationRules, ValidatorExt};
use serde::{Deserialize, Serialize};
use studyhub_domain::{Difficulty, Platform, Question, ResponseStatus};
use validator::Validate;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_LENGTH: usize = 30;
pub const MAX_NOTES_LENGTH: usize = 5000;
pub const MAX_TIME_TAKEN_MINUTES: u32 = 1440;
pub const MAX_RESPONSE_NOTES_LENGTH: usize = 2000;
pub const MAX_FEEDBACK_LENGTH: usize = 2000;

/// Trim, lowercase and de-duplicate tags, keeping first-seen order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

fn validate_tags(tags: &[String], result: &mut ValidationResult) {
    let normalized = normalize_tags(tags);
    result.merge(ValidationRules::validate_list_size(&normalized, "tags", MAX_TAGS));
    if normalized.iter().any(|t| t.chars().count() > MAX_TAG_LENGTH) {
        result.add_field_error(
            "tags",
            format!("Each tag must be {} characters or less", MAX_TAG_LENGTH),
        );
    }
}

/// Post a question to a group
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub platform: Platform,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Notes must be 5000 characters or less"))]
    pub notes: Option<String>,
}

impl Validatable for CreateQuestionRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = self.to_validation_result();

        if !self.title.is_empty() {
            result.merge(ValidationRules::validate_not_blank(&self.title, "title"));
        }
        if let Some(link) = self.link.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            result.merge(ValidationRules::validate_url(link, "link"));
        }
        validate_tags(&self.tags, &mut result);

        result
    }
}

/// Edit a question; absent fields are left unchanged. An empty `link`
/// removes the link.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub link: Option<String>,
    pub platform: Option<Platform>,
    pub difficulty: Option<Difficulty>,
    pub tags: Option<Vec<String>>,
    #[validate(length(max = 5000, message = "Notes must be 5000 characters or less"))]
    pub notes: Option<String>,
}

impl Validatable for UpdateQuestionRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = self.to_validation_result();

        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            result.merge(ValidationRules::validate_not_blank(title, "title"));
        }
        if let Some(link) = self.link.as_deref().filter(|l| !l.is_empty()) {
            result.merge(ValidationRules::validate_url(link, "link"));
        }
        if let Some(tags) = &self.tags {
            validate_tags(tags, &mut result);
        }

        result
    }
}

/// Filters for listing a group's questions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionFilters {
    pub difficulty: Option<Difficulty>,
    pub platform: Option<Platform>,
    /// Matches a normalized tag exactly
    pub tag: Option<String>,
    /// Case-insensitive substring of the title
    pub search: Option<String>,
}

impl QuestionFilters {
    /// Lowercase the tag and drop empty strings.
    pub fn normalized(mut self) -> Self {
        self.tag = self
            .tag
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    /// Whether `question` passes every set filter.
    pub fn matches(&self, question: &Question) -> bool {
        self.difficulty.map_or(true, |d| question.difficulty == d)
            && self.platform.map_or(true, |p| question.platform == p)
            && self
                .tag
                .as_ref()
                .map_or(true, |tag| question.tags.iter().any(|t| t == tag))
            && self.search.as_ref().map_or(true, |needle| {
                question
                    .title
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
    }
}

/// Record or replace the caller's response to a question
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertResponseRequest {
    pub status: ResponseStatus,
    #[validate(range(max = 1440, message = "Time taken must be at most 1440 minutes"))]
    pub time_taken_minutes: Option<u32>,
    #[validate(length(max = 2000, message = "Notes must be 2000 characters or less"))]
    pub notes: Option<String>,
}

impl Validatable for UpsertResponseRequest {
    fn validate_all(&self) -> ValidationResult {
        self.to_validation_result()
    }
}

/// Rate a question's difficulty
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateDifficultyRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
}

impl Validatable for RateDifficultyRequest {
    fn validate_all(&self) -> ValidationResult {
        self.to_validation_result()
    }
}

/// Add or edit feedback
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(length(min = 1, max = 2000, message = "Feedback must be 1-2000 characters"))]
    pub body: String,
}

impl Validatable for FeedbackRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = self.to_validation_result();
        if !self.body.is_empty() {
            result.merge(ValidationRules::validate_not_blank(&self.body, "body"));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> CreateQuestionRequest {
        CreateQuestionRequest {
            title: "Two Sum".to_string(),
            link: Some("https://leetcode.com/problems/two-sum/".to_string()),
            platform: Platform::Leetcode,
            difficulty: Difficulty::Easy,
            tags: vec!["Array".to_string(), " hash-map ".to_string()],
            notes: None,
        }
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            " DP ".to_string(),
            "dp".to_string(),
            "".to_string(),
            "Graphs".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["dp", "graphs"]);
    }

    #[test]
    fn test_create_question_valid() {
        assert!(create().validate_all().valid);
    }

    #[test]
    fn test_create_question_rejects_bad_link_and_tags() {
        let mut req = create();
        req.link = Some("leetcode two sum".to_string());
        req.tags = (0..11).map(|i| format!("tag{}", i)).collect();
        let result = req.validate_all();
        assert!(result.field_errors.contains_key("link"));
        assert!(result.field_errors.contains_key("tags"));

        let mut req = create();
        req.tags = vec!["x".repeat(MAX_TAG_LENGTH + 1)];
        assert!(!req.validate_all().valid);
    }

    #[test]
    fn test_duplicate_tags_count_once() {
        let mut req = create();
        req.tags = (0..15).map(|_| "dp".to_string()).collect();
        assert!(req.validate_all().valid);
    }

    #[test]
    fn test_response_limits() {
        let req = UpsertResponseRequest {
            status: ResponseStatus::Solved,
            time_taken_minutes: Some(MAX_TIME_TAKEN_MINUTES + 1),
            notes: None,
        };
        assert!(req.validate_all().field_errors.contains_key("time_taken_minutes"));
    }

    #[test]
    fn test_rating_range() {
        assert!(RateDifficultyRequest { rating: 5 }.validate_all().valid);
        assert!(!RateDifficultyRequest { rating: 0 }.validate_all().valid);
        assert!(!RateDifficultyRequest { rating: 6 }.validate_all().valid);
    }

    #[test]
    fn test_feedback_body() {
        assert!(!FeedbackRequest { body: " ".to_string() }.validate_all().valid);
        assert!(!FeedbackRequest { body: "x".repeat(MAX_FEEDBACK_LENGTH + 1) }.validate_all().valid);
    }

    #[test]
    fn test_filters_normalized() {
        let filters = QuestionFilters {
            tag: Some(" DP ".to_string()),
            search: Some("  ".to_string()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(filters.tag.as_deref(), Some("dp"));
        assert!(filters.search.is_none());
    }

    #[test]
    fn test_filters_match() {
        let mut question = Question::new(
            studyhub_domain::GroupId::new(),
            studyhub_domain::UserId::new(),
            "Longest Palindromic Substring",
            Platform::Leetcode,
            Difficulty::Medium,
        );
        question.tags = vec!["dp".to_string(), "strings".to_string()];

        assert!(QuestionFilters::default().matches(&question));

        let filters = QuestionFilters {
            difficulty: Some(Difficulty::Medium),
            tag: Some("dp".to_string()),
            search: Some("palindromic".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&question));

        let filters = QuestionFilters {
            platform: Some(Platform::Codeforces),
            ..Default::default()
        };
        assert!(!filters.matches(&question));
    }
}
