//! In-memory repositories.
//!
//! Serve the same ports as the PostgreSQL adapters from process memory.
//! Used when no database URL is configured and throughout the tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use studyhub_application::services::{
    GroupRepositoryPort, QuestionRepositoryPort, UserRepositoryPort,
};
use studyhub_application::validation::QuestionFilters;
use studyhub_application::ApplicationResult;
use studyhub_common::{PaginatedResult, PaginationParams};
use studyhub_domain::{Group, GroupId, Question, QuestionId, User, UserId};

use crate::Error;

/// Newest first, id as the tiebreak so pages are stable.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<chrono::Utc>, uuid::Uuid)) {
    items.sort_by(|a, b| {
        let (a_at, a_id) = key(a);
        let (b_at, b_id) = key(b);
        b_at.cmp(&a_at).then(a_id.cmp(&b_id))
    });
}

/// User store keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(users: &HashMap<UserId, User>, user: &User) -> crate::Result<()> {
        for other in users.values().filter(|u| u.id != user.id) {
            if other.email == user.email {
                return Err(Error::Conflict("Email already registered".to_string()));
            }
            if other.username.eq_ignore_ascii_case(&user.username) {
                return Err(Error::Conflict("Username already taken".to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepositoryPort for InMemoryUserRepository {
    async fn create(&self, user: &User) -> ApplicationResult<()> {
        let mut users = self.users.write();
        if users.contains_key(&user.id) {
            return Err(Error::Conflict(format!("User {} already exists", user.id)).into());
        }
        Self::check_unique(&users, user)?;
        users.insert(user.id, user.clone());
        debug!(user_id = %user.id, "User stored");
        Ok(())
    }

    async fn get(&self, id: UserId) -> ApplicationResult<Option<User>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn get_many(&self, ids: &[UserId]) -> ApplicationResult<Vec<User>> {
        let users = self.users.read();
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn find_by_email(&self, email: &str) -> ApplicationResult<Option<User>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> ApplicationResult<Option<User>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn update(&self, user: &User) -> ApplicationResult<()> {
        let mut users = self.users.write();
        if !users.contains_key(&user.id) {
            return Err(Error::NotFound(format!("User {}", user.id)).into());
        }
        Self::check_unique(&users, user)?;
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: UserId) -> ApplicationResult<bool> {
        Ok(self.users.write().remove(&id).is_some())
    }
}

/// Group store keyed by id.
#[derive(Default)]
pub struct InMemoryGroupRepository {
    groups: RwLock<HashMap<GroupId, Group>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(groups: &HashMap<GroupId, Group>, group: &Group) -> crate::Result<()> {
        let taken = groups
            .values()
            .any(|g| g.id != group.id && g.invite_code.eq_ignore_ascii_case(&group.invite_code));
        if taken {
            return Err(Error::Conflict("Invite code already exists".to_string()));
        }
        Ok(())
    }

    fn member_groups(&self, user_id: UserId) -> Vec<Group> {
        let mut groups: Vec<Group> = self
            .groups
            .read()
            .values()
            .filter(|g| g.is_member(user_id))
            .cloned()
            .collect();
        newest_first(&mut groups, |g| (g.created_at, *g.id.as_uuid()));
        groups
    }
}

#[async_trait]
impl GroupRepositoryPort for InMemoryGroupRepository {
    async fn create(&self, group: &Group) -> ApplicationResult<()> {
        let mut groups = self.groups.write();
        if groups.contains_key(&group.id) {
            return Err(Error::Conflict(format!("Group {} already exists", group.id)).into());
        }
        Self::check_unique(&groups, group)?;
        groups.insert(group.id, group.clone());
        debug!(group_id = %group.id, "Group stored");
        Ok(())
    }

    async fn get(&self, id: GroupId) -> ApplicationResult<Option<Group>> {
        Ok(self.groups.read().get(&id).cloned())
    }

    async fn find_by_invite_code(&self, code: &str) -> ApplicationResult<Option<Group>> {
        Ok(self
            .groups
            .read()
            .values()
            .find(|g| g.invite_code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn list_for_member(
        &self,
        user_id: UserId,
        pagination: &PaginationParams,
    ) -> ApplicationResult<PaginatedResult<Group>> {
        Ok(pagination.paginate(self.member_groups(user_id)))
    }

    async fn list_all_for_member(&self, user_id: UserId) -> ApplicationResult<Vec<Group>> {
        Ok(self.member_groups(user_id))
    }

    async fn count_owned_by(&self, user_id: UserId) -> ApplicationResult<u64> {
        Ok(self
            .groups
            .read()
            .values()
            .filter(|g| g.owner_id == user_id)
            .count() as u64)
    }

    async fn update(&self, group: &Group) -> ApplicationResult<()> {
        let mut groups = self.groups.write();
        if !groups.contains_key(&group.id) {
            return Err(Error::NotFound(format!("Group {}", group.id)).into());
        }
        Self::check_unique(&groups, group)?;
        groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn delete(&self, id: GroupId) -> ApplicationResult<bool> {
        Ok(self.groups.write().remove(&id).is_some())
    }
}

/// Question store keyed by id.
#[derive(Default)]
pub struct InMemoryQuestionRepository {
    questions: RwLock<HashMap<QuestionId, Question>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect(&self, keep: impl Fn(&Question) -> bool) -> Vec<Question> {
        let mut questions: Vec<Question> = self
            .questions
            .read()
            .values()
            .filter(|q| keep(q))
            .cloned()
            .collect();
        newest_first(&mut questions, |q| (q.created_at, *q.id.as_uuid()));
        questions
    }
}

#[async_trait]
impl QuestionRepositoryPort for InMemoryQuestionRepository {
    async fn create(&self, question: &Question) -> ApplicationResult<()> {
        let mut questions = self.questions.write();
        if questions.contains_key(&question.id) {
            return Err(Error::Conflict(format!("Question {} already exists", question.id)).into());
        }
        questions.insert(question.id, question.clone());
        Ok(())
    }

    async fn get(&self, id: QuestionId) -> ApplicationResult<Option<Question>> {
        Ok(self.questions.read().get(&id).cloned())
    }

    async fn update(&self, question: &Question) -> ApplicationResult<()> {
        let mut questions = self.questions.write();
        match questions.get_mut(&question.id) {
            Some(stored) => {
                *stored = question.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("Question {}", question.id)).into()),
        }
    }

    async fn delete(&self, id: QuestionId) -> ApplicationResult<bool> {
        Ok(self.questions.write().remove(&id).is_some())
    }

    async fn list(
        &self,
        group_id: GroupId,
        filters: &QuestionFilters,
        pagination: &PaginationParams,
    ) -> ApplicationResult<PaginatedResult<Question>> {
        let matching = self.collect(|q| q.group_id == group_id && filters.matches(q));
        Ok(pagination.paginate(matching))
    }

    async fn list_all_for_group(&self, group_id: GroupId) -> ApplicationResult<Vec<Question>> {
        Ok(self.collect(|q| q.group_id == group_id))
    }

    async fn list_for_groups(&self, group_ids: &[GroupId]) -> ApplicationResult<Vec<Question>> {
        Ok(self.collect(|q| group_ids.contains(&q.group_id)))
    }

    async fn delete_by_group(&self, group_id: GroupId) -> ApplicationResult<u64> {
        let mut questions = self.questions.write();
        let before = questions.len();
        questions.retain(|_, q| q.group_id != group_id);
        Ok((before - questions.len()) as u64)
    }
}
