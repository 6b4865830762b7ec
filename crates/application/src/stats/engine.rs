//! Statistics Engine - Solve rates, streaks, rankings and rolling averages
//!
//! The engine is pure and synchronous: callers load a group and its
//! questions, pass an `as_of` instant, and get plain result values back.

use super::{
    ActivityPoint, DifficultyBreakdown, DifficultyCounts, GroupOverview, LeaderboardEntry,
    MemberStats, QuestionHighlight, QuestionStats, StatsConfig, UserStats, MAX_ACTIVITY_DAYS,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use studyhub_common::datetime::{trailing_days, utc_day};
use studyhub_domain::{
    Difficulty, Group, MemberResponse, Question, ResponseStatus, UserId, UserSummary,
};
use tracing::{debug, instrument};

/// The statistics engine
#[derive(Debug, Clone, Default)]
pub struct StatsEngine {
    config: StatsConfig,
}

impl StatsEngine {
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Clamp a requested activity window to `1..=365`, defaulting to the
    /// configured length.
    pub fn activity_days(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.config.activity_days)
            .clamp(1, MAX_ACTIVITY_DAYS)
    }

    /// Aggregates for one question of `group`.
    pub fn question_stats(&self, group: &Group, question: &Question) -> QuestionStats {
        let members = member_set(group);
        let member_count = members.len() as u32;

        let mut stats = QuestionStats {
            question_id: question.id,
            member_count,
            response_count: 0,
            solved_count: 0,
            attempted_count: 0,
            skipped_count: 0,
            solve_rate: 0.0,
            average_time_minutes: None,
            average_difficulty_rating: None,
            rating_count: 0,
            feedback_count: question.feedback.len() as u32,
        };

        let mut times = Vec::new();
        for response in member_responses(question, &members) {
            stats.response_count += 1;
            match response.status {
                ResponseStatus::Solved => {
                    stats.solved_count += 1;
                    if let Some(minutes) = response.time_taken_minutes {
                        times.push(minutes as f64);
                    }
                }
                ResponseStatus::Attempted => stats.attempted_count += 1,
                ResponseStatus::Skipped => stats.skipped_count += 1,
            }
        }

        let ratings: Vec<f64> = question
            .ratings
            .iter()
            .filter(|r| members.contains(&r.user_id))
            .map(|r| r.rating as f64)
            .collect();

        stats.rating_count = ratings.len() as u32;
        stats.solve_rate = ratio(stats.solved_count as u64, member_count as u64);
        stats.average_time_minutes = mean(&times);
        stats.average_difficulty_rating = mean(&ratings);
        stats
    }

    /// Aggregates for `user_id` within `group`. `None` when the user is not
    /// a current member.
    pub fn member_stats(
        &self,
        group: &Group,
        questions: &[Question],
        user_id: UserId,
        as_of: DateTime<Utc>,
    ) -> Option<MemberStats> {
        if !group.is_member(user_id) {
            return None;
        }

        let tally = Tally::collect(questions.iter(), user_id);
        let (current_streak, longest_streak) = streaks(&tally.solve_days, utc_day(&as_of));

        Some(MemberStats {
            user_id,
            question_count: questions.len() as u32,
            solved_count: tally.solved,
            attempted_count: tally.attempted,
            skipped_count: tally.skipped,
            solve_rate: ratio(tally.solved as u64, questions.len() as u64),
            average_time_minutes: mean(&tally.times),
            solved_by_difficulty: tally.by_difficulty,
            current_streak,
            longest_streak,
            last_solved_at: tally.last_solved_at,
        })
    }

    /// Rank every current member of `group`.
    ///
    /// Ordered by solved count (desc), average solve time (asc, members
    /// without a recorded time last), then username. Members with equal
    /// solved count and average time share a rank.
    #[instrument(skip_all, fields(group_id = %group.id))]
    pub fn leaderboard(
        &self,
        group: &Group,
        questions: &[Question],
        users: &HashMap<UserId, UserSummary>,
        as_of: DateTime<Utc>,
    ) -> Vec<LeaderboardEntry> {
        let today = utc_day(&as_of);

        let mut rows: Vec<LeaderboardEntry> = group
            .members
            .iter()
            .map(|member| {
                let tally = Tally::collect(questions.iter(), member.user_id);
                let (current_streak, _) = streaks(&tally.solve_days, today);
                let (username, display_name) = match users.get(&member.user_id) {
                    Some(summary) => (summary.username.clone(), summary.display_name.clone()),
                    None => (member.user_id.to_string(), String::new()),
                };
                LeaderboardEntry {
                    rank: 0,
                    user_id: member.user_id,
                    username,
                    display_name,
                    solved_count: tally.solved,
                    average_time_minutes: mean(&tally.times),
                    current_streak,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.solved_count
                .cmp(&a.solved_count)
                .then_with(|| compare_time(a.average_time_minutes, b.average_time_minutes))
                .then_with(|| a.username.cmp(&b.username))
        });

        for i in 0..rows.len() {
            rows[i].rank = if i > 0 && ties(&rows[i - 1], &rows[i]) {
                rows[i - 1].rank
            } else {
                i as u32 + 1
            };
        }

        debug!(members = rows.len(), "leaderboard ranked");
        rows
    }

    /// Daily solve counts for the `days` days ending on `as_of`, oldest
    /// first, each with the rolling mean over the configured window.
    ///
    /// The window reaches back past the start of the series, and always
    /// divides by the full window length.
    pub fn activity(
        &self,
        group: &Group,
        questions: &[Question],
        as_of: DateTime<Utc>,
        days: u32,
    ) -> Vec<ActivityPoint> {
        let members = member_set(group);
        let days = days.clamp(1, MAX_ACTIVITY_DAYS);
        let window = self.config.rolling_window_days.clamp(1, MAX_ACTIVITY_DAYS);

        let mut daily: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for question in questions {
            for response in member_responses(question, &members) {
                if let Some(solved_at) = response.solved_at.filter(|_| response.is_solved()) {
                    *daily.entry(utc_day(&solved_at)).or_default() += 1;
                }
            }
        }

        trailing_days(utc_day(&as_of), days)
            .into_iter()
            .map(|date| {
                let window_start = date
                    .checked_sub_signed(Duration::days(window as i64 - 1))
                    .unwrap_or(NaiveDate::MIN);
                let window_total: u32 = daily.range(window_start..=date).map(|(_, n)| *n).sum();
                ActivityPoint {
                    date,
                    solves: daily.get(&date).copied().unwrap_or(0),
                    rolling_average: window_total as f64 / window as f64,
                }
            })
            .collect()
    }

    /// Question counts and solve rates per difficulty level.
    pub fn difficulty_breakdown(
        &self,
        group: &Group,
        questions: &[Question],
    ) -> Vec<DifficultyBreakdown> {
        let members = member_set(group);
        let member_count = members.len() as u64;

        Difficulty::ALL
            .iter()
            .map(|&difficulty| {
                let matching: Vec<&Question> = questions
                    .iter()
                    .filter(|q| q.difficulty == difficulty)
                    .collect();
                let solved_responses: u32 = matching
                    .iter()
                    .map(|q| solved_by_members(q, &members))
                    .sum();
                DifficultyBreakdown {
                    difficulty,
                    question_count: matching.len() as u32,
                    solved_responses,
                    solve_rate: ratio(
                        solved_responses as u64,
                        matching.len() as u64 * member_count,
                    ),
                }
            })
            .collect()
    }

    /// Everything shown on a group's statistics page.
    #[instrument(skip_all, fields(group_id = %group.id, questions = questions.len()))]
    pub fn group_overview(
        &self,
        group: &Group,
        questions: &[Question],
        users: &HashMap<UserId, UserSummary>,
        as_of: DateTime<Utc>,
    ) -> GroupOverview {
        let members = member_set(group);
        let member_count = members.len() as u32;

        let per_question: Vec<(&Question, QuestionStats)> = questions
            .iter()
            .map(|q| (q, self.question_stats(group, q)))
            .collect();

        let total_solves: u32 = per_question.iter().map(|(_, s)| s.solved_count).sum();

        let most_solved_question = per_question
            .iter()
            .max_by(|(qa, a), (qb, b)| {
                a.solve_rate
                    .total_cmp(&b.solve_rate)
                    .then_with(|| qa.created_at.cmp(&qb.created_at))
            })
            .map(|(q, s)| highlight(q, s));

        let hardest_question = per_question
            .iter()
            .filter(|(_, s)| s.average_difficulty_rating.is_some())
            .max_by(|(qa, a), (qb, b)| {
                let rating_a = a.average_difficulty_rating.unwrap_or_default();
                let rating_b = b.average_difficulty_rating.unwrap_or_default();
                rating_a
                    .total_cmp(&rating_b)
                    .then_with(|| b.solve_rate.total_cmp(&a.solve_rate))
                    .then_with(|| qa.created_at.cmp(&qb.created_at))
            })
            .map(|(q, s)| highlight(q, s));

        GroupOverview {
            group_id: group.id,
            member_count,
            question_count: questions.len() as u32,
            total_solves,
            overall_solve_rate: ratio(
                total_solves as u64,
                questions.len() as u64 * member_count as u64,
            ),
            most_solved_question,
            hardest_question,
            difficulty_breakdown: self.difficulty_breakdown(group, questions),
            activity: self.activity(group, questions, as_of, self.activity_days(None)),
            leaderboard: self.leaderboard(group, questions, users, as_of),
        }
    }

    /// Aggregates for `user_id` across the given groups. Groups the user is
    /// not a current member of, and questions outside those groups, are
    /// ignored.
    pub fn user_stats(
        &self,
        user_id: UserId,
        groups: &[Group],
        questions: &[Question],
        as_of: DateTime<Utc>,
    ) -> UserStats {
        let group_ids: HashSet<_> = groups
            .iter()
            .filter(|g| g.is_member(user_id))
            .map(|g| g.id)
            .collect();

        let tally = Tally::collect(
            questions.iter().filter(|q| group_ids.contains(&q.group_id)),
            user_id,
        );
        let (current_streak, longest_streak) = streaks(&tally.solve_days, utc_day(&as_of));

        UserStats {
            user_id,
            groups: group_ids.len() as u32,
            solved_count: tally.solved,
            attempted_count: tally.attempted,
            average_time_minutes: mean(&tally.times),
            solved_by_difficulty: tally.by_difficulty,
            current_streak,
            longest_streak,
        }
    }
}

/// One user's responses folded over a set of questions
#[derive(Default)]
struct Tally {
    solved: u32,
    attempted: u32,
    skipped: u32,
    times: Vec<f64>,
    by_difficulty: DifficultyCounts,
    solve_days: BTreeSet<NaiveDate>,
    last_solved_at: Option<DateTime<Utc>>,
}

impl Tally {
    fn collect<'a>(questions: impl Iterator<Item = &'a Question>, user_id: UserId) -> Self {
        let mut tally = Self::default();
        for question in questions {
            let Some(response) = question.response_of(user_id) else {
                continue;
            };
            match response.status {
                ResponseStatus::Solved => {
                    tally.solved += 1;
                    tally.by_difficulty.increment(question.difficulty);
                    if let Some(minutes) = response.time_taken_minutes {
                        tally.times.push(minutes as f64);
                    }
                    if let Some(solved_at) = response.solved_at {
                        tally.solve_days.insert(utc_day(&solved_at));
                        tally.last_solved_at = tally.last_solved_at.max(Some(solved_at));
                    }
                }
                ResponseStatus::Attempted => tally.attempted += 1,
                ResponseStatus::Skipped => tally.skipped += 1,
            }
        }
        tally
    }
}

fn member_set(group: &Group) -> HashSet<UserId> {
    group.members.iter().map(|m| m.user_id).collect()
}

fn member_responses<'a>(
    question: &'a Question,
    members: &'a HashSet<UserId>,
) -> impl Iterator<Item = &'a MemberResponse> + 'a {
    question
        .responses
        .iter()
        .filter(move |r| members.contains(&r.user_id))
}

fn solved_by_members(question: &Question, members: &HashSet<UserId>) -> u32 {
    member_responses(question, members)
        .filter(|r| r.is_solved())
        .count() as u32
}

fn highlight(question: &Question, stats: &QuestionStats) -> QuestionHighlight {
    QuestionHighlight {
        question_id: question.id,
        title: question.title.clone(),
        difficulty: question.difficulty,
        solve_rate: stats.solve_rate,
        average_difficulty_rating: stats.average_difficulty_rating,
    }
}

/// `(current, longest)` runs of consecutive solve days. The current run
/// must end today or yesterday.
fn streaks(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> (u32, u32) {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for &day in days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    let yesterday = today - Duration::days(1);
    let mut cursor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return (0, longest);
    };

    let mut current = 0;
    while days.contains(&cursor) {
        current += 1;
        cursor = cursor - Duration::days(1);
    }
    (current, longest)
}

/// Known times first, ascending.
fn compare_time(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn ties(a: &LeaderboardEntry, b: &LeaderboardEntry) -> bool {
    a.solved_count == b.solved_count
        && compare_time(a.average_time_minutes, b.average_time_minutes) == Ordering::Equal
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use studyhub_domain::{GroupRole, Platform, ResponseInput, User};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    struct Fixture {
        group: Group,
        users: Vec<User>,
    }

    impl Fixture {
        fn new(names: &[&str]) -> Self {
            let users: Vec<User> = names
                .iter()
                .map(|n| User::new(format!("{}@example.com", n), *n, *n, "hash"))
                .collect();
            let mut group = Group::new("Grind", "", users[0].id, "ABCDEFGH");
            for user in &users[1..] {
                group.add_member(user.id, GroupRole::Member, 50).unwrap();
            }
            Self { group, users }
        }

        fn id(&self, index: usize) -> UserId {
            self.users[index].id
        }

        fn question(&self, difficulty: Difficulty, created_day: u32) -> Question {
            let mut q = Question::new(
                self.group.id,
                self.users[0].id,
                format!("{:?} {}", difficulty, created_day),
                Platform::Leetcode,
                difficulty,
            );
            q.created_at = at(created_day, 0);
            q
        }

        fn summaries(&self) -> HashMap<UserId, UserSummary> {
            self.users.iter().map(|u| (u.id, u.summary())).collect()
        }
    }

    fn respond(q: &mut Question, user: UserId, status: ResponseStatus, minutes: Option<u32>, when: DateTime<Utc>) {
        q.upsert_response(
            user,
            ResponseInput {
                status,
                time_taken_minutes: minutes,
                notes: None,
            },
            when,
        );
    }

    #[test]
    fn test_question_stats_counts_current_members_only() {
        let mut fx = Fixture::new(&["ana", "ben", "cy"]);
        let mut q = fx.question(Difficulty::Medium, 1);
        respond(&mut q, fx.id(0), ResponseStatus::Solved, Some(20), at(2, 9));
        respond(&mut q, fx.id(1), ResponseStatus::Solved, None, at(2, 10));
        respond(&mut q, fx.id(2), ResponseStatus::Attempted, None, at(2, 11));
        q.upsert_rating(fx.id(0), 4, at(2, 9)).unwrap();
        q.upsert_rating(fx.id(2), 2, at(2, 11)).unwrap();

        let engine = StatsEngine::default();
        let stats = engine.question_stats(&fx.group, &q);
        assert_eq!(stats.member_count, 3);
        assert_eq!(stats.solved_count, 2);
        assert_eq!(stats.attempted_count, 1);
        assert!((stats.solve_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.average_time_minutes, Some(20.0));
        assert_eq!(stats.average_difficulty_rating, Some(3.0));

        // cy leaves; their attempt and rating drop out
        fx.group.remove_member(fx.id(2)).unwrap();
        let stats = engine.question_stats(&fx.group, &q);
        assert_eq!(stats.response_count, 2);
        assert_eq!(stats.attempted_count, 0);
        assert_eq!(stats.solve_rate, 1.0);
        assert_eq!(stats.average_difficulty_rating, Some(4.0));
        assert_eq!(stats.rating_count, 1);
    }

    #[test]
    fn test_question_stats_without_members_or_responses() {
        let fx = Fixture::new(&["ana"]);
        let q = fx.question(Difficulty::Easy, 1);
        let stats = StatsEngine::default().question_stats(&fx.group, &q);
        assert_eq!(stats.solve_rate, 0.0);
        assert_eq!(stats.average_time_minutes, None);
        assert_eq!(stats.average_difficulty_rating, None);
    }

    #[test]
    fn test_streaks() {
        let days: BTreeSet<NaiveDate> = [1, 2, 3, 5, 6, 9, 10].into_iter().map(date).collect();

        assert_eq!(streaks(&days, date(10)), (2, 3));
        assert_eq!(streaks(&days, date(11)), (2, 3));
        assert_eq!(streaks(&days, date(12)), (0, 3));
        assert_eq!(streaks(&days, date(7)), (2, 3));
        assert_eq!(streaks(&BTreeSet::new(), date(1)), (0, 0));
    }

    #[test]
    fn test_streak_uses_utc_day_boundaries() {
        let fx = Fixture::new(&["ana"]);
        let mut q1 = fx.question(Difficulty::Easy, 1);
        let mut q2 = fx.question(Difficulty::Easy, 1);
        respond(&mut q1, fx.id(0), ResponseStatus::Solved, None, at(3, 23));
        respond(&mut q2, fx.id(0), ResponseStatus::Solved, None, at(4, 0));

        let stats = StatsEngine::default()
            .member_stats(&fx.group, &[q1, q2], fx.id(0), at(4, 12))
            .unwrap();
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
        assert_eq!(stats.last_solved_at, Some(at(4, 0)));
    }

    #[test]
    fn test_member_stats() {
        let fx = Fixture::new(&["ana", "ben"]);
        let mut easy = fx.question(Difficulty::Easy, 1);
        let mut hard = fx.question(Difficulty::Hard, 1);
        let medium = fx.question(Difficulty::Medium, 1);
        respond(&mut easy, fx.id(1), ResponseStatus::Solved, Some(10), at(2, 8));
        respond(&mut hard, fx.id(1), ResponseStatus::Solved, Some(50), at(3, 8));

        let questions = vec![easy, hard, medium];
        let engine = StatsEngine::default();
        let stats = engine
            .member_stats(&fx.group, &questions, fx.id(1), at(3, 20))
            .unwrap();
        assert_eq!(stats.solved_count, 2);
        assert_eq!(stats.question_count, 3);
        assert!((stats.solve_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.average_time_minutes, Some(30.0));
        assert_eq!(stats.solved_by_difficulty.easy, 1);
        assert_eq!(stats.solved_by_difficulty.hard, 1);
        assert_eq!(stats.solved_by_difficulty.medium, 0);
        assert_eq!(stats.current_streak, 2);

        assert!(engine
            .member_stats(&fx.group, &questions, UserId::new(), at(3, 20))
            .is_none());
    }

    #[test]
    fn test_leaderboard_ordering_and_competition_ranks() {
        let fx = Fixture::new(&["dee", "ana", "ben", "cy"]);
        let mut q1 = fx.question(Difficulty::Easy, 1);
        let mut q2 = fx.question(Difficulty::Easy, 1);

        // dee: 2 solves, avg 15. ana and ben: 1 solve, avg 10 each. cy: 1 solve, no time.
        respond(&mut q1, fx.id(0), ResponseStatus::Solved, Some(10), at(2, 8));
        respond(&mut q2, fx.id(0), ResponseStatus::Solved, Some(20), at(2, 9));
        respond(&mut q1, fx.id(2), ResponseStatus::Solved, Some(10), at(2, 8));
        respond(&mut q1, fx.id(1), ResponseStatus::Solved, Some(10), at(2, 8));
        respond(&mut q1, fx.id(3), ResponseStatus::Solved, None, at(2, 8));

        let board = StatsEngine::default().leaderboard(
            &fx.group,
            &[q1, q2],
            &fx.summaries(),
            at(2, 12),
        );

        let order: Vec<(&str, u32)> = board.iter().map(|e| (e.username.as_str(), e.rank)).collect();
        assert_eq!(order, vec![("dee", 1), ("ana", 2), ("ben", 2), ("cy", 4)]);
        assert_eq!(board[0].average_time_minutes, Some(15.0));
        assert_eq!(board[3].average_time_minutes, None);
    }

    #[test]
    fn test_leaderboard_members_without_activity_tie() {
        let fx = Fixture::new(&["bo", "al"]);
        let board = StatsEngine::default().leaderboard(&fx.group, &[], &fx.summaries(), at(1, 0));
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].username, "al");
        assert!(board.iter().all(|e| e.rank == 1));
    }

    #[test]
    fn test_activity_rolling_average_reaches_before_series() {
        let fx = Fixture::new(&["ana", "ben"]);
        let mut q1 = fx.question(Difficulty::Easy, 1);
        let mut q2 = fx.question(Difficulty::Easy, 1);
        let mut q3 = fx.question(Difficulty::Easy, 1);
        respond(&mut q1, fx.id(0), ResponseStatus::Solved, None, at(6, 8));
        respond(&mut q1, fx.id(1), ResponseStatus::Solved, None, at(8, 8));
        respond(&mut q2, fx.id(0), ResponseStatus::Solved, None, at(9, 8));
        respond(&mut q3, fx.id(0), ResponseStatus::Attempted, None, at(9, 9));

        let engine = StatsEngine::new(StatsConfig {
            rolling_window_days: 3,
            activity_days: 30,
        });
        let series = engine.activity(&fx.group, &[q1, q2, q3], at(9, 20), 2);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, date(8));
        assert_eq!(series[0].solves, 1);
        // window 6..=8 holds 2 solves
        assert!((series[0].rolling_average - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(series[1].date, date(9));
        assert_eq!(series[1].solves, 1);
        assert!((series[1].rolling_average - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_activity_with_oversized_rolling_window() {
        let fx = Fixture::new(&["ana"]);
        let mut q = fx.question(Difficulty::Easy, 1);
        respond(&mut q, fx.id(0), ResponseStatus::Solved, None, at(2, 8));

        let engine = StatsEngine::new(StatsConfig {
            rolling_window_days: u32::MAX,
            activity_days: 30,
        });
        let series = engine.activity(&fx.group, &[q], at(3, 12), 2);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].solves, 1);
        // window is capped at a year
        let expected = 1.0 / MAX_ACTIVITY_DAYS as f64;
        assert!((series[1].rolling_average - expected).abs() < 1e-9);
    }

    #[test]
    fn test_activity_days_clamped() {
        let engine = StatsEngine::default();
        assert_eq!(engine.activity_days(None), 30);
        assert_eq!(engine.activity_days(Some(0)), 1);
        assert_eq!(engine.activity_days(Some(9999)), MAX_ACTIVITY_DAYS);

        let fx = Fixture::new(&["ana"]);
        assert_eq!(engine.activity(&fx.group, &[], at(1, 0), 0).len(), 1);
    }

    #[test]
    fn test_group_overview() {
        let fx = Fixture::new(&["ana", "ben"]);
        let mut older = fx.question(Difficulty::Easy, 1);
        let mut newer = fx.question(Difficulty::Easy, 2);
        let mut hard = fx.question(Difficulty::Hard, 3);

        for q in [&mut older, &mut newer] {
            respond(q, fx.id(0), ResponseStatus::Solved, Some(5), at(4, 8));
            respond(q, fx.id(1), ResponseStatus::Solved, Some(7), at(4, 9));
        }
        respond(&mut hard, fx.id(0), ResponseStatus::Solved, None, at(4, 10));
        hard.upsert_rating(fx.id(0), 5, at(4, 10)).unwrap();
        older.upsert_rating(fx.id(1), 5, at(4, 10)).unwrap();

        let newer_id = newer.id;
        let hard_id = hard.id;
        let overview = StatsEngine::default().group_overview(
            &fx.group,
            &[older, newer, hard],
            &fx.summaries(),
            at(4, 12),
        );

        assert_eq!(overview.member_count, 2);
        assert_eq!(overview.question_count, 3);
        assert_eq!(overview.total_solves, 5);
        assert!((overview.overall_solve_rate - 5.0 / 6.0).abs() < 1e-9);
        assert_eq!(overview.most_solved_question.unwrap().question_id, newer_id);
        // both rated 5; the hard question has the lower solve rate
        assert_eq!(overview.hardest_question.unwrap().question_id, hard_id);

        let easy = &overview.difficulty_breakdown[0];
        assert_eq!(easy.difficulty, Difficulty::Easy);
        assert_eq!(easy.question_count, 2);
        assert_eq!(easy.solved_responses, 4);
        assert_eq!(easy.solve_rate, 1.0);
        assert_eq!(overview.difficulty_breakdown[1].solve_rate, 0.0);

        assert_eq!(overview.activity.len(), 30);
        assert_eq!(overview.activity.last().unwrap().solves, 5);
        assert_eq!(overview.leaderboard[0].username, "ana");
    }

    #[test]
    fn test_group_overview_empty_group() {
        let fx = Fixture::new(&["ana"]);
        let overview =
            StatsEngine::default().group_overview(&fx.group, &[], &fx.summaries(), at(1, 0));
        assert_eq!(overview.overall_solve_rate, 0.0);
        assert!(overview.most_solved_question.is_none());
        assert!(overview.hardest_question.is_none());
    }

    #[test]
    fn test_user_stats_across_groups() {
        let fx = Fixture::new(&["ana", "ben"]);
        let other = Fixture::new(&["ana2"]);
        let mut other_group = other.group.clone();
        other_group.add_member(fx.id(1), GroupRole::Member, 50).unwrap();

        let mut q1 = fx.question(Difficulty::Easy, 1);
        respond(&mut q1, fx.id(1), ResponseStatus::Solved, Some(12), at(5, 8));

        let mut q2 = Question::new(other_group.id, other.id(0), "Elsewhere", Platform::Other, Difficulty::Hard);
        respond(&mut q2, fx.id(1), ResponseStatus::Solved, Some(30), at(6, 8));

        let mut q3 = Question::new(other_group.id, other.id(0), "Tried", Platform::Other, Difficulty::Medium);
        respond(&mut q3, fx.id(1), ResponseStatus::Attempted, None, at(6, 9));

        let stray_group = Fixture::new(&["zed"]);
        let mut q4 = stray_group.question(Difficulty::Easy, 1);
        respond(&mut q4, fx.id(1), ResponseStatus::Solved, None, at(6, 9));

        let stats = StatsEngine::default().user_stats(
            fx.id(1),
            &[fx.group.clone(), other_group, stray_group.group.clone()],
            &[q1, q2, q3, q4],
            at(6, 20),
        );
        assert_eq!(stats.groups, 2);
        assert_eq!(stats.solved_count, 2);
        assert_eq!(stats.attempted_count, 1);
        assert_eq!(stats.average_time_minutes, Some(21.0));
        assert_eq!(stats.solved_by_difficulty.total(), 2);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }
}
