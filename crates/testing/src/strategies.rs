//! Proptest strategies for domain enums and response sets.

use proptest::prelude::*;
use studyhub_domain::{Difficulty, MemberResponse, ResponseStatus, UserId};

use crate::builders::ResponseBuilder;
use crate::fixtures::days_ago;

pub fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Medium),
        Just(Difficulty::Hard),
    ]
}

pub fn arb_status() -> impl Strategy<Value = ResponseStatus> {
    prop_oneof![
        Just(ResponseStatus::Solved),
        Just(ResponseStatus::Attempted),
        Just(ResponseStatus::Skipped),
    ]
}

/// A response by `user_id` with a status, an optional time and an age in
/// days between 0 and 59.
pub fn arb_response(user_id: UserId) -> impl Strategy<Value = MemberResponse> {
    (arb_status(), proptest::option::of(1u32..300), 0i64..60).prop_map(
        move |(status, minutes, age)| {
            let builder = ResponseBuilder::new(user_id).solved_at(days_ago(age));
            let builder = match status {
                ResponseStatus::Solved => builder,
                ResponseStatus::Attempted => builder.attempted(),
                ResponseStatus::Skipped => builder.skipped(),
            };
            match minutes {
                Some(m) => builder.with_time(m).build(),
                None => builder.build(),
            }
        },
    )
}
