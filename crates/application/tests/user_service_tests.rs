//! Tests for the user service
//!
//! Registration, login, profile updates and account deletion.

mod common;

use common::Harness;
use studyhub_application::services::ServiceContext;
use studyhub_application::validation::{
    ChangePasswordRequest, CreateGroupRequest, LoginRequest, RegisterRequest,
    UpdateProfileRequest,
};
use studyhub_application::ApplicationError;
use studyhub_domain::UserRole;
use studyhub_testing::fixtures::TEST_PASSWORD;

fn anonymous() -> ServiceContext {
    ServiceContext::anonymous("test")
}

fn register_request(email: &str, username: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        username: username.to_string(),
        display_name: "Ada Lovelace".to_string(),
        password: TEST_PASSWORD.to_string(),
    }
}

#[tokio::test]
async fn test_register_lowercases_email_and_defaults_role() {
    let h = Harness::new();
    let user = h
        .users
        .register(&anonymous(), register_request("Ada@Example.COM", "ada_l"))
        .await
        .unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.username, "ada_l");
    assert_eq!(user.role, UserRole::Member);
    assert!(user.last_login_at.is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicates() {
    let h = Harness::new();
    h.users
        .register(&anonymous(), register_request("ada@example.com", "ada_l"))
        .await
        .unwrap();

    let err = h
        .users
        .register(&anonymous(), register_request("ADA@example.com", "other"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Conflict(_)));

    let err = h
        .users
        .register(&anonymous(), register_request("grace@example.com", "ADA_L"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Conflict(_)));
}

#[tokio::test]
async fn test_register_validates_input() {
    let h = Harness::new();
    let mut request = register_request("not-an-email", "9lives");
    request.password = "short".to_string();

    let err = h.users.register(&anonymous(), request).await.unwrap_err();
    assert_eq!(err.http_status(), 422);
}

#[tokio::test]
async fn test_login_checks_credentials() {
    let h = Harness::new();
    let (user, _) = h.register().await;

    let logged_in = h
        .users
        .login(
            &anonymous(),
            LoginRequest {
                email: user.email.to_uppercase(),
                password: TEST_PASSWORD.to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(logged_in.id, user.id);
    assert!(logged_in.last_login_at.is_some());

    let err = h
        .users
        .login(
            &anonymous(),
            LoginRequest {
                email: user.email.clone(),
                password: "wrong-password-1".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 401);

    let err = h
        .users
        .login(
            &anonymous(),
            LoginRequest {
                email: "nobody@example.com".to_string(),
                password: TEST_PASSWORD.to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 401);
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let h = Harness::new();
    let err = h.users.me(&anonymous()).await.unwrap_err();
    assert_eq!(err.http_status(), 401);

    let (user, ctx) = h.register().await;
    assert_eq!(h.users.me(&ctx).await.unwrap().id, user.id);
}

#[tokio::test]
async fn test_public_profile() {
    let h = Harness::new();
    let (user, _) = h.register().await;
    let (_, viewer) = h.register().await;

    let profile = h.users.get_user(&viewer, user.id).await.unwrap();
    assert_eq!(profile.username, user.username);

    let err = h
        .users
        .get_user(&viewer, studyhub_domain::UserId::new())
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn test_update_profile_trims_display_name() {
    let h = Harness::new();
    let (_, ctx) = h.register().await;

    let updated = h
        .users
        .update_profile(
            &ctx,
            UpdateProfileRequest {
                display_name: Some("  Grace Hopper ".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.display_name, "Grace Hopper");
}

#[tokio::test]
async fn test_change_password() {
    let h = Harness::new();
    let (user, ctx) = h.register().await;

    let err = h
        .users
        .change_password(
            &ctx,
            ChangePasswordRequest {
                current_password: "not-my-password-1".to_string(),
                new_password: "brand-new-pass-2".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 401);

    h.users
        .change_password(
            &ctx,
            ChangePasswordRequest {
                current_password: TEST_PASSWORD.to_string(),
                new_password: "brand-new-pass-2".to_string(),
            },
        )
        .await
        .unwrap();

    let login = |password: &str| LoginRequest {
        email: user.email.clone(),
        password: password.to_string(),
    };
    assert!(h.users.login(&anonymous(), login(TEST_PASSWORD)).await.is_err());
    assert!(h
        .users
        .login(&anonymous(), login("brand-new-pass-2"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_delete_account_refused_while_owning_groups() {
    let h = Harness::new();
    let (_, owner) = h.register().await;
    h.create_group(&owner, "Owned").await;

    let err = h.users.delete_account(&owner).await.unwrap_err();
    assert_eq!(err.http_status(), 409);
}

#[tokio::test]
async fn test_delete_account_leaves_groups() {
    let h = Harness::new();
    let (group, owner, members) = h.group_with_members(1).await;
    let member = &members[0];

    h.users.delete_account(member).await.unwrap();

    let listed = h.groups.list_members(&owner, group.id).await.unwrap();
    assert_eq!(listed.len(), 1);

    let err = h.users.me(member).await.unwrap_err();
    assert_eq!(err.http_status(), 401);
}

#[tokio::test]
async fn test_deleted_account_cannot_join_or_create_groups() {
    let h = Harness::new();
    let (_, owner) = h.register().await;
    let group = h.create_group(&owner, "Sliding Window").await;
    let (_, former) = h.register().await;

    h.users.delete_account(&former).await.unwrap();

    let err = h.join(&former, &group).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Unauthorized(_)));

    let err = h
        .groups
        .create_group(
            &former,
            CreateGroupRequest {
                name: "Orphaned".to_string(),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 401);

    let refreshed = h.groups.get_group(&owner, group.id).await.unwrap();
    assert_eq!(refreshed.member_count, 1);
    let leaderboard = h.stats.group_leaderboard(&owner, group.id).await.unwrap();
    assert_eq!(leaderboard.len(), 1);
}
