//! End-to-end token lifecycle tests against the in-memory cache.
//!
//! Time is driven by a manual clock shared by the service and the cache, so
//! token expiry and ledger TTLs move together without sleeping.

use std::sync::Arc;
use std::time::Duration;

use scoutvision_auth::storage::keys::{refresh_token_key, revoked_token_key};
use scoutvision_auth::{
    AuthConfig, AuthError, AuthResponse, AuthService, ManualClock, MemoryRevocationCache,
    RevocationCache, SubjectClaims,
};

const SECRET: &str = "scoutvision-test-secret-0123456789abcdef";

struct Harness {
    service: AuthService,
    cache: Arc<MemoryRevocationCache>,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::starting_now());
    let cache = Arc::new(MemoryRevocationCache::with_clock(clock.clone()));
    let service =
        AuthService::with_clock(AuthConfig::with_secret(SECRET), cache.clone(), clock.clone())
            .expect("service");
    Harness {
        service,
        cache,
        clock,
    }
}

fn scout_claims() -> SubjectClaims {
    SubjectClaims::new(["User"], "default", "Scouting")
}

#[tokio::test]
async fn test_access_token_valid_until_expiry() {
    let h = harness();
    let pair = h
        .service
        .authenticate("scout-42", &scout_claims())
        .await
        .unwrap();

    h.clock.advance(Duration::from_secs(1));
    assert!(h.service.validate(&pair.access_token).await);

    h.clock.advance(Duration::from_secs(3600));
    assert!(!h.service.validate(&pair.access_token).await);
}

#[tokio::test]
async fn test_refresh_is_single_use() {
    let h = harness();
    let pair = h
        .service
        .authenticate("scout-42", &scout_claims())
        .await
        .unwrap();

    let rotated = h
        .service
        .refresh(&pair.refresh_token, "scout-42")
        .await
        .unwrap();
    assert_ne!(rotated.refresh_token, pair.refresh_token);
    assert!(h.service.validate(&rotated.access_token).await);

    let replay = h.service.refresh(&pair.refresh_token, "scout-42").await;
    assert!(matches!(replay, Err(AuthError::RefreshTokenInvalid)));

    assert!(
        !h.cache
            .exists(&refresh_token_key("scout-42", &pair.refresh_token))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_refresh_token_expires_with_ttl() {
    let h = harness();
    let pair = h
        .service
        .authenticate("scout-42", &scout_claims())
        .await
        .unwrap();

    h.clock.advance(Duration::from_secs(604_799));
    assert!(
        h.cache
            .exists(&refresh_token_key("scout-42", &pair.refresh_token))
            .await
            .unwrap()
    );

    h.clock.advance(Duration::from_secs(1));
    assert!(matches!(
        h.service.refresh(&pair.refresh_token, "scout-42").await,
        Err(AuthError::RefreshTokenInvalid)
    ));
}

#[tokio::test]
async fn test_revoke_then_validate_is_false() {
    let h = harness();
    let pair = h
        .service
        .authenticate("scout-42", &scout_claims())
        .await
        .unwrap();

    h.service.revoke(&pair.access_token).await.unwrap();
    assert!(!h.service.validate(&pair.access_token).await);
    assert!(matches!(
        h.service.check(&pair.access_token).await,
        Err(AuthError::TokenRevoked)
    ));
}

#[tokio::test]
async fn test_revocation_entry_disappears_at_expiry() {
    let h = harness();
    let pair = h
        .service
        .authenticate("scout-42", &scout_claims())
        .await
        .unwrap();
    let key = revoked_token_key(&pair.access_token);

    h.clock.advance(Duration::from_secs(1200));
    h.service.revoke(&pair.access_token).await.unwrap();
    assert_eq!(h.cache.ttl(&key), Some(Duration::from_secs(2400)));

    h.clock.advance(Duration::from_secs(2400));
    assert!(!h.cache.exists(&key).await.unwrap());
    // Past exp the token is rejected on expiry alone.
    assert!(!h.service.validate(&pair.access_token).await);
}

#[tokio::test]
async fn test_revoking_expired_token_writes_nothing() {
    let h = harness();
    let pair = h
        .service
        .authenticate("scout-42", &scout_claims())
        .await
        .unwrap();

    h.clock.advance(Duration::from_secs(3601));
    h.service.revoke(&pair.access_token).await.unwrap();

    assert!(
        !h.cache
            .exists(&revoked_token_key(&pair.access_token))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_claims_survive_round_trip() {
    let h = harness();
    let claims = SubjectClaims::new(["Coach", "Analyst"], "club-7", "Analytics");
    let pair = h.service.authenticate("scout-42", &claims).await.unwrap();

    let decoded = h.service.check(&pair.access_token).await.unwrap();
    assert_eq!(decoded.sub, "scout-42");
    assert_eq!(decoded.subject_claims(), claims);
    assert_eq!(decoded.exp - decoded.iat, 3600);
    assert_eq!(decoded.expires_at(), pair.expires_at);
}

#[tokio::test]
async fn test_tokens_issued_in_same_second_differ() {
    let h = harness();
    let a = h
        .service
        .authenticate("scout-42", &scout_claims())
        .await
        .unwrap();
    let b = h
        .service
        .authenticate("scout-42", &scout_claims())
        .await
        .unwrap();

    assert_ne!(a.access_token, b.access_token);
    assert_ne!(a.refresh_token, b.refresh_token);

    // Revoking one leaves the other untouched.
    h.service.revoke(&a.access_token).await.unwrap();
    assert!(!h.service.validate(&a.access_token).await);
    assert!(h.service.validate(&b.access_token).await);
}

#[tokio::test]
async fn test_refresh_with_expired_access_token() {
    let h = harness();
    let claims = SubjectClaims::new(["Coach"], "club-7", "Scouting");
    let pair = h.service.authenticate("scout-42", &claims).await.unwrap();

    h.clock.advance(Duration::from_secs(3601));
    assert!(!h.service.validate(&pair.access_token).await);

    let rotated = h
        .service
        .refresh_with_access_token(&pair.access_token, &pair.refresh_token)
        .await
        .unwrap();
    let decoded = h.service.check(&rotated.access_token).await.unwrap();
    assert_eq!(decoded.subject_claims(), claims);
}

#[tokio::test]
async fn test_failure_envelope_hides_reason() {
    let h = harness();
    let pair = h
        .service
        .authenticate("scout-42", &scout_claims())
        .await
        .unwrap();
    h.service.revoke(&pair.access_token).await.unwrap();

    let revoked = h.service.check(&pair.access_token).await.unwrap_err();
    let garbage = h.service.check("not.a.token").await.unwrap_err();

    let a = serde_json::to_string(&AuthResponse::failure(&revoked)).unwrap();
    let b = serde_json::to_string(&AuthResponse::failure(&garbage)).unwrap();
    assert_eq!(a, b);
}
