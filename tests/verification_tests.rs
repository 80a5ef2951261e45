mod common;

use common::{sample_property, TestCore};
use indowater::domain::policy::Role;
use indowater::domain::property::{PropertyStatus, VerificationDecision};
use indowater::error::CoreError;

#[tokio::test]
async fn test_submission_enters_pending_and_approval_is_terminal() {
    let core = TestCore::new();
    let customer = core.seed_user("budi", Role::Customer).await;
    let admin = core.seed_user("admin", Role::Admin).await;

    let property = core
        .verification
        .submit(customer, sample_property("Rumah Budi"))
        .await
        .unwrap();
    assert_eq!(property.status, PropertyStatus::Pending);

    let approved = core
        .verification
        .decide(admin, property.id, VerificationDecision::Approved, None)
        .await
        .unwrap();
    assert_eq!(approved.status, PropertyStatus::Approved);
    assert_eq!(approved.verified_by, Some(admin.user_id));

    // Already terminal: a later rejection must fail Conflict.
    let again = core
        .verification
        .decide(
            admin,
            property.id,
            VerificationDecision::Rejected,
            Some("changed my mind".into()),
        )
        .await;
    assert!(matches!(again, Err(CoreError::Conflict(_))));
}

#[tokio::test]
async fn test_customer_cannot_decide() {
    let core = TestCore::new();
    let customer = core.seed_user("budi", Role::Customer).await;
    let property = core
        .verification
        .submit(customer, sample_property("Rumah Budi"))
        .await
        .unwrap();

    let result = core
        .verification
        .decide(customer, property.id, VerificationDecision::Approved, None)
        .await;
    assert!(matches!(result, Err(CoreError::Authorization(_))));
}

#[tokio::test]
async fn test_rejection_requires_note() {
    let core = TestCore::new();
    let customer = core.seed_user("budi", Role::Customer).await;
    let admin = core.seed_user("admin", Role::Admin).await;
    let property = core
        .verification
        .submit(customer, sample_property("Rumah Budi"))
        .await
        .unwrap();

    for note in [None, Some("".to_string()), Some("   ".to_string())] {
        let result = core
            .verification
            .decide(admin, property.id, VerificationDecision::Rejected, note)
            .await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    // Still pending, so a rejection with rationale goes through.
    let rejected = core
        .verification
        .decide(
            admin,
            property.id,
            VerificationDecision::Rejected,
            Some("address does not exist".into()),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, PropertyStatus::Rejected);
    assert_eq!(
        rejected.verification_note.as_deref(),
        Some("address does not exist")
    );
}

#[tokio::test]
async fn test_rejected_property_is_resubmitted_as_new_entity() {
    let core = TestCore::new();
    let customer = core.seed_user("budi", Role::Customer).await;
    let other = core.seed_user("siti", Role::Customer).await;
    let admin = core.seed_user("admin", Role::Admin).await;

    let property = core
        .verification
        .submit(customer, sample_property("Rumah Budi"))
        .await
        .unwrap();
    core.verification
        .decide(
            admin,
            property.id,
            VerificationDecision::Rejected,
            Some("blurred documents".into()),
        )
        .await
        .unwrap();

    assert!(matches!(
        core.verification.resubmit(other, property.id).await,
        Err(CoreError::Authorization(_))
    ));

    let fresh = core.verification.resubmit(customer, property.id).await.unwrap();
    assert_ne!(fresh.id, property.id);
    assert_eq!(fresh.status, PropertyStatus::Pending);

    // The rejected original is retained for audit.
    let audit = core.verification.property(admin, property.id).await.unwrap();
    assert_eq!(audit.status, PropertyStatus::Rejected);

    // Resubmitting a non-rejected property is a conflict.
    assert!(matches!(
        core.verification.resubmit(customer, fresh.id).await,
        Err(CoreError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_meter_registration_requires_approved_property() {
    let core = TestCore::new();
    let customer = core.seed_user("budi", Role::Customer).await;
    let admin = core.seed_user("admin", Role::Admin).await;

    let property = core
        .verification
        .submit(customer, sample_property("Rumah Budi"))
        .await
        .unwrap();

    let early = core
        .registry
        .register(customer, property.id, "MTR-001", "front yard")
        .await;
    assert!(matches!(early, Err(CoreError::Conflict(_))));

    core.verification
        .decide(admin, property.id, VerificationDecision::Approved, None)
        .await
        .unwrap();

    let meter = core
        .registry
        .register(customer, property.id, "MTR-001", "front yard")
        .await
        .unwrap();
    assert_eq!(meter.balance, 0);

    // Duplicate meter numbers are rejected.
    let duplicate = core
        .registry
        .register(customer, property.id, "MTR-001", "back yard")
        .await;
    assert!(matches!(duplicate, Err(CoreError::Conflict(_))));
}

#[tokio::test]
async fn test_meter_registration_on_foreign_property_denied() {
    let core = TestCore::new();
    let customer = core.seed_user("budi", Role::Customer).await;
    let other = core.seed_user("siti", Role::Customer).await;
    let admin = core.seed_user("admin", Role::Admin).await;

    let property_id = core.approved_property(customer, admin).await;
    let result = core
        .registry
        .register(other, property_id, "MTR-002", "side wall")
        .await;
    assert!(matches!(result, Err(CoreError::Authorization(_))));
}

#[tokio::test]
async fn test_property_reads_are_permission_gated() {
    let core = TestCore::new();
    let customer = core.seed_user("budi", Role::Customer).await;
    let other = core.seed_user("siti", Role::Customer).await;
    let manager = core.seed_user("manager", Role::Manager).await;

    let property = core
        .verification
        .submit(customer, sample_property("Rumah Budi"))
        .await
        .unwrap();

    // Owner and view-all holders can read it, another customer cannot.
    assert!(core.verification.property(customer, property.id).await.is_ok());
    assert!(core.verification.property(manager, property.id).await.is_ok());
    assert!(matches!(
        core.verification.property(other, property.id).await,
        Err(CoreError::Authorization(_))
    ));

    assert_eq!(core.verification.list_properties(manager).await.unwrap().len(), 1);
    assert!(core.verification.list_properties(other).await.unwrap().is_empty());
}
