mod common;

use common::TestCore;
use indowater::domain::policy::Role;
use indowater::domain::transaction::Amount;
use indowater::error::CoreError;
use uuid::Uuid;

#[tokio::test]
async fn test_self_role_change_always_denied() {
    let core = TestCore::new();
    let root = core.seed_user("root", Role::Superadmin).await;

    // Even the strongest role cannot touch its own assignment.
    for role in Role::ALL {
        let result = core.admin.change_role(root, root.user_id, role).await;
        assert!(matches!(result, Err(CoreError::Authorization(_))));
    }
}

#[tokio::test]
async fn test_change_role_requires_manage_roles() {
    let core = TestCore::new();
    let admin = core.seed_user("admin", Role::Admin).await;
    let customer = core.seed_user("budi", Role::Customer).await;

    let result = core
        .admin
        .change_role(admin, customer.user_id, Role::Manager)
        .await;
    assert!(matches!(result, Err(CoreError::Authorization(_))));
}

#[tokio::test]
async fn test_superadmin_changes_roles() {
    let core = TestCore::new();
    let root = core.seed_user("root", Role::Superadmin).await;
    let customer = core.seed_user("budi", Role::Customer).await;

    let updated = core
        .admin
        .change_role(root, customer.user_id, Role::Manager)
        .await
        .unwrap();
    assert_eq!(updated.role, Role::Manager);

    let missing = core.admin.change_role(root, Uuid::new_v4(), Role::Manager).await;
    assert!(matches!(missing, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_set_active_guards() {
    let core = TestCore::new();
    let admin = core.seed_user("admin", Role::Admin).await;
    let manager = core.seed_user("manager", Role::Manager).await;
    let customer = core.seed_user("budi", Role::Customer).await;

    let deactivated = core
        .admin
        .set_active(admin, customer.user_id, false)
        .await
        .unwrap();
    assert!(!deactivated.is_active);

    assert!(matches!(
        core.admin.set_active(manager, customer.user_id, true).await,
        Err(CoreError::Authorization(_))
    ));
    assert!(matches!(
        core.admin.set_active(admin, admin.user_id, false).await,
        Err(CoreError::Authorization(_))
    ));
}

#[tokio::test]
async fn test_delete_user_refused_while_funds_live() {
    let core = TestCore::new();
    let root = core.seed_user("root", Role::Superadmin).await;
    let admin = core.seed_user("admin", Role::Admin).await;
    let customer = core.seed_user("budi", Role::Customer).await;

    let property_id = core.approved_property(customer, admin).await;
    let meter = core.active_meter(customer, property_id, "MTR-010").await;

    // A pending transaction blocks deletion.
    let amount = Amount::new(50_000).unwrap();
    let intent = core
        .orchestrator
        .open_purchase(customer, meter.id, amount, "midtrans")
        .await
        .unwrap();
    assert!(matches!(
        core.admin.delete_user(root, customer.user_id).await,
        Err(CoreError::Conflict(_))
    ));

    // Settled funds on the meter still block deletion.
    let payload = core
        .gateway
        .signed_callback(&intent.order_id, indowater::domain::gateway::GatewayStatus::Settlement, 50_000);
    core.orchestrator.reconcile(&payload).await.unwrap();
    assert!(matches!(
        core.admin.delete_user(root, customer.user_id).await,
        Err(CoreError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_delete_user_happy_path_and_guards() {
    let core = TestCore::new();
    let root = core.seed_user("root", Role::Superadmin).await;
    let admin = core.seed_user("admin", Role::Admin).await;
    let customer = core.seed_user("budi", Role::Customer).await;

    // Admin lacks delete_user.
    assert!(matches!(
        core.admin.delete_user(admin, customer.user_id).await,
        Err(CoreError::Authorization(_))
    ));
    // Self-deletion is refused.
    assert!(matches!(
        core.admin.delete_user(root, root.user_id).await,
        Err(CoreError::Authorization(_))
    ));

    core.admin.delete_user(root, customer.user_id).await.unwrap();
    assert!(matches!(
        core.admin.user(root, customer.user_id).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_user_reads_are_permission_gated() {
    let core = TestCore::new();
    let manager = core.seed_user("manager", Role::Manager).await;
    let customer = core.seed_user("budi", Role::Customer).await;

    assert_eq!(core.admin.list_users(manager).await.unwrap().len(), 2);
    assert!(matches!(
        core.admin.list_users(customer).await,
        Err(CoreError::Authorization(_))
    ));

    // A customer can still read their own record.
    let own = core.admin.user(customer, customer.user_id).await.unwrap();
    assert_eq!(own.id, customer.user_id);
    assert!(matches!(
        core.admin.user(customer, manager.user_id).await,
        Err(CoreError::Authorization(_))
    ));
}
