// crates/permission-engine-core/tests/lifecycle.rs
// ============================================================================
// Module: Lifecycle Tests
// Description: Org, node, role, and account lifecycle rules.
// Purpose: Validate registry transitions through the permission engine.
// ============================================================================

//! ## Overview
//! Each test builds its tree before boot and then drives the lifecycle under
//! test, mostly with a single voter per slot so each approval commits.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use common::Fixture;
use common::addr;
use common::committed;
use common::ctx;
use common::enode;
use common::org;
use common::pending;
use common::role;
use permission_engine_core::AccessLevel;
use permission_engine_core::AccountAddress;
use permission_engine_core::AccountStatus;
use permission_engine_core::AccountStatusAction;
use permission_engine_core::ActionOutcome;
use permission_engine_core::AuthContext;
use permission_engine_core::ErrorKind;
use permission_engine_core::EventKind;
use permission_engine_core::NetworkBootstrap;
use permission_engine_core::NodeStatus;
use permission_engine_core::NodeStatusAction;
use permission_engine_core::OrgStatus;
use permission_engine_core::OrgStatusAction;
use permission_engine_core::PermissionError;
use permission_engine_core::RoleDefinition;

/// Org admin of `ORG1`.
fn org_admin() -> AccountAddress {
    addr(10)
}

/// Context of the `ORG1` org admin.
fn admin_ctx() -> AuthContext {
    ctx(&org_admin())
}

/// Booted network with `ORG1` whose only voter is its admin.
fn single_voter_org() -> Fixture {
    let fixture = Fixture::bootstrapped(1);
    fixture.with_org("ORG1", "org1-node", &org_admin());
    fixture.boot();
    fixture
}

/// Role definition in `org_id`.
fn definition(org_id: &str, role_id: &str, access_level: AccessLevel) -> RoleDefinition {
    RoleDefinition {
        org_id: org(org_id),
        role_id: role(role_id),
        access_level,
        is_voter: false,
        is_admin: false,
    }
}

/// Proposes a node status change and approves it as the org admin.
fn drive_node(fixture: &Fixture, name: &str, action: NodeStatusAction) {
    let proposed = fixture.engine.update_node_status(&admin_ctx(), &enode(name), action).unwrap();
    assert!(pending(&proposed));
    let approved = fixture.engine.approve_node(&admin_ctx(), &enode(name)).unwrap();
    assert!(committed(&approved));
}

/// Proposes an org status change as admin 0 and approves it as admins 1 and 2.
fn vote_org_status(fixture: &Fixture, action: OrgStatusAction) {
    let target = org("ORG1");
    fixture.engine.update_org_status(&fixture.admin(0), &target, action).unwrap();
    let first = fixture.engine.approve_org_status_update(&fixture.admin(1), &target, action).unwrap();
    assert!(pending(&first));
    let second = fixture.engine.approve_org_status_update(&fixture.admin(2), &target, action).unwrap();
    assert!(committed(&second));
}

/// Returns a node's status.
fn node_status(fixture: &Fixture, name: &str) -> NodeStatus {
    fixture.engine.node_details(&enode(name)).unwrap().status
}

// ============================================================================
// SECTION: Bootstrap
// ============================================================================

#[test]
fn bootstrap_seeds_network_admin_org() {
    let fixture = Fixture::bootstrapped(2);
    let config = Fixture::config();
    assert!(!fixture.engine.network_boot_status().unwrap());
    assert!(
        fixture.engine.check_org_status(&config.network_admin_org, OrgStatus::Approved).unwrap()
    );
    assert!(fixture.engine.is_network_admin(&addr(1)).unwrap());
    assert!(fixture.engine.is_network_admin(&addr(2)).unwrap());
    assert!(
        fixture
            .engine
            .is_full_access_role(&config.network_admin_org, &config.network_admin_role)
            .unwrap()
    );
    assert_eq!(node_status(&fixture, "admin-node"), NodeStatus::Active);
    assert_eq!(fixture.engine.number_of_valid_voters(&config.network_admin_org).unwrap(), 2);
}

#[test]
fn bootstrap_requires_an_admin() {
    let fixture = Fixture::empty();
    let error = fixture.engine.bootstrap(&NetworkBootstrap::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidInput);
    assert_eq!(fixture.version(), 0);
}

#[test]
fn network_boot_is_one_way() {
    let fixture = Fixture::booted(1);
    assert!(fixture.engine.network_boot_status().unwrap());
    let again = fixture.engine.complete_network_boot(&fixture.admin(0)).unwrap_err();
    assert!(matches!(again, PermissionError::InvalidStateTransition { .. }));
    let reseed = fixture
        .engine
        .bootstrap(&NetworkBootstrap {
            admin_accounts: vec![addr(5)],
            admin_nodes: Vec::new(),
        })
        .unwrap_err();
    assert!(matches!(reseed, PermissionError::InvalidStateTransition { .. }));
}

#[test]
fn only_network_admin_completes_boot() {
    let fixture = Fixture::bootstrapped(1);
    let error = fixture.engine.complete_network_boot(&ctx(&addr(77))).unwrap_err();
    assert!(matches!(error, PermissionError::Unauthorized { .. }));
    assert!(!fixture.engine.network_boot_status().unwrap());
}

#[test]
fn pre_boot_org_commits_without_vote() {
    let fixture = Fixture::bootstrapped(1);
    let outcome = fixture
        .engine
        .add_org(&fixture.admin(0), &org("ORG1"), &enode("org1-node"), &org_admin())
        .unwrap();
    assert!(committed(&outcome));

    let details = fixture.engine.org_details(&org("ORG1")).unwrap();
    assert_eq!(details.org.status, OrgStatus::Approved);
    assert_eq!(details.nodes[0].status, NodeStatus::Active);
    assert!(details.accounts[0].is_org_admin);
    assert_eq!(details.roles[0].role_id, Fixture::config().org_admin_role);
    assert!(details.roles[0].is_admin);
    assert!(fixture.engine.is_org_admin(&org_admin(), &org("ORG1")).unwrap());
}

// ============================================================================
// SECTION: Orgs
// ============================================================================

#[test]
fn master_org_approval_after_boot() {
    let fixture = Fixture::booted(1);
    let _drained = fixture.events.drain();
    let opened = fixture
        .engine
        .add_org(&fixture.admin(0), &org("ORG2"), &enode("org2-node"), &addr(30))
        .unwrap();
    assert!(pending(&opened));
    assert_eq!(fixture.events.kinds(), vec![
        EventKind::OrgProposed,
        EventKind::NodeProposed,
        EventKind::OrgAdminProposed,
        EventKind::ItemForApproval,
    ]);
    assert!(fixture.engine.check_org_status(&org("ORG2"), OrgStatus::Proposed).unwrap());
    let _drained = fixture.events.drain();

    let approved = fixture.engine.approve_org(&fixture.admin(0), &org("ORG2")).unwrap();
    assert!(committed(&approved));
    assert_eq!(fixture.events.kinds(), vec![
        EventKind::VoteProcessed,
        EventKind::RoleCreated,
        EventKind::OrgApproved,
        EventKind::NodeActivated,
        EventKind::OrgAdminApproved,
        EventKind::VoterAdded,
    ]);
    assert_eq!(node_status(&fixture, "org2-node"), NodeStatus::Active);
    assert!(fixture.engine.is_org_admin(&addr(30), &org("ORG2")).unwrap());
}

#[test]
fn approving_an_approved_org_fails() {
    let fixture = single_voter_org();
    let error = fixture.engine.approve_org(&fixture.admin(0), &org("ORG1")).unwrap_err();
    assert!(matches!(error, PermissionError::InvalidStateTransition { .. }));
}

#[test]
fn duplicate_and_dotted_master_orgs_are_rejected() {
    let fixture = single_voter_org();
    let duplicate = fixture
        .engine
        .add_org(&fixture.admin(0), &org("ORG1"), &enode("other"), &addr(31))
        .unwrap_err();
    assert!(matches!(duplicate, PermissionError::AlreadyExists { .. }));
    let dotted = fixture
        .engine
        .add_org(&fixture.admin(0), &org("ORG1.SUB"), &enode("other"), &addr(31))
        .unwrap_err();
    assert_eq!(dotted.kind(), ErrorKind::InvalidInput);
}

#[test]
fn sub_org_requires_operational_parent() {
    let fixture = Fixture::booted(1);
    fixture
        .engine
        .add_org(&fixture.admin(0), &org("ORG2"), &enode("org2-node"), &addr(30))
        .unwrap();
    let early = fixture.engine.add_sub_org(&fixture.admin(0), &org("ORG2"), "X", None).unwrap_err();
    assert!(matches!(early, PermissionError::InvalidStateTransition { .. }));

    fixture.engine.approve_org(&fixture.admin(0), &org("ORG2")).unwrap();
    let proposed = fixture.engine.add_sub_org(&fixture.admin(0), &org("ORG2"), "X", None).unwrap();
    assert!(matches!(proposed, ActionOutcome::Pending { .. }));
    let approved = fixture.engine.approve_org(&ctx(&addr(30)), &org("ORG2.X")).unwrap();
    assert!(committed(&approved));

    let parent = fixture.engine.org_details(&org("ORG2")).unwrap();
    assert_eq!(parent.org.sub_orgs, vec![org("ORG2.X")]);
    assert_eq!(parent.sub_orgs, vec![org("ORG2.X")]);
    let child = fixture.engine.org_details(&org("ORG2.X")).unwrap().org;
    assert_eq!(child.level, 2);
    assert_eq!(child.ultimate_parent, org("ORG2"));
}

#[test]
fn suspension_blocks_sub_orgs_until_revoked() {
    let fixture = Fixture::bootstrapped(3);
    fixture.with_org("ORG1", "org1-node", &org_admin());
    fixture.boot();

    vote_org_status(&fixture, OrgStatusAction::Suspend);
    assert!(fixture.engine.check_org_status(&org("ORG1"), OrgStatus::Suspended).unwrap());
    let blocked = fixture.engine.add_sub_org(&admin_ctx(), &org("ORG1"), "X", None).unwrap_err();
    assert!(matches!(blocked, PermissionError::InvalidStateTransition { .. }));

    vote_org_status(&fixture, OrgStatusAction::RevokeSuspension);
    assert!(fixture.engine.check_org_status(&org("ORG1"), OrgStatus::SuspensionRevoked).unwrap());
    assert!(fixture.engine.add_sub_org(&admin_ctx(), &org("ORG1"), "X", None).is_ok());
}

#[test]
fn suspended_master_blocks_its_sub_orgs() {
    let fixture = Fixture::bootstrapped(3);
    fixture.with_org("ORG1", "org1-node", &org_admin());
    fixture.engine.add_sub_org(&admin_ctx(), &org("ORG1"), "A", None).unwrap();
    fixture.boot();

    vote_org_status(&fixture, OrgStatusAction::Suspend);
    let sub_org = org("ORG1.A");
    assert!(fixture.engine.check_org_status(&sub_org, OrgStatus::Approved).unwrap());
    let node = fixture.engine.propose_node(&admin_ctx(), &sub_org, &enode("a-node")).unwrap_err();
    assert!(matches!(node, PermissionError::InvalidStateTransition { .. }));
    let nested = fixture.engine.add_sub_org(&admin_ctx(), &sub_org, "B", None).unwrap_err();
    assert!(matches!(nested, PermissionError::InvalidStateTransition { .. }));
    assert!(fixture.engine.node_details(&enode("a-node")).is_err());

    vote_org_status(&fixture, OrgStatusAction::RevokeSuspension);
    assert!(fixture.engine.propose_node(&admin_ctx(), &sub_org, &enode("a-node")).is_ok());
}

#[test]
fn network_admin_org_cannot_be_suspended() {
    let fixture = Fixture::booted(2);
    let admin_org = Fixture::config().network_admin_org;
    let error = fixture
        .engine
        .update_org_status(&fixture.admin(0), &admin_org, OrgStatusAction::Suspend)
        .unwrap_err();
    assert!(matches!(error, PermissionError::InvalidStateTransition { .. }));
    assert!(fixture.engine.check_org_status(&admin_org, OrgStatus::Approved).unwrap());
    assert!(fixture.engine.pending_operation(&admin_org).unwrap().is_none());
    assert!(fixture.engine.is_network_admin(&fixture.admins[1]).unwrap());
}

#[test]
fn org_status_updates_follow_two_phase_rules() {
    let fixture = single_voter_org();
    let revoke = fixture
        .engine
        .update_org_status(&fixture.admin(0), &org("ORG1"), OrgStatusAction::RevokeSuspension)
        .unwrap_err();
    assert!(matches!(revoke, PermissionError::InvalidStateTransition { .. }));
    let unmatched = fixture
        .engine
        .approve_org_status_update(&fixture.admin(0), &org("ORG1"), OrgStatusAction::Suspend)
        .unwrap_err();
    assert!(matches!(unmatched, PermissionError::InvalidStateTransition { .. }));
    let not_admin = fixture
        .engine
        .update_org_status(&admin_ctx(), &org("ORG1"), OrgStatusAction::Suspend)
        .unwrap_err();
    assert!(matches!(not_admin, PermissionError::Unauthorized { .. }));
}

#[test]
fn sub_org_breadth_and_depth_are_limited() {
    let fixture = Fixture::bootstrapped(1);
    fixture.with_org("ORG1", "org1-node", &org_admin());
    let admin = admin_ctx();
    for segment in ["A", "B", "C", "D"] {
        assert!(committed(&fixture.engine.add_sub_org(&admin, &org("ORG1"), segment, None).unwrap()));
    }
    let wide = fixture.engine.add_sub_org(&admin, &org("ORG1"), "E", None).unwrap_err();
    assert_eq!(wide.kind(), ErrorKind::LimitExceeded);

    fixture.engine.add_sub_org(&admin, &org("ORG1.A"), "X", None).unwrap();
    fixture.engine.add_sub_org(&admin, &org("ORG1.A.X"), "Y", None).unwrap();
    assert_eq!(fixture.engine.org_details(&org("ORG1.A.X.Y")).unwrap().org.level, 4);
    let deep = fixture.engine.add_sub_org(&admin, &org("ORG1.A.X.Y"), "Z", None).unwrap_err();
    assert_eq!(deep.kind(), ErrorKind::LimitExceeded);

    let bad = fixture.engine.add_sub_org(&admin, &org("ORG1.B"), "no.dots", None).unwrap_err();
    assert_eq!(bad.kind(), ErrorKind::InvalidInput);
}

// ============================================================================
// SECTION: Nodes
// ============================================================================

#[test]
fn node_lifecycle_follows_state_machine() {
    let fixture = single_voter_org();
    let proposed = fixture.engine.propose_node(&admin_ctx(), &org("ORG1"), &enode("n2")).unwrap();
    assert!(pending(&proposed));
    assert_eq!(node_status(&fixture, "n2"), NodeStatus::Proposed);
    fixture.engine.approve_node(&admin_ctx(), &enode("n2")).unwrap();
    assert_eq!(node_status(&fixture, "n2"), NodeStatus::Active);

    fixture.engine.update_node_status(&admin_ctx(), &enode("n2"), NodeStatusAction::Deactivate).unwrap();
    assert_eq!(node_status(&fixture, "n2"), NodeStatus::PendingDeactivation);
    fixture.engine.approve_node(&admin_ctx(), &enode("n2")).unwrap();
    assert_eq!(node_status(&fixture, "n2"), NodeStatus::Deactivated);

    drive_node(&fixture, "n2", NodeStatusAction::Activate);
    assert_eq!(node_status(&fixture, "n2"), NodeStatus::Active);
    drive_node(&fixture, "n2", NodeStatusAction::Blacklist);
    assert_eq!(node_status(&fixture, "n2"), NodeStatus::Blacklisted);
}

#[test]
fn blacklisted_node_is_terminal() {
    let fixture = single_voter_org();
    drive_node(&fixture, "org1-node", NodeStatusAction::Blacklist);
    for action in [NodeStatusAction::Blacklist, NodeStatusAction::Activate, NodeStatusAction::Deactivate] {
        let error =
            fixture.engine.update_node_status(&admin_ctx(), &enode("org1-node"), action).unwrap_err();
        assert!(matches!(error, PermissionError::InvalidStateTransition { .. }));
    }
    let vote = fixture.engine.approve_node(&admin_ctx(), &enode("org1-node")).unwrap_err();
    assert!(matches!(vote, PermissionError::InvalidStateTransition { .. }));
}

#[test]
fn invalid_node_transitions_are_rejected() {
    let fixture = single_voter_org();
    let activate = fixture
        .engine
        .update_node_status(&admin_ctx(), &enode("org1-node"), NodeStatusAction::Activate)
        .unwrap_err();
    assert!(matches!(activate, PermissionError::InvalidStateTransition { .. }));
    let unknown = fixture
        .engine
        .update_node_status(&admin_ctx(), &enode("missing"), NodeStatusAction::Deactivate)
        .unwrap_err();
    assert_eq!(unknown.kind(), ErrorKind::NotFound);
    let taken =
        fixture.engine.propose_node(&admin_ctx(), &org("ORG1"), &enode("admin-node")).unwrap_err();
    assert!(matches!(taken, PermissionError::AlreadyExists { .. }));
}

#[test]
fn cancel_restores_prior_status() {
    let fixture = single_voter_org();
    drive_node(&fixture, "org1-node", NodeStatusAction::Deactivate);
    fixture
        .engine
        .update_node_status(&admin_ctx(), &enode("org1-node"), NodeStatusAction::Blacklist)
        .unwrap();
    assert_eq!(node_status(&fixture, "org1-node"), NodeStatus::PendingBlacklist);
    let _drained = fixture.events.drain();

    let cancelled = fixture.engine.cancel_pending_operation(&admin_ctx(), &enode("org1-node")).unwrap();
    assert!(matches!(cancelled, ActionOutcome::Cancelled { .. }));
    assert_eq!(node_status(&fixture, "org1-node"), NodeStatus::Deactivated);
    assert!(fixture.engine.pending_operation(&org("ORG1")).unwrap().is_none());
    assert_eq!(fixture.events.kinds(), vec![
        EventKind::NodeStatusRestored,
        EventKind::PendingOperationCancelled
    ]);
}

#[test]
fn cancel_only_matches_open_target() {
    let fixture = single_voter_org();
    fixture.engine.propose_node(&admin_ctx(), &org("ORG1"), &enode("n2")).unwrap();
    let other = fixture.engine.cancel_pending_operation(&admin_ctx(), &enode("org1-node")).unwrap_err();
    assert!(matches!(other, PermissionError::InvalidStateTransition { .. }));
    let stranger = fixture.engine.cancel_pending_operation(&ctx(&addr(99)), &enode("n2")).unwrap_err();
    assert!(matches!(stranger, PermissionError::Unauthorized { .. }));

    fixture.engine.cancel_pending_operation(&admin_ctx(), &enode("n2")).unwrap();
    assert_eq!(node_status(&fixture, "n2"), NodeStatus::Proposed);
    let reopened = fixture.engine.propose_node(&admin_ctx(), &org("ORG1"), &enode("n2")).unwrap();
    assert!(pending(&reopened));
    fixture.engine.approve_node(&admin_ctx(), &enode("n2")).unwrap();
    assert_eq!(node_status(&fixture, "n2"), NodeStatus::Active);
}

// ============================================================================
// SECTION: Roles and Accounts
// ============================================================================

#[test]
fn role_revocation_is_not_retroactive() {
    let fixture = single_voter_org();
    let admin = admin_ctx();
    fixture.engine.add_role(&admin, &definition("ORG1", "TX", AccessLevel::Transact)).unwrap();
    fixture.engine.assign_account_role(&admin, &addr(40), &org("ORG1"), &role("TX")).unwrap();

    fixture.engine.remove_role(&admin, &org("ORG1"), &role("TX")).unwrap();
    assert!(!fixture.engine.role_details(&org("ORG1"), &role("TX")).unwrap().active);
    let holder = fixture.engine.account_details(&addr(40)).unwrap();
    assert_eq!(holder.role_id, Some(role("TX")));
    assert_eq!(holder.access_level, AccessLevel::Transact);

    let fresh =
        fixture.engine.assign_account_role(&admin, &addr(41), &org("ORG1"), &role("TX")).unwrap_err();
    assert!(matches!(fresh, PermissionError::NotFound { .. }));
    let twice = fixture.engine.remove_role(&admin, &org("ORG1"), &role("TX")).unwrap_err();
    assert!(matches!(twice, PermissionError::InvalidStateTransition { .. }));
}

#[test]
fn inactive_role_is_reactivated_with_new_attributes() {
    let fixture = single_voter_org();
    let admin = admin_ctx();
    fixture.engine.add_role(&admin, &definition("ORG1", "TX", AccessLevel::Transact)).unwrap();
    let active =
        fixture.engine.add_role(&admin, &definition("ORG1", "TX", AccessLevel::Transact)).unwrap_err();
    assert!(matches!(active, PermissionError::AlreadyExists { .. }));

    fixture.engine.remove_role(&admin, &org("ORG1"), &role("TX")).unwrap();
    fixture.engine.add_role(&admin, &definition("ORG1", "TX", AccessLevel::ReadOnly)).unwrap();
    let record = fixture.engine.role_details(&org("ORG1"), &role("TX")).unwrap();
    assert!(record.active);
    assert_eq!(record.access_level, AccessLevel::ReadOnly);
    assert!(!fixture.engine.is_voter_role(&org("ORG1"), &role("TX")).unwrap());
}

#[test]
fn admin_roles_are_protected() {
    let fixture = single_voter_org();
    let admin_role = Fixture::config().org_admin_role;
    let removal =
        fixture.engine.remove_role(&admin_ctx(), &org("ORG1"), &admin_role).unwrap_err();
    assert!(matches!(removal, PermissionError::InvalidStateTransition { .. }));

    let mut second = definition("ORG1", "BOSS", AccessLevel::FullAccess);
    second.is_admin = true;
    let by_org_admin = fixture.engine.add_role(&admin_ctx(), &second).unwrap_err();
    assert!(matches!(by_org_admin, PermissionError::Unauthorized { .. }));
    let by_network_admin = fixture.engine.add_role(&fixture.admin(0), &second).unwrap_err();
    assert!(matches!(by_network_admin, PermissionError::AlreadyExists { .. }));

    let grant = fixture
        .engine
        .assign_account_role(&admin_ctx(), &addr(40), &org("ORG1"), &admin_role)
        .unwrap_err();
    assert!(matches!(grant, PermissionError::InvalidStateTransition { .. }));
}

#[test]
fn sub_orgs_inherit_master_roles() {
    let fixture = Fixture::bootstrapped(1);
    fixture.with_org("ORG1", "org1-node", &org_admin());
    let admin = admin_ctx();
    fixture.engine.add_sub_org(&admin, &org("ORG1"), "A", None).unwrap();
    fixture.engine.add_role(&admin, &definition("ORG1", "TX", AccessLevel::Transact)).unwrap();
    fixture.boot();

    fixture.engine.assign_account_role(&admin, &addr(50), &org("ORG1.A"), &role("TX")).unwrap();
    let account = fixture.engine.account_details(&addr(50)).unwrap();
    assert_eq!(account.org_id, org("ORG1.A"));
    assert_eq!(account.access_level, AccessLevel::Transact);
    assert!(fixture.engine.is_org_admin(&org_admin(), &org("ORG1.A")).unwrap());
}

#[test]
fn accounts_stay_in_their_org() {
    let fixture = Fixture::bootstrapped(1);
    fixture.with_org("ORG1", "org1-node", &org_admin());
    fixture.with_org("ORG2", "org2-node", &addr(30));
    fixture.boot();
    fixture.engine.add_role(&ctx(&addr(30)), &definition("ORG2", "TX", AccessLevel::Transact)).unwrap();
    fixture.with_voters("ORG1", &org_admin(), &[addr(40)]);

    let moved = fixture
        .engine
        .assign_account_role(&ctx(&addr(30)), &addr(40), &org("ORG2"), &role("TX"))
        .unwrap_err();
    assert!(matches!(moved, PermissionError::InvalidStateTransition { .. }));
    let foreign = fixture
        .engine
        .assign_account_role(&admin_ctx(), &addr(41), &org("ORG2"), &role("TX"))
        .unwrap_err();
    assert!(matches!(foreign, PermissionError::Unauthorized { .. }));
}

#[test]
fn account_status_transitions() {
    let fixture = single_voter_org();
    let admin = admin_ctx();
    fixture.engine.add_role(&admin, &definition("ORG1", "TX", AccessLevel::Transact)).unwrap();
    fixture.engine.assign_account_role(&admin, &addr(40), &org("ORG1"), &role("TX")).unwrap();
    let status = |fixture: &Fixture| fixture.engine.account_details(&addr(40)).unwrap().status;

    let update = |action| fixture.engine.update_account_status(&admin, &org("ORG1"), &addr(40), action);
    update(AccountStatusAction::Suspend).unwrap();
    assert_eq!(status(&fixture), AccountStatus::Suspended);
    assert!(update(AccountStatusAction::Suspend).is_err());
    update(AccountStatusAction::Reactivate).unwrap();
    assert_eq!(status(&fixture), AccountStatus::Active);
    update(AccountStatusAction::Blacklist).unwrap();
    assert_eq!(status(&fixture), AccountStatus::Blacklisted);
    let terminal = update(AccountStatusAction::Reactivate).unwrap_err();
    assert!(matches!(terminal, PermissionError::InvalidStateTransition { .. }));

    let protected = fixture
        .engine
        .update_account_status(&admin, &org("ORG1"), &org_admin(), AccountStatusAction::Suspend)
        .unwrap_err();
    assert!(matches!(protected, PermissionError::InvalidStateTransition { .. }));
}

#[test]
fn suspended_voter_stops_counting() {
    let fixture = Fixture::bootstrapped(1);
    fixture.with_org("ORG1", "org1-node", &org_admin());
    fixture.with_voters("ORG1", &org_admin(), &[addr(11), addr(12)]);
    fixture.boot();
    assert_eq!(fixture.engine.number_of_valid_voters(&org("ORG1")).unwrap(), 3);
    fixture
        .engine
        .update_account_status(&admin_ctx(), &org("ORG1"), &addr(12), AccountStatusAction::Suspend)
        .unwrap();
    assert_eq!(fixture.engine.valid_voters(&org("ORG1")).unwrap(), vec![org_admin(), addr(11)]);
}

#[test]
fn org_admin_role_revocation_requires_network_admin() {
    let fixture = single_voter_org();
    let by_self = fixture.engine.revoke_account_role(&admin_ctx(), &org_admin()).unwrap_err();
    assert!(matches!(by_self, PermissionError::Unauthorized { .. }));
    fixture.engine.revoke_account_role(&fixture.admin(0), &org_admin()).unwrap();
    let account = fixture.engine.account_details(&org_admin()).unwrap();
    assert!(!account.is_org_admin);
    assert_eq!(account.access_level, AccessLevel::NoAccess);
    assert!(!fixture.engine.is_org_admin(&org_admin(), &org("ORG1")).unwrap());
}
