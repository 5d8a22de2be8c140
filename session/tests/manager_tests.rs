use std::sync::Arc;

use alloy_primitives::Address;

use session::{SessionError, SessionManager};
use testkit::MockLedger;

const ALICE: Address = Address::repeat_byte(0xaa);
const SEPOLIA: u64 = 11_155_111;

fn ledger_on(chain_id: u64) -> Arc<MockLedger> {
    Arc::new(MockLedger::new(chain_id).with_account(ALICE))
}

#[tokio::test]
async fn connect_without_capability_fails() {
    let manager: SessionManager<MockLedger> = SessionManager::new(None, SEPOLIA);

    assert!(matches!(
        manager.connect().await,
        Err(SessionError::NoWalletCapability)
    ));
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn wrong_network_refuses_session_and_is_idempotent() {
    let manager = SessionManager::new(Some(ledger_on(1)), SEPOLIA);

    for _ in 0..3 {
        match manager.connect().await {
            Err(SessionError::WrongNetwork { expected, actual }) => {
                assert_eq!(expected, SEPOLIA);
                assert_eq!(actual, 1);
            }
            other => panic!("expected WrongNetwork, got {other:?}"),
        }
        assert!(!manager.is_connected());
    }
}

#[tokio::test]
async fn connect_establishes_session_on_matching_network() {
    let manager = SessionManager::new(Some(ledger_on(SEPOLIA)), SEPOLIA);

    let session = manager.connect().await.unwrap();
    assert_eq!(session.chain_id, SEPOLIA);
    assert_eq!(session.account, ALICE);
    assert!(manager.is_connected());
    assert_eq!(manager.current(), Some(session));
}

#[tokio::test]
async fn network_change_destroys_held_session() {
    let ledger = ledger_on(SEPOLIA);
    let manager = SessionManager::new(Some(ledger.clone()), SEPOLIA);

    manager.connect().await.unwrap();
    assert!(manager.is_connected());

    // Wallet moved to another network underneath us.
    ledger.set_chain_id(1);
    assert!(matches!(
        manager.connect().await,
        Err(SessionError::WrongNetwork { .. })
    ));
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn missing_signer_account_surfaces_gateway_error() {
    let ledger = ledger_on(SEPOLIA);
    ledger.clear_accounts();
    let manager = SessionManager::new(Some(ledger), SEPOLIA);

    assert!(matches!(
        manager.connect().await,
        Err(SessionError::Gateway(_))
    ));
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn invalidate_clears_the_session() {
    let manager = SessionManager::new(Some(ledger_on(SEPOLIA)), SEPOLIA);

    manager.connect().await.unwrap();
    manager.invalidate();
    assert!(!manager.is_connected());
    assert_eq!(manager.current(), None);
}
