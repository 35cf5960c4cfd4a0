use fanledger_core::{units, Address, FungibleLedger, LedgerEvent, MemoryToken};
use fanledger_presale::*;
use std::sync::Arc;
use std::thread;

const TOKEN_NAME: &str = "STMP Token";
const TOKEN_SYMBOL: &str = "STMP";

struct Setup {
    presale: Arc<PresaleDistributor>,
    token: Arc<MemoryToken>,
    owner: Address,
    treasury: Address,
}

fn account(n: u32) -> Address {
    Address::derive(&format!("account-{}", n))
}

fn setup() -> Setup {
    let _ = env_logger::builder().is_test(true).try_init();

    let owner = account(0);
    let treasury = account(5);
    let token = Arc::new(MemoryToken::new(Address::derive("stmp-token")));
    let presale = PresaleDistributor::new(
        token.address(),
        owner,
        TOKEN_NAME,
        TOKEN_SYMBOL,
        treasury,
        token.clone(),
    )
    .expect("create presale token");

    Setup {
        presale: Arc::new(presale),
        token,
        owner,
        treasury,
    }
}

/// Treasury grants the owner an allowance covering the whole presale
fn approve_owner(s: &Setup, amount: u128) {
    s.presale.approve(&s.treasury, &s.owner, amount).unwrap();
}

#[test]
fn test_token_attributes() {
    let s = setup();

    assert_eq!(s.presale.name(), TOKEN_NAME);
    assert_eq!(s.presale.symbol(), TOKEN_SYMBOL);
    assert_eq!(s.presale.decimals(), 18);
    assert_eq!(s.presale.treasury_address(), s.treasury);
    assert_eq!(s.presale.token_amount(), units(1_000_000_000));
    assert_eq!(s.presale.tokens_distributed_presale(), 0);
    assert_eq!(s.presale.limit_presale(), units(3_000_000));
    assert_eq!(s.presale.crowdsale_address(), Address::ZERO);
    assert_eq!(s.presale.address(), s.token.address());
}

#[test]
fn test_constructor_mints_supply_and_starts_paused() {
    let s = setup();

    assert!(s.presale.paused());
    assert_eq!(s.presale.total_supply(), TOKEN_AMOUNT);
    assert_eq!(s.token.balance_of(&s.treasury), TOKEN_AMOUNT);
    assert_eq!(
        s.token.journal().events(),
        vec![LedgerEvent::Transfer {
            from: None,
            to: s.treasury,
            amount: TOKEN_AMOUNT
        }]
    );
}

#[test]
fn test_set_crowdsale_address() {
    let s = setup();

    assert_eq!(
        s.presale.set_crowdsale_address(&s.owner, Address::ZERO),
        Err(PresaleError::InvalidAddress)
    );

    let crowdsale = account(2);
    assert_eq!(
        s.presale.set_crowdsale_address(&account(1), crowdsale),
        Err(PresaleError::NotOwner { caller: account(1) })
    );
    assert_eq!(s.presale.crowdsale_address(), Address::ZERO);

    s.presale.set_crowdsale_address(&s.owner, crowdsale).unwrap();
    assert_eq!(s.presale.crowdsale_address(), crowdsale);
}

#[test]
fn test_distribute_rejections() {
    let s = setup();
    approve_owner(&s, LIMIT_PRESALE);
    let buyer = account(3);

    assert_eq!(
        s.presale.distribute_presale_tokens(&account(1), &buyer, 1_000_000),
        Err(PresaleError::NotOwner { caller: account(1) })
    );
    assert_eq!(
        s.presale
            .distribute_presale_tokens(&s.owner, &Address::ZERO, 1_000_000),
        Err(PresaleError::InvalidRecipient)
    );
    assert_eq!(
        s.presale.distribute_presale_tokens(&s.owner, &buyer, 0),
        Err(PresaleError::OutOfLimit {
            amount: 0,
            limit: LIMIT_PRESALE
        })
    );
    assert_eq!(
        s.presale
            .distribute_presale_tokens(&s.owner, &buyer, LIMIT_PRESALE + 1),
        Err(PresaleError::OutOfLimit {
            amount: LIMIT_PRESALE + 1,
            limit: LIMIT_PRESALE
        })
    );

    assert_eq!(s.presale.tokens_distributed_presale(), 0);
    assert_eq!(s.token.balance_of(&buyer), 0);
}

#[test]
fn test_distribute_whole_limit_then_one_more_fails() {
    let s = setup();
    approve_owner(&s, LIMIT_PRESALE + units(1));
    let buyer = account(1);

    // Still paused: distribution does not need an unpause
    assert!(s.presale.paused());
    s.presale
        .distribute_presale_tokens(&s.owner, &buyer, LIMIT_PRESALE)
        .unwrap();
    assert_eq!(s.presale.tokens_distributed_presale(), LIMIT_PRESALE);
    assert_eq!(s.presale.remaining_presale(), 0);
    assert_eq!(s.token.balance_of(&buyer), LIMIT_PRESALE);

    assert_eq!(
        s.presale.distribute_presale_tokens(&s.owner, &buyer, 1),
        Err(PresaleError::LimitExceeded {
            requested: 1,
            distributed: LIMIT_PRESALE,
            limit: LIMIT_PRESALE
        })
    );
    assert_eq!(s.presale.tokens_distributed_presale(), LIMIT_PRESALE);
}

#[test]
fn test_distribution_requires_treasury_allowance() {
    let s = setup();
    let buyer = account(1);

    assert_eq!(
        s.presale.distribute_presale_tokens(&s.owner, &buyer, units(1)),
        Err(PresaleError::AllowanceExceeded {
            requested: units(1),
            approved: 0
        })
    );

    approve_owner(&s, units(1));
    s.presale
        .distribute_presale_tokens(&s.owner, &buyer, units(1))
        .unwrap();
    assert_eq!(s.presale.allowance(&s.treasury, &s.owner), 0);
    assert_eq!(s.token.balance_of(&buyer), units(1));
}

#[test]
fn test_distributed_total_equals_sum_of_successes() {
    let s = setup();
    approve_owner(&s, LIMIT_PRESALE);

    let amounts = [units(1_000_000), units(1_500_000), units(600_000), units(10), 1];
    let mut expected = 0;
    let mut previous = 0;
    for (n, amount) in amounts.into_iter().enumerate() {
        if s
            .presale
            .distribute_presale_tokens(&s.owner, &account(10 + n as u32), amount)
            .is_ok()
        {
            expected += amount;
        }
        let current = s.presale.tokens_distributed_presale();
        assert!(current >= previous);
        assert!(current <= LIMIT_PRESALE);
        previous = current;
    }

    // 1.0M + 1.5M succeed, 0.6M would overshoot, the small ones fit
    assert_eq!(expected, units(2_500_010) + 1);
    assert_eq!(s.presale.tokens_distributed_presale(), expected);
    assert_eq!(s.token.balance_of(&s.treasury), TOKEN_AMOUNT - expected);
}

#[test]
fn test_pause_and_unpause_are_owner_only_and_idempotent() {
    let s = setup();
    let stranger = account(1);

    assert_eq!(
        s.presale.unpause(&stranger),
        Err(PresaleError::NotOwner { caller: stranger })
    );
    assert_eq!(
        s.presale.pause(&stranger),
        Err(PresaleError::NotOwner { caller: stranger })
    );
    assert!(s.presale.paused());

    s.presale.pause(&s.owner).unwrap();
    assert!(s.presale.paused());

    s.presale.unpause(&s.owner).unwrap();
    s.presale.unpause(&s.owner).unwrap();
    assert_eq!(s.presale.sale_state(), SaleState::Active);

    s.presale.pause(&s.owner).unwrap();
    assert_eq!(s.presale.sale_state(), SaleState::Paused);
}

#[test]
fn test_ordinary_transfers_blocked_while_paused() {
    let s = setup();
    let holder = account(1);
    let friend = account(2);
    approve_owner(&s, units(10));
    s.presale
        .distribute_presale_tokens(&s.owner, &holder, units(10))
        .unwrap();

    assert_eq!(
        s.presale.transfer(&holder, &friend, units(1)),
        Err(PresaleError::Paused)
    );
    s.presale.approve(&holder, &friend, units(5)).unwrap();
    assert_eq!(
        s.presale.transfer_from(&friend, &holder, &friend, units(1)),
        Err(PresaleError::Paused)
    );

    s.presale.unpause(&s.owner).unwrap();
    s.presale.transfer(&holder, &friend, units(1)).unwrap();
    s.presale
        .transfer_from(&friend, &holder, &friend, units(2))
        .unwrap();

    assert_eq!(s.presale.balance_of(&holder), units(7));
    assert_eq!(s.presale.balance_of(&friend), units(3));
    assert_eq!(s.presale.allowance(&holder, &friend), units(3));
}

#[test]
fn test_ownership_transfer_moves_presale_control() {
    let s = setup();
    let next = account(9);

    assert_eq!(
        s.presale.transfer_ownership(&s.owner, Address::ZERO),
        Err(PresaleError::InvalidAddress)
    );
    s.presale.transfer_ownership(&s.owner, next).unwrap();

    assert!(matches!(
        s.presale.unpause(&s.owner),
        Err(PresaleError::NotOwner { .. })
    ));
    s.presale.unpause(&next).unwrap();

    // The allowance is tied to the owner identity, so the new owner needs its own
    s.presale.approve(&s.treasury, &next, units(1)).unwrap();
    s.presale
        .distribute_presale_tokens(&next, &account(3), units(1))
        .unwrap();

    s.presale.renounce_ownership(&next).unwrap();
    assert!(s.presale.owner().is_zero());
    assert!(s.presale.pause(&next).is_err());
}

#[test]
fn test_concurrent_distributions_respect_cap() {
    let s = setup();
    approve_owner(&s, TOKEN_AMOUNT);
    let chunk = units(7_000);

    let handles: Vec<_> = (0..8u32)
        .map(|n| {
            let presale = s.presale.clone();
            let owner = s.owner;
            thread::spawn(move || {
                let buyer = account(200 + n);
                (0..100)
                    .filter(|_| {
                        presale
                            .distribute_presale_tokens(&owner, &buyer, chunk)
                            .is_ok()
                    })
                    .count() as u128
            })
        })
        .collect();

    let successes: u128 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    // 3,000,000 / 7,000 = 428 chunks fit
    assert_eq!(successes, 428);
    assert_eq!(s.presale.tokens_distributed_presale(), chunk * 428);
    assert_eq!(
        s.token.balance_of(&s.treasury) + s.presale.tokens_distributed_presale(),
        TOKEN_AMOUNT
    );
}

#[test]
fn test_event_journal_exports() {
    let s = setup();
    approve_owner(&s, units(2));
    s.presale.set_crowdsale_address(&s.owner, account(4)).unwrap();
    s.presale
        .distribute_presale_tokens(&s.owner, &account(1), units(2))
        .unwrap();
    s.presale.unpause(&s.owner).unwrap();

    let events = s.presale.events();
    assert_eq!(
        events,
        vec![
            LedgerEvent::CrowdsaleAddressSet { address: account(4) },
            LedgerEvent::Unpaused { account: s.owner },
        ]
    );

    let json = serde_json::to_string(&events).unwrap();
    let back: Vec<LedgerEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, events);
}

#[test]
fn test_distribution_recorded_once() {
    let s = setup();
    approve_owner(&s, units(2));
    s.presale
        .distribute_presale_tokens(&s.owner, &account(1), units(2))
        .unwrap();

    let distribution = LedgerEvent::Transfer {
        from: Some(s.treasury),
        to: account(1),
        amount: units(2),
    };
    let all: Vec<LedgerEvent> = s
        .token
        .journal()
        .events()
        .into_iter()
        .chain(s.presale.events())
        .collect();
    assert_eq!(all.iter().filter(|e| **e == distribution).count(), 1);
    assert_eq!(s.token.journal().last(), Some(distribution));
}
