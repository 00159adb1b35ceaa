//! End-to-end flows through the observer message handlers: observation
//! ballots, keygen and key rotation, blame, block headers, observer
//! replacement.

use interop_nullables::{NullBlockContext, NullKvStore, NullValidatorRegistry};
use interop_observer::{
    BallotStatus, ChainParams, ChainParamsList, ErrorKind, KeygenStatus, MsgAddBlameVote,
    MsgAddObserver, MsgRemoveObserver, MsgResetChainNonces, MsgUpdateChainParams,
    MsgUpdateKeygen, MsgUpdateObserver, MsgUpdateTss, MsgVoteBlockHeader, MsgVoteTss, NodeBlame,
    ObservationType, ObserverError, ObserverKeeper, ObserverUpdateReason, ReceiveStatus, VoteType,
};
use interop_types::{
    AccountAddress, BlockHeight, ChainId, ConsensusAddress, Digest, ObserverParams, Threshold,
};

type Keeper = ObserverKeeper<NullKvStore, NullValidatorRegistry>;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ETH: ChainId = ChainId(1);
const BTC: ChainId = ChainId(8332);

fn admin() -> AccountAddress {
    AccountAddress::from_key([0xad; 20])
}

fn addr(seed: u8) -> AccountAddress {
    AccountAddress::from_key([seed; 20])
}

/// A keeper with `n` bonded observers registered through the admin
/// handlers, ETH at 0.66 and BTC at 1.
fn network(n: u8) -> (Keeper, NullBlockContext, Vec<AccountAddress>) {
    let keeper = ObserverKeeper::new(
        NullKvStore::new(),
        NullValidatorRegistry::new(),
        ObserverParams::default(),
    )
    .with_admins(vec![admin()]);
    let ctx = NullBlockContext::new(1);

    keeper
        .set_chain_params_list(&ChainParamsList {
            chain_params: vec![
                ChainParams::new(ETH, true, "0.66".parse().unwrap()),
                ChainParams::new(BTC, true, Threshold::ONE),
            ],
        })
        .unwrap();

    let observers: Vec<AccountAddress> = (1..=n).map(addr).collect();
    for (i, o) in observers.iter().enumerate() {
        keeper.validators().add_bonded(o, 1_000);
        keeper
            .add_observer(
                &ctx,
                &MsgAddObserver {
                    signer: admin(),
                    observer_address: o.clone(),
                    granted_pubkey: format!("granted-{i}"),
                    add_node_account_only: false,
                },
            )
            .unwrap();
    }
    (keeper, ctx, observers)
}

fn block_header_msg(signer: &AccountAddress, header: &[u8], height: i64) -> MsgVoteBlockHeader {
    MsgVoteBlockHeader {
        signer: signer.clone(),
        chain_id: ETH,
        block_hash: Digest::of(header).to_hex(),
        height,
        header: header.to_vec(),
    }
}

fn blame_msg(signer: &AccountAddress) -> MsgAddBlameVote {
    MsgAddBlameVote {
        signer: signer.clone(),
        chain_id: ETH,
        nonce: 42,
        digest: "deadbeef".into(),
        failure_reason: "keysign timeout".into(),
        nodes: vec![NodeBlame {
            pubkey: "granted-2".into(),
            blame_data: vec![7],
        }],
    }
}

fn vote_tss(keeper: &Keeper, ctx: &NullBlockContext, signer: &AccountAddress, pubkey: &str, height: i64, status: ReceiveStatus) -> bool {
    keeper
        .vote_tss(
            ctx,
            &MsgVoteTss {
                signer: signer.clone(),
                tss_pubkey: pubkey.into(),
                keygen_height: BlockHeight::new(height),
                status,
            },
        )
        .unwrap()
        .keygen_success
}

/// Schedule a keygen at `height` and have every node account vote it
/// through.
fn run_keygen(keeper: &Keeper, ctx: &NullBlockContext, nodes: &[AccountAddress], pubkey: &str, height: i64) {
    keeper
        .handle_update_keygen(
            ctx,
            &MsgUpdateKeygen {
                signer: admin(),
                block: BlockHeight::new(height),
            },
        )
        .unwrap();
    ctx.set(height);
    let mut succeeded = false;
    for n in nodes {
        succeeded = vote_tss(keeper, ctx, n, pubkey, height, ReceiveStatus::Success);
    }
    assert!(succeeded, "last keygen vote should conclude the keygen");
}

// ---------------------------------------------------------------------------
// Observation ballots
// ---------------------------------------------------------------------------

#[test]
fn two_of_three_finalizes_at_066() {
    let (keeper, ctx, obs) = network(3);

    let first = keeper
        .vote_on_ballot(&ctx, ETH, "obs-1", ObservationType::InboundTx, &obs[0], VoteType::Success)
        .unwrap();
    assert!(first.is_new);
    assert!(!first.finalized);

    let second = keeper
        .vote_on_ballot(&ctx, ETH, "obs-1", ObservationType::InboundTx, &obs[1], VoteType::Success)
        .unwrap();
    assert!(second.finalized_success());

    let third = keeper
        .vote_on_ballot(&ctx, ETH, "obs-1", ObservationType::InboundTx, &obs[2], VoteType::Success)
        .unwrap();
    assert!(!third.finalized, "only the crossing vote finalizes");
    assert_eq!(third.status(), BallotStatus::FinalizedSuccess);
    assert_eq!(third.ballot.voters_with(VoteType::Success).len(), 3);
}

#[test]
fn second_vote_from_same_observer_is_rejected() {
    let (keeper, ctx, obs) = network(3);
    keeper
        .vote_on_ballot(&ctx, ETH, "obs-1", ObservationType::InboundTx, &obs[0], VoteType::Success)
        .unwrap();
    let before = keeper.find_ballot("obs-1").unwrap().unwrap();

    let err = keeper
        .vote_on_ballot(&ctx, ETH, "obs-1", ObservationType::InboundTx, &obs[0], VoteType::Failure)
        .unwrap_err();
    assert!(matches!(err, ObserverError::DuplicateVote { .. }));
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(keeper.find_ballot("obs-1").unwrap().unwrap(), before);
}

#[test]
fn failures_past_complement_finalize_failure() {
    let (keeper, ctx, obs) = network(3);
    // At 0.66 the complement is 0.34: two failures out of three exceed it.
    keeper
        .vote_on_ballot(&ctx, ETH, "obs-2", ObservationType::OutboundTx, &obs[0], VoteType::Failure)
        .unwrap();
    let outcome = keeper
        .vote_on_ballot(&ctx, ETH, "obs-2", ObservationType::OutboundTx, &obs[1], VoteType::Failure)
        .unwrap();
    assert!(outcome.finalized_failure());
}

#[test]
fn ballots_are_pruned_after_maturity() {
    let (keeper, ctx, obs) = network(1);
    ctx.set(100);
    keeper
        .vote_on_ballot(&ctx, ETH, "old", ObservationType::InboundTx, &obs[0], VoteType::Success)
        .unwrap();

    ctx.set(199);
    assert_eq!(keeper.end_block(&ctx).unwrap(), 0);
    ctx.set(200);
    assert_eq!(keeper.end_block(&ctx).unwrap(), 1);
    assert!(keeper.find_ballot("old").unwrap().is_none());
    assert!(keeper.get_ballot_list(BlockHeight::new(100)).unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Eligibility through handlers
// ---------------------------------------------------------------------------

#[test]
fn jailed_observer_cannot_vote_block_header() {
    let (keeper, ctx, obs) = network(3);
    let operator = obs[0].operator_address().unwrap();
    keeper.validators().update_validator(&operator, |v| v.jailed = true);

    let err = keeper
        .vote_block_header(&ctx, &block_header_msg(&obs[0], b"header", 10))
        .unwrap_err();
    assert!(matches!(err, ObserverError::ValidatorJailed(_)));
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[test]
fn removed_observer_cannot_vote_on_open_ballot() {
    let (keeper, ctx, obs) = network(3);
    keeper
        .add_blame_vote(&ctx, &blame_msg(&obs[0]))
        .unwrap();
    keeper
        .remove_observer(
            &ctx,
            &MsgRemoveObserver {
                signer: admin(),
                observer_address: obs[1].clone(),
            },
        )
        .unwrap();

    let err = keeper.add_blame_vote(&ctx, &blame_msg(&obs[1])).unwrap_err();
    assert!(matches!(err, ObserverError::NotObserver(_)));
}

#[test]
fn unsupported_chain_is_rejected_before_eligibility() {
    let (keeper, ctx, _) = network(1);
    let mut msg = blame_msg(&addr(99));
    msg.chain_id = ChainId::new(424242);
    let err = keeper.add_blame_vote(&ctx, &msg).unwrap_err();
    assert!(matches!(err, ObserverError::ChainParamsNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::Config);
}

// ---------------------------------------------------------------------------
// Blame and block headers
// ---------------------------------------------------------------------------

#[test]
fn blame_is_recorded_at_blame_threshold() {
    let (keeper, ctx, obs) = network(3);

    let first = keeper.add_blame_vote(&ctx, &blame_msg(&obs[0])).unwrap();
    assert!(first.ballot_created);
    assert!(!first.vote_finalized);
    assert!(keeper.all_blames().unwrap().is_empty());

    let second = keeper.add_blame_vote(&ctx, &blame_msg(&obs[1])).unwrap();
    assert!(!second.ballot_created);
    assert!(second.vote_finalized);

    let blame = keeper.get_blame("1-42-deadbeef").unwrap().unwrap();
    assert_eq!(blame.failure_reason, "keysign timeout");
    assert_eq!(keeper.blames_for_chain(ETH).unwrap(), vec![blame]);
    assert!(keeper.blames_for_chain(BTC).unwrap().is_empty());
}

#[test]
fn block_header_is_recorded_once() {
    let (keeper, ctx, obs) = network(3);
    let header = b"eth block 17";

    keeper
        .vote_block_header(&ctx, &block_header_msg(&obs[0], header, 17))
        .unwrap();
    let response = keeper
        .vote_block_header(&ctx, &block_header_msg(&obs[1], header, 17))
        .unwrap();
    assert!(response.vote_finalized);

    let hash = Digest::of(header).to_hex();
    let record = keeper.get_block_header(ETH, &hash).unwrap().unwrap();
    assert_eq!(record.height, 17);

    let err = keeper
        .vote_block_header(&ctx, &block_header_msg(&obs[2], header, 17))
        .unwrap_err();
    assert!(matches!(err, ObserverError::BlockHeaderAlreadyExists(_)));
}

#[test]
fn block_header_hash_must_match() {
    let (keeper, ctx, obs) = network(1);
    let mut msg = block_header_msg(&obs[0], b"header", 3);
    msg.block_hash = Digest::of(b"another").to_hex();
    assert!(matches!(
        keeper.vote_block_header(&ctx, &msg),
        Err(ObserverError::InvalidBlockHeader(_))
    ));
}

// ---------------------------------------------------------------------------
// Keygen and TSS rotation
// ---------------------------------------------------------------------------

#[test]
fn keygen_vote_requires_node_account() {
    let (keeper, ctx, _) = network(2);
    keeper
        .handle_update_keygen(
            &ctx,
            &MsgUpdateKeygen {
                signer: admin(),
                block: BlockHeight::new(20),
            },
        )
        .unwrap();
    let err = keeper
        .vote_tss(
            &ctx,
            &MsgVoteTss {
                signer: addr(77),
                tss_pubkey: "pk".into(),
                keygen_height: BlockHeight::new(20),
                status: ReceiveStatus::Success,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ObserverError::InvalidSigner(_)));
}

#[test]
fn keygen_vote_without_keygen_is_rejected() {
    let (keeper, ctx, obs) = network(1);
    let err = keeper
        .vote_tss(
            &ctx,
            &MsgVoteTss {
                signer: obs[0].clone(),
                tss_pubkey: "pk".into(),
                keygen_height: BlockHeight::new(20),
                status: ReceiveStatus::Success,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ObserverError::KeygenNotFound));
}

#[test]
fn four_successes_then_one_failure_fails_keygen() {
    let (keeper, ctx, obs) = network(5);
    keeper
        .handle_update_keygen(
            &ctx,
            &MsgUpdateKeygen {
                signer: admin(),
                block: BlockHeight::new(30),
            },
        )
        .unwrap();
    for o in &obs[..4] {
        assert!(!vote_tss(&keeper, &ctx, o, "pk", 30, ReceiveStatus::Success));
    }
    assert!(!vote_tss(&keeper, &ctx, &obs[4], "pk", 30, ReceiveStatus::Failed));

    let keygen = keeper.get_keygen().unwrap().unwrap();
    assert_eq!(keygen.status, KeygenStatus::Failed);
    assert_eq!(keygen.block_number, BlockHeight::NEVER);
    assert!(keeper.get_tss().unwrap().is_none());
}

#[test]
fn rotation_goes_through_history_then_update_tss() {
    let (keeper, ctx, obs) = network(3);

    run_keygen(&keeper, &ctx, &obs, "key-a", 20);
    assert_eq!(keeper.current_tss().unwrap().tss_pubkey, "key-a");

    // Use some nonces under the first key.
    keeper.schedule_outbound(&ctx, ETH, "cctx-0").unwrap();
    keeper.schedule_outbound(&ctx, ETH, "cctx-1").unwrap();
    assert_eq!(keeper.get_chain_nonces(ETH).unwrap().unwrap().nonce, 2);

    run_keygen(&keeper, &ctx, &obs, "key-b", 40);
    assert_eq!(keeper.current_tss().unwrap().tss_pubkey, "key-a", "second key is not promoted");
    let history: Vec<String> = keeper
        .tss_history()
        .unwrap()
        .into_iter()
        .map(|t| t.tss_pubkey)
        .collect();
    assert_eq!(history, vec!["key-a".to_string(), "key-b".to_string()]);

    keeper
        .handle_update_tss(
            &ctx,
            &MsgUpdateTss {
                signer: admin(),
                tss_pubkey: "key-b".into(),
            },
        )
        .unwrap();
    assert_eq!(keeper.current_tss().unwrap().tss_pubkey, "key-b");
    assert_eq!(keeper.get_chain_nonces(ETH).unwrap().unwrap().nonce, 0);
    let pending = keeper.get_pending_nonces("key-b", ETH).unwrap().unwrap();
    assert!(pending.is_empty());

    let (tss, nonce) = keeper.schedule_outbound(&ctx, ETH, "cctx-2").unwrap();
    assert_eq!((tss.as_str(), nonce), ("key-b", 0));
}

#[test]
fn update_tss_rejects_unknown_key() {
    let (keeper, ctx, obs) = network(1);
    run_keygen(&keeper, &ctx, &obs, "key-a", 20);
    let err = keeper
        .handle_update_tss(
            &ctx,
            &MsgUpdateTss {
                signer: admin(),
                tss_pubkey: "never-generated".into(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, ObserverError::TssNotInHistory(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ---------------------------------------------------------------------------
// Nonces
// ---------------------------------------------------------------------------

#[test]
fn reset_chain_nonces_needs_current_key() {
    let (keeper, ctx, _) = network(1);
    let msg = MsgResetChainNonces {
        signer: admin(),
        chain_id: ETH,
        nonce_low: 5,
        nonce_high: 9,
    };
    assert!(matches!(
        keeper.reset_chain_nonces(&ctx, &msg),
        Err(ObserverError::TssNotFound)
    ));
}

#[test]
fn reset_chain_nonces_sets_window() {
    let (keeper, ctx, obs) = network(1);
    run_keygen(&keeper, &ctx, &obs, "key-a", 20);
    keeper
        .reset_chain_nonces(
            &ctx,
            &MsgResetChainNonces {
                signer: admin(),
                chain_id: ETH,
                nonce_low: 5,
                nonce_high: 9,
            },
        )
        .unwrap();
    let pending = keeper.get_pending_nonces("key-a", ETH).unwrap().unwrap();
    assert_eq!((pending.low, pending.high), (5, 9));
    assert_eq!(keeper.schedule_outbound(&ctx, ETH, "next").unwrap().1, 9);
}

// ---------------------------------------------------------------------------
// Observer set administration
// ---------------------------------------------------------------------------

#[test]
fn tombstoned_observer_moves_to_new_address() {
    let (keeper, ctx, obs) = network(3);
    let old = obs[1].clone();
    let new = addr(50);
    keeper
        .validators()
        .tombstone(&ConsensusAddress::new(format!("cons-{}", old.as_str())));

    ctx.set(33);
    keeper
        .update_observer(
            &ctx,
            &MsgUpdateObserver {
                signer: old.clone(),
                old_observer_address: old.clone(),
                new_observer_address: new.clone(),
                update_reason: ObserverUpdateReason::Tombstoned,
            },
        )
        .unwrap();

    let set = keeper.get_observer_set().unwrap().unwrap();
    assert_eq!(set.observer_list, vec![obs[0].clone(), new.clone(), obs[2].clone()]);
    assert!(keeper.get_node_account(&old).unwrap().is_none());
    assert_eq!(
        keeper.get_node_account(&new).unwrap().unwrap().granted_pubkey,
        "granted-1"
    );
    let count = keeper.get_last_observer_count().unwrap().unwrap();
    assert_eq!(count.count, 3);
    assert_eq!(count.last_change_height, BlockHeight::new(33));
}

#[test]
fn healthy_observer_cannot_claim_tombstone_update() {
    let (keeper, ctx, obs) = network(2);
    let err = keeper
        .update_observer(
            &ctx,
            &MsgUpdateObserver {
                signer: obs[0].clone(),
                old_observer_address: obs[0].clone(),
                new_observer_address: addr(60),
                update_reason: ObserverUpdateReason::Tombstoned,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ObserverError::UpdateObserver(_)));
    assert!(keeper.is_observer(&obs[0]).unwrap());
}

#[test]
fn admin_update_cannot_target_existing_observer() {
    let (keeper, ctx, obs) = network(2);
    let err = keeper
        .update_observer(
            &ctx,
            &MsgUpdateObserver {
                signer: admin(),
                old_observer_address: obs[0].clone(),
                new_observer_address: obs[1].clone(),
                update_reason: ObserverUpdateReason::AdminUpdate,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ObserverError::UpdateObserver(_)));
}

#[test]
fn node_account_only_keeps_observer_set() {
    let (keeper, ctx, _) = network(2);
    let count = keeper
        .add_observer(
            &ctx,
            &MsgAddObserver {
                signer: admin(),
                observer_address: addr(70),
                granted_pubkey: "granted-70".into(),
                add_node_account_only: true,
            },
        )
        .unwrap();
    assert_eq!(count, 2);
    assert!(!keeper.is_observer(&addr(70)).unwrap());
    assert_eq!(keeper.node_accounts().unwrap().len(), 3);
}

#[test]
fn non_admin_cannot_change_chain_params() {
    let (keeper, _, obs) = network(1);
    let err = keeper
        .update_chain_params(&MsgUpdateChainParams {
            signer: obs[0].clone(),
            chain_params: ChainParams::new(ETH, false, Threshold::ONE),
        })
        .unwrap_err();
    assert!(matches!(err, ObserverError::NotAuthorized(_)));
    assert!(keeper.is_chain_supported(ETH).unwrap());

    keeper
        .update_chain_params(&MsgUpdateChainParams {
            signer: admin(),
            chain_params: ChainParams::new(ETH, false, Threshold::ONE),
        })
        .unwrap();
    assert!(!keeper.is_chain_supported(ETH).unwrap());
}
