//! Integration tests exercising the node over a real LMDB store:
//! message log → per-message batches → LMDB persistence → reopen → readback.

use interop_crosschain::{CctxStatus, MsgVoteInbound, MsgVoteOutbound};
use interop_node::{
    BlockInput, Msg, MsgResponse, NodeConfig, ObserverNode, StaticValidatorRegistry,
};
use interop_nullables::{NullKvStore, NullValidatorRegistry};
use interop_observer::{
    BallotStatus, ChainParams, KeygenStatus, MsgAddObserver, MsgRemoveObserver, MsgUpdateKeygen, MsgVoteTss,
    ReceiveStatus,
};
use interop_store_lmdb::{LmdbEnvironment, LmdbKvStore};
use interop_types::{AccountAddress, BlockHeight, ChainId, ObserverParams, Threshold};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ETH: ChainId = ChainId(1);
const BSC: ChainId = ChainId(56);

fn admin() -> AccountAddress {
    AccountAddress::from_key([0xad; 20])
}

fn observers() -> Vec<AccountAddress> {
    (1..=3).map(|i| AccountAddress::from_key([i; 20])).collect()
}

fn config() -> NodeConfig {
    let toml = format!(
        r#"
        admins = ["{admin}"]

        [[validators]]
        account = "{o1}"
        tokens = "15000000000000000000"

        [[validators]]
        account = "{o2}"
        tokens = "15000000000000000000"

        [[validators]]
        account = "{o3}"
        tokens = "15000000000000000000"

        [[chain_params]]
        chain_id = 1
        is_supported = true
        ballot_threshold = "0.66"

        [[chain_params]]
        chain_id = 56
        is_supported = true
        ballot_threshold = "0.66"
        "#,
        admin = admin(),
        o1 = observers()[0],
        o2 = observers()[1],
        o3 = observers()[2],
    );
    NodeConfig::from_toml_str(&toml).expect("valid config")
}

fn open_node(dir: &std::path::Path) -> ObserverNode<LmdbKvStore, StaticValidatorRegistry> {
    let config = config();
    let env = LmdbEnvironment::open(dir, 4, 64 * 1024 * 1024).expect("open env");
    let registry = StaticValidatorRegistry::from_config(&config.validators).expect("registry");
    let node = ObserverNode::new(
        env.kv_store(),
        registry,
        config.params.to_params(),
        config.admins.clone(),
    )
    .expect("node");
    node.bootstrap_chain_params(&config.chain_params).expect("bootstrap");
    node
}

fn inbound(signer: &AccountAddress) -> MsgVoteInbound {
    MsgVoteInbound {
        signer: signer.clone(),
        sender: "0xalice".into(),
        sender_chain_id: ETH,
        receiver: "0xbob".into(),
        receiver_chain_id: BSC,
        amount: 2_500_000_000_000_000_000,
        inbound_hash: "0xin-1".into(),
        inbound_block_height: 900,
        event_index: 0,
    }
}

fn outbound(signer: &AccountAddress, cctx_index: &str) -> MsgVoteOutbound {
    MsgVoteOutbound {
        signer: signer.clone(),
        cctx_index: cctx_index.into(),
        outbound_hash: "0xout-0".into(),
        outbound_chain_id: BSC,
        tss_nonce: 0,
        status: ReceiveStatus::Success,
        value_received: 2_500_000_000_000_000_000,
    }
}

/// The full lifecycle as a message log, one JSON line per block.
fn message_log() -> Vec<String> {
    let obs = observers();
    let cctx_index = inbound(&obs[0]).digest().to_hex();

    let blocks = vec![
        BlockInput {
            height: BlockHeight::new(1),
            messages: obs
                .iter()
                .enumerate()
                .map(|(i, o)| {
                    Msg::AddObserver(MsgAddObserver {
                        signer: admin(),
                        observer_address: o.clone(),
                        granted_pubkey: format!("granted-{i}"),
                        add_node_account_only: false,
                    })
                })
                .collect(),
        },
        BlockInput {
            height: BlockHeight::new(2),
            messages: vec![Msg::UpdateKeygen(MsgUpdateKeygen {
                signer: admin(),
                block: BlockHeight::new(20),
            })],
        },
        BlockInput {
            height: BlockHeight::new(20),
            messages: obs
                .iter()
                .map(|o| {
                    Msg::VoteTss(MsgVoteTss {
                        signer: o.clone(),
                        tss_pubkey: "tss-a".into(),
                        keygen_height: BlockHeight::new(20),
                        status: ReceiveStatus::Success,
                    })
                })
                .collect(),
        },
        BlockInput {
            height: BlockHeight::new(21),
            messages: obs[..2].iter().map(|o| Msg::VoteInbound(inbound(o))).collect(),
        },
        BlockInput {
            height: BlockHeight::new(22),
            messages: obs[..2]
                .iter()
                .map(|o| Msg::VoteOutbound(outbound(o, &cctx_index)))
                .collect(),
        },
    ];
    blocks
        .iter()
        .map(|b| serde_json::to_string(b).expect("serializable"))
        .collect()
}

fn replay(node: &ObserverNode<LmdbKvStore, StaticValidatorRegistry>, log: &[String]) -> usize {
    let mut applied = 0;
    for line in log {
        let block = BlockInput::from_json_line(line).expect("valid line");
        let summary = node.apply_block(&block).expect("block applies");
        assert_eq!(summary.rejected, 0, "block {} rejected messages", block.height);
        applied += summary.applied;
    }
    applied
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

#[test]
fn replayed_log_drives_a_transfer_to_completion() {
    let dir = tempfile::tempdir().expect("temp dir");
    let node = open_node(dir.path());
    assert_eq!(replay(&node, &message_log()), 11);

    let keeper = node.keeper();
    let observer = keeper.observer();
    assert_eq!(observer.get_keygen().unwrap().unwrap().status, KeygenStatus::Success);
    assert_eq!(observer.current_tss().unwrap().tss_pubkey, "tss-a");

    let index = inbound(&observers()[0]).digest().to_hex();
    let cctx = keeper.get_cctx(&index).unwrap().expect("cctx created");
    assert_eq!(cctx.status, CctxStatus::OutboundMined);
    assert_eq!(cctx.inbound.amount, 2_500_000_000_000_000_000);

    let pending = observer.get_pending_nonces("tss-a", BSC).unwrap().unwrap();
    assert_eq!((pending.low, pending.high), (1, 1));
    assert_eq!(node.last_block_height().unwrap(), Some(BlockHeight::new(22)));
}

#[test]
fn state_survives_reopen_and_replay_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log = message_log();
    {
        let node = open_node(dir.path());
        replay(&node, &log);
    }

    let node = open_node(dir.path());
    assert_eq!(node.last_block_height().unwrap(), Some(BlockHeight::new(22)));
    for line in &log {
        let block = BlockInput::from_json_line(line).unwrap();
        assert!(node.apply_block(&block).unwrap().skipped);
    }

    let keeper = node.keeper();
    assert_eq!(keeper.all_cctx().unwrap().len(), 1);
    assert_eq!(keeper.observer().get_chain_nonces(BSC).unwrap().unwrap().nonce, 1);
}

#[test]
fn matured_ballots_are_pruned_at_end_of_block() {
    let dir = tempfile::tempdir().expect("temp dir");
    let node = open_node(dir.path());
    replay(&node, &message_log());
    let ballots = node.keeper().observer().all_ballots().unwrap().len();
    assert_eq!(ballots, 3, "keygen, inbound and outbound ballots");

    let empty = |h| BlockInput {
        height: BlockHeight::new(h),
        messages: vec![],
    };
    // Default maturity is 100 blocks: each block prunes the ballots created
    // exactly 100 blocks earlier.
    assert_eq!(node.apply_block(&empty(119)).unwrap().pruned, 0);
    assert_eq!(node.apply_block(&empty(120)).unwrap().pruned, 1);
    assert_eq!(node.apply_block(&empty(121)).unwrap().pruned, 1);
    assert_eq!(node.apply_block(&empty(122)).unwrap().pruned, 1);
    assert!(node.keeper().observer().all_ballots().unwrap().is_empty());

    // The inbound cannot be finalized a second time once its ballot is gone.
    let obs = observers();
    let resubmit = BlockInput {
        height: BlockHeight::new(123),
        messages: vec![Msg::VoteInbound(inbound(&obs[0]))],
    };
    assert_eq!(node.apply_block(&resubmit).unwrap().rejected, 1);
}

#[test]
fn first_block_after_a_height_gap_prunes_everything_matured() {
    let dir = tempfile::tempdir().expect("temp dir");
    let node = open_node(dir.path());
    replay(&node, &message_log());

    // Nothing runs between 22 and 130: ballots from 20, 21 and 22 go at once.
    let summary = node
        .apply_block(&BlockInput {
            height: BlockHeight::new(130),
            messages: vec![],
        })
        .unwrap();
    assert_eq!(summary.pruned, 3);
    let keeper = node.keeper();
    let observer = keeper.observer();
    assert!(observer.all_ballots().unwrap().is_empty());
    assert!(observer.all_ballot_lists().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Atomicity
// ---------------------------------------------------------------------------

#[test]
fn finalizing_vote_on_a_finished_cctx_is_rolled_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let node = open_node(dir.path());
    replay(&node, &message_log());

    let obs = observers();
    let index = inbound(&obs[0]).digest().to_hex();
    let failed = |o: &AccountAddress| MsgVoteOutbound {
        status: ReceiveStatus::Failed,
        ..outbound(o, &index)
    };
    let summary = node
        .apply_block(&BlockInput {
            height: BlockHeight::new(23),
            messages: vec![Msg::VoteOutbound(failed(&obs[2])), Msg::VoteOutbound(failed(&obs[0]))],
        })
        .unwrap();
    assert_eq!((summary.applied, summary.rejected), (1, 1));

    let keeper = node.keeper();
    let ballot_id = failed(&obs[0]).digest().to_hex();
    let ballot = keeper.observer().find_ballot(&ballot_id).unwrap().unwrap();
    assert_eq!(ballot.status, BallotStatus::InProgress);
    assert_eq!(ballot.tally(), (0, 1));
    assert_eq!(keeper.get_cctx(&index).unwrap().unwrap().status, CctxStatus::OutboundMined);
}
// ---------------------------------------------------------------------------

#[test]
fn rejected_messages_write_nothing() {
    let node = ObserverNode::new(
        NullKvStore::new(),
        NullValidatorRegistry::new(),
        ObserverParams::default(),
        vec![admin()],
    )
    .unwrap();
    node.bootstrap_chain_params(&[ChainParams::new(ETH, true, Threshold::ONE)])
        .unwrap();
    let ctx = BlockHeight::new(5);

    let outsider = AccountAddress::from_key([9; 20]);
    let before = node_dump(&node);
    let rejected = [
        Msg::RemoveObserver(MsgRemoveObserver {
            signer: outsider.clone(),
            observer_address: observers()[0].clone(),
        }),
        Msg::VoteInbound(inbound(&outsider)),
        Msg::VoteTss(MsgVoteTss {
            signer: outsider.clone(),
            tss_pubkey: "tss-x".into(),
            keygen_height: BlockHeight::new(5),
            status: ReceiveStatus::Success,
        }),
    ];
    for msg in &rejected {
        assert!(node.deliver(&ctx, msg).is_err(), "{} should be rejected", msg.name());
    }
    assert_eq!(node_dump(&node), before);

    let applied = node
        .deliver(
            &ctx,
            &Msg::AddObserver(MsgAddObserver {
                signer: admin(),
                observer_address: observers()[0].clone(),
                granted_pubkey: "granted-0".into(),
                add_node_account_only: false,
            }),
        )
        .unwrap();
    assert_eq!(applied, MsgResponse::ObserverCount(1));
    assert_ne!(node_dump(&node), before);
}

fn node_dump(node: &ObserverNode<NullKvStore, NullValidatorRegistry>) -> Vec<(Vec<u8>, Vec<u8>)> {
    node.keeper().observer().store().dump()
}
