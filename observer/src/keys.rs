//! Key layout of the observer module inside the shared key-value store.
//!
//! Every record family has its own prefix. Heights and chain ids are encoded
//! with [`BlockHeight::to_key_bytes`] / [`ChainId::to_key_bytes`] so that
//! prefix iteration returns them in numeric order.

use interop_types::{BlockHeight, ChainId};

pub const BALLOT: &[u8] = b"obs/ballot/";
pub const BALLOT_LIST: &[u8] = b"obs/ballot_list/";
pub const OBSERVER_SET: &[u8] = b"obs/observer_set";
pub const LAST_OBSERVER_COUNT: &[u8] = b"obs/last_observer_count";
pub const NODE_ACCOUNT: &[u8] = b"obs/node_account/";
pub const CHAIN_PARAMS: &[u8] = b"obs/chain_params";
pub const KEYGEN: &[u8] = b"obs/keygen";
pub const TSS: &[u8] = b"obs/tss";
pub const TSS_HISTORY: &[u8] = b"obs/tss_history/";
pub const PENDING_NONCES: &[u8] = b"obs/pending_nonces/";
pub const CHAIN_NONCES: &[u8] = b"obs/chain_nonces/";
pub const NONCE_TO_CCTX: &[u8] = b"obs/nonce_to_cctx/";
pub const BLAME: &[u8] = b"obs/blame/";
pub const BLOCK_HEADER: &[u8] = b"obs/block_header/";

fn join(prefix: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let mut key = prefix.to_vec();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(b'/');
        }
        key.extend_from_slice(part);
    }
    key
}

pub fn ballot(identifier: &str) -> Vec<u8> {
    join(BALLOT, &[identifier.as_bytes()])
}

pub fn ballot_list(height: BlockHeight) -> Vec<u8> {
    join(BALLOT_LIST, &[&height.to_key_bytes()])
}

pub fn node_account(operator: &str) -> Vec<u8> {
    join(NODE_ACCOUNT, &[operator.as_bytes()])
}

pub fn tss_history(finalized_height: BlockHeight, pubkey: &str) -> Vec<u8> {
    join(TSS_HISTORY, &[&finalized_height.to_key_bytes(), pubkey.as_bytes()])
}

pub fn pending_nonces(tss: &str, chain: ChainId) -> Vec<u8> {
    join(PENDING_NONCES, &[tss.as_bytes(), &chain.to_key_bytes()])
}

pub fn chain_nonces(chain: ChainId) -> Vec<u8> {
    join(CHAIN_NONCES, &[&chain.to_key_bytes()])
}

pub fn nonce_to_cctx(tss: &str, chain: ChainId, nonce: u64) -> Vec<u8> {
    join(
        NONCE_TO_CCTX,
        &[tss.as_bytes(), &chain.to_key_bytes(), &nonce.to_be_bytes()],
    )
}

pub fn blame(index: &str) -> Vec<u8> {
    join(BLAME, &[index.as_bytes()])
}

pub fn block_header(chain: ChainId, block_hash: &str) -> Vec<u8> {
    join(BLOCK_HEADER, &[&chain.to_key_bytes(), block_hash.as_bytes()])
}
