//! Key layout of the cross-chain records.

use interop_types::ChainId;

pub const CCTX: &[u8] = b"cctx/item/";
pub const FINALIZED_INBOUND: &[u8] = b"cctx/finalized_inbound/";

pub fn cctx(index: &str) -> Vec<u8> {
    let mut key = CCTX.to_vec();
    key.extend_from_slice(index.as_bytes());
    key
}

pub fn finalized_inbound(chain: ChainId, hash: &str, event_index: u64) -> Vec<u8> {
    let mut key = FINALIZED_INBOUND.to_vec();
    key.extend_from_slice(&chain.to_key_bytes());
    key.push(b'/');
    key.extend_from_slice(hash.as_bytes());
    key.push(b'/');
    key.extend_from_slice(&event_index.to_be_bytes());
    key
}
