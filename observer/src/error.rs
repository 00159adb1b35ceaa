use interop_store::StoreError;
use interop_types::{ChainId, TypeError};
use thiserror::Error;

/// Coarse classification of an [`ObserverError`], used by callers to decide
/// how to treat a failed message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The signer may not perform this action.
    Authorization,
    /// Missing or disabled chain configuration.
    Config,
    /// The message itself is invalid for the current ballot or state.
    Protocol,
    /// The state the message operates on does not exist.
    NotFound,
    /// The storage backend failed.
    Store,
}

#[derive(Debug, Error)]
pub enum ObserverError {
    // ── authorization ──────────────────────────────────────────────────
    #[error("{0} is not in the observer set")]
    NotObserver(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("{0} is not a validator")]
    NotAValidator(String),

    #[error("validator {0} is jailed")]
    ValidatorJailed(String),

    #[error("validator {0} is not bonded")]
    ValidatorNotBonded(String),

    #[error("validator {0} is tombstoned")]
    ValidatorTombstoned(String),

    #[error("{0} is not a node account")]
    InvalidSigner(String),

    #[error("{0} is not authorized for this action")]
    NotAuthorized(String),

    // ── config ─────────────────────────────────────────────────────────
    #[error("chain {0} is not supported")]
    UnsupportedChain(ChainId),

    #[error("chain params not found for chain {0}")]
    ChainParamsNotFound(ChainId),

    #[error("invalid chain params: {0}")]
    InvalidChainParams(String),

    // ── protocol ───────────────────────────────────────────────────────
    #[error("{voter} has already voted on ballot {ballot}")]
    DuplicateVote { ballot: String, voter: String },

    #[error("{voter} is not a voter of ballot {ballot}")]
    VoterNotFound { ballot: String, voter: String },

    #[error("invalid nonce range: low {low} > high {high}")]
    InvalidNonceRange { low: u64, high: u64 },

    #[error("nonce {nonce} on chain {chain} is already assigned to {cctx_index}")]
    NonceAlreadyAssigned {
        chain: ChainId,
        nonce: u64,
        cctx_index: String,
    },

    #[error("invalid block header: {0}")]
    InvalidBlockHeader(String),

    #[error("block header {0} already exists")]
    BlockHeaderAlreadyExists(String),

    #[error("unable to update observer: {0}")]
    UpdateObserver(String),

    #[error("keygen block {block} is too low, must be at least {min}")]
    KeygenBlockTooLow { block: i64, min: i64 },

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    // ── not found ──────────────────────────────────────────────────────
    #[error("no TSS key is active")]
    TssNotFound,

    #[error("TSS key {0} is not in the key history")]
    TssNotInHistory(String),

    #[error("observer set not found")]
    ObserverSetNotFound,

    #[error("observer set is empty")]
    EmptyObserverSet,

    #[error("pending nonces not found for chain {0}")]
    PendingNoncesNotFound(ChainId),

    #[error("chain nonces not found for chain {0}")]
    ChainNoncesNotFound(ChainId),

    #[error("keygen not found")]
    KeygenNotFound,

    #[error("node account {0} not found")]
    NodeAccountNotFound(String),

    #[error("last observer count not found")]
    LastObserverCountNotFound,

    #[error("no node accounts are registered")]
    NoNodeAccounts,

    #[error("validator {0} not found")]
    ValidatorNotFound(String),

    #[error("self-delegation of {0} not found")]
    DelegationNotFound(String),

    // ── store ──────────────────────────────────────────────────────────
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ObserverError {
    pub fn kind(&self) -> ErrorKind {
        use ObserverError::*;
        match self {
            NotObserver(_) | InvalidAddress(_) | NotAValidator(_) | ValidatorJailed(_)
            | ValidatorNotBonded(_) | ValidatorTombstoned(_) | InvalidSigner(_)
            | NotAuthorized(_) => ErrorKind::Authorization,

            UnsupportedChain(_) | ChainParamsNotFound(_) | InvalidChainParams(_) => {
                ErrorKind::Config
            }

            DuplicateVote { .. }
            | VoterNotFound { .. }
            | InvalidNonceRange { .. }
            | NonceAlreadyAssigned { .. }
            | InvalidBlockHeader(_)
            | BlockHeaderAlreadyExists(_)
            | UpdateObserver(_)
            | KeygenBlockTooLow { .. }
            | InvalidMessage(_) => ErrorKind::Protocol,

            TssNotFound
            | TssNotInHistory(_)
            | ObserverSetNotFound
            | EmptyObserverSet
            | PendingNoncesNotFound(_)
            | ChainNoncesNotFound(_)
            | KeygenNotFound
            | NodeAccountNotFound(_)
            | LastObserverCountNotFound
            | NoNodeAccounts
            | ValidatorNotFound(_)
            | DelegationNotFound(_) => ErrorKind::NotFound,

            Store(_) => ErrorKind::Store,
        }
    }
}

impl From<TypeError> for ObserverError {
    fn from(e: TypeError) -> Self {
        match e {
            TypeError::InvalidAddress(a) | TypeError::InvalidValidatorAddress(a) => {
                ObserverError::InvalidAddress(a)
            }
            TypeError::InvalidThreshold(t) => ObserverError::InvalidChainParams(t),
            TypeError::InvalidDigest(d) => ObserverError::InvalidMessage(d),
        }
    }
}
