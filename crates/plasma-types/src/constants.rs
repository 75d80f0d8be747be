//! Protocol parameters and defaults for the Plasma Cash root chain.

/// Value of every coin. Coins are non-fungible, one unit each.
pub const COIN_DENOMINATION: u64 = 1;

/// Required exit bond, as a `Decimal` mantissa (see [`EXIT_BOND_SCALE`]).
pub const EXIT_BOND_MANTISSA: i64 = 1;

/// Decimal scale of the exit bond: `1 × 10^-1` = 0.1 units.
pub const EXIT_BOND_SCALE: u32 = 1;

/// First maturity phase (t1): 3 days, in seconds.
pub const DEFAULT_CHALLENGE_PERIOD_SECS: u64 = 3 * 24 * 3600;

/// Second maturity phase (t2): 5 days, in seconds.
pub const DEFAULT_MATURITY_PERIOD_SECS: u64 = 5 * 24 * 3600;

/// Depth of the sparse Merkle tree. One leaf per possible 64-bit slot.
pub const TREE_DEPTH: usize = 64;

/// Length of the proof bitmap prefix in an encoded Merkle proof.
pub const PROOF_BITMAP_LEN: usize = 8;

/// Upper bound on an encoded Merkle proof: bitmap + one sibling per level.
pub const MAX_PROOF_LEN: usize = PROOF_BITMAP_LEN + TREE_DEPTH * 32;

/// Block number meaning "no block". Referenced by deposit transactions.
pub const NULL_BLOCK: u64 = 0;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "PlasmaCash";
