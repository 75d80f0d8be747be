//! Shared harness for the root chain integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use plasma_merkle::SparseMerkleTree;
use plasma_rootchain::testing::CardRegistry;
use plasma_rootchain::{
    AllowList, AssetRegistry, CallContext, ExitClaim, FinalizeOutcome, IncludedTransaction,
    Provenance, RootChain,
};
use plasma_types::{
    Actor, Address, AssetId, BlockNumber, Result, RootChainConfig, SignedTransaction, Slot,
    Transaction,
};
use rust_decimal::Decimal;

pub const DENOMINATION: u64 = 1;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

pub fn bond() -> Decimal {
    Decimal::new(1, 1)
}

/// A deposited coin as seen by the test.
#[derive(Debug, Clone, Copy)]
pub struct Deposit {
    pub slot: Slot,
    pub block: BlockNumber,
    pub asset_id: AssetId,
}

/// Keyed participants.
pub struct Cast {
    pub alice: Actor,
    pub bob: Actor,
    pub charlie: Actor,
    pub dylan: Actor,
    pub elliot: Actor,
    pub mallory: Actor,
}

impl Cast {
    pub fn new() -> Self {
        Self {
            alice: Actor::new("alice", 1),
            bob: Actor::new("bob", 2),
            charlie: Actor::new("charlie", 3),
            dylan: Actor::new("dylan", 4),
            elliot: Actor::new("elliot", 5),
            mallory: Actor::new("mallory", 6),
        }
    }
}

/// Root chain, card registry, the block submitter and a shared clock.
pub struct Harness {
    pub chain: RootChain<AllowList>,
    pub cards: CardRegistry,
    pub authority: Actor,
    pub now: DateTime<Utc>,
}

impl Harness {
    pub fn new() -> (Self, Cast) {
        init_tracing();
        let authority = Actor::new("authority", 10);
        let chain_address = Address([0xaa; 32]);
        let cards = CardRegistry::new(Address([0xcc; 32]), chain_address);
        let validators = AllowList::new()
            .with_submitter(authority.address())
            .with_registry(cards.address());
        let chain = RootChain::new(chain_address, RootChainConfig::default(), validators)
            .expect("default config is valid");
        let harness = Self {
            chain,
            cards,
            authority,
            now: t0(),
        };
        (harness, Cast::new())
    }

    pub fn ctx(&self, who: &Actor) -> CallContext {
        CallContext::new(who.address(), self.now)
    }

    /// Context carrying the exact exit bond.
    pub fn bonded(&self, who: &Actor) -> CallContext {
        self.ctx(who).with_value(bond())
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Mint `count` cards to `who` and deposit each of them.
    pub fn deposit(&mut self, who: &Actor, count: usize) -> Vec<Deposit> {
        let ids = self.cards.register(who.address(), count);
        ids.into_iter()
            .map(|asset_id| {
                let (slot, block) = self
                    .cards
                    .deposit_to_plasma(who.address(), asset_id, &mut self.chain, self.now)
                    .expect("deposit should succeed");
                Deposit {
                    slot,
                    block,
                    asset_id,
                }
            })
            .collect()
    }

    /// Commit an operator block holding `txs`; returns each transaction
    /// with its inclusion proof, in input order.
    pub fn submit(&mut self, number: u64, txs: &[SignedTransaction]) -> Vec<IncludedTransaction> {
        let tree = SparseMerkleTree::from_transactions(txs).expect("distinct slots");
        let ctx = self.ctx(&self.authority);
        self.chain
            .submit_block(ctx, BlockNumber(number), tree.root())
            .expect("block submission should succeed");
        txs.iter()
            .map(|tx| {
                IncludedTransaction::new(tx.clone(), BlockNumber(number), tree.proof(tx.tx.slot))
            })
            .collect()
    }

    /// Commit a single transaction in its own block.
    pub fn submit_one(&mut self, number: u64, tx: SignedTransaction) -> IncludedTransaction {
        self.submit(number, std::slice::from_ref(&tx)).remove(0)
    }

    pub fn start_exit(
        &mut self,
        who: &Actor,
        slot: Slot,
        claim: &ExitClaim,
    ) -> Result<DateTime<Utc>> {
        let ctx = self.bonded(who);
        self.chain.start_exit(ctx, slot, claim)
    }

    pub fn withdraw(&mut self, who: &Actor, slot: Slot) -> Result<()> {
        let ctx = self.ctx(who);
        self.chain.withdraw(ctx, slot, &mut self.cards)
    }

    pub fn finalize(&mut self, slot: Slot) -> Result<FinalizeOutcome> {
        let ctx = self.ctx(&self.authority);
        self.chain.finalize_exit(ctx, slot)
    }
}

/// `from` sends the coin at `slot`, last received in `prev_block`, to `to`.
pub fn transfer(
    from: &Actor,
    slot: Slot,
    prev_block: BlockNumber,
    to: &Actor,
) -> SignedTransaction {
    from.sign(Transaction::transfer(slot, prev_block, DENOMINATION, to.address()))
}

/// The deposit self-transfer of `depositor` as an exit's prior transaction.
pub fn genesis(depositor: &Actor, slot: Slot) -> Provenance {
    Provenance::Genesis(Transaction::deposit(slot, depositor.address(), DENOMINATION))
}

pub fn transfer_claim(exiting: IncludedTransaction, prior: Provenance) -> ExitClaim {
    ExitClaim::Transfer { exiting, prior }
}

/// Full maturity period under the default configuration.
pub fn maturity() -> Duration {
    Duration::days(8)
}
