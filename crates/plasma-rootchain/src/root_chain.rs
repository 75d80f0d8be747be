//! The root chain facade.
//!
//! Every external call carries a [`CallContext`]: the caller, the shared
//! clock and any value attached. Calls are linearized by `&mut self`; each
//! either commits all of its effects or fails with none.

use chrono::{DateTime, Utc};
use plasma_types::{
    Address, AssetId, BlockNumber, BondBalance, Coin, CoinState, ExitRecord, Hash, PlasmaError,
    Result, RootChainConfig, RootChainEvent, Slot, Transaction, constants,
};
use rust_decimal::Decimal;

use crate::block_store::BlockStore;
use crate::coin_registry::CoinRegistry;
use crate::collaborators::{AssetRegistry, ValidatorSet};
use crate::exit_game::ExitGame;
use crate::finalizer::{FinalizeOutcome, SlotOutcome};
use crate::history::{ExitClaim, IncludedTransaction};

/// Caller, clock and attached value of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub sender: Address,
    pub now: DateTime<Utc>,
    pub value: Decimal,
}

impl CallContext {
    #[must_use]
    pub fn new(sender: Address, now: DateTime<Utc>) -> Self {
        Self {
            sender,
            now,
            value: Decimal::ZERO,
        }
    }

    /// Attach value to the call (the exit bond).
    #[must_use]
    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value = value;
        self
    }
}

/// Settlement-layer state for one Plasma Cash chain.
pub struct RootChain<V: ValidatorSet> {
    address: Address,
    config: RootChainConfig,
    validators: V,
    blocks: BlockStore,
    coins: CoinRegistry,
    exits: ExitGame,
    events: Vec<RootChainEvent>,
    last_call: Option<DateTime<Utc>>,
}

impl<V: ValidatorSet> RootChain<V> {
    /// Create a root chain at `address`.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` is invalid.
    pub fn new(address: Address, config: RootChainConfig, validators: V) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            address = %address,
            exit_bond = %config.exit.exit_bond,
            challenge_secs = config.exit.challenge_period.as_secs(),
            maturity_secs = config.exit.maturity_period.as_secs(),
            "Root chain initialized"
        );
        Ok(Self {
            address,
            exits: ExitGame::new(config.exit.clone()),
            config,
            validators,
            blocks: BlockStore::new(),
            coins: CoinRegistry::new(),
            events: Vec::new(),
            last_call: None,
        })
    }

    fn check_clock(&self, now: DateTime<Utc>) -> Result<()> {
        match self.last_call {
            Some(last) if now < last => Err(PlasmaError::ClockRegression { now, last }),
            _ => Ok(()),
        }
    }

    fn commit_clock(&mut self, now: DateTime<Utc>) {
        self.last_call = Some(now);
    }

    // =================================================================
    // Blocks and deposits
    // =================================================================

    /// Commit an operator block root.
    ///
    /// # Errors
    /// - `UnauthorizedSubmitter` if the sender is not an allowed submitter
    /// - `StaleBlock` / `DepositBlockOverwrite` per the block ordering rules
    pub fn submit_block(&mut self, ctx: CallContext, number: BlockNumber, root: Hash) -> Result<()> {
        self.check_clock(ctx.now)?;
        if !self.validators.is_authorized_block_submitter(&ctx.sender) {
            tracing::warn!(sender = %ctx.sender, block = %number, "Unauthorized block submission");
            return Err(PlasmaError::UnauthorizedSubmitter(ctx.sender));
        }
        if let Err(e) = self.blocks.submit(number, root, ctx.now) {
            tracing::warn!(block = %number, current = %self.blocks.current(), error = %e, "Block rejected");
            return Err(e);
        }
        self.events.push(RootChainEvent::SubmittedBlock {
            block_number: number,
            root,
        });
        self.commit_clock(ctx.now);
        tracing::info!(block = %number, root = %hex::encode(root), "Block submitted");
        Ok(())
    }

    /// Record a deposit reported by the asset registry `ctx.sender`.
    ///
    /// Mints a deposit block committing the self-transfer to `depositor`.
    ///
    /// # Errors
    /// - `UnauthorizedRegistry` if the sender is not an allowed registry
    /// - `SlotCollision` if the derived slot is taken
    /// - `BlockNumberOverflow` if no deposit block number is left
    pub fn on_deposit(
        &mut self,
        ctx: CallContext,
        depositor: Address,
        asset_id: AssetId,
    ) -> Result<(Slot, BlockNumber)> {
        self.check_clock(ctx.now)?;
        let registry = ctx.sender;
        if !self.validators.is_authorized_registry(&registry) {
            tracing::warn!(registry = %registry, "Deposit from unauthorized registry");
            return Err(PlasmaError::UnauthorizedRegistry(registry));
        }
        let slot = self.coins.reserve_slot(&registry, &depositor, asset_id)?;
        let denomination = self.config.denomination;
        let root = Transaction::deposit(slot, depositor, denomination).hash();
        let deposit_block = self.blocks.append_deposit(root, ctx.now)?;
        self.coins.insert(Coin {
            slot,
            asset_id,
            registry,
            denomination,
            owner: depositor,
            deposit_block,
            state: CoinState::Deposited,
            withdrawn_at: None,
        })?;
        self.events.push(RootChainEvent::Deposit {
            slot,
            block_number: deposit_block,
            denomination,
            from: depositor,
            registry,
            asset_id,
        });
        self.commit_clock(ctx.now);
        tracing::info!(
            slot = %slot,
            block = %deposit_block,
            from = %depositor,
            registry = %registry,
            asset = %asset_id,
            "Deposit"
        );
        Ok((slot, deposit_block))
    }

    // =================================================================
    // Exit game
    // =================================================================

    /// File an exit for `slot` as `ctx.sender`, bonding `ctx.value`.
    /// Returns the filing time.
    ///
    /// # Errors
    /// Any exit validation error; nothing changes on failure.
    pub fn start_exit(
        &mut self,
        ctx: CallContext,
        slot: Slot,
        claim: &ExitClaim,
    ) -> Result<DateTime<Utc>> {
        self.check_clock(ctx.now)?;
        let record = self
            .exits
            .start_exit(
                &mut self.coins,
                &self.blocks,
                ctx.sender,
                slot,
                claim,
                ctx.value,
                ctx.now,
            )
            .inspect_err(|e| {
                tracing::warn!(slot = %slot, claimant = %ctx.sender, error = %e, "Exit rejected");
            })?;
        self.events.push(RootChainEvent::StartedExit {
            slot,
            owner: record.owner,
        });
        self.commit_clock(ctx.now);
        Ok(record.filed_at)
    }

    /// Challenge with a spend by the prior owner between the exit's two
    /// proven transactions.
    ///
    /// # Errors
    /// `ExitNotFound`, `InvalidChallenge`, `UnknownBlock` or `InvalidProof`.
    pub fn challenge_between(
        &mut self,
        ctx: CallContext,
        slot: Slot,
        challenge: &IncludedTransaction,
    ) -> Result<()> {
        self.check_clock(ctx.now)?;
        self.exits
            .challenge_between(&mut self.coins, &self.blocks, ctx.sender, slot, challenge)?;
        self.record_challenge(ctx, slot);
        Ok(())
    }

    /// Challenge with a spend of the exiting coin by the exitor.
    ///
    /// # Errors
    /// `ExitNotFound`, `InvalidChallenge`, `UnknownBlock` or `InvalidProof`.
    pub fn challenge_after(
        &mut self,
        ctx: CallContext,
        slot: Slot,
        challenge: &IncludedTransaction,
    ) -> Result<()> {
        self.check_clock(ctx.now)?;
        self.exits
            .challenge_after(&mut self.coins, &self.blocks, ctx.sender, slot, challenge)?;
        self.record_challenge(ctx, slot);
        Ok(())
    }

    fn record_challenge(&mut self, ctx: CallContext, slot: Slot) {
        self.events.push(RootChainEvent::ChallengedExit {
            slot,
            challenger: ctx.sender,
        });
        self.commit_clock(ctx.now);
    }

    // =================================================================
    // Finalization
    // =================================================================

    /// Finalize `slot` if its exit has matured. Premature calls are no-ops.
    ///
    /// # Errors
    /// `ClockRegression`, or an internal inconsistency.
    pub fn finalize_exit(&mut self, ctx: CallContext, slot: Slot) -> Result<FinalizeOutcome> {
        self.check_clock(ctx.now)?;
        let outcome = self.exits.finalize_exit(&mut self.coins, slot, ctx.now)?;
        self.record_finalized(slot, &outcome);
        self.commit_clock(ctx.now);
        Ok(outcome)
    }

    /// Finalize a batch. Each slot's outcome is independent.
    ///
    /// # Errors
    /// Only `ClockRegression`; per-slot failures are in the outcomes.
    pub fn finalize_exits(&mut self, ctx: CallContext, slots: &[Slot]) -> Result<Vec<SlotOutcome>> {
        self.check_clock(ctx.now)?;
        let outcomes = self.exits.finalize_exits(&mut self.coins, slots, ctx.now);
        self.record_outcomes(&outcomes);
        self.commit_clock(ctx.now);
        Ok(outcomes)
    }

    /// Finalize every matured exit in priority order.
    ///
    /// # Errors
    /// Only `ClockRegression`; per-slot failures are in the outcomes.
    pub fn finalize_matured(&mut self, ctx: CallContext) -> Result<Vec<SlotOutcome>> {
        self.check_clock(ctx.now)?;
        let outcomes = self.exits.finalize_matured(&mut self.coins, ctx.now);
        self.record_outcomes(&outcomes);
        self.commit_clock(ctx.now);
        Ok(outcomes)
    }

    fn record_outcomes(&mut self, outcomes: &[SlotOutcome]) {
        for outcome in outcomes {
            if let Ok(result) = &outcome.result {
                self.record_finalized(outcome.slot, result);
            }
        }
    }

    fn record_finalized(&mut self, slot: Slot, outcome: &FinalizeOutcome) {
        if let FinalizeOutcome::Finalized { owner, .. } = outcome {
            self.events
                .push(RootChainEvent::FinalizedExit { slot, owner: *owner });
        }
    }

    // =================================================================
    // Withdrawals
    // =================================================================

    /// Pay out an exited coin through the registry it was deposited from.
    ///
    /// # Errors
    /// - `NotExited` unless the coin is Exited
    /// - `NotOwner` unless the sender owns the exited coin
    /// - `WrongRegistry` if `registry` did not report the deposit
    /// - `AlreadyWithdrawn` on a second payout
    /// - `AssetTransferFailed` if the registry refuses
    pub fn withdraw(
        &mut self,
        ctx: CallContext,
        slot: Slot,
        registry: &mut dyn AssetRegistry,
    ) -> Result<()> {
        self.check_clock(ctx.now)?;
        let coin = self.coins.get(slot)?;
        if coin.state != CoinState::Exited {
            return Err(PlasmaError::NotExited {
                slot,
                state: coin.state,
            });
        }
        if coin.owner != ctx.sender {
            tracing::warn!(slot = %slot, caller = %ctx.sender, "Withdrawal by non-owner");
            return Err(PlasmaError::NotOwner {
                slot,
                caller: ctx.sender,
            });
        }
        if registry.address() != coin.registry {
            tracing::warn!(
                slot = %slot,
                expected = %coin.registry,
                actual = %registry.address(),
                "Withdrawal through wrong registry"
            );
            return Err(PlasmaError::WrongRegistry {
                slot,
                expected: coin.registry,
                actual: registry.address(),
            });
        }
        if coin.is_withdrawn() {
            return Err(PlasmaError::AlreadyWithdrawn(slot));
        }
        let (asset_id, owner) = (coin.asset_id, coin.owner);

        registry.transfer_out(asset_id, owner)?;
        self.coins.mark_withdrawn(slot, ctx.now)?;
        self.events.push(RootChainEvent::Withdrew {
            slot,
            owner,
            registry: registry.address(),
            asset_id,
        });
        self.commit_clock(ctx.now);
        tracing::info!(slot = %slot, owner = %owner, asset = %asset_id, "Coin withdrawn");
        Ok(())
    }

    /// Pay out the sender's withdrawable bonds.
    ///
    /// # Errors
    /// `NothingToWithdraw` if the balance is zero.
    pub fn withdraw_bonds(&mut self, ctx: CallContext) -> Result<Decimal> {
        self.check_clock(ctx.now)?;
        let amount = self.exits.withdraw_bonds(ctx.sender)?;
        self.events.push(RootChainEvent::WithdrewBonds {
            from: ctx.sender,
            amount,
        });
        self.commit_clock(ctx.now);
        tracing::info!(from = %ctx.sender, amount = %amount, "Bonds withdrawn");
        Ok(amount)
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn config(&self) -> &RootChainConfig {
        &self.config
    }

    #[must_use]
    pub fn validators(&self) -> &V {
        &self.validators
    }

    pub fn validators_mut(&mut self) -> &mut V {
        &mut self.validators
    }

    /// # Errors
    /// Returns `CoinNotFound` for an unknown slot.
    pub fn coin(&self, slot: Slot) -> Result<&Coin> {
        self.coins.get(slot)
    }

    /// Coin state; unknown slots report `Deposited`.
    #[must_use]
    pub fn coin_state(&self, slot: Slot) -> CoinState {
        self.coins.state(slot)
    }

    /// Latest exit record for `slot`.
    #[must_use]
    pub fn exit(&self, slot: Slot) -> Option<&ExitRecord> {
        self.exits.exit(slot)
    }

    #[must_use]
    pub fn exit_game(&self) -> &ExitGame {
        &self.exits
    }

    /// # Errors
    /// Returns `UnknownBlock` if nothing is committed at `number`.
    pub fn block_root(&self, number: BlockNumber) -> Result<Hash> {
        self.blocks.root(number)
    }

    #[must_use]
    pub fn current_block(&self) -> BlockNumber {
        self.blocks.current()
    }

    #[must_use]
    pub fn blocks(&self) -> &BlockStore {
        &self.blocks
    }

    #[must_use]
    pub fn bond_balance(&self, account: &Address) -> BondBalance {
        self.exits.bonds().balance(account)
    }

    /// # Errors
    /// Returns `BondInvariantViolation` if bonds were created or lost.
    pub fn verify_bond_conservation(&self) -> Result<()> {
        self.exits.bonds().verify_conservation()
    }

    #[must_use]
    pub fn events(&self) -> &[RootChainEvent] {
        &self.events
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<RootChainEvent> {
        std::mem::take(&mut self.events)
    }
}
