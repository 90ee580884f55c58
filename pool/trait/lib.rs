#![cfg_attr(not(feature = "std"), no_std, no_main)]

use ink::primitives::AccountId;

use pool_helpers::{math::MathError, types::WrappedU256};
use psp22::PSP22Error;

#[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum PoolError {
    PSP22Error(PSP22Error),
    ArithmeticError(MathError),
    /// Zero amount passed where a positive one is required.
    InvalidAmount,
    /// Withdrawal larger than the caller's recorded stake.
    InsufficientStake,
    /// Funding attempted by an account other than the reward token,
    /// or recovery attempted by an account other than the owner.
    UnauthorizedCaller,
    /// Recovery targeting the staking or reward token.
    ForbiddenRecovery,
    /// The pool's reward balance cannot honor the notified emission rate.
    RewardTooHigh,
    RewardIsStakingToken,
    InvalidDuration,
    NativeTransferFailed,
}

impl From<PSP22Error> for PoolError {
    fn from(e: PSP22Error) -> Self {
        PoolError::PSP22Error(e)
    }
}

impl From<MathError> for PoolError {
    fn from(e: MathError) -> Self {
        PoolError::ArithmeticError(e)
    }
}

/// Summary of the pool's configuration and current emission window.
///
/// Useful for display purposes.
#[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct PoolDetails {
    /// Address of the PSP22 token participants deposit.
    pub staking_token: AccountId,
    /// Address of the PSP22 token paid out as rewards.
    pub reward_token: AccountId,
    /// Fixed length of a single funding window, in milliseconds.
    pub rewards_duration: u64,
    /// Timestamp at which the current funding window ends.
    pub period_finish: u64,
    /// Rewards paid out per smallest unit of time while the window runs.
    pub reward_rate: u128,
    /// Sum of all participants' stakes.
    pub total_staked: u128,
}

#[ink::trait_definition]
pub trait StakingPool {
    /// Returns the address of the token participants deposit.
    #[ink(message)]
    fn staking_token(&self) -> AccountId;

    /// Returns the address of the token paid out as rewards.
    ///
    /// This is also the only account allowed to call `notify_reward_amount`.
    #[ink(message)]
    fn reward_token(&self) -> AccountId;

    /// Returns the sum of all participants' stakes.
    #[ink(message)]
    fn total_staked(&self) -> u128;

    /// Returns the stake currently deposited by `account`.
    #[ink(message)]
    fn balance_of(&self, account: AccountId) -> u128;

    /// Returns the cumulative reward per unit of stake as of now,
    /// scaled by the pool's fixed-point factor.
    #[ink(message)]
    fn reward_per_token(&self) -> Result<WrappedU256, PoolError>;

    /// Returns the reward `account` has earned so far and not yet claimed.
    #[ink(message)]
    fn earned(&self, account: AccountId) -> Result<u128, PoolError>;

    /// Deposits `amount` of the staking token under the caller's account.
    ///
    /// NOTE: Requires that the caller has approved the pool to spend their tokens.
    #[ink(message)]
    fn stake(&mut self, amount: u128) -> Result<(), PoolError>;

    /// Withdraws `amount` of the caller's stake back to them.
    #[ink(message)]
    fn withdraw(&mut self, amount: u128) -> Result<(), PoolError>;

    /// Withdraws the caller's entire stake and pays out all accrued reward.
    #[ink(message)]
    fn exit(&mut self) -> Result<(), PoolError>;

    /// Pays out the caller's accrued reward, returning the amount paid.
    /// Does nothing (and returns 0) when nothing is owed.
    #[ink(message)]
    fn get_reward(&mut self) -> Result<u128, PoolError>;

    /// Converts `amount` of newly delivered reward tokens into an emission
    /// rate over a fresh, full-length funding window. Reward left unspent
    /// from a still-running window is folded into the new rate.
    ///
    /// NOTE: Callable only by the reward token contract, which must deliver
    /// the tokens in the same atomic step.
    #[ink(message)]
    fn notify_reward_amount(&mut self, amount: u128) -> Result<(), PoolError>;

    /// Sweeps the pool's whole balance of `token` to the owner and returns
    /// the amount swept. The staking and reward tokens cannot be recovered.
    ///
    /// NOTE: Implementation should make sure that it's callable only by an
    /// authorized account (owner of the pool).
    #[ink(message)]
    fn recover_token(&mut self, token: AccountId) -> Result<u128, PoolError>;

    /// Sweeps the pool's native-asset balance to the owner.
    ///
    /// NOTE: Implementation should make sure that it's callable only by an
    /// authorized account (owner of the pool).
    #[ink(message)]
    fn recover_native(&mut self) -> Result<u128, PoolError>;

    /// Returns information about the pool's configuration and emission window.
    #[ink(message)]
    fn view_pool_details(&self) -> PoolDetails;
}
