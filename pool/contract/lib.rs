#![cfg_attr(not(feature = "std"), no_std, no_main)]

#[ink::contract]
mod staking_pool {
    type TokenId = AccountId;
    type UserId = AccountId;
    use ink::{codegen::EmitEvent, contract_ref, reflect::ContractEventBase, storage::Mapping};
    use pool_helpers::{
        ensure,
        math::{casted_mul, MathError},
        types::WrappedU256,
    };
    use staking_pool_trait::{PoolDetails, PoolError, StakingPool};

    use ink::prelude::vec;
    use primitive_types::U256;

    use psp22::PSP22;

    /// Fixed-point scale of `reward_per_token_stored`.
    ///
    /// The accumulator multiplies by this factor before dividing by the
    /// total stake, so per-operation truncation stays below one smallest
    /// reward unit per unit of stake.
    pub const SCALING_FACTOR: u128 = 1_000_000_000_000_000_000;

    #[ink(event)]
    pub struct Staked {
        #[ink(topic)]
        account: AccountId,
        amount: u128,
    }

    #[ink(event)]
    pub struct Withdrawn {
        #[ink(topic)]
        account: AccountId,
        amount: u128,
    }

    #[ink(event)]
    pub struct RewardPaid {
        #[ink(topic)]
        account: AccountId,
        amount: u128,
    }

    #[ink(event)]
    pub struct RewardAdded {
        amount: u128,
    }

    pub type Event = <StakingPoolContract as ContractEventBase>::Type;

    #[ink(storage)]
    pub struct StakingPoolContract {
        /// Address of the token participants deposit.
        pub staking_token: TokenId,
        /// Address of the token paid out as rewards.
        /// Also the only account allowed to notify the pool of new funding.
        pub reward_token: TokenId,
        /// Address of the pool creator.
        owner: AccountId,
        /// How much stake each participant has in the pool.
        stakes: Mapping<UserId, u128>,
        /// Total stake in the pool after the last action.
        total_staked: u128,

        /// Fixed length of a single funding window.
        pub rewards_duration: Timestamp,
        /// The timestamp at which the current funding window ends.
        pub period_finish: Timestamp,
        /// Rewards distributed per smallest unit of time while a window runs.
        pub reward_rate: u128,
        /// The timestamp as of which `reward_per_token_stored` is valid.
        pub last_update_time: Timestamp,
        /// Cumulative rewards distributed per unit of stake, scaled by
        /// `SCALING_FACTOR`. Non-decreasing.
        pub reward_per_token_stored: WrappedU256,

        /// `reward_per_token_stored` at each participant's last settlement.
        user_reward_per_token_paid: Mapping<UserId, WrappedU256>,
        /// Rewards settled to each participant's credit but not yet paid out.
        rewards: Mapping<UserId, u128>,
    }

    impl StakingPoolContract {
        #[ink(constructor)]
        pub fn new(
            staking_token: TokenId,
            reward_token: TokenId,
            rewards_duration: Timestamp,
        ) -> Result<Self, PoolError> {
            ensure!(staking_token != reward_token, PoolError::RewardIsStakingToken);
            ensure!(rewards_duration > 0, PoolError::InvalidDuration);
            let now = Self::env().block_timestamp();
            Ok(StakingPoolContract {
                staking_token,
                reward_token,
                owner: Self::env().caller(),
                stakes: Mapping::default(),
                total_staked: 0,
                rewards_duration,
                period_finish: now,
                reward_rate: 0,
                last_update_time: now,
                reward_per_token_stored: WrappedU256::ZERO,
                user_reward_per_token_paid: Mapping::default(),
                rewards: Mapping::default(),
            })
        }

        /// Accrual never runs past the end of the funded window.
        fn last_time_reward_applicable(&self) -> Timestamp {
            core::cmp::min(self.env().block_timestamp(), self.period_finish)
        }

        fn stake_of(&self, account: UserId) -> u128 {
            self.stakes.get(account).unwrap_or(0)
        }

        // Guarantee: after calling update() it holds that
        // self.last_update_time == self.last_time_reward_applicable() and
        // reward_per_token_stored covers everything emitted up to that point.
        // An interval with zero total stake grows nothing; its emission is lost.
        fn update(&mut self) -> Result<(), PoolError> {
            let applicable = self.last_time_reward_applicable();
            self.reward_per_token_stored = reward_per_token(
                self.reward_per_token_stored.0,
                self.reward_rate,
                self.total_staked,
                self.last_update_time as u128,
                applicable as u128,
            )?
            .into();
            self.last_update_time = applicable;
            Ok(())
        }

        // Guarantee: after calling update_account(acc) it holds that
        // 1) self.rewards[acc] contains everything earned up to last_update_time
        // 2) self.user_reward_per_token_paid[acc] == self.reward_per_token_stored
        //
        // Must run before any change to the account's stake, so the interval
        // being settled saw a constant stake throughout.
        fn update_account(&mut self, account: UserId) -> Result<(), PoolError> {
            let settled = rewards_earned(
                self.stake_of(account),
                self.reward_per_token_stored.0,
                self.user_reward_per_token_paid
                    .get(account)
                    .unwrap_or_default()
                    .0,
                self.rewards.get(account).unwrap_or(0),
            )?;
            self.rewards.insert(account, &settled);
            self.user_reward_per_token_paid
                .insert(account, &self.reward_per_token_stored);
            Ok(())
        }

        fn add_stake(&mut self, account: UserId, amount: u128) -> Result<(), PoolError> {
            ensure!(amount > 0, PoolError::InvalidAmount);
            self.update()?;
            self.update_account(account)?;
            let staked = self.stake_of(account);
            self.stakes.insert(
                account,
                &staked
                    .checked_add(amount)
                    .ok_or(MathError::AddOverflow(1))?,
            );
            self.total_staked = self
                .total_staked
                .checked_add(amount)
                .ok_or(MathError::AddOverflow(2))?;
            Ok(())
        }

        fn remove_stake(&mut self, account: UserId, amount: u128) -> Result<(), PoolError> {
            ensure!(amount > 0, PoolError::InvalidAmount);
            self.update()?;
            self.update_account(account)?;
            let remaining = self
                .stake_of(account)
                .checked_sub(amount)
                .ok_or(PoolError::InsufficientStake)?;
            self.stakes.insert(account, &remaining);
            // total_staked >= stake_of(account) >= amount
            self.total_staked -= amount;
            Ok(())
        }

        /// Settles the account and takes its whole accrued reward off the
        /// books. Returns 0 when nothing is owed.
        fn take_rewards(&mut self, account: UserId) -> Result<u128, PoolError> {
            self.update()?;
            self.update_account(account)?;
            let reward = self.rewards.get(account).unwrap_or(0);
            if reward > 0 {
                self.rewards.insert(account, &0);
            }
            Ok(reward)
        }

        /// Converts a funding injection into the emission rate of a fresh,
        /// full-length window starting now. Reward left unspent by a
        /// still-running window is folded into the new rate rather than
        /// discarded or paid out as a spike.
        fn apply_funding(&mut self, amount: u128) -> Result<(), PoolError> {
            self.update()?;
            let now = self.env().block_timestamp();
            let duration = self.rewards_duration as u128;
            self.reward_rate = if now >= self.period_finish {
                amount
                    .checked_div(duration)
                    .ok_or(MathError::DivByZero(2))?
            } else {
                let remaining = (self.period_finish - now) as u128;
                let leftover = remaining
                    .checked_mul(self.reward_rate)
                    .ok_or(MathError::MulOverflow(2))?;
                amount
                    .checked_add(leftover)
                    .ok_or(MathError::AddOverflow(3))?
                    .checked_div(duration)
                    .ok_or(MathError::DivByZero(2))?
            };
            self.last_update_time = now;
            self.period_finish = now
                .checked_add(self.rewards_duration)
                .ok_or(MathError::AddOverflow(4))?;
            Ok(())
        }

        fn emit_event<EE: EmitEvent<Self>>(emitter: EE, event: Event) {
            emitter.emit_event(event);
        }
    }

    impl StakingPool for StakingPoolContract {
        #[ink(message)]
        fn staking_token(&self) -> AccountId {
            self.staking_token
        }

        #[ink(message)]
        fn reward_token(&self) -> AccountId {
            self.reward_token
        }

        #[ink(message)]
        fn total_staked(&self) -> u128 {
            self.total_staked
        }

        #[ink(message)]
        fn balance_of(&self, account: AccountId) -> u128 {
            self.stake_of(account)
        }

        #[ink(message)]
        fn reward_per_token(&self) -> Result<WrappedU256, PoolError> {
            Ok(reward_per_token(
                self.reward_per_token_stored.0,
                self.reward_rate,
                self.total_staked,
                self.last_update_time as u128,
                self.last_time_reward_applicable() as u128,
            )?
            .into())
        }

        #[ink(message)]
        fn earned(&self, account: AccountId) -> Result<u128, PoolError> {
            let current = reward_per_token(
                self.reward_per_token_stored.0,
                self.reward_rate,
                self.total_staked,
                self.last_update_time as u128,
                self.last_time_reward_applicable() as u128,
            )?;
            Ok(rewards_earned(
                self.stake_of(account),
                current,
                self.user_reward_per_token_paid
                    .get(account)
                    .unwrap_or_default()
                    .0,
                self.rewards.get(account).unwrap_or(0),
            )?)
        }

        #[ink(message)]
        fn stake(&mut self, amount: u128) -> Result<(), PoolError> {
            let caller = self.env().caller();
            self.add_stake(caller, amount)?;
            let mut staking_token: contract_ref!(PSP22) = self.staking_token.into();
            staking_token.transfer_from(caller, self.env().account_id(), amount, vec![])?;
            StakingPoolContract::emit_event(
                self.env(),
                Event::Staked(Staked {
                    account: caller,
                    amount,
                }),
            );
            Ok(())
        }

        #[ink(message)]
        fn withdraw(&mut self, amount: u128) -> Result<(), PoolError> {
            let caller = self.env().caller();
            self.remove_stake(caller, amount)?;
            let mut staking_token: contract_ref!(PSP22) = self.staking_token.into();
            staking_token.transfer(caller, amount, vec![])?;
            StakingPoolContract::emit_event(
                self.env(),
                Event::Withdrawn(Withdrawn {
                    account: caller,
                    amount,
                }),
            );
            Ok(())
        }

        #[ink(message)]
        fn exit(&mut self) -> Result<(), PoolError> {
            let caller = self.env().caller();
            let staked = self.stake_of(caller);
            // Fails for a participant with nothing staked, so exiting twice
            // is rejected the same way a zero withdrawal is.
            self.remove_stake(caller, staked)?;
            let reward = self.take_rewards(caller)?;
            let mut staking_token: contract_ref!(PSP22) = self.staking_token.into();
            staking_token.transfer(caller, staked, vec![])?;
            StakingPoolContract::emit_event(
                self.env(),
                Event::Withdrawn(Withdrawn {
                    account: caller,
                    amount: staked,
                }),
            );
            if reward > 0 {
                let mut reward_token: contract_ref!(PSP22) = self.reward_token.into();
                reward_token.transfer(caller, reward, vec![])?;
                StakingPoolContract::emit_event(
                    self.env(),
                    Event::RewardPaid(RewardPaid {
                        account: caller,
                        amount: reward,
                    }),
                );
            }
            Ok(())
        }

        #[ink(message)]
        fn get_reward(&mut self) -> Result<u128, PoolError> {
            let caller = self.env().caller();
            let reward = self.take_rewards(caller)?;
            if reward > 0 {
                let mut reward_token: contract_ref!(PSP22) = self.reward_token.into();
                reward_token.transfer(caller, reward, vec![])?;
                StakingPoolContract::emit_event(
                    self.env(),
                    Event::RewardPaid(RewardPaid {
                        account: caller,
                        amount: reward,
                    }),
                );
            }
            Ok(reward)
        }

        #[ink(message)]
        fn notify_reward_amount(&mut self, amount: u128) -> Result<(), PoolError> {
            ensure!(
                self.env().caller() == self.reward_token,
                PoolError::UnauthorizedCaller
            );
            ensure!(amount > 0, PoolError::InvalidAmount);
            self.apply_funding(amount)?;
            // The truncated rate must be honorable out of the pool's actual
            // balance over the whole window.
            let reward_token: contract_ref!(PSP22) = self.reward_token.into();
            let funded = reward_token.balance_of(self.env().account_id());
            ensure!(
                casted_mul(self.reward_rate, self.rewards_duration as u128)
                    <= U256::from(funded),
                PoolError::RewardTooHigh
            );
            StakingPoolContract::emit_event(self.env(), Event::RewardAdded(RewardAdded { amount }));
            Ok(())
        }

        #[ink(message)]
        fn recover_token(&mut self, token: TokenId) -> Result<u128, PoolError> {
            ensure!(
                self.env().caller() == self.owner,
                PoolError::UnauthorizedCaller
            );
            // Participants' stakes and funders' rewards are not the owner's to sweep.
            ensure!(
                token != self.staking_token && token != self.reward_token,
                PoolError::ForbiddenRecovery
            );
            let mut token_ref: contract_ref!(PSP22) = token.into();
            let balance = token_ref.balance_of(self.env().account_id());
            token_ref.transfer(self.owner, balance, vec![])?;
            Ok(balance)
        }

        #[ink(message)]
        fn recover_native(&mut self) -> Result<u128, PoolError> {
            ensure!(
                self.env().caller() == self.owner,
                PoolError::UnauthorizedCaller
            );
            let balance = self.env().balance();
            self.env()
                .transfer(self.owner, balance)
                .map_err(|_| PoolError::NativeTransferFailed)?;
            Ok(balance)
        }

        #[ink(message)]
        fn view_pool_details(&self) -> PoolDetails {
            PoolDetails {
                staking_token: self.staking_token,
                reward_token: self.reward_token,
                rewards_duration: self.rewards_duration,
                period_finish: self.period_finish,
                reward_rate: self.reward_rate,
                total_staked: self.total_staked,
            }
        }
    }

    /// Evaluates the reward-per-stake accumulator at `last_time_reward_applicable`.
    ///
    /// r = r_0 + rate * (t - t_0) * SCALING_FACTOR / total_staked
    ///
    /// where r_0 is the accumulator stored at t_0, the last settlement.
    /// Multiplication by the scale happens before the division so that the
    /// truncation matches fixed-point integer arithmetic exactly.
    ///
    /// An interval with zero total stake returns the accumulator unchanged:
    /// whatever the window emitted over it is distributed to no one.
    pub fn reward_per_token(
        reward_per_token_stored: U256,
        reward_rate: u128,
        total_staked: u128,
        last_update_time: u128,
        last_time_reward_applicable: u128,
    ) -> Result<U256, MathError> {
        if total_staked == 0 || last_update_time >= last_time_reward_applicable {
            return Ok(reward_per_token_stored);
        }

        let time_delta = last_time_reward_applicable - last_update_time;

        casted_mul(reward_rate, time_delta)
            .checked_mul(U256::from(SCALING_FACTOR))
            .ok_or(MathError::MulOverflow(1))?
            .checked_div(U256::from(total_staked))
            .ok_or(MathError::DivByZero(1))?
            .checked_add(reward_per_token_stored)
            .ok_or(MathError::AddOverflow(5))
    }

    /// Settles accumulator growth since the participant's last settlement
    /// into a concrete reward amount:
    ///
    /// accrued + staked * (reward_per_token - reward_per_token_paid) / SCALING_FACTOR
    ///
    /// Exact as long as `staked` was constant over the settled interval,
    /// which the callers guarantee by settling on every stake change.
    pub fn rewards_earned(
        staked: u128,
        reward_per_token: U256,
        reward_per_token_paid: U256,
        rewards_accrued: u128,
    ) -> Result<u128, MathError> {
        let growth = reward_per_token
            .checked_sub(reward_per_token_paid)
            .ok_or(MathError::SubUnderflow(1))?;

        let newly_earned: u128 = growth
            .checked_mul(U256::from(staked))
            .ok_or(MathError::MulOverflow(3))?
            .checked_div(U256::from(SCALING_FACTOR))
            .ok_or(MathError::DivByZero(3))?
            .try_into()
            .map_err(|_| MathError::CastOverflow(1))?;

        rewards_accrued
            .checked_add(newly_earned)
            .ok_or(MathError::AddOverflow(6))
    }

}
