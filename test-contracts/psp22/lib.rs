#![cfg_attr(not(feature = "std"), no_std, no_main)]

/// Mintable PSP22 token used as the staking and reward asset in tests
/// and local deployments.
#[ink::contract]
mod token {
    use ink::{
        contract_ref,
        prelude::{string::String, vec::Vec},
        storage::Mapping,
    };
    use psp22::{PSP22Error, PSP22};
    use staking_pool_trait::StakingPool;

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from: Option<AccountId>,
        #[ink(topic)]
        to: Option<AccountId>,
        value: u128,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        spender: AccountId,
        amount: u128,
    }

    #[ink(storage)]
    pub struct Token {
        total_supply: u128,
        balances: Mapping<AccountId, u128>,
        allowances: Mapping<(AccountId, AccountId), u128>,
        name: Option<String>,
        symbol: Option<String>,
        decimals: u8,
    }

    impl Token {
        #[ink(constructor)]
        pub fn new(
            total_supply: u128,
            name: Option<String>,
            symbol: Option<String>,
            decimals: u8,
        ) -> Self {
            let caller = Self::env().caller();
            let mut balances = Mapping::default();
            balances.insert(caller, &total_supply);
            Self::env().emit_event(Transfer {
                from: None,
                to: Some(caller),
                value: total_supply,
            });
            Token {
                total_supply,
                balances,
                allowances: Mapping::default(),
                name,
                symbol,
                decimals,
            }
        }

        #[ink(message)]
        pub fn token_name(&self) -> Option<String> {
            self.name.clone()
        }

        #[ink(message)]
        pub fn token_symbol(&self) -> Option<String> {
            self.symbol.clone()
        }

        #[ink(message)]
        pub fn token_decimals(&self) -> u8 {
            self.decimals
        }

        /// Unguarded mint, for test setup only.
        #[ink(message)]
        pub fn mint(&mut self, to: AccountId, value: u128) -> Result<(), PSP22Error> {
            let balance = self.balance_of(to);
            self.balances.insert(to, &balance.saturating_add(value));
            self.total_supply = self.total_supply.saturating_add(value);
            self.env().emit_event(Transfer {
                from: None,
                to: Some(to),
                value,
            });
            Ok(())
        }

        /// Funds a staking pool in one atomic step: moves `value` from the
        /// caller to the pool, then notifies the pool, which therefore
        /// observes this token contract as the funding caller.
        #[ink(message)]
        pub fn transfer_and_notify(
            &mut self,
            pool: AccountId,
            value: u128,
        ) -> Result<(), PSP22Error> {
            let caller = self.env().caller();
            self.move_balance(caller, pool, value)?;
            let mut pool_ref: contract_ref!(StakingPool) = pool.into();
            pool_ref
                .notify_reward_amount(value)
                .map_err(|_| PSP22Error::Custom(String::from("reward notification rejected")))?;
            Ok(())
        }

        fn move_balance(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: u128,
        ) -> Result<(), PSP22Error> {
            let from_balance = self.balance_of(from);
            let new_from_balance = from_balance
                .checked_sub(value)
                .ok_or(PSP22Error::InsufficientBalance)?;
            if from == to || value == 0 {
                return Ok(());
            }
            self.balances.insert(from, &new_from_balance);
            let to_balance = self.balance_of(to);
            self.balances.insert(to, &to_balance.saturating_add(value));
            self.env().emit_event(Transfer {
                from: Some(from),
                to: Some(to),
                value,
            });
            Ok(())
        }
    }

    impl PSP22 for Token {
        #[ink(message)]
        fn total_supply(&self) -> u128 {
            self.total_supply
        }

        #[ink(message)]
        fn balance_of(&self, owner: AccountId) -> u128 {
            self.balances.get(owner).unwrap_or(0)
        }

        #[ink(message)]
        fn allowance(&self, owner: AccountId, spender: AccountId) -> u128 {
            self.allowances.get((owner, spender)).unwrap_or(0)
        }

        #[ink(message)]
        fn transfer(
            &mut self,
            to: AccountId,
            value: u128,
            _data: Vec<u8>,
        ) -> Result<(), PSP22Error> {
            let caller = self.env().caller();
            self.move_balance(caller, to, value)
        }

        #[ink(message)]
        fn transfer_from(
            &mut self,
            from: AccountId,
            to: AccountId,
            value: u128,
            _data: Vec<u8>,
        ) -> Result<(), PSP22Error> {
            let caller = self.env().caller();
            if caller != from {
                let allowance = self.allowance(from, caller);
                let new_allowance = allowance
                    .checked_sub(value)
                    .ok_or(PSP22Error::InsufficientAllowance)?;
                self.allowances.insert((from, caller), &new_allowance);
                self.env().emit_event(Approval {
                    owner: from,
                    spender: caller,
                    amount: new_allowance,
                });
            }
            self.move_balance(from, to, value)
        }

        #[ink(message)]
        fn approve(&mut self, spender: AccountId, value: u128) -> Result<(), PSP22Error> {
            let caller = self.env().caller();
            self.allowances.insert((caller, spender), &value);
            self.env().emit_event(Approval {
                owner: caller,
                spender,
                amount: value,
            });
            Ok(())
        }

        #[ink(message)]
        fn increase_allowance(
            &mut self,
            spender: AccountId,
            delta_value: u128,
        ) -> Result<(), PSP22Error> {
            let caller = self.env().caller();
            let allowance = self.allowance(caller, spender);
            self.allowances
                .insert((caller, spender), &allowance.saturating_add(delta_value));
            Ok(())
        }

        #[ink(message)]
        fn decrease_allowance(
            &mut self,
            spender: AccountId,
            delta_value: u128,
        ) -> Result<(), PSP22Error> {
            let caller = self.env().caller();
            let allowance = self.allowance(caller, spender);
            let new_allowance = allowance
                .checked_sub(delta_value)
                .ok_or(PSP22Error::InsufficientAllowance)?;
            self.allowances.insert((caller, spender), &new_allowance);
            Ok(())
        }
    }

}
