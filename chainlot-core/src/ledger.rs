use crate::error::{ChainlotError, Result};
use crate::types::{Address, Amount};
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-process native-asset ledger backing local environments.
///
/// Stands in for the balance model of the execution environment: every
/// account and contract owns a wei balance, and transfers are atomic.
pub struct Ledger {
    balances: RwLock<HashMap<Address, Amount>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
        }
    }

    pub fn balance_of(&self, address: &Address) -> Amount {
        self.balances
            .read()
            .get(address)
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Faucet-style credit, used to seed dev accounts.
    pub fn credit(&self, address: Address, amount: Amount) {
        let mut balances = self.balances.write();
        let balance = balances.get(&address).copied().unwrap_or(Amount::ZERO);
        balances.insert(address, balance + amount);
    }

    /// Moves `amount` from `from` to `to`. No funds move unless the full
    /// amount is available.
    pub fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<()> {
        let mut balances = self.balances.write();
        let from_balance = balances.get(&from).copied().unwrap_or(Amount::ZERO);
        if from_balance < amount {
            return Err(ChainlotError::InsufficientFunds {
                need: amount.to_wei(),
                available: from_balance.to_wei(),
            });
        }

        balances.insert(from, from_balance - amount);
        let to_balance = balances.get(&to).copied().unwrap_or(Amount::ZERO);
        balances.insert(to, to_balance + amount);

        tracing::debug!("Transferred {} from {} to {}", amount, from, to);
        Ok(())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_moves_funds() {
        let ledger = Ledger::new();
        let alice = Address::fresh();
        let bob = Address::fresh();

        ledger.credit(alice, Amount::from_ether(3));
        ledger.transfer(alice, bob, Amount::from_ether(1)).unwrap();

        assert_eq!(ledger.balance_of(&alice), Amount::from_ether(2));
        assert_eq!(ledger.balance_of(&bob), Amount::from_ether(1));
    }

    #[test]
    fn transfer_rejects_overdraw() {
        let ledger = Ledger::new();
        let alice = Address::fresh();
        let bob = Address::fresh();

        ledger.credit(alice, Amount::from_wei(5));
        let err = ledger
            .transfer(alice, bob, Amount::from_wei(6))
            .unwrap_err();

        assert!(matches!(
            err,
            ChainlotError::InsufficientFunds {
                need: 6,
                available: 5
            }
        ));
        // nothing moved
        assert_eq!(ledger.balance_of(&alice), Amount::from_wei(5));
        assert_eq!(ledger.balance_of(&bob), Amount::ZERO);
    }

    #[test]
    fn self_transfer_is_a_no_op() {
        let ledger = Ledger::new();
        let alice = Address::fresh();

        ledger.credit(alice, Amount::from_wei(10));
        ledger.transfer(alice, alice, Amount::from_wei(4)).unwrap();

        assert_eq!(ledger.balance_of(&alice), Amount::from_wei(10));
    }
}
