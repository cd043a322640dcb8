use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::money::{deserialize_paise, Paise};

crate::uuid_aggregate_id!(
    /// Wallet transaction identifier
    WalletTransactionId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "credit" => Ok(TransactionKind::Credit),
            "debit" => Ok(TransactionKind::Debit),
            other => Err(format!("Unknown transaction kind: {}", other)),
        }
    }
}

/// Entry of a customer's wallet ledger. `base.description` is the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    #[serde(flatten)]
    pub base: BaseAggregate<WalletTransactionId>,
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount: Paise,
    pub order_id: Option<String>,
}

impl WalletTransaction {
    pub fn new(
        user_id: &str,
        kind: TransactionKind,
        amount: Paise,
        reason: &str,
        order_id: Option<String>,
    ) -> Self {
        let id = WalletTransactionId::new_v4();
        let code = format!("WTX-{}", &id.value().simple().to_string()[..10]);
        Self {
            base: BaseAggregate::new(id, code, reason.to_string()),
            user_id: user_id.to_string(),
            kind,
            amount,
            order_id,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.user_id.trim().is_empty() {
            return Err("User is required".into());
        }
        if self.amount <= 0 {
            return Err("Amount must be greater than zero".into());
        }
        Ok(())
    }

    /// Signed effect on the balance
    pub fn signed_amount(&self) -> Paise {
        match self.kind {
            TransactionKind::Credit => self.amount,
            TransactionKind::Debit => -self.amount,
        }
    }
}

/// Balance is the sum of signed amounts.
pub fn balance_of(transactions: &[WalletTransaction]) -> Paise {
    transactions.iter().map(WalletTransaction::signed_amount).sum()
}

/// Rejects a debit that would drive the balance below zero.
pub fn ensure_can_debit(balance: Paise, amount: Paise) -> Result<(), String> {
    if amount > balance {
        Err(format!(
            "Insufficient wallet balance: available {} paise, required {} paise",
            balance, amount
        ))
    } else {
        Ok(())
    }
}

impl AggregateRoot for WalletTransaction {
    type Id = WalletTransactionId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a009"
    }

    fn collection_name() -> &'static str {
        "wallet_transaction"
    }

    fn element_name() -> &'static str {
        "Wallet transaction"
    }

    fn list_name() -> &'static str {
        "Wallet transactions"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletCreditRequest {
    #[serde(deserialize_with = "deserialize_paise")]
    pub amount: Paise,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSummary {
    pub user_id: String,
    pub balance: Paise,
    pub transactions: Vec<WalletTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance() {
        let txs = vec![
            WalletTransaction::new("u1", TransactionKind::Credit, 50000, "Top-up", None),
            WalletTransaction::new("u1", TransactionKind::Debit, 12000, "Order", Some("o1".into())),
            WalletTransaction::new("u1", TransactionKind::Credit, 12000, "Refund", Some("o1".into())),
        ];
        assert_eq!(balance_of(&txs), 50000);
        assert!(ensure_can_debit(50000, 50000).is_ok());
        assert!(ensure_can_debit(50000, 50001).is_err());
    }

    #[test]
    fn test_validate() {
        let tx = WalletTransaction::new("u1", TransactionKind::Credit, 0, "Top-up", None);
        assert!(tx.validate().is_err());
    }
}
