use super::repository;
use contracts::domain::a009_wallet::aggregate::{
    ensure_can_debit, TransactionKind, WalletSummary, WalletTransaction,
};
use contracts::shared::money::Paise;
use std::future::Future;

use crate::shared::api_error::bad_request;

pub async fn summary(user_id: &str) -> anyhow::Result<WalletSummary> {
    let transactions = repository::list_by_user(user_id).await?;
    let balance = repository::balance_of(user_id).await?;
    Ok(WalletSummary {
        user_id: user_id.to_string(),
        balance,
        transactions,
    })
}

pub async fn balance(user_id: &str) -> anyhow::Result<Paise> {
    repository::balance_of(user_id).await
}

pub async fn credit(
    user_id: &str,
    amount: Paise,
    reason: &str,
    order_id: Option<String>,
) -> anyhow::Result<WalletTransaction> {
    let tx = WalletTransaction::new(user_id, TransactionKind::Credit, amount, reason, order_id);
    tx.validate().map_err(bad_request)?;
    repository::insert(&tx).await?;
    tracing::info!("Wallet of {} credited with {} paise ({})", user_id, amount, reason);
    Ok(tx)
}

/// Balance is read and then written without a transaction; two concurrent
/// debits may both pass the check.
pub async fn debit(
    user_id: &str,
    amount: Paise,
    reason: &str,
    order_id: Option<String>,
) -> anyhow::Result<WalletTransaction> {
    let tx = WalletTransaction::new(user_id, TransactionKind::Debit, amount, reason, order_id);
    tx.validate().map_err(bad_request)?;
    let balance = repository::balance_of(user_id).await?;
    ensure_can_debit(balance, amount).map_err(bad_request)?;
    repository::insert(&tx).await?;
    tracing::info!("Wallet of {} debited by {} paise ({})", user_id, amount, reason);
    Ok(tx)
}

pub async fn balances_by_user() -> anyhow::Result<Vec<(String, Paise)>> {
    repository::balances_by_user().await
}

/// Runs a wallet movement and then the write that records it elsewhere.
/// When the write fails the movement is undone by `reversal`; a failed
/// reversal is logged and the write error is returned.
pub async fn move_then_persist<M, P, R>(
    amount: Paise,
    movement: M,
    persist: P,
    reversal: R,
) -> anyhow::Result<()>
where
    M: Future<Output = anyhow::Result<()>>,
    P: Future<Output = anyhow::Result<()>>,
    R: Future<Output = anyhow::Result<()>>,
{
    if amount > 0 {
        movement.await?;
    }
    if let Err(e) = persist.await {
        if amount > 0 {
            if let Err(reversal_err) = reversal.await {
                tracing::error!(
                    "Wallet reversal of {} paise failed: {:#}",
                    amount,
                    reversal_err
                );
            }
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    async fn step(log: Log, name: &'static str, ok: bool) -> anyhow::Result<()> {
        log.lock().unwrap().push(name);
        if ok {
            Ok(())
        } else {
            Err(anyhow::anyhow!("{} failed", name))
        }
    }

    #[tokio::test]
    async fn test_movement_runs_before_persist() {
        let log = Log::default();
        move_then_persist(
            1500,
            step(log.clone(), "credit", true),
            step(log.clone(), "save", true),
            step(log.clone(), "debit", true),
        )
        .await
        .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["credit", "save"]);
    }

    #[tokio::test]
    async fn test_failed_persist_is_reversed() {
        let log = Log::default();
        let err = move_then_persist(
            107000,
            step(log.clone(), "credit", true),
            step(log.clone(), "save", false),
            step(log.clone(), "debit", true),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "save failed");
        assert_eq!(*log.lock().unwrap(), vec!["credit", "save", "debit"]);
    }

    #[tokio::test]
    async fn test_failed_movement_skips_persist() {
        let log = Log::default();
        let result = move_then_persist(
            500,
            step(log.clone(), "credit", false),
            step(log.clone(), "save", true),
            step(log.clone(), "debit", true),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(*log.lock().unwrap(), vec!["credit"]);
    }

    #[tokio::test]
    async fn test_zero_amount_only_persists() {
        let log = Log::default();
        let result = move_then_persist(
            0,
            step(log.clone(), "credit", true),
            step(log.clone(), "save", false),
            step(log.clone(), "debit", true),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(*log.lock().unwrap(), vec!["save"]);
    }
}
