//! # Transaction Repository
//!
//! Supply/demand records and their approval stamps.

use super::models::{Transaction, TransactionForCreate, TransactionForUpdate};
use super::{DbPool, Scope};
use crate::model::enums::{Role, TransactionStatus};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{query_as, QueryBuilder, Sqlite};

pub struct TransactionRepository;

/// Fields written when a transaction changes status.
#[derive(Debug, Clone, Default)]
pub struct StatusStamp {
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl TransactionRepository {
    pub async fn list(pool: &DbPool, scope: Scope) -> Result<Vec<Transaction>, sqlx::Error> {
        match scope {
            Scope::User(user_id) => {
                query_as::<_, Transaction>(
                    "SELECT * FROM transactions WHERE user_id = ? ORDER BY date DESC, id DESC",
                )
                .bind(user_id)
                .fetch_all(pool)
                .await
            }
            Scope::System => {
                query_as::<_, Transaction>("SELECT * FROM transactions ORDER BY date DESC, id DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    pub async fn list_by_status(
        pool: &DbPool,
        status: TransactionStatus,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        query_as::<_, Transaction>("SELECT * FROM transactions WHERE status = ? ORDER BY id")
            .bind(status.as_str())
            .fetch_all(pool)
            .await
    }

    pub async fn get(pool: &DbPool, id: i64) -> Result<Option<Transaction>, sqlx::Error> {
        query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Next free invoice number for `date`, formatted `INV-YYYYMMDD-NNNNNN`.
    pub async fn next_invoice_number(pool: &DbPool, date: NaiveDate) -> Result<String, sqlx::Error> {
        let prefix = format!("INV-{}-", lib_utils::date_stamp(date));
        let last: Option<String> = sqlx::query_scalar(
            "SELECT invoice_number FROM transactions WHERE invoice_number LIKE ? \
             ORDER BY invoice_number DESC LIMIT 1",
        )
        .bind(format!("{}%", prefix))
        .fetch_optional(pool)
        .await?;

        let next = last
            .and_then(|inv| inv[prefix.len()..].parse::<u32>().ok())
            .map(|n| n + 1)
            .unwrap_or(1);

        Ok(format!("{}{:06}", prefix, next))
    }

    /// Insert a transaction with its date, status and invoice number already resolved.
    pub async fn create(
        pool: &DbPool,
        user_id: Option<i64>,
        role: Role,
        status: TransactionStatus,
        date: NaiveDate,
        invoice_number: String,
        data: TransactionForCreate,
    ) -> Result<Transaction, sqlx::Error> {
        let now = Utc::now();
        query_as::<_, Transaction>(
            "INSERT INTO transactions (user_id, part_name, tx_type, quantity, date, from_party, \
             to_party, role, status, from_wallet, to_wallet, invoice_number, blockchain_order_id, \
             blockchain_tx_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user_id)
        .bind(data.part_name)
        .bind(data.tx_type.as_str())
        .bind(data.quantity)
        .bind(date)
        .bind(data.from_party)
        .bind(data.to_party)
        .bind(role.as_str())
        .bind(status.as_str())
        .bind(data.from_wallet)
        .bind(data.to_wallet)
        .bind(invoice_number)
        .bind(data.blockchain_order_id)
        .bind(data.blockchain_tx_hash)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &DbPool,
        id: i64,
        data: TransactionForUpdate,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE transactions SET ");
        let mut set = qb.separated(", ");

        if let Some(part_name) = data.part_name {
            set.push("part_name = ").push_bind_unseparated(part_name);
        }
        if let Some(quantity) = data.quantity {
            set.push("quantity = ").push_bind_unseparated(quantity);
        }
        if let Some(date) = data.date {
            set.push("date = ").push_bind_unseparated(date);
        }
        if let Some(from_party) = data.from_party {
            set.push("from_party = ").push_bind_unseparated(from_party);
        }
        if let Some(to_party) = data.to_party {
            set.push("to_party = ").push_bind_unseparated(to_party);
        }
        if let Some(from_wallet) = data.from_wallet {
            set.push("from_wallet = ").push_bind_unseparated(from_wallet);
        }
        if let Some(to_wallet) = data.to_wallet {
            set.push("to_wallet = ").push_bind_unseparated(to_wallet);
        }
        if let Some(invoice_number) = data.invoice_number {
            set.push("invoice_number = ").push_bind_unseparated(invoice_number);
        }
        if let Some(order_id) = data.blockchain_order_id {
            set.push("blockchain_order_id = ").push_bind_unseparated(order_id);
        }
        if let Some(tx_hash) = data.blockchain_tx_hash {
            set.push("blockchain_tx_hash = ").push_bind_unseparated(tx_hash);
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Transaction>().fetch_optional(pool).await
    }

    /// Set the status and approval stamp in one statement.
    pub async fn set_status(
        pool: &DbPool,
        id: i64,
        status: TransactionStatus,
        stamp: StatusStamp,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        query_as::<_, Transaction>(
            "UPDATE transactions SET status = ?, \
             approved_by = COALESCE(?, approved_by), \
             approved_at = COALESCE(?, approved_at), \
             rejection_reason = COALESCE(?, rejection_reason), \
             updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(status.as_str())
        .bind(stamp.approved_by)
        .bind(stamp.approved_at)
        .bind(stamp.rejection_reason)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Attach the on-chain order reference to a transaction.
    pub async fn set_chain_refs(
        pool: &DbPool,
        id: i64,
        order_id: &str,
        tx_hash: &str,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        query_as::<_, Transaction>(
            "UPDATE transactions SET blockchain_order_id = ?, blockchain_tx_hash = ?, updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(order_id)
        .bind(tx_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(pool)
            .await
    }

    pub async fn count_orphaned(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE user_id IS NOT NULL \
             AND user_id NOT IN (SELECT id FROM users)",
        )
        .fetch_one(pool)
        .await
    }

    pub async fn delete_orphaned(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM transactions WHERE user_id IS NOT NULL \
             AND user_id NOT IN (SELECT id FROM users)",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Rows with a zero or negative quantity, left behind by older clients.
    pub async fn count_non_positive(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE quantity <= 0")
            .fetch_one(pool)
            .await
    }

    pub async fn delete_non_positive(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE quantity <= 0")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::enums::TransactionType;
    use crate::model::store::memory_pool;

    fn payload(part: &str, quantity: i64) -> TransactionForCreate {
        TransactionForCreate {
            part_name: part.to_string(),
            tx_type: TransactionType::Demand,
            quantity,
            date: None,
            from_party: "Plant 1".to_string(),
            to_party: "Dealer".to_string(),
            role: None,
            from_wallet: None,
            to_wallet: None,
            invoice_number: None,
            blockchain_order_id: None,
            blockchain_tx_hash: None,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    async fn insert(pool: &DbPool, invoice: String, quantity: i64) -> Transaction {
        TransactionRepository::create(
            pool,
            Some(1),
            Role::Manufacturer,
            TransactionStatus::Pending,
            day(),
            invoice,
            payload("Bolt", quantity),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_invoice_sequence() {
        let pool = memory_pool().await.unwrap();

        let first = TransactionRepository::next_invoice_number(&pool, day()).await.unwrap();
        assert_eq!(first, "INV-20240309-000001");
        insert(&pool, first, 1).await;

        let second = TransactionRepository::next_invoice_number(&pool, day()).await.unwrap();
        assert_eq!(second, "INV-20240309-000002");

        let other_day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let fresh = TransactionRepository::next_invoice_number(&pool, other_day).await.unwrap();
        assert_eq!(fresh, "INV-20240310-000001");
    }

    #[tokio::test]
    async fn test_create_round_trip_fields() {
        let pool = memory_pool().await.unwrap();
        let tx = insert(&pool, "INV-20240309-000001".into(), 4).await;

        assert_eq!(tx.part_name, "Bolt");
        assert_eq!(tx.date, day());
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.role, Role::Manufacturer);
        assert!(tx.approved_by.is_none());
    }

    #[tokio::test]
    async fn test_set_status_stamps() {
        let pool = memory_pool().await.unwrap();
        let tx = insert(&pool, "INV-20240309-000001".into(), 4).await;
        let now = Utc::now();

        let approved = TransactionRepository::set_status(
            &pool,
            tx.id,
            TransactionStatus::Approved,
            StatusStamp {
                approved_by: Some("admin@example.com".into()),
                approved_at: Some(now),
                rejection_reason: None,
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(approved.status, TransactionStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("admin@example.com"));
        assert!(approved.approved_at.is_some());

        let completed = TransactionRepository::set_status(
            &pool,
            tx.id,
            TransactionStatus::Completed,
            StatusStamp::default(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(completed.approved_by.as_deref(), Some("admin@example.com"));
    }

    #[tokio::test]
    async fn test_list_by_status_and_cleanup() {
        let pool = memory_pool().await.unwrap();
        insert(&pool, "INV-20240309-000001".into(), 4).await;
        insert(&pool, "INV-20240309-000002".into(), 0).await;

        let pending = TransactionRepository::list_by_status(&pool, TransactionStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);

        assert_eq!(TransactionRepository::count_non_positive(&pool).await.unwrap(), 1);
        assert_eq!(TransactionRepository::delete_non_positive(&pool).await.unwrap(), 1);
        assert_eq!(TransactionRepository::count(&pool).await.unwrap(), 1);
    }
}
