use serde::Serialize;

use crate::models::payment::{Payment, PaymentStatus};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct WalletStats {
    /// Released funds.
    pub total_balance: i64,
    /// Funds still held in escrow.
    pub pending_balance: i64,
    pub total_earned: i64,
    pub completed_payments: usize,
}

pub fn compute_wallet_stats<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> WalletStats {
    payments
        .into_iter()
        .fold(WalletStats::default(), |mut stats, payment| {
            let amount = i64::from(payment.amount);
            match payment.status {
                PaymentStatus::Released => {
                    stats.total_balance += amount;
                    stats.completed_payments += 1;
                }
                PaymentStatus::Escrow => stats.pending_balance += amount,
            }
            stats.total_earned += amount;
            stats
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn payment(amount: i32, status: PaymentStatus) -> Payment {
        let now = Utc::now();
        Payment {
            id: Uuid::new_v4(),
            interview_id: Uuid::new_v4(),
            amount,
            currency: "USD".to_string(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_wallet() {
        assert_eq!(compute_wallet_stats(&Vec::<Payment>::new()), WalletStats::default());
    }

    #[test]
    fn test_mixed_statuses() {
        let payments = vec![
            payment(100, PaymentStatus::Released),
            payment(250, PaymentStatus::Escrow),
            payment(50, PaymentStatus::Released),
        ];
        let stats = compute_wallet_stats(&payments);
        assert_eq!(stats.total_balance, 150);
        assert_eq!(stats.pending_balance, 250);
        assert_eq!(stats.total_earned, 400);
        assert_eq!(stats.completed_payments, 2);
    }

    #[test]
    fn test_sums_do_not_overflow_i32() {
        let payments = vec![
            payment(i32::MAX, PaymentStatus::Released),
            payment(i32::MAX, PaymentStatus::Released),
        ];
        let stats = compute_wallet_stats(&payments);
        assert_eq!(stats.total_balance, 2 * i64::from(i32::MAX));
    }
}
