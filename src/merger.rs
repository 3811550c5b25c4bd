// src/merger.rs
use std::collections::HashMap;

use crate::models::{RawTransaction, TokenTransferRecord};

/// True when at least one transaction still needs its transfers merged in
pub fn needs_merge(transactions: &[RawTransaction]) -> bool {
    transactions.iter().any(|tx| tx.token_transfers.is_none())
}

/// Splice token transfers into the transactions that came back without them.
///
/// Only `token_transfers: None` is filled. It ends up as the transfers whose
/// `transaction_hash` matches, sorted by `log_index`, or an empty list.
/// Populated transactions pass through untouched, and the caller's slice is
/// never modified.
pub fn merge_token_transfers(
    transactions: &[RawTransaction],
    transfers: &[TokenTransferRecord],
) -> Vec<RawTransaction> {
    let mut by_hash: HashMap<String, Vec<&TokenTransferRecord>> = HashMap::new();
    for transfer in transfers {
        by_hash
            .entry(transfer.transaction_hash.to_ascii_lowercase())
            .or_default()
            .push(transfer);
    }

    transactions
        .iter()
        .map(|tx| {
            let mut merged = tx.clone();
            if merged.token_transfers.is_none() {
                let mut matched: Vec<TokenTransferRecord> = by_hash
                    .get(&tx.hash.to_ascii_lowercase())
                    .map(|list| list.iter().map(|t| (*t).clone()).collect())
                    .unwrap_or_default();
                matched.sort_by_key(|t| t.log_index);
                matched.dedup_by_key(|t| t.log_index);
                merged.token_transfers = Some(matched);
            }
            merged
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, ADDR_A, ADDR_B, TX_LSK, TX_SENT};
    use serde_json::json;

    fn unmerged(mut v: serde_json::Value) -> RawTransaction {
        v["token_transfers"] = json!(null);
        fixtures::tx(v)
    }

    fn lsk_leg(log_index: u64) -> TokenTransferRecord {
        fixtures::transfer(fixtures::transfer_json(
            TX_LSK,
            log_index,
            "ERC-20",
            ADDR_A,
            ADDR_B,
            json!({ "value": "1" }),
        ))
    }

    #[test]
    fn fills_missing_transfers_in_log_index_order() {
        let txs = vec![unmerged(fixtures::lsk_transfer())];
        let transfers = vec![lsk_leg(4), lsk_leg(1), lsk_leg(2)];

        let merged = merge_token_transfers(&txs, &transfers);

        let indexes: Vec<u64> = merged[0]
            .token_transfers
            .as_ref()
            .unwrap()
            .iter()
            .map(|t| t.log_index)
            .collect();
        assert_eq!(indexes, vec![1, 2, 4]);
    }

    #[test]
    fn unmatched_transactions_get_an_empty_list() {
        let txs = vec![unmerged(fixtures::sent_eth())];
        let merged = merge_token_transfers(&txs, &[lsk_leg(0)]);

        assert_eq!(merged[0].token_transfers, Some(vec![]));
    }

    #[test]
    fn populated_transactions_are_left_alone() {
        let txs = vec![fixtures::tx(fixtures::lsk_transfer())];
        let merged = merge_token_transfers(&txs, &[lsk_leg(7), lsk_leg(8)]);

        assert_eq!(merged, txs);
    }

    #[test]
    fn merge_is_idempotent_and_keeps_order() {
        let txs = vec![
            unmerged(fixtures::sent_eth()),
            unmerged(fixtures::lsk_transfer()),
        ];
        let transfers = vec![lsk_leg(0)];

        let once = merge_token_transfers(&txs, &transfers);
        let twice = merge_token_transfers(&once, &transfers);

        assert_eq!(once, twice);
        assert_eq!(once[0].hash, TX_SENT);
        assert_eq!(once[1].hash, TX_LSK);
    }

    #[test]
    fn input_slice_is_not_modified() {
        let txs = vec![unmerged(fixtures::lsk_transfer())];
        let _ = merge_token_transfers(&txs, &[lsk_leg(0)]);

        assert!(txs[0].token_transfers.is_none());
        assert!(needs_merge(&txs));
    }

    #[test]
    fn hash_matching_ignores_case() {
        let txs = vec![unmerged(fixtures::lsk_transfer())];
        let mut leg = lsk_leg(0);
        leg.transaction_hash = TX_LSK.to_ascii_uppercase().replacen("0X", "0x", 1);

        let merged = merge_token_transfers(&txs, &[leg]);
        assert_eq!(merged[0].token_transfers.as_ref().unwrap().len(), 1);
    }
}
