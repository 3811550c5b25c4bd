// src/projector.rs
use alloy::primitives::Address;

use crate::classifier::{classify_amount_type, own_transfers, standard_for};
use crate::error::InvalidTransactionError;
use crate::models::{
    Activity, ActivityType, AddressParam, Amount, AmountType, RawTransaction, TokenInfo,
    TokenTransferRecord,
};

fn same_address(party: &AddressParam, address: &Address) -> bool {
    party
        .hash
        .parse::<Address>()
        .map_or(false, |a| a == *address)
}

fn label(from: &AddressParam, to: &AddressParam, address: &Address, minting: bool) -> ActivityType {
    match (same_address(from, address), same_address(to, address)) {
        (true, true) => ActivityType::SelfTransfer,
        (true, false) => ActivityType::Sent,
        (false, true) if minting => ActivityType::Minted,
        (false, true) => ActivityType::Received,
        (false, false) => ActivityType::ContractInteraction,
    }
}

fn involves(transfer: &TokenTransferRecord, address: &Address) -> bool {
    same_address(&transfer.from, address) || same_address(&transfer.to, address)
}

/// First transfer of the winning standard, preferring one the address took part in
fn select_transfer<'a>(
    tx: &'a RawTransaction,
    amount_type: AmountType,
    address: &Address,
) -> Option<&'a TokenTransferRecord> {
    let standard = standard_for(amount_type)?;
    let mut candidates = own_transfers(tx).filter(|t| t.token.token_type.as_ref() == Some(&standard));
    let first = candidates.next()?;
    if involves(first, address) {
        return Some(first);
    }
    candidates.find(|t| involves(t, address)).or(Some(first))
}

fn token_amount(transfer: &TokenTransferRecord, amount_type: AmountType) -> Amount {
    let total = transfer.total.clone().unwrap_or_default();
    let decimals = transfer
        .token
        .decimals
        .as_deref()
        .or(total.decimals.as_deref())
        .and_then(|d| d.parse::<u8>().ok())
        .unwrap_or(0);

    let (value, token_id) = match amount_type {
        AmountType::Erc20 => (total.value.unwrap_or_else(|| "0".to_string()), None),
        _ => (total.value.unwrap_or_else(|| "1".to_string()), total.token_id),
    };

    Amount {
        amount_type,
        value,
        token_id,
        token_info: TokenInfo {
            address: transfer.token.address_hash.clone(),
            decimals,
            name: transfer.token.name.clone().unwrap_or_default(),
            symbol: transfer.token.symbol.clone().unwrap_or_default(),
            token_type: amount_type,
            icon: transfer.token.icon_url.clone(),
        },
    }
}

/// Build the activity one transaction represents for `address`
pub fn project_activity(
    tx: &RawTransaction,
    address: &Address,
) -> Result<Activity, InvalidTransactionError> {
    let amount_type = classify_amount_type(tx)?;
    let from = tx.from.as_ref().ok_or(InvalidTransactionError::MissingField("from"))?;
    let to = tx.to.as_ref().ok_or(InvalidTransactionError::MissingField("to"))?;

    // Without a leg touching the address, the transaction's own parties decide the label
    let (activity_type, amount) = match select_transfer(tx, amount_type, address) {
        Some(transfer) if involves(transfer, address) => (
            label(&transfer.from, &transfer.to, address, transfer.is_minting()),
            token_amount(transfer, amount_type),
        ),
        Some(transfer) => (
            label(from, to, address, false),
            token_amount(transfer, amount_type),
        ),
        None => (
            label(from, to, address, false),
            Amount {
                amount_type: AmountType::Eth,
                value: tx.value.clone(),
                token_id: None,
                token_info: TokenInfo::native(),
            },
        ),
    };

    Ok(Activity {
        activity_type,
        amount,
        status: tx.result.clone(),
        transaction_id: tx.hash.clone(),
    })
}

/// Project a merged page of transactions, failing on the first malformed one
pub fn project_activities(
    transactions: &[RawTransaction],
    address: &Address,
) -> Result<Vec<Activity>, InvalidTransactionError> {
    transactions
        .iter()
        .map(|tx| project_activity(tx, address))
        .collect()
}
