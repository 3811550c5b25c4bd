// src/classifier.rs
use crate::error::InvalidTransactionError;
use crate::models::{AmountType, RawTransaction, TokenStandard, TokenTransferRecord};

/// Check the fields every activity needs before it can be labelled
pub fn validate(tx: &RawTransaction) -> Result<(), InvalidTransactionError> {
    if tx.hash.trim().is_empty() {
        return Err(InvalidTransactionError::MissingField("hash"));
    }
    if tx.from.as_ref().map_or(true, |a| a.hash.is_empty()) {
        return Err(InvalidTransactionError::MissingField("from"));
    }
    if tx.to.as_ref().map_or(true, |a| a.hash.is_empty()) {
        return Err(InvalidTransactionError::MissingField("to"));
    }
    Ok(())
}

/// Transfers emitted by this transaction, skipping strays from other hashes
pub fn own_transfers(tx: &RawTransaction) -> impl Iterator<Item = &TokenTransferRecord> {
    tx.token_transfers
        .iter()
        .flatten()
        .filter(move |t| t.transaction_hash.eq_ignore_ascii_case(&tx.hash))
}

/// Decide what kind of value a transaction moves.
///
/// NFT standards win over fungible ones: ERC-721 > ERC-1155 > ERC-20. Any
/// token type outside those three is rejected rather than guessed at.
pub fn classify_amount_type(tx: &RawTransaction) -> Result<AmountType, InvalidTransactionError> {
    if tx.token_transfers.is_none() {
        return Err(InvalidTransactionError::MissingTokenTransfers);
    }
    validate(tx)?;

    let mut transfers = own_transfers(tx).peekable();
    if transfers.peek().is_none() {
        return Ok(AmountType::Eth);
    }

    let mut best: Option<AmountType> = None;
    for transfer in transfers {
        let kind = match &transfer.token.token_type {
            Some(TokenStandard::Erc721) => AmountType::Erc721,
            Some(TokenStandard::Erc1155) => AmountType::Erc1155,
            Some(TokenStandard::Erc20) => AmountType::Erc20,
            Some(TokenStandard::Unrecognized(s)) => {
                return Err(InvalidTransactionError::UnrecognizedTokenType(s.clone()))
            }
            None => continue,
        };
        if best.map_or(true, |b| precedence(kind) > precedence(b)) {
            best = Some(kind);
        }
    }

    best.ok_or(InvalidTransactionError::MissingTokenType)
}

fn precedence(t: AmountType) -> u8 {
    match t {
        AmountType::Eth => 0,
        AmountType::Erc20 => 1,
        AmountType::Erc1155 => 2,
        AmountType::Erc721 => 3,
    }
}

/// The token standard a classified amount type corresponds to
pub fn standard_for(t: AmountType) -> Option<TokenStandard> {
    match t {
        AmountType::Eth => None,
        AmountType::Erc20 => Some(TokenStandard::Erc20),
        AmountType::Erc721 => Some(TokenStandard::Erc721),
        AmountType::Erc1155 => Some(TokenStandard::Erc1155),
    }
}
