// src/models.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Sentinel address used for the chain's native coin
pub const NATIVE_TOKEN_ADDRESS: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";
pub const NATIVE_TOKEN_DECIMALS: u8 = 18;
pub const NATIVE_TOKEN_NAME: &str = "Ether";
pub const NATIVE_TOKEN_SYMBOL: &str = "ETH";
pub const NATIVE_TOKEN_ICON: &str = "/assets/tokens/eth.svg";

// ---------- Explorer payloads ----------

/// Address descriptor attached to transactions and transfers
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AddressParam {
    pub hash: String,
    #[serde(default)]
    pub is_contract: bool,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DecodedParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DecodedInput {
    pub method_call: String,
    pub method_id: String,
    #[serde(default)]
    pub parameters: Vec<DecodedParameter>,
}

/// Coarse tags the explorer puts on a transaction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    CoinTransfer,
    ContractCall,
    TokenTransfer,
    Other(String),
}

impl From<String> for TransactionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "coin_transfer" => TransactionType::CoinTransfer,
            "contract_call" => TransactionType::ContractCall,
            "token_transfer" => TransactionType::TokenTransfer,
            _ => TransactionType::Other(s),
        }
    }
}

impl From<TransactionType> for String {
    fn from(t: TransactionType) -> Self {
        match t {
            TransactionType::CoinTransfer => "coin_transfer".to_string(),
            TransactionType::ContractCall => "contract_call".to_string(),
            TransactionType::TokenTransfer => "token_transfer".to_string(),
            TransactionType::Other(s) => s,
        }
    }
}

/// Token standard as reported by the explorer's token metadata
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum TokenStandard {
    Erc20,
    Erc721,
    Erc1155,
    Unrecognized(String),
}

impl From<String> for TokenStandard {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ERC-20" => TokenStandard::Erc20,
            "ERC-721" => TokenStandard::Erc721,
            "ERC-1155" => TokenStandard::Erc1155,
            _ => TokenStandard::Unrecognized(s),
        }
    }
}

impl From<TokenStandard> for String {
    fn from(t: TokenStandard) -> Self {
        match t {
            TokenStandard::Erc20 => "ERC-20".to_string(),
            TokenStandard::Erc721 => "ERC-721".to_string(),
            TokenStandard::Erc1155 => "ERC-1155".to_string(),
            TokenStandard::Unrecognized(s) => s,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TokenMeta {
    #[serde(alias = "address")]
    pub address_hash: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<String>, // explorer sends a string, null for most NFTs
    #[serde(rename = "type", default)]
    pub token_type: Option<TokenStandard>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TransferTotal {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub decimals: Option<String>,
    #[serde(default)]
    pub token_id: Option<String>,
}

/// One token movement emitted by a transaction
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TokenTransferRecord {
    #[serde(alias = "tx_hash")]
    pub transaction_hash: String,
    #[serde(deserialize_with = "u64_from_str_or_int")]
    pub log_index: u64,
    #[serde(default)]
    pub block_number: Option<u64>,
    pub token: TokenMeta,
    #[serde(default)]
    pub total: Option<TransferTotal>,
    pub from: AddressParam,
    pub to: AddressParam,
    #[serde(rename = "type", default)]
    pub transfer_type: Option<String>, // token_transfer | token_minting | ...
}

impl TokenTransferRecord {
    pub fn is_minting(&self) -> bool {
        self.transfer_type.as_deref() == Some("token_minting")
    }
}

/// One transaction as returned by the explorer's address transaction list
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub from: Option<AddressParam>,
    #[serde(default)]
    pub to: Option<AddressParam>,
    #[serde(default)]
    pub value: String, // wei, decimal string
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub decoded_input: Option<DecodedInput>,
    /// `None` means the endpoint left them out and they must be merged in
    #[serde(default)]
    pub token_transfers: Option<Vec<TokenTransferRecord>>,
    #[serde(default)]
    pub token_transfers_overflow: Option<bool>,
    #[serde(default)]
    pub transaction_types: Vec<TransactionType>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "block")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
}

/// Opaque explorer cursor, forwarded untouched to the next request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PageParams(pub Map<String, Value>);

impl PageParams {
    /// Render the cursor as query parameters
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TransactionPage {
    pub items: Vec<RawTransaction>,
    #[serde(default)]
    pub next_page_params: Option<PageParams>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TokenTransferPage {
    pub items: Vec<TokenTransferRecord>,
    #[serde(default)]
    pub next_page_params: Option<PageParams>,
}

fn u64_from_str_or_int<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrInt {
        Int(u64),
        Str(String),
    }

    match StrOrInt::deserialize(deserializer)? {
        StrOrInt::Int(n) => Ok(n),
        StrOrInt::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

// ---------- Public projection ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountType {
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC1155")]
    Erc1155,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    Sent,
    Received,
    #[serde(rename = "Self transfer")]
    SelfTransfer,
    Minted,
    #[serde(rename = "Contract interaction")]
    ContractInteraction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub token_type: AmountType,
    pub icon: Option<String>,
}

impl TokenInfo {
    pub fn native() -> Self {
        Self {
            address: NATIVE_TOKEN_ADDRESS.to_string(),
            decimals: NATIVE_TOKEN_DECIMALS,
            name: NATIVE_TOKEN_NAME.to_string(),
            symbol: NATIVE_TOKEN_SYMBOL.to_string(),
            token_type: AmountType::Eth,
            icon: Some(NATIVE_TOKEN_ICON.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    #[serde(rename = "type")]
    pub amount_type: AmountType,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    pub token_info: TokenInfo,
}

/// User-facing view of a transaction from one address's perspective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub activity_type: ActivityType,
    pub amount: Amount,
    pub status: String,
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: crate::config::DEFAULT_PAGINATION_OFFSET,
            limit: crate::config::DEFAULT_PAGINATION_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub count: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPage {
    pub activities: Vec<Activity>,
    pub metadata: PageMetadata,
}
