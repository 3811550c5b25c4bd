// src/fixtures.rs
// Explorer payloads shared by the unit tests.
use crate::models::{RawTransaction, TokenTransferRecord, TokenTransferPage, TransactionPage};
use serde_json::{json, Value};

pub const ADDR_A: &str = "0x7e0bCc78a4c123b1612dd272d1371c171404622d";
pub const ADDR_B: &str = "0x361866eD9d439536b3216fdaeeb975729f574655";
pub const ADDR_SELF: &str = "0x1AC80cE0ae923d5a4fd12aabfe228f219e10EB3F";
pub const TOKEN_LSK: &str = "0xac485391EB2d7D88253a7F1eF18C37f4242D1A24";
pub const TOKEN_NFT: &str = "0xb081006f7e3dfc967a64cb14028d512c9791e558";

pub const TX_SENT: &str = "0xc24ea39f9cb0eb53f16947ccf25ec84d8dbc74254770f58904dba41ecccc31bd";
pub const TX_SELF: &str = "0xfc1626e53a13043b026c48bbf33feff9243a8f506b40928b5b7a767c76fb008f";
pub const TX_LSK: &str = "0x86bebb2737f6a6f0fb23c6f5da2cec255404e4fb440034d6608697a8d41bed44";
pub const TX_NFT: &str = "0x0e50454f31af3176813e02ea68ef786e4d3cea27d26934b484e73cf575dcad6b";

fn address(hash: &str) -> Value {
    json!({
        "hash": hash,
        "is_contract": false,
        "is_verified": false,
        "name": null
    })
}

pub fn tx_json(hash: &str, from: &str, to: &str, value: &str) -> Value {
    json!({
        "hash": hash,
        "from": address(from),
        "to": address(to),
        "value": value,
        "method": null,
        "decoded_input": null,
        "token_transfers": [],
        "token_transfers_overflow": false,
        "transaction_types": ["coin_transfer"],
        "status": "ok",
        "result": "success",
        "timestamp": "2024-11-06T15:41:14.000000Z",
        "block_number": 100,
        "exchange_rate": "2534.12"
    })
}

pub fn transfer_json(
    tx_hash: &str,
    log_index: u64,
    token_type: &str,
    from: &str,
    to: &str,
    total: Value,
) -> Value {
    let token = if token_type == "ERC-20" {
        json!({
            "address_hash": TOKEN_LSK,
            "name": "Lisk",
            "symbol": "LSK",
            "decimals": "18",
            "type": token_type,
            "icon_url": null
        })
    } else {
        json!({
            "address_hash": TOKEN_NFT,
            "name": "Panna Collectibles",
            "symbol": "PNC",
            "decimals": null,
            "type": token_type,
            "icon_url": "https://example.org/pnc.png"
        })
    };

    json!({
        "transaction_hash": tx_hash,
        "log_index": log_index,
        "block_number": 100,
        "token": token,
        "total": total,
        "from": address(from),
        "to": address(to),
        "type": "token_transfer"
    })
}

pub fn at_block(mut v: Value, block_number: u64) -> Value {
    v["block_number"] = json!(block_number);
    v
}

pub fn tx(v: Value) -> RawTransaction {
    serde_json::from_value(v).unwrap()
}

pub fn transfer(v: Value) -> TokenTransferRecord {
    serde_json::from_value(v).unwrap()
}

pub fn tx_page(items: Vec<Value>, next_page_params: Value) -> TransactionPage {
    serde_json::from_value(json!({ "items": items, "next_page_params": next_page_params })).unwrap()
}

pub fn transfer_page(items: Vec<Value>, next_page_params: Value) -> TokenTransferPage {
    serde_json::from_value(json!({ "items": items, "next_page_params": next_page_params })).unwrap()
}

/// Native coin sent from A to B
pub fn sent_eth() -> Value {
    tx_json(TX_SENT, ADDR_A, ADDR_B, "100000000000000")
}

/// Native coin sent from an address to itself
pub fn self_transfer() -> Value {
    tx_json(TX_SELF, ADDR_SELF, ADDR_SELF, "1000000000")
}

/// 2 LSK sent from A to B through the token contract
pub fn lsk_transfer() -> Value {
    let mut v = tx_json(TX_LSK, ADDR_A, TOKEN_LSK, "0");
    v["method"] = json!("transfer");
    v["transaction_types"] = json!(["token_transfer", "contract_call"]);
    v["token_transfers"] = json!([transfer_json(
        TX_LSK,
        0,
        "ERC-20",
        ADDR_A,
        ADDR_B,
        json!({ "value": "2000000000000000000", "decimals": "18" })
    )]);
    v
}
