use serde::{Deserialize, Serialize};

use crate::{AppState, ledger::Address};

#[derive(Deserialize)]
pub struct GetTipParams {
    #[serde(skip)]
    pub state: Option<AppState>,
}

#[derive(Deserialize)]
pub struct GetBalanceParams {
    pub address: Address,

    #[serde(skip)]
    pub state: Option<AppState>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub address: Address,
    pub balance: u64,
}

/// A transaction as submitted over RPC. `asset` is the hex of the encoded asset.
#[derive(Deserialize)]
pub struct SubmitTransactionParams {
    pub sender: Address,
    pub nonce: u64,

    #[serde(default)]
    pub fee: u64,
    pub module_id: u32,
    pub asset_id: u32,
    pub asset: String,

    #[serde(skip)]
    pub state: Option<AppState>,
}

#[derive(Debug, Serialize)]
pub struct SubmitTransactionResponse {
    pub transaction_id: String,
}
