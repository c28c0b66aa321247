use crate::ledger::address::Address;

pub struct StateKey;

impl StateKey {
    pub const PENDING: &'static str = "canvas:pending";
    pub const ACTIVE: &'static str = "canvas:active";
    pub const COMPLETE: &'static str = "canvas:complete";
    pub const ADMIN_ADDRESS: &'static str = "canvas:adminAddress";
    pub const WALLET_ADDRESS: &'static str = "canvas:walletAddress";
    pub const CHAIN_TIP: &'static str = "chain:tip";
    pub const TOTAL_TRANSACTIONS: &'static str = "statistics:totalTransactions";

    pub fn canvas(canvas_id: u32) -> String {
        format!("canvas-{canvas_id}")
    }

    pub fn draw_cooldown(canvas_id: u32, address: &Address) -> String {
        format!("canvas-{canvas_id}-account-{}", address.to_hex())
    }

    pub fn pixel(canvas_id: u32, x: u32, y: u32) -> String {
        format!("canvas-{canvas_id}-pixel-{x}-{y}")
    }

    pub fn balance(address: &Address) -> String {
        format!("token:balance-{}", address.to_hex())
    }

    pub fn block(height: u64) -> String {
        format!("chain:block-{height}")
    }
}
