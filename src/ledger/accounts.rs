use crate::{
    error::{AppError, Result},
    ledger::{
        address::Address,
        entities::{AddressRecord, BalanceRecord},
        keys::StateKey,
        store::{StateBatch, StateReader, read_record},
    },
};

/// Token balances kept in the ledger store so that fee movements share the
/// transaction's batch.
pub struct Accounts;

impl Accounts {
    pub async fn balance(reader: &dyn StateReader, address: &Address) -> Result<u64> {
        Ok(
            read_record::<BalanceRecord>(reader, &StateKey::balance(address))
                .await?
                .map_or(0, |record| record.amount),
        )
    }

    pub async fn debit(batch: &mut StateBatch<'_>, address: &Address, amount: u64) -> Result<()> {
        let balance = Self::balance(&*batch, address).await?;
        let remaining = balance
            .checked_sub(amount)
            .ok_or(AppError::InsufficientFunds {
                balance,
                required: amount,
            })?;

        batch.set_record(
            StateKey::balance(address),
            &BalanceRecord { amount: remaining },
        );
        Ok(())
    }

    pub async fn credit(batch: &mut StateBatch<'_>, address: &Address, amount: u64) -> Result<()> {
        let balance = Self::balance(&*batch, address).await?;
        let updated = balance.checked_add(amount).ok_or_else(|| {
            AppError::Inconsistency(format!("balance overflow for {address}"))
        })?;

        batch.set_record(StateKey::balance(address), &BalanceRecord { amount: updated });
        Ok(())
    }
}

pub async fn get_admin_address(reader: &dyn StateReader) -> Result<Option<Address>> {
    role_address(reader, StateKey::ADMIN_ADDRESS).await
}

pub async fn get_wallet_address(reader: &dyn StateReader) -> Result<Option<Address>> {
    role_address(reader, StateKey::WALLET_ADDRESS).await
}

async fn role_address(reader: &dyn StateReader, key: &str) -> Result<Option<Address>> {
    match read_record::<AddressRecord>(reader, key).await? {
        Some(record) => Ok(Some(Address::from_slice(&record.address)?)),
        None => Ok(None),
    }
}
