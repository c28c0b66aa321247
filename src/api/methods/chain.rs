use crate::{
    api::{
        methods::app_state,
        types::{
            BalanceResponse, GetBalanceParams, GetTipParams, SubmitTransactionParams,
            SubmitTransactionResponse,
        },
    },
    error::{AppError, Result},
    ledger::{Transaction, accounts::Accounts, assets::TransactionPayload},
    services::canvas,
};

pub async fn get_tip(params: GetTipParams) -> Result<Option<u64>> {
    let app_state = app_state(params.state)?;
    app_state.chain.tip_height().await
}

pub async fn get_balance(params: GetBalanceParams) -> Result<BalanceResponse> {
    let app_state = app_state(params.state)?;
    let balance = Accounts::balance(app_state.chain.store().as_ref(), &params.address).await?;

    Ok(BalanceResponse {
        address: params.address,
        balance,
    })
}

/// Queues a transaction for the next block. Stateless checks run against the
/// next height so malformed payloads fail here rather than in the block.
pub async fn submit_transaction(
    params: SubmitTransactionParams,
) -> Result<SubmitTransactionResponse> {
    let app_state = app_state(params.state)?;

    let asset = hex::decode(params.asset.strip_prefix("0x").unwrap_or(&params.asset))
        .map_err(|_| AppError::InvalidParams("asset must be hex".into()))?;
    let payload = TransactionPayload::decode(params.module_id, params.asset_id, &asset)?;

    let next_height = app_state.chain.tip_height().await?.map_or(0, |tip| tip + 1);
    canvas::validate_payload(&payload, next_height)?;

    let transaction = Transaction::new(params.sender, params.nonce, params.fee, payload);
    let transaction_id = app_state.mempool.submit(transaction).await?;

    tracing::debug!(
        transaction_id = %transaction_id.to_hex(),
        sender = %params.sender,
        "Transaction queued"
    );

    Ok(SubmitTransactionResponse {
        transaction_id: transaction_id.to_hex(),
    })
}
