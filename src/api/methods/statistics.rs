use crate::{
    api::{methods::app_state, types::GetTotalTransactionsParams},
    error::Result,
    services::statistics,
};

pub async fn get_total_transactions(params: GetTotalTransactionsParams) -> Result<u64> {
    let app_state = app_state(params.state)?;
    statistics::get_total_transactions(app_state.chain.store().as_ref()).await
}
