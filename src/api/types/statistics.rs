use serde::Deserialize;

use crate::AppState;

#[derive(Deserialize)]
pub struct GetTotalTransactionsParams {
    #[serde(skip)]
    pub state: Option<AppState>,
}
