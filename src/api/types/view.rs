use serde::Deserialize;

use crate::AppState;

#[derive(Deserialize)]
pub struct GetViewParams {
    pub canvas_id: u32,

    #[serde(skip)]
    pub state: Option<AppState>,
}
