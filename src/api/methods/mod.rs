use crate::{
    AppState,
    error::{AppError, Result},
};

pub mod canvas;
pub mod chain;
pub mod statistics;
pub mod view;

fn app_state(state: Option<AppState>) -> Result<AppState> {
    state.ok_or(AppError::InternalServerError(
        "Failed to get app state".to_string(),
    ))
}
