use std::collections::HashMap;

use crate::{
    error::{AppError, Result},
    ledger::{
        StateBatch,
        entities::{Canvas, CanvasState},
        keys::StateKey,
    },
    services::canvas::{
        query::get_canvas,
        types::{LifecyclePlan, LifecycleSets, Transition},
    },
};

/// Computes the canvas transitions for one committed block.
///
/// The pending pass runs first. The active pass walks the active ids as they were
/// loaded, so a canvas started in this block is not considered for completion
/// until the next one.
pub fn plan_transitions(
    sets: &LifecycleSets,
    canvases: &HashMap<u32, Canvas>,
    height: u64,
) -> Result<LifecyclePlan> {
    let mut pending = Vec::new();
    let mut active = Vec::new();
    let mut complete = sets.complete.clone();
    let mut updated = Vec::new();
    let mut transitions = Vec::new();

    for &canvas_id in &sets.pending {
        let canvas = expect_state(canvases, canvas_id, CanvasState::Pending)?;

        if canvas.start_block_height <= height {
            let mut started = canvas.clone();
            started.state = CanvasState::Active;
            updated.push((canvas_id, started));
            active.push(canvas_id);
            transitions.push(Transition::Started(canvas_id));
        } else {
            pending.push(canvas_id);
        }
    }

    for &canvas_id in &sets.active {
        let canvas = expect_state(canvases, canvas_id, CanvasState::Active)?;

        if canvas.end_block_height <= height {
            let mut completed = canvas.clone();
            completed.state = CanvasState::Complete;
            updated.push((canvas_id, completed));
            complete.push(canvas_id);
            transitions.push(Transition::Completed(canvas_id));
        } else {
            active.push(canvas_id);
        }
    }

    Ok(LifecyclePlan {
        sets: LifecycleSets {
            pending,
            active,
            complete,
        },
        updated,
        transitions,
    })
}

fn expect_state(
    canvases: &HashMap<u32, Canvas>,
    canvas_id: u32,
    expected: CanvasState,
) -> Result<&Canvas> {
    let canvas = canvases.get(&canvas_id).ok_or_else(|| {
        AppError::Inconsistency(format!("canvas {canvas_id} listed but not stored"))
    })?;

    if canvas.state != expected {
        return Err(AppError::Inconsistency(format!(
            "canvas {canvas_id} listed as {} but stored as {}",
            expected.as_str(),
            canvas.state.as_str()
        )));
    }

    Ok(canvas)
}

/// Loads the sets, applies the plan for `height` and stores the result in `batch`.
pub async fn run_lifecycle(batch: &mut StateBatch<'_>, height: u64) -> Result<Vec<Transition>> {
    let sets = LifecycleSets::load(&*batch).await?;

    let mut canvases = HashMap::new();
    for &canvas_id in sets.pending.iter().chain(&sets.active) {
        if let Some(canvas) = get_canvas(&*batch, canvas_id).await? {
            canvases.insert(canvas_id, canvas);
        }
    }

    let plan = plan_transitions(&sets, &canvases, height)?;

    for (canvas_id, canvas) in &plan.updated {
        batch.set(StateKey::canvas(*canvas_id), canvas.encode());
    }
    plan.sets.store(batch);

    for transition in &plan.transitions {
        match transition {
            Transition::Started(canvas_id) => {
                tracing::info!(canvas_id, height, "Canvas started")
            }
            Transition::Completed(canvas_id) => {
                tracing::info!(canvas_id, height, "Canvas completed")
            }
        }
    }

    Ok(plan.transitions)
}
