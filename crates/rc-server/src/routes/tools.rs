//! External engine availability report.

use axum::extract::State;
use axum::Json;

use rc_engines::ToolInfo;

use crate::context::AppContext;

/// GET /api/tools
///
/// Version detection shells out to each discovered tool, so the check runs
/// on the blocking pool.
pub async fn list_tools(State(ctx): State<AppContext>) -> Json<Vec<ToolInfo>> {
    let tools = ctx.tools.clone();
    let infos = tokio::task::spawn_blocking(move || tools.check_all())
        .await
        .unwrap_or_default();
    Json(infos)
}
