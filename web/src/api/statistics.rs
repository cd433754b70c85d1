use crate::{error::Error, state::AppState};
use axum::{Json, extract::State};
use libgeoloc::statistics::Statistics;
use tracing::{Instrument, debug};

pub(crate) async fn show_statistics(
    State(state): State<AppState>,
) -> Result<Json<Statistics>, Error> {
    let span = state.log.operation("statistics");
    async move {
        let stats = state.store.statistics().await?;
        debug!(
            total = stats.total_locations,
            groups = stats.category_counts.len(),
            "computed statistics"
        );
        Ok::<_, Error>(Json(stats))
    }
    .instrument(span)
    .await
}
