use crate::{error::Error, state::AppState};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use libgeoloc::{
    geojson::{self, Feature, FeatureCollection},
    location::Filter,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{Instrument, debug, info};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/locations/", get(list_locations).post(add_location))
        .route("/locations/geojson/", get(list_locations))
        .route(
            "/locations/statistics/",
            get(super::statistics::show_statistics),
        )
        .route(
            "/locations/{id}/",
            get(show_location)
                .put(replace_location)
                .patch(modify_location)
                .delete(delete_location),
        )
}

#[derive(Deserialize)]
struct ListParams {
    category: Option<String>,
}

async fn list_locations(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<FeatureCollection>, Error> {
    let Query(params) = query?;
    let span = state.log.operation("list");
    async move {
        let filter = params.category.map(|c| Filter::Category(Some(c)));
        let locations = state.store.list(filter).await?;
        debug!(count = locations.len(), "listing locations");
        Ok::<_, Error>(Json(locations.iter().collect()))
    }
    .instrument(span)
    .await
}

async fn show_location(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Feature>, Error> {
    let Path(id) = path?;
    let span = state.log.operation("retrieve");
    async move {
        let location = state.store.get(id).await?;
        Ok::<_, Error>(Json(location.into()))
    }
    .instrument(span)
    .await
}

async fn add_location(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Feature>), Error> {
    let span = state.log.operation("create");
    async move {
        let Json(body) = payload?;
        let location = geojson::decode(body)?.into_location()?;
        let location = state.store.insert(location).await?;
        info!(id = location.id, name = %location.name, "created location");
        Ok::<_, Error>((StatusCode::CREATED, Json(location.into())))
    }
    .instrument(span)
    .await
}

async fn replace_location(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Feature>, Error> {
    let Path(id) = path?;
    let span = state.log.operation("update");
    async move {
        let mut location = state.store.get(id).await?;
        let Json(body) = payload?;
        geojson::decode(body)?.replace(&mut location)?;
        state.store.update(&location).await?;
        info!(id, "replaced location");
        Ok::<_, Error>(Json(location.into()))
    }
    .instrument(span)
    .await
}

async fn modify_location(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Feature>, Error> {
    let Path(id) = path?;
    let span = state.log.operation("partial_update");
    async move {
        let mut location = state.store.get(id).await?;
        let Json(body) = payload?;
        geojson::decode(body)?.apply_to(&mut location);
        state.store.update(&location).await?;
        info!(id, "modified location");
        Ok::<_, Error>(Json(location.into()))
    }
    .instrument(span)
    .await
}

async fn delete_location(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(id) = path?;
    let span = state.log.operation("destroy");
    async move {
        state.store.delete(id).await?;
        info!(id, "deleted location");
        Ok::<_, Error>(StatusCode::NO_CONTENT)
    }
    .instrument(span)
    .await
}
