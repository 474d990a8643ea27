use axum::{Json, extract::Query};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::data::videos::videos_by_category;
use crate::utils::errorhandler::AppError;

#[derive(Deserialize)]
pub struct VideoParams {
    pub category: Option<String>,
    pub search: Option<String>,
}

pub async fn get_videos(Query(params): Query<VideoParams>) -> Result<Json<Value>, AppError> {
    let category = params
        .category
        .ok_or_else(|| AppError::invalid_request("Category is required"))?;

    let videos = videos_by_category(&category, params.search.as_deref())?;

    Ok(Json(json!({
        "status": "success",
        "data": videos
    })))
}
