use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::route::AppState;
use crate::route::bookings::{cancel_booking, complete_booking, create_booking};
use crate::route::timeslots::get_availability;
use crate::route::videos::get_videos;

pub fn create_router(state: AppState) -> Router {
    Router::new()
    .route("/", get(home))
    //booking
    .route("/api/create-booking", post(create_booking))           //book consecutive one-hour slots
    .route("/api/bookings/{id}/cancel", post(cancel_booking))     //one-way transition, idempotent
    .route("/api/bookings/{id}/complete", post(complete_booking)) //one-way transition, idempotent
    //timeslots
    .route("/api/availability", get(get_availability))            //booking counts per existing slot in range
    //static content
    .route("/api/videos", get(get_videos))                        //BSL video lookup by category
    .with_state(state)
}

async fn home() -> Json<Value> {
    Json(json!({"message": "Welcome to the Timeslot Scheduling Tool"}))
}
