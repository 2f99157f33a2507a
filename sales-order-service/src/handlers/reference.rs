use crate::reference::{ReferenceData, REFERENCE_DATA};
use axum::Json;

pub async fn reference_data() -> Json<ReferenceData> {
    Json(REFERENCE_DATA)
}
