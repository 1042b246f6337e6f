use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct CreateUrlForm {
    pub long: String,
}

#[derive(Deserialize)]
pub struct DeleteUrlForm {
    pub short: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
