//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

/// Query for GET /api/verify/sms_codes/{mobile}
#[derive(Debug, Clone, Deserialize)]
pub struct SmsCodeQuery {
    /// Id the client used when fetching the image code
    pub image_code_id: String,
    /// Text the user read from the image
    pub text: String,
}

/// Plain confirmation response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn ok() -> Self {
        Self {
            message: "OK".to_string(),
        }
    }
}
