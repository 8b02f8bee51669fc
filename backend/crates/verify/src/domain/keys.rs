//! Cache Key Layout
//!
//! Every verification entry lives in the TTL store under one of these
//! prefixes:
//!
//! ```text
//! img_<image_code_id>     → image code text
//! sms_<mobile>            → sms code digits
//! send_flag_<mobile>      → "1" while resends are blocked
//! ```

use crate::domain::value_objects::{ImageCodeId, Mobile};

/// Key holding the image code text for an image code id
pub fn image_code(image_code_id: &ImageCodeId) -> String {
    format!("img_{}", image_code_id.as_str())
}

/// Key holding the sms code for a mobile number
pub fn sms_code(mobile: &Mobile) -> String {
    format!("sms_{}", mobile.as_str())
}

/// Key flagging that an sms was sent to a mobile recently
pub fn send_flag(mobile: &Mobile) -> String {
    format!("send_flag_{}", mobile.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        let id = ImageCodeId::new("b9f164f2-1df9-44b0-a3f8-1c2e9e4a0a6f").unwrap();
        let mobile = Mobile::new("13800001111").unwrap();

        assert_eq!(
            image_code(&id),
            "img_b9f164f2-1df9-44b0-a3f8-1c2e9e4a0a6f"
        );
        assert_eq!(sms_code(&mobile), "sms_13800001111");
        assert_eq!(send_flag(&mobile), "send_flag_13800001111");
    }
}
