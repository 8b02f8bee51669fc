//! Domain Services
//!
//! Code generation for the verification domain.

use captcha::Captcha;
use captcha::filters::{Noise, Wave};

/// Render a random image verification code
///
/// Returns the code text together with the rendered PNG bytes, or
/// `None` if rendering fails.
pub fn generate_image_code(chars: usize) -> Option<(String, Vec<u8>)> {
    let mut captcha = Captcha::new();
    captcha
        .add_chars(chars as u32)
        .apply_filter(Noise::new(0.2))
        .apply_filter(Wave::new(2.0, 10.0).horizontal())
        .view(220, 120);

    let text = captcha.chars_as_string();
    captcha.as_png().map(|png| (text, png))
}

/// Generate a zero-padded numeric sms code
pub fn generate_sms_code(digits: usize) -> String {
    platform::crypto::random_numeric_code(digits)
}
