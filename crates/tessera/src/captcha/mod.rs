//! Image captcha generation.
//!
//! Five random letters are drawn over a background image, written as a JPEG
//! into a temp directory, and handed out with a salted hash of the letters.
//! Old temp images are pruned on every generation.

mod generator;
mod temp;

pub use generator::CaptchaGenerator;
