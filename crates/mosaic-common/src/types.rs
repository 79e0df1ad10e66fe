//! Wire types shared across Mosaic components.

use serde::{Deserialize, Serialize};

/// JSON body of an asynchronous partial-page response.
///
/// Every field is always present; a block that does not exist in the
/// template renders as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialPayload {
    /// `{node}` block
    pub html: String,
    /// `{node}_styles` block
    pub css: String,
    /// `{node}_canonical` block
    pub canonical: String,
    /// `{node}_meta` block
    pub meta: String,
    /// `pre_{node}` block
    pub prescript: String,
    /// `post_{node}` block
    pub postscript: String,
}

impl PartialPayload {
    /// Payload with every entry blank
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no block produced any output
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
            && self.css.is_empty()
            && self.canonical.is_empty()
            && self.meta.is_empty()
            && self.prescript.is_empty()
            && self.postscript.is_empty()
    }
}

/// Freshly generated captcha, as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptchaTicket {
    /// Salted hash of the captcha text
    pub hash: String,
    /// Temp image file name under the captcha temp dir
    pub filename: String,
    /// URL the image is served from
    pub image_url: String,
}

/// Captcha answer submitted for checking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptchaAnswer {
    /// Hash handed out with the ticket
    pub hash: String,
    /// Letters typed by the user
    pub answer: String,
}

/// Captcha check outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptchaVerdict {
    pub valid: bool,
}

/// Error body returned by the HTTP layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    pub status: u16,
}
