//! Shared constants for Mosaic components.

/// Default Tessera HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8890";

/// Default directory templates are loaded from
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";

/// Default root for static assets (captcha background, font)
pub const DEFAULT_STATIC_ROOT: &str = "static";

/// Default root for generated media (captcha images)
pub const DEFAULT_MEDIA_ROOT: &str = "media";

/// Query parameter selecting the block family for partial renders
pub const NODE_NAME_PARAM: &str = "node_name";

/// Query parameter naming the template for direct block renders
pub const TEMPLATE_PARAM: &str = "template";

/// Number of characters of the secret key used as the hashing salt
pub const SALT_LEN: usize = 20;

/// Length of a randomly generated salt in hex characters
pub const RANDOM_SALT_LEN: usize = 25;

/// Maximum nesting of `extends`/`include` before rendering gives up
pub const MAX_TEMPLATE_DEPTH: usize = 32;

/// Captcha defaults
pub mod captcha {
    /// Letters the captcha text is drawn from (no "I")
    pub const ALPHABET: &[u8] = b"QWERTYUOPASDFGHJKLZXCVBNM";

    /// Number of letters per captcha
    pub const TEXT_LEN: usize = 5;

    /// Temp images older than this are pruned (3 minutes)
    pub const MAX_AGE_SECS: u64 = 180;

    /// Font size in pixels
    pub const FONT_SIZE: f32 = 30.0;

    /// Top-left corner of the drawn text
    pub const TEXT_ORIGIN: (i32, i32) = (10, 10);

    /// Text fill color
    pub const TEXT_RGB: [u8; 3] = [80, 80, 80];
}

/// Partial payload block names. Block names must be identifiers, so the
/// node name is joined with `_`.
pub mod blocks {
    /// `{node}_styles`
    pub const STYLES_SUFFIX: &str = "_styles";

    /// `{node}_canonical`
    pub const CANONICAL_SUFFIX: &str = "_canonical";

    /// `{node}_meta`
    pub const META_SUFFIX: &str = "_meta";

    /// `pre_{node}`
    pub const PRESCRIPT_PREFIX: &str = "pre_";

    /// `post_{node}`
    pub const POSTSCRIPT_PREFIX: &str = "post_";
}

/// HTTP header names
pub mod headers {
    /// Set by XHR clients on asynchronous requests
    pub const X_REQUESTED_WITH: &str = "X-Requested-With";

    /// Value of `X-Requested-With` marking an AJAX request
    pub const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

    /// Client address chain from a fronting proxy
    pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";
}
