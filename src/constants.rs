//! Application constants

/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Default timeout applied to every outbound call (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Maximum accepted webhook body (2 MB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub const DEFAULT_TWITTER_API_BASE: &str = "https://api.twitter.com";
pub const DEFAULT_WEBFLOW_API_BASE: &str = "https://api.webflow.com";
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Storage prefix for article images
pub const BLOG_IMAGE_PREFIX: &str = "blogimages";

/// Featured variant is scaled to fit 70% of the source dimensions
pub const FEATURED_SCALE: f64 = 0.7;

/// Thumbnail variant is scaled to fit 50% of the featured dimensions
pub const THUMBNAIL_SCALE: f64 = 0.5;

/// Prefix applied to relative links in article bodies
pub const BLOG_LINK_PREFIX: &str = "/blog/";

/// Header carried through to outbound create calls
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Largest source image the pipeline will download (20 MB)
pub const MAX_SOURCE_IMAGE_BYTES: usize = 20 * 1024 * 1024;
