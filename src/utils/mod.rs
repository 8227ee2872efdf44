pub mod http;
pub mod scrub;
pub mod text;

pub use http::{build_http_client, build_http_client_with_timeout};
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use text::{preview, truncate_with_ellipsis};
