//! Core Infrastructure
//!
//! HTTP transport seam, PKCE primitives, and the authorization handshake.

pub mod pkce;
pub mod state;
pub mod transport;

pub use state::{AuthorizationHandshake, PendingAuthorization};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockTransport, ReqwestTransport};
