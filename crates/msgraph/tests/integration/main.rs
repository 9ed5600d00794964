//! Integration tests for msgraph
//!
//! Uses wiremock to stand in for both the identity platform token endpoint
//! and Microsoft Graph, and verifies token caching, the user operation and
//! HTTP debug tracing end to end.

mod common;

mod test_get_user;
mod test_http_debug;
mod test_token;
