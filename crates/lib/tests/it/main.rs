/*! Integration tests for Feedback.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - user: Registration, lookup, listing and deletion through the UserStore contract
 * - feedback: Creating, updating, listing and deleting feedback through FeedbackStore
 * - service: Authorization-checked operations and end-to-end flows
 * - backend: Backend-specific behavior (persistence files, SQL constraint mapping)
 *
 * Run against another backend with `TEST_BACKEND=sqlite` or `TEST_BACKEND=postgres`.
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("feedback=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod backend;
mod feedback;
mod helpers;
mod service;
mod user;
