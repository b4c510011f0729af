//! End-to-end tests driving the HTTP API over the in-process backend.

mod access_test;
mod admin_test;
mod helpers;
mod lifecycle_test;
mod share_test;
mod stats_test;
mod upload_test;
