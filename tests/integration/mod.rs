//! Integration test suite for the update engine.
//!
//! Exercises the public API end to end: wiremock stands in for the release
//! host, archives are built with the same codecs the engine extracts with,
//! and the VCS flow shells out to real git.


mod archive_flow;
mod installer_flow;
