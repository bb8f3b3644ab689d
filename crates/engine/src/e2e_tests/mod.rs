//! End-to-end tests over the fixture presets.
//!
//! Each test loads presets from `test_data/presets/` and checks the payload
//! exactly as the backend would receive it.
//!
//! # Running E2E Tests
//!
//! ```bash
//! cargo test -p presetforge-engine --lib e2e_tests
//!
//! # With assembly diagnostics
//! RUST_LOG=presetforge=debug cargo test -p presetforge-engine --lib e2e_tests -- --nocapture
//! ```
