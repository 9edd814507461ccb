//! Integration test runner
//!
//! These tests want a live Postgres-compatible server and skip themselves
//! when none is reachable.
//!
//! Environment variables (with defaults):
//! - PGNAV_TEST_HOST: localhost
//! - PGNAV_TEST_PORT: 5432
//! - PGNAV_TEST_DB: postgres
//! - PGNAV_TEST_USER: postgres
//! - PGNAV_TEST_PASSWORD: postgres

#[path = "integration/postgres_tests.rs"]
mod postgres_tests;
