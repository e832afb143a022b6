//! Store integration tests.
//!
//! Need a PostgreSQL server reachable through `DATABASE_URL`; every test gets
//! a fresh database with the catalog schema applied.
//! Run with: cargo test --test integration -- --ignored

mod catalog_tests;
