//! Build script that rebuilds the crate when a sidebar migration changes.
//!
//! `embed_migrations!` reads `migrations/` at compile time, which Cargo does
//! not track on its own.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
