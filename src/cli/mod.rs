//! # CLI Module
//!
//! User-facing commands of sporlstats. Each command loads what it needs,
//! delegates to the pipeline or the output manager, and reports progress
//! with the crate's console macros.
//!
//! - [`fetch`] - enrich one category and write `<output>/<category>.json`
//! - [`fetch_all`] - the same for every known category, one credential
//! - [`categories`] - list known category keys
//! - [`show`] - print a written category file as a table
//!
//! ```bash
//! sporlstats fetch pop
//! sporlstats fetch --all --concurrency 8
//! sporlstats show pop
//! ```

mod categories;
mod fetch;
mod show;

pub use categories::categories;
pub use fetch::fetch;
pub use fetch::fetch_all;
pub use show::show;
