mod output;

pub use output::ResultSetManager;
