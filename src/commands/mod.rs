//! Command runners, one per subcommand.

pub mod import;
pub mod populate;
pub mod setup;
pub mod simulate;

pub use import::run_import_products;
pub use populate::run_populate_users;
pub use setup::run_setup;
pub use simulate::run_simulate;
