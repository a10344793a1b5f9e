mod compile;
mod containers;
mod providers;
mod status;
mod watch;

// Provider commands
pub use providers::{run_fields, run_providers};

// Validate / compile commands
pub use compile::{run_compile, run_validate};

// Container commands
pub use containers::{
    print_table, run_connection, run_create, run_list, run_remove, run_start, run_stop,
    run_update,
};

// Status commands
pub use status::run_status;

// Watch command
pub use watch::run_watch;
