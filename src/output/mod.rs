mod exports;
mod progress;
mod styling;
mod tables;

pub use exports::{export_steps, write_to_file, RenderOptions};
pub use progress::FetchProgress;
pub use styling::stdout_supports_links;

use styling::{dim, magenta_bold};

/// Prints the stepline banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("⏱ stepline"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Harness pipeline execution steps")
    );
}

/// Prints the build version and the commit it was built from.
pub fn print_version() {
    let commit = option_env!("GIT_COMMIT").unwrap_or("unknown");
    println!(
        "Current build version: {commit} Current Version: {}",
        env!("CARGO_PKG_VERSION")
    );
}
