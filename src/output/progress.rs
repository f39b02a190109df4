use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright_green, bright_red, bright_yellow};

/// Spinner shown on stderr while the execution graph is fetched
pub struct FetchProgress {
    pb: ProgressBar,
}

impl FetchProgress {
    pub fn start(execution_id: &str) -> Self {
        let pb = create_spinner(
            bright_yellow(format!("Fetching execution {execution_id}")).to_string(),
        );
        Self { pb }
    }

    pub fn finish(self, step_count: usize) {
        self.pb
            .finish_with_message(bright_green(format!("Fetched {step_count} nodes ✓")).to_string());
    }

    pub fn fail(self) {
        self.pb
            .abandon_with_message(bright_red("Fetching execution failed ✗").to_string());
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
