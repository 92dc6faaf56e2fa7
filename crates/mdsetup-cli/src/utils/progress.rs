use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use mdsetup::analysis::progress::{Progress, ProgressCallback, ProgressReporter};
use std::fmt::Write;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Shows analysis [`Progress`] on stderr: a spinner while a phase runs, a bar for counted tasks.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: ProgressBar,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Draws nothing; used with `--quiet`.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(phase_style());
        bar.finish_and_clear();
        Self { bar }
    }

    pub fn reporter(&self) -> ProgressReporter<'static> {
        ProgressReporter::with_callback(self.callback())
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();
        Box::new(move |event| apply(&bar, event))
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(bar: &ProgressBar, event: Progress) {
    match event {
        Progress::PhaseStart { name } => {
            bar.reset();
            bar.set_style(phase_style());
            bar.set_prefix(name);
            bar.set_message("");
            bar.enable_steady_tick(TICK);
        }
        Progress::PhaseFinish => {
            bar.disable_steady_tick();
            bar.set_style(phase_style());
            bar.finish_with_message("done");
        }
        Progress::TaskStart { total_steps } => {
            bar.disable_steady_tick();
            bar.reset();
            bar.set_length(total_steps);
            bar.set_style(task_style());
        }
        Progress::TaskIncrement => bar.inc(1),
        Progress::TaskFinish => {
            if let Some(total) = bar.length() {
                bar.set_position(total);
            }
            bar.finish();
        }
        Progress::Message(text) if bar.is_finished() => bar.set_message(text),
        Progress::Message(text) => bar.println(format!("  {text}")),
    }
}

fn phase_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn task_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<22} {wide_bar:.green/white} {pos:>6}/{len:6} {eta_s}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("eta_s", |state: &ProgressState, w: &mut dyn Write| {
            let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
        })
        .progress_chars("=> ")
}
