//! Progress reporting for council execution

use colored::Colorize;
use council_application::ports::progress::ProgressNotifier;
use council_domain::{Model, Stage};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during council execution with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-")
    }

    fn stage_display_name(stage: &Stage) -> String {
        format!("Stage {}: {}", stage.number(), stage.display_name())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(Self::stage_display_name(stage));
        pb.set_message("Starting...");

        *self.stage_bar.lock().unwrap() = Some(pb);
    }

    fn on_model_settled(&self, _stage: &Stage, model: &Model, success: bool) {
        if let Some(pb) = self.stage_bar.lock().unwrap().as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), model)
            } else {
                format!("{} {}", "x".red(), model)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: &Stage) {
        if let Some(pb) = self.stage_bar.lock().unwrap().take() {
            pb.finish_with_message(format!(
                "{} complete!",
                format!("Stage {}", stage.number()).green()
            ));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        println!(
            "{} {} ({} calls)",
            "->".cyan(),
            ProgressReporter::stage_display_name(stage).bold(),
            total_tasks
        );
    }

    fn on_model_settled(&self, _stage: &Stage, model: &Model, success: bool) {
        if success {
            println!("  {} {}", "v".green(), model);
        } else {
            println!("  {} {} (failed)", "x".red(), model);
        }
    }

    fn on_stage_complete(&self, _stage: &Stage) {
        println!();
    }
}
