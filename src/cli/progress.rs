use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Spinner counting decoded frames. Captures are scanned in one pass, so
/// the total is not known up front.
pub fn create_progress_bar(multi: &MultiProgress, message: &str) -> Result<ProgressBar> {
    let pb = multi.add(ProgressBar::new_spinner());
    pb.set_style(ProgressStyle::with_template(
        "{spinner:.green} {pos} frames\n{msg} | elapsed: {elapsed_precise}",
    )?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}
