//! Spinners for slow I/O (snapshot loading, exports).

use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(90);

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.magenta} {msg:.cyan} [{elapsed}]") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏✔"));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(TICK);
    pb
}

/// Run `fut` behind a spinner labelled `message`. The spinner is cleared on
/// failure and replaced by `done` on success.
pub async fn with_spinner<T, E, F>(message: &str, done: &str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let pb = spinner(message);
    let result = fut.await;
    match &result {
        Ok(_) => pb.finish_with_message(done.to_string()),
        Err(_) => pb.finish_and_clear(),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_result_through() {
        let ok: Result<u32, String> = with_spinner("loading", "loaded", async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));
        let err: Result<u32, String> =
            with_spinner("loading", "loaded", async { Err("boom".to_string()) }).await;
        assert_eq!(err, Err("boom".to_string()));
    }
}
