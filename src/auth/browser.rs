//! Open a URL in the operator's default browser (best-effort).

use std::process::{Command, Stdio};

use tracing::debug;

/// Program and arguments that open `url` on the given OS, keyed by
/// `std::env::consts::OS`.
pub fn open_command(os: &str, url: &str) -> (&'static str, Vec<String>) {
    match os {
        "macos" => ("open", vec![url.to_string()]),
        // `start` treats its first quoted argument as a window title, and
        // cmd splits commands on a bare `&`.
        "windows" => (
            "cmd",
            vec![
                "/c".into(),
                "start".into(),
                String::new(),
                url.replace('&', "^&"),
            ],
        ),
        _ => ("xdg-open", vec![url.to_string()]),
    }
}

/// Launch the platform opener without waiting for it.
pub fn open_browser(url: &str) -> std::io::Result<()> {
    let (program, args) = open_command(std::env::consts::OS, url);
    debug!(program, "opening browser");
    Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}
