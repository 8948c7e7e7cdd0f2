use std::process::Command;

use tracing::debug;
use url::Url;

/// Open the URL with the platform opener, printing it when that is not possible
///
/// Failing to open a browser never aborts the flow: the user can always copy the URL.
pub fn launch_browser(open: bool, url: &Url) {
    if open {
        match open_command(url.as_str()).map(|mut cmd| cmd.spawn()) {
            Some(Ok(_)) => return,
            Some(Err(error)) => debug!(%error, "failed to launch browser"),
            None => debug!(os = std::env::consts::OS, "no browser opener for this platform"),
        }
    }

    println!("{}", open_instructions(url));
}

fn open_instructions(url: &Url) -> String {
    format!("Open this url in your browser: {url}")
}

fn open_command(url: &str) -> Option<Command> {
    let mut cmd = match std::env::consts::OS {
        "macos" => Command::new("open"),
        "linux" | "freebsd" | "openbsd" | "netbsd" => Command::new("xdg-open"),
        "windows" => {
            let mut cmd = Command::new("cmd");
            // the empty title keeps `start` from treating the URL as the window title
            cmd.args(["/C", "start", ""]);
            cmd
        }
        _ => return None,
    };
    cmd.arg(url);
    Some(cmd)
}
