//! Startup banner and URL display

use std::path::Path;

use super::config::is_all_interfaces;
use super::constants::APP_NAME;

// Label width: "Network:" plus padding
const W: usize = 10;

/// Clickable OSC 8 hyperlink when the terminal supports it, cyan text otherwise
fn link(target: &str, text: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        format!("\x1b]8;;{}\x07\x1b[36m{}\x1b[0m\x1b]8;;\x07", target, text)
    } else {
        format!("\x1b[36m{}\x1b[0m", text)
    }
}

fn url_link(url: &str) -> String {
    link(url, url)
}

/// Print the startup banner with the viewer URL and watched log root
pub fn print_banner(host: &str, port: u16, log_dir: &Path, viewer: Option<&Path>) {
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    let local_url = format!("http://{}:{}", display_host, port);
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Viewer:",
        url_link(&local_url)
    );

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    } else if is_all_interfaces(host) {
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                let network_url = format!("http://{}:{}", ip, port);
                println!(
                    "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
                    "Network:",
                    url_link(&network_url)
                );
            }
        }
    } else {
        let network_url = format!("http://{}:{}", host, port);
        println!(
            "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
            "Network:",
            url_link(&network_url)
        );
    }

    let log_dir = log_dir.display().to_string();
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Logs:",
        link(&format!("file://{}", log_dir), &log_dir)
    );
    if let Some(viewer) = viewer {
        println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Page:", viewer.display());
    }

    println!();
}
