//! Host-side helper: `cargo run` builds the WASM bundle into `static/pkg` and
//! serves `static/` on a local port.

use std::path::Path;
use std::process::Command;
use std::{thread, time::Duration};

use paternize::AssetSources;

const PORT: &str = "8000";

fn main() {
    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args([
            "build",
            "--release",
            "--target",
            "web",
            "--out-dir",
            "static/pkg",
        ])
        .status()
    {
        Ok(st) if st.success() => {},
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure wasm-pack is installed (https://rustwasm.github.io/wasm-pack/).");
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Skipping wasm build; the page may load stale artifacts.");
        }
    }

    // The images are not shipped; the host drops them under static/ at the
    // locators named in the page config (defaults shown here).
    let sources = AssetSources::default();
    for role in sources.missing_under(Path::new("static")) {
        eprintln!(
            "warning: no {role} image at static/{}; the page will fail to initialize until one is supplied",
            sources.locator(role)
        );
    }

    println!("Serving static/ at http://127.0.0.1:{PORT} …");
    let server = Command::new("python3")
        .args(["-m", "http.server", PORT, "--directory", "static"])
        .spawn();
    if let Err(err) = server {
        eprintln!("failed to start http server: {err}");
        std::process::exit(1);
    }

    // Keep process alive
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
