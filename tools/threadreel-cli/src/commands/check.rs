//! Check system capabilities.

use threadreel_render_engine::export::command_exists;

pub fn run() -> anyhow::Result<()> {
    println!("threadreel System Check");
    println!("{}", "=".repeat(50));

    let mut all_ok = true;
    for binary in ["ffmpeg", "ffprobe"] {
        if command_exists(binary) {
            println!("[OK] {binary} found in PATH");
        } else {
            println!("[MISSING] {binary} not found in PATH");
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("All required tools are available. threadreel is ready.");
    } else {
        println!("Some required tools are missing. Install ffmpeg to continue.");
    }

    Ok(())
}
