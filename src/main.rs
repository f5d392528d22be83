use std::path::PathBuf;

use clap::Parser;

/// Replay a proctored session from recorded frames.
#[derive(Parser, Debug)]
#[command(name = "proctor")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory of frames (png/jpg/bmp), played back in name order
    frames_dir: PathBuf,

    /// Path to the settings file
    #[arg(short, long, default_value = "proctor.json")]
    settings: PathBuf,

    /// Save a JPEG for each counted violation into this directory
    #[arg(long)]
    audit_dir: Option<PathBuf>,

    /// Verbose logging (same as PROCTOR_DEBUG=1)
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let debug = cli.debug
        || std::env::var("PROCTOR_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

    let options = proctor_lib::RunOptions {
        frames_dir: cli.frames_dir,
        settings_path: cli.settings,
        audit_dir: cli.audit_dir,
        debug,
    };

    let code = match proctor_lib::run(options).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    };

    // The stdin reader sits on a blocking read that cannot be cancelled;
    // exit without waiting for it.
    std::process::exit(code);
}
