pub mod focus;
pub mod models;
pub mod proctoring;
pub mod sensing;
pub mod settings;
mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use log::{info, warn};
use tokio::io::BufReader;

pub use focus::{FocusEvent, FocusMonitor, FocusSource};
pub use models::{ProctoringReport, ViolationEvent, ViolationKind};
pub use proctoring::{ProctoringController, ProctoringHooks, ProctoringSnapshot, ProctoringState};
pub use sensing::{CameraDevice, DeviceError, EncodedFrame, ImageSequenceCamera, MediaStream};
pub use settings::{ProctoringConfig, SettingsStore};

use focus::LineFocusSource;

/// Options for the `proctor` binary.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub frames_dir: PathBuf,
    pub settings_path: PathBuf,
    /// Where to drop a JPEG for each counted violation.
    pub audit_dir: Option<PathBuf>,
    pub debug: bool,
}

pub fn init_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // RUST_LOG still wins for anything it names.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Proctor a session against a directory of recorded frames, reading focus
/// events (`hidden`, `visible`, `blur`, `focus`) from stdin. Snapshots are
/// printed as JSON lines; the final report is printed last.
pub async fn run(options: RunOptions) -> Result<()> {
    init_logging(options.debug);
    info!("proctor starting up...");

    let settings = SettingsStore::new(options.settings_path.clone())?;
    let config = settings.proctoring();
    config
        .validate()
        .with_context(|| format!("invalid settings in {}", options.settings_path.display()))?;

    if let Some(dir) = &options.audit_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create audit dir {}", dir.display()))?;
    }

    let camera = Arc::new(ImageSequenceCamera::new(
        &options.frames_dir,
        config.check_interval(),
    ));
    let hooks = ProctoringHooks::new()
        .on_violation(|kind| warn!("violation: {kind}"))
        .on_disqualify(|| warn!("candidate disqualified"));
    let controller = ProctoringController::new(camera, config, hooks)?;
    let mut updates = controller.subscribe();

    if !controller.start_camera().await? {
        let report = controller.finish().await;
        println!("{}", serde_json::to_string(&report)?);
        bail!(
            "{}",
            report.last_error.unwrap_or_else(|| "camera unavailable".into())
        );
    }

    let monitor = FocusMonitor::spawn(
        &controller,
        LineFocusSource::new(BufReader::new(tokio::io::stdin())),
    );
    let focus_closed = monitor.closed();
    tokio::pin!(focus_closed);

    let mut last_violations = 0;
    println!("{}", serde_json::to_string(&*updates.borrow_and_update())?);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                println!("{}", serde_json::to_string(&snapshot)?);

                if snapshot.violations > last_violations {
                    last_violations = snapshot.violations;
                    if let Some(dir) = &options.audit_dir {
                        save_audit_frame(&controller, dir, last_violations).await;
                    }
                }

                if snapshot.is_disqualified {
                    break;
                }
            }
            result = &mut focus_closed => {
                if let Err(err) = result {
                    warn!("{err:#}");
                }
                info!("focus input closed; ending session");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted; ending session");
                break;
            }
        }
    }

    let report = controller.finish().await;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

async fn save_audit_frame(controller: &ProctoringController, dir: &std::path::Path, violation: u32) {
    let Some(frame) = controller.capture_frame().await else {
        // Disqualification releases the camera before the host sees it.
        info!("no frame available for violation {violation}");
        return;
    };

    let path = dir.join(format!("violation-{violation:02}.jpg"));
    match tokio::fs::write(&path, &frame.bytes).await {
        Ok(()) => info!("saved audit frame {}", path.display()),
        Err(err) => warn!("failed to save audit frame {}: {err}", path.display()),
    }
}
