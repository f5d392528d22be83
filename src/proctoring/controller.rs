use std::{
    ops::ControlFlow,
    sync::{Arc, Weak},
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::{error, info, warn};
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use crate::{
    focus::FocusEvent,
    models::{ProctoringReport, ViolationEvent},
    sensing::{
        loop_worker::{sample_with_timeout, PresenceSink},
        snapshot::{encode_jpeg, EncodedFrame},
        CameraDevice, CaptureConstraints, PresenceReading, SamplerController, SharedStream,
    },
    settings::ProctoringConfig,
};

use super::{ProctoringHooks, ProctoringSnapshot, ProctoringState, ViolationOutcome};

#[derive(Default)]
struct DeviceSlot {
    stream: Option<SharedStream>,
    sampler: SamplerController,
}

struct SessionCore {
    config: ProctoringConfig,
    hooks: ProctoringHooks,
    camera: Arc<dyn CameraDevice>,
    state: Mutex<ProctoringState>,
    // Lock order: `transitions`, then `device`, then `state`.
    device: Mutex<DeviceSlot>,
    /// Held from a counted transition through its callbacks, so hooks see
    /// violations in count order.
    transitions: Mutex<()>,
    snapshot_tx: watch::Sender<ProctoringSnapshot>,
}

/// One proctored activity: owns the capture device, the sampling task and
/// the violation count. Clones share the same session.
#[derive(Clone)]
pub struct ProctoringController {
    core: Arc<SessionCore>,
}

/// Non-owning handle used by background tasks so they never keep the
/// device alive past the session.
#[derive(Clone)]
pub struct WeakProctoringController {
    core: Weak<SessionCore>,
}

impl WeakProctoringController {
    pub fn upgrade(&self) -> Option<ProctoringController> {
        self.core.upgrade().map(|core| ProctoringController { core })
    }
}

impl ProctoringController {
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        config: ProctoringConfig,
        hooks: ProctoringHooks,
    ) -> Result<Self> {
        config.validate()?;

        let state = ProctoringState::new();
        let (snapshot_tx, _) = watch::channel(state.snapshot());

        Ok(Self {
            core: Arc::new(SessionCore {
                config,
                hooks,
                camera,
                state: Mutex::new(state),
                device: Mutex::new(DeviceSlot::default()),
                transitions: Mutex::new(()),
                snapshot_tx,
            }),
        })
    }

    pub fn config(&self) -> &ProctoringConfig {
        &self.core.config
    }

    pub fn downgrade(&self) -> WeakProctoringController {
        WeakProctoringController {
            core: Arc::downgrade(&self.core),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProctoringSnapshot> {
        self.core.snapshot_tx.subscribe()
    }

    pub async fn snapshot(&self) -> ProctoringSnapshot {
        self.core.state.lock().await.snapshot()
    }

    pub async fn state(&self) -> ProctoringState {
        self.core.state.lock().await.clone()
    }

    /// Acquire camera and microphone and start sampling.
    ///
    /// Returns `Ok(false)` when the device could not be opened; the reason is
    /// in the snapshot's `error` and the caller decides whether to retry.
    /// Errors are reserved for misuse: starting twice, or after
    /// disqualification.
    pub async fn start_camera(&self) -> Result<bool> {
        let core = &self.core;
        let mut device = core.device.lock().await;

        {
            let state = core.state.lock().await;
            if state.disqualified {
                bail!("session is disqualified");
            }
            if state.camera_active || device.stream.is_some() {
                bail!("camera already active");
            }
        }

        let constraints =
            CaptureConstraints::video_and_audio(core.config.target_width, core.config.target_height);

        let stream = match core.camera.open(constraints).await {
            Ok(stream) => SharedStream::new(stream),
            Err(err) => {
                warn!("camera acquisition failed: {err}");
                let snapshot = {
                    let mut state = core.state.lock().await;
                    state.capture_failed(err.to_string());
                    state.snapshot()
                };
                core.publish(snapshot);
                return Ok(false);
            }
        };

        let session_id = {
            let mut state = core.state.lock().await;
            state.begin_capture(Uuid::new_v4().to_string(), Utc::now());
            state.session_id.clone().unwrap_or_default()
        };

        let sink: Weak<SessionCore> = Arc::downgrade(&self.core);
        let sink: Weak<dyn PresenceSink> = sink;
        if let Err(err) = device.sampler.start_sampling(
            stream.clone(),
            sink,
            core.config.check_interval(),
            core.config.capture_timeout(),
            core.config.thresholds,
        ) {
            stream.stop();
            core.state.lock().await.end_capture();
            return Err(err);
        }
        device.stream = Some(stream);
        drop(device);

        info!(
            "Camera started for session {} at {}x{}",
            session_id, constraints.width, constraints.height
        );
        core.publish_current().await;
        Ok(true)
    }

    /// Stop tracks and sampling. Idempotent.
    pub async fn stop_camera(&self) {
        self.core.release_device(true).await;
    }

    /// Encode the current frame as JPEG for audit logging. `None` when
    /// there is no live stream or no frame yet.
    pub async fn capture_frame(&self) -> Option<EncodedFrame> {
        let stream = self.core.device.lock().await.stream.clone()?;
        let quality = self.core.config.jpeg_quality;

        let result = tokio::task::spawn_blocking(move || -> Result<Option<EncodedFrame>> {
            let frame = {
                let mut guard = stream.lock()?;
                let (width, height) = guard.dimensions();
                if !guard.is_live() || width == 0 || height == 0 {
                    return Ok(None);
                }
                guard.current_frame()?
            };
            encode_jpeg(&frame, quality).map(Some)
        })
        .await;

        match result {
            Ok(Ok(encoded)) => encoded,
            Ok(Err(err)) => {
                warn!("frame capture failed: {err:#}");
                None
            }
            Err(err) => {
                error!("frame capture worker failed: {err}");
                None
            }
        }
    }

    /// Run one sample outside the timer cadence. Classification failures
    /// leave the session untouched and yield `None`.
    pub async fn sample_now(&self) -> Option<PresenceReading> {
        let stream = self.core.device.lock().await.stream.clone()?;
        let config = &self.core.config;

        match sample_with_timeout(&stream, config.thresholds, config.capture_timeout()).await {
            Ok(reading) => {
                self.core.apply_presence(reading.face_detected).await;
                Some(reading)
            }
            Err(err) => {
                warn!("frame classification skipped: {err:#}");
                None
            }
        }
    }

    /// Feed a presence decision from an external detector.
    pub async fn report_presence(&self, face_detected: bool) -> ViolationOutcome {
        self.core.apply_presence(face_detected).await
    }

    pub async fn handle_focus_event(&self, event: FocusEvent) -> ViolationOutcome {
        let max = self.core.config.max_violations;
        let _turn = self.core.transitions.lock().await;
        let (outcome, snapshot) = {
            let mut state = self.core.state.lock().await;
            let outcome = state.apply_focus(event, max);
            (outcome, state.snapshot())
        };
        self.core.dispatch(outcome, snapshot).await;
        outcome
    }

    /// Release the device and summarise the session for the host.
    pub async fn finish(&self) -> ProctoringReport {
        self.stop_camera().await;
        let state = self.core.state.lock().await;

        ProctoringReport {
            session_id: state.session_id.clone(),
            started_at: state.started_at,
            ended_at: Utc::now(),
            violations: state.violation_count,
            max_violations: self.core.config.max_violations,
            disqualified: state.disqualified,
            tally: state.tally,
            last_error: state.last_error.clone(),
        }
    }
}

impl SessionCore {
    fn publish(&self, snapshot: ProctoringSnapshot) {
        self.snapshot_tx.send_replace(snapshot);
    }

    async fn publish_current(&self) {
        let snapshot = self.state.lock().await.snapshot();
        self.publish(snapshot);
    }

    async fn apply_presence(&self, face_detected: bool) -> ViolationOutcome {
        let max = self.config.max_violations;
        let _turn = self.transitions.lock().await;
        let (outcome, snapshot, changed) = {
            let mut state = self.state.lock().await;
            let before = state.face_detected;
            let outcome = state.apply_presence(face_detected, max);
            (outcome, state.snapshot(), before != state.face_detected)
        };

        if changed || outcome != ViolationOutcome::Ignored {
            self.dispatch(outcome, snapshot).await;
        }
        outcome
    }

    /// Publish the post-transition snapshot and run callbacks. Crossing the
    /// threshold releases the device before the host hears about it.
    ///
    /// Callers hold `transitions`.
    async fn dispatch(&self, outcome: ViolationOutcome, snapshot: ProctoringSnapshot) {
        self.publish(snapshot);

        match outcome {
            ViolationOutcome::Ignored => {}
            ViolationOutcome::Recorded { kind, count } => {
                let event = ViolationEvent::new(kind);
                info!(
                    "violation {} at {} ({count}/{})",
                    event.kind,
                    event.timestamp.to_rfc3339(),
                    self.config.max_violations
                );
                self.hooks.violation(kind);
            }
            ViolationOutcome::Disqualified { kind, count } => {
                let event = ViolationEvent::new(kind);
                warn!(
                    "violation {} at {} reached the limit ({count}); session disqualified",
                    event.kind,
                    event.timestamp.to_rfc3339()
                );
                self.hooks.violation(kind);
                // May run on the sampling task itself, so don't join it.
                self.release_device(false).await;
                self.hooks.disqualify();
            }
        }
    }

    async fn release_device(&self, join_sampler: bool) {
        let (stream, shutdown) = {
            let mut device = self.device.lock().await;
            (device.stream.take(), device.sampler.take())
        };

        if join_sampler {
            if let Err(err) = shutdown.stop().await {
                error!("Failed to stop frame sampling: {err:#}");
            }
        } else {
            shutdown.cancel();
        }

        let released = stream.is_some();
        if let Some(stream) = stream {
            stream.stop();
        }

        let snapshot = {
            let mut state = self.state.lock().await;
            state.end_capture();
            state.snapshot()
        };
        self.publish(snapshot);

        if released {
            info!("Camera released");
        }
    }
}

#[async_trait]
impl PresenceSink for SessionCore {
    async fn on_presence(&self, reading: PresenceReading) -> ControlFlow<()> {
        match self.apply_presence(reading.face_detected).await {
            ViolationOutcome::Disqualified { .. } => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }
}

impl Drop for SessionCore {
    fn drop(&mut self) {
        let device = self.device.get_mut();
        device.sampler.cancel();
        if let Some(stream) = device.stream.take() {
            stream.stop();
            info!("Camera released on session teardown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Mutex as StdMutex,
    };
    use std::time::Duration;

    use crate::{
        focus::{ChannelFocusSource, FocusMonitor},
        models::ViolationKind,
        sensing::{
            testing::{empty_frame, face_frame, ScriptedCamera, FRAME_HEIGHT, FRAME_WIDTH},
            DeviceError,
        },
    };

    #[derive(Clone, Default)]
    struct HookLog {
        violations: Arc<StdMutex<Vec<ViolationKind>>>,
        disqualified: Arc<AtomicU32>,
    }

    impl HookLog {
        fn hooks(&self) -> ProctoringHooks {
            let violations = Arc::clone(&self.violations);
            let disqualified = Arc::clone(&self.disqualified);
            ProctoringHooks::new()
                .on_violation(move |kind| violations.lock().unwrap().push(kind))
                .on_disqualify(move || {
                    disqualified.fetch_add(1, Ordering::SeqCst);
                })
        }

        fn violations(&self) -> Vec<ViolationKind> {
            self.violations.lock().unwrap().clone()
        }

        fn disqualify_calls(&self) -> u32 {
            self.disqualified.load(Ordering::SeqCst)
        }
    }

    fn config(max_violations: u32) -> ProctoringConfig {
        ProctoringConfig {
            max_violations,
            // Long enough that the timer never fires unless a test sleeps.
            check_interval_ms: 60_000,
            ..ProctoringConfig::default()
        }
    }

    fn controller(camera: &ScriptedCamera, max_violations: u32, log: &HookLog) -> ProctoringController {
        ProctoringController::new(Arc::new(camera.clone()), config(max_violations), log.hooks()).unwrap()
    }

    #[tokio::test]
    async fn start_marks_camera_active() {
        let camera = ScriptedCamera::with_frames([face_frame()]);
        let controller = controller(&camera, 5, &HookLog::default());

        assert!(controller.start_camera().await.unwrap());
        let state = controller.state().await;
        assert!(state.camera_active);
        assert!(state.session_id.is_some());
        assert!(state.started_at.is_some());
        assert!(controller.snapshot().await.camera_enabled);
        assert_eq!(camera.opens(), 1);
    }

    #[tokio::test]
    async fn device_error_is_surfaced_as_state() {
        let camera = ScriptedCamera::with_frames([face_frame()]);
        camera.fail_next_open(DeviceError::PermissionDenied);
        let controller = controller(&camera, 5, &HookLog::default());

        assert!(!controller.start_camera().await.unwrap());
        let snapshot = controller.snapshot().await;
        assert!(!snapshot.camera_enabled);
        assert_eq!(snapshot.error, Some(DeviceError::PermissionDenied.to_string()));

        // Explicit retry succeeds and clears the error.
        assert!(controller.start_camera().await.unwrap());
        let snapshot = controller.snapshot().await;
        assert!(snapshot.camera_enabled);
        assert_eq!(snapshot.error, None);
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let camera = ScriptedCamera::with_frames([face_frame()]);
        let controller = controller(&camera, 5, &HookLog::default());

        controller.start_camera().await.unwrap();
        assert!(controller.start_camera().await.is_err());
        assert_eq!(camera.opens(), 1);
        assert_eq!(camera.live_streams(), 1);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let camera = ScriptedCamera::with_frames([face_frame()]);
        let controller = controller(&camera, 5, &HookLog::default());

        controller.stop_camera().await;
        assert!(!controller.snapshot().await.camera_enabled);

        controller.start_camera().await.unwrap();
        controller.stop_camera().await;
        assert!(!controller.snapshot().await.camera_enabled);
        controller.stop_camera().await;
        assert!(!controller.snapshot().await.camera_enabled);

        assert_eq!(camera.stops(), 1);
        assert_eq!(camera.live_streams(), 0);
    }

    #[tokio::test]
    async fn sustained_absence_counts_once() {
        let camera = ScriptedCamera::with_frames([face_frame(), empty_frame(), empty_frame(), empty_frame()]);
        let log = HookLog::default();
        let controller = controller(&camera, 5, &log);
        controller.start_camera().await.unwrap();

        let detected: Vec<bool> = {
            let mut detected = Vec::new();
            for _ in 0..4 {
                detected.push(controller.sample_now().await.unwrap().face_detected);
            }
            detected
        };
        assert_eq!(detected, vec![true, false, false, false]);

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.violations, 1);
        assert!(!snapshot.face_detected);
        assert_eq!(log.violations(), vec![ViolationKind::NoFace]);
    }

    #[tokio::test]
    async fn classification_failure_changes_nothing() {
        let camera = ScriptedCamera::with_frames([empty_frame()]);
        camera.fail_next_reads(1);
        let controller = controller(&camera, 5, &HookLog::default());
        controller.start_camera().await.unwrap();

        let before = controller.snapshot().await;
        assert!(controller.sample_now().await.is_none());
        assert_eq!(controller.snapshot().await, before);
        assert_eq!(before.error, None);

        // Self-heals on the next sample.
        assert!(controller.sample_now().await.is_some());
        assert_eq!(controller.snapshot().await.violations, 1);
    }

    #[tokio::test]
    async fn focus_loss_without_camera_is_ignored() {
        let camera = ScriptedCamera::new();
        let log = HookLog::default();
        let controller = controller(&camera, 5, &log);

        assert_eq!(
            controller.handle_focus_event(FocusEvent::Hidden).await,
            ViolationOutcome::Ignored
        );
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.violations, 0);
        assert!(snapshot.tab_focused);
        assert!(log.violations().is_empty());
    }

    #[tokio::test]
    async fn threshold_disqualifies_and_releases_camera() {
        let camera = ScriptedCamera::with_frames([face_frame(), empty_frame()]);
        let log = HookLog::default();
        let controller = controller(&camera, 2, &log);
        controller.start_camera().await.unwrap();

        controller.sample_now().await.unwrap();
        controller.sample_now().await.unwrap();
        assert_eq!(controller.snapshot().await.violations, 1);
        assert!(!controller.snapshot().await.is_disqualified);

        let outcome = controller.handle_focus_event(FocusEvent::Hidden).await;
        assert_eq!(
            outcome,
            ViolationOutcome::Disqualified {
                kind: ViolationKind::TabSwitch,
                count: 2
            }
        );

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.violations, 2);
        assert!(snapshot.is_disqualified);
        assert!(!snapshot.camera_enabled);
        assert_eq!(log.disqualify_calls(), 1);
        assert_eq!(log.violations(), vec![ViolationKind::NoFace, ViolationKind::TabSwitch]);
        assert_eq!(camera.live_streams(), 0);

        // Absorbing.
        controller.handle_focus_event(FocusEvent::Focus).await;
        controller.handle_focus_event(FocusEvent::Blur).await;
        controller.report_presence(false).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.violations, 2);
        assert!(snapshot.tab_focused);
        assert_eq!(log.disqualify_calls(), 1);
        assert!(controller.start_camera().await.is_err());
    }

    #[tokio::test]
    async fn capture_frame_encodes_current_frame() {
        let camera = ScriptedCamera::with_frames([face_frame()]);
        let controller = controller(&camera, 5, &HookLog::default());
        assert!(controller.capture_frame().await.is_none());

        controller.start_camera().await.unwrap();
        let encoded = controller.capture_frame().await.unwrap();
        assert_eq!((encoded.width, encoded.height), (FRAME_WIDTH, FRAME_HEIGHT));
        assert_eq!(encoded.mime_type, "image/jpeg");

        controller.stop_camera().await;
        assert!(controller.capture_frame().await.is_none());
    }

    #[tokio::test]
    async fn capture_frame_without_video_dimensions_is_none() {
        let camera = ScriptedCamera::new();
        let controller = controller(&camera, 5, &HookLog::default());
        controller.start_camera().await.unwrap();
        assert!(controller.capture_frame().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_drives_classification() {
        let camera = ScriptedCamera::with_frames([face_frame(), empty_frame(), empty_frame(), empty_frame()]);
        let log = HookLog::default();
        let controller = ProctoringController::new(
            Arc::new(camera.clone()),
            ProctoringConfig {
                check_interval_ms: 100,
                ..ProctoringConfig::default()
            },
            log.hooks(),
        )
        .unwrap();

        controller.start_camera().await.unwrap();
        tokio::time::sleep(Duration::from_millis(450)).await;

        assert_eq!(controller.snapshot().await.violations, 1);
        assert_eq!(log.violations(), vec![ViolationKind::NoFace]);
        controller.stop_camera().await;
    }

    #[tokio::test(start_paused = true)]
    async fn timer_disqualification_stops_sampling() {
        let camera = ScriptedCamera::with_frames([empty_frame()]);
        let log = HookLog::default();
        let controller = ProctoringController::new(
            Arc::new(camera.clone()),
            ProctoringConfig {
                max_violations: 1,
                check_interval_ms: 100,
                ..ProctoringConfig::default()
            },
            log.hooks(),
        )
        .unwrap();

        controller.start_camera().await.unwrap();
        let mut updates = controller.subscribe();
        updates.wait_for(|snapshot| snapshot.is_disqualified).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(log.disqualify_calls(), 1);
        assert_eq!(camera.live_streams(), 0);
        assert!(!controller.snapshot().await.camera_enabled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_violations_reach_hooks_in_count_order() {
        let camera = ScriptedCamera::with_frames([face_frame()]);
        let updates: Arc<StdMutex<Option<watch::Receiver<ProctoringSnapshot>>>> = Arc::default();
        let calls: Arc<StdMutex<Vec<Option<u32>>>> = Arc::default();

        let published = {
            let updates = Arc::clone(&updates);
            move || {
                updates
                    .lock()
                    .unwrap()
                    .as_ref()
                    .map_or(0, |updates| updates.borrow().violations)
            }
        };
        let hooks = {
            let on_violation = Arc::clone(&calls);
            let on_disqualify = Arc::clone(&calls);
            ProctoringHooks::new()
                .on_violation(move |_| on_violation.lock().unwrap().push(Some(published())))
                .on_disqualify(move || on_disqualify.lock().unwrap().push(None))
        };

        let max = 6;
        let controller =
            ProctoringController::new(Arc::new(camera.clone()), config(max), hooks).unwrap();
        *updates.lock().unwrap() = Some(controller.subscribe());
        controller.start_camera().await.unwrap();

        let tasks: Vec<_> = (0..max * 2)
            .map(|i| {
                let controller = controller.clone();
                tokio::spawn(async move {
                    if i % 3 == 0 {
                        controller.report_presence(i % 2 == 0).await;
                    } else if i % 2 == 0 {
                        controller.handle_focus_event(FocusEvent::Hidden).await;
                    } else {
                        controller.handle_focus_event(FocusEvent::Blur).await;
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        // Eight of the twelve are focus losses, so the session always ends
        // disqualified.
        let mut expected: Vec<Option<u32>> = (1..=max).map(Some).collect();
        expected.push(None);
        assert_eq!(*calls.lock().unwrap(), expected);
        assert!(controller.snapshot().await.is_disqualified);
    }

    #[tokio::test]
    async fn dropping_the_session_releases_the_camera() {
        let camera = ScriptedCamera::with_frames([face_frame()]);
        let controller = controller(&camera, 5, &HookLog::default());
        controller.start_camera().await.unwrap();
        let weak = controller.downgrade();
        let clone = controller.clone();

        drop(controller);
        assert_eq!(camera.live_streams(), 1);
        drop(clone);
        assert_eq!(camera.live_streams(), 0);
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn focus_monitor_feeds_the_session() {
        let camera = ScriptedCamera::with_frames([face_frame()]);
        let log = HookLog::default();
        let controller = controller(&camera, 2, &log);
        controller.start_camera().await.unwrap();

        let (sender, source) = ChannelFocusSource::new();
        let monitor = FocusMonitor::spawn(&controller, source);
        let mut updates = controller.subscribe();

        sender.on_blur();
        updates.wait_for(|snapshot| snapshot.violations == 1).await.unwrap();
        assert!(!controller.snapshot().await.tab_focused);

        sender.on_focus();
        updates.wait_for(|snapshot| snapshot.tab_focused).await.unwrap();

        sender.on_hidden();
        updates.wait_for(|snapshot| snapshot.is_disqualified).await.unwrap();
        assert_eq!(log.violations(), vec![ViolationKind::WindowBlur, ViolationKind::TabSwitch]);
        assert_eq!(log.disqualify_calls(), 1);

        drop(sender);
        monitor.closed().await.unwrap();
    }

    #[tokio::test]
    async fn finish_reports_outcome() {
        let camera = ScriptedCamera::with_frames([face_frame()]);
        let controller = controller(&camera, 3, &HookLog::default());
        controller.start_camera().await.unwrap();
        controller.handle_focus_event(FocusEvent::Blur).await;
        controller.handle_focus_event(FocusEvent::Hidden).await;

        let report = controller.finish().await;
        assert!(report.session_id.is_some());
        assert_eq!(report.violations, 2);
        assert_eq!(report.max_violations, 3);
        assert_eq!(report.tally.window_blur, 1);
        assert_eq!(report.tally.tab_switch, 1);
        assert!(!report.disqualified);
        assert!(report.passed());
        assert_eq!(camera.live_streams(), 0);
    }

    #[tokio::test]
    async fn never_started_session_does_not_pass() {
        let camera = ScriptedCamera::new();
        camera.fail_next_open(DeviceError::NotFound);
        let controller = controller(&camera, 3, &HookLog::default());
        controller.start_camera().await.unwrap();

        let report = controller.finish().await;
        assert!(!report.passed());
        assert_eq!(report.last_error, Some(DeviceError::NotFound.to_string()));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = ProctoringController::new(
            Arc::new(ScriptedCamera::new()),
            config(0),
            ProctoringHooks::new(),
        );
        assert!(result.is_err());
    }
}
