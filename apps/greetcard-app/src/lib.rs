use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, error, info};
use serde::Serialize;

use greetcard_core::{EditorSession, GestureEvent, GestureKind, ImageHandle, Point, Selection};
use greetcard_io::{export_card, EditorConfig, ImageStore, PublishError, Publisher, Recipient, ScheduleRecord, ScheduleService};
use greetcard_render::{CanvasSurface, HitIndex, RenderAdapter, RenderFrame, TextMetrics};

pub mod notify;
pub mod shortcuts;

use notify::{Notifier, Toast};
use shortcuts::{match_shortcut, EditorShortcut, KeyChord};

pub const SCHEDULED_MESSAGE: &str = "Birthday message scheduled";

/// Install the `env_logger` backend, honoring `RUST_LOG` (default `info`).
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// A birthday card editor as seen by its host: one session, the surface it
/// is painted on, and the configuration both were built from.
pub struct EditorApp {
    config: EditorConfig,
    surface: CanvasSurface,
    session: EditorSession,
}

impl EditorApp {
    pub fn new(config: EditorConfig) -> Self {
        let surface = config.surface();
        let session = EditorSession::new(config.session_options(surface.edge));
        Self {
            config,
            surface,
            session,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    // ── Layout ───────────────────────────────────────────────────────

    /// The canvas container was measured at `width` (or could not be).
    pub fn resize(&mut self, container_width: Option<f64>) -> f64 {
        let edge = self.surface.fit_container(container_width);
        self.session.resize_canvas(edge);
        edge
    }

    /// The frame the painter should show now.
    pub fn frame(&self) -> RenderFrame {
        RenderFrame::compose(self.session.document(), self.session.selection(), self.surface.edge)
    }

    /// Toolbar state for the host's controls.
    pub fn status(&self) -> EditorStatus {
        let doc = self.session.document();
        let photo = doc.photo.as_ref();
        EditorStatus {
            has_photo: photo.is_some(),
            photo_ready: photo.is_some_and(|p| p.is_resolved()),
            zoom: photo.map(|p| p.zoom_factor),
            rotation: photo.map(|p| p.rotation_degrees),
            template_id: doc.template.id.clone(),
            text_count: doc.text_count(),
            selection: self.session.selection(),
            current_font: self.session.current_font().css_name().to_string(),
            can_undo: self.session.can_undo(),
            can_redo: self.session.can_redo(),
            undo_label: self.session.undo_label(),
            redo_label: self.session.redo_label(),
            undo_steps: self.session.history().undo_depth(),
            gesture_open: self.session.history().is_batching(),
        }
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Pointer pressed at `point`: select what is under it, or clear the
    /// selection on empty canvas. The overlay never takes the press.
    pub fn pointer_down(&mut self, point: Point, metrics: &dyn TextMetrics) -> Selection {
        let index = HitIndex::build(&self.frame(), metrics);
        match index.hit(&point) {
            Some(target) => {
                self.session
                    .apply_gesture(GestureEvent::new(target, GestureKind::Select));
            }
            None => self.session.clear_selection(),
        }
        self.session.selection()
    }

    /// Editor-wide key handling. Returns `true` when the chord was consumed
    /// and the host must suppress its native handling.
    pub fn handle_key(&mut self, chord: &KeyChord) -> bool {
        let Some(shortcut) = match_shortcut(chord) else {
            return false;
        };
        let changed = match shortcut {
            EditorShortcut::Undo => self.session.undo(),
            EditorShortcut::Redo => self.session.redo(),
        };
        debug!("{:?} via keyboard (changed: {})", shortcut, changed);
        true
    }

    // ── Schedule ─────────────────────────────────────────────────────

    /// Export the card, upload it, and create the birthday schedule.
    ///
    /// Any failure is reported as a single error toast and leaves the
    /// document as it was so the user can retry.
    pub fn schedule(
        &mut self,
        adapter: &mut dyn RenderAdapter,
        store: &mut dyn ImageStore,
        schedules: &mut dyn ScheduleService,
        notifier: &mut dyn Notifier,
        recipient: &Recipient,
        message: &str,
    ) -> Option<ScheduleRecord> {
        match self.try_schedule(adapter, store, schedules, recipient, message) {
            Ok(record) => {
                notifier.notify(Toast::success(SCHEDULED_MESSAGE));
                Some(record)
            }
            Err(e) => {
                error!("scheduling card for {} failed at {}: {}", recipient.employee_id, e.step(), e);
                notifier.notify(Toast::error(e.user_message()));
                None
            }
        }
    }

    fn try_schedule(
        &mut self,
        adapter: &mut dyn RenderAdapter,
        store: &mut dyn ImageStore,
        schedules: &mut dyn ScheduleService,
        recipient: &Recipient,
        message: &str,
    ) -> Result<ScheduleRecord, PublishError> {
        self.session.finish_gesture();
        let export = export_card(
            &self.session,
            adapter,
            &self.surface,
            &recipient.first_name,
            now_millis(),
        )?;
        let record = Publisher::new(store, schedules, &self.config.storage).publish(&export, recipient, message)?;
        info!("card for {} scheduled as {}", recipient.first_name, record.id);
        Ok(record)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Photo handles the host may release now.
    pub fn reclaim_images(&mut self) -> Vec<ImageHandle> {
        self.session.reclaim_images()
    }

    /// Close the editor, returning every photo handle still to release.
    pub fn close(self) -> Vec<ImageHandle> {
        self.session.close()
    }
}

impl Default for EditorApp {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorStatus {
    pub has_photo: bool,
    pub photo_ready: bool,
    pub zoom: Option<f64>,
    pub rotation: Option<f64>,
    pub template_id: String,
    pub text_count: usize,
    pub selection: Selection,
    pub current_font: String,
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_label: Option<&'static str>,
    pub redo_label: Option<&'static str>,
    pub undo_steps: usize,
    /// A slider drag is still collecting into one undo step.
    pub gesture_open: bool,
}

impl EditorStatus {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greetcard_io::{ScheduleRequest, ServiceError};
    use greetcard_render::{ApproximateMetrics, Raster, RenderError};
    use notify::{Severity, ToastQueue};

    #[derive(Default)]
    struct FakeCanvas {
        painted: usize,
        broken: bool,
    }

    impl RenderAdapter for FakeCanvas {
        fn paint(&mut self, _frame: &RenderFrame) -> Result<(), RenderError> {
            self.painted += 1;
            Ok(())
        }

        fn snapshot(&mut self, pixel_ratio: f64) -> Result<Raster, RenderError> {
            if self.broken {
                return Err(RenderError::NotMounted);
            }
            let px = (350.0 * pixel_ratio) as u32;
            Ok(Raster::png(px, px, vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n']))
        }
    }

    #[derive(Default)]
    struct Bucket {
        paths: Vec<String>,
        offline: bool,
    }

    impl ImageStore for Bucket {
        fn upload(
            &mut self,
            bucket: &str,
            path: &str,
            _bytes: &[u8],
            _content_type: &str,
        ) -> Result<String, ServiceError> {
            if self.offline {
                return Err(ServiceError::new("network down"));
            }
            assert_eq!(bucket, "birthday-app");
            self.paths.push(path.to_string());
            Ok(format!("https://files.test/{}", path))
        }
    }

    #[derive(Default)]
    struct Schedules {
        created: Vec<ScheduleRequest>,
    }

    impl ScheduleService for Schedules {
        fn create_schedule(&mut self, request: &ScheduleRequest) -> Result<ScheduleRecord, ServiceError> {
            self.created.push(request.clone());
            Ok(ScheduleRecord {
                id: "s-1".to_string(),
                employee_id: request.employee_id.clone(),
                message: request.message.clone(),
                image_url: request.image_url.clone(),
            })
        }
    }

    fn ada() -> Recipient {
        Recipient {
            employee_id: "42".to_string(),
            first_name: "Ada".to_string(),
        }
    }

    fn app_with_card() -> EditorApp {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut app = EditorApp::default();
        let handle = app.session_mut().load_photo("blob:card");
        app.session_mut().photo_decoded(&handle, 1000, 500);
        app.session_mut().add_text();
        app
    }

    #[test]
    fn test_keyboard_undo_redo() {
        let mut app = app_with_card();
        assert_eq!(app.session().document().text_count(), 1);

        assert!(app.handle_key(&KeyChord::new("z").ctrl()));
        assert_eq!(app.session().document().text_count(), 0);
        assert!(app.handle_key(&KeyChord::new("z").meta().shift()));
        assert_eq!(app.session().document().text_count(), 1);
        assert!(!app.handle_key(&KeyChord::new("b").ctrl()));
    }

    #[test]
    fn test_shortcut_consumed_at_history_boundary() {
        let mut app = EditorApp::default();
        assert!(app.handle_key(&KeyChord::new("y").ctrl()));
        assert!(!app.status().can_redo);
    }

    #[test]
    fn test_pointer_on_empty_canvas_clears_selection() {
        let mut app = EditorApp::default();
        app.session_mut().change_template("blank");
        let selection = app.pointer_down(Point::new(10.0, 10.0), &ApproximateMetrics::default());
        assert_eq!(selection, Selection::None);

        let mut app = app_with_card();
        assert!(matches!(app.session().selection(), Selection::Text(_)));
        // Outside the 350x175 photo band and away from the text.
        let selection = app.pointer_down(Point::new(300.0, 20.0), &ApproximateMetrics::default());
        assert_eq!(selection, Selection::None);
        let selection = app.pointer_down(Point::new(300.0, 120.0), &ApproximateMetrics::default());
        assert_eq!(selection, Selection::Photo);
    }

    #[test]
    fn test_pointer_beside_rotated_photo_clears_selection() {
        let mut app = EditorApp::default();
        let handle = app.session_mut().load_photo("blob:square");
        app.session_mut().photo_decoded(&handle, 700, 700);
        app.session_mut().set_rotation(45.0);
        app.session_mut().finish_gesture();
        assert_eq!(app.session().selection(), Selection::Photo);

        let metrics = ApproximateMetrics::default();
        // Inside the square's axis-aligned bounds but off the turned photo.
        assert_eq!(app.pointer_down(Point::new(10.0, 10.0), &metrics), Selection::None);
        assert_eq!(app.pointer_down(Point::new(175.0, 175.0), &metrics), Selection::Photo);
        assert_eq!(app.pointer_down(Point::new(340.0, 340.0), &metrics), Selection::None);
    }

    #[test]
    fn test_resize_follows_container() {
        let mut app = EditorApp::default();
        assert!((app.resize(Some(300.0)) - 268.0).abs() < 1e-10);
        assert!((app.session().canvas_edge() - 268.0).abs() < 1e-10);
        assert!((app.frame().edge - 268.0).abs() < 1e-10);
        assert!((app.resize(None) - 350.0).abs() < 1e-10);
    }

    #[test]
    fn test_schedule_success() {
        let mut app = app_with_card();
        let (mut canvas, mut bucket, mut schedules, mut toasts) =
            (FakeCanvas::default(), Bucket::default(), Schedules::default(), ToastQueue::default());

        let record = app
            .schedule(&mut canvas, &mut bucket, &mut schedules, &mut toasts, &ada(), "Happy birthday, Ada!")
            .unwrap();
        assert_eq!(record.employee_id, "42");
        assert!(bucket.paths[0].starts_with("birthday-card-Ada-"));
        assert!(bucket.paths[0].ends_with(".png"));
        assert_eq!(schedules.created[0].image_url, format!("https://files.test/{}", bucket.paths[0]));
        assert_eq!(toasts.drain(), vec![Toast::new(SCHEDULED_MESSAGE, Severity::Success)]);
    }

    #[test]
    fn test_schedule_failure_keeps_document() {
        let mut app = app_with_card();
        let before = app.session().document().clone();
        let undo_depth = app.session().history().undo_depth();
        let (mut canvas, mut bucket, mut schedules, mut toasts) = (
            FakeCanvas::default(),
            Bucket {
                offline: true,
                ..Default::default()
            },
            Schedules::default(),
            ToastQueue::default(),
        );

        assert!(app
            .schedule(&mut canvas, &mut bucket, &mut schedules, &mut toasts, &ada(), "hi")
            .is_none());
        assert!(schedules.created.is_empty());
        assert_eq!(app.session().document(), &before);
        assert_eq!(app.session().history().undo_depth(), undo_depth);
        assert_eq!(toasts.drain(), vec![Toast::error("Something went wrong")]);
    }

    #[test]
    fn test_schedule_without_photo_reports_error() {
        let mut app = EditorApp::default();
        let (mut canvas, mut bucket, mut schedules, mut toasts) =
            (FakeCanvas::default(), Bucket::default(), Schedules::default(), ToastQueue::default());
        assert!(app
            .schedule(&mut canvas, &mut bucket, &mut schedules, &mut toasts, &ada(), "hi")
            .is_none());
        assert!(bucket.paths.is_empty());
        assert_eq!(toasts.len(), 1);

        canvas.broken = true;
        let mut app = app_with_card();
        assert!(app
            .schedule(&mut canvas, &mut bucket, &mut schedules, &mut toasts, &ada(), "hi")
            .is_none());
        assert_eq!(toasts.drain().last().map(|t| t.severity), Some(Severity::Error));
    }

    #[test]
    fn test_status_json() {
        let app = app_with_card();
        let status = app.status();
        assert!(status.has_photo && status.photo_ready);
        assert_eq!(status.undo_label, Some("Add text"));
        let json = status.to_json().unwrap();
        assert!(json.contains("\"template_id\":\"t2\""));
        // Load, decode and add text.
        assert_eq!(status.undo_steps, 3);
        assert!(!status.gesture_open);

        let mut app = app;
        app.session_mut().set_zoom(1.5);
        app.session_mut().set_zoom(1.8);
        assert!(app.status().gesture_open);
        app.session_mut().finish_gesture();
        let status = app.status();
        assert!(!status.gesture_open);
        assert_eq!(status.undo_steps, 4);
    }
}
