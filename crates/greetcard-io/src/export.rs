use log::{info, warn};
use thiserror::Error;

use greetcard_core::EditorSession;
use greetcard_render::{CanvasSurface, Raster, RasterEncoding, RenderAdapter, RenderError, RenderFrame};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: no photo has been added")]
    NothingToExport,

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Snapshot produced an empty image")]
    EmptyRaster,

    #[error("Snapshot is not a valid {0:?} image")]
    BadEncoding(RasterEncoding),
}

/// A rasterized card ready for upload.
#[derive(Debug, Clone)]
pub struct CardExport {
    pub file_name: String,
    pub raster: Raster,
}

/// `birthday-card-<first name>-<unix millis>.png`. Path separators and
/// whitespace in the name become dashes.
pub fn export_file_name(first_name: &str, timestamp_ms: u64) -> String {
    let name: String = first_name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '-' } else { c })
        .collect();
    format!("birthday-card-{}-{}.png", name, timestamp_ms)
}

/// Rasterize the session's card through `adapter` at the surface's export
/// pixel ratio. Selection highlights are left out of the image and restored
/// on screen afterwards. The document is never modified.
pub fn export_card(
    session: &EditorSession,
    adapter: &mut dyn RenderAdapter,
    surface: &CanvasSurface,
    first_name: &str,
    timestamp_ms: u64,
) -> Result<CardExport, ExportError> {
    if !session.document().has_photo() {
        return Err(ExportError::NothingToExport);
    }

    let frame = RenderFrame::compose(session.document(), session.selection(), surface.edge);
    adapter.paint(&frame.clone().without_selection())?;
    let snapshot = adapter.snapshot(surface.export_pixel_ratio);
    adapter.paint(&frame)?;

    let raster = snapshot?;
    if raster.is_empty() {
        return Err(ExportError::EmptyRaster);
    }
    if !raster.has_valid_signature() {
        return Err(ExportError::BadEncoding(raster.encoding));
    }
    let expected = surface.export_edge_px();
    if raster.width != expected || raster.height != expected {
        warn!(
            "snapshot is {}x{}, expected {}x{}",
            raster.width, raster.height, expected, expected
        );
    }

    let file_name = export_file_name(first_name, timestamp_ms);
    info!(
        "exported {} ({}x{}, {} bytes)",
        file_name,
        raster.width,
        raster.height,
        raster.bytes.len()
    );
    Ok(CardExport { file_name, raster })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records painted frames and returns a fake PNG sized to the last one.
    #[derive(Default)]
    pub(crate) struct FakeAdapter {
        pub frames: Vec<RenderFrame>,
        pub fail_snapshot: bool,
        pub garbled: bool,
    }

    impl RenderAdapter for FakeAdapter {
        fn paint(&mut self, frame: &RenderFrame) -> Result<(), RenderError> {
            self.frames.push(frame.clone());
            Ok(())
        }

        fn snapshot(&mut self, pixel_ratio: f64) -> Result<Raster, RenderError> {
            if self.fail_snapshot {
                return Err(RenderError::Snapshot("context lost".to_string()));
            }
            let frame = self.frames.last().ok_or(RenderError::NotMounted)?;
            let px = (frame.edge * pixel_ratio) as u32;
            let mut bytes = if self.garbled {
                b"GIF89a".to_vec()
            } else {
                vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n']
            };
            bytes.extend(std::iter::repeat(0).take(frame.layers.len()));
            Ok(Raster::png(px, px, bytes))
        }
    }

    pub(crate) fn card_session() -> EditorSession {
        let mut session = EditorSession::default();
        let handle = session.load_photo("blob:photo");
        session.photo_decoded(&handle, 1000, 500);
        session.add_text();
        session
    }

    #[test]
    fn test_file_name_pattern() {
        assert_eq!(
            export_file_name("Ada", 1_700_000_000_123),
            "birthday-card-Ada-1700000000123.png"
        );
        assert_eq!(export_file_name(" Mary Ann ", 5), "birthday-card-Mary-Ann-5.png");
    }

    #[test]
    fn test_export_at_double_density_without_selection() {
        let session = card_session();
        let mut adapter = FakeAdapter::default();
        let surface = CanvasSurface::default();

        let export = export_card(&session, &mut adapter, &surface, "Ada", 42).unwrap();
        assert_eq!(export.raster.width, 700);
        assert!(export.raster.has_valid_signature());
        assert_eq!(export.file_name, "birthday-card-Ada-42.png");

        // Clean frame for the snapshot, then the on-screen frame again.
        assert_eq!(adapter.frames.len(), 2);
        assert_eq!(adapter.frames[0], adapter.frames[1].clone().without_selection());
        assert_ne!(adapter.frames[0], adapter.frames[1]);
    }

    #[test]
    fn test_export_requires_photo() {
        let session = EditorSession::default();
        let mut adapter = FakeAdapter::default();
        let err = export_card(&session, &mut adapter, &CanvasSurface::default(), "Ada", 1).unwrap_err();
        assert!(matches!(err, ExportError::NothingToExport));
        assert!(adapter.frames.is_empty());
    }

    #[test]
    fn test_snapshot_failure_restores_screen() {
        let session = card_session();
        let mut adapter = FakeAdapter {
            fail_snapshot: true,
            ..Default::default()
        };
        let err = export_card(&session, &mut adapter, &CanvasSurface::default(), "Ada", 1).unwrap_err();
        assert!(matches!(err, ExportError::Render(RenderError::Snapshot(_))));
        assert_eq!(adapter.frames.len(), 2);
    }

    #[test]
    fn test_snapshot_must_be_png() {
        let session = card_session();
        let mut adapter = FakeAdapter {
            garbled: true,
            ..Default::default()
        };
        let err = export_card(&session, &mut adapter, &CanvasSurface::default(), "Ada", 1).unwrap_err();
        assert!(matches!(err, ExportError::BadEncoding(RasterEncoding::Png)));
    }
}
