//! Raster payloads of `<canvas>` elements, their data-URI export and the
//! deferred decode-and-draw queue used when a snapshot is restored.

use super::*;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use crate::pattern::Regex;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CanvasSurface {
    pub(crate) raster: Vec<u8>,
    pub(crate) tainted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingDraw {
    canvas: NodeId,
    data_url: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Canvases {
    surfaces: HashMap<NodeId, CanvasSurface>,
    pending: VecDeque<PendingDraw>,
}

impl Canvases {
    pub(crate) fn raster(&self, canvas: NodeId) -> &[u8] {
        self.surfaces
            .get(&canvas)
            .map(|surface| surface.raster.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn draw(&mut self, canvas: NodeId, raster: &[u8]) {
        self.surfaces.entry(canvas).or_default().raster = raster.to_vec();
    }

    pub(crate) fn set_tainted(&mut self, canvas: NodeId, tainted: bool) {
        self.surfaces.entry(canvas).or_default().tainted = tainted;
    }

    pub(crate) fn to_data_url(&self, canvas: NodeId, mime: &str) -> Result<String> {
        let surface = self.surfaces.get(&canvas);
        if surface.is_some_and(|surface| surface.tainted) {
            return Err(Error::CanvasExport(
                "the canvas has been tainted by cross-origin data".into(),
            ));
        }
        let raster = surface.map(|surface| surface.raster.as_slice()).unwrap_or_default();
        Ok(format!("data:{mime};base64,{}", BASE64_STANDARD.encode(raster)))
    }

    /// Queues a decode; nothing is drawn until [`Canvases::run_pending`].
    pub(crate) fn queue_draw(&mut self, canvas: NodeId, data_url: &str) {
        self.pending.push_back(PendingDraw {
            canvas,
            data_url: data_url.to_string(),
        });
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Runs queued decodes in order. A payload that fails to decode leaves
    /// its canvas untouched and is reported on the console.
    pub(crate) fn run_pending(&mut self, console: &mut Console) -> usize {
        let mut drawn = 0;
        while let Some(job) = self.pending.pop_front() {
            match decode_data_url(&job.data_url) {
                Ok((_, raster)) => {
                    self.draw(job.canvas, &raster);
                    drawn += 1;
                }
                Err(err) => console.error(format!("canvas restore failed: {err}")),
            }
        }
        drawn
    }
}

/// Splits an image data URI into its mime type and decoded bytes.
pub(crate) fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let shape = Regex::new(r"(?s)^data:([^;,]*)((?:;[^;,]*)*),(.*)$")
        .map_err(|err| Error::ImageDecode(err.to_string()))?;
    let caps = shape
        .captures(data_url)
        .map_err(|err| Error::ImageDecode(err.to_string()))?
        .ok_or_else(|| Error::ImageDecode("not a data URI".into()))?;

    let mime = caps.get(1).unwrap_or_default().trim().to_ascii_lowercase();
    if !mime.starts_with("image/") {
        return Err(Error::ImageDecode(format!("unsupported media type `{mime}`")));
    }
    let is_base64 = caps
        .get(2)
        .unwrap_or_default()
        .split(';')
        .any(|param| param.trim().eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Err(Error::ImageDecode("image payload is not base64".into()));
    }
    let payload: String = caps
        .get(3)
        .unwrap_or_default()
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect();
    let raster = BASE64_STANDARD
        .decode(payload.as_bytes())
        .map_err(|err| Error::ImageDecode(err.to_string()))?;
    Ok((mime, raster))
}
