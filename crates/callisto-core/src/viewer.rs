//! Per-viewer orchestration.
//!
//! An [`ImageViewer`] ties one image reference to its color pipeline,
//! viewport, and mode dispatcher. All parameter mutation happens
//! synchronously on the event-delivering thread; the one long-running
//! operation (cut-level estimation on large arrays) can be deferred to a
//! worker thread whose result is applied atomically at poll time. Redraw
//! requests are coalesced, last-request-wins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use tracing::{debug, info, warn};

use crate::autocuts::{self, AutoCutMethod, CutLevels};
use crate::consts::DEFAULT_CUT_RANGE;
use crate::error::{CallistoError, Result};
use crate::image::ImageData;
use crate::modes::{BindingMap, DispatchOutcome, InputEvent, ModeDispatcher, ViewerAction};
use crate::rgbmap::{
    ColorMapRegistry, IntensityMapRegistry, RgbBuffer, RgbMapper, DISTRIBUTIONS,
};
use crate::settings::ViewerConfig;
use crate::viewport::{CoordSpace, DataBounds, Point, Viewport};

/// Why a redraw was requested. Carried so the renderer can skip work
/// (e.g. reuse the RGB buffer when only the transform moved).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedrawReason {
    ImageChanged,
    PipelineChanged,
    TransformChanged,
}

/// Coalescing redraw queue: at most one pending request per viewer.
#[derive(Debug, Default)]
pub struct RedrawScheduler {
    pending: Option<(u64, RedrawReason)>,
    next_serial: u64,
}

impl RedrawScheduler {
    /// Queue a redraw, superseding any not-yet-serviced request.
    /// Returns the request serial.
    pub fn request(&mut self, reason: RedrawReason) -> u64 {
        self.next_serial += 1;
        self.pending = Some((self.next_serial, reason));
        self.next_serial
    }

    /// Take the pending request, if any.
    pub fn take(&mut self) -> Option<(u64, RedrawReason)> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// In-flight background cut-level estimation.
#[derive(Debug)]
struct CutJob {
    rx: mpsc::Receiver<Result<CutLevels>>,
    cancel: Arc<AtomicBool>,
    _handle: thread::JoinHandle<()>,
}

#[derive(Debug)]
pub struct ImageViewer {
    image: Option<Arc<ImageData>>,
    mapper: RgbMapper,
    viewport: Viewport,
    dispatcher: ModeDispatcher,
    config: ViewerConfig,
    cmaps: ColorMapRegistry,
    imaps: IntensityMapRegistry,
    redraw: RedrawScheduler,
    cut_job: Option<CutJob>,
    images_seen: usize,
    cuts_user_set: bool,
    zoom_user_set: bool,
    pan_user_set: bool,
}

impl ImageViewer {
    pub fn new(win_width: u32, win_height: u32) -> Self {
        Self::with_config(win_width, win_height, ViewerConfig::default())
    }

    pub fn with_config(win_width: u32, win_height: u32, config: ViewerConfig) -> Self {
        let mut viewport = Viewport::new(win_width, win_height);
        if viewport
            .set_scale_limits(config.scale_min, config.scale_max)
            .is_err()
        {
            warn!(
                min = config.scale_min,
                max = config.scale_max,
                "invalid configured scale limits; keeping defaults"
            );
        }
        let mut mapper = RgbMapper::new();
        mapper.set_distribution(config.distribution);
        Self {
            image: None,
            mapper,
            viewport,
            dispatcher: ModeDispatcher::new(BindingMap::builtin().defaults),
            config,
            cmaps: ColorMapRegistry::with_defaults(),
            imaps: IntensityMapRegistry::with_defaults(),
            redraw: RedrawScheduler::default(),
            cut_job: None,
            images_seen: 0,
            cuts_user_set: false,
            zoom_user_set: false,
            pan_user_set: false,
        }
    }

    // -- image lifecycle ---------------------------------------------------

    /// Switch to a new image.
    ///
    /// Cancels any in-flight background estimation, resets the data
    /// limits, invalidates the histeq cache, applies the configured auto
    /// behaviors, and queues a redraw.
    pub fn set_image(&mut self, image: Arc<ImageData>) {
        self.cancel_background();

        let first = self.images_seen == 0;
        self.images_seen += 1;
        let (w, h) = (image.width(), image.height());
        info!(width = w, height = h, "image set");

        self.viewport
            .set_limits(DataBounds::new(0.0, 0.0, w as f64, h as f64));
        self.mapper.invalidate_histeq();
        self.image = Some(image.clone());

        if self
            .config
            .autocuts
            .should_apply(first, self.cuts_user_set)
        {
            let method = self.config.autocut_method.clone();
            match self.mapper.auto_levels(&image.data, &method) {
                Ok(cuts) => debug!(lo = cuts.lo, hi = cuts.hi, "auto cut levels applied"),
                Err(CallistoError::NoValidPixels) => {
                    let (lo, hi) = DEFAULT_CUT_RANGE;
                    warn!("no valid pixels; falling back to default cut range");
                    // The fallback range is a valid pair.
                    let _ = self.mapper.set_cut_levels(lo, hi);
                }
                Err(e) => warn!(error = %e, "auto cut estimation failed"),
            }
        }
        if self.config.autozoom.should_apply(first, self.zoom_user_set) {
            self.viewport.zoom_fit();
        }
        if self.config.autocenter.should_apply(first, self.pan_user_set) {
            let center = DataBounds::new(0.0, 0.0, w as f64, h as f64).center();
            // Data-space pan never consults the WCS backend.
            let _ = self.viewport.set_pan(center, CoordSpace::Data);
        }

        self.redraw.request(RedrawReason::ImageChanged);
    }

    pub fn image(&self) -> Option<&Arc<ImageData>> {
        self.image.as_ref()
    }

    // -- cut levels --------------------------------------------------------

    pub fn set_cut_levels(&mut self, lo: f32, hi: f32) -> Result<()> {
        self.mapper.set_cut_levels(lo, hi)?;
        self.cuts_user_set = true;
        self.redraw.request(RedrawReason::PipelineChanged);
        Ok(())
    }

    pub fn cut_levels(&self) -> CutLevels {
        self.mapper.cut_levels()
    }

    /// Estimate and apply cut levels synchronously.
    pub fn auto_levels(&mut self, method: &AutoCutMethod) -> Result<CutLevels> {
        let image = self.image.clone().ok_or(CallistoError::NoValidPixels)?;
        let cuts = self.mapper.auto_levels(&image.data, method)?;
        self.redraw.request(RedrawReason::PipelineChanged);
        Ok(cuts)
    }

    /// Start a background cut-level estimation, superseding any running
    /// one. The result is applied by [`ImageViewer::poll_background`].
    pub fn auto_levels_background(&mut self, method: AutoCutMethod) -> Result<()> {
        let image = self.image.clone().ok_or(CallistoError::NoValidPixels)?;
        self.cancel_background();

        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let worker_cancel = cancel.clone();
        let handle = thread::Builder::new()
            .name("callisto-autocuts".into())
            .spawn(move || {
                let result = autocuts::estimate(&image.data, &method);
                if !worker_cancel.load(Ordering::Relaxed) {
                    let _ = tx.send(result);
                }
            })
            .expect("failed to spawn auto-cuts worker");

        self.cut_job = Some(CutJob {
            rx,
            cancel,
            _handle: handle,
        });
        Ok(())
    }

    /// Apply a finished background estimation, if one is ready.
    ///
    /// Returns `Some` with the estimation outcome when a result was
    /// consumed this call; cancelled results are discarded silently.
    /// Never blocks.
    pub fn poll_background(&mut self) -> Option<Result<CutLevels>> {
        let received = self.cut_job.as_ref()?.rx.try_recv();
        match received {
            Ok(result) => {
                let cancelled = self
                    .cut_job
                    .as_ref()
                    .is_some_and(|job| job.cancel.load(Ordering::Relaxed));
                self.cut_job = None;
                if cancelled {
                    debug!("discarding cancelled cut-level result");
                    return None;
                }
                if let Ok(cuts) = &result {
                    // Estimator output upholds lo <= hi.
                    let _ = self.mapper.set_cut_levels(cuts.lo, cuts.hi);
                    self.redraw.request(RedrawReason::PipelineChanged);
                }
                Some(result)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.cut_job = None;
                None
            }
        }
    }

    /// Flag any in-flight background estimation as cancelled.
    pub fn cancel_background(&mut self) {
        if let Some(job) = &self.cut_job {
            job.cancel.store(true, Ordering::Relaxed);
        }
    }

    pub fn background_pending(&self) -> bool {
        self.cut_job.is_some()
    }

    // -- color pipeline ----------------------------------------------------

    pub fn set_color_algorithm(&mut self, name: &str) -> Result<()> {
        self.mapper.set_distribution_by_name(name)?;
        self.redraw.request(RedrawReason::PipelineChanged);
        Ok(())
    }

    pub fn set_color_map(&mut self, name: &str) -> Result<()> {
        let map = self.cmaps.get(name)?;
        self.mapper.set_color_map(map);
        self.redraw.request(RedrawReason::PipelineChanged);
        Ok(())
    }

    pub fn set_intensity_map(&mut self, name: &str) -> Result<()> {
        let map = self.imaps.get(name)?;
        self.mapper.set_intensity_map(map);
        self.redraw.request(RedrawReason::PipelineChanged);
        Ok(())
    }

    pub fn color_maps(&mut self) -> &mut ColorMapRegistry {
        &mut self.cmaps
    }

    pub fn intensity_maps(&mut self) -> &mut IntensityMapRegistry {
        &mut self.imaps
    }

    // -- viewport delegation -----------------------------------------------

    pub fn set_scale(&mut self, sx: f64, sy: f64) {
        self.viewport.set_scale(sx, sy);
        self.zoom_user_set = true;
        self.redraw.request(RedrawReason::TransformChanged);
    }

    pub fn scale_xy(&self) -> (f64, f64) {
        self.viewport.scale_xy()
    }

    pub fn zoom_to(&mut self, level: i32) {
        self.viewport.zoom_to(level);
        self.zoom_user_set = true;
        self.redraw.request(RedrawReason::TransformChanged);
    }

    pub fn zoom_in(&mut self, steps: i32) {
        self.viewport.zoom_in(steps);
        self.zoom_user_set = true;
        self.redraw.request(RedrawReason::TransformChanged);
    }

    pub fn zoom_out(&mut self, steps: i32) {
        self.viewport.zoom_out(steps);
        self.zoom_user_set = true;
        self.redraw.request(RedrawReason::TransformChanged);
    }

    pub fn zoom_fit(&mut self) {
        self.viewport.zoom_fit();
        self.redraw.request(RedrawReason::TransformChanged);
    }

    pub fn zoom_level(&self) -> i32 {
        self.viewport.zoom_level()
    }

    pub fn set_pan(&mut self, pt: Point, space: CoordSpace) -> Result<()> {
        self.viewport.set_pan(pt, space)?;
        self.pan_user_set = true;
        self.redraw.request(RedrawReason::TransformChanged);
        Ok(())
    }

    pub fn pan(&self, space: CoordSpace) -> Result<Point> {
        self.viewport.pan(space)
    }

    pub fn transform(&mut self, flip_x: bool, flip_y: bool, swap_xy: bool) {
        self.viewport.transform(flip_x, flip_y, swap_xy);
        self.redraw.request(RedrawReason::TransformChanged);
    }

    pub fn transforms(&self) -> (bool, bool, bool) {
        self.viewport.transforms()
    }

    pub fn rotate(&mut self, deg: f64) {
        self.viewport.rotate(deg);
        self.redraw.request(RedrawReason::TransformChanged);
    }

    pub fn rotation(&self) -> f64 {
        self.viewport.rotation()
    }

    pub fn data_to_window(&self, pt: Point) -> Point {
        self.viewport.data_to_window(pt)
    }

    pub fn window_to_data(&self, pt: Point) -> Point {
        self.viewport.window_to_data(pt)
    }

    // -- events ------------------------------------------------------------

    /// Feed one input event through the dispatcher and apply whatever
    /// action it resolves to.
    pub fn handle_event(&mut self, event: &InputEvent) -> DispatchOutcome {
        let outcome = self.dispatcher.dispatch(event);
        if let DispatchOutcome::Action(action) = &outcome {
            let action = action.clone();
            self.apply_action(&action, event);
        }
        outcome
    }

    fn apply_action(&mut self, action: &ViewerAction, event: &InputEvent) {
        match action {
            ViewerAction::ZoomIn => self.zoom_in(1),
            ViewerAction::ZoomOut => self.zoom_out(1),
            ViewerAction::ZoomScroll => {
                if let InputEvent::Scroll { amount, .. } = event {
                    if *amount >= 0.0 {
                        self.zoom_in(1);
                    } else {
                        self.zoom_out(1);
                    }
                }
            }
            ViewerAction::ZoomFit => {
                self.zoom_user_set = true;
                self.zoom_fit();
            }
            ViewerAction::ZoomTo(level) => self.zoom_to(*level),
            ViewerAction::PanTo => {
                if let Some(pos) = event.pos() {
                    let data_pt = self.viewport.window_to_data(pos);
                    let _ = self.set_pan(data_pt, CoordSpace::Data);
                }
            }
            ViewerAction::PanStep { dx, dy } => {
                let (sx, sy) = self.viewport.scale_xy();
                if let Ok(p) = self.viewport.pan(CoordSpace::Data) {
                    let pt = Point::new(p.x + dx / sx, p.y + dy / sy);
                    let _ = self.set_pan(pt, CoordSpace::Data);
                }
            }
            ViewerAction::RotateBy(deg) => self.rotate(*deg),
            ViewerAction::RotateReset => {
                let current = self.rotation();
                self.rotate(-current);
            }
            ViewerAction::FlipX => self.transform(true, false, false),
            ViewerAction::FlipY => self.transform(false, true, false),
            ViewerAction::SwapXy => self.transform(false, false, true),
            ViewerAction::TransformReset => {
                let (fx, fy, sxy) = self.transforms();
                self.transform(fx, fy, sxy);
            }
            ViewerAction::AutoCuts => {
                let method = self.config.autocut_method.clone();
                if let Err(e) = self.auto_levels(&method) {
                    warn!(error = %e, "auto cut estimation failed");
                }
            }
            ViewerAction::CutsDrag => {
                if let (Some(pos), Some(image)) = (event.pos(), self.image.clone()) {
                    if let Some((dmin, dmax)) = image.finite_minmax() {
                        let (ww, wh) = self.viewport.window_size();
                        let fx = (pos.x / ww).clamp(0.0, 1.0) as f32;
                        let fy = (pos.y / wh).clamp(0.0, 1.0) as f32;
                        // Horizontal position raises lo, vertical lowers
                        // hi; each spans half the data range.
                        let span = dmax - dmin;
                        let lo = dmin + fx * span * 0.5;
                        let hi = dmax - (1.0 - fy) * span * 0.5;
                        if lo <= hi {
                            let _ = self.set_cut_levels(lo, hi);
                        }
                    }
                }
            }
            ViewerAction::ContrastDrag => {
                if let Some(pos) = event.pos() {
                    let (ww, wh) = self.viewport.window_size();
                    let fx = (pos.x / ww).clamp(0.0, 1.0) as f32;
                    let fy = (pos.y / wh).clamp(0.0, 1.0) as f32;
                    self.mapper.set_brightness(fx * 2.0 - 1.0);
                    self.mapper.set_contrast(fy * 2.0);
                    self.redraw.request(RedrawReason::PipelineChanged);
                }
            }
            ViewerAction::NextDistribution => {
                let current = self.mapper.distribution();
                let idx = DISTRIBUTIONS
                    .iter()
                    .position(|d| *d == current)
                    .unwrap_or(0);
                let next = DISTRIBUTIONS[(idx + 1) % DISTRIBUTIONS.len()];
                self.mapper.set_distribution(next);
                self.redraw.request(RedrawReason::PipelineChanged);
            }
            ViewerAction::NextColorMap => {
                let names = self.cmaps.names();
                if names.is_empty() {
                    return;
                }
                let current = self.mapper.color_map().name().to_string();
                let idx = names.iter().position(|n| *n == current).unwrap_or(0);
                let next = &names[(idx + 1) % names.len()];
                // Names come from the registry itself.
                let _ = self.set_color_map(next);
            }
        }
    }

    // -- rendering ---------------------------------------------------------

    /// Render the current image through the pipeline. Proceeds with the
    /// current (previous valid) cut levels even while a background
    /// estimate is pending.
    pub fn render(&mut self) -> Option<RgbBuffer> {
        let image = self.image.clone()?;
        Some(self.mapper.map_array(&image.data))
    }

    pub fn request_redraw(&mut self, reason: RedrawReason) -> u64 {
        self.redraw.request(reason)
    }

    pub fn take_redraw(&mut self) -> Option<(u64, RedrawReason)> {
        self.redraw.take()
    }

    pub fn has_pending_redraw(&self) -> bool {
        self.redraw.has_pending()
    }

    // -- component access --------------------------------------------------

    pub fn mapper(&self) -> &RgbMapper {
        &self.mapper
    }

    pub fn mapper_mut(&mut self) -> &mut RgbMapper {
        &mut self.mapper
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn dispatcher(&self) -> &ModeDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut ModeDispatcher {
        &mut self.dispatcher
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}

impl Drop for ImageViewer {
    fn drop(&mut self) {
        // Tear-down cancels any in-flight estimation; the worker's result
        // is dropped with the channel.
        self.cancel_background();
    }
}
