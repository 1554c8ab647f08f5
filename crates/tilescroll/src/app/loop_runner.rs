use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::present::{Presenter, SpriteAtlas};
use crate::render::{
    EntityCapacities, FrameRenderer, GeometryError, ScreenGeometry, ScreenSettings,
};
use crate::{resolve_app_paths, StartupError};

use super::input::KeyTracker;
use super::metrics::{FrameSample, MetricsAccumulator};
use super::pacing::{slow_frame_delay, FramePacer};
use super::session::{prepare_frame, Session, SessionCommand};
use super::MetricsHandle;

/// Window and pacing settings for [`run_app`].
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
    pub screen: ScreenSettings,
    pub entity_capacities: EntityCapacities,
    /// Overrides `<root>/assets/sprites`.
    pub sprites_dir: Option<PathBuf>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "lanibombers".to_string(),
            window_width: 1280,
            window_height: 960,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
            screen: ScreenSettings::default(),
            entity_capacities: EntityCapacities::default(),
            sprites_dir: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("invalid screen geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize presenter: {0}")]
    CreatePresenter(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, session: Box<dyn Session>) -> Result<(), AppError> {
    run_app_with_metrics(config, session, MetricsHandle::default())
}

/// Opens the window and drives `session` until the window closes or the
/// session quits. Startup failures are returned; failures inside the running
/// loop are logged and end the loop.
pub fn run_app_with_metrics(
    config: LoopConfig,
    mut session: Box<dyn Session>,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let app_paths = resolve_app_paths()?;
    let sprites_dir = config
        .sprites_dir
        .clone()
        .unwrap_or_else(|| app_paths.sprites_dir.clone());
    info!(
        root = %app_paths.root.display(),
        sprites_dir = %sprites_dir.display(),
        "startup"
    );

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(config.window_width),
                f64::from(config.window_height),
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut presenter = Presenter::new(Arc::clone(&window)).map_err(AppError::CreatePresenter)?;
    let (width, height) = presenter.size();
    let geometry = ScreenGeometry::new(width, height, &config.screen)?;
    let mut atlas = SpriteAtlas::load(&sprites_dir, config.screen.tile_px);
    let mut frame = FrameRenderer::new(geometry, config.entity_capacities);
    session.attach(&mut atlas);
    info!(
        map_width = session.map().width(),
        map_height = session.map().height(),
        zoom = geometry.zoom,
        "session_attached"
    );

    let now = Instant::now();
    let mut pacer = FramePacer::new(
        config.target_tps,
        config.max_frame_delta,
        config.max_ticks_per_frame,
        config.max_render_fps,
        now,
    );
    let stall = slow_frame_delay(config.simulated_slow_frame_ms);
    let mut metrics = MetricsAccumulator::new(if config.metrics_log_interval.is_zero() {
        Duration::from_secs(1)
    } else {
        config.metrics_log_interval
    });
    let mut keys = KeyTracker::new(width, height);
    let tick_seconds = pacer.tick_seconds();
    info!(
        target_tps = config.target_tps.max(1),
        max_frame_delta_ms = pacer.max_frame_delta().as_millis() as u64,
        max_ticks_per_frame = pacer.max_ticks_per_frame(),
        slow_frame_delay_ms = stall.as_millis() as u64,
        render_fps_cap = %pacer.render_cap_label(),
        "loop_config"
    );

    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    keys.request_quit();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    keys.resize(size.width, size.height);
                    if let Err(error) = presenter.resize(size.width, size.height) {
                        warn!(error = %error, "presenter_resize_failed");
                        window_target.exit();
                        return;
                    }
                    apply_window_size(&mut frame, size.width, size.height, &config.screen);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    keys.key_event(&event);
                    if keys.quit_requested() {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    if !stall.is_zero() {
                        thread::sleep(stall);
                    }

                    let frame_start = Instant::now();
                    let budget = pacer.begin_frame(frame_start);
                    for _ in 0..budget.ticks {
                        let input = keys.take_snapshot();
                        let command = session.update(tick_seconds, &input);
                        metrics.record_tick();
                        if command == SessionCommand::Quit {
                            info!(reason = "session_quit", "shutdown_requested");
                            window_target.exit();
                            break;
                        }
                    }
                    if !budget.dropped.is_zero() {
                        warn!(
                            dropped_backlog_ms = budget.dropped.as_millis() as u64,
                            max_ticks_per_frame = pacer.max_ticks_per_frame(),
                            "sim_clamp_triggered"
                        );
                    }

                    let cap_delay = pacer.present_delay(Instant::now());
                    if !cap_delay.is_zero() {
                        thread::sleep(cap_delay);
                    }

                    let render_start = Instant::now();
                    let viewport = prepare_frame(session.as_mut(), &mut frame, &mut atlas);
                    let sprites_drawn = presenter.present(&frame, &atlas).unwrap_or_else(|error| {
                        warn!(error = %error, "presenter_draw_failed");
                        window_target.exit();
                        0
                    });
                    let presented_at = Instant::now();
                    pacer.mark_presented(presented_at);
                    metrics.record_frame(FrameSample {
                        frame_dt: budget.elapsed,
                        render_dt: presented_at.saturating_duration_since(render_start),
                        sprites_drawn,
                    });

                    if let Some(snapshot) = metrics.maybe_snapshot(frame_start) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            render_time_ms = snapshot.render_time_ms,
                            sprites_per_frame = snapshot.sprites_per_frame,
                            viewport_x = viewport.x,
                            viewport_y = viewport.y,
                            zoom = frame.geometry().zoom,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            Event::LoopExiting => {
                session.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Rebuilds screen geometry for a new window size. Zero sizes (minimized
/// windows) keep the previous geometry.
fn apply_window_size(
    frame: &mut FrameRenderer,
    width: u32,
    height: u32,
    settings: &ScreenSettings,
) {
    match ScreenGeometry::new(width, height, settings) {
        Ok(geometry) => frame.set_geometry(geometry),
        Err(GeometryError::ZeroScreen { .. }) => {}
        Err(error) => warn!(error = %error, width, height, "geometry_rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::GridExtent;

    #[test]
    fn resize_rebuilds_geometry_and_ignores_zero_size() {
        let settings = ScreenSettings::default();
        let geometry = ScreenGeometry::new(640, 480, &settings).expect("geometry");
        let mut frame = FrameRenderer::new(geometry, EntityCapacities::default());

        apply_window_size(&mut frame, 1920, 1440, &settings);
        assert_eq!(frame.geometry().zoom, 3.0);

        apply_window_size(&mut frame, 0, 0, &settings);
        assert_eq!(frame.geometry().zoom, 3.0);
        assert_eq!(frame.geometry().viewport_tiles, GridExtent::new(64, 45));
    }

    #[test]
    fn default_config_matches_the_reference_window() {
        let config = LoopConfig::default();
        assert_eq!((config.window_width, config.window_height), (1280, 960));
        let geometry =
            ScreenGeometry::new(config.window_width, config.window_height, &config.screen)
                .expect("geometry");
        assert_eq!(geometry.zoom, 2.0);
    }
}
