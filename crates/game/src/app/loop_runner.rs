use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use view::{EntityRenderer, FrameClock, HeadlessSurface, ReconcileReport, RenderSurface};

use super::bootstrap::AppWiring;
use super::config::GameConfig;
use super::demo_world::DemoWorld;
use super::metrics::MetricsAccumulator;
use super::path_preview::{path_polyline, polyline_length};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Pacing {
    Virtual,
    Realtime,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct LoopSettings {
    pub(crate) world_dt: Duration,
    pub(crate) frame_target: Duration,
    pub(crate) max_frame_delta: Duration,
    pub(crate) max_world_ticks_per_frame: u32,
    pub(crate) run_duration: Duration,
    pub(crate) metrics_log_interval: Duration,
    pub(crate) game_speed: f32,
    pub(crate) pacing: Pacing,
}

impl LoopSettings {
    pub(crate) fn from_config(config: &GameConfig) -> Self {
        let world_tps = config.world_tps.max(1);
        let render_fps = config.render_fps.max(1);
        Self {
            world_dt: Duration::from_secs_f64(1.0 / world_tps as f64),
            frame_target: Duration::from_secs_f64(1.0 / render_fps as f64),
            max_frame_delta: normalize_non_zero_duration(
                Duration::from_millis(config.max_frame_delta_ms),
                Duration::from_millis(250),
            ),
            max_world_ticks_per_frame: config.max_world_ticks_per_frame.max(1),
            run_duration: config.run_duration(),
            metrics_log_interval: normalize_non_zero_duration(
                Duration::from_millis(config.metrics_log_interval_ms),
                Duration::from_secs(1),
            ),
            game_speed: config.game_speed.max(0.0),
            pacing: if config.realtime {
                Pacing::Realtime
            } else {
                Pacing::Virtual
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct RunSummary {
    pub(crate) frames: u64,
    pub(crate) world_ticks: u64,
    pub(crate) dropped_backlog: Duration,
    pub(crate) churn: ReconcileReport,
    pub(crate) peak_tracked: usize,
    pub(crate) peak_moving: usize,
    pub(crate) timers_shown: usize,
    pub(crate) longest_path_preview: f32,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let settings = LoopSettings::from_config(&app.config);
    let surface = HeadlessSurface::new();
    let mut renderer = EntityRenderer::new(surface, app.config.layout(), app.config.view.clone());
    let mut world = DemoWorld::new();

    info!(
        world_tps = app.config.world_tps,
        render_fps = app.config.render_fps,
        max_frame_delta_ms = settings.max_frame_delta.as_millis() as u64,
        max_world_ticks_per_frame = settings.max_world_ticks_per_frame,
        metrics_log_interval_ms = settings.metrics_log_interval.as_millis() as u64,
        run_seconds = settings.run_duration.as_secs_f64(),
        game_speed = settings.game_speed,
        pacing = ?settings.pacing,
        "loop_config"
    );

    let summary = run_session(&settings, &mut world, &mut renderer);
    let counters = renderer.surface().counters();
    info!(
        frames = summary.frames,
        world_ticks = summary.world_ticks,
        sim_ticks = world.ticks(),
        sim_seconds = world.elapsed_seconds(),
        created = summary.churn.created,
        updated = summary.churn.updated,
        destroyed = summary.churn.destroyed,
        recreated = summary.churn.recreated,
        peak_tracked = summary.peak_tracked,
        peak_moving = summary.peak_moving,
        dropped_backlog_ms = summary.dropped_backlog.as_millis() as u64,
        nodes_spawned = counters.spawned,
        nodes_despawned = counters.despawned,
        live_nodes = renderer.surface().live_count(),
        "shutdown"
    );

    ExitCode::SUCCESS
}

pub(crate) fn run_session<S: RenderSurface>(
    settings: &LoopSettings,
    world: &mut DemoWorld,
    renderer: &mut EntityRenderer<S>,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let start = Instant::now();
    let world_dt_seconds = settings.world_dt.as_secs_f32();
    let clock = FrameClock {
        paused: settings.game_speed <= 0.0,
        game_speed: settings.game_speed,
    };

    let initial = renderer.reconcile(&world.snapshot(), start);
    add_churn(&mut summary.churn, &initial);

    let mut accumulator = Duration::ZERO;
    let mut virtual_elapsed = Duration::ZERO;
    let mut last_frame_instant = start;
    let mut metrics = MetricsAccumulator::new(settings.metrics_log_interval, start);

    loop {
        let now = match settings.pacing {
            Pacing::Virtual => {
                virtual_elapsed += settings.frame_target;
                start + virtual_elapsed
            }
            Pacing::Realtime => {
                let elapsed = last_frame_instant.elapsed();
                thread::sleep(compute_frame_sleep(elapsed, settings.frame_target));
                Instant::now()
            }
        };
        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
        last_frame_instant = now;
        let frame_dt = clamp_frame_delta(raw_frame_dt, settings.max_frame_delta);

        accumulator = accumulator.saturating_add(frame_dt.mul_f32(settings.game_speed));
        let plan = plan_world_steps(
            accumulator,
            settings.world_dt,
            settings.max_world_ticks_per_frame,
        );
        accumulator = plan.remaining_accumulator;
        if !plan.dropped_backlog.is_zero() {
            warn!(
                dropped_backlog_ms = plan.dropped_backlog.as_millis() as u64,
                "sim_clamp_triggered"
            );
            summary.dropped_backlog = summary.dropped_backlog.saturating_add(plan.dropped_backlog);
        }

        for _ in 0..plan.ticks_to_run {
            world.step(world_dt_seconds);
            let report = renderer.reconcile(&world.snapshot(), now);
            add_churn(&mut summary.churn, &report);
            metrics.record_tick(&report);
            summary.world_ticks += 1;
        }

        let frame = renderer.advance_frame(frame_dt.as_secs_f32(), clock, now);
        summary.timers_shown += frame.timers_shown;
        metrics.record_frame(frame_dt);
        summary.frames += 1;
        summary.peak_tracked = summary.peak_tracked.max(renderer.tracked_count());
        summary.peak_moving = summary.peak_moving.max(renderer.moving_count());

        if let Some(mover) = world.focus_mover() {
            if let Some(preview) = path_polyline(renderer, mover) {
                summary.longest_path_preview =
                    summary.longest_path_preview.max(polyline_length(&preview));
            }
        }

        if let Some(snapshot) = metrics.maybe_snapshot(now) {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                created = snapshot.created,
                updated = snapshot.updated,
                destroyed = snapshot.destroyed,
                recreated = snapshot.recreated,
                visuals = renderer.tracked_count(),
                moving = renderer.moving_count(),
                "loop_metrics"
            );
        }

        if now.saturating_duration_since(start) >= settings.run_duration {
            debug!(frames = summary.frames, "run_duration_reached");
            break;
        }
    }

    renderer.dispose();
    summary
}

fn add_churn(total: &mut ReconcileReport, report: &ReconcileReport) {
    total.created += report.created;
    total.updated += report.updated;
    total.destroyed += report.destroyed;
    total.recreated += report.recreated;
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_world_steps(
    mut accumulator: Duration,
    world_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= world_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(world_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= world_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn compute_frame_sleep(elapsed: Duration, target: Duration) -> Duration {
    target.saturating_sub(elapsed)
}
