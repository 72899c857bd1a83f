mod clock;
mod compositor;
mod config;
mod graphics;
mod layout;
mod math;
mod sprite;
mod state;
mod terminal;
mod widget;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::{debug, info};

use crate::clock::MonotonicTime;
use crate::config::GearsConfig;
use crate::graphics::{Canvas, Rgba};
use crate::math::Rect;
use crate::sprite::ProceduralGears;
use crate::state::{AppState, FpsCounter};
use crate::terminal::{TerminalSession, Viewport};
use crate::widget::GearsWidget;

#[derive(Parser, Debug)]
#[command(name = "gears", version)]
#[command(about = "Three interlocking gears turning in the terminal")]
struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Draw into the whole terminal instead of the drawable's intrinsic size
    #[arg(long)]
    fill: bool,
    /// Milliseconds for one full turn of the hub gear
    #[arg(long, value_name = "MS")]
    period_ms: Option<u64>,
    /// Frames per second to aim for
    #[arg(long)]
    fps: Option<u32>,
    /// Overlap between gear rims, in pixels
    #[arg(long, value_name = "PX")]
    tooth_depth: Option<u32>,
    /// Start with the debug overlay shown
    #[arg(long)]
    debug: bool,
    /// Print a single frame at this base angle and exit
    #[arg(long, value_name = "ANGLE", value_parser = clap::value_parser!(i32).range(0..360))]
    snapshot: Option<i32>,
}

impl Cli {
    /// Command-line values win over the configuration file
    fn apply(&self, config: &mut GearsConfig) {
        if let Some(period_ms) = self.period_ms {
            config.period_ms = period_ms;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(tooth_depth) = self.tooth_depth {
            config.tooth_depth = tooth_depth;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = GearsConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let provider = ProceduralGears {
        hub: config.hub,
        mid: config.mid,
        small: config.small,
        tooth_height: config.tooth_depth,
    };
    let mut widget = GearsWidget::new(&provider, &config, MonotonicTime::new())
        .context("failed to build gear sprites")?;
    let state = AppState::new(cli.debug, cli.fill);

    match cli.snapshot {
        Some(angle) => snapshot(&config, &mut widget, state, angle),
        None => run(&config, &mut widget, state),
    }
}

/// Bounds the gears are laid out in for the given terminal size
fn drawing_bounds(
    state: &AppState,
    widget: &GearsWidget<MonotonicTime>,
    cols: u16,
    rows: u16,
) -> Rect {
    if state.fill {
        Rect::from_size(cols as i32, rows as i32 * 2)
    } else {
        Rect::from_size(widget.intrinsic_width(), widget.intrinsic_height())
    }
}

fn background(config: &GearsConfig) -> Option<Rgba> {
    config.background.map(|[r, g, b]| Rgba::rgb(r, g, b))
}

/// Resizes the canvas to `bounds` and hands the bounds to the widget
fn apply_bounds(canvas: &mut Canvas, widget: &mut GearsWidget<MonotonicTime>, bounds: Rect) {
    let (width, height) = (bounds.width.max(0) as usize, bounds.height.max(0) as usize);
    if (canvas.width(), canvas.height()) != (width, height) {
        canvas.resize(width, height);
    }
    widget.on_bounds_changed(bounds);
}

fn snapshot(
    config: &GearsConfig,
    widget: &mut GearsWidget<MonotonicTime>,
    state: AppState,
    angle: i32,
) -> Result<()> {
    let (cols, rows) = if state.fill {
        terminal::size().context("failed to query terminal size")?
    } else {
        (0, 0)
    };
    let bounds = drawing_bounds(&state, widget, cols, rows);
    let mut canvas = Canvas::new(0, 0);
    apply_bounds(&mut canvas, widget, bounds);
    widget.paint_at(&mut canvas, angle);

    let mut out = io::stdout().lock();
    terminal::print_rows(&mut out, &canvas, background(config))?;
    Ok(())
}

fn run(
    config: &GearsConfig,
    widget: &mut GearsWidget<MonotonicTime>,
    mut state: AppState,
) -> Result<()> {
    let mut session = TerminalSession::new().context("failed to set up terminal")?;
    let frame_interval = config.frame_interval();
    let background = background(config);

    let (mut cols, mut rows) = terminal::size().context("failed to query terminal size")?;
    let bounds = drawing_bounds(&state, widget, cols, rows);
    let mut canvas = Canvas::new(0, 0);
    apply_bounds(&mut canvas, widget, bounds);
    widget.set_visible(state.visible());
    info!("animating at {} fps in a {cols}x{rows} terminal", config.fps);

    let mut fps = FpsCounter::new(Instant::now());
    let mut needs_paint = true;
    let mut needs_clear = true;

    loop {
        if widget.tick() {
            needs_paint = true;
        }

        if needs_paint {
            let out = session.out();
            if needs_clear {
                terminal::clear(out)?;
                needs_clear = false;
            }
            canvas.clear(Rgba::TRANSPARENT);
            widget.paint(&mut canvas);

            let viewport = Viewport::centered(canvas.width(), canvas.height(), cols, rows);
            terminal::present(out, &canvas, viewport, background)?;
            fps.frame(Instant::now());
            if state.debug {
                terminal::overlay(out, &debug_lines(widget, &fps))?;
            }
            if state.paused {
                terminal::status(out, "Paused", cols, rows)?;
            }
            out.flush()?;
            needs_paint = false;
        }

        if !event::poll(frame_interval)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char('p') | KeyCode::Char('P') => {
                    state.paused = !state.paused;
                    widget.set_visible(state.visible());
                    needs_paint = true;
                    needs_clear = true;
                }
                KeyCode::Char('d') | KeyCode::Char('D') => {
                    state.debug = !state.debug;
                    needs_paint = true;
                    needs_clear = true;
                }
                _ => {}
            },
            Event::Resize(new_cols, new_rows) => {
                debug!("terminal resized to {new_cols}x{new_rows}");
                (cols, rows) = (new_cols, new_rows);
                let bounds = drawing_bounds(&state, widget, cols, rows);
                apply_bounds(&mut canvas, widget, bounds);
                needs_paint = true;
                needs_clear = true;
            }
            focus @ (Event::FocusGained | Event::FocusLost) => {
                state.focused = matches!(focus, Event::FocusGained);
                widget.set_visible(state.visible());
                needs_paint = true;
            }
            _ => {}
        }
    }

    info!("exiting");
    Ok(())
}

fn debug_lines(widget: &GearsWidget<MonotonicTime>, fps: &FpsCounter) -> Vec<String> {
    let angles = widget.angles().normalized();
    let bounds = widget.layout().bounds;
    let clock = if widget.is_running() { "running" } else { "stopped" };
    vec![
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        format!(
            "Base angle: {} ({:.3} of a {:?} turn, {clock})",
            widget.base_angle(),
            widget.phase(),
            widget.period()
        ),
        format!(
            "Hub: {:.1}, Mid: {:.1}, Small: {:.1}",
            angles.hub, angles.mid, angles.small
        ),
        format!("Bounds: {}x{}", bounds.width, bounds.height),
        format!("FPS: {:.2}", fps.fps()),
    ]
}
