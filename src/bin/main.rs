use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::Parser;
use eframe::egui;
use particle_field::frame_loop::{self, IntervalClock};
use particle_field::{
    Error, FieldConfig, PainterSurface, ParticleField, RecordingSurface, Screen, SurfaceSize,
};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(9, 9, 11);

#[derive(Parser, Debug)]
#[command(version, about = "Interactive particle field backdrops")]
struct Args {
    /// sign-in, sign-up or forgot-password
    #[arg(long, default_value = "sign-in")]
    screen: Screen,

    /// TOML file replacing the chosen screen's preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run without a window on a worker thread
    #[arg(long)]
    headless: bool,

    /// Frames to render in headless mode
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Headless surface size
    #[arg(long, default_value_t = 800.0)]
    width: f32,
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let verbosity_level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let fmt_layer = fmt::layer().with_thread_ids(true).with_target(false);

    // RUST_LOG=
    let env_filter = EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy();

    let subscriber = Registry::default().with(fmt_layer).with(env_filter);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

struct ParticleBackdrop {
    screen: Screen,
    custom_config: Option<(Screen, FieldConfig)>,
    field: ParticleField,
    last_frame_time: Instant,
    update_time: Duration,
}

impl ParticleBackdrop {
    fn new(screen: Screen, custom_config: Option<FieldConfig>) -> particle_field::Result<Self> {
        let config = custom_config.clone().unwrap_or_else(|| screen.config());
        Ok(Self {
            screen,
            custom_config: custom_config.map(|config| (screen, config)),
            field: ParticleField::new(config)?,
            last_frame_time: Instant::now(),
            update_time: Duration::ZERO,
        })
    }

    fn config_for(&self, screen: Screen) -> FieldConfig {
        match &self.custom_config {
            Some((custom_screen, config)) if *custom_screen == screen => config.clone(),
            _ => screen.config(),
        }
    }

    fn switch_screen(&mut self, screen: Screen) {
        match ParticleField::new(self.config_for(screen)) {
            Ok(field) => {
                self.field.stop();
                self.field = field;
                self.screen = screen;
                info!(%screen, "switched screen");
            }
            Err(err) => error!(%screen, %err, "cannot build particle field"),
        }
    }

    fn render_ui_panel(&mut self, ui: &mut egui::Ui, frame_time: f32) {
        ui.label(format!("FPS: {:.3}", 1.0 / frame_time));
        ui.label(format!("Frame Time: {:.3}ms", frame_time * 1000.0));
        ui.label(format!("Update Time: {:.3}ms", self.update_time.as_secs_f64() * 1000.0));
        ui.label(format!("Particles: {}", self.field.particle_count()));
        ui.label(format!("Frames: {}", self.field.frames_rendered()));
        ui.separator();

        let mut selected = self.screen;
        for screen in Screen::ALL {
            ui.selectable_value(&mut selected, screen, screen.title());
        }
        if selected != self.screen {
            self.switch_screen(selected);
        }

        ui.separator();
        if ui.button("Restart").clicked() {
            self.field.stop();
        }
    }

    fn paint_field(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let (rect, _response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
        let size = SurfaceSize::new(rect.width(), rect.height());

        if self.field.is_running() {
            if let Err(err) = self.field.resize(size) {
                debug!(%err, "keeping previous bounds");
            }
        } else {
            // Retried every frame until layout hands us a real size.
            match self.field.start(size) {
                Ok(()) => info!(screen = %self.screen, "particle field running"),
                Err(Error::UnmeasuredSurface { .. }) => {}
                Err(err) => error!(%err, "cannot start particle field"),
            }
        }

        if let Some(pos) = ctx.input(|i| i.pointer.hover_pos()) {
            self.field.on_screen_pointer_move(
                cgmath::vec2(pos.x, pos.y),
                cgmath::vec2(rect.min.x, rect.min.y),
            );
        }

        let painter = ui.painter_at(rect);
        let start_update = Instant::now();
        self.field.frame(&mut PainterSurface::new(&painter, rect, BACKGROUND));
        self.update_time = start_update.elapsed();

        painter.text(
            rect.center_top() + egui::vec2(0.0, 48.0),
            egui::Align2::CENTER_CENTER,
            self.screen.title(),
            egui::FontId::proportional(28.0),
            egui::Color32::WHITE,
        );
    }
}

impl eframe::App for ParticleBackdrop {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let current_time = Instant::now();
        let frame_time = current_time.duration_since(self.last_frame_time);
        self.last_frame_time = current_time;

        egui::SidePanel::left("Control Panel").show(ctx, |ui| {
            self.render_ui_panel(ui, frame_time.as_secs_f32());
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND))
            .show(ctx, |ui| self.paint_field(ctx, ui));

        ctx.request_repaint();
    }
}

fn run_headless(args: &Args, config: FieldConfig) -> anyhow::Result<()> {
    let size = SurfaceSize::new(args.width, args.height);
    let field = Arc::new(ParticleField::new(config)?);
    field.start(size)?;

    let worker = {
        let field = field.clone();
        let mut clock = IntervalClock::default().with_limit(args.frames);
        std::thread::spawn(move || {
            let mut surface = RecordingSurface::new();
            frame_loop::run(&field, &mut clock, &mut surface)
        })
    };

    // Circle the pointer around the middle of the surface.
    let started = Instant::now();
    while !worker.is_finished() {
        let angle = started.elapsed().as_secs_f32();
        field.on_pointer_move(
            size.width * 0.5 + angle.cos() * size.width * 0.25,
            size.height * 0.5 + angle.sin() * size.height * 0.25,
        );
        std::thread::sleep(Duration::from_millis(16));
    }

    field.stop();
    let frames = worker
        .join()
        .map_err(|_| anyhow::anyhow!("frame loop panicked"))?;
    let elapsed = started.elapsed().as_secs_f64();
    info!(frames, fps = frames as f64 / elapsed.max(f64::EPSILON), "headless run finished");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let custom_config = args
        .config
        .as_ref()
        .map(|path| {
            FieldConfig::from_toml_file(path).with_context(|| format!("loading {}", path.display()))
        })
        .transpose()?;

    if args.headless {
        let config = custom_config.unwrap_or_else(|| args.screen.config());
        return run_headless(&args, config);
    }

    let backdrop = ParticleBackdrop::new(args.screen, custom_config)?;
    eframe::run_native(
        "Particle Field",
        eframe::NativeOptions {
            renderer: eframe::Renderer::Wgpu,
            initial_window_size: Some(egui::vec2(1100.0, 720.0)),
            ..Default::default()
        },
        Box::new(move |_cc| Box::new(backdrop)),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))
}
