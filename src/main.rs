use std::path::PathBuf;

use rastercore::color::lerp;
use rastercore::{Error, ImageView, NoiseGenerator, Polygon, Result, Rgb, ViewConfig};

const DEFAULT_WIDTH: usize = 800;
const DEFAULT_HEIGHT: usize = 600;
const MIN_WIDTH: usize = 300;
const MIN_HEIGHT: usize = 280;
const DEFAULT_SEED: u64 = 1;
const DEFAULT_OUTPUT: &str = "rastercore.png";

/// Tint cycle length in milliseconds
const TINT_PERIOD_MS: u64 = 2000;

const WHITE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

struct Options {
    width: usize,
    height: usize,
    seed: u64,
    config: Option<PathBuf>,
    output: PathBuf,
    window: bool,
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        seed: DEFAULT_SEED,
        config: None,
        output: PathBuf::from(DEFAULT_OUTPUT),
        window: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--window" => opts.window = true,
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<usize>() {
                        opts.width = w;
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<usize>() {
                        opts.height = h;
                    }
                    i += 1;
                }
            },
            "--seed" => {
                if i + 1 < args.len() {
                    if let Ok(s) = args[i + 1].parse::<u64>() {
                        opts.seed = s;
                    }
                    i += 1;
                }
            },
            "--config" => {
                if i + 1 < args.len() {
                    opts.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            },
            "--output" | "-o" => {
                if i + 1 < args.len() {
                    opts.output = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: rastercore [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --width W, -w W       Canvas width (default: {})", DEFAULT_WIDTH);
                println!("  --height H, -h H      Canvas height (default: {})", DEFAULT_HEIGHT);
                println!("  --seed N              Noise seed (default: {})", DEFAULT_SEED);
                println!("  --config FILE         View config JSON (undersampling, wrap, filter)");
                println!("  --output FILE, -o FILE  PNG to write (default: {})", DEFAULT_OUTPUT);
                println!("  --window              Animate in a window (needs the `window` feature)");
                println!("  --help                Show this help message");
                std::process::exit(0);
            },
            other => log::warn!("ignoring unknown argument {}", other),
        }
        i += 1;
    }

    opts
}

/// Draw one frame of the showcase scene at time `t_ms`
fn render_scene(view: &mut ImageView<u8>, noise: &NoiseGenerator, t_ms: u64) -> Result<()> {
    let pentagon = Polygon::from_coords(&[(80, 100), (150, 50), (280, 100), (200, 200), (100, 200)]);
    let mut p = view.painter();

    p.generate_fractal_perlin_noise(noise)?;

    // Red pulses with time, green and blue ramp with column and row
    let phase = (t_ms % TINT_PERIOD_MS) as f32 / TINT_PERIOD_MS as f32;
    let red_scale = if (t_ms / TINT_PERIOD_MS) % 2 == 1 {
        lerp(0.0, 256.0, phase)
    } else {
        lerp(256.0, 0.0, phase)
    };
    for y in 0..p.height() {
        for x in 0..p.width() {
            let c = p.texture().get_rgb(x, y);
            let tinted = Rgb::new(
                (red_scale * c.r as f32 / 256.0) as u8,
                ((x % 256) * c.g as usize / 256) as u8,
                ((y % 256) * c.b as usize / 256) as u8,
            );
            p.draw_pixel(x, y, tinted);
        }
    }

    // Fan of ten spokes rotating one degree per 10ms
    let delta = (t_ms % 3600) as f32 / 10.0;
    for step in 0..10 {
        let angle = (delta + step as f32 * 10.0).to_radians();
        let x2 = (200.0 * angle.sin() + 400.0) as i64;
        let y2 = (200.0 * angle.cos() + 300.0) as i64;
        p.draw_line_safe(400, 300, x2, y2, WHITE);
    }

    p.draw_rect(30, 30, 80, 60, WHITE);
    p.draw_rect_empty(200, 200, 80, 60, WHITE);
    p.draw_circle(400, 300, 100, WHITE);
    p.draw_circle_empty(400, 300, 200, WHITE);
    p.draw_polygon_empty(&pentagon, WHITE)?;

    p.finish();
    Ok(())
}

#[cfg(feature = "window")]
fn run_window(view: &mut ImageView<u8>, noise: &NoiseGenerator) -> Result<()> {
    use rastercore::display::{Display, InputEvent, RenderTarget};
    use sdl2::keyboard::Keycode;

    let (w, h) = (view.texture().width() as u32, view.texture().height() as u32);
    let (mut display, texture_creator) = Display::with_options("rastercore", w, h, true)?;
    let mut target = RenderTarget::with_size(&texture_creator, w, h, view.texture().channels())?;
    let start = std::time::Instant::now();

    'running: loop {
        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'running,
                _ => {},
            }
        }

        render_scene(view, noise, start.elapsed().as_millis() as u64)?;
        display.present(&mut target, &view.frame())?;
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = parse_args();

    if opts.width < MIN_WIDTH || opts.height < MIN_HEIGHT {
        return Err(Error::InvalidDimensions {
            width: opts.width,
            height: opts.height,
            channels: 3,
        });
    }

    let config = match &opts.config {
        Some(path) => ViewConfig::load(path)?,
        None => ViewConfig::default(),
    };
    log::info!(
        "canvas {}x{}, seed {}, config {:?}",
        opts.width,
        opts.height,
        opts.seed,
        config
    );

    let mut view = ImageView::<u8>::with_size(opts.width, opts.height, 3, config)?;
    let noise = NoiseGenerator::new(opts.seed);

    if opts.window {
        #[cfg(feature = "window")]
        return run_window(&mut view, &noise);

        #[cfg(not(feature = "window"))]
        log::warn!("built without the `window` feature; writing {} instead", opts.output.display());
    }

    render_scene(&mut view, &noise, 0)?;
    view.texture().write_picture(&opts.output)?;
    println!("wrote {}", opts.output.display());
    Ok(())
}
