use clap::Parser;
use sdl2::keyboard::Keycode;
use sparkmorph::config::AppConfig;
use sparkmorph::control::{Controller, RemoteCommand, SOCKET_PATH};
use sparkmorph::display::{
    draw_text, Display, InputEvent, MouseButtonKind, PixelBuffer, RenderTarget, DEFAULT_HEIGHT,
    DEFAULT_WIDTH,
};
use sparkmorph::effects::{Effect, FireworksEffect, TextAnimation};
use sparkmorph::stage::Stage;
use sparkmorph::util::FpsCounter;
use sparkmorph::FxError;
use std::path::PathBuf;
use std::process::ExitCode;

const FIREWORKS_LAYER: &str = "#fireworks";
const TEXT_LAYER: &str = "#text";

/// Fireworks and dot-matrix text in a window
#[derive(Parser, Debug)]
#[command(name = "sparkmorph")]
#[command(version, about)]
struct Args {
    /// JSON config file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window width
    #[arg(short = 'W', long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Window height
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,

    /// Window size as WxH (e.g. 1920x1080), overrides --width/--height
    #[arg(short, long, value_parser = parse_resolution)]
    resolution: Option<(u32, u32)>,

    /// Disable VSync for uncapped framerate
    #[arg(long)]
    no_vsync: bool,

    /// Script for the text animation, overrides the config
    #[arg(short, long)]
    script: Option<String>,

    /// Accept remote commands on a Unix socket
    #[arg(long)]
    socket: bool,

    /// Receive scripts over MQTT
    #[arg(long)]
    mqtt: bool,

    /// MQTT broker host, overrides the config
    #[arg(long)]
    mqtt_host: Option<String>,

    /// MQTT topic, overrides the config
    #[arg(long)]
    mqtt_topic: Option<String>,
}

fn parse_resolution(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got '{}'", s))?;
    let w = w.parse::<u32>().map_err(|e| format!("bad width: {}", e))?;
    let h = h.parse::<u32>().map_err(|e| format!("bad height: {}", e))?;
    if w == 0 || h == 0 {
        return Err("resolution must be non-zero".to_string());
    }
    Ok((w, h))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), FxError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(script) = args.script.clone() {
        config.script = script;
    }
    let (width, height) = args.resolution.unwrap_or((args.width, args.height));
    let vsync = !args.no_vsync;

    let (mut display, texture_creator) = Display::with_options("sparkmorph", width, height, vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;
    let mut screen = PixelBuffer::with_size(width, height);

    let mut stage = Stage::new(width, height, config.stage.background);
    stage
        .add_layer(FIREWORKS_LAYER, (0, 0))
        .add_layer(TEXT_LAYER, config.stage.text_margin);

    let mut fireworks = FireworksEffect::new(&stage, FIREWORKS_LAYER, config.fireworks.clone())?;
    let mut text = TextAnimation::new(&stage, TEXT_LAYER, config.text.clone())?;
    fireworks.start();
    text.animate(config.script.as_str());
    log::info!(
        "layers: {} on {}, {} on {}",
        fireworks.name(),
        fireworks.selector(),
        text.name(),
        text.selector()
    );

    let controller = if args.socket {
        Some(Controller::new(SOCKET_PATH)?)
    } else {
        None
    };

    #[cfg(feature = "mqtt")]
    let mqtt_client = if args.mqtt {
        let host = args.mqtt_host.as_deref().unwrap_or(&config.mqtt.host);
        let topic = args.mqtt_topic.as_deref().unwrap_or(&config.mqtt.topic);
        Some(sparkmorph::mqtt::MqttClient::new(host, topic)?)
    } else {
        None
    };
    #[cfg(not(feature = "mqtt"))]
    if args.mqtt {
        log::warn!("built without the mqtt feature, ignoring --mqtt");
    }

    let mut fps_counter = FpsCounter::new(60);
    let mut show_fps = false;

    log::info!(
        "{}x{}, vsync {}; click to launch, Space toggles fireworks, A auto, F fps, Esc quits",
        width,
        height,
        if vsync { "on" } else { "off" }
    );

    'main: loop {
        let (dt, avg_fps) = fps_counter.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => match key {
                    Keycode::Escape => break 'main,
                    Keycode::Space => fireworks.toggle(),
                    Keycode::A => fireworks.start_auto_fireworks(),
                    Keycode::F => show_fps = !show_fps,
                    _ => {},
                },
                InputEvent::MouseDown {
                    x,
                    y,
                    button: MouseButtonKind::Left,
                } => {
                    let (lx, ly) = stage.to_layer(fireworks.selector(), x, y)?;
                    fireworks.create_firework(lx, ly);
                },
                InputEvent::MouseDown { .. } => {},
                InputEvent::Resized(w, h) => {
                    stage.resize(w, h);
                    screen.resize(w, h);
                    target = RenderTarget::with_size(&texture_creator, w, h)?;
                },
            }
        }

        if let Some(controller) = &controller {
            for cmd in controller.poll() {
                match cmd {
                    RemoteCommand::ToggleFireworks => fireworks.toggle(),
                    RemoteCommand::StartFireworks => fireworks.start(),
                    RemoteCommand::StopFireworks => fireworks.stop(),
                    RemoteCommand::Launch(x, y) => {
                        let (lx, ly) = stage.to_layer(fireworks.selector(), x, y)?;
                        fireworks.create_firework(lx, ly);
                    },
                    RemoteCommand::AutoFireworks => fireworks.start_auto_fireworks(),
                    RemoteCommand::Animate(script) => text.animate(script),
                    RemoteCommand::ToggleFps => show_fps = !show_fps,
                    RemoteCommand::Quit => break 'main,
                }
            }
        }

        #[cfg(feature = "mqtt")]
        if let Some(client) = &mqtt_client {
            for script in client.poll() {
                text.animate(script);
            }
        }

        let (fw, fh) = stage.layer(fireworks.selector())?.size();
        fireworks.update(dt, fw, fh);
        let (tw, th) = stage.layer(text.selector())?.size();
        text.update(dt, tw, th);

        fireworks.render(stage.buffer_mut(fireworks.selector())?);
        text.render(stage.buffer_mut(text.selector())?);
        stage.compose(&mut screen);

        if show_fps {
            let fps_text = format!(
                "FPS {}  {}ms  dots {}  sparks {}",
                avg_fps as u32,
                fps_counter.avg_frame_time_ms() as u32,
                text.dot_count(),
                fireworks.sparks().len()
            );
            // Shadow for visibility on light trails
            let y = screen.height() as i32 - 12;
            draw_text(&mut screen, 5, y + 1, &fps_text, 0, 0, 0);
            draw_text(&mut screen, 4, y, &fps_text, 255, 255, 0);
        }

        display.present(&mut target, &screen)?;
    }

    log::info!("bye");
    Ok(())
}
