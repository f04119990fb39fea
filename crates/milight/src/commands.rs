//! Command execution

use anyhow::{bail, Context, Result};
use milight_ambient::{AmbientDriver, CancellationToken, MonitorInfo, MonitorSource, ScreenColor};
use milight_control::{
    discover_with, Command as WireCommand, CommandSink, Controller, ControllerLink, DiscoveryConfig,
    Family, Lights, Receiver,
};
use std::io::Write;
use std::time::Duration;
use tracing::info;

use crate::cli::{AllAction, AmbientArgs, Level, LightCommand, Step, Temperature};
use crate::config::{AmbientSettings, ReceiverSettings};

/// Sink for `--dry-run`: prints each command instead of sending it
#[derive(Debug)]
pub struct PrintSink<W: Write> {
    out: W,
}

impl<W: Write> PrintSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandSink for PrintSink<W> {
    fn send(&mut self, command: WireCommand) -> milight_control::Result<()> {
        writeln!(self.out, "{}", command)?;
        Ok(())
    }
}

/// Transport chosen at runtime
pub type DynSink = Box<dyn CommandSink + Send>;

/// Controller for the configured receiver, or a printing one for dry runs
pub fn connect(
    address: Option<&str>,
    settings: &ReceiverSettings,
    dry_run: bool,
) -> Result<Controller<DynSink>> {
    if dry_run {
        return Ok(Controller::new(Box::new(PrintSink::new(std::io::stdout()))));
    }

    let receiver = match settings.receiver(address)? {
        Some(receiver) => receiver,
        None => {
            info!("No receiver configured, searching the network");
            let found = discover_with(&DiscoveryConfig::default()).context("Discovery failed")?;
            match found.into_iter().next() {
                Some(receiver) => settings.apply(receiver),
                None => bail!("No receiver configured and none found on the network"),
            }
        }
    };

    let link = ControllerLink::connect(receiver.clone())
        .with_context(|| format!("Failed to open link to {}", receiver))?;
    Ok(Controller::new(Box::new(link)))
}

/// Run a one-shot command.
pub fn execute<S: CommandSink>(controller: &mut Controller<S>, command: &LightCommand) -> Result<()> {
    match *command {
        LightCommand::On { family, group } => controller.lights(family).switch_on(group)?,
        LightCommand::Off { family, group } => controller.lights(family).switch_off(group)?,
        LightCommand::Brightness { group, percentage } => {
            controller.rgbw().set_brightness(group, percentage)?
        }
        LightCommand::Hue {
            group,
            degrees,
            family,
        } => match family {
            Family::Rgbw => controller.rgbw().set_hue(group, degrees)?,
            Family::RgbLegacy => controller.rgb().set_hue(degrees)?,
            Family::White => unsupported("hue", family)?,
        },
        LightCommand::Color {
            group,
            color,
            family,
        } => match family {
            Family::Rgbw => controller.rgbw().set_color(group, color)?,
            Family::RgbLegacy => controller.rgb().set_color(color)?,
            Family::White => unsupported("color", family)?,
        },
        LightCommand::TrueColor { group, color } => controller.rgbw().set_true_color(group, color)?,
        LightCommand::White { group } => controller.rgbw().switch_white(group)?,
        LightCommand::Night { group } => controller.rgbw().set_night_mode(group)?,
        LightCommand::Mode { group } => controller.rgbw().cycle_mode(group)?,
        LightCommand::SpeedUp { group, family } => match family {
            Family::Rgbw => controller.rgbw().speed_up(group)?,
            Family::RgbLegacy => controller.rgb().speed_up()?,
            Family::White => unsupported("speed", family)?,
        },
        LightCommand::SpeedDown { group, family } => match family {
            Family::Rgbw => controller.rgbw().speed_down(group)?,
            Family::RgbLegacy => controller.rgb().speed_down()?,
            Family::White => unsupported("speed", family)?,
        },
        LightCommand::Effect { direction } => match direction {
            Step::Next => controller.rgb().next_effect()?,
            Step::Prev => controller.rgb().previous_effect()?,
        },
        LightCommand::Dim {
            direction,
            group,
            family,
        } => match (family, direction) {
            (Family::White, Level::Up) => controller.white().brightness_up(group)?,
            (Family::White, Level::Down) => controller.white().brightness_down(group)?,
            (Family::RgbLegacy, Level::Up) => controller.rgb().brightness_up()?,
            (Family::RgbLegacy, Level::Down) => controller.rgb().brightness_down()?,
            (Family::Rgbw, _) => bail!("rgbw bulbs take an absolute level, use `brightness`"),
        },
        LightCommand::Temp { direction, group } => match direction {
            Temperature::Warmer => controller.white().warmer(group)?,
            Temperature::Cooler => controller.white().cooler(group)?,
        },
        LightCommand::All { action } => match action {
            AllAction::On => controller.all_on()?,
            AllAction::Off => controller.all_off()?,
            AllAction::White => controller.all_white()?,
        },
    }
    Ok(())
}

fn unsupported(what: &str, family: Family) -> Result<()> {
    bail!("{} bulbs do not support {}", family, what)
}

/// Discover receivers and print them, one per line or as JSON.
pub fn discover(linger: Duration, json: bool, out: &mut impl Write) -> Result<Vec<Receiver>> {
    let config = DiscoveryConfig {
        linger,
        ..Default::default()
    };
    let receivers = discover_with(&config).context("Discovery failed")?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&receivers)?)?;
    } else if receivers.is_empty() {
        writeln!(out, "No receivers found")?;
    } else {
        for receiver in &receivers {
            writeln!(out, "{}", receiver)?;
        }
    }
    Ok(receivers)
}

/// Print attached monitors, one per line.
pub fn monitors(out: &mut impl Write) -> Result<()> {
    let monitors = MonitorSource::list().context("Cannot list monitors")?;
    print_monitors(&monitors, out)
}

fn print_monitors(monitors: &[MonitorInfo], out: &mut impl Write) -> Result<()> {
    if monitors.is_empty() {
        writeln!(out, "No monitors found")?;
    }
    for monitor in monitors {
        writeln!(out, "{}", monitor)?;
    }
    Ok(())
}

/// Command line overrides on top of the configured ambient settings
pub fn ambient_settings(mut settings: AmbientSettings, args: &AmbientArgs) -> AmbientSettings {
    if let Some(group) = args.group {
        settings.group = group;
    }
    if let Some(period_ms) = args.period_ms {
        settings.period_ms = period_ms;
    }
    if let Some(grid) = args.grid {
        settings.grid_size = grid;
    }
    if let Some(method) = args.method {
        settings.method = method;
    }
    if args.no_smoothing {
        settings.smoothing = false;
    }
    if args.monitor.is_some() {
        settings.monitor = args.monitor.clone();
    }
    if args.region.is_some() {
        settings.region = args.region;
    }
    settings
}

/// Run the ambient loop on the calling thread until `token` is cancelled.
pub fn run_ambient<S: CommandSink>(
    controller: Controller<S>,
    settings: &AmbientSettings,
    token: &CancellationToken,
) -> Result<()> {
    let monitor = match &settings.monitor {
        Some(name) => MonitorSource::named(name)?,
        None => MonitorSource::primary()?,
    };
    let region = settings.region.unwrap_or_else(|| monitor.info().bounds());

    let mut sampler = ScreenColor::new(monitor, region)
        .with_stride(settings.grid_size)
        .with_method(settings.method)
        .with_smoothing(settings.smoothing);
    info!(
        "Sampling {} pixels of {}x{} at ({}, {})",
        sampler.pixel_amount()?,
        region.width,
        region.height,
        region.x,
        region.y
    );

    let mut driver = AmbientDriver::new(sampler, controller, settings.loop_config())?;
    driver.run(token)?;
    Ok(())
}
