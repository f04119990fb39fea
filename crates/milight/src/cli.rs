//! Command line definition

use clap::{Parser, Subcommand, ValueEnum};
use milight_ambient::{AveragingMethod, CaptureRegion};
use milight_control::{Color, Family};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "milight", version)]
#[command(about = "Control MiLight Wi-Fi bulbs and drive them from your screen")]
pub struct Cli {
    /// Config file (default: <config dir>/milight/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Receiver address, `ip` or `ip:port`; overrides the config file
    #[arg(short, long, global = true)]
    pub receiver: Option<String>,

    /// Print commands instead of sending them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find receivers on the local network
    Discover {
        /// Print receivers as JSON
        #[arg(long)]
        json: bool,

        /// Extra listening time after the last probe (ms)
        #[arg(long, default_value = "250")]
        linger_ms: u64,
    },

    /// List monitors available to `ambient --monitor`
    Monitors,

    /// Follow the screen color with an RGBW group until interrupted
    Ambient(AmbientArgs),

    /// Show or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    #[command(flatten)]
    Light(LightCommand),
}

/// One-shot bulb commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum LightCommand {
    /// Switch a group on
    On {
        #[arg(long, default_value = "rgbw")]
        family: Family,
        /// Group 1-4, or 0 for all
        #[arg(long, default_value = "0")]
        group: u8,
    },

    /// Switch a group off
    Off {
        #[arg(long, default_value = "rgbw")]
        family: Family,
        #[arg(long, default_value = "0")]
        group: u8,
    },

    /// Set RGBW brightness (0-100)
    Brightness {
        group: u8,
        #[arg(allow_negative_numbers = true)]
        percentage: i32,
    },

    /// Set the hue in degrees
    Hue {
        group: u8,
        #[arg(allow_negative_numbers = true)]
        degrees: f32,
        /// rgbw or rgb
        #[arg(long, default_value = "rgbw")]
        family: Family,
    },

    /// Set the hue of a color (#rrggbb or r,g,b)
    Color {
        group: u8,
        color: Color,
        #[arg(long, default_value = "rgbw")]
        family: Family,
    },

    /// Show a color as closely as possible: hue or white, plus brightness
    TrueColor { group: u8, color: Color },

    /// Switch an RGBW group to white
    White { group: u8 },

    /// Switch an RGBW group to night light
    Night { group: u8 },

    /// Cycle the RGBW effect mode
    Mode { group: u8 },

    /// Faster effect
    SpeedUp {
        #[arg(default_value = "0")]
        group: u8,
        /// rgbw or rgb
        #[arg(long, default_value = "rgbw")]
        family: Family,
    },

    /// Slower effect
    SpeedDown {
        #[arg(default_value = "0")]
        group: u8,
        #[arg(long, default_value = "rgbw")]
        family: Family,
    },

    /// Step through legacy RGB effects
    Effect { direction: Step },

    /// One brightness step on white or legacy RGB bulbs
    Dim {
        direction: Level,
        #[arg(default_value = "0")]
        group: u8,
        /// white or rgb
        #[arg(long, default_value = "white")]
        family: Family,
    },

    /// One color temperature step on white bulbs
    Temp { direction: Temperature, group: u8 },

    /// Every family at once
    All { action: AllAction },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Prev,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Up,
    Down,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temperature {
    Warmer,
    Cooler,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllAction {
    On,
    Off,
    White,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the config file location
    Path,
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Write {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Ambient options; unset values come from the config file
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct AmbientArgs {
    /// RGBW group to drive (0 = all)
    #[arg(long)]
    pub group: Option<u8>,

    /// Pause between samples (ms)
    #[arg(long)]
    pub period_ms: Option<u64>,

    /// Pixel spacing of the sample grid
    #[arg(long)]
    pub grid: Option<u32>,

    /// Averaging method: plain or boosted
    #[arg(long)]
    pub method: Option<AveragingMethod>,

    /// Send each sample as is, without averaging with the previous one
    #[arg(long)]
    pub no_smoothing: bool,

    /// Monitor name (default: primary)
    #[arg(long)]
    pub monitor: Option<String>,

    /// Region to sample as x,y,width,height
    #[arg(long, value_parser = parse_region)]
    pub region: Option<CaptureRegion>,
}

fn parse_region(text: &str) -> Result<CaptureRegion, String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected x,y,width,height, got '{}'", text));
    }
    let x = parts[0].parse().map_err(|e| format!("x: {}", e))?;
    let y = parts[1].parse().map_err(|e| format!("y: {}", e))?;
    let width = parts[2].parse().map_err(|e| format!("width: {}", e))?;
    let height = parts[3].parse().map_err(|e| format!("height: {}", e))?;
    let region = CaptureRegion::new(x, y, width, height);
    if region.is_empty() {
        return Err("region must not be empty".to_string());
    }
    Ok(region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("milight").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_light_commands() {
        let cli = parse(&["--receiver", "10.0.0.2", "on", "--family", "white", "--group", "3"]);
        assert_eq!(cli.receiver.as_deref(), Some("10.0.0.2"));
        assert_eq!(
            cli.command_light(),
            Some(&LightCommand::On {
                family: Family::White,
                group: 3
            })
        );

        let cli = parse(&["true-color", "2", "#ff8000", "--dry-run"]);
        assert!(cli.dry_run);
        assert_eq!(
            cli.command_light(),
            Some(&LightCommand::TrueColor {
                group: 2,
                color: Color::new(255, 128, 0)
            })
        );

        let cli = parse(&["brightness", "1", "-5"]);
        assert_eq!(
            cli.command_light(),
            Some(&LightCommand::Brightness {
                group: 1,
                percentage: -5
            })
        );
    }

    #[test]
    fn test_ambient_args() {
        let cli = parse(&["ambient", "--group", "2", "--method", "plain", "--region", "0,0,1920,540"]);
        match cli.command {
            Command::Ambient(args) => {
                assert_eq!(args.group, Some(2));
                assert_eq!(args.method, Some(AveragingMethod::Plain));
                assert_eq!(args.region, Some(CaptureRegion::sized(1920, 540)));
                assert!(!args.no_smoothing);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_monitors_command() {
        assert!(matches!(parse(&["monitors"]).command, Command::Monitors));
    }

    #[test]
    fn test_verbosity_counts() {
        assert_eq!(parse(&["-vv", "discover"]).verbose, 2);
    }

    #[test]
    fn test_parse_region() {
        assert_eq!(parse_region("10, 20, 30, 40").unwrap(), CaptureRegion::new(10, 20, 30, 40));
        assert!(parse_region("10,20,30").is_err());
        assert!(parse_region("0,0,0,10").is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_region_text_parses(
            x in -4000i32..4000,
            y in -4000i32..4000,
            width in 1u32..8000,
            height in 1u32..8000,
        ) {
            let text = format!("{},{},{},{}", x, y, width, height);
            proptest::prop_assert_eq!(
                parse_region(&text).unwrap(),
                CaptureRegion::new(x, y, width, height)
            );
        }
    }

    impl Cli {
        fn command_light(&self) -> Option<&LightCommand> {
            match &self.command {
                Command::Light(light) => Some(light),
                _ => None,
            }
        }
    }
}
