//! magick-convert CLI - crop, resize and recompress one image with ImageMagick
//!
//! Thin command-line front end over [`magick_convert::ConversionRequest`].

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use magick_convert::processing::geometry::{parse_ratio, parse_region};
use magick_convert::config::ProfileCrop;
use magick_convert::processing::converter_version;
use magick_convert::{
    init_with_config, Config, ConversionRequest, ConvertCommand, ConvertError, CropSpec, Gravity,
};

/// magick-convert - crop, resize and recompress images with ImageMagick
#[derive(Parser)]
#[command(
    name = "magick-convert",
    version,
    about = "Crop, resize and recompress an image with ImageMagick's convert",
    long_about = "magick-convert builds a single ImageMagick convert invocation from crop, resize \
                  and quality options, runs it, and reports whether the destination file was \
                  written. Transparent images are flattened onto white and EXIF orientation is \
                  applied on every conversion.",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Source image
    #[arg(value_name = "SOURCE")]
    source: Option<PathBuf>,

    /// Destination image
    #[arg(value_name = "DEST")]
    dest: Option<PathBuf>,

    /// Converter executable (default: from config, else `convert`)
    #[arg(long, env = "MAGICK_CONVERTER", value_name = "PATH")]
    converter: Option<PathBuf>,

    /// Target width in pixels
    #[arg(short, long, value_name = "PIXELS")]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(short = 'H', long, value_name = "PIXELS")]
    height: Option<u32>,

    /// Output quality (1-100, default: from config, else 90)
    #[arg(short, long, value_name = "QUALITY")]
    quality: Option<u32>,

    /// Crop to an aspect ratio before resizing (e.g. 16:9, 4/5, 1.5)
    #[arg(long, value_name = "RATIO", value_parser = cli_ratio, conflicts_with = "crop")]
    ratio: Option<f64>,

    /// Anchor for ratio crops from --ratio or the profile (default: center)
    #[arg(long, value_name = "GRAVITY", value_parser = cli_gravity, conflicts_with = "crop")]
    gravity: Option<Gravity>,

    /// Crop a fixed region before resizing
    #[arg(long, value_name = "WxH+X+Y", value_parser = cli_region)]
    crop: Option<CropSpec>,

    /// Apply a named profile (explicit options still win)
    #[arg(short, long, value_name = "NAME")]
    profile: Option<String>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the converter command without running it
    #[arg(long)]
    dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// List available conversion profiles
    Profiles {
        /// Show detailed profile information
        #[arg(long)]
        detailed: bool,

        /// Configuration file to read profiles from
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Validate configuration file
    Config {
        /// Configuration file to validate
        file: PathBuf,
    },
    /// Generate example configuration file
    ExampleConfig {
        /// Output file path
        #[arg(short, long, default_value = "magick-convert.toml")]
        output: PathBuf,
        /// Use YAML format instead of TOML
        #[arg(long)]
        yaml: bool,
    },
    /// Show the converter version
    Info {
        /// Converter executable to query
        #[arg(long, env = "MAGICK_CONVERTER", value_name = "PATH")]
        converter: Option<PathBuf>,

        /// Configuration file to read the converter path from
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn cli_ratio(s: &str) -> Result<f64, String> {
    parse_ratio(s).map_err(|e| e.to_string())
}

fn cli_gravity(s: &str) -> Result<Gravity, String> {
    s.parse().map_err(|e: ConvertError| e.to_string())
}

fn cli_region(s: &str) -> Result<CropSpec, String> {
    parse_region(s).map_err(|e| e.to_string())
}

/// Conversion report for --json
#[derive(Debug, Serialize)]
struct ConversionReport {
    success: bool,
    source: PathBuf,
    destination: PathBuf,
    command: Vec<String>,
    exit_code: Option<i32>,
    error: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let config_file = config_path(&cli);
    let config = match load_config(config_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("{}: Failed to initialize logging: {}", style("Error").red().bold(), e);
        process::exit(1);
    }
    if let Some(path) = config_file {
        info!("Loaded configuration from: {:?}", path);
    }

    let result = match cli.command {
        Some(ref command) => handle_subcommand(command, &config),
        None => run_conversion(&cli, &config),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            process::exit(1);
        }
    }
}

/// The config file the chosen action reads, if any
fn config_path(cli: &Cli) -> Option<&Path> {
    match &cli.command {
        None => cli.config.as_deref(),
        Some(Commands::Profiles { config, .. }) | Some(Commands::Info { config, .. }) => {
            config.as_deref()
        }
        Some(_) => None,
    }
}

/// Install the subscriber. `-Q`/`-v` win over `RUST_LOG`, which wins over
/// the configured level.
fn init_logging(cli: &Cli, config: &Config) -> magick_convert::Result<()> {
    let mut config = config.clone();

    if cli.quiet {
        config.logging.level = "error".to_string();
    } else if cli.verbose {
        config.logging.level = "debug".to_string();
    } else if let Some(filter) = std::env::var("RUST_LOG").ok().filter(|f| !f.is_empty()) {
        config.logging.level = filter;
    }

    init_with_config(&config)
}

/// Handle subcommands
fn handle_subcommand(command: &Commands, config: &Config) -> anyhow::Result<bool> {
    match command {
        Commands::Profiles { detailed, .. } => {
            show_profiles(config, *detailed);
        }
        Commands::Config { file } => {
            validate_config_file(file)?;
        }
        Commands::ExampleConfig { output, yaml } => {
            generate_example_config(output, *yaml)?;
        }
        Commands::Info { converter, .. } => {
            let converter = converter.as_deref().unwrap_or(&config.converter.path);
            show_info(converter)?;
        }
    }
    Ok(true)
}

/// Load the config file if one was given, otherwise defaults
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let config = Config::default().merge(
        Config::from_file(path).with_context(|| format!("Loading {}", path.display()))?,
    );
    config.validate()?;
    Ok(config)
}

/// Build the request from config, profile and explicit options, in that order
fn build_request(cli: &Cli, config: &Config, source: &Path) -> anyhow::Result<ConversionRequest> {
    let mut request = config.request().file_path(source);

    if let Some(converter) = &cli.converter {
        request = request.converter_path(converter);
    }

    let mut profile_ratio = false;
    if let Some(name) = &cli.profile {
        let mut profile = config.get_profile(name)?.clone();
        profile_ratio = matches!(profile.crop, Some(ProfileCrop::Ratio { .. }));
        if let Some(gravity) = cli.gravity {
            profile = profile.gravity(gravity);
        }
        debug!("Applying profile '{}': {}", name, profile.describe());
        request = profile.apply(request)?;
    }

    if cli.gravity.is_some() && cli.ratio.is_none() && !profile_ratio {
        bail!("--gravity needs --ratio or a profile with a ratio crop");
    }

    if let Some(width) = cli.width {
        request = request.width(width);
    }
    if let Some(height) = cli.height {
        request = request.height(height);
    }
    if let Some(quality) = cli.quality {
        request = request.quality(quality);
    }

    if let Some(ratio) = cli.ratio {
        request = request.crop_by_ratio(ratio, cli.gravity.unwrap_or_default())?;
    } else if let Some(crop) = cli.crop {
        request = request.crop(crop);
    }

    Ok(request)
}

/// Program followed by its arguments, for JSON output
fn command_line(command: &ConvertCommand) -> Vec<String> {
    std::iter::once(command.program().to_string_lossy().into_owned())
        .chain(command.args_lossy())
        .collect()
}

/// Run the default conversion action
fn run_conversion(cli: &Cli, config: &Config) -> anyhow::Result<bool> {
    let (source, dest) = match (&cli.source, &cli.dest) {
        (Some(source), Some(dest)) => (source, dest),
        _ => bail!("SOURCE and DEST are required. Run with --help for usage information"),
    };

    let request = build_request(cli, config, source)?;

    if cli.dry_run {
        let command = request.command(dest)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&command_line(&command))?);
        } else {
            println!("{}", command);
        }
        return Ok(true);
    }

    let outcome = request.try_convert(dest);

    if cli.json {
        let report = match &outcome {
            Ok(conversion) => ConversionReport {
                success: true,
                source: source.clone(),
                destination: conversion.destination.clone(),
                command: command_line(&conversion.command),
                exit_code: conversion.status.and_then(|s| s.code),
                error: None,
            },
            Err(e) => {
                let (command, exit_code) = match e {
                    ConvertError::OutputMissing { command, status, .. } => {
                        (command_line(command), status.and_then(|s| s.code))
                    }
                    _ => (Vec::new(), None),
                };
                ConversionReport {
                    success: false,
                    source: source.clone(),
                    destination: dest.clone(),
                    command,
                    exit_code,
                    error: Some(e.user_message()),
                }
            }
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.success);
    }

    match outcome {
        Ok(conversion) => {
            if !cli.quiet {
                println!(
                    "{}: {} -> {}",
                    style("Converted").green().bold(),
                    source.display(),
                    conversion.destination.display()
                );
            }
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}: {}", style("Conversion failed").red().bold(), e.user_message());
            Ok(false)
        }
    }
}

/// Show available profiles
fn show_profiles(config: &Config, detailed: bool) {
    println!("{}", style("Available Conversion Profiles:").bold());
    println!();

    for name in config.profile_names() {
        println!("{}", style(name).cyan().bold());
        if detailed {
            if let Ok(profile) = config.get_profile(name) {
                println!("  {}", profile.describe());
                println!();
            }
        }
    }

    if !detailed {
        println!();
        println!("Use {} for detailed information", style("--detailed").dim());
    }
}

/// Validate configuration file
fn validate_config_file(file_path: &Path) -> anyhow::Result<()> {
    let config = Config::from_file(file_path)?;
    config.validate()?;

    println!("{}: Configuration file is valid", style("Success").green().bold());
    println!("Converter: {}", config.converter.path.display());
    println!("Profiles: {}", config.profiles.len());

    Ok(())
}

/// Generate example configuration file
fn generate_example_config(output_path: &Path, use_yaml: bool) -> anyhow::Result<()> {
    let output_path = if use_yaml {
        output_path.with_extension("yaml")
    } else {
        output_path.to_path_buf()
    };

    Config::default().to_file(&output_path)?;

    let format = if use_yaml { "YAML" } else { "TOML" };
    println!("{}: Generated example {} configuration: {}",
             style("Success").green().bold(),
             format,
             output_path.display());

    Ok(())
}

/// Show converter information
fn show_info(converter: &Path) -> anyhow::Result<()> {
    println!("{}", style("magick-convert").bold());
    println!("{}: {}", style("Version").bold(), magick_convert::VERSION);
    println!("{}: {}", style("Converter").bold(), converter.display());

    let version = converter_version(converter)?;
    println!("{}: {}", style("Converter version").bold(), version);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_conversion_args() {
        let cli = Cli::try_parse_from([
            "magick-convert", "in.jpg", "out.jpg", "--width", "800", "--ratio", "16:9",
            "--gravity", "north",
        ])
        .unwrap();

        assert_eq!(cli.source, Some(PathBuf::from("in.jpg")));
        assert_eq!(cli.width, Some(800));
        assert!((cli.ratio.unwrap() - 16.0 / 9.0).abs() < 1e-9);
        assert_eq!(cli.gravity, Some(Gravity::North));
    }

    #[test]
    fn test_ratio_and_crop_conflict() {
        let result = Cli::try_parse_from([
            "magick-convert", "in.jpg", "out.jpg", "--ratio", "1", "--crop", "10x10+0+0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_request_precedence() {
        let cli = Cli::try_parse_from([
            "magick-convert", "in.jpg", "out.jpg", "--profile", "web", "--width", "640",
            "--converter", "/opt/magick",
        ])
        .unwrap();

        let request = build_request(&cli, &Config::default(), Path::new("in.jpg")).unwrap();
        assert_eq!(request.get_width(), Some(640));
        assert_eq!(request.get_quality(), 85);
        assert_eq!(request.get_converter_path(), Some(Path::new("/opt/magick")));
    }

    #[test]
    fn test_gravity_without_ratio_rejected() {
        let cli = Cli::try_parse_from([
            "magick-convert", "in.jpg", "out.jpg", "--profile", "web", "--gravity", "north",
        ])
        .unwrap();

        let err = build_request(&cli, &Config::default(), Path::new("in.jpg")).unwrap_err();
        assert!(err.to_string().contains("--gravity"));
    }

    #[test]
    fn test_config_path_per_action() {
        let cli = Cli::try_parse_from(["magick-convert", "info", "--config", "im.toml"]).unwrap();
        assert_eq!(config_path(&cli), Some(Path::new("im.toml")));

        let cli = Cli::try_parse_from(["magick-convert", "config", "other.toml"]).unwrap();
        assert_eq!(config_path(&cli), None);
    }
}
