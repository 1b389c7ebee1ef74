//! Command-line interface for the pkgdiagram utility
//!
//! Inspects package files, renders them to SVG, and prints them across
//! pages.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use pkgdiagram::core::logging::init_logging;
use pkgdiagram::graph::Package;
use pkgdiagram::print::{print_in_background, ClassDiagramPrinter, Paper, SvgPageDevice};
use pkgdiagram::{render_svg, DiagramConfig, DisplayMode, Point};

/// pkgdiagram - Inspect, render and print package diagrams
#[derive(Parser)]
#[command(name = "pkgdiagram")]
#[command(about = "Inspect, render and print package diagram files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Arrow drawing style; defaults to PKGDIAGRAM_DISPLAY_MODE, then normal
    #[arg(long, value_enum, global = true)]
    pub mode: Option<ModeChoice>,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Arrow drawing styles
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ModeChoice {
    /// Thick solid inheritance arrows
    #[default]
    Normal,
    /// UML-style dashed arrows with longer heads
    Formal,
}

impl From<ModeChoice> for DisplayMode {
    fn from(value: ModeChoice) -> Self {
        match value {
            ModeChoice::Normal => DisplayMode::Normal,
            ModeChoice::Formal => DisplayMode::Formal,
        }
    }
}

/// Paper sizes for printing
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum PaperChoice {
    #[default]
    A4,
    Letter,
}

impl From<PaperChoice> for Paper {
    fn from(value: PaperChoice) -> Self {
        match value {
            PaperChoice::A4 => Paper::A4,
            PaperChoice::Letter => Paper::Letter,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the targets and dependencies of a package file
    Info {
        /// Package file to read
        #[arg(short, long)]
        input: PathBuf,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Render the whole diagram to one SVG document
    Render {
        /// Package file to read
        #[arg(short, long)]
        input: PathBuf,

        /// Output SVG file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the diagram across pages, one SVG file per page
    Print {
        /// Package file to read
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving the page files
        #[arg(long)]
        out_dir: PathBuf,

        /// Scale applied to the diagram on paper
        #[arg(long)]
        scale: Option<f64>,

        /// Paper size
        #[arg(long, value_enum, default_value_t = PaperChoice::A4)]
        paper: PaperChoice,
    },

    /// Report the target or dependency under a point
    Hit {
        /// Package file to read
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, allow_negative_numbers = true)]
        x: i32,

        #[arg(short, long, allow_negative_numbers = true)]
        y: i32,
    },

    /// Show the effective diagram configuration as JSON
    Config,

    /// Show how many pages printing would take
    Pages {
        /// Package file to read
        #[arg(short, long)]
        input: PathBuf,

        /// Scale applied to the diagram on paper
        #[arg(long)]
        scale: Option<f64>,

        /// Paper size
        #[arg(long, value_enum, default_value_t = PaperChoice::A4)]
        paper: PaperChoice,
    },
}

/// Main CLI application
pub struct PkgDiagramApp {
    config: DiagramConfig,
}

impl PkgDiagramApp {
    /// Create a new application instance, reading defaults from the environment
    pub fn new() -> Self {
        Self::with_config(DiagramConfig::from_env())
    }

    pub fn with_config(config: DiagramConfig) -> Self {
        Self { config }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("PKGDIAGRAM_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("PKGDIAGRAM_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("pkgdiagram v{}", env!("CARGO_PKG_VERSION"));
        }

        if let Some(mode) = cli.mode {
            self.config.display_mode = mode.into();
        }

        match cli.command {
            Commands::Info { input, json } => self.info_command(&input, json, cli.verbose),
            Commands::Render { input, output } => {
                self.render_command(&input, output, cli.verbose)
            }
            Commands::Print {
                input,
                out_dir,
                scale,
                paper,
            } => self.print_command(&input, out_dir, scale, paper, cli.verbose),
            Commands::Hit { input, x, y } => self.hit_command(&input, Point::new(x, y)),
            Commands::Pages {
                input,
                scale,
                paper,
            } => self.pages_command(&input, scale, paper),
            Commands::Config => self.config_command(),
        }
    }

    fn config_with_scale(&self, scale: Option<f64>) -> Result<DiagramConfig> {
        match scale {
            Some(s) if s <= 0.0 => Err(anyhow!("Scale must be positive, got {}", s)),
            Some(s) => Ok(self.config.clone().with_print_scale(s)),
            None => Ok(self.config.clone()),
        }
    }

    /// Handle the info command
    fn info_command(&self, input: &Path, json: bool, verbose: bool) -> Result<()> {
        let package = self.load(input)?;
        if verbose {
            eprintln!(
                "Loaded {} target(s) and {} dependency(ies)",
                package.targets().len(),
                package.dependency_count()
            );
        }
        let text = if json {
            info_json(&package)?
        } else {
            info_text(&package)
        };
        self.write_output(None, &text)
    }

    /// Handle the render command
    fn render_command(&self, input: &Path, output: Option<PathBuf>, verbose: bool) -> Result<()> {
        let package = self.load(input)?;
        let svg = render_svg(&package, &self.config);
        if verbose {
            eprintln!("Rendered {} bytes of SVG", svg.len());
        }
        self.write_output(output, &svg)
    }

    /// Handle the print command
    fn print_command(
        &self,
        input: &Path,
        out_dir: PathBuf,
        scale: Option<f64>,
        paper: PaperChoice,
        verbose: bool,
    ) -> Result<()> {
        let config = self.config_with_scale(scale)?;
        let package = Arc::new(Mutex::new(self.load(input)?));
        let format = Paper::from(paper).format();

        let handle = print_in_background(
            Arc::clone(&package),
            config,
            SvgPageDevice::new(&out_dir),
            format,
        )?;
        let pages = handle
            .join()
            .map_err(|_| anyhow!("Print job panicked"))?
            .context("Print job failed")?;

        let status = package
            .lock()
            .map(|p| p.status().to_string())
            .map_err(|_| anyhow!("Package lock poisoned"))?;
        if verbose {
            eprintln!("{status}");
        }
        println!("Wrote {} page(s) to {}", pages, out_dir.display());
        Ok(())
    }

    /// Handle the hit command
    fn hit_command(&self, input: &Path, point: Point) -> Result<()> {
        let package = self.load(input)?;
        let text = hit_text(&package, point, &self.config);
        self.write_output(None, &text)
    }

    /// Handle the pages command
    fn pages_command(&self, input: &Path, scale: Option<f64>, paper: PaperChoice) -> Result<()> {
        let config = self.config_with_scale(scale)?;
        let package = self.load(input)?;
        let mut printer = ClassDiagramPrinter::new(&package, &config);
        let layout = printer.calculate_pages(&Paper::from(paper).format());
        self.write_output(None, &layout.to_string())
    }

    /// Handle the config command
    fn config_command(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.config)?;
        self.write_output(None, &json)
    }

    fn load(&self, input: &Path) -> Result<Package> {
        Package::load_file(input)
            .with_context(|| format!("Failed to read package file '{}'", input.display()))
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for PkgDiagramApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable listing of a package
pub fn info_text(package: &Package) -> String {
    let mut out = String::new();
    let name = if package.is_unnamed() {
        "<unnamed>"
    } else {
        package.qualified_name()
    };
    out.push_str(&format!("Package: {} (project {})\n", name, package.project_name()));
    out.push_str(&format!("Targets ({}):\n", package.targets().len()));
    for target in package.targets().sorted() {
        out.push_str(&format!(
            "  {:<20} {:<16} {}\n",
            target.name(),
            target.kind().type_name(),
            target.bounds()
        ));
    }
    out.push_str(&format!("Dependencies ({}):\n", package.dependency_count()));
    for dep in package.dependencies() {
        out.push_str(&format!("  {}\n", dep));
    }
    out
}

/// JSON listing of a package
pub fn info_json(package: &Package) -> Result<String> {
    let targets: Vec<_> = package
        .targets()
        .sorted()
        .into_iter()
        .map(|t| {
            let b = t.bounds();
            serde_json::json!({
                "name": t.name(),
                "type": t.kind().type_name(),
                "x": b.x,
                "y": b.y,
                "width": b.width,
                "height": b.height,
            })
        })
        .collect();
    let dependencies: Vec<_> = package
        .dependencies()
        .map(|d| {
            serde_json::json!({
                "from": d.from(),
                "to": d.to(),
                "type": d.kind().type_name(),
            })
        })
        .collect();
    let value = serde_json::json!({
        "package": package.qualified_name(),
        "project": package.project_name(),
        "targets": targets,
        "dependencies": dependencies,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// What lies under `point`; targets are on top of arrows
pub fn hit_text(package: &Package, point: Point, config: &DiagramConfig) -> String {
    if let Some(target) = package.target_at(point) {
        return format!("target {}", target.name());
    }
    match package.dependency_at(point, config) {
        Some(dep) => format!("dependency {}", dep),
        None => format!("nothing at {}", point),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pkgdiagram::graph::{ClassRole, Dependency, Target};
    use tempfile::tempdir;

    fn sample() -> Package {
        let mut pkg = Package::new("shapes", "Geometry");
        pkg.add_target(Target::class("Shape", ClassRole::Interface, Point::new(200, 20)))
            .unwrap();
        pkg.add_target(Target::class("Circle", ClassRole::Standard, Point::new(200, 200)))
            .unwrap();
        pkg.add_dependency(Dependency::implements("Circle", "Shape"));
        pkg.recalc_arrows();
        pkg
    }

    #[test]
    fn test_cli_parsing_info_command() {
        let args = vec!["pkgdiagram", "info", "--input", "package.pkgd", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Info { input, json } => {
                assert_eq!(input.to_string_lossy(), "package.pkgd");
                assert!(json);
            }
            _ => panic!("Expected Info command"),
        }
        assert_eq!(cli.mode, None);
    }

    #[test]
    fn test_cli_parsing_print_command() {
        let args = vec![
            "pkgdiagram",
            "--mode",
            "formal",
            "print",
            "-i",
            "package.pkgd",
            "--out-dir",
            "pages",
            "--scale",
            "0.75",
            "--paper",
            "letter",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.mode, Some(ModeChoice::Formal));

        match cli.command {
            Commands::Print {
                out_dir,
                scale,
                paper,
                ..
            } => {
                assert_eq!(out_dir.to_string_lossy(), "pages");
                assert_eq!(scale, Some(0.75));
                assert_eq!(paper, PaperChoice::Letter);
            }
            _ => panic!("Expected Print command"),
        }
    }

    #[test]
    fn test_cli_parsing_hit_command() {
        let args = vec!["pkgdiagram", "hit", "-i", "p.pkgd", "-x", "10", "-y", "-4"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Hit { x, y, .. } => assert_eq!((x, y), (10, -4)),
            _ => panic!("Expected Hit command"),
        }
    }

    #[test]
    fn test_cli_parsing_config_command() {
        let cli = Cli::try_parse_from(vec!["pkgdiagram", "--mode", "formal", "config"]).unwrap();
        assert!(matches!(cli.command, Commands::Config));
        assert_eq!(cli.mode.map(DisplayMode::from), Some(DisplayMode::Formal));
    }

    #[test]
    fn test_run_keeps_configured_mode_without_flag() {
        let formal = DiagramConfig::default().with_display_mode(DisplayMode::Formal);
        let mut app = PkgDiagramApp::with_config(formal);
        app.run(Cli::try_parse_from(vec!["pkgdiagram", "config"]).unwrap())
            .unwrap();
        assert_eq!(app.config.display_mode, DisplayMode::Formal);

        let cli = Cli::try_parse_from(vec!["pkgdiagram", "--mode", "normal", "config"]).unwrap();
        app.run(cli).unwrap();
        assert_eq!(app.config.display_mode, DisplayMode::Normal);
    }

    #[test]
    fn test_config_serializes() {
        let app = PkgDiagramApp::with_config(DiagramConfig::default().with_print_scale(0.25));
        let value = serde_json::to_value(&app.config).unwrap();
        assert_eq!(value["print_scale"], 0.25);
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(vec!["pkgdiagram", "render"]).is_err());
    }

    #[test]
    fn test_verbose_flag() {
        let args = vec!["pkgdiagram", "--verbose", "pages", "-i", "p.pkgd"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert!(cli.verbose);
    }

    #[test]
    fn test_info_text_lists_targets_and_dependencies() {
        let text = info_text(&sample());
        assert!(text.starts_with("Package: shapes (project Geometry)"));
        assert!(text.contains("Targets (3):"));
        assert!(text.contains("InterfaceTarget"));
        assert!(text.contains("Circle implements Shape"));
    }

    #[test]
    fn test_info_json() {
        let json = info_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["package"], "shapes");
        assert_eq!(value["targets"].as_array().unwrap().len(), 3);
        assert_eq!(value["dependencies"][0]["type"], "ImplementsDependency");
    }

    #[test]
    fn test_hit_text() {
        let pkg = sample();
        let config = DiagramConfig::default();
        assert_eq!(hit_text(&pkg, Point::new(210, 210), &config), "target Circle");
        let line = pkg.dependencies().next().unwrap().attachment_points(pkg.targets()).unwrap();
        assert_eq!(
            hit_text(&pkg, line.midpoint(), &config),
            "dependency Circle implements Shape"
        );
        assert!(hit_text(&pkg, Point::new(900, 900), &config).starts_with("nothing"));
    }

    #[test]
    fn test_render_command_writes_svg() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("package.pkgd");
        let output = dir.path().join("diagram.svg");
        sample().save_file(&input).unwrap();

        let app = PkgDiagramApp::with_config(DiagramConfig::default());
        app.render_command(&input, Some(output.clone()), false).unwrap();

        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Circle"));
    }

    #[test]
    fn test_print_command_writes_pages() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("package.pkgd");
        let out_dir = dir.path().join("pages");
        sample().save_file(&input).unwrap();

        let app = PkgDiagramApp::with_config(DiagramConfig::default());
        app.print_command(&input, out_dir.clone(), None, PaperChoice::A4, false)
            .unwrap();
        assert!(out_dir.join("page-1.svg").exists());
    }

    #[test]
    fn test_print_rejects_bad_scale() {
        let app = PkgDiagramApp::with_config(DiagramConfig::default());
        assert!(app.config_with_scale(Some(0.0)).is_err());
        assert_eq!(app.config_with_scale(Some(2.0)).unwrap().print_scale, 2.0);
    }

    #[test]
    fn test_missing_input_file_is_reported() {
        let app = PkgDiagramApp::with_config(DiagramConfig::default());
        let err = app.load(Path::new("/nonexistent/package.pkgd")).unwrap_err();
        assert!(err.to_string().contains("Failed to read package file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = PkgDiagramApp::with_config(DiagramConfig::default());
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("output.txt");

        app.write_output(Some(file_path.clone()), "Test output").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "Test output");
    }
}
