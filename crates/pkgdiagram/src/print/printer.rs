//! Printing a package diagram across pages
//!
//! [`ClassDiagramPrinter`] cuts the scaled diagram into page cells and
//! draws one cell per call. A [`PrintDevice`] drives it page by page until
//! it reports that no page is left.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use chrono::Local;
use tracing::{debug, error, info, span, trace, Level};

use super::page::{printable_area, PageFormat, PageLayout};
use crate::core::{
    Color, DiagramConfig, DiagramError, DiagramResult, Size, Stroke, Surface, SvgSurface, TextAlign,
};
use crate::graph::Package;

/// Status line shown once a background print job finishes
pub const PRINT_DONE_STATUS: &str = "Printing done";

const TITLE_FONT_SIZE: f64 = 12.0;
const FOOTER_FONT_SIZE: f64 = 8.0;

/// Where a print job is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintState {
    NotStarted,
    Paginating,
    Printing(usize),
    Done,
}

/// Answer to a request for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Exists,
    NoSuchPage,
}

/// Something that can draw itself page by page
pub trait Printable {
    /// Draw page `page_index` onto `surface`, or report it does not exist
    fn print(&mut self, surface: &mut dyn Surface, format: &PageFormat, page_index: usize) -> PageStatus;
}

/// Prints one package diagram
pub struct ClassDiagramPrinter<'a> {
    package: &'a Package,
    config: &'a DiagramConfig,
    state: PrintState,
    /// Page grid and the format it was computed for
    layout: Option<(PageFormat, PageLayout)>,
    timestamp: String,
}

impl<'a> ClassDiagramPrinter<'a> {
    pub fn new(package: &'a Package, config: &'a DiagramConfig) -> Self {
        Self {
            package,
            config,
            state: PrintState::NotStarted,
            layout: None,
            timestamp: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        }
    }

    pub fn state(&self) -> PrintState {
        self.state
    }

    pub fn layout(&self) -> Option<PageLayout> {
        self.layout.map(|(_, layout)| layout)
    }

    /// Diagram size after applying the print scale
    pub fn scaled_diagram_size(&self) -> Size {
        let size = self.package.minimum_size();
        let scale = self.config.print_scale;
        Size::new(
            (size.width as f64 * scale).ceil() as i32,
            (size.height as f64 * scale).ceil() as i32,
        )
    }

    /// Work out the page grid for `format`
    pub fn calculate_pages(&mut self, format: &PageFormat) -> PageLayout {
        self.state = PrintState::Paginating;
        let area = printable_area(format, self.config);
        let layout = PageLayout::calculate(self.scaled_diagram_size(), area.size());
        debug!(
            columns = layout.columns,
            rows = layout.rows,
            pages = layout.total_pages(),
            "Pages calculated"
        );
        self.layout = Some((*format, layout));
        layout
    }

    fn paint_title(&self, surface: &mut dyn Surface, format: &PageFormat) {
        let area = printable_area(format, self.config);
        let x = area.x as f64;
        let y = (area.y - self.config.print_title_height) as f64;
        let width = area.width as f64;
        let height = (self.config.print_title_height - 4) as f64;

        surface.set_color(Color::TEXT_BACKGROUND);
        surface.fill_rect(x, y, width, height);
        surface.set_color(Color::BORDER);
        surface.set_stroke(Stroke::solid(1.0));
        surface.draw_rect(x, y, width, height);

        let baseline = y + height - 5.0;
        surface.draw_text(x + 6.0, baseline, self.package.project_name(), TITLE_FONT_SIZE, TextAlign::Start);
        if !self.package.is_unnamed() {
            let qualifier = format!("package {}", self.package.qualified_name());
            surface.draw_text(x + width - 6.0, baseline, &qualifier, TITLE_FONT_SIZE, TextAlign::End);
        }
    }

    fn paint_footer(&self, surface: &mut dyn Surface, format: &PageFormat, page_index: usize) {
        let area = printable_area(format, self.config);
        let baseline = (area.bottom() + self.config.print_footer_height - 3) as f64;
        surface.set_color(Color::BLACK);
        surface.draw_text(area.x as f64, baseline, &self.timestamp, FOOTER_FONT_SIZE, TextAlign::Start);
        surface.draw_text(
            area.right() as f64,
            baseline,
            &format!("Page {}", page_index + 1),
            FOOTER_FONT_SIZE,
            TextAlign::End,
        );
    }
}

impl Printable for ClassDiagramPrinter<'_> {
    fn print(&mut self, surface: &mut dyn Surface, format: &PageFormat, page_index: usize) -> PageStatus {
        // a different format than the cached grid was built for means repaginating
        let layout = match self.layout {
            Some((cached, layout)) if cached == *format => layout,
            _ => self.calculate_pages(format),
        };
        let Some(cell) = layout.cell(page_index) else {
            self.state = PrintState::Done;
            trace!(page_index, "No such page");
            return PageStatus::NoSuchPage;
        };
        self.state = PrintState::Printing(page_index);
        trace!(page_index, cell = %cell, "Printing page");

        let area = printable_area(format, self.config);
        let scale = self.config.print_scale;

        surface.save();
        self.paint_title(surface, format);

        surface.save();
        surface.translate((area.x - cell.x) as f64, (area.y - cell.y) as f64);
        surface.clip_rect(cell.x as f64, cell.y as f64, cell.width as f64, cell.height as f64);
        surface.scale(scale, scale);
        self.package.paint(surface, self.config);
        surface.restore();

        self.paint_footer(surface, format, page_index);
        surface.restore();
        PageStatus::Exists
    }
}

/// Sink for print jobs
pub trait PrintDevice {
    /// Print every page of `job`, asking for pages from 0 until one does
    /// not exist. Returns the number of pages printed.
    fn submit(&mut self, job: &mut dyn Printable, format: &PageFormat) -> DiagramResult<usize>;
}

/// Device writing each page to its own SVG file
#[derive(Debug, Clone)]
pub struct SvgPageDevice {
    out_dir: PathBuf,
    file_prefix: String,
    written: Vec<PathBuf>,
}

impl SvgPageDevice {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            file_prefix: "page".to_string(),
            written: Vec::new(),
        }
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Files written by the last job
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl PrintDevice for SvgPageDevice {
    fn submit(&mut self, job: &mut dyn Printable, format: &PageFormat) -> DiagramResult<usize> {
        fs::create_dir_all(&self.out_dir)?;
        self.written.clear();
        for index in 0.. {
            let mut surface = SvgSurface::new(format.paper_width, format.paper_height);
            if job.print(&mut surface, format, index) == PageStatus::NoSuchPage {
                break;
            }
            let path = self
                .out_dir
                .join(format!("{}-{}.svg", self.file_prefix, index + 1));
            fs::write(&path, surface.finish())?;
            debug!(path = %path.display(), "Page written");
            self.written.push(path);
        }
        Ok(self.written.len())
    }
}

/// Print `package` on `device` and wait for it to finish
pub fn print_package(
    package: &Package,
    config: &DiagramConfig,
    device: &mut dyn PrintDevice,
    format: &PageFormat,
) -> DiagramResult<usize> {
    let print_span = span!(Level::INFO, "print_package", package = %package.qualified_name());
    let _enter = print_span.enter();

    let mut printer = ClassDiagramPrinter::new(package, config);
    let layout = printer.calculate_pages(format);
    if layout.total_pages() == 0 {
        return Err(DiagramError::print("diagram is empty, nothing to print"));
    }
    let pages = device.submit(&mut printer, format)?;
    info!(pages, "Print job finished");
    Ok(pages)
}

/// Print on a background thread
///
/// The job works on a snapshot of the package taken when the thread starts.
/// Failures are logged and go no further; the handle yields the outcome for
/// callers that choose to wait. On success the package status becomes
/// [`PRINT_DONE_STATUS`].
pub fn print_in_background<D>(
    package: Arc<Mutex<Package>>,
    config: DiagramConfig,
    mut device: D,
    format: PageFormat,
) -> DiagramResult<JoinHandle<DiagramResult<usize>>>
where
    D: PrintDevice + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("print-job".to_string())
        .spawn(move || {
            let result = snapshot(&package)
                .and_then(|snapshot| print_package(&snapshot, &config, &mut device, &format));
            match &result {
                Ok(_) => match package.lock() {
                    Ok(mut pkg) => pkg.set_status(PRINT_DONE_STATUS),
                    Err(_) => error!("Package lock poisoned, status not updated"),
                },
                Err(e) => error!(error = %e, "Print job failed"),
            }
            result
        })?;
    Ok(handle)
}

fn snapshot(package: &Mutex<Package>) -> DiagramResult<Package> {
    package
        .lock()
        .map(|pkg| pkg.clone())
        .map_err(|_| DiagramError::print("package lock poisoned"))
}
