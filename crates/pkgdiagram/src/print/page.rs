//! Page geometry for printing
//!
//! All print measurements are in points (1/72 inch), which is also the unit
//! the diagram is drawn in before scaling.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::{DiagramConfig, DiagramError, Rect, Size};

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Paper {
    #[default]
    A4,
    Letter,
}

impl Paper {
    pub fn format(&self) -> PageFormat {
        match self {
            Paper::A4 => PageFormat::a4(),
            Paper::Letter => PageFormat::letter(),
        }
    }
}

impl FromStr for Paper {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(Paper::A4),
            "letter" => Ok(Paper::Letter),
            other => Err(DiagramError::print(format!(
                "Unknown paper size '{other}'. Valid options: a4, letter"
            ))),
        }
    }
}

impl fmt::Display for Paper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paper::A4 => write!(f, "a4"),
            Paper::Letter => write!(f, "letter"),
        }
    }
}

/// A sheet and the part of it the device can mark
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageFormat {
    pub paper_width: f64,
    pub paper_height: f64,
    pub imageable_x: f64,
    pub imageable_y: f64,
    pub imageable_width: f64,
    pub imageable_height: f64,
}

impl PageFormat {
    /// Paper of the given size with the same margin on every side
    pub fn with_margin(paper_width: f64, paper_height: f64, margin: f64) -> Self {
        Self {
            paper_width,
            paper_height,
            imageable_x: margin,
            imageable_y: margin,
            imageable_width: (paper_width - 2.0 * margin).max(0.0),
            imageable_height: (paper_height - 2.0 * margin).max(0.0),
        }
    }

    /// ISO A4 portrait with one-inch margins
    pub fn a4() -> Self {
        Self::with_margin(595.0, 842.0, 72.0)
    }

    /// US Letter portrait with one-inch margins
    pub fn letter() -> Self {
        Self::with_margin(612.0, 792.0, 72.0)
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::a4()
    }
}

/// Area of a page left for the diagram
///
/// The imageable area minus the side margins, the top and bottom margins,
/// the title bar above the diagram and the footer below it.
pub fn printable_area(format: &PageFormat, config: &DiagramConfig) -> Rect {
    let x = format.imageable_x as i32 + config.print_margin_h;
    let y = format.imageable_y as i32 + config.print_margin_v + config.print_title_height;
    let width = format.imageable_width as i32 - 2 * config.print_margin_h;
    let height = format.imageable_height as i32
        - 2 * config.print_margin_v
        - config.print_title_height
        - config.print_footer_height;
    Rect::new(x, y, width.max(0), height.max(0))
}

/// Grid of pages a diagram is cut into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLayout {
    pub columns: usize,
    pub rows: usize,
    /// Size of one page cell, in diagram units after scaling
    pub page_width: i32,
    pub page_height: i32,
}

impl PageLayout {
    /// Cut `diagram` into cells of `printable` size
    ///
    /// Partial cells count as whole pages. An empty diagram needs no pages;
    /// a non-empty one needs at least one even when the printable area is
    /// degenerate.
    pub fn calculate(diagram: Size, printable: Size) -> Self {
        if diagram.is_empty() {
            return Self {
                columns: 0,
                rows: 0,
                page_width: printable.width,
                page_height: printable.height,
            };
        }
        Self {
            columns: pages_along(diagram.width, printable.width),
            rows: pages_along(diagram.height, printable.height),
            page_width: printable.width,
            page_height: printable.height,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.columns * self.rows
    }

    /// (column, row) of a page, `None` past the last page
    pub fn page_origin(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.total_pages() {
            return None;
        }
        Some((index % self.columns, index / self.columns))
    }

    /// Part of the scaled diagram shown on a page
    pub fn cell(&self, index: usize) -> Option<Rect> {
        let (col, row) = self.page_origin(index)?;
        Some(Rect::new(
            col as i32 * self.page_width,
            row as i32 * self.page_height,
            self.page_width,
            self.page_height,
        ))
    }
}

impl fmt::Display for PageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} column(s) x {} row(s) = {} page(s)",
            self.columns,
            self.rows,
            self.total_pages()
        )
    }
}

/// Ceiling division, at least one page
fn pages_along(length: i32, page: i32) -> usize {
    if page <= 0 {
        return 1;
    }
    (((length + page - 1) / page).max(1)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_fit_is_one_page() {
        let layout = PageLayout::calculate(Size::new(400, 600), Size::new(400, 600));
        assert_eq!(layout.total_pages(), 1);
    }

    #[test]
    fn test_partial_page_rounds_up() {
        let layout = PageLayout::calculate(Size::new(401, 600), Size::new(400, 600));
        assert_eq!((layout.columns, layout.rows), (2, 1));
        let layout = PageLayout::calculate(Size::new(1000, 1300), Size::new(400, 600));
        assert_eq!((layout.columns, layout.rows), (3, 3));
        assert_eq!(layout.total_pages(), 9);
    }

    #[test]
    fn test_empty_diagram_has_no_pages() {
        let layout = PageLayout::calculate(Size::new(0, 0), Size::new(400, 600));
        assert_eq!(layout.total_pages(), 0);
        assert_eq!(layout.page_origin(0), None);
    }

    #[test]
    fn test_degenerate_printable_area() {
        let layout = PageLayout::calculate(Size::new(100, 100), Size::new(0, -5));
        assert_eq!(layout.total_pages(), 1);
    }

    #[test]
    fn test_page_origin_walks_rows() {
        let layout = PageLayout::calculate(Size::new(1000, 1000), Size::new(400, 600));
        assert_eq!(layout.columns, 3);
        assert_eq!(layout.page_origin(0), Some((0, 0)));
        assert_eq!(layout.page_origin(2), Some((2, 0)));
        assert_eq!(layout.page_origin(3), Some((0, 1)));
        assert_eq!(layout.page_origin(6), None);
        assert_eq!(layout.cell(4), Some(Rect::new(400, 600, 400, 600)));
    }

    #[test]
    fn test_printable_area_subtracts_margins() {
        let config = DiagramConfig::default();
        let area = printable_area(&PageFormat::a4(), &config);
        assert_eq!(area.x, 72 + 16);
        assert_eq!(area.y, 72 + 16 + 22);
        assert_eq!(area.width, 451 - 32);
        assert_eq!(area.height, 698 - 32 - 22 - 14);
    }

    #[test]
    fn test_paper_parse() {
        assert_eq!("A4".parse::<Paper>().unwrap(), Paper::A4);
        assert_eq!("letter".parse::<Paper>().unwrap().format(), PageFormat::letter());
        assert!("tabloid".parse::<Paper>().is_err());
    }
}
