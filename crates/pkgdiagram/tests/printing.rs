//! Pagination and page printing

use pkgdiagram::graph::{ClassRole, Package, Target};
use pkgdiagram::print::{
    printable_area, ClassDiagramPrinter, PageFormat, PageLayout, PageStatus, Printable, PrintState,
};
use pkgdiagram::{DiagramConfig, Point, RecordingSurface, Size};
use proptest::prelude::*;

fn spread_package(count: i32, step: i32) -> Package {
    let mut pkg = Package::new("grid", "Printing");
    for i in 0..count {
        let name = format!("C{i}");
        pkg.add_target(Target::class(&name, ClassRole::Standard, Point::new(i * step, i * step / 2)))
            .unwrap();
    }
    pkg
}

#[test]
fn test_example_layout() {
    let layout = PageLayout::calculate(Size::new(1000, 650), Size::new(400, 300));
    assert_eq!(layout.columns, 3);
    assert_eq!(layout.rows, 3);
    assert_eq!(layout.total_pages(), 9);
}

#[test]
fn test_printer_pages_follow_print_scale() {
    let pkg = spread_package(6, 300);
    let format = PageFormat::a4();
    let area = printable_area(&format, &DiagramConfig::default());

    let full = DiagramConfig::default().with_print_scale(1.0);
    let half = DiagramConfig::default();

    let mut at_full = ClassDiagramPrinter::new(&pkg, &full);
    let mut at_half = ClassDiagramPrinter::new(&pkg, &half);
    let full_layout = at_full.calculate_pages(&format);
    let half_layout = at_half.calculate_pages(&format);

    let size = pkg.minimum_size();
    assert_eq!(
        full_layout.columns as i32,
        (size.width + area.width - 1) / area.width
    );
    assert!(half_layout.total_pages() < full_layout.total_pages());
}

#[test]
fn test_every_page_prints_then_stops() {
    let pkg = spread_package(5, 400);
    let config = DiagramConfig::default();
    let format = PageFormat::letter();
    let mut printer = ClassDiagramPrinter::new(&pkg, &config);
    let total = printer.calculate_pages(&format).total_pages();
    assert!(total > 1);

    let mut footers = Vec::new();
    for index in 0..total {
        let mut surface = RecordingSurface::new();
        assert_eq!(printer.print(&mut surface, &format, index), PageStatus::Exists);
        assert_eq!(printer.state(), PrintState::Printing(index));
        footers.extend(
            surface
                .texts()
                .filter(|t| t.starts_with("Page "))
                .map(str::to_string),
        );
    }
    let expected: Vec<_> = (1..=total).map(|n| format!("Page {n}")).collect();
    assert_eq!(footers, expected);

    let mut surface = RecordingSurface::new();
    assert_eq!(printer.print(&mut surface, &format, total), PageStatus::NoSuchPage);
    assert!(surface.is_empty());
    assert_eq!(printer.state(), PrintState::Done);
}

proptest! {
    #[test]
    fn prop_pages_cover_diagram(
        width in 1i32..20_000,
        height in 1i32..20_000,
        pw in 1i32..2_000,
        ph in 1i32..2_000,
    ) {
        let layout = PageLayout::calculate(Size::new(width, height), Size::new(pw, ph));
        let columns = layout.columns as i32;
        let rows = layout.rows as i32;
        prop_assert_eq!(columns, (width + pw - 1) / pw);
        prop_assert_eq!(rows, (height + ph - 1) / ph);
        prop_assert!(columns * pw >= width && (columns - 1) * pw < width);
        prop_assert!(rows * ph >= height && (rows - 1) * ph < height);
        prop_assert_eq!(layout.total_pages(), layout.columns * layout.rows);
    }

    #[test]
    fn prop_pages_past_the_end_never_render(extra in 0usize..50, count in 1i32..6) {
        let pkg = spread_package(count, 350);
        let config = DiagramConfig::default();
        let format = PageFormat::a4();
        let mut printer = ClassDiagramPrinter::new(&pkg, &config);
        let total = printer.calculate_pages(&format).total_pages();

        let mut surface = RecordingSurface::new();
        prop_assert_eq!(
            printer.print(&mut surface, &format, total + extra),
            PageStatus::NoSuchPage
        );
        prop_assert!(surface.is_empty());
    }
}
