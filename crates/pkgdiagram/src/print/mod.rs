//! Paginated printing

mod page;
mod printer;

pub use page::{printable_area, PageFormat, PageLayout, Paper};
pub use printer::{
    print_in_background, print_package, ClassDiagramPrinter, PageStatus, PrintDevice, PrintState,
    Printable, SvgPageDevice, PRINT_DONE_STATUS,
};
