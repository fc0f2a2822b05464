// Text layout for the PDF exporter: font metrics, greedy word-wrap and pagination.
// Pure CPU work; callers on the async runtime run it inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod paginator;
pub mod truetype;

pub use font_metrics::{a4_page_config, FontFace, FontSet, PageConfig, StandardFonts, TextMetrics};
pub use paginator::{paginate, Block, LineStyle, Page, PlacedLine};
pub use truetype::{EmbeddedFont, FontError, Glyph};
