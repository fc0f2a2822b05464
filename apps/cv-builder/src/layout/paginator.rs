//! Vertical pagination of styled text blocks onto fixed-size pages.
//!
//! Blocks are word-wrapped with the metrics of the active `FontSet`, then placed
//! top-down: every line consumes its leading from a vertical cursor, and a line that
//! would cross the bottom margin starts a new page. Styles marked `keeps_with_next` (section headings
//! and item titles) are never the last line of a page: if the block plus the first
//! line of what follows does not fit, the whole chain moves to the next page.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::{FontFace, FontSet, PageConfig, TextMetrics};

/// Continuation lines of a bullet start this far right of the bullet glyph.
const BULLET_HANG_PT: i64 = 10;
const BULLET_PREFIX: &str = "\u{2022} ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Title,
    Subtitle,
    Heading,
    ItemTitle,
    Meta,
    Body,
    Bullet,
}

impl LineStyle {
    pub fn face(&self) -> FontFace {
        match self {
            LineStyle::Title | LineStyle::Heading | LineStyle::ItemTitle => FontFace::Bold,
            _ => FontFace::Regular,
        }
    }

    pub fn font_size(&self) -> i64 {
        match self {
            LineStyle::Title => 20,
            LineStyle::Heading => 13,
            LineStyle::Subtitle | LineStyle::ItemTitle => 11,
            LineStyle::Body | LineStyle::Bullet => 10,
            LineStyle::Meta => 9,
        }
    }

    /// Vertical advance per line.
    pub fn leading(&self) -> i64 {
        match self {
            LineStyle::Title => 26,
            LineStyle::Heading => 18,
            LineStyle::Subtitle | LineStyle::ItemTitle => 15,
            LineStyle::Body | LineStyle::Bullet => 14,
            LineStyle::Meta => 13,
        }
    }

    /// Extra space above the first line of a block, dropped at the top of a page.
    pub fn space_before(&self) -> i64 {
        match self {
            LineStyle::Heading => 14,
            LineStyle::ItemTitle => 8,
            LineStyle::Subtitle | LineStyle::Body => 2,
            _ => 0,
        }
    }

    pub fn indent(&self) -> i64 {
        match self {
            LineStyle::Bullet => 10,
            _ => 0,
        }
    }

    pub fn keeps_with_next(&self) -> bool {
        matches!(self, LineStyle::Heading | LineStyle::ItemTitle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub style: LineStyle,
    pub text: String,
}

impl Block {
    pub fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// One line of text at its final position. `y` is the baseline, PDF coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedLine {
    pub style: LineStyle,
    pub text: String,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

// ────────────────────────────────────────────────────────────────────────────
// Wrapping
// ────────────────────────────────────────────────────────────────────────────

struct WrappedBlock {
    style: LineStyle,
    /// (text, x offset from the left margin)
    lines: Vec<(String, i64)>,
}

impl WrappedBlock {
    fn height(&self, with_space_before: bool) -> i64 {
        let space = if with_space_before {
            self.style.space_before()
        } else {
            0
        };
        space + self.style.leading() * self.lines.len() as i64
    }

    fn first_line_height(&self) -> i64 {
        self.style.space_before() + self.style.leading()
    }
}

fn wrap_block(block: &Block, config: &PageConfig, fonts: &dyn FontSet) -> WrappedBlock {
    let style = block.style;
    let metrics = fonts.metrics(style.face());
    let size = style.font_size() as f32;
    let indent = style.indent();
    let mut lines = Vec::new();

    for paragraph in block.text.split('\n') {
        if style == LineStyle::Bullet {
            let width = (config.text_width_pt() - indent - BULLET_HANG_PT) as f32;
            for (n, line) in metrics.wrap(paragraph, size, width).into_iter().enumerate() {
                if n == 0 {
                    lines.push((format!("{BULLET_PREFIX}{line}"), indent));
                } else {
                    lines.push((line, indent + BULLET_HANG_PT));
                }
            }
        } else {
            let width = (config.text_width_pt() - indent) as f32;
            lines.extend(
                metrics
                    .wrap(paragraph, size, width)
                    .into_iter()
                    .map(|line| (line, indent)),
            );
        }
    }

    WrappedBlock { style, lines }
}

/// Height needed so that a keep-with-next block is not stranded: the block itself,
/// every following keep-with-next block, and the first line of the block after them.
fn chain_height(chain: &[WrappedBlock], at_page_top: bool) -> i64 {
    let mut needed = 0;
    for (n, block) in chain.iter().enumerate() {
        let with_space = n > 0 || !at_page_top;
        if block.style.keeps_with_next() {
            needed += block.height(with_space);
        } else {
            needed += block.first_line_height();
            break;
        }
    }
    needed
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor
// ────────────────────────────────────────────────────────────────────────────

struct Cursor<'a> {
    config: &'a PageConfig,
    pages: Vec<Page>,
    current: Page,
    y: i64,
}

impl<'a> Cursor<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            current: Page::default(),
            y: config.top_pt(),
        }
    }

    fn at_page_top(&self) -> bool {
        self.current.lines.is_empty()
    }

    fn remaining(&self) -> i64 {
        self.y - self.config.margin_bottom_pt
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.config.top_pt();
    }

    fn place(&mut self, style: LineStyle, text: &str, x_offset: i64, first_of_block: bool) {
        let space = |at_top: bool| {
            if first_of_block && !at_top {
                style.space_before()
            } else {
                0
            }
        };
        if !self.at_page_top() && space(false) + style.leading() > self.remaining() {
            self.new_page();
        }
        let space = space(self.at_page_top());
        let baseline = self.y - space - style.font_size();
        self.current.lines.push(PlacedLine {
            style,
            text: text.to_string(),
            x: self.config.margin_left_pt + x_offset,
            y: baseline,
        });
        self.y -= space + style.leading();
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Lays `blocks` out onto pages, measuring text with `fonts`. Always returns at
/// least one (possibly empty) page.
pub fn paginate(blocks: &[Block], config: &PageConfig, fonts: &dyn FontSet) -> Vec<Page> {
    let wrapped: Vec<WrappedBlock> = blocks
        .iter()
        .map(|b| wrap_block(b, config, fonts))
        .filter(|b| !b.lines.is_empty())
        .collect();

    let mut cursor = Cursor::new(config);
    for (i, block) in wrapped.iter().enumerate() {
        if block.style.keeps_with_next() && !cursor.at_page_top() {
            let needed = chain_height(&wrapped[i..], false);
            if needed > cursor.remaining() {
                cursor.new_page();
            }
        }
        for (n, (text, x)) in block.lines.iter().enumerate() {
            cursor.place(block.style, text, *x, n == 0);
        }
    }
    cursor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{a4_page_config, get_metrics, StandardFonts};
    use proptest::prelude::*;

    fn body(n: usize) -> Block {
        Block::new(LineStyle::Body, format!("Paragraph number {n} of the filler text."))
    }

    #[test]
    fn test_empty_input_yields_one_empty_page() {
        let pages = paginate(&[], &a4_page_config(), &StandardFonts);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.is_empty());
    }

    #[test]
    fn test_first_line_sits_below_top_margin() {
        let config = a4_page_config();
        let pages = paginate(&[Block::new(LineStyle::Title, "Kim Cheolsu")], &config, &StandardFonts);
        let line = &pages[0].lines[0];
        assert_eq!(line.x, config.margin_left_pt);
        assert_eq!(line.y, config.top_pt() - LineStyle::Title.font_size());
    }

    #[test]
    fn test_space_before_applies_between_blocks() {
        let config = a4_page_config();
        let blocks = vec![
            Block::new(LineStyle::Title, "Name"),
            Block::new(LineStyle::Heading, "Professional Experience"),
        ];
        let lines = &paginate(&blocks, &config, &StandardFonts)[0].lines;
        let expected = config.top_pt()
            - LineStyle::Title.leading()
            - LineStyle::Heading.space_before()
            - LineStyle::Heading.font_size();
        assert_eq!(lines[1].y, expected);
    }

    #[test]
    fn test_overflow_starts_new_page() {
        let config = a4_page_config();
        let blocks: Vec<Block> = (0..120).map(body).collect();
        let pages = paginate(&blocks, &config, &StandardFonts);
        assert!(pages.len() >= 2);
        let total: usize = pages.iter().map(|p| p.lines.len()).sum();
        assert_eq!(total, 120);
        // New pages restart at the top without the block's space_before.
        assert_eq!(pages[1].lines[0].y, config.top_pt() - LineStyle::Body.font_size());
    }

    #[test]
    fn test_heading_moves_to_next_page_with_its_content() {
        let config = a4_page_config();
        // Fill the first page so a heading still fits but the line after it does not.
        let available = config.top_pt() - config.margin_bottom_pt;
        let heading = LineStyle::Heading.space_before() + LineStyle::Heading.leading();
        let fillers = (available - heading - 8) / LineStyle::Meta.leading();
        let mut blocks: Vec<Block> = (0..fillers)
            .map(|n| Block::new(LineStyle::Meta, format!("Filler line {n}")))
            .collect();
        blocks.push(Block::new(LineStyle::Heading, "Education"));
        blocks.push(Block::new(LineStyle::Body, "Seoul National University"));

        let pages = paginate(&blocks, &config, &StandardFonts);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines.last().unwrap().style, LineStyle::Meta);
        assert_eq!(pages[1].lines[0].text, "Education");
        assert_eq!(pages[1].lines[1].text, "Seoul National University");
    }

    #[test]
    fn test_bullet_prefix_and_hanging_indent() {
        let config = a4_page_config();
        let long = "Led the migration of a monolithic billing system to event-driven services \
                    across four teams and two data centers while keeping every invoice run on schedule";
        let pages = paginate(&[Block::new(LineStyle::Bullet, long)], &config, &StandardFonts);
        let lines = &pages[0].lines;
        assert!(lines.len() >= 2);
        assert!(lines[0].text.starts_with(BULLET_PREFIX));
        assert_eq!(lines[0].x, config.margin_left_pt + LineStyle::Bullet.indent());
        assert_eq!(
            lines[1].x,
            config.margin_left_pt + LineStyle::Bullet.indent() + BULLET_HANG_PT
        );
    }

    #[test]
    fn test_newlines_split_paragraphs() {
        let pages = paginate(
            &[Block::new(LineStyle::Body, "first\nsecond\n\nthird")],
            &a4_page_config(),
            &StandardFonts,
        );
        let texts: Vec<&str> = pages[0].lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    fn arb_item() -> impl Strategy<Value = Vec<Block>> {
        (
            "[A-Z][a-z]{2,10}( [a-z]{2,10}){0,3}",
            "[0-9]{4}\\.[0-9]{2} - [0-9]{4}\\.[0-9]{2}",
            prop::collection::vec("[a-z]{1,12}( [a-z]{1,12}){0,40}", 0..4),
        )
            .prop_map(|(title, meta, bullets)| {
                let mut blocks = vec![
                    Block::new(LineStyle::ItemTitle, title),
                    Block::new(LineStyle::Meta, meta),
                ];
                blocks.extend(bullets.into_iter().map(|b| Block::new(LineStyle::Bullet, b)));
                blocks
            })
    }

    fn arb_document() -> impl Strategy<Value = Vec<Block>> {
        let section = (
            "[A-Z][a-z]{2,10}( [A-Z][a-z]{2,10}){0,2}",
            prop::collection::vec(arb_item(), 0..4),
        )
            .prop_map(|(heading, items)| {
                let mut blocks = vec![Block::new(LineStyle::Heading, heading)];
                blocks.extend(items.into_iter().flatten());
                blocks
            });
        prop::collection::vec(section, 1..12)
            .prop_map(|sections| sections.into_iter().flatten().collect())
    }

    proptest! {
        #[test]
        fn prop_no_page_ends_with_heading(blocks in arb_document()) {
            let pages = paginate(&blocks, &a4_page_config(), &StandardFonts);
            for page in &pages[..pages.len() - 1] {
                let last = page.lines.last().expect("non-final pages are never empty");
                prop_assert!(!last.style.keeps_with_next(), "page ends with {:?}", last);
            }
        }

        #[test]
        fn prop_lines_stay_inside_margins(blocks in arb_document()) {
            let config = a4_page_config();
            for page in paginate(&blocks, &config, &StandardFonts) {
                for line in &page.lines {
                    prop_assert!(line.y >= config.margin_bottom_pt);
                    prop_assert!(line.y <= config.top_pt());
                    let width = get_metrics(line.style.face())
                        .width_pt(&line.text, line.style.font_size() as f32);
                    prop_assert!(line.x as f32 + width <= (config.width_pt - config.margin_right_pt) as f32 + 0.5);
                }
            }
        }
    }
}
