//! PDF writer: lays the résumé out with `crate::layout` and draws it with lopdf.
//!
//! Without a configured TrueType font, text uses the standard Helvetica faces with
//! WinAnsiEncoding and nothing is embedded. With one, each face is embedded as a
//! CID-keyed Type0 font (Identity-H, glyph ids as codes) with a ToUnicode map so the
//! text stays searchable. Text neither can draw fails the export.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::export::compose::{RenderedResume, SectionBody};
use crate::export::ExportError;
use crate::layout::font_metrics::get_metrics;
use crate::layout::{
    a4_page_config, paginate, Block, EmbeddedFont, FontFace, FontSet, LineStyle, Page,
    PageConfig, TextMetrics,
};

/// Gap between a heading's baseline and the rule drawn under it.
const RULE_OFFSET_PT: i64 = 4;

/// Max entries per `beginbfchar` block.
const BFCHAR_CHUNK: usize = 100;

/// Byte for `c` in WinAnsiEncoding, if it has one.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        ' '..='~' => Some(c as u8),
        '\u{a0}'..='\u{ff}' => Some(c as u32 as u8),
        '\u{20ac}' => Some(0x80),
        '\u{2026}' => Some(0x85),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201c}' => Some(0x93),
        '\u{201d}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        '\u{2122}' => Some(0x99),
        _ => None,
    }
}

/// The fonts a PDF is drawn with.
#[derive(Debug, Clone, Default)]
pub enum PdfFonts {
    /// Helvetica and Helvetica-Bold; Latin-1 text only.
    #[default]
    Standard,
    Embedded {
        regular: Arc<EmbeddedFont>,
        bold: Arc<EmbeddedFont>,
    },
}

impl PdfFonts {
    /// Embeds `regular`, and `bold` for bold text when given (otherwise `regular`).
    pub fn embedded(regular: EmbeddedFont, bold: Option<EmbeddedFont>) -> Self {
        let regular = Arc::new(regular);
        let bold = bold.map(Arc::new).unwrap_or_else(|| regular.clone());
        PdfFonts::Embedded { regular, bold }
    }

    fn embedded_face(&self, face: FontFace) -> Option<&Arc<EmbeddedFont>> {
        match (self, face) {
            (PdfFonts::Standard, _) => None,
            (PdfFonts::Embedded { regular, .. }, FontFace::Regular) => Some(regular),
            (PdfFonts::Embedded { bold, .. }, FontFace::Bold) => Some(bold),
        }
    }

    /// Encodes `text` as a string operand for the font behind `face`.
    fn encode(&self, face: FontFace, text: &str, coverage: &mut Coverage) -> Object {
        match self.embedded_face(face) {
            None => {
                let bytes = text
                    .chars()
                    .filter_map(|c| {
                        let byte = win_ansi_byte(c);
                        if byte.is_none() {
                            coverage.missing.insert(c);
                        }
                        byte
                    })
                    .collect();
                Object::String(bytes, StringFormat::Literal)
            }
            Some(font) => {
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for c in text.chars() {
                    match font.glyph(c) {
                        Some(glyph) => {
                            bytes.extend(glyph.id.to_be_bytes());
                            coverage.used.entry(face).or_default().insert(c);
                        }
                        None => {
                            coverage.missing.insert(c);
                        }
                    }
                }
                Object::String(bytes, StringFormat::Hexadecimal)
            }
        }
    }
}

impl FontSet for PdfFonts {
    fn metrics(&self, face: FontFace) -> &dyn TextMetrics {
        match self.embedded_face(face) {
            Some(font) => font.as_ref(),
            None => get_metrics(face),
        }
    }
}

/// Characters met while encoding page text.
#[derive(Default)]
struct Coverage {
    used: HashMap<FontFace, BTreeSet<char>>,
    missing: BTreeSet<char>,
}

fn parse_hex_color(color: &str) -> (f32, f32, f32) {
    let hex = color.trim_start_matches('#');
    if hex.len() >= 6 {
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0) as f32 / 255.0;
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0) as f32 / 255.0;
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0) as f32 / 255.0;
        (r, g, b)
    } else {
        (0.0, 0.0, 0.0)
    }
}

/// Flattens the résumé into styled blocks in reading order.
pub fn build_blocks(resume: &RenderedResume) -> Vec<Block> {
    let mut blocks = Vec::new();
    let name = if resume.name.is_empty() { "CV" } else { &resume.name };
    blocks.push(Block::new(LineStyle::Title, name));
    if !resume.job_title.is_empty() {
        blocks.push(Block::new(LineStyle::Subtitle, resume.job_title.clone()));
    }
    if !resume.contact.is_empty() {
        let contact: Vec<&str> = resume.contact.iter().map(|(_, v)| v.as_str()).collect();
        blocks.push(Block::new(LineStyle::Meta, contact.join(" | ")));
    }

    for section in &resume.sections {
        blocks.push(Block::new(LineStyle::Heading, section.title));
        match &section.body {
            SectionBody::Text(text) => blocks.push(Block::new(LineStyle::Body, text.clone())),
            SectionBody::Tags(tags) => blocks.push(Block::new(LineStyle::Body, tags.join(", "))),
            SectionBody::List(lines) => {
                blocks.extend(lines.iter().map(|l| Block::new(LineStyle::Bullet, l.clone())))
            }
            SectionBody::Items(items) => {
                for item in items {
                    blocks.push(Block::new(LineStyle::ItemTitle, item.title.clone()));
                    let meta: Vec<&str> = [item.subtitle.as_str(), item.dates.as_str()]
                        .into_iter()
                        .filter(|s| !s.is_empty())
                        .collect();
                    if !meta.is_empty() {
                        blocks.push(Block::new(LineStyle::Meta, meta.join(" | ")));
                    }
                    if !item.description.is_empty() {
                        blocks.push(Block::new(LineStyle::Body, item.description.clone()));
                    }
                    blocks.extend(
                        item.bullets
                            .iter()
                            .map(|b| Block::new(LineStyle::Bullet, b.clone())),
                    );
                    blocks.extend(
                        item.details
                            .iter()
                            .map(|(label, value)| Block::new(LineStyle::Body, format!("{label}: {value}"))),
                    );
                }
            }
        }
    }
    blocks
}

fn text_operations(style: LineStyle, text: Object, x: i64, y: i64) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(style.face().resource_name().as_bytes().to_vec()),
                Object::Integer(style.font_size()),
            ],
        ),
        Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
        Operation::new("Tj", vec![text]),
        Operation::new("ET", vec![]),
    ]
}

fn rgb(op: &str, (r, g, b): (f32, f32, f32)) -> Operation {
    Operation::new(op, vec![Object::Real(r), Object::Real(g), Object::Real(b)])
}

struct PageFrame<'a> {
    number: usize,
    total: usize,
    accent: (f32, f32, f32),
    config: &'a PageConfig,
}

fn page_content(
    page: &Page,
    frame: &PageFrame<'_>,
    fonts: &PdfFonts,
    coverage: &mut Coverage,
) -> Content {
    let config = frame.config;
    let mut operations = Vec::new();
    for line in &page.lines {
        let accented = matches!(line.style, LineStyle::Heading | LineStyle::Title);
        if accented {
            operations.push(rgb("rg", frame.accent));
        }
        let text = fonts.encode(line.style.face(), &line.text, coverage);
        operations.extend(text_operations(line.style, text, line.x, line.y));
        if accented {
            operations.push(rgb("rg", (0.0, 0.0, 0.0)));
        }
        if line.style == LineStyle::Heading {
            let rule_y = line.y - RULE_OFFSET_PT;
            operations.push(rgb("RG", frame.accent));
            operations.push(Operation::new("w", vec![Object::Real(0.75)]));
            operations.push(Operation::new(
                "m",
                vec![Object::Integer(config.margin_left_pt), Object::Integer(rule_y)],
            ));
            operations.push(Operation::new(
                "l",
                vec![
                    Object::Integer(config.width_pt - config.margin_right_pt),
                    Object::Integer(rule_y),
                ],
            ));
            operations.push(Operation::new("S", vec![]));
        }
    }

    if frame.total > 1 {
        let footer = format!("{} / {}", frame.number, frame.total);
        let style = LineStyle::Meta;
        let width = fonts
            .metrics(style.face())
            .width_pt(&footer, style.font_size() as f32)
            .ceil() as i64;
        let x = config.width_pt - config.margin_right_pt - width;
        let y = config.margin_bottom_pt / 2;
        let text = fonts.encode(style.face(), &footer, coverage);
        operations.extend(text_operations(style, text, x, y));
    }

    Content { operations }
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// A PDF text string: UTF-16BE with a byte order mark.
fn text_string(text: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend(unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// ToUnicode CMap mapping each glyph id back to its character.
fn to_unicode_cmap(glyphs: &BTreeMap<u16, char>) -> Vec<u8> {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let entries: Vec<(&u16, &char)> = glyphs.iter().collect();
    for chunk in entries.chunks(BFCHAR_CHUNK) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (id, c) in chunk {
            let mut units = [0u16; 2];
            let hex: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{u:04X}"))
                .collect();
            cmap.push_str(&format!("<{id:04X}> <{hex}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap.into_bytes()
}

/// Adds a Type0 font drawing `chars` from `font`, reusing `font_file` for the program.
fn add_type0_font(
    doc: &mut Document,
    font: &EmbeddedFont,
    chars: &BTreeSet<char>,
    font_file: ObjectId,
) -> ObjectId {
    let glyphs: BTreeMap<u16, (char, u16)> = chars
        .iter()
        .filter_map(|&c| font.glyph(c).map(|g| (g.id, (c, g.advance))))
        .collect();

    let mut widths = Vec::with_capacity(glyphs.len() * 2);
    for (id, (_, advance)) in &glyphs {
        widths.push(Object::Integer(i64::from(*id)));
        widths.push(Object::Array(vec![Object::Integer(
            font.to_glyph_space(i32::from(*advance)),
        )]));
    }

    let [x_min, y_min, x_max, y_max] = font.bbox();
    let descriptor = Dictionary::from_iter(vec![
        ("Type", name("FontDescriptor")),
        ("FontName", name(font.postscript_name())),
        ("Flags", Object::Integer(32)),
        (
            "FontBBox",
            Object::Array(vec![
                Object::Integer(x_min),
                Object::Integer(y_min),
                Object::Integer(x_max),
                Object::Integer(y_max),
            ]),
        ),
        ("ItalicAngle", Object::Integer(0)),
        ("Ascent", Object::Integer(font.ascent())),
        ("Descent", Object::Integer(font.descent())),
        ("CapHeight", Object::Integer(font.cap_height())),
        ("StemV", Object::Integer(80)),
        ("FontFile2", Object::Reference(font_file)),
    ]);
    let descriptor_id = doc.add_object(Object::Dictionary(descriptor));

    let cid_font = Dictionary::from_iter(vec![
        ("Type", name("Font")),
        ("Subtype", name("CIDFontType2")),
        ("BaseFont", name(font.postscript_name())),
        (
            "CIDSystemInfo",
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Registry", Object::string_literal("Adobe")),
                ("Ordering", Object::string_literal("Identity")),
                ("Supplement", Object::Integer(0)),
            ])),
        ),
        ("FontDescriptor", Object::Reference(descriptor_id)),
        ("DW", Object::Integer(1000)),
        ("W", Object::Array(widths)),
        ("CIDToGIDMap", name("Identity")),
    ]);
    let cid_font_id = doc.add_object(Object::Dictionary(cid_font));

    let unicode: BTreeMap<u16, char> = glyphs.iter().map(|(id, (c, _))| (*id, *c)).collect();
    let to_unicode_id = doc.add_object(Stream::new(Dictionary::new(), to_unicode_cmap(&unicode)));

    doc.add_object(Object::Dictionary(Dictionary::from_iter(vec![
        ("Type", name("Font")),
        ("Subtype", name("Type0")),
        ("BaseFont", name(font.postscript_name())),
        ("Encoding", name("Identity-H")),
        (
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        ),
        ("ToUnicode", Object::Reference(to_unicode_id)),
    ])))
}

fn font_resources(doc: &mut Document, fonts: &PdfFonts, coverage: &Coverage) -> Dictionary {
    let mut resources = Dictionary::new();
    let mut font_files: Vec<(Arc<EmbeddedFont>, ObjectId)> = Vec::new();
    for face in FontFace::ALL {
        let font_id = match fonts.embedded_face(face) {
            None => doc.add_object(Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", name("Font")),
                ("Subtype", name("Type1")),
                ("BaseFont", name(face.base_font())),
                ("Encoding", name("WinAnsiEncoding")),
            ]))),
            Some(font) => {
                let Some(chars) = coverage.used.get(&face) else {
                    continue;
                };
                let shared = font_files
                    .iter()
                    .find(|(embedded, _)| Arc::ptr_eq(embedded, font))
                    .map(|(_, id)| *id);
                let font_file = match shared {
                    Some(id) => id,
                    None => {
                        let program = Dictionary::from_iter(vec![(
                            "Length1",
                            Object::Integer(font.data().len() as i64),
                        )]);
                        let id = doc.add_object(Stream::new(program, font.data().to_vec()));
                        font_files.push((font.clone(), id));
                        id
                    }
                };
                add_type0_font(doc, font, chars, font_file)
            }
        };
        resources.set(face.resource_name(), Object::Reference(font_id));
    }
    Dictionary::from_iter(vec![("Font", Object::Dictionary(resources))])
}

/// Builds the in-memory PDF document; `render` serializes it.
pub fn build_document(resume: &RenderedResume, fonts: &PdfFonts) -> Result<Document, ExportError> {
    let config = a4_page_config();
    let pages = paginate(&build_blocks(resume), &config, fonts);
    let accent = parse_hex_color(&resume.accent);

    let mut coverage = Coverage::default();
    let contents: Vec<Content> = pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let frame = PageFrame {
                number: i + 1,
                total: pages.len(),
                accent,
                config: &config,
            };
            page_content(page, &frame, fonts, &mut coverage)
        })
        .collect();
    if !coverage.missing.is_empty() {
        return Err(ExportError::UnsupportedCharacters(
            coverage.missing.into_iter().collect(),
        ));
    }

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let resources = font_resources(&mut doc, fonts, &coverage);
    let resources_id = doc.add_object(Object::Dictionary(resources));

    let mut kids = Vec::with_capacity(contents.len());
    for content in contents {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_dict = Dictionary::from_iter(vec![
            ("Type", name("Page")),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(config.width_pt),
                    Object::Integer(config.height_pt),
                ]),
            ),
            ("Resources", Object::Reference(resources_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        kids.push(Object::Reference(doc.add_object(Object::Dictionary(page_dict))));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", name("Pages")),
        ("Count", Object::Integer(kids.len() as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Object::Dictionary(Dictionary::from_iter(vec![
        ("Type", name("Catalog")),
        ("Pages", Object::Reference(pages_id)),
    ])));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let title = if resume.name.is_empty() { "CV" } else { &resume.name };
    let info_id = doc.add_object(Object::Dictionary(Dictionary::from_iter(vec![
        ("Title", text_string(title)),
        (
            "Producer",
            Object::string_literal(concat!("cv-builder ", env!("CARGO_PKG_VERSION"))),
        ),
    ])));
    doc.trailer.set("Info", Object::Reference(info_id));

    Ok(doc)
}

pub fn render(resume: &RenderedResume, fonts: &PdfFonts) -> Result<Vec<u8>, ExportError> {
    let mut doc = build_document(resume, fonts)?;
    doc.compress();
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ExportError::Pdf(format!("Save failed: {e}")))?;
    Ok(buffer)
}
