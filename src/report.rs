//! Student report rendering
//!
//! [`ReportRenderer`] is the seam between the request handler and the layout
//! engine. [`PdfReportRenderer`] is the production implementation: an A4
//! document in the built-in Helvetica faces, so no font files are embedded.
//!
//! Rendering is a pure function of the record and the generation date; the
//! same inputs always produce the same bytes.

use crate::error::Result;
use crate::types::StudentDetail;
use chrono::NaiveDate;
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

/// Points per millimetre
const MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
/// Content below this line moves to the next page
const BREAK_LINE: f32 = PAGE_HEIGHT - 20.0;
/// Top of the footer block, measured from the top edge. A full record ends
/// just above it, so the footer shares the last content page.
const FOOTER_TOP: f32 = PAGE_HEIGHT - 22.0;
const LABEL_WIDTH: f32 = 40.0;
const ROW_HEIGHT: f32 = 8.0;
/// Characters per value line before wrapping (10pt Helvetica over 150mm)
const VALUE_WRAP: usize = 80;

const ORGANIZATION: &str = "School Management System";

/// Renders a student record into a printable document
pub trait ReportRenderer: Send + Sync {
    /// Produce the document bytes for `student`, stamped with `generated_on`
    fn render(&self, student: &StudentDetail, generated_on: NaiveDate) -> Result<Vec<u8>>;

    /// MIME type of the produced document
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}

/// Suggested download name for a student's report
pub fn report_filename(id: u64) -> String {
    format!("student_{id}_report.pdf")
}

/// Fixed-layout PDF renderer
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfReportRenderer;

impl ReportRenderer for PdfReportRenderer {
    fn render(&self, student: &StudentDetail, generated_on: NaiveDate) -> Result<Vec<u8>> {
        let pages = layout(student, generated_on);
        Ok(write_pdf(&pages))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
    Italic,
}

impl Face {
    fn resource_name(self) -> Name<'static> {
        match self {
            Face::Regular => Name(b"F1"),
            Face::Bold => Name(b"F2"),
            Face::Italic => Name(b"F3"),
        }
    }
}

/// One positioned piece of text; coordinates in millimetres from the top-left
#[derive(Clone, Debug)]
struct Run {
    face: Face,
    size: f32,
    x: f32,
    baseline: f32,
    text: String,
}

/// Cursor-based layout in the style of a cell/line document builder
struct Layout {
    pages: Vec<Vec<Run>>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: MARGIN,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = MARGIN;
    }

    /// Place a cell of `height` at the cursor, breaking the page if it would
    /// cross the bottom margin. Does not advance the cursor.
    fn cell(&mut self, face: Face, size: f32, x: f32, height: f32, text: &str) {
        if self.y + height > BREAK_LINE {
            self.new_page();
        }
        self.place(face, size, x, height, text);
    }

    fn place(&mut self, face: Face, size: f32, x: f32, height: f32, text: &str) {
        // Vertically centre the glyphs in the cell
        let baseline = self.y + height / 2.0 + size * 0.3 / MM;
        if let Some(page) = self.pages.last_mut() {
            page.push(Run {
                face,
                size,
                x,
                baseline,
                text: text.to_string(),
            });
        }
    }

    fn ln(&mut self, height: f32) {
        self.y += height;
    }

    fn heading(&mut self, text: &str) {
        self.cell(Face::Bold, 12.0, MARGIN, 10.0, text);
        self.ln(10.0);
    }

    fn row(&mut self, label: &str, value: &str) {
        let lines = wrap(value, VALUE_WRAP);
        for (i, line) in lines.iter().enumerate() {
            if self.y + ROW_HEIGHT > BREAK_LINE {
                self.new_page();
            }
            if i == 0 {
                self.place(Face::Bold, 10.0, MARGIN, ROW_HEIGHT, &format!("{label}:"));
            }
            self.place(Face::Regular, 10.0, MARGIN + LABEL_WIDTH, ROW_HEIGHT, line);
            self.ln(ROW_HEIGHT);
        }
    }

    /// Footer pinned to the bottom of the last page. Moves to a fresh page
    /// only when the body already reaches into the footer block.
    fn footer(&mut self, reporter: &str) {
        if self.y > FOOTER_TOP {
            self.new_page();
        }
        self.y = FOOTER_TOP;
        self.place(
            Face::Italic,
            8.0,
            MARGIN,
            10.0,
            &format!("This is an official document of {ORGANIZATION}"),
        );
        self.ln(5.0);
        self.place(
            Face::Italic,
            8.0,
            MARGIN,
            10.0,
            &format!("Report generated by: {reporter}"),
        );
    }
}

fn layout(student: &StudentDetail, generated_on: NaiveDate) -> Vec<Vec<Run>> {
    let mut doc = Layout::new();

    doc.cell(Face::Bold, 16.0, MARGIN, 10.0, "Student Report");
    doc.ln(15.0);

    doc.cell(Face::Bold, 14.0, MARGIN, 10.0, ORGANIZATION);
    doc.ln(10.0);

    doc.cell(
        Face::Italic,
        10.0,
        MARGIN,
        10.0,
        &format!("Generated on: {}", generated_on.format("%B %-d, %Y")),
    );
    doc.ln(15.0);

    doc.heading("Personal Information");
    doc.row("ID", &student.id.to_string());
    doc.row("Name", &student.name);
    doc.row("Email", &student.email);
    doc.row("Phone", &student.phone);
    doc.row("Gender", &student.gender);
    doc.row("Date of Birth", &student.dob);
    doc.row("Admission Date", &student.admission_date);
    doc.ln(10.0);

    doc.heading("Academic Information");
    doc.row("Class", &student.class);
    doc.row("Section", &student.section);
    doc.row("Roll Number", &student.roll);
    doc.ln(10.0);

    doc.heading("Family Information");
    doc.row("Father's Name", &student.father_name);
    doc.row("Father's Phone", &student.father_phone);
    doc.row("Mother's Name", &student.mother_name);
    doc.row("Mother's Phone", &student.mother_phone);
    doc.row("Guardian's Name", &student.guardian_name);
    doc.row("Guardian's Phone", &student.guardian_phone);
    doc.row("Relation of Guardian", &student.relation_of_guardian);
    doc.ln(10.0);

    doc.heading("Address Information");
    doc.row("Current Address", &student.current_address);
    doc.row("Permanent Address", &student.permanent_address);

    doc.footer(&student.reporter_name);

    doc.pages
}

/// Greedy word wrap; words longer than `width` are split. Always returns at
/// least one (possibly empty) line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let current_len = current.chars().count();
        if !current.is_empty() && current_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encode text for the WinAnsi-encoded standard fonts
///
/// Latin-1 printable characters map to their code point; everything else
/// becomes `?`.
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

fn write_pdf(pages: &[Vec<Run>]) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let info_id = Ref::new(3);
    let fonts = [
        (Face::Regular, Ref::new(4), Name(b"Helvetica")),
        (Face::Bold, Ref::new(5), Name(b"Helvetica-Bold")),
        (Face::Italic, Ref::new(6), Name(b"Helvetica-Oblique")),
    ];

    // Each page takes two ids: the page object and its content stream
    let page_refs: Vec<(Ref, Ref)> = (0..pages.len() as i32)
        .map(|i| (Ref::new(7 + 2 * i), Ref::new(8 + 2 * i)))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_refs.iter().map(|(page_id, _)| *page_id))
        .count(page_refs.len() as i32);
    pdf.document_info(info_id)
        .title(TextStr("Student Report"))
        .producer(TextStr(ORGANIZATION));

    for (_, id, base) in fonts {
        pdf.type1_font(id)
            .base_font(base)
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (runs, (page_id, content_id)) in pages.iter().zip(&page_refs) {
        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH * MM, PAGE_HEIGHT * MM));
        page.parent(page_tree_id);
        page.contents(*content_id);
        {
            let mut resources = page.resources();
            let mut font_dict = resources.fonts();
            for (face, id, _) in fonts {
                font_dict.pair(face.resource_name(), id);
            }
        }
        page.finish();

        let mut content = Content::new();
        for run in runs {
            let text = encode(&run.text);
            content.begin_text();
            content.set_font(run.face.resource_name(), run.size);
            content.next_line(run.x * MM, (PAGE_HEIGHT - run.baseline) * MM);
            content.show(Str(&text));
            content.end_text();
        }
        pdf.stream(*content_id, &content.finish());
    }

    pdf.finish()
}
