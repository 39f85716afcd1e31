//! PDF rendering — lays out company insights into a branded one-pager.
//!
//! The layout is a fixed sequence: brand header, company title, snapshot
//! line, the four insight sections, conversation openers, and a footer with
//! the source count. Empty fields render a placeholder line; the document
//! body contains no timestamps, so identical inputs produce an identical
//! layout.

use crate::config::BrandingConfig;
use crate::error::RenderError;
use crate::types::CompanyInsights;
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{Document, SimplePageDecorator};
use std::path::Path;

/// Text shown for a section the model left empty.
const EMPTY_SECTION: &str = "No data available.";

/// The four insight sections, in render order.
const SECTIONS: [&str; 4] = [
    "Company Overview",
    "Pain Points",
    "Recent News",
    "Recommended Angle",
];

/// Renders `CompanyInsights` into a branded PDF.
pub struct PdfRenderer {
    branding: BrandingConfig,
}

impl PdfRenderer {
    pub fn new(branding: BrandingConfig) -> Self {
        Self { branding }
    }

    /// Render the one-pager into an in-memory PDF byte buffer.
    pub fn render(
        &self,
        company: &str,
        insights: &CompanyInsights,
        source_count: usize,
    ) -> Result<Vec<u8>, RenderError> {
        let fonts = self.load_fonts()?;
        let doc = self.build_document(fonts, company, insights, source_count);

        let mut buf = Vec::new();
        doc.render(&mut buf)
            .map_err(|e| RenderError::RenderFailed {
                message: e.to_string(),
            })?;
        Ok(buf)
    }

    /// Render and write to `path`.
    ///
    /// The file is written only after the whole document rendered into
    /// memory, so a failed render leaves no partial file behind.
    pub fn render_to_file(
        &self,
        company: &str,
        insights: &CompanyInsights,
        source_count: usize,
        path: &Path,
    ) -> Result<(), RenderError> {
        let bytes = self.render(company, insights, source_count)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| RenderError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            }
        }
        std::fs::write(path, bytes).map_err(|e| RenderError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the document font, trying the configured directory first and
    /// then the usual system locations.
    fn load_fonts(&self) -> Result<FontFamily<FontData>, RenderError> {
        let mut candidates: Vec<(String, String)> = Vec::new();
        if let Some(dir) = &self.branding.font_dir {
            candidates.push((
                dir.to_string_lossy().into_owned(),
                self.branding.font_family.clone(),
            ));
        }
        candidates.push((String::new(), self.branding.font_family.clone()));
        candidates.push((
            "/usr/share/fonts/truetype/liberation".into(),
            "LiberationSans".into(),
        ));
        candidates.push(("/usr/share/fonts/liberation".into(), "LiberationSans".into()));
        candidates.push(("/System/Library/Fonts".into(), "Helvetica".into()));
        candidates.push(("/Library/Fonts".into(), "Arial".into()));

        for (dir, family) in &candidates {
            if let Ok(fonts) = genpdf::fonts::from_files(dir, family, None) {
                return Ok(fonts);
            }
        }

        Err(RenderError::FontLoad {
            searched: candidates
                .iter()
                .map(|(dir, family)| {
                    if dir.is_empty() {
                        family.clone()
                    } else {
                        format!("{dir}/{family}")
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    fn build_document(
        &self,
        fonts: FontFamily<FontData>,
        company: &str,
        insights: &CompanyInsights,
        source_count: usize,
    ) -> Document {
        let (r, g, b) = self.branding.accent_rgb();
        let accent = Color::Rgb(r, g, b);
        let muted = Color::Greyscale(110);

        let mut doc = Document::new(fonts);
        doc.set_title(format!("{} - {}", self.branding.brand_name, company));

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(20);
        doc.set_page_decorator(decorator);

        // Brand header.
        doc.push(Paragraph::new(StyledString::new(
            self.branding.brand_name.clone(),
            Style::new().bold().with_font_size(16).with_color(accent),
        )));
        if !self.branding.tagline.is_empty() {
            doc.push(Paragraph::new(StyledString::new(
                self.branding.tagline.clone(),
                Style::new().with_font_size(9).with_color(muted),
            )));
        }
        doc.push(Break::new(1));

        // Company title and snapshot.
        doc.push(Paragraph::new(StyledString::new(
            company.to_string(),
            Style::new().bold().with_font_size(22),
        )));
        let snapshot = snapshot_line(insights);
        if !snapshot.is_empty() {
            doc.push(Paragraph::new(StyledString::new(
                snapshot,
                Style::new().with_font_size(9).with_color(muted),
            )));
        }
        if !insights.snapshot.tech_stack.is_empty() {
            doc.push(Paragraph::new(StyledString::new(
                format!("Tech stack: {}", insights.snapshot.tech_stack.join(", ")),
                Style::new().with_font_size(9).with_color(muted),
            )));
        }
        doc.push(Break::new(1));

        // The four insight sections.
        let bodies = [
            &insights.overview,
            &insights.pain_points,
            &insights.news,
            &insights.angle,
        ];
        for (title, body) in SECTIONS.iter().zip(bodies) {
            doc.push(Paragraph::new(StyledString::new(
                title.to_string(),
                Style::new().bold().with_font_size(12).with_color(accent),
            )));
            push_body(&mut doc, body);
            doc.push(Break::new(0.5));
        }

        // Conversation openers.
        if !insights.openers.is_empty() {
            doc.push(Paragraph::new(StyledString::new(
                "Conversation Starters".to_string(),
                Style::new().bold().with_font_size(12).with_color(accent),
            )));
            for opener in insights.openers.iter().take(2) {
                if !opener.label.is_empty() {
                    doc.push(Paragraph::new(StyledString::new(
                        opener.label.clone(),
                        Style::new().bold().with_font_size(9),
                    )));
                }
                doc.push(Paragraph::new(StyledString::new(
                    format!("\"{}\"", opener.script),
                    Style::new().italic().with_font_size(10),
                )));
                doc.push(Break::new(0.3));
            }
            doc.push(Break::new(0.5));
        }

        // Footer.
        doc.push(Paragraph::new(StyledString::new(
            format!(
                "{} \u{2022} {} sources analyzed",
                self.branding.footer_text, source_count
            ),
            Style::new().with_font_size(8).with_color(muted),
        )));

        doc
    }
}

/// Join the firmographic fields into one separator-delimited line,
/// skipping empties.
fn snapshot_line(insights: &CompanyInsights) -> String {
    [
        insights.snapshot.industry.as_str(),
        insights.snapshot.size.as_str(),
        insights.snapshot.location.as_str(),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" \u{2022} ")
}

/// Push a section body, splitting on blank lines; empty bodies get the
/// placeholder line instead.
fn push_body(doc: &mut Document, body: &str) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        doc.push(Paragraph::new(StyledString::new(
            EMPTY_SECTION.to_string(),
            Style::new().with_font_size(10).with_color(Color::Greyscale(140)),
        )));
        return;
    }
    for paragraph in trimmed.split("\n\n") {
        let paragraph = paragraph.trim();
        if !paragraph.is_empty() {
            doc.push(Paragraph::new(StyledString::new(
                paragraph.to_string(),
                Style::new().with_font_size(10),
            )));
        }
    }
}
