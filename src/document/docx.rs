// File: ./src/document/docx.rs
//! Office Open XML (`.docx`) reader and a minimal writer.
//!
//! Only the paragraph structure is read: `word/document.xml` for the text and
//! paragraph style references, `word/styles.xml` to translate style ids into
//! their display names (`Heading 1`, `List Bullet`, ...). Localised Word
//! installs keep English style *names* even when the ids differ, so the
//! classification is done on names first and falls back to the id.
use crate::document::{Paragraph, ParagraphStyle};
use anyhow::{Context, Result};
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use zip::ZipArchive;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub fn read_paragraphs(path: &Path) -> Result<Vec<Paragraph>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    let mut archive = ZipArchive::new(file).context("Not a valid DOCX (zip) archive")?;

    let document_xml = read_entry(&mut archive, "word/document.xml")?
        .context("Archive has no word/document.xml")?;
    let styles = match read_entry(&mut archive, "word/styles.xml")? {
        Some(xml) => style_names(&xml)?,
        None => HashMap::new(),
    };

    paragraphs_from_xml(&document_xml, &styles)
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut contents = String::new();
            entry
                .read_to_string(&mut contents)
                .with_context(|| format!("Failed to read {}", name))?;
            Ok(Some(contents))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", name)),
    }
}

/// Maps `w:styleId` to the human-readable `w:name`.
pub fn style_names(styles_xml: &str) -> Result<HashMap<String, String>> {
    let doc = Document::parse(styles_xml).context("Malformed word/styles.xml")?;
    let mut names = HashMap::new();
    for style in doc.descendants().filter(|n| n.has_tag_name((W_NS, "style"))) {
        let Some(id) = style.attribute((W_NS, "styleId")) else {
            continue;
        };
        if let Some(name) = child(style, "name").and_then(|n| n.attribute((W_NS, "val"))) {
            names.insert(id.to_string(), name.to_string());
        }
    }
    Ok(names)
}

/// Extracts paragraphs from `word/document.xml`.
///
/// Line breaks inside a paragraph split it into several paragraphs of the same
/// style, so a label typed after Shift+Enter is still seen at line start.
/// Headings are the exception: their lines are joined with a space.
pub fn paragraphs_from_xml(
    document_xml: &str,
    styles: &HashMap<String, String>,
) -> Result<Vec<Paragraph>> {
    let doc = Document::parse(document_xml).context("Malformed word/document.xml")?;
    let body = doc
        .descendants()
        .find(|n| n.has_tag_name((W_NS, "body")))
        .context("word/document.xml has no body")?;

    let mut paragraphs = Vec::new();
    for p in body.descendants().filter(|n| n.has_tag_name((W_NS, "p"))) {
        let style = paragraph_style(p, styles);
        let mut text = String::new();
        collect_text(p, &mut text);
        if let ParagraphStyle::Heading(_) = style {
            let title = text.split_whitespace().collect::<Vec<_>>().join(" ");
            paragraphs.push(Paragraph::new(style, title));
            continue;
        }
        for line in text.split('\n') {
            paragraphs.push(Paragraph::new(style, line.trim()));
        }
    }
    Ok(paragraphs)
}

fn child<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name((W_NS, local)))
}

fn paragraph_style(p: Node, styles: &HashMap<String, String>) -> ParagraphStyle {
    let props = child(p, "pPr");
    let style_id = props
        .and_then(|pr| child(pr, "pStyle"))
        .and_then(|s| s.attribute((W_NS, "val")));
    let has_numbering = props.and_then(|pr| child(pr, "numPr")).is_some();

    let name = style_id.map(|id| styles.get(id).map(String::as_str).unwrap_or(id));
    classify_style(name, has_numbering)
}

/// Classifies a style name such as `Heading 1`, `heading1` or `List Bullet 2`.
pub fn classify_style(name: Option<&str>, has_numbering: bool) -> ParagraphStyle {
    let normalized: String = name
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    if let Some(level) = normalized.strip_prefix("heading")
        && let Ok(level) = level.parse::<u8>()
    {
        return ParagraphStyle::Heading(level);
    }
    if normalized.starts_with("listbullet") {
        return ParagraphStyle::ListBullet;
    }
    if normalized.starts_with("listnumber") {
        return ParagraphStyle::ListNumber;
    }
    if has_numbering {
        return ParagraphStyle::ListBullet;
    }
    ParagraphStyle::Normal
}

/// Concatenates run text, without descending into nested paragraphs
/// (text boxes are emitted as paragraphs of their own).
fn collect_text(node: Node, out: &mut String) {
    for c in node.children() {
        if !c.is_element() {
            continue;
        }
        match c.tag_name().name() {
            "p" if c.tag_name().namespace() == Some(W_NS) => {}
            "t" => out.push_str(c.text().unwrap_or_default()),
            "tab" => out.push('\t'),
            "br" | "cr" => out.push('\n'),
            // Deleted revisions still carry text in w:delText; skip them.
            "del" => {}
            _ => collect_text(c, out),
        }
    }
}

// --- WRITER ---

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:pPr><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="ListNumber"><w:name w:val="List Number"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:style></w:styles>"#;

fn style_id(style: ParagraphStyle) -> Option<String> {
    match style {
        ParagraphStyle::Heading(level) => Some(format!("Heading{}", level)),
        ParagraphStyle::ListBullet => Some("ListBullet".to_string()),
        ParagraphStyle::ListNumber => Some("ListNumber".to_string()),
        ParagraphStyle::Normal => None,
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn document_xml(paragraphs: &[Paragraph]) -> String {
    let mut body = String::new();
    for p in paragraphs {
        body.push_str("<w:p>");
        if let Some(id) = style_id(p.style) {
            body.push_str(&format!("<w:pPr><w:pStyle w:val=\"{}\"/></w:pPr>", id));
        }
        if !p.text.is_empty() {
            body.push_str(&format!(
                "<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>",
                escape_xml(&p.text)
            ));
        }
        body.push_str("</w:p>");
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document xmlns:w=\"{}\"><w:body>{}<w:sectPr/></w:body></w:document>",
        W_NS, body
    )
}

/// Writes `paragraphs` as a minimal, Word-compatible `.docx`.
pub fn write_paragraphs(path: &Path, paragraphs: &[Paragraph]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create '{}'", path.display()))?;
    let mut zip = zip::ZipWriter::new(file);
    let options: zip::write::FileOptions<'_, ()> =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let document = document_xml(paragraphs);
    let parts: [(&str, &str); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/styles.xml", STYLES),
        ("word/document.xml", &document),
    ];
    for (name, contents) in parts {
        zip.start_file(name, options)?;
        zip.write_all(contents.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}
