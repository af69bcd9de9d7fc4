//! PPTX text extractor implementation.

use pitch_core::{DeckFormat, Error, ExtractedText, Extraction, PitchDeckFile, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// Extracts the text of every shape in a PPTX deck.
///
/// Each text-bearing `p:sp` shape becomes one line, slides in presentation
/// order and shapes in document order within a slide. Shapes nested in
/// `p:grpSp` groups are walked too, so a grouped text box contributes its own
/// line rather than being dropped with the group. Pictures, connectors and
/// graphic frames have no text body and are skipped.
pub struct PptxExtractor;

impl PptxExtractor {
    /// Create a new PPTX extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract text from an uploaded deck.
    ///
    /// Uploads in an unsupported format yield [`Extraction::Unsupported`]
    /// without their contents being read.
    pub fn extract(&self, file: &PitchDeckFile) -> Result<Extraction> {
        match file.format() {
            Some(DeckFormat::Pptx) => {
                log::debug!("Extracting {} as PPTX", file.filename);
                let text = self.extract_reader(Cursor::new(file.bytes.as_slice()))?;
                Ok(Extraction::Text(text))
            }
            None => {
                log::info!("Skipping {}: unsupported format", file.filename);
                Ok(Extraction::Unsupported)
            }
        }
    }

    /// Extract text from a PPTX archive.
    pub fn extract_reader<R: Read + Seek>(&self, reader: R) -> Result<ExtractedText> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_paths = self.get_slide_order(&mut archive)?;
        log::debug!("Found {} slides", slide_paths.len());

        let mut text = ExtractedText::new();
        for (idx, slide_path) in slide_paths.iter().enumerate() {
            let content = read_file_from_archive(&mut archive, slide_path)?;
            let shapes = extract_shape_text(&content)?;
            log::debug!("Slide {} ({}): {} text shapes", idx + 1, slide_path, shapes.len());
            for shape in shapes {
                text.push_shape(shape);
            }
        }

        Ok(text)
    }

    /// Get the ordered list of slide paths.
    ///
    /// `p:sldIdLst` in presentation.xml is authoritative. Decks without one
    /// fall back to ordering by the number in each slide's part name.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
        let slide_rels = parse_slide_relationships(&rels_content)?;

        let listed = match read_file_from_archive(archive, PRESENTATION_PATH) {
            Ok(content) => parse_slide_id_list(&content)?,
            Err(e) => {
                log::warn!("No usable {} ({}), ordering slides by name", PRESENTATION_PATH, e);
                Vec::new()
            }
        };

        if !listed.is_empty() {
            let by_id: HashMap<&str, &str> = slide_rels
                .iter()
                .map(|(id, target)| (id.as_str(), target.as_str()))
                .collect();

            let mut slides = Vec::with_capacity(listed.len());
            for rel_id in &listed {
                match by_id.get(rel_id.as_str()) {
                    Some(target) => slides.push(resolve_part_path(target)),
                    None => log::warn!("Slide relationship {} not found, skipping", rel_id),
                }
            }
            return Ok(slides);
        }

        let mut slides: Vec<(String, Option<usize>)> = slide_rels
            .into_iter()
            .map(|(_, target)| {
                let order_num = extract_slide_number(&target);
                (resolve_part_path(&target), order_num)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }
}

impl Default for PptxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect `(Id, Target)` for every slide relationship.
fn parse_slide_relationships(xml_content: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);
    let mut slides = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut id = String::new();

                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Type" => rel_type = value,
                        b"Target" => target = value,
                        b"Id" => id = value,
                        _ => {}
                    }
                }

                // Exact match: slideLayout and slideMaster share the prefix.
                if rel_type.ends_with("/slide") {
                    slides.push((id, target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(slides)
}

/// Relationship ids from `p:sldIdLst`, in presentation order.
fn parse_slide_id_list(xml_content: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                if let Some(id) = relationship_id(e) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// The namespaced `r:id` attribute, as opposed to the numeric `id`.
fn relationship_id(e: &BytesStart<'_>) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
            Some(String::from_utf8_lossy(&attr.value).to_string())
        } else {
            None
        }
    })
}

/// Text of each text-bearing shape on one slide, in document order.
///
/// Paragraphs and line breaks inside a shape are folded into single spaces
/// so each shape yields exactly one line.
fn extract_shape_text(xml_content: &str) -> Result<Vec<String>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut current: Option<String> = None;
    let mut in_text_run = false;
    let mut pending_break = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    current = Some(String::new());
                    pending_break = false;
                }
                b"p" | b"br" => {
                    if current.as_ref().is_some_and(|t| !t.is_empty()) {
                        pending_break = true;
                    }
                }
                b"t" if current.is_some() => in_text_run = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()) == b"br"
                    && current.as_ref().is_some_and(|t| !t.is_empty())
                {
                    pending_break = true;
                }
            }
            Ok(Event::Text(ref e)) if in_text_run => {
                let run = e
                    .unescape()
                    .map_err(|err| Error::XmlError(format!("Bad text in slide: {}", err)))?;
                push_run(current.as_mut(), &run, &mut pending_break);
            }
            Ok(Event::CData(ref e)) if in_text_run => {
                let run = String::from_utf8_lossy(e).to_string();
                push_run(current.as_mut(), &run, &mut pending_break);
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text_run = false,
                b"sp" => {
                    if let Some(text) = current.take() {
                        let text = text.trim();
                        if !text.is_empty() {
                            shapes.push(text.to_string());
                        }
                    }
                    in_text_run = false;
                    pending_break = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

fn push_run(current: Option<&mut String>, run: &str, pending_break: &mut bool) {
    let Some(text) = current else {
        return;
    };
    if *pending_break {
        if !text.ends_with(char::is_whitespace) && !run.starts_with(char::is_whitespace) {
            text.push(' ');
        }
        *pending_break = false;
    }
    // A run may carry its own line feeds (`&#10;`); keep the shape on one line.
    text.extend(run.chars().map(|c| match c {
        '\r' | '\n' | '\u{b}' => ' ',
        c => c,
    }));
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Turn a relationship target from presentation.xml.rels into an archive path.
fn resolve_part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a part name like "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const SLIDE_REL: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    const LAYOUT_REL: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

    fn text_shape(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", p))
            .collect();
        format!("<p:sp><p:nvSpPr/><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>", body)
    }

    fn slide_xml(shapes: &str) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
                r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
                "<p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"
            ),
            shapes
        )
    }

    /// Build a deck whose slides appear in `order` (indexes into `slides`).
    fn build_pptx(slides: &[String], order: &[usize]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        let mut rels = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
        rels.push_str(&format!(
            r#"<Relationship Id="rId1" Type="{}" Target="slideLayouts/slideLayout1.xml"/>"#,
            LAYOUT_REL
        ));
        for i in 0..slides.len() {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
                i + 2,
                SLIDE_REL,
                i + 1
            ));
        }
        rels.push_str("</Relationships>");
        zip.start_file(PRESENTATION_RELS_PATH, options).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();

        let ids: String = order
            .iter()
            .enumerate()
            .map(|(n, i)| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + n, i + 2))
            .collect();
        let presentation = format!(
            r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
            ids
        );
        zip.start_file(PRESENTATION_PATH, options).unwrap();
        zip.write_all(presentation.as_bytes()).unwrap();

        for (i, slide) in slides.iter().enumerate() {
            zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(slide.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    fn extract(bytes: Vec<u8>) -> ExtractedText {
        PptxExtractor::new()
            .extract_reader(Cursor::new(bytes))
            .unwrap()
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("slides/slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_resolve_part_path() {
        assert_eq!(resolve_part_path("slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_part_path("/ppt/slides/slide1.xml"), "ppt/slides/slide1.xml");
    }

    #[test]
    fn test_one_line_per_shape_in_order() {
        let slides = vec![
            slide_xml(&(text_shape(&["Acme Robotics"]) + &text_shape(&["We deliver pizza via drone"]))),
            slide_xml(&text_shape(&["Raising $2M seed"])),
        ];
        let text = extract(build_pptx(&slides, &[0, 1]));

        assert_eq!(
            text.lines(),
            &["Acme Robotics", "We deliver pizza via drone", "Raising $2M seed"]
        );
        assert_eq!(
            text.as_text(),
            "Acme Robotics\nWe deliver pizza via drone\nRaising $2M seed\n"
        );
    }

    #[test]
    fn test_slide_order_follows_slide_id_list() {
        let slides = vec![
            slide_xml(&text_shape(&["first part"])),
            slide_xml(&text_shape(&["second part"])),
        ];
        let text = extract(build_pptx(&slides, &[1, 0]));
        assert_eq!(text.lines(), &["second part", "first part"]);
    }

    #[test]
    fn test_empty_shapes_are_skipped() {
        let shapes = text_shape(&["Title"])
            + "<p:sp><p:txBody><a:p/></p:txBody></p:sp>"
            + &text_shape(&["   "])
            + "<p:pic><p:nvPicPr/></p:pic>";
        let text = extract(build_pptx(&[slide_xml(&shapes)], &[0]));
        assert_eq!(text.lines(), &["Title"]);
    }

    #[test]
    fn test_paragraphs_fold_into_one_line() {
        let shape = "<p:sp><p:txBody>\
            <a:p><a:r><a:t>Problem:</a:t></a:r></a:p>\
            <a:p><a:r><a:t>cold </a:t></a:r><a:r><a:t>pizza</a:t></a:r><a:br/><a:r><a:t>every night</a:t></a:r></a:p>\
            </p:txBody></p:sp>";
        let shapes = extract_shape_text(&slide_xml(shape)).unwrap();
        assert_eq!(shapes, vec!["Problem: cold pizza every night"]);
    }

    #[test]
    fn test_line_feeds_inside_a_run_stay_on_one_line() {
        let shapes = text_shape(&["Acme&#10;Robotics"]) + &text_shape(&["We deliver\npizza via drone"]);
        let text = extract(build_pptx(&[slide_xml(&shapes)], &[0]));

        assert_eq!(text.lines(), &["Acme Robotics", "We deliver pizza via drone"]);
        assert_eq!(text.as_text().lines().count(), 2);
    }

    #[test]
    fn test_push_run_replaces_line_breaks() {
        let mut text = String::from("Seed");
        let mut pending_break = true;
        push_run(Some(&mut text), "round\r\n$2M\u{b}raise", &mut pending_break);
        assert_eq!(text, "Seed round  $2M raise");
        assert!(!pending_break);
    }

    #[test]
    fn test_group_shapes_are_included() {
        let shapes = format!(
            "<p:grpSp><p:nvGrpSpPr/>{}{}</p:grpSp>{}",
            text_shape(&["Team"]),
            text_shape(&["Jane: CEO"]),
            text_shape(&["Contact"])
        );
        let lines = extract_shape_text(&slide_xml(&shapes)).unwrap();
        assert_eq!(lines, vec!["Team", "Jane: CEO", "Contact"]);
    }

    #[test]
    fn test_table_text_is_ignored() {
        let frame = "<p:graphicFrame><a:graphic><a:graphicData><a:tbl><a:tr><a:tc>\
            <a:txBody><a:p><a:r><a:t>cell</a:t></a:r></a:p></a:txBody>\
            </a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>";
        let lines = extract_shape_text(&slide_xml(&(frame.to_string() + &text_shape(&["Body"])))).unwrap();
        assert_eq!(lines, vec!["Body"]);
    }

    #[test]
    fn test_entities_are_unescaped() {
        let lines = extract_shape_text(&slide_xml(&text_shape(&["R&amp;D &lt;fast&gt;"]))).unwrap();
        assert_eq!(lines, vec!["R&D <fast>"]);
    }

    #[test]
    fn test_unsupported_upload_is_not_read() {
        let file = PitchDeckFile::new("deck.pdf", b"%PDF-1.7".to_vec());
        let extraction = PptxExtractor::new().extract(&file).unwrap();
        assert!(extraction.is_unsupported());
    }

    #[test]
    fn test_supported_upload_is_extracted() {
        let bytes = build_pptx(&[slide_xml(&text_shape(&["Acme Robotics"]))], &[0]);
        let file = PitchDeckFile::new("Acme.PPTX", bytes);
        match PptxExtractor::new().extract(&file).unwrap() {
            Extraction::Text(text) => assert_eq!(text.lines(), &["Acme Robotics"]),
            Extraction::Unsupported => panic!("expected text"),
        }
    }

    #[test]
    fn test_corrupt_archive_is_an_error() {
        let file = PitchDeckFile::new("broken.pptx", b"not a zip".to_vec());
        let err = PptxExtractor::new().extract(&file).unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }

    #[test]
    fn test_falls_back_to_name_order_without_slide_list() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        let rels = format!(
            r#"<Relationships><Relationship Id="rId9" Type="{0}" Target="slides/slide2.xml"/><Relationship Id="rId3" Type="{0}" Target="slides/slide1.xml"/></Relationships>"#,
            SLIDE_REL
        );
        zip.start_file(PRESENTATION_RELS_PATH, options).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();
        for (n, body) in [(1, "one"), (2, "two")] {
            zip.start_file(format!("ppt/slides/slide{}.xml", n), options)
                .unwrap();
            zip.write_all(slide_xml(&text_shape(&[body])).as_bytes())
                .unwrap();
        }
        let bytes = zip.finish().unwrap().into_inner();

        assert_eq!(extract(bytes).lines(), &["one", "two"]);
    }
}
