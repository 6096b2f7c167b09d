//! End-to-end revision of Word documents
//!
//! Each test builds a `.docx` in memory, runs a revision pass with a scripted
//! text service, saves the package and reopens it.

use std::io::Cursor;

use docrevise_core::{
    uniformize, ParagraphOutcome, ParagraphSource, Reviser, ServiceError, StyleAttributes,
    StyledParagraph, StyledRun, TransformRequest, UniformizeOptions,
};
use docrevise_ooxml::test_utils::{create_docx, drawing_run, extract_file};
use docrevise_ooxml::WordDocument;

fn open(body: &str) -> WordDocument {
    WordDocument::from_reader(Cursor::new(create_docx(body))).unwrap()
}

fn save_and_reopen(document: &mut WordDocument) -> (Vec<u8>, WordDocument) {
    let mut buffer = Cursor::new(Vec::new());
    document.write_to(&mut buffer).unwrap();
    let bytes = buffer.into_inner();
    let reopened = WordDocument::from_reader(Cursor::new(bytes.clone())).unwrap();
    (bytes, reopened)
}

type Reply = Result<String, ServiceError>;

fn fixing(from: &'static str, to: &'static str) -> impl FnMut(&TransformRequest<'_>) -> Reply {
    move |request: &TransformRequest<'_>| Ok(request.text.replace(from, to))
}

// =============================================================================
// FORMATTING
// =============================================================================

mod formatting {
    use super::*;

    #[test]
    fn test_bold_prefix_survives_correction() {
        let mut document = open(concat!(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Ceci</w:t></w:r>"#,
            r#"<w:r><w:t xml:space="preserve"> est un text</w:t></w:r></w:p>"#
        ));
        let mut reviser = Reviser::new(fixing("text", "texte"));
        let report = reviser.run(&mut document, "Corrige l'orthographe", None);
        assert_eq!(report.paragraphs[0].outcome, ParagraphOutcome::Modified);

        let (_, mut reopened) = save_and_reopen(&mut document);
        let runs = reopened.paragraph_mut(0).unwrap().runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Ceci");
        assert_eq!(runs[0].attributes.bold, Some(true));
        assert_eq!(runs[1].text, " est un texte");
        assert_eq!(runs[1].attributes.bold, None);
    }

    #[test]
    fn test_paragraph_properties_are_kept() {
        let mut document = open(concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="center"/></w:pPr>"#,
            r#"<w:r><w:t>Introdution</w:t></w:r></w:p>"#
        ));
        let mut reviser = Reviser::new(fixing("Introdution", "Introduction"));
        reviser.run(&mut document, "fix typos", None);

        let xml = document.document_xml();
        let properties = r#"<w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="center"/></w:pPr>"#;
        assert!(xml.contains(properties));
        assert!(xml.contains("Introduction"));
    }

    #[test]
    fn test_uniformize_across_tables() {
        let mut document = open(concat!(
            r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial"/><w:sz w:val="22"/>"#,
            r#"</w:rPr><w:t>Un</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial"/><w:sz w:val="22"/>"#,
            r#"</w:rPr><w:t>Deux</w:t></w:r></w:p>"#,
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:rPr>"#,
            r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri"/><w:sz w:val="20"/>"#,
            r#"</w:rPr><w:t>Trois</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#
        ));
        let report = uniformize(&mut document, &UniformizeOptions::default());
        assert_eq!(report.target_font.as_deref(), Some("Arial"));
        assert_eq!(report.runs_changed, 1);

        let (_, mut reopened) = save_and_reopen(&mut document);
        let cell = reopened.paragraph_mut(2).unwrap().runs();
        assert_eq!(cell[0].attributes.font_family.as_deref(), Some("Arial"));
        assert_eq!(
            cell[0].attributes.font_size.map(|s| s.half_points()),
            Some(22)
        );
    }

    #[test]
    fn test_plain_runs_write_no_properties() {
        let mut document = open(r#"<w:p><w:r><w:t>Bonjour</w:t></w:r></w:p>"#);
        {
            let mut p = document.paragraph_mut(0).unwrap();
            p.replace_runs(&[StyledRun::new("Salut", StyleAttributes::plain())]);
        }
        let xml = document.document_xml();
        assert!(xml.contains(r#"<w:p><w:r><w:t xml:space="preserve">Salut</w:t></w:r></w:p>"#));
    }
}

// =============================================================================
// MEDIA AND PACKAGE FIDELITY
// =============================================================================

mod fidelity {
    use super::*;

    #[test]
    fn test_inline_picture_kept() {
        let body = format!(
            concat!(
                r#"<w:p><w:r><w:t xml:space="preserve">Voir la figure </w:t></w:r>"#,
                "{}<w:r><w:t> ci-dessous</w:t></w:r></w:p>"
            ),
            drawing_run("rId7")
        );
        let mut document = open(&body);
        assert_eq!(document.media_census().total, 1);

        let mut reviser = Reviser::new(fixing("figure", "illustration"));
        let report = reviser.run(&mut document, "Reformule", None);
        assert_eq!(report.paragraphs[0].outcome, ParagraphOutcome::Modified);
        assert!(report.verification.is_intact());

        let (bytes, mut reopened) = save_and_reopen(&mut document);
        assert_eq!(reopened.media_census().total, 1);
        assert_eq!(reopened.texts(), ["Voir la illustration  ci-dessous"]);
        let xml = extract_file(&bytes, "word/document.xml").unwrap();
        assert!(xml.contains(r#"<a:blip r:embed="rId7"/>"#));
        assert!(reopened.archive().contains("word/media/image1.png"));
    }

    #[test]
    fn test_page_break_survives_revision() {
        let body = concat!(
            r#"<w:p><w:r><w:t>Fin du chapitre</w:t><w:br w:type="page"/>"#,
            r#"<w:t>Suite</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>Avant</w:t></w:r><w:r><w:br w:type="column"/></w:r>"#,
            r#"<w:r><w:t>Suite</w:t></w:r></w:p>"#,
        );
        let mut document = open(body);
        assert_eq!(
            document.paragraph_text(0).as_deref(),
            Some("Fin du chapitreSuite")
        );
        assert_eq!(document.paragraph_text(1).as_deref(), Some("AvantSuite"));

        let mut reviser = Reviser::new(fixing("Suite", "La suite"));
        let report = reviser.run(&mut document, "Reformule", None);
        assert_eq!(report.paragraphs[0].outcome, ParagraphOutcome::Modified);
        assert_eq!(report.paragraphs[1].outcome, ParagraphOutcome::Modified);

        let xml = document.document_xml();
        assert!(xml.contains(r#"<w:br w:type="page"/>"#));
        assert!(xml.contains(r#"<w:r><w:br w:type="column"/></w:r>"#));
        assert!(!xml.contains("<w:br/>"));

        let (_, reopened) = save_and_reopen(&mut document);
        assert_eq!(
            reopened.texts(),
            ["Fin du chapitreLa suite", "AvantLa suite"]
        );
    }

    #[test]
    fn test_unrevised_package_is_unchanged() {
        let body = concat!(
            r#"<w:p><w:r><w:t>Rien</w:t></w:r></w:p><w:p/>"#,
            r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#
        );
        let original = create_docx(body);
        let mut document = WordDocument::from_reader(Cursor::new(original.clone())).unwrap();

        let mut reviser = Reviser::new(|request: &TransformRequest<'_>| -> Reply {
            Ok(request.text.to_string())
        });
        let report = reviser.run(&mut document, "Corrige", None);
        assert_eq!(report.counts().unchanged, 1);
        assert_eq!(report.counts().skipped, 1);

        let (bytes, _) = save_and_reopen(&mut document);
        for part in ["word/document.xml", "word/styles.xml", "[Content_Types].xml"] {
            assert_eq!(
                extract_file(&bytes, part),
                extract_file(&original, part),
                "{}",
                part
            );
        }
    }

    #[test]
    fn test_fields_and_hyperlinks_untouched() {
        let body = concat!(
            r#"<w:p><w:r><w:t xml:space="preserve">Page </w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText xml:space="preserve"> PAGE </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
            r#"<w:r><w:t>3</w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#,
            r#"<w:hyperlink r:id="rId9"><w:r><w:t>lien</w:t></w:r></w:hyperlink></w:p>"#
        );
        let mut document = open(body);
        assert_eq!(document.paragraph_text(0).as_deref(), Some("Page "));

        let mut reviser = Reviser::new(fixing("Page", "Feuille"));
        reviser.run(&mut document, "Traduis", None);

        let xml = document.document_xml();
        assert!(xml.contains(r#"<w:t xml:space="preserve">Feuille </w:t>"#));
        assert!(xml.contains(r#"<w:instrText xml:space="preserve"> PAGE </w:instrText>"#));
        assert!(xml.contains(r#"<w:r><w:t>3</w:t></w:r>"#));
        let link = r#"<w:hyperlink r:id="rId9"><w:r><w:t>lien</w:t></w:r></w:hyperlink>"#;
        assert!(xml.contains(link));
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");

        let mut document = open(r#"<w:p><w:r><w:t>Fichier</w:t></w:r></w:p>"#);
        document.save(&path).unwrap();

        let reopened = WordDocument::open(&path).unwrap();
        assert_eq!(reopened.texts(), ["Fichier"]);
    }
}

// =============================================================================
// SERVICE FAILURES
// =============================================================================

mod failures {
    use super::*;

    #[test]
    fn test_failed_paragraph_left_as_is() {
        let mut document = open(concat!(
            r#"<w:p><w:r><w:t>Premier</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>Second</w:t></w:r></w:p>"#
        ));
        let mut calls = 0;
        let mut reviser = Reviser::new(move |request: &TransformRequest<'_>| -> Reply {
            calls += 1;
            if calls == 1 {
                Err(ServiceError::unavailable("connection reset"))
            } else {
                Ok(request.text.to_uppercase())
            }
        });
        let report = reviser.run(&mut document, "Majuscules", None);

        assert!(matches!(report.paragraphs[0].outcome, ParagraphOutcome::Failed { .. }));
        assert_eq!(report.paragraphs[1].outcome, ParagraphOutcome::Modified);
        assert_eq!(document.texts(), ["Premier", "SECOND"]);
    }
}
