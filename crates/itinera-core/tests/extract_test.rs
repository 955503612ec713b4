//! Integration tests for attachment extraction with real PDF files.

#![cfg(feature = "pdf-text")]

use itinera_core::{Upload, extract};
use itinera_test_utils::{pdf_upload, text_upload};

#[test]
fn pdf_pages_are_extracted_in_order() {
    let mut uploads = vec![pdf_upload("brief.pdf", &["cultura en Roma", "relax junto al mar"])];
    let (text, summaries) = extract(&mut uploads);

    let cultura = text.find("cultura").expect("first page text");
    let relax = text.find("relax").expect("second page text");
    assert!(cultura < relax);
    assert_eq!(summaries[0].notes, "Texto extraído del PDF.");
    assert_eq!(summaries[0].content_type, "application/pdf");
}

#[test]
fn pdf_upload_is_rewound_after_success() {
    let mut uploads = vec![pdf_upload("brief.pdf", &["arte"])];
    extract(&mut uploads);
    assert_eq!(uploads[0].position(), 0);
}

#[test]
fn bad_pdf_does_not_stop_other_files() {
    let mut uploads = vec![
        Upload::new(
            Some("roto.pdf".into()),
            Some("application/pdf".into()),
            b"definitely not a pdf".to_vec(),
        ),
        text_upload("notas.txt", "familia"),
    ];
    let (text, summaries) = extract(&mut uploads);

    assert_eq!(text, "familia");
    assert_eq!(summaries.len(), 2);
    assert!(summaries[0].notes.starts_with("No se pudo leer el PDF"));
    assert!(summaries[0].notes.chars().count() <= 200);
    assert_eq!(summaries[1].notes, "Texto leído correctamente.");
}

#[test]
fn pdf_and_text_fragments_join_with_newlines() {
    let mut uploads = vec![
        text_upload("a.txt", "primero"),
        pdf_upload("b.pdf", &["segundo"]),
    ];
    let (text, _) = extract(&mut uploads);
    assert!(text.starts_with("primero\n"), "got {text:?}");
    assert!(text.contains("segundo"));
}
