//! Shared fixtures for itinera tests.
//!
//! Provides ready-made trip requests, in-memory uploads, small generated
//! PDF files and a `multipart/form-data` body builder for handler tests.

use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use itinera_core::{TripRequest, Upload};

/// Boundary used by [`MultipartBody`].
pub const BOUNDARY: &str = "itinera-test-boundary";

/// Parse a `YYYY-MM-DD` date, panicking on bad input.
pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("bad test date {value:?}: {e}"))
}

/// A request for `client` in Roma over the inclusive range.
pub fn trip_request(client: &str, start: &str, end: &str) -> TripRequest {
    TripRequest::new(client, date(start), date(end))
        .expect("test dates should be ordered")
        .destination("Roma")
}

/// A `text/plain` upload.
pub fn text_upload(filename: &str, body: &str) -> Upload {
    Upload::new(
        Some(filename.to_owned()),
        Some("text/plain".to_owned()),
        body.as_bytes().to_vec(),
    )
}

/// A valid PDF with one page per entry of `pages`, each showing its text
/// in Courier.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("fixture content should encode"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture pdf should serialize");
    bytes
}

/// An `application/pdf` upload built with [`pdf_with_pages`].
pub fn pdf_upload(filename: &str, pages: &[&str]) -> Upload {
    Upload::new(
        Some(filename.to_owned()),
        Some("application/pdf".to_owned()),
        pdf_with_pages(pages),
    )
}

/// Builder for `multipart/form-data` request bodies.
#[derive(Debug, Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain form field.
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file part. An empty `filename` mimics a browser submitting
    /// the file input with nothing selected.
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// The standard form from the end-to-end scenario: Ana, Roma, three days.
pub fn ana_form() -> MultipartBody {
    MultipartBody::new()
        .field("client_name", "Ana")
        .field("start_date", "2024-03-01")
        .field("end_date", "2024-03-03")
        .field("primary_destination", "Roma")
        .field("travel_style", "Premium")
        .field("special_requests", "")
}
