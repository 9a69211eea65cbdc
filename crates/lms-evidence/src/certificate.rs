//! Completion certificate rendering
//!
//! One A4 page: a centered "Class Completed" title and a left-aligned
//! `User: <email>` line. Layout is fixed; coordinates are PDF points.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::CertificateError;

pub const TITLE: &str = "Class Completed";

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 28;
const CELL_WIDTH: i64 = 567;
const LINE_HEIGHT: i64 = 28;

const TITLE_SIZE: i64 = 16;
const BODY_SIZE: i64 = 12;

/// Helvetica advance width of `TITLE`, in 1/1000 em
const TITLE_WIDTH_UNITS: i64 = 7613;

const TITLE_BASELINE: i64 = PAGE_HEIGHT - MARGIN - 20;
// title cell, one blank line, then the body cell
const BODY_BASELINE: i64 = TITLE_BASELINE - 3 * LINE_HEIGHT;

fn title_x() -> i64 {
    let width = TITLE_WIDTH_UNITS * TITLE_SIZE / 1000;
    MARGIN + (CELL_WIDTH - width) / 2
}

fn text_operations(font_size: i64, x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), Object::Integer(font_size)]),
        Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Render the certificate for `email` to `output_path`.
///
/// An existing file at `output_path` is overwritten. The email is embedded
/// verbatim.
pub fn generate_certificate(email: &str, output_path: &Path) -> Result<(), CertificateError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = text_operations(TITLE_SIZE, title_x(), TITLE_BASELINE, TITLE);
    operations.extend(text_operations(
        BODY_SIZE,
        MARGIN,
        BODY_BASELINE,
        &format!("User: {}", email),
    ));
    let content = Content { operations }
        .encode()
        .map_err(|e| CertificateError::Encode(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(output_path)
        .map_err(|source| CertificateError::Write {
            path: output_path.to_path_buf(),
            source,
        })?;
    Ok(())
}
