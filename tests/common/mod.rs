use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// Text drawn with its baseline origin at `x`, `y` in PDF user space.
pub type Placed<'a> = (&'a str, i64, i64);

/// Writes a PDF whose pages draw each text run at an explicit position in
/// 12pt Courier on an A4 media box.
pub fn create_registry_pdf(
    path: &Path,
    pages: &[Vec<Placed<'_>>],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();

    for runs in pages {
        let mut operations = Vec::new();
        for (text, x, y) in runs {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![(*x).into(), (*y).into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]);
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path)?;
    Ok(())
}

/// Two registry pages: a header row and one listing on the first page, one
/// listing on the second, each with a running footer.
pub fn sample_registry_pages() -> Vec<Vec<Placed<'static>>> {
    vec![
        vec![
            ("ZIP", 50, 780),
            ("BLDGNO1", 120, 780),
            ("STREET1", 220, 780),
            ("LOT", 400, 780),
            ("10301", 50, 760),
            ("12", 120, 760),
            ("BAY ST", 220, 760),
            ("7", 400, 760),
            ("Page 1", 260, 40),
        ],
        vec![
            ("10302", 50, 780),
            ("4", 120, 780),
            ("OCEAN AVE", 220, 780),
            ("8", 400, 780),
            ("Page 2", 260, 40),
        ],
    ]
}
