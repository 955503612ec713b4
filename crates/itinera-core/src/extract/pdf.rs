use std::fmt::Display;

use lopdf::Document;

use super::ExtractError;

/// Extract the text of every page, in page order. Pages without text
/// yield an empty string.
///
/// A document that cannot be loaded is an error. A page that fails stops
/// the scan; the pages read before it are returned with that error.
pub(super) fn read_pages(
    data: &[u8],
) -> Result<(Vec<String>, Option<ExtractError>), ExtractError> {
    let doc = Document::load_mem(data).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let pages = doc.get_pages();
    let (texts, error) = collect_pages(
        pages
            .keys()
            .map(|&number| (number, doc.extract_text(&[number]))),
    );

    tracing::debug!(pages = texts.len(), failed = error.is_some(), "extracted text from pdf");
    Ok((texts, error))
}

fn collect_pages<E: Display>(
    pages: impl IntoIterator<Item = (u32, Result<String, E>)>,
) -> (Vec<String>, Option<ExtractError>) {
    let mut texts = Vec::new();
    for (number, result) in pages {
        match result {
            Ok(text) => texts.push(text),
            Err(e) => return (texts, Some(ExtractError::Pdf(format!("page {number}: {e}")))),
        }
    }
    (texts, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_before_a_failure_are_kept() {
        let pages = vec![
            (1, Ok("cultura".to_owned())),
            (2, Ok(String::new())),
            (3, Err("bad font")),
            (4, Ok("nunca".to_owned())),
        ];
        let (texts, error) = collect_pages(pages);
        assert_eq!(texts, ["cultura", ""]);
        let error = error.expect("third page should fail");
        assert_eq!(error.to_string(), "page 3: bad font");
    }

    #[test]
    fn all_pages_read_without_error() {
        let pages: Vec<(u32, Result<String, &str>)> =
            vec![(1, Ok("a".to_owned())), (2, Ok("b".to_owned()))];
        let (texts, error) = collect_pages(pages);
        assert_eq!(texts, ["a", "b"]);
        assert!(error.is_none());
    }
}
