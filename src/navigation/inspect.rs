// src/navigation/inspect.rs

//! Page inspection over parsed HTML.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::DescentStep;
use crate::utils;

use super::Control;

/// Parse a CSS selector, mapping failures to [`AppError::Selector`].
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// A parsed page snapshot.
pub struct PageView {
    document: Html,
}

impl PageView {
    pub fn parse(source: &str) -> Self {
        Self {
            document: Html::parse_document(source),
        }
    }

    /// First element matching `selector`.
    pub fn locate(&self, selector: &str) -> Result<Option<ElementRef<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.document.select(&sel).next())
    }

    /// All elements matching `selector`, in document order.
    pub fn locate_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.document.select(&sel).collect())
    }

    pub fn contains(&self, selector: &str) -> Result<bool> {
        Ok(self.locate(selector)?.is_some())
    }
}

/// Visible text of an element, whitespace-normalized and trimmed.
pub fn text(element: ElementRef<'_>) -> String {
    utils::normalize_whitespace(&element.text().collect::<String>())
}

pub fn attribute(element: ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(str::to_string)
}

/// First descendant of `element` matching `selector`.
pub fn locate_in<'a>(element: ElementRef<'a>, selector: &str) -> Result<Option<ElementRef<'a>>> {
    let sel = parse_selector(selector)?;
    Ok(element.select(&sel).next())
}

/// All descendants of `element` matching `selector`.
pub fn locate_all_in<'a>(element: ElementRef<'a>, selector: &str) -> Result<Vec<ElementRef<'a>>> {
    let sel = parse_selector(selector)?;
    Ok(element.select(&sel).collect())
}

/// Follow a fixed descent path from `start`.
///
/// Each step picks the `index`-th descendant matching its selector. Returns
/// `None` as soon as a step finds nothing.
pub fn descend<'a>(start: ElementRef<'a>, path: &[DescentStep]) -> Result<Option<ElementRef<'a>>> {
    let mut current = start;
    for step in path {
        let sel = parse_selector(&step.selector)?;
        match current.select(&sel).nth(step.index) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// The first link inside `element` as a [`Control`].
pub fn link_control(element: ElementRef<'_>) -> Result<Option<Control>> {
    let link = if element.value().name() == "a" {
        Some(element)
    } else {
        locate_in(element, "a")?
    };
    Ok(link.map(|a| Control {
        text: text(a),
        href: attribute(a, "href"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <table id="outer">
            <tr><td>header</td></tr>
            <tr><td><div><table id="data">
              <tr><th>No</th></tr>
              <tr><td>  first
                  row </td></tr>
            </table></div></td></tr>
          </table>
          <a id="go" href="/next?page=2">Next</a>
        </body></html>
    "#;

    #[test]
    fn test_parse_selector_valid() {
        assert!(parse_selector("div.class").is_ok());
        assert!(parse_selector("td > table > tbody > tr > td").is_ok());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }

    #[test]
    fn descends_fixed_path() {
        let view = PageView::parse(PAGE);
        let outer = view.locate("#outer").unwrap().unwrap();
        let path = vec![
            DescentStep::new("tr", 1),
            DescentStep::new("td", 0),
            DescentStep::new("div", 0),
            DescentStep::new("table", 0),
        ];
        let data = descend(outer, &path).unwrap().unwrap();
        assert_eq!(attribute(data, "id").as_deref(), Some("data"));

        let cells = locate_all_in(data, "td").unwrap();
        assert_eq!(text(cells[0]), "first row");
    }

    #[test]
    fn descent_stops_when_step_missing() {
        let view = PageView::parse(PAGE);
        let outer = view.locate("#outer").unwrap().unwrap();
        let path = vec![DescentStep::new("tr", 9)];
        assert!(descend(outer, &path).unwrap().is_none());
    }

    #[test]
    fn link_control_reads_text_and_href() {
        let view = PageView::parse(PAGE);
        let link = view.locate("#go").unwrap().unwrap();
        let control = link_control(link).unwrap().unwrap();
        assert_eq!(control, Control::link("Next", "/next?page=2"));
        assert!(!view.contains("#missing").unwrap());
    }
}
