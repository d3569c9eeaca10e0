use super::{first_paragraph_after, select_first, selector, text_of};
use crate::error::Result;
use crate::models::breed_info_types::SourceContent;
use scraper::Html;

pub const BASE_URL: &str = "https://www.akc.org/dog-breeds/";

pub fn extract(document: &Html) -> Result<SourceContent> {
    let hero = selector("div.breed-hero-info")?;
    let row = selector("div.attribute-list__row")?;
    let term = selector("div.attribute-list__term")?;
    let description = selector("div.attribute-list__description")?;

    let mut content = SourceContent {
        history: Some(String::new()),
        ..SourceContent::default()
    };

    if let Some(info) = document.select(&hero).next() {
        for stat in info.select(&row) {
            if let (Some(label), Some(value)) = (select_first(stat, &term), select_first(stat, &description)) {
                content.general_info.push((text_of(label), text_of(value)));
            }
        }
    }

    for section_id in ["temperament", "health", "history"] {
        let section = selector(&format!("div#{}", section_id))?;
        let Some(anchor) = document.select(&section).next() else {
            continue;
        };
        if let Some(paragraph) = first_paragraph_after(document, anchor) {
            match section_id {
                "temperament" => content.temperament = paragraph,
                "health" => content.health = paragraph,
                _ => content.history = Some(paragraph),
            }
        }
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="breed-hero-info">
            <div class="attribute-list__row">
              <div class="attribute-list__term">Height</div>
              <div class="attribute-list__description"> 23-24 inches (male) </div>
            </div>
            <div class="attribute-list__row">
              <div class="attribute-list__term">Life Expectancy</div>
              <div class="attribute-list__description">10-12 years</div>
            </div>
            <div class="attribute-list__row">
              <div class="attribute-list__term">Orphan term</div>
            </div>
          </div>
          <div id="temperament"><h3>Temperament</h3></div>
          <p>Friendly,   reliable and trustworthy.</p>
          <div id="health"><p>Generally healthy; screen hips and elbows.</p></div>
        </body></html>
    "#;

    #[test]
    fn extracts_stats_in_page_order() {
        let content = extract(&Html::parse_document(PAGE)).unwrap();
        assert_eq!(
            content.general_info,
            vec![
                ("Height".to_string(), "23-24 inches (male)".to_string()),
                ("Life Expectancy".to_string(), "10-12 years".to_string()),
            ]
        );
    }

    #[test]
    fn sections_take_the_next_paragraph() {
        let content = extract(&Html::parse_document(PAGE)).unwrap();
        assert_eq!(content.temperament, "Friendly, reliable and trustworthy.");
        assert_eq!(content.health, "Generally healthy; screen hips and elbows.");
        assert_eq!(content.history.as_deref(), Some(""));
        assert!(content.care.is_none());
    }

    #[test]
    fn unrelated_page_yields_empty_content() {
        let content = extract(&Html::parse_document("<html><body><h1>Not found</h1></body></html>")).unwrap();
        assert!(content.is_empty());
    }
}
