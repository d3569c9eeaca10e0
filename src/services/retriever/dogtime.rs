use super::{select_first, selector, text_of};
use crate::error::Result;
use crate::models::breed_info_types::SourceContent;
use scraper::Html;

pub const BASE_URL: &str = "https://dogtime.com/dog-breeds/";

pub fn extract(document: &Html) -> Result<SourceContent> {
    let stat_box = selector("div.vital-stat-box")?;
    let stat = selector("div.vital-stat")?;
    let stat_name = selector("span.vital-stat-name")?;
    let stat_value = selector("span.vital-stat-value")?;
    let ratings = selector("div.breed-characteristics-ratings-wrapper")?;
    let header = selector("h2")?;
    let title = selector("div.characteristic-title")?;
    let star_block = selector("div.characteristic-star-block")?;
    let health_section = selector("section.health-section")?;
    let paragraph = selector("p")?;

    let mut content = SourceContent {
        care: Some(String::new()),
        ..SourceContent::default()
    };

    if let Some(vitals) = document.select(&stat_box).next() {
        for item in vitals.select(&stat) {
            if let (Some(name), Some(value)) = (select_first(item, &stat_name), select_first(item, &stat_value)) {
                content.general_info.push((text_of(name), text_of(value)));
            }
        }
    }

    for section in document.select(&ratings) {
        let Some(heading) = select_first(section, &header) else {
            continue;
        };
        let heading = text_of(heading);

        if heading.contains("Personality") {
            content.temperament = section
                .select(&title)
                .map(text_of)
                .collect::<Vec<_>>()
                .join(", ");
        } else if heading.contains("Care") {
            let items: Vec<String> = section
                .select(&star_block)
                .filter_map(|block| select_first(block, &title))
                .map(text_of)
                .collect();
            content.care = Some(items.join(", "));
        }
    }

    if let Some(health) = document.select(&health_section).next() {
        if let Some(p) = select_first(health, &paragraph) {
            content.health = text_of(p);
        }
    }

    Ok(content)
}
