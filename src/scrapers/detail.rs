use crate::heuristics::{extract_square_feet, squash_whitespace};
use crate::scrapers::traits::HtmlFetcher;
use crate::scrapers::types::PauseRange;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static ATTRIBUTES_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".attrgroup, .mapAndAttrs, .attr").unwrap());

/// Fills in square footage from a listing's detail page
pub struct DetailEnricher<'a> {
    fetcher: &'a dyn HtmlFetcher,
    pause: PauseRange,
}

impl<'a> DetailEnricher<'a> {
    pub fn new(fetcher: &'a dyn HtmlFetcher, pause: PauseRange) -> Self {
        Self { fetcher, pause }
    }

    /// Square footage from the detail page, or `None` on any failure
    pub async fn square_feet(&self, url: &str) -> Option<u32> {
        self.pause.wait().await;

        let response = match self.fetcher.fetch(url).await {
            Ok(response) => response,
            Err(e) => {
                debug!("Detail fetch failed for {}: {}", url, e);
                return None;
            }
        };

        if !response.is_ok() {
            debug!("Detail page {} returned status {}", url, response.status);
            return None;
        }
        if response.is_block_page() {
            debug!("Detail page {} is a block page", url);
            return None;
        }

        square_feet_from_detail_html(&response.body)
    }
}

/// Attribute block first, whole page text second
pub fn square_feet_from_detail_html(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);

    let attributes = document
        .select(&ATTRIBUTES_SELECTOR)
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join(" ");

    extract_square_feet(&squash_whitespace(&attributes)).or_else(|| {
        let page_text = document.root_element().text().collect::<Vec<_>>().join(" ");
        extract_square_feet(&squash_whitespace(&page_text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedFetcher;

    const DETAIL_URL: &str = "https://losangeles.craigslist.org/sfv/apa/d/woodland-hills/7711111111.html";

    #[test]
    fn attributes_block_takes_precedence() {
        let html = r#"<html><body>
            <section id="postingbody">Huge 2400 sqft lot</section>
            <div class="mapAndAttrs"><p class="attrgroup"><span>2BR / 1Ba</span><span>875ft2</span></p></div>
        </body></html>"#;
        assert_eq!(square_feet_from_detail_html(html), Some(875));
    }

    #[test]
    fn falls_back_to_page_text() {
        let html = r#"<html><body>
            <p class="attrgroup"><span>cats are OK - purrr</span></p>
            <section id="postingbody">Bright unit, about 1,000 ... 980 sq ft total</section>
        </body></html>"#;
        assert_eq!(square_feet_from_detail_html(html), Some(980));
    }

    #[test]
    fn nothing_found_is_none() {
        assert_eq!(square_feet_from_detail_html("<html><body>hello</body></html>"), None);
    }

    #[tokio::test]
    async fn failures_degrade_to_none() {
        let fetcher = ScriptedFetcher::new()
            .with_page(DETAIL_URL, 404, "<p class=\"attrgroup\">900ft2</p>");
        let enricher = DetailEnricher::new(&fetcher, PauseRange::NONE);
        assert_eq!(enricher.square_feet(DETAIL_URL).await, None);

        let blocked = ScriptedFetcher::new().with_page(
            DETAIL_URL,
            200,
            "<p>Your request has been blocked. 900ft2</p>",
        );
        let enricher = DetailEnricher::new(&blocked, PauseRange::NONE);
        assert_eq!(enricher.square_feet(DETAIL_URL).await, None);

        let unreachable = ScriptedFetcher::new();
        let enricher = DetailEnricher::new(&unreachable, PauseRange::NONE);
        assert_eq!(enricher.square_feet(DETAIL_URL).await, None);
    }

    #[tokio::test]
    async fn reads_square_feet_from_detail_page() {
        let fetcher = ScriptedFetcher::new().with_page(
            DETAIL_URL,
            200,
            "<html><body><p class=\"attrgroup\"><span>1BR / 1Ba</span><span>640ft2</span></p></body></html>",
        );
        let enricher = DetailEnricher::new(&fetcher, PauseRange::NONE);
        assert_eq!(enricher.square_feet(DETAIL_URL).await, Some(640));
        assert_eq!(fetcher.requests(), vec![DETAIL_URL.to_string()]);
    }
}
