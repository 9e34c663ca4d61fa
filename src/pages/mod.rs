//! Page objects for the catalog UI.
//!
//! Each page borrows a live [`eoka::Page`] and the test case's [`Report`],
//! and turns semantic operations into element lookups and waits.
//!
//! [`Report`]: crate::Report

mod auth;
mod film_card;
mod search;

pub use auth::AuthPage;
pub use film_card::FilmCardPage;
pub use search::SearchPage;

/// Shared submit control of the login and search forms.
pub const SUBMIT_BUTTON: &str = "button[type='submit']";

/// Error banner used by the login form and the film card.
pub const ERROR_MESSAGE: &str = ".error-message";

/// DOM queries run through `Page::evaluate`.
pub(crate) mod dom {
    use crate::{Error, Result};
    use eoka::Page;

    /// `isVisible(el)`: rendered with a non-empty box and not hidden by style.
    const IS_VISIBLE_JS: &str = r#"
        const isVisible = (el) => {
            const style = getComputedStyle(el);
            if (style.display === 'none' || style.visibility === 'hidden') return false;
            if (parseFloat(style.opacity) === 0) return false;
            const rect = el.getBoundingClientRect();
            return rect.width > 0 && rect.height > 0;
        };
    "#;

    fn quote(s: &str) -> Result<String> {
        Ok(serde_json::to_string(s)?)
    }

    pub async fn count(page: &Page, selector: &str) -> Result<usize> {
        let js = format!(
            "document.querySelectorAll({}).length",
            quote(selector)?
        );
        let n: u64 = page.evaluate(&js).await?;
        Ok(n as usize)
    }

    pub async fn exists(page: &Page, selector: &str) -> Result<bool> {
        let js = format!("!!document.querySelector({})", quote(selector)?);
        Ok(page.evaluate(&js).await?)
    }

    /// Fail with [`Error::ElementNotFound`] unless `selector` matches.
    pub async fn require(page: &Page, selector: &str) -> Result<()> {
        if exists(page, selector).await? {
            Ok(())
        } else {
            Err(Error::ElementNotFound(selector.to_string()))
        }
    }

    /// Rendered text of every match, in document order.
    pub async fn texts(page: &Page, selector: &str) -> Result<Vec<String>> {
        let js = format!(
            r#"JSON.stringify(Array.from(document.querySelectorAll({})).map(el => (el.innerText || '').trim()))"#,
            quote(selector)?
        );
        let json: String = page.evaluate(&js).await?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Rendered text of the first match, if any.
    pub async fn first_text(page: &Page, selector: &str) -> Result<Option<String>> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({});
                return el ? (el.innerText || '').trim() : null;
            }})()"#,
            quote(selector)?
        );
        Ok(page.evaluate(&js).await?)
    }

    /// Text of the first visible match, if any.
    pub async fn visible_text(page: &Page, selector: &str) -> Result<Option<String>> {
        let js = format!(
            r#"(() => {{
                {IS_VISIBLE_JS}
                const el = Array.from(document.querySelectorAll({sel})).find(isVisible);
                return el ? (el.innerText || '').trim() : null;
            }})()"#,
            sel = quote(selector)?
        );
        Ok(page.evaluate(&js).await?)
    }

    /// `(matches, visible matches)` for `selector`.
    pub async fn visibility(page: &Page, selector: &str) -> Result<(usize, usize)> {
        let js = format!(
            r#"(() => {{
                {IS_VISIBLE_JS}
                const all = Array.from(document.querySelectorAll({sel}));
                return JSON.stringify([all.length, all.filter(isVisible).length]);
            }})()"#,
            sel = quote(selector)?
        );
        let json: String = page.evaluate(&js).await?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Empty an input and notify listeners.
    pub async fn clear(page: &Page, selector: &str) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({});
                if (!el) return;
                el.value = '';
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            }})()"#,
            quote(selector)?
        );
        Ok(page.execute(&js).await?)
    }

    /// Click the `index`-th match. Returns false if there is no such match.
    pub async fn click_nth(page: &Page, selector: &str, index: usize) -> Result<bool> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelectorAll({})[{}];
                if (!el) return false;
                el.scrollIntoView({{ block: 'center' }});
                el.click();
                return true;
            }})()"#,
            quote(selector)?,
            index
        );
        Ok(page.evaluate(&js).await?)
    }

    /// Serialized HTML of the whole document.
    pub async fn page_source(page: &Page) -> Result<String> {
        Ok(page
            .evaluate("document.documentElement.outerHTML")
            .await?)
    }
}
