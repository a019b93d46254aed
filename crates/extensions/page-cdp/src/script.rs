//! JavaScript generated for each document capability.
//!
//! Landmarks resolve to a [`Locator`] built from the configured selectors.
//! Locators and arguments are embedded as JSON literals, so selector and
//! prompt text never needs manual escaping.

use automator_config::SelectorsConfig;
use automator_page::Landmark;
use serde::Serialize;

/// How a landmark is found in the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// First selector with any match wins.
    Css { selectors: Vec<String> },
    /// Elements matching `selector` whose text contains every keyword.
    MenuItem {
        selector: String,
        keywords: Vec<String>,
    },
    /// Items inside the first matching container.
    InContainer {
        container: Vec<String>,
        item: Vec<String>,
    },
    Body,
}

/// Resolves `__all(locator)` to an array of elements.
const PRELUDE: &str = r#"const __all = (loc) => {
  const pick = (root, sels) => {
    for (const s of sels) {
      const found = root.querySelectorAll(s);
      if (found.length) return Array.from(found);
    }
    return [];
  };
  switch (loc.kind) {
    case 'body': return document.body ? [document.body] : [];
    case 'css': return pick(document, loc.selectors);
    case 'menu_item':
      return Array.from(document.querySelectorAll(loc.selector))
        .filter((el) => loc.keywords.every((k) => (el.textContent || '').includes(k)));
    case 'in_container': {
      const box = pick(document, loc.container)[0];
      return box ? pick(box, loc.item) : [];
    }
  }
  return [];
};"#;

/// Script builder for one selector configuration.
#[derive(Debug, Clone)]
pub struct Scripts {
    selectors: SelectorsConfig,
}

impl Scripts {
    pub fn new(selectors: SelectorsConfig) -> Self {
        Self { selectors }
    }

    /// Locator of `landmark`.
    pub fn locator(&self, landmark: Landmark) -> Locator {
        let s = &self.selectors;
        let css = |selectors: &[String]| Locator::Css {
            selectors: selectors.to_vec(),
        };
        match landmark {
            Landmark::FileInput => css(std::slice::from_ref(&s.file_input)),
            Landmark::UploadButton => css(std::slice::from_ref(&s.upload_button)),
            Landmark::ModelSelector => css(std::slice::from_ref(&s.model_selector)),
            Landmark::VideoModeOption => Locator::MenuItem {
                selector: s.menu_item.clone(),
                keywords: s.video_menu_keywords.clone(),
            },
            Landmark::AspectRatioButton(ratio) => Locator::Css {
                selectors: vec![s.aspect_ratio_button_for(ratio.as_str())],
            },
            Landmark::BackButton => css(std::slice::from_ref(&s.back_button)),
            Landmark::Video => css(std::slice::from_ref(&s.video)),
            Landmark::EditPrompt => css(&s.edit_textarea),
            Landmark::SubmitButton => css(&s.submit_button),
            Landmark::Sidebar => css(&s.sidebar),
            Landmark::Thumbnail | Landmark::ReferenceThumbnail => Locator::InContainer {
                container: s.sidebar.clone(),
                item: s.thumbnail.clone(),
            },
            Landmark::Body => Locator::Body,
        }
    }

    /// Wrap `body` in a function with `el` bound to the first element of
    /// `landmark` and `all` to every element.
    fn with_elements(&self, landmark: Landmark, body: &str) -> String {
        let locator = json_literal(&self.locator(landmark));
        format!(
            "(() => {{\n{}\nconst all = __all({});\nconst el = all[0] || null;\n{}\n}})()",
            PRELUDE, locator, body
        )
    }

    pub fn location(&self) -> String {
        "window.location.href".to_string()
    }

    pub fn exists(&self, landmark: Landmark) -> String {
        self.with_elements(landmark, "return all.length > 0;")
    }

    pub fn count(&self, landmark: Landmark) -> String {
        self.with_elements(landmark, "return all.length;")
    }

    pub fn text(&self, landmark: Landmark) -> String {
        self.with_elements(landmark, "return el ? (el.textContent || '') : null;")
    }

    pub fn click(&self, landmark: Landmark) -> String {
        self.with_elements(landmark, "if (!el) return false;\nel.click();\nreturn true;")
    }

    pub fn set_value(&self, landmark: Landmark, value: &str) -> String {
        let body = format!(
            r#"if (!el) return false;
el.focus();
const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
setter.call(el, {});
el.dispatchEvent(new Event('input', {{ bubbles: true }}));
el.dispatchEvent(new Event('change', {{ bubbles: true }}));
return true;"#,
            json_literal(&value)
        );
        self.with_elements(landmark, &body)
    }

    pub fn press_enter(&self, landmark: Landmark) -> String {
        let body = r#"if (!el) return false;
const init = { key: 'Enter', code: 'Enter', keyCode: 13, which: 13, bubbles: true, cancelable: true };
for (const type of ['keydown', 'keypress', 'keyup']) {
  el.dispatchEvent(new KeyboardEvent(type, init));
}
return true;"#;
        self.with_elements(landmark, body)
    }

    pub fn attach_file(&self, landmark: Landmark, name: &str, mime: &str, base64: &str) -> String {
        let body = format!(
            r#"if (!el) return false;
const raw = atob({});
const bytes = new Uint8Array(raw.length);
for (let i = 0; i < raw.length; i++) bytes[i] = raw.charCodeAt(i);
const file = new File([bytes], {}, {{ type: {} }});
const transfer = new DataTransfer();
transfer.items.add(file);
el.files = transfer.files;
el.dispatchEvent(new Event('change', {{ bubbles: true }}));
return true;"#,
            json_literal(&base64),
            json_literal(&name),
            json_literal(&mime)
        );
        self.with_elements(landmark, &body)
    }

    pub fn media(&self, landmark: Landmark) -> String {
        self.with_elements(
            landmark,
            "if (!el) return null;\nreturn { src: el.currentSrc || el.src || '', readyState: el.readyState || 0 };",
        )
    }

    /// Thumbnails whose image has a source, with their display index.
    pub fn thumbnails(&self) -> String {
        self.with_elements(
            Landmark::Thumbnail,
            r#"return all
  .map((button, index) => {
    const img = button.querySelector('img');
    return img && img.src ? { src: img.src, alt: img.alt || '', index } : null;
  })
  .filter((t) => t !== null);"#,
        )
    }

    pub fn fetch_data_url(&self, url: &str) -> String {
        format!(
            r#"(async () => {{
const response = await fetch({}, {{ credentials: 'include' }});
if (!response.ok) throw new Error('HTTP ' + response.status);
const blob = await response.blob();
return await new Promise((resolve, reject) => {{
  const reader = new FileReader();
  reader.onload = () => resolve(reader.result);
  reader.onerror = () => reject(reader.error);
  reader.readAsDataURL(blob);
}});
}})()"#,
            json_literal(&url)
        )
    }

    /// Structural description of the edit view.
    pub fn describe(&self) -> String {
        let sidebar = json_literal(&self.locator(Landmark::Sidebar));
        let thumbnails = json_literal(&self.locator(Landmark::Thumbnail));
        let prompt = json_literal(&self.locator(Landmark::EditPrompt));
        let submit = json_literal(&self.locator(Landmark::SubmitButton));
        format!(
            r#"(() => {{
{}
const label = (el) => ({{
  tag: el.tagName.toLowerCase(),
  ariaLabel: el.getAttribute('aria-label'),
  placeholder: el.getAttribute('placeholder'),
  text: (el.textContent || '').trim().slice(0, 50),
}});
return {{
  url: window.location.href,
  textareas: Array.from(document.querySelectorAll('textarea')).map(label),
  labelledButtons: Array.from(document.querySelectorAll('button[aria-label]')).slice(0, 30).map(label),
  editPromptFound: __all({}).length > 0,
  submitButtonFound: __all({}).length > 0,
  sidebarFound: __all({}).length > 0,
  thumbnailCount: __all({}).length,
}};
}})()"#,
            PRELUDE, prompt, submit, sidebar, thumbnails
        )
    }
}

/// Serialize `value` as a JavaScript literal.
fn json_literal<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
