//! JSON story documents.
//!
//! ```json
//! { "title": "Fred and Max", "cover_image": "cover.png",
//!   "pages": [ { "images": ["p1.png"], "sentences": ["Fred likes to dig."] } ] }
//! ```

use crate::defaults;
use crate::error::Result;
use crate::script::{Page, ScriptModel, Sentence};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDocument {
    pub title: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub pages: Vec<StoryPage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoryPage {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sentences: Vec<String>,
}

impl StoryDocument {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Build the script.
    ///
    /// With `include_covers`, a front page reading the title and a back page
    /// reading "The End" wrap the content pages, both showing the cover image.
    pub fn into_script(self, include_covers: bool) -> Result<ScriptModel> {
        let cover: Vec<String> = self.cover_image.iter().cloned().collect();
        let mut pages = Vec::with_capacity(self.pages.len() + 2);

        if include_covers {
            pages.push(Page::new(
                vec![Sentence::from_text(&self.title)],
                cover.clone(),
            ));
        }

        for page in self.pages {
            let sentences = page
                .sentences
                .iter()
                .filter(|s| !s.trim().is_empty())
                .map(|s| Sentence::from_text(s))
                .collect();
            pages.push(Page::new(sentences, page.images));
        }

        if include_covers {
            pages.push(Page::new(
                vec![Sentence::from_text(defaults::BACK_COVER_TEXT)],
                cover,
            ));
        }

        ScriptModel::new(pages)
    }
}
