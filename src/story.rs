//! Story data provider: chapters, their order, and their content.

use anyhow::{Context, Result, anyhow, bail};
use readaloud_core::{ChapterContext, ContentKind};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Story {
    #[serde(default)]
    pub title: String,
    pub chapters: Vec<StoryChapter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryChapter {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub kind: ContentKind,
    /// HTML-ish chapter body, or image references for image chapters.
    #[serde(default)]
    pub content: String,
}

impl Story {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Reading story file {}", path.display()))?;
        let story = Self::parse(&data).with_context(|| format!("Parsing {}", path.display()))?;
        info!(
            path = %path.display(),
            title = %story.title,
            chapters = story.chapters.len(),
            "Loaded story"
        );
        Ok(story)
    }

    pub fn parse(data: &str) -> Result<Self> {
        let story: Story = serde_json::from_str(data)?;
        if story.chapters.is_empty() {
            bail!("story has no chapters");
        }
        let mut seen = HashSet::new();
        for chapter in &story.chapters {
            if chapter.id.trim().is_empty() {
                bail!("chapter with empty id");
            }
            if !seen.insert(chapter.id.as_str()) {
                bail!("duplicate chapter id {}", chapter.id);
            }
        }
        Ok(story)
    }

    pub fn first_chapter_id(&self) -> &str {
        self.chapters
            .first()
            .map(|chapter| chapter.id.as_str())
            .unwrap_or_default()
    }

    fn index_of(&self, chapter_id: &str) -> Option<usize> {
        self.chapters.iter().position(|chapter| chapter.id == chapter_id)
    }

    pub fn chapter(&self, chapter_id: &str) -> Option<&StoryChapter> {
        self.index_of(chapter_id).map(|idx| &self.chapters[idx])
    }

    /// Chapter plus its neighbours, in the shape the read-aloud core expects.
    pub fn context_for(&self, chapter_id: &str, autoplay: bool) -> Result<(ChapterContext, &str)> {
        let idx = self
            .index_of(chapter_id)
            .ok_or_else(|| anyhow!("Unknown chapter id {chapter_id}"))?;
        let chapter = &self.chapters[idx];
        let previous = idx
            .checked_sub(1)
            .and_then(|prev| self.chapters.get(prev))
            .map(|chapter| chapter.id.clone());
        let next = self.chapters.get(idx + 1).map(|chapter| chapter.id.clone());

        let context = ChapterContext::new(chapter.id.clone())
            .with_previous(previous)
            .with_next(next)
            .with_kind(chapter.kind)
            .with_autoplay(autoplay);
        Ok((context, chapter.content.as_str()))
    }
}
