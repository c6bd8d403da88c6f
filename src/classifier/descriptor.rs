use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// Kind of media a request carries, and the kind a classifier is trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            other => Err(format!("unsupported media type '{other}'")),
        }
    }
}

/// A remote classifier endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierDescriptor {
    pub name: String,
    pub endpoint: String,
    pub media_kind: MediaKind,
}

impl ClassifierDescriptor {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, media_kind: MediaKind) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            media_kind,
        }
    }

    /// Parses one model-list entry.
    ///
    /// `name=url` pins an explicit endpoint; a bare `name` resolves to `{base_url}/{name}`.
    pub fn parse_entry(
        entry: &str,
        base_url: &str,
        media_kind: MediaKind,
    ) -> Result<Self, ClassifierError> {
        let entry = entry.trim();
        let (name, endpoint) = match entry.split_once('=') {
            Some((name, url)) => (name.trim().to_string(), url.trim().to_string()),
            None => (
                entry.to_string(),
                format!("{}/{}", base_url.trim_end_matches('/'), entry),
            ),
        };

        if name.is_empty() {
            return Err(ClassifierError::InvalidDescriptor {
                entry: entry.to_string(),
                reason: "model name is empty".to_string(),
            });
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ClassifierError::InvalidDescriptor {
                entry: entry.to_string(),
                reason: format!("endpoint '{endpoint}' is not an http(s) URL"),
            });
        }

        Ok(Self::new(name, endpoint, media_kind))
    }
}

/// Ordered, immutable image and video classifier lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierCatalog {
    image: Vec<ClassifierDescriptor>,
    video: Vec<ClassifierDescriptor>,
}

impl ClassifierCatalog {
    pub fn new(image: Vec<ClassifierDescriptor>, video: Vec<ClassifierDescriptor>) -> Self {
        Self { image, video }
    }

    /// Builds a catalog from model-list entries (see [`ClassifierDescriptor::parse_entry`]).
    pub fn from_entries<S: AsRef<str>>(
        image_entries: &[S],
        video_entries: &[S],
        base_url: &str,
    ) -> Result<Self, ClassifierError> {
        Ok(Self {
            image: parse_list(image_entries, base_url, MediaKind::Image)?,
            video: parse_list(video_entries, base_url, MediaKind::Video)?,
        })
    }

    pub fn image(&self) -> &[ClassifierDescriptor] {
        &self.image
    }

    pub fn video(&self) -> &[ClassifierDescriptor] {
        &self.video
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty() && self.video.is_empty()
    }

    /// Candidates for `kind` in query priority order.
    ///
    /// Video requests try the video classifiers first and fall back to the image ones.
    pub fn candidates(&self, kind: MediaKind) -> Vec<&ClassifierDescriptor> {
        match kind {
            MediaKind::Video => self.video.iter().chain(self.image.iter()).collect(),
            MediaKind::Image => self.image.iter().collect(),
        }
    }
}

fn parse_list<S: AsRef<str>>(
    entries: &[S],
    base_url: &str,
    media_kind: MediaKind,
) -> Result<Vec<ClassifierDescriptor>, ClassifierError> {
    entries
        .iter()
        .map(|e| e.as_ref().trim())
        .filter(|e| !e.is_empty())
        .map(|e| ClassifierDescriptor::parse_entry(e, base_url, media_kind))
        .collect()
}
