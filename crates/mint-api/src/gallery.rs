//! Coin media gallery

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Animation,
    Video,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub title: &'static str,
    pub url: &'static str,
    pub kind: MediaKind,
}

const fn item(title: &'static str, url: &'static str, kind: MediaKind) -> MediaItem {
    MediaItem { title, url, kind }
}

pub const MEDIA: [MediaItem; 8] = [
    item(
        "Lydia. Electrum One-Third Stater, 12-karat, circa 610–561 BC.",
        "/media/image1.png",
        MediaKind::Image,
    ),
    item(
        "Athens. Silver Tetradrachm with Owl, circa 450–400 BC.",
        "/media/video1.mp4",
        MediaKind::Video,
    ),
    item(
        "Daric, Phase III: Darius II – Artaxerxes II (424–358 BC).",
        "/media/animation1.gif",
        MediaKind::Animation,
    ),
    item(
        "LYDIA. Kroisos. Circa 564/53–550/39 BC. AV Stater.",
        "/media/model1.glb",
        MediaKind::Model,
    ),
    item(
        "Macedonia, Alexander III (the Great), 333–315 BC. AR Tetradrachm.",
        "/media/image2.png",
        MediaKind::Image,
    ),
    item(
        "Rome. Anonymous. Circa 225–214 BC. AR Quadrigatus.",
        "/media/video2.mp4",
        MediaKind::Video,
    ),
    item(
        "China. Zhou Dynasty. Circa 6th–4th century BC. Bronze Knife and Spade Money.",
        "/media/animation2.gif",
        MediaKind::Animation,
    ),
    item(
        "Rome, Julius Caesar. AR Denarius, military mint, 49–48 BC.",
        "/media/model2.glb",
        MediaKind::Model,
    ),
];

/// Cursor over a fixed media list that wraps at both ends
#[derive(Debug, Clone)]
pub struct Gallery {
    items: &'static [MediaItem],
    index: usize,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new(&MEDIA)
    }
}

impl Gallery {
    pub fn new(items: &'static [MediaItem]) -> Self {
        Self { items, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&MediaItem> {
        self.items.get(self.index)
    }

    pub fn next(&mut self) {
        if !self.is_empty() {
            self.index = (self.index + 1) % self.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.is_empty() {
            self.index = (self.index + self.len() - 1) % self.len();
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn view(&self) -> GalleryView {
        GalleryView {
            index: self.index,
            total: self.len(),
            item: self.current().copied(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryView {
    pub index: usize,
    pub total: usize,
    pub item: Option<MediaItem>,
}
