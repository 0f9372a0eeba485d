//! Built-in lines for local speech
//!
//! With no remote controller attached the avatar can still talk: each
//! request speaks the next line of a fixed list, wrapping at the end.

/// A display text and how it is pronounced (empty means "as displayed")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechLine {
    pub display: String,
    pub phonetic: String,
}

impl SpeechLine {
    pub fn new(display: impl Into<String>, phonetic: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            phonetic: phonetic.into(),
        }
    }
}

const BUILTIN: &[(&str, &str)] = &[
    ("こんにちは", ""),
    ("元気ですか？", "げんきですか？"),
    ("私はスタックチャンです", "わたしはすたっくちゃんです"),
    ("よろしくお願いします", "よろしくおねがいします"),
    ("ありがとうございます", ""),
    ("今日はとても良いお天気ですね", "きょうはとてもよいおてんきですね"),
    (
        "テキストスクロール機能をテストしています",
        "てきすとすくろーるきのうをてすとしています",
    ),
    (
        "長いセリフも問題なく表示できるはずです",
        "ながいせりふももんだいなくひょうじできるはずです",
    ),
    ("９文字以上の文字はスクロールします", "きゅうもじいじょうのもじはすくろーるします"),
    (
        "改行コードを使うと\n分割表示もできます",
        "かいぎょうこーどをつかうと\nぶんかつひょうじもできます",
    ),
    ("古池や\n蛙飛びこむ\n水の音", "ふるいけや\nかわずとびこむ\nみずのおと"),
];

/// Cycling list of lines
#[derive(Debug, Clone)]
pub struct Playlist {
    lines: Vec<SpeechLine>,
    cursor: usize,
}

impl Default for Playlist {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Playlist {
    pub fn new(lines: Vec<SpeechLine>) -> Self {
        Self { lines, cursor: 0 }
    }

    /// The stock greeting and demo lines
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|(display, phonetic)| SpeechLine::new(*display, *phonetic))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the line `next_line` will return
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// The next line, wrapping to the first after the last
    pub fn next_line(&mut self) -> Option<&SpeechLine> {
        if self.lines.is_empty() {
            return None;
        }
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.lines.len();
        self.lines.get(index)
    }
}
