//! Emoji categories and the symbol provider feeding the level generator.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Emoji categories in level-progression order; levels cycle through all
/// eight, so level 1 draws from people, level 2 from foods, and level 9 wraps
/// back to people.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmojiCategory {
    People,
    Foods,
    Activity,
    Places,
    Nature,
    Objects,
    Symbols,
    Flags,
}

pub const CATEGORY_ORDER: [EmojiCategory; 8] = [
    EmojiCategory::People,
    EmojiCategory::Foods,
    EmojiCategory::Activity,
    EmojiCategory::Places,
    EmojiCategory::Nature,
    EmojiCategory::Objects,
    EmojiCategory::Symbols,
    EmojiCategory::Flags,
];

impl EmojiCategory {
    /// Cyclic category for a 1-based level number.
    pub const fn for_level(level: u32) -> Self {
        CATEGORY_ORDER[(level.saturating_sub(1) % CATEGORY_ORDER.len() as u32) as usize]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::People => "people",
            Self::Foods => "foods",
            Self::Activity => "activity",
            Self::Places => "places",
            Self::Nature => "nature",
            Self::Objects => "objects",
            Self::Symbols => "symbols",
            Self::Flags => "flags",
        }
    }

    /// Curated fallback pool for this category.
    pub(crate) const fn curated(self) -> &'static [&'static str] {
        match self {
            Self::People => &[
                "😀", "😊", "😍", "🤔", "😎", "🤩", "😴", "🤗", "🙂", "😉", "😋", "😌", "😏",
                "🤤", "😇", "🥰", "🤪", "🥳", "🤫", "🤭",
            ],
            Self::Foods => &[
                "🍎", "🍊", "🍋", "🍌", "🍉", "🍇", "🍓", "🫐", "🍈", "🍒", "🥭", "🍑", "🥑",
                "🍆", "🥕", "🌽", "🥒", "🥬", "🥦", "🍄",
            ],
            Self::Activity => &[
                "⚽", "🏀", "🏈", "⚾", "🎾", "🏐", "🏉", "🎱", "🏓", "🏸", "🥅", "⛳", "🪃",
                "🥏", "🏏", "🏑", "🥍", "🏒", "⛸️", "🥌",
            ],
            Self::Places => &[
                "🚗", "🚕", "🚙", "🚌", "🚎", "🏎️", "🚓", "🚑", "🚒", "🚐", "🛻", "🚚", "🚛",
                "🚜", "🏍️", "🛵", "🚲", "🛴", "🚁", "✈️",
            ],
            Self::Nature => &[
                "🌸", "🌺", "🌻", "🌷", "🌹", "🌼", "🌵", "🌲", "🌳", "🌴", "🐶", "🐱", "🐭",
                "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯",
            ],
            Self::Objects => &[
                "📱", "💻", "⌚", "📷", "🎧", "🎮", "🕹️", "📺", "📻", "📞", "💡", "🔋", "🔌",
                "💰", "💎", "⚽", "🎯", "🎲", "🧸", "🎪",
            ],
            Self::Symbols => &[
                "❤️", "💙", "💚", "💛", "🧡", "💜", "🖤", "🤍", "🤎", "💔", "❣️", "💕", "💖",
                "💗", "💘", "💝", "💞", "💟", "☮️", "✝️",
            ],
            Self::Flags => &[
                "🏁", "🚩", "🎌", "🏴", "🏳️", "🏴‍☠️", "🏳️‍🌈", "🏳️‍⚧️", "🇺🇸", "🇬🇧", "🇫🇷", "🇩🇪", "🇮🇹",
                "🇪🇸", "🇯🇵", "🇰🇷", "🇨🇳", "🇮🇳", "🇧🇷", "🇨🇦",
            ],
        }
    }
}

/// External emoji data source queried by category.
///
/// Absence (`None`) or shortfall is absorbed by the curated pools; the
/// provider never surfaces a source failure to its caller.
pub trait SymbolSource {
    fn symbols_in_category(&self, category: EmojiCategory) -> Option<Vec<String>>;
}

/// Source that only ever serves the built-in curated pools.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CuratedSource;

impl SymbolSource for CuratedSource {
    fn symbols_in_category(&self, _category: EmojiCategory) -> Option<Vec<String>> {
        None
    }
}

/// Maps a level number to its category and serves a shuffled set of distinct
/// symbols for it.
#[derive(Clone, Debug, Default)]
pub struct EmojiProvider<S = CuratedSource> {
    source: S,
}

impl EmojiProvider {
    pub fn new() -> Self {
        Self::with_source(CuratedSource)
    }
}

impl<S: SymbolSource> EmojiProvider<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Returns exactly `count` distinct symbols for `level`; never fails.
    ///
    /// Preference order: the external source's pool for the level's category,
    /// then the curated pool, then the combined pools of every category, and
    /// as a last resort synthesized placeholders.
    pub fn symbols_for_level<R: Rng>(&self, level: u32, count: usize, rng: &mut R) -> Vec<String> {
        let category = EmojiCategory::for_level(level);

        let mut pool = match self.source.symbols_in_category(category) {
            Some(symbols) => dedup(symbols),
            None => Vec::new(),
        };
        if pool.len() < count {
            if !pool.is_empty() {
                log::warn!(
                    "symbol source served {} unique symbols for {}, need {}, using curated pool",
                    pool.len(),
                    category.as_str(),
                    count
                );
            }
            pool = category.curated().iter().map(|s| (*s).to_string()).collect();
        }

        pool.shuffle(rng);
        pool.truncate(count);
        if pool.len() < count {
            extend_with_neutral(&mut pool, count, rng);
        }
        pool
    }
}

fn dedup(symbols: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        if !unique.contains(&symbol) {
            unique.push(symbol);
        }
    }
    unique
}

/// Tops `pool` up to `count` distinct entries from the combined category
/// pools, synthesizing placeholders once even those run out.
fn extend_with_neutral<R: Rng>(pool: &mut Vec<String>, count: usize, rng: &mut R) {
    log::warn!(
        "curated pool exhausted at {} symbols, need {}, extending from neutral pool",
        pool.len(),
        count
    );

    let mut neutral: Vec<String> = CATEGORY_ORDER
        .iter()
        .flat_map(|category| category.curated().iter())
        .map(|s| (*s).to_string())
        .collect();
    neutral.shuffle(rng);

    for symbol in neutral {
        if pool.len() >= count {
            return;
        }
        if !pool.contains(&symbol) {
            pool.push(symbol);
        }
    }

    let mut serial = 0u64;
    while pool.len() < count {
        let placeholder = format!("pair-{serial}");
        if !pool.contains(&placeholder) {
            pool.push(placeholder);
        }
        serial += 1;
    }
}
