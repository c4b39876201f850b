//! Deterministic pseudonyms.
//!
//! A seed picks a word pattern, the pattern picks words, and the seed picks a
//! capitalization style. Everything is a pure function of the seed string so
//! two unrelated processes holding the same seed print the same name.

static ADJECTIVES: &[&str] = &[
    "amber", "brisk", "calm", "clever", "cosmic", "crisp", "daring", "deft", "eager", "fierce",
    "gentle", "gritty", "hardy", "humble", "jolly", "keen", "lively", "lucid", "lucky", "lunar",
    "mellow", "merry", "nimble", "noble", "patient", "plucky", "quick", "quiet", "radiant",
    "rapid", "restless", "rugged", "savvy", "serene", "sharp", "shrewd", "spry", "steady",
    "stellar", "stoic", "sturdy", "sunny", "swift", "tidy", "upbeat", "vivid", "witty", "zesty",
];

static NATURE: &[&str] = &[
    "aurora", "basin", "bay", "blossom", "brook", "canyon", "cedar", "cliff", "cloud", "comet",
    "coral", "creek", "dawn", "delta", "dune", "ember", "fern", "fjord", "frost", "glacier",
    "grove", "harbor", "heath", "island", "lagoon", "meadow", "mesa", "moss", "nebula", "orbit",
    "pebble", "pine", "prairie", "quartz", "reef", "ridge", "river", "shore", "sparrow",
    "spruce", "summit", "thicket", "tide", "tundra", "valley", "willow", "world", "zephyr",
];

static GIVEN: &[&str] = &[
    "abe", "agnes", "bart", "bebe", "butters", "carl", "chef", "clyde", "craig", "edna", "gil",
    "homer", "ike", "jimbo", "kenny", "kyle", "lenny", "lisa", "maggie", "marge", "milhouse",
    "moe", "ned", "nelson", "otto", "patty", "ralph", "selma", "stan", "tweek", "wendy", "willie",
];

static FAMILY: &[&str] = &[
    "bouvier", "brockman", "broflovski", "burns", "cartman", "chalmers", "flanders", "frink",
    "griffin", "gumble", "hibbert", "krabappel", "lovejoy", "marsh", "mccormick", "muntz",
    "quagmire", "quimby", "simpson", "skinner", "smithers", "spuckler", "stotch", "szyslak",
    "tucker", "valmer", "wiggum", "wolfcastle",
];

/// Cartoon names used for the character slot: given names then family names.
fn characters() -> impl Iterator<Item = &'static str> {
    GIVEN.iter().chain(FAMILY.iter()).copied()
}

/// 32-bit FNV-1a. Stable across platforms and builds.
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u32::from(*b)).wrapping_mul(PRIME))
}

fn hash_str(s: &str) -> u32 {
    fnv1a32(s.as_bytes())
}

fn index(hash: u32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (hash as usize) % len
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Word pattern; every pattern yields two words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    AdjectiveNature,
    AdjectiveCharacter,
    AdjectiveFamily,
    GivenFamily,
    NatureNature,
}

impl Pattern {
    pub const ALL: [Pattern; 5] = [
        Pattern::AdjectiveNature,
        Pattern::AdjectiveCharacter,
        Pattern::AdjectiveFamily,
        Pattern::GivenFamily,
        Pattern::NatureNature,
    ];

    fn slots(self) -> [Slot; 2] {
        match self {
            Self::AdjectiveNature => [Slot::Adjective, Slot::Nature],
            Self::AdjectiveCharacter => [Slot::Adjective, Slot::Character],
            Self::AdjectiveFamily => [Slot::Adjective, Slot::Family],
            Self::GivenFamily => [Slot::Given, Slot::Family],
            Self::NatureNature => [Slot::Nature, Slot::Nature],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Adjective,
    Nature,
    Given,
    Family,
    Character,
}

impl Slot {
    fn pick(self, hash: u32) -> &'static str {
        match self {
            Self::Adjective => ADJECTIVES[index(hash, ADJECTIVES.len())],
            Self::Nature => NATURE[index(hash, NATURE.len())],
            Self::Given => GIVEN[index(hash, GIVEN.len())],
            Self::Family => FAMILY[index(hash, FAMILY.len())],
            Self::Character => {
                let count = GIVEN.len() + FAMILY.len();
                characters().nth(index(hash, count)).unwrap_or("homer")
            }
        }
    }
}

/// Pattern for `seed`. Uses the upper hash bits so it varies independently
/// of [`style_for`].
pub fn select_pattern(seed: &str) -> Pattern {
    Pattern::ALL[index(hash_str(seed) >> 8, Pattern::ALL.len())]
}

/// Words for `seed` under `pattern`, all lowercase.
pub fn generate(seed: &str, pattern: Pattern) -> Vec<String> {
    pattern
        .slots()
        .iter()
        .enumerate()
        .map(|(i, slot)| slot.pick(hash_str(&format!("{seed}#{i}"))).to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// `ember-world` (all-lowercase, hyphenated; also plain kebab-case)
    Hyphenated,
    /// `ember_world`
    Snake,
    /// `EmberWorld`
    Camel,
    /// `emberWorld`
    LowerCamel,
    /// `Ember-World`
    TitleKebab,
    /// `ember-world-07`
    NumericSuffix,
}

impl Style {
    pub const ALL: [Style; 6] = [
        Style::Hyphenated,
        Style::Snake,
        Style::Camel,
        Style::LowerCamel,
        Style::TitleKebab,
        Style::NumericSuffix,
    ];

    pub fn apply(self, seed: &str, words: &[String]) -> String {
        match self {
            Self::Hyphenated => words.join("-"),
            Self::Snake => words.join("_"),
            Self::Camel => words.iter().map(|w| capitalize(w)).collect(),
            Self::LowerCamel => words
                .iter()
                .enumerate()
                .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
                .collect(),
            Self::TitleKebab => words
                .iter()
                .map(|w| capitalize(w))
                .collect::<Vec<_>>()
                .join("-"),
            Self::NumericSuffix => format!("{}-{:02}", words.join("-"), hash_str(seed) % 100),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Style for `seed`: hash modulo the number of styles.
pub fn style_for(seed: &str) -> Style {
    Style::ALL[index(hash_str(seed), Style::ALL.len())]
}

/// Full pipeline: pattern, words, style.
pub fn pseudonym(seed: &str) -> String {
    let words = generate(seed, select_pattern(seed));
    style_for(seed).apply(seed, &words)
}
