//! Chat rules: sentiment, emotion, per-message parameter effects, and the
//! deterministic local responder used when the conversation provider is
//! unavailable.
//!
//! Keyword lists cover English and Russian, matching what users actually
//! type. Matching is substring-based on the lowercased message.

use serde::Serialize;

use crate::params::ParamEffect;

/// Energy spent per user message.
pub const ENERGY_COST_PER_MESSAGE: i32 = 1;
/// Mood gained on a positive message.
pub const MOOD_POSITIVE_BOOST: i32 = 2;
/// Mood lost on a negative message.
pub const MOOD_NEGATIVE_PENALTY: i32 = 1;
/// Bond gained every [`BOND_EVERY_N_MESSAGES`] user messages.
pub const BOND_INCREMENT: i32 = 1;
pub const BOND_EVERY_N_MESSAGES: i64 = 10;
/// Most messages returned by the history endpoint.
pub const MAX_HISTORY_MESSAGES: i64 = 50;
/// Below this energy the companion always reports `tired`.
pub const TIRED_ENERGY_THRESHOLD: i32 = 30;

const POSITIVE_KEYWORDS: &[&str] = &[
    "хорошо", "отлично", "люблю", "класс", "супер", "ура", "круто", "прекрасно",
    "замечательно", "радость", "счастье", "love", "great", "awesome", "amazing",
    "wonderful", "happy", "good", "excellent", "fantastic", "beautiful", "nice",
    "perfect", "best",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "плохо", "грустно", "скучно", "злой", "ненавижу", "устал", "печаль", "ужас",
    "тоска", "обидно", "bad", "sad", "angry", "hate", "tired", "boring", "awful",
    "terrible", "upset", "disappointed", "annoyed", "frustrated", "unhappy",
];

const EXCITED_KEYWORDS: &[&str] = &["ура", "круто", "супер", "wow", "amazing", "awesome"];
const SAD_KEYWORDS: &[&str] = &["грустно", "печаль", "sad", "upset", "sorry"];
const HAPPY_KEYWORDS: &[&str] = &["хорошо", "отлично", "люблю", "good", "great", "love", "happy"];

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Excited,
    Tired,
}

impl Emotion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Excited => "excited",
            Self::Tired => "tired",
        }
    }

    /// Parse a provider-reported emotion, defaulting to neutral.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "happy" | "joy" => Self::Happy,
            "sad" | "sadness" => Self::Sad,
            "excited" | "surprise" => Self::Excited,
            "tired" => Self::Tired,
            _ => Self::Neutral,
        }
    }
}

fn count_matches(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

pub fn analyze_sentiment(message: &str) -> Sentiment {
    let text = message.to_lowercase();
    let positive = count_matches(&text, POSITIVE_KEYWORDS);
    let negative = count_matches(&text, NEGATIVE_KEYWORDS);
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// The companion's emotion in reply to `message` given its current energy.
pub fn determine_emotion(message: &str, energy: i32) -> Emotion {
    if energy < TIRED_ENERGY_THRESHOLD {
        return Emotion::Tired;
    }
    let text = message.to_lowercase();
    if contains_any(&text, EXCITED_KEYWORDS) {
        Emotion::Excited
    } else if contains_any(&text, SAD_KEYWORDS) {
        Emotion::Sad
    } else if contains_any(&text, HAPPY_KEYWORDS) {
        Emotion::Happy
    } else {
        Emotion::Neutral
    }
}

/// Parameter deltas for the `message_number`-th user message (1-based).
pub fn message_effect(sentiment: Sentiment, message_number: i64) -> ParamEffect {
    let mood = match sentiment {
        Sentiment::Positive => MOOD_POSITIVE_BOOST,
        Sentiment::Negative => -MOOD_NEGATIVE_PENALTY,
        Sentiment::Neutral => 0,
    };
    let bond = if message_number > 0 && message_number % BOND_EVERY_N_MESSAGES == 0 {
        BOND_INCREMENT
    } else {
        0
    };
    ParamEffect {
        energy: -ENERGY_COST_PER_MESSAGE,
        mood,
        bond,
    }
}

// ---------------------------------------------------------------------------
// Local responder
// ---------------------------------------------------------------------------

struct ReplyCategory {
    keywords: &'static [&'static str],
    replies: &'static [&'static str],
}

/// Checked in order; the first category with a keyword hit wins.
const REPLY_CATEGORIES: &[ReplyCategory] = &[
    ReplyCategory {
        keywords: &["привет", "здравствуй", "hello", "hi ", "hey"],
        replies: &[
            "Hi there! It's so wonderful to see you! How are you doing today?",
            "Hello! I've been waiting for you! What's on your mind?",
            "Hey! I'm so happy you're here! Let's chat!",
        ],
    },
    ReplyCategory {
        keywords: &["покорми", "еда", "кушать", "голодный", "feed", "food", "hungry", "eat"],
        replies: &[
            "Mmm, I'm hungry! Thank you for taking care of me!",
            "Treats! You're the best!",
            "Yum! I love it when you feed me!",
        ],
    },
    ReplyCategory {
        keywords: &["поиграй", "играть", "игра", "play", "game"],
        replies: &[
            "Yay! I love playing! Let's have fun!",
            "Games are great! What should we play?",
            "Woohoo! Playing with you is the best!",
        ],
    },
    ReplyCategory {
        keywords: &["устал", "спать", "отдых", "sleep", "rest", "tired"],
        replies: &[
            "I need a little rest... Can I take a nap?",
            "I'm a bit tired... but I'm still happy to see you!",
            "Yawn... rest is important!",
        ],
    },
    ReplyCategory {
        keywords: &["люблю", "нравишься", "обожаю", "love", "like you"],
        replies: &[
            "Aww, that makes me so happy! I really care about you too!",
            "You're the best! Thank you for being so sweet!",
            "My heart is so full right now! You mean so much to me!",
        ],
    },
    ReplyCategory {
        keywords: &["грустно", "печально", "скучно", "плохо", "sad", "upset", "bad"],
        replies: &[
            "I'm here for you! Want to tell me what's wrong?",
            "Don't worry, everything will be okay! I believe in you!",
            "Let me cheer you up! You're stronger than you think!",
        ],
    },
    ReplyCategory {
        keywords: &["круто", "супер", "класс", "ура", "awesome", "amazing", "wow"],
        replies: &[
            "Yaaay! That's amazing!",
            "Super! I'm so glad too!",
            "Wow! What great news!",
        ],
    },
    ReplyCategory {
        keywords: &["?"],
        replies: &[
            "That's a great question! Let me think about it...",
            "Hmm, interesting! I'd say it depends on how you look at it!",
            "Curious! Let's figure it out together!",
        ],
    },
];

const DEFAULT_REPLIES: &[&str] = &[
    "That's really interesting! Tell me more!",
    "I love hearing from you! You always have such great things to say!",
    "Oh wow! That's amazing! I want to know more!",
    "I really enjoy talking with you!",
];

/// A stable index into `len` options derived from the message bytes.
fn stable_pick(message: &str, len: usize) -> usize {
    let sum = message
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_add(usize::from(b)));
    sum % len.max(1)
}

/// Deterministic reply for `message`: same input, same output.
pub fn fallback_reply(message: &str) -> &'static str {
    let text = format!("{} ", message.to_lowercase());
    let replies = REPLY_CATEGORIES
        .iter()
        .find(|category| contains_any(&text, category.keywords))
        .map(|category| category.replies)
        .unwrap_or(DEFAULT_REPLIES);
    replies[stable_pick(message, replies.len())]
}

/// Emotion the local responder reports alongside [`fallback_reply`].
pub fn fallback_emotion(message: &str, energy: i32) -> Emotion {
    determine_emotion(message, energy)
}
