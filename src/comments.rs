//! Mock comment generation.
//!
//! There is no platform integration: comments come from a fixed pool shared by
//! every platform plus a handful of platform-flavoured ones.

use chrono::{Duration, Local};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Comments are stamped at most this many hours in the past.
const MAX_AGE_HOURS: i64 = 168;

const BASE_COMMENTS: &[(&str, &str)] = &[
    ("User123", "This is absolutely amazing! Love it! ❤️"),
    ("CoolViewer", "Not bad, but could be better."),
    ("RandomPerson", "I don't understand this at all."),
    ("HappyFan", "Best content I've seen in ages!"),
    ("CriticalThinker", "The quality has really gone down lately."),
    ("SupportiveUser", "Keep up the great work! You're doing awesome!"),
    ("QuestionGuy", "Why did you make this decision?"),
    ("ExcitedFan", "Can't wait for the next one! So excited!"),
    ("DisappointedUser", "This is terrible, I expected more."),
    ("NeutralViewer", "It's okay, nothing special."),
    ("TechEnthusiast", "The technical aspects are impressive!"),
    ("CreativeMind", "Love the creativity and innovation!"),
    ("DetailedViewer", "The attention to detail is remarkable."),
    ("CasualWatcher", "Pretty good, I enjoyed watching this."),
    ("HarshCritic", "This is the worst thing I've ever seen."),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Youtube,
    Instagram,
    Twitter,
    Tiktok,
}

impl Platform {
    /// Exact, case-sensitive lookup; anything else is an unknown platform.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "youtube" => Some(Platform::Youtube),
            "instagram" => Some(Platform::Instagram),
            "twitter" => Some(Platform::Twitter),
            "tiktok" => Some(Platform::Tiktok),
            _ => None,
        }
    }

    fn comments(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Platform::Youtube => &[
                ("YouTubeFan", "Great video! Liked and subscribed! 👍"),
                ("ContentCreator", "Awesome editing skills! What software do you use?"),
                ("BingeWatcher", "Bingeing your channel all day! 😍"),
                ("TechReviewer", "The production quality is outstanding!"),
            ],
            Platform::Instagram => &[
                ("InstaFamous", "Fire content! 🔥"),
                ("PhotoLover", "Amazing aesthetics! 📸"),
                ("SocialUser", "This deserves more likes! ❤️"),
                ("Influencer", "Great storytelling through images!"),
            ],
            Platform::Twitter => &[
                ("TwitterUser", "Based take! Retweeting this! 🔁"),
                ("ThreadReader", "Great thread! Learned a lot!"),
                ("TrendWatcher", "This is trending material! 📈"),
                ("DebateLover", "Interesting perspective, let's discuss!"),
            ],
            Platform::Tiktok => &[
                ("TikToker", "This is viral content! 🚀"),
                ("GenZUser", "No cap, this is fire! 🔥"),
                ("ShortFormFan", "Perfect for TikTok! 👏"),
                ("DanceLover", "The transitions are smooth! 💃"),
            ],
        }
    }

    /// Content categories a post on this platform may fall into.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Platform::Youtube => &["Entertainment", "Education", "Technology", "Gaming", "Music"],
            Platform::Instagram => &["Lifestyle", "Fashion", "Travel", "Food", "Art"],
            Platform::Twitter => &["News", "Politics", "Technology", "Sports", "Entertainment"],
            Platform::Tiktok => &["Entertainment", "Dance", "Comedy", "Education", "Beauty"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub user: String,
    pub text: String,
    /// ISO-8601 local date-time
    pub timestamp: String,
}

/// Every comment that may be drawn for `platform`.
pub fn comment_pool(platform: &str) -> Vec<(&'static str, &'static str)> {
    let mut pool = BASE_COMMENTS.to_vec();
    if let Some(p) = Platform::from_name(platform) {
        pool.extend_from_slice(p.comments());
    }
    pool
}

/// Draw up to `count` distinct comments in random order, each with a random
/// timestamp within the last week.
pub fn generate_platform_comments<R: Rng + ?Sized>(
    platform: &str,
    count: usize,
    rng: &mut R,
) -> Vec<Comment> {
    let mut pool = comment_pool(platform);
    let amount = count.min(pool.len());
    let (selected, _) = pool.partial_shuffle(rng, amount);

    let now = Local::now().naive_local();

    selected
        .iter()
        .map(|(user, text)| {
            let age = Duration::hours(rng.gen_range(0..=MAX_AGE_HOURS));
            Comment {
                user: user.to_string(),
                text: text.to_string(),
                timestamp: (now - age).format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            }
        })
        .collect()
}
