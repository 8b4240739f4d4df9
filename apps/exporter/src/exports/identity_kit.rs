//! Artist identity kit: who the artist is, how they sound, how they look.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::exports::payload::{present, ModelPayload};
use crate::layout::builder::LineBuilder;
use crate::layout::model::{Line, MetaItem, TwoColumn};

const MIN_CONTENT_PILLARS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityKit {
    pub artist_name: String,
    pub genre: Option<String>,
    pub tagline: String,
    pub short_bio: String,
    pub brand_voice: BrandVoice,
    pub audience: Audience,
    pub visual_identity: VisualIdentity,
    pub content_pillars: Vec<String>,
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandVoice {
    pub tone_words: Vec<String>,
    #[serde(rename = "do")]
    pub do_list: Vec<String>,
    #[serde(rename = "dont")]
    pub dont_list: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Audience {
    pub summary: String,
    pub segments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualIdentity {
    pub palette: Vec<String>,
    pub typography: String,
    pub imagery: Vec<String>,
}

impl ModelPayload for IdentityKit {
    const NAME: &'static str = "identity_kit";

    fn check_shape(&self) -> Result<(), String> {
        if !present(&self.artist_name) {
            return Err("artistName is missing".to_string());
        }
        if !present(&self.short_bio) {
            return Err("shortBio is missing".to_string());
        }
        let pillars = self.content_pillars.iter().filter(|p| present(p)).count();
        if pillars < MIN_CONTENT_PILLARS {
            return Err(format!(
                "expected at least {MIN_CONTENT_PILLARS} content pillars, got {pillars}"
            ));
        }
        Ok(())
    }

    fn fallback() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        IdentityKit {
            artist_name: "Your Artist Name".to_string(),
            genre: None,
            tagline: "Music with a point of view.".to_string(),
            short_bio: "An independent artist building a direct relationship with listeners \
                        through honest songwriting, consistent releases and a recognisable \
                        visual world."
                .to_string(),
            brand_voice: BrandVoice {
                tone_words: list(&["honest", "warm", "curious"]),
                do_list: list(&[
                    "Speak to fans like friends",
                    "Share the process, not only the result",
                    "Keep captions short and specific",
                ]),
                dont_list: list(&[
                    "Chase every trend",
                    "Overpromise release dates",
                    "Post without a clear next step",
                ]),
            },
            audience: Audience {
                summary: "Listeners who discover music through playlists and short video, \
                          and stay for the story behind the songs."
                    .to_string(),
                segments: list(&["Playlist listeners", "Live show regulars", "Fellow musicians"]),
            },
            visual_identity: VisualIdentity {
                palette: list(&["Ink #1A1A1A", "Paper #F5F1E8", "Accent #D9480F"]),
                typography: "One bold sans-serif for titles, one neutral face for body copy.".to_string(),
                imagery: list(&["Natural light", "Candid studio moments", "Consistent framing"]),
            },
            content_pillars: list(&["Behind the song", "Studio and rehearsal", "Fan stories"]),
            hashtags: list(&["newmusic", "indieartist"]),
        }
    }
}

fn hashtag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.starts_with('#') {
        tag.to_string()
    } else {
        format!("#{tag}")
    }
}

/// Builds the identity kit document. `prepared` is stamped into the header.
pub fn build_lines(kit: &IdentityKit, prepared: NaiveDate) -> Vec<Line> {
    let title = format!("{} \u{2014} Identity Kit", kit.artist_name.trim());
    let mut builder = LineBuilder::with_header(
        &title,
        Some(kit.tagline.as_str()),
        vec![
            MetaItem::new("Artist", Some(kit.artist_name.clone())),
            MetaItem::new("Genre", kit.genre.clone()),
            MetaItem::new("Prepared", Some(prepared.format("%B %-d, %Y").to_string())),
        ],
    );

    builder.section_title("Bio").body(&kit.short_bio);

    let voice = &kit.brand_voice;
    builder.section_title("Brand Voice");
    let tone: Vec<&str> = voice
        .tone_words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect();
    if !tone.is_empty() {
        builder.body(&format!("Tone: {}", tone.join(", ")));
    }
    builder.two_column(TwoColumn {
        heading: None,
        left_title: Some("Do".to_string()),
        left: voice.do_list.clone(),
        right_title: Some("Don't".to_string()),
        right: voice.dont_list.clone(),
    });

    builder
        .section_title("Audience")
        .body(&kit.audience.summary)
        .paragraphs(&kit.audience.segments);

    let visual = &kit.visual_identity;
    builder
        .section_title("Visual Identity")
        .body(&visual.typography)
        .two_column(TwoColumn {
            heading: None,
            left_title: Some("Palette".to_string()),
            left: visual.palette.clone(),
            right_title: Some("Imagery".to_string()),
            right: visual.imagery.clone(),
        });

    builder.section_title("Content Pillars");
    for (i, pillar) in kit.content_pillars.iter().filter(|p| present(p)).enumerate() {
        builder.body(&format!("{}. {}", i + 1, pillar.trim()));
    }

    let tags: Vec<String> = kit
        .hashtags
        .iter()
        .filter(|t| present(t.trim_start_matches('#')))
        .map(|t| hashtag(t))
        .collect();
    if !tags.is_empty() {
        builder.section_title("Hashtags").body(&tags.join(" "));
    }

    builder.finish()
}
