//! Content calendar: posts grouped by day within an inclusive date range.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;
use crate::exports::payload::{present, ModelPayload, Validated};
use crate::layout::builder::LineBuilder;
use crate::layout::model::{Line, MetaItem};

/// Date anchoring the static fallback when no range is known.
const FALLBACK_ANCHOR: (i32, u32, u32) = (2025, 1, 6);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentCalendar {
    pub artist_name: String,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    /// `YYYY-MM-DD`.
    pub date: NaiveDate,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err(format!("range end {end} is before start {start}"));
        }
        Ok(DateRange { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl ContentCalendar {
    /// The static fallback calendar with its first post on `start`.
    pub fn anchored_fallback(start: NaiveDate) -> Self {
        let post = |offset: u64, platform: &str, format: &str, title: &str, caption: &str| CalendarEntry {
            date: start.checked_add_days(Days::new(offset)).unwrap_or(start),
            platform: platform.to_string(),
            format: format.to_string(),
            title: title.to_string(),
            caption: Some(caption.to_string()),
            hashtags: vec!["newmusic".to_string()],
        };
        ContentCalendar {
            artist_name: String::new(),
            entries: vec![
                post(0, "Instagram", "Reel", "Studio teaser", "Fifteen seconds of what we've been working on."),
                post(2, "TikTok", "Short video", "The story behind the hook", "Where the chorus came from."),
                post(4, "Email", "Newsletter", "Release update", "Dates, links and a thank-you."),
                post(7, "Instagram", "Carousel", "Lyric cards", "Three lines that mean the most."),
            ],
        }
    }
}

impl ModelPayload for ContentCalendar {
    const NAME: &'static str = "content_calendar";

    fn check_shape(&self) -> Result<(), String> {
        if self.entries.is_empty() {
            return Err("expected at least 1 calendar entry".to_string());
        }
        if let Some(i) = self.entries.iter().position(|e| !present(&e.title)) {
            return Err(format!("entry {i} has no title"));
        }
        Ok(())
    }

    fn fallback() -> Self {
        let (y, m, d) = FALLBACK_ANCHOR;
        Self::anchored_fallback(NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default())
    }
}

/// Re-anchors a fallback calendar so its posts land inside `range`.
pub fn resolve(validated: Validated<ContentCalendar>, range: &DateRange) -> Validated<ContentCalendar> {
    match validated {
        Validated::Fallback { reason, .. } => Validated::Fallback {
            payload: ContentCalendar::anchored_fallback(range.start),
            reason,
        },
        model => model,
    }
}

fn hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.trim().trim_start_matches('#'))
        .filter(|t| !t.is_empty())
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the calendar document for `range`.
///
/// Entries outside the range are dropped; the rest are ordered by date, keeping
/// the payload's order within a day. Fails with `NothingToExport` when no entry
/// falls in the range.
pub fn build_lines(calendar: &ContentCalendar, range: &DateRange) -> Result<Vec<Line>, ExportError> {
    let mut entries: Vec<&CalendarEntry> = calendar
        .entries
        .iter()
        .filter(|e| range.contains(e.date))
        .collect();
    if entries.is_empty() {
        return Err(ExportError::NothingToExport(format!(
            "no calendar entries between {} and {}",
            range.start, range.end
        )));
    }
    entries.sort_by_key(|e| e.date);

    let artist = calendar.artist_name.trim();
    let title = if artist.is_empty() {
        "Content Calendar".to_string()
    } else {
        format!("{artist} \u{2014} Content Calendar")
    };
    let span = format!(
        "{} \u{2013} {}",
        range.start.format("%b %-d, %Y"),
        range.end.format("%b %-d, %Y")
    );
    let mut builder = LineBuilder::with_header(
        &title,
        Some(span.as_str()),
        vec![
            MetaItem::new("Artist", Some(artist.to_string())),
            MetaItem::new("Posts", Some(entries.len().to_string())),
            MetaItem::new("Range", Some(span.clone())),
        ],
    );

    let mut current_day: Option<NaiveDate> = None;
    for entry in entries {
        if current_day != Some(entry.date) {
            builder.section_title(&entry.date.format("%A, %B %-d").to_string());
            current_day = Some(entry.date);
        }
        let channel: Vec<&str> = [entry.platform.trim(), entry.format.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        if channel.is_empty() {
            builder.body(&entry.title);
        } else {
            builder.body(&format!("{}: {}", channel.join(" / "), entry.title.trim()));
        }
        if let Some(caption) = &entry.caption {
            builder.body(caption);
        }
        builder.body(&hashtags(&entry.hashtags));
    }

    Ok(builder.finish())
}
