//! Campaign concepts: one section per campaign, separated by dividers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::exports::payload::{present, ModelPayload};
use crate::layout::builder::LineBuilder;
use crate::layout::model::{Line, MetaItem, TwoColumn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignConcepts {
    pub artist_name: String,
    pub campaigns: Vec<Campaign>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Campaign {
    pub name: String,
    pub objective: String,
    pub hook: String,
    pub channels: Vec<String>,
    pub deliverables: Vec<String>,
    pub timeline: String,
    pub budget: Option<String>,
    pub kpis: Vec<String>,
}

impl ModelPayload for CampaignConcepts {
    const NAME: &'static str = "campaign_concepts";

    fn check_shape(&self) -> Result<(), String> {
        if self.campaigns.is_empty() {
            return Err("expected at least 1 campaign".to_string());
        }
        if let Some(i) = self.campaigns.iter().position(|c| !present(&c.name)) {
            return Err(format!("campaign {i} has no name"));
        }
        Ok(())
    }

    fn fallback() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        CampaignConcepts {
            artist_name: String::new(),
            campaigns: vec![
                Campaign {
                    name: "Single Countdown".to_string(),
                    objective: "Build pre-saves in the two weeks before release day.".to_string(),
                    hook: "One short clip a day revealing a line from the new song.".to_string(),
                    channels: list(&["Instagram", "TikTok", "Email"]),
                    deliverables: list(&["10 short clips", "Pre-save link", "Release-day post"]),
                    timeline: "2 weeks".to_string(),
                    budget: None,
                    kpis: list(&["Pre-saves", "Clip completion rate"]),
                },
                Campaign {
                    name: "Behind the Song".to_string(),
                    objective: "Deepen connection with existing listeners after release.".to_string(),
                    hook: "The story of how the song was written, told in three parts.".to_string(),
                    channels: list(&["YouTube", "Instagram"]),
                    deliverables: list(&["3-part video series", "Lyric card set"]),
                    timeline: "3 weeks".to_string(),
                    budget: None,
                    kpis: list(&["Saves", "Comments per post"]),
                },
            ],
        }
    }
}

/// Builds the campaign concepts document.
pub fn build_lines(concepts: &CampaignConcepts, prepared: NaiveDate) -> Vec<Line> {
    let campaigns: Vec<&Campaign> = concepts.campaigns.iter().filter(|c| present(&c.name)).collect();
    let artist = concepts.artist_name.trim();
    let title = if artist.is_empty() {
        "Campaign Concepts".to_string()
    } else {
        format!("{artist} \u{2014} Campaign Concepts")
    };
    let subtitle = match campaigns.len() {
        1 => "1 concept".to_string(),
        n => format!("{n} concepts"),
    };

    let mut builder = LineBuilder::with_header(
        &title,
        Some(subtitle.as_str()),
        vec![
            MetaItem::new("Artist", Some(artist.to_string())),
            MetaItem::new("Campaigns", Some(campaigns.len().to_string())),
            MetaItem::new("Prepared", Some(prepared.format("%B %-d, %Y").to_string())),
        ],
    );

    for (i, campaign) in campaigns.iter().enumerate() {
        if i > 0 {
            builder.divider();
        }
        builder.section_title(&campaign.name);
        if present(&campaign.objective) {
            builder.body(&format!("Objective: {}", campaign.objective.trim()));
        }
        if present(&campaign.hook) {
            builder.body(&format!("Hook: {}", campaign.hook.trim()));
        }
        builder.meta(vec![
            MetaItem::new("Timeline", Some(campaign.timeline.clone())),
            MetaItem::new("Budget", campaign.budget.clone()),
            MetaItem::new("Primary KPI", campaign.kpis.first().cloned()),
        ]);
        builder.two_column(TwoColumn {
            heading: None,
            left_title: Some("Channels".to_string()),
            left: campaign.channels.clone(),
            right_title: Some("Deliverables".to_string()),
            right: campaign.deliverables.clone(),
        });
        let secondary: Vec<&str> = campaign
            .kpis
            .iter()
            .skip(1)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();
        if !secondary.is_empty() {
            builder.body(&format!("Also tracking: {}", secondary.join(", ")));
        }
    }

    builder.finish()
}
