//! Canned provider replies, shaped the way real models answer: prose and
//! code fences around the JSON, trailing commas now and then.

#![allow(dead_code)]

pub const RESEARCH: &str = r#"Sure! Here is the research you asked for.

```json
{
  "topic": "Remote team rituals",
  "searchIntent": "informational",
  "keyFindings": ["Async standups beat live ones for teams across 3+ time zones"],
  "statistics": [
    {"stat": "64% of remote workers skip optional video calls", "source": "Remote Pulse", "url": "https://example.com/pulse", "year": "2025"}
  ],
  "competitorGaps": ["Nobody covers rituals for teams in Manila and Sydney"],
  "controversialAngles": ["Daily standups are theatre"],
  "questionsToAnswer": ["Which rituals survive time zone spread?"],
  "sources": [
    {"title": "Remote Pulse 2025", "url": "https://example.com/pulse", "snippet": "Survey of 2,000 workers", "authority": "high"},
  ],
  "suggestedOutboundLinks": [
    {"url": "https://example.com/pulse", "anchor": "Remote Pulse survey", "reason": "Primary data"}
  ]
}
```

Let me know if you need more."#;

/// Research reply with one finding, one question and nothing else.
pub const RESEARCH_MINIMAL: &str = r#"{"keyFindings": ["One finding"], "statistics": [], "questionsToAnswer": ["One question?"], "sources": []}"#;

pub const DRAFT: &str = "# Remote Rituals That Actually Survive Time Zones

Most remote rituals die within a month. I have killed plenty of them myself.

The ones that survive share one trait: nobody has to be awake at 3 AM for them.

## Async Standups

Write it down, post it, move on.

## Frequently Asked Questions

**Do we still need video calls?** Sometimes.";

pub const HUMANIZED: &str = "# Remote Rituals That Actually Survive Time Zones

Look, most remote rituals die within a month. I've killed plenty myself.

The ones that survive? Nobody has to be awake at 3 AM for them. That's it.

## Async Standups

Write it down. Post it. Move on.

## Frequently Asked Questions

**Do we still need video calls?** Sometimes. Not daily.";

pub const OPTIMIZER: &str = r#"{
  "meta": {
    "title": "Remote Team Rituals That Survive Time Zones",
    "description": "Which remote rituals last and which die in a month. Practical, async-first advice from a team spread across three continents.",
    "slug": "remote-team-rituals"
  },
  "keywords": {
    "primary": "remote team rituals",
    "secondary": ["async standups", "distributed teams"],
    "longTail": ["remote rituals across time zones"]
  },
  "internalLinks": [
    {"targetArticle": "async-first-hiring", "insertAfter": "Write it down. Post it. Move on.", "anchorText": "async-first hiring playbook", "reason": "Same audience"}
  ],
  "schema": {
    "article": {"@type": "Article", "headline": "Remote Rituals"},
    "breadcrumb": {"@type": "BreadcrumbList"},
    "faq": {"@type": "FAQPage"}
  },
  "breadcrumbs": [
    {"name": "Home", "url": "/"},
    {"name": "Remote Work", "url": "/remote-work"},
    {"name": "Remote Rituals", "url": "/tales/remote-team-rituals"}
  ],
  "suggestions": ["Add a comparison table"]
}"#;

pub const IDEAS: &str = r#"Here are five ideas:
[
  {"title": "7 Async Standup Templates", "topic": "templates", "angle": "copy-paste", "targetKeyword": "async standup template", "linkOpportunity": "expands the standup section", "suggestedAuthor": "reina", "priority": 1},
  {"title": "Why Daily Video Calls Fail", "topic": "meetings", "angle": "contrarian", "targetKeyword": "video call fatigue", "linkOpportunity": "hot take follow-up", "suggestedAuthor": "stepten", "priority": 2},
  {"title": "Time Zone Math for Managers", "topic": "scheduling", "angle": "practical", "targetKeyword": "time zone overlap", "linkOpportunity": "supports the 3 AM point", "suggestedAuthor": "clark", "priority": 3}
]"#;

/// Category keys in weight order.
pub const CATEGORY_KEYS: [&str; 7] = [
    "titlePower",
    "humanVoice",
    "contentQuality",
    "visualEngagement",
    "technicalSeo",
    "internalEcosystem",
    "aiVisibility",
];

/// Scorer reply with the given category scores. The provider's own
/// aggregates are deliberately wrong.
pub fn scorer(values: [f64; 7]) -> String {
    let categories: Vec<String> = CATEGORY_KEYS
        .iter()
        .zip(values)
        .map(|(key, value)| {
            format!(
                r#""{}": {{"score": {}, "maxPossible": 100, "breakdown": {{}}, "feedback": "ok"}}"#,
                key, value
            )
        })
        .collect();

    format!(
        r#"{{"scores": {{{}}}, "totalScore": 50, "weightedScore": 97.5, "rating": "EXCEPTIONAL", "topStrengths": ["voice"], "topWeaknesses": ["visuals"], "prioritizedImprovements": [{{"priority": 2, "category": "visualEngagement", "action": "Add a diagram", "impact": "+10"}}, {{"priority": 1, "category": "technicalSeo", "action": "Shorten the meta title", "impact": "+5"}}]}}"#,
        categories.join(", ")
    )
}
