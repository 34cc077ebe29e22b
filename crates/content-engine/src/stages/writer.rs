//! First-draft article writing in the author's voice.

use serde::{Deserialize, Serialize};

use crate::article::{ArticleInput, VoiceInjection};
use crate::config::{ContentRequirements, EngineConfig};
use crate::content;
use crate::error::StageError;
use crate::personality::Personality;
use crate::prompt::{bullet_list, PromptTemplate};
use crate::provider::ModelClient;
use crate::sanitize::sanitize_for_prompt;

use super::research::ResearchOutput;
use super::Stage;

pub const PERSONAL_STORY_MARKER: &str = "### Personal Story to Include:";
pub const HOT_TAKE_MARKER: &str = "### Hot Take / Unpopular Opinion:";
pub const REAL_EXAMPLE_MARKER: &str = "### Real-World Example:";
pub const RAW_THOUGHTS_MARKER: &str = "### Raw Thoughts to Incorporate:";

const VOICE_INJECTION_INTRO: &str = "## HUMAN VOICE INJECTION (CRITICAL - USE ALL OF THESE)

This is what makes our content unique. These are REAL thoughts and experiences that CANNOT be found elsewhere on the internet. You MUST weave these into the article naturally:";

const FORMAT: &str = "## FORMAT

Return the article in markdown format:

# [Title]

[Opening paragraphs]

## [First H2 - Question or Topic]

[Answer-first content...]

## [Second H2]

[Content...]

[Continue with H2s at the cadence above]

## Frequently Asked Questions

### [Question 1]
[Answer]

### [Question 2]
[Answer]

[Closing]

---

Now write the article. Make it genuinely good - something that would rank AND that you'd actually want to read.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriterOutput {
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub h2_count: usize,
    pub has_faq: bool,
}

impl WriterOutput {
    /// Structural facts of a draft. The whole reply is the article.
    pub fn from_content(content: String) -> Self {
        Self {
            title: content::title_from_heading(&content),
            word_count: content::word_count(&content),
            h2_count: content::h2_count(&content),
            has_faq: content::has_faq(&content),
            content,
        }
    }
}

fn structure_requirements(req: &ContentRequirements) -> String {
    format!(
        "## ARTICLE STRUCTURE REQUIREMENTS

1. **TITLE** (separate line at top)
   - Must contain a number (not a year)
   - Must contain a power word (brutal, secret, shocking, proven, etc.)
   - Must create curiosity gap
   - {title_min}-{title_max} characters ideal

2. **OPENING** (first 2-3 paragraphs)
   - Hook immediately - no \"In today's world\" bullshit
   - State the problem or opportunity clearly
   - Promise what they'll learn
   - Include the author's perspective/stake

3. **H2 SECTIONS** (every {h_min}-{h_max} words)
   - Each H2 should be a question or clear topic
   - First sentence after H2 = DIRECT ANSWER (for AI extraction)
   - Include relevant statistics with citations
   - Use the human voice injection where it fits naturally
   - Short paragraphs ({sentences} sentences max)
   - Use bullet lists for scanability

4. **CONTENT RULES**
   - Write until the topic is COMPLETE, not a word more
   - No filler, no padding
   - Every sentence should earn its place
   - Contractions are fine (don't vs do not)
   - Varied sentence length (short. Then longer flowing ones.)
   - Rhetorical questions to engage reader

5. **FAQ SECTION** (at the end)
   - 3-5 questions people actually ask
   - Direct, helpful answers
   - This helps with AI search visibility

6. **CLOSING**
   - Summarize the key takeaway
   - Clear call to action
   - End with personality (not generic \"thanks for reading\")",
        title_min = req.title_length.min,
        title_max = req.title_length.max,
        h_min = req.heading_interval.min,
        h_max = req.heading_interval.max,
        sentences = req.paragraph_max_sentences,
    )
}

/// Zero to four blocks; empty when no material was supplied.
fn voice_injection_blocks(voice: &VoiceInjection) -> PromptTemplate {
    let clean = |field: &Option<String>| field.as_deref().map(sanitize_for_prompt);
    let story = clean(&voice.personal_story);
    let hot_take = clean(&voice.hot_take);
    let example = clean(&voice.real_example);
    let thoughts = clean(&voice.raw_thoughts);

    PromptTemplate::new()
        .optional(PERSONAL_STORY_MARKER, story.as_deref())
        .optional(HOT_TAKE_MARKER, hot_take.as_deref())
        .optional(REAL_EXAMPLE_MARKER, example.as_deref())
        .optional(RAW_THOUGHTS_MARKER, thoughts.as_deref())
}

pub fn build_prompt(
    input: &ArticleInput,
    research: &ResearchOutput,
    personality: &Personality,
    requirements: &ContentRequirements,
) -> String {
    let mut prompt = PromptTemplate::new()
        .text(format!(
            "You are writing an article as {} for StepTen.io.",
            personality.display_name
        ))
        .block("## YOUR VOICE & PERSONALITY\n", personality.voice)
        .block("## THE TOPIC\n", sanitize_for_prompt(&input.topic))
        .text(
            "## RESEARCH TO USE\n\nHere's the research you MUST incorporate (cite sources where appropriate):",
        )
        .block("Key Findings:", bullet_list(&research.key_findings))
        .block(
            "Statistics to Include:",
            bullet_list(research.statistics.iter().map(|s| s.cited())),
        )
        .block("Questions to Answer:", bullet_list(&research.questions_to_answer));

    let voice = voice_injection_blocks(&input.voice_injection);
    if !voice.is_empty() {
        prompt = prompt.text(VOICE_INJECTION_INTRO).append(voice);
    }

    prompt
        .text(structure_requirements(requirements))
        .text(FORMAT)
        .render()
}

pub async fn run_writer(
    client: &dyn ModelClient,
    config: &EngineConfig,
    input: &ArticleInput,
    research: &ResearchOutput,
) -> Result<WriterOutput, StageError> {
    let prompt = build_prompt(
        input,
        research,
        input.author.personality(),
        &config.requirements,
    );
    let reply = super::complete(client, config, Stage::Writer, prompt, false).await?;
    Ok(WriterOutput::from_content(reply))
}
