//! Rewrites the draft so it reads like the author wrote it.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::StageError;
use crate::personality::Author;
use crate::prompt::{bullet_list, PromptTemplate};
use crate::provider::ModelClient;

use super::Stage;

pub const CHANGES_DESCRIPTION: &str =
    "Content humanized with personality injection and AI pattern removal";

const INTRO: &str = "You are a humanization editor. Your job is to take AI-written content and make it sound like a real human wrote it.";

const TASK: &str = r#"## YOUR TASK

Edit this content to:

### 1. REMOVE AI PATTERNS
- "In today's fast-paced world" → DELETE
- "It's no secret that" → DELETE
- "Let's dive in" → DELETE or replace with something better
- Overly perfect grammar → Add natural imperfections occasionally
- Repetitive sentence structure → Vary it up
- Every sentence starting the same way → Mix it up

### 2. ADD HUMAN ELEMENTS
- Conversational asides ("look, here's the thing...")
- Rhetorical questions
- Short punchy sentences. Then longer flowing ones that make a point.
- Contractions (don't, won't, can't - not do not, will not)
- Occasional incomplete sentences for emphasis. Like this.
- Personal pronouns (I, we, you)

### 3. INJECT PERSONALITY
- Add personality quirks from the author description
- Make opinions stronger, not hedged
- If something is bullshit, call it bullshit
- Add occasional humor where appropriate
- Make it sound like something you'd SAY, not just write

### 4. MAINTAIN QUALITY
- Keep all the valuable information
- Don't dumb it down
- Don't remove statistics or citations
- Don't change the structure significantly
- Keep the FAQ section intact

### 5. THE "OVER BEERS" TEST
Would you talk like this if explaining to a friend over beers? If a sentence sounds too formal or robotic for that context, fix it."#;

const OUTPUT: &str = "## OUTPUT

Return the humanized content in the same markdown format. Preserve all headings, lists, and structure. Just make it sound more human.

Only output the humanized content, no explanations or meta-commentary.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizerOutput {
    pub content: String,
    pub changes_description: String,
}

pub fn build_prompt(content: &str, author: Author) -> String {
    let personality = author.personality();
    PromptTemplate::new()
        .text(INTRO)
        .block(
            "## THE AUTHOR\n",
            format!(
                "This was written by {}. Their personality:\n{}",
                personality.display_name,
                bullet_list(personality.quirks)
            ),
        )
        .block("## THE CONTENT TO HUMANIZE\n", content)
        .text(TASK)
        .text(OUTPUT)
        .render()
}

/// The reply replaces the draft wholesale. Heading and FAQ structure is
/// expected to survive but is not checked here.
pub async fn run_humanizer(
    client: &dyn ModelClient,
    config: &EngineConfig,
    content: &str,
    author: Author,
) -> Result<HumanizerOutput, StageError> {
    let prompt = build_prompt(content, author);
    let reply = super::complete(client, config, Stage::Humanizer, prompt, false).await?;

    Ok(HumanizerOutput {
        content: reply,
        changes_description: CHANGES_DESCRIPTION.to_string(),
    })
}
