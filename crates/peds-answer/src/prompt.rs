//! Evidence formatting and the message sequence for the detailed answer.

use serde::{Deserialize, Serialize};

use peds_core::types::{ChatMessage, FusedResult};
use peds_style::StyleProfile;

pub const PERSONA: &str = "You are Dr. Aaron Lu, a pediatrician with expertise in child development. \
You must strictly adhere to the communication style specified in these instructions.";

pub const FORMAT_REQUIREMENTS: &str = "FORMAT REQUIREMENTS:
- Use clear Markdown formatting with proper spacing
- Include blank lines before and after headers
- Use level 2 headers (##) for main sections
- Use level 3 headers (###) for subsections
- Separate paragraphs with blank lines
- Citations: (Source: [Title], Page [number])
- Multiple citations separated by semicolons";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSnippet {
    pub text: String,
    pub source: String,
}

/// Retrieved passages with their citation tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    pub text_content: Vec<TextSnippet>,
    /// Distinct citations, first-seen order.
    pub sources: Vec<String>,
}

impl Evidence {
    pub fn from_results(results: &[FusedResult]) -> Self {
        let mut evidence = Evidence::default();
        for r in results {
            let source = r.source().citation();
            if !evidence.sources.contains(&source) {
                evidence.sources.push(source.clone());
            }
            evidence.text_content.push(TextSnippet { text: r.result.full_text.clone(), source });
        }
        evidence
    }

    /// One `[{title} (Page {page})]: {text}` line per passage.
    pub fn formatted(&self) -> String {
        self.text_content.iter().map(|s| format!("[{}]: {}", s.source, s.text)).collect::<Vec<_>>().join("\n")
    }
}

fn user_message(parent_name: &str, query: &str, evidence: &str) -> String {
    format!(
        "You have a parent named {parent_name}, who is asking questions about: {query} regarding their child.

Below is the RELEVANT MEDICAL INFORMATION that you have discovered in relation to their query:
{evidence}

Now you will write a message to {parent_name}, ensuring it follows these communication requirements from the system prompts to demonstrate thorough care and professionalism as a pediatric doctor.

REQUIREMENTS:
0. Begin with **\"Dear {parent_name},\"** and write from the perspective of **Dr. Aaron Lu**, a pediatrician.
1. Maintain the specified communication style consistently throughout your response.
2. **Cite EVERY piece of medical information** using the format **(Source: [article name], Page [number]).**
3. If multiple sources support a statement, cite all relevant sources.
4. Present your response in **Markdown format**, using:
- **Heading levels** (`#`, `##`, `###`) for main sections and sub-sections
- **Line breaks** between paragraphs
- **Bullet points** where appropriate
5. Use only the information from the provided sources. If information is not available, clearly state that.
6. Open your message with an **appropriate emotional acknowledgment** based on the specified empathy level.
7. Organize your response to progress logically from **acknowledgment → explanation → recommendations**.
8. End with a **closing** that reflects the specified tone and empathy level."
    )
}

/// Persona, style blocks and format rules as system messages, then the
/// parent's question with the evidence as the user message.
pub fn detailed_messages(profile: &StyleProfile, parent_name: &str, query: &str, evidence: &Evidence) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(PERSONA),
        ChatMessage::system(profile.render()),
        ChatMessage::system(FORMAT_REQUIREMENTS),
        ChatMessage::user(user_message(parent_name, query, &evidence.formatted())),
    ]
}
