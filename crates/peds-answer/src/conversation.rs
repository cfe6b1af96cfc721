//! What the simplified answer learns from the selected conversations.
//!
//! Four low-cost calls, each parsed leniently and each falling back to
//! defaults on its own:
//! - insights: the most relevant examples and a one-line takeaway each
//! - style patterns: structure, phrasing, empathy, reassurance, advice, plus
//!   the dominant answer structure and typical length
//! - knowledge gaps: topics the conversations cover that the medical
//!   information does not, with a clarifying question
//! - flowchart: a short questioning strategy as nodes and edges
//!
//! Gaps and flowchart are only requested when the pattern call succeeded.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use peds_core::traits::Generator;
use peds_core::types::{ChatMessage, ConversationExample};

use crate::simple::{json_object, DEFAULT_LENGTH};

pub const INSIGHT_TEMPERATURE: f32 = 0.1;
pub const PATTERN_TEMPERATURE: f32 = 0.1;
pub const GAP_TEMPERATURE: f32 = 0.2;
pub const FLOWCHART_TEMPERATURE: f32 = 0.2;

const MIN_SIMILARITY: f64 = 3.0;
const MAX_INSIGHTS: usize = 2;
const MAX_PATTERNS: usize = 3;
const MAX_GAPS: usize = 5;
const MAX_NODES: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleInsight {
    pub example_number: usize,
    pub common_terms: Vec<String>,
    pub key_phrases: Vec<String>,
    pub similarity_score: f64,
    pub useful_takeaway: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StylePatterns {
    pub structure_patterns: Vec<String>,
    pub phrasing_patterns: Vec<String>,
    pub empathy_patterns: Vec<String>,
    pub reassurance_patterns: Vec<String>,
    pub actionable_advice: Vec<String>,
    pub answer_structure: String,
    pub typical_length: String,
}

impl Default for StylePatterns {
    fn default() -> Self {
        let pair = |a: &str, b: &str| vec![a.to_string(), b.to_string()];
        Self {
            structure_patterns: pair("Begin with a direct answer", "Provide context after main answer"),
            phrasing_patterns: pair("Use concise, clear language", "Balance technical with simple terms"),
            empathy_patterns: pair("Show empathy without excess emotion", "Address concerns directly"),
            reassurance_patterns: pair("Provide factual reassurance", "Balance honesty with support"),
            actionable_advice: pair("Give clear recommendations", "Prioritize urgent advice"),
            answer_structure: "answer_first".to_string(),
            typical_length: DEFAULT_LENGTH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeGap {
    pub topic: String,
    pub example_context: String,
    pub suggested_question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowNode {
    pub id: String,
    pub description: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub condition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Flowchart {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// Everything learned from one set of examples.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationStudy {
    pub insights: Vec<ExampleInsight>,
    pub patterns: StylePatterns,
    pub knowledge_gaps: Vec<KnowledgeGap>,
    pub flowchart: Flowchart,
}

const INSIGHT_PROMPT: &str = r#"You are a medical communication expert. Given a new parent query and several example conversations,
identify which examples are most relevant to the current query and extract valuable insights from them.

For each relevant example, analyze:
1. Common medical terms between the query and example
2. Key medical reasoning patterns from the doctor's response
3. How similar the situation is (assign a similarity score 1-10)

Consider medical terminology, symptom descriptions, age references, and emotional content when determining relevance.

Reply in JSON format only (valid parseable JSON) with this structure:
{
    "relevant_examples": [
        {
            "example_number": number,
            "common_terms": ["term1", "term2"],
            "key_reasoning_patterns": ["pattern1", "pattern2"],
            "similarity_score": score,
            "useful_takeaway": "brief summary of what makes this example relevant"
        }
    ]
}

Limit to the top 2 most relevant examples. If none are relevant (similarity < 3), return an empty array."#;

const PATTERN_PROMPT: &str = r#"You are an expert at analyzing communication patterns in medical conversations.
Analyze these pediatrician-parent conversations to extract key patterns for a style guide.

Extract specific patterns in these categories:
1. Structure patterns: Response structure (e.g., "Begins with reassurance then advice")
2. Phrasing patterns: Language patterns (e.g., "Uses 'your child' over generic terms")
3. Empathy patterns: Empathy expression (e.g., "Acknowledges worry calmly")
4. Reassurance patterns: Reassurance methods (e.g., "Gives specific timeframes")
5. Actionable advice: Advice patterns (e.g., "Recommends specific fluid amounts")

Also determine:
- Answer structure: Predominant structure (answer_first, reassure_first, mixed)
- Typical length: Approximate word count range

Reply in JSON format only with this structure:
{
    "structure_patterns": ["pattern1", "pattern2"],
    "phrasing_patterns": ["pattern1", "pattern2"],
    "empathy_patterns": ["pattern1", "pattern2"],
    "reassurance_patterns": ["pattern1", "pattern2"],
    "actionable_advice": ["pattern1", "pattern2"],
    "answer_structure": "answer_first|reassure_first|mixed",
    "typical_length": "range in words (e.g., '100-150 words')"
}

Keep each pattern description concise (under 10 words) and specific."#;

const GAP_PROMPT: &str = r#"You are an expert medical knowledge analyst specializing in pediatric healthcare.
Compare real pediatrician-parent conversations with a reference medical text
to identify important topics or scenarios in the conversations not adequately covered in the text.

For each gap:
1. Extract the specific medical topic or scenario
2. Note the context from the conversation
3. Suggest a clarifying question for the doctor

Reply in JSON format only:
{
    "knowledge_gaps": [
        {
            "topic": "topic name (e.g., 'Infant sleep patterns')",
            "example_context": "brief explanation (1-2 sentences)",
            "suggested_question": "clarifying question"
        }
    ]
}

Focus on MEDICAL/HEALTH topics missing in the reference text. Limit to 5 most important gaps."#;

const FLOWCHART_PROMPT: &str = r#"You are an expert in medical communication and pediatric healthcare.
Analyze real pediatrician-parent conversations to create a flowchart guiding doctors
on how to ask questions to identify the root causes of a patient's query.

The flowchart should:
1. Start with a broad question to understand the main symptom or concern
2. Include follow-up questions based on patient responses
3. Account for common patterns in the conversations (e.g., clarifying duration, severity)
4. End with a step to provide advice or recommend further action

Reply in JSON format only:
{
    "nodes": [
        {"id": "unique_id", "description": "Question or action (e.g., 'Ask about symptom duration')", "type": "question|action"}
    ],
    "edges": [
        {"from": "node_id", "to": "node_id", "condition": "Condition for transition (e.g., 'If persistent')"}
    ]
}

Limit to 5-7 nodes for simplicity. Ensure questions are concise and medically relevant."#;

pub fn examples_text(examples: &[ConversationExample]) -> String {
    examples
        .iter()
        .enumerate()
        .map(|(i, ex)| format!("Example {}:\nParent: {}\nDoctor: {}\n\n", i + 1, ex.question, ex.answer))
        .collect()
}

/// Ids and labels come back as strings or numbers.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Relevant examples with similarity >= 3, best first, at most two.
pub fn parse_insights(reply: &str) -> Option<Vec<ExampleInsight>> {
    let parsed = json_object(reply, "example insights")?;
    let mut insights: Vec<ExampleInsight> = parsed
        .get("relevant_examples")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .map(|item| ExampleInsight {
                    example_number: number(item.get("example_number")).filter(|n| *n >= 0.0).map_or(0, |n| n as usize),
                    common_terms: strings(item.get("common_terms")),
                    key_phrases: strings(item.get("key_reasoning_patterns")),
                    similarity_score: number(item.get("similarity_score")).filter(|s| s.is_finite()).unwrap_or(0.0),
                    useful_takeaway: text(item.get("useful_takeaway")).unwrap_or_default(),
                })
                .filter(|insight| insight.similarity_score >= MIN_SIMILARITY)
                .collect()
        })
        .unwrap_or_default();
    insights.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
    insights.truncate(MAX_INSIGHTS);
    Some(insights)
}

/// Missing lists become empty and are capped at three entries; a missing
/// structure or length keeps the default.
pub fn parse_patterns(reply: &str) -> Option<StylePatterns> {
    let parsed = json_object(reply, "style patterns")?;
    let list = |key: &str| {
        let mut items = strings(parsed.get(key));
        items.truncate(MAX_PATTERNS);
        items
    };
    let defaults = StylePatterns::default();
    let field = |key: &str, fallback: String| text(parsed.get(key)).filter(|s| !s.trim().is_empty()).unwrap_or(fallback);
    Some(StylePatterns {
        structure_patterns: list("structure_patterns"),
        phrasing_patterns: list("phrasing_patterns"),
        empathy_patterns: list("empathy_patterns"),
        reassurance_patterns: list("reassurance_patterns"),
        actionable_advice: list("actionable_advice"),
        answer_structure: field("answer_structure", defaults.answer_structure),
        typical_length: field("typical_length", defaults.typical_length),
    })
}

/// Gaps missing any of the three fields are dropped.
pub fn parse_gaps(reply: &str) -> Option<Vec<KnowledgeGap>> {
    let parsed = json_object(reply, "knowledge gaps")?;
    let gaps = parsed
        .get("knowledge_gaps")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|gap| {
                    Some(KnowledgeGap {
                        topic: text(gap.get("topic"))?,
                        example_context: text(gap.get("example_context"))?,
                        suggested_question: text(gap.get("suggested_question"))?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Some(gaps)
}

/// A reply without both `nodes` and `edges` is an empty chart. Only the
/// first seven nodes are considered; incomplete nodes and edges are dropped.
pub fn parse_flowchart(reply: &str) -> Option<Flowchart> {
    let parsed = json_object(reply, "flowchart")?;
    let (Some(nodes), Some(edges)) = (parsed.get("nodes"), parsed.get("edges")) else {
        return Some(Flowchart::default());
    };
    let nodes = nodes
        .as_array()
        .map(|items| {
            items
                .iter()
                .take(MAX_NODES)
                .filter_map(|node| {
                    Some(FlowNode {
                        id: text(node.get("id"))?,
                        description: text(node.get("description"))?,
                        kind: text(node.get("type"))?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    let edges = edges
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|edge| {
                    Some(FlowEdge {
                        from: text(edge.get("from"))?,
                        to: text(edge.get("to"))?,
                        condition: text(edge.get("condition"))?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Some(Flowchart { nodes, edges })
}

fn ask<G: Generator>(generator: &G, system: &str, user: String, temperature: f32, what: &str) -> Option<String> {
    match generator.generate(&[ChatMessage::system(system), ChatMessage::user(user)], temperature) {
        Ok(reply) => Some(reply),
        Err(e) => {
            warn!(error = %e, call = what, "conversation study call failed; using defaults");
            None
        }
    }
}

/// Run the study calls for `examples`. No examples means no calls and the
/// default study.
pub fn study<G: Generator>(generator: &G, query: &str, medical_information: &str, examples: &[ConversationExample]) -> ConversationStudy {
    if examples.is_empty() {
        return ConversationStudy::default();
    }
    let conversations = examples_text(examples);

    let insights = ask(
        generator,
        INSIGHT_PROMPT,
        format!("New parent query:\n{query}\n\nPrevious conversation examples:\n\n{conversations}"),
        INSIGHT_TEMPERATURE,
        "insights",
    )
    .and_then(|reply| parse_insights(&reply))
    .unwrap_or_default();

    let patterns = ask(
        generator,
        PATTERN_PROMPT,
        format!("Analyze these pediatrician-parent conversations:\n\n{conversations}"),
        PATTERN_TEMPERATURE,
        "style patterns",
    )
    .and_then(|reply| parse_patterns(&reply));

    let Some(patterns) = patterns else {
        return ConversationStudy { insights, ..ConversationStudy::default() };
    };

    let knowledge_gaps = if medical_information.trim().is_empty() {
        Vec::new()
    } else {
        ask(
            generator,
            GAP_PROMPT,
            format!(
                "Analyze these conversations and compare with the reference text.\n\nCONVERSATIONS:\n{conversations}\nREFERENCE INFORMATION:\n{medical_information}\n\n\
Identify medical topics or scenarios in the conversations not covered in the reference text. Generate clarifying questions for each gap."
            ),
            GAP_TEMPERATURE,
            "knowledge gaps",
        )
        .and_then(|reply| parse_gaps(&reply))
        .unwrap_or_default()
    };

    let flowchart = ask(
        generator,
        FLOWCHART_PROMPT,
        format!(
            "Analyze these pediatrician-parent conversations.\n\nCONVERSATIONS:\n{conversations}\n\
Create a flowchart for doctors to ask questions to identify root causes of patient queries."
        ),
        FLOWCHART_TEMPERATURE,
        "flowchart",
    )
    .and_then(|reply| parse_flowchart(&reply))
    .unwrap_or_default();

    debug!(
        insights = insights.len(),
        gaps = knowledge_gaps.len(),
        nodes = flowchart.nodes.len(),
        edges = flowchart.edges.len(),
        "conversation study complete"
    );
    ConversationStudy { insights, patterns, knowledge_gaps, flowchart }
}

impl ConversationStudy {
    /// `"Relevant insights from similar queries: 1) ... 2) ..."`, empty when
    /// no insight carries a takeaway.
    pub fn insights_text(&self) -> String {
        let takeaways: Vec<String> = self
            .insights
            .iter()
            .enumerate()
            .filter(|(_, insight)| !insight.useful_takeaway.is_empty())
            .map(|(i, insight)| format!("{}) {}.", i + 1, insight.useful_takeaway))
            .collect();
        if takeaways.is_empty() {
            String::new()
        } else {
            format!("Relevant insights from similar queries: {}", takeaways.join(" "))
        }
    }

    /// Style checklist lines: the first two patterns per category, quoted.
    pub fn checklist(&self) -> String {
        let quoted = |items: &[String]| items.iter().take(2).map(|p| format!("'{p}'")).collect::<Vec<_>>().join(", ");
        let p = &self.patterns;
        format!(
            "   - Structure: {}\n   - Phrasing: {}\n   - Empathy: {}\n   - Reassurance: {}\n   - Advice: {}",
            quoted(&p.structure_patterns),
            quoted(&p.phrasing_patterns),
            quoted(&p.empathy_patterns),
            quoted(&p.reassurance_patterns),
            quoted(&p.actionable_advice),
        )
    }

    pub fn gaps_text(&self) -> String {
        let lines: Vec<String> = self
            .knowledge_gaps
            .iter()
            .take(MAX_GAPS)
            .filter(|gap| !gap.topic.is_empty() && !gap.suggested_question.is_empty())
            .enumerate()
            .map(|(i, gap)| {
                format!(
                    "   {}. If parent asks about '{}' and the medical information lacks details, consider asking: '{}'",
                    i + 1,
                    gap.topic,
                    gap.suggested_question
                )
            })
            .collect();
        if lines.is_empty() {
            "   No recurring gaps were found.".to_string()
        } else {
            format!(
                "Topics from previous conversations that may require clarification if not covered in medical information:\n{}",
                lines.join("\n")
            )
        }
    }

    pub fn flowchart_text(&self) -> String {
        let chart = &self.flowchart;
        if chart.nodes.is_empty() {
            return "   No questioning flowchart is available; ask only what the answer depends on.".to_string();
        }
        let mut out = String::from(
            "Flowchart for Questioning Strategy:\nFollow this sequence to identify the root cause of the parent's query:\n",
        );
        for node in &chart.nodes {
            out.push_str(&format!("   - Node {}: {} (Type: {})\n", node.id, node.description, node.kind));
        }
        out.push_str("\nTransitions between nodes:\n");
        for edge in &chart.edges {
            out.push_str(&format!("   - From Node {} to Node {}: {}\n", edge.from, edge.to, edge.condition));
        }
        out.push_str(
            "\nUse this flowchart to structure clarifying questions, starting with the first question node and following transitions based on the parent's response or query vagueness.",
        );
        out
    }
}
