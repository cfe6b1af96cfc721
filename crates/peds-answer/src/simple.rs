//! Short, parent-friendly answer built from the detailed answer and real
//! doctor/parent exchanges.
//!
//! An optional analysis call scores the question (complexity, urgency,
//! emotional load) and picks a response template; the template drives the
//! tone, phrasing and engagement of the final prompt. What the selected
//! conversations teach ([`crate::conversation`]) sets the structure, the
//! length and the checklist.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use peds_core::error::{Error, Result};
use peds_core::traits::Generator;
use peds_core::types::{ChatMessage, ConversationExample};

use crate::conversation::{self, ConversationStudy, StylePatterns};

pub const ANALYSIS_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_LENGTH: &str = "100-150 words";
const FOLLOW_UP: &str = "Include a relevant follow-up question";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Urgent,
    Reassuring,
    Detailed,
    Simple,
    #[default]
    Standard,
}

impl TemplateKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "urgent" => Some(Self::Urgent),
            "reassuring" => Some(Self::Reassuring),
            "detailed" => Some(Self::Detailed),
            "simple" => Some(Self::Simple),
            "standard" => Some(Self::Standard),
            _ => None,
        }
    }

    pub fn template(self) -> ResponseTemplate {
        use Structure::*;
        let t = |tone, formality, sentence_length, jargon_level, (questions, personalization, empathy), structure| ResponseTemplate {
            tone,
            formality,
            sentence_length,
            jargon_level,
            engagement: Engagement { questions, personalization, empathy },
            structure,
        };
        match self {
            Self::Urgent => t(["directive", "clear", "serious"], "formal", 10, 1, (0, 2, 1), AnswerFirst),
            Self::Reassuring => t(["reassuring", "empathetic", "supportive"], "neutral", 14, 0, (1, 3, 3), ReassureFirst),
            Self::Detailed => t(["informative", "thorough", "educational"], "formal", 16, 2, (0, 1, 1), Mixed),
            Self::Simple => t(["positive", "clear", "conversational"], "casual", 8, 0, (1, 2, 2), AnswerFirst),
            Self::Standard => t(["professional", "balanced", "helpful"], "neutral", 12, 1, (1, 2, 2), Mixed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    AnswerFirst,
    ReassureFirst,
    Mixed,
}

impl Structure {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "answer_first" => Some(Self::AnswerFirst),
            "reassure_first" => Some(Self::ReassureFirst),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Structure::AnswerFirst => "Start with a direct answer, then explain",
            Structure::ReassureFirst => "Begin with reassurance, then provide advice",
            Structure::Mixed => "Respond flexibly, prioritizing clarity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engagement {
    pub questions: u8,
    pub personalization: u8,
    pub empathy: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTemplate {
    pub tone: [&'static str; 3],
    pub formality: &'static str,
    pub sentence_length: u32,
    pub jargon_level: u8,
    pub engagement: Engagement,
    pub structure: Structure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAnalysis {
    pub complexity: u8,
    pub urgency: u8,
    pub emotional_load: u8,
    pub response_template: TemplateKind,
    pub key_medical_terms: Vec<String>,
}

impl Default for QueryAnalysis {
    fn default() -> Self {
        Self { complexity: 5, urgency: 5, emotional_load: 5, response_template: TemplateKind::Standard, key_medical_terms: vec![] }
    }
}

const ANALYSIS_PROMPT: &str = r#"You are a pediatric medical query analyzer. Analyze the following parent query about their child's health.

Score the query on three dimensions (1-10 scale):
1. Complexity: How medically complex or detailed is the query? (1=very simple, 10=very complex)
2. Urgency: How time-sensitive or urgent is the medical situation? (1=not urgent, 10=emergency)
3. Emotional load: How worried or emotionally distressed is the parent? (1=calm/curious, 10=highly distressed)

Also:
- Identify key medical terms and symptoms
- Classify into the most appropriate response template: "urgent", "reassuring", "detailed", "simple", or "standard"

Reply in JSON format only (valid parseable JSON) with this structure:
{
    "complexity": <score 1-10>,
    "urgency": <score 1-10>,
    "emotional_load": <score 1-10>,
    "response_template": "<template_name>",
    "key_medical_terms": ["term1", "term2", ...]
}"#;

fn score(value: Option<&Value>, fallback: u8) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    raw.filter(|v| v.is_finite()).map(|v| v.trunc().clamp(1.0, 10.0) as u8).unwrap_or(fallback)
}

/// The JSON object between the first `{` and the last `}` of a model reply.
pub(crate) fn json_object(reply: &str, what: &str) -> Option<Value> {
    let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) else {
        warn!(reply = what, "no JSON object in model reply");
        return None;
    };
    if end < start {
        warn!(reply = what, "no JSON object in model reply");
        return None;
    }
    match serde_json::from_str(&reply[start..=end]) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(reply = what, error = %e, "model reply is not valid JSON");
            None
        }
    }
}

/// Read the analyzer's reply. Anything unreadable falls back to the
/// defaults field by field.
pub fn parse_analysis(reply: &str) -> QueryAnalysis {
    let mut analysis = QueryAnalysis::default();
    let Some(parsed) = json_object(reply, "query analysis") else {
        return analysis;
    };
    analysis.complexity = score(parsed.get("complexity"), analysis.complexity);
    analysis.urgency = score(parsed.get("urgency"), analysis.urgency);
    analysis.emotional_load = score(parsed.get("emotional_load"), analysis.emotional_load);
    if let Some(kind) = parsed.get("response_template").and_then(Value::as_str).and_then(TemplateKind::from_name) {
        analysis.response_template = kind;
    }
    if let Some(terms) = parsed.get("key_medical_terms").and_then(Value::as_array) {
        analysis.key_medical_terms = terms.iter().filter_map(Value::as_str).map(str::to_string).collect();
    }
    analysis
}

/// `"<low>-<high> words"`; the digits of each side are read, anything else
/// in them is ignored.
fn word_range(length: &str) -> Option<(u32, u32)> {
    let (low, high) = length.split_once('-')?;
    if !high.contains("words") {
        return None;
    }
    let digits = |side: &str| side.chars().filter(char::is_ascii_digit).collect::<String>().parse::<u32>().ok();
    Some((digits(low)?, digits(high)?))
}

/// Word budget from the typical length of the examples: upper bound +30
/// for complex questions; urgent questions are otherwise capped at 50 words
/// over the lower bound. A length that is not a word range is used as is.
pub fn length_budget(analysis: &QueryAnalysis, typical_length: &str) -> String {
    let Some((low, high)) = word_range(typical_length) else {
        return typical_length.to_string();
    };
    let high = if analysis.complexity >= 7 {
        high + 30
    } else if analysis.response_template == TemplateKind::Urgent {
        high.min(low + 50)
    } else {
        return typical_length.to_string();
    };
    format!("{low}-{high} words")
}

/// Concrete guidance derived from a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleGuide {
    pub tone: String,
    pub structure: &'static str,
    pub phrasing: String,
    pub engagement: String,
    pub length: String,
}

/// The examples' dominant structure wins over the template's unless it is
/// `mixed`; an unrecognized structure reads as mixed.
pub fn style_guide(analysis: &QueryAnalysis, patterns: &StylePatterns) -> StyleGuide {
    let template = analysis.response_template.template();
    let structure = match patterns.answer_structure.trim() {
        "" | "mixed" => template.structure,
        other => Structure::from_name(other).unwrap_or(Structure::Mixed),
    };
    let tone = format!("{}, {}, {}", template.tone[0], template.tone[1], template.formality);

    let mut phrasing = format!("Use sentences averaging {} words", template.sentence_length);
    phrasing.push_str(if template.jargon_level > 1 {
        ", balance medical terms with simple explanations"
    } else {
        ", minimize jargon for parent-friendly clarity"
    });

    let mut engagement: Vec<&str> = Vec::new();
    if template.engagement.questions > 0 { engagement.push(FOLLOW_UP); }
    if template.engagement.personalization > 0 { engagement.push("Use personalized terms like 'your child'"); }
    if template.engagement.empathy > 0 { engagement.push("Show subtle empathy, e.g., 'I know this can feel concerning'"); }
    if analysis.response_template == TemplateKind::Urgent {
        engagement.retain(|e| *e != FOLLOW_UP);
        engagement.push("Be direct and clear about next steps");
    }
    let engagement = if engagement.is_empty() { "Focus on clear advice".to_string() } else { engagement.join("; ") };

    StyleGuide {
        tone,
        structure: structure.instruction(),
        phrasing,
        engagement,
        length: length_budget(analysis, &patterns.typical_length),
    }
}

fn examples_block(examples: &[ConversationExample], study: &ConversationStudy) -> String {
    if examples.is_empty() {
        return "No comparable conversations are available; rely on the medical information alone.".to_string();
    }
    let mut block = String::from("Real conversations between parents and pediatricians, for style reference only:\n");
    for (i, ex) in examples.iter().enumerate() {
        block.push_str(&format!("{}. Parent: {}\n   Doctor: {}\n", i + 1, ex.question, ex.answer));
    }
    let insights = study.insights_text();
    if !insights.is_empty() {
        block.push_str(&insights);
        block.push('\n');
    }
    block
}

pub fn build_messages(
    query: &str,
    medical_information: &str,
    examples: &[ConversationExample],
    parent_name: &str,
    guide: &StyleGuide,
    study: &ConversationStudy,
) -> Vec<ChatMessage> {
    let system = format!(
        "You are a pediatrician answering a parent's question. Use *only* the medical information provided in the prompt. \
Please answer the final output in English. Follow the chain-of-thought steps outlined: classify the query, reason through options, \
and self-check for accuracy. Respond in a {} tone, with {}, using {}. Avoid speculative or outdated advice. \
If the query is unrelated to the medical info, say: 'I can only answer based on the provided information. Please consult a doctor for more details.'",
        guide.tone, guide.structure, guide.phrasing
    );
    let address = if parent_name.trim().is_empty() {
        "Reply to the parent directly.".to_string()
    } else {
        format!("Address the parent as '{}'.", parent_name.trim())
    };
    let user = format!(
        "You are an experienced pediatrician answering a parent's question. {address}
Your tone is {tone}, like a trusted doctor who is clear and supportive.

Follow this reasoning process internally (do not reveal it to the parent):
1. **Classify the Query**: Is it informational, urgent, or seeking reassurance?
2. **Extract Key Medical Keywords**: Identify the main medical terms and concerns in the parent's question.
3. **Recall Provided Medical Info**: Use only the data from 'Medical Information' below if it answers the question.
   - If the question is unrelated, politely decline.
   - If any relevant points are missing in the 'Medical Information', note them.
4. **Learn From Real Conversations**: Mirror how the doctors below phrase advice and which clarifying questions they ask.
{examples}
5. **Follow Flowchart for Clarification**: If the query is vague or lacks details, use the questioning strategy below.
{flowchart}
   - If the query already provides sufficient details, skip to providing advice.
6. **Consider Knowledge Gaps**: Review the topics that commonly require clarification.
{gaps}
   - If the question relates to one of these topics but lacks details, ask the suggested clarifying question.
7. **Reason Through Options**: If necessary info is missing, ask for clarification, for example the child's age or specific symptom details.
8. **Style Guide Checklist**:
{checklist}
9. **Formulate Answer**: Provide a concise response ({length}) that is {structure}, using {phrasing} and including {engagement}.
10. **Self-Check**: Ensure the answer avoids speculative or outdated advice, stays aligned with the medical info, and matches the query's intent.

**Medical Information**:
{medical_information}

Parent Question: {query}
Respond in clear, simple English. Avoid AI-like verbosity or generic empathy (e.g., 'I understand your concern').",
        tone = guide.tone,
        examples = examples_block(examples, study),
        flowchart = study.flowchart_text(),
        gaps = study.gaps_text(),
        checklist = study.checklist(),
        length = guide.length,
        structure = guide.structure,
        phrasing = guide.phrasing,
        engagement = guide.engagement,
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

pub struct SimplifiedAnswerGenerator<G: Generator> {
    generator: G,
    temperature: f32,
    analyze_query: bool,
    analyze_examples: bool,
}

impl<G: Generator> SimplifiedAnswerGenerator<G> {
    pub fn new(generator: G) -> Self {
        Self { generator, temperature: DEFAULT_TEMPERATURE, analyze_query: true, analyze_examples: true }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_query_analysis(mut self, enabled: bool) -> Self {
        self.analyze_query = enabled;
        self
    }

    pub fn with_example_analysis(mut self, enabled: bool) -> Self {
        self.analyze_examples = enabled;
        self
    }

    /// Scores the question with one low-temperature call. Never fails: a
    /// failed call yields the default analysis.
    pub fn analyze(&self, query: &str) -> QueryAnalysis {
        if !self.analyze_query {
            return QueryAnalysis::default();
        }
        let messages = [ChatMessage::system(ANALYSIS_PROMPT), ChatMessage::user(format!("Parent query: {query}"))];
        match self.generator.generate(&messages, ANALYSIS_TEMPERATURE) {
            Ok(reply) => parse_analysis(&reply),
            Err(e) => {
                warn!(error = %e, "query analysis failed; using defaults");
                QueryAnalysis::default()
            }
        }
    }

    /// Study calls for the examples; the defaults when disabled.
    pub fn study(&self, query: &str, medical_information: &str, examples: &[ConversationExample]) -> ConversationStudy {
        if !self.analyze_examples {
            return ConversationStudy::default();
        }
        conversation::study(&self.generator, query, medical_information, examples)
    }

    /// Only the final call can fail; a blank completion is a failure.
    pub fn generate(&self, query: &str, medical_information: &str, examples: &[ConversationExample], parent_name: &str) -> Result<String> {
        let analysis = self.analyze(query);
        debug!(?analysis, "query analysis");
        let study = self.study(query, medical_information, examples);
        let guide = style_guide(&analysis, &study.patterns);
        let messages = build_messages(query, medical_information, examples, parent_name, &guide, &study);
        let answer = self.generator.generate(&messages, self.temperature)?;
        if answer.trim().is_empty() {
            return Err(Error::Generation("empty simplified answer".into()));
        }
        info!(template = ?analysis.response_template, examples = examples.len(), "simplified answer generated");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_is_extracted_and_clamped() {
        let reply = "Sure! {\"complexity\": 12, \"urgency\": \"0\", \"emotional_load\": 7.8, \"response_template\": \"Urgent\", \"key_medical_terms\": [\"fever\", 3]} done";
        let a = parse_analysis(reply);
        assert_eq!((a.complexity, a.urgency, a.emotional_load), (10, 1, 7));
        assert_eq!(a.response_template, TemplateKind::Urgent);
        assert_eq!(a.key_medical_terms, vec!["fever".to_string()]);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        assert_eq!(parse_analysis("no json here"), QueryAnalysis::default());
        assert_eq!(parse_analysis("} {"), QueryAnalysis::default());
        let unknown = parse_analysis(r#"{"response_template": "poetic", "complexity": 3}"#);
        assert_eq!(unknown.response_template, TemplateKind::Standard);
        assert_eq!(unknown.complexity, 3);
    }

    #[test]
    fn length_budget_rules() {
        let mut a = QueryAnalysis::default();
        assert_eq!(length_budget(&a, DEFAULT_LENGTH), "100-150 words");
        a.complexity = 7;
        assert_eq!(length_budget(&a, DEFAULT_LENGTH), "100-180 words");
        assert_eq!(length_budget(&a, "about 60-90 words"), "60-120 words");
        a.response_template = TemplateKind::Urgent;
        assert_eq!(length_budget(&a, DEFAULT_LENGTH), "100-180 words");
        a.complexity = 4;
        assert_eq!(length_budget(&a, DEFAULT_LENGTH), "100-150 words");
        assert_eq!(length_budget(&a, "40-200 words"), "40-90 words");
        assert_eq!(length_budget(&a, "short"), "short");
    }

    #[test]
    fn example_structure_overrides_template_unless_mixed() {
        let reassuring = QueryAnalysis { response_template: TemplateKind::Reassuring, ..QueryAnalysis::default() };
        let mut patterns = StylePatterns { answer_structure: "mixed".into(), ..StylePatterns::default() };
        assert_eq!(style_guide(&reassuring, &patterns).structure, "Begin with reassurance, then provide advice");
        patterns.answer_structure = "answer_first".into();
        assert_eq!(style_guide(&reassuring, &patterns).structure, "Start with a direct answer, then explain");
        patterns.answer_structure = "storytelling".into();
        assert_eq!(style_guide(&reassuring, &patterns).structure, "Respond flexibly, prioritizing clarity");
    }

    #[test]
    fn urgent_guide_drops_follow_up_question() {
        let a = QueryAnalysis { response_template: TemplateKind::Urgent, ..QueryAnalysis::default() };
        let guide = style_guide(&a, &StylePatterns::default());
        assert_eq!(guide.tone, "directive, clear, formal");
        assert_eq!(guide.structure, "Start with a direct answer, then explain");
        assert!(!guide.engagement.contains(FOLLOW_UP));
        assert!(guide.engagement.ends_with("Be direct and clear about next steps"));

        let standard = style_guide(&QueryAnalysis::default(), &StylePatterns::default());
        assert!(standard.engagement.starts_with(FOLLOW_UP));
        assert!(standard.phrasing.ends_with("minimize jargon for parent-friendly clarity"));
        let detailed = style_guide(&QueryAnalysis { response_template: TemplateKind::Detailed, ..QueryAnalysis::default() }, &StylePatterns::default());
        assert!(detailed.phrasing.starts_with("Use sentences averaging 16 words"));
        assert!(detailed.phrasing.ends_with("balance medical terms with simple explanations"));
    }
}
