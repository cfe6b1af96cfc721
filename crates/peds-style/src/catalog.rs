//! Fixed style catalog: every variant of every category with its guidance.

/// Guidance attached to one catalog variant.
#[derive(Debug, PartialEq, Eq)]
pub struct StyleEntry {
    pub description: &'static str,
    pub markers: [&'static str; 5],
    pub example: &'static str,
}

macro_rules! catalog_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name { $($variant),+ }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn name(self) -> &'static str {
                match self { $($name::$variant => $wire),+ }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name { $($wire => Some($name::$variant),)+ _ => None }
            }
        }
    };
}

catalog_enum!(Tone { Friendly => "friendly", Balanced => "balanced", Formal => "formal" });
catalog_enum!(DetailLevel { Brief => "brief", Moderate => "moderate", Comprehensive => "comprehensive" });
catalog_enum!(Empathy { Low => "low", Moderate => "moderate", High => "high" });
catalog_enum!(ProfessionalStyle {
    LaypersonFriendly => "laypersonFriendly",
    ClinicallyBalanced => "clinicallyBalanced",
    Technical => "technical",
});

impl Tone {
    pub fn entry(self) -> &'static StyleEntry {
        match self {
            Tone::Friendly => &TONE_FRIENDLY,
            Tone::Balanced => &TONE_BALANCED,
            Tone::Formal => &TONE_FORMAL,
        }
    }
}

impl DetailLevel {
    pub fn entry(self) -> &'static StyleEntry {
        match self {
            DetailLevel::Brief => &DETAIL_BRIEF,
            DetailLevel::Moderate => &DETAIL_MODERATE,
            DetailLevel::Comprehensive => &DETAIL_COMPREHENSIVE,
        }
    }
}

impl Empathy {
    pub fn entry(self) -> &'static StyleEntry {
        match self {
            Empathy::Low => &EMPATHY_LOW,
            Empathy::Moderate => &EMPATHY_MODERATE,
            Empathy::High => &EMPATHY_HIGH,
        }
    }
}

impl ProfessionalStyle {
    pub fn entry(self) -> &'static StyleEntry {
        match self {
            ProfessionalStyle::LaypersonFriendly => &PRO_LAYPERSON,
            ProfessionalStyle::ClinicallyBalanced => &PRO_CLINICAL,
            ProfessionalStyle::Technical => &PRO_TECHNICAL,
        }
    }
}

static TONE_FRIENDLY: StyleEntry = StyleEntry {
    description: "Adopt a warm, reassuring style that fosters a personal connection with parents or guardians. \
        Use welcoming language and inclusive pronouns (e.g., 'we' or 'together') to build trust. \
        Aim to convey empathy and genuine concern for the child's well-being while explaining medical details.",
    markers: [
        "Use a friendly, approachable tone and first-person pronouns such as 'I' or 'we'",
        "Include gentle phrases (e.g., 'you know,' 'let’s see') to put parents at ease",
        "Offer brief, relatable anecdotes or stories to illustrate points",
        "Rephrase technical terms or clarify them in plain language when first introduced",
        "Acknowledge the emotional concerns parents may have in a caring but non-patronizing way",
    ],
    example: "I understand it can be scary to see your child feeling unwell, especially if it seems to happen frequently. \
        Remember, you’re not alone, and there are steps we can take together to help your child feel better. \
        Let’s discuss each symptom and find practical ways to manage them.",
};

static TONE_BALANCED: StyleEntry = StyleEntry {
    description: "Blend a professional, knowledgeable tone with an approachable manner. \
        This style offers enough technical depth to reassure parents of your expertise, \
        while remaining accessible and easy to follow. Aim for clarity and empathy without extensive informality.",
    markers: [
        "Maintain a measured, informed tone that balances professional and accessible language",
        "Introduce medical terms alongside concise, plain-language definitions",
        "Use calm, reassuring language to instill confidence without being overly casual",
        "Encourage questions and clarify complex areas without overwhelming detail",
        "Acknowledge that parents may feel worried while offering balanced reassurance",
    ],
    example: "Certain pediatric conditions can lead to frequent infections or discomfort. While it may sound concerning, \
        there are evidence-based treatments and preventive measures that can help. Let’s explore these step by step.",
};

static TONE_FORMAL: StyleEntry = StyleEntry {
    description: "Present information in a structured, authoritative manner, using precise medical terminology \
        and a more formal register. This style positions you as a subject-matter expert who communicates \
        complex details systematically and objectively.",
    markers: [
        "Use advanced medical terms and formal phrasing",
        "Prefer a third-person perspective or passive constructions (e.g., 'it is recommended')",
        "Employ transitional phrases like 'furthermore,' 'in addition,' or 'moreover' to structure discourse",
        "Maintain a respectful distance and professional tone, focusing on clear, factual statements",
        "Clarify intricate concepts thoroughly, anticipating the need for explicit definitions",
    ],
    example: "A comprehensive pediatric assessment often involves both physical examination and developmental screening. \
        Furthermore, adherence to immunization schedules has been correlated with a reduced incidence of common childhood illnesses.",
};

static DETAIL_BRIEF: StyleEntry = StyleEntry {
    description: "Provide concise answers that focus on essential information. Ideal for busy parents needing quick insights without depth.",
    markers: [
        "Quick, essential overviews only",
        "Limit details to key actions or conclusions",
        "Avoid in-depth background",
        "Use direct, brief sentences",
        "Minimize technical terms",
    ],
    example: "To support your child's health, ensure regular check-ups, maintain recommended vaccinations, and monitor any changes in their symptoms.",
};

static DETAIL_MODERATE: StyleEntry = StyleEntry {
    description: "Balance conciseness with enough detail to give clarity. Explain recommendations clearly, \
        providing some medical background to help parents understand their importance.",
    markers: [
        "Brief explanations of important concepts",
        "Use examples to clarify crucial points",
        "Discuss treatment effectiveness briefly",
        "Outline actionable steps for home care",
        "Provide context to anticipate common questions",
    ],
    example: "During a typical pediatric visit, we check growth and development milestones to ensure your child is progressing normally. \
        Staying consistent with vaccinations helps protect against common illnesses and supports overall well-being.",
};

static DETAIL_COMPREHENSIVE: StyleEntry = StyleEntry {
    description: "Provide thorough explanations, including various aspects of the condition, treatment options, and long-term strategies. \
        Suitable for parents seeking an in-depth understanding.",
    markers: [
        "In-depth discussion of underlying mechanisms or causes",
        "Cite studies and guidelines",
        "Compare different treatment strategies",
        "Discuss potential complications and prevention",
        "Suggest considering comprehensive care options",
    ],
    example: "Certain pediatric conditions may be influenced by genetic factors and environmental triggers, \
        leading to recurring symptoms. Management strategies could include specialized therapies, routine check-ups, \
        and tailored home interventions. Research published in leading pediatric journals supports early intervention \
        as a key factor in improving long-term outcomes.",
};

static EMPATHY_LOW: StyleEntry = StyleEntry {
    description: "Keep the focus strictly on objective information with minimal emotional language. \
        This style may be appropriate for parents who prioritize data, research, and direct solutions \
        over personal reassurance.",
    markers: [
        "Emphasize clinical outcomes, data, and treatment effectiveness",
        "Use impersonal or third-person constructions (e.g., 'the child may experience...')",
        "Avoid empathetic phrases or mentions of emotional impact",
        "Present facts in a detached, matter-of-fact way",
        "Limit reassurance to short statements of efficacy or results",
    ],
    example: "Studies indicate that children receiving regular developmental screenings have fewer missed diagnoses. \
        Adhering to treatment protocols is correlated with improved outcomes for conditions such as asthma or eczema.",
};

static EMPATHY_MODERATE: StyleEntry = StyleEntry {
    description: "Blend practical guidance with an understanding tone. Offer empathy and reassurance in moderation, \
        acknowledging the emotional toll on parents while remaining focused on actionable steps. \
        This style suits parents who need both information and a touch of emotional support.",
    markers: [
        "Offer concise reassurance or acknowledgment of emotional concerns",
        "Use a calm, composed tone when discussing sensitive topics",
        "Focus on factual steps while occasionally validating feelings",
        "Provide logical explanations tied to practical benefits",
        "Encourage parents to stay hopeful but also realistic",
    ],
    example: "I know it can feel overwhelming when your child experiences frequent colds. \
        However, maintaining a consistent handwashing routine, a balanced diet, and regular check-ups can greatly reduce both the frequency and severity of these illnesses.",
};

static EMPATHY_HIGH: StyleEntry = StyleEntry {
    description: "Prioritize emotional support and reassurance in your communication. This style is particularly appropriate \
        for parents who feel anxious or overwhelmed and benefit from consistent empathy. Stress that their feelings \
        are valid and that help is available.",
    markers: [
        "Use language that frequently validates parents’ worries and emotional state",
        "Reassure them that they are doing their best for their child",
        "Incorporate comforting phrases to normalize their fears and anxieties",
        "Acknowledge emotional burden and emphasize partnership in the child’s care",
        "Balance emotional support with appropriate medical guidance",
    ],
    example: "I truly understand how concerning it can be when your little one is feeling unwell. \
        It’s never easy watching them struggle, but please remember that you’re already taking important steps by asking questions and seeking care. \
        We’ll work together to find the best approach for your child’s needs.",
};

static PRO_LAYPERSON: StyleEntry = StyleEntry {
    description: "Use plain language and familiar analogies that even those without medical backgrounds can grasp. \
        Strive to simplify complex medical ideas, ensuring parents feel comfortable and confident asking \
        follow-up questions without feeling intimidated.",
    markers: [
        "Use everyday examples (e.g., comparing the body to a machine that sometimes needs a tune-up)",
        "Avoid excessive medical jargon; if used, provide simple definitions immediately",
        "Break down complex processes into step-by-step explanations",
        "Confirm understanding by encouraging feedback or questions from parents",
        "Emphasize collaboration in caring for the child",
    ],
    example: "Think of your child’s immune system like a protective shield. Sometimes, that shield gets weak, and germs can sneak in, causing illness. \
        Let’s talk about the ways we can help strengthen that shield, like good nutrition, plenty of rest, and regular handwashing.",
};

static PRO_CLINICAL: StyleEntry = StyleEntry {
    description: "Combine the use of standard medical terminology with clear, accessible explanations. \
        This approach reassures parents of your expertise while ensuring they can follow along \
        without feeling lost in technical details.",
    markers: [
        "Introduce and define medical terms in plain language",
        "Use a structured approach, starting with basic concepts before building to more complex ones",
        "Reference well-known guidelines or therapies, explaining how they work in everyday situations",
        "Encourage parents to ask questions about any terms or concepts that remain unclear",
        "Include general clinical data or research in a digestible format",
    ],
    example: "If your child often experiences ear infections, known medically as otitis media, we can manage them by using appropriate antibiotics, \
        ensuring follow-up exams, and possibly exploring preventive measures if infections are recurrent.",
};

static PRO_TECHNICAL: StyleEntry = StyleEntry {
    description: "Employ advanced medical terminology and in-depth physiological or clinical explanations. \
        Best suited for discussions with parents who have a strong medical background or a desire \
        for highly detailed scientific information.",
    markers: [
        "Use specialized medical vocabulary (e.g., 'inflammatory response', 'pathophysiology')",
        "Include references to relevant clinical guidelines or research findings where applicable",
        "Discuss treatment protocols in detail, including dosing considerations and scientific rationale",
        "Highlight potential comorbidities or complications with clinical specificity",
        "Include possible future developments or ongoing clinical trials if applicable",
    ],
    example: "Recurrent otitis media can lead to complications such as tympanic membrane perforation or conductive hearing loss. \
        Current guidelines suggest a watch-and-wait approach for mild symptoms, followed by antibiotic therapy when clinically indicated, \
        to mitigate antibiotic resistance. For persistent cases, tympanostomy tubes may be considered.",
};
