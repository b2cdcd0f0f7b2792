/// The classified purpose of a user's message. Classification is total:
/// every utterance maps to exactly one intent, with `Greeting` doubling as
/// the deliberate catch-all for unmatched input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    Greeting,
    FreelancerMatch,
    ProposalFlow,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::FreelancerMatch => "freelancer_match",
            Self::ProposalFlow => "proposal_flow",
        }
    }
}

/// Priority-ordered rule groups. The first group containing any matching
/// keyword wins, so the tie-break between groups is this array's order, not
/// implicit code order. Matching is substring containment, not word-boundary
/// matching ("topic" contains "top"); that imprecision is inherited behavior
/// and kept on purpose.
const RULES: &[(&[&str], Intent)] = &[
    (&["hi", "hello", "hey", "thank you", "thanks", "you're welcome"], Intent::Greeting),
    (
        &[
            "freelancer",
            "top",
            "filter",
            "match",
            "designer",
            "developer",
            "data scientist",
            "engineer",
        ],
        Intent::FreelancerMatch,
    ),
    (
        &[
            "give my project",
            "project details",
            "send project proposal",
            "proposal",
            "duration",
            "budget",
        ],
        Intent::ProposalFlow,
    ),
];

/// Maps an utterance to its intent. Pure and deterministic: normalization is
/// an ASCII case-fold, rule groups are evaluated in priority order, and
/// anything unmatched falls back to `Greeting`.
pub fn classify(utterance: &str) -> Intent {
    let normalized = normalize_text(utterance);

    for (keywords, intent) in RULES {
        if keywords.iter().any(|keyword| normalized.contains(keyword)) {
            return *intent;
        }
    }

    Intent::Greeting
}

fn normalize_text(text: &str) -> String {
    text.to_ascii_lowercase()
}
