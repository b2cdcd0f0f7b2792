use crate::intent::Intent;

/// An immutable persona bundle shaping one completion request. Profiles are
/// data: the persona text is the system instruction sent upstream, and the
/// optional temperature is forwarded as a model parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentProfile {
    pub id: &'static str,
    pub persona: &'static str,
    pub temperature: Option<f32>,
}

const GREETING_PERSONA: &str = "You are Scout, a friendly and helpful AI agent for CryptoTasks. \
     Greet the user back warmly and offer to help scout freelancers. \
     If the user says thank you or similar, reply with a friendly message like 'You're welcome!' \
     and offer further help. Be concise and polite in all responses.";

const FREELANCER_PERSONA: &str = "You are Scout, a freelancer-scouting AI agent for CryptoTasks. \
     Analyze the user's request and select the top 3 best matching freelancers from the provided \
     list. If there is no perfect match, suggest the closest freelancers and explain why you chose \
     them. Remember the freelancers you last suggested so the user can refine the selection in a \
     follow-up (for example 'narrow it down to 2'); the prior suggestions arrive as part of the \
     conversation context. Always include the freelancer names in your response and explain your \
     reasoning conversationally, not just as a list. Only reference freelancers from the provided \
     list. If the request is unclear or no one matches, politely ask for clarification or suggest \
     the closest options.";

const PROPOSAL_PERSONA: &str = "You are Scout, a proposal-drafting AI agent for CryptoTasks. \
     Help the user put together a project proposal for a freelancer: collect the project details, \
     duration, and budget, then draft a clear, professional proposal message. Confirm the details \
     back to the user before they send it. Be concise and structured.";

const PROFILES: [AgentProfile; 3] = [
    AgentProfile { id: "scout-greeting", persona: GREETING_PERSONA, temperature: Some(0.7) },
    AgentProfile { id: "scout-freelancer", persona: FREELANCER_PERSONA, temperature: Some(0.3) },
    AgentProfile { id: "scout-proposal", persona: PROPOSAL_PERSONA, temperature: Some(0.3) },
];

/// The static 1:1 intent -> profile table, enumerated once at startup. Lookup
/// is total; there is exactly one profile per intent.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileTable;

impl ProfileTable {
    pub fn new() -> Self {
        Self
    }

    pub fn for_intent(&self, intent: Intent) -> &'static AgentProfile {
        match intent {
            Intent::Greeting => &PROFILES[0],
            Intent::FreelancerMatch => &PROFILES[1],
            Intent::ProposalFlow => &PROFILES[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProfileTable;
    use crate::intent::Intent;

    #[test]
    fn every_intent_resolves_to_a_distinct_profile() {
        let table = ProfileTable::new();
        let greeting = table.for_intent(Intent::Greeting);
        let freelancer = table.for_intent(Intent::FreelancerMatch);
        let proposal = table.for_intent(Intent::ProposalFlow);

        assert_eq!(greeting.id, "scout-greeting");
        assert_eq!(freelancer.id, "scout-freelancer");
        assert_eq!(proposal.id, "scout-proposal");
        assert_ne!(greeting.persona, freelancer.persona);
        assert_ne!(freelancer.persona, proposal.persona);
    }

    #[test]
    fn lookup_is_stable_across_calls() {
        let table = ProfileTable::new();
        assert_eq!(table.for_intent(Intent::Greeting), table.for_intent(Intent::Greeting));
    }
}
