use serde::{Deserialize, Serialize};

/// A freelancer record supplied by the caller. The shape is owned by the
/// frontend; Scout forwards it verbatim as completion context and never
/// inspects individual fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(pub serde_json::Value);

/// One inbound conversational turn. Constructed fresh per request and
/// discarded with the response; Scout keeps no cross-request state, so any
/// "memory" of prior suggestions must arrive inside this payload.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversationTurn {
    pub user_text: String,
    pub candidate_pool: Vec<Candidate>,
}

impl ConversationTurn {
    pub fn new(user_text: impl Into<String>, candidate_pool: Vec<Candidate>) -> Self {
        Self { user_text: user_text.into(), candidate_pool }
    }
}

/// The text produced by a single completion call, returned verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompletionResult {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::{Candidate, ConversationTurn};

    #[test]
    fn candidate_round_trips_as_transparent_json() {
        let raw = serde_json::json!({
            "name": "Ana",
            "role": "Data Scientist",
            "wallet": "0xabc",
        });
        let candidate: Candidate =
            serde_json::from_value(raw.clone()).expect("candidate should deserialize");
        assert_eq!(candidate.0, raw);

        let serialized = serde_json::to_value(&candidate).expect("candidate should serialize");
        assert_eq!(serialized, raw);
    }

    #[test]
    fn turn_carries_caller_supplied_pool_unmodified() {
        let pool = vec![
            Candidate(serde_json::json!({"name": "Ana"})),
            Candidate(serde_json::json!({"name": "Bo"})),
        ];
        let turn = ConversationTurn::new("find me a designer", pool.clone());
        assert_eq!(turn.user_text, "find me a designer");
        assert_eq!(turn.candidate_pool, pool);
    }
}
