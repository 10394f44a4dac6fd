//! ReAct prompts, step transitions and reply parsing.

/// Appended to the persona prompts of every ReAct agent.
pub const REACT_INSTRUCTIONS: &str = "You are a ReAct (Reasoning and Acting) agent. Follow this pattern:
1. THOUGHT: Think about the user's request and what you need to do
2. ACTION: Decide on the specific action or response you will provide
3. OBSERVATION: Reflect on your action and its effectiveness

Format your response as:
THOUGHT: [your reasoning about the request]
ACTION: [your specific response or action]
OBSERVATION: [reflection on your response]

Be thorough in your reasoning and provide helpful, well-considered responses.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactStep {
    Think,
    Respond,
}

/// Evaluated before every think step.
pub fn next_step(iteration: u32, max_iterations: u32, has_action: bool) -> ReactStep {
    if iteration >= max_iterations || has_action {
        ReactStep::Respond
    } else {
        ReactStep::Think
    }
}

/// Instruction for think step `iteration` (zero-based).
pub fn think_prompt(iteration: u32, max_iterations: u32) -> String {
    format!(
        "This is reasoning iteration {}/{}.\n\
         Think step by step about the user's request. Consider:\n\
         - What is the user really asking for?\n\
         - What information do you need to provide a helpful response?\n\
         - What approach would be most effective?\n\
         \n\
         Provide your thoughts in this format:\n\
         THOUGHT: [your detailed reasoning]",
        iteration + 1,
        max_iterations
    )
}

/// Instruction for the final step, carrying the latest thought.
pub fn respond_prompt(thought: Option<&str>) -> String {
    format!(
        "Previous reasoning: {}\n\
         \n\
         Now provide your final response using the ReAct format:\n\
         THOUGHT: [final reasoning about your response]\n\
         ACTION: [your actual response to the user]\n\
         OBSERVATION: [reflection on how well this addresses the user's needs]\n\
         \n\
         Make sure your ACTION contains a complete and helpful response to the user's question.",
        thought.unwrap_or("No previous reasoning")
    )
}

fn marker_value<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.trim_start().strip_prefix(marker).map(str::trim)
}

/// The first `THOUGHT:` line of a think reply, or `None`.
pub fn parse_thought(reply: &str) -> Option<String> {
    reply
        .lines()
        .find_map(|line| marker_value(line, "THOUGHT:"))
        .map(str::to_string)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactReply {
    pub thought: String,
    pub action: String,
    pub observation: String,
}

impl ReactReply {
    /// Missing markers leave their part empty; repeated markers keep the last.
    pub fn parse(reply: &str) -> Self {
        let mut parsed = Self::default();
        for line in reply.lines() {
            if let Some(v) = marker_value(line, "THOUGHT:") {
                parsed.thought = v.to_string();
            } else if let Some(v) = marker_value(line, "ACTION:") {
                parsed.action = v.to_string();
            } else if let Some(v) = marker_value(line, "OBSERVATION:") {
                parsed.observation = v.to_string();
            }
        }
        parsed
    }

    /// The user-visible reply.
    pub fn compose(&self) -> String {
        format!(
            "**Reasoning:** {}\n\n**Response:** {}\n\n**Reflection:** {}",
            self.thought, self.action, self.observation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thinks_until_iteration_limit() {
        assert_eq!(next_step(0, 3, false), ReactStep::Think);
        assert_eq!(next_step(2, 3, false), ReactStep::Think);
        assert_eq!(next_step(3, 3, false), ReactStep::Respond);
        assert_eq!(next_step(0, 0, false), ReactStep::Respond);
        assert_eq!(next_step(1, 3, true), ReactStep::Respond);
    }

    #[test]
    fn think_prompt_is_one_based() {
        assert!(think_prompt(0, 3).starts_with("This is reasoning iteration 1/3.\n"));
        assert!(think_prompt(0, 3).ends_with("THOUGHT: [your detailed reasoning]"));
    }

    #[test]
    fn respond_prompt_defaults_reasoning() {
        assert!(respond_prompt(None).starts_with("Previous reasoning: No previous reasoning\n"));
        assert!(respond_prompt(Some("check the cards")).starts_with("Previous reasoning: check the cards\n"));
    }

    #[test]
    fn thought_is_first_marker_line() {
        let reply = "Let me see.\nTHOUGHT: they want a summary\nTHOUGHT: second";
        assert_eq!(parse_thought(reply).as_deref(), Some("they want a summary"));
        assert_eq!(parse_thought("no marker here"), None);
    }

    #[test]
    fn composes_reply_from_markers() {
        let reply = ReactReply::parse(
            "THOUGHT: user asks for a card\nACTION: Here is card 3.\nOBSERVATION: concise enough",
        );
        assert_eq!(
            reply.compose(),
            "**Reasoning:** user asks for a card\n\n**Response:** Here is card 3.\n\n**Reflection:** concise enough"
        );
    }

    #[test]
    fn missing_markers_leave_parts_empty() {
        let reply = ReactReply::parse("just prose");
        assert_eq!(reply, ReactReply::default());
        assert_eq!(reply.compose(), "**Reasoning:** \n\n**Response:** \n\n**Reflection:** ");
    }
}
