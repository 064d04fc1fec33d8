// Prompt assembly for each dashboard feature

use crate::models::{ChatMessage, TextKind};

pub const DEFAULT_PERSONA: &str =
    "You are a friendly and helpful AI assistant. Give natural, accurate answers.";

// Only the head of a CSV file is sent to the backend
pub const CSV_PROMPT_CHARS: usize = 1000;
pub const MAX_TODO_RECOMMENDATIONS: usize = 5;

pub fn chat_prompt(messages: &[ChatMessage]) -> String {
    let mut prompt = messages
        .iter()
        .find(|msg| msg.role == "system")
        .map(|msg| msg.content.clone())
        .unwrap_or_else(|| DEFAULT_PERSONA.to_string());

    let conversation: Vec<&ChatMessage> = messages.iter().filter(|msg| msg.role != "system").collect();

    if !conversation.is_empty() {
        prompt.push_str("\n\nConversation so far:\n");
        for msg in &conversation {
            let speaker = if msg.role == "user" { "User" } else { "Assistant" };
            prompt.push_str(&format!("{}: {}\n", speaker, msg.content));
        }
    }

    if let Some(question) = conversation.iter().rev().find(|msg| msg.role == "user") {
        prompt.push_str(&format!("\nAnswer the current question: {}", question.content));
    }

    prompt
}

pub fn text_prompt(request: &str, kind: TextKind) -> String {
    let system = match kind {
        TextKind::Blog => {
            "You are a professional blog writer. Write an engaging, easy-to-read, \
             SEO-friendly blog post on the given topic."
        }
        TextKind::Marketing => {
            "You are a marketing expert. Write compelling, persuasive marketing copy \
             for the given product or service."
        }
        TextKind::General => {
            "You are a helpful AI assistant. Produce high-quality text for the user's request."
        }
    };

    format!("{}\n\nRequest: {}", system, request)
}

pub fn file_analysis_prompt(file_name: &str, content: &str) -> String {
    format!(
        "You are a document analysis expert. Analyse the file below and summarise its key content.\n\n\
         File name: {}\n\n\
         Content:\n{}\n\n\
         Answer in this format:\n\n\
         ## Summary\n\n\
         ## Key Points\n\n\
         ## Insights",
        file_name, content
    )
}

pub fn csv_analysis_prompt(file_name: &str, csv: &str) -> String {
    let head: String = csv.chars().take(CSV_PROMPT_CHARS).collect();
    format!(
        "You are a data analysis expert. Analyse the CSV data and suggest suitable visualisations.\n\n\
         File name: {}\n\n\
         CSV data (first {} characters):\n{}\n\n\
         Answer in this format:\n\n\
         ## Overview\n\n\
         ## Key Features\n\n\
         ## Suggested Charts\n\n\
         ## Insights",
        file_name, CSV_PROMPT_CHARS, head
    )
}

pub fn todo_prompt(existing: &[String], user_context: &str) -> String {
    format!(
        "You are a productivity coach. Suggest practical, actionable tasks that complement \
         the user's list.\n\n\
         Existing tasks:\n{}\n\n\
         Additional context: {}\n\n\
         Recommend 3-5 tasks. Write each on its own line without numbers or bullet points.",
        existing.join("\n"),
        user_context
    )
}

// One recommendation per non-blank line, capped
pub fn parse_recommendations(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_TODO_RECOMMENDATIONS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn chat_prompt_uses_system_message_and_last_question() {
        let prompt = chat_prompt(&[
            msg("system", "Be terse."),
            msg("user", "hi"),
            msg("assistant", "hello"),
            msg("user", "what is rust?"),
        ]);

        assert!(prompt.starts_with("Be terse."));
        assert!(prompt.contains("User: hi\nAssistant: hello\nUser: what is rust?\n"));
        assert!(prompt.ends_with("Answer the current question: what is rust?"));
    }

    #[test]
    fn chat_prompt_defaults_persona() {
        let prompt = chat_prompt(&[msg("user", "hi")]);
        assert!(prompt.starts_with(DEFAULT_PERSONA));
    }

    #[test]
    fn text_prompt_varies_by_kind() {
        assert!(text_prompt("shoes", TextKind::Marketing).contains("marketing expert"));
        assert!(text_prompt("rust", TextKind::Blog).contains("blog writer"));
        assert!(text_prompt("x", TextKind::General).ends_with("Request: x"));
    }

    #[test]
    fn csv_prompt_truncates_data() {
        let csv = "a,b\n".repeat(1000);
        let prompt = csv_analysis_prompt("data.csv", &csv);
        assert!(prompt.contains(&csv[..CSV_PROMPT_CHARS]));
        assert!(!prompt.contains(&csv[..CSV_PROMPT_CHARS + 4]));
    }

    #[test]
    fn recommendations_skip_blank_lines_and_cap_at_five() {
        let text = "Plan the week\n\n  Review PRs  \nWrite tests\nCall mom\nStretch\nSleep early\n";
        let recs = parse_recommendations(text);

        assert_eq!(recs.len(), 5);
        assert_eq!(recs[1], "Review PRs");
        assert_eq!(recs[4], "Stretch");
    }
}
