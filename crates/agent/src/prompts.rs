//! Prompt templates and history shaping for the turn pipeline.

use docent_core::message::{Message, Role};

/// How many history entries each prompt sees.
pub const HISTORY_WINDOW: usize = 5;

/// How many history entries the memory digest sees.
pub const MEMORY_WINDOW: usize = 10;

pub const QA_SYSTEM_PROMPT: &str = "\
You are a helpful document assistant specialized in answering questions.

Your role is to:
1. Carefully analyze user questions
2. Use the document lookup tool to retrieve relevant documents
3. Provide accurate, well-structured answers based ONLY on the retrieved documents
4. Cite your sources when providing information
5. Be honest when you don't have enough information to answer a question

Always ground your responses in the provided context. If the documents don't contain
the information needed to answer a question, say so clearly.";

pub const SUMMARIZATION_SYSTEM_PROMPT: &str = "\
You are a helpful document assistant specialized in summarization.

Your role is to:
1. Use the document lookup tool to retrieve relevant documents
2. Analyze and understand the main points from all retrieved documents
3. Create comprehensive summaries that capture key information
4. Organize summaries in a clear, logical structure
5. Highlight the most important information

Provide summaries that are:
- Concise but thorough
- Well-organized
- Focused on key insights
- Grounded in the actual document content";

pub const CALCULATION_SYSTEM_PROMPT: &str = "\
You are a helpful document assistant specialized in calculations.

Your role is to:
1. Determine which document contains the data needed for the calculation
2. Use the document lookup tool to retrieve the relevant document
3. Carefully extract the numerical data from the document
4. Determine the mathematical expression to calculate based on the user's input
5. Use the calculator tool to perform ALL calculations, no matter how simple
6. Present the result clearly with proper context from the documents

IMPORTANT:
- ALWAYS use the calculator tool for ALL mathematical operations
- NEVER perform calculations mentally or manually
- Cite the source document for any numbers used
- Show your work and explain the calculation steps";

const MEMORY_SYSTEM_PROMPT: &str = "\
You maintain the rolling memory of a document assistant. Given recent
conversation, produce a brief summary (2-3 sentences) and the list of
document ids actively being discussed.";

/// History with tool-role entries removed, trimmed to the last
/// [`HISTORY_WINDOW`] entries.
pub fn trimmed_history(messages: &[Message]) -> Vec<Message> {
    let kept: Vec<&Message> = messages.iter().filter(|m| m.role != Role::Tool).collect();
    let start = kept.len().saturating_sub(HISTORY_WINDOW);
    kept[start..].iter().map(|m| (*m).clone()).collect()
}

/// Render history as `role: content` lines for embedding in a prompt.
pub fn format_history(messages: &[Message]) -> String {
    if messages.is_empty() {
        return "No previous conversation.".into();
    }
    messages
        .iter()
        .map(|m| format!("{}: {}", role_name(m.role), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
        Role::Tool => "tool",
    }
}

/// The classification instruction, with labeled examples for each
/// supported intent.
pub fn classification_prompt(user_input: &str, history: &[Message]) -> String {
    format!(
        "Analyze the user's input and classify their intent.

User Input: {user_input}

Conversation History:
{history}

Classify the intent as one of the following:
- \"qa\": The user is asking a question that requires finding and presenting specific information from documents
- \"summarization\": The user wants a summary or overview of document(s)
- \"calculation\": The user wants to perform mathematical calculations on data from document(s)
- \"unknown\": The intent doesn't clearly fit the above categories

Provide your classification with:
1. intent: One of the four types above
2. confidence: A score between 0 and 1 indicating your confidence
3. rationale: A clear explanation for why you chose this classification

Examples:
- \"What is the revenue?\" -> qa
- \"Summarize the Q2 report\" -> summarization
- \"What's the total of sales in January and February?\" -> calculation
- \"Calculate the average revenue\" -> calculation",
        user_input = user_input,
        history = format_history(&trimmed_history(history)),
    )
}

/// The single folded user message for a grounded call: prior history,
/// tool results, and the original question in one instruction.
pub fn grounding_prompt(history: &[Message], tool_results: &str, question: &str) -> String {
    let results = if tool_results.trim().is_empty() {
        "No tool results available."
    } else {
        tool_results
    };
    format!(
        "Answer the user's question using the conversation so far and the tool results below.

Conversation so far:
{history}

Tool results:
{results}

User question: {question}

Ground your answer in the tool results above. Cite the source document ids you used.
If the tool results don't contain the information needed, say so clearly.",
        history = format_history(&trimmed_history(history)),
        results = results,
        question = question,
    )
}

/// The memory digest instruction over recent history plus the current
/// exchange.
pub fn memory_prompt(messages: &[Message], user_input: &str, answer: &str) -> String {
    let kept: Vec<&Message> = messages.iter().filter(|m| m.role != Role::Tool).collect();
    let start = kept.len().saturating_sub(MEMORY_WINDOW);
    let recent: Vec<Message> = kept[start..].iter().map(|m| (*m).clone()).collect();

    format!(
        "{system}

Recent messages:
{recent}

Current exchange:
User: {user_input}
Assistant: {answer}

Provide:
1. A brief summary of the conversation (2-3 sentences)
2. The list of document ids being actively discussed",
        system = MEMORY_SYSTEM_PROMPT,
        recent = format_history(&recent),
        user_input = user_input,
        answer = answer,
    )
}
