/// Company knowledge the model answers from when no context file is given.
pub const DEFAULT_CONTEXT: &str = include_str!("../assets/company_context.txt");

/// Characters of document text included in a prompt.
const MAX_DOCUMENT_CHARS: usize = 8000;

/// Convert a character index to a byte index for UTF-8 safe slicing
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn build_prompt(context: &str, documents: &str, question: &str) -> String {
    let mut prompt = String::from(context.trim_end());

    if !documents.is_empty() {
        let cut = char_to_byte_index(documents, MAX_DOCUMENT_CHARS);
        if cut < documents.len() {
            prompt.push_str("\n\n=== STANDARD OPERATING PROCEDURES (Excerpt) ===\n");
            prompt.push_str(&documents[..cut]);
        } else {
            prompt.push_str("\n\n=== STANDARD OPERATING PROCEDURES ===\n");
            prompt.push_str(documents);
        }
    }

    prompt.push_str("\n\nUser Question: ");
    prompt.push_str(question);
    prompt.push_str(
        "\n\nInstructions: Answer the user's question based ONLY on the information provided above. \
         If the information is not available, say so politely. \
         Keep your answer concise and professional (2-3 sentences maximum).\n\nAnswer:",
    );

    prompt
}
