//! Decide how a chat message is answered before the model is involved.

use std::sync::OnceLock;

use oncosimis_core::FileRef;
use rand::seq::IndexedRandom;
use regex::Regex;

const GREETING_KEYWORDS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "greetings",
    "howdy",
    "hola",
];

const GREETING_REPLIES: &[&str] = &[
    "Hello! I'm the Oncosimis AI Assistant. I'm here to help you learn about our biotechnology platforms and services. What would you like to know?",
    "Hi there! Welcome to Oncosimis Biotech. I can tell you about our AcceTT® and BacSec® platforms, our team, or help you find Standard Operating Procedures. How can I assist you today?",
    "Greetings! I'm your AI assistant for Oncosimis Biotech. Ask me about our technologies, team, or request any SOPs you need.",
    "Hello! Nice to meet you. I'm here to provide information about Oncosimis Biotech's innovative biotechnology solutions. What interests you most?",
];

const FILE_KEYWORDS: &[&str] = &[
    "sop",
    "procedure",
    "file",
    "document",
    "download",
    "send me",
    "give me",
    "show me",
    "need",
    "list",
];

/// Words that ask for every document when nothing matches by name.
const LIST_ALL_WORDS: &[&str] = &["all", "list", "available", "show"];

/// Greetings longer than this are treated as real questions.
const MAX_GREETING_WORDS: usize = 3;

/// Message words must be longer than this to match a filename.
const MIN_MATCH_WORD_CHARS: usize = 3;

const MAX_LISTED_FILES: usize = 10;

pub const NO_MATCHING_FILES: &str = "I couldn't find any documents matching your request. Try asking 'show me all SOPs' to see all available documents.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Greeting,
    Files(Vec<FileRef>),
    NoMatchingFiles,
    /// Forward to the model.
    Ask,
}

fn words(text: &str) -> Vec<&str> {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let re = WORD.get_or_init(|| Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)?").unwrap());
    re.find_iter(text).map(|m| m.as_str()).collect()
}

pub fn route(message: &str, documents: &[String]) -> Route {
    let lower = message.trim().to_lowercase();
    let message_words = words(&lower);

    if is_greeting(&message_words) {
        return Route::Greeting;
    }

    let is_file_request = FILE_KEYWORDS.iter().any(|k| lower.contains(k));
    if !is_file_request || documents.is_empty() {
        return Route::Ask;
    }

    let files = matching_documents(&lower, &message_words, documents);
    if files.is_empty() {
        Route::NoMatchingFiles
    } else {
        Route::Files(files)
    }
}

fn is_greeting(message_words: &[&str]) -> bool {
    if message_words.is_empty() || message_words.len() > MAX_GREETING_WORDS {
        return false;
    }
    let phrase = message_words.join(" ");
    GREETING_KEYWORDS.iter().any(|keyword| {
        if keyword.contains(' ') {
            phrase.contains(keyword)
        } else {
            message_words.contains(keyword)
        }
    })
}

/// Whitespace-separated words with surrounding punctuation removed, so
/// document numbers such as `sop-001` stay whole.
fn name_keywords(lower: &str) -> Vec<&str> {
    lower
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > MIN_MATCH_WORD_CHARS)
        .collect()
}

fn matching_documents(lower: &str, message_words: &[&str], documents: &[String]) -> Vec<FileRef> {
    let keywords = name_keywords(lower);

    let matched: Vec<FileRef> = documents
        .iter()
        .filter(|doc| {
            let doc_lower = doc.to_lowercase();
            keywords.iter().any(|w| doc_lower.contains(w))
        })
        .map(|doc| FileRef::downloadable(doc.as_str()))
        .collect();

    if !matched.is_empty() {
        return matched;
    }

    if message_words.iter().any(|w| LIST_ALL_WORDS.contains(w)) {
        return documents
            .iter()
            .map(|doc| FileRef::downloadable(doc.as_str()))
            .collect();
    }

    Vec::new()
}

pub fn greeting_reply() -> &'static str {
    GREETING_REPLIES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(GREETING_REPLIES[0])
}

/// Summary text sent alongside matched files.
pub fn files_reply(files: &[FileRef]) -> String {
    if let [only] = files {
        return format!(
            "I found this document for you:\n• {}\n\nClick the download button below to get it.",
            only.filename
        );
    }

    let mut listing: Vec<String> = files
        .iter()
        .take(MAX_LISTED_FILES)
        .map(|f| format!("• {}", f.filename))
        .collect();
    if files.len() > MAX_LISTED_FILES {
        listing.push(format!("... and {} more", files.len() - MAX_LISTED_FILES));
    }

    format!(
        "I found {} relevant documents:\n{}\n\nClick the download buttons below to get them.",
        files.len(),
        listing.join("\n")
    )
}
