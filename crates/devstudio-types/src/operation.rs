//! Typed requests for the LLM-backed operations.
//!
//! Each operation (generate, review, debug, document, test, chat, refactor,
//! explain) has its own request shape. Instances are produced by the request
//! validator in `devstudio-core` and consumed by the prompt builder.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::chat::ChatMessage;
use crate::llm::ProviderKind;

/// An LLM-backed capability with its own validation and prompt template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Generate,
    Review,
    Debug,
    Document,
    Test,
    Chat,
    Refactor,
    Explain,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Generate,
        Operation::Review,
        Operation::Debug,
        Operation::Document,
        Operation::Test,
        Operation::Chat,
        Operation::Refactor,
        Operation::Explain,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Generate => "generate",
            Operation::Review => "review",
            Operation::Debug => "debug",
            Operation::Document => "document",
            Operation::Test => "test",
            Operation::Chat => "chat",
            Operation::Refactor => "refactor",
            Operation::Explain => "explain",
        };
        f.write_str(s)
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.to_string() == s)
            .ok_or_else(|| format!("invalid operation: '{s}'"))
    }
}

/// A review dimension narrowing a code-review prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusArea {
    Security,
    Performance,
    Style,
    Bugs,
    All,
}

impl FocusArea {
    pub const NAMES: [&'static str; 5] = ["security", "performance", "style", "bugs", "all"];
}

impl fmt::Display for FocusArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusArea::Security => write!(f, "security"),
            FocusArea::Performance => write!(f, "performance"),
            FocusArea::Style => write!(f, "style"),
            FocusArea::Bugs => write!(f, "bugs"),
            FocusArea::All => write!(f, "all"),
        }
    }
}

impl FromStr for FocusArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "security" => Ok(FocusArea::Security),
            "performance" => Ok(FocusArea::Performance),
            "style" => Ok(FocusArea::Style),
            "bugs" => Ok(FocusArea::Bugs),
            "all" => Ok(FocusArea::All),
            other => Err(format!("invalid focus area: '{other}'")),
        }
    }
}

/// Documentation style for the document operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStyle {
    #[default]
    Jsdoc,
    Docstring,
    Markdown,
    Inline,
}

impl DocStyle {
    pub const NAMES: [&'static str; 4] = ["jsdoc", "docstring", "markdown", "inline"];
}

impl FromStr for DocStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jsdoc" => Ok(DocStyle::Jsdoc),
            "docstring" => Ok(DocStyle::Docstring),
            "markdown" => Ok(DocStyle::Markdown),
            "inline" => Ok(DocStyle::Inline),
            other => Err(format!("invalid documentation style: '{other}'")),
        }
    }
}

/// Primary goal for the refactor operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefactorGoal {
    Performance,
    #[default]
    Readability,
    Modularity,
    Dry,
}

impl RefactorGoal {
    pub const NAMES: [&'static str; 4] = ["performance", "readability", "modularity", "dry"];
}

impl FromStr for RefactorGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "performance" => Ok(RefactorGoal::Performance),
            "readability" => Ok(RefactorGoal::Readability),
            "modularity" => Ok(RefactorGoal::Modularity),
            "dry" => Ok(RefactorGoal::Dry),
            other => Err(format!("invalid refactor goal: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    pub language: String,
    pub context: Option<String>,
    pub framework: Option<String>,
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub code: String,
    pub language: String,
    /// Empty means "all aspects".
    #[serde(default)]
    pub focus_areas: Vec<FocusArea>,
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugRequest {
    pub code: String,
    pub language: String,
    pub error: Option<String>,
    pub context: Option<String>,
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub code: String,
    pub language: String,
    pub style: Option<DocStyle>,
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRequest {
    pub code: String,
    pub language: String,
    pub framework: Option<String>,
    /// Percentage in `[0, 100]`.
    pub coverage_target: Option<f64>,
    pub provider: Option<ProviderKind>,
}

/// Optional reference material attached to a chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    pub code: Option<String>,
    pub language: Option<String>,
    pub project_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    /// Client-supplied prior turns, oldest first.
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    pub context: Option<ChatContext>,
    pub session_id: Option<String>,
    pub model: Option<String>,
    pub use_memory: Option<bool>,
    pub provider: Option<ProviderKind>,
}

impl ChatRequest {
    /// The session whose memory participates in this turn, if any.
    ///
    /// Memory is on by default whenever a session id is supplied.
    pub fn memory_session(&self) -> Option<&str> {
        match (&self.session_id, self.use_memory) {
            (Some(id), None | Some(true)) => Some(id.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorRequest {
    pub code: String,
    pub language: String,
    pub goal: Option<RefactorGoal>,
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainRequest {
    pub code: String,
    pub language: String,
    pub provider: Option<ProviderKind>,
}

/// A validated request for any operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    Generate(GenerateRequest),
    Review(ReviewRequest),
    Debug(DebugRequest),
    Document(DocumentRequest),
    Test(TestRequest),
    Chat(ChatRequest),
    Refactor(RefactorRequest),
    Explain(ExplainRequest),
}

impl OperationRequest {
    pub fn operation(&self) -> Operation {
        match self {
            OperationRequest::Generate(_) => Operation::Generate,
            OperationRequest::Review(_) => Operation::Review,
            OperationRequest::Debug(_) => Operation::Debug,
            OperationRequest::Document(_) => Operation::Document,
            OperationRequest::Test(_) => Operation::Test,
            OperationRequest::Chat(_) => Operation::Chat,
            OperationRequest::Refactor(_) => Operation::Refactor,
            OperationRequest::Explain(_) => Operation::Explain,
        }
    }

    /// Explicit provider requested by the caller.
    pub fn provider(&self) -> Option<ProviderKind> {
        match self {
            OperationRequest::Generate(r) => r.provider,
            OperationRequest::Review(r) => r.provider,
            OperationRequest::Debug(r) => r.provider,
            OperationRequest::Document(r) => r.provider,
            OperationRequest::Test(r) => r.provider,
            OperationRequest::Chat(r) => r.provider,
            OperationRequest::Refactor(r) => r.provider,
            OperationRequest::Explain(r) => r.provider,
        }
    }
}
