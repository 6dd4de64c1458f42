//! Prompt templates for the LLM-backed operations.
//!
//! Each operation maps its validated request to a `(system, user)` pair.
//! Building is pure: the same request always yields the same prompts.
//! Submitted code is embedded verbatim inside a fenced block tagged with
//! the request language.

use devstudio_types::operation::{
    ChatRequest, DebugRequest, DocStyle, DocumentRequest, ExplainRequest, FocusArea,
    GenerateRequest, OperationRequest, RefactorGoal, RefactorRequest, ReviewRequest, TestRequest,
};

/// Coverage target used when a test request does not name one.
pub const DEFAULT_COVERAGE_TARGET: f64 = 80.0;

/// System and user prompts for a single provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Build the prompts for any operation.
pub fn build(request: &OperationRequest) -> PromptPair {
    match request {
        OperationRequest::Generate(r) => generate(r),
        OperationRequest::Review(r) => review(r),
        OperationRequest::Debug(r) => debug(r),
        OperationRequest::Document(r) => document(r),
        OperationRequest::Test(r) => test(r),
        OperationRequest::Chat(r) => chat(r),
        OperationRequest::Refactor(r) => refactor(r),
        OperationRequest::Explain(r) => explain(r),
    }
}

fn fenced(language: &str, code: &str) -> String {
    format!("```{language}\n{code}\n```")
}

/// Join non-empty sections with blank lines.
fn sections(parts: Vec<String>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

pub fn generate(r: &GenerateRequest) -> PromptPair {
    let framework = non_blank(r.framework.as_ref())
        .map(|fw| format!(" and the {fw} framework"))
        .unwrap_or_default();
    let system = format!(
        "You are an expert software engineer specialized in {lang}.\n\
         You write clean, well-structured, documented code.\n\
         Reply with the requested code only, without extra explanation unless necessary.\n\
         Follow the best practices of {lang}{framework}.",
        lang = r.language,
    );

    let user = sections(vec![
        format!("Write the following in {}:", r.language),
        r.prompt.clone(),
        non_blank(r.context.as_ref())
            .map(|ctx| format!("Additional context:\n{ctx}"))
            .unwrap_or_default(),
    ]);

    PromptPair { system, user }
}

pub fn review(r: &ReviewRequest) -> PromptPair {
    let focus = if r.focus_areas.is_empty() {
        "all aspects".to_string()
    } else {
        r.focus_areas
            .iter()
            .map(FocusArea::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let system = format!(
        "You are an expert code reviewer with deep experience in {}.\n\
         You analyze code thoroughly and give constructive suggestions.\n\
         Structure your answer with clear sections:\n\
         - Summary\n\
         - Strengths\n\
         - Issues found (with severity)\n\
         - Suggested improvements\n\
         - Overall score (out of 10)",
        r.language
    );

    let user = sections(vec![
        format!(
            "Perform a complete code review of the following {} code.\nFocus on: {focus}",
            r.language
        ),
        fenced(&r.language, &r.code),
    ]);

    PromptPair { system, user }
}

pub fn debug(r: &DebugRequest) -> PromptPair {
    let system = format!(
        "You are an expert at debugging {} code.\n\
         You find bugs, logic errors and latent problems.\n\
         For each problem found:\n\
         1. Explain the problem\n\
         2. Show where it occurs\n\
         3. Propose a fix\n\
         4. Provide the corrected code",
        r.language
    );

    let mut notes = Vec::new();
    if let Some(error) = non_blank(r.error.as_ref()) {
        notes.push(format!("Reported error: {error}"));
    }
    if let Some(context) = non_blank(r.context.as_ref()) {
        notes.push(format!("Context: {context}"));
    }

    let user = sections(vec![
        format!("Debug the following {} code:", r.language),
        fenced(&r.language, &r.code),
        notes.join("\n"),
    ]);

    PromptPair { system, user }
}

fn style_guide(style: DocStyle) -> &'static str {
    match style {
        DocStyle::Jsdoc => "JSDoc with @param, @returns, @throws, @example",
        DocStyle::Docstring => "Python docstrings with Args, Returns, Raises, Examples",
        DocStyle::Markdown => "Markdown documentation with code examples",
        DocStyle::Inline => "explanatory inline comments",
    }
}

pub fn document(r: &DocumentRequest) -> PromptPair {
    let system = format!(
        "You are an expert at documenting code.\n\
         You write clear, complete, professional documentation.\n\
         Documentation style: {}\n\
         Include:\n\
         - Description of each function/class\n\
         - Parameters and their types\n\
         - Return values\n\
         - Possible errors\n\
         - Usage examples",
        style_guide(r.style.unwrap_or_default())
    );

    let user = sections(vec![
        format!("Write documentation for the following {} code:", r.language),
        fenced(&r.language, &r.code),
    ]);

    PromptPair { system, user }
}

pub fn test(r: &TestRequest) -> PromptPair {
    let coverage = r.coverage_target.unwrap_or(DEFAULT_COVERAGE_TARGET);
    let framework = non_blank(r.framework.as_ref())
        .map(|fw| format!("Use the {fw} test framework.\n"))
        .unwrap_or_default();
    let system = format!(
        "You are an expert in software testing for {}.\n\
         {framework}\
         Write thorough tests including:\n\
         - Unit tests\n\
         - Edge cases\n\
         - Error handling tests\n\
         - Mocks where needed\n\
         Aim for {coverage}% coverage.",
        r.language
    );

    let user = sections(vec![
        format!("Write tests for the following {} code:", r.language),
        fenced(&r.language, &r.code),
    ]);

    PromptPair { system, user }
}

pub fn chat(r: &ChatRequest) -> PromptPair {
    let context = r.context.as_ref();
    let project = context
        .and_then(|c| non_blank(c.project_info.as_ref()))
        .map(|info| format!("Project context: {info}"))
        .unwrap_or_default();
    let system = sections(vec![
        "You are an expert AI development assistant.\n\
         You help developers by:\n\
         - Answering programming questions\n\
         - Explaining concepts\n\
         - Suggesting solutions\n\
         - Debugging code\n\
         - Proposing improvements"
            .to_string(),
        "Be concise but complete. Use code examples when they help.".to_string(),
        project,
    ]);

    let reference = context
        .and_then(|c| non_blank(c.code.as_ref()).map(|code| (c, code)))
        .map(|(c, code)| {
            let language = non_blank(c.language.as_ref()).unwrap_or("unspecified");
            format!("Reference code ({language}):\n{}", fenced("", code))
        })
        .unwrap_or_default();

    let user = sections(vec![r.message.clone(), reference]);

    PromptPair { system, user }
}

fn goal_description(goal: RefactorGoal) -> &'static str {
    match goal {
        RefactorGoal::Performance => "optimize performance",
        RefactorGoal::Readability => "improve readability",
        RefactorGoal::Modularity => "make the code more modular",
        RefactorGoal::Dry => "remove repetition (DRY)",
    }
}

pub fn refactor(r: &RefactorRequest) -> PromptPair {
    let system = format!(
        "You are an expert at refactoring {} code.\n\
         Primary goal: {}\n\n\
         For each change:\n\
         1. Explain why the change helps\n\
         2. Show the code before and after\n\
         3. Provide the complete refactored code at the end",
        r.language,
        goal_description(r.goal.unwrap_or_default())
    );

    let user = sections(vec![
        format!("Refactor the following {} code:", r.language),
        fenced(&r.language, &r.code),
    ]);

    PromptPair { system, user }
}

pub fn explain(r: &ExplainRequest) -> PromptPair {
    let system = "You are an expert programming teacher.\n\
                  Explain code clearly and accessibly.\n\
                  Structure your explanation:\n\
                  1. Overview\n\
                  2. Walkthrough of the important parts\n\
                  3. Key concepts used\n\
                  4. Typical use cases"
        .to_string();

    let user = sections(vec![
        format!("Explain the following {} code:", r.language),
        fenced(&r.language, &r.code),
    ]);

    PromptPair { system, user }
}

/// Code carried by a generation reply: the body of the first fenced block,
/// or the whole trimmed reply when it has no fence.
pub fn extract_code(reply: &str) -> String {
    let open = match reply.find("```") {
        Some(open) => open,
        None => return reply.trim().to_string(),
    };
    let after_fence = &reply[open + 3..];
    // skip the info string (language tag) up to the end of the line
    let body = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => return reply.trim().to_string(),
    };
    match body.find("```") {
        Some(close) => body[..close].trim_end().to_string(),
        None => body.trim_end().to_string(),
    }
}
