//! Decision providers
//!
//! The sync engine asks yes/no questions through [`DecisionProvider`] and
//! never talks to the terminal itself. Any failure to obtain an answer is a
//! "no".

mod interactive;

pub use interactive::Interactive;

use std::collections::VecDeque;

/// What a prompt asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Offer one file from the source root to the roots lacking it
    CopyFile,
    /// Offer a batch of same-extension files or folders from the source root
    CopyGroup,
    /// Offer one folder from the source root
    CopyFolder,
    /// Confirm one file for one destination root
    CopyFileInto,
    /// Confirm a batch of files or folders for one destination root
    CopyGroupInto,
    /// Confirm one folder for one destination root
    CopyFolderInto,
    /// Exclude an extension from one directory of the source root for good
    ExcludeExtension,
}

impl PromptKind {
    /// True for questions asked on behalf of a destination root
    pub fn is_destination_side(self) -> bool {
        matches!(
            self,
            PromptKind::CopyFileInto | PromptKind::CopyGroupInto | PromptKind::CopyFolderInto
        )
    }
}

/// One rendered question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub text: String,
    /// Index of the source root
    pub from: usize,
    /// Index of the destination root, for destination-side questions
    pub to: Option<usize>,
}

/// Supplies yes/no answers to the sync engine
pub trait DecisionProvider {
    fn decide(&mut self, prompt: &Prompt) -> bool;
}

impl<F> DecisionProvider for F
where
    F: FnMut(&Prompt) -> bool,
{
    fn decide(&mut self, prompt: &Prompt) -> bool {
        self(prompt)
    }
}

/// Answers every prompt the same way (non-interactive mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlwaysAnswer(pub bool);

impl DecisionProvider for AlwaysAnswer {
    fn decide(&mut self, _prompt: &Prompt) -> bool {
        self.0
    }
}

/// Replays a fixed list of answers and records every prompt
///
/// Once the script runs out, `fallback` is returned.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisions {
    answers: VecDeque<bool>,
    fallback: bool,
    asked: Vec<Prompt>,
}

impl ScriptedDecisions {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            fallback: false,
            asked: Vec::new(),
        }
    }

    /// Answer `answer` to everything
    pub fn always(answer: bool) -> Self {
        Self::new([]).with_fallback(answer)
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Prompts seen so far, in order
    pub fn asked(&self) -> &[Prompt] {
        &self.asked
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn decide(&mut self, prompt: &Prompt) -> bool {
        self.asked.push(prompt.clone());
        self.answers.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(kind: PromptKind) -> Prompt {
        Prompt {
            kind,
            text: "Copy?".to_string(),
            from: 0,
            to: None,
        }
    }

    #[test]
    fn test_scripted_replays_then_falls_back() {
        let mut script = ScriptedDecisions::new([true, false]);
        assert!(script.decide(&prompt(PromptKind::CopyFile)));
        assert!(!script.decide(&prompt(PromptKind::CopyFile)));
        assert!(!script.decide(&prompt(PromptKind::CopyFile)));
        assert_eq!(script.asked().len(), 3);
        assert_eq!(script.remaining(), 0);

        let mut yes = ScriptedDecisions::always(true);
        assert!(yes.decide(&prompt(PromptKind::CopyGroup)));
    }

    #[test]
    fn test_closures_are_providers() {
        let mut only_files = |p: &Prompt| p.kind == PromptKind::CopyFile;
        assert!(only_files.decide(&prompt(PromptKind::CopyFile)));
        assert!(!only_files.decide(&prompt(PromptKind::CopyFolder)));
    }

    #[test]
    fn test_always_answer() {
        assert!(AlwaysAnswer(true).decide(&prompt(PromptKind::ExcludeExtension)));
        assert!(!AlwaysAnswer(false).decide(&prompt(PromptKind::CopyFile)));
    }

    #[test]
    fn test_destination_side_kinds() {
        assert!(PromptKind::CopyGroupInto.is_destination_side());
        assert!(!PromptKind::CopyGroup.is_destination_side());
        assert!(!PromptKind::ExcludeExtension.is_destination_side());
    }
}
