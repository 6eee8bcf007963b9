//! Move resolver - one position in, one legal move (or a forfeit) out
//!
//! The agent is asked for a move; replies that do not parse to a member of
//! the legal set are fed back with a correction and retried. Provider errors
//! burn an attempt but do not abort the loop.

use std::collections::BTreeSet;

use crate::engine::BoardView;
use crate::prompt;
use crate::provider::{ChatMessage, ChatProvider};
use crate::reporter::Reporter;

/// Attempts per turn before an agent forfeits
pub const DEFAULT_ATTEMPTS: usize = 3;

/// Result of asking an agent for a move
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A member of the legal set
    Move { mv: String, attempts: usize },
    /// Every attempt failed
    Forfeit { attempts: usize },
}

impl Resolution {
    pub fn is_forfeit(&self) -> bool {
        matches!(self, Resolution::Forfeit { .. })
    }

    pub fn attempts(&self) -> usize {
        match self {
            Resolution::Move { attempts, .. } | Resolution::Forfeit { attempts } => *attempts,
        }
    }
}

/// Bounded-retry move elicitation
#[derive(Clone, Copy, Debug)]
pub struct MoveResolver {
    attempts: usize,
}

impl Default for MoveResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS)
    }
}

impl MoveResolver {
    /// Create a resolver; at least one attempt is always made
    pub fn new(attempts: usize) -> Self {
        Self { attempts: attempts.max(1) }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Ask `agent` for a move in the given position
    pub fn resolve(
        &self,
        provider: &dyn ChatProvider,
        agent: &str,
        view: &BoardView,
        legal: &BTreeSet<String>,
        reporter: &dyn Reporter,
    ) -> Resolution {
        let mut messages = vec![
            ChatMessage::system(prompt::system_prompt()),
            ChatMessage::user(prompt::move_request(view, legal)),
        ];

        for attempt in 1..=self.attempts {
            let reply = match provider.complete(agent, &messages) {
                Ok(reply) => reply,
                Err(e) => {
                    reporter.error(&format!(
                        "Error calling {} (attempt {}/{}): {}",
                        agent, attempt, self.attempts, e
                    ));
                    continue;
                }
            };

            let candidate = prompt::extract_move(&reply);
            if legal.contains(&candidate) {
                return Resolution::Move { mv: candidate, attempts: attempt };
            }

            reporter.info(&format!(
                "Illegal move attempt {}/{} by {}: '{}' (Parsed: '{}'). Re-prompting with feedback...",
                attempt, self.attempts, agent, reply, candidate
            ));
            messages.push(ChatMessage::assistant(reply.clone()));
            messages.push(ChatMessage::user(prompt::correction(&reply, legal)));
        }

        Resolution::Forfeit { attempts: self.attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::ChatRole;
    use crate::reporter::{Level, MemoryReporter};
    use std::cell::RefCell;

    /// Replays canned replies and records every conversation it was sent
    struct Scripted {
        replies: RefCell<Vec<Result<String, ProviderError>>>,
        seen: RefCell<Vec<Vec<ChatMessage>>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<&str, ProviderError>>) -> Self {
            let mut replies: Vec<_> = replies.into_iter().map(|r| r.map(str::to_string)).collect();
            replies.reverse();
            Self {
                replies: RefCell::new(replies),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.borrow().len()
        }
    }

    impl ChatProvider for Scripted {
        fn complete(&self, _model: &str, messages: &[ChatMessage]) -> Result<String, ProviderError> {
            self.seen.borrow_mut().push(messages.to_vec());
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or(Err(ProviderError::EmptyResponse))
        }
    }

    fn legal(moves: &[&str]) -> BTreeSet<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_first_reply_legal() {
        let provider = Scripted::new(vec![Ok("G22")]);
        let reporter = MemoryReporter::new();
        let res = MoveResolver::default().resolve(
            &provider, "m", &BoardView::empty(), &legal(&["G11", "G22"]), &reporter,
        );
        assert_eq!(res, Resolution::Move { mv: "G22".to_string(), attempts: 1 });
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_retry_after_illegal_reply() {
        let provider = Scripted::new(vec![Ok("G99"), Ok("G11 extra text")]);
        let reporter = MemoryReporter::new();
        let res = MoveResolver::default().resolve(
            &provider, "m", &BoardView::empty(), &legal(&["G11", "G22"]), &reporter,
        );
        assert_eq!(res, Resolution::Move { mv: "G11".to_string(), attempts: 2 });

        // Second call carries the raw reply and a correction listing the legal moves
        let seen = provider.seen.borrow();
        let second = &seen[1];
        assert_eq!(second.len(), 4);
        assert_eq!(second[2], ChatMessage::assistant("G99"));
        assert_eq!(second[3].role, ChatRole::User);
        assert!(second[3].content.contains("Invalid move 'G99'"));
        assert!(second[3].content.contains("[G11, G22]"));
    }

    #[test]
    fn test_forfeit_after_three_failures() {
        let provider = Scripted::new(vec![Ok("G99"), Ok("hello"), Ok("B5555")]);
        let reporter = MemoryReporter::new();
        let res = MoveResolver::default().resolve(
            &provider, "m", &BoardView::empty(), &legal(&["G11"]), &reporter,
        );
        assert_eq!(res, Resolution::Forfeit { attempts: 3 });
        assert_eq!(provider.calls(), 3);
        assert_eq!(reporter.messages(Level::Info).len(), 3);
    }

    #[test]
    fn test_provider_error_counts_as_attempt() {
        let provider = Scripted::new(vec![
            Err(ProviderError::EmptyResponse),
            Err(ProviderError::Status { status: 429, body: "slow down".to_string() }),
            Ok("G11"),
        ]);
        let reporter = MemoryReporter::new();
        let res = MoveResolver::default().resolve(
            &provider, "m", &BoardView::empty(), &legal(&["G11"]), &reporter,
        );
        assert_eq!(res, Resolution::Move { mv: "G11".to_string(), attempts: 3 });
        assert_eq!(reporter.messages(Level::Error).len(), 2);

        // Errors append nothing to the conversation
        assert_eq!(provider.seen.borrow()[2].len(), 2);
    }

    #[test]
    fn test_all_errors_forfeit() {
        let provider = Scripted::new(vec![]);
        let reporter = MemoryReporter::new();
        let res = MoveResolver::new(2).resolve(
            &provider, "m", &BoardView::empty(), &legal(&["G11"]), &reporter,
        );
        assert!(res.is_forfeit());
        assert_eq!(res.attempts(), 2);
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(MoveResolver::new(0).attempts(), 1);
    }
}
