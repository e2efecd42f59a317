//! Dialogue representation.
//!
//! A [`Session`] is an ordered list of [`Turn`]s. The replay engine works on a
//! private copy and reveals it turn by turn from the end.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single message in a dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Speaker role (e.g. "user", "assistant", or a speaker name).
    pub role: String,
    /// Message text.
    pub text: String,
}

impl Turn {
    /// Create a new turn.
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.text)
    }
}

/// One full dialogue. The final turn is the ideal response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    turns: Vec<Turn>,
}

impl Session {
    /// Create a session from turns in chronological order.
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if the session has no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns in chronological order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The last `n` turns (all of them when the session is shorter).
    pub fn tail(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Remove and return the most recent turn.
    pub(crate) fn pop(&mut self) -> Option<Turn> {
        self.turns.pop()
    }
}

impl From<Vec<Turn>> for Session {
    fn from(turns: Vec<Turn>) -> Self {
        Self::new(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(vec![
            Turn::new("user", "hi"),
            Turn::new("assistant", "hello"),
            Turn::new("user", "how are you?"),
        ])
    }

    #[test]
    fn test_tail() {
        let s = session();
        assert_eq!(s.tail(2).len(), 2);
        assert_eq!(s.tail(2)[0].text, "hello");
        assert_eq!(s.tail(10).len(), 3);
        assert!(s.tail(0).is_empty());
    }

    #[test]
    fn test_pop_reveals_from_end() {
        let mut s = session();
        assert_eq!(s.pop().unwrap().text, "how are you?");
        assert_eq!(s.last().unwrap().text, "hello");
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_serde_transparent() {
        let s = session();
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.starts_with('['));
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
