//! Behavioral states and the event types they emit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A behavioral state of a simulated shopper.
///
/// States are plain identifiers. All per-walk data lives in the walk that is
/// visiting the state, never in the state value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum State {
    Entry,
    Authenticated,
    Browsing,
    ViewProduct,
    AddToCart,
    RemoveFromCart,
    Unauthenticated,
    Terminal,
}

impl State {
    /// Every state, in declaration order.
    pub const ALL: [State; 8] = [
        State::Entry,
        State::Authenticated,
        State::Browsing,
        State::ViewProduct,
        State::AddToCart,
        State::RemoveFromCart,
        State::Unauthenticated,
        State::Terminal,
    ];

    /// The event type recorded when a walk enters this state.
    pub fn event_type(self) -> EventType {
        match self {
            State::Entry => EventType::Entry,
            State::Authenticated => EventType::Login,
            State::Browsing => EventType::Browsing,
            State::ViewProduct => EventType::ViewProduct,
            State::AddToCart => EventType::AddToCart,
            State::RemoveFromCart => EventType::RemoveFromCart,
            State::Unauthenticated => EventType::Logout,
            State::Terminal => EventType::Exit,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == State::Terminal
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Entry => "Entry",
            State::Authenticated => "Authenticated",
            State::Browsing => "Browsing",
            State::ViewProduct => "ViewProduct",
            State::AddToCart => "AddToCart",
            State::RemoveFromCart => "RemoveFromCart",
            State::Unauthenticated => "Unauthenticated",
            State::Terminal => "Terminal",
        };
        f.write_str(name)
    }
}

/// Event type stored in the `event_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Entry,
    Login,
    Browsing,
    ViewProduct,
    AddToCart,
    RemoveFromCart,
    Logout,
    Exit,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Entry => "ENTRY",
            EventType::Login => "LOGIN",
            EventType::Browsing => "BROWSING",
            EventType::ViewProduct => "VIEW_PRODUCT",
            EventType::AddToCart => "ADD_TO_CART",
            EventType::RemoveFromCart => "REMOVE_FROM_CART",
            EventType::Logout => "LOGOUT",
            EventType::Exit => "EXIT",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_state_has_distinct_event_type() {
        let mut seen = std::collections::HashSet::new();
        for state in State::ALL {
            assert!(seen.insert(state.event_type()), "duplicate for {state}");
        }
    }

    #[test]
    fn test_event_type_serializes_as_column_value() {
        let json = serde_json::to_string(&EventType::ViewProduct).unwrap();
        assert_eq!(json, "\"VIEW_PRODUCT\"");
        assert_eq!(EventType::ViewProduct.as_str(), "VIEW_PRODUCT");
    }

    #[test]
    fn test_only_terminal_is_terminal() {
        let terminals: Vec<_> = State::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminals, vec![&State::Terminal]);
    }
}
