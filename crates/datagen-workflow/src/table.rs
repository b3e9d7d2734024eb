//! Transition table: the state graph walks move through.
//!
//! Built once per run, validated at construction and shared read-only by
//! every concurrent walk.
//!
//! The storefront graph:
//!
//! ```text
//! Entry           -> Authenticated
//! Authenticated   -> Browsing
//! Browsing        -> Browsing | ViewProduct | Unauthenticated
//! ViewProduct     -> Browsing | ViewProduct | Unauthenticated | AddToCart | RemoveFromCart
//! AddToCart       -> Browsing | ViewProduct | Unauthenticated | RemoveFromCart
//! RemoveFromCart  -> Browsing | Unauthenticated
//! Unauthenticated -> Terminal
//! Terminal        -> (none)
//! ```

use crate::error::ConfigurationError;
use crate::handlers::{
    BrowsingHandler, IdentityEventHandler, NoopHandler, StateHandler, ViewProductHandler,
};
use datagen_core::State;
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

/// Outgoing edges of a state and the handler invoked on entering it.
pub struct Transition {
    candidates: Vec<State>,
    handler: Arc<dyn StateHandler>,
}

impl Transition {
    pub fn candidates(&self) -> &[State] {
        &self.candidates
    }

    pub fn handler(&self) -> &dyn StateHandler {
        self.handler.as_ref()
    }
}

/// Validated, immutable state graph.
///
/// Every state it contains is reachable from `Entry` and can reach
/// `Terminal`, so a walk choosing uniformly among candidates terminates with
/// probability 1. Walk length is unbounded.
pub struct TransitionTable {
    transitions: HashMap<State, Transition>,
}

impl TransitionTable {
    pub fn builder() -> TransitionTableBuilder {
        TransitionTableBuilder::new()
    }

    /// The storefront graph with its standard handlers.
    pub fn storefront() -> Result<Self, ConfigurationError> {
        TransitionTableBuilder::storefront().build()
    }

    /// Candidate next states. Empty for `Terminal`.
    pub fn candidates(&self, state: State) -> &[State] {
        self.transition(state).candidates()
    }

    pub fn handler(&self, state: State) -> &dyn StateHandler {
        self.transition(state).handler()
    }

    /// Whether the table holds `state` (i.e. it is reachable from Entry).
    pub fn contains(&self, state: State) -> bool {
        self.transitions.contains_key(&state)
    }

    /// States in the table, in declaration order.
    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        State::ALL.into_iter().filter(|s| self.contains(*s))
    }

    /// Uniformly pick the successor of `state`, with replacement.
    ///
    /// A single candidate is returned without drawing from the RNG.
    pub fn choose_next<R: Rng + ?Sized>(&self, state: State, rng: &mut R) -> State {
        match self.candidates(state) {
            [] => panic!("choose_next called on {state}, which has no candidates"),
            [only] => *only,
            candidates => candidates[rng.gen_range(0..candidates.len())],
        }
    }

    fn transition(&self, state: State) -> &Transition {
        // Lookups only ever come from walks over this table, which never leave it.
        match self.transitions.get(&state) {
            Some(transition) => transition,
            None => panic!("state {state} is not part of the transition table"),
        }
    }
}

impl fmt::Debug for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for state in self.states() {
            map.entry(&state, &self.candidates(state));
        }
        map.finish()
    }
}

/// Collects edges and handlers, then validates them into a [`TransitionTable`].
#[derive(Default)]
pub struct TransitionTableBuilder {
    edges: HashMap<State, Vec<State>>,
    handlers: HashMap<State, Arc<dyn StateHandler>>,
}

impl TransitionTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded with the storefront graph and handlers.
    ///
    /// Individual edges or handlers can be replaced before `build()`.
    pub fn storefront() -> Self {
        use State::*;

        Self::new()
            .edges(Entry, [Authenticated])
            .edges(Authenticated, [Browsing])
            .edges(Browsing, [Browsing, ViewProduct, Unauthenticated])
            .edges(
                ViewProduct,
                [Browsing, ViewProduct, Unauthenticated, AddToCart, RemoveFromCart],
            )
            .edges(
                AddToCart,
                [Browsing, ViewProduct, Unauthenticated, RemoveFromCart],
            )
            .edges(RemoveFromCart, [Browsing, Unauthenticated])
            .edges(Unauthenticated, [Terminal])
            .edges(Terminal, [])
            .handler(Entry, IdentityEventHandler)
            .handler(Authenticated, IdentityEventHandler)
            .handler(Browsing, BrowsingHandler)
            .handler(ViewProduct, ViewProductHandler)
            .handler(AddToCart, IdentityEventHandler)
            .handler(RemoveFromCart, IdentityEventHandler)
            .handler(Unauthenticated, IdentityEventHandler)
            .handler(Terminal, IdentityEventHandler)
    }

    /// Set the candidate next states of `from`, replacing any earlier ones.
    ///
    /// Order is kept and duplicates are allowed; a duplicated candidate is
    /// proportionally more likely to be picked.
    pub fn edges(mut self, from: State, to: impl IntoIterator<Item = State>) -> Self {
        self.edges.insert(from, to.into_iter().collect());
        self
    }

    /// Bind a handler to `state`, replacing any earlier one.
    pub fn handler(self, state: State, handler: impl StateHandler + 'static) -> Self {
        self.shared_handler(state, Arc::new(handler))
    }

    pub fn shared_handler(mut self, state: State, handler: Arc<dyn StateHandler>) -> Self {
        self.handlers.insert(state, handler);
        self
    }

    /// Validate the graph.
    ///
    /// Rejects: Terminal with outgoing edges, any edge into Entry, a reachable
    /// state without a transition entry, a reachable non-terminal state with no
    /// candidates or no handler, and a reachable state with no path to Terminal.
    /// States unreachable from Entry are dropped. Terminal without a handler
    /// gets a [`NoopHandler`].
    pub fn build(mut self) -> Result<TransitionTable, ConfigurationError> {
        match self.edges.get(&State::Terminal) {
            Some(edges) if !edges.is_empty() => return Err(ConfigurationError::TerminalHasEdges),
            Some(_) => {}
            None => {
                self.edges.insert(State::Terminal, Vec::new());
            }
        }

        for from in State::ALL {
            if let Some(targets) = self.edges.get(&from) {
                if targets.contains(&State::Entry) {
                    return Err(ConfigurationError::EntryHasIncoming(from));
                }
            }
        }

        if !self.edges.contains_key(&State::Entry) {
            return Err(ConfigurationError::MissingTransition(State::Entry));
        }

        let reachable = self.reachable_from_entry()?;

        for state in State::ALL.into_iter().filter(|s| reachable.contains(s)) {
            if state.is_terminal() {
                continue;
            }
            if self.edges[&state].is_empty() {
                return Err(ConfigurationError::EmptyCandidates(state));
            }
            if !self.handlers.contains_key(&state) {
                return Err(ConfigurationError::MissingHandler(state));
            }
        }

        let exits = self.reaching_terminal();
        if let Some(stuck) = State::ALL
            .into_iter()
            .find(|s| reachable.contains(s) && !exits.contains(s))
        {
            return Err(ConfigurationError::NoPathToTerminal(stuck));
        }

        let mut transitions = HashMap::with_capacity(reachable.len());
        for state in reachable {
            let candidates = self.edges.remove(&state).unwrap_or_default();
            let handler = match self.handlers.remove(&state) {
                Some(handler) => handler,
                None => Arc::new(NoopHandler),
            };
            transitions.insert(
                state,
                Transition {
                    candidates,
                    handler,
                },
            );
        }

        Ok(TransitionTable { transitions })
    }

    /// Breadth-first search from Entry. Fails on an edge to an undefined state.
    fn reachable_from_entry(&self) -> Result<HashSet<State>, ConfigurationError> {
        let mut seen = HashSet::from([State::Entry]);
        let mut queue = VecDeque::from([State::Entry]);

        while let Some(state) = queue.pop_front() {
            let targets = self
                .edges
                .get(&state)
                .ok_or(ConfigurationError::MissingTransition(state))?;
            for &next in targets {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        Ok(seen)
    }

    /// States with a path to Terminal, found by walking edges backwards.
    fn reaching_terminal(&self) -> HashSet<State> {
        let mut reverse: HashMap<State, Vec<State>> = HashMap::new();
        for (&from, targets) in &self.edges {
            for &to in targets {
                reverse.entry(to).or_default().push(from);
            }
        }

        let mut seen = HashSet::from([State::Terminal]);
        let mut queue = VecDeque::from([State::Terminal]);
        while let Some(state) = queue.pop_front() {
            for &prev in reverse.get(&state).map(Vec::as_slice).unwrap_or_default() {
                if seen.insert(prev) {
                    queue.push_back(prev);
                }
            }
        }
        seen
    }
}
