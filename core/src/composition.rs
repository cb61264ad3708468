//! Reducer composition utilities
//!
//! Large state is easier to reason about when each concern owns one reducer.
//! [`combine_reducers`] runs several reducers over the same state and action,
//! in order, and concatenates their effects.
//!
//! # Example
//!
//! ```
//! use prioritize_core::composition::combine_reducers;
//! use prioritize_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Default)]
//! struct Board {
//!     cards: Vec<String>,
//!     owner: Option<String>,
//! }
//!
//! #[derive(Clone)]
//! enum BoardAction {
//!     AddCard(String),
//!     SetOwner(String),
//! }
//!
//! struct CardsReducer;
//! struct OwnerReducer;
//!
//! impl Reducer for CardsReducer {
//!     type State = Board;
//!     type Action = BoardAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut Board, action: BoardAction, _env: &()) -> SmallVec<[Effect<BoardAction>; 4]> {
//!         if let BoardAction::AddCard(card) = action {
//!             state.cards.push(card);
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! impl Reducer for OwnerReducer {
//!     type State = Board;
//!     type Action = BoardAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut Board, action: BoardAction, _env: &()) -> SmallVec<[Effect<BoardAction>; 4]> {
//!         if let BoardAction::SetOwner(owner) = action {
//!             state.owner = Some(owner);
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let board = combine_reducers(vec![Box::new(CardsReducer), Box::new(OwnerReducer)]);
//! let mut state = Board::default();
//! let _ = board.reduce(&mut state, BoardAction::AddCard("triage".into()), &());
//! let _ = board.reduce(&mut state, BoardAction::SetOwner("ana".into()), &());
//! assert_eq!(state.cards, vec!["triage".to_string()]);
//! assert_eq!(state.owner.as_deref(), Some("ana"));
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Boxed reducer over a shared state/action/environment triple
pub type BoxedReducer<S, A, E> = Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Reducers run in the order given. Each one observes the state as left by
/// the previous one, and receives its own clone of the action.
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    A: Clone,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E> {
    reducers: Vec<BoxedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E> {
    /// Number of reducers in this combination
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether this combination has no reducers (and is therefore the identity)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> std::fmt::Debug for CombinedReducer<S, A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("reducers", &self.reducers.len())
            .finish()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    A: Clone,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects.into_iter().filter(|effect| !effect.is_none()));
        }

        all_effects
    }
}
