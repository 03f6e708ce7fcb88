//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  StateTable                                               │
//! │  ┌──────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ StateId  │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├──────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Seeking  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Decoding │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └──────────┴───────────┴──────────┴───────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer. All functions receive `&mut FsmContext`, which
//! holds the light sample, motor command, config, and phase state.
//!
//! The machine can be halted at any tick boundary; halting runs the
//! current state's `on_exit` so partial phase state is dropped.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all possible controller states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Seeking = 0,
    Decoding = 1,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 2;

    /// Convert an index back to `StateId`. Asserts in debug builds;
    /// returns `Seeking` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Seeking,
            1 => Self::Decoding,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Seeking
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Seeking => "Seeking",
            Self::Decoding => "Decoding",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]) and threads a
/// mutable [`FsmContext`] through every handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Between `restart` and `halt`.
    running: bool,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            running: false,
        }
    }

    /// Advance the FSM by one tick. A machine that was never started, or
    /// has been halted, does nothing.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        if !self.running {
            return;
        }

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Enter `state` from scratch, even if it is the current one: its
    /// phase state is rebuilt. Also starts a fresh or halted machine.
    pub fn restart(&mut self, state: StateId, ctx: &mut FsmContext) {
        if self.running {
            self.exit_current(ctx);
        }
        info!("FSM restarting in state: {}", state.name());
        self.current = state as usize;
        self.running = true;
        self.enter_current(ctx);
    }

    /// Abort the active phase at a tick boundary: run its `on_exit` and
    /// stop ticking until [`restart`](Self::restart).
    pub fn halt(&mut self, ctx: &mut FsmContext) {
        if !self.running {
            return;
        }
        info!("FSM halted in state: {}", self.table[self.current].name);
        self.exit_current(ctx);
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name,
            self.table[next_id as usize].name
        );
        self.exit_current(ctx);
        self.current = next_id as usize;
        self.enter_current(ctx);
    }

    fn exit_current(&mut self, ctx: &mut FsmContext) {
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }
    }

    fn enter_current(&mut self, ctx: &mut FsmContext) {
        ctx.state_entered_ms = ctx.now_ms;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
