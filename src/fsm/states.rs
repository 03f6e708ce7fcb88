//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers, with no closures and no
//! dynamic dispatch.
//!
//! ```text
//!  SEEKING ──[arrived | seek timeout]──▶ DECODING
//!     ▲                                      │
//!     └──[idle timeout: message finalized]───┘
//! ```
//!
//! External commands can switch or halt either state at a tick boundary.

use super::context::{FsmContext, SteeringCommand};
use super::{StateDescriptor, StateId};
use crate::morse::session::DecodeSession;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Seeking
        StateDescriptor {
            id: StateId::Seeking,
            name: "Seeking",
            on_enter: Some(seeking_enter),
            on_exit: Some(seeking_exit),
            on_update: seeking_update,
        },
        // Index 1 — Decoding
        StateDescriptor {
            id: StateId::Decoding,
            name: "Decoding",
            on_enter: Some(decoding_enter),
            on_exit: Some(decoding_exit),
            on_update: decoding_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  SEEKING state — drive toward the brighter side
// ═══════════════════════════════════════════════════════════════════════════

fn seeking_enter(ctx: &mut FsmContext) {
    ctx.steering.reset();
    ctx.command = ctx.steering.last_command();
    info!(
        "SEEKING: following light (timeout {} ms)",
        ctx.config.seek_timeout_ms
    );
}

fn seeking_update(ctx: &mut FsmContext) -> Option<StateId> {
    let out = ctx.steering.step_at(&ctx.sample, ctx.tick_period_secs);
    ctx.command = out.command;

    if out.arrived {
        ctx.arrived = true;
        return Some(StateId::Decoding);
    }

    let timeout = u64::from(ctx.config.seek_timeout_ms);
    if timeout > 0 && ctx.ms_in_state() >= timeout {
        info!("SEEKING: {} ms elapsed, switching to decoding", ctx.ms_in_state());
        return Some(StateId::Decoding);
    }

    None
}

fn seeking_exit(ctx: &mut FsmContext) {
    ctx.command = SteeringCommand::stop();
}

// ═══════════════════════════════════════════════════════════════════════════
//  DECODING state — stationary, reading Morse from the light
// ═══════════════════════════════════════════════════════════════════════════

fn decoding_enter(ctx: &mut FsmContext) {
    ctx.command = SteeringCommand::stop();
    ctx.session = Some(DecodeSession::new(&ctx.config.morse, ctx.now_ms));
    info!(
        "DECODING: reading {:?} sensor, unit {:?} {} ms",
        ctx.config.morse.decode_sensor, ctx.config.morse.unit_mode, ctx.config.morse.unit_ms
    );
}

fn decoding_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.command = SteeringCommand::stop();
    let now = ctx.now_ms;
    let level = ctx.sample.level(ctx.config.morse.decode_sensor);

    let session = ctx
        .session
        .get_or_insert_with(|| DecodeSession::new(&ctx.config.morse, now));
    let report = session.feed_level(level, now);
    let idle = session.is_idle(now).then(|| session.idle_limit_ms());

    if let Some(c) = report.decoded {
        ctx.decoded = Some(c);
    }
    if let Some(e) = report.anomaly {
        ctx.push_anomaly(e);
    }

    if let Some(limit_ms) = idle {
        debug!("DECODING: idle for {} ms", limit_ms);
        if let Some(session) = ctx.session.take() {
            ctx.finished = Some(session.finalize());
        }
        return Some(StateId::Seeking);
    }

    None
}

fn decoding_exit(ctx: &mut FsmContext) {
    if let Some(session) = ctx.session.take() {
        info!("DECODING: aborted, discarding \"{}\"", session.text());
    }
    ctx.command = SteeringCommand::stop();
}
