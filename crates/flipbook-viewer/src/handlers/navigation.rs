use flipbook_async_runtime::ViewerUpdate;
use flipbook_core::{FlipOutcome, FrameOutcome, NavIntent, ViewerOptions};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use super::document::{publish_spread, report_persistence};
use crate::worker::Session;

/// Hand a navigation request to the flip engine. Pointer, keyboard and
/// auto-play requests all come through here and are treated the same.
pub fn apply_intent(
    intent: NavIntent,
    session: &mut Session,
    options: &ViewerOptions,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    let outcome = match intent {
        NavIntent::Advance => session.engine.advance(Instant::now()),
        NavIntent::Retreat => session.engine.retreat(Instant::now()),
        NavIntent::Goto(page) => session.engine.goto(page),
    };

    match outcome {
        FlipOutcome::Started { direction, target } => {
            let mut timer = tokio::time::interval(options.frame_interval());
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            session.frame_timer = Some(timer);
            let _ = update_tx.send(ViewerUpdate::FlipStarted {
                doc_id: session.doc_id,
                direction,
                target,
            });
        }
        FlipOutcome::Jumped { page } => {
            publish_spread(session, update_tx);
            session.bookmarks.set_last_read(page);
            report_persistence(session, update_tx);
        }
        FlipOutcome::Ignored(reason) => {
            log::debug!("{:?} ignored: {}", intent, reason);
        }
    }
}

/// Sample the running flip; the frame loop ends with the commit
pub fn handle_frame(session: &mut Session, update_tx: &mpsc::UnboundedSender<ViewerUpdate>) {
    let doc_id = session.doc_id;
    match session.engine.frame(Instant::now()) {
        FrameOutcome::Idle => {
            session.frame_timer = None;
        }
        FrameOutcome::Progress(progress) => {
            let _ = update_tx.send(ViewerUpdate::FlipFrame {
                doc_id,
                direction: session.engine.state().direction,
                progress,
                slices: session.engine.slices(),
            });
        }
        FrameOutcome::Committed { page } => {
            session.frame_timer = None;
            let _ = update_tx.send(ViewerUpdate::FlipCommitted { doc_id, page });
            publish_spread(session, update_tx);

            session.bookmarks.set_last_read(page);
            report_persistence(session, update_tx);

            if session.autoplay.reached_end(session.engine.is_at_last_spread()) {
                let _ = update_tx.send(ViewerUpdate::AutoPlayChanged { enabled: false });
            }
        }
    }
}

pub fn handle_autoplay_tick(
    session: &mut Session,
    options: &ViewerOptions,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    // Page count unknown yet: keep waiting rather than stopping
    let at_last = session.engine.total_pages() > 0 && session.engine.is_at_last_spread();
    match session.autoplay.on_tick(at_last) {
        Some(intent) => apply_intent(intent, session, options, update_tx),
        None if !session.autoplay.is_enabled() => {
            let _ = update_tx.send(ViewerUpdate::AutoPlayChanged { enabled: false });
        }
        None => {}
    }
}

pub fn handle_set_autoplay(
    enabled: bool,
    session: &mut Session,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    if enabled == session.autoplay.is_enabled() {
        return;
    }
    if enabled {
        session.autoplay.enable();
    } else {
        session.autoplay.disable();
    }
    let _ = update_tx.send(ViewerUpdate::AutoPlayChanged {
        enabled: session.autoplay.is_enabled(),
    });
}
