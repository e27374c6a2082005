use flipbook_async_runtime::ViewerUpdate;
use flipbook_core::AddOutcome;
use tokio::sync::mpsc;

use super::document::report_persistence;
use crate::worker::Session;

pub fn publish(session: &Session, update_tx: &mpsc::UnboundedSender<ViewerUpdate>) {
    let _ = update_tx.send(ViewerUpdate::BookmarksChanged {
        pages: session.bookmarks.list(),
    });
}

/// Toggle the bookmark on the left page of the visible spread
pub fn handle_toggle(session: &mut Session, update_tx: &mpsc::UnboundedSender<ViewerUpdate>) {
    let page = session.engine.current_page();
    let marked = session.bookmarks.toggle(page);
    log::info!(
        "{} bookmark on page {}",
        if marked { "Added" } else { "Removed" },
        page
    );
    publish(session, update_tx);
    report_persistence(session, update_tx);
}

pub fn handle_add(
    page: u32,
    session: &mut Session,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    if !page_exists(page, session, update_tx) {
        return;
    }
    match session.bookmarks.add(page) {
        AddOutcome::Added => publish(session, update_tx),
        AddOutcome::AlreadyBookmarked => {
            let _ = update_tx.send(ViewerUpdate::BookmarkExists { page });
        }
    }
    report_persistence(session, update_tx);
}

pub fn handle_remove(
    page: u32,
    session: &mut Session,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    if session.bookmarks.remove(page) {
        publish(session, update_tx);
        report_persistence(session, update_tx);
    }
}

pub fn handle_set_note(
    page: u32,
    note: Option<String>,
    session: &mut Session,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    if session.bookmarks.set_note(page, note) {
        publish(session, update_tx);
        report_persistence(session, update_tx);
    } else {
        let _ = update_tx.send(ViewerUpdate::Error {
            message: format!("Page {} is not bookmarked", page),
        });
    }
}

fn page_exists(
    page: u32,
    session: &Session,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) -> bool {
    let total = session.engine.total_pages();
    // Before the count is known any positive page is accepted
    if page >= 1 && (total == 0 || page <= total) {
        return true;
    }
    let _ = update_tx.send(ViewerUpdate::Error {
        message: format!("Page {} is outside the document", page),
    });
    false
}
