use models::{ItemStatus, TaskStatus};

use crate::state::AppState;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "demo-password";

/// Demo account with two events, a few tasks and items, and a co-organizer.
pub fn seed_demo(state: &AppState) {
    let demo = state.add_user(DEMO_EMAIL, DEMO_PASSWORD, "demo");
    let sam = state.add_user("sam@example.com", "sam-password", "sam");

    let launch = state.add_event(
        "Launch Party",
        Some("Product launch evening at the riverside venue."),
        &[(demo, "organizer"), (sam, "caterer")],
    );
    let retreat = state.add_event("Team Retreat", None, &[(demo, "organizer")]);

    state.add_task(launch, "Book the venue", "demo", TaskStatus::Completed);
    state.add_task(launch, "Send invitations", "sam", TaskStatus::InProgress);
    state.add_task(launch, "Order the cake", "sam", TaskStatus::Pending);
    state.add_task(retreat, "Pick a location", "demo", TaskStatus::Pending);

    state.add_item(launch, "Balloons", 50, 0.25, "demo", ItemStatus::Pending);
    state.add_item(launch, "Sparkling water", 24, 1.5, "sam", ItemStatus::Completed);
    state.add_item(retreat, "Tents", 6, 89.0, "demo", ItemStatus::Pending);

    tracing::info!(users = 2, events = 2, "demo data seeded");
}
