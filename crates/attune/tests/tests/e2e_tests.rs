#[path = "e2e/select_feedback_loop.rs"]
mod select_feedback_loop;

#[path = "e2e/harmonization_cycle.rs"]
mod harmonization_cycle;

#[path = "e2e/concurrent_feedback.rs"]
mod concurrent_feedback;

#[path = "e2e/degraded_collaborators.rs"]
mod degraded_collaborators;
