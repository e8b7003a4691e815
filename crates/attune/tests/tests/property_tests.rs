#[path = "property/weights_bounded.rs"]
mod weights_bounded;

#[path = "property/selection_respects_tags.rs"]
mod selection_respects_tags;

#[path = "property/harmonization_bounds.rs"]
mod harmonization_bounds;
