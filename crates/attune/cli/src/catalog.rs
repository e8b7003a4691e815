//! Candidate catalogs for simulations.

use crate::error::{CliError, CliResult};
use attune_runtime::HashEmbedder;
use attune_types::Candidate;
use std::path::Path;

/// (id, applicability tag, prompt)
const BUILT_IN: &[(&str, Option<&str>, &str)] = &[
    ("box-breathing", Some("anxious"), "Breathe in for four, hold for four, out for four."),
    ("body-scan", Some("anxious"), "Move attention slowly from your feet to your head."),
    ("gratitude-note", Some("calm"), "Write down one thing that went well today."),
    ("intention-check", Some("calm"), "Name the one thing that matters most this hour."),
    ("brisk-walk", Some("restless"), "Walk outside for ten minutes without your phone."),
    ("cold-water", Some("restless"), "Splash cold water on your face and notice the shift."),
    ("reflective-question", None, "What would you tell a friend in your position?"),
    ("pause", None, "Stop for one minute and simply notice your breath."),
];

/// The built-in catalog with patterns embedded from each prompt.
pub fn built_in(embedder: &HashEmbedder) -> Vec<Candidate> {
    BUILT_IN
        .iter()
        .map(|(id, tag, prompt)| {
            let candidate = Candidate::new(*id)
                .with_pattern(embedder.embed_sync(prompt))
                .with_payload(serde_json::json!({ "prompt": prompt }));
            match tag {
                Some(tag) => candidate.with_applicability_tag(*tag),
                None => candidate,
            }
        })
        .collect()
}

/// Load candidates from a JSON or YAML file, chosen by extension.
pub fn load(path: &Path) -> CliResult<Vec<Candidate>> {
    let raw = std::fs::read_to_string(path)?;
    let candidates: Vec<Candidate> = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&raw)?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)?,
        other => {
            return Err(CliError::Catalog(format!(
                "unsupported catalog extension {:?} for {}",
                other,
                path.display()
            )))
        }
    };
    if candidates.is_empty() {
        return Err(CliError::Catalog(format!("{} contains no candidates", path.display())));
    }
    Ok(candidates)
}
