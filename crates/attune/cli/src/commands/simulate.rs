//! `attune simulate`: a seeded multi-user select → feedback → harmonize loop.

use crate::catalog;
use crate::commands::config::{ConfigSource, Preset};
use crate::error::{CliError, CliResult};
use crate::output::{render, OutputFormat};
use attune_harmonizer::HarmonizationOutcome;
use attune_runtime::{
    AttuneConfig, AttuneRuntime, FeedbackSubmission, HashEmbedder, InMemoryUserStateStore,
    ManualClock, MetricsSnapshot,
};
use attune_store::InMemoryAttuneStore;
use attune_types::{BehavioralMetrics, BiometricSample, Candidate, UserId, UserState};
use chrono::{Duration, TimeZone, Utc};
use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const STATE_TAGS: [&str; 3] = ["calm", "anxious", "restless"];
const PROFILES: [&str; 2] = ["seeker", "builder"];
const TEXT_SIGNALS: [&str; 4] = [
    "I can't settle down",
    "feeling steady today",
    "need to move",
    "a little scattered",
];

/// Simulation parameters
#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// Number of simulated users
    #[arg(long, default_value_t = 3)]
    pub users: usize,

    /// Selection rounds per user
    #[arg(long, default_value_t = 24)]
    pub steps: usize,

    /// Seed for selection and synthetic feedback
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Run a harmonization cycle for every user each N steps
    #[arg(long, default_value_t = 6)]
    pub harmonize_every: usize,

    /// Simulated minutes between steps
    #[arg(long, default_value_t = 30)]
    pub step_minutes: i64,

    /// Candidate catalog (JSON or YAML); built-in catalog when omitted
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigSource,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        Self {
            users: 3,
            steps: 24,
            seed: 42,
            harmonize_every: 6,
            step_minutes: 30,
            catalog: None,
            config: ConfigSource::with_preset(Preset::Demo),
        }
    }
}

/// One select + feedback round for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub user: String,
    pub state_tag: String,
    pub candidate: String,
    pub fulfillment: f64,
    pub confidence: f64,
    pub new_weight: f64,
}

/// One harmonization attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleRecord {
    pub step: usize,
    pub user: String,
    /// Stability status, or `not_due`.
    pub status: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalWeight {
    pub candidate: String,
    pub learning_weight: f64,
    pub fatigue_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub steps: Vec<StepRecord>,
    pub cycles: Vec<CycleRecord>,
    pub final_weights: Vec<FinalWeight>,
    pub metrics: MetricsSnapshot,
}

struct SimUser {
    id: UserId,
    resonance: f64,
    tag: usize,
    profile: &'static str,
}

impl SimUser {
    fn state(&self) -> UserState {
        UserState::new(self.id.clone(), self.resonance)
            .with_state_tag(STATE_TAGS[self.tag])
            .with_profile(self.profile)
    }

    /// Random walk on resonance with occasional state switches.
    fn drift(&mut self, rng: &mut StdRng) {
        self.resonance = (self.resonance + rng.gen_range(-0.15..0.15)).clamp(0.0, 1.0);
        if rng.gen_bool(0.25) {
            self.tag = rng.gen_range(0..STATE_TAGS.len());
        }
    }
}

/// Synthetic feedback loosely tied to the user's resonance.
fn synthetic_feedback(rng: &mut StdRng, user: &SimUser, candidate: &str) -> FeedbackSubmission {
    let lean = user.resonance * 2.0 - 1.0;
    let self_report = (0.5 * lean + rng.gen_range(-0.5..0.5)).clamp(-1.0, 1.0);
    let mut submission = FeedbackSubmission::new(user.id.clone(), candidate)
        .with_self_report(self_report)
        .with_behavioral(BehavioralMetrics {
            completion_rate: Some(rng.gen_range(0.2..1.0)),
            dwell_time_secs: Some(rng.gen_range(10.0..240.0)),
            ..BehavioralMetrics::default()
        });
    if rng.gen_bool(0.5) {
        submission = submission.with_biometric(BiometricSample::new(
            "hrv",
            rng.gen_range(25.0..95.0),
            rng.gen_range(0.5..1.0),
        ));
    }
    submission
}

/// Run the simulation and collect its records.
pub async fn simulate(
    args: &SimulateArgs,
    mut config: AttuneConfig,
    candidates: Vec<Candidate>,
    embedder: HashEmbedder,
) -> CliResult<SimulationReport> {
    if args.users == 0 || args.harmonize_every == 0 {
        return Err(CliError::InvalidArgument(
            "users and harmonize-every must be positive".into(),
        ));
    }
    config.rng_seed = Some(args.seed);

    let start = Utc
        .with_ymd_and_hms(2026, 1, 5, 8, 0, 0)
        .single()
        .ok_or_else(|| CliError::InvalidArgument("invalid simulation start".into()))?;
    let clock = Arc::new(ManualClock::new(start));
    let store = Arc::new(InMemoryAttuneStore::with_candidates(candidates).map_err(|e| {
        CliError::Catalog(e.to_string())
    })?);
    let user_states = Arc::new(InMemoryUserStateStore::new());
    let runtime = AttuneRuntime::new(config, store, user_states.clone())?
        .with_embedder(Arc::new(embedder))
        .with_clock(clock.clone());

    let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(1));
    let mut users: Vec<SimUser> = (0..args.users)
        .map(|i| SimUser {
            id: UserId::new(format!("user-{}", i + 1)),
            resonance: 0.3 + 0.2 * (i % 3) as f64,
            tag: i % STATE_TAGS.len(),
            profile: PROFILES[i % PROFILES.len()],
        })
        .collect();

    let mut steps = Vec::new();
    let mut cycles = Vec::new();

    for step in 1..=args.steps {
        for user in users.iter_mut() {
            user.drift(&mut rng);
            user_states.upsert(user.state())?;

            let text = TEXT_SIGNALS[rng.gen_range(0..TEXT_SIGNALS.len())];
            let selection = runtime.select_candidate(&user.id, None, Some(text)).await?;
            let feedback = synthetic_feedback(&mut rng, user, selection.candidate_id.as_str());
            let outcome = runtime.submit_feedback(feedback).await?;

            steps.push(StepRecord {
                step,
                user: user.id.to_string(),
                state_tag: STATE_TAGS[user.tag].to_string(),
                candidate: selection.candidate_id.to_string(),
                fulfillment: outcome.fulfillment_score,
                confidence: outcome.confidence,
                new_weight: outcome.new_weight,
            });
        }

        if step % args.harmonize_every == 0 {
            // Users are independent, so their cycles run concurrently.
            let outcomes = futures::future::try_join_all(
                users
                    .iter()
                    .map(|u| runtime.run_harmonization_cycle(&u.id, false)),
            )
            .await?;
            for (user, outcome) in users.iter().zip(outcomes) {
                cycles.push(cycle_record(step, &user.id, &outcome));
            }
        }

        clock.advance(Duration::minutes(args.step_minutes));
    }

    let final_weights = runtime
        .candidates()
        .await?
        .into_iter()
        .map(|v| FinalWeight {
            candidate: v.candidate.id.to_string(),
            learning_weight: v.candidate.learning_weight(),
            fatigue_score: v.candidate.fatigue_score(),
        })
        .collect();

    let metrics = runtime.metrics();
    info!(
        selections = metrics.selections,
        cycles = metrics.harmonization_cycles,
        skipped = metrics.skipped_cycles,
        "simulation finished"
    );

    Ok(SimulationReport {
        steps,
        cycles,
        final_weights,
        metrics,
    })
}

fn cycle_record(step: usize, user: &UserId, outcome: &HarmonizationOutcome) -> CycleRecord {
    match outcome {
        HarmonizationOutcome::Executed(report) => CycleRecord {
            step,
            user: user.to_string(),
            status: report.status().to_string(),
            actions: report.actions().iter().map(|a| a.name().to_string()).collect(),
        },
        HarmonizationOutcome::NotDue { .. } => CycleRecord {
            step,
            user: user.to_string(),
            status: "not_due".to_string(),
            actions: Vec::new(),
        },
    }
}

pub async fn execute(args: SimulateArgs, format: OutputFormat) -> CliResult<()> {
    let config = args.config.load()?;
    let embedder = HashEmbedder::default();
    let candidates = match &args.catalog {
        Some(path) => catalog::load(path)?,
        None => catalog::built_in(&embedder),
    };

    let report = simulate(&args, config, candidates, embedder).await?;

    if format != OutputFormat::Text {
        println!("{}", render(&report, format)?);
        return Ok(());
    }

    for s in &report.steps {
        println!(
            "step {:>3}  {:<8} [{:<8}] -> {:<20} fulfillment {:+.3}  confidence {:.3}  weight {:.4}",
            s.step, s.user, s.state_tag, s.candidate, s.fulfillment, s.confidence, s.new_weight
        );
    }
    for c in &report.cycles {
        println!(
            "harmonize step {:>3}  {:<8} {:<9} {}",
            c.step,
            c.user,
            c.status,
            c.actions.join(", ")
        );
    }
    println!();
    for w in &report.final_weights {
        println!(
            "{:<20} weight {:.4}  fatigue {:.0}",
            w.candidate, w.learning_weight, w.fatigue_score
        );
    }
    println!("{}", render(&report.metrics, OutputFormat::Json)?);
    Ok(())
}
