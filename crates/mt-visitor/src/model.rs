//! Visitor Behavior Model.
//!
//! Mood lives in three unit-interval metrics:
//!
//! | Metric         | Moves with                                               |
//! |----------------|----------------------------------------------------------|
//! | `satisfaction` | welcome match, narration ratings (EMA), answers          |
//! | `fatigue`      | walking, natural drift while touring, breaks             |
//! | `interest`     | narration ratings (faster EMA than satisfaction)         |
//!
//! None of the methods here send anything.  The actor turns their return
//! values into messages.

use mt_core::{ActorRng, Theme, ema, unit};
use mt_group::Formation;

use crate::VisitorProfile;

// ── Tuning constants ──────────────────────────────────────────────────────────

const WELCOME_BONUS: f64 = 0.1;
const WELCOME_PENALTY: f64 = 0.05;

const MOVE_FATIGUE: f64 = 0.04;
const READY_BASE_TICKS: f64 = 2.0;

/// Weight of the previous value in the satisfaction EMA.
const SATISFACTION_KEEP: f64 = 0.7;
const INTEREST_KEEP: f64 = 0.5;
const HIGH_RATING: f64 = 0.7;

const QUESTION_MIN_CURIOSITY: f64 = 0.6;
const QUESTION_MIN_RATING: f64 = 0.6;
const INVITE_MIN_CURIOSITY: f64 = 0.4;

const BREAK_RECOVERY: f64 = 0.25;
const LOW_PATIENCE: f64 = 0.3;

const TOURING_DRIFT: f64 = 0.005;
const WAITING_RECOVERY: f64 = 0.01;

const FAREWELL_FATIGUE_PENALTY: f64 = 0.3;
const FAREWELL_RATING_BONUS: f64 = 0.05;
const EXPERIENCE_STEP: f64 = 0.1;

/// What a visitor concluded when its tour ended.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TourOutcome {
    pub final_satisfaction: f64,
    /// `true`: go back in line for another tour.  `false`: leave.
    pub requeue:            bool,
}

/// Observational micro-events on an autonomous tick.  They change nothing
/// but the log.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SocialEvent {
    ChatWithNeighbour,
    SharedOpinion,
}

#[derive(Clone, Debug)]
pub struct VisitorModel {
    profile:        VisitorProfile,
    satisfaction:   f64,
    fatigue:        f64,
    interest:       f64,
    questions_left: u32,
    /// Narration ratings above [`HIGH_RATING`] this tour.
    high_ratings:   u32,
    tours_taken:    u32,
}

impl VisitorModel {
    pub fn new(profile: VisitorProfile) -> Self {
        Self {
            profile,
            satisfaction:   0.5,
            fatigue:        0.0,
            interest:       0.5,
            questions_left: 0,
            high_ratings:   0,
            tours_taken:    0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn profile(&self) -> &VisitorProfile {
        &self.profile
    }

    pub fn satisfaction(&self) -> f64 {
        self.satisfaction
    }

    pub fn fatigue(&self) -> f64 {
        self.fatigue
    }

    pub fn interest(&self) -> f64 {
        self.interest
    }

    pub fn experience(&self) -> f64 {
        self.profile.personality.experience
    }

    pub fn questions_left(&self) -> u32 {
        self.questions_left
    }

    pub fn tours_taken(&self) -> u32 {
        self.tours_taken
    }

    // ── Reactions ─────────────────────────────────────────────────────────

    /// Reset per-tour counters when a new group is joined.
    pub fn begin_tour(&mut self, question_budget: u32) {
        self.questions_left = question_budget;
        self.high_ratings = 0;
    }

    /// A guide greeted the group; a matching specialization pleases.
    pub fn on_welcome(&mut self, specialization: Theme) {
        let delta = if self.profile.prefers(specialization) {
            WELCOME_BONUS
        } else {
            -WELCOME_PENALTY
        };
        self.satisfaction = unit(self.satisfaction + delta);
    }

    /// Walk to the next stop.  Returns how many ticks until the visitor is
    /// ready there.
    pub fn on_move(&mut self, rng: &mut ActorRng) -> u64 {
        let p = &self.profile.personality;
        let cost = MOVE_FATIGUE * (1.0 + 0.5 * p.experience) * (1.0 - 0.4 * p.energy);
        self.fatigue = unit(self.fatigue + cost);

        let delay = READY_BASE_TICKS
            + (1.0 - p.energy) * 3.0
            + self.fatigue * 3.0
            + rng.gen_range(0.0..1.0);
        delay.round().max(1.0) as u64
    }

    /// How much this visitor liked a piece of narration, in `[0, 1]`.
    pub fn rate_narration(&self, theme: Theme, text: &str) -> f64 {
        let p = &self.profile.personality;
        let overlap = if self.profile.prefers(theme) { 1.0 } else { 0.2 };
        let tolerance = 150.0 + 350.0 * p.patience;
        let len = text.chars().count() as f64;
        let length_fit = if len <= tolerance { 1.0 } else { tolerance / len };
        unit(0.45 * overlap + 0.25 * length_fit + 0.3 * p.curiosity)
    }

    /// Listen to narration.  Returns a question if one comes to mind.
    pub fn on_narration(&mut self, theme: Theme, text: &str, rng: &mut ActorRng) -> Option<String> {
        let rating = self.rate_narration(theme, text);
        self.satisfaction = ema(self.satisfaction, rating, SATISFACTION_KEEP);
        self.interest = ema(self.interest, rating, INTEREST_KEEP);
        if rating > HIGH_RATING {
            self.high_ratings += 1;
        }

        let curiosity = self.profile.personality.curiosity;
        if self.questions_left == 0
            || curiosity <= QUESTION_MIN_CURIOSITY
            || rating <= QUESTION_MIN_RATING
        {
            return None;
        }
        if !rng.gen_bool(rating * curiosity * 0.5) {
            return None;
        }
        Some(self.spend_question(theme))
    }

    /// The guide asked for questions.  Lower bar than after narration.
    pub fn on_invite(&mut self, theme: Theme, rng: &mut ActorRng) -> Option<String> {
        let curiosity = self.profile.personality.curiosity;
        if self.questions_left == 0 || curiosity <= INVITE_MIN_CURIOSITY {
            return None;
        }
        if !rng.gen_bool(curiosity * 0.5 + 0.1) {
            return None;
        }
        Some(self.spend_question(theme))
    }

    /// Hear an answer.  The asker cares more than the bystanders.
    pub fn on_answer(&mut self, mine: bool, quality: f64) {
        let keep = if mine { 0.8 } else { 0.95 };
        self.satisfaction = ema(self.satisfaction, quality, keep);
    }

    /// Vote on a break.  Accepting recovers some fatigue immediately.
    pub fn on_break_proposal(&mut self) -> bool {
        let p = &self.profile.personality;
        let threshold = 0.4 + 0.4 * p.energy;
        let accept = self.fatigue > threshold || p.patience < LOW_PATIENCE;
        if accept {
            self.fatigue = unit(self.fatigue - BREAK_RECOVERY);
        }
        accept
    }

    /// Autonomous tick.  Touring tires; waiting in line rests a little.
    pub fn drift(&mut self, touring: bool, rng: &mut ActorRng) -> Option<SocialEvent> {
        if touring {
            let energy = self.profile.personality.energy;
            self.fatigue = unit(self.fatigue + TOURING_DRIFT * (1.5 - energy));
        } else {
            self.fatigue = unit(self.fatigue - WAITING_RECOVERY);
        }

        let sociability = self.profile.personality.sociability;
        if !rng.gen_bool(sociability * 0.2) {
            return None;
        }
        Some(if rng.gen_bool(0.5) {
            SocialEvent::ChatWithNeighbour
        } else {
            SocialEvent::SharedOpinion
        })
    }

    /// How aligned this visitor feels with the group right now.
    pub fn cohesion_estimate(&self, formation: Formation) -> f64 {
        let sociability = self.profile.personality.sociability;
        unit(0.4 + 0.3 * sociability + formation.cohesion_bonus() - 0.3 * self.fatigue)
    }

    /// The tour is over: settle on a final verdict and decide what next.
    ///
    /// Experience grows regardless of the verdict.
    pub fn on_tour_end(&mut self, rng: &mut ActorRng) -> TourOutcome {
        let bonus = FAREWELL_RATING_BONUS * f64::from(self.high_ratings.min(3));
        let final_satisfaction =
            unit(self.satisfaction - FAREWELL_FATIGUE_PENALTY * self.fatigue + bonus);
        let requeue = rng.gen_bool(final_satisfaction * 0.5 * (1.0 - self.fatigue));

        let p = &mut self.profile.personality;
        p.experience = unit(p.experience + EXPERIENCE_STEP);
        self.tours_taken += 1;
        self.questions_left = 0;

        TourOutcome { final_satisfaction, requeue }
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn spend_question(&mut self, theme: Theme) -> String {
        self.questions_left -= 1;
        format!("What else should I know about the {theme} pieces here?")
    }
}
