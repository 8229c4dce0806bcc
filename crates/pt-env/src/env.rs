//! The ticket backlog decision process.

use std::sync::Arc;

use pt_core::{EnvConfig, SimRng};

use crate::enrichment::{EmbeddingStats, Enrichment};
use crate::observation::{FeatureSet, Observation};
use crate::ticket::{Ticket, TicketPool, domain_code, priority_bucket};
use crate::EnvResult;

// ── Contract ──────────────────────────────────────────────────────────────────

/// Step-based decision-process contract shared by every environment.
pub trait Environment {
    /// Size of the discrete action space.
    fn action_count(&self) -> usize;

    /// `(rows, cols)` of every observation.
    fn observation_shape(&self) -> (usize, usize);

    /// Start a new episode, reseeding first when `seed` is given.
    fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo);

    /// Apply `action`.  Out-of-range actions are clamped, never rejected.
    fn step(&mut self, action: usize) -> StepOutcome;
}

/// Reporting data attached to every reset and step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepInfo {
    /// Sum of selected ticket values since the last reset.
    pub value_processed:     f64,
    /// Selections that earned the bottleneck bonus since the last reset.
    pub bottlenecks_cleared: u32,
    pub backlog_len:         usize,
    /// Id of the ticket this step selected.
    pub selected:            Option<String>,
    pub selected_value:      Option<f64>,
    pub rank:                Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward:      f64,
    pub terminated:  bool,
    /// Always `false`: episodes end only by exhausting the pool.
    pub truncated:   bool,
    pub info:        StepInfo,
}

/// Base reward for picking the ticket at `rank` (0 = highest value).
///
/// Steep on purpose: the best pick earns at least 10, anything below third
/// place is punished in proportion to how far down it was.
pub fn rank_reward(rank: usize, value: f64, max_value: f64) -> f64 {
    match rank {
        0 => 10.0 + value / max_value * 5.0,
        1 => 2.0,
        2 => 0.0,
        r => -5.0 * r as f64,
    }
}

// ── TicketEnv ─────────────────────────────────────────────────────────────────

/// Rolling backlog over a shuffled [`TicketPool`].
///
/// The backlog holds at most `config.backlog_size` tickets and is kept
/// sorted by value, descending, so observation row `i` is the `i`-th most
/// valuable pending ticket and action `i` selects it.  After each selection
/// one ticket is drawn from the pool if any remain; the episode ends when the
/// backlog is empty.
///
/// The enriched variant appends bottleneck and embedding features and shapes
/// the reward with a bottleneck bonus and a starvation penalty.
#[derive(Clone, Debug)]
pub struct TicketEnv {
    config:              EnvConfig,
    features:            FeatureSet,
    pool:                Arc<TicketPool>,
    enrichment:          Option<Arc<Enrichment>>,
    rng:                 SimRng,
    /// Shuffled pool indices for the current episode.
    order:               Vec<usize>,
    cursor:              usize,
    backlog:             Vec<Ticket>,
    value_processed:     f64,
    bottlenecks_cleared: u32,
}

impl TicketEnv {
    /// Three features per ticket, rank-only reward.
    pub fn baseline(pool: impl Into<Arc<TicketPool>>, config: EnvConfig) -> EnvResult<Self> {
        Self::with_parts(pool.into(), None, config)
    }

    /// Eight features per ticket, bottleneck bonus and starvation penalty.
    pub fn enriched(
        pool:       impl Into<Arc<TicketPool>>,
        enrichment: impl Into<Arc<Enrichment>>,
        config:     EnvConfig,
    ) -> EnvResult<Self> {
        Self::with_parts(pool.into(), Some(enrichment.into()), config)
    }

    pub(crate) fn with_parts(
        pool:       Arc<TicketPool>,
        enrichment: Option<Arc<Enrichment>>,
        config:     EnvConfig,
    ) -> EnvResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(s) => SimRng::new(s),
            None => SimRng::from_entropy(),
        };
        Ok(Self {
            features: if enrichment.is_some() { FeatureSet::Enriched } else { FeatureSet::Baseline },
            backlog: Vec::with_capacity(config.backlog_size),
            config,
            pool,
            enrichment,
            rng,
            order: Vec::new(),
            cursor: 0,
            value_processed: 0.0,
            bottlenecks_cleared: 0,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn features(&self) -> FeatureSet {
        self.features
    }

    /// Pending tickets, highest value first.
    pub fn backlog(&self) -> &[Ticket] {
        &self.backlog
    }

    /// Pool tickets not yet drawn this episode.
    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }

    pub fn pool(&self) -> &TicketPool {
        &self.pool
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn next_ticket(&mut self) -> Option<Ticket> {
        let record = self.pool.get(*self.order.get(self.cursor)?)?;
        self.cursor += 1;

        let value = record.clean_value();
        let wait_hours = self.rng.gen_range(1..=self.config.max_wait_hours);
        let mut ticket = Ticket {
            id: record.id.clone(),
            activity: record.activity.clone(),
            value,
            priority: priority_bucket(value, self.pool.max_value()),
            wait_hours,
            bottleneck: 0.0,
            emb_mean: 0.0,
            emb_std: 0.0,
            emb_max: 0.0,
            domain_code: 0.0,
        };
        if let Some(e) = &self.enrichment {
            let stats = EmbeddingStats::of(e.embedding(&record.activity)).clamped();
            ticket.bottleneck = e.score(&record.activity);
            ticket.emb_mean = stats.mean;
            ticket.emb_std = stats.std;
            ticket.emb_max = stats.max;
            ticket.domain_code = domain_code(record.domain.as_deref());
        }
        Some(ticket)
    }

    /// Stable, so equal values keep arrival order.
    fn sort_backlog(&mut self) {
        self.backlog.sort_by(|a, b| b.value.total_cmp(&a.value));
    }

    fn observe(&self) -> Observation {
        let (rows, cols) = self.observation_shape();
        let mut obs = Observation::zeros(rows, cols);
        let max_value = self.pool.max_value();
        let max_wait = self.config.max_wait_hours as f32;

        for (i, t) in self.backlog.iter().take(rows).enumerate() {
            let row = obs.row_mut(i);
            row[0] = (t.value / max_value) as f32;
            row[1] = t.priority as f32 / 5.0;
            row[2] = (t.wait_hours as f32 / max_wait).min(1.0);
            if self.features == FeatureSet::Enriched {
                row[3] = t.bottleneck;
                row[4] = t.emb_mean;
                row[5] = t.emb_std;
                row[6] = t.emb_max;
                row[7] = t.domain_code;
            }
        }
        obs
    }

    fn info(&self) -> StepInfo {
        StepInfo {
            value_processed: self.value_processed,
            bottlenecks_cleared: self.bottlenecks_cleared,
            backlog_len: self.backlog.len(),
            ..StepInfo::default()
        }
    }
}

impl Environment for TicketEnv {
    fn action_count(&self) -> usize {
        self.config.backlog_size
    }

    fn observation_shape(&self) -> (usize, usize) {
        (self.config.backlog_size, self.features.width())
    }

    fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo) {
        if let Some(s) = seed {
            self.rng = SimRng::new(s);
        }
        self.order = (0..self.pool.len()).collect();
        self.rng.shuffle(&mut self.order);
        self.cursor = 0;
        self.value_processed = 0.0;
        self.bottlenecks_cleared = 0;

        self.backlog.clear();
        while self.backlog.len() < self.config.backlog_size {
            match self.next_ticket() {
                Some(t) => self.backlog.push(t),
                None => break,
            }
        }
        self.sort_backlog();
        log::debug!("episode reset: {} tickets in pool", self.pool.len());
        (self.observe(), self.info())
    }

    fn step(&mut self, action: usize) -> StepOutcome {
        if self.backlog.is_empty() {
            return StepOutcome {
                observation: self.observe(),
                reward:      0.0,
                terminated:  true,
                truncated:   false,
                info:        self.info(),
            };
        }

        let index = action.min(self.backlog.len() - 1);
        let selected = self.backlog.remove(index);
        let rank = self.backlog.iter().filter(|t| t.value > selected.value).count();
        let mut reward = rank_reward(rank, selected.value, self.pool.max_value());

        if self.features == FeatureSet::Enriched {
            if selected.bottleneck > self.config.bottleneck_threshold {
                reward += f64::from(self.config.bottleneck_bonus) * f64::from(selected.bottleneck);
                self.bottlenecks_cleared += 1;
            }
            let longest_wait = self.backlog.iter().map(|t| t.wait_hours).max().unwrap_or(0);
            if longest_wait > self.config.starvation_hours {
                reward -= f64::from(self.config.starvation_penalty);
            }
        }
        self.value_processed += selected.value;

        if let Some(t) = self.next_ticket() {
            self.backlog.push(t);
        }
        self.sort_backlog();

        let mut info = self.info();
        info.selected = Some(selected.id);
        info.selected_value = Some(selected.value);
        info.rank = Some(rank);

        StepOutcome {
            observation: self.observe(),
            reward,
            terminated:  self.backlog.is_empty(),
            truncated:   false,
            info,
        }
    }
}
