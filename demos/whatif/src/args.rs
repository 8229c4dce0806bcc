//! Command-line flags, `--name value` pairs in any order.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Everything the demo can be told.  Unset paths fall back to the sample
/// data layout under `data/`.
#[derive(Debug)]
pub struct Args {
    pub log:         PathBuf,
    pub tickets:     PathBuf,
    pub bottlenecks: Option<PathBuf>,
    pub embeddings:  Option<PathBuf>,
    pub max_cases:   Option<usize>,
    pub seed:        u64,
    /// Activity to reinforce; the most-blocked one when unset.
    pub activity:    Option<String>,
    pub hire:        String,
    /// JSON file of `activity -> [resource, ...]` replacements, run as an
    /// extra scenario.
    pub overrides:   Option<PathBuf>,
    /// Directory for CSV output; nothing is written when unset.
    pub out:         Option<PathBuf>,
    /// Steps per policy in the showdown.
    pub steps:       usize,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            log:         PathBuf::from("data/sap_event_log.csv"),
            tickets:     PathBuf::from("data/tickets.csv"),
            bottlenecks: None,
            embeddings:  None,
            max_cases:   None,
            seed:        42,
            activity:    None,
            hire:        "new_hire".to_owned(),
            overrides:   None,
            out:         None,
            steps:       1_000,
        }
    }
}

impl Args {
    pub fn parse<I: IntoIterator<Item = String>>(argv: I) -> Result<Self> {
        let argv: Vec<String> = argv.into_iter().collect();
        let mut args = Self::default();
        let mut i = 0;
        while i < argv.len() {
            let flag = argv[i].as_str();
            let Some(value) = argv.get(i + 1) else {
                bail!("flag {flag} needs a value");
            };
            match flag {
                "--log" => args.log = value.into(),
                "--tickets" => args.tickets = value.into(),
                "--bottlenecks" => args.bottlenecks = Some(value.into()),
                "--embeddings" => args.embeddings = Some(value.into()),
                "--max-cases" => {
                    args.max_cases = Some(value.parse().with_context(|| format!("--max-cases {value}"))?)
                }
                "--seed" => args.seed = value.parse().with_context(|| format!("--seed {value}"))?,
                "--activity" => args.activity = Some(value.clone()),
                "--hire" => args.hire = value.clone(),
                "--overrides" => args.overrides = Some(value.into()),
                "--out" => args.out = Some(value.into()),
                "--steps" => args.steps = value.parse().with_context(|| format!("--steps {value}"))?,
                other => bail!("unknown flag {other}"),
            }
            i += 2;
        }
        Ok(args)
    }
}
