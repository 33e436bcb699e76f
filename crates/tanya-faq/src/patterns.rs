//! Tier 2: regex routes for known paraphrases.
//!
//! When the curated signature misses but the question has a recognizable
//! shape ("berapa … cip … rosak"), an ordered route list maps it onto the
//! same vetted answers. First matching route wins.

use regex::Regex;
use tanya_core::types::{Answer, AnswerTier};

use crate::hardcoded;
use crate::query::Query;

pub struct PatternRouter {
    routes: Vec<(Regex, &'static str)>,
}

impl PatternRouter {
    pub fn new() -> Self {
        let route = |pattern: &str, key: &'static str| {
            (Regex::new(pattern).expect("route regex"), key)
        };
        Self {
            routes: vec![
                route(
                    r"(berapa|kos|bayar|harga|cost|fee|much).*(cip|chip|ic).*(rosak|damage|broken|replace)",
                    "ic_chip_cost",
                ),
                route(
                    r"(ic|chip|cip).*(replacement|replace|rosak|damage|broken).*(cost|fee|bayar|kos)",
                    "ic_chip_cost",
                ),
                route(r"(syarat|keperluan|dokumen).*(passport|pasport)", "passport_requirements"),
                route(r"(bagaimana|cara|how).*(mohon|apply).*(passport|pasport)", "passport_requirements"),
            ],
        }
    }

    /// Route a query onto a curated answer, if any route matches.
    pub fn route(&self, query: &Query) -> Option<Answer> {
        for (pattern, key) in &self.routes {
            if pattern.is_match(&query.normalized) {
                let entry = hardcoded::by_key(key)?;
                tracing::debug!("Pattern route hit for '{key}'");
                let mut answer = hardcoded::answer_from(entry);
                answer.tier = AnswerTier::Pattern;
                return Some(answer);
            }
        }
        None
    }
}

impl Default for PatternRouter {
    fn default() -> Self {
        Self::new()
    }
}
