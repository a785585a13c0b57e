//! # Metric primitives
//!
//! Pure scoring functions over a text or numeric sample. Every output lies in
//! [0, 1] and is never NaN; non-finite intermediate values collapse to 0.
//!
//! ## Metrics
//!
//! - **Instability index (δ_H)**: blend of normalized character entropy and
//!   token diversity.
//! - **Suppression measure**: density of suppression vocabulary.
//! - **Smoothness**: inverse of token-length variance and punctuation noise.
//! - **Gain**: long, rare and positive vocabulary.

use qcsim_data::clamp01;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const ENTROPY_WEIGHT: f64 = 0.6;
const DIVERSITY_WEIGHT: f64 = 0.4;
const SUPPRESSION_PER_HIT: f64 = 0.15;
const LENGTH_VARIANCE_WEIGHT: f64 = 0.1;
const PUNCTUATION_WEIGHT: f64 = 0.05;
const LONG_WORD_LEN: usize = 7;
const NUMERIC_BINS: usize = 10;

const SUPPRESSION_LEXICON: &[&str] = &[
    "banned",
    "blocked",
    "censored",
    "classified",
    "denied",
    "erased",
    "forbidden",
    "hidden",
    "ignored",
    "muted",
    "redacted",
    "silenced",
    "suppressed",
    "unreported",
];

const POSITIVE_LEXICON: &[&str] = &[
    "balance",
    "breakthrough",
    "clarity",
    "coherent",
    "connect",
    "create",
    "discover",
    "emerge",
    "growth",
    "harmony",
    "hope",
    "insight",
    "learn",
    "resonance",
    "thrive",
];

/// Lowercases and splits on anything that is not alphanumeric or an apostrophe.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Shannon entropy of `counts`, divided by log2 of the number of categories.
fn normalized_entropy<'a>(counts: impl IntoIterator<Item = &'a usize>, categories: usize) -> f64 {
    if categories <= 1 {
        return 0.0;
    }
    let counts: Vec<usize> = counts.into_iter().copied().filter(|c| *c > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let h: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum();
    clamp01(h / (categories as f64).log2())
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Instability index δ_H of a text sample.
#[must_use]
pub fn instability_index(text: &str) -> f64 {
    let mut chars: BTreeMap<char, usize> = BTreeMap::new();
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        for lc in c.to_lowercase() {
            *chars.entry(lc).or_insert(0) += 1;
        }
    }
    let entropy = normalized_entropy(chars.values(), chars.len());

    let tokens = tokenize(text);
    let distinct: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
    let diversity = ratio(distinct.len(), tokens.len());

    clamp01(ENTROPY_WEIGHT * entropy + DIVERSITY_WEIGHT * diversity)
}

/// Count of values that differ by more than a relative 1e-9.
fn distinct_values(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut count = 0;
    let mut last: Option<f64> = None;
    for v in sorted {
        let same = last.is_some_and(|l| (v - l).abs() <= 1e-9 * l.abs().max(v.abs()).max(1.0));
        if !same {
            count += 1;
            last = Some(v);
        }
    }
    count
}

/// Instability index δ_H of a numeric sample. Non-finite values are ignored.
#[must_use]
pub fn instability_index_numeric(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return 0.0;
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let entropy = if max > min {
        let width = (max - min) / NUMERIC_BINS as f64;
        let mut bins = [0usize; NUMERIC_BINS];
        for v in &finite {
            let idx = (((v - min) / width) as usize).min(NUMERIC_BINS - 1);
            bins[idx] += 1;
        }
        normalized_entropy(bins.iter(), NUMERIC_BINS)
    } else {
        0.0
    };

    let diversity = ratio(distinct_values(&finite), finite.len());

    clamp01(ENTROPY_WEIGHT * entropy + DIVERSITY_WEIGHT * diversity)
}

/// Density of suppression vocabulary; saturates after seven hits.
#[must_use]
pub fn suppression_measure(text: &str) -> f64 {
    let hits = tokenize(text)
        .iter()
        .filter(|t| SUPPRESSION_LEXICON.contains(&t.as_str()))
        .count();
    clamp01(SUPPRESSION_PER_HIT * hits as f64)
}

/// 1.0 for uniform, unpunctuated prose; falls toward 0 as it gets ragged.
#[must_use]
pub fn smoothness(text: &str) -> f64 {
    let tokens = tokenize(text);
    let variance = if tokens.is_empty() {
        0.0
    } else {
        let lens: Vec<f64> = tokens.iter().map(|t| t.chars().count() as f64).collect();
        let mean = lens.iter().sum::<f64>() / lens.len() as f64;
        lens.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / lens.len() as f64
    };
    let punctuation = text.chars().filter(char::is_ascii_punctuation).count() as f64;
    clamp01(1.0 / (1.0 + LENGTH_VARIANCE_WEIGHT * variance + PUNCTUATION_WEIGHT * punctuation))
}

/// Weighted share of long, once-only and positive tokens.
#[must_use]
pub fn gain(text: &str) -> f64 {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return 0.0;
    }
    let mut freq: BTreeMap<&str, usize> = BTreeMap::new();
    for t in &tokens {
        *freq.entry(t.as_str()).or_insert(0) += 1;
    }

    let long = tokens
        .iter()
        .filter(|t| t.chars().count() >= LONG_WORD_LEN)
        .count();
    let rare = tokens.iter().filter(|t| freq[t.as_str()] == 1).count();
    let positive = tokens
        .iter()
        .filter(|t| POSITIVE_LEXICON.contains(&t.as_str()))
        .count();

    let n = tokens.len();
    let lexical = 0.5 * ratio(long, n) + 0.5 * ratio(rare, n);
    clamp01(0.7 * lexical + 0.3 * ratio(positive, n))
}

/// All four primitives for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub instability: f64,
    pub suppression: f64,
    pub smoothness: f64,
    pub gain: f64,
}

impl TextMetrics {
    #[must_use]
    pub fn measure(text: &str) -> Self {
        Self {
            instability: instability_index(text),
            suppression: suppression_measure(text),
            smoothness: smoothness(text),
            gain: gain(text),
        }
    }
}

/// Line counts behind the orric risk heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrricReading {
    /// Lines mentioning δ or delta.
    pub tension_mentions: usize,
    /// Lines mentioning collapse or critical.
    pub collapse_mentions: usize,
}

impl OrricReading {
    #[must_use]
    pub fn scan(text: &str) -> Self {
        let mut reading = Self::default();
        for line in text.lines() {
            let lower = line.to_lowercase();
            if lower.contains('δ') || lower.contains("delta") {
                reading.tension_mentions += 1;
            }
            if lower.contains("collapse") || lower.contains("critical") {
                reading.collapse_mentions += 1;
            }
        }
        reading
    }
}
