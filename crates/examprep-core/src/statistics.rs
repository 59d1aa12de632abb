//! Per-topic performance statistics.
//!
//! Topics are tallied in first-appearance order so reports list them the same
//! way every time the same exam is scored.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Percentage below which a topic is considered weak.
pub const WEAK_BELOW: u32 = 60;
/// Percentage from which a topic is considered strong.
pub const STRONG_FROM: u32 = 80;

/// Correct/total counts for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicStat {
    pub topic: String,
    pub total: u32,
    pub correct: u32,
    /// `round(100 * correct / total)`, 0 when the topic has no questions.
    pub percentage: u32,
}

impl TopicStat {
    fn empty(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            total: 0,
            correct: 0,
            percentage: 0,
        }
    }

    pub fn band(&self) -> TopicBand {
        TopicBand::from_percentage(self.percentage)
    }
}

/// Reporting classification of a topic percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicBand {
    Weak,
    Average,
    Strong,
}

impl TopicBand {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage < WEAK_BELOW {
            TopicBand::Weak
        } else if percentage < STRONG_FROM {
            TopicBand::Average
        } else {
            TopicBand::Strong
        }
    }
}

impl fmt::Display for TopicBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicBand::Weak => write!(f, "weak"),
            TopicBand::Average => write!(f, "average"),
            TopicBand::Strong => write!(f, "strong"),
        }
    }
}

/// Integer percentage of `part / whole`, rounded half up. Zero when `whole` is zero.
pub fn round_percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    ((200 * part + whole) / (2 * whole)) as u32
}

/// Accumulates [`TopicStat`]s during one scoring pass.
#[derive(Debug, Default)]
pub struct TopicTally {
    stats: Vec<TopicStat>,
    index: HashMap<String, usize>,
}

impl TopicTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one question under `topic`.
    pub fn record(&mut self, topic: &str, correct: bool) {
        let slot = match self.index.get(topic) {
            Some(&slot) => slot,
            None => {
                self.stats.push(TopicStat::empty(topic));
                self.index.insert(topic.to_string(), self.stats.len() - 1);
                self.stats.len() - 1
            }
        };
        let stat = &mut self.stats[slot];
        stat.total += 1;
        if correct {
            stat.correct += 1;
        }
    }

    /// Compute percentages and return the stats in first-seen order.
    pub fn finish(self) -> Vec<TopicStat> {
        self.stats
            .into_iter()
            .map(|mut stat| {
                stat.percentage = round_percentage(stat.correct, stat.total);
                stat
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_percentage(1, 8), 13); // 12.5
        assert_eq!(round_percentage(1, 3), 33);
        assert_eq!(round_percentage(2, 3), 67);
        assert_eq!(round_percentage(5, 5), 100);
        assert_eq!(round_percentage(0, 7), 0);
        assert_eq!(round_percentage(3, 0), 0);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(TopicBand::from_percentage(59), TopicBand::Weak);
        assert_eq!(TopicBand::from_percentage(60), TopicBand::Average);
        assert_eq!(TopicBand::from_percentage(79), TopicBand::Average);
        assert_eq!(TopicBand::from_percentage(80), TopicBand::Strong);
    }

    #[test]
    fn tally_keeps_first_seen_order() {
        let mut tally = TopicTally::new();
        tally.record("Ownership", true);
        tally.record("Traits", false);
        tally.record("Ownership", false);
        tally.record("Ownership", true);

        let stats = tally.finish();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].topic, "Ownership");
        assert_eq!((stats[0].correct, stats[0].total, stats[0].percentage), (2, 3, 67));
        assert_eq!(stats[1].topic, "Traits");
        assert_eq!(stats[1].percentage, 0);
        assert_eq!(stats[1].band(), TopicBand::Weak);
    }
}
