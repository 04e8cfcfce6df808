use std::fmt;

use tracing::warn;

/// Cumulative points per player for one channel.
///
/// Saved as one `name|score` record per line. Entries keep the order in
/// which players first scored, which is what ties fall back to in
/// [`ScoreLedger::top`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    totals: Vec<(String, i64)>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Malformed records are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut ledger = Self::new();

        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let parsed = line
                .rsplit_once('|')
                .and_then(|(name, score)| Some((name, score.trim().parse::<i64>().ok()?)));

            match parsed {
                Some((name, score)) => ledger.add(name, score),
                None => warn!(line, "skipping malformed score record"),
            }
        }

        ledger
    }

    pub fn add(&mut self, player: &str, points: i64) {
        if let Some((_, total)) = self.totals.iter_mut().find(|(name, _)| name == player) {
            *total += points;
        } else {
            self.totals.push((player.to_owned(), points));
        }
    }

    pub fn total(&self, player: &str) -> Option<i64> {
        self.totals
            .iter()
            .find(|(name, _)| name == player)
            .map(|(_, total)| *total)
    }

    /// At most `n` players, highest total first.
    pub fn top(&self, n: usize) -> Vec<(&str, i64)> {
        let mut ranked: Vec<(&str, i64)> = self.iter().collect();
        ranked.sort_by(|(_, a), (_, b)| b.cmp(a));
        ranked.truncate(n);
        ranked
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.totals
            .iter()
            .map(|(name, total)| (name.as_str(), *total))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl fmt::Display for ScoreLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, total)) in self.totals.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{name}|{total}")?;
        }

        Ok(())
    }
}
