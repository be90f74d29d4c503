//! Article progress for one job (completed / total, percent).

/// Snapshot of generation progress, normalized so `completed <= total`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobProgress {
    pub completed_articles: u32,
    pub total_articles: u32,
    /// Server-reported percent, if it sent one.
    pub reported_percent: Option<f64>,
}

impl JobProgress {
    pub fn new(completed: u32, total: u32, reported_percent: Option<f64>) -> Self {
        Self {
            completed_articles: completed.min(total),
            total_articles: total,
            reported_percent: reported_percent.filter(|p| p.is_finite()),
        }
    }

    /// Fraction complete in [0.0, 1.0] from the counts.
    pub fn fraction(&self) -> f64 {
        if self.total_articles == 0 {
            return 0.0;
        }
        (self.completed_articles as f64 / self.total_articles as f64).min(1.0)
    }

    /// Percent in [0, 100]: the server's value when present, otherwise derived.
    pub fn percent(&self) -> f64 {
        match self.reported_percent {
            Some(p) => p.clamp(0.0, 100.0),
            None => self.fraction() * 100.0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.total_articles - self.completed_articles
    }
}
