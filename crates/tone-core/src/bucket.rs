//! UI tone buckets and the distribution over them.

use serde::{Deserialize, Serialize};

/// One of the three UI-facing tone buckets.
///
/// Ordering is the fixed tie-break order from spec §3: `Clear < Caution < Alert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Clear,
    Caution,
    Alert,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Clear, Bucket::Caution, Bucket::Alert];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Clear => "clear",
            Bucket::Caution => "caution",
            Bucket::Alert => "alert",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Bucket {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clear" => Ok(Bucket::Clear),
            "caution" => Ok(Bucket::Caution),
            "alert" => Ok(Bucket::Alert),
            _ => Err(()),
        }
    }
}

/// A non-negative distribution over the three buckets, always normalized to
/// sum to 1 (within `NORMALIZE_EPS`), with an explicit `primary` so
/// downstream consumers never need to recompute the argmax themselves
/// (spec §9: "dynamic dispatch" design note on tagged results).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketDist {
    pub primary: Bucket,
    pub clear: f64,
    pub caution: f64,
    pub alert: f64,
}

/// Acceptable drift from 1.0 after normalization (spec §8 invariant: `1 ± 1e-6`).
pub const NORMALIZE_EPS: f64 = 1e-6;

impl BucketDist {
    /// Build a distribution from raw (possibly unnormalized, non-negative)
    /// component masses, computing `primary` under the fixed tie-break order.
    pub fn from_raw(clear: f64, caution: f64, alert: f64) -> Self {
        let mut d = Self {
            primary: Bucket::Clear,
            clear: clear.max(0.0),
            caution: caution.max(0.0),
            alert: alert.max(0.0),
        };
        d.normalize();
        d.primary = d.argmax();
        d
    }

    pub fn get(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::Clear => self.clear,
            Bucket::Caution => self.caution,
            Bucket::Alert => self.alert,
        }
    }

    pub fn set(&mut self, bucket: Bucket, value: f64) {
        let v = value.max(0.0);
        match bucket {
            Bucket::Clear => self.clear = v,
            Bucket::Caution => self.caution = v,
            Bucket::Alert => self.alert = v,
        }
    }

    /// Clip every component to be non-negative and rescale to sum to 1.
    /// Idempotent: applying twice equals applying once (spec §8 round-trip law).
    pub fn normalize(&mut self) {
        self.clear = self.clear.max(0.0);
        self.caution = self.caution.max(0.0);
        self.alert = self.alert.max(0.0);
        let sum = self.clear + self.caution + self.alert;
        if sum <= 0.0 {
            // Degenerate: fall back to the documented default shape (spec §4.7 step 1).
            self.clear = 0.5;
            self.caution = 0.3;
            self.alert = 0.2;
            return;
        }
        if (sum - 1.0).abs() <= NORMALIZE_EPS {
            return;
        }
        self.clear /= sum;
        self.caution /= sum;
        self.alert /= sum;
    }

    /// argmax with the fixed `clear < caution < alert` tie-break: on an exact
    /// tie the *later* bucket in that order wins, matching "ties are broken
    /// in a fixed order" read as "prefer the more cautious label."
    pub fn argmax(&self) -> Bucket {
        let mut best = Bucket::Clear;
        let mut best_val = self.clear;
        for (b, v) in [
            (Bucket::Caution, self.caution),
            (Bucket::Alert, self.alert),
        ] {
            if v >= best_val {
                best_val = v;
                best = b;
            }
        }
        best
    }

    /// Recompute and overwrite `primary` after direct field mutation.
    pub fn refresh_primary(&mut self) {
        self.primary = self.argmax();
    }

    pub fn is_normalized(&self) -> bool {
        (self.clear + self.caution + self.alert - 1.0).abs() <= NORMALIZE_EPS
            && self.clear >= 0.0
            && self.caution >= 0.0
            && self.alert >= 0.0
    }
}

impl Default for BucketDist {
    fn default() -> Self {
        Self {
            primary: Bucket::Clear,
            clear: 0.5,
            caution: 0.3,
            alert: 0.2,
        }
    }
}
