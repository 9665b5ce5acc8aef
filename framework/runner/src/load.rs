use std::time::Duration;

/// One stage of a ramping load profile: reach `target` VUs over `duration`, interpolating
/// linearly from wherever the previous stage left off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RampStage {
    pub duration: Duration,
    pub target: usize,
}

/// A named concurrency shape for a run.
///
/// Read-only after configuration; the pacer consumes it to decide how many VUs may run
/// iterations at any point in the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadProfile {
    /// A fixed VU count for a fixed duration.
    Constant { vus: usize, duration: Duration },
    /// A sequence of ramp stages, starting from `start_vus`.
    Ramping {
        start_vus: usize,
        stages: Vec<RampStage>,
    },
}

impl LoadProfile {
    pub fn constant(vus: usize, duration_s: u64) -> Self {
        Self::Constant {
            vus,
            duration: Duration::from_secs(duration_s),
        }
    }

    /// Build a ramping profile from `(duration_s, target)` pairs.
    pub fn ramping(start_vus: usize, stages: impl IntoIterator<Item = (u64, usize)>) -> Self {
        Self::Ramping {
            start_vus,
            stages: stages
                .into_iter()
                .map(|(duration_s, target)| RampStage {
                    duration: Duration::from_secs(duration_s),
                    target,
                })
                .collect(),
        }
    }

    /// The planned length of a run driven by this profile.
    pub fn total_duration(&self) -> Duration {
        match self {
            Self::Constant { duration, .. } => *duration,
            Self::Ramping { stages, .. } => stages.iter().map(|stage| stage.duration).sum(),
        }
    }

    /// The peak VU count this profile calls for. This many VU threads are started; the pacer
    /// admits a subset of them at any given time.
    pub fn max_vus(&self) -> usize {
        match self {
            Self::Constant { vus, .. } => *vus,
            Self::Ramping { start_vus, stages } => stages
                .iter()
                .map(|stage| stage.target)
                .chain(std::iter::once(*start_vus))
                .max()
                .unwrap_or(0),
        }
    }

    /// How many VUs should be running iterations at `elapsed` time into the run.
    ///
    /// Ramping stages interpolate linearly from the previous target, so a `0 -> 20 over 30s`
    /// stage admits one more VU every 1.5 seconds. Past the end of the profile the target is 0.
    pub fn target_at(&self, elapsed: Duration) -> usize {
        match self {
            Self::Constant { vus, duration } => {
                if elapsed < *duration {
                    *vus
                } else {
                    0
                }
            }
            Self::Ramping { start_vus, stages } => {
                let mut from = *start_vus;
                let mut stage_start = Duration::ZERO;
                for stage in stages {
                    let stage_end = stage_start + stage.duration;
                    if elapsed < stage_end {
                        let frac = (elapsed - stage_start).as_secs_f64()
                            / stage.duration.as_secs_f64();
                        let target = from as f64 + (stage.target as f64 - from as f64) * frac;
                        return target.round() as usize;
                    }
                    from = stage.target;
                    stage_start = stage_end;
                }
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_profile() {
        let profile = LoadProfile::constant(20, 30);

        assert_eq!(Duration::from_secs(30), profile.total_duration());
        assert_eq!(20, profile.max_vus());
        assert_eq!(20, profile.target_at(Duration::ZERO));
        assert_eq!(20, profile.target_at(Duration::from_secs(29)));
        assert_eq!(0, profile.target_at(Duration::from_secs(30)));
    }

    #[test]
    fn ramping_profile_interpolates_linearly() {
        // The ramping shape from the auth scenario: up over 30s, hold for 60s, down over 30s.
        let profile = LoadProfile::ramping(0, [(30, 20), (60, 20), (30, 0)]);

        assert_eq!(Duration::from_secs(120), profile.total_duration());
        assert_eq!(20, profile.max_vus());

        assert_eq!(0, profile.target_at(Duration::ZERO));
        assert_eq!(10, profile.target_at(Duration::from_secs(15)));
        assert_eq!(20, profile.target_at(Duration::from_secs(30)));
        assert_eq!(20, profile.target_at(Duration::from_secs(75)));
        // Half way down the ramp-down stage.
        assert_eq!(10, profile.target_at(Duration::from_secs(105)));
        assert_eq!(0, profile.target_at(Duration::from_secs(120)));
        assert_eq!(0, profile.target_at(Duration::from_secs(500)));
    }

    #[test]
    fn ramping_profile_with_nonzero_start() {
        // The spike shape from the stress scenario starts at 10 VUs.
        let profile = LoadProfile::ramping(10, [(60, 10), (30, 200), (60, 200), (30, 10)]);

        assert_eq!(200, profile.max_vus());
        assert_eq!(10, profile.target_at(Duration::from_secs(30)));
        // Half way up the spike.
        assert_eq!(105, profile.target_at(Duration::from_secs(75)));
        assert_eq!(200, profile.target_at(Duration::from_secs(100)));
    }

    #[test]
    fn empty_ramping_profile_is_inert() {
        let profile = LoadProfile::ramping(5, []);

        assert_eq!(Duration::ZERO, profile.total_duration());
        assert_eq!(5, profile.max_vus());
        assert_eq!(0, profile.target_at(Duration::ZERO));
    }
}
