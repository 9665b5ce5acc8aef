/// The endpoints exercised by the mixed stress scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StressEndpoint {
    Ping,
    Login,
    UserInfo,
    FeedbackFetch,
    BoardMetrics,
}

/// Map a uniform draw in `[0, 1)` to an endpoint, 20% each.
pub fn pick_stress_endpoint(draw: f64) -> StressEndpoint {
    if draw < 0.2 {
        StressEndpoint::Ping
    } else if draw < 0.4 {
        StressEndpoint::Login
    } else if draw < 0.6 {
        StressEndpoint::UserInfo
    } else if draw < 0.8 {
        StressEndpoint::FeedbackFetch
    } else {
        StressEndpoint::BoardMetrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_closed_at_the_lower_bound() {
        assert_eq!(StressEndpoint::Ping, pick_stress_endpoint(0.0));
        assert_eq!(StressEndpoint::Login, pick_stress_endpoint(0.2));
        assert_eq!(StressEndpoint::UserInfo, pick_stress_endpoint(0.4));
        assert_eq!(StressEndpoint::FeedbackFetch, pick_stress_endpoint(0.6));
        assert_eq!(StressEndpoint::BoardMetrics, pick_stress_endpoint(0.8));
    }

    #[test]
    fn bands_cover_the_unit_interval() {
        assert_eq!(StressEndpoint::Ping, pick_stress_endpoint(0.19));
        assert_eq!(StressEndpoint::Login, pick_stress_endpoint(0.39));
        assert_eq!(StressEndpoint::UserInfo, pick_stress_endpoint(0.59));
        assert_eq!(StressEndpoint::FeedbackFetch, pick_stress_endpoint(0.79));
        assert_eq!(StressEndpoint::BoardMetrics, pick_stress_endpoint(0.999));
    }
}
