use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{invalid_input_error, Error};

const BASE_RECOMMENDATIONS: [&str; 3] = [
    "Share your live location with a trusted contact",
    "Plan to travel in well-lit, populated areas",
    "Keep your phone charged and easily accessible",
];

const MODERATE_RECOMMENDATIONS: [&str; 2] = [
    "Consider taking an alternative route if available",
    "Avoid traveling alone if possible",
];

const CAUTION_RECOMMENDATIONS: [&str; 3] = [
    "Consider rescheduling your journey for daylight hours",
    "Use a ride-sharing service instead of walking",
    "Keep emergency contacts on speed dial",
];

/// Demo safety score out of 10. Drawn at random; it says nothing about the route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SafetyScore(u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    VerySafe,
    ModeratelySafe,
    UseCaution,
}

impl Rating {
    pub fn label(&self) -> &'static str {
        match self {
            Self::VerySafe => "Very Safe",
            Self::ModeratelySafe => "Moderately Safe",
            Self::UseCaution => "Use Caution",
        }
    }
}

impl SafetyScore {
    pub fn new(value: u8) -> Result<Self, Error> {
        if value > 10 {
            return Err(invalid_input_error());
        }

        Ok(Self(value))
    }

    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let die = Uniform::from(5..10);
        Self(die.sample(rng))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn rating(&self) -> Rating {
        match self.0 {
            8..=10 => Rating::VerySafe,
            6..=7 => Rating::ModeratelySafe,
            _ => Rating::UseCaution,
        }
    }

    pub fn recommendations(&self) -> Vec<&'static str> {
        let mut recommendations = BASE_RECOMMENDATIONS.to_vec();

        if self.0 < 8 {
            recommendations.extend(MODERATE_RECOMMENDATIONS);
        }

        if self.0 < 6 {
            recommendations.extend(CAUTION_RECOMMENDATIONS);
        }

        recommendations
    }
}

impl fmt::Display for SafetyScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/10", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SafetyReport {
    pub score: SafetyScore,
    pub rating: Rating,
    pub recommendations: Vec<String>,
}

impl SafetyReport {
    pub fn new(score: SafetyScore) -> Self {
        Self {
            score,
            rating: score.rating(),
            recommendations: score
                .recommendations()
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    #[tracing::instrument(skip(rng))]
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let report = Self::new(SafetyScore::sample(rng));
        tracing::info!("sampled demo safety score {}", report.score);
        report
    }
}

#[test]
fn sampled_scores_stay_in_demo_range() {
    use rand::{rngs::StdRng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..500 {
        let score = SafetyScore::sample(&mut rng);
        assert!((5..=9).contains(&score.value()));
    }
}

#[test]
fn recommendations_grow_as_score_drops() {
    let very_safe = SafetyScore::new(9).unwrap();
    let moderate = SafetyScore::new(6).unwrap();
    let caution = SafetyScore::new(5).unwrap();

    assert_eq!(very_safe.rating(), Rating::VerySafe);
    assert_eq!(moderate.rating(), Rating::ModeratelySafe);
    assert_eq!(caution.rating(), Rating::UseCaution);

    assert_eq!(very_safe.recommendations().len(), 3);
    assert_eq!(moderate.recommendations().len(), 5);
    assert_eq!(caution.recommendations().len(), 8);
    assert_eq!(
        caution.recommendations().last(),
        Some(&"Keep emergency contacts on speed dial")
    );

    assert_eq!(SafetyScore::new(11), Err(invalid_input_error()));
}
