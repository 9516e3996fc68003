use repo_health_core::models::{CiStatus, Documentation, Recommendation, RecommendationKind};

/// Issues waiting longer than this on average trigger a recommendation.
pub const SLOW_RESPONSE_DAYS: f64 = 7.0;

struct Facts<'a> {
    documentation: &'a Documentation,
    cicd: &'a CiStatus,
    avg_response_time: f64,
}

struct Rule {
    applies: fn(&Facts) -> bool,
    kind: RecommendationKind,
    title: &'static str,
    description: &'static str,
}

/// Evaluated in order; the order is the display order.
const RULES: &[Rule] = &[
    Rule {
        applies: |f| !f.documentation.readme,
        kind: RecommendationKind::Error,
        title: "Missing README",
        description: "Add a comprehensive README.md file to help users understand your project.",
    },
    Rule {
        applies: |f| !f.documentation.contributing,
        kind: RecommendationKind::Info,
        title: "Add Contributing Guidelines",
        description: "Create CONTRIBUTING.md to help new contributors get started.",
    },
    Rule {
        applies: |f| !f.documentation.license,
        kind: RecommendationKind::Warning,
        title: "Missing License",
        description: "Add a license to clarify how others can use your project.",
    },
    Rule {
        applies: |f| f.avg_response_time > SLOW_RESPONSE_DAYS,
        kind: RecommendationKind::Warning,
        title: "Slow Issue Response",
        description: "Consider using issue templates or automated responses to improve response \
                      times.",
    },
    Rule {
        applies: |f| !f.cicd.has_workflows,
        kind: RecommendationKind::Info,
        title: "Add CI/CD",
        description: "Set up GitHub Actions for automated testing and deployment.",
    },
];

pub fn recommendations(
    documentation: &Documentation,
    cicd: &CiStatus,
    avg_response_time: f64,
) -> Vec<Recommendation> {
    let facts = Facts { documentation, cicd, avg_response_time };
    RULES
        .iter()
        .filter(|rule| (rule.applies)(&facts))
        .map(|rule| Recommendation {
            kind: rule.kind,
            title: rule.title.to_string(),
            description: rule.description.to_string(),
        })
        .collect()
}
