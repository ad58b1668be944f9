use crate::classifier::{self, TextFeatures, Tier};
use crate::domain::package::{package_for, PackageInfo, PACKAGES};
use crate::errors::{AppError, Result};
use crate::observability::MetricsRecorder;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest listing body accepted, in characters
pub const MAX_TEXT_CHARS: usize = 20_000;
pub const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl ClassifyRequest {
    fn validate(&self) -> Result<()> {
        if self.text.chars().count() > MAX_TEXT_CHARS {
            return Err(AppError::ValidationError(format!(
                "text must be at most {} characters",
                MAX_TEXT_CHARS
            )));
        }
        if let Some(title) = &self.title {
            if title.chars().count() > MAX_TITLE_CHARS {
                return Err(AppError::ValidationError(format!(
                    "title must be at most {} characters",
                    MAX_TITLE_CHARS
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct PackageView {
    #[serde(flatten)]
    pub info: PackageInfo,
    pub description: String,
}

impl From<&PackageInfo> for PackageView {
    fn from(info: &PackageInfo) -> Self {
        Self {
            info: *info,
            description: info.description(),
        }
    }
}

/// What the single-measure heuristics would have said
#[derive(Debug, Serialize)]
pub struct Alternatives {
    pub by_chars: Tier,
    pub by_lines: Tier,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub tier: Tier,
    pub package: PackageView,
    pub features: TextFeatures,
    pub alternatives: Alternatives,
    pub classified_at: DateTime<Utc>,
}

/// POST /v1/listings/classify
#[tracing::instrument(skip_all)]
pub async fn classify(Json(request): Json<ClassifyRequest>) -> Result<Json<ClassifyResponse>> {
    request.validate()?;

    let title = request.title.as_deref();
    let (tier, features) = classifier::classify_with_features(&request.text, title);

    tracing::info!(
        tier = %tier,
        lines = features.effective_lines,
        chars = features.char_count,
        words = features.word_count,
        price_mentions = features.price_mentions,
        "Listing classified"
    );
    MetricsRecorder::record_classification(tier.as_str());

    Ok(Json(ClassifyResponse {
        tier,
        package: package_for(tier).into(),
        alternatives: Alternatives {
            by_chars: classifier::tier_by_char_count(features.char_count),
            by_lines: classifier::tier_by_line_count(features.effective_lines),
        },
        features,
        classified_at: Utc::now(),
    }))
}

/// GET /v1/tiers
pub async fn list_tiers() -> Json<Vec<PackageView>> {
    Json(PACKAGES.iter().map(PackageView::from).collect())
}
