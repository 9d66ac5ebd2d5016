use std::time::Duration;

use log::{debug, warn};
use rand::Rng;
use thiserror::Error;

const REASONS: [&str; 4] = [
    "臉部邊緣存在不自然的模糊現象",
    "眨眼頻率異常，不符合正常人類行為模式",
    "光影變化與背景不一致",
    "音訊與嘴型同步存在延遲",
];

#[derive(Error, Debug, PartialEq)]
pub enum AnalyzeError {
    #[error("No video url or file was given")]
    EmptySource,

    #[error("Analysis did not finish within {0:?}")]
    Timeout(Duration),
}

/// What the user handed in: a link or an uploaded file, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    Url(String),
    File { name: String },
}

impl VideoSource {
    /// The upload wins over the url, mirroring how picking a file clears the url field.
    pub fn from_input(url: Option<&str>, file_name: Option<&str>) -> Result<Self, AnalyzeError> {
        if let Some(name) = file_name.map(str::trim).filter(|n| !n.is_empty()) {
            return Ok(VideoSource::File {
                name: name.to_string(),
            });
        }
        match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => Ok(VideoSource::Url(url.to_string())),
            None => Err(AnalyzeError::EmptySource),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            VideoSource::Url(url) => url,
            VideoSource::File { name } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub is_fake: bool,
    /// Percent, one decimal.
    pub confidence: f64,
    pub reasons: Vec<String>,
}

impl Analysis {
    pub fn summary(&self) -> String {
        let headline = if self.is_fake {
            "⚠️ 疑似假影片"
        } else {
            "✓ 可能是真實影片"
        };
        format!("{}\n信心度：{:.1}%", headline, self.confidence)
    }

    pub fn details(&self) -> String {
        let reasons = self
            .reasons
            .iter()
            .map(|r| format!("• {}", r))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "分析細節：\n{}\n\n* 此結果僅供參考，建議結合多方資訊進行判斷",
            reasons
        )
    }
}

/// Stand-in for a detection backend. The verdict is a coin flip.
#[derive(Debug, Clone)]
pub struct MockAnalyzer {
    delay: Duration,
    timeout: Duration,
}

impl MockAnalyzer {
    pub fn new(delay: Duration, timeout: Duration) -> Self {
        Self { delay, timeout }
    }

    pub async fn analyze(&self, source: &VideoSource) -> Result<Analysis, AnalyzeError> {
        debug!("Analyzing {:?}", source.label());
        tokio::time::timeout(self.timeout, self.run(source))
            .await
            .map_err(|_| {
                warn!("Analysis of {:?} timed out", source.label());
                AnalyzeError::Timeout(self.timeout)
            })
    }

    async fn run(&self, _source: &VideoSource) -> Analysis {
        tokio::time::sleep(self.delay).await;

        let mut rng = rand::thread_rng();
        let is_fake = rng.gen::<f64>() > 0.5;
        let confidence = ((rng.gen::<f64>() * 30.0 + 70.0) * 10.0).round() / 10.0;
        // 99.95 and up would round to 100.0, which reads as certainty; cap at 99.9
        let confidence = confidence.min(99.9);

        Analysis {
            is_fake,
            confidence,
            reasons: REASONS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_prefers_file() {
        let source = VideoSource::from_input(Some("https://example.com/a.mp4"), Some("clip.mp4"));
        assert_eq!(
            source,
            Ok(VideoSource::File {
                name: "clip.mp4".to_string()
            })
        );
    }

    #[test]
    fn test_source_trims_url() {
        let source = VideoSource::from_input(Some("  https://example.com/a.mp4 "), None).unwrap();
        assert_eq!(source.label(), "https://example.com/a.mp4");
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(
            VideoSource::from_input(Some("   "), None),
            Err(AnalyzeError::EmptySource)
        );
        assert_eq!(
            VideoSource::from_input(None, Some("")),
            Err(AnalyzeError::EmptySource)
        );
    }

    #[tokio::test]
    async fn test_mock_analysis_shape() {
        let analyzer = MockAnalyzer::new(Duration::ZERO, Duration::from_secs(1));
        let source = VideoSource::Url("https://example.com/a.mp4".to_string());
        for _ in 0..200 {
            let analysis = analyzer.analyze(&source).await.unwrap();
            assert!(analysis.confidence >= 70.0 && analysis.confidence < 100.0);
            let tenths = analysis.confidence * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-6);
            assert_eq!(analysis.reasons.len(), 4);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_analysis_times_out() {
        let analyzer = MockAnalyzer::new(Duration::from_secs(60), Duration::from_secs(5));
        let source = VideoSource::File {
            name: "clip.mp4".to_string(),
        };
        let result = analyzer.analyze(&source).await;
        assert_eq!(result, Err(AnalyzeError::Timeout(Duration::from_secs(5))));
    }

    #[test]
    fn test_rendering() {
        let analysis = Analysis {
            is_fake: true,
            confidence: 87.3,
            reasons: vec!["光影變化與背景不一致".to_string()],
        };
        assert_eq!(analysis.summary(), "⚠️ 疑似假影片\n信心度：87.3%");
        assert!(analysis.details().contains("• 光影變化與背景不一致"));
        assert!(analysis.details().ends_with("建議結合多方資訊進行判斷"));

        let real = Analysis {
            is_fake: false,
            ..analysis
        };
        assert!(real.summary().starts_with("✓ 可能是真實影片"));
    }
}
