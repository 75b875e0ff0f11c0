use globset::{GlobBuilder, GlobMatcher};
use kabu_core::lake::error::LakeError;

/// # Summary
/// 已编译的对象路径 glob 模式。
///
/// # Invariants
/// - `*` 与 `?` 不跨越 `/`，`**` 可匹配任意层级目录（含零层）。
/// - `prefix` 为首个通配符之前、截至最后一个 `/` 的字面目录，用于缩小列举范围。
#[derive(Debug, Clone)]
pub struct LakePattern {
    normalized: String,
    prefix: String,
    matcher: GlobMatcher,
}

impl LakePattern {
    /// # Summary
    /// 解析并编译模式。
    ///
    /// # Logic
    /// 1. 去除 `s3://bucket/` 形式的前缀与开头的 `/`。
    /// 2. 计算列举前缀。
    /// 3. 以路径分隔符敏感的方式编译 glob。
    ///
    /// # Arguments
    /// * `pattern`: 原始模式字符串。
    ///
    /// # Returns
    /// 成功返回 `LakePattern`，模式非法时返回 `LakeError::Pattern`。
    pub fn parse(pattern: &str) -> Result<Self, LakeError> {
        let normalized = strip_scheme(pattern.trim()).trim_start_matches('/').to_string();
        if normalized.is_empty() {
            return Err(LakeError::Pattern {
                pattern: pattern.to_string(),
                message: "empty pattern".to_string(),
            });
        }

        let matcher = GlobBuilder::new(&normalized)
            .literal_separator(true)
            .build()
            .map_err(|e| LakeError::Pattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?
            .compile_matcher();

        let prefix = literal_prefix(&normalized).to_string();
        Ok(Self {
            normalized,
            prefix,
            matcher,
        })
    }

    /// 列举前缀，可能为空串（即整个 bucket）。
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 判断对象路径是否匹配。
    pub fn matches(&self, location: &str) -> bool {
        self.matcher.is_match(location)
    }
}

impl std::fmt::Display for LakePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized)
    }
}

// s3://bucket/key/... -> key/...
fn strip_scheme(pattern: &str) -> &str {
    match pattern.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, key)| key).unwrap_or(""),
        None => pattern,
    }
}

fn literal_prefix(pattern: &str) -> &str {
    let literal_end = pattern
        .find(['*', '?', '[', '{'])
        .unwrap_or(pattern.len());
    match pattern[..literal_end].rfind('/') {
        Some(slash) => &pattern[..=slash],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_stops_at_first_wildcard() {
        assert_eq!(LakePattern::parse("daily_quotes/**/*.parquet").unwrap().prefix(), "daily_quotes/");
        assert_eq!(LakePattern::parse("a/b/2024*/x.parquet").unwrap().prefix(), "a/b/");
        assert_eq!(LakePattern::parse("*.parquet").unwrap().prefix(), "");
        assert_eq!(LakePattern::parse("fins/latest.parquet").unwrap().prefix(), "fins/");
    }

    #[test]
    fn test_s3_url_is_reduced_to_key() {
        let pattern = LakePattern::parse("s3://jquants/daily_quotes/*.parquet").unwrap();
        assert_eq!(pattern.to_string(), "daily_quotes/*.parquet");
        assert_eq!(pattern.prefix(), "daily_quotes/");
        assert!(pattern.matches("daily_quotes/20240603.parquet"));
    }

    #[test]
    fn test_single_star_does_not_cross_directories() {
        let flat = LakePattern::parse("daily_quotes/*.parquet").unwrap();
        assert!(flat.matches("daily_quotes/20240603.parquet"));
        assert!(!flat.matches("daily_quotes/2024/06/20240603.parquet"));

        let deep = LakePattern::parse("daily_quotes/**/*.parquet").unwrap();
        assert!(deep.matches("daily_quotes/20240603.parquet"));
        assert!(deep.matches("daily_quotes/2024/06/20240603.parquet"));
        assert!(!deep.matches("daily_quotes/2024/06/20240603.csv"));
        assert!(!deep.matches("fins_summary/20240603.parquet"));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(LakePattern::parse("  "), Err(LakeError::Pattern { .. })));
        assert!(matches!(LakePattern::parse("s3://bucket"), Err(LakeError::Pattern { .. })));
    }
}
